//! # Logsim Core
//!
//! Front end for a logic circuit simulator: reads a circuit definition file
//! and builds the device, connection and monitor registries from it.
//!
//! This library provides:
//! - A name table interning every word of a definition
//! - A scanner with a whitespace-skipping and a raw read mode
//! - A recursive-descent parser that recovers at each `;` and keeps going
//! - Diagnostics that show the offending line with a caret under the error
//!
//! ## Architecture
//!
//! - [`names`] - String interning
//! - [`dsl`] - Scanner, parser and diagnostics for the definition language
//! - [`circuit`] - Device, network and monitor registries
//! - [`error`] - Fatal error types
//!
//! ## Usage
//!
//! ### Native CLI
//!
//! ```bash
//! logsim circuit.def
//! ```
//!
//! ### Library
//!
//! ```
//! use logsim_core::dsl::{self, ParserConfig};
//!
//! let report = dsl::check("DEVICE:\n  SWITCH s1 = 2;\n", ParserConfig::default());
//! assert!(!report.success);
//! assert_eq!(report.error_count(), 1);
//! ```
//!
//! ### WASM
//!
//! ```javascript
//! import { check_definition } from 'logsim_core';
//!
//! const report = check_definition(source);
//! if (!report.success) console.log(report.diagnostics);
//! ```

pub mod circuit;
pub mod dsl;
pub mod error;
pub mod names;

// Re-export main types for convenience
pub use dsl::{check, check_file, ParseReport, ParserConfig};
pub use error::{LogsimError, Result};
pub use names::{NameId, NameTable};

// WASM bindings
#[cfg(feature = "wasm")]
mod wasm;

#[cfg(feature = "wasm")]
pub use wasm::{check_definition, WasmParseReport};
