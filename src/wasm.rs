//! WASM bindings for Logsim Core.
//!
//! Lets a browser-side editor check a definition as the user types.
//!
//! ## Usage (JavaScript)
//!
//! ```javascript
//! import init, { check_definition } from 'logsim_core';
//!
//! await init();
//!
//! const report = check_definition(editor.value);
//! status.textContent = report.success
//!   ? 'OK'
//!   : `${report.error_count} error(s)\n${report.diagnostics}`;
//! ```

use wasm_bindgen::prelude::*;

use crate::dsl::{self, ParserConfig};

/// Initialize panic hook for better error messages in browser console.
#[wasm_bindgen(start)]
pub fn init_panic_hook() {
    console_error_panic_hook::set_once();
}

/// Outcome of checking a definition.
#[wasm_bindgen]
pub struct WasmParseReport {
    success: bool,
    error_count: usize,
    diagnostics: String,
}

#[wasm_bindgen]
impl WasmParseReport {
    #[wasm_bindgen(getter)]
    pub fn success(&self) -> bool {
        self.success
    }

    #[wasm_bindgen(getter)]
    pub fn error_count(&self) -> usize {
        self.error_count
    }

    /// Rendered diagnostics, one block per error.
    #[wasm_bindgen(getter)]
    pub fn diagnostics(&self) -> String {
        self.diagnostics.clone()
    }
}

/// Check a definition held in a string.
#[wasm_bindgen]
pub fn check_definition(source: &str) -> WasmParseReport {
    let report = dsl::check(source, ParserConfig::default());
    WasmParseReport {
        success: report.success,
        error_count: report.error_count(),
        diagnostics: report.render(),
    }
}

/// Get the library version.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
