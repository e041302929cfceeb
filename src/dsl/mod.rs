//! Definition language for logic circuits.
//!
//! A definition file declares devices, wires outputs to inputs and chooses
//! which outputs to monitor. Reserved words are case sensitive; `#` starts a
//! comment that runs to the end of the line.
//!
//! # Example
//!
//! ```text
//! # SR latch
//! DEVICE:
//!   SWITCH set = 1;
//!   SWITCH reset = 1;
//!   NAND top = 2;
//!   NAND bottom = 2;
//!
//! CONNECTION:
//!   CON set -> top.I1;
//!   CON bottom -> top.I2;
//!   CON reset -> bottom.I1;
//!   CON top -> bottom.I2;
//!
//! MONITOR:
//!   MON top;
//! ```
//!
//! # Devices
//!
//! | Keyword | Qualifier | Inputs | Outputs |
//! |---------|-----------|--------|---------|
//! | AND, OR, NAND, NOR | input count, 1 to 16 | `I1`..`In` | one |
//! | XOR | none | `I1`, `I2` | one |
//! | DTYPE | none | `DATA`, `CLK`, `SET`, `CLEAR` | `Q`, `QBAR` |
//! | SWITCH | initial state, 0 or 1 | none | one |
//! | CLOCK | half period, > 0 | none | one |
//! | SIGGEN | waveform of 0/1 digits | none | one |
//! | RC | period, > 0 | none | one |

mod diagnostics;
mod parser;
mod scanner;
mod vocabulary;

pub use diagnostics::{Diagnostic, Reporter, SourceExcerpt};
pub use parser::{BuildError, Parser, ParserConfig, Recovery};
pub use scanner::{read_source, Scanner, Token, TokenKind};
pub use vocabulary::{Keyword, Section, Vocabulary};

use std::io;
use std::path::Path;

use termcolor::WriteColor;

use crate::circuit::{Devices, Monitors, Network};
use crate::error::Result;
use crate::names::NameTable;

/// Everything produced by checking one definition.
#[derive(Debug)]
pub struct ParseReport {
    /// Whether the definition parsed without errors
    pub success: bool,
    pub diagnostics: Vec<Diagnostic>,
    pub names: NameTable,
    pub network: Network,
    pub monitors: Monitors,
}

impl ParseReport {
    pub fn error_count(&self) -> usize {
        self.diagnostics.len()
    }

    /// All diagnostics as plain text, separated by newlines.
    pub fn render(&self) -> String {
        self.diagnostics
            .iter()
            .map(|d| format!("{}\n", d))
            .collect()
    }

    /// Print all diagnostics with colors.
    pub fn print<W: WriteColor>(&self, stream: &mut W) -> io::Result<()> {
        for diagnostic in &self.diagnostics {
            diagnostic.print(stream)?;
        }
        Ok(())
    }
}

/// Parse a definition held in memory.
pub fn check(source: &str, config: ParserConfig) -> ParseReport {
    let mut names = NameTable::new();
    let mut network = Network::new(Devices::new(&mut names));
    let mut monitors = Monitors::new();

    let (success, diagnostics) = {
        let scanner = Scanner::new(source, &mut names);
        let mut parser = Parser::with_config(scanner, &mut network, &mut monitors, config);
        let success = parser.parse();
        (success, parser.into_diagnostics())
    };

    ParseReport {
        success,
        diagnostics,
        names,
        network,
        monitors,
    }
}

/// Parse a definition file.
pub fn check_file(path: &Path, config: ParserConfig) -> Result<ParseReport> {
    let source = read_source(path)?;
    Ok(check(&source, config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use termcolor::Buffer;

    const LATCH: &str = "\
DEVICE:
  SWITCH set = 1;
  SWITCH reset = 1;
  NAND top = 2;
  NAND bottom = 2;
CONNECTION:
  CON set -> top.I1;
  CON bottom -> top.I2;
  CON reset -> bottom.I1;
  CON top -> bottom.I2;
MONITOR:
  MON top;
";

    #[test]
    fn test_check_valid_definition() {
        let report = check(LATCH, ParserConfig::default());
        assert!(report.success);
        assert_eq!(report.error_count(), 0);
        assert_eq!(report.render(), "");
        assert_eq!(report.network.devices().len(), 4);
        assert_eq!(report.network.connection_count(), 4);
        assert_eq!(report.monitors.len(), 1);

        let top = report.names.query("top").unwrap();
        assert!(report.monitors.iter().any(|m| m.device == top && m.pin.is_none()));
    }

    #[test]
    fn test_render_and_print_agree() {
        let report = check("DEVICE:\n  SWITCH s1 = 2;\n", ParserConfig::default());
        assert!(!report.success);
        let expected = "\
Error 1 on line 2: Expect switch state to be 0 (low) or 1 (high)
  SWITCH s1 = 2;
              ^
";
        assert_eq!(report.render(), expected);

        let mut buffer = Buffer::no_color();
        report.print(&mut buffer).unwrap();
        assert_eq!(String::from_utf8(buffer.into_inner()).unwrap(), expected);
    }

    #[test]
    fn test_check_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(LATCH.as_bytes()).unwrap();

        let report = check_file(file.path(), ParserConfig::default()).unwrap();
        assert!(report.success);
    }

    #[test]
    fn test_check_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = check_file(&dir.path().join("nope.def"), ParserConfig::default());
        assert!(matches!(
            result,
            Err(crate::error::LogsimError::SourceNotFound { .. })
        ));
    }

    #[test]
    fn test_repeated_checks_match() {
        let source = "DEVICE: CLOCK c = 0; XOR x;\nCONNECTION: CON x -> x.I3;\n";
        let first = check(source, ParserConfig::default());
        let second = check(source, ParserConfig::default());
        assert_eq!(first.diagnostics, second.diagnostics);
        assert!(first.error_count() > 0);
    }
}
