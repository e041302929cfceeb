//! Diagnostic collection and rendering.

use std::fmt;
use std::io;

use termcolor::{Color, ColorSpec, WriteColor};
use tracing::debug;

use super::scanner::{Token, TokenKind};

/// The source line an error points into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceExcerpt {
    /// Line number (1-indexed)
    pub line: usize,
    /// Column of the caret (1-indexed)
    pub column: usize,
    /// Full text of the line, without its terminator
    pub text: String,
}

impl SourceExcerpt {
    /// The line placed under the excerpt, with a `^` under the offending column.
    ///
    /// Tabs in the excerpt are repeated in the padding so the caret lines up.
    pub fn caret_line(&self) -> String {
        let mut padding: String = self
            .text
            .chars()
            .take(self.column.saturating_sub(1))
            .map(|c| if c == '\t' { '\t' } else { ' ' })
            .collect();
        // columns past the end of the text, such as end-of-file errors
        let missing = self.column.saturating_sub(1) - padding.chars().count();
        padding.extend(std::iter::repeat(' ').take(missing));
        format!("{}^", padding)
    }
}

/// One reported error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Position of this error in the report (1-indexed)
    pub number: usize,
    pub message: String,
    /// `None` for errors not tied to a single token
    pub excerpt: Option<SourceExcerpt>,
}

impl Diagnostic {
    /// Whether this error is about the file as a whole.
    pub fn is_global(&self) -> bool {
        self.excerpt.is_none()
    }

    /// Print the diagnostic with colors.
    pub fn print<W: WriteColor>(&self, stream: &mut W) -> io::Result<()> {
        stream.set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true))?;
        write!(stream, "Error {}", self.number)?;
        if let Some(excerpt) = &self.excerpt {
            write!(stream, " on line {}", excerpt.line)?;
        }
        write!(stream, ": ")?;
        stream.reset()?;
        stream.set_color(ColorSpec::new().set_bold(true))?;
        writeln!(stream, "{}", self.message)?;
        stream.reset()?;

        if let Some(excerpt) = &self.excerpt {
            writeln!(stream, "{}", excerpt.text)?;
            stream.set_color(ColorSpec::new().set_fg(Some(Color::Blue)).set_bold(true))?;
            writeln!(stream, "{}", excerpt.caret_line())?;
            stream.reset()?;
        }
        Ok(())
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.excerpt {
            Some(excerpt) => write!(
                f,
                "Error {} on line {}: {}\n{}\n{}",
                self.number,
                excerpt.line,
                self.message,
                excerpt.text,
                excerpt.caret_line()
            ),
            None => write!(f, "Error {}: {}", self.number, self.message),
        }
    }
}

/// Collects diagnostics against one source text.
///
/// The number of recorded diagnostics is the error count of the session.
#[derive(Debug, Clone)]
pub struct Reporter {
    lines: Vec<String>,
    diagnostics: Vec<Diagnostic>,
}

impl Reporter {
    pub fn new(source: &str) -> Self {
        Self {
            lines: source.lines().map(str::to_string).collect(),
            diagnostics: Vec::new(),
        }
    }

    /// Record an error pointing at `token`.
    pub fn report_error(&mut self, message: impl Into<String>, token: &Token) {
        let excerpt = if token.kind == TokenKind::Eof {
            self.end_of_file_excerpt()
        } else {
            Some(SourceExcerpt {
                line: token.line,
                column: token.column,
                text: self.line_text(token.line),
            })
        };
        self.push(message.into(), excerpt);
    }

    /// Record an error about the file as a whole.
    pub fn report_global_error(&mut self, message: impl Into<String>) {
        self.push(message.into(), None);
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    fn push(&mut self, message: String, excerpt: Option<SourceExcerpt>) {
        let diagnostic = Diagnostic {
            number: self.diagnostics.len() + 1,
            message,
            excerpt,
        };
        debug!(
            number = diagnostic.number,
            line = diagnostic.excerpt.as_ref().map(|e| e.line),
            message = %diagnostic.message,
            "recorded diagnostic"
        );
        self.diagnostics.push(diagnostic);
    }

    fn line_text(&self, line: usize) -> String {
        line.checked_sub(1)
            .and_then(|index| self.lines.get(index))
            .cloned()
            .unwrap_or_default()
    }

    /// Errors at end of input point just past the last non-blank line.
    fn end_of_file_excerpt(&self) -> Option<SourceExcerpt> {
        let (index, text) = self
            .lines
            .iter()
            .enumerate()
            .rev()
            .find(|(_, text)| !text.trim().is_empty())?;
        Some(SourceExcerpt {
            line: index + 1,
            column: text.trim_end().chars().count() + 1,
            text: text.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use termcolor::Buffer;

    fn token(kind: TokenKind, line: usize, column: usize) -> Token {
        Token::new(kind, None, line, column)
    }

    #[test]
    fn test_caret_under_column() {
        let mut reporter = Reporter::new("DEVICE:\n  SWITCH s1 = 2;\n");
        reporter.report_error("bad state", &token(TokenKind::Number, 2, 15));

        let rendered = reporter.diagnostics()[0].to_string();
        assert_eq!(
            rendered,
            "Error 1 on line 2: bad state\n  SWITCH s1 = 2;\n              ^"
        );
        assert_eq!(reporter.error_count(), 1);
    }

    #[test]
    fn test_caret_keeps_tabs() {
        let mut reporter = Reporter::new("\tSWITCH s = 2;");
        reporter.report_error("bad state", &token(TokenKind::Number, 1, 13));

        let excerpt = reporter.diagnostics()[0].excerpt.clone().unwrap();
        assert_eq!(excerpt.caret_line(), "\t           ^");
    }

    #[test]
    fn test_caret_past_end_of_line() {
        let excerpt = SourceExcerpt {
            line: 1,
            column: 6,
            text: "MON s".to_string(),
        };
        assert_eq!(excerpt.caret_line(), "     ^");
    }

    #[test]
    fn test_global_error_has_no_excerpt() {
        let mut reporter = Reporter::new("DEVICE:\n");
        reporter.report_global_error("No valid CONNECTION section");
        reporter.report_global_error("Another");

        let diagnostics = reporter.diagnostics();
        assert!(diagnostics[0].is_global());
        assert_eq!(diagnostics[1].to_string(), "Error 2: Another");
    }

    #[test]
    fn test_end_of_file_points_after_last_text() {
        let mut reporter = Reporter::new("DEVICE:\n  CLOCK c = 3  \n\n   \n");
        reporter.report_error("Expect stopping sign", &token(TokenKind::Eof, 5, 1));

        let excerpt = reporter.diagnostics()[0].excerpt.clone().unwrap();
        assert_eq!(excerpt.line, 2);
        assert_eq!(excerpt.column, 14);
    }

    #[test]
    fn test_end_of_file_in_blank_source_is_global() {
        let mut reporter = Reporter::new("\n\n");
        reporter.report_error("empty", &token(TokenKind::Eof, 3, 1));
        assert!(reporter.diagnostics()[0].is_global());
    }

    #[test]
    fn test_print_without_color() {
        let mut reporter = Reporter::new("MONITOR:\n");
        reporter.report_error("oops", &token(TokenKind::Heading, 1, 1));

        let mut buffer = Buffer::no_color();
        reporter.diagnostics()[0].print(&mut buffer).unwrap();
        let text = String::from_utf8(buffer.into_inner()).unwrap();
        assert_eq!(text, "Error 1 on line 1: oops\nMONITOR:\n^\n");
    }
}
