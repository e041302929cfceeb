//! Scanner (tokenizer) for the definition language.

use std::path::Path;

use tracing::trace;

use super::diagnostics::{Diagnostic, Reporter};
use super::vocabulary::Vocabulary;
use crate::error::{LogsimError, Result};
use crate::names::{NameId, NameTable};

/// A token produced by the scanner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// The kind of token
    pub kind: TokenKind,
    /// Interned text, for words and numbers
    pub id: Option<NameId>,
    /// Line number (1-indexed)
    pub line: usize,
    /// Column of the first character (1-indexed)
    pub column: usize,
}

impl Token {
    pub fn new(kind: TokenKind, id: Option<NameId>, line: usize, column: usize) -> Self {
        Self {
            kind,
            id,
            line,
            column,
        }
    }
}

/// Token types in the definition language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// A device kind or statement keyword (`AND`, `CLOCK`, `CON`, ...)
    Keyword,
    /// A section heading (`DEVICE`, `CONNECTION`, `MONITOR`)
    Heading,
    /// A user-defined device name
    Name,
    /// A reserved pin name (`I1`, `Q`, `DATA`, ...)
    Pin,
    /// A run of digits
    Number,
    Comma,
    /// `->`
    Arrow,
    Semicolon,
    Colon,
    Dot,
    Equal,
    /// Whitespace and comments, only produced by [`Scanner::next_raw_token`]
    Space,
    /// End of input
    Eof,
    /// A character that starts no valid token
    Malformed,
}

/// Scanner over one definition source.
///
/// The scanner also owns the diagnostic reporter, since rendering an error
/// needs the source lines.
pub struct Scanner<'a> {
    names: &'a mut NameTable,
    vocabulary: Vocabulary,
    chars: Vec<char>,
    pos: usize,
    line: usize,
    column: usize,
    reporter: Reporter,
}

impl<'a> Scanner<'a> {
    /// Create a scanner for the given source text.
    pub fn new(source: &str, names: &'a mut NameTable) -> Self {
        let vocabulary = Vocabulary::new(names);
        Self {
            names,
            vocabulary,
            chars: source.chars().collect(),
            pos: 0,
            line: 1,
            column: 1,
            reporter: Reporter::new(source),
        }
    }

    /// Create a scanner reading a definition file.
    pub fn from_path(path: &Path, names: &'a mut NameTable) -> Result<Self> {
        let source = read_source(path)?;
        Ok(Self::new(&source, names))
    }

    /// Get the next token, skipping whitespace and comments.
    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace_and_comments();
        self.scan()
    }

    /// Get the next token without skipping whitespace.
    ///
    /// A run of whitespace and comments comes back as a single
    /// [`TokenKind::Space`] token.
    pub fn next_raw_token(&mut self) -> Token {
        match self.peek() {
            Some(ch) if ch.is_whitespace() || ch == '#' => {
                let (line, column) = (self.line, self.column);
                self.skip_whitespace_and_comments();
                let token = Token::new(TokenKind::Space, None, line, column);
                trace!(kind = ?token.kind, line, column, "raw token");
                token
            }
            _ => self.scan(),
        }
    }

    /// Record an error pointing at `token`.
    pub fn report_error(&mut self, message: impl Into<String>, token: &Token) {
        self.reporter.report_error(message, token);
    }

    /// Record an error about the file as a whole.
    pub fn report_global_error(&mut self, message: impl Into<String>) {
        self.reporter.report_global_error(message);
    }

    pub fn error_count(&self) -> usize {
        self.reporter.error_count()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        self.reporter.diagnostics()
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.reporter.into_diagnostics()
    }

    pub fn names(&self) -> &NameTable {
        &*self.names
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += 1;
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    fn skip_whitespace_and_comments(&mut self) {
        while let Some(ch) = self.peek() {
            if ch.is_whitespace() {
                self.advance();
            } else if ch == '#' {
                // Skip comment until end of line
                while let Some(c) = self.peek() {
                    if c == '\n' {
                        break;
                    }
                    self.advance();
                }
            } else {
                break;
            }
        }
    }

    fn scan(&mut self) -> Token {
        let (line, column) = (self.line, self.column);
        let (kind, id) = match self.peek() {
            None => (TokenKind::Eof, None),
            Some(ch) if ch.is_ascii_alphabetic() => {
                let word = self.read_while(|c| c.is_ascii_alphanumeric());
                let id = self.names.lookup(&word);
                (self.classify(id), Some(id))
            }
            Some(ch) if ch.is_ascii_digit() => {
                let digits = self.read_while(|c| c.is_ascii_digit());
                (TokenKind::Number, Some(self.names.lookup(&digits)))
            }
            Some(ch) => {
                self.advance();
                let kind = match ch {
                    ',' => TokenKind::Comma,
                    ';' => TokenKind::Semicolon,
                    ':' => TokenKind::Colon,
                    '.' => TokenKind::Dot,
                    '=' => TokenKind::Equal,
                    '-' if self.peek() == Some('>') => {
                        self.advance();
                        TokenKind::Arrow
                    }
                    _ => TokenKind::Malformed,
                };
                (kind, None)
            }
        };
        trace!(?kind, line, column, "token");
        Token::new(kind, id, line, column)
    }

    fn read_while(&mut self, accept: impl Fn(char) -> bool) -> String {
        let mut text = String::new();
        while let Some(ch) = self.peek() {
            if !accept(ch) {
                break;
            }
            text.push(ch);
            self.advance();
        }
        text
    }

    fn classify(&self, id: NameId) -> TokenKind {
        if self.vocabulary.section(id).is_some() {
            TokenKind::Heading
        } else if self.vocabulary.keyword(id).is_some() {
            TokenKind::Keyword
        } else if self.vocabulary.is_pin(id) {
            TokenKind::Pin
        } else {
            TokenKind::Name
        }
    }
}

/// Read a definition file into memory.
pub fn read_source(path: &Path) -> Result<String> {
    if !path.is_file() {
        return Err(LogsimError::source_not_found(path.display().to_string()));
    }
    std::fs::read_to_string(path).map_err(|e| LogsimError::SourceRead {
        path: path.display().to_string(),
        source: e,
    })
}
