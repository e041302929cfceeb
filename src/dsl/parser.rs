//! Parser for the definition language.
//!
//! A definition file has three sections that must appear in order:
//!
//! ```text
//! file        = device_sec connect_sec monitor_sec
//! device_sec  = "DEVICE" ":" { device }
//! connect_sec = "CONNECTION" ":" { connection }
//! monitor_sec = "MONITOR" ":" { monitor }
//!
//! device      = gate | "XOR" name ";" | "DTYPE" name ";"
//!             | ("CLOCK" | "SWITCH" | "SIGGEN" | "RC") name "=" number ";"
//! gate        = ("AND" | "OR" | "NAND" | "NOR") name "=" number ";"
//! connection  = "CON" output "->" name "." pin ";"
//! monitor     = "MON" output ";"
//! output      = name [ "." ("Q" | "QBAR") ]
//! ```
//!
//! Errors never abort the parse. Each one is reported through the scanner and
//! the parser resynchronizes at the next `;`.

use std::collections::BTreeSet;

use thiserror::Error;
use tracing::{debug, warn};

use super::diagnostics::Diagnostic;
use super::scanner::{Scanner, Token, TokenKind};
use super::vocabulary::{Keyword, Section};
use crate::circuit::{unconnected_inputs, DeviceKind, Monitors, Network, Qualifier};
use crate::error::{ConnectError, DeviceError, MonitorError};
use crate::names::NameId;

const INVALID_NAME: &str =
    "Invalid name: a name is a letter followed by letters or digits, and cannot be a reserved word";
const EXPECT_EQUAL: &str = "Expect equal sign";
const EXPECT_STOP: &str = "Expect stopping sign";

/// Configuration for the parser.
#[derive(Debug, Clone, Default)]
pub struct ParserConfig {
    /// Stop parsing once this many errors have been reported. A limit of 0
    /// behaves like 1.
    pub max_errors: Option<usize>,
}

impl ParserConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the error limit.
    pub fn with_max_errors(mut self, max_errors: usize) -> Self {
        self.max_errors = Some(max_errors);
        self
    }
}

/// A statement that could not be built, with the token to point at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildError {
    pub message: String,
    pub token: Token,
}

impl BuildError {
    fn new(message: impl Into<String>, token: &Token) -> Self {
        Self {
            message: message.into(),
            token: token.clone(),
        }
    }
}

/// Outcome of skipping to the end of a broken statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recovery {
    /// Stopped on a `;`; the next statement starts after it
    Resynchronized,
    /// Ran into the end of the input without finding a `;`
    EndOfFile,
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
enum SectionError {
    #[error("There are multiple {0} sections in the file")]
    Repeated(Section),
    #[error("There is no {missing} section before {section}")]
    Missing { section: Section, missing: Section },
}

/// Tracks which sections were opened and which one statements belong to.
#[derive(Debug, Default)]
struct SectionTracker {
    active: Option<Section>,
    opened: BTreeSet<Section>,
    misplaced: BTreeSet<Section>,
}

impl SectionTracker {
    /// Enter `section`. The section becomes active even when misplaced.
    ///
    /// A misplaced predecessor counts as present, so one ordering mistake is
    /// reported once.
    fn open(&mut self, section: Section) -> Result<(), SectionError> {
        self.active = Some(section);
        let missing = Section::ALL
            .into_iter()
            .take_while(|s| *s != section)
            .find(|s| !self.opened.contains(s) && !self.misplaced.contains(s));
        let result = match missing {
            _ if self.opened.contains(&section) => Err(SectionError::Repeated(section)),
            Some(missing) => Err(SectionError::Missing { section, missing }),
            None => Ok(()),
        };
        match result {
            Ok(()) => self.opened.insert(section),
            Err(_) => self.misplaced.insert(section),
        };
        result
    }

    /// First section never validly opened, unless it was attempted out of order.
    fn first_missing(&self) -> Option<Section> {
        Section::ALL
            .into_iter()
            .find(|s| !self.opened.contains(s))
            .filter(|s| !self.misplaced.contains(s))
    }
}

/// Grammar and messages for one device kind.
struct DeviceGrammar {
    /// Messages for a missing and an invalid qualifier; `None` if the kind takes none.
    qualifier: Option<(&'static str, &'static str)>,
}

impl DeviceGrammar {
    fn for_kind(kind: DeviceKind) -> Self {
        let qualifier = match kind {
            DeviceKind::Clock => Some((
                "Expect a clock period here, which should be a number",
                "Expect clock period to be larger than 0",
            )),
            DeviceKind::Switch => Some((
                "Expect a switch state here, which should be a number",
                "Expect switch state to be 0 (low) or 1 (high)",
            )),
            DeviceKind::Siggen => Some((
                "Expect a sequence of signal values made of 0 (low) and 1 (high), e.g. 110011",
                "Invalid signal value, use 0 for a low and 1 for a high signal",
            )),
            DeviceKind::Rc => Some((
                "Expect an RC period here, which should be a number",
                "Expect RC period to be larger than 0",
            )),
            DeviceKind::And | DeviceKind::Or | DeviceKind::Nand | DeviceKind::Nor => Some((
                "Expect the number of input pins here, which should be a number",
                "Number of input pins out of range (1 to 16)",
            )),
            DeviceKind::Xor | DeviceKind::DType => None,
        };
        Self { qualifier }
    }
}

/// Parser for definition files.
///
/// Builds devices, connections and monitors into the registries it borrows,
/// and reports every problem through the scanner's diagnostics.
pub struct Parser<'a> {
    scanner: Scanner<'a>,
    network: &'a mut Network,
    monitors: &'a mut Monitors,
    config: ParserConfig,
    current: Token,
    sections: SectionTracker,
    /// Devices declared but not yet used as an output or monitored
    unused: BTreeSet<NameId>,
    finished: bool,
}

impl<'a> Parser<'a> {
    /// Create a new parser with default configuration.
    pub fn new(
        scanner: Scanner<'a>,
        network: &'a mut Network,
        monitors: &'a mut Monitors,
    ) -> Self {
        Self::with_config(scanner, network, monitors, ParserConfig::default())
    }

    /// Create a new parser with custom configuration.
    pub fn with_config(
        scanner: Scanner<'a>,
        network: &'a mut Network,
        monitors: &'a mut Monitors,
        config: ParserConfig,
    ) -> Self {
        Self {
            scanner,
            network,
            monitors,
            config,
            current: Token::new(TokenKind::Eof, None, 1, 1),
            sections: SectionTracker::default(),
            unused: BTreeSet::new(),
            finished: false,
        }
    }

    /// Parse the whole definition.
    ///
    /// Returns `true` if no error was reported. Calling it again after the
    /// parse has finished returns the same result without re-checking.
    pub fn parse(&mut self) -> bool {
        if self.finished {
            return self.error_count() == 0;
        }
        loop {
            self.advance();
            match self.current.kind {
                TokenKind::Eof => {
                    self.check_complete();
                    self.finished = true;
                    return self.error_count() == 0;
                }
                TokenKind::Heading => self.parse_heading(),
                TokenKind::Keyword => self.parse_statement(),
                _ => {
                    let token = self.current.clone();
                    self.scanner
                        .report_error("Expect a section heading or a statement keyword here", &token);
                    self.skip_line();
                }
            }

            if let Some(max) = self.config.max_errors {
                if self.error_count() > 0 && self.error_count() >= max {
                    warn!(errors = self.error_count(), "error limit reached, giving up");
                    self.finished = true;
                    return false;
                }
            }
        }
    }

    pub fn error_count(&self) -> usize {
        self.scanner.error_count()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        self.scanner.diagnostics()
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.scanner.into_diagnostics()
    }

    fn advance(&mut self) {
        self.current = self.scanner.next_token();
    }

    fn advance_raw(&mut self) {
        self.current = self.scanner.next_raw_token();
    }

    fn name_of(&self, id: NameId) -> String {
        self.scanner
            .names()
            .get_name_string(id)
            .unwrap_or("?")
            .to_string()
    }

    /// Skip to the end of the current statement.
    fn skip_line(&mut self) -> Recovery {
        loop {
            match self.current.kind {
                TokenKind::Semicolon => return Recovery::Resynchronized,
                TokenKind::Eof => return Recovery::EndOfFile,
                _ => self.advance(),
            }
        }
    }

    fn parse_heading(&mut self) {
        let heading = self.current.clone();
        let Some(section) = heading.id.and_then(|id| self.scanner.vocabulary().section(id)) else {
            return;
        };

        self.advance();
        if self.current.kind != TokenKind::Colon {
            let token = self.current.clone();
            self.scanner
                .report_error(format!("A colon is expected after {}", section), &token);
            self.skip_line();
            return;
        }

        match self.sections.open(section) {
            Ok(()) => debug!(%section, "entered section"),
            Err(e) => self.scanner.report_error(e.to_string(), &heading),
        }
    }

    fn parse_statement(&mut self) {
        let keyword = self
            .current
            .id
            .and_then(|id| self.scanner.vocabulary().keyword(id));

        let result = match (keyword, self.sections.active) {
            (Some(Keyword::Device(kind)), Some(Section::Device)) => self.build_device(kind),
            (Some(Keyword::Connect), Some(Section::Connection)) => self.build_connection(),
            (Some(Keyword::Monitor), Some(Section::Monitor)) => self.build_monitor(),
            (Some(Keyword::Device(_)), _) => Err(BuildError::new(
                "The device definition is not in a DEVICE section",
                &self.current,
            )),
            (Some(Keyword::Connect), _) => Err(BuildError::new(
                "The CON statement is not in a CONNECTION section",
                &self.current,
            )),
            (Some(Keyword::Monitor), _) => Err(BuildError::new(
                "The MON statement is not in a MONITOR section",
                &self.current,
            )),
            (None, _) => Err(BuildError::new("Unknown keyword", &self.current)),
        };

        if let Err(e) = result {
            self.scanner.report_error(e.message, &e.token);
            self.skip_line();
        }
    }

    /// Expect a user-defined name as the current token.
    fn expect_name(&self) -> Result<(NameId, Token), BuildError> {
        match (self.current.kind, self.current.id) {
            (TokenKind::Name, Some(id)) => Ok((id, self.current.clone())),
            _ => Err(BuildError::new(INVALID_NAME, &self.current)),
        }
    }

    fn expect_stop(&mut self) -> Result<(), BuildError> {
        self.advance();
        if self.current.kind != TokenKind::Semicolon {
            return Err(BuildError::new(EXPECT_STOP, &self.current));
        }
        Ok(())
    }

    /// Build a device declaration. The current token is the device keyword.
    fn build_device(&mut self, kind: DeviceKind) -> Result<(), BuildError> {
        let grammar = DeviceGrammar::for_kind(kind);

        self.advance();
        let (id, name) = self.expect_name()?;

        let mut qualifier = None;
        if let Some((missing_number, _)) = grammar.qualifier {
            self.advance();
            if self.current.kind != TokenKind::Equal {
                return Err(BuildError::new(EXPECT_EQUAL, &self.current));
            }
            self.advance();
            let (TokenKind::Number, Some(number)) = (self.current.kind, self.current.id) else {
                return Err(BuildError::new(missing_number, &self.current));
            };
            let digits = self.name_of(number);
            let value = if kind == DeviceKind::Siggen {
                Qualifier::Sequence(digits)
            } else {
                // digits only, so this fails on overflow alone
                Qualifier::Value(digits.parse().unwrap_or(u64::MAX))
            };
            qualifier = Some((value, self.current.clone()));
        }

        self.expect_stop()?;

        let (value, number_token) = match qualifier {
            Some((value, token)) => (Some(value), Some(token)),
            None => (None, None),
        };
        match self.network.devices_mut().make_device(id, kind, value) {
            Ok(()) => {
                self.unused.insert(id);
                Ok(())
            }
            Err(DeviceError::NameAlreadyUsed) => Err(BuildError::new(
                format!("The name '{}' has already been used", self.name_of(id)),
                &name,
            )),
            Err(DeviceError::InvalidQualifier) => {
                let message = grammar.qualifier.map_or("Invalid qualifier", |(_, invalid)| invalid);
                Err(BuildError::new(message, number_token.as_ref().unwrap_or(&name)))
            }
        }
    }

    /// Parse an output reference: a device name, plus `.Q`/`.QBAR` for D-types.
    ///
    /// The qualifier is read without skipping whitespace, so `ff .Q` is an error.
    fn parse_output(&mut self) -> Result<(NameId, Option<NameId>, Token), BuildError> {
        let (id, name) = self.expect_name()?;
        let kind = match self.network.devices().get_device(id) {
            Some(device) => device.kind,
            None => {
                return Err(BuildError::new(
                    format!("The device '{}' is not defined", self.name_of(id)),
                    &name,
                ))
            }
        };
        if kind != DeviceKind::DType {
            return Ok((id, None, name));
        }

        self.advance_raw();
        if self.current.kind != TokenKind::Dot {
            return Err(BuildError::new(
                format!(
                    "'{}' is a DTYPE, a dot followed by the output pin Q or QBAR is expected here",
                    self.name_of(id)
                ),
                &self.current,
            ));
        }
        self.advance_raw();
        let pin = self
            .current
            .id
            .filter(|pin| self.network.devices().dtype_output_ids().contains(pin));
        match (self.current.kind, pin) {
            (TokenKind::Pin, Some(pin)) => Ok((id, Some(pin), self.current.clone())),
            _ => Err(BuildError::new(
                "A DTYPE output pin is required here, Q or QBAR",
                &self.current,
            )),
        }
    }

    /// Reject `.PIN` after a device that has a single unnamed output.
    fn reject_output_pin(&self, device: NameId, pin: Option<NameId>) -> Result<(), BuildError> {
        if pin.is_none() && self.current.kind == TokenKind::Dot {
            return Err(BuildError::new(
                format!(
                    "'{}' has a single output, no pin name is allowed here",
                    self.name_of(device)
                ),
                &self.current,
            ));
        }
        Ok(())
    }

    /// Build a connection. The current token is `CON`.
    fn build_connection(&mut self) -> Result<(), BuildError> {
        self.advance();
        let (output, output_pin, _) = self.parse_output()?;

        self.advance();
        self.reject_output_pin(output, output_pin)?;
        if self.current.kind != TokenKind::Arrow {
            return Err(BuildError::new(
                "An arrow is expected after the output device/pin",
                &self.current,
            ));
        }

        self.advance();
        let (input, input_name) = self.expect_name()?;
        if self.network.devices().get_device(input).is_none() {
            return Err(BuildError::new(
                format!("The device '{}' is not defined", self.name_of(input)),
                &input_name,
            ));
        }

        self.advance_raw();
        if self.current.kind != TokenKind::Dot {
            return Err(BuildError::new(
                "A dot followed by an input pin name is expected here",
                &self.current,
            ));
        }
        self.advance_raw();
        let (TokenKind::Pin, Some(input_pin)) = (self.current.kind, self.current.id) else {
            return Err(BuildError::new(
                "A valid input pin name is expected here",
                &self.current,
            ));
        };
        let pin_token = self.current.clone();
        let declared = self
            .network
            .devices()
            .get_device(input)
            .is_some_and(|device| device.has_input(input_pin));
        if !declared {
            return Err(BuildError::new(
                format!(
                    "'{}' is not an input pin of '{}'",
                    self.name_of(input_pin),
                    self.name_of(input)
                ),
                &pin_token,
            ));
        }

        self.expect_stop()?;

        match self.network.connect(output, output_pin, input, input_pin) {
            Ok(()) => {
                self.unused.remove(&output);
                Ok(())
            }
            Err(ConnectError::InputAlreadyConnected) => Err(BuildError::new(
                format!(
                    "The input '{}.{}' is already connected",
                    self.name_of(input),
                    self.name_of(input_pin)
                ),
                &pin_token,
            )),
            Err(e) => Err(BuildError::new(format!("Cannot connect: {}", e), &pin_token)),
        }
    }

    /// Build a monitor. The current token is `MON`.
    fn build_monitor(&mut self) -> Result<(), BuildError> {
        self.advance();
        let (device, pin, target) = self.parse_output()?;

        self.advance();
        self.reject_output_pin(device, pin)?;
        if self.current.kind != TokenKind::Semicolon {
            return Err(BuildError::new(EXPECT_STOP, &self.current));
        }

        match self.monitors.add_monitor(self.network.devices(), device, pin) {
            Ok(()) => {
                self.unused.remove(&device);
                Ok(())
            }
            Err(MonitorError::PinNotAnOutput) => Err(BuildError::new(
                "The pin to be monitored is not an output of this device",
                &target,
            )),
            Err(MonitorError::AlreadyMonitored) => Err(BuildError::new(
                "The device/pin is already monitored",
                &target,
            )),
        }
    }

    /// Checks that can only run once the whole file has been read.
    fn check_complete(&mut self) {
        if self.error_count() == 0 {
            if let Some(section) = self.sections.first_missing() {
                self.scanner.report_global_error(format!(
                    "No valid {} section found in the definition file",
                    section
                ));
            }
        }

        if !self.network.is_fully_connected() {
            let pins: Vec<String> = unconnected_inputs(self.network.devices())
                .into_iter()
                .map(|(device, pin)| format!("{}.{}", self.name_of(device), self.name_of(pin)))
                .collect();
            self.scanner.report_global_error(format!(
                "Some inputs are not connected: {}",
                pins.join(", ")
            ));
        }

        if !self.unused.is_empty() {
            let devices: Vec<String> = self.unused.iter().map(|id| self.name_of(*id)).collect();
            self.scanner.report_global_error(format!(
                "Some devices are never used: {}",
                devices.join(", ")
            ));
        }
    }
}
