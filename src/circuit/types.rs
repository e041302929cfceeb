//! Core types for the device/network model.

use std::fmt;

use crate::names::NameId;

/// Maximum number of inputs on an AND/OR/NAND/NOR gate.
pub const MAX_GATE_INPUTS: u64 = 16;

/// Kinds of devices that can be declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DeviceKind {
    And,
    Or,
    Nand,
    Nor,
    Xor,
    /// D-type flip-flop with DATA/CLK/SET/CLEAR inputs and Q/QBAR outputs
    DType,
    Switch,
    Clock,
    /// Signal generator replaying a fixed 0/1 sequence
    Siggen,
    /// Output held high for a number of cycles, then low
    Rc,
}

impl DeviceKind {
    /// All kinds, in keyword declaration order.
    pub const ALL: [DeviceKind; 10] = [
        Self::Nand,
        Self::And,
        Self::Or,
        Self::Nor,
        Self::Xor,
        Self::DType,
        Self::Switch,
        Self::Clock,
        Self::Siggen,
        Self::Rc,
    ];

    /// The reserved word introducing this kind in a definition file.
    pub fn keyword(&self) -> &'static str {
        match self {
            Self::And => "AND",
            Self::Or => "OR",
            Self::Nand => "NAND",
            Self::Nor => "NOR",
            Self::Xor => "XOR",
            Self::DType => "DTYPE",
            Self::Switch => "SWITCH",
            Self::Clock => "CLOCK",
            Self::Siggen => "SIGGEN",
            Self::Rc => "RC",
        }
    }

    /// Whether this kind is a multi-input gate whose input count is its qualifier.
    pub fn is_sized_gate(&self) -> bool {
        matches!(self, Self::And | Self::Or | Self::Nand | Self::Nor)
    }

    /// Validate a qualifier and turn it into the device's setting.
    ///
    /// Returns `None` when the qualifier is missing, superfluous, or out of range.
    pub fn setting_for(&self, qualifier: Option<&Qualifier>) -> Option<DeviceSetting> {
        match (self, qualifier) {
            (Self::Xor | Self::DType, None) => Some(DeviceSetting::None),
            (Self::Xor | Self::DType, Some(_)) => None,
            (kind, Some(Qualifier::Value(n))) if kind.is_sized_gate() => {
                (1..=MAX_GATE_INPUTS).contains(n).then_some(DeviceSetting::Inputs(*n as usize))
            }
            (Self::Switch, Some(Qualifier::Value(n))) => match n {
                0 => Some(DeviceSetting::SwitchState(false)),
                1 => Some(DeviceSetting::SwitchState(true)),
                _ => None,
            },
            (Self::Clock | Self::Rc, Some(Qualifier::Value(n))) => u32::try_from(*n)
                .ok()
                .filter(|period| *period > 0)
                .map(DeviceSetting::Period),
            (Self::Siggen, Some(Qualifier::Sequence(digits))) => {
                let waveform = digits
                    .chars()
                    .map(|c| match c {
                        '0' => Some(false),
                        '1' => Some(true),
                        _ => None,
                    })
                    .collect::<Option<Vec<bool>>>()?;
                (!waveform.is_empty()).then_some(DeviceSetting::Waveform(waveform))
            }
            _ => None,
        }
    }
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Qualifier written after `=` in a device declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Qualifier {
    /// An integer (input count, switch state, period)
    Value(u64),
    /// A digit string kept verbatim (signal generator waveform)
    Sequence(String),
}

/// Validated per-device configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceSetting {
    None,
    /// Number of inputs of a sized gate
    Inputs(usize),
    SwitchState(bool),
    /// Clock half-period or RC high duration, in simulation cycles
    Period(u32),
    Waveform(Vec<bool>),
}

/// One end of a connection: a device output, optionally qualified by a pin.
///
/// Single-output devices use `pin: None`; D-types name `Q` or `QBAR`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OutputRef {
    pub device: NameId,
    pub pin: Option<NameId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keywords_are_distinct() {
        let keywords: std::collections::HashSet<_> =
            DeviceKind::ALL.iter().map(|kind| kind.keyword()).collect();
        assert_eq!(keywords.len(), DeviceKind::ALL.len());
        assert_eq!(DeviceKind::DType.to_string(), "DTYPE");
    }

    #[test]
    fn test_gate_input_range() {
        let gate = DeviceKind::Nand;
        assert_eq!(gate.setting_for(Some(&Qualifier::Value(0))), None);
        assert_eq!(
            gate.setting_for(Some(&Qualifier::Value(16))),
            Some(DeviceSetting::Inputs(16))
        );
        assert_eq!(gate.setting_for(Some(&Qualifier::Value(17))), None);
        assert_eq!(gate.setting_for(None), None);
    }

    #[test]
    fn test_switch_and_period_qualifiers() {
        assert_eq!(
            DeviceKind::Switch.setting_for(Some(&Qualifier::Value(1))),
            Some(DeviceSetting::SwitchState(true))
        );
        assert_eq!(DeviceKind::Switch.setting_for(Some(&Qualifier::Value(2))), None);
        assert_eq!(DeviceKind::Clock.setting_for(Some(&Qualifier::Value(0))), None);
        assert_eq!(DeviceKind::Rc.setting_for(Some(&Qualifier::Value(0))), None);
        assert_eq!(
            DeviceKind::Rc.setting_for(Some(&Qualifier::Value(7))),
            Some(DeviceSetting::Period(7))
        );
        assert_eq!(
            DeviceKind::Clock.setting_for(Some(&Qualifier::Value(u64::MAX))),
            None
        );
    }

    #[test]
    fn test_siggen_keeps_leading_zeros() {
        let setting = DeviceKind::Siggen.setting_for(Some(&Qualifier::Sequence("0011".into())));
        assert_eq!(
            setting,
            Some(DeviceSetting::Waveform(vec![false, false, true, true]))
        );
        assert_eq!(
            DeviceKind::Siggen.setting_for(Some(&Qualifier::Sequence("0121".into()))),
            None
        );
    }

    #[test]
    fn test_unqualified_kinds_reject_qualifier() {
        assert_eq!(DeviceKind::Xor.setting_for(None), Some(DeviceSetting::None));
        assert_eq!(DeviceKind::DType.setting_for(Some(&Qualifier::Value(1))), None);
    }
}
