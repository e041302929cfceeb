//! Device registry.

use std::collections::BTreeMap;

use tracing::debug;

use super::types::{DeviceKind, DeviceSetting, OutputRef, Qualifier};
use crate::error::DeviceError;
use crate::names::{NameId, NameTable};

/// Identifiers of the reserved pin words, interned once per name table.
#[derive(Debug, Clone)]
pub struct PinIds {
    /// `I1` through `I16`
    pub numbered_inputs: Vec<NameId>,
    pub data: NameId,
    pub clk: NameId,
    pub set: NameId,
    pub clear: NameId,
    pub q: NameId,
    pub qbar: NameId,
}

impl PinIds {
    /// Intern every pin word in `names`.
    pub fn new(names: &mut NameTable) -> Self {
        let numbered_inputs = (1..=16).map(|i| names.lookup(&format!("I{}", i))).collect();
        Self {
            numbered_inputs,
            data: names.lookup("DATA"),
            clk: names.lookup("CLK"),
            set: names.lookup("SET"),
            clear: names.lookup("CLEAR"),
            q: names.lookup("Q"),
            qbar: names.lookup("QBAR"),
        }
    }

    /// Outputs of a D-type, in declaration order.
    pub fn dtype_outputs(&self) -> [NameId; 2] {
        [self.q, self.qbar]
    }
}

/// A declared device.
#[derive(Debug, Clone)]
pub struct Device {
    pub id: NameId,
    pub kind: DeviceKind,
    /// Declared input pins and the output currently driving each of them.
    pub inputs: BTreeMap<NameId, Option<OutputRef>>,
    /// Output pins; `None` is the single unnamed output of a non-D-type device.
    pub outputs: Vec<Option<NameId>>,
    pub setting: DeviceSetting,
}

impl Device {
    /// Declared input pin ids, in ascending id order.
    pub fn declared_input_pins(&self) -> impl Iterator<Item = NameId> + '_ {
        self.inputs.keys().copied()
    }

    /// Whether `pin` is one of this device's input pins.
    pub fn has_input(&self, pin: NameId) -> bool {
        self.inputs.contains_key(&pin)
    }

    /// Whether `pin` (or the unnamed output, for `None`) is an output of this device.
    pub fn has_output(&self, pin: Option<NameId>) -> bool {
        self.outputs.contains(&pin)
    }
}

/// Registry of all declared devices, keyed by name id.
#[derive(Debug, Clone)]
pub struct Devices {
    devices: BTreeMap<NameId, Device>,
    pins: PinIds,
}

impl Devices {
    /// Create an empty registry, interning the pin vocabulary in `names`.
    pub fn new(names: &mut NameTable) -> Self {
        Self {
            devices: BTreeMap::new(),
            pins: PinIds::new(names),
        }
    }

    /// Declare a new device.
    ///
    /// A name clash is reported before the qualifier is looked at.
    pub fn make_device(
        &mut self,
        id: NameId,
        kind: DeviceKind,
        qualifier: Option<Qualifier>,
    ) -> Result<(), DeviceError> {
        if self.devices.contains_key(&id) {
            return Err(DeviceError::NameAlreadyUsed);
        }
        let setting = kind
            .setting_for(qualifier.as_ref())
            .ok_or(DeviceError::InvalidQualifier)?;

        let input_pins: Vec<NameId> = match (kind, &setting) {
            (_, DeviceSetting::Inputs(n)) => self.pins.numbered_inputs[..*n].to_vec(),
            (DeviceKind::Xor, _) => self.pins.numbered_inputs[..2].to_vec(),
            (DeviceKind::DType, _) => {
                vec![self.pins.data, self.pins.clk, self.pins.set, self.pins.clear]
            }
            _ => Vec::new(),
        };
        let outputs = if kind == DeviceKind::DType {
            self.pins.dtype_outputs().into_iter().map(Some).collect()
        } else {
            vec![None]
        };

        debug!(device = id.0, %kind, "declared device");
        self.devices.insert(
            id,
            Device {
                id,
                kind,
                inputs: input_pins.into_iter().map(|pin| (pin, None)).collect(),
                outputs,
                setting,
            },
        );
        Ok(())
    }

    /// Look up a declared device.
    pub fn get_device(&self, id: NameId) -> Option<&Device> {
        self.devices.get(&id)
    }

    pub(crate) fn get_device_mut(&mut self, id: NameId) -> Option<&mut Device> {
        self.devices.get_mut(&id)
    }

    /// Ids of the D-type output pins (`Q`, `QBAR`).
    pub fn dtype_output_ids(&self) -> [NameId; 2] {
        self.pins.dtype_outputs()
    }

    /// All devices in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = &Device> {
        self.devices.values()
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> (NameTable, Devices) {
        let mut names = NameTable::new();
        let devices = Devices::new(&mut names);
        (names, devices)
    }

    #[test]
    fn test_make_gate_declares_numbered_inputs() {
        let (mut names, mut devices) = registry();
        let g1 = names.lookup("g1");
        devices
            .make_device(g1, DeviceKind::And, Some(Qualifier::Value(3)))
            .unwrap();

        let device = devices.get_device(g1).unwrap();
        let expected = names.lookup_all(&["I1", "I2", "I3"]);
        assert_eq!(device.declared_input_pins().collect::<Vec<_>>(), expected);
        assert!(device.has_output(None));
        assert!(!device.has_input(names.lookup("I4")));
    }

    #[test]
    fn test_duplicate_name_takes_priority() {
        let (mut names, mut devices) = registry();
        let sw = names.lookup("sw");
        devices
            .make_device(sw, DeviceKind::Switch, Some(Qualifier::Value(0)))
            .unwrap();
        assert_eq!(
            devices.make_device(sw, DeviceKind::Switch, Some(Qualifier::Value(5))),
            Err(DeviceError::NameAlreadyUsed)
        );
    }

    #[test]
    fn test_invalid_qualifier_leaves_registry_unchanged() {
        let (mut names, mut devices) = registry();
        let clk = names.lookup("clk");
        assert_eq!(
            devices.make_device(clk, DeviceKind::Clock, Some(Qualifier::Value(0))),
            Err(DeviceError::InvalidQualifier)
        );
        assert!(devices.get_device(clk).is_none());
        assert!(devices.is_empty());
    }

    #[test]
    fn test_dtype_pins() {
        let (mut names, mut devices) = registry();
        let ff = names.lookup("ff");
        devices.make_device(ff, DeviceKind::DType, None).unwrap();

        let device = devices.get_device(ff).unwrap();
        assert_eq!(device.inputs.len(), 4);
        assert!(device.has_input(names.lookup("CLK")));
        let [q, qbar] = devices.dtype_output_ids();
        assert!(device.has_output(Some(q)));
        assert!(device.has_output(Some(qbar)));
        assert!(!device.has_output(None));
    }
}
