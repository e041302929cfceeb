//! Connections between device outputs and inputs.

use tracing::debug;

use super::devices::Devices;
use super::types::OutputRef;
use super::validate::unconnected_inputs;
use crate::error::ConnectError;
use crate::names::NameId;

/// The logic network: the device registry plus the wiring between devices.
///
/// Each input pin is driven by at most one output; an output may fan out to
/// any number of inputs.
#[derive(Debug, Clone)]
pub struct Network {
    devices: Devices,
    connections: usize,
}

impl Network {
    /// Wrap a device registry.
    pub fn new(devices: Devices) -> Self {
        Self {
            devices,
            connections: 0,
        }
    }

    pub fn devices(&self) -> &Devices {
        &self.devices
    }

    pub fn devices_mut(&mut self) -> &mut Devices {
        &mut self.devices
    }

    /// Connect an output to an input pin.
    pub fn connect(
        &mut self,
        output_device: NameId,
        output_pin: Option<NameId>,
        input_device: NameId,
        input_pin: NameId,
    ) -> Result<(), ConnectError> {
        let source = self
            .devices
            .get_device(output_device)
            .ok_or(ConnectError::DeviceAbsent)?;
        if !source.has_output(output_pin) {
            return Err(ConnectError::OutputPinAbsent);
        }

        let sink = self
            .devices
            .get_device_mut(input_device)
            .ok_or(ConnectError::DeviceAbsent)?;
        let slot = sink
            .inputs
            .get_mut(&input_pin)
            .ok_or(ConnectError::InputPinAbsent)?;
        if slot.is_some() {
            return Err(ConnectError::InputAlreadyConnected);
        }
        *slot = Some(OutputRef {
            device: output_device,
            pin: output_pin,
        });
        self.connections += 1;

        debug!(
            from = output_device.0,
            to = input_device.0,
            pin = input_pin.0,
            "connected"
        );
        Ok(())
    }

    /// Whether every declared input pin has a driver.
    pub fn is_fully_connected(&self) -> bool {
        unconnected_inputs(&self.devices).is_empty()
    }

    /// Number of connections made so far.
    pub fn connection_count(&self) -> usize {
        self.connections
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuit::{DeviceKind, Qualifier};
    use crate::names::NameTable;

    fn network() -> (NameTable, Network) {
        let mut names = NameTable::new();
        let mut devices = Devices::new(&mut names);
        let sw = names.lookup("sw");
        let ff = names.lookup("ff");
        let g = names.lookup("g");
        devices
            .make_device(sw, DeviceKind::Switch, Some(Qualifier::Value(1)))
            .unwrap();
        devices.make_device(ff, DeviceKind::DType, None).unwrap();
        devices
            .make_device(g, DeviceKind::Or, Some(Qualifier::Value(1)))
            .unwrap();
        (names, Network::new(devices))
    }

    #[test]
    fn test_connect_and_complete() {
        let (mut names, mut network) = network();
        let (sw, g, i1) = (names.lookup("sw"), names.lookup("g"), names.lookup("I1"));
        assert!(!network.is_fully_connected());

        network.connect(sw, None, g, i1).unwrap();
        assert_eq!(network.connection_count(), 1);
        let driver = network.devices().get_device(g).unwrap().inputs[&i1];
        assert_eq!(driver, Some(OutputRef { device: sw, pin: None }));
    }

    #[test]
    fn test_input_already_connected() {
        let (mut names, mut network) = network();
        let (sw, g, i1) = (names.lookup("sw"), names.lookup("g"), names.lookup("I1"));
        network.connect(sw, None, g, i1).unwrap();
        assert_eq!(
            network.connect(sw, None, g, i1),
            Err(ConnectError::InputAlreadyConnected)
        );
        assert_eq!(network.connection_count(), 1);
    }

    #[test]
    fn test_connect_rejects_bad_pins() {
        let (mut names, mut network) = network();
        let (sw, ff, g) = (names.lookup("sw"), names.lookup("ff"), names.lookup("g"));
        let (i2, q, data) = (names.lookup("I2"), names.lookup("Q"), names.lookup("DATA"));
        let nobody = names.lookup("nobody");

        assert_eq!(network.connect(sw, None, g, i2), Err(ConnectError::InputPinAbsent));
        assert_eq!(network.connect(ff, None, g, i2), Err(ConnectError::OutputPinAbsent));
        assert_eq!(network.connect(sw, Some(q), ff, data), Err(ConnectError::OutputPinAbsent));
        assert_eq!(network.connect(nobody, None, ff, data), Err(ConnectError::DeviceAbsent));
    }

    #[test]
    fn test_fully_connected_only_when_every_input_driven() {
        let (mut names, mut network) = network();
        let (sw, ff, g) = (names.lookup("sw"), names.lookup("ff"), names.lookup("g"));
        network.connect(sw, None, g, names.lookup("I1")).unwrap();
        assert!(!network.is_fully_connected());

        for pin in ["DATA", "CLK", "SET", "CLEAR"] {
            network.connect(sw, None, ff, names.lookup(pin)).unwrap();
        }
        assert!(network.is_fully_connected());
    }
}
