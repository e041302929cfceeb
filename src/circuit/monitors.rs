//! Monitored output points.

use std::collections::BTreeSet;

use tracing::debug;

use super::devices::Devices;
use super::types::OutputRef;
use crate::error::MonitorError;
use crate::names::NameId;

/// The set of device outputs whose signals are recorded during simulation.
#[derive(Debug, Clone, Default)]
pub struct Monitors {
    monitored: BTreeSet<OutputRef>,
}

impl Monitors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start monitoring an output.
    pub fn add_monitor(
        &mut self,
        devices: &Devices,
        device: NameId,
        pin: Option<NameId>,
    ) -> Result<(), MonitorError> {
        let target = devices
            .get_device(device)
            .ok_or(MonitorError::PinNotAnOutput)?;
        if !target.has_output(pin) {
            return Err(MonitorError::PinNotAnOutput);
        }
        if !self.monitored.insert(OutputRef { device, pin }) {
            return Err(MonitorError::AlreadyMonitored);
        }
        debug!(device = device.0, "monitoring output");
        Ok(())
    }

    /// Monitored outputs in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = &OutputRef> {
        self.monitored.iter()
    }

    pub fn len(&self) -> usize {
        self.monitored.len()
    }

    pub fn is_empty(&self) -> bool {
        self.monitored.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuit::{DeviceKind, Qualifier};
    use crate::names::NameTable;

    #[test]
    fn test_add_monitor() {
        let mut names = NameTable::new();
        let mut devices = Devices::new(&mut names);
        let sw = names.lookup("sw");
        let ff = names.lookup("ff");
        devices
            .make_device(sw, DeviceKind::Switch, Some(Qualifier::Value(0)))
            .unwrap();
        devices.make_device(ff, DeviceKind::DType, None).unwrap();
        let [q, qbar] = devices.dtype_output_ids();

        let mut monitors = Monitors::new();
        monitors.add_monitor(&devices, sw, None).unwrap();
        monitors.add_monitor(&devices, ff, Some(q)).unwrap();
        monitors.add_monitor(&devices, ff, Some(qbar)).unwrap();
        assert_eq!(monitors.len(), 3);

        assert_eq!(
            monitors.add_monitor(&devices, ff, Some(q)),
            Err(MonitorError::AlreadyMonitored)
        );
        assert_eq!(
            monitors.add_monitor(&devices, ff, None),
            Err(MonitorError::PinNotAnOutput)
        );
        assert_eq!(
            monitors.add_monitor(&devices, sw, Some(q)),
            Err(MonitorError::PinNotAnOutput)
        );
        assert_eq!(
            monitors.add_monitor(&devices, names.lookup("ghost"), None),
            Err(MonitorError::PinNotAnOutput)
        );
    }
}
