//! Network completeness checks.

use super::devices::Devices;
use crate::names::NameId;

/// List every `(device, input pin)` that has no driver, in ascending id order.
pub fn unconnected_inputs(devices: &Devices) -> Vec<(NameId, NameId)> {
    devices
        .iter()
        .flat_map(|device| {
            device
                .inputs
                .iter()
                .filter(|(_, driver)| driver.is_none())
                .map(move |(pin, _)| (device.id, *pin))
        })
        .collect()
}
