//! Device, network and monitor registries.
//!
//! The parser builds the circuit by calling into these registries. They keep
//! only the bookkeeping the definition language needs: which devices exist
//! and of which kind, which input pins they declare, which output drives each
//! input, and which outputs are monitored. Signal evaluation lives elsewhere.

mod devices;
mod monitors;
mod network;
mod types;
mod validate;

pub use devices::{Device, Devices, PinIds};
pub use monitors::Monitors;
pub use network::Network;
pub use types::*;
pub use validate::unconnected_inputs;
