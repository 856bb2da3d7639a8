//! Concrete telemetry links

mod serial;
mod wifi;

pub use serial::SerialLink;
pub use wifi::{WIRELESS, connection_task, net_task, udp_task};
