/// Graphics device module - backend interface, capabilities and the recording device

pub mod graphics_device;
pub mod capabilities;
pub mod recording_device;

pub use graphics_device::*;
pub use capabilities::*;
pub use recording_device::{DeviceCall, RecordingDevice};
