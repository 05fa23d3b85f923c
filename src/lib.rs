/// Recognize the G29 among enumerated HID devices by its USB IDs and HID usage.
pub mod device_ids;

/// The fixed table of vendor commands the wheel understands.
pub mod commands;

/// Send commands to matched devices and collect the outcome of each attempt.
pub mod protocol;

/// Access to the host's HID devices, abstracted so the protocol can be driven without hardware.
pub mod transport;
