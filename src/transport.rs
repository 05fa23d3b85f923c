use crate::commands::REPORT_LEN;
use crate::device_ids::DeviceIdentity;
use hidapi::{BusType, DeviceInfo, HidApi, HidError};
use log::trace;
use std::fmt::Display;
use thiserror::Error;

/// The pieces of a host HID stack that the protocol needs: list devices, describe them, and
/// write output reports to them.
pub trait HidTransport {
    /// Refers to one enumerated device. Displayed in logs and outcome lines.
    type Handle: Display;
    type Error: std::error::Error + Send + Sync + 'static;

    fn enumerate_devices(&self) -> Vec<Self::Handle>;

    /// Never fails; fields the host can't report are left as `None`.
    fn identity(&self, handle: &Self::Handle) -> DeviceIdentity;

    /// Make exactly one attempt to deliver `payload` as an output report with ID `report_id`.
    fn write_output_report(
        &self,
        handle: &Self::Handle,
        report_id: u8,
        payload: &[u8; REPORT_LEN],
    ) -> Result<(), Self::Error>;
}

/// Whether to seize devices when opening them. hidapi does so by default on macOS, which fails
/// while a game or driver holds the wheel; mode commands don't need exclusive access.
#[cfg_attr(not(target_os = "macos"), allow(dead_code))]
const OPEN_EXCLUSIVE: bool = false;

/// [HidTransport] backed by the system's HID library.
pub struct HidApiTransport {
    api: HidApi,
}

impl HidApiTransport {
    /// Initialize the HID library and take a snapshot of the attached devices.
    pub fn new() -> Result<Self, TransportError> {
        let api = HidApi::new().map_err(|e| TransportError::DeviceIoError {
            source: e,
            action: "initializing HID library",
        })?;

        #[cfg(target_os = "macos")]
        api.set_open_exclusive(OPEN_EXCLUSIVE);

        Ok(Self { api })
    }
}

/// A device as enumerated by hidapi. Not opened until something is written to it.
#[derive(Clone)]
pub struct HidApiDevice {
    info: DeviceInfo,
}

impl Display for HidApiDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.info.path().to_string_lossy())
    }
}

fn bus_name(bus: BusType) -> Option<&'static str> {
    match bus {
        BusType::Usb => Some("USB"),
        BusType::Bluetooth => Some("Bluetooth"),
        BusType::I2c => Some("I2C"),
        BusType::Spi => Some("SPI"),
        _ => None,
    }
}

impl HidTransport for HidApiTransport {
    type Handle = HidApiDevice;
    type Error = TransportError;

    fn enumerate_devices(&self) -> Vec<HidApiDevice> {
        self.api
            .device_list()
            .map(|info| HidApiDevice { info: info.clone() })
            .collect()
    }

    fn identity(&self, handle: &HidApiDevice) -> DeviceIdentity {
        let info = &handle.info;
        DeviceIdentity {
            product_name: info.product_string().map(str::to_owned),
            vendor_id: Some(info.vendor_id().into()),
            product_id: Some(info.product_id().into()),
            serial_number: info.serial_number().map(str::to_owned),
            usage_page: Some(info.usage_page().into()),
            usage: Some(info.usage().into()),
            // hidapi has no notion of a location ID.
            location_id: None,
            transport: bus_name(info.bus_type()).map(str::to_owned),
        }
    }

    fn write_output_report(
        &self,
        handle: &HidApiDevice,
        report_id: u8,
        payload: &[u8; REPORT_LEN],
    ) -> Result<(), TransportError> {
        let device =
            handle
                .info
                .open_device(&self.api)
                .map_err(|e| TransportError::DeviceIoError {
                    source: e,
                    action: "opening device",
                })?;

        // hidapi always expects the report ID first, even for devices that don't number reports.
        let mut report = [0u8; 1 + REPORT_LEN];
        report[0] = report_id;
        report[1..].copy_from_slice(payload);

        trace!("Writing output report to {handle}: {report:02x?}");

        let written = device
            .write(&report)
            .map_err(|e| TransportError::DeviceIoError {
                source: e,
                action: "writing output report",
            })?;

        if written < report.len() {
            return Err(TransportError::ShortWrite {
                expected: report.len(),
                actual: written,
            });
        }
        Ok(())
    }
}

/// Failures talking to the host's HID stack.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum TransportError {
    #[error("HID error while {action}")]
    DeviceIoError {
        source: HidError,
        action: &'static str,
    },

    #[error("output report was {expected} bytes, but only {actual} were written")]
    ShortWrite { expected: usize, actual: usize },
}
