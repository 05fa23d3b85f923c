use crate::commands::{Command, CommandSpec};
use crate::device_ids::{DeviceIdentity, TARGET, is_target};
use crate::transport::HidTransport;
use log::{debug, info, trace, warn};
use std::fmt::Display;
use thiserror::Error;

/// Commands go out as unnumbered output reports.
const COMMAND_REPORT_ID: u8 = 0;

/// The result of one attempt to send a command to one device.
#[derive(Debug)]
pub struct DispatchOutcome {
    /// How the transport refers to the device.
    pub device: String,
    pub identity: DeviceIdentity,
    pub command: &'static CommandSpec,
    /// Set if the transport rejected the write. Always an [Error::TransmitFailure].
    pub failure: Option<Error>,
}

impl DispatchOutcome {
    pub fn succeeded(&self) -> bool {
        self.failure.is_none()
    }
}

impl Display for DispatchOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self.failure {
            None => write!(f, "[{}] Command sent: {}", self.device, self.command),
            Some(_) => write!(f, "[{}] Failed to send command: {}", self.device, self.command),
        }
    }
}

/// Send the command at index `selector` of [catalog](crate::commands::catalog) to `device`.
/// Returns `Err` only if the selector is invalid, in which case nothing is sent; a failed write is
/// reported in the outcome.
pub fn send<T: HidTransport>(
    transport: &T,
    device: &T::Handle,
    selector: i64,
) -> Result<DispatchOutcome, Error> {
    let command = Command::from_selector(selector)?;
    Ok(dispatch(transport, device, transport.identity(device), command))
}

fn dispatch<T: HidTransport>(
    transport: &T,
    device: &T::Handle,
    identity: DeviceIdentity,
    command: Command,
) -> DispatchOutcome {
    let spec = command.spec();
    let failure = match transport.write_output_report(device, COMMAND_REPORT_ID, &spec.bytes) {
        Ok(()) => {
            info!("[{device}] Sent {command}");
            None
        }
        Err(e) => {
            warn!("[{device}] Failed to send {spec}: {e}");
            Some(Error::TransmitFailure {
                device: device.to_string(),
                command: spec.name,
                source: Box::new(e),
            })
        }
    };

    DispatchOutcome {
        device: device.to_string(),
        identity,
        command: spec,
        failure,
    }
}

/// Everything that happened during one pass over the attached devices, in enumeration order.
#[derive(Debug, Default)]
pub struct Pass {
    pub outcomes: Vec<DispatchOutcome>,
}

impl Pass {
    pub fn found_any(&self) -> bool {
        !self.outcomes.is_empty()
    }

    pub fn failures(&self) -> impl Iterator<Item = &DispatchOutcome> {
        self.outcomes.iter().filter(|o| !o.succeeded())
    }

    pub fn ensure_found(&self) -> Result<(), Error> {
        match self.found_any() {
            true => Ok(()),
            false => Err(Error::NoDeviceFound),
        }
    }
}

/// Send the command at index `selector` to every attached G29. An invalid selector is rejected
/// before the transport is touched. Finding no wheel is not an error here; see
/// [Pass::ensure_found].
pub fn run<T: HidTransport>(transport: &T, selector: i64) -> Result<Pass, Error> {
    let command = Command::from_selector(selector)?;
    Ok(run_with(transport, command))
}

/// Like [run], for a command that has already been validated.
pub fn run_with<T: HidTransport>(transport: &T, command: Command) -> Pass {
    let mut pass = Pass::default();
    debug!("Looking for {TARGET} to send {command}");

    // Every matching device gets the command, even after a failure on an earlier one.
    for device in transport.enumerate_devices() {
        let identity = transport.identity(&device);
        if !is_target(&identity) {
            trace!("[{device}] Skipping non-matching device: {identity:?}");
            continue;
        }

        debug!("[{device}] Found Logitech G29");
        pass.outcomes.push(dispatch(transport, &device, identity, command));
    }

    if !pass.found_any() {
        debug!("No device matched after full enumeration");
    }

    pass
}

/// How a run ended, as reported to the user through the process exit code.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Status {
    Success,
    InvalidSelector,
    NoDeviceFound,
    TransmitFailure,
}

impl Status {
    /// Classify the result of [run].
    pub fn of(result: Result<&Pass, &Error>) -> Self {
        match result {
            Err(Error::InvalidSelector { .. }) => Status::InvalidSelector,
            Err(Error::NoDeviceFound) => Status::NoDeviceFound,
            Err(Error::TransmitFailure { .. }) => Status::TransmitFailure,
            Ok(pass) if !pass.found_any() => Status::NoDeviceFound,
            Ok(pass) if pass.failures().next().is_some() => Status::TransmitFailure,
            Ok(_) => Status::Success,
        }
    }

    /// Process exit code. 1 is left for setup errors outside of a run.
    pub fn exit_code(self) -> u8 {
        match self {
            Status::Success => 0,
            Status::InvalidSelector => 2,
            Status::NoDeviceFound => 3,
            Status::TransmitFailure => 4,
        }
    }
}

/// Everything that can go wrong while selecting and sending a command.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("invalid command selector {selector}: expected 0 to {}", .count - 1)]
    InvalidSelector { selector: i64, count: usize },

    #[error("failed to send \"{command}\" to {device}")]
    TransmitFailure {
        device: String,
        command: &'static str,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("no Logitech G29 device found")]
    NoDeviceFound,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::REPORT_LEN;
    use std::cell::Cell;

    /// One device that either accepts or refuses every write.
    struct OneDevice {
        identity: DeviceIdentity,
        accept: bool,
        writes: Cell<usize>,
    }

    #[derive(Error, Debug)]
    #[error("refused")]
    struct Refused;

    impl HidTransport for OneDevice {
        type Handle = &'static str;
        type Error = Refused;

        fn enumerate_devices(&self) -> Vec<&'static str> {
            vec!["dev0"]
        }

        fn identity(&self, _: &&'static str) -> DeviceIdentity {
            self.identity.clone()
        }

        fn write_output_report(
            &self,
            _: &&'static str,
            _: u8,
            _: &[u8; REPORT_LEN],
        ) -> Result<(), Refused> {
            self.writes.set(self.writes.get() + 1);
            match self.accept {
                true => Ok(()),
                false => Err(Refused),
            }
        }
    }

    fn wheel(accept: bool) -> OneDevice {
        OneDevice {
            identity: DeviceIdentity {
                vendor_id: Some(0x046d),
                product_id: Some(0xc24f),
                usage_page: Some(1),
                usage: Some(4),
                ..Default::default()
            },
            accept,
            writes: Cell::new(0),
        }
    }

    #[test]
    fn outcome_lines() {
        let ok = send(&wheel(true), &"dev0", 0).unwrap();
        assert!(ok.succeeded());
        assert_eq!(ok.to_string(), "[dev0] Command sent: Set Range 900");

        let failed = send(&wheel(false), &"dev0", 6).unwrap();
        assert!(!failed.succeeded());
        assert_eq!(
            failed.to_string(),
            "[dev0] Failed to send command: Disable Force Feedback"
        );
        assert!(matches!(
            failed.failure,
            Some(Error::TransmitFailure {
                command: "Disable Force Feedback",
                ..
            })
        ));
    }

    #[test]
    fn no_retry_after_failure() {
        let transport = wheel(false);
        send(&transport, &"dev0", 4).unwrap();
        assert_eq!(transport.writes.get(), 1);
    }

    #[test]
    fn ensure_found_reports_missing_device() {
        let pass = Pass::default();
        assert!(!pass.found_any());
        assert!(matches!(pass.ensure_found(), Err(Error::NoDeviceFound)));

        let pass = run(&wheel(true), 3).unwrap();
        assert!(pass.ensure_found().is_ok());
        assert_eq!(pass.failures().count(), 0);
    }

    #[test]
    fn invalid_selector_message() {
        let err = Command::from_selector(9).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid command selector 9: expected 0 to 6"
        );
    }
}
