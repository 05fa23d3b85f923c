use crate::protocol::Error;
use num_enum::TryFromPrimitive;
use std::fmt::Display;

/// Every command is a single output report of this many bytes (excluding the report ID).
pub const REPORT_LEN: usize = 8;

/// First byte of each command. Only the extended commands take parameters.
mod opcode {
    pub const EXTENDED: u8 = 0xf8;
    pub const RESET: u8 = 0xf3;
    pub const ENABLE_FFB: u8 = 0xf5;
    pub const DISABLE_FFB: u8 = 0xf6;
}

/// Second byte of an [opcode::EXTENDED] command.
mod extended {
    pub const NATIVE_MODE: u8 = 0x0a;
    pub const SET_RANGE: u8 = 0x81;
}

/// A named vendor command and its exact wire bytes.
#[derive(Debug, PartialEq)]
pub struct CommandSpec {
    pub name: &'static str,
    pub bytes: [u8; REPORT_LEN],
}

impl Display for CommandSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(self.name)
    }
}

const fn simple(op: u8) -> [u8; REPORT_LEN] {
    [op, 0, 0, 0, 0, 0, 0, 0]
}

const fn extended(cmd: u8) -> [u8; REPORT_LEN] {
    [opcode::EXTENDED, cmd, 0, 0, 0, 0, 0, 0]
}

/// Rotation range in degrees, lock to lock, little-endian after the sub-command.
const fn set_range(degrees: u16) -> [u8; REPORT_LEN] {
    let [lsb, msb] = degrees.to_le_bytes();
    [opcode::EXTENDED, extended::SET_RANGE, lsb, msb, 0, 0, 0, 0]
}

// Order matters: users select commands by index. Keep in sync with [Command].
static CATALOG: [CommandSpec; 7] = [
    CommandSpec {
        name: "Set Range 900",
        bytes: set_range(900),
    },
    CommandSpec {
        name: "Set Range 540",
        bytes: set_range(540),
    },
    CommandSpec {
        name: "Set Range 270",
        bytes: set_range(270),
    },
    CommandSpec {
        name: "Enable Native Mode",
        bytes: extended(extended::NATIVE_MODE),
    },
    CommandSpec {
        name: "Reset Device",
        bytes: simple(opcode::RESET),
    },
    CommandSpec {
        name: "Enable Force Feedback",
        bytes: simple(opcode::ENABLE_FFB),
    },
    CommandSpec {
        name: "Disable Force Feedback",
        bytes: simple(opcode::DISABLE_FFB),
    },
];

/// All supported commands, in selector order.
pub fn catalog() -> &'static [CommandSpec] {
    &CATALOG
}

/// Help text listing every command next to the selector that picks it.
pub fn selector_help() -> String {
    let mut help = String::from("Commands:\n");
    for (i, spec) in catalog().iter().enumerate() {
        help.push_str(&format!("  {i}  {spec}\n"));
    }
    help
}

/// The commands of [catalog()], by name. The discriminant is the selector.
#[repr(u8)]
#[derive(Copy, Clone, Debug, Eq, PartialEq, TryFromPrimitive)]
pub enum Command {
    SetRange900 = 0,
    SetRange540 = 1,
    SetRange270 = 2,
    EnableNativeMode = 3,
    Reset = 4,
    EnableFfb = 5,
    DisableFfb = 6,
}

impl Command {
    /// Validate a user-supplied index. Anything outside the catalog is rejected here, before the
    /// table is ever indexed.
    pub fn from_selector(selector: i64) -> Result<Self, Error> {
        let invalid = || Error::InvalidSelector {
            selector,
            count: CATALOG.len(),
        };

        let byte = u8::try_from(selector).map_err(|_| invalid())?;
        Self::try_from(byte).map_err(|_| invalid())
    }

    pub fn spec(self) -> &'static CommandSpec {
        &CATALOG[self as usize]
    }
}

impl Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        Display::fmt(self.spec(), f)
    }
}
