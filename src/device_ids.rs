use std::fmt::Display;

/// Logitech's USB vendor ID.
pub const LOGITECH_VID: u16 = 0x046d;

/// Product ID of the G29 (PlayStation/PC variant).
pub const G29_PID: u16 = 0xc24f;

// HID usage page and usage of the joystick collection.
const GENERIC_DESKTOP_PAGE: u16 = 0x01;
const JOYSTICK_USAGE: u16 = 0x04;

/// The exact signature a device must present to be treated as the wheel. The wheel can show up as
/// several top-level collections; we only talk to the joystick one.
pub const TARGET: DeviceSignature = DeviceSignature {
    id: UsbId {
        vid: LOGITECH_VID,
        pid: G29_PID,
    },
    usage_page: GENERIC_DESKTOP_PAGE,
    usage: JOYSTICK_USAGE,
};

/// A USB vendor ID and product ID pair.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct UsbId {
    pub vid: u16,
    pub pid: u16,
}

impl Display for UsbId {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{:04x}:{:04x}", self.vid, self.pid)
    }
}

/// USB IDs plus the HID usage of a single top-level collection.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DeviceSignature {
    pub id: UsbId,
    pub usage_page: u16,
    pub usage: u16,
}

impl DeviceSignature {
    /// True only if every field is present in `identity` and equal to ours.
    pub fn matches(&self, identity: &DeviceIdentity) -> bool {
        let expect = |field: Option<u32>, value: u16| field == Some(u32::from(value));

        expect(identity.vendor_id, self.id.vid)
            && expect(identity.product_id, self.id.pid)
            && expect(identity.usage_page, self.usage_page)
            && expect(identity.usage, self.usage)
    }
}

impl Display for DeviceSignature {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "{} (usage {:#04x}:{:#04x})",
            self.id, self.usage_page, self.usage
        )
    }
}

/// What the HID layer could tell us about one device. Any field may be missing: the host may not
/// report it, or it may not fit the type we expect.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DeviceIdentity {
    pub product_name: Option<String>,
    pub vendor_id: Option<u32>,
    pub product_id: Option<u32>,
    pub serial_number: Option<String>,
    pub usage_page: Option<u32>,
    pub usage: Option<u32>,
    pub location_id: Option<u32>,
    pub transport: Option<String>,
}

/// Decide whether a device is the G29. Missing fields never match.
pub fn is_target(identity: &DeviceIdentity) -> bool {
    TARGET.matches(identity)
}

/// Multi-line block listing every field the HID layer reported, skipping the rest.
impl Display for DeviceIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        fn line(
            f: &mut std::fmt::Formatter,
            label: &str,
            value: Option<impl Display>,
        ) -> std::fmt::Result {
            match value {
                Some(v) => writeln!(f, "  {label}: {v}"),
                None => Ok(()),
            }
        }

        writeln!(f, "----------------- Device Info -----------------")?;
        line(f, "Product Name", self.product_name.as_deref())?;
        line(f, "Vendor ID", self.vendor_id)?;
        line(f, "Product ID", self.product_id)?;
        line(f, "Serial Number", self.serial_number.as_deref())?;
        line(f, "Usage Page", self.usage_page)?;
        line(f, "Usage", self.usage)?;
        line(f, "Location ID", self.location_id)?;
        line(f, "Transport", self.transport.as_deref())?;
        write!(f, "----------------- *********** -----------------")
    }
}
