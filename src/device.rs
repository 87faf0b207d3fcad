//! Device identities: the static table of devices we install for, the
//! records produced by enumeration, and the working descriptor handed to
//! the install primitives.

/// One VID/PID identity this installer targets.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct KnownDevice {
    /// The Vendor ID (idVendor) assigned to the device.
    pub vendor_id: u16,

    /// The Product ID (idProduct) associated with the device.
    pub product_id: u16,
}

/// Every device identity we install for: the adapters themselves plus the
/// Atmel bootloader identities they report during a firmware upgrade.
/// VID/PID pairs are mutually exclusive in practice, so order carries no
/// precedence.
pub const KNOWN_DEVICES: [KnownDevice; 6] = [
    // xu1541
    KnownDevice { vendor_id: 0x0403, product_id: 0xc632 },
    // xum1541 / ZoomFloppy
    KnownDevice { vendor_id: 0x16d0, product_id: 0x0504 },
    // Atmel firmware upgrade, ATmega32U2
    KnownDevice { vendor_id: 0x03eb, product_id: 0x2ff0 },
    // Atmel firmware upgrade, ATmega32U4
    KnownDevice { vendor_id: 0x03eb, product_id: 0x2ff4 },
    // Atmel firmware upgrade, AT90USB162
    KnownDevice { vendor_id: 0x03eb, product_id: 0x2ffa },
    // Atmel firmware upgrade, AT90USB1287
    KnownDevice { vendor_id: 0x03eb, product_id: 0x2ffb },
];

/// Contains known information for one enumerated device, as reported by the
/// backend's device listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceInfo {
    /// The Vendor ID (idVendor) assigned to the device.
    pub vendor_id: u16,

    /// The Product ID (idProduct) associated with the device.
    pub product_id: u16,

    /// The interface number (`MI_xx`) if this entry is a sub-interface of a
    /// composite device; 0 otherwise.
    pub interface: u8,

    /// Whether this entry belongs to a composite device.
    pub is_composite: bool,

    /// The Windows hardware ID for the device, if one was reported.
    pub hardware_id: Option<String>,

    /// The Windows device instance ID, if one was reported.
    pub device_id: Option<String>,

    /// The device description string, if one was reported.
    pub description: Option<String>,
}

/// The working descriptor the install primitives operate on.
///
/// One descriptor is reused across the whole run: the match loop rewrites
/// `vendor_id`/`product_id` from the known-device table and
/// `hardware_id`/`device_id` from the enumerated device, while `interface`
/// and `is_composite` keep whatever the descriptor already carries. An
/// install call is only ever issued for a descriptor populated this way, or
/// for the untouched default when no device matched at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetDevice {
    pub vendor_id: u16,
    pub product_id: u16,
    pub is_composite: bool,
    pub interface: u8,
    pub description: String,
    pub hardware_id: Option<String>,
    pub device_id: Option<String>,
}

impl Default for TargetDevice {
    /// The primary device identity: the xum1541/ZoomFloppy, which is also
    /// what the fallback install targets when nothing is plugged in.
    fn default() -> Self {
        TargetDevice {
            vendor_id: 0x16d0,
            product_id: 0x0504,
            is_composite: false,
            interface: 0,
            description: "OpenCBM devices".to_string(),
            hardware_id: None,
            device_id: None,
        }
    }
}

impl TargetDevice {
    /// Whether `candidate` matches the known identity `entry`, given this
    /// descriptor's current state.
    ///
    /// VID and PID come fresh from the table entry under test, but the
    /// interface number and composite flag are compared against the
    /// descriptor itself -- they persist across table entries rather than
    /// being part of the table. Matching on VID/PID alone is not enough.
    pub fn matches(&self, entry: &KnownDevice, candidate: &DeviceInfo) -> bool {
        candidate.vendor_id == entry.vendor_id
            && candidate.product_id == entry.product_id
            && candidate.interface == self.interface
            && candidate.is_composite == self.is_composite
    }

    /// Rewrites this descriptor for an install aimed at `candidate`, which
    /// matched the known identity `entry`.
    pub fn adopt(&mut self, entry: &KnownDevice, candidate: &DeviceInfo) {
        self.vendor_id = entry.vendor_id;
        self.product_id = entry.product_id;
        self.hardware_id = candidate.hardware_id.clone();
        self.device_id = candidate.device_id.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(vendor_id: u16, product_id: u16) -> DeviceInfo {
        DeviceInfo {
            vendor_id,
            product_id,
            ..Default::default()
        }
    }

    #[test]
    fn matches_on_all_four_fields() {
        let target = TargetDevice::default();
        let entry = KnownDevice { vendor_id: 0x0403, product_id: 0xc632 };

        assert!(target.matches(&entry, &candidate(0x0403, 0xc632)));
        assert!(!target.matches(&entry, &candidate(0x0403, 0xc633)));
        assert!(!target.matches(&entry, &candidate(0x0402, 0xc632)));
    }

    #[test]
    fn interface_and_composite_come_from_the_descriptor() {
        let entry = KnownDevice { vendor_id: 0x16d0, product_id: 0x0504 };

        let mut plain = candidate(0x16d0, 0x0504);
        plain.interface = 1;
        let target = TargetDevice::default();
        assert!(!target.matches(&entry, &plain));

        // A composite sub-interface only matches a descriptor that already
        // carries the same mi/composite state.
        let mut composite = candidate(0x16d0, 0x0504);
        composite.interface = 1;
        composite.is_composite = true;
        assert!(!target.matches(&entry, &composite));

        let shifted = TargetDevice {
            interface: 1,
            is_composite: true,
            ..Default::default()
        };
        assert!(shifted.matches(&entry, &composite));
    }

    #[test]
    fn adopt_copies_table_identity_and_enumerated_ids() {
        let entry = KnownDevice { vendor_id: 0x0403, product_id: 0xc632 };
        let mut found = candidate(0x0403, 0xc632);
        found.hardware_id = Some("USB\\VID_0403&PID_C632".to_string());
        found.device_id = Some("USB\\VID_0403&PID_C632\\12345".to_string());

        let mut target = TargetDevice::default();
        target.adopt(&entry, &found);

        assert_eq!(target.vendor_id, 0x0403);
        assert_eq!(target.product_id, 0xc632);
        assert_eq!(target.hardware_id, found.hardware_id);
        assert_eq!(target.device_id, found.device_id);

        // The fields the match predicate reads stay put.
        assert_eq!(target.interface, 0);
        assert!(!target.is_composite);
    }

    #[test]
    fn known_table_has_no_duplicates() {
        for (i, a) in KNOWN_DEVICES.iter().enumerate() {
            for b in &KNOWN_DEVICES[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
