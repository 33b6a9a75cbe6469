use failure::{bail, Error};

/// Maximum number of endpoints in one direction. Specified by the USB specification.
pub const USB_MAX_ENDPOINTS: usize = 16;

/// Fixed size of the packed device descriptor.
pub const DEVICE_DESCRIPTOR_LENGTH: usize = 18;
/// Fixed size of the configuration descriptor header, excluding children.
pub const CONFIGURATION_DESCRIPTOR_LENGTH: usize = 9;
/// Fixed size of the interface descriptor header, excluding endpoints.
pub const INTERFACE_DESCRIPTOR_LENGTH: usize = 9;
/// Fixed size of a packed endpoint descriptor.
pub const ENDPOINT_DESCRIPTOR_LENGTH: usize = 7;

/// Standard descriptor types
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum UsbDescriptorType {
    Device = 1,
    Configuration = 2,
    String = 3,
    Interface = 4,
    Endpoint = 5,
}

/// Class codes assigned by USB.org, used in device and interface descriptors.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum UsbClassCode {
    /// Use class information in the interface descriptors.
    UseInterfaceDescriptor = 0x00,
    Audio = 0x01,
    CdcControl = 0x02,
    Hid = 0x03,
    Physical = 0x05,
    Image = 0x06,
    Printer = 0x07,
    MassStorage = 0x08,
    Hub = 0x09,
    CdcData = 0x0a,
    SmartCard = 0x0b,
    ContentSecurity = 0x0d,
    Video = 0x0e,
    PersonalHealthcare = 0x0f,
    AudioVideo = 0x10,
    Billboard = 0x11,
    UsbCBridge = 0x12,
    BulkDisplay = 0x13,
    Mctp = 0x14,
    I3c = 0x3c,
    Diagnostic = 0xdc,
    WirelessController = 0xe0,
    Misc = 0xef,
    ApplicationSpecific = 0xfe,
    VendorSpecific = 0xff,
}

impl UsbClassCode {
    /// Whether this class code may appear in an interface descriptor.
    /// `UseInterfaceDescriptor`, `Hub` and `Billboard` are only meaningful
    /// at the device level.
    pub fn permitted_in_interface(self) -> bool {
        match self {
            UsbClassCode::UseInterfaceDescriptor | UsbClassCode::Hub | UsbClassCode::Billboard => {
                false
            }
            _ => true,
        }
    }
}

/// Packs `value` as two little-endian bytes, the wire order of every
/// multi-byte descriptor field.
pub fn pack_u16_le(value: u16) -> [u8; 2] {
    [(value & 0xff) as u8, (value >> 8) as u8]
}

/// Inverse of `pack_u16_le`.
pub fn unpack_u16_le(bytes: [u8; 2]) -> u16 {
    u16::from(bytes[0]) | u16::from(bytes[1]) << 8
}

/// Four-byte analogue of `pack_u16_le`.
pub fn pack_u32_le(value: u32) -> [u8; 4] {
    [
        (value & 0xff) as u8,
        (value >> 8 & 0xff) as u8,
        (value >> 16 & 0xff) as u8,
        (value >> 24) as u8,
    ]
}

/// Packs `string` as a string descriptor: length and type header followed
/// by UTF-16LE code units. Index assignment and lookup belong to the
/// enumerator; this only produces the wire bytes.
pub fn pack_string_descriptor(string: &str) -> Result<Vec<u8>, Error> {
    let units = string.encode_utf16().count();
    let length = 2 + 2 * units;
    if length > usize::from(u8::max_value()) {
        bail!("string of {} UTF-16 units does not fit a descriptor", units);
    }

    let mut buf = Vec::with_capacity(length);
    buf.push(length as u8);
    buf.push(UsbDescriptorType::String as u8);
    string
        .encode_utf16()
        .for_each(|unit| buf.extend_from_slice(&pack_u16_le(unit)));
    Ok(buf)
}

/// Packs string descriptor zero, the list of LANGID codes the device
/// supports (`usb_device::descriptor::lang_id` has the common values).
pub fn pack_language_id_descriptor(lang_ids: &[u16]) -> Result<Vec<u8>, Error> {
    if lang_ids.is_empty() {
        bail!("a device must report at least one language id");
    }
    let length = 2 + 2 * lang_ids.len();
    if length > usize::from(u8::max_value()) {
        bail!("{} language ids do not fit a descriptor", lang_ids.len());
    }

    let mut buf = Vec::with_capacity(length);
    buf.push(length as u8);
    buf.push(UsbDescriptorType::String as u8);
    lang_ids
        .iter()
        .for_each(|id| buf.extend_from_slice(&pack_u16_le(*id)));
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use usb_device::descriptor::lang_id;

    #[test]
    fn pack_u16_le_is_little_endian() {
        assert_eq!(pack_u16_le(0x1234), [0x34, 0x12]);
        assert_eq!(pack_u16_le(0x00ff), [0xff, 0x00]);
    }

    #[test]
    fn pack_u16_le_round_trips() {
        for value in 0..=u16::max_value() {
            assert_eq!(unpack_u16_le(pack_u16_le(value)), value);
        }
    }

    #[test]
    fn pack_u32_le_is_little_endian() {
        assert_eq!(pack_u32_le(0x1234_5678), [0x78, 0x56, 0x34, 0x12]);
    }

    #[test]
    fn string_descriptor_is_utf16le_with_header() {
        let bytes = pack_string_descriptor("Mock").unwrap();
        assert_eq!(
            bytes,
            vec![0x0a, 0x03, b'M', 0x00, b'o', 0x00, b'c', 0x00, b'k', 0x00]
        );
    }

    #[test]
    fn string_descriptor_rejects_overlong_strings() {
        let long = "x".repeat(127);
        assert!(pack_string_descriptor(&long).is_err());
        // 126 units still fits: 2 + 2 * 126 = 254.
        assert!(pack_string_descriptor(&long[..126]).is_ok());
    }

    #[test]
    fn language_id_descriptor_lists_langids() {
        let bytes = pack_language_id_descriptor(&[lang_id::ENGLISH_US]).unwrap();
        assert_eq!(bytes, vec![0x04, 0x03, 0x09, 0x04]);

        assert!(pack_language_id_descriptor(&[]).is_err());
    }

    #[test]
    fn interface_class_code_validity() {
        assert!(!UsbClassCode::UseInterfaceDescriptor.permitted_in_interface());
        assert!(!UsbClassCode::Hub.permitted_in_interface());
        assert!(!UsbClassCode::Billboard.permitted_in_interface());
        assert!(UsbClassCode::MassStorage.permitted_in_interface());
        assert!(UsbClassCode::VendorSpecific.permitted_in_interface());
    }
}
