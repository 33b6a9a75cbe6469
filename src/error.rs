use failure::Fail;

use crate::usb::UsbClassCode;

/// Failure conditions raised while composing the descriptor tree. All of
/// them indicate configuration mistakes detected at device bring-up, not
/// transient transfer faults, so none are retried internally and every one
/// leaves the tree exactly as it was before the offending call.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Fail)]
pub enum DescriptorError {
    /// The class code is reserved for the device level and cannot be
    /// declared by an interface setting.
    #[fail(display = "class code {:?} is not valid for an interface", class)]
    InvalidClassCode { class: UsbClassCode },

    /// The interface declares no alternate setting with this number.
    #[fail(display = "no alternate setting numbered {}", number)]
    UnknownSetting { number: u8 },

    /// Endpoint index past the active setting's endpoint count.
    #[fail(display = "endpoint index {} out of range ({} endpoints)", index, count)]
    IndexOutOfRange { index: u8, count: u8 },

    /// A structural constraint of the configuration cannot be represented
    /// on the wire.
    #[fail(display = "configuration not supported: {}", reason)]
    NotSupportedConfiguration { reason: &'static str },
}
