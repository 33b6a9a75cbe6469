use failure::Error;
use log::debug;

use crate::dispatch::DescriptorSink;
use crate::endpoint::EndpointDescriptor;
use crate::error::DescriptorError;
use crate::usb::{
    UsbClassCode, UsbDescriptorType, ENDPOINT_DESCRIPTOR_LENGTH, INTERFACE_DESCRIPTOR_LENGTH,
};
use crate::ControlEndpoint;

const DEFAULT_SETTING_NUMBER: u8 = 0;

/// One class/subclass/protocol tuple an interface can switch to at run
/// time, together with the endpoints it exposes while selected.
///
/// Immutable once constructed. The endpoint storage is borrowed from the
/// caller; its length is the setting's endpoint count.
#[derive(Clone, Copy, Debug)]
pub struct AlternateSetting<'a> {
    class: UsbClassCode,
    sub_class: u8,
    protocol: u8,
    string_index: u8,
    endpoints: &'a [EndpointDescriptor],
}

impl<'a> AlternateSetting<'a> {
    pub fn new(
        class: UsbClassCode,
        sub_class: u8,
        protocol: u8,
        string_index: u8,
        endpoints: &'a [EndpointDescriptor],
    ) -> Result<Self, Error> {
        if !class.permitted_in_interface() {
            return Err(DescriptorError::InvalidClassCode { class }.into());
        }
        if endpoints.len() > usize::from(u8::max_value()) {
            return Err(DescriptorError::NotSupportedConfiguration {
                reason: "endpoint count does not fit the descriptor field",
            }
            .into());
        }
        Ok(Self {
            class,
            sub_class,
            protocol,
            string_index,
            endpoints,
        })
    }

    pub fn endpoint_count(&self) -> u8 {
        self.endpoints.len() as u8
    }

    pub fn class(&self) -> UsbClassCode {
        self.class
    }

    pub fn sub_class(&self) -> u8 {
        self.sub_class
    }

    pub fn protocol(&self) -> u8 {
        self.protocol
    }

    pub fn string_index(&self) -> u8 {
        self.string_index
    }

    pub fn endpoints(&self) -> &'a [EndpointDescriptor] {
        self.endpoints
    }
}

/// Keyed alternate-setting storage over caller-supplied `(number, setting)`
/// pairs. The entry numbered 0 is the default and must be present, numbers
/// are unique, and entry order carries no meaning.
#[derive(Clone, Copy, Debug)]
pub struct SettingsMap<'a> {
    entries: &'a [(u8, AlternateSetting<'a>)],
}

impl<'a> SettingsMap<'a> {
    pub fn new(entries: &'a [(u8, AlternateSetting<'a>)]) -> Result<Self, Error> {
        if entries.is_empty() {
            return Err(DescriptorError::NotSupportedConfiguration {
                reason: "an interface needs at least one alternate setting",
            }
            .into());
        }
        for (i, (number, _)) in entries.iter().enumerate() {
            if entries[..i].iter().any(|(other, _)| other == number) {
                return Err(DescriptorError::NotSupportedConfiguration {
                    reason: "duplicate alternate setting number",
                }
                .into());
            }
        }

        let map = Self { entries };
        if map.get(DEFAULT_SETTING_NUMBER).is_none() {
            return Err(DescriptorError::UnknownSetting {
                number: DEFAULT_SETTING_NUMBER,
            }
            .into());
        }
        Ok(map)
    }

    pub fn get(&self, number: u8) -> Option<AlternateSetting<'a>> {
        self.entries
            .iter()
            .find(|(other, _)| *other == number)
            .map(|(_, setting)| *setting)
    }

    /// The entry numbered 0. Guaranteed present by `new`.
    pub fn default_setting(&self) -> AlternateSetting<'a> {
        match self.get(DEFAULT_SETTING_NUMBER) {
            Some(setting) => setting,
            None => unreachable!(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// An interface descriptor and its alternate settings.
///
/// The 9-byte header is packed at construction for setting 0; switching
/// settings repacks bytes 4-8 in place. The control endpoint reference is
/// borrowed: the device context owning it must outlive the interface, and
/// callers serialize `select_setting` across interfaces sharing one
/// control endpoint.
pub struct Interface<'a> {
    packed: [u8; INTERFACE_DESCRIPTOR_LENGTH],
    settings: SettingsMap<'a>,
    selected_setting: u8,
    active: AlternateSetting<'a>,
    control: &'a dyn ControlEndpoint,
}

impl<'a> Interface<'a> {
    /// `interface_number` identifies this interface within its
    /// configuration and is fixed for the interface's lifetime. The map
    /// has already established that setting 0 exists, so construction
    /// cannot fail.
    pub fn new(
        interface_number: u8,
        control: &'a dyn ControlEndpoint,
        settings: SettingsMap<'a>,
    ) -> Self {
        let active = settings.default_setting();
        let mut packed = [0; INTERFACE_DESCRIPTOR_LENGTH];
        packed[0] = INTERFACE_DESCRIPTOR_LENGTH as u8;
        packed[1] = UsbDescriptorType::Interface as u8;
        packed[2] = interface_number;
        packed[3] = DEFAULT_SETTING_NUMBER; // bAlternateSetting
        packed[4] = active.endpoint_count();
        packed[5] = active.class() as u8;
        packed[6] = active.sub_class();
        packed[7] = active.protocol();
        packed[8] = active.string_index();

        Self {
            packed,
            settings,
            selected_setting: DEFAULT_SETTING_NUMBER,
            active,
            control,
        }
    }

    /// Makes setting `number` the active one: announces the switch on the
    /// control endpoint, then repacks header bytes 4-8 from the new
    /// setting. On any failure, unknown number or refused notification,
    /// the previously active setting and header stay untouched.
    pub fn select_setting(&mut self, number: u8) -> Result<(), Error> {
        let setting = self
            .settings
            .get(number)
            .ok_or(DescriptorError::UnknownSetting { number })?;

        // Notify before mutating: a refused switch must not change state.
        self.control
            .notify_setting_changed(self.interface_number(), number)?;

        self.packed[4] = setting.endpoint_count();
        self.packed[5] = setting.class() as u8;
        self.packed[6] = setting.sub_class();
        self.packed[7] = setting.protocol();
        self.packed[8] = setting.string_index();
        self.selected_setting = number;
        self.active = setting;
        debug!(
            "interface {}: alternate setting {} selected",
            self.interface_number(),
            number
        );
        Ok(())
    }

    /// The endpoint at `index` within the active setting.
    pub fn acquire_endpoint(&self, index: u8) -> Result<&'a EndpointDescriptor, Error> {
        self.active.endpoints().get(usize::from(index)).ok_or_else(|| {
            DescriptorError::IndexOutOfRange {
                index,
                count: self.active.endpoint_count(),
            }
            .into()
        })
    }

    /// Feeds the packed header to `sink`, then every endpoint of the
    /// active setting in ascending index order. Emits exactly
    /// `total_length()` bytes.
    pub fn write_descriptors<S: DescriptorSink>(&self, sink: &mut S) {
        sink.accept(&self.packed);
        for endpoint in self.active.endpoints() {
            sink.accept(endpoint.packed());
        }
    }

    /// Serialized size of this interface at its active setting: the header
    /// plus one fixed 7-byte record per endpoint.
    pub fn total_length(&self) -> u16 {
        (INTERFACE_DESCRIPTOR_LENGTH + ENDPOINT_DESCRIPTOR_LENGTH * self.active.endpoints().len())
            as u16
    }

    pub fn interface_number(&self) -> u8 {
        self.packed[2]
    }

    pub fn selected_setting_number(&self) -> u8 {
        self.selected_setting
    }

    pub fn setting(&self, number: u8) -> Result<AlternateSetting<'a>, Error> {
        self.settings
            .get(number)
            .ok_or_else(|| DescriptorError::UnknownSetting { number }.into())
    }

    /// The packed 9-byte header as it would go on the wire.
    pub fn packed(&self) -> &[u8; INTERFACE_DESCRIPTOR_LENGTH] {
        &self.packed
    }

    pub fn control_write(&self, buf: &[u8]) -> Result<usize, Error> {
        self.control.write(buf)
    }

    pub fn control_read(&self, buf: &mut [u8]) -> Result<usize, Error> {
        self.control.read(buf)
    }
}
