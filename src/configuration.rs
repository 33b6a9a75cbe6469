use std::cell::{Cell, RefCell};

use bit_field::BitField;
use failure::Error;

use crate::dispatch::DescriptorSink;
use crate::error::DescriptorError;
use crate::interface::Interface;
use crate::usb::{pack_u16_le, unpack_u16_le, UsbDescriptorType, CONFIGURATION_DESCRIPTOR_LENGTH};

/// The two caller-controlled attribute bits of configuration header byte 7.
/// Bit 7 of that byte is reserved and always set.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct ConfigAttributes {
    pub self_powered: bool,
    pub remote_wakeup: bool,
}

/// A configuration descriptor over an ordered collection of interfaces.
///
/// The interfaces are borrowed, not owned; the caller manages their
/// lifetime and their slice order is the wire order. Hosts parse the
/// configuration as one flat byte stream, so that order also implies the
/// interface numbering the host reconstructs.
///
/// `wTotalLength` (header bytes 2-3) depends on each interface's currently
/// selected alternate setting, so it is refreshed from the tree whenever
/// it is observed. Every other accessor decodes the packed header
/// directly: the reported values and the wire bytes cannot disagree.
pub struct Configuration<'a> {
    interfaces: &'a [RefCell<Interface<'a>>],
    packed: Cell<[u8; CONFIGURATION_DESCRIPTOR_LENGTH]>,
}

impl<'a> Configuration<'a> {
    /// `max_power` is in units of 2 mA, as on the wire. Byte 5, the
    /// configuration value, is left for the enumerator to assign at write
    /// time: the same configuration may be reported under different
    /// numbers across composite-device contexts.
    pub fn new(
        interfaces: &'a [RefCell<Interface<'a>>],
        self_powered: bool,
        remote_wakeup: bool,
        max_power: u8,
    ) -> Result<Self, Error> {
        if interfaces.len() > usize::from(u8::max_value()) {
            return Err(DescriptorError::NotSupportedConfiguration {
                reason: "interface count does not fit the descriptor field",
            }
            .into());
        }

        let mut packed = [0; CONFIGURATION_DESCRIPTOR_LENGTH];
        packed[0] = CONFIGURATION_DESCRIPTOR_LENGTH as u8;
        packed[1] = UsbDescriptorType::Configuration as u8;
        packed[4] = interfaces.len() as u8;
        let mut attributes = 0x80u8; // reserved bit
        attributes.set_bit(6, self_powered);
        attributes.set_bit(5, remote_wakeup);
        packed[7] = attributes;
        packed[8] = max_power;

        let configuration = Self {
            interfaces,
            packed: Cell::new(packed),
        };
        configuration.refresh_total_length();
        Ok(configuration)
    }

    /// Recomputes `wTotalLength` from the interfaces' active settings and
    /// repacks header bytes 2-3.
    fn refresh_total_length(&self) {
        let mut total = CONFIGURATION_DESCRIPTOR_LENGTH as u16;
        for interface in self.interfaces {
            total += interface.borrow().total_length();
        }
        let bytes = pack_u16_le(total);
        let mut packed = self.packed.get();
        packed[2] = bytes[0];
        packed[3] = bytes[1];
        self.packed.set(packed);
    }

    /// Size of the full serialized configuration: this header plus every
    /// interface at its currently selected setting.
    pub fn total_length(&self) -> u16 {
        self.refresh_total_length();
        let packed = self.packed.get();
        unpack_u16_le([packed[2], packed[3]])
    }

    pub fn interface_count(&self) -> u8 {
        self.packed.get()[4]
    }

    /// The configuration value most recently assigned by the enumerator,
    /// 0 until one has been.
    pub fn number(&self) -> u8 {
        self.packed.get()[5]
    }

    /// Writes the configuration value (header byte 5). Called by the
    /// enumerator when the tree is reported to a host.
    pub fn assign_number(&self, number: u8) {
        let mut packed = self.packed.get();
        packed[5] = number;
        self.packed.set(packed);
    }

    pub fn attributes(&self) -> ConfigAttributes {
        let attributes = self.packed.get()[7];
        ConfigAttributes {
            self_powered: attributes.get_bit(6),
            remote_wakeup: attributes.get_bit(5),
        }
    }

    pub fn max_power(&self) -> u8 {
        self.packed.get()[8]
    }

    pub fn interfaces(&self) -> &'a [RefCell<Interface<'a>>] {
        self.interfaces
    }

    /// Emits the 9-byte header, then every interface in stored order, each
    /// followed by its endpoints. Emits exactly `total_length()` bytes.
    pub fn write_descriptors<S: DescriptorSink>(&self, sink: &mut S) {
        self.refresh_total_length();
        sink.accept(&self.packed.get());
        for interface in self.interfaces {
            interface.borrow().write_descriptors(sink);
        }
    }
}
