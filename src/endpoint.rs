use usb_device::endpoint::{EndpointAddress, EndpointType};

use crate::usb::{pack_u16_le, unpack_u16_le, UsbDescriptorType, ENDPOINT_DESCRIPTOR_LENGTH};

/// One communication channel of an interface: address (number plus
/// direction bit), transfer type, max packet size and polling interval,
/// packed into the fixed 7-byte endpoint descriptor record.
///
/// The packed form is computed once at construction; the accessors decode
/// it, so what they report is always what goes on the wire.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct EndpointDescriptor {
    packed: [u8; ENDPOINT_DESCRIPTOR_LENGTH],
}

impl EndpointDescriptor {
    pub fn new(
        address: EndpointAddress,
        ep_type: EndpointType,
        max_packet_size: u16,
        interval: u8,
    ) -> Self {
        let mps = pack_u16_le(max_packet_size);
        Self {
            packed: [
                ENDPOINT_DESCRIPTOR_LENGTH as u8,  // bLength
                UsbDescriptorType::Endpoint as u8, // bDescriptorType
                address.into(),                    // bEndpointAddress
                ep_type as u8,                     // bmAttributes
                mps[0],
                mps[1],   // wMaxPacketSize
                interval, // bInterval
            ],
        }
    }

    /// The packed descriptor record, ready for the wire.
    pub fn packed(&self) -> &[u8; ENDPOINT_DESCRIPTOR_LENGTH] {
        &self.packed
    }

    pub fn address(&self) -> EndpointAddress {
        self.packed[2].into()
    }

    pub fn attributes(&self) -> u8 {
        self.packed[3]
    }

    pub fn max_packet_size(&self) -> u16 {
        unpack_u16_le([self.packed[4], self.packed[5]])
    }

    pub fn interval(&self) -> u8 {
        self.packed[6]
    }
}
