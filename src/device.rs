use crate::usb::{pack_u16_le, unpack_u16_le, UsbClassCode, UsbDescriptorType, DEVICE_DESCRIPTOR_LENGTH};
use crate::ControlEndpoint;

/// A USB vendor ID and product ID pair.
pub struct UsbVidPid(pub u16, pub u16);

macro_rules! generate_field_setters {
    ( $( $(#[$meta:meta])* $name:ident: $type:ty, )* ) => {
        $(
            $(#[$meta])*
            pub fn $name(mut self, $name: $type) -> Self {
                self.$name = $name;
                self
            }
        )*
    }
}

/// Builder for the 18-byte device descriptor.
pub struct DeviceBuilder {
    usb_release: u16,
    device_class: UsbClassCode,
    device_sub_class: u8,
    device_protocol: u8,
    vendor_id: u16,
    product_id: u16,
    device_release: u16,
    manufacturer_string: u8,
    product_string: u8,
    serial_number_string: u8,
}

impl DeviceBuilder {
    pub fn new(vid_pid: UsbVidPid) -> Self {
        Self {
            usb_release: 0x0200,
            device_class: UsbClassCode::UseInterfaceDescriptor,
            device_sub_class: 0,
            device_protocol: 0,
            vendor_id: vid_pid.0,
            product_id: vid_pid.1,
            device_release: 0x0010,
            manufacturer_string: 0,
            product_string: 0,
            serial_number_string: 0,
        }
    }

    /// Sets the device class code assigned by USB.org. Use
    /// `UsbClassCode::VendorSpecific` for devices that do not conform to
    /// any class.
    ///
    /// Default: `UseInterfaceDescriptor` (class code specified by interfaces)
    pub fn device_class(mut self, device_class: UsbClassCode) -> Self {
        self.device_class = device_class;
        self
    }

    generate_field_setters! {
        /// Sets the supported USB version in BCD.
        ///
        /// Default: `0x0200` ("2.0")
        usb_release: u16,

        /// Sets the device sub-class code. Depends on class.
        ///
        /// Default: `0x00`
        device_sub_class: u8,

        /// Sets the device protocol code. Depends on class and sub-class.
        ///
        /// Default: `0x00`
        device_protocol: u8,

        /// Sets the device release version in BCD.
        ///
        /// Default: `0x0010` ("0.1")
        device_release: u16,

        /// Sets the string index reported for the manufacturer name.
        /// Index 0 means no string; resolving indices to text is the
        /// enumerator's concern.
        ///
        /// Default: 0
        manufacturer_string: u8,

        /// Sets the string index reported for the product name.
        ///
        /// Default: 0
        product_string: u8,

        /// Sets the string index reported for the serial number.
        ///
        /// Default: 0
        serial_number_string: u8,
    }

    /// Packs the descriptor. `bMaxPacketSize0` is a transport property and
    /// is resolved from the control endpoint rather than supplied;
    /// `num_configurations` comes from the enumeration context that owns
    /// the configuration list.
    pub fn build(self, control: &dyn ControlEndpoint, num_configurations: u8) -> DeviceDescriptor {
        let usb_release = pack_u16_le(self.usb_release);
        let vendor_id = pack_u16_le(self.vendor_id);
        let product_id = pack_u16_le(self.product_id);
        let device_release = pack_u16_le(self.device_release);

        DeviceDescriptor {
            packed: [
                DEVICE_DESCRIPTOR_LENGTH as u8,  // bLength
                UsbDescriptorType::Device as u8, // bDescriptorType
                usb_release[0],
                usb_release[1],           // bcdUSB
                self.device_class as u8,  // bDeviceClass
                self.device_sub_class,    // bDeviceSubClass
                self.device_protocol,     // bDeviceProtocol
                control.max_packet_size(), // bMaxPacketSize0
                vendor_id[0],
                vendor_id[1], // idVendor
                product_id[0],
                product_id[1], // idProduct
                device_release[0],
                device_release[1],         // bcdDevice
                self.manufacturer_string,  // iManufacturer
                self.product_string,       // iProduct
                self.serial_number_string, // iSerialNumber
                num_configurations,        // bNumConfigurations
            ],
        }
    }
}

/// The packed 18-byte device descriptor. A fixed-size leaf: no children,
/// and the bytes are a pure function of the builder's fields.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct DeviceDescriptor {
    packed: [u8; DEVICE_DESCRIPTOR_LENGTH],
}

impl DeviceDescriptor {
    /// The packed descriptor record, ready for the wire.
    pub fn packed(&self) -> &[u8; DEVICE_DESCRIPTOR_LENGTH] {
        &self.packed
    }

    pub fn vendor_id(&self) -> u16 {
        unpack_u16_le([self.packed[8], self.packed[9]])
    }

    pub fn product_id(&self) -> u16 {
        unpack_u16_le([self.packed[10], self.packed[11]])
    }

    pub fn max_packet_size(&self) -> u8 {
        self.packed[7]
    }

    pub fn num_configurations(&self) -> u8 {
        self.packed[17]
    }
}
