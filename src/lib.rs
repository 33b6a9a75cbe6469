pub use usb_device::endpoint::{EndpointAddress, EndpointType};
pub use usb_device::UsbDirection;

pub mod configuration;
pub mod device;
pub mod dispatch;
pub mod endpoint;
pub mod error;
pub mod interface;
pub mod usb;

use failure::Error;

use crate::endpoint::EndpointDescriptor;

/// The always-present bidirectional endpoint zero, supplied by the
/// transport. Interfaces borrow it to announce alternate-setting switches
/// and for control-transfer I/O; the device descriptor reads the control
/// packet size from it. The owning device context must outlive every
/// interface holding the reference.
pub trait ControlEndpoint {
    /// Maximum control packet size the transport supports (8, 16, 32 or 64
    /// bytes per the USB specification).
    fn max_packet_size(&self) -> u8;

    /// Announces that `interface_number` switched to alternate setting
    /// `setting_number`. Errors are propagated to whoever requested the
    /// switch, which then does not happen.
    fn notify_setting_changed(&self, interface_number: u8, setting_number: u8)
        -> Result<(), Error>;

    /// Queues `buf` for transmission on the control endpoint and returns
    /// the number of bytes accepted.
    fn write(&self, buf: &[u8]) -> Result<usize, Error>;

    /// Reads pending control-endpoint data into `buf` and returns the
    /// number of bytes read.
    fn read(&self, buf: &mut [u8]) -> Result<usize, Error>;
}

pub trait EndpointInfo {
    fn descriptor(&self) -> &EndpointDescriptor;

    fn address(&self) -> EndpointAddress {
        self.descriptor().address()
    }

    fn ep_type(&self) -> EndpointType {
        match self.descriptor().attributes() & 0b11 {
            0b00 => EndpointType::Control,
            0b01 => EndpointType::Isochronous,
            0b10 => EndpointType::Bulk,
            0b11 => EndpointType::Interrupt,
            _ => unreachable!(),
        }
    }

    fn direction(&self) -> UsbDirection {
        self.address().direction()
    }
}

impl EndpointInfo for EndpointDescriptor {
    fn descriptor(&self) -> &EndpointDescriptor {
        self
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::cell::{Cell, RefCell};

    use failure::{bail, Error};

    use crate::ControlEndpoint;

    /// Control endpoint stand-in recording notifications and writes.
    pub struct MockControlEndpoint {
        max_packet_size: u8,
        refuse_notifications: Cell<bool>,
        notifications: RefCell<Vec<(u8, u8)>>,
        written: RefCell<Vec<u8>>,
    }

    impl MockControlEndpoint {
        pub fn new(max_packet_size: u8) -> Self {
            Self {
                max_packet_size,
                refuse_notifications: Cell::new(false),
                notifications: RefCell::new(Vec::new()),
                written: RefCell::new(Vec::new()),
            }
        }

        pub fn refuse_notifications(&self, refuse: bool) {
            self.refuse_notifications.set(refuse);
        }

        pub fn notifications(&self) -> Vec<(u8, u8)> {
            self.notifications.borrow().clone()
        }

        pub fn written(&self) -> Vec<u8> {
            self.written.borrow().clone()
        }
    }

    impl ControlEndpoint for MockControlEndpoint {
        fn max_packet_size(&self) -> u8 {
            self.max_packet_size
        }

        fn notify_setting_changed(
            &self,
            interface_number: u8,
            setting_number: u8,
        ) -> Result<(), Error> {
            if self.refuse_notifications.get() {
                bail!("control endpoint refused the setting change");
            }
            self.notifications
                .borrow_mut()
                .push((interface_number, setting_number));
            Ok(())
        }

        fn write(&self, buf: &[u8]) -> Result<usize, Error> {
            self.written.borrow_mut().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn read(&self, _buf: &mut [u8]) -> Result<usize, Error> {
            Ok(0)
        }
    }
}
