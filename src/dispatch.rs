use failure::Error;
use log::debug;

use crate::configuration::Configuration;
use crate::device::DeviceDescriptor;
use crate::error::DescriptorError;

/// Consumer of the serialized descriptor stream. `accept` is called once
/// per contiguous chunk, in strict emission order, and must not fail: the
/// transport decides what a chunk becomes (a control-transfer data stage,
/// a staging buffer, a capture).
///
/// Any `FnMut(&[u8])` closure is a sink.
pub trait DescriptorSink {
    fn accept(&mut self, bytes: &[u8]);
}

impl<F: FnMut(&[u8])> DescriptorSink for F {
    fn accept(&mut self, bytes: &[u8]) {
        self(bytes)
    }
}

/// Streams the full tree for enumeration: the device descriptor first,
/// then every configuration with its interfaces and endpoints.
///
/// Configuration values are late-bound: they are assigned here, at write
/// time, counting from 1 in slice order, so the same `Configuration` can
/// be reported under different numbers by different device contexts.
pub fn write_device_tree<S: DescriptorSink>(
    device: &DeviceDescriptor,
    configurations: &[Configuration],
    sink: &mut S,
) -> Result<(), Error> {
    if usize::from(device.num_configurations()) != configurations.len() {
        return Err(DescriptorError::NotSupportedConfiguration {
            reason: "device descriptor names a different configuration count",
        }
        .into());
    }

    sink.accept(device.packed());
    for (index, configuration) in configurations.iter().enumerate() {
        let number = index as u8 + 1;
        debug!("reporting configuration {}", number);
        configuration.assign_number(number);
        configuration.write_descriptors(sink);
    }
    Ok(())
}
