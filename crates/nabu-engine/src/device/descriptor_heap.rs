use super::Device;
use crate::hal::{self, Api, CpuDescriptor, DescriptorHeapDesc, DescriptorHeapKind};
use crate::{Error, Result};

/// A contiguous array of descriptors of one kind.
pub struct DescriptorHeap<A: Api> {
    raw: A::DescriptorHeap,
    kind: DescriptorHeapKind,
    count: u32,
    increment: u32,
}

impl<A: Api> DescriptorHeap<A> {
    pub fn new(device: &Device<A>, kind: DescriptorHeapKind, count: u32) -> Result<Self> {
        let raw = hal::Device::create_descriptor_heap(
            device.raw(),
            &DescriptorHeapDesc {
                kind,
                count,
                shader_visible: false,
            },
        )?;
        let increment = hal::Device::descriptor_increment(device.raw(), kind);
        Ok(Self {
            raw,
            kind,
            count,
            increment,
        })
    }

    pub fn raw(&self) -> &A::DescriptorHeap {
        &self.raw
    }

    pub fn kind(&self) -> DescriptorHeapKind {
        self.kind
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    /// Stride between consecutive descriptors, in bytes.
    pub fn increment(&self) -> u32 {
        self.increment
    }

    /// CPU handle of descriptor `index`.
    pub fn handle(&self, index: u32) -> Result<CpuDescriptor> {
        if index >= self.count {
            return Err(Error::DescriptorOutOfRange {
                index,
                count: self.count,
            });
        }
        Ok(hal::DescriptorHeap::cpu_start(&self.raw).offset(index, self.increment))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;

    #[test]
    fn handles_are_spaced_by_increment() {
        let device = testing::device();
        let heap = DescriptorHeap::new(&device, DescriptorHeapKind::Rtv, 3).unwrap();

        let h0 = heap.handle(0).unwrap();
        let h2 = heap.handle(2).unwrap();
        assert_eq!(h2.ptr - h0.ptr, 2 * heap.increment() as usize);
    }

    #[test]
    fn out_of_range_index_is_rejected() {
        let device = testing::device();
        let heap = DescriptorHeap::new(&device, DescriptorHeapKind::Rtv, 2).unwrap();
        assert!(matches!(
            heap.handle(2),
            Err(Error::DescriptorOutOfRange { index: 2, count: 2 })
        ));
    }
}
