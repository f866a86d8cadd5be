use std::ffi::c_void;

use windows::Win32::Graphics::Direct3D12::{D3D12_RANGE, ID3D12DescriptorHeap, ID3D12Heap, ID3D12Resource};

use super::ApiResultExt;
use crate::hal::{self, CpuDescriptor, HeapDesc};
use crate::{Error, Result};

pub struct Dx12Heap {
    raw: ID3D12Heap,
    desc: HeapDesc,
}

impl Dx12Heap {
    pub(super) fn new(raw: ID3D12Heap, desc: HeapDesc) -> Self {
        Self { raw, desc }
    }

    pub fn raw(&self) -> &ID3D12Heap {
        &self.raw
    }

    pub fn desc(&self) -> &HeapDesc {
        &self.desc
    }
}

pub struct Dx12Resource {
    raw: ID3D12Resource,
}

impl Dx12Resource {
    pub(super) fn new(raw: ID3D12Resource) -> Self {
        Self { raw }
    }

    pub fn raw(&self) -> &ID3D12Resource {
        &self.raw
    }

    fn map(&self, read_range: &D3D12_RANGE) -> Result<*mut u8> {
        let mut data: *mut c_void = std::ptr::null_mut();
        unsafe { self.raw.Map(0, Some(read_range), Some(&mut data)) }
            .api("ID3D12Resource::Map", "failed to map resource")?;
        if data.is_null() {
            return Err(Error::os_handle("ID3D12Resource::Map", "mapped pointer is null", "null"));
        }
        Ok(data.cast())
    }
}

impl hal::Resource for Dx12Resource {
    fn gpu_virtual_address(&self) -> u64 {
        unsafe { self.raw.GetGPUVirtualAddress() }
    }

    fn write(&self, data: &[u8]) -> Result<()> {
        // The CPU reads nothing back.
        let dst = self.map(&D3D12_RANGE { Begin: 0, End: 0 })?;
        unsafe {
            std::ptr::copy_nonoverlapping(data.as_ptr(), dst, data.len());
            self.raw.Unmap(0, None);
        }
        Ok(())
    }

    fn read(&self, len: usize) -> Result<Vec<u8>> {
        let src = self.map(&D3D12_RANGE { Begin: 0, End: len })?;
        let bytes = unsafe { std::slice::from_raw_parts(src, len) }.to_vec();
        // Nothing was written.
        unsafe { self.raw.Unmap(0, Some(&D3D12_RANGE { Begin: 0, End: 0 })) };
        Ok(bytes)
    }
}

pub struct Dx12DescriptorHeap {
    raw: ID3D12DescriptorHeap,
}

impl Dx12DescriptorHeap {
    pub(super) fn new(raw: ID3D12DescriptorHeap) -> Self {
        Self { raw }
    }
}

impl hal::DescriptorHeap for Dx12DescriptorHeap {
    fn cpu_start(&self) -> CpuDescriptor {
        let handle = unsafe { self.raw.GetCPUDescriptorHandleForHeapStart() };
        CpuDescriptor { ptr: handle.ptr }
    }
}
