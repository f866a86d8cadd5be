use crate::Result;
use crate::device::Device;
use crate::hal::{self, Api, RootSignatureDesc};

/// Shader binding layout, shared by every pipeline built against it.
pub struct RootSignature<A: Api> {
    raw: A::RootSignature,
    desc: RootSignatureDesc,
}

impl<A: Api> RootSignature<A> {
    /// Serializes `desc` and creates the device object from the blob.
    pub fn new(device: &Device<A>, desc: RootSignatureDesc) -> Result<Self> {
        let blob = A::serialize_root_signature(&desc)?;
        let raw = hal::Device::create_root_signature(device.raw(), &blob)?;
        Ok(Self { raw, desc })
    }

    /// No parameters; input assembler allowed.
    pub fn empty(device: &Device<A>) -> Result<Self> {
        Self::new(device, RootSignatureDesc::empty())
    }

    pub fn raw(&self) -> &A::RootSignature {
        &self.raw
    }

    pub fn desc(&self) -> &RootSignatureDesc {
        &self.desc
    }
}
