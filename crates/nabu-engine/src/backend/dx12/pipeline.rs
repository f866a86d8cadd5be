use std::ffi::CString;

use windows::Win32::Graphics::Direct3D12::{
    D3D12_INPUT_ELEMENT_DESC, D3D12_SHADER_BYTECODE, ID3D12PipelineState, ID3D12RootSignature,
};
use windows::core::PCSTR;

use super::conv;
use crate::hal::{InputElement, ShaderBlob};
use crate::{Error, Result};

pub struct Dx12RootSignature {
    raw: ID3D12RootSignature,
}

impl Dx12RootSignature {
    pub(super) fn new(raw: ID3D12RootSignature) -> Self {
        Self { raw }
    }

    pub fn raw(&self) -> &ID3D12RootSignature {
        &self.raw
    }
}

pub struct Dx12PipelineState {
    raw: ID3D12PipelineState,
}

impl Dx12PipelineState {
    pub(super) fn new(raw: ID3D12PipelineState) -> Self {
        Self { raw }
    }

    pub fn raw(&self) -> &ID3D12PipelineState {
        &self.raw
    }
}

pub(super) fn bytecode(blob: Option<&ShaderBlob>) -> D3D12_SHADER_BYTECODE {
    match blob {
        Some(blob) => D3D12_SHADER_BYTECODE {
            pShaderBytecode: blob.bytes.as_ptr().cast(),
            BytecodeLength: blob.bytes.len(),
        },
        None => D3D12_SHADER_BYTECODE::default(),
    }
}

/// NUL-terminated copies of the semantic names; must outlive the element descs.
pub(super) fn semantic_names(layout: &[InputElement]) -> Result<Vec<CString>> {
    layout
        .iter()
        .map(|element| {
            CString::new(element.semantic_name)
                .map_err(|_| Error::InvalidArgument(format!("semantic name {:?} contains NUL", element.semantic_name)))
        })
        .collect()
}

pub(super) fn input_elements(layout: &[InputElement], names: &[CString]) -> Vec<D3D12_INPUT_ELEMENT_DESC> {
    layout
        .iter()
        .zip(names)
        .map(|(element, name)| D3D12_INPUT_ELEMENT_DESC {
            SemanticName: PCSTR(name.as_ptr().cast()),
            SemanticIndex: element.semantic_index,
            Format: conv::format(element.format),
            InputSlot: element.input_slot,
            AlignedByteOffset: element.aligned_byte_offset,
            InputSlotClass: conv::input_classification(element.classification),
            InstanceDataStepRate: element.instance_data_step_rate,
        })
        .collect()
}
