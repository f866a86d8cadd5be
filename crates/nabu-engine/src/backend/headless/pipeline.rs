use std::rc::Rc;

use super::{Headless, invalid_call};
use crate::Result;
use crate::hal::{
    Format, GraphicsPipelineDesc, MAX_RENDER_TARGETS, PrimitiveTopologyType, RootSignatureDesc,
    ShaderBlob, ShaderSource, ShaderStage,
};

const ROOT_SIGNATURE_MAGIC: &[u8; 4] = b"NBRS";
const SHADER_MAGIC: &[u8; 4] = b"NBSH";

pub(crate) fn serialize_root_signature(desc: &RootSignatureDesc) -> Vec<u8> {
    let mut blob = Vec::with_capacity(9);
    blob.extend_from_slice(ROOT_SIGNATURE_MAGIC);
    blob.push(1); // version 1.0
    let flags: u32 = u32::from(desc.allow_input_assembler_input_layout);
    blob.extend_from_slice(&flags.to_le_bytes());
    blob
}

pub(crate) fn deserialize_root_signature(blob: &[u8]) -> Result<HeadlessRootSignature> {
    const OP: &str = "ID3D12Device::CreateRootSignature";
    if blob.len() != 9 || &blob[..4] != ROOT_SIGNATURE_MAGIC {
        return Err(invalid_call(OP, "blob is not a serialized root signature"));
    }
    if blob[4] != 1 {
        return Err(invalid_call(OP, format!("unsupported root signature version {}", blob[4])));
    }
    let flags = u32::from_le_bytes([blob[5], blob[6], blob[7], blob[8]]);
    Ok(HeadlessRootSignature(Rc::new(RootSignatureDesc {
        allow_input_assembler_input_layout: flags & 1 != 0,
    })))
}

/// Stand-in for FXC: checks that the entry point is declared and tags the blob
/// with its stage.
pub(crate) fn compile_shader(source: &ShaderSource<'_>) -> std::result::Result<Vec<u8>, String> {
    if source.code.trim().is_empty() {
        return Err(format!("{}: error X3000: empty shader source", source.name));
    }
    if !declares_function(source.code, source.entry_point) {
        return Err(format!(
            "{}: error X3501: '{}': entrypoint not found",
            source.name, source.entry_point
        ));
    }

    let mut blob = Vec::with_capacity(5 + source.entry_point.len());
    blob.extend_from_slice(SHADER_MAGIC);
    blob.push(stage_tag(source.stage));
    blob.extend_from_slice(source.entry_point.as_bytes());
    Ok(blob)
}

fn declares_function(code: &str, name: &str) -> bool {
    if name.is_empty() {
        return false;
    }
    code.match_indices(name).any(|(i, _)| {
        let boundary = code[..i]
            .chars()
            .next_back()
            .is_none_or(|c| !(c.is_alphanumeric() || c == '_'));
        boundary && code[i + name.len()..].trim_start().starts_with('(')
    })
}

fn stage_tag(stage: ShaderStage) -> u8 {
    match stage {
        ShaderStage::Vertex => b'V',
        ShaderStage::Pixel => b'P',
        ShaderStage::Compute => b'C',
    }
}

fn blob_stage(blob: &ShaderBlob) -> Option<ShaderStage> {
    if blob.bytes.len() < 5 || &blob.bytes[..4] != SHADER_MAGIC {
        return None;
    }
    match blob.bytes[4] {
        b'V' => Some(ShaderStage::Vertex),
        b'P' => Some(ShaderStage::Pixel),
        b'C' => Some(ShaderStage::Compute),
        _ => None,
    }
}

#[derive(Clone)]
pub struct HeadlessRootSignature(Rc<RootSignatureDesc>);

impl HeadlessRootSignature {
    pub fn desc(&self) -> &RootSignatureDesc {
        &self.0
    }

    pub(crate) fn same_object(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

struct PipelineInner {
    root_signature: HeadlessRootSignature,
    input_element_count: usize,
    render_target_formats: Vec<Format>,
    sample_count: u32,
}

#[derive(Clone)]
pub struct HeadlessPipelineState(Rc<PipelineInner>);

impl HeadlessPipelineState {
    pub(crate) fn root_signature(&self) -> &HeadlessRootSignature {
        &self.0.root_signature
    }

    pub(crate) fn input_element_count(&self) -> usize {
        self.0.input_element_count
    }

    pub fn render_target_formats(&self) -> &[Format] {
        &self.0.render_target_formats
    }

    pub fn sample_count(&self) -> u32 {
        self.0.sample_count
    }
}

pub(crate) fn create_graphics_pipeline(desc: &GraphicsPipelineDesc<'_, Headless>) -> Result<HeadlessPipelineState> {
    const OP: &str = "ID3D12Device::CreateGraphicsPipelineState";

    if blob_stage(desc.vertex_shader) != Some(ShaderStage::Vertex) {
        return Err(invalid_call(OP, "vertex shader slot does not hold vertex shader bytecode"));
    }
    if let Some(ps) = desc.pixel_shader {
        if blob_stage(ps) != Some(ShaderStage::Pixel) {
            return Err(invalid_call(OP, "pixel shader slot does not hold pixel shader bytecode"));
        }
    }
    if !desc.input_layout.is_empty() && !desc.root_signature.desc().allow_input_assembler_input_layout {
        return Err(invalid_call(
            OP,
            "input layout used with a root signature that denies input assembler access",
        ));
    }
    if let Some(e) = desc
        .input_layout
        .iter()
        .find(|e| e.semantic_name.is_empty() || e.format == Format::Unknown)
    {
        return Err(invalid_call(OP, format!("malformed input element {e:?}")));
    }
    if desc.render_target_formats.len() > MAX_RENDER_TARGETS {
        return Err(invalid_call(OP, "more than 8 render targets"));
    }
    if desc.render_target_formats.contains(&Format::Unknown) {
        return Err(invalid_call(OP, "bound render target slot has an UNKNOWN format"));
    }
    if desc.pixel_shader.is_some() && desc.render_target_formats.is_empty() && desc.depth_stencil_format == Format::Unknown {
        return Err(invalid_call(OP, "pixel shader without any render target or depth target"));
    }
    if !matches!(desc.sample.count, 1 | 2 | 4 | 8) || (desc.sample.count == 1 && desc.sample.quality != 0) {
        return Err(invalid_call(
            OP,
            format!("unsupported sample description {:?}", desc.sample),
        ));
    }
    if desc.primitive_topology_type == PrimitiveTopologyType::Undefined {
        return Err(invalid_call(OP, "primitive topology type is UNDEFINED"));
    }
    if desc
        .blend
        .render_targets
        .iter()
        .any(|rt| rt.blend_enable && rt.logic_op_enable)
    {
        return Err(invalid_call(OP, "blend and logic op cannot both be enabled"));
    }

    Ok(HeadlessPipelineState(Rc::new(PipelineInner {
        root_signature: desc.root_signature.clone(),
        input_element_count: desc.input_layout.len(),
        render_target_formats: desc.render_target_formats.to_vec(),
        sample_count: desc.sample.count,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source<'a>(code: &'a str, entry: &'a str, stage: ShaderStage) -> ShaderSource<'a> {
        ShaderSource {
            name: "test.hlsl",
            code,
            entry_point: entry,
            stage,
        }
    }

    #[test]
    fn compile_finds_declared_entry_point() {
        let code = "float4 VSMain (float3 p : POSITION) : SV_POSITION { return float4(p, 1); }";
        let blob = compile_shader(&source(code, "VSMain", ShaderStage::Vertex)).unwrap();
        let blob = ShaderBlob { stage: ShaderStage::Vertex, bytes: blob };
        assert_eq!(blob_stage(&blob), Some(ShaderStage::Vertex));
    }

    #[test]
    fn compile_rejects_missing_entry_point() {
        let code = "float4 MyVSMain() : SV_POSITION { return 0; }";
        let err = compile_shader(&source(code, "VSMain", ShaderStage::Vertex)).unwrap_err();
        assert!(err.contains("X3501"));
    }

    #[test]
    fn root_signature_blob_round_trips_flags() {
        let blob = serialize_root_signature(&RootSignatureDesc::empty());
        let rs = deserialize_root_signature(&blob).unwrap();
        assert!(rs.desc().allow_input_assembler_input_layout);
        assert!(deserialize_root_signature(b"garbage").is_err());
    }
}
