use bytemuck::{Pod, Zeroable};

use crate::hal::{Format, InputClassification, InputElement};
use crate::{Error, Result};

/// What a vertex attribute means to the shader.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum VertexAttribType {
    Position,
    Normal,
    Tangent,
    Color,
    Uv,
}

impl VertexAttribType {
    /// HLSL input semantic.
    pub fn semantic_name(self) -> &'static str {
        match self {
            VertexAttribType::Position => "POSITION",
            VertexAttribType::Normal => "NORMAL",
            VertexAttribType::Tangent => "TANGENT",
            VertexAttribType::Color => "COLOR",
            VertexAttribType::Uv => "TEXCOORD",
        }
    }
}

/// Scalar type of each attribute component.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum VertexAttribFormat {
    F32,
    U32,
    U16,
    U8,
    I32,
    I16,
    I8,
}

impl VertexAttribFormat {
    pub fn size(self) -> u32 {
        match self {
            VertexAttribFormat::F32 | VertexAttribFormat::U32 | VertexAttribFormat::I32 => 4,
            VertexAttribFormat::U16 | VertexAttribFormat::I16 => 2,
            VertexAttribFormat::U8 | VertexAttribFormat::I8 => 1,
        }
    }

    pub fn is_float(self) -> bool {
        self == VertexAttribFormat::F32
    }

    pub fn is_uint(self) -> bool {
        matches!(self, VertexAttribFormat::U32 | VertexAttribFormat::U16 | VertexAttribFormat::U8)
    }

    pub fn is_int(self) -> bool {
        matches!(self, VertexAttribFormat::I32 | VertexAttribFormat::I16 | VertexAttribFormat::I8)
    }
}

/// Element format for `dimension` components of `format`.
///
/// There are no three-component 8/16-bit formats; those widen to four and the
/// shader ignores the last component.
pub fn attrib_format(format: VertexAttribFormat, dimension: u32) -> Result<Format> {
    use VertexAttribFormat as F;

    let picked = match (format, dimension) {
        (F::F32, 1) => Format::R32Float,
        (F::F32, 2) => Format::Rg32Float,
        (F::F32, 3) => Format::Rgb32Float,
        (F::F32, 4) => Format::Rgba32Float,

        (F::U32, 1) => Format::R32Uint,
        (F::U32, 2) => Format::Rg32Uint,
        (F::U32, 3) => Format::Rgb32Uint,
        (F::U32, 4) => Format::Rgba32Uint,
        (F::U16, 1) => Format::R16Uint,
        (F::U16, 2) => Format::Rg16Uint,
        (F::U16, 3 | 4) => Format::Rgba16Uint,
        (F::U8, 1) => Format::R8Uint,
        (F::U8, 2) => Format::Rg8Uint,
        (F::U8, 3 | 4) => Format::Rgba8Uint,

        (F::I32, 1) => Format::R32Sint,
        (F::I32, 2) => Format::Rg32Sint,
        (F::I32, 3) => Format::Rgb32Sint,
        (F::I32, 4) => Format::Rgba32Sint,
        (F::I16, 1) => Format::R16Sint,
        (F::I16, 2) => Format::Rg16Sint,
        (F::I16, 3 | 4) => Format::Rgba16Sint,
        (F::I8, 1) => Format::R8Sint,
        (F::I8, 2) => Format::Rg8Sint,
        (F::I8, 3 | 4) => Format::Rgba8Sint,

        _ => return Err(Error::UnsupportedVertexAttribute { format, dimension }),
    };

    if dimension == 3 && format.size() < 4 {
        log::warn!("{format:?} has no 3-component format; widening to 4 components");
    }
    Ok(picked)
}

/// One attribute inside an interleaved vertex.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct VertexAttribDescriptor {
    /// Component count, 1..=4.
    pub dimension: u32,
    /// Byte offset within the vertex.
    pub offset: u32,
    pub ty: VertexAttribType,
    pub format: VertexAttribFormat,
}

impl VertexAttribDescriptor {
    pub const fn new(ty: VertexAttribType, format: VertexAttribFormat, dimension: u32, offset: u32) -> Self {
        Self {
            dimension,
            offset,
            ty,
            format,
        }
    }

    pub fn size(&self) -> u32 {
        self.dimension * self.format.size()
    }
}

pub fn vertex_stride(layout: &[VertexAttribDescriptor]) -> u32 {
    layout.iter().map(VertexAttribDescriptor::size).sum()
}

/// Input-assembler layout for one interleaved stream in slot 0.
pub fn input_layout(layout: &[VertexAttribDescriptor]) -> Result<Vec<InputElement>> {
    layout
        .iter()
        .map(|attrib| {
            Ok(InputElement {
                semantic_name: attrib.ty.semantic_name(),
                semantic_index: 0,
                format: attrib_format(attrib.format, attrib.dimension)?,
                input_slot: 0,
                aligned_byte_offset: attrib.offset,
                classification: InputClassification::PerVertex,
                instance_data_step_rate: 0,
            })
        })
        .collect()
}

/// A vertex type with a fixed attribute layout.
pub trait Vertex: Pod {
    const ATTRIBUTES: &'static [VertexAttribDescriptor];
}

/// Position only.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
pub struct VertexP {
    pub position: [f32; 3],
}

impl Vertex for VertexP {
    const ATTRIBUTES: &'static [VertexAttribDescriptor] = &[VertexAttribDescriptor::new(
        VertexAttribType::Position,
        VertexAttribFormat::F32,
        3,
        0,
    )];
}

/// Position and color.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
pub struct VertexPC {
    pub position: [f32; 3],
    pub color: [f32; 3],
}

impl VertexPC {
    pub const fn new(position: [f32; 3], color: [f32; 3]) -> Self {
        Self { position, color }
    }
}

impl Vertex for VertexPC {
    const ATTRIBUTES: &'static [VertexAttribDescriptor] = &[
        VertexAttribDescriptor::new(VertexAttribType::Position, VertexAttribFormat::F32, 3, 0),
        VertexAttribDescriptor::new(VertexAttribType::Color, VertexAttribFormat::F32, 3, 12),
    ];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strides_match_struct_sizes() {
        assert_eq!(vertex_stride(VertexP::ATTRIBUTES), 12);
        assert_eq!(vertex_stride(VertexPC::ATTRIBUTES), 24);
        assert_eq!(size_of::<VertexP>(), 12);
        assert_eq!(size_of::<VertexPC>(), 24);
    }

    #[test]
    fn three_component_small_formats_widen() {
        assert_eq!(attrib_format(VertexAttribFormat::U16, 3).unwrap(), Format::Rgba16Uint);
        assert_eq!(attrib_format(VertexAttribFormat::I8, 3).unwrap(), Format::Rgba8Sint);
        assert_eq!(attrib_format(VertexAttribFormat::I8, 4).unwrap(), Format::Rgba8Sint);
        assert_eq!(attrib_format(VertexAttribFormat::F32, 3).unwrap(), Format::Rgb32Float);
    }

    #[test]
    fn unsupported_dimension_is_an_error() {
        assert!(matches!(
            attrib_format(VertexAttribFormat::F32, 5),
            Err(Error::UnsupportedVertexAttribute { dimension: 5, .. })
        ));
        assert!(attrib_format(VertexAttribFormat::U8, 0).is_err());
    }

    #[test]
    fn position_color_layout() {
        let elements = input_layout(VertexPC::ATTRIBUTES).unwrap();
        assert_eq!(elements.len(), 2);
        assert_eq!(elements[0].semantic_name, "POSITION");
        assert_eq!(elements[1].semantic_name, "COLOR");
        assert_eq!(elements[1].aligned_byte_offset, 12);
        assert!(elements.iter().all(|e| e.format == Format::Rgb32Float));
    }

    #[test]
    fn uv_maps_to_texcoord() {
        assert_eq!(VertexAttribType::Uv.semantic_name(), "TEXCOORD");
        assert!(VertexAttribFormat::I16.is_int());
        assert!(VertexAttribFormat::U8.is_uint());
        assert!(!VertexAttribFormat::U8.is_float());
    }
}
