//! Bridges packed-buffer layouts to wgpu vertex/index descriptions.

use anyhow::{Result, anyhow};
use tessel_pack::{FieldDescriptor, FragmentLayout, ScalarKind};

/// wgpu vertex format for a parsed field, if wgpu has one.
///
/// Single-component and three-component 8/16-bit formats have no wgpu
/// equivalent here and return `None`.
pub fn vertex_format(field: &FieldDescriptor) -> Option<wgpu::VertexFormat> {
    use ScalarKind::*;
    use wgpu::VertexFormat as F;

    let format = match (field.kind, field.byte_width, field.component_count) {
        (Float, 4, 1) => F::Float32,
        (Float, 4, 2) => F::Float32x2,
        (Float, 4, 3) => F::Float32x3,
        (Float, 4, 4) => F::Float32x4,
        (Float, 8, 1) => F::Float64,
        (Float, 8, 2) => F::Float64x2,
        (Float, 8, 3) => F::Float64x3,
        (Float, 8, 4) => F::Float64x4,

        (Uint, 4, 1) => F::Uint32,
        (Uint, 4, 2) => F::Uint32x2,
        (Uint, 4, 3) => F::Uint32x3,
        (Uint, 4, 4) => F::Uint32x4,
        (Sint, 4, 1) => F::Sint32,
        (Sint, 4, 2) => F::Sint32x2,
        (Sint, 4, 3) => F::Sint32x3,
        (Sint, 4, 4) => F::Sint32x4,

        (Uint, 2, 2) => F::Uint16x2,
        (Uint, 2, 4) => F::Uint16x4,
        (Sint, 2, 2) => F::Sint16x2,
        (Sint, 2, 4) => F::Sint16x4,
        (Unorm, 2, 2) => F::Unorm16x2,
        (Unorm, 2, 4) => F::Unorm16x4,
        (Snorm, 2, 2) => F::Snorm16x2,
        (Snorm, 2, 4) => F::Snorm16x4,

        (Uint, 1, 2) => F::Uint8x2,
        (Uint, 1, 4) => F::Uint8x4,
        (Sint, 1, 2) => F::Sint8x2,
        (Sint, 1, 4) => F::Sint8x4,
        (Unorm, 1, 2) => F::Unorm8x2,
        (Unorm, 1, 4) => F::Unorm8x4,
        (Snorm, 1, 2) => F::Snorm8x2,
        (Snorm, 1, 4) => F::Snorm8x4,

        _ => return None,
    };
    Some(format)
}

/// Vertex attributes for `layout`, one per field, with shader locations
/// counting up from `first_location` and offsets accumulated in field order.
pub fn vertex_attributes(
    layout: &FragmentLayout,
    first_location: u32,
) -> Result<Vec<wgpu::VertexAttribute>> {
    layout
        .fields()
        .iter()
        .zip(layout.offsets())
        .zip(first_location..)
        .map(|((field, offset), shader_location)| {
            let format = vertex_format(field)
                .ok_or_else(|| anyhow!("`{field}` has no wgpu vertex format"))?;
            Ok(wgpu::VertexAttribute {
                format,
                offset: offset as wgpu::BufferAddress,
                shader_location,
            })
        })
        .collect()
}

/// wgpu index format for an index token's descriptor.
pub fn index_format(field: &FieldDescriptor) -> Option<wgpu::IndexFormat> {
    match (field.kind, field.byte_width, field.component_count) {
        (ScalarKind::Uint, 2, 1) => Some(wgpu::IndexFormat::Uint16),
        (ScalarKind::Uint, 4, 1) => Some(wgpu::IndexFormat::Uint32),
        _ => None,
    }
}

/// Largest index value representable in `format`.
#[inline]
pub fn max_index(format: wgpu::IndexFormat) -> u32 {
    match format {
        wgpu::IndexFormat::Uint16 => u16::MAX as u32,
        wgpu::IndexFormat::Uint32 => u32::MAX,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessel_pack::parse_format;

    fn vf(token: &str) -> Option<wgpu::VertexFormat> {
        vertex_format(&parse_format(token).unwrap())
    }

    #[test]
    fn common_vertex_formats() {
        assert_eq!(vf("float32x2"), Some(wgpu::VertexFormat::Float32x2));
        assert_eq!(vf("unorm8x4"), Some(wgpu::VertexFormat::Unorm8x4));
        assert_eq!(vf("sint16x2"), Some(wgpu::VertexFormat::Sint16x2));
        assert_eq!(vf("uint32"), Some(wgpu::VertexFormat::Uint32));
        assert_eq!(vf("float64x3"), Some(wgpu::VertexFormat::Float64x3));
    }

    #[test]
    fn formats_without_wgpu_equivalent() {
        assert_eq!(vf("unorm8x3"), None);
        assert_eq!(vf("unorm32"), None);
        assert_eq!(vf("float16x2"), None);
    }

    #[test]
    fn attributes_accumulate_offsets() {
        let layout = FragmentLayout::plan(&["float32x2", "unorm8x4", "float32"]).unwrap();
        let attrs = vertex_attributes(&layout, 0).unwrap();
        assert_eq!(
            attrs,
            vec![
                wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::Float32x2,
                    offset: 0,
                    shader_location: 0,
                },
                wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::Unorm8x4,
                    offset: 8,
                    shader_location: 1,
                },
                wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::Float32,
                    offset: 12,
                    shader_location: 2,
                },
            ]
        );
    }

    #[test]
    fn attributes_start_at_requested_location() {
        let layout = FragmentLayout::plan(&["float32x4"]).unwrap();
        let attrs = vertex_attributes(&layout, 3).unwrap();
        assert_eq!(attrs[0].shader_location, 3);
    }

    #[test]
    fn attributes_reject_unmappable_fields() {
        let layout = FragmentLayout::plan(&["float32x2", "uint8x3"]).unwrap();
        assert!(vertex_attributes(&layout, 0).is_err());
    }

    #[test]
    fn index_formats() {
        let f = |t: &str| index_format(&parse_format(t).unwrap());
        assert_eq!(f("uint16"), Some(wgpu::IndexFormat::Uint16));
        assert_eq!(f("uint32"), Some(wgpu::IndexFormat::Uint32));
        assert_eq!(f("sint16"), None);
        assert_eq!(f("uint16x2"), None);
        assert_eq!(max_index(wgpu::IndexFormat::Uint16), 65_535);
    }
}
