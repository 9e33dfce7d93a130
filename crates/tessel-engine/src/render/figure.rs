use crate::coords::Rect;
use crate::paint::Color;

/// Something that emits indexed triangles in the base vertex layout
/// (`float32x2` position, `unorm8x4` color).
pub trait Figure {
    fn vertex_count(&self) -> usize;

    fn index_count(&self) -> usize;

    /// Appends `vertex_count()` vertices, flattened to scalars.
    fn push_vertices(&self, out: &mut Vec<f32>);

    /// Appends `index_count()` indices, each offset by `base`.
    fn push_indices(&self, base: u32, out: &mut Vec<u32>);
}

/// Solid axis-aligned rectangle drawn as two triangles.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RectFigure {
    pub rect: Rect,
    pub color: Color,
}

impl RectFigure {
    /// Corner order is top-left, top-right, bottom-right, bottom-left.
    pub const INDICES: [u32; 6] = [0, 1, 2, 2, 3, 0];

    #[inline]
    pub fn new(rect: Rect, color: Color) -> Self {
        Self { rect, color }
    }
}

impl Figure for RectFigure {
    #[inline]
    fn vertex_count(&self) -> usize {
        4
    }

    #[inline]
    fn index_count(&self) -> usize {
        Self::INDICES.len()
    }

    fn push_vertices(&self, out: &mut Vec<f32>) {
        let color = self.color.to_unorm8();
        for corner in self.rect.normalized().corners() {
            out.extend_from_slice(&corner.to_array());
            out.extend_from_slice(&color);
        }
    }

    fn push_indices(&self, base: u32, out: &mut Vec<u32>) {
        out.extend(Self::INDICES.iter().map(|i| base + i));
    }
}
