use crate::error::{PackError, Result};
use crate::layout::FragmentLayout;
use crate::packed::PackedBuffer;

/// Vertex-oriented view over a [`PackedBuffer`]: one fragment per vertex,
/// one format token per attribute.
#[derive(Debug, Clone)]
pub struct VertexBuffer {
    packed: PackedBuffer,
}

impl VertexBuffer {
    /// Builds a vertex buffer from per-attribute tokens (`["float32x2", "unorm8x4"]`).
    pub fn new<S: AsRef<str>>(attribute_formats: &[S]) -> Result<Self> {
        Ok(Self {
            packed: PackedBuffer::from_tokens(attribute_formats)?,
        })
    }

    #[inline]
    pub fn layout(&self) -> &FragmentLayout {
        self.packed.layout()
    }

    /// Bytes per vertex.
    #[inline]
    pub fn stride(&self) -> usize {
        self.packed.fragment_byte_size()
    }

    /// Vertices the buffer holds (`byte_len / stride`).
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.packed.byte_len() / self.stride()
    }

    #[inline]
    pub fn item_count(&self) -> usize {
        self.packed.item_count()
    }

    /// Sizes the buffer for `item_count` scalar values.
    pub fn initialize(&mut self, item_count: usize) -> Result<()> {
        self.packed.initialize(item_count)
    }

    /// Sizes the buffer for `vertex_count` whole vertices.
    pub fn initialize_vertices(&mut self, vertex_count: usize) -> Result<()> {
        let items = vertex_count
            .checked_mul(self.packed.items_per_fragment())
            .ok_or(PackError::CapacityOverflow {
                fragment_count: vertex_count,
                fragment_byte_size: self.stride(),
            })?;
        self.packed.initialize(items)
    }

    /// Writes `data` from the first vertex on. A trailing partial vertex is
    /// ignored. Returns the number of vertices written.
    pub fn set_vertices(&mut self, data: &[f32]) -> Result<usize> {
        self.packed.rewind();
        self.packed.write_fragments(data, 0..data.len())
    }

    /// Appends whole vertices from `data` at the write cursor. A trailing
    /// partial vertex is ignored. Returns the number of vertices written.
    pub fn push_vertices(&mut self, data: &[f32]) -> Result<usize> {
        self.packed.write_fragments(data, 0..data.len())
    }

    /// Appends one vertex at the write cursor.
    pub fn push_vertex(&mut self, vertex: &[f32]) -> Result<()> {
        self.packed.write_fragment(vertex, 0)
    }

    /// Reads vertex `index` back as `f32` components.
    pub fn vertex(&self, index: usize) -> Result<Vec<f32>> {
        Ok(self
            .packed
            .read_fragment(index)?
            .into_iter()
            .map(|v| v as f32)
            .collect())
    }

    #[inline]
    pub fn bytes(&self) -> &[u8] {
        self.packed.bytes()
    }

    #[inline]
    pub fn packed(&self) -> &PackedBuffer {
        &self.packed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_count_tracks_allocation() {
        let mut vb = VertexBuffer::new(&["float32x2", "unorm8x4"]).unwrap();
        assert_eq!(vb.vertex_count(), 0);
        vb.initialize_vertices(5).unwrap();
        assert_eq!(vb.stride(), 12);
        assert_eq!(vb.vertex_count(), 5);
        assert_eq!(vb.item_count(), 30);
    }

    #[test]
    fn initialize_vertices_rejects_overflowing_count() {
        let mut vb = VertexBuffer::new(&["float32x2", "unorm8x4"]).unwrap();
        assert_eq!(
            vb.initialize_vertices(usize::MAX),
            Err(PackError::CapacityOverflow { fragment_count: usize::MAX, fragment_byte_size: 12 })
        );
        assert!(!vb.packed().is_initialized());
        assert_eq!(vb.vertex_count(), 0);
    }

    #[test]
    fn set_vertices_writes_from_start() {
        let mut vb = VertexBuffer::new(&["float32x2"]).unwrap();
        vb.initialize(4).unwrap();
        vb.push_vertex(&[9.0, 9.0]).unwrap();
        assert_eq!(vb.set_vertices(&[1.0, 2.0, 3.0, 4.0]), Ok(2));
        assert_eq!(vb.vertex(0).unwrap(), vec![1.0, 2.0]);
        assert_eq!(vb.vertex(1).unwrap(), vec![3.0, 4.0]);
    }

    #[test]
    fn push_vertices_appends_after_cursor() {
        let mut vb = VertexBuffer::new(&["float32x2"]).unwrap();
        vb.initialize_vertices(3).unwrap();
        vb.push_vertex(&[1.0, 2.0]).unwrap();
        assert_eq!(vb.push_vertices(&[3.0, 4.0, 5.0, 6.0, 7.0]), Ok(2));
        assert_eq!(vb.vertex(0).unwrap(), vec![1.0, 2.0]);
        assert_eq!(vb.vertex(2).unwrap(), vec![5.0, 6.0]);
        assert_eq!(vb.packed().written_fragments(), 3);
    }

    #[test]
    fn set_vertices_before_initialize_fails() {
        let mut vb = VertexBuffer::new(&["float32x2"]).unwrap();
        assert_eq!(vb.set_vertices(&[1.0, 2.0]), Err(PackError::UninitializedBuffer));
    }

    #[test]
    fn push_past_capacity_overflows() {
        let mut vb = VertexBuffer::new(&["float32x2"]).unwrap();
        vb.initialize_vertices(1).unwrap();
        vb.push_vertex(&[0.0, 0.0]).unwrap();
        assert!(matches!(vb.push_vertex(&[1.0, 1.0]), Err(PackError::BufferOverflow { .. })));
    }

    #[test]
    fn malformed_attribute_fails_construction() {
        assert!(VertexBuffer::new(&["float32x2", "vec2"]).is_err());
    }
}
