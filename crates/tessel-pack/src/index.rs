use crate::error::Result;
use crate::format::FieldDescriptor;
use crate::packed::PackedBuffer;

/// Index-oriented view over a [`PackedBuffer`] built from a single format
/// token, typically `"uint16"` or `"uint32"`.
#[derive(Debug, Clone)]
pub struct IndexBuffer {
    packed: PackedBuffer,
}

impl IndexBuffer {
    pub fn new(format: &str) -> Result<Self> {
        Ok(Self {
            packed: PackedBuffer::from_tokens(&[format])?,
        })
    }

    /// The single parsed index format.
    #[inline]
    pub fn format(&self) -> FieldDescriptor {
        // Planning guarantees exactly the one field passed to `new`.
        self.packed.layout().fields()[0]
    }

    /// Indices the buffer was sized for.
    #[inline]
    pub fn index_count(&self) -> usize {
        self.packed.item_count()
    }

    /// Indices appended so far.
    #[inline]
    pub fn written_indices(&self) -> usize {
        self.packed.written_fragments() * self.packed.items_per_fragment()
    }

    pub fn initialize(&mut self, index_count: usize) -> Result<()> {
        self.packed.initialize(index_count)
    }

    /// Appends `data` at the write cursor. Returns the number of fragments
    /// written (equal to `data.len()` for scalar index formats).
    pub fn push_indices<I>(&mut self, data: &[I]) -> Result<usize>
    where
        I: Copy + Into<f64>,
    {
        self.packed.write_fragments(data, 0..data.len())
    }

    /// Reads index `i` back.
    pub fn index(&self, i: usize) -> Result<u32> {
        let per = self.packed.items_per_fragment();
        let fragment = self.packed.read_fragment(i / per)?;
        Ok(fragment[i % per] as u32)
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
