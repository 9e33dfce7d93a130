use std::ops::Range;

use crate::error::{PackError, Result};
use crate::layout::FragmentLayout;

/// Growable byte region written fragment by fragment according to a
/// [`FragmentLayout`].
///
/// Lifecycle: created uninitialized, sized with [`initialize`](Self::initialize),
/// then written sequentially (cursor) or at explicit fragment indices.
/// Re-initialization drops previous contents and resets the cursor.
///
/// Not synchronized; mutation requires `&mut self`.
#[derive(Debug, Clone)]
pub struct PackedBuffer {
    layout: FragmentLayout,
    storage: Option<Storage>,
}

#[derive(Debug, Clone)]
struct Storage {
    bytes: Vec<u8>,
    /// Sequential write cursor, always a multiple of the stride.
    ending_offset: usize,
    fragment_count: usize,
}

impl PackedBuffer {
    pub fn new(layout: FragmentLayout) -> Self {
        Self { layout, storage: None }
    }

    /// Plans a layout from `tokens` and wraps it. Fails on the first bad token.
    pub fn from_tokens<S: AsRef<str>>(tokens: &[S]) -> Result<Self> {
        Ok(Self::new(FragmentLayout::plan(tokens)?))
    }

    #[inline]
    pub fn layout(&self) -> &FragmentLayout {
        &self.layout
    }

    #[inline]
    pub fn fragment_byte_size(&self) -> usize {
        self.layout.fragment_byte_size()
    }

    #[inline]
    pub fn items_per_fragment(&self) -> usize {
        self.layout.items_per_fragment()
    }

    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.storage.is_some()
    }

    /// Fragments the buffer was sized for (0 before `initialize`).
    #[inline]
    pub fn fragment_count(&self) -> usize {
        self.storage.as_ref().map_or(0, |s| s.fragment_count)
    }

    /// Scalar values the buffer was sized for (0 before `initialize`).
    #[inline]
    pub fn item_count(&self) -> usize {
        self.fragment_count() * self.items_per_fragment()
    }

    /// Byte position of the sequential write cursor.
    #[inline]
    pub fn ending_offset(&self) -> usize {
        self.storage.as_ref().map_or(0, |s| s.ending_offset)
    }

    /// Fragments written through the sequential cursor.
    #[inline]
    pub fn written_fragments(&self) -> usize {
        self.ending_offset() / self.fragment_byte_size()
    }

    #[inline]
    pub fn byte_len(&self) -> usize {
        self.bytes().len()
    }

    /// (Re)allocates zeroed storage for `item_count` scalar values.
    ///
    /// `item_count` must be a whole number of fragments, and the resulting
    /// byte size must fit in `usize`. On error the previous storage is kept.
    pub fn initialize(&mut self, item_count: usize) -> Result<()> {
        let items_per_fragment = self.items_per_fragment();
        if item_count % items_per_fragment != 0 {
            return Err(PackError::FragmentAlignment {
                item_count,
                items_per_fragment,
            });
        }

        let fragment_count = item_count / items_per_fragment;
        let fragment_byte_size = self.fragment_byte_size();
        let len = fragment_count
            .checked_mul(fragment_byte_size)
            .ok_or(PackError::CapacityOverflow {
                fragment_count,
                fragment_byte_size,
            })?;

        // Reuse the previous allocation when one exists.
        let mut bytes = self.storage.take().map(|s| s.bytes).unwrap_or_default();
        bytes.clear();
        bytes.resize(len, 0);

        self.storage = Some(Storage {
            bytes,
            ending_offset: 0,
            fragment_count,
        });

        log::trace!(
            "packed buffer sized: {fragment_count} fragments x {} bytes",
            self.fragment_byte_size()
        );
        Ok(())
    }

    /// Moves the sequential cursor back to the first fragment. Bytes are kept.
    pub fn rewind(&mut self) {
        if let Some(storage) = self.storage.as_mut() {
            storage.ending_offset = 0;
        }
    }

    /// Encodes one fragment from `source[source_offset..]` at the cursor and
    /// advances the cursor by one stride.
    ///
    /// Nothing is written when an error is returned.
    pub fn write_fragment<T>(&mut self, source: &[T], source_offset: usize) -> Result<()>
    where
        T: Copy + Into<f64>,
    {
        let stride = self.layout.fragment_byte_size();
        let storage = self.storage.as_mut().ok_or(PackError::UninitializedBuffer)?;

        let fragment = storage.ending_offset / stride;
        if fragment >= storage.fragment_count {
            return Err(PackError::BufferOverflow {
                fragment,
                fragment_count: storage.fragment_count,
            });
        }

        let items = fragment_source(source, source_offset, self.layout.items_per_fragment())?;
        let start = storage.ending_offset;
        encode_fragment(&self.layout, items, &mut storage.bytes[start..start + stride]);
        storage.ending_offset += stride;
        Ok(())
    }

    /// Encodes one fragment at `fragment` without moving the cursor.
    pub fn write_fragment_at<T>(
        &mut self,
        fragment: usize,
        source: &[T],
        source_offset: usize,
    ) -> Result<()>
    where
        T: Copy + Into<f64>,
    {
        let stride = self.layout.fragment_byte_size();
        let storage = self.storage.as_mut().ok_or(PackError::UninitializedBuffer)?;

        if fragment >= storage.fragment_count {
            return Err(PackError::BufferOverflow {
                fragment,
                fragment_count: storage.fragment_count,
            });
        }

        let items = fragment_source(source, source_offset, self.layout.items_per_fragment())?;
        let start = fragment * stride;
        encode_fragment(&self.layout, items, &mut storage.bytes[start..start + stride]);
        Ok(())
    }

    /// Writes every whole fragment contained in `source[bounds]` at the cursor.
    ///
    /// Trailing values that do not fill a whole fragment are ignored. Returns
    /// the number of fragments written. Capacity is checked for the whole
    /// batch up front, so an overflowing call writes nothing.
    pub fn write_fragments<T>(&mut self, source: &[T], bounds: Range<usize>) -> Result<usize>
    where
        T: Copy + Into<f64>,
    {
        let storage = self.storage.as_ref().ok_or(PackError::UninitializedBuffer)?;

        let span = bounds.end.saturating_sub(bounds.start);
        if bounds.end > source.len() {
            return Err(PackError::ShortSource {
                offset: bounds.start,
                needed: span,
                available: source.len().saturating_sub(bounds.start),
            });
        }

        let per = self.items_per_fragment();
        let count = span / per;
        let remainder = span % per;

        let written = storage.ending_offset / self.fragment_byte_size();
        if written + count > storage.fragment_count {
            return Err(PackError::BufferOverflow {
                fragment: storage.fragment_count,
                fragment_count: storage.fragment_count,
            });
        }

        if remainder != 0 {
            log::trace!("write_fragments: ignoring {remainder} trailing values");
        }

        for i in 0..count {
            self.write_fragment(source, bounds.start + i * per)?;
        }
        Ok(count)
    }

    /// Decodes fragment `fragment` back into scalar values (declared order).
    pub fn read_fragment(&self, fragment: usize) -> Result<Vec<f64>> {
        let storage = self.storage.as_ref().ok_or(PackError::UninitializedBuffer)?;
        if fragment >= storage.fragment_count {
            return Err(PackError::BufferOverflow {
                fragment,
                fragment_count: storage.fragment_count,
            });
        }

        let stride = self.fragment_byte_size();
        let mut offset = fragment * stride;
        let mut out = Vec::with_capacity(self.items_per_fragment());
        for enc in self.layout.components() {
            let width = enc.byte_width();
            out.push(enc.decode(&storage.bytes[offset..offset + width]));
            offset += width;
        }
        Ok(out)
    }

    /// The full backing region, ready for upload.
    ///
    /// This is a borrow of live storage: each call observes the current bytes,
    /// and no write can happen while the slice is held. Empty before
    /// `initialize`.
    #[inline]
    pub fn bytes(&self) -> &[u8] {
        self.storage
            .as_ref()
            .map(|s| s.bytes.as_slice())
            .unwrap_or_default()
    }
}

fn fragment_source<T>(source: &[T], offset: usize, needed: usize) -> Result<&[T]> {
    source
        .get(offset..)
        .and_then(|rest| rest.get(..needed))
        .ok_or(PackError::ShortSource {
            offset,
            needed,
            available: source.len().saturating_sub(offset),
        })
}

fn encode_fragment<T>(layout: &FragmentLayout, items: &[T], out: &mut [u8])
where
    T: Copy + Into<f64>,
{
    let mut offset = 0;
    for (enc, item) in layout.components().zip(items) {
        let width = enc.byte_width();
        enc.encode((*item).into(), &mut out[offset..offset + width]);
        offset += width;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer(tokens: &[&str]) -> PackedBuffer {
        PackedBuffer::from_tokens(tokens).unwrap()
    }

    fn f32_bytes(values: &[f32]) -> Vec<u8> {
        values.iter().flat_map(|v| v.to_le_bytes()).collect()
    }

    // ── initialize ────────────────────────────────────────────────────────

    #[test]
    fn uninitialized_is_empty() {
        let b = buffer(&["float32x2"]);
        assert!(!b.is_initialized());
        assert_eq!(b.fragment_count(), 0);
        assert!(b.bytes().is_empty());
    }

    #[test]
    fn initialize_sizes_region() {
        let mut b = buffer(&["float32x2", "unorm8x4"]);
        b.initialize(18).unwrap();
        assert_eq!(b.fragment_count(), 3);
        assert_eq!(b.item_count(), 18);
        assert_eq!(b.byte_len(), 3 * 12);
        assert_eq!(b.ending_offset(), 0);
    }

    #[test]
    fn initialize_rejects_partial_fragment() {
        let mut b = buffer(&["float32x2"]);
        assert_eq!(
            b.initialize(3),
            Err(PackError::FragmentAlignment { item_count: 3, items_per_fragment: 2 })
        );
        assert!(!b.is_initialized());
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn initialize_rejects_unaddressable_size() {
        let mut b = buffer(&["float64x4"]);
        b.initialize(4).unwrap();
        b.write_fragment(&[1.0f64, 2.0, 3.0, 4.0], 0).unwrap();

        let fragments = (1usize << 59) + 1;
        assert_eq!(
            b.initialize(fragments * 4),
            Err(PackError::CapacityOverflow { fragment_count: fragments, fragment_byte_size: 32 })
        );
        // The earlier region is untouched.
        assert_eq!(b.fragment_count(), 1);
        assert_eq!(b.byte_len(), 32);
        assert_eq!(b.read_fragment(0), Ok(vec![1.0, 2.0, 3.0, 4.0]));
    }

    #[test]
    fn reinitialize_discards_contents() {
        let mut b = buffer(&["uint8"]);
        b.initialize(2).unwrap();
        b.write_fragment(&[7u8], 0).unwrap();
        b.initialize(3).unwrap();
        assert_eq!(b.bytes(), &[0, 0, 0]);
        assert_eq!(b.ending_offset(), 0);
    }

    // ── write_fragment ────────────────────────────────────────────────────

    #[test]
    fn write_before_initialize_fails() {
        let mut b = buffer(&["float32x2"]);
        assert_eq!(b.write_fragment(&[1.0f32, 2.0], 0), Err(PackError::UninitializedBuffer));
        assert_eq!(b.write_fragments(&[1.0f32, 2.0], 0..2), Err(PackError::UninitializedBuffer));
        assert_eq!(b.write_fragment_at(0, &[1.0f32, 2.0], 0), Err(PackError::UninitializedBuffer));
    }

    #[test]
    fn write_fragment_reads_from_source_offset() {
        let mut b = buffer(&["float32x2"]);
        b.initialize(2).unwrap();
        b.write_fragment(&[9.0f32, 1.5, -2.0, 8.0], 1).unwrap();
        assert_eq!(b.bytes(), f32_bytes(&[1.5, -2.0]).as_slice());
        assert_eq!(b.ending_offset(), 8);
    }

    #[test]
    fn mixed_layout_encodes_in_declared_order() {
        let mut b = buffer(&["float32x2", "unorm8x4", "sint16"]);
        b.initialize(7).unwrap();
        b.write_fragment(&[1.0f64, -1.0, 255.0, 128.0, 0.0, 64.0, -300.0], 0).unwrap();

        let mut expected = f32_bytes(&[1.0, -1.0]);
        expected.extend_from_slice(&[255, 128, 0, 64]);
        expected.extend_from_slice(&(-300i16).to_le_bytes());
        assert_eq!(b.bytes(), expected.as_slice());
    }

    #[test]
    fn second_write_past_capacity_overflows() {
        let mut b = buffer(&["float32x2"]);
        b.initialize(2).unwrap();
        b.write_fragment(&[1.0f32, 2.0], 0).unwrap();
        assert_eq!(
            b.write_fragment(&[3.0f32, 4.0], 0),
            Err(PackError::BufferOverflow { fragment: 1, fragment_count: 1 })
        );
        // The first fragment is untouched.
        assert_eq!(b.bytes(), f32_bytes(&[1.0, 2.0]).as_slice());
    }

    #[test]
    fn short_source_writes_nothing() {
        let mut b = buffer(&["uint16x4"]);
        b.initialize(4).unwrap();
        assert_eq!(
            b.write_fragment(&[1u16, 2, 3], 0),
            Err(PackError::ShortSource { offset: 0, needed: 4, available: 3 })
        );
        assert_eq!(b.bytes(), &[0u8; 8]);
        assert_eq!(b.ending_offset(), 0);
    }

    #[test]
    fn write_fragment_at_is_random_access() {
        let mut b = buffer(&["uint16"]);
        b.initialize(3).unwrap();
        b.write_fragment_at(2, &[30u16], 0).unwrap();
        b.write_fragment_at(0, &[10u16], 0).unwrap();
        assert_eq!(b.bytes(), &[10, 0, 0, 0, 30, 0]);
        assert_eq!(b.ending_offset(), 0);
        assert_eq!(
            b.write_fragment_at(3, &[1u16], 0),
            Err(PackError::BufferOverflow { fragment: 3, fragment_count: 3 })
        );
    }

    // ── write_fragments ───────────────────────────────────────────────────

    #[test]
    fn write_fragments_drops_remainder() {
        // 7 items, 2 per fragment: 3 fragments written, 1 value ignored.
        let mut b = buffer(&["float32x2"]);
        b.initialize(8).unwrap();
        let src = [1.0f32, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0];
        assert_eq!(b.write_fragments(&src, 0..src.len()), Ok(3));
        assert_eq!(b.written_fragments(), 3);
        let mut expected = f32_bytes(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        expected.extend_from_slice(&[0; 8]);
        assert_eq!(b.bytes(), expected.as_slice());
    }

    #[test]
    fn write_fragments_honors_bounds() {
        let mut b = buffer(&["uint8x2"]);
        b.initialize(4).unwrap();
        let src = [0u8, 1, 2, 3, 4, 5, 6];
        assert_eq!(b.write_fragments(&src, 1..6), Ok(2));
        assert_eq!(b.bytes(), &[1, 2, 3, 4]);
    }

    #[test]
    fn write_fragments_checks_capacity_up_front() {
        let mut b = buffer(&["uint8"]);
        b.initialize(2).unwrap();
        assert!(matches!(
            b.write_fragments(&[1u8, 2, 3], 0..3),
            Err(PackError::BufferOverflow { .. })
        ));
        assert_eq!(b.bytes(), &[0, 0]);
    }

    #[test]
    fn write_fragments_bound_past_source() {
        let mut b = buffer(&["uint8"]);
        b.initialize(4).unwrap();
        assert_eq!(
            b.write_fragments(&[1u8, 2], 0..4),
            Err(PackError::ShortSource { offset: 0, needed: 4, available: 2 })
        );
    }

    // ── read-back / export ────────────────────────────────────────────────

    #[test]
    fn read_fragment_round_trips() {
        let mut b = buffer(&["sint8x2", "uint32", "float64", "float32"]);
        b.initialize(10).unwrap();
        let src = [-128.0, 127.0, 4_000_000_000.0, 0.1, 0.5, -5.0, 6.0, 7.0, 1e300, 0.25];
        b.write_fragments(&src, 0..src.len()).unwrap();
        assert_eq!(b.read_fragment(0).unwrap(), src[..5].to_vec());
        assert_eq!(b.read_fragment(1).unwrap(), src[5..].to_vec());
    }

    #[test]
    fn export_reflects_later_writes() {
        let mut b = buffer(&["uint8"]);
        b.initialize(2).unwrap();
        b.write_fragment(&[1u8], 0).unwrap();
        let first = b.bytes().to_vec();
        b.write_fragment(&[2u8], 0).unwrap();
        assert_eq!(first, vec![1, 0]);
        assert_eq!(b.bytes(), &[1, 2]);
    }

    #[test]
    fn rewind_restarts_cursor() {
        let mut b = buffer(&["uint8"]);
        b.initialize(1).unwrap();
        b.write_fragment(&[1u8], 0).unwrap();
        b.rewind();
        b.write_fragment(&[5u8], 0).unwrap();
        assert_eq!(b.bytes(), &[5]);
    }
}
