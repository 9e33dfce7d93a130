use crate::error::{PackError, Result};
use crate::format::{parse_format, FieldDescriptor, ScalarKind};

// ── ScalarEncoding ────────────────────────────────────────────────────────

/// Concrete byte encoding of one component, resolved from `(kind, byte_width)`.
///
/// All multi-byte encodings are little-endian. `snorm`/`unorm` share the
/// signed/unsigned integer encodings: values are stored raw, normalization is
/// up to the caller.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ScalarEncoding {
    F32,
    F64,
    I8,
    I16,
    I32,
    U8,
    U16,
    U32,
}

impl ScalarEncoding {
    /// Looks up the encoding for a descriptor, if one exists.
    pub fn for_field(field: &FieldDescriptor) -> Option<Self> {
        use ScalarKind::*;
        match (field.kind, field.byte_width) {
            (Float, 4) => Some(ScalarEncoding::F32),
            (Float, 8) => Some(ScalarEncoding::F64),
            (Sint | Snorm, 1) => Some(ScalarEncoding::I8),
            (Sint | Snorm, 2) => Some(ScalarEncoding::I16),
            (Sint | Snorm, 4) => Some(ScalarEncoding::I32),
            (Uint | Unorm, 1) => Some(ScalarEncoding::U8),
            (Uint | Unorm, 2) => Some(ScalarEncoding::U16),
            (Uint | Unorm, 4) => Some(ScalarEncoding::U32),
            _ => None,
        }
    }

    #[inline]
    pub const fn byte_width(self) -> usize {
        match self {
            ScalarEncoding::I8 | ScalarEncoding::U8 => 1,
            ScalarEncoding::I16 | ScalarEncoding::U16 => 2,
            ScalarEncoding::F32 | ScalarEncoding::I32 | ScalarEncoding::U32 => 4,
            ScalarEncoding::F64 => 8,
        }
    }

    /// Writes `value` into `out` (exactly `byte_width()` bytes).
    ///
    /// Integer encodings truncate toward zero and saturate at the type bounds.
    #[inline]
    pub fn encode(self, value: f64, out: &mut [u8]) {
        match self {
            ScalarEncoding::F32 => out.copy_from_slice(&(value as f32).to_le_bytes()),
            ScalarEncoding::F64 => out.copy_from_slice(&value.to_le_bytes()),
            ScalarEncoding::I8 => out.copy_from_slice(&(value as i8).to_le_bytes()),
            ScalarEncoding::I16 => out.copy_from_slice(&(value as i16).to_le_bytes()),
            ScalarEncoding::I32 => out.copy_from_slice(&(value as i32).to_le_bytes()),
            ScalarEncoding::U8 => out.copy_from_slice(&(value as u8).to_le_bytes()),
            ScalarEncoding::U16 => out.copy_from_slice(&(value as u16).to_le_bytes()),
            ScalarEncoding::U32 => out.copy_from_slice(&(value as u32).to_le_bytes()),
        }
    }

    /// Reads one component back from `bytes` (exactly `byte_width()` bytes).
    #[inline]
    pub fn decode(self, bytes: &[u8]) -> f64 {
        // Callers slice by `byte_width()`, so the conversions cannot fail.
        fn arr<const N: usize>(bytes: &[u8]) -> [u8; N] {
            let mut a = [0u8; N];
            a.copy_from_slice(bytes);
            a
        }

        match self {
            ScalarEncoding::F32 => f32::from_le_bytes(arr(bytes)) as f64,
            ScalarEncoding::F64 => f64::from_le_bytes(arr(bytes)),
            ScalarEncoding::I8 => i8::from_le_bytes(arr(bytes)) as f64,
            ScalarEncoding::I16 => i16::from_le_bytes(arr(bytes)) as f64,
            ScalarEncoding::I32 => i32::from_le_bytes(arr(bytes)) as f64,
            ScalarEncoding::U8 => u8::from_le_bytes(arr(bytes)) as f64,
            ScalarEncoding::U16 => u16::from_le_bytes(arr(bytes)) as f64,
            ScalarEncoding::U32 => u32::from_le_bytes(arr(bytes)) as f64,
        }
    }
}

// ── FragmentLayout ────────────────────────────────────────────────────────

/// Ordered field list describing one fragment (one vertex, one index group).
///
/// The first field occupies the lowest byte offsets. Offsets are not stored;
/// they follow from accumulating `byte_size()` in declared order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FragmentLayout {
    fields: Vec<FieldDescriptor>,
    encodings: Vec<ScalarEncoding>,
    fragment_byte_size: usize,
    items_per_fragment: usize,
}

impl FragmentLayout {
    /// Parses `tokens` in order and plans the layout.
    pub fn plan<S: AsRef<str>>(tokens: &[S]) -> Result<Self> {
        let fields = tokens
            .iter()
            .map(|t| parse_format(t.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Self::from_descriptors(fields)
    }

    pub fn from_descriptors(fields: Vec<FieldDescriptor>) -> Result<Self> {
        if fields.is_empty() {
            return Err(PackError::EmptyLayout);
        }

        let encodings = fields
            .iter()
            .map(|f| {
                ScalarEncoding::for_field(f).ok_or_else(|| PackError::UnsupportedFormat {
                    format: f.to_string(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let fragment_byte_size: usize = fields.iter().map(FieldDescriptor::byte_size).sum();
        let items_per_fragment: usize = fields.iter().map(|f| f.component_count).sum();

        Ok(Self {
            fields,
            encodings,
            fragment_byte_size,
            items_per_fragment,
        })
    }

    /// Byte distance between consecutive fragments (the stride).
    #[inline]
    pub fn fragment_byte_size(&self) -> usize {
        self.fragment_byte_size
    }

    /// Number of scalar values that make up one fragment.
    #[inline]
    pub fn items_per_fragment(&self) -> usize {
        self.items_per_fragment
    }

    #[inline]
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Field byte offsets within a fragment, in declared order.
    pub fn offsets(&self) -> impl Iterator<Item = usize> + '_ {
        self.fields.iter().scan(0usize, |offset, f| {
            let at = *offset;
            *offset += f.byte_size();
            Some(at)
        })
    }

    /// Per-component encodings in write order (each field repeated
    /// `component_count` times).
    pub(crate) fn components(&self) -> impl Iterator<Item = ScalarEncoding> + '_ {
        self.fields
            .iter()
            .zip(&self.encodings)
            .flat_map(|(f, e)| std::iter::repeat(*e).take(f.component_count))
    }
}
