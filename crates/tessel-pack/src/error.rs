use thiserror::Error;

/// Errors produced while parsing formats, planning layouts, or writing
/// packed buffers.
///
/// Every variant signals a caller/input mistake. Nothing here is transient.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PackError {
    #[error("malformed format token `{token}`: {reason}")]
    MalformedFormat { token: String, reason: &'static str },

    #[error("invalid bit width {bits} in `{token}` (expected 8, 16, 32 or 64)")]
    InvalidWidth { token: String, bits: u32 },

    #[error("fragment layout needs at least one format")]
    EmptyLayout,

    #[error("no scalar encoding for `{format}`")]
    UnsupportedFormat { format: String },

    #[error("{item_count} items is not a multiple of {items_per_fragment} items per fragment")]
    FragmentAlignment {
        item_count: usize,
        items_per_fragment: usize,
    },

    #[error("{fragment_count} fragments of {fragment_byte_size} bytes do not fit in memory")]
    CapacityOverflow {
        fragment_count: usize,
        fragment_byte_size: usize,
    },

    #[error("buffer written before initialize()")]
    UninitializedBuffer,

    #[error("fragment {fragment} is out of bounds for a buffer of {fragment_count} fragments")]
    BufferOverflow {
        fragment: usize,
        fragment_count: usize,
    },

    #[error("source has {available} values from offset {offset}, a fragment needs {needed}")]
    ShortSource {
        offset: usize,
        needed: usize,
        available: usize,
    },
}

pub type Result<T> = std::result::Result<T, PackError>;
