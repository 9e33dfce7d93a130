//! Format-driven packed buffer writer.
//!
//! Turns GPU attribute-format tokens (`"float32x2"`, `"unorm8x4"`, `"uint16"`)
//! into fragment layouts and serializes numeric streams into the tightly
//! packed little-endian bytes a GPU vertex/index buffer expects.
//!
//! This crate has no GPU dependencies; the engine bridges layouts to wgpu.
//!
//! # Structure
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`format`] | `parse_format`, `FieldDescriptor`, `ScalarKind` |
//! | [`layout`] | `FragmentLayout`, `ScalarEncoding` |
//! | [`packed`] | `PackedBuffer` |
//! | [`vertex`] / [`index`] | `VertexBuffer`, `IndexBuffer` |
//! | [`error`] | `PackError` |
//!
//! # Quick start
//!
//! ```rust
//! use tessel_pack::VertexBuffer;
//!
//! let mut vb = VertexBuffer::new(&["float32x2"]).unwrap();
//! vb.initialize_vertices(2).unwrap();
//! vb.set_vertices(&[1.0, 2.0, 3.0, 4.0]).unwrap();
//! assert_eq!(vb.bytes().len(), 16);
//! ```

pub mod error;
pub mod format;
pub mod index;
pub mod layout;
pub mod packed;
pub mod vertex;

pub use error::PackError;
pub use format::{parse_format, FieldDescriptor, ScalarKind};
pub use index::IndexBuffer;
pub use layout::{FragmentLayout, ScalarEncoding};
pub use packed::PackedBuffer;
pub use vertex::VertexBuffer;
