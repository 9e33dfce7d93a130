//! Geometry types in logical pixels.
//!
//! CPU space: origin top-left, +X right, +Y down. The camera turns this into
//! clip space; nothing else in the engine deals with NDC.

mod rect;
mod vec2;
mod viewport;

pub use rect::Rect;
pub use vec2::Vec2;
pub use viewport::Viewport;
