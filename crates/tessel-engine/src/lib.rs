//! Tessel engine crate.
//!
//! Platform + GPU runtime for drawing packed geometry: window loop, wgpu
//! device, shader registry and renderers fed by `tessel_pack` buffers.

pub mod core;
pub mod coords;
pub mod device;
pub mod logging;
pub mod paint;
pub mod render;
pub mod window;
