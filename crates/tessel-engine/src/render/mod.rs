//! GPU rendering subsystem.
//!
//! Geometry is packed on the CPU through `tessel_pack` layouts, uploaded
//! as raw bytes and drawn with wgpu. Each renderer owns its GPU resources
//! (pipelines, buffers) and builds them lazily on first use.
//!
//! Convention:
//! - CPU geometry is in logical pixels (top-left origin, +Y down).
//! - The camera's orthographic projection maps it to clip space.

mod batch;
mod camera;
mod ctx;
mod figure;
mod formats;
mod gpu_buffer;
mod rect;
mod shader;

pub use batch::pack_figures;
pub use camera::{Camera, CameraUniform};
pub use ctx::{RenderCtx, RenderTarget};
pub use figure::{Figure, RectFigure};
pub use formats::{index_format, max_index, vertex_attributes, vertex_format};
pub use gpu_buffer::{BufferKind, GpuBuffer};
pub use rect::RectRenderer;
pub use shader::{BASE_SHADER, Shader, ShaderDesc, ShaderRegistry, UniformBinding};
