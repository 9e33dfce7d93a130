//! GPU device and surface for one window.
//!
//! - `Gpu::new` picks an adapter, opens the device/queue and configures the
//!   surface
//! - `begin_frame`/`submit` bracket one frame of rendering
//! - surface errors are triaged into a [`SurfaceErrorAction`]

mod error;
mod frame;
mod gpu;
mod init;
mod surface;

pub use error::SurfaceErrorAction;
pub use frame::GpuFrame;
pub use gpu::Gpu;
pub use init::GpuInit;
