//! Core engine-facing contracts.
//!
//! The interface between the runtime (platform loop) and the application:
//! lifecycle callbacks and a per-frame context that hides surface handling.

mod app;
mod ctx;

pub use app::{App, AppControl};
pub use ctx::FrameCtx;
