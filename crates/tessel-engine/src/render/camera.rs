use bytemuck::{Pod, Zeroable};
use glam::Mat4;

use crate::coords::Rect;

/// 2D orthographic camera over a rectangle of logical pixels.
///
/// `bounds.origin` maps to the top-left of the surface, `bounds.max()` to the
/// bottom-right (+Y down). Depth is irrelevant: z = 0 lands mid-range.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    bounds: Rect,
    projection: Mat4,
}

/// Projection matrix as uploaded to the `projection` uniform (column-major).
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct CameraUniform {
    pub matrix: [[f32; 4]; 4],
}

impl Camera {
    const NEAR: f32 = -1.0;
    const FAR: f32 = 1.0;

    pub fn new(bounds: Rect) -> Self {
        Self {
            bounds,
            projection: Self::ortho(bounds),
        }
    }

    #[inline]
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Moves/resizes the visible region. Returns `true` if anything changed.
    pub fn set_bounds(&mut self, bounds: Rect) -> bool {
        if bounds == self.bounds {
            return false;
        }
        self.bounds = bounds;
        self.projection = Self::ortho(bounds);
        true
    }

    #[inline]
    pub fn projection(&self) -> Mat4 {
        self.projection
    }

    #[inline]
    pub fn uniform(&self) -> CameraUniform {
        CameraUniform {
            matrix: self.projection.to_cols_array_2d(),
        }
    }

    fn ortho(bounds: Rect) -> Mat4 {
        let max = bounds.max();
        // bottom/top swapped so that +Y points down the screen.
        Mat4::orthographic_rh(bounds.origin.x, max.x, max.y, bounds.origin.y, Self::NEAR, Self::FAR)
    }
}
