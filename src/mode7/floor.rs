//! Scanline floor rasterizer
//!
//! Inverts the projection one screen row at a time: every row below the
//! horizon maps to a fixed ground distance, and the world sample point steps
//! linearly along the row, so the inner loop is two adds per pixel.

use super::{Mode7, NEAR_PLANE};
use crate::bitmap::{Bitmap, Color};

/// Produces the floor color at a world (x, z) sample point.
///
/// Implemented for any `FnMut(f32, f32) -> Color`, so plain closures work:
///
/// ```ignore
/// m7.draw_floor(&mut dst, &mut |wx, wz| checker(wx, wz));
/// ```
pub trait FloorShader {
    fn shade(&mut self, wx: f32, wz: f32) -> Color;
}

impl<F: FnMut(f32, f32) -> Color> FloorShader for F {
    fn shade(&mut self, wx: f32, wz: f32) -> Color {
        self(wx, wz)
    }
}

impl Mode7 {
    /// Draw the y=0 ground plane, asking `shader` for the color of every
    /// visible sample. Rows at or above the horizon are left untouched.
    /// Each pixel's depth is its ground distance, so floor pixels occlude
    /// and are occluded like any other primitive.
    pub fn draw_floor<S: FloorShader>(&mut self, dst: &mut Bitmap, shader: &mut S) {
        let vp = self.viewport();
        let focal = self.focal();
        let cam = self.camera_position();
        let (phi, theta) = self.camera_angles();
        let (sp, cp) = phi.sin_cos();
        let (st, ct) = theta.sin_cos();
        let cx = vp.cx();
        let cy = vp.cy();

        for y in vp.y..vp.y + vp.h {
            // Ray slope of this row; the horizon sits where slope == tan(theta)
            let v = (cy - (y as f32 + 0.5)) / focal;
            let denom = st - v * ct;
            if denom <= 1e-6 {
                continue; // at or above the horizon
            }
            // Ground distance; this is also the camera-space forward depth
            let t = cam.y / denom;
            if t <= NEAR_PLANE {
                continue; // camera at or below the floor plane
            }

            // World point for the row's leftmost pixel, then a linear step
            // per column (inverse of the perspective divide at fixed depth)
            let forward = t * (v * st + ct);
            let row_x = cam.x + forward * sp;
            let row_z = cam.z + forward * cp;
            let step_x = t * cp / focal;
            let step_z = -(t * sp) / focal;
            let u0 = vp.x as f32 + 0.5 - cx;
            let mut wx = row_x + step_x * u0;
            let mut wz = row_z + step_z * u0;

            for x in vp.x..vp.x + vp.w {
                let color = shader.shade(wx, wz);
                self.plot(dst, x as i32, y as i32, t, color);
                wx += step_x;
                wz += step_z;
            }
        }
    }
}
