//! Distance-scaled billboard sprites
//!
//! A sprite is a rectangular region of a source bitmap blitted at the
//! projection of a single world point, scaled by its depth. The source
//! bitmap's current color acts as the transparency mask.

use super::{AnchorMode, Mode7, Vec3};
use crate::bitmap::Bitmap;

impl Mode7 {
    /// Draw the source region `(sx, sy, sw, sh)` of `src` as a billboard at
    /// world position `(wx, wy, wz)`.
    ///
    /// The whole sprite carries the single depth of its projected anchor
    /// point; each covered pixel is depth-tested against it. With
    /// [`AnchorMode::Bottom`] the rectangle stands on the projected point
    /// (sprites walking on the floor); with [`AnchorMode::Center`] it is
    /// centered on it (sprites floating in the air). One source pixel spans
    /// one world unit at `depth == focal`.
    #[allow(clippy::too_many_arguments)]
    pub fn draw_sprite(
        &mut self,
        dst: &mut Bitmap,
        wx: f32,
        wy: f32,
        wz: f32,
        src: &Bitmap,
        sx: usize,
        sy: usize,
        sw: usize,
        sh: usize,
    ) {
        let p = match self.project(Vec3::new(wx, wy, wz)) {
            Some(p) => p,
            None => return,
        };
        if sw == 0 || sh == 0 {
            return;
        }

        let scale = self.focal() / p.z;
        let dw = (sw as f32 * scale).round() as i32;
        let dh = (sh as f32 * scale).round() as i32;
        if dw <= 0 || dh <= 0 {
            return;
        }

        let anchor_x = p.x.round() as i32;
        let anchor_y = p.y.round() as i32;
        let x0 = anchor_x - dw / 2;
        let y0 = match self.anchor_mode() {
            AnchorMode::Bottom => anchor_y - dh,
            AnchorMode::Center => anchor_y - dh / 2,
        };

        let mask = src.color();
        for dy in 0..dh {
            let ty = sy + (dy as usize * sh) / dh as usize;
            for dx in 0..dw {
                let tx = sx + (dx as usize * sw) / dw as usize;
                let color = src.get_pixel(tx, ty);
                if color == mask {
                    continue;
                }
                self.plot(dst, x0 + dx, y0 + dy, p.z, color);
            }
        }
    }
}
