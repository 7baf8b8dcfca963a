//! Panoramic skybox renderer
//!
//! The source bitmap wraps once around the horizon: a full camera turn
//! scrolls exactly one source width, so the left and right edges meet
//! seamlessly.

use super::Mode7;
use crate::bitmap::{Bitmap, Color};

impl Mode7 {
    /// Fill the viewport region above the horizon. One source column is
    /// picked per screen column from the camera yaw, stretched vertically to
    /// `height` pixels ending at the horizon row; anything above the band is
    /// `background`. No depth test: the skybox is the backmost layer and
    /// must be drawn before everything else.
    pub fn draw_skybox(&mut self, dst: &mut Bitmap, src: &Bitmap, height: usize, background: Color) {
        let vp = self.viewport();
        if src.width == 0 || src.height == 0 {
            return;
        }

        let horizon = self.horizon().round() as i32;
        let sky_start = vp.y as i32;
        let sky_end = horizon.min((vp.y + vp.h) as i32);
        if sky_end <= sky_start {
            return; // horizon above the viewport, nothing but floor
        }
        let band_top = horizon - height as i32;

        let focal = self.focal();
        let cx = vp.cx();
        let phi = self.camera_angles().0;

        for x in vp.x..vp.x + vp.w {
            // view angle of this column; atan keeps the mapping consistent
            // with the perspective projection
            let u = (x as f32 + 0.5 - cx) / focal;
            let ang = phi + u.atan();
            let frac = (ang / std::f32::consts::TAU).rem_euclid(1.0);
            let tx = ((frac * src.width as f32) as usize).min(src.width - 1);

            for y in sky_start..sky_end {
                let color = if y < band_top {
                    background
                } else {
                    let ty = ((y - band_top) as usize * src.height) / height;
                    src.get_pixel(tx, ty.min(src.height - 1))
                };
                dst.set_pixel(x as usize, y as usize, color);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const W: usize = 64;
    const H: usize = 48;

    fn ctx() -> (Mode7, Bitmap) {
        let mut m7 = Mode7::new(0, 0, W, H).unwrap();
        m7.clear_depth();
        (m7, Bitmap::new(W, H, Color::BLACK))
    }

    fn striped_panorama() -> Bitmap {
        let mut src = Bitmap::new(256, 8, Color::BLACK);
        for x in 0..256 {
            for y in 0..8 {
                src.set_pixel(x, y, Color::new(x as u8, 0, 0));
            }
        }
        src
    }

    #[test]
    fn test_sky_fills_above_horizon_only() {
        let (mut m7, mut dst) = ctx();
        m7.set_camera_position(0.0, 10.0, 0.0);
        m7.set_camera_angles(0.0, 0.4);
        let src = striped_panorama();
        m7.draw_skybox(&mut dst, &src, 16, Color::BLUE);

        let horizon = ((H as f32 / 2.0) - m7.focal() * 0.4f32.tan()).round() as i32;
        assert!(horizon > 0 && (horizon as usize) < H);
        // top row is background or band, rows below the horizon untouched
        assert!(dst.get_pixel(5, 0) != Color::BLACK);
        assert_eq!(dst.get_pixel(5, H - 1), Color::BLACK);
        assert!(dst.get_pixel(5, horizon as usize - 1) != Color::BLACK);
    }

    #[test]
    fn test_background_above_band() {
        let (mut m7, mut dst) = ctx();
        m7.set_camera_position(0.0, 10.0, 0.0);
        m7.set_camera_angles(0.0, 0.4);
        let src = striped_panorama();
        m7.draw_skybox(&mut dst, &src, 4, Color::BLUE);
        assert_eq!(dst.get_pixel(5, 0), Color::BLUE);
    }

    #[test]
    fn test_full_turn_is_seamless() {
        let (mut m7, mut dst_a) = ctx();
        let mut dst_b = Bitmap::new(W, H, Color::BLACK);
        let src = striped_panorama();
        m7.set_camera_position(0.0, 10.0, 0.0);

        m7.set_camera_angles(1.234, 0.4);
        m7.draw_skybox(&mut dst_a, &src, 16, Color::BLUE);
        m7.set_camera_angles(1.234 + std::f32::consts::TAU, 0.4);
        m7.draw_skybox(&mut dst_b, &src, 16, Color::BLUE);

        // identical up to float rounding of the wrap (stripe colors encode
        // the sampled source column)
        for y in 0..H {
            for x in 0..W {
                let a = dst_a.get_pixel(x, y);
                let b = dst_b.get_pixel(x, y);
                let d = (a.r as i32 - b.r as i32).abs();
                assert!(d.min(256 - d) <= 1 && a.g == b.g && a.b == b.b);
            }
        }
    }

    #[test]
    fn test_panning_scrolls_columns() {
        let (mut m7, mut dst_a) = ctx();
        let mut dst_b = Bitmap::new(W, H, Color::BLACK);
        let src = striped_panorama();
        m7.set_camera_position(0.0, 10.0, 0.0);

        m7.set_camera_angles(0.0, 0.4);
        m7.draw_skybox(&mut dst_a, &src, 16, Color::BLUE);
        m7.set_camera_angles(0.5, 0.4);
        m7.draw_skybox(&mut dst_b, &src, 16, Color::BLUE);

        assert!(dst_a.get_pixel(W / 2, 5) != dst_b.get_pixel(W / 2, 5));
    }
}
