//! Filled triangles and depth-tested 3D lines
//!
//! Triangles are rasterized with incrementally-stepped edge functions over a
//! viewport-clamped bounding box. Depth is interpolated linearly from the
//! three projected vertices; fog and the z-test run per pixel.

use super::{Mode7, Vec3};
use crate::bitmap::Bitmap;

impl Mode7 {
    /// Draw a filled triangle from three world-space vertices, using the
    /// destination bitmap's current drawing color.
    ///
    /// Any vertex behind the near plane discards the whole triangle (no
    /// clipping subdivision). Clockwise screen winding is front-facing;
    /// back-facing triangles are skipped while backface culling is enabled.
    pub fn draw_tri(&mut self, dst: &mut Bitmap, tri: [Vec3; 3]) {
        let (p0, p1, p2) = match (
            self.project(tri[0]),
            self.project(tri[1]),
            self.project(tri[2]),
        ) {
            (Some(a), Some(b), Some(c)) => (a, b, c),
            _ => return,
        };

        let v1 = p0;
        let mut v2 = p1;
        let mut v3 = p2;

        // Twice the signed screen area; sign encodes the winding
        let mut area = (v2.y - v3.y) * (v1.x - v3.x) + (v3.x - v2.x) * (v1.y - v3.y);
        if area.abs() < 0.0001 {
            return; // degenerate triangle
        }
        if area <= 0.0 {
            if self.backface_cull() {
                return;
            }
            // normalize winding so the inside test below works
            std::mem::swap(&mut v2, &mut v3);
            area = -area;
        }
        let inv_area = 1.0 / area;

        // Bounding box clamped to the viewport
        let vp = self.viewport();
        let min_x = v1.x.min(v2.x).min(v3.x).max(vp.x as f32) as i32;
        let max_x = (v1.x.max(v2.x).max(v3.x) + 1.0).min((vp.x + vp.w) as f32) as i32;
        let min_y = v1.y.min(v2.y).min(v3.y).max(vp.y as f32) as i32;
        let max_y = (v1.y.max(v2.y).max(v3.y) + 1.0).min((vp.y + vp.h) as f32) as i32;
        if min_x >= max_x || min_y >= max_y {
            return;
        }

        // Edge function coefficients for the barycentric weights of v1/v2
        let a0 = v2.y - v3.y;
        let b0 = v3.x - v2.x;
        let a1 = v3.y - v1.y;
        let b1 = v1.x - v3.x;

        let mut w0_row = a0 * (min_x as f32 - v3.x) + b0 * (min_y as f32 - v3.y);
        let mut w1_row = a1 * (min_x as f32 - v3.x) + b1 * (min_y as f32 - v3.y);

        let color = dst.color();

        for y in min_y..max_y {
            let mut w0 = w0_row;
            let mut w1 = w1_row;

            for x in min_x..max_x {
                let bc_x = w0 * inv_area;
                let bc_y = w1 * inv_area;
                let bc_z = 1.0 - bc_x - bc_y;

                // small negative slack keeps shared edges gap-free
                const ERR: f32 = -0.0001;
                if bc_x >= ERR && bc_y >= ERR && bc_z >= ERR {
                    let z = bc_x * v1.z + bc_y * v2.z + bc_z * v3.z;
                    self.plot(dst, x, y, z, color);
                }

                w0 += a0;
                w1 += a1;
            }

            w0_row += b0;
            w1_row += b1;
        }
    }

    /// Draw a line in 3D space from `p0` to `p1`, depth-tested per pixel.
    /// Either endpoint behind the near plane discards the line; zero-length
    /// lines draw nothing.
    pub fn draw_line(&mut self, dst: &mut Bitmap, p0: Vec3, p1: Vec3) {
        if p0 == p1 {
            return;
        }
        let (a, b) = match (self.project(p0), self.project(p1)) {
            (Some(a), Some(b)) => (a, b),
            _ => return,
        };

        let color = dst.color();
        let x0 = a.x.round() as i32;
        let y0 = a.y.round() as i32;
        let x1 = b.x.round() as i32;
        let y1 = b.y.round() as i32;

        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;
        let mut x = x0;
        let mut y = y0;

        let total_steps = dx.max((-dy).max(1)) as f32;
        let mut step = 0.0f32;

        loop {
            // interpolate depth along the major axis
            let t = step / total_steps;
            let z = a.z + t * (b.z - a.z);
            self.plot(dst, x, y, z, color);

            if x == x1 && y == y1 {
                break;
            }

            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
                step += 1.0;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
                if e2 < dy {
                    step += 1.0;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitmap::Color;

    const W: usize = 64;
    const H: usize = 48;

    fn ctx() -> (Mode7, Bitmap) {
        let mut m7 = Mode7::new(0, 0, W, H).unwrap();
        m7.clear_depth();
        m7.set_camera_position(0.0, 0.0, 0.0);
        m7.set_camera_angles(0.0, 0.0);
        (m7, Bitmap::new(W, H, Color::BLACK))
    }

    fn count_color(dst: &Bitmap, c: Color) -> usize {
        let mut n = 0;
        for y in 0..H {
            for x in 0..W {
                if dst.get_pixel(x, y) == c {
                    n += 1;
                }
            }
        }
        n
    }

    /// Clockwise-on-screen triangle facing the camera at the given depth
    fn facing_tri(z: f32) -> [Vec3; 3] {
        [
            Vec3::new(0.0, 2.0, z),
            Vec3::new(2.0, -2.0, z),
            Vec3::new(-2.0, -2.0, z),
        ]
    }

    #[test]
    fn test_triangle_fills_pixels() {
        let (mut m7, mut dst) = ctx();
        dst.set_color(Color::RED);
        m7.draw_tri(&mut dst, facing_tri(20.0));
        assert!(count_color(&dst, Color::RED) > 10);
    }

    #[test]
    fn test_depth_order_independent() {
        // near triangle B must cover far triangle A in the overlap,
        // whichever is drawn first
        for flip in [false, true] {
            let (mut m7, mut dst) = ctx();
            let far = facing_tri(20.0);
            let near = facing_tri(10.0);
            if flip {
                dst.set_color(Color::GREEN);
                m7.draw_tri(&mut dst, near);
                dst.set_color(Color::RED);
                m7.draw_tri(&mut dst, far);
            } else {
                dst.set_color(Color::RED);
                m7.draw_tri(&mut dst, far);
                dst.set_color(Color::GREEN);
                m7.draw_tri(&mut dst, near);
            }
            // the near triangle projects larger and fully covers the far one
            assert_eq!(count_color(&dst, Color::RED), 0, "flip={}", flip);
            assert!(count_color(&dst, Color::GREEN) > 10);
        }
    }

    #[test]
    fn test_all_vertices_behind_camera_draw_nothing() {
        let (mut m7, mut dst) = ctx();
        dst.set_color(Color::RED);
        m7.draw_tri(&mut dst, facing_tri(-20.0));
        assert_eq!(count_color(&dst, Color::RED), 0);
    }

    #[test]
    fn test_one_vertex_behind_discards_whole_triangle() {
        let (mut m7, mut dst) = ctx();
        dst.set_color(Color::RED);
        let mut tri = facing_tri(20.0);
        tri[0].z = -1.0;
        m7.draw_tri(&mut dst, tri);
        assert_eq!(count_color(&dst, Color::RED), 0);
    }

    #[test]
    fn test_degenerate_triangle_skipped() {
        let (mut m7, mut dst) = ctx();
        dst.set_color(Color::RED);
        let p = Vec3::new(0.0, 0.0, 20.0);
        m7.draw_tri(&mut dst, [p, p, p]);
        assert_eq!(count_color(&dst, Color::RED), 0);
    }

    #[test]
    fn test_backface_culling() {
        let tri = facing_tri(20.0);
        let away = [tri[0], tri[2], tri[1]]; // reversed winding

        let (mut m7, mut dst) = ctx();
        dst.set_color(Color::RED);
        m7.set_backface_cull(true);
        m7.draw_tri(&mut dst, away);
        assert_eq!(count_color(&dst, Color::RED), 0);
        m7.draw_tri(&mut dst, tri);
        assert!(count_color(&dst, Color::RED) > 10);

        // with culling disabled the reversed triangle rasterizes too
        let (mut m7, mut dst) = ctx();
        dst.set_color(Color::RED);
        m7.set_backface_cull(false);
        m7.draw_tri(&mut dst, away);
        assert!(count_color(&dst, Color::RED) > 10);
    }

    #[test]
    fn test_line_draws_and_respects_depth() {
        let (mut m7, mut dst) = ctx();
        // wall in front of the far half of the line
        dst.set_color(Color::BLUE);
        m7.draw_tri(
            &mut dst,
            [
                Vec3::new(0.0, 20.0, 15.0),
                Vec3::new(20.0, -20.0, 15.0),
                Vec3::new(-20.0, -20.0, 15.0),
            ],
        );
        dst.set_color(Color::RED);
        m7.draw_line(&mut dst, Vec3::new(-2.0, 0.0, 10.0), Vec3::new(2.0, 0.0, 30.0));
        // the near end is visible, the far end is hidden by the wall
        assert!(count_color(&dst, Color::RED) > 0);

        let (mut m7_free, mut dst_free) = ctx();
        dst_free.set_color(Color::RED);
        m7_free.draw_line(
            &mut dst_free,
            Vec3::new(-2.0, 0.0, 10.0),
            Vec3::new(2.0, 0.0, 30.0),
        );
        assert!(count_color(&dst_free, Color::RED) > count_color(&dst, Color::RED));
    }

    #[test]
    fn test_line_clipped_endpoint_discards() {
        let (mut m7, mut dst) = ctx();
        dst.set_color(Color::RED);
        m7.draw_line(&mut dst, Vec3::new(0.0, 0.0, 10.0), Vec3::new(0.0, 0.0, -10.0));
        assert_eq!(count_color(&dst, Color::RED), 0);
    }

    #[test]
    fn test_zero_length_line_draws_nothing() {
        let (mut m7, mut dst) = ctx();
        dst.set_color(Color::RED);
        let p = Vec3::new(0.0, 0.0, 10.0);
        m7.draw_line(&mut dst, p, p);
        assert_eq!(count_color(&dst, Color::RED), 0);
    }

    #[test]
    fn test_triangle_outside_viewport_writes_nothing() {
        let (mut m7, mut dst) = ctx();
        dst.set_color(Color::RED);
        // projects far to the right of the viewport; no side clipping, the
        // rasterizer just never writes outside its bounds
        m7.draw_tri(
            &mut dst,
            [
                Vec3::new(50.0, 2.0, 10.0),
                Vec3::new(52.0, -2.0, 10.0),
                Vec3::new(48.0, -2.0, 10.0),
            ],
        );
        assert_eq!(count_color(&dst, Color::RED), 0);
    }
}
