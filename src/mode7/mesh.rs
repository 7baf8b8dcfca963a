//! OBJ mesh submission
//!
//! Meshes are drawn one flat-colored triangle at a time: each face is
//! rotated around the vertical axis, translated into the world, and handed
//! to the triangle rasterizer. No lighting, no per-vertex shading.

use super::{Mode7, Vec3};
use crate::bitmap::{Bitmap, Color};
use crate::obj::ObjMesh;

impl Mode7 {
    /// Draw `mesh` at world position `pos`, rotated around the Y axis by
    /// `yrot`, filled with `color`. Faces referencing missing vertices are
    /// skipped silently.
    pub fn draw_mesh(
        &mut self,
        dst: &mut Bitmap,
        mesh: &ObjMesh,
        pos: Vec3,
        yrot: f32,
        color: Color,
    ) {
        let (s, c) = yrot.sin_cos();
        dst.set_color(color);

        for face in &mesh.faces {
            let mut tri = [Vec3::ZERO; 3];
            let mut valid = true;
            for (corner, out) in face.iter().zip(tri.iter_mut()) {
                match mesh.vertices.get(corner.v) {
                    Some(v) => {
                        // rotate around Y, then translate
                        *out = Vec3::new(v.x * c + v.z * s, v.y, -v.x * s + v.z * c) + pos;
                    }
                    None => {
                        valid = false;
                        break;
                    }
                }
            }
            if valid {
                self.draw_tri(dst, tri);
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
        m7.set_camera_position(0.0, 0.0, 0.0);
        m7.set_camera_angles(0.0, 0.0);
        (m7, Bitmap::new(W, H, Color::BLACK))
    }

    /// A single clockwise-facing triangle centered on the origin
    fn tri_mesh() -> ObjMesh {
        let mut mesh = ObjMesh::new();
        let a = mesh.add_vertex(Vec3::new(0.0, 2.0, 0.0));
        let b = mesh.add_vertex(Vec3::new(2.0, -2.0, 0.0));
        let c = mesh.add_vertex(Vec3::new(-2.0, -2.0, 0.0));
        mesh.add_face(a, b, c);
        mesh
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

    #[test]
    fn test_mesh_draws_with_flat_color() {
        let (mut m7, mut dst) = ctx();
        m7.draw_mesh(&mut dst, &tri_mesh(), Vec3::new(0.0, 0.0, 20.0), 0.0, Color::GREEN);
        assert!(count_color(&dst, Color::GREEN) > 10);
    }

    #[test]
    fn test_yrot_spins_the_mesh() {
        let (mut m7, mut dst) = ctx();
        let mesh = tri_mesh();
        let pos = Vec3::new(0.0, 0.0, 20.0);

        m7.draw_mesh(&mut dst, &mesh, pos, 0.0, Color::GREEN);
        let front = count_color(&dst, Color::GREEN);

        // rotated a quarter turn the triangle is edge-on: nearly no pixels
        let (mut m7, mut dst) = ctx();
        m7.draw_mesh(&mut dst, &mesh, pos, std::f32::consts::FRAC_PI_2, Color::GREEN);
        let side = count_color(&dst, Color::GREEN);

        assert!(front > 10);
        assert!(side < front / 2);
    }

    #[test]
    fn test_mesh_behind_camera_draws_nothing() {
        let (mut m7, mut dst) = ctx();
        m7.draw_mesh(&mut dst, &tri_mesh(), Vec3::new(0.0, 0.0, -20.0), 0.0, Color::GREEN);
        assert_eq!(count_color(&dst, Color::GREEN), 0);
    }

    #[test]
    fn test_face_with_missing_vertex_skipped() {
        let (mut m7, mut dst) = ctx();
        let mut mesh = tri_mesh();
        mesh.add_face(0, 1, 99);
        m7.draw_mesh(&mut dst, &mesh, Vec3::new(0.0, 0.0, 20.0), 0.0, Color::GREEN);
        assert!(count_color(&dst, Color::GREEN) > 10);
    }
}
