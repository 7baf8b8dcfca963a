//! Wavefront OBJ mesh loading
//! Supports the basic OBJ surface: vertices (v), texture coords (vt),
//! normals (vn) and faces (f). Faces with more than 3 vertices are fan
//! triangulated; materials are not consumed (the renderer draws meshes with
//! a single flat color).

#![allow(dead_code)]

use crate::mode7::{Vec2, Vec3};
use std::path::Path;

/// One corner of a triangulated face: indices into the mesh's vertex,
/// texcoord and normal pools
#[derive(Debug, Clone, Copy)]
pub struct FaceVert {
    pub v: usize,
    pub vt: Option<usize>,
    pub vn: Option<usize>,
}

/// A triangulated face; parsing guarantees exactly three corners
pub type Face = [FaceVert; 3];

/// Axis-aligned bounding box over the mesh vertices
#[derive(Debug, Clone, Copy)]
pub struct Bounds {
    pub min: Vec3,
    pub max: Vec3,
}

impl Default for Bounds {
    fn default() -> Self {
        Self {
            min: Vec3::new(f32::INFINITY, f32::INFINITY, f32::INFINITY),
            max: Vec3::new(f32::NEG_INFINITY, f32::NEG_INFINITY, f32::NEG_INFINITY),
        }
    }
}

impl Bounds {
    fn grow(&mut self, p: Vec3) {
        self.min.x = self.min.x.min(p.x);
        self.min.y = self.min.y.min(p.y);
        self.min.z = self.min.z.min(p.z);
        self.max.x = self.max.x.max(p.x);
        self.max.y = self.max.y.max(p.y);
        self.max.z = self.max.z.max(p.z);
    }
}

/// In-memory mesh: vertex/normal/texcoord pools plus triangulated faces.
/// The renderer treats this as read-only input.
#[derive(Debug, Clone, Default)]
pub struct ObjMesh {
    pub vertices: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub texcoords: Vec<Vec2>,
    pub faces: Vec<Face>,
    pub bounds: Bounds,
}

impl ObjMesh {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a vertex, growing the bounding box; returns its index
    pub fn add_vertex(&mut self, p: Vec3) -> usize {
        self.bounds.grow(p);
        self.vertices.push(p);
        self.vertices.len() - 1
    }

    /// Append a plain triangle over three vertex indices
    pub fn add_face(&mut self, v0: usize, v1: usize, v2: usize) {
        let corner = |v| FaceVert { v, vt: None, vn: None };
        self.faces.push([corner(v0), corner(v1), corner(v2)]);
    }

    /// Load a mesh from an OBJ file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ObjError> {
        let contents = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ObjError::Io(format!("Failed to read file: {}", e)))?;
        Self::parse(&contents)
    }

    /// Parse OBJ file contents
    pub fn parse(contents: &str) -> Result<Self, ObjError> {
        let mut mesh = ObjMesh::new();

        for (line_num, line) in contents.lines().enumerate() {
            let line = line.trim();

            // Skip empty lines and comments
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let parts: Vec<&str> = line.split_whitespace().collect();
            match parts[0] {
                "v" => {
                    // Vertex position: v x y z
                    if parts.len() < 4 {
                        return Err(ObjError::Parse(format!(
                            "Line {}: Invalid vertex position (expected 3 values)",
                            line_num + 1
                        )));
                    }
                    let x = parse_float(parts[1], line_num)?;
                    let y = parse_float(parts[2], line_num)?;
                    let z = parse_float(parts[3], line_num)?;
                    mesh.add_vertex(Vec3::new(x, y, z));
                }

                "vt" => {
                    // Texture coordinate: vt u v
                    if parts.len() < 3 {
                        return Err(ObjError::Parse(format!(
                            "Line {}: Invalid texture coordinate (expected 2 values)",
                            line_num + 1
                        )));
                    }
                    let u = parse_float(parts[1], line_num)?;
                    let v = parse_float(parts[2], line_num)?;
                    mesh.texcoords.push(Vec2::new(u, v));
                }

                "vn" => {
                    // Normal: vn x y z
                    if parts.len() < 4 {
                        return Err(ObjError::Parse(format!(
                            "Line {}: Invalid normal (expected 3 values)",
                            line_num + 1
                        )));
                    }
                    let x = parse_float(parts[1], line_num)?;
                    let y = parse_float(parts[2], line_num)?;
                    let z = parse_float(parts[3], line_num)?;
                    mesh.normals.push(Vec3::new(x, y, z));
                }

                "f" => {
                    // Face: f v1/vt1/vn1 v2/vt2/vn2 ...
                    if parts.len() < 4 {
                        return Err(ObjError::Parse(format!(
                            "Line {}: Face must have at least 3 vertices",
                            line_num + 1
                        )));
                    }

                    let mut corners = Vec::with_capacity(parts.len() - 1);
                    for spec in &parts[1..] {
                        corners.push(parse_face_vertex(spec, line_num, &mesh)?);
                    }

                    // Fan triangulation for quads and n-gons.
                    // OBJ uses CCW winding; the rasterizer treats clockwise
                    // as front-facing, so swap two corners per triangle.
                    for i in 1..(corners.len() - 1) {
                        mesh.faces.push([corners[0], corners[i + 1], corners[i]]);
                    }
                }

                _ => {
                    // Ignore other OBJ commands (o, g, s, usemtl, mtllib, ...)
                }
            }
        }

        if mesh.vertices.is_empty() {
            return Err(ObjError::Parse("No vertices found in OBJ file".to_string()));
        }
        if mesh.faces.is_empty() {
            return Err(ObjError::Parse("No faces found in OBJ file".to_string()));
        }

        Ok(mesh)
    }
}

/// Parse a face vertex string like "1/2/3" or "1//3" or "1"
fn parse_face_vertex(spec: &str, line_num: usize, mesh: &ObjMesh) -> Result<FaceVert, ObjError> {
    let parts: Vec<&str> = spec.split('/').collect();

    // Position index (required)
    if parts[0].is_empty() {
        return Err(ObjError::Parse(format!(
            "Line {}: Missing position index in face",
            line_num + 1
        )));
    }
    let v = parse_index(parts[0], mesh.vertices.len(), line_num)?;

    // Texture coordinate index (optional)
    let vt = if parts.len() > 1 && !parts[1].is_empty() {
        Some(parse_index(parts[1], mesh.texcoords.len(), line_num)?)
    } else {
        None
    };

    // Normal index (optional)
    let vn = if parts.len() > 2 && !parts[2].is_empty() {
        Some(parse_index(parts[2], mesh.normals.len(), line_num)?)
    } else {
        None
    };

    Ok(FaceVert { v, vt, vn })
}

fn parse_float(s: &str, line_num: usize) -> Result<f32, ObjError> {
    s.parse().map_err(|_| {
        ObjError::Parse(format!("Line {}: Invalid float value '{}'", line_num + 1, s))
    })
}

/// Parse an index (handles negative indices for relative indexing)
fn parse_index(s: &str, count: usize, line_num: usize) -> Result<usize, ObjError> {
    let idx: i32 = s.parse().map_err(|_| {
        ObjError::Parse(format!("Line {}: Invalid index '{}'", line_num + 1, s))
    })?;

    let result = if idx > 0 {
        // Positive index (1-based)
        (idx - 1) as usize
    } else if idx < 0 {
        // Negative index (relative to current count)
        let r = count as i32 + idx;
        if r < 0 {
            return Err(ObjError::Parse(format!(
                "Line {}: Index {} out of range (have {} elements)",
                line_num + 1,
                idx,
                count
            )));
        }
        r as usize
    } else {
        return Err(ObjError::Parse(format!(
            "Line {}: Index cannot be 0",
            line_num + 1
        )));
    };

    if result >= count {
        return Err(ObjError::Parse(format!(
            "Line {}: Index {} out of range (have {} elements)",
            line_num + 1,
            idx,
            count
        )));
    }

    Ok(result)
}

/// Error types for OBJ import
#[derive(Debug)]
pub enum ObjError {
    Io(String),
    Parse(String),
}

impl std::fmt::Display for ObjError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            ObjError::Io(e) => write!(f, "IO error: {}", e),
            ObjError::Parse(e) => write!(f, "Parse error: {}", e),
        }
    }
}

impl std::error::Error for ObjError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_simple_triangle() {
        let obj = r#"
# Simple triangle
v 0.0 0.0 0.0
v 1.0 0.0 0.0
v 0.0 1.0 0.0
vn 0.0 0.0 1.0
f 1//1 2//1 3//1
"#;

        let mesh = ObjMesh::parse(obj).unwrap();
        assert_eq!(mesh.vertices.len(), 3);
        assert_eq!(mesh.normals.len(), 1);
        assert_eq!(mesh.faces.len(), 1);
        assert_eq!(mesh.faces[0][0].vn, Some(0));
    }

    #[test]
    fn test_parse_quad_triangulation() {
        let obj = r#"
v 0.0 0.0 0.0
v 1.0 0.0 0.0
v 1.0 1.0 0.0
v 0.0 1.0 0.0
f 1 2 3 4
"#;

        let mesh = ObjMesh::parse(obj).unwrap();
        assert_eq!(mesh.vertices.len(), 4);
        assert_eq!(mesh.faces.len(), 2); // Quad split into 2 triangles
        // fan shares the first corner
        assert_eq!(mesh.faces[0][0].v, 0);
        assert_eq!(mesh.faces[1][0].v, 0);
    }

    #[test]
    fn test_parse_with_texture_coords() {
        let obj = r#"
v 0.0 0.0 0.0
v 1.0 0.0 0.0
v 0.0 1.0 0.0
vt 0.0 0.0
vt 1.0 0.0
vt 0.0 1.0
f 1/1 2/2 3/3
"#;

        let mesh = ObjMesh::parse(obj).unwrap();
        assert_eq!(mesh.texcoords.len(), 3);
        assert_eq!(mesh.faces[0][0].vt, Some(0));
    }

    #[test]
    fn test_parse_negative_indices() {
        let obj = r#"
v 0.0 0.0 0.0
v 1.0 0.0 0.0
v 0.0 1.0 0.0
f -3 -2 -1
"#;

        let mesh = ObjMesh::parse(obj).unwrap();
        assert_eq!(mesh.faces.len(), 1);
        assert_eq!(mesh.faces[0][0].v, 0);
    }

    #[test]
    fn test_bounds_tracked() {
        let obj = r#"
v -1.0 0.0 5.0
v 2.0 -3.0 0.0
v 0.0 1.0 -4.0
f 1 2 3
"#;

        let mesh = ObjMesh::parse(obj).unwrap();
        assert_eq!(mesh.bounds.min, Vec3::new(-1.0, -3.0, -4.0));
        assert_eq!(mesh.bounds.max, Vec3::new(2.0, 1.0, 5.0));
    }

    #[test]
    fn test_out_of_range_index_rejected() {
        let obj = "v 0 0 0\nf 1 2 3\n";
        assert!(matches!(ObjMesh::parse(obj), Err(ObjError::Parse(_))));
    }

    #[test]
    fn test_empty_input_rejected() {
        assert!(ObjMesh::parse("# nothing here\n").is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3").unwrap();

        let mesh = ObjMesh::load(file.path()).unwrap();
        assert_eq!(mesh.vertices.len(), 3);
        assert_eq!(mesh.faces.len(), 1);

        assert!(ObjMesh::load("/nonexistent/mesh.obj").is_err());
    }
}
