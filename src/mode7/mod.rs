//! Mode-7 style pseudo-3D renderer
//!
//! Draws a perspective ground plane the SNES way: one inverse projection per
//! scanline, no polygon soup. On top of that, billboard sprites, flat-shaded
//! triangles/meshes and 3D lines are composited through a shared z-buffer,
//! with an auxiliary stencil buffer for picking/marking.
//!
//! # Module Organization
//!
//! - `math` - Vec3/Vec2 vector types
//! - `camera` - Camera pose and look-at
//! - `floor` - Scanline floor rasterizer and the `FloorShader` trait
//! - `sky` - Panoramic skybox renderer
//! - `sprite` - Distance-scaled billboard sprites
//! - `raster` - Filled triangles and depth-tested 3D lines
//! - `mesh` - OBJ mesh submission
//!
//! All state lives in the [`Mode7`] context: camera, viewport, depth and
//! stencil buffers, and the frame-scoped settings (anchor mode, backface
//! culling, fog, stencil color). Settings persist until changed. One context
//! renders one viewport; nothing here is thread-safe.

#![allow(dead_code)]

pub mod camera;
pub mod floor;
pub mod math;
pub mod mesh;
pub mod raster;
pub mod sky;
pub mod sprite;

pub use camera::Camera;
pub use floor::FloorShader;
pub use math::{Vec2, Vec3};

use crate::bitmap::{Bitmap, Color};
use serde::{Deserialize, Serialize};

/// Points with camera-space depth at or below this never project
pub const NEAR_PLANE: f32 = 0.05;

/// Vertical field of view. The focal length is derived from this and the
/// viewport height, so the floor inversion in `floor.rs` stays the exact
/// algebraic inverse of [`Mode7::project`].
pub const FOV_Y: f32 = std::f32::consts::FRAC_PI_3;

/// Vertical placement of sprites relative to their projected world point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AnchorMode {
    /// Rectangle centered on the projected point (floating objects)
    #[default]
    Center,
    /// Rectangle bottom edge on the projected point (objects on the floor)
    Bottom,
}

/// Depth-cueing toward a single color
#[derive(Debug, Clone, Copy)]
pub struct Fog {
    pub color: Color,
    /// Depth where fog starts
    pub start: f32,
    /// Distance over which fog ramps from none to full
    pub falloff: f32,
}

/// Errors surfaced at context construction
#[derive(Debug)]
pub enum Mode7Error {
    EmptyViewport,
}

impl std::fmt::Display for Mode7Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Mode7Error::EmptyViewport => write!(f, "viewport must have nonzero size"),
        }
    }
}

impl std::error::Error for Mode7Error {}

/// Screen rectangle all primitives draw into
#[derive(Debug, Clone, Copy)]
pub struct Viewport {
    pub x: usize,
    pub y: usize,
    pub w: usize,
    pub h: usize,
}

impl Viewport {
    fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x as i32
            && y >= self.y as i32
            && x < (self.x + self.w) as i32
            && y < (self.y + self.h) as i32
    }

    /// Horizontal center
    pub fn cx(&self) -> f32 {
        self.x as f32 + self.w as f32 / 2.0
    }

    /// Vertical center
    pub fn cy(&self) -> f32 {
        self.y as f32 + self.h as f32 / 2.0
    }
}

/// The render context: camera, viewport, depth/stencil buffers and
/// frame-scoped draw settings
pub struct Mode7 {
    camera: Camera,
    viewport: Viewport,
    focal: f32,
    zbuffer: Vec<f32>,
    stencil: Bitmap,
    stencil_enabled: bool,
    stencil_color: Color,
    anchor: AnchorMode,
    backface_cull: bool,
    fog: Option<Fog>,
}

impl Mode7 {
    /// Create a context rendering into the given viewport rectangle.
    /// The depth and stencil buffers are sized `w`×`h`.
    pub fn new(x: usize, y: usize, w: usize, h: usize) -> Result<Self, Mode7Error> {
        if w == 0 || h == 0 {
            return Err(Mode7Error::EmptyViewport);
        }
        let viewport = Viewport { x, y, w, h };
        Ok(Self {
            camera: Camera::new(),
            viewport,
            focal: (h as f32 / 2.0) / (FOV_Y / 2.0).tan(),
            zbuffer: vec![f32::INFINITY; w * h],
            stencil: Bitmap::new(w, h, Color::BLACK),
            stencil_enabled: false,
            stencil_color: Color::WHITE,
            anchor: AnchorMode::default(),
            backface_cull: false,
            fog: None,
        })
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub(crate) fn focal(&self) -> f32 {
        self.focal
    }

    // --- camera ---------------------------------------------------------

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn set_camera_position(&mut self, x: f32, y: f32, z: f32) {
        self.camera.set_position(x, y, z);
    }

    pub fn camera_position(&self) -> Vec3 {
        self.camera.position()
    }

    pub fn set_camera_angles(&mut self, phi: f32, theta: f32) {
        self.camera.set_angles(phi, theta);
    }

    pub fn camera_angles(&self) -> (f32, f32) {
        self.camera.angles()
    }

    /// Aim the camera at a world point from its current position
    pub fn look_at(&mut self, x: f32, y: f32, z: f32) {
        self.camera.look_at(Vec3::new(x, y, z));
    }

    /// Bearing of an object facing `phi_o`, relative to the camera yaw,
    /// normalized into [0, 2π). Used to pick among pre-rendered sprite
    /// facings.
    pub fn rel_angle(&self, phi_o: f32) -> f32 {
        (phi_o - self.camera.phi()).rem_euclid(std::f32::consts::TAU)
    }

    // --- frame-scoped settings ------------------------------------------

    pub fn set_anchor_mode(&mut self, mode: AnchorMode) {
        self.anchor = mode;
    }

    pub fn anchor_mode(&self) -> AnchorMode {
        self.anchor
    }

    pub fn set_backface_cull(&mut self, enable: bool) {
        self.backface_cull = enable;
    }

    pub fn backface_cull(&self) -> bool {
        self.backface_cull
    }

    /// Enable fog with a default depth ramp
    pub fn enable_fog(&mut self, color: Color) {
        self.set_fog(color, 0.0, self.focal * 4.0);
    }

    /// Enable fog with an explicit start depth and falloff distance
    pub fn set_fog(&mut self, color: Color, start: f32, falloff: f32) {
        self.fog = Some(Fog { color, start, falloff });
    }

    pub fn disable_fog(&mut self) {
        self.fog = None;
    }

    pub fn fog(&self) -> Option<Fog> {
        self.fog
    }

    // --- depth buffer ---------------------------------------------------

    /// Reset every depth cell to "infinitely far". Must be called once per
    /// frame before any drawing.
    pub fn clear_depth(&mut self) {
        self.zbuffer.fill(f32::INFINITY);
    }

    // --- stencil buffer -------------------------------------------------

    /// While enabled, every depth write also stamps the stencil buffer with
    /// the current stencil color
    pub fn stencil_enable(&mut self, enable: bool) {
        self.stencil_enabled = enable;
    }

    pub fn set_stencil(&mut self, color: Color) {
        self.stencil_color = color;
    }

    /// Zero-fill the stencil buffer. The stencil is untouched by
    /// [`clear_depth`](Self::clear_depth) and persists across frames.
    pub fn clear_stencil(&mut self) {
        self.stencil.clear(Color::BLACK);
    }

    /// Stencil value at a viewport-relative pixel (black outside)
    pub fn stencil_at(&self, x: usize, y: usize) -> Color {
        self.stencil.get_pixel(x, y)
    }

    /// The stencil buffer as a read-only image
    pub fn stencil(&self) -> &Bitmap {
        &self.stencil
    }

    // --- projection -----------------------------------------------------

    /// Project a world point to screen coordinates.
    ///
    /// Pinhole model: translate by the camera position, rotate by -yaw then
    /// -pitch, perspective-divide by the forward depth scaled by the focal
    /// length (`(h/2)/tan(FOV_Y/2)`). The result carries screen x/y and the
    /// camera-space forward depth in `z`. Returns `None` when the point is
    /// at or behind the near plane; there is no side clipping.
    pub fn project(&self, p: Vec3) -> Option<Vec3> {
        let d = p - self.camera.position();
        let (sp, cp) = self.camera.phi().sin_cos();
        let (st, ct) = self.camera.theta().sin_cos();

        // yaw: forward at phi=0 is +Z, right is +X
        let x1 = d.x * cp - d.z * sp;
        let z1 = d.x * sp + d.z * cp;
        // pitch: theta > 0 looks down
        let y2 = d.y * ct + z1 * st;
        let z2 = -d.y * st + z1 * ct;

        if z2 <= NEAR_PLANE {
            return None;
        }

        Some(Vec3::new(
            self.viewport.cx() + self.focal * x1 / z2,
            self.viewport.cy() - self.focal * y2 / z2,
            z2,
        ))
    }

    /// Screen row of the horizon for the current pitch (may lie outside the
    /// viewport)
    pub(crate) fn horizon(&self) -> f32 {
        self.viewport.cy() - self.focal * self.camera.theta().tan()
    }

    // --- pixel discipline -----------------------------------------------

    /// Depth-test-and-write a single pixel. Applies fog to `color` first
    /// (fog never affects the test itself), rejects pixels outside the
    /// viewport or not strictly closer than the stored depth, and stamps the
    /// stencil buffer alongside every depth write while stencil is enabled.
    pub(crate) fn plot(
        &mut self,
        dst: &mut Bitmap,
        x: i32,
        y: i32,
        depth: f32,
        color: Color,
    ) -> bool {
        if !self.viewport.contains(x, y) {
            return false;
        }
        let vx = x as usize - self.viewport.x;
        let vy = y as usize - self.viewport.y;
        let idx = vy * self.viewport.w + vx;
        if depth >= self.zbuffer[idx] {
            return false;
        }
        self.zbuffer[idx] = depth;

        let color = match self.fog {
            Some(fog) => color.lerp(fog.color, fog_factor(depth, fog.start, fog.falloff)),
            None => color,
        };
        dst.set_pixel(x as usize, y as usize, color);

        if self.stencil_enabled {
            self.stencil.set_pixel(vx, vy, self.stencil_color);
        }
        true
    }
}

/// Fog intensity for a depth: 0 before `start`, ramping linearly to 1 over
/// `falloff`
#[inline]
fn fog_factor(depth: f32, start: f32, falloff: f32) -> f32 {
    if depth <= start {
        0.0
    } else if falloff <= 0.0 {
        1.0
    } else {
        ((depth - start) / falloff).min(1.0)
    }
}
