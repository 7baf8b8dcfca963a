//! MODE7: a pseudo-3D software renderer demo
//!
//! Drives every engine primitive in one scene: a panoramic skybox, a
//! checkerboard floor shaded per world sample, billboard sprites that pick a
//! facing frame from the camera bearing, a spinning flat-shaded OBJ mesh and
//! depth-tested axis lines, all composited through the shared z-buffer.
//!
//! Controls: WASD move, Q/E turn, R/F pitch, Z/X fly. The stencil buffer is
//! used for picking: hover a sprite with the mouse to see its name.

/// Version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

mod bitmap;
mod mode7;
mod obj;

use bitmap::{Bitmap, Color};
use macroquad::prelude::*;
use mode7::{AnchorMode, Mode7, Vec3};
use obj::ObjMesh;
use serde::{Deserialize, Serialize};

/// Render resolution (the window scales it up with nearest filtering)
const WIDTH: usize = 320;
const HEIGHT: usize = 240;

const SCENE_PATH: &str = "assets/scene.ron";

/// Fallback mesh when the scene's OBJ file is missing
const CUBE_OBJ: &str = "\
v -1 -1 -1\nv 1 -1 -1\nv 1 1 -1\nv -1 1 -1\n\
v -1 -1 1\nv 1 -1 1\nv 1 1 1\nv -1 1 1\n\
f 5 6 7 8\nf 2 1 4 3\nf 6 2 3 7\nf 1 5 8 4\nf 3 4 8 7\nf 1 2 6 5\n";

// =============================================================================
// Scene description (RON)
// =============================================================================

#[derive(Debug, Serialize, Deserialize)]
struct Scene {
    camera_pos: Vec3,
    camera_phi: f32,
    camera_theta: f32,
    fog: Option<FogSettings>,
    sprites: Vec<SpriteSpec>,
    mesh: Option<MeshSpec>,
}

#[derive(Debug, Serialize, Deserialize)]
struct FogSettings {
    color: Color,
    start: f32,
    falloff: f32,
}

#[derive(Debug, Serialize, Deserialize)]
struct SpriteSpec {
    name: String,
    pos: Vec3,
    /// World yaw the sprite is facing; the renderer picks one of four
    /// pre-rendered facings from the bearing relative to the camera
    facing: f32,
}

#[derive(Debug, Serialize, Deserialize)]
struct MeshSpec {
    path: String,
    pos: Vec3,
    /// Spin speed in radians per second
    spin: f32,
    color: Color,
}

impl Default for Scene {
    fn default() -> Self {
        Self {
            camera_pos: Vec3::new(0.0, 6.0, -14.0),
            camera_phi: 0.0,
            camera_theta: 0.35,
            fog: None,
            sprites: vec![SpriteSpec {
                name: "tower".to_string(),
                pos: Vec3::new(-8.0, 0.0, 12.0),
                facing: 0.0,
            }],
            mesh: None,
        }
    }
}

fn load_scene(path: &str) -> Scene {
    match std::fs::read_to_string(path) {
        Ok(text) => match ron::from_str(&text) {
            Ok(scene) => scene,
            Err(e) => {
                println!("Failed to parse {}: {}, using default scene", path, e);
                Scene::default()
            }
        },
        Err(e) => {
            println!("Failed to read {}: {}, using default scene", path, e);
            Scene::default()
        }
    }
}

// =============================================================================
// Generated art (panorama, sprite sheet, floor shading)
// =============================================================================

/// Horizon panorama: sky gradient over a mountain silhouette
fn make_panorama() -> Bitmap {
    let w = 512;
    let h = 64;
    let mut bmp = Bitmap::new(w, h, Color::BLACK);
    for x in 0..w {
        let a = x as f32 / w as f32 * std::f32::consts::TAU;
        // two sine octaves; same period as the image so the seam matches
        let ridge = 0.55 + 0.18 * (a * 3.0).sin() + 0.1 * (a * 7.0).sin();
        let ridge_y = (ridge * h as f32) as usize;
        for y in 0..h {
            let t = y as f32 / h as f32;
            let color = if y >= ridge_y {
                Color::new(70, 60, 80)
            } else {
                Color::new(90, 120, 200).lerp(Color::new(170, 200, 235), t)
            };
            bmp.set_pixel(x, y, color);
        }
    }
    bmp
}

/// Four 16x16 facings side by side on a magenta mask background.
/// Each facing is a disc with a differently tinted "front" stripe.
fn make_sprite_sheet() -> Bitmap {
    let frame = 16;
    let mut bmp = Bitmap::new(frame * 4, frame, Color::MAGENTA);
    let tints = [
        Color::new(220, 220, 80),
        Color::new(80, 220, 220),
        Color::new(220, 80, 80),
        Color::new(160, 80, 220),
    ];
    for (i, tint) in tints.iter().enumerate() {
        let ox = i * frame;
        for y in 0..frame {
            for x in 0..frame {
                let dx = x as f32 - 7.5;
                let dy = y as f32 - 7.5;
                if dx * dx + dy * dy < 49.0 {
                    let body = Color::new(200, 200, 200);
                    let color = if y < 5 { *tint } else { body };
                    bmp.set_pixel(ox + x, y, color);
                }
            }
        }
    }
    bmp.set_color(Color::MAGENTA);
    bmp
}

fn checker_floor(wx: f32, wz: f32) -> Color {
    let cell = ((wx / 4.0).floor() as i32 & 1) ^ ((wz / 4.0).floor() as i32 & 1);
    if cell == 0 {
        Color::new(70, 120, 70)
    } else {
        Color::new(45, 85, 45)
    }
}

/// Pick one of four sprite facings from the bearing relative to the camera
fn facing_frame(rel: f32) -> usize {
    use std::f32::consts::{FRAC_PI_2, FRAC_PI_4};
    ((rel + FRAC_PI_4) / FRAC_PI_2) as usize % 4
}

// =============================================================================
// Entry point
// =============================================================================

fn window_conf() -> Conf {
    Conf {
        window_title: format!("MODE7 v{}", VERSION),
        window_width: (WIDTH * 2) as i32,
        window_height: (HEIGHT * 2) as i32,
        window_resizable: true,
        high_dpi: true,
        ..Default::default()
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    // Initialize crash logging FIRST (before any other code)
    #[cfg(not(target_arch = "wasm32"))]
    crashlog::setup!(crashlog::cargo_metadata!().capitalized(), false);

    let scene = load_scene(SCENE_PATH);

    let mut m7 = match Mode7::new(0, 0, WIDTH, HEIGHT) {
        Ok(m7) => m7,
        Err(e) => {
            println!("Failed to create render context: {}", e);
            return;
        }
    };
    m7.set_camera_position(scene.camera_pos.x, scene.camera_pos.y, scene.camera_pos.z);
    m7.set_camera_angles(scene.camera_phi, scene.camera_theta);
    m7.set_backface_cull(true);
    if let Some(fog) = &scene.fog {
        m7.set_fog(fog.color, fog.start, fog.falloff);
    }

    let mut frame = Bitmap::new(WIDTH, HEIGHT, Color::BLACK);
    // an image file takes precedence over the generated panorama
    let panorama = match Bitmap::from_file("assets/panorama.png") {
        Ok(bmp) => bmp,
        Err(_) => make_panorama(),
    };
    let sprite_sheet = make_sprite_sheet();

    let mesh = match &scene.mesh {
        Some(spec) => match ObjMesh::load(&spec.path) {
            Ok(mesh) => Some(mesh),
            Err(e) => {
                println!("Failed to load {}: {}, using built-in cube", spec.path, e);
                Some(ObjMesh::parse(CUBE_OBJ).expect("built-in cube is valid"))
            }
        },
        None => None,
    };

    let mut time = 0.0f32;

    loop {
        let delta = get_frame_time();
        time += delta;

        // --- camera input -----------------------------------------------
        let (mut phi, mut theta) = m7.camera_angles();
        if is_key_down(KeyCode::Q) {
            phi -= 1.5 * delta;
        }
        if is_key_down(KeyCode::E) {
            phi += 1.5 * delta;
        }
        if is_key_down(KeyCode::R) {
            theta -= 0.8 * delta;
        }
        if is_key_down(KeyCode::F) {
            theta += 0.8 * delta;
        }
        m7.set_camera_angles(phi, theta);

        let mut pos = m7.camera_position();
        let speed = 12.0 * delta;
        let forward = Vec3::new(phi.sin(), 0.0, phi.cos());
        let right = Vec3::new(phi.cos(), 0.0, -phi.sin());
        if is_key_down(KeyCode::W) {
            pos = pos + forward * speed;
        }
        if is_key_down(KeyCode::S) {
            pos = pos - forward * speed;
        }
        if is_key_down(KeyCode::D) {
            pos = pos + right * speed;
        }
        if is_key_down(KeyCode::A) {
            pos = pos - right * speed;
        }
        if is_key_down(KeyCode::Z) {
            pos.y += 8.0 * delta;
        }
        if is_key_down(KeyCode::X) {
            pos.y = (pos.y - 8.0 * delta).max(1.0);
        }
        m7.set_camera_position(pos.x, pos.y, pos.z);

        // --- render -----------------------------------------------------
        m7.clear_depth();
        frame.clear(Color::BLACK);

        m7.draw_skybox(&mut frame, &panorama, 60, Color::new(60, 90, 180));
        m7.draw_floor(&mut frame, &mut checker_floor);

        if let (Some(mesh), Some(spec)) = (&mesh, &scene.mesh) {
            m7.draw_mesh(&mut frame, mesh, spec.pos, time * spec.spin, spec.color);
        }

        // axis marker at the origin
        frame.set_color(Color::RED);
        m7.draw_line(&mut frame, Vec3::ZERO, Vec3::new(3.0, 0.0, 0.0));
        frame.set_color(Color::GREEN);
        m7.draw_line(&mut frame, Vec3::ZERO, Vec3::new(0.0, 3.0, 0.0));
        frame.set_color(Color::BLUE);
        m7.draw_line(&mut frame, Vec3::ZERO, Vec3::new(0.0, 0.0, 3.0));

        // sprites stamp their index into the stencil buffer for picking;
        // the stencil survives clear_depth, so clear it ourselves each frame
        m7.clear_stencil();
        m7.stencil_enable(true);
        for (i, sprite) in scene.sprites.iter().enumerate() {
            m7.set_stencil(Color::new(i as u8 + 1, 0, 0));
            m7.set_anchor_mode(if sprite.pos.y > 0.0 {
                AnchorMode::Center
            } else {
                AnchorMode::Bottom
            });
            let frame_idx = facing_frame(m7.rel_angle(sprite.facing));
            m7.draw_sprite(
                &mut frame,
                sprite.pos.x,
                sprite.pos.y,
                sprite.pos.z,
                &sprite_sheet,
                frame_idx * 16,
                0,
                16,
                16,
            );
        }
        m7.stencil_enable(false);

        // --- present ----------------------------------------------------
        let texture = Texture2D::from_rgba8(WIDTH as u16, HEIGHT as u16, &frame.to_rgba_bytes());
        texture.set_filter(FilterMode::Nearest);

        // letterboxed destination preserving the 4:3 aspect ratio
        let fb_aspect = WIDTH as f32 / HEIGHT as f32;
        let screen_aspect = screen_width() / screen_height();
        let (draw_w, draw_h, draw_x, draw_y) = if fb_aspect > screen_aspect {
            let w = screen_width();
            let h = w / fb_aspect;
            (w, h, 0.0, (screen_height() - h) * 0.5)
        } else {
            let h = screen_height();
            let w = h * fb_aspect;
            (w, h, (screen_width() - w) * 0.5, 0.0)
        };

        clear_background(macroquad::prelude::Color::from_rgba(10, 10, 12, 255));
        draw_texture_ex(
            &texture,
            draw_x,
            draw_y,
            WHITE,
            DrawTextureParams {
                dest_size: Some(vec2(draw_w, draw_h)),
                ..Default::default()
            },
        );

        // --- stencil picking --------------------------------------------
        let (mx, my) = mouse_position();
        let fx = ((mx - draw_x) / draw_w * WIDTH as f32) as i32;
        let fy = ((my - draw_y) / draw_h * HEIGHT as f32) as i32;
        if fx >= 0 && fy >= 0 && (fx as usize) < WIDTH && (fy as usize) < HEIGHT {
            let id = m7.stencil_at(fx as usize, fy as usize).r;
            if id > 0 {
                if let Some(sprite) = scene.sprites.get(id as usize - 1) {
                    draw_text(&sprite.name, mx + 12.0, my, 18.0, WHITE);
                }
            }
        }

        draw_text(
            "WASD move | QE turn | RF pitch | ZX fly",
            8.0,
            screen_height() - 10.0,
            16.0,
            macroquad::prelude::Color::from_rgba(180, 180, 190, 200),
        );

        next_frame().await;
    }
}
