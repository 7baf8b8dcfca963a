//! Pixel buffer used by every drawing primitive.
//!
//! A `Bitmap` is a dense RGB image with a "current drawing color": triangles
//! and lines fill with the destination's current color, and sprite sources
//! use their current color as the transparency mask.

#![allow(dead_code)]

use serde::{Deserialize, Serialize};

/// 8-bit RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color { r: 0, g: 0, b: 0 };
    pub const WHITE: Color = Color { r: 255, g: 255, b: 255 };
    pub const RED: Color = Color { r: 255, g: 0, b: 0 };
    pub const GREEN: Color = Color { r: 0, g: 255, b: 0 };
    pub const BLUE: Color = Color { r: 0, g: 0, b: 255 };
    /// Conventional sprite-sheet mask color
    pub const MAGENTA: Color = Color { r: 255, g: 0, b: 255 };

    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Interpolate toward another color (used for fog blending)
    pub fn lerp(self, other: Color, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        let inv_t = 1.0 - t;
        Self {
            r: (self.r as f32 * inv_t + other.r as f32 * t) as u8,
            g: (self.g as f32 * inv_t + other.g as f32 * t) as u8,
            b: (self.b as f32 * inv_t + other.b as f32 * t) as u8,
        }
    }

    /// Convert to [u8; 4] RGBA (opaque)
    pub fn to_bytes(self) -> [u8; 4] {
        [self.r, self.g, self.b, 255]
    }
}

/// Dense RGB pixel buffer with a current drawing color
#[derive(Debug, Clone)]
pub struct Bitmap {
    pub width: usize,
    pub height: usize,
    pixels: Vec<Color>,
    color: Color,
}

impl Bitmap {
    /// Create a bitmap filled with `fill`
    pub fn new(width: usize, height: usize, fill: Color) -> Self {
        Self {
            width,
            height,
            pixels: vec![fill; width * height],
            color: Color::WHITE,
        }
    }

    /// Load a bitmap from an image file (PNG/JPEG/BMP)
    pub fn from_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self, String> {
        use image::GenericImageView;

        let path = path.as_ref();
        let img = image::open(path)
            .map_err(|e| format!("Failed to load {}: {}", path.display(), e))?;

        let (width, height) = img.dimensions();
        let rgba = img.to_rgba8();

        let pixels: Vec<Color> = rgba
            .pixels()
            .map(|p| Color::new(p[0], p[1], p[2]))
            .collect();

        Ok(Self {
            width: width as usize,
            height: height as usize,
            pixels,
            color: Color::WHITE,
        })
    }

    /// Set the current drawing color (fill color for triangles/lines,
    /// mask color when this bitmap is a sprite source)
    pub fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    /// Get the current drawing color
    pub fn color(&self) -> Color {
        self.color
    }

    pub fn set_pixel(&mut self, x: usize, y: usize, color: Color) {
        if x < self.width && y < self.height {
            self.pixels[y * self.width + x] = color;
        }
    }

    /// Read a pixel; out-of-bounds reads return black
    pub fn get_pixel(&self, x: usize, y: usize) -> Color {
        if x < self.width && y < self.height {
            self.pixels[y * self.width + x]
        } else {
            Color::BLACK
        }
    }

    /// Fill every pixel with `color`
    pub fn clear(&mut self, color: Color) {
        self.pixels.fill(color);
    }

    /// Flatten to RGBA bytes for display upload
    pub fn to_rgba_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.pixels.len() * 4);
        for p in &self.pixels {
            bytes.extend_from_slice(&p.to_bytes());
        }
        bytes
    }
}
