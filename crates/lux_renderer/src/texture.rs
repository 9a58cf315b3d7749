//! Surface textures sampled by materials.

use std::sync::Arc;

use lux_core::ImageTexture;
use lux_math::{Color, Vec3};

/// Colour as a function of surface coordinates and hit point.
#[derive(Debug, Clone)]
pub enum Texture {
    Solid(Color),
    /// Alternating 3D cells of edge `1 / inv_scale`.
    Checker {
        inv_scale: f32,
        even: Box<Texture>,
        odd: Box<Texture>,
    },
    Image(Arc<ImageTexture>),
}

impl Texture {
    pub fn checker(scale: f32, even: Texture, odd: Texture) -> Self {
        Texture::Checker {
            inv_scale: 1.0 / scale,
            even: Box::new(even),
            odd: Box::new(odd),
        }
    }

    pub fn value(&self, u: f32, v: f32, p: Vec3) -> Color {
        match self {
            Texture::Solid(color) => *color,
            Texture::Checker {
                inv_scale,
                even,
                odd,
            } => {
                let cell = (*inv_scale * p).floor();
                let parity = (cell.x as i64 + cell.y as i64 + cell.z as i64).rem_euclid(2);
                if parity == 0 {
                    even.value(u, v, p)
                } else {
                    odd.value(u, v, p)
                }
            }
            Texture::Image(image) => image.sample(u, v),
        }
    }
}

impl From<Color> for Texture {
    fn from(color: Color) -> Self {
        Texture::Solid(color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solid_ignores_coordinates() {
        let tex = Texture::from(Color::new(0.1, 0.2, 0.3));
        assert_eq!(tex.value(0.9, 0.1, Vec3::splat(100.0)), Color::new(0.1, 0.2, 0.3));
    }

    #[test]
    fn test_checker_alternates() {
        let black = Texture::Solid(Color::ZERO);
        let white = Texture::Solid(Color::ONE);
        let tex = Texture::checker(1.0, white, black);

        assert_eq!(tex.value(0.0, 0.0, Vec3::new(0.5, 0.5, 0.5)), Color::ONE);
        assert_eq!(tex.value(0.0, 0.0, Vec3::new(1.5, 0.5, 0.5)), Color::ZERO);
        assert_eq!(tex.value(0.0, 0.0, Vec3::new(-0.5, 0.5, 0.5)), Color::ZERO);
        assert_eq!(tex.value(0.0, 0.0, Vec3::new(1.5, 1.5, 0.5)), Color::ONE);
    }

    #[test]
    fn test_image_texture_samples_uv() {
        let image = ImageTexture::new(1, 1, vec![Color::new(0.0, 1.0, 1.0)], "<test>");
        let tex = Texture::Image(Arc::new(image));
        assert_eq!(tex.value(0.3, 0.7, Vec3::ZERO), Color::new(0.0, 1.0, 1.0));
    }
}
