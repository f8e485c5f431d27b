use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Surface look of a body. Everything but `Flat` is painted procedurally.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SurfaceStyle {
    Flat,
    Rocky,
    Banded,
    Oceanic,
    Solar,
    Icy,
}

impl SurfaceStyle {
    pub fn is_procedural(self) -> bool {
        self != SurfaceStyle::Flat
    }
}

/// RGBA8 pixels, row-major from the top row.
#[derive(Clone, Debug, PartialEq)]
pub struct TextureData {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

/// Largest procedural map height; the width is twice this.
pub const MAX_TEXTURE_SIZE: u32 = 4096;

/// Width and height of an equirectangular map for a requested `size`.
fn map_dimensions(size: u32) -> (u32, u32) {
    let height = size.clamp(2, MAX_TEXTURE_SIZE);
    (height * 2, height)
}

fn texel_count(width: u32, height: u32) -> usize {
    width as usize * height as usize
}

impl TextureData {
    pub fn solid(width: u32, height: u32, color: (f32, f32, f32)) -> Self {
        let texels = texel_count(width, height);
        let mut pixels = Vec::with_capacity(texels * 4);
        for _ in 0..texels {
            pixels.extend_from_slice(&to_rgba(color));
        }
        TextureData { width, height, pixels }
    }

    /// Equirectangular map twice as wide as it is tall. Identical inputs give
    /// identical pixels.
    pub fn procedural(style: SurfaceStyle, base: (f32, f32, f32), size: u32, seed: u64) -> Self {
        let (width, height) = map_dimensions(size);
        if style == SurfaceStyle::Flat {
            return TextureData::solid(width, height, base);
        }

        let mut rng = SmallRng::seed_from_u64(seed);
        let noise = ValueNoise::new(&mut rng, 8);
        let craters: Vec<(f32, f32, f32)> = (0..24)
            .map(|_| (rng.gen::<f32>(), rng.gen_range(0.15..0.85), rng.gen_range(0.01..0.05)))
            .collect();
        let band_phase = rng.gen_range(0.0..std::f32::consts::TAU);

        let mut pixels = Vec::with_capacity(texel_count(width, height) * 4);
        for y in 0..height {
            let v = y as f32 / height as f32;
            for x in 0..width {
                let u = x as f32 / width as f32;
                let n = noise.fbm(u, v, 4);
                let color = match style {
                    SurfaceStyle::Flat => base,
                    SurfaceStyle::Rocky => {
                        let mut shade = 0.65 + 0.5 * n;
                        for &(cu, cv, cr) in &craters {
                            let du = wrap_delta(u - cu) * 2.0;
                            let dist = (du * du + (v - cv) * (v - cv)).sqrt();
                            if dist < cr {
                                shade *= 0.75 + 0.25 * dist / cr;
                            }
                        }
                        scale(base, shade)
                    }
                    SurfaceStyle::Banded => {
                        let band = (v * std::f32::consts::PI * 14.0 + n * 3.0 + band_phase).sin();
                        scale(base, 0.8 + 0.2 * band + 0.1 * n)
                    }
                    SurfaceStyle::Oceanic => {
                        if v < 0.07 || v > 0.93 {
                            (0.95, 0.95, 0.97)
                        } else if n > 0.55 {
                            let land = if n > 0.7 { (0.45, 0.35, 0.2) } else { (0.2, 0.5, 0.15) };
                            scale(land, 0.8 + 0.4 * n)
                        } else {
                            scale(base, 0.7 + 0.5 * n)
                        }
                    }
                    SurfaceStyle::Solar => {
                        let glow = 0.85 + 0.3 * n;
                        (base.0 * glow, base.1 * glow * (0.9 + 0.1 * n), base.2 * glow * 0.8)
                    }
                    SurfaceStyle::Icy => {
                        let band = (v * std::f32::consts::PI * 6.0 + band_phase).sin();
                        let streak = 0.9 + 0.06 * band + 0.15 * n;
                        scale(base, streak)
                    }
                };
                pixels.extend_from_slice(&to_rgba(color));
            }
        }

        TextureData { width, height, pixels }
    }

    #[cfg(test)]
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = (y as usize * self.width as usize + x as usize) * 4;
        [self.pixels[i], self.pixels[i + 1], self.pixels[i + 2], self.pixels[i + 3]]
    }
}

/// Periodic lattice noise in both directions so the map wraps around the
/// sphere without a seam. Octave frequencies must stay integral for that.
struct ValueNoise {
    lattice: Vec<f32>,
    size: usize,
}

impl ValueNoise {
    fn new(rng: &mut SmallRng, size: usize) -> Self {
        let lattice = (0..size * size).map(|_| rng.gen::<f32>()).collect();
        ValueNoise { lattice, size }
    }

    fn at(&self, x: usize, y: usize) -> f32 {
        self.lattice[(y % self.size) * self.size + (x % self.size)]
    }

    fn sample(&self, u: f32, v: f32, frequency: f32) -> f32 {
        let fx = u.rem_euclid(1.0) * self.size as f32 * frequency;
        let fy = v.rem_euclid(1.0) * self.size as f32 * frequency;
        let (x0, y0) = (fx.floor() as usize, fy.floor() as usize);
        let (tx, ty) = (smooth(fx.fract()), smooth(fy.fract()));
        let top = lerp(self.at(x0, y0), self.at(x0 + 1, y0), tx);
        let bottom = lerp(self.at(x0, y0 + 1), self.at(x0 + 1, y0 + 1), tx);
        lerp(top, bottom, ty)
    }

    /// Sum of octaves normalised back into [0, 1].
    fn fbm(&self, u: f32, v: f32, octaves: u32) -> f32 {
        let mut total = 0.0;
        let mut amplitude = 0.5;
        let mut weight = 0.0;
        let mut frequency = 1.0;
        for _ in 0..octaves {
            total += self.sample(u, v, frequency) * amplitude;
            weight += amplitude;
            amplitude *= 0.5;
            frequency *= 2.0;
        }
        total / weight
    }
}

fn smooth(t: f32) -> f32 {
    t * t * (3.0 - 2.0 * t)
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

fn wrap_delta(d: f32) -> f32 {
    if d > 0.5 {
        d - 1.0
    } else if d < -0.5 {
        d + 1.0
    } else {
        d
    }
}

fn scale(color: (f32, f32, f32), k: f32) -> (f32, f32, f32) {
    (color.0 * k, color.1 * k, color.2 * k)
}

fn to_rgba(color: (f32, f32, f32)) -> [u8; 4] {
    let channel = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
    [channel(color.0), channel(color.1), channel(color.2), 255]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_style_is_a_solid_fill() {
        let tex = TextureData::procedural(SurfaceStyle::Flat, (1.0, 0.0, 0.0), 8, 1);
        assert_eq!((tex.width, tex.height), (16, 8));
        assert!(tex.pixels.chunks(4).all(|px| px == [255, 0, 0, 255]));
    }

    #[test]
    fn procedural_maps_are_deterministic_per_seed() {
        let a = TextureData::procedural(SurfaceStyle::Rocky, (0.6, 0.5, 0.4), 32, 7);
        let b = TextureData::procedural(SurfaceStyle::Rocky, (0.6, 0.5, 0.4), 32, 7);
        let c = TextureData::procedural(SurfaceStyle::Rocky, (0.6, 0.5, 0.4), 32, 8);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn every_style_fills_the_whole_map_opaque() {
        for style in [SurfaceStyle::Rocky, SurfaceStyle::Banded, SurfaceStyle::Oceanic, SurfaceStyle::Solar, SurfaceStyle::Icy] {
            let tex = TextureData::procedural(style, (0.5, 0.5, 0.5), 16, 3);
            assert_eq!(tex.pixels.len(), texel_count(tex.width, tex.height) * 4, "{style:?}");
            assert!(tex.pixels.chunks(4).all(|px| px[3] == 255), "{style:?}");
        }
    }

    #[test]
    fn oceanic_poles_are_ice() {
        let tex = TextureData::procedural(SurfaceStyle::Oceanic, (0.1, 0.3, 0.8), 64, 5);
        assert_eq!(tex.pixel(10, 0), [242, 242, 247, 255]);
        assert_eq!(tex.pixel(100, 63), [242, 242, 247, 255]);
    }

    #[test]
    fn noise_wraps_horizontally() {
        let mut rng = SmallRng::seed_from_u64(9);
        let noise = ValueNoise::new(&mut rng, 8);
        assert!((noise.fbm(0.0, 0.3, 4) - noise.fbm(1.0, 0.3, 4)).abs() < 1e-6);
        for i in 0..50 {
            let n = noise.fbm(i as f32 / 50.0, 0.5, 4);
            assert!((0.0..=1.0).contains(&n));
        }
    }

    #[test]
    fn oversized_maps_are_clamped() {
        assert_eq!(map_dimensions(40_000), (2 * MAX_TEXTURE_SIZE, MAX_TEXTURE_SIZE));
        assert_eq!(map_dimensions(0), (4, 2));
        assert_eq!(map_dimensions(256), (512, 256));
        assert_eq!(texel_count(u32::MAX, 2), u32::MAX as usize * 2);
    }
}
