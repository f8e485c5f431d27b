//! Literal parameter tables for both visualizers.

use crate::engine::texture::SurfaceStyle;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RingDescriptor {
    pub inner: f32,
    pub outer: f32,
    pub color: u32,
    pub opacity: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BodyDescriptor {
    pub name: &'static str,
    pub radius: f32,
    /// Orbit radius in scene units; zero for the central star.
    pub distance: f32,
    pub color: u32,
    /// Orbital period in Earth days; zero for the central star.
    pub period_days: f32,
    /// Self-rotation in radians per frame at 1x.
    pub spin: f32,
    /// Axial tilt in radians.
    pub tilt: f32,
    pub ring: Option<RingDescriptor>,
    /// Unlit and treated as the light source.
    pub emissive: bool,
    pub surface: SurfaceStyle,
    pub diameter_km: f32,
}

impl BodyDescriptor {
    pub fn orbits(&self) -> bool {
        self.distance > 0.0
    }

    pub fn rgb(&self) -> (f32, f32, f32) {
        hex_to_rgb(self.color)
    }
}

pub fn hex_to_rgb(hex: u32) -> (f32, f32, f32) {
    (
        ((hex >> 16) & 0xff) as f32 / 255.0,
        ((hex >> 8) & 0xff) as f32 / 255.0,
        (hex & 0xff) as f32 / 255.0,
    )
}

const fn flat(name: &'static str, radius: f32, distance: f32, color: u32, period_days: f32, diameter_km: f32) -> BodyDescriptor {
    BodyDescriptor {
        name,
        radius,
        distance,
        color,
        period_days,
        spin: 0.0,
        tilt: 0.0,
        ring: None,
        emissive: false,
        surface: SurfaceStyle::Flat,
        diameter_km,
    }
}

/// Sun plus the four inner planets, flat shaded.
pub const ORRERY_BODIES: &[BodyDescriptor] = &[
    BodyDescriptor { emissive: true, ..flat("Sun", 5.0, 0.0, 0xffff00, 0.0, 1_392_700.0) },
    flat("Mercury", 1.0, 10.0, 0x888888, 87.97, 4_879.0),
    flat("Venus", 1.5, 15.0, 0xffa500, 224.70, 12_104.0),
    flat("Earth", 2.0, 20.0, 0x0000ff, 365.25, 12_742.0),
    flat("Mars", 1.2, 25.0, 0xff0000, 686.98, 6_779.0),
];

/// Sun and all eight planets with procedural surfaces.
pub const EXPLORER_BODIES: &[BodyDescriptor] = &[
    BodyDescriptor {
        spin: 0.002,
        surface: SurfaceStyle::Solar,
        emissive: true,
        ..flat("Sun", 10.0, 0.0, 0xffc233, 0.0, 1_392_700.0)
    },
    BodyDescriptor {
        spin: 0.004,
        tilt: 0.0006,
        surface: SurfaceStyle::Rocky,
        ..flat("Mercury", 1.0, 20.0, 0x9e9e9e, 87.97, 4_879.0)
    },
    BodyDescriptor {
        spin: -0.002,
        tilt: 3.096,
        ..flat("Venus", 1.8, 28.0, 0xe8cda2, 224.70, 12_104.0)
    },
    BodyDescriptor {
        spin: 0.02,
        tilt: 0.4091,
        surface: SurfaceStyle::Oceanic,
        ..flat("Earth", 2.0, 38.0, 0x2a6bd1, 365.25, 12_742.0)
    },
    BodyDescriptor {
        spin: 0.018,
        tilt: 0.4396,
        surface: SurfaceStyle::Rocky,
        ..flat("Mars", 1.4, 48.0, 0xc1440e, 686.98, 6_779.0)
    },
    BodyDescriptor {
        spin: 0.04,
        tilt: 0.0546,
        surface: SurfaceStyle::Banded,
        ..flat("Jupiter", 6.0, 85.0, 0xd8ca9d, 4_332.59, 139_820.0)
    },
    BodyDescriptor {
        spin: 0.038,
        tilt: 0.4665,
        surface: SurfaceStyle::Banded,
        ring: Some(RingDescriptor { inner: 6.5, outer: 11.0, color: 0xcdbf8f, opacity: 0.6 }),
        ..flat("Saturn", 5.0, 115.0, 0xe3d9a5, 10_759.22, 116_460.0)
    },
    BodyDescriptor {
        spin: -0.03,
        tilt: 1.7064,
        surface: SurfaceStyle::Icy,
        ring: Some(RingDescriptor { inner: 4.5, outer: 6.0, color: 0x9fd8e3, opacity: 0.3 }),
        ..flat("Uranus", 3.5, 140.0, 0x9fd8e3, 30_688.5, 50_724.0)
    },
    BodyDescriptor {
        spin: 0.032,
        tilt: 0.4943,
        surface: SurfaceStyle::Icy,
        ..flat("Neptune", 3.4, 165.0, 0x3f54ba, 60_195.0, 49_244.0)
    },
];

/// Asteroid belt bounds, between Mars and Jupiter in `EXPLORER_BODIES`.
pub const BELT_INNER: f32 = 56.0;
pub const BELT_OUTER: f32 = 70.0;
pub const BELT_THICKNESS: f32 = 3.0;

const DAYS_PER_YEAR: f32 = 365.25;

/// "12,742 km"
pub fn format_diameter(km: f32) -> String {
    let digits = (km.round() as u64).to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{} km", grouped)
}

/// Days below two years, years above.
pub fn format_period(days: f32) -> String {
    if days <= 0.0 {
        "-".to_string()
    } else if days < 2.0 * DAYS_PER_YEAR {
        format!("{:.1} days", days)
    } else {
        format!("{:.2} years", days / DAYS_PER_YEAR)
    }
}
