//! Framebuffer and color pipeline shared by render backends

use glam::DVec3;

/// 8-bit RGBA pixel, laid out for direct byte access
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Rgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

/// CPU-side frame target.
///
/// Rows can be handed out as disjoint mutable slices, so parallel workers
/// write their pixels without any synchronization.
#[derive(Debug, Clone)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    pixels: Vec<Rgba8>,
}

impl PixelBuffer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Rgba8::default(); (width * height) as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[Rgba8] {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut [Rgba8] {
        &mut self.pixels
    }

    /// Reallocate for a new resolution; previous contents are discarded
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.pixels.clear();
        self.pixels
            .resize((width * height) as usize, Rgba8::default());
    }

    /// Raw bytes in row-major RGBA order
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }
}

/// Reinhard tone mapping
pub fn tone_map(color: DVec3) -> DVec3 {
    color / (color + DVec3::ONE)
}

/// Gamma correction for display
pub fn gamma_encode(color: DVec3) -> DVec3 {
    const INV_GAMMA: f64 = 1.0 / 2.2;
    DVec3::new(
        color.x.powf(INV_GAMMA),
        color.y.powf(INV_GAMMA),
        color.z.powf(INV_GAMMA),
    )
}

/// Tone map, gamma correct and quantize a traced radiance value
pub fn encode_pixel(radiance: DVec3) -> Rgba8 {
    let color = gamma_encode(tone_map(radiance));
    Rgba8 {
        r: (color.x * 255.0).min(255.0) as u8,
        g: (color.y * 255.0).min(255.0) as u8,
        b: (color.z * 255.0).min(255.0) as u8,
        a: 255,
    }
}

/// A render resolution preset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
    pub label: &'static str,
}

/// Preset ladder from 144p up to 8K
pub const RESOLUTION_PRESETS: &[Resolution] = &[
    Resolution { width: 256, height: 144, label: "144p" },
    Resolution { width: 426, height: 240, label: "240p" },
    Resolution { width: 640, height: 360, label: "360p" },
    Resolution { width: 854, height: 480, label: "480p" },
    Resolution { width: 1280, height: 720, label: "720p" },
    Resolution { width: 1920, height: 1080, label: "1080p" },
    Resolution { width: 2560, height: 1440, label: "1440p" },
    Resolution { width: 2880, height: 1620, label: "1620p" },
    Resolution { width: 3840, height: 2160, label: "2160p" },
    Resolution { width: 5120, height: 2880, label: "2880p" },
    Resolution { width: 7680, height: 4320, label: "4320p" },
];

impl Resolution {
    /// Look up a preset by its label, e.g. `"1080p"`
    pub fn by_label(label: &str) -> Option<Resolution> {
        RESOLUTION_PRESETS
            .iter()
            .copied()
            .find(|preset| preset.label.eq_ignore_ascii_case(label))
    }

    /// The preset nearest to the given dimensions
    pub fn closest(width: u32, height: u32) -> Resolution {
        let distance = |preset: &Resolution| {
            preset.width.abs_diff(width) + preset.height.abs_diff(height)
        };
        RESOLUTION_PRESETS
            .iter()
            .copied()
            .min_by_key(distance)
            .expect("preset table is non-empty")
    }
}
