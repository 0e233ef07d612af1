//! CPU rendering backend for the black hole scene

use std::time::{Duration, Instant};

use common::{encode_pixel, Camera, PixelBuffer};
use glam::DVec3;
use rand::Rng;
use rayon::prelude::*;

use crate::physics::{BlackHole, Ray, TraceConfig};

/// Output and sampling parameters for a render backend
#[derive(Debug, Clone, Copy)]
pub struct RenderParams {
    pub width: u32,
    pub height: u32,
    /// Rays per pixel; jittered within the pixel when greater than one
    pub samples_per_pixel: u32,
    pub trace: TraceConfig,
}

impl Default for RenderParams {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            samples_per_pixel: 1,
            trace: TraceConfig::default(),
        }
    }
}

/// Per-session render counters
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderStats {
    pub frames_rendered: u64,
    pub rays_traced: u64,
    pub total_render_time: Duration,
}

/// A backend that can produce frames of the black hole scene.
///
/// The CPU implementation below is the reference; any GPU backend has to
/// match its output numerically.
pub trait RenderBackend {
    /// Render one frame; the returned buffer is complete when this returns
    fn render(&mut self, camera: &Camera, black_hole: &BlackHole) -> &PixelBuffer;

    /// Change the output resolution
    fn resize(&mut self, width: u32, height: u32);
}

/// Multithreaded CPU renderer
pub struct CpuRenderer {
    params: RenderParams,
    buffer: PixelBuffer,
    stats: RenderStats,
}

impl CpuRenderer {
    pub fn new(mut params: RenderParams) -> Self {
        params.samples_per_pixel = params.samples_per_pixel.max(1);
        Self {
            buffer: PixelBuffer::new(params.width, params.height),
            stats: RenderStats::default(),
            params,
        }
    }

    pub fn params(&self) -> &RenderParams {
        &self.params
    }

    pub fn stats(&self) -> RenderStats {
        self.stats
    }
}

impl RenderBackend for CpuRenderer {
    fn render(&mut self, camera: &Camera, black_hole: &BlackHole) -> &PixelBuffer {
        let started = Instant::now();
        let RenderParams {
            width,
            height,
            samples_per_pixel,
            trace,
        } = self.params;

        // Every worker owns a disjoint row slice, so the writes need no
        // synchronization; the parallel iterator is the frame barrier
        self.buffer
            .pixels_mut()
            .par_chunks_mut(width as usize)
            .enumerate()
            .for_each(|(y, row)| {
                let mut rng = rand::thread_rng();
                for (x, pixel) in row.iter_mut().enumerate() {
                    let mut radiance = DVec3::ZERO;
                    for _ in 0..samples_per_pixel {
                        // Single samples go through the pixel center;
                        // extra samples jitter within the pixel
                        let (jx, jy) = if samples_per_pixel == 1 {
                            (0.5, 0.5)
                        } else {
                            (rng.gen_range(0.0..1.0), rng.gen_range(0.0..1.0))
                        };
                        let dir = camera.ray_direction(
                            x as f64 + jx,
                            y as f64 + jy,
                            width,
                            height,
                        );
                        let ray = Ray::new(camera.position, dir);
                        radiance += black_hole.trace(&ray, &trace);
                    }
                    *pixel = encode_pixel(radiance / samples_per_pixel as f64);
                }
            });

        let elapsed = started.elapsed();
        self.stats.frames_rendered += 1;
        self.stats.rays_traced +=
            u64::from(width) * u64::from(height) * u64::from(samples_per_pixel);
        self.stats.total_render_time += elapsed;
        log::debug!(
            "frame {} rendered in {:.1} ms ({}x{}, {} spp)",
            self.stats.frames_rendered,
            elapsed.as_secs_f64() * 1e3,
            width,
            height,
            samples_per_pixel
        );

        &self.buffer
    }

    fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.params.width = width;
            self.params.height = height;
            self.buffer.resize(width, height);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference_camera() -> Camera {
        Camera::new(
            DVec3::new(0.0, 3.0, -20.0),
            DVec3::ZERO,
            60f64.to_radians(),
        )
    }

    fn small_params() -> RenderParams {
        RenderParams {
            width: 64,
            height: 48,
            samples_per_pixel: 1,
            trace: TraceConfig::default(),
        }
    }

    #[test]
    fn frame_from_reference_pose_is_not_black() {
        let black_hole = BlackHole::new(1.0);
        let mut renderer = CpuRenderer::new(small_params());
        let buffer = renderer.render(&reference_camera(), &black_hole);

        let lit = buffer
            .pixels()
            .iter()
            .filter(|p| p.r > 0 || p.g > 0 || p.b > 0)
            .count();
        // The disk and lensed stars fill a good part of the view
        assert!(lit > 0, "frame is entirely black");
    }

    #[test]
    fn single_sample_renders_are_deterministic() {
        let black_hole = BlackHole::new(1.0);
        let camera = reference_camera();

        let mut first = CpuRenderer::new(small_params());
        let mut second = CpuRenderer::new(small_params());
        let a = first.render(&camera, &black_hole).pixels().to_vec();
        let b = second.render(&camera, &black_hole).pixels().to_vec();
        assert_eq!(a, b);
    }

    #[test]
    fn resize_rebuilds_the_buffer() {
        let mut renderer = CpuRenderer::new(small_params());
        renderer.resize(16, 8);
        assert_eq!(renderer.params().width, 16);

        let black_hole = BlackHole::new(1.0);
        let buffer = renderer.render(&reference_camera(), &black_hole);
        assert_eq!(buffer.width(), 16);
        assert_eq!(buffer.pixels().len(), 16 * 8);

        // Degenerate sizes are ignored
        renderer.resize(0, 8);
        assert_eq!(renderer.params().width, 16);
    }

    #[test]
    fn stats_count_frames_and_rays() {
        let black_hole = BlackHole::new(1.0);
        let camera = reference_camera();
        let mut renderer = CpuRenderer::new(RenderParams {
            width: 8,
            height: 4,
            samples_per_pixel: 2,
            trace: TraceConfig::default(),
        });

        renderer.render(&camera, &black_hole);
        renderer.render(&camera, &black_hole);

        let stats = renderer.stats();
        assert_eq!(stats.frames_rendered, 2);
        assert_eq!(stats.rays_traced, 2 * 8 * 4 * 2);
    }

    #[test]
    fn zero_samples_are_clamped_to_one() {
        let params = RenderParams {
            samples_per_pixel: 0,
            ..small_params()
        };
        assert_eq!(CpuRenderer::new(params).params().samples_per_pixel, 1);
    }
}
