//! Camera system for the black hole renderer

use glam::DVec3;

/// Pinhole camera with an orthonormal view basis
#[derive(Debug, Clone)]
pub struct Camera {
    pub position: DVec3,
    pub forward: DVec3,
    pub right: DVec3,
    pub up: DVec3,
    /// Vertical field of view in radians
    pub fov: f64,
}

impl Camera {
    pub fn new(position: DVec3, target: DVec3, fov: f64) -> Self {
        let mut camera = Self {
            position,
            forward: DVec3::NEG_Z,
            right: DVec3::X,
            up: DVec3::Y,
            fov,
        };
        camera.look_at(target);
        camera
    }

    /// Rebuild the basis vectors to look at a target (world up is +Y)
    pub fn look_at(&mut self, target: DVec3) {
        self.forward = (target - self.position).normalize_or_zero();
        self.right = self.forward.cross(DVec3::Y).normalize_or_zero();
        self.up = self.right.cross(self.forward).normalize_or_zero();
    }

    /// World-space direction through a pixel.
    ///
    /// `x` and `y` already carry the subpixel offset (e.g. `x + 0.5` for a
    /// centered sample).
    pub fn ray_direction(&self, x: f64, y: f64, width: u32, height: u32) -> DVec3 {
        let aspect = width as f64 / height as f64;
        let scale = (self.fov * 0.5).tan();

        let px = (2.0 * x / width as f64 - 1.0) * aspect * scale;
        let py = (1.0 - 2.0 * y / height as f64) * scale;

        (self.forward + self.right * px + self.up * py).normalize_or_zero()
    }
}

/// Autonomous camera path around the black hole
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CinematicMode {
    SmoothOrbit,
    WaveMotion,
    RisingSpiral,
    CloseFlyby,
}

impl CinematicMode {
    /// Next path in the cycle
    pub fn next(self) -> Self {
        match self {
            CinematicMode::SmoothOrbit => CinematicMode::WaveMotion,
            CinematicMode::WaveMotion => CinematicMode::RisingSpiral,
            CinematicMode::RisingSpiral => CinematicMode::CloseFlyby,
            CinematicMode::CloseFlyby => CinematicMode::SmoothOrbit,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            CinematicMode::SmoothOrbit => "Smooth Orbit",
            CinematicMode::WaveMotion => "Wave Motion",
            CinematicMode::RisingSpiral => "Rising Spiral",
            CinematicMode::CloseFlyby => "Close Fly-by",
        }
    }
}

/// Drives a camera along a cinematic path, always aimed at the hole
#[derive(Debug, Clone)]
pub struct CinematicCamera {
    mode: CinematicMode,
    orbit_angle: f64,
    orbit_radius: f64,
    time: f64,
}

impl CinematicCamera {
    pub fn new(mode: CinematicMode) -> Self {
        Self {
            mode,
            orbit_angle: 0.0,
            orbit_radius: 15.0,
            time: 0.0,
        }
    }

    pub fn mode(&self) -> CinematicMode {
        self.mode
    }

    /// Switch to the next path and restart it
    pub fn cycle_mode(&mut self) {
        self.mode = self.mode.next();
        self.orbit_angle = 0.0;
        self.time = 0.0;
    }

    /// Advance the path by `dt` seconds and re-aim the camera at the origin
    pub fn update(&mut self, camera: &mut Camera, dt: f64) {
        self.time += dt;

        match self.mode {
            CinematicMode::SmoothOrbit => {
                self.orbit_angle += 0.25 * dt;
                self.orbit_radius = 15.0;
                camera.position = DVec3::new(
                    self.orbit_angle.cos() * self.orbit_radius,
                    3.0 + (self.orbit_angle * 0.5).sin() * 1.5,
                    self.orbit_angle.sin() * self.orbit_radius,
                );
            }
            CinematicMode::WaveMotion => {
                self.orbit_angle += 0.3 * dt;
                camera.position = DVec3::new(
                    self.orbit_angle.cos() * 12.0,
                    2.0 + (self.orbit_angle * 1.5).sin() * 3.0,
                    (self.orbit_angle * 2.0).sin() * 8.0, // figure-8 motion
                );
            }
            CinematicMode::RisingSpiral => {
                self.orbit_angle += 0.35 * dt;
                self.orbit_radius = 10.0 + (self.time * 0.3).sin() * 3.0;
                let mut y = 1.0 + self.time * 0.4;
                // Reset height periodically
                if y > 8.0 {
                    y = 1.0;
                    self.time = 0.0;
                }
                camera.position = DVec3::new(
                    self.orbit_angle.cos() * self.orbit_radius,
                    y,
                    self.orbit_angle.sin() * self.orbit_radius,
                );
            }
            CinematicMode::CloseFlyby => {
                self.orbit_angle += 0.5 * dt;
                self.orbit_radius = 6.0 + (self.orbit_angle * 0.7).sin() * 2.0;
                camera.position = DVec3::new(
                    self.orbit_angle.cos() * self.orbit_radius,
                    1.5 + (self.orbit_angle * 1.3).cos() * 2.0,
                    self.orbit_angle.sin() * self.orbit_radius,
                );
            }
        }

        camera.look_at(DVec3::ZERO);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-12;

    #[test]
    fn look_at_builds_orthonormal_basis() {
        let camera = Camera::new(
            DVec3::new(0.0, 3.0, -20.0),
            DVec3::ZERO,
            60f64.to_radians(),
        );

        assert!((camera.forward.length() - 1.0).abs() < EPS);
        assert!((camera.right.length() - 1.0).abs() < EPS);
        assert!((camera.up.length() - 1.0).abs() < EPS);
        assert!(camera.forward.dot(camera.right).abs() < EPS);
        assert!(camera.forward.dot(camera.up).abs() < EPS);
        assert!(camera.right.dot(camera.up).abs() < EPS);
    }

    #[test]
    fn look_at_straight_up_yields_no_nan() {
        let camera = Camera::new(DVec3::new(0.0, -5.0, 0.0), DVec3::ZERO, 1.0);
        assert!(camera.forward.is_finite());
        assert!(camera.right.is_finite());
        assert!(camera.up.is_finite());
    }

    #[test]
    fn center_ray_points_forward() {
        let camera = Camera::new(
            DVec3::new(0.0, 0.0, -10.0),
            DVec3::ZERO,
            60f64.to_radians(),
        );
        let dir = camera.ray_direction(320.0, 240.0, 640, 480);
        assert!((dir - camera.forward).length() < 1e-9);
    }

    #[test]
    fn corner_rays_straddle_the_forward_axis() {
        let camera = Camera::new(DVec3::ZERO, DVec3::Z, 60f64.to_radians());
        let left = camera.ray_direction(0.5, 240.0, 640, 480);
        let right = camera.ray_direction(639.5, 240.0, 640, 480);
        assert!((left.dot(camera.right)) < 0.0);
        assert!((right.dot(camera.right)) > 0.0);
    }

    #[test]
    fn cinematic_update_keeps_aiming_at_origin() {
        let mut camera = Camera::new(DVec3::new(0.0, 3.0, -20.0), DVec3::ZERO, 1.0);
        let mut path = CinematicCamera::new(CinematicMode::WaveMotion);

        for _ in 0..10 {
            path.update(&mut camera, 1.0 / 30.0);
            let expected = (-camera.position).normalize_or_zero();
            assert!((camera.forward - expected).length() < 1e-9);
        }
    }

    #[test]
    fn smooth_orbit_stays_on_its_radius() {
        let mut camera = Camera::new(DVec3::new(0.0, 3.0, -20.0), DVec3::ZERO, 1.0);
        let mut path = CinematicCamera::new(CinematicMode::SmoothOrbit);

        for _ in 0..100 {
            path.update(&mut camera, 0.1);
            let radial = (camera.position.x * camera.position.x
                + camera.position.z * camera.position.z)
                .sqrt();
            assert!((radial - 15.0).abs() < 1e-9);
        }
    }

    #[test]
    fn cycle_mode_wraps_around() {
        let mut path = CinematicCamera::new(CinematicMode::SmoothOrbit);
        path.cycle_mode();
        assert_eq!(path.mode(), CinematicMode::WaveMotion);
        path.cycle_mode();
        path.cycle_mode();
        path.cycle_mode();
        assert_eq!(path.mode(), CinematicMode::SmoothOrbit);
    }
}
