//! Camera for ray generation.

use crate::sampling::{gen_f32, random_in_unit_disk};
use crate::Ray;
use glint_math::{Interval, Vec3};
use rand::RngCore;

/// Builder for [`Camera`]. All settings have usable defaults.
#[derive(Debug, Clone)]
pub struct CameraBuilder {
    look_from: Vec3,
    look_at: Vec3,
    vup: Vec3,
    vfov: f32,
    aspect_ratio: f32,
    aperture: f32,
    shutter: Interval,
}

impl CameraBuilder {
    /// Set camera position.
    pub fn with_position(mut self, look_from: Vec3, look_at: Vec3, vup: Vec3) -> Self {
        self.look_from = look_from;
        self.look_at = look_at;
        self.vup = vup;
        self
    }

    /// Set lens settings.
    ///
    /// - `vfov`: vertical field of view in degrees
    /// - `aperture`: lens diameter; 0 gives a pinhole camera
    pub fn with_lens(mut self, vfov: f32, aperture: f32) -> Self {
        self.vfov = vfov;
        self.aperture = aperture.max(0.0);
        self
    }

    /// Image width divided by height.
    pub fn with_aspect_ratio(mut self, aspect_ratio: f32) -> Self {
        self.aspect_ratio = aspect_ratio;
        self
    }

    /// Time interval over which ray times are spread (motion blur).
    pub fn with_shutter(mut self, shutter: Interval) -> Self {
        self.shutter = shutter;
        self
    }

    /// Derive the camera basis and image plane.
    ///
    /// The image plane sits at the focus distance, which is the distance
    /// from `look_from` to `look_at`.
    pub fn build(self) -> Camera {
        let w = (self.look_from - self.look_at).normalize();
        let u = self.vup.cross(w).normalize();
        let v = w.cross(u);

        let half_height = (self.vfov.to_radians() * 0.5).tan();
        let half_width = self.aspect_ratio * half_height;
        let focus_dist = self.look_from.distance(self.look_at);

        let origin = self.look_from;
        let lower_left_corner = origin
            - half_width * focus_dist * u
            - half_height * focus_dist * v
            - focus_dist * w;

        Camera {
            origin,
            lower_left_corner,
            horizontal: 2.0 * half_width * focus_dist * u,
            vertical: 2.0 * half_height * focus_dist * v,
            u,
            v,
            w,
            lens_radius: self.aperture * 0.5,
            shutter: self.shutter,
        }
    }
}

impl Default for CameraBuilder {
    fn default() -> Self {
        Self {
            look_from: Vec3::ZERO,
            look_at: Vec3::new(0.0, 0.0, -1.0),
            vup: Vec3::Y,
            vfov: 90.0,
            aspect_ratio: 16.0 / 9.0,
            aperture: 0.0,
            shutter: Interval::new(0.0, 1.0),
        }
    }
}

/// Maps film coordinates to rays. Immutable once built.
#[derive(Debug, Clone, Copy)]
pub struct Camera {
    origin: Vec3,
    lower_left_corner: Vec3,
    horizontal: Vec3,
    vertical: Vec3,
    u: Vec3,
    v: Vec3,
    w: Vec3,
    lens_radius: f32,
    shutter: Interval,
}

impl Camera {
    pub fn builder() -> CameraBuilder {
        CameraBuilder::default()
    }

    /// Ray through film coordinate `(s, t)`, where `(0, 0)` is the
    /// bottom-left of the image and `(1, 1)` the top-right.
    ///
    /// The origin is jittered over the lens disk and the time is drawn
    /// uniformly from the shutter interval.
    pub fn shoot_ray_at(&self, s: f32, t: f32, rng: &mut dyn RngCore) -> Ray {
        let offset = if self.lens_radius > 0.0 {
            let rd = self.lens_radius * random_in_unit_disk(rng);
            self.u * rd.x + self.v * rd.y
        } else {
            Vec3::ZERO
        };

        let origin = self.origin + offset;
        let target = self.lower_left_corner + s * self.horizontal + t * self.vertical;
        let time = self.shutter.lerp(gen_f32(rng));

        Ray::new(origin, target - origin, time)
    }

    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    /// Unit vector pointing backwards, away from the view direction.
    pub fn w(&self) -> Vec3 {
        self.w
    }

    pub fn shutter(&self) -> Interval {
        self.shutter
    }
}

impl Default for Camera {
    fn default() -> Self {
        CameraBuilder::default().build()
    }
}
