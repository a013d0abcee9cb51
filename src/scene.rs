use rand::{rngs::StdRng, Rng, SeedableRng};
use std::f32::consts::PI;

/// Terminal cells are roughly twice as tall as wide; screen-space y is
/// compressed by this factor so orbits read as circles.
pub(crate) const CELL_ASPECT: f32 = 0.55;

const FOCAL: f32 = 180.0;
const NEAR: f32 = 5.0;

/// Orbit-style camera: yaw/pitch around the origin at a fixed distance.
/// The keyboard counterpart of a mouse orbit controller.
pub(crate) struct Camera {
    pub(crate) yaw: f32,
    pub(crate) pitch: f32,
    pub(crate) distance: f32,
}

impl Camera {
    pub(crate) fn new() -> Self {
        Self {
            yaw: 0.0,
            pitch: 0.6,
            distance: 620.0,
        }
    }

    pub(crate) fn reset(&mut self) {
        *self = Self::new();
    }

    pub(crate) fn add_yaw(&mut self, d: f32) {
        self.yaw += d;
        while self.yaw > PI {
            self.yaw -= 2.0 * PI;
        }
        while self.yaw < -PI {
            self.yaw += 2.0 * PI;
        }
    }

    pub(crate) fn add_pitch(&mut self, d: f32) {
        self.pitch = (self.pitch + d).clamp(0.05, 1.45);
    }

    pub(crate) fn zoom(&mut self, factor: f32) {
        self.distance = (self.distance * factor).clamp(120.0, 2400.0);
    }

    /// World point -> (screen x in cells, screen y in cells, scale).
    /// `scale` is cells-per-world-unit at that depth, used to size discs.
    /// Points at or behind the near plane are rejected.
    pub(crate) fn project(&self, p: [f32; 3], cols: u16, rows: u16) -> Option<Projected> {
        let (sy, cy) = self.yaw.sin_cos();
        let x1 = cy * p[0] + sy * p[2];
        let z1 = -sy * p[0] + cy * p[2];

        let (sp, cp) = self.pitch.sin_cos();
        let y2 = cp * p[1] - sp * z1;
        let z2 = sp * p[1] + cp * z1;

        let depth = z2 + self.distance;
        if depth <= NEAR {
            return None;
        }

        let s = FOCAL / depth;
        let cx = cols as f32 * 0.5;
        let cyr = rows as f32 * 0.5;
        Some(Projected {
            x: cx + x1 * s,
            y: cyr + y2 * s * CELL_ASPECT,
            scale: s,
            depth,
        })
    }
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct Projected {
    pub(crate) x: f32,
    pub(crate) y: f32,
    pub(crate) scale: f32,
    pub(crate) depth: f32,
}

/// Single fixed directional light, set up once at startup.
pub(crate) struct Light {
    pub(crate) dir: [f32; 3],
}

impl Light {
    fn new() -> Self {
        let (x, y, z) = (-0.35f32, 0.55, 0.75);
        let l = (x * x + y * y + z * z).sqrt();
        Self {
            dir: [x / l, y / l, z / l],
        }
    }
}

#[derive(Clone, Copy)]
pub(crate) struct Star {
    pub(crate) pos: [f32; 3],
    pub(crate) phase: f32,
    pub(crate) depth: f32,
}

/// Built once at startup: camera, light, starfield. The registry is not
/// part of the scene; the `active` flag on each body decides what the
/// renderer draws.
pub(crate) struct Scene {
    pub(crate) camera: Camera,
    pub(crate) light: Light,
    pub(crate) stars: Vec<Star>,
    pub(crate) show_orbits: bool,
    pub(crate) show_labels: bool,
}

impl Scene {
    pub(crate) fn new(star_count: usize, seed: u64) -> Self {
        Self {
            camera: Camera::new(),
            light: Light::new(),
            stars: scatter_stars(star_count, seed),
            show_orbits: true,
            show_labels: true,
        }
    }
}

/// Random scatter in a ±1000 cube around the origin, far enough out that
/// the camera stays inside the field at any zoom.
fn scatter_stars(count: usize, seed: u64) -> Vec<Star> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|_| Star {
            pos: [
                rng.gen_range(-1000.0..1000.0),
                rng.gen_range(-1000.0..1000.0),
                rng.gen_range(-1000.0..1000.0),
            ],
            phase: rng.gen_range(0.0..(PI * 2.0)),
            depth: rng.gen_range(0.35..1.0),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_projects_to_screen_center() {
        let cam = Camera::new();
        let p = cam.project([0.0, 0.0, 0.0], 120, 40).unwrap();
        assert!((p.x - 60.0).abs() < 1e-3);
        assert!((p.y - 20.0).abs() < 1e-3);
    }

    #[test]
    fn points_behind_camera_are_rejected() {
        let mut cam = Camera::new();
        cam.pitch = 0.05;
        // far enough behind the eye along the view axis
        assert!(cam.project([0.0, 0.0, -5000.0], 120, 40).is_none());
    }

    #[test]
    fn nearer_points_project_larger() {
        let mut cam = Camera::new();
        cam.pitch = 0.05;
        let near = cam.project([0.0, 0.0, -100.0], 120, 40).unwrap();
        let far = cam.project([0.0, 0.0, 100.0], 120, 40).unwrap();
        assert!(near.scale > far.scale);
        assert!(near.depth < far.depth);
    }

    #[test]
    fn starfield_is_deterministic_per_seed() {
        let a = scatter_stars(50, 7);
        let b = scatter_stars(50, 7);
        assert_eq!(a.len(), 50);
        for (s, t) in a.iter().zip(&b) {
            assert_eq!(s.pos, t.pos);
        }
    }
}
