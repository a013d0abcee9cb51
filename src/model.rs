use std::time::Instant;

/// Registry capacity. The registry is allocated once and never resized;
/// only the leading `active` prefix is rendered and orbits.
pub(crate) const MAX_BODIES: usize = 9;

pub(crate) const SUN_RADIUS: f32 = 10.0;
pub(crate) const ORBIT_BASE: f32 = 45.0;
pub(crate) const ORBIT_STEP: f32 = 45.0;

const DEFAULT_SIZE: f32 = 4.0;
const DEFAULT_ORBIT_SPEED: f32 = 0.35; // rad/s
const DEFAULT_SPIN_SPEED: f32 = 0.8; // rad/s

pub(crate) const SIZE_RANGE: (f32, f32) = (0.5, 12.0);
pub(crate) const ORBIT_SPEED_RANGE: (f32, f32) = (0.0, 3.0);
pub(crate) const SPIN_SPEED_RANGE: (f32, f32) = (0.0, 6.0);

/// One orbiting planet: mutable simulation attributes plus the angular
/// state the updater integrates.
#[derive(Clone, Debug)]
pub(crate) struct Body {
    pub(crate) name: String,
    pub(crate) size: f32,
    pub(crate) distance_index: usize,
    pub(crate) orbit_speed: f32,
    pub(crate) spin_speed: f32,
    pub(crate) angle: f32,
    pub(crate) spin: f32,
    pub(crate) last_update: Instant,
    pub(crate) active: bool,
    pub(crate) texture_index: usize,
}

impl Body {
    fn new(index: usize, now: Instant) -> Self {
        Self {
            name: format!("Planet {}", roman(index + 1)),
            size: DEFAULT_SIZE,
            distance_index: index,
            // inner planets orbit a bit faster, purely for visual variety
            orbit_speed: DEFAULT_ORBIT_SPEED / (1.0 + 0.35 * index as f32),
            spin_speed: DEFAULT_SPIN_SPEED,
            angle: 0.0,
            spin: 0.0,
            last_update: now,
            active: false,
            texture_index: index,
        }
    }

    pub(crate) fn orbit_radius(&self) -> f32 {
        ORBIT_BASE + ORBIT_STEP * self.distance_index as f32
    }

    pub(crate) fn position(&self) -> [f32; 3] {
        let r = self.orbit_radius();
        [r * self.angle.cos(), 0.0, r * self.angle.sin()]
    }
}

fn roman(n: usize) -> &'static str {
    const NUMERALS: [&str; MAX_BODIES] = ["I", "II", "III", "IV", "V", "VI", "VII", "VIII", "IX"];
    NUMERALS[(n - 1).min(MAX_BODIES - 1)]
}

/// Fixed-capacity ordered list of bodies, built once after the texture set
/// is ready. Activation is a prefix: `set_active_count(n)` renders exactly
/// the first `n` records.
pub(crate) struct Registry {
    bodies: Vec<Body>,
}

impl Registry {
    pub(crate) fn new(active: usize, texture_count: usize, now: Instant) -> Self {
        let mut bodies: Vec<Body> = (0..MAX_BODIES).map(|i| Body::new(i, now)).collect();
        if texture_count > 0 {
            for b in &mut bodies {
                b.texture_index %= texture_count;
            }
        }
        let mut reg = Self { bodies };
        reg.set_active_count(active, now);
        reg
    }

    pub(crate) fn capacity(&self) -> usize {
        self.bodies.len()
    }

    pub(crate) fn active_count(&self) -> usize {
        self.bodies.iter().take_while(|b| b.active).count()
    }

    /// Activates exactly the first `n` bodies. Newly activated bodies are
    /// stamped with `now` so their first delta starts from this frame
    /// rather than from whenever they were last active.
    pub(crate) fn set_active_count(&mut self, n: usize, now: Instant) {
        let n = n.min(self.bodies.len());
        for (i, b) in self.bodies.iter_mut().enumerate() {
            let want = i < n;
            if want && !b.active {
                b.last_update = now;
            }
            b.active = want;
        }
    }

    pub(crate) fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    pub(crate) fn bodies_mut(&mut self) -> &mut [Body] {
        &mut self.bodies
    }

    pub(crate) fn active(&self) -> impl Iterator<Item = &Body> {
        self.bodies.iter().filter(|b| b.active)
    }

    /// Advances a body's texture to the next loaded one, wrapping at the
    /// end of the set. `dir` is +1/-1.
    pub(crate) fn cycle_texture(&mut self, index: usize, texture_count: usize, dir: i32) {
        if texture_count == 0 {
            return;
        }
        if let Some(b) = self.bodies.get_mut(index) {
            let n = texture_count as i32;
            let cur = (b.texture_index as i32) % n;
            b.texture_index = cur.wrapping_add(dir).rem_euclid(n) as usize;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    #[test]
    fn active_count_is_exact_prefix() {
        let now = Instant::now();
        let mut reg = Registry::new(3, 6, now);
        assert_eq!(reg.active_count(), 3);

        reg.set_active_count(7, now);
        assert_eq!(reg.active_count(), 7);
        assert_eq!(reg.active().count(), 7);

        reg.set_active_count(2, now);
        assert_eq!(reg.active_count(), 2);
        // prefix property: nothing past the count stays active
        assert!(reg.bodies()[2..].iter().all(|b| !b.active));
    }

    #[test]
    fn active_count_clamps_to_capacity() {
        let now = Instant::now();
        let mut reg = Registry::new(0, 6, now);
        reg.set_active_count(MAX_BODIES + 5, now);
        assert_eq!(reg.active_count(), MAX_BODIES);
    }

    #[test]
    fn reactivation_restamps_last_update() {
        let t0 = Instant::now();
        let mut reg = Registry::new(1, 6, t0);

        let t1 = t0 + Duration::from_secs(30);
        reg.set_active_count(2, t1);
        // body 1 was just activated: it must not integrate the 30 s gap
        assert_eq!(reg.bodies()[1].last_update, t1);
        // body 0 was already active: untouched
        assert_eq!(reg.bodies()[0].last_update, t0);
    }

    #[test]
    fn texture_cycle_wraps_modulo_count() {
        let now = Instant::now();
        let mut reg = Registry::new(1, 4, now);
        assert_eq!(reg.bodies()[0].texture_index, 0);

        for expect in [1, 2, 3, 0, 1] {
            reg.cycle_texture(0, 4, 1);
            assert_eq!(reg.bodies()[0].texture_index, expect);
        }
        reg.cycle_texture(0, 4, -1);
        assert_eq!(reg.bodies()[0].texture_index, 0);
        reg.cycle_texture(0, 4, -1);
        assert_eq!(reg.bodies()[0].texture_index, 3);
    }

    #[test]
    fn orbit_radius_steps_outward() {
        let now = Instant::now();
        let reg = Registry::new(MAX_BODIES, 6, now);
        let radii: Vec<f32> = reg.bodies().iter().map(|b| b.orbit_radius()).collect();
        assert!(radii.windows(2).all(|w| w[1] > w[0]));
        assert_eq!(radii[0], ORBIT_BASE);
    }
}
