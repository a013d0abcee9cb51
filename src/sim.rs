use crate::model::Registry;
use std::time::Instant;

/// Everything a user key can do to the running toy. Mapping lives in
/// `input`; application lives in `app`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum Action {
    Quit,
    TogglePause,
    HelpToggle,
    SetBodyCount(usize),
    BodyCountDelta(i32),
    PanelMove(i32),
    FieldMove(i32),
    Adjust(i32),
    CycleTexture(i32),
    CamYaw(f32),
    CamPitch(f32),
    CamZoom(f32),
    ResetView,
    ToggleOrbits,
    ToggleLabels,
}

/// The whole mutable simulation: the body registry plus the sun's
/// accumulated spin and the pause flag. Passed explicitly into update and
/// control code; nothing here is reachable through globals.
pub(crate) struct SimState {
    pub(crate) registry: Registry,
    pub(crate) sun_spin: f32,
    sun_last_update: Instant,
    paused: bool,
}

impl SimState {
    pub(crate) fn new(registry: Registry, now: Instant) -> Self {
        Self {
            registry,
            sun_spin: 0.0,
            sun_last_update: now,
            paused: false,
        }
    }

    pub(crate) fn paused(&self) -> bool {
        self.paused
    }

    /// On resume every timestamp is reset to `now`, so the pause gap never
    /// reaches the integrator as one huge delta.
    pub(crate) fn set_paused(&mut self, paused: bool, now: Instant) {
        if self.paused && !paused {
            self.sun_last_update = now;
            for b in self.registry.bodies_mut() {
                b.last_update = now;
            }
        }
        self.paused = paused;
    }

    pub(crate) fn toggle_pause(&mut self, now: Instant) {
        self.set_paused(!self.paused, now);
    }

    /// Advances every active body by the wall-clock delta since its own
    /// last update. Delta-time accumulation keeps angular motion
    /// frame-rate independent; a speed change only affects motion from the
    /// current angle onward.
    pub(crate) fn advance(&mut self, now: Instant) {
        if self.paused {
            return;
        }

        let sun_dt = now.saturating_duration_since(self.sun_last_update).as_secs_f32();
        self.sun_spin += sun_dt * SUN_SPIN_SPEED;
        self.sun_last_update = now;

        for b in self.registry.bodies_mut() {
            if !b.active {
                continue;
            }
            let dt = now.saturating_duration_since(b.last_update).as_secs_f32();
            b.angle += dt * b.orbit_speed;
            b.spin += dt * b.spin_speed;
            b.last_update = now;
        }
    }
}

pub(crate) const SUN_SPIN_SPEED: f32 = 0.06; // rad/s

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Registry;
    use std::time::{Duration, Instant};

    fn state_with(active: usize, t0: Instant) -> SimState {
        SimState::new(Registry::new(active, 4, t0), t0)
    }

    #[test]
    fn angle_is_monotonic_under_constant_speed() {
        let t0 = Instant::now();
        let mut st = state_with(3, t0);

        let mut prev: Vec<f32> = st.registry.active().map(|b| b.angle).collect();
        for step in 1..=100u64 {
            st.advance(t0 + Duration::from_millis(step * 13));
            let cur: Vec<f32> = st.registry.active().map(|b| b.angle).collect();
            for (p, c) in prev.iter().zip(&cur) {
                assert!(c >= p, "angle went backwards: {p} -> {c}");
            }
            prev = cur;
        }
    }

    #[test]
    fn advance_is_frame_rate_independent() {
        let t0 = Instant::now();
        let mut coarse = state_with(1, t0);
        let mut fine = state_with(1, t0);

        // one 1 s step vs a hundred 10 ms steps
        coarse.advance(t0 + Duration::from_secs(1));
        for i in 1..=100u64 {
            fine.advance(t0 + Duration::from_millis(i * 10));
        }

        let a = coarse.registry.bodies()[0].angle;
        let b = fine.registry.bodies()[0].angle;
        assert!((a - b).abs() < 1e-3, "coarse {a} vs fine {b}");
    }

    #[test]
    fn paused_state_does_not_advance() {
        let t0 = Instant::now();
        let mut st = state_with(2, t0);
        st.set_paused(true, t0);

        st.advance(t0 + Duration::from_secs(5));
        assert!(st.registry.active().all(|b| b.angle == 0.0));
        assert_eq!(st.sun_spin, 0.0);
    }

    #[test]
    fn resume_after_gap_has_no_discontinuity() {
        let t0 = Instant::now();
        let mut st = state_with(1, t0);

        st.advance(t0 + Duration::from_millis(16));
        let angle_at_pause = st.registry.bodies()[0].angle;
        st.set_paused(true, t0 + Duration::from_millis(16));

        // a long wall-clock gap while paused
        let t_resume = t0 + Duration::from_secs(600);
        st.set_paused(false, t_resume);
        st.advance(t_resume + Duration::from_millis(16));

        let b = &st.registry.bodies()[0];
        let moved = b.angle - angle_at_pause;
        let expected = 0.016 * b.orbit_speed;
        assert!(
            (moved - expected).abs() < 1e-4,
            "resume jumped by {moved}, expected ~{expected}"
        );
    }

    #[test]
    fn spin_accumulates_with_delta_time() {
        let t0 = Instant::now();
        let mut st = state_with(1, t0);
        st.advance(t0 + Duration::from_secs(2));

        let b = &st.registry.bodies()[0];
        assert!((b.spin - 2.0 * b.spin_speed).abs() < 1e-4);
        assert!((st.sun_spin - 2.0 * SUN_SPIN_SPEED).abs() < 1e-4);
    }

    #[test]
    fn speed_change_only_affects_future_motion() {
        let t0 = Instant::now();
        let mut st = state_with(1, t0);

        st.advance(t0 + Duration::from_secs(1));
        let before = st.registry.bodies()[0].angle;

        // doubling the speed must not rescale already-accumulated angle
        st.registry.bodies_mut()[0].orbit_speed *= 2.0;
        let after = st.registry.bodies()[0].angle;
        assert_eq!(before, after);

        let speed = st.registry.bodies()[0].orbit_speed;
        st.advance(t0 + Duration::from_secs(2));
        let moved = st.registry.bodies()[0].angle - before;
        assert!((moved - speed).abs() < 1e-4);
    }
}
