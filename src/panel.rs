use crate::model::{Registry, ORBIT_SPEED_RANGE, SIZE_RANGE, SPIN_SPEED_RANGE};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Field {
    Size,
    OrbitSpeed,
    SpinSpeed,
    Texture,
}

pub(crate) const FIELDS: [Field; 4] = [Field::Size, Field::OrbitSpeed, Field::SpinSpeed, Field::Texture];

impl Field {
    pub(crate) fn label(self) -> &'static str {
        match self {
            Field::Size => "size",
            Field::OrbitSpeed => "orbit",
            Field::SpinSpeed => "spin",
            Field::Texture => "texture",
        }
    }
}

/// One generated input group, bound to a body by positional index. Values
/// are not cached here: the renderer reads them straight out of the
/// registry, so a freshly regenerated row always shows current attributes.
#[derive(Clone, Copy, Debug)]
pub(crate) struct ControlRow {
    pub(crate) body_index: usize,
}

/// Keyboard stand-in for the generated slider groups. Whenever the active
/// body count changes, every row is discarded and the set is rebuilt — one
/// row per active body, no stale bindings left behind.
pub(crate) struct ControlPanel {
    rows: Vec<ControlRow>,
    pub(crate) cursor_row: usize,
    pub(crate) cursor_field: usize,
}

impl ControlPanel {
    pub(crate) fn new(registry: &Registry) -> Self {
        let mut panel = Self {
            rows: Vec::new(),
            cursor_row: 0,
            cursor_field: 0,
        };
        panel.sync(registry);
        panel
    }

    pub(crate) fn rows(&self) -> &[ControlRow] {
        &self.rows
    }

    pub(crate) fn selected_field(&self) -> Field {
        FIELDS[self.cursor_field]
    }

    pub(crate) fn selected_body(&self) -> Option<usize> {
        self.rows.get(self.cursor_row).map(|r| r.body_index)
    }

    /// Regenerates the rows if the active count changed since last frame.
    pub(crate) fn sync(&mut self, registry: &Registry) {
        let want = registry.active_count();
        if self.rows.len() == want {
            return;
        }
        self.rows.clear();
        self.rows
            .extend((0..want).map(|body_index| ControlRow { body_index }));
        if want == 0 {
            self.cursor_row = 0;
        } else {
            self.cursor_row = self.cursor_row.min(want - 1);
        }
    }

    pub(crate) fn move_cursor(&mut self, delta: i32) {
        if self.rows.is_empty() {
            return;
        }
        let n = self.rows.len() as i32;
        self.cursor_row = (self.cursor_row as i32 + delta).rem_euclid(n) as usize;
    }

    pub(crate) fn move_field(&mut self, delta: i32) {
        let n = FIELDS.len() as i32;
        self.cursor_field = (self.cursor_field as i32 + delta).rem_euclid(n) as usize;
    }

    /// Writes the adjustment straight into the bound body record.
    pub(crate) fn adjust(&mut self, registry: &mut Registry, dir: i32, texture_count: usize) {
        let Some(index) = self.selected_body() else {
            return;
        };
        let field = self.selected_field();
        if field == Field::Texture {
            registry.cycle_texture(index, texture_count, dir);
            return;
        }
        let b = &mut registry.bodies_mut()[index];
        let d = dir as f32;
        match field {
            Field::Size => b.size = (b.size + d * 0.25).clamp(SIZE_RANGE.0, SIZE_RANGE.1),
            Field::OrbitSpeed => {
                b.orbit_speed =
                    (b.orbit_speed + d * 0.05).clamp(ORBIT_SPEED_RANGE.0, ORBIT_SPEED_RANGE.1)
            }
            Field::SpinSpeed => {
                b.spin_speed =
                    (b.spin_speed + d * 0.1).clamp(SPIN_SPEED_RANGE.0, SPIN_SPEED_RANGE.1)
            }
            Field::Texture => unreachable!(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Registry;
    use std::time::Instant;

    fn registry(active: usize) -> Registry {
        Registry::new(active, 4, Instant::now())
    }

    #[test]
    fn rows_track_active_count_exactly() {
        let now = Instant::now();
        let mut reg = registry(3);
        let mut panel = ControlPanel::new(&reg);
        assert_eq!(panel.rows().len(), 3);

        reg.set_active_count(7, now);
        panel.sync(&reg);
        assert_eq!(panel.rows().len(), 7);

        reg.set_active_count(1, now);
        panel.sync(&reg);
        assert_eq!(panel.rows().len(), 1);
        // regenerated, not truncated: indices are the fresh prefix
        assert_eq!(panel.rows()[0].body_index, 0);
    }

    #[test]
    fn shrinking_clamps_the_cursor() {
        let now = Instant::now();
        let mut reg = registry(5);
        let mut panel = ControlPanel::new(&reg);
        panel.cursor_row = 4;

        reg.set_active_count(2, now);
        panel.sync(&reg);
        assert_eq!(panel.cursor_row, 1);
    }

    #[test]
    fn adjust_writes_into_the_registry() {
        let mut reg = registry(2);
        let mut panel = ControlPanel::new(&reg);
        panel.cursor_row = 1;
        panel.cursor_field = 0; // size

        let before = reg.bodies()[1].size;
        panel.adjust(&mut reg, 1, 4);
        assert!(reg.bodies()[1].size > before);
        // the other body is untouched
        assert_eq!(reg.bodies()[0].size, before);
    }

    #[test]
    fn adjust_clamps_to_field_range() {
        let mut reg = registry(1);
        let mut panel = ControlPanel::new(&reg);
        panel.cursor_field = 1; // orbit speed

        for _ in 0..1000 {
            panel.adjust(&mut reg, -1, 4);
        }
        assert_eq!(reg.bodies()[0].orbit_speed, ORBIT_SPEED_RANGE.0);
    }

    #[test]
    fn texture_field_cycles_with_wraparound() {
        let mut reg = registry(1);
        let mut panel = ControlPanel::new(&reg);
        panel.cursor_field = 3; // texture

        let count = 3;
        reg.bodies_mut()[0].texture_index = 0;
        panel.adjust(&mut reg, 1, count);
        panel.adjust(&mut reg, 1, count);
        panel.adjust(&mut reg, 1, count);
        assert_eq!(reg.bodies()[0].texture_index, 0);
    }

    #[test]
    fn cursor_wraps_over_rows_and_fields() {
        let reg = registry(3);
        let mut panel = ControlPanel::new(&reg);

        panel.move_cursor(-1);
        assert_eq!(panel.cursor_row, 2);
        panel.move_cursor(1);
        assert_eq!(panel.cursor_row, 0);

        panel.move_field(-1);
        assert_eq!(panel.selected_field(), Field::Texture);
        panel.move_field(1);
        assert_eq!(panel.selected_field(), Field::Size);
    }
}
