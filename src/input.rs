use crate::sim::Action;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use std::time::Duration;

pub(crate) fn collect_input_nonblocking(max_frame_time: Duration) -> anyhow::Result<Vec<KeyCode>> {
    let mut out = Vec::new();

    // poll with a tiny timeout so we stay responsive
    let timeout = std::cmp::min(Duration::from_millis(1), max_frame_time);
    while event::poll(timeout)? {
        if let Event::Key(k) = event::read()? {
            if k.kind == KeyEventKind::Press || k.kind == KeyEventKind::Repeat {
                out.push(k.code);
                if out.len() >= 32 {
                    break;
                }
            }
        }
    }
    Ok(out)
}

/// Pure key -> action mapping; all mutation happens in `app`.
pub(crate) fn map_key(key: KeyCode) -> Option<Action> {
    match key {
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => Some(Action::Quit),
        KeyCode::Char('p') | KeyCode::Char('P') => Some(Action::TogglePause),
        KeyCode::Char('h') | KeyCode::Char('H') => Some(Action::HelpToggle),

        // desired body count: direct digit, or +/- stepping
        KeyCode::Char(c @ '1'..='9') => Some(Action::SetBodyCount(c as usize - '0' as usize)),
        KeyCode::Char('0') => Some(Action::SetBodyCount(0)),
        KeyCode::Char('+') | KeyCode::Char('=') => Some(Action::BodyCountDelta(1)),
        KeyCode::Char('-') => Some(Action::BodyCountDelta(-1)),

        // control panel
        KeyCode::Up => Some(Action::PanelMove(-1)),
        KeyCode::Down => Some(Action::PanelMove(1)),
        KeyCode::Tab | KeyCode::Right => Some(Action::FieldMove(1)),
        KeyCode::BackTab | KeyCode::Left => Some(Action::FieldMove(-1)),
        KeyCode::Char(']') => Some(Action::Adjust(1)),
        KeyCode::Char('[') => Some(Action::Adjust(-1)),
        KeyCode::Char('t') => Some(Action::CycleTexture(1)),
        KeyCode::Char('T') => Some(Action::CycleTexture(-1)),

        // camera
        KeyCode::Char('a') | KeyCode::Char('A') => Some(Action::CamYaw(-0.08)),
        KeyCode::Char('d') | KeyCode::Char('D') => Some(Action::CamYaw(0.08)),
        KeyCode::Char('w') | KeyCode::Char('W') => Some(Action::CamPitch(0.06)),
        KeyCode::Char('s') | KeyCode::Char('S') => Some(Action::CamPitch(-0.06)),
        KeyCode::Char('z') | KeyCode::Char('Z') => Some(Action::CamZoom(1.0 / 1.12)),
        KeyCode::Char('x') | KeyCode::Char('X') => Some(Action::CamZoom(1.12)),
        KeyCode::Char('r') | KeyCode::Char('R') => Some(Action::ResetView),

        // view toggles
        KeyCode::Char('o') | KeyCode::Char('O') => Some(Action::ToggleOrbits),
        KeyCode::Char('l') | KeyCode::Char('L') => Some(Action::ToggleLabels),

        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digits_map_to_direct_counts() {
        assert_eq!(map_key(KeyCode::Char('1')), Some(Action::SetBodyCount(1)));
        assert_eq!(map_key(KeyCode::Char('9')), Some(Action::SetBodyCount(9)));
        assert_eq!(map_key(KeyCode::Char('0')), Some(Action::SetBodyCount(0)));
    }

    #[test]
    fn unmapped_keys_do_nothing() {
        assert_eq!(map_key(KeyCode::Char('~')), None);
        assert_eq!(map_key(KeyCode::F(5)), None);
    }

    #[test]
    fn texture_cycle_has_both_directions() {
        assert_eq!(map_key(KeyCode::Char('t')), Some(Action::CycleTexture(1)));
        assert_eq!(map_key(KeyCode::Char('T')), Some(Action::CycleTexture(-1)));
    }
}
