use crate::assets::{load_textures, TextureSet};
use crate::config::{load_settings, project_paths, save_settings_atomic, Paths, Settings};
use crate::input::{collect_input_nonblocking, map_key};
use crate::model::Registry;
use crate::panel::ControlPanel;
use crate::render::{draw_frame, FrameCtx, Terminal};
use crate::scene::Scene;
use crate::sim::{Action, SimState};
use std::path::PathBuf;
use std::time::{Duration, Instant};

pub(crate) struct App {
    settings: Settings,
    paths: Paths,
    textures: TextureSet,
    scene: Scene,
    sim: SimState,
    panel: ControlPanel,
    term: Terminal,
    show_help: bool,
    should_quit: bool,
    started: Instant,
}

impl App {
    fn init() -> anyhow::Result<Self> {
        let paths = project_paths()?;
        let settings = load_settings(&paths.settings_path);

        // loader -> registry -> loop: the registry is only built once the
        // texture set is final
        let textures = load_textures(&texture_dir(&settings));

        let now = Instant::now();
        let registry = Registry::new(settings.initial_bodies, textures.len(), now);
        let sim = SimState::new(registry, now);
        let panel = ControlPanel::new(&sim.registry);
        let scene = Scene::new(settings.star_count, settings.seed);

        let term = Terminal::begin()?;

        Ok(Self {
            settings,
            paths,
            textures,
            scene,
            sim,
            panel,
            term,
            show_help: false,
            should_quit: false,
            started: now,
        })
    }

    fn run(&mut self) -> anyhow::Result<()> {
        let fps = self.settings.fps_cap.clamp(10, 240);
        let frame_dt = Duration::from_secs_f32(1.0 / fps as f32);

        while !self.should_quit {
            let _resized = self.term.resize_if_needed()?;

            let now = Instant::now();
            for key in collect_input_nonblocking(frame_dt)? {
                if let Some(action) = map_key(key) {
                    self.apply(action, now);
                }
            }

            // the panel re-reads registry state every frame; a count change
            // regenerates its rows
            self.panel.sync(&self.sim.registry);

            self.sim.advance(now);
            self.render_frame()?;

            spin_sleep(frame_dt, now);
        }

        self.term.end()?;
        self.settings.initial_bodies = self.sim.registry.active_count();
        save_settings_atomic(&self.paths.settings_path, &self.settings)?;
        Ok(())
    }

    fn apply(&mut self, action: Action, now: Instant) {
        match action {
            Action::Quit => self.should_quit = true,
            Action::TogglePause => self.sim.toggle_pause(now),
            Action::HelpToggle => self.show_help = !self.show_help,

            Action::SetBodyCount(n) => self.sim.registry.set_active_count(n, now),
            Action::BodyCountDelta(d) => {
                let cur = self.sim.registry.active_count() as i32;
                let next = (cur + d).clamp(0, self.sim.registry.capacity() as i32);
                self.sim.registry.set_active_count(next as usize, now);
            }

            Action::PanelMove(d) => self.panel.move_cursor(d),
            Action::FieldMove(d) => self.panel.move_field(d),
            Action::Adjust(d) => self.panel.adjust(&mut self.sim.registry, d, self.textures.len()),
            Action::CycleTexture(d) => {
                if let Some(i) = self.panel.selected_body() {
                    self.sim.registry.cycle_texture(i, self.textures.len(), d);
                }
            }

            Action::CamYaw(d) => self.scene.camera.add_yaw(d),
            Action::CamPitch(d) => self.scene.camera.add_pitch(d),
            Action::CamZoom(f) => self.scene.camera.zoom(f),
            Action::ResetView => self.scene.camera.reset(),
            Action::ToggleOrbits => self.scene.show_orbits = !self.scene.show_orbits,
            Action::ToggleLabels => self.scene.show_labels = !self.scene.show_labels,
        }
    }

    fn render_frame(&mut self) -> anyhow::Result<()> {
        let ctx = FrameCtx {
            scene: &self.scene,
            sim: &self.sim,
            panel: &self.panel,
            textures: &self.textures,
            settings: &self.settings,
            t_real: self.started.elapsed().as_secs_f32(),
            show_help: self.show_help,
        };
        draw_frame(&mut self.term.cur, &ctx);
        self.term.present()?;
        Ok(())
    }
}

/// Texture base path: explicit override from settings, else a `textures/`
/// directory next to the executable.
fn texture_dir(settings: &Settings) -> PathBuf {
    if let Some(dir) = &settings.texture_dir {
        return dir.clone();
    }
    std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|d| d.join("textures")))
        .unwrap_or_else(|| PathBuf::from("textures"))
}

pub(crate) fn run() -> anyhow::Result<()> {
    let mut app = App::init()?;
    app.run()?;
    Ok(())
}

/* -----------------------------
   Frame pacing helper
------------------------------ */

fn spin_sleep(target: Duration, now: Instant) {
    let end = now + target;
    loop {
        let t = Instant::now();
        if t >= end {
            break;
        }
        let left = end - t;
        if left > Duration::from_millis(2) {
            std::thread::sleep(Duration::from_millis(1));
        } else {
            std::hint::spin_loop();
        }
    }
}
