use crate::assets::TextureSet;
use crate::config::Settings;
use crate::model::{Body, SUN_RADIUS};
use crate::panel::{ControlPanel, Field};
use crate::scene::{Scene, CELL_ASPECT};
use crate::sim::SimState;
use chrono::Local;
use crossterm::{
    cursor, execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{
        self, BeginSynchronizedUpdate, Clear, ClearType, DisableLineWrap, EnableLineWrap,
        EndSynchronizedUpdate, EnterAlternateScreen, LeaveAlternateScreen,
    },
};
use std::io::{self, Write};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Cell {
    pub(crate) ch: char,
    pub(crate) fg: Color,
    pub(crate) bg: Color,
}

impl Cell {
    pub(crate) fn blank(bg: Color) -> Self {
        Self {
            ch: ' ',
            fg: Color::Reset,
            bg,
        }
    }
}

pub(crate) struct CellBuffer {
    pub(crate) w: u16,
    pub(crate) h: u16,
    pub(crate) cells: Vec<Cell>,
}

impl CellBuffer {
    pub(crate) fn new(w: u16, h: u16) -> Self {
        Self {
            w,
            h,
            cells: vec![Cell::blank(Color::Black); (w as usize) * (h as usize)],
        }
    }

    fn idx(&self, x: u16, y: u16) -> usize {
        (y as usize) * (self.w as usize) + (x as usize)
    }

    pub(crate) fn set(&mut self, x: u16, y: u16, c: Cell) {
        if x < self.w && y < self.h {
            let i = self.idx(x, y);
            self.cells[i] = c;
        }
    }

    pub(crate) fn clear(&mut self, bg: Color) {
        self.cells.fill(Cell::blank(bg));
    }
}

pub(crate) struct Terminal {
    pub(crate) out: io::Stdout,
    pub(crate) cols: u16,
    pub(crate) rows: u16,
    pub(crate) prev: CellBuffer,
    pub(crate) cur: CellBuffer,
}

impl Terminal {
    pub(crate) fn begin() -> anyhow::Result<Self> {
        let mut out = io::stdout();
        execute!(
            out,
            EnterAlternateScreen,
            cursor::Hide,
            DisableLineWrap,
            terminal::Clear(ClearType::All)
        )?;
        terminal::enable_raw_mode()?;

        let (cols, rows) = terminal::size()?;
        Ok(Self {
            out,
            cols,
            rows,
            prev: CellBuffer::new(cols, rows),
            cur: CellBuffer::new(cols, rows),
        })
    }

    pub(crate) fn end(&mut self) -> anyhow::Result<()> {
        queue!(
            self.out,
            BeginSynchronizedUpdate,
            ResetColor,
            Clear(ClearType::All),
            cursor::Show,
            EnableLineWrap,
            EndSynchronizedUpdate,
            LeaveAlternateScreen
        )?;
        self.out.flush()?;
        terminal::disable_raw_mode()?;
        Ok(())
    }

    pub(crate) fn resize_if_needed(&mut self) -> anyhow::Result<bool> {
        let (c, r) = terminal::size()?;
        if c == self.cols && r == self.rows {
            return Ok(false);
        }
        self.cols = c;
        self.rows = r;
        self.prev = CellBuffer::new(c, r);
        self.cur = CellBuffer::new(c, r);
        execute!(self.out, terminal::Clear(ClearType::All))?;
        Ok(true)
    }

    pub(crate) fn present(&mut self) -> anyhow::Result<()> {
        queue!(self.out, BeginSynchronizedUpdate)?;

        let mut last_fg = None;
        let mut last_bg = None;

        for y in 0..self.rows {
            for x in 0..self.cols {
                let i = self.cur.idx(x, y);
                let c = self.cur.cells[i];
                if c == self.prev.cells[i] {
                    continue;
                }

                queue!(self.out, cursor::MoveTo(x, y))?;
                if last_fg != Some(c.fg) {
                    queue!(self.out, SetForegroundColor(c.fg))?;
                    last_fg = Some(c.fg);
                }
                if last_bg != Some(c.bg) {
                    queue!(self.out, SetBackgroundColor(c.bg))?;
                    last_bg = Some(c.bg);
                }
                queue!(self.out, Print(c.ch))?;
            }
        }

        queue!(self.out, ResetColor, EndSynchronizedUpdate)?;
        self.out.flush()?;
        self.prev.cells.copy_from_slice(&self.cur.cells);
        Ok(())
    }
}

/* -----------------------------
   Drawing helpers
------------------------------ */

fn clamp01(x: f32) -> f32 {
    x.clamp(0.0, 1.0)
}

fn lerp_u8(a: u8, b: u8, t: f32) -> u8 {
    let t = clamp01(t);
    (a as f32 + (b as f32 - a as f32) * t).round() as u8
}

fn mix(a: [u8; 3], b: [u8; 3], t: f32) -> [u8; 3] {
    [
        lerp_u8(a[0], b[0], t),
        lerp_u8(a[1], b[1], t),
        lerp_u8(a[2], b[2], t),
    ]
}

fn rgb(c: [u8; 3], enable_color: bool) -> Color {
    if enable_color {
        Color::Rgb {
            r: c[0],
            g: c[1],
            b: c[2],
        }
    } else {
        Color::White
    }
}

pub(crate) fn draw_text(buf: &mut CellBuffer, x: u16, y: u16, s: &str, fg: Color, bg: Color) {
    let mut xi = x;
    for ch in s.chars() {
        if xi >= buf.w {
            break;
        }
        buf.set(xi, y, Cell { ch, fg, bg });
        xi += 1;
    }
}

fn box_draw(buf: &mut CellBuffer, x0: u16, y0: u16, bw: u16, bh: u16, fg: Color, bg: Color) {
    if bw < 2 || bh < 2 {
        return;
    }
    let x1 = x0.saturating_add(bw - 1);
    let y1 = y0.saturating_add(bh - 1);
    for x in x0 + 1..x1 {
        buf.set(x, y0, Cell { ch: '─', fg, bg });
        buf.set(x, y1, Cell { ch: '─', fg, bg });
    }
    for y in y0 + 1..y1 {
        buf.set(x0, y, Cell { ch: '│', fg, bg });
        buf.set(x1, y, Cell { ch: '│', fg, bg });
    }
    buf.set(x0, y0, Cell { ch: '┌', fg, bg });
    buf.set(x1, y0, Cell { ch: '┐', fg, bg });
    buf.set(x0, y1, Cell { ch: '└', fg, bg });
    buf.set(x1, y1, Cell { ch: '┘', fg, bg });
}

fn slider(value: f32, lo: f32, hi: f32, width: usize) -> String {
    let t = clamp01((value - lo) / (hi - lo).max(1e-6));
    let filled = (t * width as f32).round() as usize;
    let mut s = String::with_capacity(width + 2);
    s.push('[');
    for i in 0..width {
        s.push(if i < filled { '█' } else { '─' });
    }
    s.push(']');
    s
}

/* -----------------------------
   Frame composition
------------------------------ */

const HUD_W: u16 = 36;

pub(crate) struct FrameCtx<'a> {
    pub(crate) scene: &'a Scene,
    pub(crate) sim: &'a SimState,
    pub(crate) panel: &'a ControlPanel,
    pub(crate) textures: &'a TextureSet,
    pub(crate) settings: &'a Settings,
    pub(crate) t_real: f32,
    pub(crate) show_help: bool,
}

pub(crate) fn draw_frame(buf: &mut CellBuffer, ctx: &FrameCtx) {
    let bg = Color::Black;
    buf.clear(bg);
    if buf.w < 24 || buf.h < 8 {
        draw_text(buf, 0, 0, "terminal too small", Color::White, bg);
        return;
    }

    let hud_w = HUD_W.min(buf.w / 2);
    let main_w = buf.w.saturating_sub(hud_w);

    draw_starfield(buf, ctx, main_w);
    if ctx.scene.show_orbits {
        draw_orbit_rings(buf, ctx, main_w);
    }
    draw_bodies(buf, ctx, main_w);
    draw_hud(buf, ctx, main_w, hud_w);

    if ctx.show_help {
        draw_help_overlay(buf, main_w);
    }
}

fn draw_starfield(buf: &mut CellBuffer, ctx: &FrameCtx, main_w: u16) {
    let color = ctx.settings.enable_color;
    for s in &ctx.scene.stars {
        let Some(p) = ctx.scene.camera.project(s.pos, buf.w, buf.h) else {
            continue;
        };
        let (x, y) = (p.x, p.y);
        if x < 0.0 || y < 0.0 || x >= main_w as f32 || y >= buf.h as f32 {
            continue;
        }
        let tw = (ctx.t_real * 0.65 + s.phase).sin() * 0.5 + 0.5;
        let b = 0.2 + 0.8 * tw * s.depth;
        let ch = if b > 0.82 {
            '✦'
        } else if b > 0.6 {
            '•'
        } else {
            '·'
        };
        let c = (40.0 + b * 180.0) as u8;
        buf.set(
            x as u16,
            y as u16,
            Cell {
                ch,
                fg: rgb([c, c, c.saturating_add(25)], color),
                bg: Color::Black,
            },
        );
    }
}

fn draw_orbit_rings(buf: &mut CellBuffer, ctx: &FrameCtx, main_w: u16) {
    let edge = rgb([80, 95, 120], ctx.settings.enable_color);
    for b in ctx.sim.registry.active() {
        let r = b.orbit_radius();
        let steps = ((r * 1.2) as i32).max(48);
        for s in 0..steps {
            if s % 3 != 0 {
                continue;
            }
            let a = 2.0 * std::f32::consts::PI * (s as f32 / steps as f32);
            let world = [r * a.cos(), 0.0, r * a.sin()];
            let Some(p) = ctx.scene.camera.project(world, buf.w, buf.h) else {
                continue;
            };
            if p.x >= 1.0 && p.y >= 1.0 && p.x < (main_w - 1) as f32 && p.y < (buf.h - 1) as f32 {
                buf.set(
                    p.x as u16,
                    p.y as u16,
                    Cell {
                        ch: '·',
                        fg: edge,
                        bg: Color::Black,
                    },
                );
            }
        }
    }
}

fn draw_bodies(buf: &mut CellBuffer, ctx: &FrameCtx, main_w: u16) {
    // painter's order: farthest first so near bodies overdraw
    struct Drawable<'a> {
        body: Option<&'a Body>,
        world: [f32; 3],
        depth: f32,
    }

    let mut list: Vec<Drawable> = Vec::new();
    if let Some(p) = ctx.scene.camera.project([0.0, 0.0, 0.0], buf.w, buf.h) {
        list.push(Drawable {
            body: None,
            world: [0.0, 0.0, 0.0],
            depth: p.depth,
        });
    }
    for b in ctx.sim.registry.active() {
        let world = b.position();
        if let Some(p) = ctx.scene.camera.project(world, buf.w, buf.h) {
            list.push(Drawable {
                body: Some(b),
                world,
                depth: p.depth,
            });
        }
    }
    list.sort_by(|a, b| b.depth.partial_cmp(&a.depth).unwrap_or(std::cmp::Ordering::Equal));

    for d in &list {
        match d.body {
            None => draw_sun(buf, ctx, main_w),
            Some(b) => draw_planet(buf, ctx, b, d.world, main_w),
        }
    }
}

fn draw_sun(buf: &mut CellBuffer, ctx: &FrameCtx, main_w: u16) {
    let color = ctx.settings.enable_color;
    let Some(p) = ctx.scene.camera.project([0.0, 0.0, 0.0], buf.w, buf.h) else {
        return;
    };
    let r = (SUN_RADIUS * p.scale).max(1.0);
    shade_disc(buf, main_w, p.x, p.y, r, |nx, ny, d| {
        if d > 1.0 {
            let glow = clamp01(1.0 - (d - 1.0) / 0.35);
            if glow < 0.25 {
                return None;
            }
            return Some((
                if glow > 0.6 { '░' } else { '·' },
                rgb(mix([90, 60, 20], [255, 200, 90], glow), color),
            ));
        }
        // granulation-ish ripple driven by the sun's accumulated spin
        let ripple =
            0.5 + 0.5 * ((nx * 5.0 + ctx.sim.sun_spin * 2.0).sin() * (ny * 5.0 - ctx.sim.sun_spin).cos());
        let heat = clamp01(0.55 + 0.45 * ripple - d * 0.25);
        let ch = if heat > 0.75 {
            '█'
        } else if heat > 0.5 {
            '▓'
        } else {
            '▒'
        };
        Some((ch, rgb(mix([255, 150, 40], [255, 240, 170], heat), color)))
    });

    if ctx.scene.show_labels {
        let lx = (p.x + r + 2.0) as u16;
        draw_text(
            buf,
            lx.min(main_w.saturating_sub(4)),
            p.y as u16,
            "Sun",
            rgb([255, 220, 140], color),
            Color::Black,
        );
    }
}

fn draw_planet(buf: &mut CellBuffer, ctx: &FrameCtx, b: &Body, world: [f32; 3], main_w: u16) {
    let color = ctx.settings.enable_color;
    let Some(p) = ctx.scene.camera.project(world, buf.w, buf.h) else {
        return;
    };
    let tex = ctx.textures.get(b.texture_index);
    let r = (b.size * p.scale).max(0.5);
    let light = &ctx.scene.light;
    let spin = b.spin;
    let band_freq = 2.0 + tex.bands * 9.0;
    let seed_off = (tex.seed & 0xFF) as f32 * 0.1;

    if r < 1.0 {
        // sub-cell: single point
        if p.x >= 1.0 && p.y >= 1.0 && p.x < (main_w - 1) as f32 && p.y < (buf.h - 1) as f32 {
            buf.set(
                p.x as u16,
                p.y as u16,
                Cell {
                    ch: '●',
                    fg: rgb(tex.base, color),
                    bg: Color::Black,
                },
            );
        }
    } else {
        shade_disc(buf, main_w, p.x, p.y, r, |nx, ny, d| {
            if d > 1.0 {
                return None;
            }
            let nz = (1.0 - d * d).max(0.0).sqrt();
            let ndotl = (nx * light.dir[0] + ny * -light.dir[1] + nz * light.dir[2]).max(0.0);

            // spin shifts the banding pattern across the visible disc
            let lat = ny.asin();
            let lon = nx.atan2(nz) + spin;
            let band = 0.5 + 0.5 * (lat * band_freq + lon + seed_off).sin();

            let intensity = clamp01(ndotl.powf(1.15) + 0.08);
            let lit = mix(tex.shadow, tex.base, intensity);
            let col = mix(lit, tex.accent, band * intensity * 0.55);

            let ch = if intensity > 0.72 {
                '█'
            } else if intensity > 0.45 {
                '▓'
            } else if intensity > 0.2 {
                '▒'
            } else {
                '░'
            };
            Some((ch, rgb(col, color)))
        });
    }

    if ctx.scene.show_labels {
        let lx = (p.x + r + 2.0) as u16;
        draw_text(
            buf,
            lx.min(main_w.saturating_sub(2)),
            p.y as u16,
            &b.name,
            rgb([150, 160, 180], color),
            Color::Black,
        );
    }
}

/// Rasterizes an aspect-corrected disc: `f` gets the unit-sphere normal xy
/// and the radial distance, and returns a glyph+color or None to skip.
fn shade_disc<F>(buf: &mut CellBuffer, main_w: u16, fx: f32, fy: f32, r: f32, mut f: F)
where
    F: FnMut(f32, f32, f32) -> Option<(char, Color)>,
{
    let ry = r * CELL_ASPECT;
    let pad = 1.4;
    let x0 = ((fx - r * pad).floor().max(1.0)) as u16;
    let x1 = ((fx + r * pad).ceil().min((main_w.saturating_sub(1)) as f32)) as u16;
    let y0 = ((fy - ry * pad).floor().max(1.0)) as u16;
    let y1 = ((fy + ry * pad).ceil().min((buf.h.saturating_sub(1)) as f32)) as u16;

    for y in y0..y1 {
        for x in x0..x1 {
            let nx = (x as f32 + 0.5 - fx) / r;
            let ny = (y as f32 + 0.5 - fy) / ry;
            let d = (nx * nx + ny * ny).sqrt();
            if let Some((ch, fg)) = f(nx, ny, d) {
                buf.set(
                    x,
                    y,
                    Cell {
                        ch,
                        fg,
                        bg: Color::Black,
                    },
                );
            }
        }
    }
}

/* -----------------------------
   HUD / control panel
------------------------------ */

fn draw_hud(buf: &mut CellBuffer, ctx: &FrameCtx, main_w: u16, hud_w: u16) {
    let bg = Color::Black;
    let color = ctx.settings.enable_color;
    let fg = rgb([220, 225, 240], color);
    let dim = rgb([130, 140, 160], color);
    let edge = rgb([80, 95, 120], color);
    let hot = rgb([255, 210, 120], color);

    for y in 0..buf.h {
        buf.set(main_w, y, Cell { ch: '│', fg: edge, bg });
    }

    let top_h = 8u16.min(buf.h);
    box_draw(buf, main_w, 0, hud_w, top_h, edge, bg);
    if buf.h > top_h {
        box_draw(buf, main_w, top_h, hud_w, buf.h - top_h, edge, bg);
    }

    let x = main_w + 2;
    draw_text(buf, x, 1, "Solarium", fg, bg);
    draw_text(
        buf,
        x,
        2,
        &format!("Time: {}", Local::now().format("%H:%M:%S")),
        dim,
        bg,
    );
    draw_text(
        buf,
        x,
        3,
        &format!(
            "State: {}",
            if ctx.sim.paused() { "paused" } else { "running" }
        ),
        if ctx.sim.paused() { hot } else { dim },
        bg,
    );
    draw_text(
        buf,
        x,
        4,
        &format!(
            "Bodies: {}/{}",
            ctx.sim.registry.active_count(),
            ctx.sim.registry.capacity()
        ),
        dim,
        bg,
    );
    draw_text(
        buf,
        x,
        5,
        &format!(
            "Textures: {} ({})",
            ctx.textures.len(),
            if ctx.textures.from_files { "files" } else { "builtin" }
        ),
        dim,
        bg,
    );
    draw_text(
        buf,
        x,
        6,
        &format!(
            "Cam: yaw {:>4.0}° pitch {:>3.0}°",
            ctx.scene.camera.yaw.to_degrees(),
            ctx.scene.camera.pitch.to_degrees()
        ),
        dim,
        bg,
    );

    // body rows
    let mut y = top_h + 1;
    let limit = buf.h.saturating_sub(7);
    draw_text(buf, x, y, "Planets", fg, bg);
    y += 1;
    for (ri, row) in ctx.panel.rows().iter().enumerate() {
        if y + 1 >= limit {
            break;
        }
        let b = &ctx.sim.registry.bodies()[row.body_index];
        let tex = ctx.textures.get(b.texture_index);
        let selected = ri == ctx.panel.cursor_row;
        let marker = if selected { '▸' } else { ' ' };
        let name_fg = if selected { hot } else { fg };

        draw_text(
            buf,
            x,
            y,
            &format!("{marker} {:<11} [{}]", b.name, tex.name),
            name_fg,
            bg,
        );
        y += 1;

        let field_fg = |f: Field| {
            if selected && ctx.panel.selected_field() == f {
                hot
            } else {
                dim
            }
        };
        let mut fx = x + 2;
        for (label, value, field) in [
            ("sz", b.size, Field::Size),
            ("or", b.orbit_speed, Field::OrbitSpeed),
            ("sp", b.spin_speed, Field::SpinSpeed),
        ] {
            let s = format!("{label} {value:>4.2} ");
            draw_text(buf, fx, y, &s, field_fg(field), bg);
            fx += s.chars().count() as u16;
        }
        draw_text(
            buf,
            fx,
            y,
            &format!("tx {}", b.texture_index),
            field_fg(Field::Texture),
            bg,
        );
        y += 1;
    }

    // slider for the selected field
    if let Some(idx) = ctx.panel.selected_body() {
        let b = &ctx.sim.registry.bodies()[idx];
        let (lo, hi, value) = match ctx.panel.selected_field() {
            Field::Size => (crate::model::SIZE_RANGE.0, crate::model::SIZE_RANGE.1, b.size),
            Field::OrbitSpeed => (
                crate::model::ORBIT_SPEED_RANGE.0,
                crate::model::ORBIT_SPEED_RANGE.1,
                b.orbit_speed,
            ),
            Field::SpinSpeed => (
                crate::model::SPIN_SPEED_RANGE.0,
                crate::model::SPIN_SPEED_RANGE.1,
                b.spin_speed,
            ),
            Field::Texture => (0.0, ctx.textures.len().saturating_sub(1) as f32, b.texture_index as f32),
        };
        if y < limit {
            draw_text(
                buf,
                x,
                y,
                &format!(
                    "{:<7} {} {:.2}",
                    ctx.panel.selected_field().label(),
                    slider(value, lo, hi, 14),
                    value
                ),
                hot,
                bg,
            );
        }
    }

    // key help footer
    let mut fy = buf.h.saturating_sub(6);
    for line in [
        "1-9 count  +/- step  P pause",
        "↑↓ body  ←→/Tab field  [ ] set",
        "T texture  O orbits  L labels",
        "WASD orbit  Z/X zoom  R reset",
        "H help  Q quit",
    ] {
        draw_text(buf, x, fy, line, dim, bg);
        fy += 1;
    }
}

fn draw_help_overlay(buf: &mut CellBuffer, main_w: u16) {
    let fg = Color::White;
    let bg = Color::Black;
    let bw = 46u16.min(main_w.saturating_sub(2));
    let bh = 14u16.min(buf.h.saturating_sub(2));
    if bw < 10 || bh < 6 {
        return;
    }
    let x0 = (main_w - bw) / 2;
    let y0 = (buf.h - bh) / 2;

    for y in y0..y0 + bh {
        for x in x0..x0 + bw {
            buf.set(x, y, Cell::blank(bg));
        }
    }
    box_draw(buf, x0, y0, bw, bh, fg, bg);
    draw_text(buf, x0 + 2, y0 + 1, "Solarium — controls", fg, bg);

    let dim = Color::Grey;
    for (i, line) in [
        "Digits set the number of planets; +/- step it.",
        "Up/Down pick a planet, Left/Right pick a field,",
        "[ and ] adjust it. T cycles the texture.",
        "P pauses and resumes without a time jump.",
        "W/A/S/D orbit the camera, Z/X zoom, R resets.",
        "O and L toggle orbit rings and labels.",
        "",
        "Drop planet1.json, planet2.json, ... next to the",
        "binary (or set texture_dir in settings) to use",
        "your own palettes; loading stops at the first gap.",
        "",
        "H closes this help. Q quits.",
    ]
    .iter()
    .enumerate()
    {
        draw_text(buf, x0 + 2, y0 + 2 + i as u16, line, dim, bg);
    }
}
