use crate::background::Background;
use crate::boot::Boot;
use crate::bus::Bus;
use crate::canvas::{draw_box, draw_text, draw_text_over, draw_text_styled, fill_rect, wrap, CellBuffer};
use crate::config::{env_reduce_motion, load_settings, project_paths, Args, Settings};
use crate::content::Profile;
use crate::cursor::Cursor;
use crate::input::{collect_input, map_key, Focus, InputEvent, PointerEvent, UiAction};
use crate::logging;
use crate::page::{body, draw_navbar, muted, navbar_hit, Page};
use crate::particles::MAX_DT;
use crate::shell::{Console, Outcome, ShellHost};
use crate::term::Terminal;
use crate::theme::{Rgb, Section};
use anyhow::Result;
use clap::Parser;
use crossterm::style::Color;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

const NAVIGATE_DELAY: Duration = Duration::from_millis(1000);
const CLOSE_DELAY: Duration = Duration::from_millis(800);
const IDLE_WAIT: Duration = Duration::from_millis(500);
const PANEL_BG: Rgb = Rgb::new(0, 12, 0);

/// Follow-up scheduled by a terminal command.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Deferred {
    Navigate(Section),
    Close,
}

pub(crate) struct App {
    settings: Settings,
    profile: Profile,
    term: Terminal,
    background: Background,
    page: Page,
    shells: ShellHost,
    bus: Bus,
    boot: Option<Boot>,
    cursor: Cursor,
    deferred: Option<(Instant, Deferred)>,
    last_tick: Instant,
    should_quit: bool,
}

impl App {
    fn init(args: Args) -> Result<Self> {
        let paths = project_paths()?;
        logging::init(&paths.log_path)?;

        let mut settings = load_settings(&paths.settings_path);
        settings.apply(&args, env_reduce_motion());
        let profile = match &args.profile {
            Some(path) => Profile::load(path)?,
            None => Profile::default(),
        };
        info!(?settings, profile = %profile.name, "starting");

        let term = Terminal::begin()?;
        let now = Instant::now();
        let (cols, rows) = (term.cols, term.rows);

        let background = Background::mount(&settings, cols, rows, now);
        let mut bus = Bus::default();
        let motion = !settings.reduced_motion;
        let mut page = Page::new(&profile, cols, rows, bus.subscribe(), motion, now);
        if let Some(id) = args.section.as_deref() {
            match Section::from_id(id) {
                Some(section) => page.jump(section, true),
                None => warn!(section = id, "unknown start section"),
            }
        }
        let shells = ShellHost::new(&profile);
        let boot = (settings.show_boot && motion)
            .then(|| Boot::new(&profile.handle, now));

        Ok(Self {
            settings,
            profile,
            term,
            background,
            page,
            shells,
            bus,
            boot,
            cursor: Cursor::default(),
            deferred: None,
            last_tick: now,
            should_quit: false,
        })
    }

    fn run(&mut self) -> Result<()> {
        self.render()?;
        while !self.should_quit {
            let now = Instant::now();
            let timeout = self
                .next_wake(now)
                .map_or(IDLE_WAIT, |at| at.saturating_duration_since(now));

            for ev in collect_input(timeout)? {
                self.handle(ev, Instant::now());
                if self.should_quit {
                    break;
                }
            }

            self.tick(Instant::now());
            self.render()?;
        }
        self.background.unmount();
        info!("exiting");
        Ok(())
    }

    fn instant_scroll(&self) -> bool {
        self.settings.reduced_motion
    }

    fn frame_interval(&self) -> Duration {
        Duration::from_secs_f32(1.0 / self.settings.fps_cap.max(1) as f32)
    }

    /// Earliest moment something on screen changes without input.
    fn next_wake(&self, now: Instant) -> Option<Instant> {
        let soon = (self.page.scroller.is_moving() || self.cursor.is_fading())
            .then(|| now + self.frame_interval());
        [
            self.background.next_deadline(),
            self.boot.as_ref().and_then(|b| b.next_deadline(now)),
            self.deferred.map(|(at, _)| at),
            self.boot.is_none().then(|| self.page.next_deadline(now)).flatten(),
            soon,
        ]
        .into_iter()
        .flatten()
        .min()
    }

    fn focus(&self) -> Focus {
        if self.boot.is_some() {
            Focus::Boot
        } else if self.shells.active().is_some() {
            Focus::Terminal
        } else if self.page.carousel.detail_open() {
            Focus::Detail
        } else {
            Focus::Page
        }
    }

    fn handle(&mut self, ev: InputEvent, now: Instant) {
        match ev {
            InputEvent::Resize(cols, rows) => {
                if self.term.resize(cols, rows) {
                    debug!(cols, rows, "terminal resized");
                    self.background.resized(cols, rows, now);
                    self.page.relayout(&self.profile, cols, rows, true);
                }
            }
            InputEvent::Pointer(p) => self.pointer(p, now),
            InputEvent::Key { key, mods } => {
                if let Some(action) = map_key(self.focus(), key, mods) {
                    self.apply(action, now);
                }
            }
        }
    }

    fn pointer(&mut self, p: PointerEvent, now: Instant) {
        match p {
            PointerEvent::Moved(col, row) => {
                self.cursor.moved(col, row);
                self.background.pointer_moved(col, row);
            }
            PointerEvent::Down(col, row) => {
                self.cursor.moved(col, row);
                self.cursor.set_pressed(true);
                self.background.pointer_pressed(col, row);
                if row == 0 && self.focus() == Focus::Page {
                    if let Some(section) = navbar_hit(col) {
                        self.page.navigate(section, now);
                    }
                }
            }
            PointerEvent::Up => {
                self.cursor.set_pressed(false);
                self.background.pointer_released();
            }
            PointerEvent::Wheel(delta) => {
                if self.focus() == Focus::Page {
                    self.page.scroll_by(delta, self.instant_scroll());
                }
            }
        }
    }

    fn apply(&mut self, action: UiAction, now: Instant) {
        let instant = self.instant_scroll();
        match action {
            UiAction::Quit => self.should_quit = true,
            UiAction::SkipBoot => {
                if let Some(boot) = self.boot.as_mut() {
                    boot.skip();
                    debug!("boot skipped");
                }
            }
            UiAction::Scroll(n) => self.page.scroll_by(n, instant),
            UiAction::PageScroll(n) => {
                let step = (self.page.viewport() as i32 - 2).max(1);
                self.page.scroll_by(n * step, instant);
            }
            UiAction::Jump(section) => self.page.jump(section, instant),
            UiAction::Reboot => {
                debug!("reboot to top");
                self.page.jump(Section::Hero, instant);
            }
            UiAction::OpenShell(kind) => self.shells.open(kind, &mut self.bus),
            UiAction::Close => {
                if self.shells.active().is_some() {
                    self.deferred = None;
                    self.shells.close(&mut self.bus);
                } else {
                    self.page.carousel.close_detail();
                }
            }
            UiAction::Type(ch) => {
                if let Some(c) = self.shells.active_console_mut() {
                    c.insert(ch);
                }
            }
            UiAction::Backspace => {
                if let Some(c) = self.shells.active_console_mut() {
                    c.backspace();
                }
            }
            UiAction::Complete => {
                if let Some(c) = self.shells.active_console_mut() {
                    c.complete();
                }
            }
            UiAction::Submit => {
                let outcome = match self.shells.active_console_mut() {
                    Some(c) => c.submit(&self.profile),
                    None => Outcome::Stay,
                };
                match outcome {
                    Outcome::Stay => {}
                    Outcome::Navigate(section) => {
                        self.deferred = Some((now + NAVIGATE_DELAY, Deferred::Navigate(section)));
                    }
                    Outcome::Close => self.deferred = Some((now + CLOSE_DELAY, Deferred::Close)),
                }
            }
            UiAction::CarouselPrev => self.page.browse(&self.profile, false, now),
            UiAction::CarouselNext => self.page.browse(&self.profile, true, now),
            UiAction::ToggleAutoplay => {
                self.page.carousel.toggle_autoplay(now);
                debug!(on = self.page.carousel.autoplay(), "carousel autoplay toggled");
            }
            UiAction::OpenDetail => {
                if !self.page.carousel.open_detail(now) {
                    debug!("project detail suppressed");
                }
            }
        }
    }

    fn tick(&mut self, now: Instant) {
        let dt = (now.saturating_duration_since(self.last_tick).as_secs_f32() * 60.0).min(MAX_DT);
        self.last_tick = now;

        if self.boot.as_ref().is_some_and(|b| b.is_done(now)) {
            self.boot = None;
            debug!("boot finished");
        }

        if let Some((at, what)) = self.deferred {
            if now >= at {
                self.deferred = None;
                if let Deferred::Navigate(section) = what {
                    self.page.jump(section, self.instant_scroll());
                }
                self.shells.close(&mut self.bus);
            }
        }

        if self.boot.is_none() {
            self.page.tick(&self.profile, dt, now);
        }
        self.cursor.tick(dt);
        self.background.frame(now, self.page.active().color());
    }

    fn render(&mut self) -> Result<()> {
        let now = Instant::now();
        let ec = self.settings.enable_color;
        let accent = self.page.active().color();
        let cells = &mut self.term.cur;

        self.background.draw(cells, ec);
        match &self.boot {
            Some(boot) => draw_boot(cells, boot, now, accent, ec),
            None => {
                self.page.draw(cells, ec, now);
                draw_navbar(cells, self.page.active(), ec);
                if let Some(text) = self.page.nav_banner(now) {
                    draw_banner(cells, &text, accent, ec);
                }
                if self.page.carousel.detail_open() {
                    draw_detail(cells, &self.profile, self.page.carousel.index(), accent, ec);
                }
                if let Some(kind) = self.shells.active() {
                    draw_console(cells, self.shells.console(kind), accent, ec);
                }
            }
        }
        let particles = self
            .background
            .field()
            .filter(|_| self.background.is_animating())
            .map(|f| f.particles.len());
        draw_status(cells, particles, self.page.active(), ec);
        self.cursor.draw(cells, accent, ec);

        self.term.present()
    }
}

/* -----------------------------
   Overlays
------------------------------ */

fn centered(cells: &CellBuffer, max_w: u16, max_h: u16) -> Option<(u16, u16, u16, u16)> {
    let bw = max_w.min(cells.w.saturating_sub(4));
    let bh = max_h.min(cells.h.saturating_sub(4));
    if bw < 20 || bh < 6 {
        return None;
    }
    Some(((cells.w - bw) / 2, (cells.h - bh) / 2, bw, bh))
}

fn panel_bg(ec: bool) -> Color {
    if ec {
        PANEL_BG.to_color(true)
    } else {
        Color::Black
    }
}

fn clip(s: &str, w: usize) -> String {
    s.chars().take(w).collect()
}

fn draw_panel(cells: &mut CellBuffer, rect: (u16, u16, u16, u16), title: &str, accent: Rgb, ec: bool) {
    let (x0, y0, bw, bh) = rect;
    let bg = panel_bg(ec);
    fill_rect(cells, x0, y0, bw, bh, bg);
    draw_box(cells, x0, y0, bw, bh, accent.to_color(ec), bg);
    draw_text_styled(cells, x0 + 2, y0, &format!(" {title} "), accent.to_color(ec), bg, true);
}

fn draw_console(cells: &mut CellBuffer, console: &Console, accent: Rgb, ec: bool) {
    let Some(rect) = centered(cells, 76, 22) else {
        return;
    };
    let (x0, y0, bw, bh) = rect;
    draw_panel(cells, rect, console.kind.table().title, accent, ec);
    let bg = panel_bg(ec);
    let inner = (bw - 4) as usize;

    let rows = (bh - 4) as usize;
    let start = console.scrollback.len().saturating_sub(rows);
    for (i, line) in console.scrollback[start..].iter().enumerate() {
        let fg = if line.starts_with("$ ") { accent.to_color(ec) } else { body(ec) };
        draw_text(cells, x0 + 2, y0 + 1 + i as u16, &clip(line, inner), fg, bg);
    }

    let prompt = format!("$ {}_", console.input);
    let prompt_start = prompt.chars().count().saturating_sub(inner);
    let prompt: String = prompt.chars().skip(prompt_start).collect();
    draw_text_styled(cells, x0 + 2, y0 + bh - 3, &prompt, accent.to_color(ec), bg, true);

    let hint = format!("try: {}   [esc] close", console.suggestions().join("  "));
    draw_text(cells, x0 + 2, y0 + bh - 2, &clip(&hint, inner), muted(ec), bg);
}

fn draw_detail(cells: &mut CellBuffer, profile: &Profile, index: usize, accent: Rgb, ec: bool) {
    let Some(project) = profile.projects.get(index) else {
        return;
    };
    let Some(rect) = centered(cells, 64, 16) else {
        return;
    };
    let (x0, y0, bw, bh) = rect;
    draw_panel(cells, rect, &project.name, accent, ec);
    let bg = panel_bg(ec);
    let inner = (bw - 4) as usize;

    let mut lines = wrap(&project.description, inner);
    lines.push(String::new());
    lines.push("Tech:".to_string());
    for t in &project.tech {
        lines.push(format!("  - {t}"));
    }
    if let Some(url) = &project.url {
        lines.push(String::new());
        lines.push(clip(url, inner));
    }
    for (i, line) in lines.iter().take((bh - 4) as usize).enumerate() {
        draw_text(cells, x0 + 2, y0 + 2 + i as u16, line, body(ec), bg);
    }
    draw_text(cells, x0 + 2, y0 + bh - 2, "[esc] close", muted(ec), bg);
}

fn draw_boot(cells: &mut CellBuffer, boot: &Boot, now: Instant, accent: Rgb, ec: bool) {
    let lines = boot.visible(now);
    let x = cells.w / 6;
    let y0 = cells.h / 3;
    let fg = accent.to_color(ec);
    for (i, line) in lines.iter().enumerate() {
        draw_text_over(cells, x, y0 + i as u16, &format!("> {line}"), fg, false);
    }
    let caret_y = y0 + lines.len().saturating_sub(1) as u16;
    let caret_x = x + 2 + lines.last().map_or(0, |l| l.chars().count()) as u16;
    draw_text_over(cells, caret_x, caret_y, "█", fg, false);
    let hint = "press any key to skip";
    let hx = cells.w.saturating_sub(hint.len() as u16) / 2;
    draw_text_over(cells, hx, cells.h.saturating_sub(3), hint, muted(ec), false);
}

/// One-line notice under the navbar, right-aligned.
fn draw_banner(cells: &mut CellBuffer, text: &str, accent: Rgb, ec: bool) {
    let w = text.chars().count() as u16 + 2;
    if cells.w < w + 2 || cells.h < 4 {
        return;
    }
    let x = cells.w - w - 1;
    let bg = panel_bg(ec);
    fill_rect(cells, x, 1, w, 1, bg);
    draw_text_styled(cells, x + 1, 1, text, accent.to_color(ec), bg, true);
}

fn draw_status(cells: &mut CellBuffer, particles: Option<usize>, active: Section, ec: bool) {
    let y = cells.h.saturating_sub(1);
    let left = match particles {
        Some(n) => format!(" {} | particles: {n}", active.id()),
        None => format!(" {} | static", active.id()),
    };
    let right = "[q] quit  [t] terminal  [s] skills  [c] contact ";
    draw_text_over(cells, 0, y, &left, muted(ec), false);
    let rx = cells.w.saturating_sub(right.len() as u16);
    if rx as usize > left.len() {
        draw_text_over(cells, rx, y, right, muted(ec), false);
    }
}

pub(crate) fn run() -> Result<()> {
    let args = Args::parse();
    let mut app = App::init(args)?;
    app.run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shell::ShellKind;

    fn row(cells: &CellBuffer, y: u16) -> String {
        (0..cells.w).map(|x| cells.get(x, y).map_or(' ', |c| c.ch)).collect()
    }

    #[test]
    fn status_row_reports_particles_or_static() {
        let mut cells = CellBuffer::new(100, 5);
        draw_status(&mut cells, Some(80), Section::About, true);
        assert!(row(&cells, 4).starts_with(" about | particles: 80"));
        assert!(row(&cells, 4).contains("[q] quit"));

        let mut cells = CellBuffer::new(100, 5);
        draw_status(&mut cells, None, Section::Hero, false);
        assert!(row(&cells, 4).starts_with(" hero | static"));
    }

    #[test]
    fn console_overlay_shows_latest_scrollback_and_prompt() {
        let p = Profile::default();
        let mut console = Console::new(ShellKind::Hero, &p);
        for _ in 0..30 {
            console.run("help", &p);
        }
        console.insert('a');
        let mut cells = CellBuffer::new(80, 24);
        draw_console(&mut cells, &console, Rgb::new(0, 255, 0), true);
        let all: Vec<String> = (0..24).map(|y| row(&cells, y)).collect();
        assert!(all.iter().any(|l| l.contains("portfolio-terminal")));
        assert!(all.iter().any(|l| l.contains("$ a_")));
        assert!(all.iter().any(|l| l.contains("try: about")));
    }

    #[test]
    fn overlays_skip_tiny_terminals() {
        let p = Profile::default();
        let console = Console::new(ShellKind::Contact, &p);
        let mut cells = CellBuffer::new(12, 5);
        draw_console(&mut cells, &console, Rgb::new(0, 255, 0), true);
        draw_detail(&mut cells, &p, 0, Rgb::new(0, 255, 0), true);
        assert!(cells.cells.iter().all(|c| c.ch == ' '));
    }

    #[test]
    fn banner_sits_under_navbar_on_the_right() {
        let mut cells = CellBuffer::new(60, 10);
        draw_banner(&mut cells, "> navigating to about...", Rgb::new(0, 255, 0), true);
        let line = row(&cells, 1);
        assert!(line.trim_end().ends_with("> navigating to about..."));
        assert!(row(&cells, 0).trim().is_empty());

        let mut tiny = CellBuffer::new(10, 3);
        draw_banner(&mut tiny, "> navigating to about...", Rgb::new(0, 255, 0), true);
        assert!(tiny.cells.iter().all(|c| c.ch == ' '));
    }

    #[test]
    fn detail_lists_tech() {
        let p = Profile::default();
        let mut cells = CellBuffer::new(80, 24);
        draw_detail(&mut cells, &p, 0, Rgb::new(255, 255, 0), true);
        let all: Vec<String> = (0..24).map(|y| row(&cells, y)).collect();
        assert!(all.iter().any(|l| l.contains("MacroMate")));
        assert!(all.iter().any(|l| l.contains("- MongoDB")));
    }
}
