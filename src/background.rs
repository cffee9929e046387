//! Mount/unmount lifecycle and frame scheduling for the particle field.

use crate::canvas::{canvas_to_cells, Cell, CellBuffer, PixelCanvas};
use crate::config::Settings;
use crate::particles::{FieldConfig, ParticleField};
use crate::theme::{vignette, Rgb};
use crossterm::style::Color;
use std::time::{Duration, Instant};
use tracing::{debug, info};

const FRAME_60HZ: f32 = 1.0 / 60.0;

/// One-shot "next frame" request, capped to a frame rate.
pub(crate) struct FrameClock {
    interval: Duration,
    next: Option<Instant>,
    last: Option<Instant>,
}

impl FrameClock {
    pub(crate) fn new(fps_cap: u32) -> Self {
        Self {
            interval: Duration::from_secs_f32(1.0 / fps_cap.max(1) as f32),
            next: None,
            last: None,
        }
    }

    pub(crate) fn request(&mut self, now: Instant) {
        if self.next.is_some() {
            return;
        }
        let at = match self.last {
            Some(last) => (last + self.interval).max(now),
            None => now,
        };
        self.next = Some(at);
    }

    pub(crate) fn cancel(&mut self) {
        self.next = None;
    }

    pub(crate) fn pending(&self) -> Option<Instant> {
        self.next
    }

    /// Consumes the pending frame if it is due, returning the elapsed time
    /// since the previous frame in 60 Hz frame units.
    pub(crate) fn poll(&mut self, now: Instant) -> Option<f32> {
        let at = self.next?;
        if now < at {
            return None;
        }
        self.next = None;
        let dt = match self.last {
            Some(last) => now.saturating_duration_since(last).as_secs_f32() / FRAME_60HZ,
            None => 1.0,
        };
        self.last = Some(now);
        Some(dt)
    }
}

/// Holds the latest value until input has been quiet for `quiet`.
pub(crate) struct Debouncer<T> {
    quiet: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Debouncer<T> {
    pub(crate) fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            pending: None,
        }
    }

    pub(crate) fn push(&mut self, value: T, now: Instant) {
        self.pending = Some((value, now + self.quiet));
    }

    pub(crate) fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, at)| *at)
    }

    pub(crate) fn poll(&mut self, now: Instant) -> Option<T> {
        match self.pending {
            Some((_, at)) if now >= at => self.pending.take().map(|(v, _)| v),
            _ => None,
        }
    }
}

pub(crate) struct Animator {
    field: ParticleField,
    surface: Option<PixelCanvas>,
    clock: FrameClock,
    resize: Debouncer<(u16, u16)>,
    pending_move: Option<(f32, f32)>,
}

impl Animator {
    fn new(settings: &Settings, cols: u16, rows: u16, now: Instant) -> Self {
        let config = FieldConfig {
            max_particles: settings.max_particles,
            ..FieldConfig::default()
        };
        let field = ParticleField::new(
            config,
            cols as f32 * 2.0,
            rows as f32 * 4.0,
            cols,
            settings.seed,
        );
        let mut clock = FrameClock::new(settings.fps_cap);
        clock.request(now);
        Self {
            field,
            surface: Some(PixelCanvas::for_cells(cols, rows)),
            clock,
            resize: Debouncer::new(Duration::from_millis(settings.resize_debounce_ms)),
            pending_move: None,
        }
    }
}

/// Centre of a terminal cell in field sub-pixels.
pub(crate) fn cell_to_field(col: u16, row: u16) -> (f32, f32) {
    (col as f32 * 2.0 + 1.0, row as f32 * 4.0 + 2.0)
}

pub(crate) enum Background {
    /// Reduced motion: nothing is simulated or scheduled.
    Static,
    Animated(Box<Animator>),
}

impl Background {
    pub(crate) fn mount(settings: &Settings, cols: u16, rows: u16, now: Instant) -> Self {
        if settings.reduced_motion {
            info!("reduced motion requested, using static background");
            return Background::Static;
        }
        let anim = Animator::new(settings, cols, rows, now);
        info!(
            particles = anim.field.particles.len(),
            cols, rows, "particle field mounted"
        );
        Background::Animated(Box::new(anim))
    }

    pub(crate) fn unmount(&mut self) {
        if let Background::Animated(a) = self {
            a.clock.cancel();
            a.surface = None;
            a.pending_move = None;
            info!("particle field unmounted");
        }
    }

    pub(crate) fn is_animating(&self) -> bool {
        matches!(self, Background::Animated(a) if a.surface.is_some())
    }

    pub(crate) fn field(&self) -> Option<&ParticleField> {
        match self {
            Background::Animated(a) => Some(&a.field),
            Background::Static => None,
        }
    }

    /// Earliest instant at which [`Background::frame`] has work to do.
    pub(crate) fn next_deadline(&self) -> Option<Instant> {
        match self {
            Background::Static => None,
            Background::Animated(a) => match (a.clock.pending(), a.resize.deadline()) {
                (Some(x), Some(y)) => Some(x.min(y)),
                (x, y) => x.or(y),
            },
        }
    }

    pub(crate) fn pointer_moved(&mut self, col: u16, row: u16) {
        if let Background::Animated(a) = self {
            a.pending_move = Some(cell_to_field(col, row));
        }
    }

    pub(crate) fn pointer_pressed(&mut self, col: u16, row: u16) {
        if let Background::Animated(a) = self {
            if a.surface.is_none() {
                return;
            }
            let (x, y) = cell_to_field(col, row);
            a.pending_move = None;
            a.field.press(x, y);
        }
    }

    pub(crate) fn pointer_released(&mut self) {
        if let Background::Animated(a) = self {
            a.field.release();
        }
    }

    pub(crate) fn resized(&mut self, cols: u16, rows: u16, now: Instant) {
        if let Background::Animated(a) = self {
            a.resize.push((cols, rows), now);
        }
    }

    /// Runs one update + render if a frame is due. Returns whether the
    /// surface changed.
    pub(crate) fn frame(&mut self, now: Instant, color: Rgb) -> bool {
        let Background::Animated(a) = self else {
            return false;
        };
        let a = &mut **a;
        if a.surface.is_none() {
            return false;
        }

        if let Some((cols, rows)) = a.resize.poll(now) {
            a.field.resize(cols as f32 * 2.0, rows as f32 * 4.0, cols);
            a.surface = Some(PixelCanvas::for_cells(cols, rows));
            debug!(cols, rows, particles = a.field.particles.len(), "particle field refit");
        }

        let Some(dt) = a.clock.poll(now) else {
            return false;
        };
        a.clock.request(now);

        let Some(surface) = a.surface.as_mut() else {
            return false;
        };
        if surface.is_empty() {
            return false;
        }

        if let Some((x, y)) = a.pending_move.take() {
            a.field.move_pointer(x, y);
        }
        a.field.step(dt);
        a.field.render(surface, color);
        true
    }

    /// Paints the background layer into `cells`.
    pub(crate) fn draw(&self, cells: &mut CellBuffer, enable_color: bool) {
        let (w, h) = (cells.w.max(1) as f32, cells.h.max(1) as f32);
        let bg_at = |x: u16, y: u16| {
            if enable_color {
                vignette(x as f32 / w, y as f32 / h).to_color(true)
            } else {
                Color::Black
            }
        };
        match self {
            Background::Animated(a) => match a.surface.as_ref() {
                Some(surface) => canvas_to_cells(surface, cells, enable_color, bg_at),
                None => fill_static(cells, bg_at),
            },
            Background::Static => fill_static(cells, bg_at),
        }
    }
}

fn fill_static(cells: &mut CellBuffer, bg_at: impl Fn(u16, u16) -> Color) {
    for y in 0..cells.h {
        for x in 0..cells.w {
            cells.set(
                x,
                y,
                Cell {
                    ch: ' ',
                    fg: Color::White,
                    bg: bg_at(x, y),
                    bold: false,
                },
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::default_color;
    use pretty_assertions::assert_eq;

    fn settings() -> Settings {
        Settings {
            fps_cap: 60,
            ..Settings::default()
        }
    }

    fn animator(bg: &Background) -> &Animator {
        match bg {
            Background::Animated(a) => &**a,
            Background::Static => panic!("expected animated background"),
        }
    }

    #[test]
    fn reduced_motion_never_schedules() {
        let now = Instant::now();
        let s = Settings {
            reduced_motion: true,
            ..settings()
        };
        let mut bg = Background::mount(&s, 80, 24, now);
        assert!(!bg.is_animating());
        assert_eq!(bg.next_deadline(), None);
        assert!(!bg.frame(now + Duration::from_secs(1), default_color()));
        assert!(bg.field().is_none());

        let mut cells = CellBuffer::new(10, 4);
        bg.draw(&mut cells, true);
        assert!(cells.cells.iter().all(|c| c.ch == ' '));
    }

    #[test]
    fn frames_run_until_unmount() {
        let t0 = Instant::now();
        let mut bg = Background::mount(&settings(), 80, 24, t0);
        assert!(bg.is_animating());
        assert_eq!(bg.next_deadline(), Some(t0));
        assert!(bg.frame(t0, default_color()));
        assert!(bg.next_deadline().is_some());

        bg.unmount();
        assert_eq!(bg.next_deadline(), None);
        assert!(!bg.frame(t0 + Duration::from_secs(1), default_color()));
        assert!(!bg.is_animating());
    }

    #[test]
    fn frame_cap_is_respected() {
        let t0 = Instant::now();
        let mut clock = FrameClock::new(30);
        clock.request(t0);
        assert_eq!(clock.poll(t0), Some(1.0));
        clock.request(t0);
        assert_eq!(clock.poll(t0 + Duration::from_millis(10)), None);
        let dt = clock.poll(t0 + Duration::from_millis(34)).unwrap();
        assert!((dt - 2.04).abs() < 0.01, "dt {dt}");
    }

    #[test]
    fn cancelled_clock_stays_idle() {
        let t0 = Instant::now();
        let mut clock = FrameClock::new(60);
        clock.request(t0);
        clock.cancel();
        assert_eq!(clock.pending(), None);
        assert_eq!(clock.poll(t0 + Duration::from_secs(5)), None);
    }

    #[test]
    fn missing_surface_skips_the_update() {
        let t0 = Instant::now();
        let mut bg = Background::mount(&settings(), 80, 24, t0);
        if let Background::Animated(a) = &mut bg {
            a.surface = Some(PixelCanvas::new(0, 0));
        }
        let before = animator(&bg).field.particles.clone();
        assert!(!bg.frame(t0, default_color()));
        assert_eq!(animator(&bg).field.particles, before);
    }

    #[test]
    fn resize_waits_for_quiet() {
        let t0 = Instant::now();
        let mut bg = Background::mount(&settings(), 50, 20, t0);
        assert_eq!(bg.field().unwrap().particles.len(), 40);

        bg.resized(100, 30, t0);
        bg.resized(130, 35, t0 + Duration::from_millis(50));
        bg.resized(160, 40, t0 + Duration::from_millis(100));

        bg.frame(t0 + Duration::from_millis(200), default_color());
        assert_eq!(bg.field().unwrap().particles.len(), 40);

        bg.frame(t0 + Duration::from_millis(260), default_color());
        let field = bg.field().unwrap();
        assert_eq!(field.particles.len(), 150);
        assert_eq!(field.width, 320.0);
        assert_eq!(field.height, 160.0);
    }

    #[test]
    fn debouncer_keeps_latest() {
        let t0 = Instant::now();
        let mut d = Debouncer::new(Duration::from_millis(100));
        d.push(1, t0);
        d.push(2, t0 + Duration::from_millis(80));
        assert_eq!(d.poll(t0 + Duration::from_millis(150)), None);
        assert_eq!(d.poll(t0 + Duration::from_millis(180)), Some(2));
        assert_eq!(d.poll(t0 + Duration::from_secs(1)), None);
    }

    #[test]
    fn pointer_moves_apply_once_per_frame() {
        let t0 = Instant::now();
        let mut bg = Background::mount(&settings(), 80, 24, t0);
        bg.pointer_moved(1, 1);
        bg.pointer_moved(5, 5);
        bg.pointer_moved(10, 3);
        assert_eq!(bg.field().unwrap().pointer.pos, None);

        bg.frame(t0, default_color());
        assert_eq!(bg.field().unwrap().pointer.pos, Some(cell_to_field(10, 3)));
    }

    #[test]
    fn press_ripples_immediately() {
        let t0 = Instant::now();
        let mut bg = Background::mount(&settings(), 80, 24, t0);
        bg.pointer_pressed(40, 12);
        let field = bg.field().unwrap();
        assert!(field.pointer.pressed);
        assert_eq!(field.pointer.pos, Some(cell_to_field(40, 12)));
        bg.pointer_released();
        assert!(!bg.field().unwrap().pointer.pressed);
    }
}
