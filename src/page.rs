//! Vertical page of sections over the background, with a scroll-spy that
//! decides which section themes the particle field.

use crate::bus::Notice;
use crate::canvas::{draw_text_over, wrap, CellBuffer};
use crate::content::{level_bar, Profile};
use crate::theme::{Rgb, Section};
use crate::typewriter::Typewriter;
use crossbeam_channel::Receiver;
use crossterm::style::Color;
use std::time::{Duration, Instant};
use tracing::debug;

const BODY: Rgb = Rgb::new(200, 220, 200);
const MUTED: Rgb = Rgb::new(110, 140, 110);
const MARGIN: u16 = 4;

/// One laid-out section: a title row followed by body rows.
pub(crate) struct Block {
    pub(crate) section: Section,
    pub(crate) top: usize,
    pub(crate) lines: Vec<String>,
}

impl Block {
    pub(crate) fn height(&self) -> usize {
        self.lines.len()
    }
}

fn heading(section: Section) -> String {
    format!("> {}", section.id().to_uppercase())
}

fn push_wrapped(out: &mut Vec<String>, s: &str, width: usize, indent: &str) {
    for line in wrap(s, width.saturating_sub(indent.len()).max(8)) {
        out.push(format!("{indent}{line}"));
    }
}

pub(crate) const HERO_CHAR_MS: u64 = 100;
pub(crate) const HERO_HOLD_MS: u64 = 2000;
pub(crate) const FOOTER_CHAR_MS: u64 = 50;
pub(crate) const FOOTER_HOLD_MS: u64 = 3000;

pub(crate) fn hero_messages(name: &str) -> Vec<String> {
    vec![
        format!("Welcome to {name}'s Terminal..."),
        "Loading Portfolio Modules...".to_string(),
        "Access Granted ✓".to_string(),
        "Type 'help' to explore".to_string(),
    ]
}

pub(crate) fn footer_messages(handle: &str) -> Vec<String> {
    vec![
        "$ uptime: 24/7 availability".to_string(),
        "$ run coffee.sh".to_string(),
        "$ git status: ready for opportunities".to_string(),
        format!("$ ping {handle}: response time < 24hrs"),
        "$ whoami: passionate developer".to_string(),
    ]
}

/// Hero rows and the index of the row the typewriter writes into.
fn hero_lines(p: &Profile, width: usize) -> (Vec<String>, usize) {
    let mut out = vec![String::new(), "$ whoami".to_string(), p.name.to_uppercase()];
    push_wrapped(&mut out, &p.tagline, width, "");
    out.push(String::new());
    let live = out.len();
    out.push(String::new());
    out.push(String::new());
    out.push("[t] open terminal   [j/k] scroll   [1-6] jump".to_string());
    (out, live)
}

fn about_lines(p: &Profile, width: usize) -> Vec<String> {
    let mut out = vec![heading(Section::About), String::new()];
    for para in &p.about {
        push_wrapped(&mut out, para, width, "");
        out.push(String::new());
    }
    if !p.education.is_empty() {
        out.push("Education".to_string());
        for e in &p.education {
            out.push(format!("  {} ({})", e.degree, e.period));
            out.push(format!("    {}", e.institution));
        }
    }
    out
}

fn experience_lines(p: &Profile, width: usize) -> Vec<String> {
    let mut out = vec![heading(Section::Experience), String::new()];
    for job in &p.experience {
        out.push(format!("{} @ {}  [{}]", job.title, job.company, job.period));
        push_wrapped(&mut out, &job.description, width, "  ");
        out.push(String::new());
    }
    out
}

fn skills_lines(p: &Profile) -> Vec<String> {
    let mut out = vec![heading(Section::Skills), String::new()];
    for cat in p.categories() {
        out.push(cat.to_string());
        for s in p.skills_in(cat) {
            out.push(format!("  {:<14}{} {:>3}%", s.name, level_bar(s.level), s.level));
        }
    }
    out.push(String::new());
    out.push("[s] skills explorer".to_string());
    out
}

/// Body rows for the focused carousel card.
pub(crate) fn project_card(p: &Profile, index: usize, width: usize) -> Vec<String> {
    let Some(project) = p.projects.get(index) else {
        return vec!["(no projects)".to_string()];
    };
    let mut out = vec![format!(
        "<  [{}/{}] {}  >",
        index + 1,
        p.projects.len(),
        project.name
    )];
    push_wrapped(&mut out, &project.description, width, "  ");
    out.push(format!("  {}", project.tech.join(" · ")));
    out
}

fn projects_lines(p: &Profile, index: usize, width: usize) -> Vec<String> {
    let mut out = vec![heading(Section::Projects), String::new()];
    // Pad to the tallest card so sections below do not jump while browsing.
    let tallest = (0..p.projects.len())
        .map(|i| project_card(p, i, width).len())
        .max()
        .unwrap_or(1);
    let mut card = project_card(p, index, width);
    card.resize(tallest, String::new());
    out.extend(card);
    out.push(String::new());
    out.push("[←/→] browse   [enter] details   [a] autoplay".to_string());
    out
}

/// Contact rows followed by the footer; the second value is the footer's
/// typewriter row.
fn contact_lines(p: &Profile) -> (Vec<String>, usize) {
    let c = &p.contact;
    let mut out = vec![heading(Section::Contact), String::new()];
    let rows = [
        ("email", &c.email),
        ("phone", &c.phone),
        ("linkedin", &c.linkedin),
        ("github", &c.github),
        ("location", &c.location),
    ];
    for (label, value) in rows {
        if let Some(v) = value {
            out.push(format!("  {label:<10}{v}"));
        }
    }
    out.push(String::new());
    out.push("[c] contact terminal".to_string());
    out.push(String::new());
    out.push("──── system.log ────".to_string());
    let live = out.len();
    out.push(String::new());
    out.push(String::new());
    out.push("[r] sudo reboot --to-top".to_string());
    (out, live)
}

pub(crate) struct Layout {
    pub(crate) blocks: Vec<Block>,
    pub(crate) total: usize,
    /// Absolute rows of the hero and footer typewriters.
    pub(crate) hero_live: usize,
    pub(crate) footer_live: usize,
}

/// Lays the sections out top to bottom. The hero fills the first screen.
pub(crate) fn layout(p: &Profile, width: u16, viewport: usize, project: usize) -> Layout {
    let w = width.saturating_sub(MARGIN * 2).max(8) as usize;
    let (mut hero, mut hero_live) = hero_lines(p, w);
    if hero.len() < viewport {
        let pad = (viewport - hero.len()) / 2;
        let mut padded = vec![String::new(); pad];
        padded.append(&mut hero);
        padded.resize(viewport, String::new());
        hero = padded;
        hero_live += pad;
    }
    let (contact, footer_row) = contact_lines(p);

    let bodies = [
        (Section::Hero, hero),
        (Section::About, about_lines(p, w)),
        (Section::Experience, experience_lines(p, w)),
        (Section::Skills, skills_lines(p)),
        (Section::Projects, projects_lines(p, project, w)),
        (Section::Contact, contact),
    ];

    let mut blocks = Vec::with_capacity(bodies.len());
    let mut top = 0;
    let mut footer_live = 0;
    for (section, mut lines) in bodies {
        if section == Section::Contact {
            footer_live = top + footer_row;
        }
        lines.push(String::new());
        let h = lines.len();
        blocks.push(Block { section, top, lines });
        top += h;
    }
    Layout {
        blocks,
        total: top,
        hero_live,
        footer_live,
    }
}

impl Layout {
    pub(crate) fn top_of(&self, section: Section) -> usize {
        self.blocks
            .iter()
            .find(|b| b.section == section)
            .map(|b| b.top)
            .unwrap_or(0)
    }

    pub(crate) fn max_scroll(&self, viewport: usize) -> usize {
        self.total.saturating_sub(viewport)
    }
}

/* -----------------------------
   Scroll spy
------------------------------ */

pub(crate) const SPY_THRESHOLD: f32 = 0.3;

pub(crate) struct ScrollSpy {
    active: Section,
}

impl Default for ScrollSpy {
    fn default() -> Self {
        Self {
            active: Section::Hero,
        }
    }
}

fn overlap(top: usize, height: usize, scroll: usize, viewport: usize) -> usize {
    let a = top.max(scroll);
    let b = (top + height).min(scroll + viewport);
    b.saturating_sub(a)
}

impl ScrollSpy {
    pub(crate) fn active(&self) -> Section {
        self.active
    }

    /// A section intersects when 30% of it, or 30% of the viewport, is on
    /// screen. The most visible one wins; with none, the old one stays.
    pub(crate) fn update(&mut self, blocks: &[Block], scroll: usize, viewport: usize) -> Section {
        let mut best: Option<(Section, usize)> = None;
        for b in blocks {
            let seen = overlap(b.top, b.height(), scroll, viewport);
            if seen == 0 {
                continue;
            }
            let of_view = seen as f32 / viewport.max(1) as f32;
            let of_block = seen as f32 / b.height().max(1) as f32;
            if of_view < SPY_THRESHOLD && of_block < SPY_THRESHOLD {
                continue;
            }
            if best.map_or(true, |(_, n)| seen > n) {
                best = Some((b.section, seen));
            }
        }
        if let Some((section, _)) = best {
            if section != self.active {
                debug!(section = section.id(), "active section changed");
            }
            self.active = section;
        }
        self.active
    }
}

/* -----------------------------
   Smooth scroll
------------------------------ */

/// Fraction of the remaining distance covered per 60 Hz frame.
const EASE: f32 = 0.2;

pub(crate) struct Scroller {
    pos: f32,
    target: f32,
}

impl Scroller {
    pub(crate) fn new() -> Self {
        Self { pos: 0.0, target: 0.0 }
    }

    pub(crate) fn offset(&self) -> usize {
        self.pos.round().max(0.0) as usize
    }

    pub(crate) fn target(&self) -> usize {
        self.target as usize
    }

    pub(crate) fn is_moving(&self) -> bool {
        self.pos != self.target
    }

    pub(crate) fn scroll_to(&mut self, target: usize, max: usize, instant: bool) {
        self.target = target.min(max) as f32;
        if instant {
            self.pos = self.target;
        }
    }

    pub(crate) fn scroll_by(&mut self, delta: i32, max: usize, instant: bool) {
        let t = (self.target as i64 + delta as i64).clamp(0, max as i64) as usize;
        self.scroll_to(t, max, instant);
    }

    /// Pulls position and target inside a new range without ending the ease.
    pub(crate) fn clamp(&mut self, max: usize) {
        let max = max as f32;
        self.target = self.target.min(max);
        self.pos = self.pos.min(max);
    }

    /// Eases toward the target; returns whether the offset moved.
    pub(crate) fn step(&mut self, dt: f32) -> bool {
        if !self.is_moving() {
            return false;
        }
        let before = self.offset();
        let k = 1.0 - (1.0 - EASE).powf(dt.max(0.0));
        self.pos += (self.target - self.pos) * k;
        if (self.target - self.pos).abs() < 0.5 {
            self.pos = self.target;
        }
        self.offset() != before
    }
}

/* -----------------------------
   Navbar
------------------------------ */

pub(crate) const NAV_ITEMS: [(&str, Section); 5] = [
    ("home", Section::Hero),
    ("about", Section::About),
    ("skills", Section::Skills),
    ("projects", Section::Projects),
    ("contact", Section::Contact),
];

/// `1`..`6` address sections in page order.
pub(crate) fn section_for_digit(d: char) -> Option<Section> {
    let n = d.to_digit(10)? as usize;
    n.checked_sub(1).and_then(|i| Section::ALL.get(i).copied())
}

/// Column and text of each navbar entry on row 0.
fn nav_entries() -> Vec<(u16, String, Section)> {
    let mut x = 1;
    NAV_ITEMS
        .iter()
        .map(|&(label, section)| {
            let text = format!("> {label} ");
            let at = x;
            x += text.chars().count() as u16 + 1;
            (at, text, section)
        })
        .collect()
}

/// Entry under a click at `col` on the navbar row.
pub(crate) fn navbar_hit(col: u16) -> Option<Section> {
    nav_entries()
        .into_iter()
        .find(|(x, text, _)| col >= *x && col < *x + text.chars().count() as u16)
        .map(|(_, _, section)| section)
}

pub(crate) fn draw_navbar(cells: &mut CellBuffer, active: Section, enable_color: bool) {
    let accent = active.color();
    for (x, text, section) in nav_entries() {
        let on = section == active;
        let fg = if on { accent } else { MUTED };
        draw_text_over(cells, x, 0, &text, fg.to_color(enable_color), on);
    }
}

pub(crate) const NAV_DELAY_MS: u64 = 800;
pub(crate) const NAV_SETTLE_MS: u64 = 500;
pub(crate) const NAV_LINGER_MS: u64 = 1000;

/// A navbar click: the banner announces the move, the scroll starts after
/// `NAV_DELAY_MS`, and a confirmation lingers before the banner clears.
pub(crate) struct NavBanner {
    section: Section,
    started: Instant,
    jumped: bool,
}

impl NavBanner {
    pub(crate) fn new(section: Section, now: Instant) -> Self {
        Self {
            section,
            started: now,
            jumped: false,
        }
    }

    fn at(&self, ms: u64) -> Instant {
        self.started + Duration::from_millis(ms)
    }

    pub(crate) fn text(&self, now: Instant) -> Option<String> {
        let id = self.section.id();
        if now < self.at(NAV_DELAY_MS + NAV_SETTLE_MS) {
            Some(format!("> navigating to {id}..."))
        } else if !self.is_finished(now) {
            Some(format!("> {id} loaded successfully ✓"))
        } else {
            None
        }
    }

    /// Yields the target once, when the delay has passed.
    pub(crate) fn take_jump(&mut self, now: Instant) -> Option<Section> {
        if self.jumped || now < self.at(NAV_DELAY_MS) {
            return None;
        }
        self.jumped = true;
        Some(self.section)
    }

    pub(crate) fn is_finished(&self, now: Instant) -> bool {
        now >= self.at(NAV_DELAY_MS + NAV_SETTLE_MS + NAV_LINGER_MS)
    }

    pub(crate) fn next_deadline(&self, now: Instant) -> Option<Instant> {
        [
            NAV_DELAY_MS,
            NAV_DELAY_MS + NAV_SETTLE_MS,
            NAV_DELAY_MS + NAV_SETTLE_MS + NAV_LINGER_MS,
        ]
        .into_iter()
        .map(|ms| self.at(ms))
        .find(|&t| t > now || (t == self.at(NAV_DELAY_MS) && !self.jumped))
    }
}

/* -----------------------------
   Projects carousel
------------------------------ */

pub(crate) const AUTOPLAY_MS: u64 = 4000;
/// The detail modal stays shut this long after a terminal closes.
pub(crate) const REOPEN_BLOCK_MS: u64 = 2000;

pub(crate) struct Carousel {
    index: usize,
    len: usize,
    detail: bool,
    suppressed: bool,
    blocked_until: Option<Instant>,
    autoplay: bool,
    next_advance: Instant,
    notices: Receiver<Notice>,
}

impl Carousel {
    pub(crate) fn new(len: usize, notices: Receiver<Notice>, autoplay: bool, now: Instant) -> Self {
        Self {
            index: 0,
            len,
            detail: false,
            suppressed: false,
            blocked_until: None,
            autoplay,
            next_advance: now + Duration::from_millis(AUTOPLAY_MS),
            notices,
        }
    }

    pub(crate) fn index(&self) -> usize {
        self.index
    }

    pub(crate) fn detail_open(&self) -> bool {
        self.detail
    }

    pub(crate) fn autoplay(&self) -> bool {
        self.autoplay
    }

    /// Drains terminal notices. An opening terminal also hides the modal; a
    /// closing one keeps it blocked for `REOPEN_BLOCK_MS`.
    pub(crate) fn sync(&mut self, now: Instant) {
        for n in self.notices.try_iter() {
            match n {
                Notice::TerminalOpened => {
                    self.suppressed = true;
                    self.detail = false;
                }
                Notice::TerminalClosed => {
                    self.suppressed = false;
                    self.blocked_until = Some(now + Duration::from_millis(REOPEN_BLOCK_MS));
                }
            }
        }
    }

    fn is_blocked(&self, now: Instant) -> bool {
        self.suppressed || self.blocked_until.is_some_and(|t| now < t)
    }

    pub(crate) fn next(&mut self) {
        if self.len > 0 {
            self.index = (self.index + 1) % self.len;
        }
    }

    pub(crate) fn prev(&mut self) {
        if self.len > 0 {
            self.index = (self.index + self.len - 1) % self.len;
        }
    }

    /// Restarts the autoplay countdown, so manual browsing is not overtaken.
    pub(crate) fn restart_autoplay(&mut self, now: Instant) {
        self.next_advance = now + Duration::from_millis(AUTOPLAY_MS);
    }

    pub(crate) fn toggle_autoplay(&mut self, now: Instant) {
        self.autoplay = !self.autoplay;
        self.restart_autoplay(now);
    }

    /// Advances when the countdown has run out. The open modal holds the
    /// current card.
    pub(crate) fn autoplay_due(&mut self, now: Instant) -> bool {
        if !self.autoplay || self.len < 2 || now < self.next_advance {
            return false;
        }
        self.restart_autoplay(now);
        if self.detail {
            return false;
        }
        self.next();
        true
    }

    pub(crate) fn next_deadline(&self) -> Option<Instant> {
        (self.autoplay && self.len > 1).then_some(self.next_advance)
    }

    pub(crate) fn open_detail(&mut self, now: Instant) -> bool {
        self.sync(now);
        if self.is_blocked(now) || self.len == 0 {
            return false;
        }
        self.detail = true;
        true
    }

    pub(crate) fn close_detail(&mut self) {
        self.detail = false;
    }
}

/* -----------------------------
   Page
------------------------------ */

pub(crate) struct Page {
    pub(crate) layout: Layout,
    pub(crate) spy: ScrollSpy,
    pub(crate) scroller: Scroller,
    pub(crate) carousel: Carousel,
    hero: Typewriter,
    footer: Typewriter,
    nav: Option<NavBanner>,
    motion: bool,
    viewport: usize,
    width: u16,
}

impl Page {
    /// `motion` off gives still typewriters, no autoplay and instant jumps.
    pub(crate) fn new(
        p: &Profile,
        cols: u16,
        rows: u16,
        notices: Receiver<Notice>,
        motion: bool,
        now: Instant,
    ) -> Self {
        let viewport = viewport_rows(rows);
        let carousel = Carousel::new(p.projects.len(), notices, motion, now);
        let mut hero = Typewriter::new(hero_messages(&p.name), HERO_CHAR_MS, HERO_HOLD_MS, now);
        let mut footer =
            Typewriter::new(footer_messages(&p.handle), FOOTER_CHAR_MS, FOOTER_HOLD_MS, now).looping();
        if !motion {
            hero = hero.still();
            footer = footer.still();
        }
        Self {
            layout: layout(p, cols, viewport, 0),
            spy: ScrollSpy::default(),
            scroller: Scroller::new(),
            carousel,
            hero,
            footer,
            nav: None,
            motion,
            viewport,
            width: cols,
        }
    }

    pub(crate) fn viewport(&self) -> usize {
        self.viewport
    }

    pub(crate) fn active(&self) -> Section {
        self.spy.active()
    }

    /// Rebuilds the layout for a new terminal size. `snap` lands a running
    /// scroll on its target; otherwise it keeps easing inside the new range.
    pub(crate) fn relayout(&mut self, p: &Profile, cols: u16, rows: u16, snap: bool) {
        self.width = cols;
        self.viewport = viewport_rows(rows);
        self.rebuild(p, snap);
    }

    fn rebuild(&mut self, p: &Profile, snap: bool) {
        self.layout = layout(p, self.width, self.viewport, self.carousel.index());
        let max = self.layout.max_scroll(self.viewport);
        if snap {
            let target = self.scroller.target();
            self.scroller.scroll_to(target, max, true);
        } else {
            self.scroller.clamp(max);
        }
        self.refresh_spy();
    }

    /// Moves the carousel by hand.
    pub(crate) fn browse(&mut self, p: &Profile, forward: bool, now: Instant) {
        if forward {
            self.carousel.next();
        } else {
            self.carousel.prev();
        }
        self.carousel.restart_autoplay(now);
        self.rebuild(p, false);
    }

    pub(crate) fn jump(&mut self, section: Section, instant: bool) {
        let max = self.layout.max_scroll(self.viewport);
        self.scroller.scroll_to(self.layout.top_of(section), max, instant);
        self.refresh_spy();
    }

    pub(crate) fn scroll_by(&mut self, delta: i32, instant: bool) {
        let max = self.layout.max_scroll(self.viewport);
        self.scroller.scroll_by(delta, max, instant);
        self.refresh_spy();
    }

    /// Starts a navbar navigation; a newer click replaces a pending one.
    pub(crate) fn navigate(&mut self, section: Section, now: Instant) {
        debug!(section = section.id(), "navbar click");
        self.nav = Some(NavBanner::new(section, now));
    }

    pub(crate) fn nav_banner(&self, now: Instant) -> Option<String> {
        self.nav.as_ref().and_then(|n| n.text(now))
    }

    /// Runs timers (autoplay, navbar) and eases the scroll; returns whether
    /// the offset moved.
    pub(crate) fn tick(&mut self, p: &Profile, dt: f32, now: Instant) -> bool {
        self.carousel.sync(now);
        if self.carousel.autoplay_due(now) {
            debug!(index = self.carousel.index(), "carousel autoplay");
            self.rebuild(p, false);
        }
        if let Some(section) = self.nav.as_mut().and_then(|n| n.take_jump(now)) {
            self.jump(section, !self.motion);
        }
        if self.nav.as_ref().is_some_and(|n| n.is_finished(now)) {
            self.nav = None;
        }
        let moved = self.scroller.step(dt);
        if moved {
            self.refresh_spy();
        }
        moved
    }

    fn on_screen(&self, row: usize) -> bool {
        let scroll = self.scroller.offset();
        row >= scroll && row < scroll + self.viewport
    }

    /// Earliest timer the page itself is waiting on. Typewriters only count
    /// while their row is visible.
    pub(crate) fn next_deadline(&self, now: Instant) -> Option<Instant> {
        let hero = self
            .on_screen(self.layout.hero_live)
            .then(|| self.hero.next_deadline(now))
            .flatten();
        let footer = self
            .on_screen(self.layout.footer_live)
            .then(|| self.footer.next_deadline(now))
            .flatten();
        [
            hero,
            footer,
            self.carousel.next_deadline(),
            self.nav.as_ref().and_then(|n| n.next_deadline(now)),
        ]
        .into_iter()
        .flatten()
        .min()
    }

    fn refresh_spy(&mut self) {
        self.spy
            .update(&self.layout.blocks, self.scroller.offset(), self.viewport);
    }

    fn live_text(&self, row: usize, now: Instant) -> Option<String> {
        let (tw, prefix) = if row == self.layout.hero_live {
            (&self.hero, "> ")
        } else if row == self.layout.footer_live {
            (&self.footer, "")
        } else {
            return None;
        };
        let caret = if tw.caret_on(now) { '_' } else { ' ' };
        Some(format!("{prefix}{}{caret}", tw.text_at(now)))
    }

    /// Page text between the navbar (row 0) and the status row.
    pub(crate) fn draw(&self, cells: &mut CellBuffer, enable_color: bool, now: Instant) {
        let scroll = self.scroller.offset();
        let x = MARGIN.min(self.width / 8);
        for b in &self.layout.blocks {
            let accent = b.section.color();
            for (i, line) in b.lines.iter().enumerate() {
                let row = b.top + i;
                if row < scroll || row >= scroll + self.viewport {
                    continue;
                }
                let y = (row - scroll + 1) as u16;
                if let Some(text) = self.live_text(row, now) {
                    draw_text_over(cells, x, y, &text, accent.to_color(enable_color), true);
                    continue;
                }
                let (fg, bold) = if (i == 0 && b.section != Section::Hero) || line.starts_with('<') {
                    (accent, true)
                } else if line.starts_with('[') || line.starts_with('─') {
                    (MUTED, false)
                } else if b.section == Section::Hero && !line.is_empty() {
                    (accent, true)
                } else {
                    (BODY, false)
                };
                draw_text_over(cells, x, y, line, fg.to_color(enable_color), bold);
            }
        }
    }
}

pub(crate) fn viewport_rows(rows: u16) -> usize {
    rows.saturating_sub(2).max(1) as usize
}

pub(crate) fn muted(enable_color: bool) -> Color {
    MUTED.to_color(enable_color)
}

pub(crate) fn body(enable_color: bool) -> Color {
    BODY.to_color(enable_color)
}
