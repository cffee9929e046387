//! Typewriter boot screen shown before the page.

use std::time::{Duration, Instant};

pub(crate) const CHAR_MS: u64 = 50;
pub(crate) const PAUSE_MS: u64 = 500;

pub(crate) fn messages(handle: &str) -> Vec<String> {
    vec![
        "INITIALIZING SYSTEM...".to_string(),
        "LOADING PORTFOLIO MODULES...".to_string(),
        "SCANNING FOR THREATS... [NONE DETECTED]".to_string(),
        "ESTABLISHING SECURE CONNECTION...".to_string(),
        format!("LOADING USER PROFILE: {}", handle.to_uppercase()),
        "AUTHENTICATION SUCCESSFUL".to_string(),
        "WELCOME TO THE MATRIX...".to_string(),
    ]
}

pub(crate) struct Boot {
    lines: Vec<String>,
    started: Instant,
    skipped: bool,
}

impl Boot {
    pub(crate) fn new(handle: &str, now: Instant) -> Self {
        Self {
            lines: messages(handle),
            started: now,
            skipped: false,
        }
    }

    fn line_ms(line: &str) -> u64 {
        line.chars().count() as u64 * CHAR_MS + PAUSE_MS
    }

    pub(crate) fn total(&self) -> Duration {
        Duration::from_millis(self.lines.iter().map(|l| Self::line_ms(l)).sum())
    }

    pub(crate) fn skip(&mut self) {
        self.skipped = true;
    }

    pub(crate) fn is_done(&self, now: Instant) -> bool {
        self.skipped || now.saturating_duration_since(self.started) >= self.total()
    }

    /// Lines as typed so far; the last one may be partial.
    pub(crate) fn visible(&self, now: Instant) -> Vec<&str> {
        let mut left = now.saturating_duration_since(self.started).as_millis() as u64;
        let mut out = Vec::new();
        for line in &self.lines {
            let typed = (left / CHAR_MS) as usize;
            let n = line.chars().count();
            if typed < n {
                if typed > 0 {
                    let end = line.char_indices().nth(typed).map_or(line.len(), |(i, _)| i);
                    out.push(&line[..end]);
                }
                return out;
            }
            out.push(line.as_str());
            left = left.saturating_sub(Self::line_ms(line));
            if left == 0 {
                return out;
            }
        }
        out
    }

    /// When the next character lands.
    pub(crate) fn next_deadline(&self, now: Instant) -> Option<Instant> {
        if self.is_done(now) {
            return None;
        }
        let elapsed = now.saturating_duration_since(self.started).as_millis() as u64;
        let next = (elapsed / CHAR_MS + 1) * CHAR_MS;
        Some(self.started + Duration::from_millis(next))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn at(b: &Boot, ms: u64) -> Instant {
        b.started + Duration::from_millis(ms)
    }

    #[test]
    fn handle_is_shouted() {
        assert_eq!(messages("ada")[4], "LOADING USER PROFILE: ADA");
        assert_eq!(messages("ada").len(), 7);
    }

    #[test]
    fn types_fifty_ms_per_char() {
        let b = Boot::new("ada", Instant::now());
        assert!(b.visible(at(&b, 0)).is_empty());
        assert_eq!(b.visible(at(&b, 49)), Vec::<&str>::new());
        assert_eq!(b.visible(at(&b, 50)), vec!["I"]);
        assert_eq!(b.visible(at(&b, 260)), vec!["INITI"]);
    }

    #[test]
    fn pauses_between_messages() {
        let b = Boot::new("ada", Instant::now());
        let first = "INITIALIZING SYSTEM...".len() as u64 * CHAR_MS;
        assert_eq!(b.visible(at(&b, first)), vec!["INITIALIZING SYSTEM..."]);
        assert_eq!(b.visible(at(&b, first + PAUSE_MS - 1)), vec!["INITIALIZING SYSTEM..."]);
        assert_eq!(b.visible(at(&b, first + PAUSE_MS + CHAR_MS)), vec!["INITIALIZING SYSTEM...", "L"]);
    }

    #[test]
    fn finishes_after_every_message_and_pause() {
        let b = Boot::new("ada", Instant::now());
        let end = at(&b, b.total().as_millis() as u64);
        assert!(!b.is_done(end - Duration::from_millis(1)));
        assert!(b.is_done(end));
        assert_eq!(b.visible(end).len(), 7);
        assert_eq!(b.next_deadline(end), None);
    }

    #[test]
    fn skip_ends_immediately() {
        let t0 = Instant::now();
        let mut b = Boot::new("ada", t0);
        assert_eq!(b.next_deadline(t0), Some(t0 + Duration::from_millis(CHAR_MS)));
        b.skip();
        assert!(b.is_done(t0));
        assert_eq!(b.next_deadline(t0), None);
    }
}
