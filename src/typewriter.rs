//! Rotating single-line typewriter used by the hero banner and the footer.
//! Everything is derived from the elapsed time, so a frame can be drawn for
//! any instant without stepping state.

use std::time::{Duration, Instant};

pub(crate) const BLINK_MS: u64 = 500;

pub(crate) struct Typewriter {
    lines: Vec<String>,
    char_ms: u64,
    hold_ms: u64,
    looping: bool,
    started: Instant,
    still: bool,
}

fn prefix(line: &str, n: usize) -> &str {
    let end = line.char_indices().nth(n).map_or(line.len(), |(i, _)| i);
    &line[..end]
}

impl Typewriter {
    pub(crate) fn new(lines: Vec<String>, char_ms: u64, hold_ms: u64, now: Instant) -> Self {
        Self {
            lines,
            char_ms: char_ms.max(1),
            hold_ms,
            looping: false,
            started: now,
            still: false,
        }
    }

    /// Starts over from the first line after the last one has been held.
    pub(crate) fn looping(mut self) -> Self {
        self.looping = true;
        self
    }

    /// Shows a resting line in full and never schedules a frame.
    pub(crate) fn still(mut self) -> Self {
        self.still = true;
        self
    }

    fn typing_ms(&self, line: &str) -> u64 {
        line.chars().count() as u64 * self.char_ms
    }

    fn cycle_ms(&self) -> u64 {
        self.lines.iter().map(|l| self.typing_ms(l) + self.hold_ms).sum()
    }

    fn elapsed_ms(&self, now: Instant) -> u64 {
        now.saturating_duration_since(self.started).as_millis() as u64
    }

    fn resting(&self) -> &str {
        let line = if self.looping { self.lines.first() } else { self.lines.last() };
        line.map_or("", String::as_str)
    }

    /// A one-shot typewriter stops on its last line once that is typed.
    pub(crate) fn is_settled(&self, now: Instant) -> bool {
        if self.still || self.lines.is_empty() {
            return true;
        }
        if self.looping {
            return false;
        }
        let last = self.lines.len() - 1;
        let until: u64 = self.lines[..last]
            .iter()
            .map(|l| self.typing_ms(l) + self.hold_ms)
            .sum::<u64>()
            + self.typing_ms(&self.lines[last]);
        self.elapsed_ms(now) >= until
    }

    pub(crate) fn text_at(&self, now: Instant) -> &str {
        if self.still || self.is_settled(now) {
            return self.resting();
        }
        let mut t = self.elapsed_ms(now);
        if self.looping {
            let cycle = self.cycle_ms();
            if cycle > 0 {
                t %= cycle;
            }
        }
        for line in &self.lines {
            let typing = self.typing_ms(line);
            if t < typing {
                return prefix(line, (t / self.char_ms) as usize);
            }
            if t < typing + self.hold_ms {
                return line;
            }
            t -= typing + self.hold_ms;
        }
        self.resting()
    }

    /// Caret phase; solid when the typewriter is still.
    pub(crate) fn caret_on(&self, now: Instant) -> bool {
        self.still || (self.elapsed_ms(now) / BLINK_MS) % 2 == 0
    }

    /// Next character, or next caret flip once the text has settled.
    pub(crate) fn next_deadline(&self, now: Instant) -> Option<Instant> {
        if self.still {
            return None;
        }
        let step = if self.is_settled(now) { BLINK_MS } else { self.char_ms.min(BLINK_MS) };
        let next = (self.elapsed_ms(now) / step + 1) * step;
        Some(self.started + Duration::from_millis(next))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn at(t: &Typewriter, ms: u64) -> Instant {
        t.started + Duration::from_millis(ms)
    }

    fn lines() -> Vec<String> {
        vec!["abc".to_string(), "de".to_string()]
    }

    #[test]
    fn types_then_holds_each_line() {
        let t = Typewriter::new(lines(), 100, 2000, Instant::now());
        assert_eq!(t.text_at(at(&t, 0)), "");
        assert_eq!(t.text_at(at(&t, 99)), "");
        assert_eq!(t.text_at(at(&t, 100)), "a");
        assert_eq!(t.text_at(at(&t, 300)), "abc");
        assert_eq!(t.text_at(at(&t, 2299)), "abc");
        assert_eq!(t.text_at(at(&t, 2300)), "");
        assert_eq!(t.text_at(at(&t, 2400)), "d");
    }

    #[test]
    fn one_shot_stops_on_last_line() {
        let t = Typewriter::new(lines(), 100, 2000, Instant::now());
        assert!(!t.is_settled(at(&t, 2499)));
        assert!(t.is_settled(at(&t, 2500)));
        assert_eq!(t.text_at(at(&t, 2500)), "de");
        assert_eq!(t.text_at(at(&t, 60_000)), "de");
    }

    #[test]
    fn looping_wraps_to_first_line() {
        let t = Typewriter::new(lines(), 50, 3000, Instant::now()).looping();
        let cycle = 150 + 3000 + 100 + 3000;
        assert_eq!(t.text_at(at(&t, cycle - 1)), "de");
        assert_eq!(t.text_at(at(&t, cycle + 50)), "a");
        assert!(!t.is_settled(at(&t, 10 * cycle)));
    }

    #[test]
    fn caret_blinks_every_half_second() {
        let t = Typewriter::new(lines(), 100, 2000, Instant::now());
        assert!(t.caret_on(at(&t, 0)));
        assert!(!t.caret_on(at(&t, 500)));
        assert!(t.caret_on(at(&t, 1000)));
    }

    #[test]
    fn deadlines_follow_characters_then_caret() {
        let t0 = Instant::now();
        let t = Typewriter::new(lines(), 100, 2000, t0);
        assert_eq!(t.next_deadline(at(&t, 150)), Some(at(&t, 200)));
        assert_eq!(t.next_deadline(at(&t, 2600)), Some(at(&t, 3000)));
    }

    #[test]
    fn still_shows_resting_line_without_frames() {
        let t0 = Instant::now();
        let hero = Typewriter::new(lines(), 100, 2000, t0).still();
        assert_eq!(hero.text_at(t0), "de");
        assert_eq!(hero.next_deadline(t0), None);
        assert!(hero.caret_on(t0 + Duration::from_millis(500)));

        let footer = Typewriter::new(lines(), 50, 3000, t0).looping().still();
        assert_eq!(footer.text_at(t0), "abc");
    }
}
