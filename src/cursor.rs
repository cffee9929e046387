use crate::canvas::{draw_text_over, CellBuffer};
use crate::theme::Rgb;
use std::collections::VecDeque;

const TRAIL_LEN: usize = 8;
/// Life lost per 60 Hz frame.
const TRAIL_DECAY: f32 = 0.08;

struct Mark {
    col: u16,
    row: u16,
    life: f32,
}

/// Pointer glyph drawn over everything, with a short fading trail.
#[derive(Default)]
pub(crate) struct Cursor {
    pos: Option<(u16, u16)>,
    pressed: bool,
    trail: VecDeque<Mark>,
}

impl Cursor {
    #[cfg(test)]
    pub(crate) fn pos(&self) -> Option<(u16, u16)> {
        self.pos
    }

    #[cfg(test)]
    pub(crate) fn trail_len(&self) -> usize {
        self.trail.len()
    }

    pub(crate) fn is_fading(&self) -> bool {
        !self.trail.is_empty()
    }

    pub(crate) fn moved(&mut self, col: u16, row: u16) {
        if let Some((c, r)) = self.pos {
            if (c, r) == (col, row) {
                return;
            }
            self.trail.push_front(Mark { col: c, row: r, life: 1.0 });
            self.trail.truncate(TRAIL_LEN);
        }
        self.pos = Some((col, row));
    }

    pub(crate) fn set_pressed(&mut self, pressed: bool) {
        self.pressed = pressed;
    }

    pub(crate) fn tick(&mut self, dt: f32) {
        for m in &mut self.trail {
            m.life -= TRAIL_DECAY * dt;
        }
        self.trail.retain(|m| m.life > 0.0);
    }

    pub(crate) fn glyph(&self) -> char {
        if self.pressed {
            '◉'
        } else {
            '○'
        }
    }

    pub(crate) fn draw(&self, cells: &mut CellBuffer, color: Rgb, enable_color: bool) {
        let Some((col, row)) = self.pos else {
            return;
        };
        for m in self.trail.iter().rev() {
            let ch = if m.life > 0.5 { '•' } else { '·' };
            draw_text_over(
                cells,
                m.col,
                m.row,
                &ch.to_string(),
                color.scale(m.life).to_color(enable_color),
                false,
            );
        }
        draw_text_over(
            cells,
            col,
            row,
            &self.glyph().to_string(),
            color.to_color(enable_color),
            true,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn hidden_until_first_report() {
        let c = Cursor::default();
        let mut cells = CellBuffer::new(4, 2);
        c.draw(&mut cells, Rgb::new(0, 255, 0), true);
        assert!(cells.cells.iter().all(|x| x.ch == ' '));
        assert_eq!(c.pos(), None);
    }

    #[test]
    fn trail_follows_and_fades() {
        let mut c = Cursor::default();
        c.moved(1, 1);
        assert_eq!(c.trail_len(), 0);
        c.moved(2, 1);
        c.moved(2, 1);
        c.moved(3, 1);
        assert_eq!(c.trail_len(), 2);
        for _ in 0..20 {
            c.tick(1.0);
        }
        assert!(!c.is_fading());
    }

    #[test]
    fn trail_is_bounded() {
        let mut c = Cursor::default();
        for x in 0..50 {
            c.moved(x, 0);
        }
        assert_eq!(c.trail_len(), TRAIL_LEN);
    }

    #[test]
    fn pressed_changes_glyph() {
        let mut c = Cursor::default();
        c.moved(1, 0);
        let mut cells = CellBuffer::new(4, 2);
        c.draw(&mut cells, Rgb::new(0, 255, 0), false);
        assert_eq!(cells.get(1, 0).unwrap().ch, '○');
        c.set_pressed(true);
        c.draw(&mut cells, Rgb::new(0, 255, 0), false);
        assert_eq!(cells.get(1, 0).unwrap().ch, '◉');
    }
}
