use crate::theme::Rgb;
use crossterm::style::Color;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Cell {
    pub(crate) ch: char,
    pub(crate) fg: Color,
    pub(crate) bg: Color,
    pub(crate) bold: bool,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            ch: ' ',
            fg: Color::White,
            bg: Color::Black,
            bold: false,
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
            cells: vec![Cell::default(); (w as usize) * (h as usize)],
        }
    }
    pub(crate) fn idx(&self, x: u16, y: u16) -> usize {
        (y as usize) * (self.w as usize) + (x as usize)
    }
    pub(crate) fn get(&self, x: u16, y: u16) -> Option<Cell> {
        if x < self.w && y < self.h {
            Some(self.cells[self.idx(x, y)])
        } else {
            None
        }
    }
    pub(crate) fn set(&mut self, x: u16, y: u16, c: Cell) {
        if x < self.w && y < self.h {
            let i = self.idx(x, y);
            self.cells[i] = c;
        }
    }
}

/// Writes `s` starting at (x, y), clipped to the buffer. Returns the number of
/// columns written.
pub(crate) fn draw_text(buf: &mut CellBuffer, x: u16, y: u16, s: &str, fg: Color, bg: Color) -> u16 {
    draw_text_styled(buf, x, y, s, fg, bg, false)
}

pub(crate) fn draw_text_styled(
    buf: &mut CellBuffer,
    x: u16,
    y: u16,
    s: &str,
    fg: Color,
    bg: Color,
    bold: bool,
) -> u16 {
    let mut xx = x;
    for ch in s.chars() {
        if xx >= buf.w {
            break;
        }
        buf.set(xx, y, Cell { ch, fg, bg, bold });
        xx += 1;
    }
    xx - x
}

/// Text that keeps whatever background the cell already has, so the particle
/// field shows through between glyphs.
pub(crate) fn draw_text_over(buf: &mut CellBuffer, x: u16, y: u16, s: &str, fg: Color, bold: bool) {
    let mut xx = x;
    for ch in s.chars() {
        if xx >= buf.w {
            break;
        }
        if let Some(prev) = buf.get(xx, y) {
            buf.set(xx, y, Cell { ch, fg, bg: prev.bg, bold });
        }
        xx += 1;
    }
}

pub(crate) fn fill_rect(buf: &mut CellBuffer, x0: u16, y0: u16, w: u16, h: u16, bg: Color) {
    for y in y0..y0.saturating_add(h) {
        for x in x0..x0.saturating_add(w) {
            buf.set(x, y, Cell { ch: ' ', fg: Color::White, bg, bold: false });
        }
    }
}

pub(crate) fn draw_box(buf: &mut CellBuffer, x0: u16, y0: u16, bw: u16, bh: u16, fg: Color, bg: Color) {
    if bw < 2 || bh < 2 {
        return;
    }
    let x1 = x0.saturating_add(bw - 1);
    let y1 = y0.saturating_add(bh - 1);
    let put = |buf: &mut CellBuffer, x, y, ch| buf.set(x, y, Cell { ch, fg, bg, bold: false });

    for x in x0 + 1..x1 {
        put(buf, x, y0, '─');
        put(buf, x, y1, '─');
    }
    for y in y0 + 1..y1 {
        put(buf, x0, y, '│');
        put(buf, x1, y, '│');
    }
    put(buf, x0, y0, '┌');
    put(buf, x1, y0, '┐');
    put(buf, x0, y1, '└');
    put(buf, x1, y1, '┘');
}

/// Greedy word wrap to `max_w` columns. Words longer than a line are split.
pub(crate) fn wrap(s: &str, max_w: usize) -> Vec<String> {
    let mut out = Vec::new();
    if max_w == 0 {
        return out;
    }
    let mut line = String::new();
    for word in s.split_whitespace() {
        let wlen = word.chars().count();
        if wlen > max_w {
            if !line.is_empty() {
                out.push(std::mem::take(&mut line));
            }
            let chars: Vec<char> = word.chars().collect();
            for chunk in chars.chunks(max_w) {
                out.push(chunk.iter().collect());
            }
            continue;
        }
        let need = if line.is_empty() {
            wlen
        } else {
            line.chars().count() + 1 + wlen
        };
        if need > max_w && !line.is_empty() {
            out.push(std::mem::take(&mut line));
        }
        if !line.is_empty() {
            line.push(' ');
        }
        line.push_str(word);
    }
    if !line.is_empty() || out.is_empty() {
        out.push(line);
    }
    out
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Pixel {
    pub(crate) r: u8,
    pub(crate) g: u8,
    pub(crate) b: u8,
    pub(crate) a: u8,
}

impl Pixel {
    pub(crate) fn from_rgb(c: Rgb, alpha: f32) -> Self {
        Pixel {
            r: c.r,
            g: c.g,
            b: c.b,
            a: (alpha.clamp(0.0, 1.0) * 255.0 + 0.5) as u8,
        }
    }
}

/// RGBA sub-pixel surface. Braille gives 2x4 of these per terminal cell.
pub(crate) struct PixelCanvas {
    pub(crate) w: u32,
    pub(crate) h: u32,
    pub(crate) px: Vec<Pixel>,
}

impl PixelCanvas {
    pub(crate) fn new(w: u32, h: u32) -> Self {
        Self {
            w,
            h,
            px: vec![Pixel::default(); (w as usize) * (h as usize)],
        }
    }
    pub(crate) fn for_cells(cols: u16, rows: u16) -> Self {
        Self::new(cols as u32 * 2, rows as u32 * 4)
    }
    pub(crate) fn idx(&self, x: u32, y: u32) -> usize {
        (y as usize) * (self.w as usize) + (x as usize)
    }
    pub(crate) fn is_empty(&self) -> bool {
        self.w == 0 || self.h == 0
    }

    /// Multiplies every pixel's alpha by `1 - amount`. Repeated each frame this
    /// leaves short glowing trails instead of a hard clear.
    pub(crate) fn fade(&mut self, amount: f32) {
        let keep = (1.0 - amount).clamp(0.0, 1.0);
        for p in &mut self.px {
            if p.a == 0 {
                continue;
            }
            let a = (p.a as f32 * keep) as u8;
            p.a = if a < 4 { 0 } else { a };
        }
    }

    pub(crate) fn blend_over(&mut self, x: i32, y: i32, src: Pixel) {
        if x < 0 || y < 0 {
            return;
        }
        let (x, y) = (x as u32, y as u32);
        if x >= self.w || y >= self.h {
            return;
        }
        let i = self.idx(x, y);
        let dst = self.px[i];

        let sa = src.a as f32 / 255.0;
        let da = dst.a as f32 / 255.0;

        let out_a = sa + da * (1.0 - sa);
        if out_a <= 1e-6 {
            self.px[i] = Pixel::default();
            return;
        }

        let blend = |sc: u8, dc: u8| -> u8 {
            let sc = sc as f32 / 255.0;
            let dc = dc as f32 / 255.0;
            let out = (sc * sa + dc * da * (1.0 - sa)) / out_a;
            (out.clamp(0.0, 1.0) * 255.0 + 0.5) as u8
        };

        self.px[i] = Pixel {
            r: blend(src.r, dst.r),
            g: blend(src.g, dst.g),
            b: blend(src.b, dst.b),
            a: (out_a.clamp(0.0, 1.0) * 255.0 + 0.5) as u8,
        };
    }

    /// Disc with a radial falloff out to `glow` times the radius.
    pub(crate) fn fill_disc(&mut self, cx: f32, cy: f32, radius: f32, glow: f32, color: Rgb, alpha: f32) {
        let outer = (radius * glow.max(1.0)).max(0.5);
        let x0 = (cx - outer).floor() as i32;
        let x1 = (cx + outer).ceil() as i32;
        let y0 = (cy - outer).floor() as i32;
        let y1 = (cy + outer).ceil() as i32;
        for y in y0..=y1 {
            for x in x0..=x1 {
                let dx = x as f32 + 0.5 - cx;
                let dy = y as f32 + 0.5 - cy;
                let d = (dx * dx + dy * dy).sqrt();
                if d > outer {
                    continue;
                }
                let a = if d <= radius {
                    alpha
                } else {
                    let t = 1.0 - (d - radius) / (outer - radius).max(1e-3);
                    alpha * (0.3 + 0.7 * t) * 0.5
                };
                self.blend_over(x, y, Pixel::from_rgb(color, a));
            }
        }
    }

    /// DDA line, one sample per sub-pixel along the major axis.
    pub(crate) fn draw_line(&mut self, x0: f32, y0: f32, x1: f32, y1: f32, color: Rgb, alpha: f32) {
        let dx = x1 - x0;
        let dy = y1 - y0;
        let steps = dx.abs().max(dy.abs()).ceil().max(1.0) as i32;
        let p = Pixel::from_rgb(color, alpha);
        for i in 0..=steps {
            let t = i as f32 / steps as f32;
            let x = (x0 + dx * t).floor() as i32;
            let y = (y0 + dy * t).floor() as i32;
            self.blend_over(x, y, p);
        }
    }
}

/* -----------------------------
   Braille encoding: 2×4 pixels -> U+2800..U+28FF
------------------------------ */

const INK_ALPHA: u32 = 28;

fn braille_bit(dx: u32, dy: u32) -> u8 {
    match (dx, dy) {
        (0, 0) => 0x01,
        (0, 1) => 0x02,
        (0, 2) => 0x04,
        (0, 3) => 0x40,
        (1, 0) => 0x08,
        (1, 1) => 0x10,
        (1, 2) => 0x20,
        (1, 3) => 0x80,
        _ => 0x00,
    }
}

/// Converts the canvas into braille glyphs. Cells with no ink keep the
/// background supplied by `bg_at`.
pub(crate) fn canvas_to_cells(
    canvas: &PixelCanvas,
    out: &mut CellBuffer,
    enable_color: bool,
    bg_at: impl Fn(u16, u16) -> Color,
) {
    let cols = out.w as u32;
    let rows = out.h as u32;

    for cy in 0..rows {
        for cx in 0..cols {
            let px0 = cx * 2;
            let py0 = cy * 4;

            let mut mask: u8 = 0;
            let mut sum_r: u32 = 0;
            let mut sum_g: u32 = 0;
            let mut sum_b: u32 = 0;
            let mut sum_a: u32 = 0;
            let mut ink_count: u32 = 0;

            for dy in 0..4 {
                for dx in 0..2 {
                    let x = px0 + dx;
                    let y = py0 + dy;
                    if x >= canvas.w || y >= canvas.h {
                        continue;
                    }
                    let p = canvas.px[canvas.idx(x, y)];
                    if p.a as u32 >= INK_ALPHA {
                        mask |= braille_bit(dx, dy);
                        sum_r += p.r as u32;
                        sum_g += p.g as u32;
                        sum_b += p.b as u32;
                        sum_a += p.a as u32;
                        ink_count += 1;
                    }
                }
            }

            let bg = bg_at(cx as u16, cy as u16);
            if ink_count == 0 {
                out.set(cx as u16, cy as u16, Cell { ch: ' ', fg: Color::White, bg, bold: false });
                continue;
            }

            let ch = char::from_u32(0x2800 + (mask as u32)).unwrap_or(' ');
            let avg_a = sum_a as f32 / (ink_count as f32 * 255.0);
            let rgb = Rgb::new(
                (sum_r / ink_count) as u8,
                (sum_g / ink_count) as u8,
                (sum_b / ink_count) as u8,
            )
            .scale(0.35 + 0.65 * avg_a);

            out.set(
                cx as u16,
                cy as u16,
                Cell {
                    ch,
                    fg: rgb.to_color(enable_color),
                    bg,
                    bold: false,
                },
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn wrap_splits_on_words() {
        assert_eq!(wrap("the quick brown fox", 9), vec!["the quick", "brown fox"]);
        assert_eq!(wrap("abcdefghij", 4), vec!["abcd", "efgh", "ij"]);
        assert_eq!(wrap("", 4), vec![""]);
    }

    #[test]
    fn fade_decays_to_transparent() {
        let mut c = PixelCanvas::new(1, 1);
        c.blend_over(0, 0, Pixel::from_rgb(Rgb::new(0, 255, 0), 1.0));
        for _ in 0..40 {
            c.fade(0.25);
        }
        assert_eq!(c.px[0].a, 0);
    }

    #[test]
    fn blending_accumulates_alpha() {
        let mut c = PixelCanvas::new(1, 1);
        let p = Pixel::from_rgb(Rgb::new(255, 0, 0), 0.3);
        c.blend_over(0, 0, p);
        let once = c.px[0].a;
        c.blend_over(0, 0, p);
        assert!(c.px[0].a > once);
    }

    #[test]
    fn out_of_bounds_writes_are_ignored() {
        let mut c = PixelCanvas::new(2, 2);
        c.blend_over(-1, 0, Pixel::from_rgb(Rgb::new(1, 1, 1), 1.0));
        c.blend_over(5, 5, Pixel::from_rgb(Rgb::new(1, 1, 1), 1.0));
        c.draw_line(-10.0, -10.0, 10.0, 10.0, Rgb::new(9, 9, 9), 1.0);
        assert!(c.px.iter().all(|p| p.a == 0 || p.r == 9));
    }

    #[test]
    fn ink_becomes_braille() {
        let mut canvas = PixelCanvas::for_cells(1, 1);
        canvas.blend_over(0, 0, Pixel::from_rgb(Rgb::new(0, 255, 0), 1.0));
        canvas.blend_over(1, 3, Pixel::from_rgb(Rgb::new(0, 255, 0), 1.0));
        let mut cells = CellBuffer::new(1, 1);
        canvas_to_cells(&canvas, &mut cells, true, |_, _| Color::Black);
        assert_eq!(cells.cells[0].ch, char::from_u32(0x2800 + 0x81).unwrap());
        assert_eq!(cells.cells[0].fg, Color::Rgb { r: 0, g: 255, b: 0 });
    }
}
