use crate::canvas::CellBuffer;
use anyhow::Context;
use crossterm::{
    cursor,
    event::{DisableMouseCapture, EnableMouseCapture},
    execute, queue,
    style::{Attribute, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor},
    terminal::{
        self, BeginSynchronizedUpdate, Clear, ClearType, DisableLineWrap, EnableLineWrap,
        EndSynchronizedUpdate, EnterAlternateScreen, LeaveAlternateScreen,
    },
};
use std::io::{self, Stdout, Write};

/// Owns the alternate screen. Restores the terminal on drop, so an early
/// return or a panic still leaves the shell usable.
pub(crate) struct Terminal {
    out: Stdout,
    pub(crate) cols: u16,
    pub(crate) rows: u16,
    prev: CellBuffer,
    pub(crate) cur: CellBuffer,
    force_full: bool,
}

impl Terminal {
    pub(crate) fn begin() -> anyhow::Result<Self> {
        let mut out = io::stdout();
        terminal::enable_raw_mode().context("enabling raw mode")?;
        execute!(
            out,
            EnterAlternateScreen,
            EnableMouseCapture,
            cursor::Hide,
            DisableLineWrap,
            Clear(ClearType::All)
        )
        .context("entering alternate screen")?;

        let (cols, rows) = terminal::size().context("querying terminal size")?;
        Ok(Self {
            out,
            cols,
            rows,
            prev: CellBuffer::new(cols, rows),
            cur: CellBuffer::new(cols, rows),
            force_full: true,
        })
    }

    /// Reallocates the buffers; the next present repaints everything.
    pub(crate) fn resize(&mut self, cols: u16, rows: u16) -> bool {
        if cols == self.cols && rows == self.rows {
            return false;
        }
        self.cols = cols;
        self.rows = rows;
        self.prev = CellBuffer::new(cols, rows);
        self.cur = CellBuffer::new(cols, rows);
        self.force_full = true;
        true
    }

    pub(crate) fn present(&mut self) -> anyhow::Result<()> {
        queue!(self.out, BeginSynchronizedUpdate)?;
        if self.force_full {
            queue!(self.out, Clear(ClearType::All))?;
        }

        let mut last_fg = None;
        let mut last_bg = None;
        let mut last_bold = false;
        let mut next_pos = None;

        for y in 0..self.rows {
            for x in 0..self.cols {
                let i = self.cur.idx(x, y);
                let c = self.cur.cells[i];
                if !self.force_full && c == self.prev.cells[i] {
                    continue;
                }

                if next_pos != Some((x, y)) {
                    queue!(self.out, cursor::MoveTo(x, y))?;
                }
                if last_fg != Some(c.fg) {
                    queue!(self.out, SetForegroundColor(c.fg))?;
                    last_fg = Some(c.fg);
                }
                if last_bg != Some(c.bg) {
                    queue!(self.out, SetBackgroundColor(c.bg))?;
                    last_bg = Some(c.bg);
                }
                if c.bold != last_bold {
                    let attr = if c.bold { Attribute::Bold } else { Attribute::NormalIntensity };
                    queue!(self.out, SetAttribute(attr))?;
                    last_bold = c.bold;
                }

                queue!(self.out, Print(c.ch))?;
                next_pos = Some((x + 1, y));
            }
        }

        queue!(self.out, SetAttribute(Attribute::Reset), ResetColor, EndSynchronizedUpdate)?;
        self.out.flush()?;
        self.prev.cells.copy_from_slice(&self.cur.cells);
        self.force_full = false;
        Ok(())
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        let _ = execute!(
            self.out,
            EndSynchronizedUpdate,
            ResetColor,
            DisableMouseCapture,
            cursor::Show,
            EnableLineWrap,
            LeaveAlternateScreen
        );
        let _ = terminal::disable_raw_mode();
    }
}
