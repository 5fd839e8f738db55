use crate::model::{DISPLAY_H, DISPLAY_W};
use anyhow::Result;
use crossterm::{
    cursor, execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{
        self, BeginSynchronizedUpdate, Clear, ClearType, DisableLineWrap, EnableLineWrap,
        EndSynchronizedUpdate, EnterAlternateScreen, LeaveAlternateScreen,
    },
};
use std::io::{self, Write};

/// The monochrome display collaborator. Coordinates are logical pixels on a
/// fixed 128×64 surface; `color`/`fill` bits follow the panel convention
/// (true = lit).
pub(crate) trait Display {
    fn clear_frame(&mut self);
    fn draw_text(&mut self, x: i32, y: i32, s: &str, color: bool);
    fn draw_rect(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, outline: bool, fill: bool);
    fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: bool);
    fn draw_ellipse(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, fill: bool);
    fn present(&mut self) -> Result<()>;
}

// Braille packs 2×4 pixels per terminal cell.
const CELL_COLS: usize = (DISPLAY_W / 2) as usize;
const CELL_ROWS: usize = (DISPLAY_H / 4) as usize;
// Text glyphs occupy an 8px line, i.e. two braille rows.
const TEXT_LINE_PX: i32 = 8;

fn braille_bit(dx: usize, dy: usize) -> u8 {
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

struct CellBuffer {
    w: u16,
    h: u16,
    cells: Vec<char>,
}

impl CellBuffer {
    fn new(w: u16, h: u16) -> Self {
        Self {
            w,
            h,
            cells: vec![' '; (w as usize) * (h as usize)],
        }
    }

    fn idx(&self, x: u16, y: u16) -> usize {
        (y as usize) * (self.w as usize) + (x as usize)
    }

    fn set(&mut self, x: u16, y: u16, ch: char) {
        if x < self.w && y < self.h {
            let i = self.idx(x, y);
            self.cells[i] = ch;
        }
    }

    fn clear(&mut self) {
        self.cells.fill(' ');
    }
}

/// Raw-mode alternate-screen terminal with a diffed cell presenter.
struct Terminal {
    out: io::Stdout,
    cols: u16,
    rows: u16,
    prev: CellBuffer,
    cur: CellBuffer,
}

impl Terminal {
    fn begin() -> Result<Self> {
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

    fn end(&mut self) -> Result<()> {
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

    fn present(&mut self) -> Result<()> {
        queue!(
            self.out,
            BeginSynchronizedUpdate,
            SetForegroundColor(Color::White)
        )?;
        for y in 0..self.rows {
            for x in 0..self.cols {
                let i = self.cur.idx(x, y);
                let ch = self.cur.cells[i];
                if ch == self.prev.cells[i] {
                    continue;
                }
                queue!(self.out, cursor::MoveTo(x, y), Print(ch))?;
            }
        }
        queue!(self.out, ResetColor, EndSynchronizedUpdate)?;
        self.out.flush()?;
        self.prev.cells.copy_from_slice(&self.cur.cells);
        Ok(())
    }
}

/// Terminal rendition of the 128×64 panel: pixel primitives rasterise into a
/// mono framebuffer shown as braille; text rides on a character overlay so
/// the bunny art stays crisp. A status line below mirrors what the hardware
/// build printed to the console.
pub(crate) struct TermDisplay {
    px: Vec<bool>,
    text: Vec<char>,
    status: String,
    term: Terminal,
}

impl TermDisplay {
    pub(crate) fn new() -> Result<Self> {
        Ok(Self {
            px: vec![false; (DISPLAY_W * DISPLAY_H) as usize],
            text: vec![' '; CELL_COLS * CELL_ROWS],
            status: String::new(),
            term: Terminal::begin()?,
        })
    }

    pub(crate) fn set_status(&mut self, line: &str) {
        self.status.clear();
        self.status.push_str(line);
    }

    /// Blank the panel and restore the terminal. Safe to call once at
    /// shutdown; the terminal is gone afterwards.
    pub(crate) fn shutdown(&mut self) -> Result<()> {
        self.clear_frame();
        self.status.clear();
        self.present()?;
        self.term.end()
    }

    fn set_px(&mut self, x: i32, y: i32, on: bool) {
        if (0..DISPLAY_W).contains(&x) && (0..DISPLAY_H).contains(&y) {
            self.px[(y * DISPLAY_W + x) as usize] = on;
        }
    }

    fn px_at(&self, x: usize, y: usize) -> bool {
        self.px[y * DISPLAY_W as usize + x]
    }

    fn set_text_cell(&mut self, col: i32, row: i32, ch: char) {
        if (0..CELL_COLS as i32).contains(&col) && (0..CELL_ROWS as i32).contains(&row) {
            self.text[row as usize * CELL_COLS + col as usize] = ch;
        }
    }
}

impl Display for TermDisplay {
    fn clear_frame(&mut self) {
        self.px.fill(false);
        self.text.fill(' ');
    }

    fn draw_text(&mut self, x: i32, y: i32, s: &str, color: bool) {
        if !color {
            return;
        }
        for (line_no, line) in s.lines().enumerate() {
            let row = (y + line_no as i32 * TEXT_LINE_PX) / 4;
            let mut col = x / 2;
            for ch in line.chars() {
                self.set_text_cell(col, row, ch);
                col += 1;
            }
        }
    }

    fn draw_rect(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, outline: bool, fill: bool) {
        for y in y0.min(y1)..=y0.max(y1) {
            for x in x0.min(x1)..=x0.max(x1) {
                let edge = x == x0 || x == x1 || y == y0 || y == y1;
                if fill || (outline && edge) {
                    self.set_px(x, y, true);
                }
            }
        }
    }

    fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: bool) {
        // Bresenham
        let (mut x, mut y) = (x0, y0);
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;
        loop {
            self.set_px(x, y, color);
            if x == x1 && y == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    fn draw_ellipse(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, fill: bool) {
        let cx = (x0 + x1) as f32 / 2.0;
        let cy = (y0 + y1) as f32 / 2.0;
        let rx = ((x1 - x0).abs() as f32 / 2.0).max(0.5);
        let ry = ((y1 - y0).abs() as f32 / 2.0).max(0.5);
        for y in y0.min(y1)..=y0.max(y1) {
            for x in x0.min(x1)..=x0.max(x1) {
                let nx = (x as f32 - cx) / rx;
                let ny = (y as f32 - cy) / ry;
                let d = nx * nx + ny * ny;
                let inside = d <= 1.0;
                let on_rim = inside && d >= 0.6;
                if (fill && inside) || (!fill && on_rim) {
                    self.set_px(x, y, true);
                }
            }
        }
    }

    fn present(&mut self) -> Result<()> {
        self.term.cur.clear();

        for cy in 0..CELL_ROWS {
            for cx in 0..CELL_COLS {
                let overlay = self.text[cy * CELL_COLS + cx];
                let ch = if overlay != ' ' {
                    overlay
                } else {
                    let mut mask: u8 = 0;
                    for dy in 0..4 {
                        for dx in 0..2 {
                            if self.px_at(cx * 2 + dx, cy * 4 + dy) {
                                mask |= braille_bit(dx, dy);
                            }
                        }
                    }
                    if mask == 0 {
                        ' '
                    } else {
                        char::from_u32(0x2800 + mask as u32).unwrap_or(' ')
                    }
                };
                self.term.cur.set(cx as u16, cy as u16, ch);
            }
        }

        let status_row = CELL_ROWS as u16 + 1;
        for (i, ch) in self.status.chars().enumerate() {
            self.term.cur.set(i as u16, status_row, ch);
        }

        self.term.present()
    }
}
