//! Terminal presentation: a pixel canvas becomes rows of upper half blocks,
//! two vertical pixels per character cell.

use std::io::{self, Stdout, Write};

use crossterm::{
    cursor::{Hide, MoveTo, Show},
    event::{DisableFocusChange, EnableFocusChange},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{
        self, disable_raw_mode, enable_raw_mode, Clear, ClearType, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
};

use crate::graphics::{Canvas, Rgba};

const HALF_BLOCK: char = '\u{2580}';

/// Raw mode plus alternate screen, undone on drop
pub struct TerminalSession {
    out: Stdout,
}

impl TerminalSession {
    pub fn new() -> io::Result<Self> {
        enable_raw_mode()?;

        let mut out = io::stdout();
        if let Err(err) = execute!(out, EnterAlternateScreen, EnableFocusChange, Hide) {
            let _ = disable_raw_mode();
            return Err(err);
        }
        Ok(TerminalSession { out })
    }

    pub fn out(&mut self) -> &mut Stdout {
        &mut self.out
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(
            self.out,
            ResetColor,
            Show,
            DisableFocusChange,
            LeaveAlternateScreen
        );
    }
}

/// Terminal size in character cells as (columns, rows)
pub fn size() -> io::Result<(u16, u16)> {
    match termsize::get() {
        Some(size) if size.cols > 0 && size.rows > 0 => Ok((size.cols, size.rows)),
        _ => terminal::size(),
    }
}

/// Where a canvas lands on screen, in cells
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub col: u16,
    pub row: u16,
    /// Visible cells; anything beyond is clipped
    pub cols: u16,
    pub rows: u16,
}

impl Viewport {
    /// Centers a canvas of `width` x `height` pixels in a terminal of
    /// `term_cols` x `term_rows` cells
    pub fn centered(width: usize, height: usize, term_cols: u16, term_rows: u16) -> Self {
        let cols = width.min(term_cols as usize) as u16;
        let rows = height.div_ceil(2).min(term_rows as usize) as u16;
        Viewport {
            col: (term_cols - cols) / 2,
            row: (term_rows - rows) / 2,
            cols,
            rows,
        }
    }
}

fn to_color(pixel: Rgba, background: Option<Rgba>) -> Color {
    let pixel = match background {
        Some(bg) => pixel.over(bg),
        None if pixel.a == 0 => return Color::Reset,
        None => pixel,
    };
    Color::Rgb {
        r: pixel.r,
        g: pixel.g,
        b: pixel.b,
    }
}

/// Queues the canvas as half-block cells; the caller flushes
pub fn present<W: Write>(
    out: &mut W,
    canvas: &Canvas,
    viewport: Viewport,
    background: Option<Rgba>,
) -> io::Result<()> {
    for row in 0..viewport.rows {
        queue!(out, MoveTo(viewport.col, viewport.row + row))?;
        queue_row(out, canvas, row as usize, viewport.cols as usize, background)?;
    }
    Ok(())
}

/// Writes the whole canvas as plain lines, for output that is not a screen
pub fn print_rows<W: Write>(
    out: &mut W,
    canvas: &Canvas,
    background: Option<Rgba>,
) -> io::Result<()> {
    for row in 0..canvas.height().div_ceil(2) {
        queue_row(out, canvas, row, canvas.width(), background)?;
        queue!(out, Print('\n'))?;
    }
    out.flush()
}

fn queue_row<W: Write>(
    out: &mut W,
    canvas: &Canvas,
    row: usize,
    cols: usize,
    background: Option<Rgba>,
) -> io::Result<()> {
    let top_y = row * 2;
    let (mut last_fg, mut last_bg) = (None, None);
    for col in 0..cols {
        let top = canvas.pixel(col, top_y);
        let bottom = if top_y + 1 < canvas.height() {
            canvas.pixel(col, top_y + 1)
        } else {
            Rgba::TRANSPARENT
        };

        let fg = to_color(top, background);
        let bg = to_color(bottom, background);
        if last_fg != Some(fg) {
            queue!(out, SetForegroundColor(fg))?;
            last_fg = Some(fg);
        }
        if last_bg != Some(bg) {
            queue!(out, SetBackgroundColor(bg))?;
            last_bg = Some(bg);
        }
        queue!(out, Print(HALF_BLOCK))?;
    }
    queue!(out, ResetColor)
}

/// Queues overlay text lines at the top-left corner
pub fn overlay<W: Write>(out: &mut W, lines: &[String]) -> io::Result<()> {
    for (i, line) in lines.iter().enumerate() {
        queue!(
            out,
            MoveTo(0, i as u16),
            ResetColor,
            Clear(ClearType::UntilNewLine),
            Print(line)
        )?;
    }
    Ok(())
}

/// Queues `text` centered on the last terminal row
pub fn status<W: Write>(
    out: &mut W,
    text: &str,
    term_cols: u16,
    term_rows: u16,
) -> io::Result<()> {
    let width = text.chars().count().min(term_cols as usize) as u16;
    queue!(
        out,
        MoveTo((term_cols - width) / 2, term_rows.saturating_sub(1)),
        ResetColor,
        Print(text)
    )
}

/// Queues a full screen clear
pub fn clear<W: Write>(out: &mut W) -> io::Result<()> {
    queue!(out, ResetColor, Clear(ClearType::All))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphics::{Bitmap, Surface};
    use crate::math::Rect;
    use pretty_assertions::assert_eq;

    #[test]
    fn viewport_centers_and_clips() {
        assert_eq!(
            Viewport::centered(48, 40, 80, 24),
            Viewport {
                col: 16,
                row: 2,
                cols: 48,
                rows: 20
            }
        );
        assert_eq!(
            Viewport::centered(48, 41, 30, 10),
            Viewport {
                col: 0,
                row: 0,
                cols: 30,
                rows: 10
            }
        );
    }

    #[test]
    fn transparent_pixels_use_terminal_background() {
        assert_eq!(to_color(Rgba::TRANSPARENT, None), Color::Reset);
        assert_eq!(
            to_color(Rgba::TRANSPARENT, Some(Rgba::rgb(1, 2, 3))),
            Color::Rgb { r: 1, g: 2, b: 3 }
        );
    }

    #[test]
    fn present_emits_one_half_block_per_cell() {
        let mut canvas = Canvas::new(3, 3);
        let mut image = Bitmap::new(1, 1);
        image.set(0, 0, Rgba::rgb(255, 0, 0));
        canvas.draw_image(&image, Rect::new(1, 1, 1, 1));

        let mut out = Vec::new();
        present(&mut out, &canvas, Viewport::centered(3, 3, 3, 2), None).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.matches(HALF_BLOCK).count(), 6);
        // the red pixel sits in the lower half of a cell
        assert!(text.contains("48;2;255;0;0"));
    }

    #[test]
    fn status_is_centered_on_last_row() {
        let mut out = Vec::new();
        status(&mut out, "Paused", 20, 10).unwrap();
        let text = String::from_utf8(out).unwrap();
        // MoveTo is 1-based on the wire: column 8, row 10
        assert!(text.starts_with("\x1b[10;8H"));
        assert!(text.ends_with("Paused"));
    }

    #[test]
    fn print_rows_ends_each_row_with_newline() {
        let canvas = Canvas::new(4, 5);
        let mut out = Vec::new();
        print_rows(&mut out, &canvas, Some(Rgba::rgb(0, 0, 0))).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().count(), 3);
        assert_eq!(text.matches(HALF_BLOCK).count(), 12);
    }
}
