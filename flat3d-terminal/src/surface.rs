/// Colour terminal draw surface
///
/// Each character cell shows two vertically stacked pixels: the upper half
/// block `▀` takes the top pixel as its foreground and the bottom pixel as its
/// background, so a `cols × rows` terminal is a `cols × rows*2` framebuffer.
use crossterm::{
    cursor, queue,
    style::{self, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal,
};
use flat3d_core::{BufferSurface, Color, RenderError, Surface};
use nalgebra::Point2;
use std::io::{self, Stdout, Write};
use std::time::Instant;

const HALF_BLOCK: char = '▀';

pub struct TerminalSurface<W: Write = Stdout> {
    buffer: BufferSurface,
    out: W,
    /// Cell grid forced by the caller instead of queried from the terminal.
    fixed: Option<(u16, u16)>,
    title: Option<String>,
    frames: u32,
    last_sample: Instant,
    fps: f64,
}

impl TerminalSurface<Stdout> {
    /// Surface sized to the current terminal window.
    pub fn stdout() -> io::Result<Self> {
        let (cols, rows) = terminal::size()?;
        let mut surface = Self::new(io::stdout(), cols, rows);
        surface.fixed = None;
        Ok(surface)
    }
}

impl<W: Write> TerminalSurface<W> {
    /// Surface with a fixed `cols × rows` cell grid writing to `out`.
    pub fn new(out: W, cols: u16, rows: u16) -> Self {
        Self {
            buffer: BufferSurface::new(cols as usize, rows as usize * 2),
            out,
            fixed: Some((cols, rows)),
            title: None,
            frames: 0,
            last_sample: Instant::now(),
            fps: 0.0,
        }
    }

    /// Status line printed over the first row, followed by the frame rate.
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = Some(title.into());
    }

    pub fn buffer(&self) -> &BufferSurface {
        &self.buffer
    }

    pub fn fps(&self) -> f64 {
        self.fps
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn sample_fps(&mut self) {
        self.frames += 1;
        let elapsed = self.last_sample.elapsed().as_secs_f64();
        if elapsed >= 1.0 {
            self.fps = self.frames as f64 / elapsed;
            self.frames = 0;
            self.last_sample = Instant::now();
        }
    }

    fn write_frame(&mut self) -> io::Result<()> {
        let width = self.buffer.width();
        let height = self.buffer.height();
        queue!(self.out, cursor::MoveTo(0, 0))?;

        let mut current: Option<([u8; 3], [u8; 3])> = None;
        for y in (0..height).step_by(2) {
            queue!(self.out, cursor::MoveTo(0, (y / 2) as u16))?;
            let top = self.buffer.row(y);
            let bottom = (y + 1 < height).then(|| self.buffer.row(y + 1));
            for x in 0..width {
                let upper = top[x];
                let lower = bottom.map_or([0, 0, 0], |row| row[x]);
                // Only switch colours when the cell differs from the last one
                if current != Some((upper, lower)) {
                    queue!(
                        self.out,
                        SetForegroundColor(rgb(upper)),
                        SetBackgroundColor(rgb(lower))
                    )?;
                    current = Some((upper, lower));
                }
                queue!(self.out, Print(HALF_BLOCK))?;
            }
        }
        queue!(self.out, ResetColor)?;

        if let Some(title) = &self.title {
            queue!(
                self.out,
                cursor::MoveTo(0, 0),
                SetForegroundColor(style::Color::Yellow),
                Print(format!("{title} | FPS: {:.1}", self.fps)),
                ResetColor
            )?;
        }

        self.out.flush()
    }
}

fn rgb([r, g, b]: [u8; 3]) -> style::Color {
    style::Color::Rgb { r, g, b }
}

impl<W: Write> Surface for TerminalSurface<W> {
    fn resize(&mut self) -> Result<(u32, u32), RenderError> {
        let (cols, rows) = match self.fixed {
            Some(grid) => grid,
            None => terminal::size()?,
        };
        let (width, height) = (cols as usize, rows as usize * 2);
        if (width, height) != (self.buffer.width(), self.buffer.height()) {
            tracing::debug!(cols, rows, "terminal resized");
            self.buffer.set_size(width, height);
        }
        Ok((width as u32, height as u32))
    }

    fn clear(&mut self, color: Color) {
        self.buffer.clear(color);
    }

    fn fill_triangle(&mut self, points: &[Point2<f64>; 3], color: Color, alpha: f64) {
        self.buffer.fill_triangle(points, color, alpha);
    }

    fn present(&mut self) -> Result<(), RenderError> {
        self.sample_fps();
        self.write_frame()?;
        Ok(())
    }
}
