/// Character-cell canvas for terminal rendering
use crossterm::{
    style::{Color as TermColor, Print, ResetColor, SetForegroundColor},
    QueueableCommand,
};
use nalgebra::Point2;
use quatview_core::{Canvas, Color};
use std::io::Write;

/// Glyph drawn for a filled cell
const FILL: char = '█';

/// A raster where one pixel is one terminal cell.
///
/// Cells are filled when their center falls inside a shape, and later fills
/// overwrite earlier ones, which is all the painter's ordering needs.
pub struct TerminalCanvas {
    width: usize,
    height: usize,
    cells: Vec<Option<Color>>,
}

impl TerminalCanvas {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![None; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        if width != self.width || height != self.height {
            self.width = width;
            self.height = height;
            self.cells = vec![None; width * height];
        }
    }

    pub fn cell(&self, x: usize, y: usize) -> Option<Color> {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            None
        }
    }

    /// Cells whose centers lie in `[start, end)`, clamped to `0..limit`.
    fn span(start: f64, end: f64, limit: usize) -> std::ops::Range<usize> {
        let first = (start - 0.5).ceil().max(0.0) as usize;
        let last = ((end - 0.5).ceil().max(0.0) as usize).min(limit);
        first.min(last)..last
    }

    fn fill_span(&mut self, row: usize, columns: std::ops::Range<usize>, color: Color) {
        let offset = row * self.width;
        for cell in &mut self.cells[offset + columns.start..offset + columns.end] {
            *cell = Some(color);
        }
    }

    pub fn draw<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        let mut current = None;
        for y in 0..self.height {
            for x in 0..self.width {
                match self.cells[y * self.width + x] {
                    Some(color) => {
                        if current != Some(color) {
                            writer.queue(SetForegroundColor(to_term_color(color)))?;
                            current = Some(color);
                        }
                        writer.queue(Print(FILL))?;
                    }
                    None => {
                        writer.queue(Print(' '))?;
                    }
                }
            }
            if y + 1 < self.height {
                writer.queue(Print("\r\n"))?;
            }
        }
        writer.queue(ResetColor)?;
        Ok(())
    }
}

impl Canvas for TerminalCanvas {
    fn clear(&mut self, width: f64, height: f64) {
        self.resize(width.max(0.0) as usize, height.max(0.0) as usize);
        self.cells.fill(None);
    }

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64, color: Color) {
        let columns = Self::span(x, x + width, self.width);
        for row in Self::span(y, y + height, self.height) {
            self.fill_span(row, columns.clone(), color);
        }
    }

    /// Even-odd scanline fill sampled at cell centers.
    fn fill_path(&mut self, vertices: &[Point2<f64>], color: Color) {
        if vertices.len() < 3 {
            return;
        }
        let (min_y, max_y) = vertices
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(v.y), hi.max(v.y))
            });

        let mut crossings = Vec::new();
        for row in Self::span(min_y, max_y, self.height) {
            let py = row as f64 + 0.5;
            crossings.clear();
            for (i, a) in vertices.iter().enumerate() {
                let b = &vertices[(i + 1) % vertices.len()];
                if (a.y <= py) != (b.y <= py) {
                    crossings.push(a.x + (py - a.y) * (b.x - a.x) / (b.y - a.y));
                }
            }
            crossings.sort_by(|a, b| a.total_cmp(b));
            for pair in crossings.chunks_exact(2) {
                let columns = Self::span(pair[0], pair[1], self.width);
                self.fill_span(row, columns, color);
            }
        }
    }
}

fn to_term_color(color: Color) -> TermColor {
    TermColor::Rgb {
        r: color.r,
        g: color.g,
        b: color.b,
    }
}
