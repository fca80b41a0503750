//! Matrix-style rain rendered behind every screen.
//!
//! The surface is a grid of `columns x rows` cells. Each frame blends every
//! cell toward black, then redraws one bright head glyph plus a fading trail
//! per column, so glyphs that are not redrawn leave a dimming afterimage.

use rand::Rng;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

pub const CHARSET: &str = "アイウエオカキクケコサシスセソタチツテト0123456789ABCDEF";

/// Alpha of the black wash applied to the whole surface each frame
const FADE_ALPHA: f32 = 0.05;
const HEAD_COLOR: [f32; 3] = [200.0, 255.0, 200.0];
const HEAD_ALPHA: f32 = 0.9;
const TRAIL_LENGTH: usize = 15;
const TRAIL_MAX_ALPHA: f32 = 0.6;
/// Rows a head descends per frame
const SPEED: f32 = 0.4;
/// Per-frame chance that a column past the bottom edge restarts at the top
const RESTART_CHANCE: f32 = 0.02;
/// Initial heads are spread over `[-STAGGER, 0)` rows
const STAGGER: f32 = 100.0;
/// Opacity of the whole rain layer when composited under the content
const LAYER_OPACITY: f32 = 0.4;
/// Cells dimmer than this (0..255 scale, after layer opacity) are not drawn
const VISIBLE_THRESHOLD: f32 = 6.0;

#[derive(Debug, Clone, Copy, PartialEq)]
struct RainCell {
    glyph: char,
    rgb: [f32; 3],
}

impl Default for RainCell {
    fn default() -> Self {
        Self { glyph: ' ', rgb: [0.0; 3] }
    }
}

impl RainCell {
    fn blend(&mut self, color: [f32; 3], alpha: f32) {
        for (channel, src) in self.rgb.iter_mut().zip(color) {
            *channel = *channel * (1.0 - alpha) + src * alpha;
        }
    }

    fn paint(&mut self, glyph: char, color: [f32; 3], alpha: f32) {
        self.glyph = glyph;
        self.blend(color, alpha);
    }
}

#[derive(Debug, Clone)]
pub struct Rain {
    width: u16,
    height: u16,
    glyph_width: u16,
    glyphs: Vec<char>,
    heads: Vec<f32>,
    cells: Vec<RainCell>,
}

impl Rain {
    pub fn new<R: Rng + ?Sized>(width: u16, height: u16, glyph_width: u16, rng: &mut R) -> Self {
        let mut rain = Self {
            width: 0,
            height: 0,
            glyph_width,
            glyphs: CHARSET.chars().collect(),
            heads: Vec::new(),
            cells: Vec::new(),
        };
        rain.resize(width, height, rng);
        rain
    }

    /// Match the surface to a new viewport. All columns are reseeded and the
    /// cell grid is discarded.
    pub fn resize<R: Rng + ?Sized>(&mut self, width: u16, height: u16, rng: &mut R) {
        self.width = width;
        self.height = height;

        let columns = column_count(width, self.glyph_width);
        self.heads = (0..columns).map(|_| rng.random::<f32>() * -STAGGER).collect();
        self.cells = vec![RainCell::default(); columns * height as usize];
    }

    pub fn column_count(&self) -> usize {
        self.heads.len()
    }

    pub fn rows(&self) -> usize {
        self.height as usize
    }

    /// Advance the animation by one frame.
    pub fn tick<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        for cell in &mut self.cells {
            cell.blend([0.0; 3], FADE_ALPHA);
        }

        let rows = self.rows();
        for column in 0..self.heads.len() {
            let head = self.heads[column];

            let glyph = self.random_glyph(rng);
            if let Some(cell) = self.cell_mut(column, head) {
                cell.paint(glyph, HEAD_COLOR, HEAD_ALPHA);
            }

            for j in 1..TRAIL_LENGTH {
                let row = head - j as f32;
                if row <= 0.0 {
                    continue;
                }
                let glyph = self.random_glyph(rng);
                if let Some(cell) = self.cell_mut(column, row) {
                    cell.paint(glyph, trail_color(j), trail_alpha(j));
                }
            }

            self.heads[column] = if head > rows as f32 && rng.random::<f32>() < RESTART_CHANCE {
                0.0
            } else {
                head + SPEED
            };
        }
    }

    fn random_glyph<R: Rng + ?Sized>(&self, rng: &mut R) -> char {
        self.glyphs[rng.random_range(0..self.glyphs.len())]
    }

    fn cell_index(&self, column: usize, row: f32) -> Option<usize> {
        if row < 0.0 {
            return None;
        }
        let row = row.floor() as usize;
        (row < self.rows()).then(|| row * self.heads.len() + column)
    }

    fn cell_mut(&mut self, column: usize, row: f32) -> Option<&mut RainCell> {
        let idx = self.cell_index(column, row)?;
        self.cells.get_mut(idx)
    }

    fn cell(&self, column: usize, row: usize) -> Option<&RainCell> {
        self.cells.get(self.cell_index(column, row as f32)?)
    }
}

/// Number of glyph columns that fit in `width` terminal cells.
pub fn column_count(width: u16, glyph_width: u16) -> usize {
    if glyph_width == 0 {
        return 0;
    }
    (width / glyph_width) as usize
}

fn trail_color(j: usize) -> [f32; 3] {
    let j = j as f32;
    [0.0, 180.0 - j * 8.0, 80.0 - j * 4.0]
}

fn trail_alpha(j: usize) -> f32 {
    TRAIL_MAX_ALPHA - (j as f32 / TRAIL_LENGTH as f32) * TRAIL_MAX_ALPHA
}

impl Widget for &Rain {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let mut utf8 = [0u8; 4];
        let columns = self.column_count();

        for row in 0..self.rows().min(area.height as usize) {
            for column in 0..columns {
                let Some(cell) = self.cell(column, row) else {
                    continue;
                };
                let [r, g, b] = cell.rgb.map(|c| c * LAYER_OPACITY);
                if r.max(g).max(b) < VISIBLE_THRESHOLD {
                    continue;
                }

                let x_offset = column * self.glyph_width as usize;
                if x_offset + self.glyph_width as usize > area.width as usize {
                    continue;
                }
                let x = area.x + x_offset as u16;
                let y = area.y + row as u16;
                let style = Style::default().fg(Color::Rgb(r as u8, g as u8, b as u8));
                buf.set_string(x, y, cell.glyph.encode_utf8(&mut utf8), style);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    #[test]
    fn test_column_count_is_floor_of_width() {
        for width in 0..200u16 {
            assert_eq!(column_count(width, 2), (width / 2) as usize);
            assert_eq!(column_count(width, 3), (width / 3) as usize);
        }
        assert_eq!(column_count(80, 0), 0);
    }

    #[test]
    fn test_new_seeds_staggered_heads() {
        let rain = Rain::new(80, 24, 2, &mut rng());
        assert_eq!(rain.column_count(), 40);
        assert!(rain.heads.iter().all(|h| (-STAGGER..=0.0).contains(h)));
    }

    #[test]
    fn test_resize_recomputes_columns() {
        let mut rng = rng();
        let mut rain = Rain::new(80, 24, 2, &mut rng);
        rain.resize(121, 40, &mut rng);
        assert_eq!(rain.column_count(), 60);
        assert_eq!(rain.rows(), 40);
        assert_eq!((rain.width, rain.height), (121, 40));
        assert_eq!(rain.cells.len(), 60 * 40);

        rain.resize(1, 40, &mut rng);
        assert_eq!(rain.column_count(), 0);
    }

    #[test]
    fn test_tick_advances_heads() {
        let mut rng = rng();
        let mut rain = Rain::new(20, 24, 2, &mut rng);
        rain.heads.iter_mut().for_each(|h| *h = 3.0);

        rain.tick(&mut rng);

        for head in rain.heads {
            assert!((head - 3.4).abs() < 1e-5);
        }
    }

    #[test]
    fn test_heads_past_bottom_either_restart_or_descend() {
        let mut rng = rng();
        let mut rain = Rain::new(200, 10, 2, &mut rng);
        rain.heads.iter_mut().for_each(|h| *h = 11.0);

        rain.tick(&mut rng);

        let restarted = rain.heads.iter().filter(|h| **h == 0.0).count();
        let descended = rain.heads.iter().filter(|h| (**h - 11.4).abs() < 1e-5).count();
        assert_eq!(restarted + descended, rain.column_count());
    }

    #[test]
    fn test_heads_above_bottom_never_restart() {
        let mut rng = rng();
        let mut rain = Rain::new(200, 50, 2, &mut rng);
        rain.heads.iter_mut().for_each(|h| *h = 10.0);

        for _ in 0..50 {
            rain.tick(&mut rng);
        }

        assert!(rain.heads.iter().all(|h| *h > 10.0));
    }

    #[test]
    fn test_head_paints_bright_cell_then_fades() {
        let mut rng = rng();
        let mut rain = Rain::new(2, 30, 2, &mut rng);
        rain.heads[0] = 5.0;

        rain.tick(&mut rng);
        let painted = *rain.cell(0, 5).unwrap();
        assert!(CHARSET.contains(painted.glyph));
        assert!(painted.rgb[1] > 200.0);

        // Move the head far away so row 5 is only faded
        rain.heads[0] = 29.0;
        rain.tick(&mut rng);
        let faded = *rain.cell(0, 5).unwrap();
        assert!(faded.rgb[1] < painted.rgb[1]);
    }

    #[test]
    fn test_trail_decays_along_length() {
        assert!(trail_alpha(1) > trail_alpha(14));
        assert!(trail_alpha(14) > 0.0);
        assert!(trail_color(1)[1] > trail_color(14)[1]);
    }

    #[test]
    fn test_columns_reset_independently() {
        let mut rng = rng();
        let mut rain = Rain::new(400, 5, 2, &mut rng);
        rain.heads.iter_mut().for_each(|h| *h = 6.0);

        for _ in 0..10 {
            rain.tick(&mut rng);
        }

        let restarted = rain.heads.iter().filter(|h| **h < 6.0).count();
        assert!(restarted > 0);
        assert!(restarted < rain.column_count());
    }

    #[test]
    fn test_zero_sized_surface_is_inert() {
        let mut rng = rng();
        let mut rain = Rain::new(0, 0, 2, &mut rng);
        rain.tick(&mut rng);

        let area = Rect::new(0, 0, 0, 0);
        let mut buf = Buffer::empty(area);
        (&rain).render(area, &mut buf);
        assert_eq!(rain.column_count(), 0);
    }

    #[test]
    fn test_render_draws_inside_area() {
        let mut rng = rng();
        let mut rain = Rain::new(20, 10, 2, &mut rng);
        rain.heads.iter_mut().for_each(|h| *h = 4.0);
        rain.tick(&mut rng);

        let area = Rect::new(0, 0, 20, 10);
        let mut buf = Buffer::empty(area);
        (&rain).render(area, &mut buf);

        let drawn = (0..20u16)
            .step_by(2)
            .filter(|x| buf[(*x, 4)].symbol() != " ")
            .count();
        assert_eq!(drawn, 10);
    }
}
