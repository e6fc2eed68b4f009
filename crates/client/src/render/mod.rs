// Frame rendering: items, snake bodies and heads onto a drawing surface
use glam::{UVec2, Vec2};

use crate::game::WorldState;

mod canvas;

pub use canvas::{CanvasSurface, Palette};

/// Pixel size of one grid cell.
pub const CELL_SIZE: f32 = 18.0;
/// Stroke width of snake bodies, in pixels.
pub const BODY_LINE_WIDTH: f32 = 2.0;

/// What is being drawn. Surfaces pick the actual look.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Brush {
    Item,
    /// The local player's snake.
    Own,
    Other,
}

/// A 2D drawing target in pixel coordinates, origin top-left.
pub trait Surface {
    /// Pixel dimensions.
    fn size(&self) -> UVec2;
    fn clear(&mut self);
    /// Fill an axis-aligned square of side `size` starting at `origin`.
    fn fill_cell(&mut self, origin: Vec2, size: f32, brush: Brush);
    /// Stroke a connected polyline through `points`.
    fn stroke_path(&mut self, points: &[Vec2], width: f32, brush: Brush);
    fn fill_circle(&mut self, center: Vec2, radius: f32, brush: Brush);
}

/// Grid dimensions that fit in `surface` pixels.
pub fn grid_size(surface: UVec2, cell_size: f32) -> UVec2 {
    let cell = cell_size.max(1.0);
    UVec2::new(
        (surface.x as f32 / cell).floor() as u32,
        (surface.y as f32 / cell).floor() as u32,
    )
}

/// Counts of what one frame drew.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameStats {
    pub items: usize,
    pub creatures: usize,
}

/// Draws a [`WorldState`]. Holds no state besides the cell scale, so the same
/// world always yields the same draw calls.
#[derive(Debug, Clone, Copy)]
pub struct Renderer {
    cell_size: f32,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new(CELL_SIZE)
    }
}

impl Renderer {
    pub fn new(cell_size: f32) -> Self {
        Self { cell_size }
    }

    #[inline(always)]
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Top-left pixel of a grid cell.
    #[inline]
    pub fn cell_origin(&self, cell: glam::IVec2) -> Vec2 {
        cell.as_vec2() * self.cell_size
    }

    /// Center pixel of a grid cell.
    #[inline]
    pub fn cell_center(&self, cell: glam::IVec2) -> Vec2 {
        self.cell_origin(cell) + Vec2::splat(self.cell_size / 2.0)
    }

    /// Draw one full frame.
    pub fn render<S: Surface + ?Sized>(&self, world: &WorldState, surface: &mut S) -> FrameStats {
        let mut stats = FrameStats::default();
        surface.clear();

        for item in world.items() {
            surface.fill_cell(self.cell_origin(item.position), self.cell_size, Brush::Item);
            stats.items += 1;
        }

        let mut path = Vec::new();
        for creature in world.present_creatures() {
            let brush = if creature.is_local { Brush::Own } else { Brush::Other };

            path.clear();
            path.extend(creature.segments.iter().map(|&s| self.cell_center(s)));
            surface.stroke_path(&path, BODY_LINE_WIDTH, brush);

            // present_creatures() guarantees a head
            if let Some(head) = creature.head() {
                surface.fill_circle(self.cell_center(head), self.cell_size / 2.0, brush);
            }
            stats.creatures += 1;
        }

        stats
    }
}
