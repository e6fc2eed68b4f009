// Canvas 2D surface for the browser front end
use glam::{UVec2, Vec2};
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};
use std::f64::consts::TAU;

use super::{Brush, Surface};

/// CSS colors per brush.
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub item: &'static str,
    pub own: &'static str,
    pub other: &'static str,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            item: "#f9d423",
            own: "#56d364",
            other: "#fff",
        }
    }
}

impl Palette {
    #[inline]
    pub fn color(&self, brush: Brush) -> &'static str {
        match brush {
            Brush::Item => self.item,
            Brush::Own => self.own,
            Brush::Other => self.other,
        }
    }
}

pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    palette: Palette,
}

impl CanvasSurface {
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self, JsValue> {
        let ctx = canvas
            .get_context("2d")?
            .ok_or("Failed to get 2d context")?
            .dyn_into::<CanvasRenderingContext2d>()?;

        Ok(Self {
            canvas,
            ctx,
            palette: Palette::default(),
        })
    }
}

impl Surface for CanvasSurface {
    #[inline(always)]
    fn size(&self) -> UVec2 {
        UVec2::new(self.canvas.width(), self.canvas.height())
    }

    fn clear(&mut self) {
        let size = self.size();
        self.ctx.clear_rect(0.0, 0.0, size.x as f64, size.y as f64);
    }

    fn fill_cell(&mut self, origin: Vec2, size: f32, brush: Brush) {
        self.ctx.set_fill_style_str(self.palette.color(brush));
        self.ctx.fill_rect(origin.x as f64, origin.y as f64, size as f64, size as f64);
    }

    fn stroke_path(&mut self, points: &[Vec2], width: f32, brush: Brush) {
        let Some((first, rest)) = points.split_first() else {
            return;
        };
        self.ctx.set_stroke_style_str(self.palette.color(brush));
        self.ctx.set_line_width(width as f64);
        self.ctx.begin_path();
        self.ctx.move_to(first.x as f64, first.y as f64);
        for p in rest {
            self.ctx.line_to(p.x as f64, p.y as f64);
        }
        self.ctx.stroke();
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, brush: Brush) {
        self.ctx.set_fill_style_str(self.palette.color(brush));
        self.ctx.begin_path();
        // arc() only fails on a negative radius
        let _ = self.ctx.arc(center.x as f64, center.y as f64, radius.max(0.0) as f64, 0.0, TAU);
        self.ctx.fill();
    }
}
