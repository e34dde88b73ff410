//! Canvas 2D rendering for the particle field
//!
//! Draws connection lines and particle discs onto an HTML canvas. The
//! canvas is cleared (not painted over) every frame so the page styling
//! behind it shows through.

use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use crate::simulation::ParticleField;

/// Renders a [`ParticleField`] onto a canvas element.
pub struct CanvasRenderer {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl CanvasRenderer {
    /// Create renderer from canvas element
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self, String> {
        let ctx = canvas
            .get_context("2d")
            .map_err(|e| format!("Failed to get 2d context: {:?}", e))?
            .ok_or("2d context not available")?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| "Failed to cast to CanvasRenderingContext2d")?;

        Ok(Self { canvas, ctx })
    }

    /// Update canvas pixel dimensions
    pub fn resize(&self, width: u32, height: u32) {
        self.canvas.set_width(width);
        self.canvas.set_height(height);
    }

    /// Render the current field state
    pub fn render(&self, field: &ParticleField) {
        let width = self.canvas.width() as f64;
        let height = self.canvas.height() as f64;
        self.ctx.clear_rect(0.0, 0.0, width, height);

        self.render_connections(field);
        self.render_particles(field);
    }

    /// Lines between nearby particles, fading out with distance
    fn render_connections(&self, field: &ParticleField) {
        self.ctx.set_line_width(1.0);

        let line = field.config.line_color;
        for (i, j, strength) in field.connections() {
            let a = &field.particles[i];
            let b = &field.particles[j];

            self.ctx
                .set_stroke_style_str(&rgba(line, strength * line[3]));
            self.ctx.begin_path();
            self.ctx.move_to(a.x as f64, a.y as f64);
            self.ctx.line_to(b.x as f64, b.y as f64);
            self.ctx.stroke();
        }
    }

    /// Every particle as a filled circle
    fn render_particles(&self, field: &ParticleField) {
        let color = field.config.particle_color;
        self.ctx.set_fill_style_str(&rgba(color, color[3]));

        for p in &field.particles {
            self.ctx.begin_path();
            self.ctx
                .arc(
                    p.x as f64,
                    p.y as f64,
                    p.radius as f64,
                    0.0,
                    std::f64::consts::TAU,
                )
                .ok();
            self.ctx.fill();
        }
    }
}

/// Format a normalized RGB color with an explicit alpha as CSS rgba().
/// Channels round to the nearest integer so e.g. 0.541 maps to 138.
fn rgba(color: [f32; 4], alpha: f32) -> String {
    format!(
        "rgba({}, {}, {}, {})",
        (color[0] * 255.0).round() as u8,
        (color[1] * 255.0).round() as u8,
        (color[2] * 255.0).round() as u8,
        alpha
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rgba_formats_css_color() {
        let css = rgba([0.353, 0.541, 0.416, 0.35], 0.35);
        assert_eq!(css, "rgba(90, 138, 106, 0.35)");
    }

    #[test]
    fn rgba_rounds_channels_to_nearest() {
        // 0.541 * 255 = 137.955: truncation would give 137
        let css = rgba([0.0, 0.541, 1.0, 1.0], 1.0);
        assert_eq!(css, "rgba(0, 138, 255, 1)");
    }

    #[test]
    fn rgba_alpha_is_independent_of_color_alpha() {
        let css = rgba([1.0, 1.0, 1.0, 0.12], 0.06);
        assert_eq!(css, "rgba(255, 255, 255, 0.06)");
    }
}
