use anyhow::Result;
use tessel_engine::coords::{Rect, Viewport};
use tessel_engine::core::{App, AppControl, FrameCtx};
use tessel_engine::device::GpuInit;
use tessel_engine::logging::{LoggingConfig, init_logging};
use tessel_engine::paint::Color;
use tessel_engine::render::{RectFigure, RectRenderer};
use tessel_engine::window::{LogicalSize, Runtime, RuntimeConfig};

const CLEAR: Color = Color::opaque(0.2, 0.2, 0.2);
const MARGIN: f32 = 24.0;

/// A grid of colored tiles under a full-width banner, all drawn in one
/// indexed call.
struct Showcase {
    renderer: RectRenderer,
    figures: Vec<RectFigure>,
}

impl Showcase {
    fn new(viewport: Viewport) -> Result<Self> {
        Ok(Self {
            renderer: RectRenderer::new()?,
            figures: layout(viewport),
        })
    }
}

impl App for Showcase {
    fn on_resize(&mut self, viewport: Viewport) {
        self.figures = layout(viewport);
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        let (renderer, figures) = (&mut self.renderer, &self.figures);
        ctx.render(CLEAR, |rctx, target| renderer.render(rctx, target, figures))
    }
}

fn layout(viewport: Viewport) -> Vec<RectFigure> {
    const PALETTE: [(u8, u8, u8); 4] = [
        (0xe0, 0x6c, 0x75),
        (0x98, 0xc3, 0x79),
        (0x61, 0xaf, 0xef),
        (0xe5, 0xc0, 0x7b),
    ];
    const COLS: usize = 4;
    const ROWS: usize = 3;

    let mut figures = vec![RectFigure::new(
        Rect::new(MARGIN, MARGIN, viewport.width - 2.0 * MARGIN, 48.0),
        Color::from_srgb_u8(0x3e, 0x44, 0x51, 0xff),
    )];

    let top = 2.0 * MARGIN + 48.0;
    let cell_w = (viewport.width - MARGIN * (COLS as f32 + 1.0)) / COLS as f32;
    let cell_h = (viewport.height - top - MARGIN * ROWS as f32) / ROWS as f32;
    if cell_w <= 0.0 || cell_h <= 0.0 {
        return figures;
    }

    for row in 0..ROWS {
        for col in 0..COLS {
            let (r, g, b) = PALETTE[(row + col) % PALETTE.len()];
            // Fade each row a little more than the one above it.
            let alpha = 255 - (row as u8) * 60;
            figures.push(RectFigure::new(
                Rect::new(
                    MARGIN + col as f32 * (cell_w + MARGIN),
                    top + row as f32 * (cell_h + MARGIN),
                    cell_w,
                    cell_h,
                ),
                Color::from_srgb_u8(r, g, b, alpha),
            ));
        }
    }
    figures
}

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let config = RuntimeConfig {
        title: "Tessel Studio".to_string(),
        initial_size: LogicalSize::new(820.0, 560.0),
    };
    let viewport = Viewport::new(
        config.initial_size.width as f32,
        config.initial_size.height as f32,
    );
    log::info!("starting {}", config.title);

    Runtime::run(config, GpuInit::default(), Showcase::new(viewport)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_fills_grid_under_banner() {
        let figures = layout(Viewport::new(820.0, 560.0));
        assert_eq!(figures.len(), 13);
        assert!(figures.iter().all(|f| !f.rect.is_empty()));
        let last = figures[12].rect;
        assert!((last.max().x - (820.0 - MARGIN)).abs() < 1e-3);
        assert!((last.max().y - (560.0 - MARGIN)).abs() < 1e-3);
    }

    #[test]
    fn tiny_viewport_keeps_only_banner() {
        assert_eq!(layout(Viewport::new(60.0, 60.0)).len(), 1);
    }
}
