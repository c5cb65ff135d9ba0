use iced::{
    mouse,
    widget::canvas::{self, Frame, Geometry, Path, Stroke},
    Color, Point, Rectangle, Renderer, Theme,
};
use trailcore::session::{RenderFrame, RenderSink};
use trailcore::{Extent, PlanarPoint};

/// Backdrop generated for one visible rectangle. Stands in for basemap
/// imagery: a graticule whose spacing follows the zoom level.
#[derive(Debug, Clone, PartialEq)]
pub struct Backdrop {
    pub visible: Extent,
    pub frame: String,
    pub grid_step: f64,
    pub generation: usize,
}

/// Render sink that keeps the latest frame and backdrop for the canvas.
#[derive(Debug, Default)]
pub struct MapCanvas {
    frame: Option<RenderFrame>,
    backdrop: Option<Backdrop>,
    generation: usize,
}

impl MapCanvas {
    pub fn program(&self) -> TrailMap {
        TrailMap {
            frame: self.frame.clone(),
            backdrop: self.backdrop.clone(),
        }
    }

    pub fn backdrop(&self) -> Option<&Backdrop> {
        self.backdrop.as_ref()
    }
}

impl RenderSink for MapCanvas {
    fn refresh_background(&mut self, visible: &Extent, frame: &str) {
        self.generation += 1;
        self.backdrop = Some(Backdrop {
            visible: *visible,
            frame: frame.to_string(),
            grid_step: grid_step(visible.width().max(visible.height())),
            generation: self.generation,
        });
    }

    fn draw(&mut self, frame: &RenderFrame) {
        self.frame = Some(frame.clone());
    }
}

/// Roughly eight grid lines across `span`, snapped to 1, 2 or 5 times a
/// power of ten.
pub fn grid_step(span: f64) -> f64 {
    if !span.is_finite() || span <= 0.0 {
        return 1.0;
    }
    let raw = span / 8.0;
    let magnitude = 10f64.powf(raw.log10().floor());
    let normalized = raw / magnitude;
    let snapped = if normalized < 1.5 {
        1.0
    } else if normalized < 3.5 {
        2.0
    } else if normalized < 7.5 {
        5.0
    } else {
        10.0
    };
    snapped * magnitude
}

#[derive(Clone)]
pub struct TrailMap {
    frame: Option<RenderFrame>,
    backdrop: Option<Backdrop>,
}

struct Mapper {
    visible: Extent,
    bounds: Rectangle,
}

impl Mapper {
    fn to_screen(&self, p: PlanarPoint) -> Point {
        let width = self.visible.width().max(f64::EPSILON);
        let height = self.visible.height().max(f64::EPSILON);
        let x = (p.x - self.visible.min_x) / width * self.bounds.width as f64;
        let y = self.bounds.height as f64 - (p.y - self.visible.min_y) / height * self.bounds.height as f64;
        Point::new(x as f32, y as f32)
    }
}

impl<Message> canvas::Program<Message> for TrailMap {
    type State = ();

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let mut frame = Frame::new(renderer, bounds.size());
        frame.fill_rectangle(
            Point::ORIGIN,
            bounds.size(),
            Color::from_rgb(0.05, 0.06, 0.08),
        );

        let Some(render) = &self.frame else {
            return vec![frame.into_geometry()];
        };
        let mapper = Mapper {
            visible: render.visible,
            bounds,
        };

        let drawable = |extent: Extent, step: f64| {
            extent.width().is_finite()
                && extent.height().is_finite()
                && extent.width().max(extent.height()) / step < 500.0
        };
        if let Some(backdrop) = self
            .backdrop
            .as_ref()
            .filter(|b| drawable(render.visible, b.grid_step))
        {
            let step = backdrop.grid_step;
            let visible = render.visible;
            let grid = Path::new(|builder| {
                let mut x = (visible.min_x / step).ceil() * step;
                while x <= visible.max_x {
                    builder.move_to(mapper.to_screen(PlanarPoint::new(x, visible.min_y)));
                    builder.line_to(mapper.to_screen(PlanarPoint::new(x, visible.max_y)));
                    x += step;
                }
                let mut y = (visible.min_y / step).ceil() * step;
                while y <= visible.max_y {
                    builder.move_to(mapper.to_screen(PlanarPoint::new(visible.min_x, y)));
                    builder.line_to(mapper.to_screen(PlanarPoint::new(visible.max_x, y)));
                    y += step;
                }
            });
            frame.stroke(
                &grid,
                Stroke::default()
                    .with_width(1.0)
                    .with_color(Color::from_rgb(0.18, 0.2, 0.26)),
            );
        }

        if render.trail_x.len() > 1 {
            let trail = Path::new(|builder| {
                for (i, (x, y)) in render.trail_x.iter().zip(&render.trail_y).enumerate() {
                    let point = mapper.to_screen(PlanarPoint::new(*x, *y));
                    if i == 0 {
                        builder.move_to(point);
                    } else {
                        builder.line_to(point);
                    }
                }
            });
            frame.stroke(
                &trail,
                Stroke::default()
                    .with_width(2.0)
                    .with_color(Color::from_rgb(0.18, 0.72, 0.89)),
            );
        }

        let marker = Path::new(|builder| builder.circle(mapper.to_screen(render.current), 6.0));
        frame.fill(&marker, Color::from_rgb(0.95, 0.55, 0.2));

        vec![frame.into_geometry()]
    }
}
