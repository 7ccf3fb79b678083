//! Read-only presentation view of a world
//!
//! Projects 3-D body positions onto two screen views (x/y and z/y), scales
//! body colors by depth and orders bodies back to front. Nothing here draws
//! or mutates the world; a renderer consumes [`RenderFrame`].

use crate::simulation::engine::World;
use crate::simulation::params::DEFAULT_HALF_EXTENT;
use crate::simulation::states::{Body, BodyId, Color, NVec3};

/// Screen origin for the world origin, plus the depth used for shading
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    pub origin: (i32, i32, i32), // screen position of world (0, 0, 0) per axis
    pub depth: f64,              // window depth, for color shading
}

impl Default for Projection {
    /// A 600 x 600 x 600 window centred on the origin
    fn default() -> Self {
        let half = DEFAULT_HALF_EXTENT as i32;
        Self {
            origin: (half, half, half),
            depth: 2.0 * DEFAULT_HALF_EXTENT,
        }
    }
}

impl Projection {
    /// Screen coordinates in the x/y view; screen y grows downward
    pub fn xy(&self, p: &NVec3) -> (i32, i32) {
        ((self.origin.0 as f64 + p.x) as i32, (self.origin.1 as f64 - p.y) as i32)
    }

    /// Screen coordinates in the z/y side view
    pub fn zy(&self, p: &NVec3) -> (i32, i32) {
        ((self.origin.2 as f64 + p.z) as i32, (self.origin.1 as f64 - p.y) as i32)
    }

    /// Body color dimmed by depth: nearer (larger z) is brighter
    ///
    /// Unbound bodies can leave the box, so they keep their plain color.
    pub fn shade(&self, body: &Body) -> Color {
        if !body.is_bound() {
            return body.color;
        }
        let s = (self.depth + body.x.z) / (2.0 * self.depth);
        let scale = |c: u8| (c as f64 * s).abs().min(255.0) as u8;
        Color::rgb(scale(body.color.r), scale(body.color.g), scale(body.color.b))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Circle {
    pub body: BodyId,
    pub xy: (i32, i32),
    pub zy: (i32, i32),
    pub radius: f64,
    pub color: Color,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub xy: ((i32, i32), (i32, i32)),
    pub zy: ((i32, i32), (i32, i32)),
    pub color: Color,
}

/// Everything a renderer needs for one frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderFrame {
    pub circles: Vec<Circle>, // visible bodies, back to front
    pub lines: Vec<Line>,     // visible springs
}

impl RenderFrame {
    pub fn capture(world: &World, projection: &Projection) -> Self {
        let circles = world
            .draw_order()
            .into_iter()
            .filter_map(|id| world.body(id).map(|b| (id, b)))
            .filter(|(_, b)| b.visible)
            .map(|(id, b)| Circle {
                body: id,
                xy: projection.xy(&b.x),
                zy: projection.zy(&b.x),
                radius: b.radius(),
                color: projection.shade(b),
            })
            .collect();

        let lines = world
            .springs()
            .filter(|(_, s)| s.visible)
            .filter_map(|(_, s)| {
                let a = world.body(s.pair.first)?;
                let b = world.body(s.pair.second)?;
                Some(Line {
                    xy: (projection.xy(&a.x), projection.xy(&b.x)),
                    zy: (projection.zy(&a.x), projection.zy(&b.x)),
                    color: s.color,
                })
            })
            .collect();

        Self { circles, lines }
    }
}
