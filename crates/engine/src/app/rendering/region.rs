use crate::app::Vec2;

/// The logical screen rectangle, anchored at the origin with y pointing down.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogicalRegion {
    pub width: f32,
    pub height: f32,
}

impl LogicalRegion {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn center(&self) -> Vec2 {
        Vec2 {
            x: 0.5 * self.width,
            y: 0.5 * self.height,
        }
    }

    /// True when `point` lies inside the rectangle grown by `margin` on every
    /// side. A negative margin shrinks it.
    pub fn contains_with_margin(&self, point: Vec2, margin: f32) -> bool {
        point.x >= -margin
            && point.x < self.width + margin
            && point.y >= -margin
            && point.y < self.height + margin
    }

    /// Keeps `point` at least `margin` away from every edge.
    pub fn clamp_inside(&self, point: Vec2, margin: f32) -> Vec2 {
        let x = if point.x < margin {
            margin
        } else if point.x >= self.width - margin {
            self.width - margin - 1.0
        } else {
            point.x
        };
        let y = if point.y < margin {
            margin
        } else if point.y >= self.height - margin {
            self.height - margin - 1.0
        } else {
            point.y
        };
        Vec2 { x, y }
    }
}
