use crate::types::{LayoutConfig, Point, PositionMap};

/// Flips a page-space point (origin top-left) into PDF user space (origin
/// bottom-left).
#[inline]
pub fn to_pdf_space(point: Point, page_height: f64) -> Point {
    Point::new(point.x, page_height - point.y)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Whether the box lies fully inside a `width` x `height` page.
    pub fn fits_page(&self, width: f64, height: f64) -> bool {
        self.min_x >= 0.0 && self.min_y >= 0.0 && self.max_x <= width && self.max_y <= height
    }
}

/// Bounding box of every node box in page space, `None` when nothing is
/// positioned.
pub fn layout_bounds(positions: &PositionMap, config: &LayoutConfig) -> Option<Bounds> {
    let half_width = config.node_width() / 2.0;
    let height = config.node_height();

    let mut min_x = f64::MAX;
    let mut max_x = f64::MIN;
    let mut min_y = f64::MAX;
    let mut max_y = f64::MIN;

    for (_, p) in positions.iter() {
        min_x = min_x.min(p.x - half_width);
        max_x = max_x.max(p.x + half_width);
        min_y = min_y.min(p.y);
        max_y = max_y.max(p.y + height);
    }

    if min_x == f64::MAX {
        return None;
    }
    Some(Bounds {
        min_x,
        min_y,
        max_x,
        max_y,
    })
}
