//! The document renderer's position state, threaded explicitly through every draw step.

/// Current page index and vertical offset from the page top, in points.
///
/// `y` only grows within a page; it returns to the top margin on a page break.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderCursor {
    pub page: usize,
    pub y: f32,
    top: f32,
}

impl RenderCursor {
    pub fn new(top: f32) -> Self {
        RenderCursor {
            page: 0,
            y: top,
            top,
        }
    }

    /// Moves down by `dy`. Negative or non-finite advances are ignored.
    pub fn advance(&mut self, dy: f32) {
        if dy.is_finite() && dy > 0.0 {
            self.y += dy;
        }
    }

    pub fn break_page(&mut self) {
        self.page += 1;
        self.y = self.top;
    }

    /// True when nothing has been placed on the current page yet.
    pub fn at_page_top(&self) -> bool {
        self.y <= self.top + f32::EPSILON
    }

    /// Whether `height` more points fit above `bottom`.
    pub fn fits(&self, height: f32, bottom: f32) -> bool {
        self.y + height <= bottom + 1e-3
    }
}
