use super::{LayoutEngine, PassMetrics};
use crate::model::{ItemBox, Placement, sanitize};
use tracing::trace;

/// Rows filled left to right; an item that overflows the row starts a new
/// one below the tallest item seen so far.
pub struct FitRowsEngine {
    x: f64,
    y: f64,
    max_y: f64,
    gutter: f64,
    container_width: f64,
}

impl FitRowsEngine {
    pub fn new(metrics: &PassMetrics) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            max_y: 0.0,
            gutter: sanitize(metrics.gutter),
            container_width: sanitize(metrics.container.inner_width),
        }
    }
}

impl<K: Clone> LayoutEngine<K> for FitRowsEngine {
    fn place(&mut self, item: &ItemBox<K>) -> Placement<K> {
        let size = item.size.sanitized();
        let item_width = size.width + self.gutter;
        let available = self.container_width + self.gutter;
        if self.x != 0.0 && item_width + self.x > available {
            self.x = 0.0;
            self.y = self.max_y;
        }
        let placement = Placement {
            key: item.key.clone(),
            x: self.x,
            y: self.y,
            width: size.width,
            height: size.height,
        };
        trace!(x = self.x, y = self.y, "fitRows place");
        self.max_y = self.max_y.max(self.y + size.height);
        self.x += item_width;
        placement
    }

    fn container_size(&self) -> (Option<f64>, f64) {
        (None, self.max_y)
    }
}
