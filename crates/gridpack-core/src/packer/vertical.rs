use super::{LayoutEngine, PassMetrics};
use crate::model::{ItemBox, Placement, sanitize};

/// One item per row, shifted horizontally by `alignment` of the free space.
pub struct VerticalEngine {
    y: f64,
    container_width: f64,
    alignment: f64,
}

impl VerticalEngine {
    pub fn new(metrics: &PassMetrics, alignment: f64) -> Self {
        Self {
            y: 0.0,
            container_width: sanitize(metrics.container.inner_width),
            alignment: alignment.clamp(0.0, 1.0),
        }
    }
}

impl<K: Clone> LayoutEngine<K> for VerticalEngine {
    fn place(&mut self, item: &ItemBox<K>) -> Placement<K> {
        let size = item.size.sanitized();
        let x = (self.container_width - size.width) * self.alignment;
        let y = self.y;
        self.y += size.height;
        Placement {
            key: item.key.clone(),
            x,
            y,
            width: size.width,
            height: size.height,
        }
    }

    fn container_size(&self) -> (Option<f64>, f64) {
        (None, self.y)
    }
}
