use super::{LayoutEngine, PassMetrics};
use crate::config::GridConfig;
use crate::model::{ItemBox, Offset, Placement, Size, sanitize};
use tracing::{debug, trace};

/// Remainders smaller than this (in pixels) are treated as layout jitter:
/// column counts and spans round instead of floor/ceil.
pub const SUBPIXEL_TOLERANCE: f64 = 1.0;

/// Upper bound on the column count, reached only with degenerate
/// (sub-pixel) column widths.
pub const MAX_COLUMNS: usize = 4096;

/// Options of the masonry mode taken from `GridConfig`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MasonryOptions {
    pub fit_width: bool,
    pub horizontal_order: bool,
    pub origin_left: bool,
    pub origin_top: bool,
}

impl MasonryOptions {
    pub fn from_config(cfg: &GridConfig) -> Self {
        Self {
            fit_width: cfg.fit_width,
            horizontal_order: cfg.horizontal_order,
            origin_left: cfg.origin_left,
            origin_top: cfg.origin_top,
        }
    }
}

/// Number of columns of `column_width` (plus `gutter`) that fit into
/// `container_width`. Always in `1..=MAX_COLUMNS`.
pub fn column_count(container_width: f64, column_width: f64, gutter: f64) -> usize {
    let stride = column_width + gutter;
    if stride <= 0.0 || !stride.is_finite() {
        return 1;
    }
    let available = container_width + gutter;
    let cols = available / stride;
    let excess = stride - available % stride;
    let cols = if excess > 0.0 && excess < SUBPIXEL_TOLERANCE {
        cols.round()
    } else {
        cols.floor()
    };
    if cols >= MAX_COLUMNS as f64 {
        MAX_COLUMNS
    } else if cols >= 1.0 {
        cols as usize
    } else {
        1
    }
}

/// Shortest-column-first / horizontal-order column packer.
pub struct MasonryEngine {
    options: MasonryOptions,
    cols: usize,
    /// Column stride: column width plus gutter.
    column_width: f64,
    gutter: f64,
    col_ys: Vec<f64>,
    horizontal_col_index: usize,
}

impl MasonryEngine {
    pub fn new(metrics: &PassMetrics, options: MasonryOptions) -> Self {
        let container_width = if options.fit_width {
            metrics
                .container
                .parent_inner_width
                .unwrap_or(metrics.container.inner_width)
        } else {
            metrics.container.inner_width
        };
        let container_width = sanitize(container_width);
        let gutter = sanitize(metrics.gutter);

        let mut column_width = sanitize(metrics.column_width);
        if column_width == 0.0 {
            column_width = sanitize(metrics.first_item_width);
        }
        if column_width == 0.0 {
            column_width = container_width;
        }
        let cols = column_count(container_width, column_width, gutter);
        debug!(
            container_width,
            column_width, gutter, cols, "masonry columns measured"
        );
        Self {
            options,
            cols,
            column_width: column_width + gutter,
            gutter,
            col_ys: vec![0.0; cols],
            horizontal_col_index: 0,
        }
    }

    /// Columns an item of `width` covers, capped to the column count.
    pub fn column_span(&self, width: f64, span_override: Option<usize>) -> usize {
        if let Some(span) = span_override {
            return span.clamp(1, self.cols);
        }
        if self.column_width <= 0.0 {
            return 1;
        }
        let remainder = width % self.column_width;
        let ratio = width / self.column_width;
        let span = if remainder > 0.0 && remainder < SUBPIXEL_TOLERANCE {
            ratio.round()
        } else {
            ratio.ceil()
        };
        (span as usize).clamp(1, self.cols)
    }

    fn col_group_y(&self, col: usize, span: usize) -> f64 {
        self.col_ys[col..col + span]
            .iter()
            .copied()
            .fold(0.0, f64::max)
    }

    /// Leftmost run of `span` columns with the lowest max height.
    fn top_col_position(&self, span: usize) -> (usize, f64) {
        let mut best_col = 0;
        let mut best_y = f64::INFINITY;
        for col in 0..=(self.cols - span) {
            let y = self.col_group_y(col, span);
            if y < best_y {
                best_y = y;
                best_col = col;
            }
        }
        (best_col, best_y)
    }

    fn horizontal_col_position(&mut self, span: usize, size: &Size) -> (usize, f64) {
        let mut col = self.horizontal_col_index % self.cols;
        if span > 1 && col + span > self.cols {
            col = 0;
        }
        // zero-sized items do not advance the running index
        if !size.is_empty() {
            self.horizontal_col_index = col + span;
        }
        (col, self.col_group_y(col, span))
    }

    fn fit_width(&self) -> f64 {
        let mut unused = 0;
        let mut j = self.cols;
        loop {
            j -= 1;
            if j == 0 || self.col_ys[j] != 0.0 {
                break;
            }
            unused += 1;
        }
        (self.cols - unused) as f64 * self.column_width - self.gutter
    }
}

impl<K: Clone> LayoutEngine<K> for MasonryEngine {
    fn place(&mut self, item: &ItemBox<K>) -> Placement<K> {
        let size = item.size.sanitized();
        let span = self.column_span(size.width, item.span);
        let (col, y) = if self.options.horizontal_order {
            self.horizontal_col_position(span, &size)
        } else {
            self.top_col_position(span)
        };
        let bottom = y + size.height;
        for h in &mut self.col_ys[col..col + span] {
            *h = bottom;
        }
        let x = self.column_width * col as f64;
        trace!(col, span, x, y, "masonry place");
        Placement {
            key: item.key.clone(),
            x,
            y,
            width: size.width,
            height: size.height,
        }
    }

    fn manage_stamp(&mut self, size: Size, offset: &Offset) {
        let start = sanitize_signed(if self.options.origin_left {
            offset.left
        } else {
            offset.right
        });
        let end = start + size.width;
        let (first, last) = if self.column_width <= 0.0 {
            (0, self.cols as i64 - 1)
        } else {
            let first = (start / self.column_width).floor().max(0.0) as i64;
            let mut last = (end / self.column_width).floor() as i64;
            if end % self.column_width == 0.0 {
                last -= 1;
            }
            (first, last.min(self.cols as i64 - 1))
        };
        let top = sanitize_signed(if self.options.origin_top {
            offset.top
        } else {
            offset.bottom
        });
        let stamp_bottom = top + size.height;
        trace!(first, last, stamp_bottom, "masonry stamp");
        let mut col = first;
        while col <= last {
            let h = &mut self.col_ys[col as usize];
            *h = h.max(stamp_bottom);
            col += 1;
        }
    }

    fn container_size(&self) -> (Option<f64>, f64) {
        let max_y = self.col_ys.iter().copied().fold(0.0, f64::max);
        let width = self.options.fit_width.then(|| self.fit_width());
        (width, max_y)
    }

    fn columns(&self) -> usize {
        self.cols
    }

    fn column_width(&self) -> f64 {
        self.column_width
    }

    fn col_ys(&self) -> Vec<f64> {
        self.col_ys.clone()
    }
}

/// Negative offsets are kept; only non-finite values become zero.
#[inline]
fn sanitize_signed(v: f64) -> f64 {
    if v.is_finite() { v } else { 0.0 }
}
