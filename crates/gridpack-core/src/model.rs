use serde::{Deserialize, Serialize};

/// Replaces non-finite and negative measurements with `0.0`.
#[inline]
pub fn sanitize(v: f64) -> f64 {
    if v.is_finite() && v > 0.0 { v } else { 0.0 }
}

/// Outer size of a box (margins included), in CSS pixels.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Both dimensions clamped through [`sanitize`].
    pub fn sanitized(self) -> Self {
        Self::new(sanitize(self.width), sanitize(self.height))
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0.0 || self.height == 0.0
    }
}

/// Offset of an element relative to the container's inner box.
///
/// `left`/`top` are distances from the left/top inner edges to the element's
/// left/top edges; `right`/`bottom` are distances from the right/bottom inner
/// edges to the element's right/bottom edges.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Offset {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

/// Axis-aligned rectangle. `x,y` is top-left; `w,h` are sizes.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }
    /// Exclusive right edge (`x + w`).
    pub fn right(&self) -> f64 {
        self.x + self.w
    }
    /// Exclusive bottom edge (`y + h`).
    pub fn bottom(&self) -> f64 {
        self.y + self.h
    }
    /// True when the interiors overlap; touching edges do not count.
    pub fn intersects(&self, other: &Rect) -> bool {
        !(self.x >= other.right()
            || other.x >= self.right()
            || self.y >= other.bottom()
            || other.y >= self.bottom())
    }
}

/// Geometry of the layout container as measured by the host.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ContainerBox {
    pub inner_width: f64,
    #[serde(default)]
    pub inner_height: f64,
    /// Inner width of the container's parent, used when fit-width is on.
    #[serde(default)]
    pub parent_inner_width: Option<f64>,
}

impl ContainerBox {
    pub fn new(inner_width: f64, inner_height: f64) -> Self {
        Self {
            inner_width,
            inner_height,
            parent_inner_width: None,
        }
    }

    pub fn with_parent_width(mut self, w: f64) -> Self {
        self.parent_inner_width = Some(w);
        self
    }
}

/// An item as seen by a layout pass: key, measured outer size, optional
/// column span override.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemBox<K = String> {
    pub key: K,
    pub size: Size,
    pub span: Option<usize>,
}

impl<K> ItemBox<K> {
    pub fn new(key: K, width: f64, height: f64) -> Self {
        Self {
            key,
            size: Size::new(width, height),
            span: None,
        }
    }

    pub fn with_span(mut self, span: usize) -> Self {
        self.span = Some(span);
        self
    }
}

/// Position assigned to one item, relative to the configured origin corner.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Placement<K = String> {
    pub key: K,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl<K> Placement<K> {
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }
}

/// Result of one layout pass.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LayoutResult<K = String> {
    pub placements: Vec<Placement<K>>,
    /// Content width; only set when fit-width sizing applies.
    pub width: Option<f64>,
    pub height: f64,
    /// Column count (masonry) or 1 for modes that do not use columns.
    pub columns: usize,
    /// Column stride (column width plus gutter) for masonry, else 0.
    pub column_width: f64,
    /// Final filled-to height of every column (masonry only).
    pub col_ys: Vec<f64>,
}

impl<K> LayoutResult<K> {
    pub fn empty() -> Self {
        Self {
            placements: Vec::new(),
            width: None,
            height: 0.0,
            columns: 0,
            column_width: 0.0,
            col_ys: Vec::new(),
        }
    }

    pub fn get(&self, key: &K) -> Option<&Placement<K>>
    where
        K: PartialEq,
    {
        self.placements.iter().find(|p| &p.key == key)
    }

    /// Positions converted to top-left coordinates inside a container of
    /// `container_width` when the origin is on the right and/or bottom.
    pub fn to_top_left(&self, container_width: f64, origin_left: bool, origin_top: bool) -> Vec<Rect> {
        self.placements
            .iter()
            .map(|p| {
                let x = if origin_left {
                    p.x
                } else {
                    container_width - p.x - p.width
                };
                let y = if origin_top {
                    p.y
                } else {
                    self.height - p.y - p.height
                };
                Rect::new(x, y, p.width, p.height)
            })
            .collect()
    }

    /// Summary statistics for this pass.
    pub fn stats(&self) -> LayoutStats {
        let used_area: f64 = self.placements.iter().map(|p| p.width * p.height).sum();
        let width = self
            .width
            .unwrap_or_else(|| self.placements.iter().map(|p| p.x + p.width).fold(0.0, f64::max));
        let total_area = width * self.height;
        LayoutStats {
            num_items: self.placements.len(),
            columns: self.columns,
            width,
            height: self.height,
            used_area,
            occupancy: if total_area > 0.0 {
                used_area / total_area
            } else {
                0.0
            },
        }
    }
}

/// Packing efficiency of a layout pass.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LayoutStats {
    pub num_items: usize,
    pub columns: usize,
    /// Fit width when known, else the rightmost placed edge.
    pub width: f64,
    pub height: f64,
    pub used_area: f64,
    /// used_area / (width * height), 0.0 to 1.0.
    pub occupancy: f64,
}

impl LayoutStats {
    /// Returns a human-readable summary of the statistics.
    pub fn summary(&self) -> String {
        format!(
            "Items: {}, Columns: {}, Size: {:.1}x{:.1}, Occupancy: {:.2}%",
            self.num_items,
            self.columns,
            self.width,
            self.height,
            self.occupancy * 100.0,
        )
    }
}
