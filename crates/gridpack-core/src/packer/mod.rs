use crate::config::{GridConfig, LayoutMode};
use crate::model::{ContainerBox, ItemBox, LayoutResult, Offset, Placement, Size};

pub mod fit_rows;
pub mod masonry;
pub mod vertical;

/// Measurements resolved by the host before a pass starts. Nothing is read
/// from the host once placement begins.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PassMetrics {
    pub container: ContainerBox,
    /// Configured or sizer-derived column width; `0.0` when unresolved.
    pub column_width: f64,
    pub gutter: f64,
    /// Outer width of the first item in the pass (column width fallback).
    pub first_item_width: f64,
}

/// A layout engine positions items one after another during a single pass.
///
/// A full pass starts from a fresh engine; appended items continue from the
/// state the previous pass left behind.
/// `place` must never produce overlapping boxes for the columns it tracks.
pub trait LayoutEngine<K> {
    fn place(&mut self, item: &ItemBox<K>) -> Placement<K>;

    /// Registers an obstacle. Modes without column state ignore stamps.
    fn manage_stamp(&mut self, _size: Size, _offset: &Offset) {}

    /// Content `(width, height)`; width is only reported by fit-width masonry.
    fn container_size(&self) -> (Option<f64>, f64);

    fn columns(&self) -> usize {
        1
    }

    fn column_width(&self) -> f64 {
        0.0
    }

    fn col_ys(&self) -> Vec<f64> {
        Vec::new()
    }
}

/// Builds the engine for the configured mode.
pub fn build_engine<K: Clone>(cfg: &GridConfig, metrics: &PassMetrics) -> Box<dyn LayoutEngine<K>> {
    match cfg.layout_mode {
        LayoutMode::Masonry => Box::new(masonry::MasonryEngine::new(
            metrics,
            masonry::MasonryOptions::from_config(cfg),
        )),
        LayoutMode::FitRows => Box::new(fit_rows::FitRowsEngine::new(metrics)),
        LayoutMode::Vertical => Box::new(vertical::VerticalEngine::new(
            metrics,
            cfg.horizontal_alignment,
        )),
    }
}

/// Runs a full pass: stamps first, then every item in order.
pub fn run_pass<K: Clone>(
    engine: &mut dyn LayoutEngine<K>,
    items: &[ItemBox<K>],
    stamps: &[(Size, Offset)],
) -> LayoutResult<K> {
    for (size, offset) in stamps {
        engine.manage_stamp(size.sanitized(), offset);
    }
    let placements: Vec<Placement<K>> = items.iter().map(|it| engine.place(it)).collect();
    let (width, height) = engine.container_size();
    LayoutResult {
        placements,
        width,
        height,
        columns: engine.columns(),
        column_width: engine.column_width(),
        col_ys: engine.col_ys(),
    }
}
