use tracing::{debug, instrument};

use crate::config::{GridConfig, LayoutMode, Measurement};
use crate::error::Result;
use crate::model::{ContainerBox, ItemBox, LayoutResult, Offset, Size, sanitize};
use crate::packer::{PassMetrics, build_engine, run_pass};

/// Lays out pre-measured items in one pass.
///
/// This is the stateless entry point: no filtering, sorting or events. Items
/// are placed in the order given, after `stamps` have raised their columns.
/// Selector measurements cannot be resolved without a host and fall back to
/// the first item's width (column width) or zero (gutter).
#[instrument(skip_all, fields(items = items.len(), mode = ?cfg.layout_mode))]
pub fn pack<K: Clone + 'static>(
    items: &[ItemBox<K>],
    container: &ContainerBox,
    cfg: &GridConfig,
    stamps: &[(Size, Offset)],
) -> Result<LayoutResult<K>> {
    cfg.validate()?;

    let items: Vec<ItemBox<K>> = items
        .iter()
        .map(|it| ItemBox {
            key: it.key.clone(),
            size: it.size.sanitized(),
            span: it.span,
        })
        .collect();

    let metrics = PassMetrics {
        container: *container,
        column_width: fixed_or_zero(cfg.column_width.as_ref()),
        gutter: fixed_or_zero(cfg.gutter.as_ref()),
        first_item_width: items.first().map_or(0.0, |it| it.size.width),
    };
    if cfg.layout_mode == LayoutMode::Masonry && metrics.column_width == 0.0 {
        debug!(
            fallback = metrics.first_item_width,
            "column width unresolved; using first item"
        );
    }

    let mut engine = build_engine::<K>(cfg, &metrics);
    let result = run_pass(engine.as_mut(), &items, stamps);
    debug!(
        height = result.height,
        columns = result.columns,
        "pack complete"
    );
    Ok(result)
}

fn fixed_or_zero(m: Option<&Measurement>) -> f64 {
    match m {
        Some(Measurement::Fixed(v)) => sanitize(*v),
        Some(Measurement::Selector(_)) | None => 0.0,
    }
}
