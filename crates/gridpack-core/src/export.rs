use crate::model::LayoutResult;
use serde_json::{Value, json};

/// Serialize a layout as `{ width, height, columns, columnWidth, items }`, with
/// `items` in placement order. `width` is `null` unless fit-width applied.
pub fn to_json<K: ToString>(layout: &LayoutResult<K>) -> Value {
    let items: Vec<Value> = layout
        .placements
        .iter()
        .map(|p| {
            json!({
                "key": p.key.to_string(),
                "x": p.x,
                "y": p.y,
                "width": p.width,
                "height": p.height,
            })
        })
        .collect();
    json!({
        "width": layout.width,
        "height": layout.height,
        "columns": layout.columns,
        "columnWidth": layout.column_width,
        "items": items,
    })
}

/// Same layout keyed by item: `{ items: { key: { x, y, width, height } }, height, ... }`.
/// Later placements of a duplicate key win.
pub fn to_json_hash<K: ToString>(layout: &LayoutResult<K>) -> Value {
    let mut items = serde_json::Map::new();
    for p in &layout.placements {
        items.insert(
            p.key.to_string(),
            json!({"x": p.x, "y": p.y, "width": p.width, "height": p.height}),
        );
    }
    json!({
        "width": layout.width,
        "height": layout.height,
        "columns": layout.columns,
        "columnWidth": layout.column_width,
        "items": items,
    })
}
