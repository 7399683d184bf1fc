use gridpack_core::packer::masonry::{MasonryEngine, MasonryOptions};
use gridpack_core::prelude::*;
use gridpack_core::{LayoutEngine, Offset, PassMetrics};

fn stamp_at(left: f64, top: f64, w: f64, h: f64, container: f64) -> (Size, Offset) {
    (
        Size::new(w, h),
        Offset {
            left,
            top,
            right: container - left - w,
            bottom: 0.0,
        },
    )
}

fn cfg() -> GridConfig {
    GridConfig::builder().column_width(100.0).build()
}

#[test]
fn stamp_raises_only_overlapped_column() {
    let stamps = [stamp_at(100.0, 0.0, 100.0, 40.0, 300.0)];
    let items = vec![
        ItemBox::new("a", 100.0, 50.0),
        ItemBox::new("b", 100.0, 50.0),
        ItemBox::new("c", 100.0, 50.0),
    ];
    let out = pack(&items, &ContainerBox::new(300.0, 0.0), &cfg(), &stamps).unwrap();
    let a = out.get(&"a").unwrap();
    assert_eq!((a.x, a.y), (0.0, 0.0));
    let b = out.get(&"b").unwrap();
    assert_eq!((b.x, b.y), (200.0, 0.0));
    let c = out.get(&"c").unwrap();
    assert_eq!((c.x, c.y), (100.0, 40.0));
    assert_eq!(out.col_ys, vec![50.0, 90.0, 50.0]);
}

#[test]
fn stamp_edges_follow_column_boundaries() {
    // ends exactly on a boundary: does not touch the next column
    let out = pack::<&str>(
        &[],
        &ContainerBox::new(300.0, 0.0),
        &cfg(),
        &[stamp_at(0.0, 10.0, 200.0, 20.0, 300.0)],
    )
    .unwrap();
    assert_eq!(out.col_ys, vec![30.0, 30.0, 0.0]);

    // partial overlap reaches into the next column
    let out = pack::<&str>(
        &[],
        &ContainerBox::new(300.0, 0.0),
        &cfg(),
        &[stamp_at(150.0, 0.0, 60.0, 25.0, 300.0)],
    )
    .unwrap();
    assert_eq!(out.col_ys, vec![0.0, 25.0, 25.0]);
}

#[test]
fn stamp_outside_grid_is_clamped() {
    let out = pack::<&str>(
        &[],
        &ContainerBox::new(300.0, 0.0),
        &cfg(),
        &[
            stamp_at(-50.0, 0.0, 100.0, 15.0, 300.0),
            stamp_at(250.0, 0.0, 100.0, 35.0, 300.0),
            stamp_at(400.0, 0.0, 100.0, 99.0, 300.0),
        ],
    )
    .unwrap();
    assert_eq!(out.col_ys, vec![15.0, 0.0, 35.0]);
}

#[test]
fn stamps_never_lower_columns() {
    let out = pack::<&str>(
        &[],
        &ContainerBox::new(300.0, 0.0),
        &cfg(),
        &[
            stamp_at(0.0, 0.0, 300.0, 60.0, 300.0),
            stamp_at(100.0, 0.0, 100.0, 20.0, 300.0),
        ],
    )
    .unwrap();
    assert_eq!(out.col_ys, vec![60.0, 60.0, 60.0]);
}

#[test]
fn stamping_after_placement_is_monotonic() {
    let metrics = PassMetrics {
        container: ContainerBox::new(300.0, 0.0),
        column_width: 100.0,
        gutter: 0.0,
        first_item_width: 100.0,
    };
    let opts = MasonryOptions {
        origin_left: true,
        origin_top: true,
        ..Default::default()
    };
    let mut engine = MasonryEngine::new(&metrics, opts);
    for (k, h) in [("a", 30.0), ("b", 70.0), ("c", 10.0)] {
        LayoutEngine::<&str>::place(&mut engine, &ItemBox::new(k, 100.0, h));
    }
    let before = LayoutEngine::<&str>::col_ys(&engine);
    let (size, offset) = stamp_at(50.0, 0.0, 100.0, 40.0, 300.0);
    LayoutEngine::<&str>::manage_stamp(&mut engine, size, &offset);
    let after = LayoutEngine::<&str>::col_ys(&engine);
    assert_eq!(before, vec![30.0, 70.0, 10.0]);
    assert_eq!(after, vec![40.0, 70.0, 10.0]);
    for (b, a) in before.iter().zip(&after) {
        assert!(a >= b);
    }
}

#[test]
fn origin_right_measures_from_right_edge() {
    let cfg = GridConfig::builder()
        .column_width(100.0)
        .origin_left(false)
        .build();
    let stamp = (
        Size::new(200.0, 40.0),
        Offset {
            left: 100.0,
            top: 0.0,
            right: 0.0,
            bottom: 0.0,
        },
    );
    let items = vec![ItemBox::new("a", 100.0, 50.0)];
    let out = pack(&items, &ContainerBox::new(300.0, 0.0), &cfg, &[stamp]).unwrap();
    let a = out.get(&"a").unwrap();
    assert_eq!((a.x, a.y), (200.0, 0.0));
    let rects = out.to_top_left(300.0, false, true);
    assert_eq!(rects[0], Rect::new(0.0, 0.0, 100.0, 50.0));
}

#[test]
fn origin_bottom_uses_bottom_offset() {
    let cfg = GridConfig::builder()
        .column_width(100.0)
        .origin_top(false)
        .build();
    let stamp = (
        Size::new(100.0, 30.0),
        Offset {
            left: 0.0,
            top: 500.0,
            right: 200.0,
            bottom: 10.0,
        },
    );
    let items = vec![ItemBox::new("a", 100.0, 20.0), ItemBox::new("b", 100.0, 20.0)];
    let out = pack(&items, &ContainerBox::new(300.0, 0.0), &cfg, &[stamp]).unwrap();
    assert_eq!(out.col_ys[0], 40.0);
    let a = out.get(&"a").unwrap();
    assert_eq!((a.x, a.y), (100.0, 0.0));
    // top-left conversion flips y against the content height
    let rects = out.to_top_left(300.0, true, false);
    assert_eq!(rects[0].y, out.height - 20.0);
}
