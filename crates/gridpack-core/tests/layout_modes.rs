use gridpack_core::prelude::*;

fn pos(r: &LayoutResult<&'static str>, key: &'static str) -> (f64, f64) {
    let p = r.get(&key).expect("placed");
    (p.x, p.y)
}

#[test]
fn fit_rows_wraps_on_overflow() {
    let cfg = GridConfig::builder().layout_mode(LayoutMode::FitRows).build();
    let items = vec![
        ItemBox::new("a", 100.0, 50.0),
        ItemBox::new("b", 150.0, 20.0),
        ItemBox::new("c", 100.0, 30.0),
    ];
    let out = pack(&items, &ContainerBox::new(300.0, 0.0), &cfg, &[]).unwrap();
    assert_eq!(pos(&out, "a"), (0.0, 0.0));
    assert_eq!(pos(&out, "b"), (100.0, 0.0));
    // new row starts below the tallest item so far
    assert_eq!(pos(&out, "c"), (0.0, 50.0));
    assert_eq!(out.height, 80.0);
    assert_eq!(out.columns, 1);
}

#[test]
fn fit_rows_counts_gutter_between_items() {
    let cfg = GridConfig::builder()
        .layout_mode(LayoutMode::FitRows)
        .gutter(10.0)
        .build();
    let items = vec![
        ItemBox::new("a", 100.0, 10.0),
        ItemBox::new("b", 100.0, 10.0),
        ItemBox::new("c", 100.0, 10.0),
    ];
    let out = pack(&items, &ContainerBox::new(300.0, 0.0), &cfg, &[]).unwrap();
    assert_eq!(pos(&out, "b"), (110.0, 0.0));
    assert_eq!(pos(&out, "c"), (0.0, 10.0));
}

#[test]
fn fit_rows_never_wraps_first_item_in_row() {
    let cfg = GridConfig::builder().layout_mode(LayoutMode::FitRows).build();
    let items = vec![ItemBox::new("wide", 500.0, 10.0), ItemBox::new("b", 50.0, 10.0)];
    let out = pack(&items, &ContainerBox::new(300.0, 0.0), &cfg, &[]).unwrap();
    assert_eq!(pos(&out, "wide"), (0.0, 0.0));
    assert_eq!(pos(&out, "b"), (0.0, 10.0));
}

#[test]
fn vertical_stacks_with_alignment() {
    let cfg = GridConfig::builder()
        .layout_mode(LayoutMode::Vertical)
        .horizontal_alignment(0.5)
        .build();
    let items = vec![ItemBox::new("a", 100.0, 50.0), ItemBox::new("b", 300.0, 20.0)];
    let out = pack(&items, &ContainerBox::new(300.0, 0.0), &cfg, &[]).unwrap();
    assert_eq!(pos(&out, "a"), (100.0, 0.0));
    assert_eq!(pos(&out, "b"), (0.0, 50.0));
    assert_eq!(out.height, 70.0);
}

#[test]
fn non_masonry_modes_ignore_stamps() {
    let cfg = GridConfig::builder().layout_mode(LayoutMode::Vertical).build();
    let stamp = (Size::new(300.0, 100.0), Default::default());
    let items = vec![ItemBox::new("a", 100.0, 50.0)];
    let out = pack(&items, &ContainerBox::new(300.0, 0.0), &cfg, &[stamp]).unwrap();
    assert_eq!(pos(&out, "a"), (0.0, 0.0));
}

#[test]
fn layout_mode_parses_known_names() {
    assert_eq!("masonry".parse::<LayoutMode>().unwrap(), LayoutMode::Masonry);
    assert_eq!("fitRows".parse::<LayoutMode>().unwrap(), LayoutMode::FitRows);
    assert_eq!("fit-rows".parse::<LayoutMode>().unwrap(), LayoutMode::FitRows);
    assert_eq!("Vertical".parse::<LayoutMode>().unwrap(), LayoutMode::Vertical);
}

#[test]
fn unknown_layout_mode_is_a_config_error() {
    let err = "cellsByRow".parse::<LayoutMode>().unwrap_err();
    match err {
        GridError::UnknownLayoutMode(name) => assert_eq!(name, "cellsByRow"),
        other => panic!("unexpected error: {other}"),
    }
    assert!(serde_json::from_str::<GridConfig>(r#"{"layoutMode":"packery"}"#).is_err());
}
