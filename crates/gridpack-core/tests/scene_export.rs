use gridpack_core::prelude::*;
use gridpack_core::{ElementSource, Measure, to_json_hash};

fn sample() -> Scene {
    let mut big = SceneElement::new("a", 100.0, 50.0).class("item").class("big");
    big.tag = Some("div".into());
    Scene::new(300.0)
        .with(big)
        .with(SceneElement::new("b", 100.0, 20.0).class("item"))
        .with(SceneElement::new("sizer", 100.0, 0.0).class("grid-sizer"))
}

#[test]
fn selectors_match_tags_classes_and_keys() {
    let s = sample();
    let a = "a".to_string();
    let b = "b".to_string();
    assert!(s.matches(&a, "*"));
    assert!(s.matches(&a, ".item"));
    assert!(s.matches(&a, "div.item.big"));
    assert!(s.matches(&a, "#a"));
    assert!(!s.matches(&b, ".big"));
    assert!(!s.matches(&b, "div"));
    assert!(s.matches(&b, ".big, .item"));
    assert!(!s.matches(&b, ""));
    assert!(!s.matches(&"nope".to_string(), "*"));
}

#[test]
fn scene_measures_elements() {
    let s = sample().with(SceneElement::new("st", 60.0, 40.0).at(30.0, 10.0));
    let st = "st".to_string();
    assert_eq!(s.outer_size(&st), Some(Size::new(60.0, 40.0)));
    let off = s.offset(&st).unwrap();
    assert_eq!((off.left, off.top), (30.0, 10.0));
    assert_eq!(off.right, 300.0 - 30.0 - 60.0);
    assert_eq!(s.query_size(".grid-sizer"), Some(Size::new(100.0, 0.0)));
    assert_eq!(s.query_size(".missing"), None);
    assert_eq!(s.children().len(), 4);
}

#[test]
fn scene_deserializes_from_json() {
    let s: Scene = serde_json::from_str(
        r#"{
            "container": { "innerWidth": 300, "innerHeight": 0, "parentInnerWidth": 480 },
            "elements": [
                { "key": "a", "width": 100, "height": 50, "classes": ["item"],
                  "attributes": { "data-weight": "4" } },
                { "key": "b", "width": 200, "height": 20, "span": 2 }
            ]
        }"#,
    )
    .unwrap();
    assert_eq!(s.container.parent_inner_width, Some(480.0));
    assert_eq!(s.attribute(&"a".to_string(), "data-weight").as_deref(), Some("4"));
    assert_eq!(s.column_span(&"b".to_string()), Some(2));
}

#[test]
fn remove_reports_whether_element_existed() {
    let mut s = sample();
    assert!(s.remove("b"));
    assert!(!s.remove("b"));
    assert_eq!(s.children(), vec!["a".to_string(), "sizer".to_string()]);
}

#[test]
fn json_export_lists_items_in_order() {
    let items = vec![ItemBox::new("a", 100.0, 50.0), ItemBox::new("b", 100.0, 20.0)];
    let cfg = GridConfig::builder().column_width(100.0).fit_width(true).build();
    let out = pack(&items, &ContainerBox::new(300.0, 0.0), &cfg, &[]).unwrap();
    let v = to_json(&out);
    assert_eq!(v["width"], 200.0);
    assert_eq!(v["height"], 50.0);
    assert_eq!(v["columns"], 3);
    assert_eq!(v["columnWidth"], 100.0);
    assert_eq!(v["items"][1]["key"], "b");
    assert_eq!(v["items"][1]["x"], 100.0);

    let h = to_json_hash(&out);
    assert_eq!(h["items"]["a"]["height"], 50.0);
}

#[test]
fn json_export_without_fit_width_has_null_width() {
    let items = vec![ItemBox::new("a", 100.0, 50.0)];
    let cfg = GridConfig::builder().column_width(100.0).build();
    let out = pack(&items, &ContainerBox::new(300.0, 0.0), &cfg, &[]).unwrap();
    assert!(to_json(&out)["width"].is_null());
}

#[test]
fn stats_summarize_occupancy() {
    let items = vec![
        ItemBox::new("a", 100.0, 50.0),
        ItemBox::new("b", 100.0, 50.0),
        ItemBox::new("c", 100.0, 25.0),
    ];
    let cfg = GridConfig::builder().column_width(100.0).build();
    let out = pack(&items, &ContainerBox::new(300.0, 0.0), &cfg, &[]).unwrap();
    let stats = out.stats();
    assert_eq!(stats.num_items, 3);
    assert_eq!(stats.width, 300.0);
    assert_eq!(stats.used_area, 12_500.0);
    assert!((stats.occupancy - 12_500.0 / 15_000.0).abs() < 1e-9);
    assert!(stats.summary().contains("Columns: 3"));
}
