use std::cmp::Ordering;

use gridpack_core::SortAscending;
use gridpack_core::host::{Scene, SceneElement};
use gridpack_core::sort::{SortData, SortDataSpec, SortHistory, SortParser, SortSource, SortValue};

fn key(k: &str) -> String {
    k.to_string()
}

#[test]
fn spec_parses_attribute_and_selector_forms() {
    let spec: SortDataSpec = "[data-weight] parseFloat".parse().unwrap();
    assert_eq!(spec.source, SortSource::Attribute("data-weight".into()));
    assert_eq!(spec.parser, Some(SortParser::ParseFloat));

    let spec: SortDataSpec = ".name".parse().unwrap();
    assert_eq!(spec.source, SortSource::Text(".name".into()));
    assert_eq!(spec.parser, None);

    assert!("".parse::<SortDataSpec>().is_err());
    assert!("[n] toUpper".parse::<SortDataSpec>().is_err());
}

#[test]
fn values_are_read_through_the_host() {
    let scene = Scene::new(300.0)
        .with(
            SceneElement::new("a", 10.0, 10.0)
                .attr("data-weight", "12.5kg")
                .attr("data-rank", "42px")
                .text(".name", "Beta"),
        )
        .with(SceneElement::new("b", 10.0, 10.0).attr("data-rank", "n/a"));

    let weight: SortDataSpec = "[data-weight] parseFloat".parse().unwrap();
    let rank: SortDataSpec = "[data-rank] parseInt".parse().unwrap();
    let name: SortDataSpec = ".name".parse().unwrap();

    assert_eq!(weight.read(&scene, &key("a")), SortValue::Number(12.5));
    assert_eq!(rank.read(&scene, &key("a")), SortValue::Number(42.0));
    assert_eq!(name.read(&scene, &key("a")), SortValue::Text("Beta".into()));
    assert_eq!(weight.read(&scene, &key("b")), SortValue::Missing);
    assert_eq!(rank.read(&scene, &key("b")), SortValue::Missing);
    assert_eq!(name.read(&scene, &key("missing")), SortValue::Missing);
}

#[test]
fn missing_sorts_before_numbers_before_text() {
    let missing = SortValue::Missing;
    let one = SortValue::Number(1.0);
    let two = SortValue::Number(2.0);
    let text = SortValue::Text("a".into());
    assert_eq!(missing.compare(&one), Ordering::Less);
    assert_eq!(one.compare(&two), Ordering::Less);
    assert_eq!(two.compare(&text), Ordering::Less);
    assert_eq!(text.compare(&text.clone()), Ordering::Equal);
}

#[test]
fn history_prepends_new_keys_once() {
    let mut h = SortHistory::default();
    assert_eq!(h.keys(), ["original-order"]);
    h.apply(&["weight".to_string()]);
    assert_eq!(h.keys(), ["weight", "original-order"]);
    h.apply(&["weight".to_string()]);
    assert_eq!(h.keys(), ["weight", "original-order"]);
    h.apply(&["name".to_string()]);
    assert_eq!(h.keys(), ["name", "weight", "original-order"]);
    h.apply(&[]);
    assert_eq!(h.keys().len(), 3);
}

fn data(pairs: &[(&str, SortValue)]) -> SortData {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

#[test]
fn history_breaks_ties_with_older_keys() {
    let mut h = SortHistory::default();
    h.apply(&["group".to_string()]);
    let a = data(&[
        ("group", SortValue::Number(1.0)),
        ("original-order", SortValue::Number(1.0)),
    ]);
    let b = data(&[
        ("group", SortValue::Number(1.0)),
        ("original-order", SortValue::Number(0.0)),
    ]);
    assert_eq!(h.compare(&a, &b, &SortAscending::All(true)), Ordering::Greater);

    let per_key = SortAscending::PerKey([("original-order".to_string(), false)].into());
    assert_eq!(h.compare(&a, &b, &per_key), Ordering::Less);
}

#[test]
fn parse_float_reads_the_numeric_prefix() {
    let cases = [
        ("12.5kg", SortValue::Number(12.5)),
        ("  -3.25 px", SortValue::Number(-3.25)),
        (".5em", SortValue::Number(0.5)),
        ("7.", SortValue::Number(7.0)),
        ("1e3x", SortValue::Number(1000.0)),
        ("2E-2", SortValue::Number(0.02)),
        ("4e", SortValue::Number(4.0)),
        ("5e+", SortValue::Number(5.0)),
        ("+8", SortValue::Number(8.0)),
        ("abc", SortValue::Missing),
        (".", SortValue::Missing),
        ("-", SortValue::Missing),
        ("1e999", SortValue::Missing),
    ];
    let spec: SortDataSpec = "[data-v] parseFloat".parse().unwrap();
    for (raw, expected) in cases {
        let scene = Scene::new(100.0).with(SceneElement::new("a", 1.0, 1.0).attr("data-v", raw));
        assert_eq!(spec.read(&scene, &key("a")), expected, "input {raw:?}");
    }
}

#[test]
fn parse_float_handles_long_values() {
    let mut raw = "9".repeat(20);
    raw.push_str(&"x".repeat(200_000));
    let scene = Scene::new(100.0).with(SceneElement::new("a", 1.0, 1.0).attr("data-v", raw));
    let spec: SortDataSpec = "[data-v] parseFloat".parse().unwrap();
    assert_eq!(
        spec.read(&scene, &key("a")),
        SortValue::Number(99_999_999_999_999_999_999.0)
    );
}
