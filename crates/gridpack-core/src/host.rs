//! Host collaborators: element measurement and element enumeration.
//!
//! The engine never touches a document directly. A host (a browser binding,
//! a UI toolkit, a test fixture) implements [`Measure`] and [`ElementSource`]
//! for its own element key type. [`Scene`] is a serde-friendly in-memory host
//! used by the CLI and the tests.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::model::{ContainerBox, Offset, Size};

/// Element measurement.
pub trait Measure<K> {
    /// Container geometry. `None` means there is no container to lay out.
    fn container(&self) -> Option<ContainerBox>;
    /// Outer size (margins included). `None` when the element is gone.
    fn outer_size(&self, key: &K) -> Option<Size>;
    /// Offset relative to the container's inner box.
    fn offset(&self, key: &K) -> Option<Offset>;
    /// Outer size of the first element matching `selector`.
    fn query_size(&self, selector: &str) -> Option<Size>;
    /// Per-item column span override.
    fn column_span(&self, _key: &K) -> Option<usize> {
        None
    }
}

/// Element enumeration.
pub trait ElementSource<K> {
    /// Candidate children of the container, in document order.
    fn children(&self) -> Vec<K>;
    fn matches(&self, key: &K, selector: &str) -> bool;
    fn attribute(&self, key: &K, name: &str) -> Option<String>;
    /// Text content of the first descendant of `key` matching `selector`.
    fn text(&self, _key: &K, _selector: &str) -> Option<String> {
        None
    }
}

/// Both collaborators at once; implemented for every type that provides them.
pub trait Host<K>: Measure<K> + ElementSource<K> {}

impl<K, T: Measure<K> + ElementSource<K> + ?Sized> Host<K> for T {}

/// One element of a [`Scene`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SceneElement {
    /// Unique key; also matched by `#key` selectors.
    pub key: String,
    #[serde(default)]
    pub tag: Option<String>,
    #[serde(default)]
    pub classes: Vec<String>,
    pub width: f64,
    pub height: f64,
    /// Left offset inside the container (used for stamps).
    #[serde(default)]
    pub left: f64,
    /// Top offset inside the container (used for stamps).
    #[serde(default)]
    pub top: f64,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    /// Text of descendants, keyed by the selector that finds them.
    #[serde(default)]
    pub texts: BTreeMap<String, String>,
    /// Column span override read by `GridLayout`.
    #[serde(default)]
    pub span: Option<usize>,
}

impl SceneElement {
    pub fn new(key: impl Into<String>, width: f64, height: f64) -> Self {
        Self {
            key: key.into(),
            width,
            height,
            ..Default::default()
        }
    }

    pub fn class(mut self, c: impl Into<String>) -> Self {
        self.classes.push(c.into());
        self
    }

    pub fn at(mut self, left: f64, top: f64) -> Self {
        self.left = left;
        self.top = top;
        self
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn text(mut self, selector: impl Into<String>, value: impl Into<String>) -> Self {
        self.texts.insert(selector.into(), value.into());
        self
    }

    fn matches_simple(&self, sel: &str) -> bool {
        if sel == "*" {
            return true;
        }
        // compound selectors such as `div.item.big`
        let mut rest = sel;
        let tag_end = rest.find(['.', '#']).unwrap_or(rest.len());
        let tag = &rest[..tag_end];
        if !tag.is_empty() && self.tag.as_deref() != Some(tag) {
            return false;
        }
        rest = &rest[tag_end..];
        while !rest.is_empty() {
            let kind = rest.as_bytes()[0];
            let body = &rest[1..];
            let end = body.find(['.', '#']).unwrap_or(body.len());
            let name = &body[..end];
            let ok = match kind {
                b'.' => self.classes.iter().any(|c| c == name),
                b'#' => self.key == name,
                _ => false,
            };
            if !ok || name.is_empty() {
                return false;
            }
            rest = &body[end..];
        }
        true
    }

    /// Selector match; supports `*`, `tag`, `.class`, `#key`, compounds and comma lists.
    pub fn matches(&self, selector: &str) -> bool {
        selector
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .any(|s| self.matches_simple(s))
    }
}

/// In-memory container plus children.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Scene {
    pub container: ContainerBox,
    pub elements: Vec<SceneElement>,
}

impl Scene {
    pub fn new(width: f64) -> Self {
        Self {
            container: ContainerBox::new(width, 0.0),
            elements: Vec::new(),
        }
    }

    pub fn with(mut self, el: SceneElement) -> Self {
        self.elements.push(el);
        self
    }

    pub fn push(&mut self, el: SceneElement) {
        self.elements.push(el);
    }

    pub fn element(&self, key: &str) -> Option<&SceneElement> {
        self.elements.iter().find(|e| e.key == key)
    }

    pub fn element_mut(&mut self, key: &str) -> Option<&mut SceneElement> {
        self.elements.iter_mut().find(|e| e.key == key)
    }

    /// Removes an element; returns true if it existed.
    pub fn remove(&mut self, key: &str) -> bool {
        let before = self.elements.len();
        self.elements.retain(|e| e.key != key);
        before != self.elements.len()
    }
}

impl Measure<String> for Scene {
    fn container(&self) -> Option<ContainerBox> {
        Some(self.container)
    }

    fn outer_size(&self, key: &String) -> Option<Size> {
        self.element(key).map(|e| Size::new(e.width, e.height))
    }

    fn offset(&self, key: &String) -> Option<Offset> {
        let e = self.element(key)?;
        Some(Offset {
            left: e.left,
            top: e.top,
            right: self.container.inner_width - e.left - e.width,
            bottom: self.container.inner_height - e.top - e.height,
        })
    }

    fn query_size(&self, selector: &str) -> Option<Size> {
        self.elements
            .iter()
            .find(|e| e.matches(selector))
            .map(|e| Size::new(e.width, e.height))
    }

    fn column_span(&self, key: &String) -> Option<usize> {
        self.element(key)?.span
    }
}

impl ElementSource<String> for Scene {
    fn children(&self) -> Vec<String> {
        self.elements.iter().map(|e| e.key.clone()).collect()
    }

    fn matches(&self, key: &String, selector: &str) -> bool {
        self.element(key).is_some_and(|e| e.matches(selector))
    }

    fn attribute(&self, key: &String, name: &str) -> Option<String> {
        self.element(key)?.attributes.get(name).cloned()
    }

    fn text(&self, key: &String, selector: &str) -> Option<String> {
        self.element(key)?.texts.get(selector).cloned()
    }
}
