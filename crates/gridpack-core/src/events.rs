use std::collections::BTreeMap;

/// Identifies a registered listener so it can be removed again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerId(u64);

struct Listener<E> {
    id: ListenerId,
    once: bool,
    callback: Box<dyn FnMut(&E)>,
}

/// Named publish/subscribe channel.
///
/// Listeners run in registration order. `once` listeners are dropped right
/// after their first invocation.
pub struct Emitter<E> {
    listeners: BTreeMap<String, Vec<Listener<E>>>,
    next_id: u64,
}

impl<E> Default for Emitter<E> {
    fn default() -> Self {
        Self {
            listeners: BTreeMap::new(),
            next_id: 0,
        }
    }
}

impl<E> std::fmt::Debug for Emitter<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let counts: BTreeMap<&str, usize> = self
            .listeners
            .iter()
            .map(|(k, v)| (k.as_str(), v.len()))
            .collect();
        f.debug_struct("Emitter").field("listeners", &counts).finish()
    }
}

impl<E> Emitter<E> {
    pub fn new() -> Self {
        Self::default()
    }

    fn add(&mut self, name: &str, once: bool, callback: Box<dyn FnMut(&E)>) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners
            .entry(name.to_string())
            .or_default()
            .push(Listener { id, once, callback });
        id
    }

    pub fn on(&mut self, name: &str, callback: impl FnMut(&E) + 'static) -> ListenerId {
        self.add(name, false, Box::new(callback))
    }

    pub fn once(&mut self, name: &str, callback: impl FnMut(&E) + 'static) -> ListenerId {
        self.add(name, true, Box::new(callback))
    }

    /// Removes a listener. Returns false if it was not registered under `name`.
    pub fn off(&mut self, name: &str, id: ListenerId) -> bool {
        let Some(list) = self.listeners.get_mut(name) else {
            return false;
        };
        let before = list.len();
        list.retain(|l| l.id != id);
        before != list.len()
    }

    pub fn all_off(&mut self) {
        self.listeners.clear();
    }

    pub fn listener_count(&self, name: &str) -> usize {
        self.listeners.get(name).map_or(0, Vec::len)
    }

    /// Invokes every listener registered for `name`; returns how many ran.
    pub fn emit(&mut self, name: &str, event: &E) -> usize {
        let Some(list) = self.listeners.get_mut(name) else {
            return 0;
        };
        for l in list.iter_mut() {
            (l.callback)(event);
        }
        let count = list.len();
        list.retain(|l| !l.once);
        count
    }
}

/// Event names published by `GridLayout`.
pub mod names {
    pub const LAYOUT_COMPLETE: &str = "layoutComplete";
    pub const HIDE_COMPLETE: &str = "hideComplete";
    pub const REVEAL_COMPLETE: &str = "revealComplete";
    pub const ARRANGE_COMPLETE: &str = "arrangeComplete";
    pub const REMOVE_COMPLETE: &str = "removeComplete";
}

/// Payload of every `GridLayout` event: the affected item keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridEvent<K> {
    LayoutComplete(Vec<K>),
    HideComplete(Vec<K>),
    RevealComplete(Vec<K>),
    ArrangeComplete(Vec<K>),
    RemoveComplete(Vec<K>),
}

impl<K> GridEvent<K> {
    pub fn name(&self) -> &'static str {
        match self {
            Self::LayoutComplete(_) => names::LAYOUT_COMPLETE,
            Self::HideComplete(_) => names::HIDE_COMPLETE,
            Self::RevealComplete(_) => names::REVEAL_COMPLETE,
            Self::ArrangeComplete(_) => names::ARRANGE_COMPLETE,
            Self::RemoveComplete(_) => names::REMOVE_COMPLETE,
        }
    }

    pub fn keys(&self) -> &[K] {
        match self {
            Self::LayoutComplete(k)
            | Self::HideComplete(k)
            | Self::RevealComplete(k)
            | Self::ArrangeComplete(k)
            | Self::RemoveComplete(k) => k,
        }
    }
}
