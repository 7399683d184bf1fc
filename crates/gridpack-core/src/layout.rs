use std::collections::BTreeMap;
use std::fmt::Debug;
use std::time::Instant;

use rand::Rng;
use tracing::{debug, instrument, warn};

use crate::config::{GridConfig, LayoutMode, Measurement, SortAscending};
use crate::debounce::Debouncer;
use crate::error::{GridError, Result};
use crate::events::{Emitter, GridEvent, ListenerId};
use crate::host::Host;
use crate::model::{ItemBox, LayoutResult, Offset, Size, sanitize};
use crate::packer::{LayoutEngine, PassMetrics, build_engine, run_pass};
use crate::sort::{SortData, SortDataSpec, SortHistory, SortValue};

/// An element managed by a [`GridLayout`].
#[derive(Debug, Clone)]
pub struct Item<K> {
    pub key: K,
    /// Creation sequence number; the `original-order` sort value.
    pub id: u64,
    /// Outer size from the last measurement.
    pub size: Size,
    pub span: Option<usize>,
    /// Last assigned position, origin-relative.
    pub position: Option<(f64, f64)>,
    pub is_hidden: bool,
    /// Ignored items (stamps, for instance) are skipped by layout.
    pub is_ignored: bool,
    pub sort_data: SortData,
    generation: u64,
}

/// Handed out when an item is (re)positioned. A later reposition makes the
/// ticket stale; see [`GridLayout::transition_end`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionTicket {
    item_id: u64,
    generation: u64,
}

/// Option overrides merged into the configuration by [`GridLayout::arrange`].
#[derive(Debug, Clone, Default)]
pub struct ArrangeOptions {
    pub layout_mode: Option<LayoutMode>,
    /// `Some(None)` clears the filter.
    pub filter: Option<Option<String>>,
    pub sort_by: Option<Vec<String>>,
    pub sort_ascending: Option<SortAscending>,
}

impl ArrangeOptions {
    pub fn filter(selector: impl Into<String>) -> Self {
        Self {
            filter: Some(Some(selector.into())),
            ..Default::default()
        }
    }

    pub fn sort_by<S: Into<String>>(keys: impl IntoIterator<Item = S>) -> Self {
        Self {
            sort_by: Some(keys.into_iter().map(Into::into).collect()),
            ..Default::default()
        }
    }

    fn apply_to(self, cfg: &mut GridConfig) {
        if let Some(v) = self.layout_mode {
            cfg.layout_mode = v;
        }
        if let Some(v) = self.filter {
            cfg.filter = v;
        }
        if let Some(v) = self.sort_by {
            cfg.sort_by = v;
        }
        if let Some(v) = self.sort_ascending {
            cfg.sort_ascending = v;
        }
    }
}

/// Result of an arrange-like operation.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrangeOutcome<K> {
    pub layout: LayoutResult<K>,
    /// Items that were hidden and now match.
    pub revealed: Vec<K>,
    /// Items that were visible and no longer match.
    pub hidden: Vec<K>,
}

struct FilterSplit<K> {
    matches: Vec<K>,
    need_reveal: Vec<K>,
    need_hide: Vec<K>,
}

/// Stateful arranger: items, stamps, filtering, sorting and events around a
/// [`LayoutEngine`].
///
/// The host is passed to every operation that needs to read the document, so
/// the same `GridLayout` can be driven across host mutations.
pub struct GridLayout<K> {
    config: GridConfig,
    sorters: BTreeMap<String, SortDataSpec>,
    items: Vec<Item<K>>,
    filtered: Vec<K>,
    stamps: Vec<K>,
    sort_history: SortHistory,
    emitter: Emitter<GridEvent<K>>,
    engine: Option<Box<dyn LayoutEngine<K>>>,
    container_width: Option<f64>,
    next_id: u64,
    is_layout_inited: bool,
    debouncer: Debouncer,
}

impl<K: Clone + PartialEq + Debug + 'static> GridLayout<K> {
    /// Validates `config`, collects items from the host and applies the
    /// `stamp` option. Does not lay anything out.
    pub fn new<H: Host<K> + ?Sized>(host: &H, config: GridConfig) -> Result<Self> {
        config.validate()?;
        let sorters = parse_sorters(&config)?;
        let debouncer = Debouncer::from_millis(config.resize_debounce_ms);
        let mut grid = Self {
            config,
            sorters,
            items: Vec::new(),
            filtered: Vec::new(),
            stamps: Vec::new(),
            sort_history: SortHistory::default(),
            emitter: Emitter::new(),
            engine: None,
            container_width: None,
            next_id: 0,
            is_layout_inited: false,
            debouncer,
        };
        grid.reload_items(host);
        if let Some(sel) = grid.config.stamp.clone() {
            let keys: Vec<K> = host
                .children()
                .into_iter()
                .filter(|k| host.matches(k, &sel))
                .collect();
            grid.stamp(&keys);
        }
        Ok(grid)
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    /// Replaces the configuration. Takes effect on the next pass.
    pub fn set_config(&mut self, config: GridConfig) -> Result<()> {
        config.validate()?;
        self.sorters = parse_sorters(&config)?;
        // keep a pending resize unless the window itself changed
        if config.resize_debounce_ms != self.config.resize_debounce_ms {
            self.debouncer = Debouncer::from_millis(config.resize_debounce_ms);
        }
        self.config = config;
        Ok(())
    }

    pub fn items(&self) -> &[Item<K>] {
        &self.items
    }

    pub fn item(&self, key: &K) -> Option<&Item<K>> {
        self.items.iter().find(|it| &it.key == key)
    }

    /// Last assigned position of `key`, origin-relative. `None` when the item
    /// has not been laid out yet.
    pub fn position(&self, key: &K) -> Result<Option<(f64, f64)>> {
        self.item(key)
            .map(|it| it.position)
            .ok_or_else(|| GridError::UnknownItem(format!("{key:?}")))
    }

    /// Keys of the items matching the current filter, in layout order.
    pub fn filtered_keys(&self) -> &[K] {
        &self.filtered
    }

    pub fn stamps(&self) -> &[K] {
        &self.stamps
    }

    pub fn sort_history(&self) -> &SortHistory {
        &self.sort_history
    }

    pub fn is_layout_inited(&self) -> bool {
        self.is_layout_inited
    }

    // ---------- events ----------

    pub fn on(&mut self, name: &str, f: impl FnMut(&GridEvent<K>) + 'static) -> ListenerId {
        self.emitter.on(name, f)
    }

    pub fn once(&mut self, name: &str, f: impl FnMut(&GridEvent<K>) + 'static) -> ListenerId {
        self.emitter.once(name, f)
    }

    pub fn off(&mut self, name: &str, id: ListenerId) -> bool {
        self.emitter.off(name, id)
    }

    fn dispatch(&mut self, event: GridEvent<K>) {
        self.emitter.emit(event.name(), &event);
    }

    // ---------- items ----------

    /// Re-reads the item list from the host. Sequence ids keep counting up,
    /// so tickets issued before the reload stay stale.
    pub fn reload_items<H: Host<K> + ?Sized>(&mut self, host: &H) {
        let children = host.children();
        self.items = self.itemize(host, &children);
        for it in &mut self.items {
            it.is_ignored = self.stamps.contains(&it.key);
        }
        self.filtered = self
            .items
            .iter()
            .filter(|it| !it.is_ignored)
            .map(|it| it.key.clone())
            .collect();
        debug!(count = self.items.len(), "items reloaded");
    }

    fn itemize<H: Host<K> + ?Sized>(&mut self, host: &H, keys: &[K]) -> Vec<Item<K>> {
        let selector = self.config.item_selector.clone();
        let mut out = Vec::new();
        for key in keys {
            if let Some(sel) = &selector {
                if !host.matches(key, sel) {
                    continue;
                }
            }
            let mut item = Item {
                key: key.clone(),
                id: self.next_id,
                size: Size::default(),
                span: host.column_span(key),
                position: None,
                is_hidden: false,
                is_ignored: false,
                sort_data: SortData::new(),
                generation: 0,
            };
            self.next_id += 1;
            self.fill_sort_data(host, &mut item);
            out.push(item);
        }
        out
    }

    fn fill_sort_data<H: Host<K> + ?Sized>(&self, host: &H, item: &mut Item<K>) {
        item.sort_data.insert(
            "original-order".to_string(),
            SortValue::Number(item.id as f64),
        );
        for (name, spec) in &self.sorters {
            item.sort_data.insert(name.clone(), spec.read(host, &item.key));
        }
    }

    /// Recomputes cached sort values for `keys`, or for every item when `None`.
    pub fn update_sort_data<H: Host<K> + ?Sized>(&mut self, host: &H, keys: Option<&[K]>) {
        let mut items = std::mem::take(&mut self.items);
        for it in items
            .iter_mut()
            .filter(|it| keys.is_none_or(|ks| ks.contains(&it.key)))
        {
            self.fill_sort_data(host, it);
        }
        self.items = items;
    }

    fn item_index(&self, key: &K) -> Option<usize> {
        self.items.iter().position(|it| &it.key == key)
    }

    // ---------- stamps ----------

    /// Registers obstacles. Stamped items are ignored by layout until unstamped.
    pub fn stamp(&mut self, keys: &[K]) {
        for key in keys {
            if !self.stamps.contains(key) {
                self.stamps.push(key.clone());
            }
            self.ignore(key);
        }
    }

    pub fn unstamp(&mut self, keys: &[K]) {
        for key in keys {
            self.stamps.retain(|k| k != key);
            self.unignore(key);
        }
    }

    pub fn ignore(&mut self, key: &K) {
        if let Some(i) = self.item_index(key) {
            self.items[i].is_ignored = true;
        }
    }

    pub fn unignore(&mut self, key: &K) {
        if let Some(i) = self.item_index(key) {
            self.items[i].is_ignored = false;
        }
    }

    // ---------- layout ----------

    /// Lays out the current filtered items. The first call arranges instead,
    /// so the configured filter and sort apply.
    pub fn layout<H: Host<K> + ?Sized>(&mut self, host: &H) -> LayoutResult<K> {
        if !self.is_layout_inited {
            return self.arrange_current(host).layout;
        }
        self.relayout(host)
    }

    #[instrument(skip_all, fields(mode = ?self.config.layout_mode))]
    fn relayout<H: Host<K> + ?Sized>(&mut self, host: &H) -> LayoutResult<K> {
        let keys = self.filtered.clone();
        let result = self.reset_and_place(host, &keys);
        self.is_layout_inited = true;
        self.dispatch(GridEvent::LayoutComplete(
            result.placements.iter().map(|p| p.key.clone()).collect(),
        ));
        result
    }

    /// Resets the engine, applies stamps and places `keys`.
    fn reset_and_place<H: Host<K> + ?Sized>(&mut self, host: &H, keys: &[K]) -> LayoutResult<K> {
        let Some(container) = host.container() else {
            debug!("no container; nothing to lay out");
            self.engine = None;
            self.container_width = None;
            return LayoutResult::empty();
        };
        // measure everything before placing anything
        let boxes = self.measure_items(host, keys);
        let stamps = self.measure_stamps(host);
        let metrics = PassMetrics {
            container,
            column_width: self.resolve(host, self.config.column_width.as_ref()),
            gutter: self.resolve(host, self.config.gutter.as_ref()),
            first_item_width: boxes.first().map_or(0.0, |b| b.size.width),
        };
        self.container_width = Some(self.effective_width(&container));

        let mut engine = build_engine::<K>(&self.config, &metrics);
        let result = run_pass(engine.as_mut(), &boxes, &stamps);
        self.engine = Some(engine);
        self.record_positions(&result);
        debug!(
            items = result.placements.len(),
            height = result.height,
            columns = result.columns,
            "layout pass complete"
        );
        result
    }

    /// Places `keys` on top of the current engine state.
    fn place_more<H: Host<K> + ?Sized>(&mut self, host: &H, keys: &[K]) -> LayoutResult<K> {
        let boxes = self.measure_items(host, keys);
        let Some(engine) = self.engine.as_mut() else {
            return self.reset_and_place(host, keys);
        };
        let placements = boxes.iter().map(|b| engine.place(b)).collect();
        let (width, height) = engine.container_size();
        let result = LayoutResult {
            placements,
            width,
            height,
            columns: engine.columns(),
            column_width: engine.column_width(),
            col_ys: engine.col_ys(),
        };
        self.record_positions(&result);
        result
    }

    fn measure_items<H: Host<K> + ?Sized>(&mut self, host: &H, keys: &[K]) -> Vec<ItemBox<K>> {
        let mut boxes = Vec::with_capacity(keys.len());
        for key in keys {
            let Some(i) = self.item_index(key) else {
                warn!(?key, "unknown item skipped");
                continue;
            };
            if self.items[i].is_ignored {
                continue;
            }
            let Some(size) = host.outer_size(key) else {
                warn!(?key, "item has no measurable element; skipped");
                continue;
            };
            let size = size.sanitized();
            self.items[i].size = size;
            boxes.push(ItemBox {
                key: key.clone(),
                size,
                span: self.items[i].span,
            });
        }
        boxes
    }

    fn measure_stamps<H: Host<K> + ?Sized>(&self, host: &H) -> Vec<(Size, Offset)> {
        self.stamps
            .iter()
            .filter_map(|k| match (host.outer_size(k), host.offset(k)) {
                (Some(size), Some(offset)) => Some((size, offset)),
                _ => {
                    warn!(key = ?k, "stamp has no measurable element; skipped");
                    None
                }
            })
            .collect()
    }

    fn resolve<H: Host<K> + ?Sized>(&self, host: &H, m: Option<&Measurement>) -> f64 {
        match m {
            None => 0.0,
            Some(Measurement::Fixed(v)) => sanitize(*v),
            Some(Measurement::Selector(sel)) => {
                host.query_size(sel).map_or(0.0, |s| sanitize(s.width))
            }
        }
    }

    fn effective_width(&self, container: &crate::model::ContainerBox) -> f64 {
        if self.config.fit_width && self.config.layout_mode == LayoutMode::Masonry {
            container
                .parent_inner_width
                .unwrap_or(container.inner_width)
        } else {
            container.inner_width
        }
    }

    fn record_positions(&mut self, result: &LayoutResult<K>) {
        for p in &result.placements {
            if let Some(i) = self.item_index(&p.key) {
                let it = &mut self.items[i];
                it.position = Some((p.x, p.y));
                it.generation += 1;
            }
        }
    }

    // ---------- arrange ----------

    /// Merges `opts` into the configuration, then filters, sorts and lays out.
    pub fn arrange<H: Host<K> + ?Sized>(
        &mut self,
        host: &H,
        opts: ArrangeOptions,
    ) -> Result<ArrangeOutcome<K>> {
        let mut cfg = self.config.clone();
        opts.apply_to(&mut cfg);
        self.set_config(cfg)?;
        Ok(self.arrange_current(host))
    }

    fn arrange_current<H: Host<K> + ?Sized>(&mut self, host: &H) -> ArrangeOutcome<K> {
        let (revealed, hidden) = self.apply_filter(host);
        self.sort();
        let layout = self.relayout(host);
        self.dispatch(GridEvent::ArrangeComplete(self.filtered.clone()));
        ArrangeOutcome {
            layout,
            revealed,
            hidden,
        }
    }

    /// Filters every item into `filtered` and updates hidden flags.
    fn apply_filter<H: Host<K> + ?Sized>(&mut self, host: &H) -> (Vec<K>, Vec<K>) {
        let all: Vec<K> = self.items.iter().map(|it| it.key.clone()).collect();
        let split = self.filter(host, &all);
        self.filtered = split.matches;
        self.hide_reveal(split.need_reveal, split.need_hide)
    }

    fn filter<H: Host<K> + ?Sized>(&self, host: &H, keys: &[K]) -> FilterSplit<K> {
        let selector = self
            .config
            .filter
            .as_deref()
            .filter(|s| !s.trim().is_empty() && s.trim() != "*");
        let mut split = FilterSplit {
            matches: Vec::new(),
            need_reveal: Vec::new(),
            need_hide: Vec::new(),
        };
        for key in keys {
            let Some(it) = self.item(key) else { continue };
            if it.is_ignored {
                continue;
            }
            let is_match = selector.is_none_or(|sel| host.matches(key, sel));
            if is_match {
                split.matches.push(key.clone());
                if it.is_hidden {
                    split.need_reveal.push(key.clone());
                }
            } else if !it.is_hidden {
                split.need_hide.push(key.clone());
            }
        }
        split
    }

    fn hide_reveal(&mut self, reveal: Vec<K>, hide: Vec<K>) -> (Vec<K>, Vec<K>) {
        for key in &reveal {
            if let Some(i) = self.item_index(key) {
                self.items[i].is_hidden = false;
            }
        }
        for key in &hide {
            if let Some(i) = self.item_index(key) {
                self.items[i].is_hidden = true;
            }
        }
        self.dispatch(GridEvent::HideComplete(hide.clone()));
        self.dispatch(GridEvent::RevealComplete(reveal.clone()));
        (reveal, hide)
    }

    fn sort(&mut self) {
        if self.config.sort_by.is_empty() {
            return;
        }
        self.sort_history.apply(&self.config.sort_by);
        let mut ordered: Vec<(SortData, K)> = self
            .filtered
            .iter()
            .filter_map(|k| self.item(k).map(|it| (it.sort_data.clone(), k.clone())))
            .collect();
        let history = &self.sort_history;
        let ascending = &self.config.sort_ascending;
        ordered.sort_by(|a, b| history.compare(&a.0, &b.0, ascending));
        self.filtered = ordered.into_iter().map(|(_, k)| k).collect();
    }

    /// Assigns random sort values and lays out in that order. Before the
    /// first layout the configured filter is applied as well.
    pub fn shuffle_with<H: Host<K> + ?Sized, R: Rng>(
        &mut self,
        host: &H,
        rng: &mut R,
    ) -> LayoutResult<K> {
        if !self.is_layout_inited {
            self.apply_filter(host);
        }
        for it in &mut self.items {
            it.sort_data
                .insert("random".to_string(), SortValue::Number(rng.r#gen::<f64>()));
        }
        self.config.sort_by = vec!["random".to_string()];
        self.sort();
        self.relayout(host)
    }

    pub fn shuffle<H: Host<K> + ?Sized>(&mut self, host: &H) -> LayoutResult<K> {
        self.shuffle_with(host, &mut rand::thread_rng())
    }

    // ---------- adding and removing ----------

    /// Adds elements after the existing items and places only them,
    /// continuing from the current column state.
    pub fn appended<H: Host<K> + ?Sized>(&mut self, host: &H, keys: &[K]) -> ArrangeOutcome<K> {
        let new_items = self.itemize(host, keys);
        if new_items.is_empty() {
            return ArrangeOutcome {
                layout: LayoutResult::empty(),
                revealed: Vec::new(),
                hidden: Vec::new(),
            };
        }
        let new_keys: Vec<K> = new_items.iter().map(|it| it.key.clone()).collect();
        self.items.extend(new_items);
        let split = self.filter(host, &new_keys);
        let (_, hidden) = self.hide_reveal(Vec::new(), split.need_hide);
        let layout = self.place_more(host, &split.matches);
        self.filtered.extend(split.matches.iter().cloned());
        ArrangeOutcome {
            layout,
            revealed: split.matches,
            hidden,
        }
    }

    /// Adds elements before the existing items and lays everything out again.
    pub fn prepended<H: Host<K> + ?Sized>(&mut self, host: &H, keys: &[K]) -> ArrangeOutcome<K> {
        let new_items = self.itemize(host, keys);
        if new_items.is_empty() {
            return ArrangeOutcome {
                layout: LayoutResult::empty(),
                revealed: Vec::new(),
                hidden: Vec::new(),
            };
        }
        let new_keys: Vec<K> = new_items.iter().map(|it| it.key.clone()).collect();
        let mut items = new_items;
        items.append(&mut self.items);
        self.items = items;
        let split = self.filter(host, &new_keys);
        let (_, hidden) = self.hide_reveal(Vec::new(), split.need_hide);
        let mut filtered = split.matches.clone();
        filtered.append(&mut self.filtered);
        self.filtered = filtered;
        let layout = self.relayout(host);
        ArrangeOutcome {
            layout,
            revealed: split.matches,
            hidden,
        }
    }

    /// Adds elements and re-arranges everything, so filter and sort apply.
    pub fn insert<H: Host<K> + ?Sized>(&mut self, host: &H, keys: &[K]) -> ArrangeOutcome<K> {
        let new_items = self.itemize(host, keys);
        let new_keys: Vec<K> = new_items.iter().map(|it| it.key.clone()).collect();
        self.items.extend(new_items);
        let mut outcome = self.arrange_current(host);
        outcome
            .revealed
            .extend(new_keys.into_iter().filter(|k| self.filtered.contains(k)));
        outcome
    }

    /// Forgets items. No relayout happens; call [`layout`](Self::layout) after.
    pub fn remove(&mut self, keys: &[K]) -> Vec<K> {
        let mut removed = Vec::new();
        for key in keys {
            if let Some(i) = self.item_index(key) {
                removed.push(self.items.remove(i).key);
            }
            self.filtered.retain(|k| k != key);
            self.stamps.retain(|k| k != key);
        }
        self.dispatch(GridEvent::RemoveComplete(removed.clone()));
        removed
    }

    // ---------- resize ----------

    /// True when the container width differs from the one used last pass.
    pub fn needs_resize_layout<H: Host<K> + ?Sized>(&self, host: &H) -> bool {
        let now = host.container().map(|c| self.effective_width(&c));
        now != self.container_width
    }

    /// Relayout if resizing is enabled and the width changed.
    pub fn resize<H: Host<K> + ?Sized>(&mut self, host: &H) -> Option<LayoutResult<K>> {
        if self.config.resize && self.is_layout_inited && self.needs_resize_layout(host) {
            Some(self.relayout(host))
        } else {
            None
        }
    }

    /// Records a resize notification; the relayout waits for [`poll_resize`](Self::poll_resize).
    pub fn request_resize(&mut self, now: Instant) {
        if self.config.resize {
            self.debouncer.request(now);
        }
    }

    /// Runs the coalesced resize once the debounce window has passed.
    pub fn poll_resize<H: Host<K> + ?Sized>(
        &mut self,
        host: &H,
        now: Instant,
    ) -> Option<LayoutResult<K>> {
        if self.debouncer.poll(now) {
            self.resize(host)
        } else {
            None
        }
    }

    // ---------- transitions ----------

    /// Ticket for the item's current position, if it has been positioned.
    pub fn ticket(&self, key: &K) -> Option<TransitionTicket> {
        let it = self.item(key)?;
        it.position?;
        Some(TransitionTicket {
            item_id: it.id,
            generation: it.generation,
        })
    }

    /// Acknowledges the end of a position transition. Returns false when the
    /// item has been repositioned (or removed) since the ticket was issued.
    pub fn transition_end(&self, ticket: TransitionTicket) -> bool {
        self.items
            .iter()
            .any(|it| it.id == ticket.item_id && it.generation == ticket.generation)
    }
}

fn parse_sorters(cfg: &GridConfig) -> Result<BTreeMap<String, SortDataSpec>> {
    cfg.get_sort_data
        .iter()
        .map(|(name, spec)| Ok((name.clone(), spec.parse::<SortDataSpec>()?)))
        .collect()
}
