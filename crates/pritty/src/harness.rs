//! In-memory page for running the sync engine without a browser.
//!
//! Models just enough of a pull request page: a file tree of items, diff
//! regions with viewed toggles, and observers. Like the browser's mutation
//! observers, records are queued when the page changes and only delivered on
//! [`Page::flush`]; deferred tasks run after pending records. Timers use a
//! virtual clock driven by [`Page::advance`]. Clicks dispatch synchronously.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;
use std::rc::{Rc, Weak};
use std::time::Duration;

use crate::core::host::{
    ClickTarget, ContentRegion, DiffView, FileTree, PayloadSource, PressedChange, Scheduler,
    SyncCheckbox, TreeNode, ViewedToggle,
};
use crate::core::path::PathHints;
use crate::core::subscription::Subscription;
use crate::core::tristate::TriState;

/// A fake pull request page. Cloning shares the same page.
#[derive(Clone)]
pub struct Page {
    inner: Rc<PageInner>,
}

struct PageInner {
    payload: RefCell<Option<String>>,
    sidebar: Cell<bool>,
    enhanced: Cell<bool>,
    tree_rendered: Cell<bool>,
    roots: RefCell<Vec<TreeItem>>,
    regions: RefCell<Vec<Region>>,
    observers: RefCell<Vec<(u64, Observer)>>,
    records: RefCell<VecDeque<Record>>,
    idle: RefCell<VecDeque<Box<dyn FnOnce()>>>,
    timers: RefCell<Vec<Timer>>,
    now: Cell<Duration>,
    next_id: Cell<u64>,
}

#[derive(Clone)]
enum Observer {
    Additions(Rc<dyn Fn(Vec<TreeItem>)>),
    Clicks(Rc<dyn Fn(ClickTarget<TreeItem>)>),
    Pressed(Rc<dyn Fn(PressedChange<Region>)>),
    Region(Region, Rc<dyn Fn()>),
}

enum Delivery {
    Added(Vec<TreeItem>),
    Pressed(PressedChange<Region>),
    RegionChanged,
}

struct Record {
    observer: u64,
    delivery: Delivery,
}

struct Timer {
    id: u64,
    due: Duration,
    task: Box<dyn FnOnce()>,
}

impl Page {
    /// An empty page with a rendered sidebar and tree root.
    pub fn new() -> Self {
        Self {
            inner: Rc::new(PageInner {
                payload: RefCell::new(None),
                sidebar: Cell::new(true),
                enhanced: Cell::new(false),
                tree_rendered: Cell::new(true),
                roots: RefCell::new(Vec::new()),
                regions: RefCell::new(Vec::new()),
                observers: RefCell::new(Vec::new()),
                records: RefCell::new(VecDeque::new()),
                idle: RefCell::new(VecDeque::new()),
                timers: RefCell::new(Vec::new()),
                now: Cell::new(Duration::ZERO),
                next_id: Cell::new(0),
            }),
        }
    }

    // --- page setup -------------------------------------------------------

    pub fn set_payload(&self, raw: impl Into<String>) {
        *self.inner.payload.borrow_mut() = Some(raw.into());
    }

    /// Embedded payload with one `{path, markedAsViewed}` record per entry.
    pub fn set_viewed(&self, entries: &[(&str, bool)]) {
        let summaries: Vec<_> = entries
            .iter()
            .map(|(path, viewed)| serde_json::json!({ "path": path, "markedAsViewed": viewed }))
            .collect();
        let payload = serde_json::json!({
            "payload": { "pullRequestsChangesRoute": { "diffSummaries": summaries } }
        });
        self.set_payload(payload.to_string());
    }

    pub fn set_sidebar_rendered(&self, rendered: bool) {
        self.inner.sidebar.set(rendered);
    }

    pub fn set_tree_rendered(&self, rendered: bool) {
        self.inner.tree_rendered.set(rendered);
    }

    /// Whether the sidebar carries the enhancement marker.
    pub fn has_marker(&self) -> bool {
        self.inner.enhanced.get()
    }

    // --- file tree --------------------------------------------------------

    /// A detached folder labelled `name`.
    pub fn group(name: &str) -> TreeItem {
        TreeItem::new(true, PathHints::label(name), true)
    }

    /// A detached file whose link title is `path`.
    pub fn leaf(path: &str) -> TreeItem {
        TreeItem::new(false, PathHints::title(path), true)
    }

    pub fn add_group(&self, parent: Option<&TreeItem>, name: &str) -> TreeItem {
        let item = Self::group(name);
        self.attach(parent, &item);
        item
    }

    pub fn add_leaf(&self, parent: Option<&TreeItem>, path: &str) -> TreeItem {
        let item = Self::leaf(path);
        self.attach(parent, &item);
        item
    }

    /// Inserts a (possibly nested) detached item as one mutation.
    pub fn attach(&self, parent: Option<&TreeItem>, item: &TreeItem) {
        match parent {
            Some(parent) => {
                *item.data.parent.borrow_mut() = Rc::downgrade(&parent.data);
                parent.data.children.borrow_mut().push(item.clone());
            }
            None => self.inner.roots.borrow_mut().push(item.clone()),
        }
        let subtree = item.subtree();
        for node in &subtree {
            node.data.attached.set(true);
        }
        self.inner.notify(|observer| {
            matches!(observer, Observer::Additions(_)).then(|| Delivery::Added(subtree.clone()))
        });
    }

    /// Removes an item and everything below it, as collapsing a folder does.
    pub fn remove(&self, item: &TreeItem) {
        match item.parent_item() {
            Some(parent) => parent.data.children.borrow_mut().retain(|child| child != item),
            None => self.inner.roots.borrow_mut().retain(|root| root != item),
        }
        for node in item.subtree() {
            node.data.attached.set(false);
        }
    }

    /// Items currently in the tree, in document order.
    pub fn tree_items(&self) -> Vec<TreeItem> {
        let roots = self.inner.roots.borrow().clone();
        roots.iter().flat_map(TreeItem::subtree).collect()
    }

    pub fn checkbox_count(&self) -> usize {
        self.tree_items()
            .iter()
            .filter(|item| item.checkbox().is_some())
            .count()
    }

    /// Clicks an engine checkbox the way a browser does: native toggle first,
    /// then the checkbox's own listener, then the bubbling delegated click.
    /// Returns false if the item has no checkbox.
    pub fn click_checkbox(&self, item: &TreeItem) -> bool {
        let Some(checkbox) = item.checkbox() else {
            return false;
        };
        checkbox.set_indeterminate(false);
        checkbox.set_checked(!checkbox.is_checked());
        let on_activate = checkbox.data.on_activate.clone();
        on_activate();
        self.inner.dispatch_click(ClickTarget::SyncCheckbox);
        true
    }

    pub fn click_item(&self, item: &TreeItem) {
        self.inner.dispatch_click(ClickTarget::Item(item.clone()));
    }

    pub fn click_outside_items(&self) {
        self.inner.dispatch_click(ClickTarget::Outside);
    }

    // --- diff view --------------------------------------------------------

    /// An expanded region for `path` whose header shows the path and whose
    /// expand-all affordance carries it. No viewed toggle yet.
    pub fn add_region(&self, path: &str) -> Region {
        let region = Region {
            data: Rc::new(RegionData {
                header: RefCell::new(Some(path.to_owned())),
                anchor: RefCell::new(None),
                expand_path: RefCell::new(Some(path.to_owned())),
                collapsed: Cell::new(false),
                has_expand_toggle: Cell::new(true),
                expand_all_rendered: Cell::new(false),
                expand_clicks: Cell::new(0),
                expand_all_clicks: Cell::new(0),
                toggle: RefCell::new(None),
                page: Rc::downgrade(&self.inner),
            }),
        };
        self.inner.regions.borrow_mut().push(region.clone());
        region
    }

    /// Renders the region's viewed toggle.
    pub fn render_toggle(&self, region: &Region, pressed: bool) -> Toggle {
        let toggle = Toggle {
            data: Rc::new(ToggleData {
                pressed: Cell::new(pressed),
                activations: Cell::new(0),
                responsive: Cell::new(true),
                region: Rc::downgrade(&region.data),
                page: Rc::downgrade(&self.inner),
            }),
        };
        *region.data.toggle.borrow_mut() = Some(toggle.clone());
        self.inner.region_changed(region);
        toggle
    }

    /// Host-side write of the toggle's pressed attribute.
    pub fn set_pressed(&self, toggle: &Toggle, pressed: bool) {
        self.inner.write_pressed(toggle, pressed);
    }

    /// Renders the region's "expand all lines" affordance.
    pub fn render_expand_all(&self, region: &Region) {
        region.data.expand_all_rendered.set(true);
        self.inner.region_changed(region);
    }

    /// Unrelated content change inside a region.
    pub fn touch_region(&self, region: &Region) {
        self.inner.region_changed(region);
    }

    // --- scheduling -------------------------------------------------------

    /// Delivers queued mutation records, then idle tasks, until quiet.
    pub fn flush(&self) {
        loop {
            let record = self.inner.records.borrow_mut().pop_front();
            if let Some(record) = record {
                self.inner.deliver(record);
                continue;
            }
            let task = self.inner.idle.borrow_mut().pop_front();
            match task {
                Some(task) => task(),
                None => break,
            }
        }
    }

    /// Flushes, then moves the clock forward firing due timers in order.
    pub fn advance(&self, by: Duration) {
        self.flush();
        let target = self.inner.now.get() + by;
        loop {
            let next = {
                let mut timers = self.inner.timers.borrow_mut();
                let due = timers
                    .iter()
                    .enumerate()
                    .filter(|(_, timer)| timer.due <= target)
                    .min_by_key(|(_, timer)| (timer.due, timer.id))
                    .map(|(index, _)| index);
                due.map(|index| timers.remove(index))
            };
            let Some(timer) = next else { break };
            self.inner.now.set(timer.due);
            (timer.task)();
            self.flush();
        }
        self.inner.now.set(target);
    }

    pub fn pending_timers(&self) -> usize {
        self.inner.timers.borrow().len()
    }

    pub fn observer_count(&self) -> usize {
        self.inner.observers.borrow().len()
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new()
    }
}

impl PageInner {
    fn register(self: &Rc<Self>, observer: Observer) -> Subscription {
        let id = self.next_id();
        self.observers.borrow_mut().push((id, observer));
        let page = Rc::downgrade(self);
        Subscription::new(move || {
            if let Some(page) = page.upgrade() {
                page.observers.borrow_mut().retain(|(other, _)| *other != id);
            }
        })
    }

    fn next_id(&self) -> u64 {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        id
    }

    /// Queues a record for every observer interested in a change.
    fn notify(&self, interest: impl Fn(&Observer) -> Option<Delivery>) {
        let records: Vec<_> = self
            .observers
            .borrow()
            .iter()
            .filter_map(|(id, observer)| {
                interest(observer).map(|delivery| Record {
                    observer: *id,
                    delivery,
                })
            })
            .collect();
        self.records.borrow_mut().extend(records);
    }

    fn region_changed(&self, region: &Region) {
        self.notify(|observer| match observer {
            Observer::Region(watched, _) if watched == region => Some(Delivery::RegionChanged),
            _ => None,
        });
    }

    fn write_pressed(&self, toggle: &Toggle, pressed: bool) {
        toggle.data.pressed.set(pressed);
        let region = toggle.data.region.upgrade().map(|data| Region { data });
        self.notify(|observer| {
            matches!(observer, Observer::Pressed(_)).then(|| {
                Delivery::Pressed(PressedChange {
                    region: region.clone(),
                    pressed,
                })
            })
        });
    }

    /// Observers cancelled after a record was queued never see it.
    fn deliver(&self, record: Record) {
        let observer = self
            .observers
            .borrow()
            .iter()
            .find(|(id, _)| *id == record.observer)
            .map(|(_, observer)| observer.clone());
        match (observer, record.delivery) {
            (Some(Observer::Additions(callback)), Delivery::Added(items)) => callback(items),
            (Some(Observer::Pressed(callback)), Delivery::Pressed(change)) => callback(change),
            (Some(Observer::Region(_, callback)), Delivery::RegionChanged) => callback(),
            _ => {}
        }
    }

    fn dispatch_click(&self, target: ClickTarget<TreeItem>) {
        let listeners: Vec<_> = self
            .observers
            .borrow()
            .iter()
            .filter_map(|(_, observer)| match observer {
                Observer::Clicks(callback) => Some(callback.clone()),
                _ => None,
            })
            .collect();
        for listener in listeners {
            listener(target.clone());
        }
    }
}

impl PayloadSource for Page {
    fn embedded_payload(&self) -> Option<String> {
        self.inner.payload.borrow().clone()
    }
}

impl FileTree for Page {
    type Node = TreeItem;

    fn is_enhanced(&self) -> bool {
        self.inner.sidebar.get() && self.inner.enhanced.get()
    }

    fn mark_enhanced(&self) -> bool {
        if !self.inner.sidebar.get() {
            return false;
        }
        self.inner.enhanced.set(true);
        true
    }

    fn clear_enhanced(&self) {
        self.inner.enhanced.set(false);
    }

    fn items(&self) -> Vec<TreeItem> {
        self.tree_items()
    }

    fn remove_checkboxes(&self) {
        for item in self.tree_items() {
            item.data.checkbox.borrow_mut().take();
        }
    }

    fn observe_additions(&self, on_added: Box<dyn Fn(Vec<TreeItem>)>) -> Option<Subscription> {
        self.inner
            .tree_rendered
            .get()
            .then(|| self.inner.register(Observer::Additions(Rc::from(on_added))))
    }

    fn observe_clicks(
        &self,
        on_click: Box<dyn Fn(ClickTarget<TreeItem>)>,
    ) -> Option<Subscription> {
        self.inner
            .tree_rendered
            .get()
            .then(|| self.inner.register(Observer::Clicks(Rc::from(on_click))))
    }
}

impl DiffView for Page {
    type Region = Region;

    fn region_with_expand_path(&self, path: &str) -> Option<Region> {
        self.inner
            .regions
            .borrow()
            .iter()
            .find(|region| region.data.expand_path.borrow().as_deref() == Some(path))
            .cloned()
    }

    fn regions(&self) -> Vec<Region> {
        self.inner.regions.borrow().clone()
    }

    fn region_by_anchor(&self, id: &str) -> Option<Region> {
        self.inner
            .regions
            .borrow()
            .iter()
            .find(|region| region.data.anchor.borrow().as_deref() == Some(id))
            .cloned()
    }

    fn observe_pressed(&self, on_change: Box<dyn Fn(PressedChange<Region>)>) -> Subscription {
        self.inner.register(Observer::Pressed(Rc::from(on_change)))
    }
}

impl Scheduler for Page {
    fn defer(&self, task: Box<dyn FnOnce()>) {
        self.inner.idle.borrow_mut().push_back(task);
    }

    fn delay(&self, after: Duration, task: Box<dyn FnOnce()>) -> Subscription {
        let id = self.inner.next_id();
        let due = self.inner.now.get() + after;
        self.inner.timers.borrow_mut().push(Timer { id, due, task });
        let page = Rc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(page) = page.upgrade() {
                page.timers.borrow_mut().retain(|timer| timer.id != id);
            }
        })
    }
}

/// A fake tree item.
#[derive(Clone)]
pub struct TreeItem {
    data: Rc<ItemData>,
}

struct ItemData {
    group: bool,
    hints: PathHints,
    has_label: bool,
    attached: Cell<bool>,
    parent: RefCell<Weak<ItemData>>,
    children: RefCell<Vec<TreeItem>>,
    checkbox: RefCell<Option<Checkbox>>,
}

impl TreeItem {
    pub fn new(group: bool, hints: PathHints, has_label: bool) -> Self {
        Self {
            data: Rc::new(ItemData {
                group,
                hints,
                has_label,
                attached: Cell::new(false),
                parent: RefCell::new(Weak::new()),
                children: RefCell::new(Vec::new()),
                checkbox: RefCell::new(None),
            }),
        }
    }

    /// Nests `children` under a still detached item.
    pub fn with_children(self, children: impl IntoIterator<Item = TreeItem>) -> Self {
        for child in children {
            *child.data.parent.borrow_mut() = Rc::downgrade(&self.data);
            self.data.children.borrow_mut().push(child);
        }
        self
    }

    pub fn is_attached(&self) -> bool {
        self.data.attached.get()
    }

    pub fn state(&self) -> Option<TriState> {
        self.checkbox().map(|checkbox| TriState::read(&checkbox))
    }

    pub fn is_checked(&self) -> bool {
        self.checkbox().is_some_and(|checkbox| checkbox.is_checked())
    }

    /// This item followed by all its descendants, pre-order.
    fn subtree(&self) -> Vec<TreeItem> {
        let mut items = vec![self.clone()];
        for child in self.data.children.borrow().iter() {
            items.extend(child.subtree());
        }
        items
    }
}

impl PartialEq for TreeItem {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.data, &other.data)
    }
}

impl fmt::Debug for TreeItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TreeItem")
            .field("group", &self.data.group)
            .field("hints", &self.data.hints)
            .finish()
    }
}

impl TreeNode for TreeItem {
    type Checkbox = Checkbox;

    fn is_group(&self) -> bool {
        self.data.group
    }

    fn parent_item(&self) -> Option<Self> {
        self.data.parent.borrow().upgrade().map(|data| TreeItem { data })
    }

    fn child_items(&self) -> Vec<Self> {
        self.data.children.borrow().clone()
    }

    fn path_hints(&self) -> PathHints {
        self.data.hints.clone()
    }

    fn checkbox(&self) -> Option<Checkbox> {
        self.data.checkbox.borrow().clone()
    }

    fn attach_checkbox(&self, on_activate: Box<dyn Fn()>) -> Option<Checkbox> {
        if !self.data.has_label {
            return None;
        }
        let checkbox = Checkbox {
            data: Rc::new(CheckboxData {
                checked: Cell::new(false),
                indeterminate: Cell::new(false),
                on_activate: Rc::from(on_activate),
            }),
        };
        *self.data.checkbox.borrow_mut() = Some(checkbox.clone());
        Some(checkbox)
    }
}

/// A checkbox attached by the engine.
#[derive(Clone)]
pub struct Checkbox {
    data: Rc<CheckboxData>,
}

struct CheckboxData {
    checked: Cell<bool>,
    indeterminate: Cell<bool>,
    on_activate: Rc<dyn Fn()>,
}

impl SyncCheckbox for Checkbox {
    fn is_checked(&self) -> bool {
        self.data.checked.get()
    }

    fn set_checked(&self, checked: bool) {
        self.data.checked.set(checked);
    }

    fn is_indeterminate(&self) -> bool {
        self.data.indeterminate.get()
    }

    fn set_indeterminate(&self, indeterminate: bool) {
        self.data.indeterminate.set(indeterminate);
    }
}

/// A fake diff entry.
#[derive(Clone)]
pub struct Region {
    data: Rc<RegionData>,
}

struct RegionData {
    header: RefCell<Option<String>>,
    anchor: RefCell<Option<String>>,
    expand_path: RefCell<Option<String>>,
    collapsed: Cell<bool>,
    has_expand_toggle: Cell<bool>,
    expand_all_rendered: Cell<bool>,
    expand_clicks: Cell<u32>,
    expand_all_clicks: Cell<u32>,
    toggle: RefCell<Option<Toggle>>,
    page: Weak<PageInner>,
}

impl Region {
    pub fn set_header(&self, header: Option<&str>) {
        *self.data.header.borrow_mut() = header.map(str::to_owned);
    }

    pub fn set_anchor(&self, anchor: Option<&str>) {
        *self.data.anchor.borrow_mut() = anchor.map(str::to_owned);
    }

    pub fn set_expand_path(&self, path: Option<&str>) {
        *self.data.expand_path.borrow_mut() = path.map(str::to_owned);
    }

    pub fn set_collapsed(&self, collapsed: bool) {
        self.data.collapsed.set(collapsed);
    }

    pub fn set_has_expand_toggle(&self, present: bool) {
        self.data.has_expand_toggle.set(present);
    }

    pub fn expand_clicks(&self) -> u32 {
        self.data.expand_clicks.get()
    }

    pub fn expand_all_clicks(&self) -> u32 {
        self.data.expand_all_clicks.get()
    }

    pub fn toggle(&self) -> Option<Toggle> {
        self.data.toggle.borrow().clone()
    }
}

impl PartialEq for Region {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.data, &other.data)
    }
}

impl fmt::Debug for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Region")
            .field("expand_path", &self.data.expand_path.borrow())
            .finish()
    }
}

impl ContentRegion for Region {
    type Toggle = Toggle;

    fn expand_path(&self) -> Option<String> {
        self.data.expand_path.borrow().clone()
    }

    fn header_text(&self) -> Option<String> {
        self.data.header.borrow().clone()
    }

    fn viewed_toggle(&self) -> Option<Toggle> {
        self.toggle()
    }

    fn is_collapsed(&self) -> bool {
        self.data.collapsed.get()
    }

    fn expand(&self) -> bool {
        if !self.data.has_expand_toggle.get() {
            return false;
        }
        self.data.expand_clicks.set(self.data.expand_clicks.get() + 1);
        self.data.collapsed.set(!self.data.collapsed.get());
        if let Some(page) = self.data.page.upgrade() {
            page.region_changed(self);
        }
        true
    }

    fn expand_all(&self) -> bool {
        if !self.data.expand_all_rendered.get() {
            return false;
        }
        self.data.expand_all_clicks.set(self.data.expand_all_clicks.get() + 1);
        true
    }

    fn observe_subtree(&self, on_change: Box<dyn Fn()>) -> Subscription {
        match self.data.page.upgrade() {
            Some(page) => page.register(Observer::Region(self.clone(), Rc::from(on_change))),
            None => Subscription::inert(),
        }
    }
}

/// A fake viewed toggle.
#[derive(Clone)]
pub struct Toggle {
    data: Rc<ToggleData>,
}

struct ToggleData {
    pressed: Cell<bool>,
    activations: Cell<u32>,
    responsive: Cell<bool>,
    region: Weak<RegionData>,
    page: Weak<PageInner>,
}

impl Toggle {
    pub fn activations(&self) -> u32 {
        self.data.activations.get()
    }

    /// An unresponsive toggle counts activations but never changes.
    pub fn set_responsive(&self, responsive: bool) {
        self.data.responsive.set(responsive);
    }
}

impl ViewedToggle for Toggle {
    fn is_pressed(&self) -> bool {
        self.data.pressed.get()
    }

    fn activate(&self) {
        self.data.activations.set(self.data.activations.get() + 1);
        if !self.data.responsive.get() {
            return;
        }
        if let Some(page) = self.data.page.upgrade() {
            page.write_pressed(self, !self.is_pressed());
        }
    }
}
