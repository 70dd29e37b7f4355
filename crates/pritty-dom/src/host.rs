//! [`DomHost`]: the engine's host capabilities over the live document.

use std::cell::RefCell;
use std::mem;
use std::rc::Rc;
use std::time::Duration;

use log::{debug, warn};
use pritty::{
    ClickTarget, DiffView, FileTree, PayloadSource, PressedChange, Scheduler, Subscription,
};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, Event, HtmlInputElement, MutationRecord, Node, NodeList};

use crate::config::Selectors;
use crate::diff::DomRegion;
use crate::observer::{self, Watch};
use crate::tree::DomItem;

/// Marker attribute on the sidebar while the tree is enhanced.
pub const ENHANCED_ATTR: &str = "data-pritty-tree-enhanced";
/// Class of every injected checkbox.
pub const CHECKBOX_CLASS: &str = "pritty-tree-checkbox";

/// Shared by the host and every handle it hands out.
pub(crate) struct Context {
    pub(crate) document: Document,
    pub(crate) selectors: Selectors,
    /// Injected checkboxes with their click listeners. The listeners capture
    /// item handles, so an entry lives until its input leaves the document
    /// or `remove_checkboxes` runs.
    checkboxes: RefCell<Vec<(HtmlInputElement, Subscription)>>,
}

impl Context {
    /// Also releases checkboxes whose items the page re-rendered away.
    pub(crate) fn track(&self, input: HtmlInputElement, listener: Subscription) {
        let detached: Vec<_> = {
            let mut checkboxes = self.checkboxes.borrow_mut();
            let (connected, detached): (Vec<_>, Vec<_>) = mem::take(&mut *checkboxes)
                .into_iter()
                .partition(|(tracked, _)| tracked.is_connected());
            *checkboxes = connected;
            checkboxes.push((input, listener));
            detached
        };
        if !detached.is_empty() {
            debug!("released {} detached tree checkboxes", detached.len());
        }
    }

    fn tracked(&self) -> usize {
        self.checkboxes.borrow().len()
    }
}

#[derive(Clone)]
pub struct DomHost {
    ctx: Rc<Context>,
}

impl DomHost {
    pub fn new(document: Document, selectors: Selectors) -> Self {
        Self {
            ctx: Rc::new(Context {
                document,
                selectors,
                checkboxes: RefCell::new(Vec::new()),
            }),
        }
    }

    /// Host over the current window's document.
    pub fn from_window(selectors: Selectors) -> Option<Self> {
        let document = web_sys::window()?.document()?;
        Some(Self::new(document, selectors))
    }

    pub fn document(&self) -> &Document {
        &self.ctx.document
    }

    pub fn selectors(&self) -> &Selectors {
        &self.ctx.selectors
    }

    /// Injected checkboxes whose click listeners are still held.
    pub fn tracked_checkboxes(&self) -> usize {
        self.ctx.tracked()
    }

    fn sidebar(&self) -> Option<Element> {
        self.document()
            .query_selector(&self.selectors().sidebar)
            .ok()
            .flatten()
    }

    fn tree_root(&self) -> Option<Element> {
        self.document()
            .query_selector(&self.selectors().tree_root)
            .ok()
            .flatten()
    }

    /// The region around `element`, else its parent element.
    fn enclosing_region(&self, element: &Element) -> Option<DomRegion> {
        closest(element, &self.selectors().region)
            .or_else(|| element.parent_element())
            .map(|element| DomRegion::new(element, self.ctx.clone()))
    }

    /// Narrowest known container of the diff entries.
    fn diff_area(&self) -> Option<Node> {
        self.selectors()
            .diff_areas
            .iter()
            .find_map(|selector| self.document().query_selector(selector).ok().flatten())
            .map(Node::from)
            .or_else(|| self.document().body().map(Node::from))
    }
}

impl PayloadSource for DomHost {
    fn embedded_payload(&self) -> Option<String> {
        self.document()
            .query_selector(&self.selectors().embedded_data)
            .ok()
            .flatten()?
            .text_content()
    }
}

impl FileTree for DomHost {
    type Node = DomItem;

    fn is_enhanced(&self) -> bool {
        self.sidebar()
            .is_some_and(|sidebar| sidebar.has_attribute(ENHANCED_ATTR))
    }

    fn mark_enhanced(&self) -> bool {
        self.sidebar()
            .is_some_and(|sidebar| sidebar.set_attribute(ENHANCED_ATTR, "true").is_ok())
    }

    fn clear_enhanced(&self) {
        if let Some(sidebar) = self.sidebar() {
            let _ = sidebar.remove_attribute(ENHANCED_ATTR);
        }
    }

    fn items(&self) -> Vec<DomItem> {
        elements(self.document().query_selector_all(&self.selectors().tree_item))
            .into_iter()
            .map(|element| DomItem::new(element, self.ctx.clone()))
            .collect()
    }

    fn remove_checkboxes(&self) {
        let tracked = mem::take(&mut *self.ctx.checkboxes.borrow_mut());
        for (input, listener) in tracked {
            drop(listener);
            input.remove();
        }
        // Left behind by an earlier instance on the same page.
        let selector = format!(".{CHECKBOX_CLASS}");
        for orphan in elements(self.document().query_selector_all(&selector)) {
            orphan.remove();
        }
    }

    fn observe_additions(&self, on_added: Box<dyn Fn(Vec<DomItem>)>) -> Option<Subscription> {
        let root = self.tree_root()?;
        let ctx = self.ctx.clone();
        let subscription = observer::observe(&root, Watch::ChildList, move |records| {
            let items = added_items(&records, &ctx.selectors.tree_item);
            if !items.is_empty() {
                on_added(
                    items
                        .into_iter()
                        .map(|element| DomItem::new(element, ctx.clone()))
                        .collect(),
                );
            }
        });
        subscription
            .map_err(|err| warn!("cannot observe the file tree: {err:?}"))
            .ok()
    }

    fn observe_clicks(&self, on_click: Box<dyn Fn(ClickTarget<DomItem>)>) -> Option<Subscription> {
        let root = self.tree_root()?;
        let ctx = self.ctx.clone();
        let subscription = observer::listen(&root, "click", move |event: Event| {
            let target = event
                .target()
                .and_then(|target| target.dyn_into::<Element>().ok());
            on_click(classify_click(target, &ctx));
        });
        subscription
            .map_err(|err| warn!("cannot listen for file tree clicks: {err:?}"))
            .ok()
    }
}

impl DiffView for DomHost {
    type Region = DomRegion;

    /// Compares attribute values directly, so paths never need CSS escaping.
    fn region_with_expand_path(&self, path: &str) -> Option<DomRegion> {
        elements(self.document().query_selector_all(&self.selectors().expand_all))
            .into_iter()
            .find(|button| button.get_attribute("data-file-path").as_deref() == Some(path))
            .and_then(|button| closest(&button, &self.selectors().region))
            .map(|element| DomRegion::new(element, self.ctx.clone()))
    }

    fn regions(&self) -> Vec<DomRegion> {
        elements(self.document().query_selector_all(&self.selectors().region))
            .into_iter()
            .map(|element| DomRegion::new(element, self.ctx.clone()))
            .collect()
    }

    /// Scans headers rather than regions, so a header outside any
    /// recognised region still resolves to its parent.
    fn region_with_header(&self, path: &str) -> Option<DomRegion> {
        elements(self.document().query_selector_all(&self.selectors().region_header))
            .into_iter()
            .find(|header| header.text_content().is_some_and(|text| text.contains(path)))
            .and_then(|header| self.enclosing_region(&header))
    }

    fn region_by_anchor(&self, id: &str) -> Option<DomRegion> {
        let anchor = self.document().get_element_by_id(id)?;
        self.enclosing_region(&anchor)
    }

    fn observe_pressed(&self, on_change: Box<dyn Fn(PressedChange<DomRegion>)>) -> Subscription {
        let Some(area) = self.diff_area() else {
            warn!("no diff area to observe, viewed toggles will not sync back");
            return Subscription::inert();
        };
        let ctx = self.ctx.clone();
        let subscription = observer::observe(
            &area,
            Watch::Attributes(&["aria-pressed"]),
            move |records| {
                for record in records {
                    let Some(toggle) = record
                        .target()
                        .and_then(|node| node.dyn_into::<Element>().ok())
                    else {
                        continue;
                    };
                    if !toggle
                        .matches(&ctx.selectors.viewed_toggle)
                        .unwrap_or(false)
                    {
                        continue;
                    }
                    let pressed = toggle.get_attribute("aria-pressed").as_deref() == Some("true");
                    let region = closest(&toggle, &ctx.selectors.region)
                        .map(|element| DomRegion::new(element, ctx.clone()));
                    on_change(PressedChange { region, pressed });
                }
            },
        );
        subscription.unwrap_or_else(|err| {
            warn!("cannot observe viewed toggles: {err:?}");
            Subscription::inert()
        })
    }
}

impl Scheduler for DomHost {
    fn defer(&self, task: Box<dyn FnOnce()>) {
        if let Err(err) = observer::next_frame(task) {
            debug!("could not defer to the next frame: {err:?}");
        }
    }

    fn delay(&self, after: Duration, task: Box<dyn FnOnce()>) -> Subscription {
        observer::timeout(after, task).unwrap_or_else(|err| {
            debug!("could not start a timer: {err:?}");
            Subscription::inert()
        })
    }
}

fn classify_click(target: Option<Element>, ctx: &Rc<Context>) -> ClickTarget<DomItem> {
    let Some(target) = target else {
        return ClickTarget::Outside;
    };
    if target.class_list().contains(CHECKBOX_CLASS) {
        return ClickTarget::SyncCheckbox;
    }
    match closest(&target, &ctx.selectors.tree_item) {
        Some(item) => ClickTarget::Item(DomItem::new(item, ctx.clone())),
        None => ClickTarget::Outside,
    }
}

/// Every added element that is an item, plus all items nested in it.
fn added_items(records: &[MutationRecord], item_selector: &str) -> Vec<Element> {
    let mut items = Vec::new();
    for record in records {
        for node in nodes(&record.added_nodes()) {
            let Ok(element) = node.dyn_into::<Element>() else {
                continue;
            };
            if element.matches(item_selector).unwrap_or(false) {
                items.push(element.clone());
            }
            items.extend(elements(element.query_selector_all(item_selector)));
        }
    }
    items
}

pub(crate) fn closest(element: &Element, selector: &str) -> Option<Element> {
    element.closest(selector).ok().flatten()
}

pub(crate) fn first(element: &Element, selector: &str) -> Option<Element> {
    element.query_selector(selector).ok().flatten()
}

fn nodes(list: &NodeList) -> Vec<Node> {
    (0..list.length()).filter_map(|index| list.get(index)).collect()
}

/// Elements of a `querySelectorAll` result; an invalid selector yields none.
pub(crate) fn elements(list: Result<NodeList, JsValue>) -> Vec<Element> {
    match list {
        Ok(list) => nodes(&list)
            .into_iter()
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .collect(),
        Err(err) => {
            debug!("selector query failed: {err:?}");
            Vec::new()
        }
    }
}
