//! File tree items and the checkboxes injected into them.

use std::fmt;
use std::rc::Rc;

use log::debug;
use pritty::{PathHints, Subscription, SyncCheckbox, TreeNode};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Element, Event, HtmlInputElement};

use crate::host::{CHECKBOX_CLASS, Context, closest, elements, first};
use crate::observer;

/// A rendered `treeitem`.
#[derive(Clone)]
pub struct DomItem {
    element: Element,
    ctx: Rc<Context>,
}

impl DomItem {
    pub(crate) fn new(element: Element, ctx: Rc<Context>) -> Self {
        Self { element, ctx }
    }

    pub fn element(&self) -> &Element {
        &self.element
    }

    /// Nearest enclosing item of `element`, excluding itself.
    fn owner_of(&self, element: &Element) -> Option<Element> {
        element
            .parent_element()
            .and_then(|parent| closest(&parent, &self.ctx.selectors.tree_item))
    }

    /// First match below the item that is not inside a nested item. The
    /// item's own label comes before any nested item in document order.
    fn own(&self, selector: &str) -> Option<Element> {
        first(&self.element, selector).filter(|found| {
            closest(found, &self.ctx.selectors.tree_item).as_ref() == Some(&self.element)
        })
    }

    fn label(&self) -> Option<Element> {
        self.own(&self.ctx.selectors.item_label)
    }

    fn insert_checkbox(
        &self,
        label: &Element,
        on_activate: Box<dyn Fn()>,
    ) -> Result<DomCheckbox, JsValue> {
        let input: HtmlInputElement = self.ctx.document.create_element("input")?.dyn_into()?;
        input.set_type("checkbox");
        input.set_class_name(CHECKBOX_CLASS);
        input.set_attribute("aria-label", "Mark as viewed")?;
        let listener: Subscription = observer::listen(&input, "click", move |event: Event| {
            // The tree's own click handling must not see checkbox clicks.
            event.stop_propagation();
            on_activate();
        })?;
        label.insert_before(&input, label.first_child().as_ref())?;
        self.ctx.track(input.clone(), listener);
        Ok(DomCheckbox { input })
    }
}

impl PartialEq for DomItem {
    fn eq(&self, other: &Self) -> bool {
        self.element == other.element
    }
}

impl fmt::Debug for DomItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("DomItem").field(&self.element.id()).finish()
    }
}

impl TreeNode for DomItem {
    type Checkbox = DomCheckbox;

    fn is_group(&self) -> bool {
        self.element.has_attribute("aria-expanded")
    }

    fn parent_item(&self) -> Option<Self> {
        self.owner_of(&self.element)
            .map(|element| DomItem::new(element, self.ctx.clone()))
    }

    fn child_items(&self) -> Vec<Self> {
        elements(self.element.query_selector_all(&self.ctx.selectors.tree_item))
            .into_iter()
            .filter(|nested| self.owner_of(nested).as_ref() == Some(&self.element))
            .map(|element| DomItem::new(element, self.ctx.clone()))
            .collect()
    }

    fn path_hints(&self) -> PathHints {
        let link_title = self
            .own(&self.ctx.selectors.item_link)
            .and_then(|link| link.get_attribute("title"));
        let id = self.element.get_attribute("id");
        let label_text = self.label().and_then(|label| label.text_content());
        PathHints {
            link_title,
            id,
            label_text,
        }
    }

    fn checkbox(&self) -> Option<DomCheckbox> {
        let label = self.label()?;
        let input = first(&label, &format!(":scope > .{CHECKBOX_CLASS}"))?;
        input
            .dyn_into::<HtmlInputElement>()
            .ok()
            .map(|input| DomCheckbox { input })
    }

    fn attach_checkbox(&self, on_activate: Box<dyn Fn()>) -> Option<DomCheckbox> {
        let label = self.label()?;
        self.insert_checkbox(&label, on_activate)
            .map_err(|err| debug!("checkbox not inserted: {err:?}"))
            .ok()
    }
}

#[derive(Clone)]
pub struct DomCheckbox {
    input: HtmlInputElement,
}

impl DomCheckbox {
    pub fn input(&self) -> &HtmlInputElement {
        &self.input
    }
}

impl SyncCheckbox for DomCheckbox {
    fn is_checked(&self) -> bool {
        self.input.checked()
    }

    fn set_checked(&self, checked: bool) {
        self.input.set_checked(checked);
    }

    fn is_indeterminate(&self) -> bool {
        self.input.indeterminate()
    }

    fn set_indeterminate(&self, indeterminate: bool) {
        self.input.set_indeterminate(indeterminate);
    }
}
