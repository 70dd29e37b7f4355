//! Diff entries and their viewed toggles.

use std::rc::Rc;

use pritty::{ContentRegion, Subscription, ViewedToggle};
use wasm_bindgen::JsCast;
use web_sys::{Element, HtmlElement};

use crate::host::{Context, first};
use crate::observer::{self, Watch};

/// One file's diff entry.
#[derive(Clone)]
pub struct DomRegion {
    element: Element,
    ctx: Rc<Context>,
}

impl DomRegion {
    pub(crate) fn new(element: Element, ctx: Rc<Context>) -> Self {
        Self { element, ctx }
    }

    pub fn element(&self) -> &Element {
        &self.element
    }

    fn header(&self) -> Option<Element> {
        first(&self.element, &self.ctx.selectors.region_header)
    }

    fn expand_all_button(&self) -> Option<Element> {
        first(&self.element, &self.ctx.selectors.expand_all)
    }
}

impl ContentRegion for DomRegion {
    type Toggle = DomToggle;

    fn expand_path(&self) -> Option<String> {
        self.expand_all_button()?.get_attribute("data-file-path")
    }

    fn header_text(&self) -> Option<String> {
        self.header()?.text_content()
    }

    fn viewed_toggle(&self) -> Option<DomToggle> {
        first(&self.element, &self.ctx.selectors.viewed_toggle).map(|element| DomToggle { element })
    }

    fn is_collapsed(&self) -> bool {
        let header_collapsed = self
            .header()
            .is_some_and(|header| header.class_name().contains("collapsed"));
        header_collapsed
            || first(&self.element, &self.ctx.selectors.region_details)
                .is_some_and(|details| details.has_attribute("hidden"))
    }

    fn expand(&self) -> bool {
        self.header()
            .and_then(|header| first(&header, "button"))
            .is_some_and(|button| click(&button))
    }

    fn expand_all(&self) -> bool {
        self.expand_all_button().is_some_and(|button| click(&button))
    }

    fn observe_subtree(&self, on_change: Box<dyn Fn()>) -> Subscription {
        observer::observe(&self.element, Watch::ChildList, move |_| on_change())
            .unwrap_or_else(|err| {
                log::debug!("cannot observe diff entry: {err:?}");
                Subscription::inert()
            })
    }
}

/// A region's "Viewed" button.
#[derive(Clone)]
pub struct DomToggle {
    element: Element,
}

impl ViewedToggle for DomToggle {
    fn is_pressed(&self) -> bool {
        self.element.get_attribute("aria-pressed").as_deref() == Some("true")
    }

    fn activate(&self) {
        click(&self.element);
    }
}

fn click(element: &Element) -> bool {
    match element.dyn_ref::<HtmlElement>() {
        Some(element) => {
            element.click();
            true
        }
        None => false,
    }
}
