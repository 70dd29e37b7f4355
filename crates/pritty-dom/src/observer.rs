//! Browser callbacks wrapped as [`Subscription`]s.
//!
//! Each wrapper owns its `Closure`; cancelling (or dropping) the subscription
//! disconnects the observer, removes the listener or clears the timer, and
//! only then frees the closure.

use std::time::Duration;

use js_sys::Array;
use pritty::Subscription;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Event, EventTarget, MutationObserver, MutationObserverInit, MutationRecord, Node};

/// Which mutations to watch below a target.
pub(crate) enum Watch<'a> {
    /// Nodes added or removed anywhere in the subtree.
    ChildList,
    /// Changes of the named attributes anywhere in the subtree.
    Attributes(&'a [&'a str]),
}

impl Watch<'_> {
    fn init(&self) -> MutationObserverInit {
        let init = MutationObserverInit::new();
        init.set_subtree(true);
        match self {
            Watch::ChildList => init.set_child_list(true),
            Watch::Attributes(names) => {
                init.set_attributes(true);
                let filter: Array = names.iter().map(|name| JsValue::from_str(name)).collect();
                init.set_attribute_filter(&filter);
            }
        }
        init
    }
}

pub(crate) fn observe(
    target: &Node,
    watch: Watch<'_>,
    mut on_records: impl FnMut(Vec<MutationRecord>) + 'static,
) -> Result<Subscription, JsValue> {
    let closure = Closure::<dyn FnMut(Array, MutationObserver)>::new(
        move |records: Array, _observer: MutationObserver| {
            let records = records
                .iter()
                .filter_map(|record| record.dyn_into::<MutationRecord>().ok())
                .collect();
            on_records(records);
        },
    );
    let observer = MutationObserver::new(closure.as_ref().unchecked_ref())?;
    observer.observe_with_options(target, &watch.init())?;
    Ok(Subscription::new(move || {
        observer.disconnect();
        drop(closure);
    }))
}

pub(crate) fn listen(
    target: &EventTarget,
    kind: &'static str,
    handler: impl FnMut(Event) + 'static,
) -> Result<Subscription, JsValue> {
    let closure = Closure::<dyn FnMut(Event)>::new(handler);
    target.add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref())?;
    let target = target.clone();
    Ok(Subscription::new(move || {
        let _ = target.remove_event_listener_with_callback(kind, closure.as_ref().unchecked_ref());
        drop(closure);
    }))
}

/// Runs `task` on the next animation frame.
pub(crate) fn next_frame(task: Box<dyn FnOnce()>) -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let callback = Closure::<dyn FnMut()>::once_into_js(task);
    window.request_animation_frame(callback.unchecked_ref())?;
    Ok(())
}

pub(crate) fn timeout(after: Duration, task: Box<dyn FnOnce()>) -> Result<Subscription, JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let closure = Closure::<dyn FnMut()>::once(task);
    let millis = i32::try_from(after.as_millis()).unwrap_or(i32::MAX);
    let handle = window.set_timeout_with_callback_and_timeout_and_arguments_0(
        closure.as_ref().unchecked_ref(),
        millis,
    )?;
    Ok(Subscription::new(move || {
        window.clear_timeout_with_handle(handle);
        drop(closure);
    }))
}
