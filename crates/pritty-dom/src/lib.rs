//! Browser side of pritty: implements the engine's host traits over the live
//! document and exposes the wasm entry points.
//!
//! - `host` - [`DomHost`], tying selectors, observers and handles together
//! - `tree` / `diff` - element handles for tree items and diff entries
//! - `observer` - mutation observers, listeners and timers as `Subscription`s
//! - `bootstrap` - page gate, navigation re-init, the running instance

mod bootstrap;
pub mod config;
mod diff;
pub mod host;
mod observer;
mod tree;

use wasm_bindgen::prelude::*;

pub use config::{DomConfig, Selectors};
pub use diff::{DomRegion, DomToggle};
pub use host::{CHECKBOX_CLASS, DomHost, ENHANCED_ATTR};
pub use tree::{DomCheckbox, DomItem};

#[wasm_bindgen(start)]
pub fn start() {
    bootstrap::install_logging(&DomConfig::default());
    bootstrap::launch();
}

/// Restarts with a (partial) configuration object.
#[wasm_bindgen(js_name = startWith)]
pub fn start_with(config: JsValue) -> Result<(), JsValue> {
    let config: DomConfig = if config.is_undefined() || config.is_null() {
        DomConfig::default()
    } else {
        serde_wasm_bindgen::from_value(config)?
    };
    bootstrap::install_logging(&config);
    bootstrap::shutdown();
    bootstrap::configure(config);
    bootstrap::launch();
    Ok(())
}

/// Enhances the file tree on a pull request page. Idempotent.
#[wasm_bindgen]
pub fn init() {
    let running = bootstrap::with_sync(|sync| {
        if bootstrap::on_pull_request_page() {
            sync.init();
        }
    });
    if !running {
        bootstrap::launch();
    }
}

/// Reverses `init` and stops watching for navigation. Idempotent.
#[wasm_bindgen]
pub fn destroy() {
    bootstrap::shutdown();
}
