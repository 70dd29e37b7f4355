//! Page-level lifecycle: one engine per page, re-initialized after SPA
//! navigation swaps the sidebar out.
//!
//! State lives in `thread_local!`s; wasm is single-threaded and the browser
//! owns the event loop, so there is nowhere else to keep it.

use std::cell::RefCell;
use std::rc::Rc;

use log::{debug, info, warn};
use pritty::core::page::is_pull_request_path;
use pritty::{FileTree, Subscription, TreeSync};
use web_sys::Node;

use crate::config::DomConfig;
use crate::host::DomHost;
use crate::observer::{self, Watch};

struct App {
    sync: Rc<TreeSync<DomHost>>,
    navigation: Option<Subscription>,
}

thread_local! {
    static CONFIG: RefCell<DomConfig> = RefCell::new(DomConfig::default());
    static APP: RefCell<Option<App>> = const { RefCell::new(None) };
}

pub(crate) fn install_logging(config: &DomConfig) {
    console_error_panic_hook::set_once();
    // Already installed on a second call; the level then stays as first set.
    if console_log::init_with_level(config.level()).is_err() {
        log::set_max_level(config.level().to_level_filter());
    }
}

pub(crate) fn configure(config: DomConfig) {
    CONFIG.with(|current| *current.borrow_mut() = config);
}

pub(crate) fn on_pull_request_page() -> bool {
    web_sys::window()
        .and_then(|window| window.location().pathname().ok())
        .is_some_and(|path| is_pull_request_path(&path))
}

/// Builds the engine and starts watching for navigation. No-op if running.
pub(crate) fn launch() {
    if APP.with(|app| app.borrow().is_some()) {
        return;
    }
    let config = CONFIG.with(|config| config.borrow().clone());
    let Some(host) = DomHost::from_window(config.selectors) else {
        warn!("no document, file tree sync disabled");
        return;
    };
    let body = host.document().body();
    let sync = Rc::new(TreeSync::with_config(host, config.sync));
    let navigation = body.and_then(|body| watch_navigation(&body, &sync));

    APP.with(|app| {
        *app.borrow_mut() = Some(App {
            sync: sync.clone(),
            navigation,
        })
    });

    if on_pull_request_page() {
        sync.init();
        info!("file tree sync started");
    } else {
        debug!("not a pull request page, waiting for navigation");
    }
}

/// Stops navigation tracking and reverses `init`.
pub(crate) fn shutdown() {
    let app = APP.with(|app| app.borrow_mut().take());
    if let Some(app) = app {
        drop(app.navigation);
        app.sync.destroy();
        debug!("file tree sync stopped");
    }
}

pub(crate) fn with_sync(action: impl FnOnce(&TreeSync<DomHost>)) -> bool {
    let sync = APP.with(|app| app.borrow().as_ref().map(|app| app.sync.clone()));
    match sync {
        Some(sync) => {
            action(&sync);
            true
        }
        None => false,
    }
}

/// Re-runs `init` once a pull request page's sidebar shows up without the
/// marker, either for the first time or after being replaced.
fn watch_navigation(body: &Node, sync: &Rc<TreeSync<DomHost>>) -> Option<Subscription> {
    let sync = Rc::downgrade(sync);
    let subscription = observer::observe(body, Watch::ChildList, move |_| {
        let Some(sync) = sync.upgrade() else { return };
        if !on_pull_request_page() || sync.host().is_enhanced() {
            return;
        }
        if sync.is_active() {
            debug!("file tree replaced, re-initializing");
            sync.destroy();
        }
        sync.init();
    });
    subscription
        .map_err(|err| warn!("cannot watch for navigation: {err:?}"))
        .ok()
}
