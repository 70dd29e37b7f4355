//! The live sync engine.
//!
//! [`TreeSync`] owns the session: the viewed-map snapshot taken at `init`,
//! the host subscriptions (pressed-state observer, tree observer, click
//! router) and any reveal watches still waiting. Callbacks handed to the host
//! hold only a `Weak` back-reference, so dropping the engine releases
//! everything.
//!
//! Single-threaded: every handler runs to completion, so `RefCell` borrows
//! are short and never held across a call into the host.

mod inject;
mod mirror;
mod observe;
mod reveal;

use std::cell::RefCell;
use std::mem;
use std::rc::Rc;

use log::debug;

use crate::config::SyncConfig;
use crate::core::host::{ClickTarget, Host, NodeOf};
use crate::core::item::Item;
use crate::core::subscription::{ExpiringWatch, Subscription};
use crate::core::tristate::{self, TriState};
use crate::core::viewed::ViewedMap;

pub use reveal::RevealOutcome;

/// Keeps a page's file tree checkboxes in sync with its viewed toggles.
pub struct TreeSync<H: Host> {
    shared: Rc<Shared<H>>,
}

pub(crate) struct Shared<H: Host> {
    host: H,
    config: SyncConfig,
    session: RefCell<Option<Session>>,
    /// Reveal watches still waiting, by file path.
    reveals: RefCell<Vec<(String, ExpiringWatch)>>,
}

struct Session {
    viewed: Rc<ViewedMap>,
    subscriptions: Vec<Subscription>,
}

impl<H: Host> TreeSync<H> {
    pub fn new(host: H) -> Self {
        Self::with_config(host, SyncConfig::default())
    }

    pub fn with_config(host: H, config: SyncConfig) -> Self {
        Self {
            shared: Rc::new(Shared {
                host,
                config,
                session: RefCell::new(None),
                reveals: RefCell::new(Vec::new()),
            }),
        }
    }

    pub fn host(&self) -> &H {
        &self.shared.host
    }

    pub fn config(&self) -> &SyncConfig {
        &self.shared.config
    }

    /// Whether `init` has run and `destroy` has not since.
    pub fn is_active(&self) -> bool {
        self.shared.session.borrow().is_some()
    }

    /// The snapshot seeding this session, if one is active.
    pub fn viewed_map(&self) -> Option<Rc<ViewedMap>> {
        self.shared
            .session
            .borrow()
            .as_ref()
            .map(|session| session.viewed.clone())
    }

    /// Enhances the tree: seeds and injects every rendered item, then starts
    /// the pressed-state observer, the tree observer and the click router.
    ///
    /// No-op when already active, when the tree already carries the
    /// enhancement marker, or when the sidebar is not rendered.
    pub fn init(&self) {
        let shared = &self.shared;
        if self.is_active() || shared.host.is_enhanced() {
            return;
        }
        if !shared.host.mark_enhanced() {
            debug!("file tree sidebar not rendered, skipping enhancement");
            return;
        }

        let viewed = Rc::new(ViewedMap::from_payload(
            shared.host.embedded_payload().as_deref(),
        ));
        debug!("seeding file tree from {} viewed entries", viewed.len());
        shared.inject_batch(shared.host.items(), &viewed);

        let mut subscriptions = vec![shared.observe_pressed()];
        subscriptions.extend(shared.observe_tree(viewed.clone()));
        subscriptions.extend(shared.route_clicks());

        *shared.session.borrow_mut() = Some(Session {
            viewed,
            subscriptions,
        });
    }

    /// Reverses `init`: releases every observer and pending reveal, removes
    /// all injected checkboxes and clears the enhancement marker.
    ///
    /// Safe to call repeatedly and without a prior `init`.
    pub fn destroy(&self) {
        let shared = &self.shared;
        let session = shared.session.borrow_mut().take();
        if let Some(session) = session {
            let count = session.subscriptions.len();
            drop(session);
            debug!("released {count} file tree subscriptions");
        }

        let reveals = mem::take(&mut *shared.reveals.borrow_mut());
        for (_, watch) in reveals {
            watch.cancel();
        }

        shared.host.remove_checkboxes();
        shared.host.clear_enhanced();
    }

    /// Attaches a checkbox to `node` unless it already has one. Returns
    /// whether a checkbox was attached.
    pub fn inject(&self, node: &NodeOf<H>, viewed: &ViewedMap) -> bool {
        self.shared.inject_reported(node, viewed)
    }

    /// User toggle of a leaf checkbox whose native state already flipped.
    pub fn toggle_leaf(&self, node: &NodeOf<H>) {
        self.shared.toggle_leaf(node);
    }

    /// User toggle of a group checkbox: checks or unchecks every leaf below.
    pub fn toggle_group(&self, node: &NodeOf<H>) {
        self.shared.toggle_group(node);
    }

    /// Mirrors a host-side viewed change into the leaf checkbox for `path`.
    /// Returns whether a checkbox was updated.
    pub fn apply_external_change(&self, path: &str, pressed: bool) -> bool {
        self.shared.apply_external_change(path, pressed)
    }

    /// Rewrites a group's checkbox from its current leaf descendants.
    pub fn recompute(&self, node: &NodeOf<H>) -> Option<TriState> {
        tristate::recompute(&Item::from_node(node.clone()))
    }

    pub fn route_click(&self, target: ClickTarget<NodeOf<H>>) {
        self.shared.route_click(target);
    }

    pub fn reveal(&self, path: &str) -> RevealOutcome {
        self.shared.reveal(path)
    }
}
