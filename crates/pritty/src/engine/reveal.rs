//! Lazy reveal of a file's diff after a click in the tree.

use std::mem;

use log::{debug, trace};

use super::Shared;
use crate::core::host::{ContentRegion, Host};
use crate::core::locate::locate_region;
use crate::core::subscription::ExpiringWatch;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RevealOutcome {
    /// No content region is rendered for the path.
    NotRendered,
    /// "Expand all lines" was already available and has been triggered.
    ExpandedAll,
    /// Watching the region for "expand all lines" to appear.
    Waiting,
}

impl<H: Host> Shared<H> {
    /// Expands a collapsed region, then triggers its "expand all lines"
    /// affordance, waiting for it to render if needed. The wait is abandoned
    /// silently at the configured timeout: a diff with nothing hidden never
    /// grows one.
    pub(super) fn reveal(&self, path: &str) -> RevealOutcome {
        let Some(region) = locate_region(&self.host, path) else {
            trace!("no region rendered for `{path}`");
            return RevealOutcome::NotRendered;
        };
        if region.is_collapsed() && !region.expand() {
            debug!("region for `{path}` is collapsed without an expand affordance");
        }
        // A repeated reveal replaces the earlier watch, so expand-all fires once.
        self.cancel_reveal(path);
        if region.expand_all() {
            return RevealOutcome::ExpandedAll;
        }

        let probe = region.clone();
        let watch = ExpiringWatch::start(
            &self.host,
            self.config.reveal_timeout(),
            |notify| region.observe_subtree(notify),
            move || probe.expand_all(),
        );
        let mut reveals = self.reveals.borrow_mut();
        reveals.retain(|(_, watch)| watch.is_pending());
        reveals.push((path.to_owned(), watch));
        RevealOutcome::Waiting
    }

    fn cancel_reveal(&self, path: &str) {
        let earlier: Vec<_> = {
            let mut reveals = self.reveals.borrow_mut();
            let (earlier, rest): (Vec<_>, Vec<_>) = mem::take(&mut *reveals)
                .into_iter()
                .partition(|(watched, _)| watched == path);
            *reveals = rest;
            earlier
        };
        for (_, watch) in earlier {
            watch.cancel();
        }
    }
}
