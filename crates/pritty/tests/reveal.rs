//! Click routing and lazy reveal of a file's diff.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use pritty::harness::{Page, Region, TreeItem};
use pritty::{ContentRegion, ExpiringWatch, RevealOutcome, SyncConfig, TreeSync, WatchOutcome};

fn page_with_file(path: &str) -> (Page, TreeItem, TreeItem, Region) {
    let page = Page::new();
    let folder = page.add_group(None, "src");
    let file = page.add_leaf(Some(&folder), path);
    let region = page.add_region(path);
    (page, folder, file, region)
}

#[test]
fn file_click_expands_a_collapsed_region_then_expands_all_once() {
    let (page, _folder, file, region) = page_with_file("src/c.ts");
    region.set_collapsed(true);
    let sync = TreeSync::new(page.clone());
    sync.init();

    page.click_item(&file);
    assert_eq!(region.expand_clicks(), 1);
    assert!(!region.is_collapsed());
    assert_eq!(region.expand_all_clicks(), 0);

    page.render_expand_all(&region);
    page.flush();
    assert_eq!(region.expand_all_clicks(), 1);

    // The watch disconnected after firing.
    page.render_expand_all(&region);
    page.advance(Duration::from_secs(5));
    assert_eq!(region.expand_all_clicks(), 1);
    assert_eq!(page.observer_count(), 3);
    assert_eq!(page.pending_timers(), 0);
}

#[test]
fn unrelated_region_changes_keep_the_watch_waiting() {
    let (page, _folder, file, region) = page_with_file("src/c.ts");
    let sync = TreeSync::new(page.clone());
    sync.init();

    page.click_item(&file);
    page.touch_region(&region);
    page.advance(Duration::from_millis(1_000));
    assert_eq!(region.expand_all_clicks(), 0);
    assert_eq!(page.observer_count(), 4);

    page.render_expand_all(&region);
    page.flush();
    assert_eq!(region.expand_all_clicks(), 1);
}

#[test]
fn watch_gives_up_silently_at_the_deadline() {
    let (page, _folder, file, region) = page_with_file("src/c.ts");
    let sync = TreeSync::new(page.clone());
    sync.init();

    page.click_item(&file);
    page.advance(Duration::from_millis(2_999));
    assert_eq!(page.observer_count(), 4);
    page.advance(Duration::from_millis(1));
    assert_eq!(page.observer_count(), 3);
    assert_eq!(page.pending_timers(), 0);

    page.render_expand_all(&region);
    page.flush();
    assert_eq!(region.expand_all_clicks(), 0);
}

#[test]
fn reveal_timeout_is_configurable() {
    let (page, _folder, file, region) = page_with_file("src/c.ts");
    let config = SyncConfig {
        reveal_timeout_ms: 500,
    };
    let sync = TreeSync::with_config(page.clone(), config);
    sync.init();

    page.click_item(&file);
    page.advance(Duration::from_millis(500));
    page.render_expand_all(&region);
    page.flush();
    assert_eq!(region.expand_all_clicks(), 0);
}

#[test]
fn reveal_outcomes() {
    let (page, _folder, _file, region) = page_with_file("src/c.ts");
    let sync = TreeSync::new(page.clone());

    assert_eq!(sync.reveal(""), RevealOutcome::NotRendered);
    assert_eq!(sync.reveal("src/missing.ts"), RevealOutcome::NotRendered);
    assert_eq!(sync.reveal("src/c.ts"), RevealOutcome::Waiting);

    page.render_expand_all(&region);
    assert_eq!(sync.reveal("src/c.ts"), RevealOutcome::ExpandedAll);
    assert_eq!(region.expand_all_clicks(), 1);

    // The immediate trigger replaced the earlier watch.
    page.flush();
    assert_eq!(region.expand_all_clicks(), 1);
    assert_eq!(page.pending_timers(), 0);
}

#[test]
fn clicking_a_file_twice_expands_all_once() {
    let (page, _folder, file, region) = page_with_file("src/c.ts");
    let sync = TreeSync::new(page.clone());
    sync.init();

    page.click_item(&file);
    page.click_item(&file);
    assert_eq!(page.observer_count(), 4);
    assert_eq!(page.pending_timers(), 1);

    page.render_expand_all(&region);
    page.advance(Duration::from_secs(5));
    assert_eq!(region.expand_all_clicks(), 1);
    assert_eq!(page.observer_count(), 3);
    assert_eq!(page.pending_timers(), 0);
}

#[test]
fn reveal_falls_back_to_the_anchor_identifier() {
    let page = Page::new();
    let region = page.add_region("src/d.ts");
    region.set_expand_path(None);
    region.set_header(None);
    region.set_anchor(Some("src/d.ts"));
    region.set_collapsed(true);
    let sync = TreeSync::new(page.clone());

    assert_eq!(sync.reveal("src/d.ts"), RevealOutcome::Waiting);
    assert_eq!(region.expand_clicks(), 1);
}

#[test]
fn collapsed_region_without_expand_toggle_still_waits() {
    let (page, _folder, _file, region) = page_with_file("src/c.ts");
    region.set_collapsed(true);
    region.set_has_expand_toggle(false);
    let sync = TreeSync::new(page.clone());

    assert_eq!(sync.reveal("src/c.ts"), RevealOutcome::Waiting);
    assert_eq!(region.expand_clicks(), 0);
    assert!(region.is_collapsed());
}

#[test]
fn folder_checkbox_and_outside_clicks_do_not_reveal() {
    let (page, folder, file, region) = page_with_file("src/c.ts");
    region.set_collapsed(true);
    page.render_expand_all(&region);
    let sync = TreeSync::new(page.clone());
    sync.init();

    page.click_item(&folder);
    page.click_checkbox(&file);
    page.click_outside_items();
    page.flush();

    assert_eq!(region.expand_clicks(), 0);
    assert_eq!(region.expand_all_clicks(), 0);
    assert_eq!(page.observer_count(), 3);
}

#[test]
fn expiring_watch_settles_once() {
    let page = Page::new();
    let region = page.add_region("a.rs");
    let probes = Rc::new(Cell::new(0));
    let ready = Rc::new(Cell::new(false));

    let watch = ExpiringWatch::start(
        &page,
        Duration::from_millis(100),
        |notify| region.observe_subtree(notify),
        {
            let probes = probes.clone();
            let ready = ready.clone();
            move || {
                probes.set(probes.get() + 1);
                ready.get()
            }
        },
    );
    assert!(watch.is_pending());

    page.touch_region(&region);
    page.flush();
    assert_eq!(probes.get(), 1);
    assert!(watch.is_pending());

    ready.set(true);
    page.touch_region(&region);
    page.touch_region(&region);
    page.flush();
    assert_eq!(probes.get(), 2);
    assert_eq!(watch.outcome(), Some(WatchOutcome::Fired));
    assert_eq!(page.pending_timers(), 0);

    watch.cancel();
    assert_eq!(watch.outcome(), Some(WatchOutcome::Fired));
}

#[test]
fn expiring_watch_expires_or_cancels() {
    let page = Page::new();
    let region = page.add_region("a.rs");

    let expiring = ExpiringWatch::start(
        &page,
        Duration::from_millis(100),
        |notify| region.observe_subtree(notify),
        || true,
    );
    page.advance(Duration::from_millis(100));
    assert_eq!(expiring.outcome(), Some(WatchOutcome::Expired));

    let cancelled = ExpiringWatch::start(
        &page,
        Duration::from_millis(100),
        |notify| region.observe_subtree(notify),
        || true,
    );
    cancelled.cancel();
    assert_eq!(cancelled.outcome(), Some(WatchOutcome::Cancelled));
    assert_eq!(page.observer_count(), 0);
    assert_eq!(page.pending_timers(), 0);

    page.touch_region(&region);
    page.advance(Duration::from_secs(1));
    assert_eq!(cancelled.outcome(), Some(WatchOutcome::Cancelled));
}
