//! End-to-end sync scenarios against the in-memory page.

use pritty::harness::{Page, TreeItem};
use pritty::{TreeSync, TriState, ViewedToggle};

/// `src/` holding `src/a.ts` (viewed) and `src/b.ts` (not viewed).
fn two_file_page() -> (Page, TreeItem, TreeItem, TreeItem) {
    let page = Page::new();
    page.set_viewed(&[("src/a.ts", true), ("src/b.ts", false)]);
    let src = page.add_group(None, "src");
    let a = page.add_leaf(Some(&src), "src/a.ts");
    let b = page.add_leaf(Some(&src), "src/b.ts");
    (page, src, a, b)
}

#[test]
fn init_seeds_leaves_and_aggregates_groups() {
    let (page, src, a, b) = two_file_page();
    let sync = TreeSync::new(page.clone());
    sync.init();
    page.flush();

    assert!(sync.is_active());
    assert!(page.has_marker());
    assert_eq!(page.checkbox_count(), 3);
    assert_eq!(a.state(), Some(TriState::Checked));
    assert_eq!(b.state(), Some(TriState::Unchecked));
    assert_eq!(src.state(), Some(TriState::Mixed));
}

#[test]
fn host_side_viewed_change_reaches_the_tree() {
    let (page, src, _a, b) = two_file_page();
    let sync = TreeSync::new(page.clone());
    sync.init();
    page.flush();

    let region = page.add_region("src/b.ts");
    let toggle = page.render_toggle(&region, false);
    page.set_pressed(&toggle, true);
    page.flush();

    assert!(b.is_checked());
    assert_eq!(src.state(), Some(TriState::Checked));
}

#[test]
fn group_toggle_unchecks_a_fully_viewed_folder() {
    let page = Page::new();
    page.set_viewed(&[("src/a.ts", true), ("src/b.ts", true)]);
    let src = page.add_group(None, "src");
    let a = page.add_leaf(Some(&src), "src/a.ts");
    let b = page.add_leaf(Some(&src), "src/b.ts");
    let toggles: Vec<_> = ["src/a.ts", "src/b.ts"]
        .into_iter()
        .map(|path| page.render_toggle(&page.add_region(path), true))
        .collect();

    let sync = TreeSync::new(page.clone());
    sync.init();
    page.flush();
    assert_eq!(src.state(), Some(TriState::Checked));

    assert!(page.click_checkbox(&src));
    assert_eq!(src.state(), Some(TriState::Unchecked));
    assert!(!a.is_checked());
    assert!(!b.is_checked());

    page.flush();
    for toggle in &toggles {
        assert_eq!(toggle.activations(), 1);
        assert!(!toggle.is_pressed());
    }
    assert_eq!(src.state(), Some(TriState::Unchecked));
    assert!(!a.is_checked() && !b.is_checked());
}

#[test]
fn group_toggle_checks_a_partially_viewed_folder() {
    let (page, src, a, b) = two_file_page();
    let toggle_a = page.render_toggle(&page.add_region("src/a.ts"), true);
    let toggle_b = page.render_toggle(&page.add_region("src/b.ts"), false);
    let sync = TreeSync::new(page.clone());
    sync.init();
    page.flush();

    page.click_checkbox(&src);
    page.flush();

    assert_eq!(toggle_a.activations(), 0);
    assert_eq!(toggle_b.activations(), 1);
    assert!(toggle_b.is_pressed());
    assert!(a.is_checked() && b.is_checked());
    assert_eq!(src.state(), Some(TriState::Checked));
}

#[test]
fn group_toggle_activates_each_unviewed_toggle_once() {
    let page = Page::new();
    page.set_viewed(&[("lib/a.rs", true)]);
    let lib = page.add_group(None, "lib");
    let paths = ["lib/a.rs", "lib/b.rs", "lib/c.rs"];
    let leaves: Vec<_> = paths.iter().map(|path| page.add_leaf(Some(&lib), path)).collect();
    let toggles: Vec<_> = paths
        .iter()
        .zip([true, false, false])
        .map(|(path, pressed)| page.render_toggle(&page.add_region(path), pressed))
        .collect();
    let sync = TreeSync::new(page.clone());
    sync.init();
    page.flush();

    page.click_checkbox(&lib);
    page.flush();

    let activations: Vec<_> = toggles.iter().map(|toggle| toggle.activations()).collect();
    assert_eq!(activations, [0, 1, 1]);
    assert!(toggles.iter().all(|toggle| toggle.is_pressed()));
    assert!(leaves.iter().all(TreeItem::is_checked));
    assert_eq!(lib.state(), Some(TriState::Checked));
}

#[test]
fn group_toggle_skips_leaves_without_a_rendered_toggle() {
    let (page, src, a, b) = two_file_page();
    page.render_toggle(&page.add_region("src/a.ts"), true);
    let sync = TreeSync::new(page.clone());
    sync.init();
    page.flush();

    // Mixed, so the group targets "all checked"; b has no toggle to activate.
    page.click_checkbox(&src);
    page.flush();

    assert!(a.is_checked());
    assert!(!b.is_checked());
    assert_eq!(src.state(), Some(TriState::Mixed));
}

#[test]
fn leaf_click_activates_its_toggle_optimistically() {
    let (page, src, _a, b) = two_file_page();
    let toggle = page.render_toggle(&page.add_region("src/b.ts"), false);
    let sync = TreeSync::new(page.clone());
    sync.init();
    page.flush();

    page.click_checkbox(&b);
    assert!(b.is_checked());
    assert_eq!(toggle.activations(), 1);
    assert_eq!(src.state(), Some(TriState::Checked));

    page.flush();
    assert!(toggle.is_pressed());
    assert!(b.is_checked());

    page.click_checkbox(&b);
    page.flush();
    assert!(!toggle.is_pressed());
    assert!(!b.is_checked());
    assert_eq!(src.state(), Some(TriState::Mixed));
}

#[test]
fn leaf_click_reverts_when_no_toggle_is_rendered() {
    let (page, src, _a, b) = two_file_page();
    let sync = TreeSync::new(page.clone());
    sync.init();
    page.flush();

    page.click_checkbox(&b);
    assert!(!b.is_checked());
    assert_eq!(src.state(), Some(TriState::Mixed));
}

#[test]
fn pressed_observer_corrects_a_wrong_optimistic_guess() {
    let (page, _src, _a, b) = two_file_page();
    let toggle = page.render_toggle(&page.add_region("src/b.ts"), false);
    toggle.set_responsive(false);
    let sync = TreeSync::new(page.clone());
    sync.init();
    page.flush();

    page.click_checkbox(&b);
    page.flush();
    // Nothing tells the engine the activation was ignored.
    assert!(b.is_checked());
    assert!(!toggle.is_pressed());

    page.set_pressed(&toggle, false);
    page.flush();
    assert!(!b.is_checked());
}

#[test]
fn leaf_toggle_found_through_header_text() {
    let (page, _src, _a, b) = two_file_page();
    let region = page.add_region("src/b.ts");
    region.set_expand_path(None);
    region.set_header(Some("renamed: src/old.ts → src/b.ts"));
    let toggle = page.render_toggle(&region, false);
    let sync = TreeSync::new(page.clone());
    sync.init();
    page.flush();

    page.click_checkbox(&b);
    assert_eq!(toggle.activations(), 1);
    assert!(b.is_checked());
}

#[test]
fn pressed_change_without_a_region_path_is_dropped() {
    let (page, _src, _a, b) = two_file_page();
    let region = page.add_region("src/b.ts");
    let toggle = page.render_toggle(&region, false);
    region.set_expand_path(None);
    let sync = TreeSync::new(page.clone());
    sync.init();
    page.flush();

    page.set_pressed(&toggle, true);
    page.flush();
    assert!(!b.is_checked());
}

#[test]
fn external_change_for_an_unknown_path_changes_nothing() {
    let (page, src, a, b) = two_file_page();
    let sync = TreeSync::new(page.clone());
    sync.init();
    page.flush();

    assert!(!sync.apply_external_change("docs/README.md", true));
    assert!(sync.apply_external_change("src/b.ts", true));
    assert!(a.is_checked() && b.is_checked());
    assert_eq!(src.state(), Some(TriState::Checked));
}

#[test]
fn toggling_a_leaf_twice_restores_every_checkbox() {
    let page = Page::new();
    page.set_viewed(&[("app/ui/button.rs", true)]);
    let app = page.add_group(None, "app");
    let ui = page.add_group(Some(&app), "ui");
    let button = page.add_leaf(Some(&ui), "app/ui/button.rs");
    let menu = page.add_leaf(Some(&ui), "app/ui/menu.rs");
    let main = page.add_leaf(Some(&app), "app/main.rs");
    page.render_toggle(&page.add_region("app/ui/menu.rs"), false);

    let sync = TreeSync::new(page.clone());
    sync.init();
    page.flush();

    let snapshot = |items: &[&TreeItem]| items.iter().map(|item| item.state()).collect::<Vec<_>>();
    let everything = [&app, &ui, &button, &menu, &main];
    let before = snapshot(&everything);
    assert_eq!(ui.state(), Some(TriState::Mixed));
    assert_eq!(app.state(), Some(TriState::Mixed));

    page.click_checkbox(&menu);
    page.flush();
    assert_eq!(ui.state(), Some(TriState::Checked));
    assert_eq!(app.state(), Some(TriState::Mixed));

    page.click_checkbox(&menu);
    page.flush();
    assert_eq!(snapshot(&everything), before);
}
