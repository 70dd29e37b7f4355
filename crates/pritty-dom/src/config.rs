//! Adapter configuration: host markup selectors, engine tunables, log level.
//!
//! Every field has a default matching the current pull request markup, so a
//! partial object from JS only overrides what it names.

use std::str::FromStr;

use log::Level;
use pritty::SyncConfig;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DomConfig {
    pub selectors: Selectors,
    pub sync: SyncConfig,
    /// `error`, `warn`, `info`, `debug` or `trace`.
    pub log_level: String,
}

impl DomConfig {
    /// Unknown level names fall back to `info`.
    pub fn level(&self) -> Level {
        Level::from_str(&self.log_level).unwrap_or(Level::Info)
    }
}

impl Default for DomConfig {
    fn default() -> Self {
        Self {
            selectors: Selectors::default(),
            sync: SyncConfig::default(),
            log_level: "info".to_owned(),
        }
    }
}

/// CSS selectors for the host page's markup.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Selectors {
    /// `<script>` holding the embedded JSON payload.
    pub embedded_data: String,
    /// Sidebar carrying the enhancement marker.
    pub sidebar: String,
    pub tree_root: String,
    pub tree_item: String,
    /// Label region of a tree item; checkboxes are inserted here.
    pub item_label: String,
    /// Link whose `title` names an item's path.
    pub item_link: String,
    /// Candidate roots for the pressed-state observer, first match wins.
    /// The document body is the last resort.
    pub diff_areas: Vec<String>,
    pub region: String,
    pub region_header: String,
    /// Its `hidden` attribute marks a collapsed region.
    pub region_details: String,
    /// "Expand all lines" button, carrying `data-file-path`.
    pub expand_all: String,
    pub viewed_toggle: String,
}

impl Default for Selectors {
    fn default() -> Self {
        Self {
            embedded_data: r#"script[data-target="react-app.embeddedData"]"#.to_owned(),
            sidebar: r#"#repos-file-tree, [data-target="diff-layout.fileTree"]"#.to_owned(),
            tree_root: r#"ul[role="tree"]"#.to_owned(),
            tree_item: r#"li[role="treeitem"]"#.to_owned(),
            item_label: ".PRIVATE_TreeView-item-content".to_owned(),
            item_link: "a[href], [role='link']".to_owned(),
            diff_areas: vec![
                "#diff-holder".to_owned(),
                "[data-target='diff-layout.mainContainer']".to_owned(),
                ".js-diff-progressive-container".to_owned(),
            ],
            region: "copilot-diff-entry, div[id^='diff-']".to_owned(),
            region_header: ".file-header".to_owned(),
            region_details: "[data-details-container-group]".to_owned(),
            expand_all: "button.js-expand-all-difflines-button".to_owned(),
            viewed_toggle: "button.js-reviewed-toggle".to_owned(),
        }
    }
}
