//! Logical path resolution for tree items.

/// Identity hints read off a tree item, in resolution priority order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PathHints {
    /// `title` of a link nested in the item.
    pub link_title: Option<String>,
    /// The item's own identifier attribute.
    pub id: Option<String>,
    /// Visible text of the item's label region.
    pub label_text: Option<String>,
}

impl PathHints {
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            link_title: Some(title.into()),
            ..Self::default()
        }
    }

    pub fn id(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Self::default()
        }
    }

    pub fn label(text: impl Into<String>) -> Self {
        Self {
            label_text: Some(text.into()),
            ..Self::default()
        }
    }

    /// First non-empty hint: link title, then id, then trimmed label text.
    pub fn resolve(&self) -> Option<String> {
        let title = self.link_title.as_deref().filter(|t| !t.is_empty());
        let id = self.id.as_deref().filter(|id| !id.is_empty());
        let label = self
            .label_text
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty());
        title.or(id).or(label).map(str::to_owned)
    }
}
