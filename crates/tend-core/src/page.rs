//! Page display names.
//!
//! The sidebar owns the list of pages; the session core only needs the name to
//! put in front of a tab ordinal.

use std::collections::HashMap;

use crate::config::PageConfig;
use crate::PageKey;

/// Page key to display name lookup.
#[derive(Debug, Clone)]
pub struct PageDirectory {
    names: HashMap<PageKey, String>,
}

impl PageDirectory {
    /// An empty directory; every page displays as its key.
    pub fn empty() -> Self {
        Self {
            names: HashMap::new(),
        }
    }

    /// Build a directory from configured pages.
    pub fn from_config(pages: &[PageConfig]) -> Self {
        let names = pages
            .iter()
            .map(|page| (PageKey::new(page.key.clone()), page.name.clone()))
            .collect();
        Self { names }
    }

    /// Register or rename a page.
    pub fn insert(&mut self, key: PageKey, name: impl Into<String>) {
        self.names.insert(key, name.into());
    }

    /// Display name for a page, falling back to the key itself.
    pub fn display_name<'a>(&'a self, key: &'a PageKey) -> &'a str {
        self.names
            .get(key)
            .map(String::as_str)
            .unwrap_or_else(|| key.as_str())
    }

    /// Number of named pages.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether no page is named.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl Default for PageDirectory {
    fn default() -> Self {
        Self::from_config(&PageConfig::defaults())
    }
}
