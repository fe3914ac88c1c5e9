//! Page model: the headless state of one bound catalogue page.

mod update;

#[cfg(test)]
mod tests;

use std::time::Duration;

use serde::Serialize;

use crate::contract::{NavItem, PageBinding};

/// How long a submit-control flash stays before reverting to idle.
pub const FLASH_DURATION: Duration = Duration::from_millis(2500);
/// Delay before the facet-modal backdrop is forced to full screen.
pub const BACKDROP_DELAY: Duration = Duration::from_millis(500);
/// Address of the unfiltered listing, used when a search is submitted empty.
pub const DEFAULT_LISTING_URL: &str = "/?utf8=✓&search_field=default";
/// Modal-text substring marking a submission the backend rejected as a bot.
pub const ROBOT_MARKER: &str = "Robot";

/// Lifecycle of the contact form's submit control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SubmitPhase {
    Idle,
    Pending,
    Success,
    Failure,
}

/// Where the bibliography lookup stands for this page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum BibliographyState {
    /// Not an item view, or the pass has not run yet.
    NotRequested,
    /// A fetch is outstanding.
    Pending,
    /// Keys came back; the panel shows this count.
    Loaded { count: usize },
    /// The library has no items for this tag; nothing is rendered.
    Empty,
    /// The fetch failed or timed out; the degraded-mode note is shown.
    Unavailable,
}

/// Fixed addresses the model renders into effects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLinks {
    /// Target of the empty-search redirect.
    pub default_listing: String,
    /// Public tag-page base; the encoded tag is appended to it.
    pub tag_page_base: String,
}

impl Default for PageLinks {
    fn default() -> Self {
        Self {
            default_listing: DEFAULT_LISTING_URL.to_string(),
            tag_page_base: format!(
                "{}/{}/items/tag/",
                quire_zotero::DEFAULT_LINK_BASE,
                quire_zotero::DEFAULT_LINK_SLUG
            ),
        }
    }
}

/// State of one bound page.
///
/// All mutation happens in [`PageModel::apply`], a pure function from the
/// current state and one event to a list of effects; nothing here touches
/// the network, the clock, or any markup.
#[derive(Debug, Clone)]
pub struct PageModel {
    pub url: String,
    pub is_item_view: bool,
    pub item_title: Option<String>,
    pub nav_items: Vec<NavItem>,
    pub has_contact_form: bool,
    pub links: PageLinks,
    pub phase: SubmitPhase,
    pub bibliography: BibliographyState,
    /// One-shot guard: the initialization pass never restarts.
    pub init_done: bool,
    /// Bumped on every flash start; stale revert timers are dropped.
    pub timer_generation: u64,
}

impl PageModel {
    /// Model for a binding, with the shipped addresses.
    pub fn new(binding: &PageBinding) -> Self {
        Self::with_links(binding, PageLinks::default())
    }

    /// Model for a binding with explicit addresses (tests, config overrides).
    pub fn with_links(binding: &PageBinding, links: PageLinks) -> Self {
        Self {
            url: binding.url.clone(),
            is_item_view: binding.is_item_view,
            item_title: binding.item_title.clone(),
            nav_items: binding.nav_items.clone(),
            has_contact_form: binding.has_contact_form,
            links,
            phase: SubmitPhase::Idle,
            bibliography: BibliographyState::NotRequested,
            init_done: false,
            timer_generation: 0,
        }
    }

    /// Lazy pass over the navigation items whose identifier occurs in the
    /// page address. Finite, and consumed at most once by the `Loaded`
    /// handler; identifiers that are substrings of one another may both
    /// match, which mirrors the site's observed behavior.
    pub fn nav_matches(&self) -> impl Iterator<Item = &NavItem> {
        self.nav_items
            .iter()
            .filter(|item| self.url.contains(&item.page_id))
    }
}
