//! Typed DOM contract between the controller and the page markup.
//!
//! Every selector the page logic depends on is named in one place, and
//! [`PageContract::bind`] evaluates them against the document up front,
//! failing with a [`ContractError`] that names what drifted. A renamed
//! class is a visible binding error, never a silent no-op.

use scraper::{ElementRef, Html, Selector};
use serde::Serialize;
use thiserror::Error;

/// Attribute carrying a browse item's page identifier.
pub const PAGE_ID_ATTR: &str = "data-page";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContractError {
    #[error("invalid selector for {name}: {css:?}")]
    InvalidSelector { name: &'static str, css: String },
    #[error("missing element: {name} ({css})")]
    MissingElement { name: &'static str, css: String },
    #[error("missing attribute {attribute} on {name}")]
    MissingAttribute {
        name: &'static str,
        attribute: &'static str,
    },
}

/// A contract entry: what the element is called and how it is addressed.
#[derive(Debug, Clone)]
pub struct NamedSelector {
    pub name: &'static str,
    pub css: String,
}

impl NamedSelector {
    pub fn new(name: &'static str, css: impl Into<String>) -> Self {
        Self {
            name,
            css: css.into(),
        }
    }

    fn compile(&self) -> Result<Selector, ContractError> {
        Selector::parse(&self.css).map_err(|_| ContractError::InvalidSelector {
            name: self.name,
            css: self.css.clone(),
        })
    }
}

/// Named selectors for every element the controller touches.
///
/// The modal dialog/content/backdrop and the facet badges exist only while
/// their UI is open, so binding does not require them; they are named here
/// for renderers that target the live markup.
#[derive(Debug, Clone)]
pub struct PageContract {
    pub search_form: NamedSelector,
    pub search_field: NamedSelector,
    pub item_view: NamedSelector,
    pub browse_item: NamedSelector,
    pub item_heading: NamedSelector,
    pub bibliography_mount: NamedSelector,
    pub contact_form: NamedSelector,
    pub honeypot_field: NamedSelector,
    pub submit_control: NamedSelector,
    pub modal_container: NamedSelector,
    pub modal_dialog: NamedSelector,
    pub modal_content: NamedSelector,
    pub modal_backdrop: NamedSelector,
    pub more_facets_link: NamedSelector,
    pub advanced_panel_title: NamedSelector,
    pub facet_badge: NamedSelector,
}

impl Default for PageContract {
    fn default() -> Self {
        Self::standard()
    }
}

impl PageContract {
    /// The catalogue's shipped markup.
    pub fn standard() -> Self {
        Self {
            search_form: NamedSelector::new("search form", ".search-query-form"),
            search_field: NamedSelector::new("search field", "#q"),
            item_view: NamedSelector::new("individual-item marker", ".individual-item"),
            browse_item: NamedSelector::new("browse item", ".browse-item"),
            item_heading: NamedSelector::new("item heading", r#"h1[itemprop^="name"]"#),
            bibliography_mount: NamedSelector::new("bibliography mount", ".tei-body"),
            contact_form: NamedSelector::new("contact form", "#contact-us-form"),
            honeypot_field: NamedSelector::new("honeypot field", "#contact-miere"),
            submit_control: NamedSelector::new("submit control", "#submit-email"),
            modal_container: NamedSelector::new("modal container", "#ajax-modal"),
            modal_dialog: NamedSelector::new("modal dialog", ".modal-dialog"),
            modal_content: NamedSelector::new("modal content", ".modal-content"),
            modal_backdrop: NamedSelector::new("modal backdrop", ".modal-backdrop"),
            more_facets_link: NamedSelector::new("more-facets link", ".more_facets_link"),
            advanced_panel_title: NamedSelector::new(
                "advanced-search panel title",
                ".advanced-search-form .panel-title",
            ),
            facet_badge: NamedSelector::new("facet-count badge", "span.facet-count"),
        }
    }

    /// Compile every selector, surfacing the first invalid one.
    pub fn compile_all(&self) -> Result<(), ContractError> {
        for sel in [
            &self.search_form,
            &self.search_field,
            &self.item_view,
            &self.browse_item,
            &self.item_heading,
            &self.bibliography_mount,
            &self.contact_form,
            &self.honeypot_field,
            &self.submit_control,
            &self.modal_container,
            &self.modal_dialog,
            &self.modal_content,
            &self.modal_backdrop,
            &self.more_facets_link,
            &self.advanced_panel_title,
            &self.facet_badge,
        ] {
            sel.compile()?;
        }
        Ok(())
    }

    /// Evaluate the contract against one page's markup.
    ///
    /// Elements a handler depends on are required as a group: a present
    /// search form must contain the query field, an item view must carry the
    /// heading and the panel mount, a present contact form must contain the
    /// honeypot and the submit control, and every browse item must carry its
    /// page-identifier attribute.
    pub fn bind(&self, html: &str, url: impl Into<String>) -> Result<PageBinding, ContractError> {
        self.compile_all()?;
        let doc = Html::parse_document(html);

        let search_form = first(&doc, &self.search_form)?;
        if let Some(form) = search_form {
            require_within(form, &self.search_field)?;
        }

        let is_item_view = first(&doc, &self.item_view)?.is_some();
        let item_title = if is_item_view {
            let heading = require(&doc, &self.item_heading)?;
            require(&doc, &self.bibliography_mount)?;
            Some(heading.text().collect::<String>())
        } else {
            None
        };

        let browse_sel = self.browse_item.compile()?;
        let mut nav_items = Vec::new();
        for el in doc.select(&browse_sel) {
            let page_id =
                el.value()
                    .attr(PAGE_ID_ATTR)
                    .ok_or(ContractError::MissingAttribute {
                        name: self.browse_item.name,
                        attribute: PAGE_ID_ATTR,
                    })?;
            nav_items.push(NavItem {
                page_id: page_id.to_string(),
            });
        }

        let contact_form = first(&doc, &self.contact_form)?;
        if let Some(form) = contact_form {
            require_within(form, &self.honeypot_field)?;
            require_within(form, &self.submit_control)?;
        }

        Ok(PageBinding {
            url: url.into(),
            has_search_form: search_form.is_some(),
            is_item_view,
            item_title,
            nav_items,
            has_contact_form: contact_form.is_some(),
            has_modal: first(&doc, &self.modal_container)?.is_some(),
            has_more_facets_link: first(&doc, &self.more_facets_link)?.is_some(),
            has_advanced_panel: first(&doc, &self.advanced_panel_title)?.is_some(),
        })
    }
}

/// A navigation (browse) item and its page identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavItem {
    pub page_id: String,
}

/// The typed result of binding a page: what is present and the values the
/// model needs.
#[derive(Debug, Clone, Serialize)]
pub struct PageBinding {
    /// Current page address, supplied by the embedding.
    pub url: String,
    pub has_search_form: bool,
    pub is_item_view: bool,
    /// Heading text, exactly as it appears in the markup (item views only).
    pub item_title: Option<String>,
    pub nav_items: Vec<NavItem>,
    pub has_contact_form: bool,
    pub has_modal: bool,
    pub has_more_facets_link: bool,
    pub has_advanced_panel: bool,
}

fn first<'a>(
    doc: &'a Html,
    sel: &NamedSelector,
) -> Result<Option<ElementRef<'a>>, ContractError> {
    let compiled = sel.compile()?;
    Ok(doc.select(&compiled).next())
}

fn require<'a>(doc: &'a Html, sel: &NamedSelector) -> Result<ElementRef<'a>, ContractError> {
    first(doc, sel)?.ok_or_else(|| ContractError::MissingElement {
        name: sel.name,
        css: sel.css.clone(),
    })
}

fn require_within<'a>(
    scope: ElementRef<'a>,
    sel: &NamedSelector,
) -> Result<ElementRef<'a>, ContractError> {
    let compiled = sel.compile()?;
    scope
        .select(&compiled)
        .next()
        .ok_or_else(|| ContractError::MissingElement {
            name: sel.name,
            css: sel.css.clone(),
        })
}
