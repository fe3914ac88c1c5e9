//! Effects requested by the page model and the UI-patch vocabulary.

use std::time::Duration;

use serde::Serialize;

use crate::event::{ContactSubmission, TimerId};

/// Submit-control label in the idle state.
pub const LABEL_IDLE: &str = "Send";
/// Submit-control label while a submission is outstanding.
pub const LABEL_PENDING: &str = "Pending...";
/// Submit-control label on a rejected or failed submission.
pub const LABEL_FAILURE: &str = "Invalid form";
/// Submit-control label on an accepted submission.
pub const LABEL_SUCCESS: &str = "Thank you!";

/// Heading of the bibliography panel.
pub const PANEL_HEADING: &str = "Zotero bibliography";

/// Body copy of the bibliography panel for `count` found items. The trailing
/// "bibliographical database." phrase is what renderers hyperlink to the tag
/// page.
pub fn panel_body(count: usize) -> String {
    format!(
        "{count} item(s) related to this MS. have been found in our bibliographical database."
    )
}

/// Visual tone of the submit control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Tone {
    Neutral,
    Failure,
    Success,
}

/// Desired state of the contact form's submit control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmitControl {
    pub label: &'static str,
    pub enabled: bool,
    pub tone: Tone,
}

impl SubmitControl {
    pub fn idle() -> Self {
        Self {
            label: LABEL_IDLE,
            enabled: true,
            tone: Tone::Neutral,
        }
    }

    pub fn pending() -> Self {
        Self {
            label: LABEL_PENDING,
            enabled: false,
            tone: Tone::Neutral,
        }
    }

    pub fn failure() -> Self {
        Self {
            label: LABEL_FAILURE,
            enabled: false,
            tone: Tone::Failure,
        }
    }

    pub fn success() -> Self {
        Self {
            label: LABEL_SUCCESS,
            enabled: false,
            tone: Tone::Success,
        }
    }
}

/// One renderer-applicable mutation of the page.
///
/// Patches speak the markup's vocabulary but carry no selectors; a renderer
/// maps them onto its surface (live DOM, console transcript, test recording).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum UiPatch {
    /// Mark every browse item carrying this identifier as active.
    HighlightNavItem { page_id: String },
    /// Set the submit control's label, enabled flag, and tone.
    SetSubmitControl(SubmitControl),
    /// Append the bibliography panel below the item body.
    AppendBibliographyPanel { count: usize, tag_url: String },
    /// Show the degraded-mode note when the bibliography source is
    /// unreachable.
    MarkBibliographyUnavailable,
    /// Hide the feedback modal.
    CloseModal,
    /// Clear the contact form's field values.
    ResetContactForm,
    /// Remove the contact-specific styling class from the modal elements.
    StripContactModalStyling,
    /// Force the facet-modal backdrop to full-screen positioning.
    ExpandModalBackdrop,
    /// Clear inline style overrides from facet-count badges.
    ClearFacetBadgeStyles,
}

/// Side effects produced by [`PageModel::apply`](crate::page::PageModel::apply),
/// executed by the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Cancel the browser-default action of the triggering event.
    PreventDefault,
    /// Replace the current page address.
    Navigate { url: String },
    /// Apply a UI patch through the renderer.
    Render(UiPatch),
    /// Schedule a one-shot timer carrying the generation it was started with.
    StartTimer {
        timer: TimerId,
        delay: Duration,
        generation: u64,
    },
    /// Fetch bibliography keys for this item title.
    FetchBibliography { title: String },
    /// Post the contact submission through the gateway.
    SubmitContact(ContactSubmission),
}
