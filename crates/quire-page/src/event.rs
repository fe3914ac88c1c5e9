//! Events a bound page can receive.

/// Timers the controller schedules on the page's behalf.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerId {
    /// Reverts a submit-control flash to the idle state.
    RevertSubmit,
    /// Expands the facet-modal backdrop after its delay.
    ExpandBackdrop,
}

/// Field values captured from the contact form at submit time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactSubmission {
    /// Hidden honeypot value; non-empty marks an automated filler.
    pub honeypot: String,
    /// Visible name/value pairs, posted to the backend as-is.
    pub fields: Vec<(String, String)>,
}

impl ContactSubmission {
    pub fn new(honeypot: impl Into<String>, fields: Vec<(String, String)>) -> Self {
        Self {
            honeypot: honeypot.into(),
            fields,
        }
    }
}

/// Everything that can happen to a bound page.
///
/// DOM-originated events (`Loaded`, the two submits, the clicks) come from
/// the embedding; the remaining events are completions the controller feeds
/// back from its own spawned work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageEvent {
    /// The markup is ready; runs the one-shot initialization pass.
    Loaded,
    /// The search form was submitted with this query value.
    SearchSubmitted { query: String },
    /// The contact form was submitted with these field values.
    ContactSubmitted(ContactSubmission),
    /// The contact request this controller issued resolved; `modal_text` is
    /// the rendered modal content returned by the backend.
    ContactCompleted { modal_text: String },
    /// The contact request failed at the transport level.
    ContactFailed { error: String },
    /// The bibliography fetch resolved with these item keys.
    BibliographyLoaded { keys: Vec<String> },
    /// The bibliography fetch failed or timed out.
    BibliographyUnavailable { reason: String },
    /// The "more facets" link was clicked.
    MoreFacetsClicked,
    /// The advanced-search panel title was clicked.
    AdvancedPanelToggled,
    /// A scheduled timer fired.
    TimerFired { timer: TimerId, generation: u64 },
}
