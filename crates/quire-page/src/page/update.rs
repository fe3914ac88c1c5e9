use quire_zotero::encode_tag;

use super::{
    BACKDROP_DELAY, BibliographyState, FLASH_DURATION, PageModel, ROBOT_MARKER, SubmitPhase,
};
use crate::effect::{Effect, SubmitControl, UiPatch};
use crate::event::{ContactSubmission, PageEvent, TimerId};

impl PageModel {
    /// Apply one event and return the effects it demands.
    ///
    /// Pure: the only state touched is `self`, and every side effect is
    /// returned as data for the controller to execute.
    pub fn apply(&mut self, event: PageEvent) -> Vec<Effect> {
        match event {
            PageEvent::Loaded => self.on_loaded(),
            PageEvent::SearchSubmitted { query } => self.on_search_submitted(&query),
            PageEvent::ContactSubmitted(form) => self.on_contact_submitted(form),
            PageEvent::ContactCompleted { modal_text } => self.on_contact_completed(&modal_text),
            PageEvent::ContactFailed { error } => self.on_contact_failed(&error),
            PageEvent::BibliographyLoaded { keys } => self.on_bibliography_loaded(&keys),
            PageEvent::BibliographyUnavailable { reason } => {
                self.on_bibliography_unavailable(&reason)
            }
            PageEvent::MoreFacetsClicked => self.on_more_facets_clicked(),
            PageEvent::AdvancedPanelToggled => {
                vec![Effect::Render(UiPatch::ClearFacetBadgeStyles)]
            }
            PageEvent::TimerFired { timer, generation } => self.on_timer_fired(timer, generation),
        }
    }

    /// One-shot initialization pass: highlight matching navigation items and
    /// start the bibliography fetch. Runs only on individual-item views and
    /// never restarts.
    fn on_loaded(&mut self) -> Vec<Effect> {
        if !self.is_item_view || self.init_done {
            return Vec::new();
        }
        self.init_done = true;

        let mut effects = Vec::new();

        // Drain the lazy pass, one highlight per matched identifier. Marking
        // is by identifier value, so items sharing one are covered together.
        let mut matched: Vec<String> = Vec::new();
        for item in self.nav_matches() {
            if !matched.contains(&item.page_id) {
                matched.push(item.page_id.clone());
            }
        }
        for page_id in matched {
            effects.push(Effect::Render(UiPatch::HighlightNavItem { page_id }));
        }

        if let Some(title) = &self.item_title {
            self.bibliography = BibliographyState::Pending;
            effects.push(Effect::FetchBibliography {
                title: title.clone(),
            });
        }

        effects
    }

    /// Empty queries redirect to the unfiltered listing; anything else
    /// proceeds as a normal form submission.
    fn on_search_submitted(&mut self, query: &str) -> Vec<Effect> {
        if query.is_empty() {
            vec![
                Effect::PreventDefault,
                Effect::Navigate {
                    url: self.links.default_listing.clone(),
                },
            ]
        } else {
            Vec::new()
        }
    }

    fn on_contact_submitted(&mut self, form: ContactSubmission) -> Vec<Effect> {
        if !self.has_contact_form {
            return Vec::new();
        }
        // One request at a time; a resubmit while one is outstanding is
        // dropped.
        if self.phase == SubmitPhase::Pending {
            return vec![Effect::PreventDefault];
        }
        if !form.honeypot.is_empty() {
            let mut effects = vec![Effect::PreventDefault];
            self.start_flash(SubmitPhase::Failure, SubmitControl::failure(), &mut effects);
            return effects;
        }

        // Clean submission: the controller owns the request, so the
        // browser-default post is cancelled and the gateway takes over.
        self.phase = SubmitPhase::Pending;
        // A flash revert scheduled before this submission must not fire
        // into the pending request.
        self.timer_generation += 1;
        vec![
            Effect::PreventDefault,
            Effect::Render(UiPatch::SetSubmitControl(SubmitControl::pending())),
            Effect::SubmitContact(form),
        ]
    }

    /// Resolution of the request this page submitted. The backend's verdict
    /// arrives as rendered modal text; `Robot` in it means rejection.
    fn on_contact_completed(&mut self, modal_text: &str) -> Vec<Effect> {
        if self.phase != SubmitPhase::Pending {
            return Vec::new();
        }
        let mut effects = Vec::new();
        if modal_text.contains(ROBOT_MARKER) {
            self.start_flash(SubmitPhase::Failure, SubmitControl::failure(), &mut effects);
        } else {
            effects.push(Effect::Render(UiPatch::CloseModal));
            self.start_flash(SubmitPhase::Success, SubmitControl::success(), &mut effects);
        }
        effects
    }

    /// Transport failure gets the same flash as a rejected submission; the
    /// control never sticks at Pending.
    fn on_contact_failed(&mut self, _error: &str) -> Vec<Effect> {
        if self.phase != SubmitPhase::Pending {
            return Vec::new();
        }
        let mut effects = Vec::new();
        self.start_flash(SubmitPhase::Failure, SubmitControl::failure(), &mut effects);
        effects
    }

    fn on_bibliography_loaded(&mut self, keys: &[String]) -> Vec<Effect> {
        if self.bibliography != BibliographyState::Pending {
            return Vec::new();
        }
        if keys.is_empty() {
            // No records for this tag: render nothing at all.
            self.bibliography = BibliographyState::Empty;
            return Vec::new();
        }

        let count = keys.len();
        self.bibliography = BibliographyState::Loaded { count };
        let title = self.item_title.as_deref().unwrap_or_default();
        let tag_url = format!("{}{}", self.links.tag_page_base, encode_tag(title));
        vec![Effect::Render(UiPatch::AppendBibliographyPanel {
            count,
            tag_url,
        })]
    }

    fn on_bibliography_unavailable(&mut self, _reason: &str) -> Vec<Effect> {
        if self.bibliography != BibliographyState::Pending {
            return Vec::new();
        }
        self.bibliography = BibliographyState::Unavailable;
        vec![Effect::Render(UiPatch::MarkBibliographyUnavailable)]
    }

    fn on_more_facets_clicked(&mut self) -> Vec<Effect> {
        vec![
            Effect::Render(UiPatch::StripContactModalStyling),
            Effect::StartTimer {
                timer: TimerId::ExpandBackdrop,
                delay: BACKDROP_DELAY,
                generation: self.timer_generation,
            },
        ]
    }

    fn on_timer_fired(&mut self, timer: TimerId, generation: u64) -> Vec<Effect> {
        match timer {
            // The backdrop patch is idempotent, so staleness does not matter.
            TimerId::ExpandBackdrop => vec![Effect::Render(UiPatch::ExpandModalBackdrop)],
            TimerId::RevertSubmit => {
                // A newer flash owns the revert; stale deadlines are dropped.
                if generation != self.timer_generation {
                    return Vec::new();
                }
                let was_success = self.phase == SubmitPhase::Success;
                self.phase = SubmitPhase::Idle;
                let mut effects = vec![Effect::Render(UiPatch::SetSubmitControl(
                    SubmitControl::idle(),
                ))];
                if was_success {
                    effects.push(Effect::Render(UiPatch::ResetContactForm));
                }
                effects
            }
        }
    }

    /// Enter a flash phase and schedule its revert under a fresh generation.
    fn start_flash(
        &mut self,
        phase: SubmitPhase,
        control: SubmitControl,
        effects: &mut Vec<Effect>,
    ) {
        self.phase = phase;
        self.timer_generation += 1;
        effects.push(Effect::Render(UiPatch::SetSubmitControl(control)));
        effects.push(Effect::StartTimer {
            timer: TimerId::RevertSubmit,
            delay: FLASH_DURATION,
            generation: self.timer_generation,
        });
    }
}
