use super::*;
use crate::effect::{Effect, LABEL_FAILURE, LABEL_IDLE, LABEL_PENDING, SubmitControl, Tone, UiPatch};
use crate::event::{ContactSubmission, PageEvent, TimerId};

/// Binding for a plain page with search and contact forms, no item view.
fn plain_binding(url: &str) -> PageBinding {
    PageBinding {
        url: url.to_string(),
        has_search_form: true,
        is_item_view: false,
        item_title: None,
        nav_items: Vec::new(),
        has_contact_form: true,
        has_modal: true,
        has_more_facets_link: true,
        has_advanced_panel: true,
    }
}

/// Binding for an individual-item view with the given nav identifiers.
fn item_binding(url: &str, title: &str, pages: &[&str]) -> PageBinding {
    PageBinding {
        is_item_view: true,
        item_title: Some(title.to_string()),
        nav_items: pages
            .iter()
            .map(|p| NavItem {
                page_id: p.to_string(),
            })
            .collect(),
        ..plain_binding(url)
    }
}

/// A honeypot-clean submission with a couple of visible fields.
fn clean_submission() -> ContactSubmission {
    ContactSubmission::new(
        "",
        vec![
            ("email".to_string(), "reader@example.org".to_string()),
            ("message".to_string(), "Query about fol. 12r".to_string()),
        ],
    )
}

/// Submit-control patches among `effects`, in order.
fn controls(effects: &[Effect]) -> Vec<&SubmitControl> {
    effects
        .iter()
        .filter_map(|e| match e {
            Effect::Render(UiPatch::SetSubmitControl(c)) => Some(c),
            _ => None,
        })
        .collect()
}

/// Highlighted identifiers among `effects`, in order.
fn highlights(effects: &[Effect]) -> Vec<&str> {
    effects
        .iter()
        .filter_map(|e| match e {
            Effect::Render(UiPatch::HighlightNavItem { page_id }) => Some(page_id.as_str()),
            _ => None,
        })
        .collect()
}

fn has_patch(effects: &[Effect], patch: &UiPatch) -> bool {
    effects.iter().any(|e| matches!(e, Effect::Render(p) if p == patch))
}

/// Fire the revert timer with the model's current generation.
fn fire_revert(model: &mut PageModel) -> Vec<Effect> {
    model.apply(PageEvent::TimerFired {
        timer: TimerId::RevertSubmit,
        generation: model.timer_generation,
    })
}

// ── search fallback ─────────────────────────────────────────────────

#[test]
fn empty_search_redirects_to_default_listing() {
    let mut model = PageModel::new(&plain_binding("https://catalogue.example/"));
    let effects = model.apply(PageEvent::SearchSubmitted {
        query: String::new(),
    });
    assert_eq!(
        effects,
        vec![
            Effect::PreventDefault,
            Effect::Navigate {
                url: DEFAULT_LISTING_URL.to_string(),
            },
        ]
    );
}

#[test]
fn nonempty_search_proceeds_unmodified() {
    let mut model = PageModel::new(&plain_binding("https://catalogue.example/"));
    let effects = model.apply(PageEvent::SearchSubmitted {
        query: "bestiary".to_string(),
    });
    assert!(effects.is_empty());
}

// ── navigation highlighting ─────────────────────────────────────────

#[test]
fn nav_item_matching_address_is_highlighted() {
    let binding = item_binding(
        "https://catalogue.example/catalog/MS-Bodl-264",
        "Bodl. 264",
        &["catalog/MS-Bodl-264", "catalog/MS-Laud-Misc-108"],
    );
    let mut model = PageModel::new(&binding);
    let effects = model.apply(PageEvent::Loaded);
    assert_eq!(highlights(&effects), vec!["catalog/MS-Bodl-264"]);
}

#[test]
fn substring_identifiers_can_both_match() {
    // "MS-1" occurs inside "MS-10"; the pass marks both, as observed.
    let binding = item_binding(
        "https://catalogue.example/catalog/MS-10",
        "MS 10",
        &["catalog/MS-10", "catalog/MS-1"],
    );
    let mut model = PageModel::new(&binding);
    let effects = model.apply(PageEvent::Loaded);
    assert_eq!(
        highlights(&effects),
        vec!["catalog/MS-10", "catalog/MS-1"]
    );
}

#[test]
fn no_match_highlights_nothing() {
    let binding = item_binding(
        "https://catalogue.example/catalog/MS-Digby-23",
        "Digby 23",
        &["catalog/MS-Bodl-264"],
    );
    let mut model = PageModel::new(&binding);
    let effects = model.apply(PageEvent::Loaded);
    assert!(highlights(&effects).is_empty());
}

#[test]
fn empty_identifier_matches_any_address() {
    // An empty data-page value is a substring of every address.
    let binding = item_binding("https://catalogue.example/catalog/x", "X", &[""]);
    let mut model = PageModel::new(&binding);
    let effects = model.apply(PageEvent::Loaded);
    assert_eq!(highlights(&effects), vec![""]);
}

#[test]
fn duplicate_identifiers_highlight_once() {
    // Marking is per identifier value; repeated items collapse to one patch.
    let binding = item_binding(
        "https://catalogue.example/catalog/MS-10",
        "MS 10",
        &["catalog/MS-10", "catalog/MS-10"],
    );
    let mut model = PageModel::new(&binding);
    let effects = model.apply(PageEvent::Loaded);
    assert_eq!(highlights(&effects), vec!["catalog/MS-10"]);
}

#[test]
fn initialization_pass_does_not_restart() {
    let binding = item_binding(
        "https://catalogue.example/catalog/MS-10",
        "MS 10",
        &["catalog/MS-10"],
    );
    let mut model = PageModel::new(&binding);
    let first = model.apply(PageEvent::Loaded);
    assert!(!first.is_empty());

    let second = model.apply(PageEvent::Loaded);
    assert!(second.is_empty());
}

#[test]
fn loaded_is_inert_off_item_views() {
    let mut model = PageModel::new(&plain_binding("https://catalogue.example/"));
    assert!(model.apply(PageEvent::Loaded).is_empty());
    assert_eq!(model.bibliography, BibliographyState::NotRequested);
}

// ── bibliography fetch and panel ────────────────────────────────────

#[test]
fn loaded_starts_fetch_and_marks_pending() {
    let binding = item_binding("https://catalogue.example/catalog/x", "St. Mary's Gospel", &[]);
    let mut model = PageModel::new(&binding);
    let effects = model.apply(PageEvent::Loaded);
    assert!(effects.iter().any(|e| matches!(
        e,
        Effect::FetchBibliography { title } if title == "St. Mary's Gospel"
    )));
    assert_eq!(model.bibliography, BibliographyState::Pending);
}

#[test]
fn keys_render_panel_with_count_and_tag_link() {
    let binding = item_binding("https://catalogue.example/catalog/x", "St. Mary's Gospel", &[]);
    let mut model = PageModel::new(&binding);
    model.apply(PageEvent::Loaded);

    let effects = model.apply(PageEvent::BibliographyLoaded {
        keys: vec!["ABC123".to_string(), "DEF456".to_string()],
    });

    assert_eq!(effects.len(), 1);
    match &effects[0] {
        Effect::Render(UiPatch::AppendBibliographyPanel { count, tag_url }) => {
            assert_eq!(*count, 2);
            assert_eq!(
                tag_url,
                "https://www.zotero.org/bodleianwmss/items/tag/St.%20Mary%27s%20Gospel"
            );
        }
        other => panic!("expected AppendBibliographyPanel, got {other:?}"),
    }
    assert_eq!(model.bibliography, BibliographyState::Loaded { count: 2 });
}

#[test]
fn empty_keys_render_nothing() {
    let binding = item_binding("https://catalogue.example/catalog/x", "Bestiary", &[]);
    let mut model = PageModel::new(&binding);
    model.apply(PageEvent::Loaded);

    let effects = model.apply(PageEvent::BibliographyLoaded { keys: Vec::new() });
    assert!(effects.is_empty());
    assert_eq!(model.bibliography, BibliographyState::Empty);
}

#[test]
fn fetch_failure_marks_unavailable() {
    let binding = item_binding("https://catalogue.example/catalog/x", "Bestiary", &[]);
    let mut model = PageModel::new(&binding);
    model.apply(PageEvent::Loaded);

    let effects = model.apply(PageEvent::BibliographyUnavailable {
        reason: "timed out".to_string(),
    });
    assert!(has_patch(&effects, &UiPatch::MarkBibliographyUnavailable));
    assert_eq!(model.bibliography, BibliographyState::Unavailable);
}

#[test]
fn bibliography_completion_ignored_unless_pending() {
    let binding = item_binding("https://catalogue.example/catalog/x", "Bestiary", &[]);
    let mut model = PageModel::new(&binding);

    // No fetch outstanding: a stray completion changes nothing.
    let effects = model.apply(PageEvent::BibliographyLoaded {
        keys: vec!["ABC123".to_string()],
    });
    assert!(effects.is_empty());
    assert_eq!(model.bibliography, BibliographyState::NotRequested);
}

// ── contact form guard ──────────────────────────────────────────────

#[test]
fn honeypot_submission_is_prevented_and_flashes_failure() {
    let mut model = PageModel::new(&plain_binding("https://catalogue.example/contact"));
    let effects = model.apply(PageEvent::ContactSubmitted(ContactSubmission::new(
        "spam",
        Vec::new(),
    )));

    assert_eq!(effects[0], Effect::PreventDefault);
    let c = controls(&effects);
    assert_eq!(c.len(), 1);
    assert_eq!(c[0].label, LABEL_FAILURE);
    assert!(!c[0].enabled);
    assert_eq!(c[0].tone, Tone::Failure);
    assert!(effects.iter().any(|e| matches!(
        e,
        Effect::StartTimer {
            timer: TimerId::RevertSubmit,
            delay,
            ..
        } if *delay == FLASH_DURATION
    )));
    assert_eq!(model.phase, SubmitPhase::Failure);
}

#[test]
fn honeypot_flash_reverts_to_idle_without_reset() {
    let mut model = PageModel::new(&plain_binding("https://catalogue.example/contact"));
    model.apply(PageEvent::ContactSubmitted(ContactSubmission::new(
        "spam",
        Vec::new(),
    )));

    let effects = fire_revert(&mut model);
    let c = controls(&effects);
    assert_eq!(c.len(), 1);
    assert_eq!(c[0].label, LABEL_IDLE);
    assert!(c[0].enabled);
    assert_eq!(c[0].tone, Tone::Neutral);
    assert!(!has_patch(&effects, &UiPatch::ResetContactForm));
    assert_eq!(model.phase, SubmitPhase::Idle);
}

#[test]
fn clean_submission_goes_pending_through_gateway() {
    let mut model = PageModel::new(&plain_binding("https://catalogue.example/contact"));
    let form = clean_submission();
    let effects = model.apply(PageEvent::ContactSubmitted(form.clone()));

    assert_eq!(effects[0], Effect::PreventDefault);
    let c = controls(&effects);
    assert_eq!(c.len(), 1);
    assert_eq!(c[0].label, LABEL_PENDING);
    assert!(!c[0].enabled);
    assert!(effects.iter().any(|e| matches!(
        e,
        Effect::SubmitContact(f) if *f == form
    )));
    assert_eq!(model.phase, SubmitPhase::Pending);
}

#[test]
fn resubmit_while_pending_is_dropped() {
    let mut model = PageModel::new(&plain_binding("https://catalogue.example/contact"));
    model.apply(PageEvent::ContactSubmitted(clean_submission()));

    let effects = model.apply(PageEvent::ContactSubmitted(clean_submission()));
    assert_eq!(effects, vec![Effect::PreventDefault]);
    assert_eq!(model.phase, SubmitPhase::Pending);
}

#[test]
fn pages_without_contact_form_ignore_submissions() {
    let mut binding = plain_binding("https://catalogue.example/");
    binding.has_contact_form = false;
    let mut model = PageModel::new(&binding);

    let effects = model.apply(PageEvent::ContactSubmitted(clean_submission()));
    assert!(effects.is_empty());
    assert_eq!(model.phase, SubmitPhase::Idle);
}

// ── submission lifecycle ────────────────────────────────────────────

#[test]
fn robot_response_flashes_failure() {
    let mut model = PageModel::new(&plain_binding("https://catalogue.example/contact"));
    model.apply(PageEvent::ContactSubmitted(clean_submission()));

    let effects = model.apply(PageEvent::ContactCompleted {
        modal_text: "Robot: detected".to_string(),
    });
    let c = controls(&effects);
    assert_eq!(c.len(), 1);
    assert_eq!(c[0].label, LABEL_FAILURE);
    assert!(!has_patch(&effects, &UiPatch::CloseModal));
    assert_eq!(model.phase, SubmitPhase::Failure);
}

#[test]
fn clean_response_closes_modal_and_flashes_success() {
    let mut model = PageModel::new(&plain_binding("https://catalogue.example/contact"));
    model.apply(PageEvent::ContactSubmitted(clean_submission()));

    let effects = model.apply(PageEvent::ContactCompleted {
        modal_text: "All good".to_string(),
    });
    assert_eq!(effects[0], Effect::Render(UiPatch::CloseModal));
    let c = controls(&effects);
    assert_eq!(c.len(), 1);
    assert_eq!(c[0].label, crate::effect::LABEL_SUCCESS);
    assert!(!c[0].enabled);
    assert_eq!(c[0].tone, Tone::Success);
    assert_eq!(model.phase, SubmitPhase::Success);
}

#[test]
fn success_revert_resets_the_form() {
    let mut model = PageModel::new(&plain_binding("https://catalogue.example/contact"));
    model.apply(PageEvent::ContactSubmitted(clean_submission()));
    model.apply(PageEvent::ContactCompleted {
        modal_text: "All good".to_string(),
    });

    let effects = fire_revert(&mut model);
    assert_eq!(controls(&effects)[0].label, LABEL_IDLE);
    assert!(has_patch(&effects, &UiPatch::ResetContactForm));
    assert_eq!(model.phase, SubmitPhase::Idle);
}

#[test]
fn transport_failure_flashes_failure() {
    let mut model = PageModel::new(&plain_binding("https://catalogue.example/contact"));
    model.apply(PageEvent::ContactSubmitted(clean_submission()));

    let effects = model.apply(PageEvent::ContactFailed {
        error: "connection refused".to_string(),
    });
    assert_eq!(controls(&effects)[0].label, LABEL_FAILURE);
    assert_eq!(model.phase, SubmitPhase::Failure);
}

#[test]
fn completion_when_idle_is_ignored() {
    // The lifecycle is scoped to a submission this page issued; a stray
    // completion cannot move the phase.
    let mut model = PageModel::new(&plain_binding("https://catalogue.example/contact"));
    let effects = model.apply(PageEvent::ContactCompleted {
        modal_text: "Robot: detected".to_string(),
    });
    assert!(effects.is_empty());
    assert_eq!(model.phase, SubmitPhase::Idle);
}

#[test]
fn stale_revert_is_dropped_newest_flash_wins() {
    let mut model = PageModel::new(&plain_binding("https://catalogue.example/contact"));

    // First flash, then a second before the revert arrives.
    model.apply(PageEvent::ContactSubmitted(ContactSubmission::new(
        "spam",
        Vec::new(),
    )));
    let stale_generation = model.timer_generation;
    model.apply(PageEvent::ContactSubmitted(ContactSubmission::new(
        "spam",
        Vec::new(),
    )));

    let stale = model.apply(PageEvent::TimerFired {
        timer: TimerId::RevertSubmit,
        generation: stale_generation,
    });
    assert!(stale.is_empty());
    assert_eq!(model.phase, SubmitPhase::Failure);

    let current = fire_revert(&mut model);
    assert_eq!(controls(&current)[0].label, LABEL_IDLE);
    assert_eq!(model.phase, SubmitPhase::Idle);
}

#[test]
fn submission_during_flash_invalidates_the_revert() {
    let mut model = PageModel::new(&plain_binding("https://catalogue.example/contact"));

    // Failure flash from a honeypot hit, then a clean submission before
    // its revert arrives.
    model.apply(PageEvent::ContactSubmitted(ContactSubmission::new(
        "spam",
        Vec::new(),
    )));
    let flash_generation = model.timer_generation;
    model.apply(PageEvent::ContactSubmitted(clean_submission()));
    assert_eq!(model.phase, SubmitPhase::Pending);

    // The leftover revert lands mid-request; it must not re-enable the
    // control or move the phase.
    let stale = model.apply(PageEvent::TimerFired {
        timer: TimerId::RevertSubmit,
        generation: flash_generation,
    });
    assert!(stale.is_empty());
    assert_eq!(model.phase, SubmitPhase::Pending);

    // The gateway outcome still lands with its full effect set.
    let effects = model.apply(PageEvent::ContactCompleted {
        modal_text: "All good".to_string(),
    });
    assert!(has_patch(&effects, &UiPatch::CloseModal));
    assert_eq!(controls(&effects)[0].label, crate::effect::LABEL_SUCCESS);
    assert_eq!(model.phase, SubmitPhase::Success);
}

// ── cosmetic facet toggles ──────────────────────────────────────────

#[test]
fn more_facets_strips_styling_then_schedules_backdrop() {
    let mut model = PageModel::new(&plain_binding("https://catalogue.example/search"));
    let effects = model.apply(PageEvent::MoreFacetsClicked);

    assert_eq!(effects[0], Effect::Render(UiPatch::StripContactModalStyling));
    assert!(effects.iter().any(|e| matches!(
        e,
        Effect::StartTimer {
            timer: TimerId::ExpandBackdrop,
            delay,
            ..
        } if *delay == BACKDROP_DELAY
    )));
}

#[test]
fn backdrop_timer_expands_backdrop() {
    let mut model = PageModel::new(&plain_binding("https://catalogue.example/search"));
    model.apply(PageEvent::MoreFacetsClicked);

    let effects = model.apply(PageEvent::TimerFired {
        timer: TimerId::ExpandBackdrop,
        generation: model.timer_generation,
    });
    assert_eq!(effects, vec![Effect::Render(UiPatch::ExpandModalBackdrop)]);
}

#[test]
fn advanced_panel_clears_badge_styles() {
    let mut model = PageModel::new(&plain_binding("https://catalogue.example/advanced"));
    let effects = model.apply(PageEvent::AdvancedPanelToggled);
    assert_eq!(effects, vec![Effect::Render(UiPatch::ClearFacetBadgeStyles)]);
}
