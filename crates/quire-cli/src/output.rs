use std::io::Write;

use owo_colors::OwoColorize;
use quire_page::contract::PageBinding;
use quire_page::effect::{PANEL_HEADING, Tone, UiPatch, panel_body};
use quire_page::page::{BibliographyState, PageModel};
use quire_page::render::Renderer;

/// Whether to use colored output.
#[derive(Debug, Clone, Copy)]
pub struct ColorMode(pub bool);

impl ColorMode {
    pub fn enabled(&self) -> bool {
        self.0
    }
}

/// Renderer that prints each patch as it is applied.
///
/// Write errors are swallowed; rendering must not abort the run.
pub struct ConsoleRenderer {
    writer: Box<dyn Write + Send>,
    color: ColorMode,
    json: bool,
}

impl ConsoleRenderer {
    pub fn new(writer: Box<dyn Write + Send>, color: ColorMode, json: bool) -> Self {
        Self {
            writer,
            color,
            json,
        }
    }

    pub fn writer(&mut self) -> &mut dyn Write {
        &mut *self.writer
    }
}

impl Renderer for ConsoleRenderer {
    fn apply(&mut self, patch: &UiPatch) {
        let _ = print_patch(&mut *self.writer, patch, self.color, self.json);
        let _ = self.writer.flush();
    }

    fn navigate(&mut self, url: &str) {
        let _ = print_navigation(&mut *self.writer, url, self.color, self.json);
        let _ = self.writer.flush();
    }
}

fn yes_no(v: bool) -> &'static str {
    if v { "yes" } else { "no" }
}

/// Print what the contract found in the page.
pub fn print_binding_report(
    w: &mut dyn Write,
    binding: &PageBinding,
    color: ColorMode,
    json: bool,
) -> std::io::Result<()> {
    if json {
        writeln!(w, "{}", serde_json::to_string_pretty(binding)?)?;
        return Ok(());
    }

    if color.enabled() {
        writeln!(w, "{} {}", "Bound:".bold(), binding.url)?;
    } else {
        writeln!(w, "Bound: {}", binding.url)?;
    }

    let item_view = match &binding.item_title {
        Some(title) => format!("yes (\"{}\")", title),
        None => "no".to_string(),
    };

    writeln!(w, "  search form:    {}", yes_no(binding.has_search_form))?;
    writeln!(w, "  item view:      {}", item_view)?;
    writeln!(w, "  browse items:   {}", binding.nav_items.len())?;
    writeln!(w, "  contact form:   {}", yes_no(binding.has_contact_form))?;
    writeln!(w, "  modal chrome:   {}", yes_no(binding.has_modal))?;
    writeln!(w, "  more facets:    {}", yes_no(binding.has_more_facets_link))?;
    writeln!(
        w,
        "  advanced panel: {}",
        yes_no(binding.has_advanced_panel)
    )?;
    Ok(())
}

/// Print one applied patch.
pub fn print_patch(
    w: &mut dyn Write,
    patch: &UiPatch,
    color: ColorMode,
    json: bool,
) -> std::io::Result<()> {
    if json {
        writeln!(w, "{}", serde_json::to_string(patch)?)?;
        return Ok(());
    }

    let line = match patch {
        UiPatch::HighlightNavItem { page_id } => {
            format!("nav item \"{}\" marked active", page_id)
        }
        UiPatch::SetSubmitControl(control) => {
            let state = if control.enabled { "enabled" } else { "disabled" };
            let label = match (color.enabled(), control.tone) {
                (true, Tone::Failure) => format!("\"{}\"", control.label.red()),
                (true, Tone::Success) => format!("\"{}\"", control.label.green()),
                _ => format!("\"{}\"", control.label),
            };
            format!("submit control {} ({})", label, state)
        }
        UiPatch::AppendBibliographyPanel { count, tag_url } => {
            format!("{}: {} -> {}", PANEL_HEADING, panel_body(*count), tag_url)
        }
        UiPatch::MarkBibliographyUnavailable => "bibliography unavailable".to_string(),
        UiPatch::CloseModal => "modal closed".to_string(),
        UiPatch::ResetContactForm => "contact form reset".to_string(),
        UiPatch::StripContactModalStyling => "contact styling stripped from modal".to_string(),
        UiPatch::ExpandModalBackdrop => "modal backdrop expanded full-screen".to_string(),
        UiPatch::ClearFacetBadgeStyles => "facet badge styles cleared".to_string(),
    };

    if color.enabled() {
        writeln!(w, "{} {}", "PATCH".cyan(), line)?;
    } else {
        writeln!(w, "PATCH {}", line)?;
    }
    Ok(())
}

/// Print a navigation the page requested.
pub fn print_navigation(
    w: &mut dyn Write,
    url: &str,
    color: ColorMode,
    json: bool,
) -> std::io::Result<()> {
    if json {
        writeln!(w, "{}", serde_json::json!({ "navigate": url }))?;
        return Ok(());
    }

    if color.enabled() {
        writeln!(w, "{} {}", "NAV".yellow(), url)?;
    } else {
        writeln!(w, "NAV {}", url)?;
    }
    Ok(())
}

/// Print the settled model state after a run.
pub fn print_run_summary(
    w: &mut dyn Write,
    model: &PageModel,
    fetch_skipped: bool,
    color: ColorMode,
    json: bool,
) -> std::io::Result<()> {
    if json {
        let summary = serde_json::json!({
            "summary": {
                "item_view": model.is_item_view,
                "bibliography": &model.bibliography,
                "phase": &model.phase,
                "fetch_skipped": fetch_skipped,
            }
        });
        writeln!(w, "{}", summary)?;
        return Ok(());
    }

    writeln!(w)?;
    if !model.is_item_view {
        writeln!(w, "No item view on this page.")?;
        return Ok(());
    }

    let msg = if fetch_skipped {
        "Bibliography: lookup skipped".to_string()
    } else {
        match model.bibliography {
            BibliographyState::Loaded { count } => {
                format!("Bibliography: {} item(s) found", count)
            }
            BibliographyState::Empty => "Bibliography: no items found".to_string(),
            BibliographyState::Unavailable => "Bibliography: unavailable".to_string(),
            BibliographyState::NotRequested | BibliographyState::Pending => {
                "Bibliography: not requested".to_string()
            }
        }
    };

    match (color.enabled(), &model.bibliography) {
        (true, BibliographyState::Unavailable) => writeln!(w, "{}", msg.yellow())?,
        (true, _) => writeln!(w, "{}", msg.dimmed())?,
        (false, _) => writeln!(w, "{}", msg)?,
    }
    Ok(())
}

/// Print the encoded tag and the URLs derived from it.
pub fn print_tag_report(
    w: &mut dyn Write,
    title: &str,
    encoded: &str,
    keys_url: &str,
    page_url: &str,
    color: ColorMode,
) -> std::io::Result<()> {
    if color.enabled() {
        writeln!(w, "{}    {}", "Title:".bold(), title)?;
        writeln!(w, "{}      {}", "Tag:".bold(), encoded)?;
        writeln!(w, "{} {}", "Keys URL:".bold(), keys_url)?;
        writeln!(w, "{} {}", "Tag page:".bold(), page_url)?;
    } else {
        writeln!(w, "Title:    {}", title)?;
        writeln!(w, "Tag:      {}", encoded)?;
        writeln!(w, "Keys URL: {}", keys_url)?;
        writeln!(w, "Tag page: {}", page_url)?;
    }
    Ok(())
}
