//! Rendering seam.
//!
//! The update logic never touches a document directly; it emits
//! [`UiPatch`](crate::effect::UiPatch) values and the embedding supplies
//! something that knows how to apply them. A browser shell would mutate
//! the DOM here; the CLI prints them; tests record them.

use crate::effect::UiPatch;

pub trait Renderer {
    /// Apply one visual patch to the page.
    fn apply(&mut self, patch: &UiPatch);

    /// Replace the current address, as a form submission would.
    fn navigate(&mut self, url: &str);
}
