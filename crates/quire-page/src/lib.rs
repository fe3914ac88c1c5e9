//! Page behavior for the Western medieval manuscripts catalogue.
//!
//! The browser-side glue the catalogue shipped is rebuilt here as an
//! explicit state machine. A [`PageContract`] binds the catalogue's
//! markup into a [`PageBinding`]; a [`PageModel`] turns page events
//! into effects; a [`PageController`] executes those effects against
//! a [`Renderer`] and the network seams.

pub mod contract;
pub mod controller;
pub mod effect;
pub mod event;
pub mod gateway;
pub mod mock;
pub mod page;
pub mod render;
pub mod source;

// Re-export the types embeddings touch most.
pub use contract::{ContractError, PageBinding, PageContract};
pub use controller::{ControllerConfig, Disposition, PageController};
pub use effect::{Effect, SubmitControl, Tone, UiPatch};
pub use event::{ContactSubmission, PageEvent, TimerId};
pub use page::{BibliographyState, PageLinks, PageModel, SubmitPhase};
pub use render::Renderer;
