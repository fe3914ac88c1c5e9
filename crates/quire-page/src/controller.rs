//! Drives a [`PageModel`] against real time and real I/O.
//!
//! The controller is the only place effects are executed. Pure render
//! patches go straight to the [`Renderer`]; timers, bibliography
//! lookups and contact submissions are spawned, and their completions
//! come back through an internal channel as further [`PageEvent`]s.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::effect::Effect;
use crate::event::{ContactSubmission, PageEvent, TimerId};
use crate::gateway::ContactGateway;
use crate::page::PageModel;
use crate::render::Renderer;
use crate::source::BibliographySource;

/// What the embedding should do with the browser's default action for
/// the event it just fed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Let the default action run.
    Proceed,
    /// The page logic consumed the action.
    Prevented,
}

/// Upper bounds on the controller's outbound requests.
#[derive(Debug, Clone, Copy)]
pub struct ControllerConfig {
    pub fetch_timeout: Duration,
    pub contact_timeout: Duration,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            fetch_timeout: Duration::from_secs(10),
            contact_timeout: Duration::from_secs(15),
        }
    }
}

pub struct PageController<R: Renderer> {
    pub model: PageModel,
    renderer: R,
    source: Arc<dyn BibliographySource>,
    gateway: Arc<dyn ContactGateway>,
    config: ControllerConfig,
    cancel: CancellationToken,
    events_tx: mpsc::UnboundedSender<PageEvent>,
    events_rx: mpsc::UnboundedReceiver<PageEvent>,
    /// Spawned tasks that have not yet reported back.
    inflight: usize,
}

impl<R: Renderer> PageController<R> {
    pub fn new(
        model: PageModel,
        renderer: R,
        source: Arc<dyn BibliographySource>,
        gateway: Arc<dyn ContactGateway>,
        config: ControllerConfig,
    ) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            model,
            renderer,
            source,
            gateway,
            config,
            cancel: CancellationToken::new(),
            events_tx,
            events_rx,
            inflight: 0,
        }
    }

    /// Token that aborts outstanding lookups and submissions.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    /// Feed one event through the model and execute the resulting effects.
    pub fn step(&mut self, event: PageEvent) -> Disposition {
        let mut disposition = Disposition::Proceed;
        for effect in self.model.apply(event) {
            match effect {
                Effect::PreventDefault => disposition = Disposition::Prevented,
                Effect::Navigate { url } => self.renderer.navigate(&url),
                Effect::Render(patch) => self.renderer.apply(&patch),
                Effect::StartTimer {
                    timer,
                    delay,
                    generation,
                } => self.start_timer(timer, delay, generation),
                Effect::FetchBibliography { title } => self.fetch_bibliography(title),
                Effect::SubmitContact(form) => self.submit_contact(form),
            }
        }
        disposition
    }

    /// Pump completions back through the model until no spawned work
    /// remains. Each completion may start new work (a flash starts its
    /// revert timer), so this loops rather than draining once.
    pub async fn run_until_settled(&mut self) {
        while self.inflight > 0 {
            let Some(event) = self.events_rx.recv().await else {
                break;
            };
            self.inflight -= 1;
            self.step(event);
        }
    }

    fn start_timer(&mut self, timer: TimerId, delay: Duration, generation: u64) {
        let tx = self.events_tx.clone();
        let cancel = self.cancel.clone();
        self.inflight += 1;
        tokio::spawn(async move {
            tokio::select! {
                _ = cancel.cancelled() => {}
                _ = tokio::time::sleep(delay) => {}
            }
            // Sent even when cancelled so the settle loop drains.
            let _ = tx.send(PageEvent::TimerFired { timer, generation });
        });
    }

    fn fetch_bibliography(&mut self, title: String) {
        let tx = self.events_tx.clone();
        let cancel = self.cancel.clone();
        let source = Arc::clone(&self.source);
        let timeout = self.config.fetch_timeout;
        self.inflight += 1;
        tokio::spawn(async move {
            let event = match tokio::time::timeout(timeout, source.fetch_keys(&title, &cancel))
                .await
            {
                Ok(Ok(keys)) => PageEvent::BibliographyLoaded { keys },
                Ok(Err(e)) => {
                    tracing::warn!(error = %e, "bibliography lookup failed");
                    PageEvent::BibliographyUnavailable {
                        reason: e.to_string(),
                    }
                }
                Err(_) => {
                    tracing::warn!("bibliography lookup timed out");
                    PageEvent::BibliographyUnavailable {
                        reason: "timed out".to_string(),
                    }
                }
            };
            let _ = tx.send(event);
        });
    }

    fn submit_contact(&mut self, form: ContactSubmission) {
        let tx = self.events_tx.clone();
        let cancel = self.cancel.clone();
        let gateway = Arc::clone(&self.gateway);
        let timeout = self.config.contact_timeout;
        self.inflight += 1;
        tokio::spawn(async move {
            let event = match tokio::time::timeout(timeout, gateway.submit(&form, &cancel)).await {
                Ok(Ok(outcome)) => PageEvent::ContactCompleted {
                    modal_text: outcome.modal_text,
                },
                Ok(Err(e)) => {
                    tracing::warn!(error = %e, "contact submission failed");
                    PageEvent::ContactFailed {
                        error: e.to_string(),
                    }
                }
                Err(_) => {
                    tracing::warn!("contact submission timed out");
                    PageEvent::ContactFailed {
                        error: "timed out".to_string(),
                    }
                }
            };
            let _ = tx.send(event);
        });
    }
}
