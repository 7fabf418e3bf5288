#[cfg(test)]
#[path = "actions_test.rs"]
mod tests;

use anyhow::Result;
use tokio::sync::mpsc;

use crate::domain::models::Action;
use crate::domain::models::BackendBox;
use crate::domain::models::CompletionResult;
use crate::domain::models::Event;
use crate::domain::models::TitleResult;

pub struct ActionsService {}

impl ActionsService {
    /// Runs a single network call and wraps its outcome in the event the UI
    /// task reconciles.
    pub async fn handle(backend: &BackendBox, action: Action) -> Event {
        match action {
            Action::CompletionRequest(prompt) => {
                let result = backend.get_completion(&prompt).await;
                return Event::CompletionResponse(CompletionResult {
                    thread_id: prompt.thread_id,
                    result,
                });
            }
            Action::TitleRequest(prompt) => {
                let title = backend.generate_title(&prompt.text).await;
                return Event::TitleResponse(TitleResult {
                    thread_id: prompt.thread_id,
                    title,
                });
            }
        }
    }

    /// Spawns one task per action so requests on different threads don't
    /// wait on each other. Returns once every sender is dropped.
    pub async fn start(
        backend: BackendBox,
        tx: mpsc::UnboundedSender<Event>,
        rx: &mut mpsc::UnboundedReceiver<Action>,
    ) -> Result<()> {
        while let Some(action) = rx.recv().await {
            let worker_backend = backend.clone();
            let worker_tx = tx.clone();

            tokio::spawn(async move {
                let event = ActionsService::handle(&worker_backend, action).await;
                if worker_tx.send(event).is_err() {
                    tracing::debug!("UI closed before a request finished");
                }
            });
        }

        return Ok(());
    }
}
