use std::sync::Arc;

use anyhow::bail;
use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::mpsc;

use super::ActionsService;
use crate::domain::models::Action;
use crate::domain::models::Backend;
use crate::domain::models::BackendBox;
use crate::domain::models::BackendError;
use crate::domain::models::CompletionPrompt;
use crate::domain::models::CompletionResult;
use crate::domain::models::Event;
use crate::domain::models::TitlePrompt;
use crate::domain::models::TitleResult;
use crate::infrastructure::backends::RemoteChat;

struct FakeBackend {
    answer: Result<String, BackendError>,
    title: Option<String>,
}

#[async_trait]
impl Backend for FakeBackend {
    #[allow(clippy::implicit_return)]
    async fn get_completion(&self, prompt: &CompletionPrompt) -> Result<String, BackendError> {
        return self
            .answer
            .clone()
            .map(|answer| return format!("{answer} ({})", prompt.text));
    }

    #[allow(clippy::implicit_return)]
    async fn generate_title(&self, _text: &str) -> Option<String> {
        return self.title.clone();
    }
}

fn fake_backend(answer: Result<String, BackendError>, title: Option<String>) -> BackendBox {
    return Arc::new(FakeBackend { answer, title });
}

fn completion_action(thread_id: &str, text: &str) -> Action {
    return Action::CompletionRequest(CompletionPrompt::new(thread_id, &[], text, 5));
}

fn title_action(thread_id: &str, text: &str) -> Action {
    return Action::TitleRequest(TitlePrompt {
        thread_id: thread_id.to_string(),
        text: text.to_string(),
    });
}

fn to_completion(event: Option<Event>) -> Result<CompletionResult> {
    match event {
        Some(Event::CompletionResponse(result)) => {
            return Ok(result);
        }
        _ => bail!("Expected a completion response"),
    }
}

fn to_title(event: Option<Event>) -> Result<TitleResult> {
    match event {
        Some(Event::TitleResponse(result)) => {
            return Ok(result);
        }
        _ => bail!("Expected a title response"),
    }
}

mod handle {
    use super::*;

    #[tokio::test]
    async fn it_tags_completions_with_their_thread() -> Result<()> {
        let backend = fake_backend(Ok("Drink water".to_string()), None);
        let event = ActionsService::handle(&backend, completion_action("abc", "Tips?")).await;

        let res = to_completion(Some(event))?;
        assert_eq!(res.thread_id, "abc");
        assert_eq!(res.result, Ok("Drink water (Tips?)".to_string()));

        return Ok(());
    }

    #[tokio::test]
    async fn it_passes_backend_errors_through() -> Result<()> {
        let backend = fake_backend(Err(BackendError::Status(502)), None);
        let event = ActionsService::handle(&backend, completion_action("abc", "Tips?")).await;

        let res = to_completion(Some(event))?;
        assert_eq!(res.result, Err(BackendError::Status(502)));

        return Ok(());
    }

    #[tokio::test]
    async fn it_tags_titles_with_their_thread() -> Result<()> {
        let backend = fake_backend(Ok("".to_string()), Some("Sleep habits".to_string()));
        let event = ActionsService::handle(&backend, title_action("xyz", "How to sleep?")).await;

        let res = to_title(Some(event))?;
        assert_eq!(res.thread_id, "xyz");
        assert_eq!(res.title, Some("Sleep habits".to_string()));

        return Ok(());
    }
}

mod start {
    use super::*;

    #[tokio::test]
    async fn it_answers_every_action_and_stops_when_senders_close() -> Result<()> {
        let backend = fake_backend(Ok("Answer".to_string()), Some("Title".to_string()));
        let (action_tx, mut action_rx) = mpsc::unbounded_channel::<Action>();
        let (event_tx, mut event_rx) = mpsc::unbounded_channel::<Event>();

        action_tx.send(title_action("one", "First"))?;
        action_tx.send(completion_action("one", "First"))?;
        action_tx.send(completion_action("two", "Second"))?;
        drop(action_tx);

        ActionsService::start(backend, event_tx, &mut action_rx).await?;

        let mut completions = vec![];
        let mut titles = vec![];
        while let Some(event) = event_rx.recv().await {
            match event {
                Event::CompletionResponse(res) => completions.push((res.thread_id, res.result)),
                Event::TitleResponse(res) => titles.push((res.thread_id, res.title)),
                _ => bail!("Unexpected event"),
            }
        }
        completions.sort_by(|a, b| return a.0.cmp(&b.0));

        assert_eq!(
            completions,
            vec![
                ("one".to_string(), Ok("Answer (First)".to_string())),
                ("two".to_string(), Ok("Answer (Second)".to_string())),
            ]
        );
        assert_eq!(titles, vec![("one".to_string(), Some("Title".to_string()))]);

        return Ok(());
    }

    #[tokio::test]
    async fn it_round_trips_through_the_remote_backend() -> Result<()> {
        let mut server = mockito::Server::new_async().await;
        let completion_mock = server
            .mock("POST", "/")
            .with_status(200)
            .with_body(r#"{"answer":"Try a ten minute walk."}"#)
            .create_async().await;
        let title_mock = server
            .mock("POST", "/generate-title")
            .with_status(200)
            .with_body(r#"{"title":"Exam stress"}"#)
            .create_async().await;

        let url = server.url();
        let backend: BackendBox = Arc::new(RemoteChat::new(
            &url,
            &format!("{url}/generate-title"),
        ));
        let (action_tx, mut action_rx) = mpsc::unbounded_channel::<Action>();
        let (event_tx, mut event_rx) = mpsc::unbounded_channel::<Event>();

        action_tx.send(title_action("abc", "I'm stressed about exams"))?;
        drop(action_tx);
        ActionsService::start(backend.clone(), event_tx.clone(), &mut action_rx).await?;
        let title = to_title(event_rx.recv().await)?;

        let (action_tx, mut action_rx) = mpsc::unbounded_channel::<Action>();
        action_tx.send(completion_action("abc", "I'm stressed about exams"))?;
        drop(action_tx);
        ActionsService::start(backend, event_tx, &mut action_rx).await?;
        let completion = to_completion(event_rx.recv().await)?;

        completion_mock.assert_async().await;
        title_mock.assert_async().await;
        assert_eq!(title.title, Some("Exam stress".to_string()));
        assert_eq!(completion.thread_id, "abc");
        assert_eq!(completion.result, Ok("Try a ten minute walk.".to_string()));

        return Ok(());
    }
}
