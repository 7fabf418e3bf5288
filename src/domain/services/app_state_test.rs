use anyhow::bail;
use anyhow::Result;
use ratatui::prelude::Rect;
use test_utils::stored_chats_fixture;
use tokio::sync::mpsc;

use super::AppState;
use super::SUGGESTIONS;
use crate::domain::models::Action;
use crate::domain::models::BackendError;
use crate::domain::models::CompletionResult;
use crate::domain::models::Role;
use crate::domain::models::TitleResult;
use crate::domain::services::SessionStore;
use crate::domain::services::FALLBACK_ANSWER;
use crate::domain::services::STORAGE_KEY;
use crate::infrastructure::storage::MemoryStorage;

const WINTER_ID: &str = "5c1f2a9e-0b7d";
const RUNNING_ID: &str = "7d3e8b21-44aa";

async fn app_state() -> Result<AppState> {
    let storage = MemoryStorage::with_entry(STORAGE_KEY, stored_chats_fixture());
    let store = SessionStore::load(Box::new(storage)).await;
    let mut app_state = AppState::new(store, 5, "Sam");
    app_state.set_rect(Rect::new(0, 0, 80, 2));

    return Ok(app_state);
}

async fn empty_app_state() -> Result<AppState> {
    let store = SessionStore::load(Box::new(MemoryStorage::default())).await;
    return Ok(AppState::new(store, 5, "Sam"));
}

fn completion_thread(action: Option<Action>) -> Result<String> {
    match action {
        Some(Action::CompletionRequest(prompt)) => {
            return Ok(prompt.thread_id);
        }
        _ => bail!("Expected a completion request"),
    }
}

fn bottom(app_state: &AppState) -> usize {
    return app_state.bubble_list.len() - app_state.last_known_height as usize;
}

mod scrolling {
    use super::*;

    #[tokio::test]
    async fn it_starts_at_the_bottom_of_the_active_thread() -> Result<()> {
        let app_state = app_state().await?;

        assert!(app_state.bubble_list.len() > 2);
        assert_eq!(app_state.scroll.position, bottom(&app_state));

        return Ok(());
    }

    #[tokio::test]
    async fn it_follows_new_messages_near_the_bottom() -> Result<()> {
        let (tx, _rx) = mpsc::unbounded_channel::<Action>();
        let mut app_state = app_state().await?;

        assert!(app_state.submit("Thanks!", &tx).await?);
        assert_eq!(app_state.scroll.position, bottom(&app_state));

        app_state
            .handle_completion(CompletionResult {
                thread_id: WINTER_ID.to_string(),
                result: Ok("You're welcome.".to_string()),
            }).await;
        assert_eq!(app_state.scroll.position, bottom(&app_state));

        return Ok(());
    }

    #[tokio::test]
    async fn it_keeps_position_when_reading_history() -> Result<()> {
        let (tx, _rx) = mpsc::unbounded_channel::<Action>();
        let mut app_state = app_state().await?;
        app_state.scroll.position = 0;

        assert!(app_state.submit("Thanks!", &tx).await?);
        assert_eq!(app_state.scroll.position, 0);

        app_state
            .handle_completion(CompletionResult {
                thread_id: WINTER_ID.to_string(),
                result: Ok("You're welcome.".to_string()),
            }).await;
        assert_eq!(app_state.scroll.position, 0);

        return Ok(());
    }

    #[tokio::test]
    async fn it_leaves_the_view_alone_for_background_threads() -> Result<()> {
        let (tx, mut rx) = mpsc::unbounded_channel::<Action>();
        let mut app_state = app_state().await?;

        assert!(app_state.submit("Thanks!", &tx).await?);
        assert_eq!(completion_thread(rx.recv().await)?, WINTER_ID);

        assert!(app_state.activate_thread(RUNNING_ID));
        assert!(app_state.bubble_list.is_empty());

        app_state
            .handle_completion(CompletionResult {
                thread_id: WINTER_ID.to_string(),
                result: Err(BackendError::Status(500)),
            }).await;

        assert!(app_state.bubble_list.is_empty());
        let winter = app_state.chat.store().thread(WINTER_ID).unwrap();
        assert_eq!(winter.messages.len(), 4);
        assert_eq!(winter.messages[3].role(), Role::Assistant);
        assert_eq!(winter.messages[3].text(), FALLBACK_ANSWER);

        return Ok(());
    }
}

mod submit {
    use super::*;

    #[tokio::test]
    async fn it_ignores_blank_prompts() -> Result<()> {
        let (tx, mut rx) = mpsc::unbounded_channel::<Action>();
        let mut app_state = app_state().await?;

        assert!(!app_state.submit("   ", &tx).await?);
        assert!(rx.try_recv().is_err());

        return Ok(());
    }

    #[tokio::test]
    async fn it_rejects_a_second_send_while_waiting() -> Result<()> {
        let (tx, _rx) = mpsc::unbounded_channel::<Action>();
        let mut app_state = app_state().await?;

        assert!(app_state.submit("Thanks!", &tx).await?);
        assert!(!app_state.submit("Hello?", &tx).await?);
        assert!(app_state.chat.is_sending());

        return Ok(());
    }

    #[tokio::test]
    async fn it_creates_a_thread_on_an_empty_store() -> Result<()> {
        let (tx, _rx) = mpsc::unbounded_channel::<Action>();
        let mut app_state = empty_app_state().await?;
        assert!(app_state.active_thread().is_none());

        assert!(app_state.submit(SUGGESTIONS[0], &tx).await?);

        let thread = app_state.active_thread().unwrap();
        assert_eq!(thread.messages.len(), 1);
        assert!(!app_state.shows_suggestions());

        return Ok(());
    }

    #[tokio::test]
    async fn it_applies_generated_titles() -> Result<()> {
        let (tx, _rx) = mpsc::unbounded_channel::<Action>();
        let mut app_state = empty_app_state().await?;
        app_state.submit("How much sleep do I need?", &tx).await?;
        let id = app_state.active_thread().unwrap().id.to_string();

        app_state
            .handle_title(TitleResult {
                thread_id: id.to_string(),
                title: Some("Sleep needs".to_string()),
            }).await;

        assert_eq!(app_state.active_thread().unwrap().title, "Sleep needs");

        return Ok(());
    }
}

mod write_failures {
    use super::*;

    #[tokio::test]
    async fn it_keeps_the_conversation_going_when_saving_fails() -> Result<()> {
        let (tx, _rx) = mpsc::unbounded_channel::<Action>();
        let storage = MemoryStorage::with_entry(STORAGE_KEY, stored_chats_fixture());
        let store = SessionStore::load(Box::new(storage.clone())).await;
        let mut app_state = AppState::new(store, 5, "Sam");
        app_state.set_rect(Rect::new(0, 0, 80, 2));
        storage.fail_writes(true);

        assert!(app_state.submit("Thanks!", &tx).await?);
        app_state
            .handle_completion(CompletionResult {
                thread_id: WINTER_ID.to_string(),
                result: Ok("You're welcome.".to_string()),
            })
            .await;

        let winter = app_state.active_thread().unwrap();
        assert_eq!(winter.messages.len(), 4);
        assert_eq!(winter.messages[3].text(), "You're welcome.");
        assert_eq!(app_state.scroll.position, bottom(&app_state));
        assert!(!app_state.chat.is_sending());
        assert_eq!(storage.raw(STORAGE_KEY).as_deref(), Some(stored_chats_fixture()));

        assert!(app_state.submit("One more thing", &tx).await?);

        return Ok(());
    }
}

mod suggestions {
    use super::*;

    #[tokio::test]
    async fn it_cycles_through_suggestions() -> Result<()> {
        let mut app_state = empty_app_state().await?;

        assert_eq!(app_state.next_suggestion(), Some(SUGGESTIONS[0]));
        assert_eq!(app_state.next_suggestion(), Some(SUGGESTIONS[1]));
        assert_eq!(app_state.next_suggestion(), Some(SUGGESTIONS[2]));
        assert_eq!(app_state.next_suggestion(), Some(SUGGESTIONS[0]));

        return Ok(());
    }

    #[tokio::test]
    async fn it_hides_suggestions_once_a_thread_has_messages() -> Result<()> {
        let mut app_state = app_state().await?;
        assert!(!app_state.shows_suggestions());
        assert_eq!(app_state.next_suggestion(), None);

        assert!(app_state.activate_thread(RUNNING_ID));
        assert!(app_state.shows_suggestions());
        assert_eq!(app_state.next_suggestion(), Some(SUGGESTIONS[0]));

        return Ok(());
    }
}

mod sidebar {
    use super::*;

    #[tokio::test]
    async fn it_activates_the_selected_thread() -> Result<()> {
        let mut app_state = app_state().await?;
        app_state.view.toggle_sidebar();
        let count = app_state.threads().len();
        app_state.view.sidebar_down(count);

        assert!(app_state.activate_selected());
        assert_eq!(app_state.active_thread().unwrap().id, RUNNING_ID);

        return Ok(());
    }

    #[tokio::test]
    async fn it_starts_new_chats_at_the_top() -> Result<()> {
        let mut app_state = app_state().await?;
        app_state.view.toggle_sidebar();

        app_state.new_chat().await;

        assert_eq!(app_state.threads().len(), 3);
        assert_eq!(
            app_state.active_thread().unwrap().id,
            app_state.threads()[0].id
        );
        assert!(app_state.shows_suggestions());
        assert!(!app_state.view.sidebar_open);

        return Ok(());
    }

    #[tokio::test]
    async fn it_renames_through_the_menu() -> Result<()> {
        let mut app_state = app_state().await?;
        app_state.view.toggle_sidebar();
        let count = app_state.threads().len();
        app_state.view.sidebar_down(count);
        app_state.open_menu_for_selected();
        app_state.view.choose_menu_item();

        app_state.finish_rename("  Morning runs ").await;

        assert!(app_state.view.renaming.is_none());
        assert_eq!(
            app_state.chat.store().thread(RUNNING_ID).unwrap().title,
            "Morning runs"
        );

        return Ok(());
    }

    #[tokio::test]
    async fn it_deletes_only_when_confirmed() -> Result<()> {
        let mut app_state = app_state().await?;
        app_state.view.toggle_sidebar();
        app_state.open_menu_for_selected();
        app_state.view.menu_down();
        app_state.view.choose_menu_item();

        app_state.finish_delete(false).await;
        assert_eq!(app_state.threads().len(), 2);
        assert!(app_state.view.pending_delete.is_none());

        app_state.open_menu_for_selected();
        app_state.view.menu_down();
        app_state.view.choose_menu_item();
        app_state.finish_delete(true).await;

        assert_eq!(app_state.threads().len(), 1);
        assert_eq!(app_state.active_thread().unwrap().id, RUNNING_ID);
        assert!(app_state.bubble_list.is_empty());

        return Ok(());
    }
}
