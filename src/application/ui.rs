use std::io;

use anyhow::bail;
use anyhow::Result;
use crossterm::cursor;
use crossterm::event::DisableBracketedPaste;
use crossterm::event::DisableMouseCapture;
use crossterm::event::EnableBracketedPaste;
use crossterm::event::EnableMouseCapture;
use crossterm::terminal::disable_raw_mode;
use crossterm::terminal::enable_raw_mode;
use crossterm::terminal::EnterAlternateScreen;
use crossterm::terminal::LeaveAlternateScreen;
use ratatui::backend::CrosstermBackend;
use ratatui::prelude::*;
use ratatui::widgets::Block;
use ratatui::widgets::BorderType;
use ratatui::widgets::Borders;
use ratatui::widgets::Clear;
use ratatui::widgets::List;
use ratatui::widgets::ListItem;
use ratatui::widgets::ListState;
use ratatui::widgets::Paragraph;
use ratatui::widgets::Wrap;
use ratatui::Terminal;
use tokio::sync::mpsc;
use tui_textarea::Input;
use tui_textarea::Key;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::Action;
use crate::domain::models::Event;
use crate::domain::models::TextArea;
use crate::domain::services::events::EventsService;
use crate::domain::services::AppState;
use crate::domain::services::Focus;
use crate::domain::services::MenuItem;
use crate::domain::services::SessionStore;
use crate::domain::services::GREETING;
use crate::domain::services::SUGGESTIONS;
use crate::infrastructure::storage::FileStorage;

const SIDEBAR_WIDTH: u16 = 32;

fn type_into(textarea: &mut tui_textarea::TextArea, text: &str) {
    for char in text.chars() {
        textarea.input(Input {
            key: Key::Char(char),
            ctrl: false,
            alt: false,
        });
    }
}

fn centered_rect(width: u16, height: u16, rect: Rect) -> Rect {
    let width = width.min(rect.width);
    let height = height.min(rect.height);

    return Rect::new(
        rect.x + (rect.width - width) / 2,
        rect.y + (rect.height - height) / 2,
        width,
        height,
    );
}

fn popup_block(title: &str) -> Block<'static> {
    return Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Double)
        .title(title.to_string());
}

fn render_suggestions<B: Backend>(frame: &mut Frame<B>, rect: Rect) {
    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            GREETING,
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];

    for (idx, suggestion) in SUGGESTIONS.iter().enumerate() {
        lines.push(Line::from(format!("{}. {suggestion}", idx + 1)));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Press Tab to use a suggestion.",
        Style::default().add_modifier(Modifier::DIM),
    )));

    frame.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
        rect,
    );
}

fn render_sidebar<B: Backend>(frame: &mut Frame<B>, rect: Rect, app_state: &mut AppState) {
    let active_id = app_state
        .active_thread()
        .map(|thread| return thread.id.to_string());

    let items = app_state
        .threads()
        .iter()
        .map(|thread| {
            let mut title = thread.title.to_string();
            if app_state.chat.is_thread_sending(&thread.id) {
                title = format!("{title} …");
            }

            let mut style = Style::default();
            if active_id.as_deref() == Some(thread.id.as_str()) {
                style = style.add_modifier(Modifier::BOLD);
            }

            return ListItem::new(title).style(style);
        })
        .collect::<Vec<ListItem>>();

    let mut state = ListState::default();
    if !items.is_empty() {
        state.select(Some(app_state.view.sidebar_cursor));
    }

    frame.render_stateful_widget(
        List::new(items)
            .block(popup_block("Chats"))
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("> "),
        rect,
        &mut state,
    );

    let cursor = match app_state.view.menu.as_ref() {
        Some(menu) => menu.cursor,
        None => {
            return;
        }
    };

    let row = u16::try_from(app_state.view.sidebar_cursor)
        .unwrap_or(u16::MAX)
        .min(rect.height.saturating_sub(4));
    let area = Rect::new(rect.x + 2, rect.y + 2 + row, 14, 4).intersection(frame.size());

    let mut menu_state = ListState::default();
    menu_state.select(Some(cursor));
    let menu_items = MenuItem::ALL
        .iter()
        .map(|item| return ListItem::new(item.label()))
        .collect::<Vec<ListItem>>();

    frame.render_widget(Clear, area);
    frame.render_stateful_widget(
        List::new(menu_items)
            .block(popup_block(""))
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED)),
        area,
        &mut menu_state,
    );
    app_state.view.set_menu_area(area);
}

fn render_confirm_delete<B: Backend>(frame: &mut Frame<B>, app_state: &AppState) {
    let title = app_state
        .view
        .pending_delete
        .as_deref()
        .and_then(|id| return app_state.chat.store().thread(id))
        .map(|thread| return thread.title.to_string())
        .unwrap_or_default();

    let area = centered_rect(50, 6, frame.size());
    frame.render_widget(Clear, area);
    frame.render_widget(
        Paragraph::new(format!(
            "Delete \"{title}\"?\nPress y to confirm, any other key to cancel."
        ))
        .block(popup_block("Delete chat"))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true }),
        area,
    );
}

fn draw<B: Backend>(
    frame: &mut Frame<B>,
    app_state: &mut AppState,
    textarea: &tui_textarea::TextArea,
    rename_textarea: &tui_textarea::TextArea,
) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![Constraint::Min(1), Constraint::Max(4)])
        .split(frame.size());

    let mut chat_rect = layout[0];
    if app_state.view.sidebar_open {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(vec![Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(1)])
            .split(layout[0]);
        chat_rect = columns[1];
        render_sidebar(frame, columns[0], app_state);
    }

    if chat_rect.width != app_state.last_known_width
        || chat_rect.height != app_state.last_known_height
    {
        app_state.set_rect(chat_rect);
    }

    if app_state.shows_suggestions() {
        render_suggestions(frame, chat_rect);
    } else {
        app_state
            .bubble_list
            .render(frame, chat_rect, app_state.scroll.position);
    }

    match app_state.view.focus() {
        Focus::Rename => {
            frame.render_widget(rename_textarea.widget(), layout[1]);
        }
        _ if app_state.chat.is_sending() => {
            app_state.loading.render(frame, layout[1]);
        }
        _ => {
            frame.render_widget(textarea.widget(), layout[1]);
        }
    }

    if app_state.view.focus() == Focus::ConfirmDelete {
        render_confirm_delete(frame, app_state);
    }
}

async fn start_loop<B: Backend>(
    terminal: &mut Terminal<B>,
    app_state: &mut AppState,
    tx: mpsc::UnboundedSender<Action>,
    rx: mpsc::UnboundedReceiver<Event>,
) -> Result<()> {
    let mut events = EventsService::new(rx);
    let mut textarea = TextArea::default();
    let mut rename_textarea = TextArea::with_title("New title");

    #[cfg(feature = "dev")]
    {
        type_into(&mut textarea, SUGGESTIONS[0]);
    }

    loop {
        terminal.draw(|frame| {
            draw(frame, app_state, &textarea, &rename_textarea);
        })?;

        let focus = app_state.view.focus();
        match events.next().await? {
            Event::CompletionResponse(res) => {
                app_state.handle_completion(res).await;
            }
            Event::TitleResponse(res) => {
                app_state.handle_title(res).await;
            }
            Event::KeyboardCTRLC() => {
                break;
            }
            Event::KeyboardCTRLB() => {
                app_state.view.toggle_sidebar();
            }
            Event::KeyboardCTRLN() => {
                app_state.new_chat().await;
                textarea = TextArea::default();
            }
            Event::KeyboardEsc() => {
                app_state.view.cancel();
            }
            Event::KeyboardTab() => {
                if focus == Focus::Input && !app_state.chat.is_sending() {
                    if let Some(suggestion) = app_state.next_suggestion() {
                        textarea = TextArea::default();
                        type_into(&mut textarea, suggestion);
                    }
                }
            }
            Event::KeyboardEnter() => match focus {
                Focus::Input => {
                    let input_str = textarea.lines().join("\n");
                    if app_state.submit(&input_str, &tx).await? {
                        textarea = TextArea::default();
                    }
                }
                Focus::Sidebar => {
                    if app_state.activate_selected() {
                        app_state.view.close_sidebar();
                    }
                }
                Focus::Menu => {
                    if app_state.view.choose_menu_item() == Some(MenuItem::Rename) {
                        rename_textarea = TextArea::with_title("New title");
                        let current = app_state
                            .view
                            .renaming
                            .as_deref()
                            .and_then(|id| return app_state.chat.store().thread(id))
                            .map(|thread| return thread.title.to_string())
                            .unwrap_or_default();
                        type_into(&mut rename_textarea, &current);
                    }
                }
                Focus::Rename => {
                    let title = rename_textarea.lines().join(" ");
                    app_state.finish_rename(&title).await;
                }
                Focus::ConfirmDelete => {
                    app_state.finish_delete(false).await;
                }
            },
            Event::KeyboardCharInput(input) => match focus {
                Focus::Input => {
                    if !app_state.chat.is_sending() {
                        textarea.input(input);
                    }
                }
                Focus::Sidebar => {
                    if matches!(input.key, Key::Char('m')) {
                        app_state.open_menu_for_selected();
                    }
                }
                Focus::Menu => {}
                Focus::Rename => {
                    rename_textarea.input(input);
                }
                Focus::ConfirmDelete => {
                    let confirmed = matches!(input.key, Key::Char('y') | Key::Char('Y'));
                    app_state.finish_delete(confirmed).await;
                }
            },
            Event::KeyboardPaste(text) => match focus {
                Focus::Input => {
                    if !app_state.chat.is_sending() {
                        textarea.set_yank_text(text.replace('\r', "\n"));
                        textarea.paste();
                    }
                }
                Focus::Rename => {
                    rename_textarea.set_yank_text(text.replace(['\r', '\n'], " "));
                    rename_textarea.paste();
                }
                _ => {}
            },
            Event::MouseClick(column, row) => {
                app_state.view.click(column, row);
            }
            Event::UIScrollDown() => match focus {
                Focus::Sidebar => {
                    let count = app_state.threads().len();
                    app_state.view.sidebar_down(count);
                }
                Focus::Menu => {
                    app_state.view.menu_down();
                }
                _ => {
                    app_state.scroll.down();
                }
            },
            Event::UIScrollUp() => match focus {
                Focus::Sidebar => {
                    app_state.view.sidebar_up();
                }
                Focus::Menu => {
                    app_state.view.menu_up();
                }
                _ => {
                    app_state.scroll.up();
                }
            },
            Event::UIScrollPageDown() => {
                app_state.scroll.down_page();
            }
            Event::UIScrollPageUp() => {
                app_state.scroll.up_page();
            }
            Event::UITick() => {
                app_state.loading.tick();
            }
        }
    }

    return Ok(());
}

async fn load_app_state() -> Result<AppState> {
    let store = SessionStore::load(Box::new(FileStorage::default())).await;
    let mut app_state = AppState::new(
        store,
        Config::history_window()?,
        &Config::get(ConfigKey::Username),
    );

    let thread_id = Config::get(ConfigKey::ThreadID);
    if !thread_id.is_empty() && !app_state.activate_thread(&thread_id) {
        bail!(format!("No chat found with ID {thread_id}"));
    }

    return Ok(app_state);
}

pub fn destruct_terminal_for_panic() {
    let _ = disable_raw_mode();
    let _ = crossterm::execute!(
        io::stdout(),
        LeaveAlternateScreen,
        DisableMouseCapture,
        DisableBracketedPaste
    );
    let _ = crossterm::execute!(io::stdout(), cursor::Show);
}

pub async fn start(
    tx: mpsc::UnboundedSender<Action>,
    rx: mpsc::UnboundedReceiver<Event>,
) -> Result<()> {
    let mut app_state = load_app_state().await?;

    let stdout = io::stdout();
    let mut stdout = stdout.lock();

    enable_raw_mode()?;
    crossterm::execute!(
        stdout,
        EnterAlternateScreen,
        EnableMouseCapture,
        EnableBracketedPaste
    )?;
    let term_backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(term_backend)?;

    start_loop(&mut terminal, &mut app_state, tx, rx).await?;

    disable_raw_mode()?;
    crossterm::execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture,
        DisableBracketedPaste
    )?;
    terminal.show_cursor()?;

    return Ok(());
}
