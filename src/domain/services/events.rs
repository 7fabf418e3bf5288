#[cfg(test)]
#[path = "events_test.rs"]
mod tests;

use anyhow::Result;
use crossterm::event::Event as CrosstermEvent;
use crossterm::event::EventStream;
use crossterm::event::MouseButton;
use crossterm::event::MouseEvent;
use crossterm::event::MouseEventKind;
use futures::StreamExt;
use tokio::sync::mpsc;
use tokio::time;
use tui_textarea::Input;
use tui_textarea::Key;

use crate::domain::models::Event;

/// Drives the loading animation and redraws while nothing else happens.
const TICK_INTERVAL: time::Duration = time::Duration::from_millis(500);

/// Keys the UI handles itself. Everything else goes to the focused text area
/// as character input.
fn map_key(input: Input) -> Event {
    let event = match (input.key, input.ctrl) {
        (Key::Up | Key::MouseScrollUp, _) => Event::UIScrollUp(),
        (Key::Down | Key::MouseScrollDown, _) => Event::UIScrollDown(),
        (Key::PageUp, _) | (Key::Char('u'), true) => Event::UIScrollPageUp(),
        (Key::PageDown, _) | (Key::Char('d'), true) => Event::UIScrollPageDown(),
        (Key::Char('b'), true) => Event::KeyboardCTRLB(),
        (Key::Char('c'), true) => Event::KeyboardCTRLC(),
        (Key::Char('n'), true) => Event::KeyboardCTRLN(),
        (Key::Enter, _) => Event::KeyboardEnter(),
        (Key::Esc, _) => Event::KeyboardEsc(),
        (Key::Tab, _) => Event::KeyboardTab(),
        _ => Event::KeyboardCharInput(input),
    };

    return event;
}

fn map_mouse(mouse: MouseEvent) -> Option<Event> {
    match mouse.kind {
        MouseEventKind::ScrollUp => return Some(Event::UIScrollUp()),
        MouseEventKind::ScrollDown => return Some(Event::UIScrollDown()),
        MouseEventKind::Down(MouseButton::Left) => {
            return Some(Event::MouseClick(mouse.column, mouse.row));
        }
        _ => return None,
    }
}

fn map_terminal_event(event: CrosstermEvent) -> Option<Event> {
    match event {
        CrosstermEvent::Key(key) => return Some(map_key(key.into())),
        CrosstermEvent::Mouse(mouse) => return map_mouse(mouse),
        CrosstermEvent::Paste(text) => return Some(Event::KeyboardPaste(text)),
        _ => return None,
    }
}

/// Single source of events for the UI loop: terminal input, worker
/// responses, and a steady tick.
pub struct EventsService {
    terminal_events: EventStream,
    worker_events: mpsc::UnboundedReceiver<Event>,
    ticks: time::Interval,
}

impl EventsService {
    pub fn new(worker_events: mpsc::UnboundedReceiver<Event>) -> EventsService {
        let mut ticks = time::interval(TICK_INTERVAL);
        ticks.set_missed_tick_behavior(time::MissedTickBehavior::Delay);

        return EventsService {
            terminal_events: EventStream::new(),
            worker_events,
            ticks,
        };
    }

    pub async fn next(&mut self) -> Result<Event> {
        loop {
            let event = tokio::select! {
                event = self.worker_events.recv() => event,
                event = self.terminal_events.next() => match event {
                    Some(Ok(event)) => map_terminal_event(event),
                    Some(Err(err)) => {
                        tracing::warn!(error = ?err, "Failed to read terminal event");
                        None
                    }
                    None => None,
                },
                _ = self.ticks.tick() => Some(Event::UITick()),
            };

            if let Some(event) = event {
                return Ok(event);
            }
        }
    }
}
