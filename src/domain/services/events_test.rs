use crossterm::event::Event as CrosstermEvent;
use crossterm::event::KeyCode;
use crossterm::event::KeyEvent;
use crossterm::event::KeyModifiers;
use crossterm::event::MouseButton;
use crossterm::event::MouseEvent;
use crossterm::event::MouseEventKind;
use tui_textarea::Input;
use tui_textarea::Key;

use super::map_key;
use super::map_mouse;
use super::map_terminal_event;
use crate::domain::models::Event;

fn key(key: Key, ctrl: bool) -> Input {
    return Input {
        key,
        ctrl,
        alt: false,
    };
}

fn mouse(kind: MouseEventKind) -> MouseEvent {
    return MouseEvent {
        kind,
        column: 12,
        row: 4,
        modifiers: KeyModifiers::NONE,
    };
}

#[test]
fn it_maps_control_shortcuts() {
    assert!(matches!(map_key(key(Key::Char('b'), true)), Event::KeyboardCTRLB()));
    assert!(matches!(map_key(key(Key::Char('c'), true)), Event::KeyboardCTRLC()));
    assert!(matches!(map_key(key(Key::Char('n'), true)), Event::KeyboardCTRLN()));
    assert!(matches!(map_key(key(Key::Char('u'), true)), Event::UIScrollPageUp()));
    assert!(matches!(map_key(key(Key::Char('d'), true)), Event::UIScrollPageDown()));
}

#[test]
fn it_passes_plain_letters_through_as_input() {
    for letter in ['b', 'c', 'n', 'u', 'd', 'm', 'y'] {
        match map_key(key(Key::Char(letter), false)) {
            Event::KeyboardCharInput(input) => {
                assert!(matches!(input.key, Key::Char(c) if c == letter));
                assert!(!input.ctrl);
            }
            _ => panic!("Expected {letter} to be passed through"),
        }
    }
}

#[test]
fn it_maps_navigation_keys() {
    assert!(matches!(map_key(key(Key::Up, false)), Event::UIScrollUp()));
    assert!(matches!(map_key(key(Key::Down, false)), Event::UIScrollDown()));
    assert!(matches!(map_key(key(Key::PageUp, false)), Event::UIScrollPageUp()));
    assert!(matches!(map_key(key(Key::PageDown, false)), Event::UIScrollPageDown()));
    assert!(matches!(map_key(key(Key::Enter, false)), Event::KeyboardEnter()));
    assert!(matches!(map_key(key(Key::Esc, false)), Event::KeyboardEsc()));
    assert!(matches!(map_key(key(Key::Tab, false)), Event::KeyboardTab()));
}

#[test]
fn it_maps_left_clicks_with_their_position() {
    let event = map_mouse(mouse(MouseEventKind::Down(MouseButton::Left)));
    assert!(matches!(event, Some(Event::MouseClick(12, 4))));

    assert!(map_mouse(mouse(MouseEventKind::Down(MouseButton::Right))).is_none());
    assert!(map_mouse(mouse(MouseEventKind::Moved)).is_none());
    assert!(matches!(
        map_mouse(mouse(MouseEventKind::ScrollUp)),
        Some(Event::UIScrollUp())
    ));
}

#[test]
fn it_maps_terminal_events() {
    let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
    assert!(matches!(
        map_terminal_event(CrosstermEvent::Key(ctrl_c)),
        Some(Event::KeyboardCTRLC())
    ));

    match map_terminal_event(CrosstermEvent::Paste("line one\nline two".to_string())) {
        Some(Event::KeyboardPaste(text)) => assert_eq!(text, "line one\nline two"),
        _ => panic!("Expected a paste event"),
    }

    assert!(map_terminal_event(CrosstermEvent::Resize(80, 24)).is_none());
    assert!(map_terminal_event(CrosstermEvent::FocusGained).is_none());
}
