use tui_textarea::Input;

use super::CompletionResult;
use super::TitleResult;

pub enum Event {
    CompletionResponse(CompletionResult),
    TitleResponse(TitleResult),
    KeyboardCharInput(Input),
    KeyboardCTRLB(),
    KeyboardCTRLC(),
    KeyboardCTRLN(),
    KeyboardEnter(),
    KeyboardEsc(),
    KeyboardPaste(String),
    KeyboardTab(),
    MouseClick(u16, u16),
    UIScrollDown(),
    UIScrollUp(),
    UIScrollPageDown(),
    UIScrollPageUp(),
    UITick(),
}
