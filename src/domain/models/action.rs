use super::CompletionPrompt;
use super::TitlePrompt;

pub enum Action {
    CompletionRequest(CompletionPrompt),
    TitleRequest(TitlePrompt),
}
