#[cfg(test)]
#[path = "remote_test.rs"]
mod tests;

use anyhow::Result;
use async_trait::async_trait;
use serde_derive::Deserialize;
use serde_derive::Serialize;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::Backend;
use crate::domain::models::BackendError;
use crate::domain::models::ChatTurn;
use crate::domain::models::CompletionPrompt;

pub const EMPTY_ANSWER_PLACEHOLDER: &str =
    "I don't have an answer for that yet. Try asking in a different way.";

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct CompletionRequest {
    messages: Vec<ChatTurn>,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct Source {
    title: String,
    url: String,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct CompletionResponse {
    answer: Option<String>,
    #[serde(default)]
    sources: Option<Vec<Source>>,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct TitleRequest {
    text: String,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct TitleResponse {
    title: Option<String>,
}

fn format_answer(res: CompletionResponse) -> String {
    let answer = res.answer.unwrap_or_default().trim().to_string();
    if answer.is_empty() {
        return EMPTY_ANSWER_PLACEHOLDER.to_string();
    }

    let sources = res.sources.unwrap_or_default();
    if sources.is_empty() {
        return answer;
    }

    let sources_list = sources
        .iter()
        .map(|source| {
            return format!("- {} ({})", source.title.trim(), source.url.trim());
        })
        .collect::<Vec<String>>()
        .join("\n");

    return format!("{answer}\n\nSources:\n{sources_list}");
}

/// Client for the chat completion endpoint and its title sibling.
pub struct RemoteChat {
    url: String,
    title_url: String,
}

impl Default for RemoteChat {
    fn default() -> RemoteChat {
        return RemoteChat::new(&Config::get(ConfigKey::CompletionURL), &Config::title_url());
    }
}

impl RemoteChat {
    pub fn new(url: &str, title_url: &str) -> RemoteChat {
        return RemoteChat {
            url: url.to_string(),
            title_url: title_url.to_string(),
        };
    }

    async fn request_title(&self, text: &str) -> Result<Option<String>> {
        let req = TitleRequest {
            text: text.to_string(),
        };

        let res = reqwest::Client::new()
            .post(&self.title_url)
            .json(&req)
            .send()
            .await?
            .error_for_status()?
            .json::<TitleResponse>()
            .await?;

        let title = res.title.unwrap_or_default().trim().to_string();
        if title.is_empty() {
            return Ok(None);
        }

        return Ok(Some(title));
    }
}

#[async_trait]
impl Backend for RemoteChat {
    #[allow(clippy::implicit_return)]
    async fn get_completion(&self, prompt: &CompletionPrompt) -> Result<String, BackendError> {
        let req = CompletionRequest {
            messages: prompt.turns(),
        };
        tracing::debug!(body = ?req, "Completion request");

        let res = reqwest::Client::new()
            .post(&self.url)
            .json(&req)
            .send()
            .await
            .map_err(|err| return BackendError::Transport(err.to_string()))?;

        if !res.status().is_success() {
            tracing::error!(
                status = res.status().as_u16(),
                "Failed to make completion request"
            );
            return Err(BackendError::Status(res.status().as_u16()));
        }

        let body = res
            .text()
            .await
            .map_err(|err| return BackendError::Transport(err.to_string()))?;

        let cres = serde_json::from_str::<CompletionResponse>(&body).map_err(|err| {
            tracing::error!(error = ?err, "Completion response has an unexpected shape");
            return BackendError::InvalidPayload(err.to_string());
        })?;
        tracing::debug!(body = ?cres, "Completion response");

        return Ok(format_answer(cres));
    }

    #[allow(clippy::implicit_return)]
    async fn generate_title(&self, text: &str) -> Option<String> {
        match self.request_title(text).await {
            Ok(title) => {
                return title;
            }
            Err(err) => {
                tracing::warn!(error = ?err, "Title generation failed");
                return None;
            }
        }
    }
}
