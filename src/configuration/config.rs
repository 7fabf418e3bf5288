#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

use std::env;
use std::path;

use anyhow::bail;
use anyhow::Result;
use clap::ArgMatches;
use clap::Command;
use dashmap::DashMap;
use once_cell::sync::Lazy;
use strum::EnumIter;
use strum::EnumVariantNames;
use strum::IntoEnumIterator;
use tokio::fs;

static CONFIG: Lazy<DashMap<String, String>> = Lazy::new(DashMap::new);

#[derive(Clone, Copy, Debug, Eq, PartialEq, EnumIter, EnumVariantNames, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum ConfigKey {
    CompletionURL,
    ConfigFile,
    HistoryWindow,
    StorageDir,
    ThreadID,
    TitleURL,
    Username,
}

/// Keys that only come from the command line, never the config file.
fn is_internal(key: ConfigKey) -> bool {
    return matches!(key, ConfigKey::ConfigFile | ConfigKey::ThreadID);
}

fn config_file(clap_arg_matches: &[&ArgMatches]) -> String {
    let mut config_file = Config::default(ConfigKey::ConfigFile);
    for matches in clap_arg_matches {
        if let Ok(Some(val)) = matches.try_get_one::<String>(&ConfigKey::ConfigFile.to_string()) {
            config_file = val.to_string();
        }
    }

    return config_file;
}

async fn read_config_file(config_path: &path::Path) -> Result<Vec<(ConfigKey, String)>> {
    let toml_str = fs::read_to_string(config_path).await?;
    let doc = toml_str.parse::<toml_edit::Document>()?;

    let mut values = vec![];
    for (name, item) in doc.iter() {
        let key = match ConfigKey::iter().find(|key| return !is_internal(*key) && key.to_string() == name) {
            Some(key) => key,
            None => {
                tracing::warn!(key = name, "Ignoring unknown config key");
                continue;
            }
        };

        let val = match (item.as_integer(), item.as_str()) {
            (Some(val), _) => val.to_string(),
            (None, Some(val)) => val.to_string(),
            _ => bail!(format!(
                "{} has an unsupported value type for key '{key}'",
                config_path.display()
            )),
        };

        if !val.is_empty() {
            values.push((key, val));
        }
    }

    return Ok(values);
}

/// The argument help for `key`, without clap's default suffix.
fn help_text(cmd: &Command, key: ConfigKey) -> String {
    let name = key.to_string();
    let help = cmd
        .get_arguments()
        .find(|arg| return arg.get_id().as_str() == name)
        .and_then(|arg| return arg.get_help())
        .map(|help| return help.to_string())
        .unwrap_or_default();

    return help
        .split("[default:")
        .next()
        .unwrap_or_default()
        .trim()
        .to_string();
}

fn toml_line(key: ConfigKey, val: &str) -> String {
    if val.is_empty() {
        return format!("# {key} = \"\"");
    }
    if val.parse::<i64>().is_ok() {
        return format!("{key} = {val}");
    }

    return format!("{key} = {val:?}");
}

pub struct Config {}

impl Config {
    pub fn get(key: ConfigKey) -> String {
        if let Some(val) = CONFIG.get(&key.to_string()) {
            return val.to_string();
        }

        return "".to_string();
    }

    pub fn set(key: ConfigKey, value: &str) {
        CONFIG.insert(key.to_string(), value.to_string());
    }

    pub fn default(key: ConfigKey) -> String {
        let config_path = dirs::config_dir()
            .unwrap_or_else(env::temp_dir)
            .join("wellchat/config.toml");
        let storage_dir = dirs::cache_dir()
            .unwrap_or_else(env::temp_dir)
            .join("wellchat");

        let res = match key {
            ConfigKey::CompletionURL => "http://localhost:3000/api/chat".to_string(),
            ConfigKey::HistoryWindow => "5".to_string(),
            ConfigKey::StorageDir => storage_dir.to_string_lossy().to_string(),
            ConfigKey::TitleURL => "".to_string(),

            // Special
            ConfigKey::ConfigFile => config_path.to_string_lossy().to_string(),
            ConfigKey::ThreadID => "".to_string(),
            ConfigKey::Username => match env::var("USER") {
                Ok(user) if !user.is_empty() => user,
                _ => "You".to_string(),
            },
        };

        return res;
    }

    /// The title endpoint falls back to a sibling path of the completion
    /// endpoint when not configured.
    pub fn title_url() -> String {
        let title_url = Config::get(ConfigKey::TitleURL);
        if !title_url.is_empty() {
            return title_url;
        }

        let completion_url = Config::get(ConfigKey::CompletionURL);
        return format!(
            "{}/generate-title",
            completion_url.trim_end_matches('/')
        );
    }

    pub fn history_window() -> Result<usize> {
        let val = Config::get(ConfigKey::HistoryWindow);
        return match val.parse::<usize>() {
            Ok(window) => Ok(window),
            Err(_) => bail!(format!("'{val}' is not a valid history window size")),
        };
    }

    pub async fn load(clap_arg_matches: Vec<&ArgMatches>) -> Result<()> {
        for key in ConfigKey::iter() {
            Config::set(key, &Config::default(key));
        }

        let config_path = path::PathBuf::from(config_file(&clap_arg_matches));
        if config_path.exists() {
            for (key, val) in read_config_file(&config_path).await? {
                Config::set(key, &val);
            }
        }

        for key in ConfigKey::iter() {
            for matches in clap_arg_matches.as_slice() {
                if let Ok(Some(val)) = matches.try_get_one::<String>(&key.to_string()) {
                    if !val.is_empty() {
                        Config::set(key, val);
                    }
                }
            }
        }

        Config::history_window()?;

        tracing::debug!(
            username = Config::get(ConfigKey::Username),
            completion_url = Config::get(ConfigKey::CompletionURL),
            title_url = Config::title_url(),
            history_window = Config::get(ConfigKey::HistoryWindow),
            storage_dir = Config::get(ConfigKey::StorageDir),
            "config"
        );

        return Ok(());
    }

    /// Commented TOML listing every file-settable key with its default.
    pub fn serialize_default(cmd: Command) -> String {
        return ConfigKey::iter()
            .filter(|key| return !is_internal(*key))
            .map(|key| {
                let line = match key {
                    // Differs per machine.
                    ConfigKey::Username => format!("# {key} = \"\""),
                    _ => toml_line(key, &Config::default(key)),
                };

                return format!("# {}\n{line}", help_text(&cmd, key));
            })
            .collect::<Vec<String>>()
            .join("\n\n");
    }
}
