use std::env;
use std::io;
use std::path;

use anyhow::bail;
use anyhow::Result;
use clap::value_parser;
use clap::Arg;
use clap::ArgAction;
use clap::ArgGroup;
use clap::ArgMatches;
use clap::Command;
use clap_complete::generate;
use clap_complete::Generator;
use clap_complete::Shell;
use strum::VariantNames;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use yansi::Paint;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::ChatThread;
use crate::domain::services::SessionStore;
use crate::infrastructure::storage::FileStorage;

fn hotkeys_text() -> String {
    let text = r#"
HOTKEYS:
- Enter - Send your question, or confirm the selected item.
- Tab - Fill the prompt with a suggestion while a chat is empty.
- Up/Down arrows - Scroll the conversation, or move through the chat list.
- PageUp/PageDown, CTRL+U/CTRL+D - Scroll a page at a time.
- CTRL+B - Show or hide the chat list.
- CTRL+N - Start a new chat.
- Esc - Cancel a rename or delete, otherwise close the chat list.
- CTRL+C - Exit Wellchat.

CHAT LIST:
- Enter - Open the selected chat.
- m - Open the menu to rename or delete the selected chat.
        "#;

    return text.trim().to_string();
}

fn print_completions<G: Generator>(gen: G, cmd: &mut Command) {
    generate(gen, cmd, cmd.get_name().to_string(), &mut io::stdout());
    std::process::exit(0);
}

fn format_thread(thread: &ChatThread) -> String {
    let mut res = format!(
        "- (ID: {}) {}, {}, Messages: {}",
        thread.id,
        thread.created_at,
        thread.title,
        thread.messages.len()
    );

    if let Some(message) = thread.messages.first() {
        let mut line = message.text().lines().next().unwrap_or_default().to_string();
        if line.chars().count() >= 70 {
            line = format!("{}...", line.chars().take(67).collect::<String>());
        }
        res = format!("{res}, {line}");
    }

    return res;
}

async fn load_store(matches: &[&ArgMatches]) -> Result<SessionStore> {
    Config::load(matches.to_vec()).await?;
    return Ok(SessionStore::load(Box::new(FileStorage::default())).await);
}

fn ensure_saved(store: &SessionStore) -> Result<()> {
    if !store.is_saved() {
        bail!(format!(
            "Failed to save chats to {}",
            FileStorage::default().dir.to_string_lossy()
        ));
    }

    return Ok(());
}

async fn print_chats_list(matches: &[&ArgMatches]) -> Result<()> {
    let store = load_store(matches).await?;
    let threads = store
        .threads()
        .iter()
        .map(format_thread)
        .collect::<Vec<String>>();

    if threads.is_empty() {
        println!("There are no chats available. You should start your first one!");
    } else {
        println!("{}", threads.join("\n"));
    }

    return Ok(());
}

async fn create_config_file() -> Result<()> {
    let config_file_path_str = Config::default(ConfigKey::ConfigFile);
    let config_file_path = path::PathBuf::from(&config_file_path_str);
    if config_file_path.exists() {
        bail!(format!(
            "Config file already exists at {config_file_path_str}"
        ));
    }

    if let Some(parent) = config_file_path.parent() {
        if !parent.exists() {
            fs::create_dir_all(parent).await?;
        }
    }

    let mut file = fs::File::create(config_file_path.clone()).await?;
    file.write_all(Config::serialize_default(build()).as_bytes())
        .await?;

    println!("Created default config file at {config_file_path_str}");
    return Ok(());
}

fn subcommand_completions() -> Command {
    return Command::new("completions")
        .about("Generates shell completions.")
        .arg(
            clap::Arg::new("shell")
                .short('s')
                .long("shell")
                .help("Which shell to generate completions for.")
                .action(ArgAction::Set)
                .value_parser(value_parser!(Shell))
                .required(true),
        );
}

fn subcommand_config() -> Command {
    return Command::new("config")
        .about("Configuration file options.")
        .subcommand(
            Command::new("create").about("Saves the default config file to the configuration file path. This command will fail if the file exists already.")
        )
        .subcommand(
            Command::new("default").about("Outputs the default configuration file to stdout.")
        )
        .subcommand(
            Command::new("path").about("Returns the default path for the configuration file.")
        );
}

fn subcommand_debug() -> Command {
    let mut cmd = Command::new("debug");
    cmd = cmd.about("Debug helpers for Wellchat")
        .hide(true)
        .subcommand(
            Command::new("log-path").about("Output path to debug log file generated when running Wellchat with environment variable RUST_LOG=wellchat")
        )
        .subcommand(
            Command::new("enum-config").about("List all config keys as strings.")
        );

    return cmd;
}

fn arg_thread_id() -> Arg {
    return Arg::new(ConfigKey::ThreadID.to_string())
        .short('i')
        .long("id")
        .help("Chat ID")
        .num_args(1);
}

fn subcommand_chats_delete() -> Command {
    return Command::new("delete")
        .about("Delete one or all chats.")
        .arg(arg_thread_id())
        .arg(
            clap::Arg::new("all")
                .long("all")
                .help("Delete all chats.")
                .action(ArgAction::SetTrue),
        )
        .group(
            ArgGroup::new("delete-args")
                .args([ConfigKey::ThreadID.to_string(), "all".to_string()])
                .required(true),
        );
}

fn subcommand_chats() -> Command {
    return Command::new("chats")
        .about("Manage saved chats.")
        .arg_required_else_help(true)
        .subcommand(Command::new("dir").about("Print the directory chats are stored in."))
        .subcommand(Command::new("list").about("List all saved chats with their ids and titles, most recent first."))
        .subcommand(
            Command::new("open")
                .about("Open a saved chat by ID.")
                .arg(arg_thread_id().required(true)),
        )
        .subcommand(
            Command::new("rename")
                .about("Rename a saved chat.")
                .arg(arg_thread_id().required(true))
                .arg(
                    clap::Arg::new("title")
                        .short('t')
                        .long("title")
                        .help("New title")
                        .num_args(1)
                        .required(true),
                ),
        )
        .subcommand(subcommand_chats_delete());
}

fn subcommand_chat() -> Command {
    return Command::new("chat").about("Open the chat UI on the most recent chat.");
}

pub fn build() -> Command {
    let hotkeys = hotkeys_text()
        .split('\n')
        .map(|line| {
            if line.starts_with('-') {
                return format!("  {line}");
            }
            if line.starts_with("HOTKEYS:") || line.starts_with("CHAT LIST:") {
                return Paint::new(format!("CHAT {line}"))
                    .underline()
                    .bold()
                    .to_string();
            }
            return line.to_string();
        })
        .collect::<Vec<String>>()
        .join("\n");

    let about = format!(
        "{}\n\nVersion: {}\nCommit: {}",
        env!("CARGO_PKG_DESCRIPTION"),
        env!("CARGO_PKG_VERSION"),
        env!("VERGEN_GIT_DESCRIBE")
    );

    return Command::new("wellchat")
        .about(about)
        .author(env!("CARGO_PKG_AUTHORS"))
        .version(env!("CARGO_PKG_VERSION"))
        .after_help(hotkeys)
        .arg_required_else_help(false)
        .subcommand(subcommand_chat())
        .subcommand(subcommand_chats())
        .subcommand(subcommand_completions())
        .subcommand(subcommand_config())
        .subcommand(subcommand_debug())
        .arg(
            Arg::new(ConfigKey::ConfigFile.to_string())
                .short('c')
                .long(ConfigKey::ConfigFile.to_string())
                .env("WELLCHAT_CONFIG_FILE")
                .num_args(1)
                .help(format!("Path to configuration file [default: {}]", Config::default(ConfigKey::ConfigFile)))
                .global(true)
        )
        .arg(
            Arg::new(ConfigKey::CompletionURL.to_string())
                .long(ConfigKey::CompletionURL.to_string())
                .env("WELLCHAT_COMPLETION_URL")
                .num_args(1)
                .help(format!("Chat completion API URL. [default: {}]", Config::default(ConfigKey::CompletionURL)))
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::TitleURL.to_string())
                .long(ConfigKey::TitleURL.to_string())
                .env("WELLCHAT_TITLE_URL")
                .num_args(1)
                .help("Title generation API URL. Defaults to the completion URL followed by /generate-title.")
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::HistoryWindow.to_string())
                .long(ConfigKey::HistoryWindow.to_string())
                .env("WELLCHAT_HISTORY_WINDOW")
                .num_args(1)
                .help(format!("Number of previous messages sent along with each question. [default: {}]", Config::default(ConfigKey::HistoryWindow)))
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::StorageDir.to_string())
                .long(ConfigKey::StorageDir.to_string())
                .env("WELLCHAT_STORAGE_DIR")
                .num_args(1)
                .help(format!("Directory chats are saved in. [default: {}]", Config::default(ConfigKey::StorageDir)))
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::Username.to_string())
                .short('u')
                .long(ConfigKey::Username.to_string())
                .env("WELLCHAT_USERNAME")
                .num_args(1)
                .help("Your name displayed above your chat bubbles. Defaults to $USER.")
                .global(true),
        );
}

/// Returns true when the chat UI should start.
pub async fn parse() -> Result<bool> {
    let matches = build().get_matches();

    match matches.subcommand() {
        Some(("debug", debug_matches)) => {
            match debug_matches.subcommand() {
                Some(("log-path", _)) => {
                    let log_path = dirs::cache_dir()
                        .unwrap_or_else(env::temp_dir)
                        .join("wellchat/debug.log");
                    println!("{}", log_path.to_string_lossy());
                }
                Some(("enum-config", _)) => {
                    let res = ConfigKey::VARIANTS.join("\n");
                    println!("{}", res);
                }
                _ => {
                    subcommand_debug().print_long_help()?;
                }
            }

            return Ok(false);
        }
        Some(("chat", subcmd_matches)) => {
            Config::load(vec![&matches, subcmd_matches]).await?;
        }
        Some(("completions", subcmd_matches)) => {
            if let Some(completions) = subcmd_matches.get_one::<Shell>("shell").copied() {
                let mut app = build();
                print_completions(completions, &mut app);
            }
        }
        Some(("config", subcmd_matches)) => match subcmd_matches.subcommand() {
            Some(("create", _)) => {
                create_config_file().await?;
                return Ok(false);
            }
            Some(("default", _)) => {
                println!("{}", Config::serialize_default(build()));
                return Ok(false);
            }
            Some(("path", _)) => {
                println!("{}", Config::default(ConfigKey::ConfigFile));
                return Ok(false);
            }
            _ => {
                subcommand_config().print_long_help()?;
                return Ok(false);
            }
        },
        Some(("chats", subcmd_matches)) => match subcmd_matches.subcommand() {
            Some(("dir", dir_matches)) => {
                Config::load(vec![&matches, subcmd_matches, dir_matches]).await?;
                println!("{}", FileStorage::default().dir.to_string_lossy());
                return Ok(false);
            }
            Some(("list", list_matches)) => {
                print_chats_list(&[&matches, subcmd_matches, list_matches]).await?;
                return Ok(false);
            }
            Some(("open", open_matches)) => {
                Config::load(vec![&matches, subcmd_matches, open_matches]).await?;
            }
            Some(("rename", rename_matches)) => {
                let mut store = load_store(&[&matches, subcmd_matches, rename_matches]).await?;
                let thread_id = Config::get(ConfigKey::ThreadID);
                let title = rename_matches
                    .get_one::<String>("title")
                    .map(|title| return title.to_string())
                    .unwrap_or_default();

                if !store.rename_thread(&thread_id, &title).await {
                    bail!(format!("Could not rename chat {thread_id}, it does not exist or the title is blank"));
                }
                ensure_saved(&store)?;
                println!("Renamed chat {thread_id}");
                return Ok(false);
            }
            Some(("delete", delete_matches)) => {
                let mut store = load_store(&[&matches, subcmd_matches, delete_matches]).await?;
                if delete_matches.get_flag("all") {
                    store.delete_all().await;
                    ensure_saved(&store)?;
                    println!("Deleted all chats");
                } else {
                    let thread_id = Config::get(ConfigKey::ThreadID);
                    if !store.delete_thread(&thread_id).await {
                        bail!(format!("No chat found with ID {thread_id}"));
                    }
                    ensure_saved(&store)?;
                    println!("Deleted chat {thread_id}");
                }
                return Ok(false);
            }
            _ => {
                subcommand_chats().print_long_help()?;
                return Ok(false);
            }
        },
        _ => {
            Config::load(vec![&matches]).await?;
        }
    }

    return Ok(true);
}
