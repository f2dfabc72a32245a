use std::io::stdout;
use std::path::PathBuf;

use clap::Parser;
use env_logger::Env;
use log::{info, warn};
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::{CompletionType, Editor};

use crate::config::Config;
use crate::controller::{parse_and_run_command, Session};
use crate::editor::FintrackHelper;

mod backup;
mod config;
mod controller;
mod db;
mod editor;
mod live_edit;
mod parser;
mod period;
mod report;
mod suggest;
mod tokeniser;
mod transaction;
mod util;

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
#[clap(propagate_version = true)]
struct Cli {
    /// Config file path
    #[clap(long)]
    config: Option<PathBuf>,

    /// Data file path, overrides database_path from config for this session
    #[clap(long)]
    data: Option<PathBuf>,

    /// Run a single statement and exit
    #[clap(short, long)]
    command: Option<String>,
}

static COMMAND_HISTORY_FILE: &str = ".fintrack_history";
static PROMPT: &str = "fintrack> ";

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let cli: Cli = Cli::parse();

    let config_path = cli.config.unwrap_or_else(config::default_config_path);
    let mut config = Config::load_from_file(&config_path)?;
    if let Some(data) = cli.data {
        config.database_path = data;
    }

    let mut session = Session::open(config)?;
    info!("Loaded {} transactions from {}", session.db.len(), session.db.file_path().display());

    if let Some(command) = cli.command {
        return parse_and_run_command(&mut session, &command, &mut stdout());
    }

    let history_file = session.config.database_path
        .parent()
        .map(|dir| dir.join(COMMAND_HISTORY_FILE))
        .unwrap_or_else(|| PathBuf::from(COMMAND_HISTORY_FILE));

    let rl_config = rustyline::Config::builder()
        .auto_add_history(false)
        .completion_type(CompletionType::List)
        .build();
    let mut rl: Editor<FintrackHelper, DefaultHistory> = Editor::with_config(rl_config)?;
    rl.set_helper(Some(FintrackHelper::new(PROMPT, session.suggestions.all_descriptions())));
    if rl.load_history(&history_file).is_err() {
        println!("No previous history.");
    }

    let mut command_buffer: Vec<String> = vec![];
    loop {
        let prompt = if command_buffer.is_empty() { PROMPT } else { "... " };
        match rl.readline(prompt) {
            Ok(line) => {
                let line = line.trim();
                let is_last = line.ends_with(';');
                if !line.is_empty() {
                    command_buffer.push(line.to_string());
                }
                if is_last {
                    let command = command_buffer.join("\n");
                    rl.add_history_entry(command.trim())?;

                    if let Err(err) = parse_and_run_command(&mut session, &command, &mut stdout()) {
                        println!("{err}");
                    }
                    if let Some(helper) = rl.helper_mut() {
                        helper.descriptions = session.suggestions.all_descriptions();
                    }

                    command_buffer.clear();
                }
            },
            Err(ReadlineError::Interrupted) => {
                println!("CTRL-C");
                break
            },
            Err(ReadlineError::Eof) => {
                println!("CTRL-D");
                break
            },
            Err(err) => {
                println!("Error: {:?}", err);
                break
            }
        }
    }

    if let Err(e) = rl.save_history(&history_file) {
        warn!("Unable to save history to {}: {e}", history_file.display());
    }
    Ok(())
}
