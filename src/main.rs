mod alarm;
mod history;
mod sinks;
mod store;
mod ui;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use crate::alarm::board::AlarmBoard;
use crate::history::CommandHistory;
use crate::sinks::DesktopSinks;
use crate::store::Store;

#[derive(Parser, Debug)]
#[command(
    name = "zeno",
    version,
    about = "Text-driven countdown alarms with desktop notifications"
)]
struct Cli {
    /// State file path; defaults to the platform local-data directory.
    #[arg(long)]
    data: Option<PathBuf>,

    /// Validate the state file and exit without opening the GUI.
    #[arg(long)]
    check: bool,

    #[arg(long)]
    no_sound: bool,

    #[arg(long)]
    no_speech: bool,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let path = cli.data.unwrap_or_else(store::default_state_path);
    let store = Store::new(&path);

    if cli.check {
        return check_state_file(&store);
    }

    let state = store.load();
    info!(
        "loaded {} alarm(s) and {} history entr{} from {}",
        state.alarms.len(),
        state.command_history.len(),
        if state.command_history.len() == 1 { "y" } else { "ies" },
        store.path().display()
    );

    let board = AlarmBoard::restore(state.alarms);
    let history = CommandHistory::restore(state.command_history);
    let sinks = Box::new(DesktopSinks::new(!cli.no_sound, !cli.no_speech));

    ui::app::run_gui(store, board, history, sinks)
}

fn check_state_file(store: &Store) -> Result<()> {
    if !store.path().exists() {
        println!(
            "state file {} not found; starting with empty defaults",
            store.path().display()
        );
        return Ok(());
    }
    let state = store
        .load_strict()
        .with_context(|| format!("state file check failed for {}", store.path().display()))?;
    println!(
        "state file OK: {} alarm(s), {} history entr{}",
        state.alarms.len(),
        state.command_history.len(),
        if state.command_history.len() == 1 { "y" } else { "ies" }
    );
    Ok(())
}
