//! Hydrate - A terminal water drinking reminder
//!
//! Counts down a fixed interval and reminds you to drink water:
//! - `start` begins the countdown
//! - `drink` records a drink and restarts it
//! - once the interval runs out the reminder repeats every minute

use std::io::BufRead;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use tokio::sync::mpsc;

use hydrate::cli::{Cli, Commands, Display, InputCommand, RunArgs, SinkKind};
use hydrate::notification::{DesktopSink, NotificationSink, TerminalSink};
use hydrate::reminder::{Clock, ReminderMachine, Session, SessionHandle};

/// Main entry point
#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Parse command line arguments
    let cli = Cli::parse();

    // Initialize logging
    init_tracing(cli.verbose);

    // Execute command
    if let Err(e) = execute(cli).await {
        Display::show_error(&e.to_string());
        std::process::exit(1);
    }
}

/// Initializes the tracing subscriber for logging.
///
/// `RUST_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default_level = if verbose { "info" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();
}

/// Executes the CLI command.
async fn execute(cli: Cli) -> Result<()> {
    if cli.verbose {
        tracing::info!("Verbose mode enabled");
    }

    match cli.command.unwrap_or_else(|| Commands::Run(RunArgs::default())) {
        Commands::Run(args) => run(args).await?,
        Commands::Completions { shell } => generate_completions(shell),
    }

    Ok(())
}

/// Runs an interactive session with the selected sink.
async fn run(args: RunArgs) -> Result<()> {
    let config = args.to_config();
    config.validate()?;

    match args.sink {
        SinkKind::Desktop => run_with_sink(args, DesktopSink::new()).await,
        SinkKind::Terminal => run_with_sink(args, TerminalSink::new()).await,
    }
}

async fn run_with_sink<S>(args: RunArgs, sink: S) -> Result<()>
where
    S: NotificationSink + Send + 'static,
{
    let config = args.to_config();
    Display::show_welcome(&config);

    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let machine = ReminderMachine::new(config, sink, event_tx);
    let (session, handle) = Session::new(machine, Clock::new());

    let session_task = tokio::spawn(session.run());
    let display_task = tokio::spawn(Display::render_events(event_rx));

    if !args.no_permission_prompt {
        handle.request_permission()?;
    }
    if args.auto_start {
        handle.start()?;
    }

    read_commands(&handle).await?;

    handle.quit()?;
    drop(handle);

    let history = session_task.await?;
    display_task.await?;

    Display::show_history(history.entries());
    if args.json_history {
        println!("{}", serde_json::to_string_pretty(&history)?);
    }

    Ok(())
}

/// Dispatches stdin lines to the session until quit, EOF or Ctrl-C.
async fn read_commands(handle: &SessionHandle) -> Result<()> {
    let mut lines = spawn_stdin_reader();

    loop {
        let line = tokio::select! {
            line = lines.recv() => line,
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Ctrl-C を受信しました");
                None
            }
        };

        let Some(line) = line else {
            return Ok(());
        };
        if line.trim().is_empty() {
            continue;
        }

        let command = match line.parse::<InputCommand>() {
            Ok(command) => command,
            Err(e) => {
                Display::show_error(&e.to_string());
                Display::show_help();
                continue;
            }
        };

        match command {
            InputCommand::Start => handle.start()?,
            InputCommand::Drink => handle.drink()?,
            InputCommand::Stop => handle.stop()?,
            InputCommand::Permission => handle.request_permission()?,
            InputCommand::Status => Display::show_status(&handle.status().await?),
            InputCommand::History => Display::show_history(&handle.history().await?),
            InputCommand::Help => Display::show_help(),
            InputCommand::Quit => return Ok(()),
        }
    }
}

/// Reads stdin on a plain thread so a blocked read never holds up shutdown.
fn spawn_stdin_reader() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();

    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });

    rx
}

/// Generates shell completion scripts.
fn generate_completions(shell: clap_complete::Shell) {
    use clap_complete::generate;
    use std::io;

    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();
    generate(shell, &mut cmd, bin_name, &mut io::stdout());
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_no_args_defaults_to_run() {
        let cli = Cli::parse_from(["hydrate"]);
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_cli_parse_run() {
        let cli = Cli::parse_from(["hydrate", "run"]);
        assert!(matches!(cli.command, Some(Commands::Run(_))));
    }

    #[test]
    fn test_cli_parse_run_with_options() {
        let cli = Cli::parse_from(["hydrate", "run", "--frequency", "30", "--sink", "terminal"]);
        match cli.command {
            Some(Commands::Run(args)) => {
                assert_eq!(args.frequency, 30);
                assert_eq!(args.sink, SinkKind::Terminal);
            }
            _ => panic!("Expected Run command"),
        }
    }

    #[test]
    fn test_cli_parse_verbose() {
        let cli = Cli::parse_from(["hydrate", "--verbose", "run"]);
        assert!(cli.verbose);
    }
}
