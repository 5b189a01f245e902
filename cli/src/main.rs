mod output;
mod session;
mod terminal;
mod watcher;

use std::fs::File;
use std::io::{self, IsTerminal};
use std::process::ExitCode;

use broker::{ClientConfig, GrpcTransport};
use simplelog::{Config, WriteLogger};

use output::ConsoleHandler;
use session::SessionReport;
use terminal::TerminalGuard;
use watcher::CancelWatcher;

#[tokio::main]
async fn main() -> ExitCode {
    let config = match ClientConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = init_logging(&config) {
        eprintln!("Logging disabled: {}", e);
    }

    match run(config).await {
        Ok(session) => session::report(&session, &mut io::stderr()),
        Err(e) => {
            log::error!("Client aborted: {}", e);
            eprintln!("Client aborted: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// The terminal belongs to message output while streaming, so the log goes to a file
fn init_logging(config: &ClientConfig) -> io::Result<()> {
    let path = config.log_file_path();
    let file = File::create(&path)?;
    WriteLogger::init(config.log_level, Config::default(), file)
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
    log::info!("Logging to {}", path.display());
    Ok(())
}

/// Stream to stdout until the server closes, the operator presses Escape, or something fails
async fn run(config: ClientConfig) -> io::Result<SessionReport> {
    let transport = GrpcTransport::connect_lazy(&config)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
    log::info!("Subscribing to [{}] at {}", config.topics, transport.address());

    let stdout = io::stdout();
    let is_terminal = stdout.is_terminal();
    let handler = ConsoleHandler::for_output(stdout, is_terminal);

    let guard = TerminalGuard::enable()?;
    let session = session::run_session(
        transport,
        config.topics,
        handler,
        CancelWatcher::new(),
        watcher::terminal_event,
    )
    .await;
    drop(guard);
    session
}
