//! Framlink - FRAM memory module session manager
//!
//! Interactive serial console for the FRAM storage firmware: type commands
//! at the prompt and watch classified device feedback stream back.

use anyhow::Result;
use clap::{Parser, Subcommand};
use framlink_core::cli::{render_event, render_event_json, ExitCodes};
use framlink_core::{
    AppConfig, LineEditor, SerialLink, SerialPortTransport, SessionEngine,
};
use std::io::Write as _;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tokio::io::AsyncBufReadExt;

/// Framlink CLI
#[derive(Parser, Debug)]
#[command(
    name = "framlink",
    version,
    about = "FRAM memory module session manager",
    long_about = None
)]
struct Cli {
    /// Serial port name (e.g., COM6, /dev/ttyACM0)
    #[arg(short, long)]
    port: Option<String>,

    /// Baud rate
    #[arg(short, long)]
    baud: Option<u32>,

    /// Emit events as JSON lines instead of formatted text
    #[arg(long)]
    json: bool,

    /// Configuration file path
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List available serial ports
    ListPorts {
        /// Show detailed info
        #[arg(short, long)]
        detailed: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Some(Commands::ListPorts { detailed }) => list_ports_cmd(*detailed),
        None => match run_session(cli).await {
            Ok(()) => ExitCode::from(ExitCodes::SUCCESS),
            Err(err) => {
                eprintln!("framlink: {:#}", err);
                ExitCode::from(ExitCodes::ERROR)
            }
        },
    }
}

fn list_ports_cmd(detailed: bool) -> ExitCode {
    match framlink_core::list_ports() {
        Ok(ports) if ports.is_empty() => {
            println!("No serial ports found");
            ExitCode::from(ExitCodes::PORT_NOT_FOUND)
        }
        Ok(ports) => {
            for port in ports {
                if detailed {
                    println!("{}\t{:?}", port.port_name, port.port_type);
                } else {
                    println!("{}", port.port_name);
                }
            }
            ExitCode::from(ExitCodes::SUCCESS)
        }
        Err(err) => {
            eprintln!("framlink: {}", err);
            ExitCode::from(ExitCodes::ERROR)
        }
    }
}

async fn run_session(cli: Cli) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => AppConfig::load_from(path).map_err(|e| anyhow::anyhow!("{}", e))?,
        None => match AppConfig::load() {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!(error = %err, "config load failed, using defaults");
                AppConfig::default()
            }
        },
    };
    if let Some(port) = cli.port {
        config.link.port = port;
    }
    if let Some(baud) = cli.baud {
        config.link.baud_rate = baud;
    }

    let poll_interval = Duration::from_millis(config.link.poll_interval_ms);
    let transport = SerialPortTransport::new(config.link.clone());
    let link = SerialLink::new(Box::new(transport), poll_interval);
    let mut engine = SessionEngine::new(link, config.terminal.event_capacity);

    // Subscribe before starting the dispatcher so the READY event is seen.
    let mut events = engine.subscribe();
    let mut quit = engine.quit_signal();
    engine.start();
    engine.connect().await;

    let json = cli.json;
    let show_timestamps = config.terminal.show_timestamps;
    let printer = tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            if json {
                println!("{}", render_event_json(&event));
            } else {
                println!("{}", render_event(&event, show_timestamps));
            }
        }
    });

    let mut editor = LineEditor::new(&config.terminal.prompt);
    let mut input = tokio::io::BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("{}", editor.prompt());
        std::io::stdout().flush()?;

        tokio::select! {
            _ = quit.changed() => break,
            _ = tokio::signal::ctrl_c() => break,
            line = input.next_line() => {
                match line? {
                    Some(line) => {
                        for ch in line.chars() {
                            editor.on_character(ch);
                        }
                        if let Some(committed) = editor.on_commit() {
                            engine.submit(&committed).await;
                        }
                    }
                    // stdin closed
                    None => break,
                }
            }
        }
    }

    engine.shutdown().await;
    printer.abort();
    Ok(())
}
