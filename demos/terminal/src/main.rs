use std::io::BufRead;

use coindrop::prelude::*;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

mod render;

use render::{parse_input, render_board, Input};

// ---------------------------------------------------------------------------
// Arguments
// ---------------------------------------------------------------------------

const USAGE: &str = "usage: coindrop-terminal [ENDPOINT] [--config PATH]";

/// Builds the client config from `[ENDPOINT] [--config PATH]`.
///
/// An endpoint on the command line wins over the one in the file.
fn config_from_args(mut args: impl Iterator<Item = String>) -> Result<Option<ClientConfig>, CoindropError> {
    let mut endpoint = None;
    let mut config = ClientConfig::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => match args.next() {
                Some(path) => config = load_config(path)?,
                None => return Ok(None),
            },
            "-h" | "--help" => return Ok(None),
            _ if arg.starts_with('-') => return Ok(None),
            _ => endpoint = Some(arg),
        }
    }

    if let Some(endpoint) = endpoint {
        config.endpoint = endpoint;
    }
    Ok(Some(config))
}

// ---------------------------------------------------------------------------
// Player input
// ---------------------------------------------------------------------------

/// Forwards lines from `input` until it ends, fails, or nobody listens.
fn forward_lines(input: impl BufRead, tx: &mpsc::UnboundedSender<String>) {
    for line in input.lines() {
        match line {
            Ok(line) => {
                if tx.send(line).is_err() {
                    return;
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "stdin read failed");
                return;
            }
        }
    }
}

/// Reads stdin on its own thread so a blocked read never holds up exit.
fn spawn_stdin_reader() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || forward_lines(std::io::stdin().lock(), &tx));
    rx
}

/// Publishes moves until the player quits or input ends.
async fn play<W: coindrop::transport::ChunkWriter>(
    commands: &mut CommandChannel<W>,
    lines: &mut mpsc::UnboundedReceiver<String>,
) -> Result<(), CoindropError> {
    while let Some(line) = lines.recv().await {
        match parse_input(&line) {
            Input::Play(column) => commands.play_coin(column).await?,
            Input::Quit => break,
            Input::Invalid => eprintln!("type a column number (1, 2, ...) or q to quit"),
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), CoindropError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let Some(config) = config_from_args(std::env::args().skip(1))? else {
        eprintln!("{USAGE}");
        return Ok(());
    };

    let client = CoindropClientBuilder::new()
        .config(config)
        .connect(&WebSocketTransport)
        .await?;

    let mut commands = client.command_channel()?;
    let mut stream = client.view_stream();
    let mut lines = spawn_stdin_reader();

    let outcome = tokio::select! {
        result = stream.run(|view, session| match view {
            View::Joined(me) => {
                println!("joined as {} ({})", me.player_id, me.color);
            }
            View::Snapshot(board) => {
                print!("{}", render_board(board, session.identity()));
                if session.is_winner() {
                    println!("you win!");
                }
            }
        }) => result.map_err(CoindropError::from),
        result = play(&mut commands, &mut lines) => result,
    };

    if let Err(e) = &outcome {
        tracing::warn!(error = %e, "session ended");
    }

    drop(commands);
    client.disconnect().await?;
    outcome
}
