use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};

use connect_four_engine::config::AppConfig;
use connect_four_engine::engine::{GameEngine, GameEvent, GameOptions, GameSnapshot};
use connect_four_engine::game::{GameOutcome, Participant};
use connect_four_engine::ledger::InMemoryLedger;
use connect_four_engine::render::{board_to_text, board_to_text_with_line, BoardStyle};

/// Play a wagered Connect Four game between two people at one terminal.
#[derive(Parser)]
#[command(name = "play", about = "Hot-seat Connect Four with bets and turn timers")]
struct Cli {
    /// Path to TOML configuration file
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    /// Amount each player stakes
    #[arg(long, default_value_t = 0)]
    bet: i64,

    /// Seconds each player has per move (5-60)
    #[arg(long)]
    turn_timer: Option<i64>,

    #[arg(long, default_value = "Player A")]
    creator: String,

    #[arg(long, default_value = "Player B")]
    opponent: String,

    /// Draw the board with emoji instead of ASCII
    #[arg(long)]
    emoji: bool,

    /// Print every event as a JSON line instead of a drawn board
    #[arg(long)]
    json: bool,

    /// Print the default configuration and exit
    #[arg(long)]
    print_default_config: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if cli.print_default_config {
        print!("{}", AppConfig::default_toml().context("serializing default config")?);
        return Ok(());
    }

    let app_config = AppConfig::load_or_default(&cli.config)
        .with_context(|| format!("loading config from {}", cli.config.display()))?;

    let creator = Participant::new(1, cli.creator.clone());
    let opponent = Participant::new(2, cli.opponent.clone());
    if creator.name == opponent.name {
        bail!("the two players need different names");
    }

    let ledger = Arc::new(InMemoryLedger::with_balances(
        &[creator.id, opponent.id],
        app_config.ledger.starting_balance,
    ));
    let turn_timer = cli
        .turn_timer
        .or(Some(app_config.game.default_turn_timer_secs as i64));
    let options = GameOptions::new(turn_timer, cli.bet);

    let engine = GameEngine::create(
        creator.clone(),
        options,
        app_config.game.rules(),
        ledger.clone(),
    )
    .await
    .context("opening game")?;
    let mut events = engine.subscribe().await;

    engine
        .join(opponent.clone(), options.bet())
        .await
        .context("seating the second player")?;

    let style = if cli.emoji {
        BoardStyle::EMOJI
    } else {
        BoardStyle::ASCII
    };
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            event = events.recv() => {
                let Some(event) = event else { break };
                if cli.json {
                    println!("{}", serde_json::to_string(&event).context("encoding event")?);
                } else {
                    show(&event, &style);
                }
                if matches!(event, GameEvent::Ended { .. } | GameEvent::FailedToStart(_)) {
                    break;
                }
            }
            line = lines.next_line() => {
                let Some(line) = line.context("reading stdin")? else { break };
                let snapshot = engine.snapshot().await;
                let Some(mover) = snapshot.current_player() else { continue };
                match line.trim().parse::<usize>() {
                    Ok(column) => {
                        if let Err(e) = engine.drop_piece(mover.id, column).await {
                            println!("{}: {e}", mover.name);
                        }
                    }
                    Err(_) => println!("Enter a column number between 1 and {}", snapshot.board.columns()),
                }
            }
        }
    }

    engine.dispose().await;

    for player in [&creator, &opponent] {
        println!("{}: balance {}", player.name, ledger.balance(player.id).await);
    }
    Ok(())
}

fn show(event: &GameEvent, style: &BoardStyle) {
    match event {
        GameEvent::StateUpdated(snapshot) => {
            println!("{}\n", board_to_text(&snapshot.board, style));
            if let Some(player) = snapshot.current_player() {
                println!("{} to move ({}s):", player.name, snapshot.turn_timer_secs);
            }
        }
        GameEvent::FailedToStart(_) => println!("Nobody joined; the game was cancelled."),
        GameEvent::Ended { snapshot, outcome } => {
            if let Some(line) = &snapshot.winning_line {
                println!("{}\n", board_to_text_with_line(&snapshot.board, style, line));
            }
            println!("{}", describe(snapshot, *outcome));
        }
    }
}

fn describe(snapshot: &GameSnapshot, outcome: GameOutcome) -> String {
    let winner = snapshot
        .winner
        .as_ref()
        .map(|p| p.name.as_str())
        .unwrap_or("nobody");
    match outcome {
        GameOutcome::Draw => "It's a draw, stakes refunded.".to_string(),
        GameOutcome::CurrentPlayerWon => format!("{winner} connects four and wins!"),
        GameOutcome::OtherPlayerWon => format!("Time ran out. {winner} wins by forfeit."),
    }
}
