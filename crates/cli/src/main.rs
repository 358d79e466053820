//! Rivet console — the interactive entry point.
//!
//! Drives one [`Agent`] session: read a line from the operator, stream the
//! reply to the terminal, keep re-invoking the engine while tool results
//! arrive, hand control back when a turn produces no tool calls.

use std::io::{BufRead, Write};

use anyhow::Context;
use clap::Parser;
use rivet_agent::Agent;
use rivet_config::AppConfig;
use rivet_core::message::SessionId;
use rivet_tools::ToolSet;
use tokio::sync::mpsc;

mod prompt;

/// Cap on automatic continuations within one user turn. A runaway model
/// that keeps emitting tool calls surfaces control back to the operator
/// instead of looping forever.
const MAX_CONTINUATIONS: usize = 500;

#[derive(Parser)]
#[command(
    name = "rivet",
    about = "Rivet — a streaming, tag-driven console coding agent",
    version,
    author
)]
struct Cli {
    /// Model selector, e.g. anthropic/claude-sonnet-4-20250514
    #[arg(short, long, env = "RIVET_MODEL")]
    model: Option<String>,

    /// Session id (groups transcript log records; generated when omitted)
    #[arg(short, long, env = "RIVET_SESSION_ID")]
    session: Option<String>,

    /// Send a single message and exit instead of entering interactive mode
    #[arg(long)]
    message: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let mut config = AppConfig::load().context("Failed to load configuration")?;
    if let Some(model) = cli.model {
        config.model = model;
    }
    if let Some(session) = cli.session {
        config.session_id = Some(session);
    }
    config.validate().context("Invalid configuration")?;

    let session_id = config
        .session_id
        .as_deref()
        .map(SessionId::from)
        .unwrap_or_default();

    let tools = ToolSet::standard(config.base_dir());
    let system_prompt = prompt::system_prompt(&tools.docs());

    let mut agent = Agent::new(
        &config.model,
        session_id.clone(),
        system_prompt,
        tools,
        &config.log_dir,
        config.max_tokens,
    )
    .context("Failed to start agent")?;

    if let Some(message) = cli.message {
        run_turn(&mut agent, &message).await?;
        return Ok(());
    }

    println!("rivet — {} (session {})", config.model, session_id);
    println!("Type a message; 'clear' resets the conversation, 'exit' quits.\n");

    let stdin = std::io::stdin();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break; // EOF
        }
        let line = line.trim();

        match line {
            "" => continue,
            "exit" | "quit" => break,
            "clear" => {
                agent.clear();
                println!("(conversation cleared)\n");
            }
            message => run_turn(&mut agent, message).await?,
        }
    }

    Ok(())
}

/// One full user turn: stream the reply, keep continuing while tool results
/// arrive, echo the tool summaries between rounds.
async fn run_turn(agent: &mut Agent, message: &str) -> anyhow::Result<()> {
    let mut user = Some(message);

    for _ in 0..MAX_CONTINUATIONS {
        let (tx, rx) = mpsc::channel::<String>(64);
        let printer = tokio::spawn(async move {
            let mut rx = rx;
            while let Some(chunk) = rx.recv().await {
                print!("{chunk}");
                let _ = std::io::stdout().flush();
            }
        });

        let result = agent.stream(user.take(), tx).await;
        let _ = printer.await;
        println!();

        match result? {
            Some(turn) => {
                println!("{}\n", turn.summary);
            }
            None => {
                println!();
                return Ok(());
            }
        }
    }

    println!("(stopped after {MAX_CONTINUATIONS} continuations; send a message to keep going)");
    Ok(())
}
