//! Interactive chat and one-shot questions.

use std::io::Write;
use std::sync::Arc;

use anyhow::{bail, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, warn};

use discovery_agent::{ChatSession, ResponseEvent, TurnOutcome};
use discovery_commands::{
    build_default_dispatcher, welcome_message, CommandContext, CommandResponse, SessionAction, NO_AGENT_SELECTED,
};
use discovery_config::{available_agents, default_agent, AgentPage};

use crate::app::App;
use crate::terminal_output::{dim, note_error, note_warn, stream_write};

/// Side-channel lines shown between reply fragments.
fn event_note(event: &ResponseEvent) -> Option<String> {
    match event {
        ResponseEvent::Routed { agent, reason: Some(reason) } => Some(format!("→ {agent} ({reason})")),
        ResponseEvent::Routed { agent, reason: None } => Some(format!("→ {agent}")),
        ResponseEvent::Thought { iteration, text } => Some(format!("💭 {iteration}: {text}")),
        ResponseEvent::Delta(_) | ResponseEvent::Usage(_) => None,
    }
}

fn render_event(out: &mut impl Write, event: &ResponseEvent) {
    let written = match event {
        ResponseEvent::Delta(delta) => stream_write(out, delta),
        other => match event_note(other) {
            Some(note) => stream_write(out, &format!("{}\n", dim(&note))),
            None => Ok(()),
        },
    };
    if let Err(e) = written {
        warn!(error = %e, "Failed to write to terminal");
    }
}

/// Run one turn, printing the reply as it streams. Returns whether a reply
/// (or the fallback) was recorded.
async fn run_turn(session: &mut ChatSession, text: &str) -> bool {
    let mut stdout = std::io::stdout();
    let outcome = session.send(text, |event| render_event(&mut stdout, event)).await;
    match outcome {
        TurnOutcome::Completed { usage, .. } => {
            println!();
            debug!(input = usage.input_tokens, output = usage.output_tokens, "Turn complete");
            true
        }
        TurnOutcome::Fallback { .. } => {
            println!("\n{}", discovery_agent::FALLBACK_MESSAGE);
            true
        }
        TurnOutcome::Failed(e) => {
            println!();
            note_error(&format!("❌ Error processing your message: {e}"));
            false
        }
        TurnOutcome::NoAgent => {
            println!("{NO_AGENT_SELECTED}");
            false
        }
    }
}

/// Apply a command's session change, returning the text to show.
fn apply(session: &mut ChatSession, response: CommandResponse) -> String {
    match response.action {
        Some(SessionAction::SwitchAgent(key)) => match session.set_agent(&key) {
            Ok(()) => response.text,
            Err(e) => format!("❌ {e}"),
        },
        Some(SessionAction::Clear) => {
            session.clear();
            response.text
        }
        None => response.text,
    }
}

fn initial_agent<'a>(pages: &'a [AgentPage], requested: Option<&str>) -> Result<Option<&'a AgentPage>> {
    match requested {
        Some(key) => match pages.iter().find(|p| p.key == key) {
            Some(page) => Ok(Some(page)),
            None => bail!("Agent '{key}' is not available"),
        },
        None => Ok(default_agent(pages)),
    }
}

pub async fn run(app: &App, agent: Option<String>, admin: bool, user: &str) -> Result<()> {
    app.ensure_valid()?;
    let pages = available_agents(&app.loaded.pages, admin);
    let mut session = ChatSession::new(Arc::clone(&app.ctx));

    let current = initial_agent(&pages, agent.as_deref())?;
    if let Some(page) = current {
        session.set_agent(&page.key)?;
    }
    println!("{}\n", welcome_message(user, &pages, current));

    let dispatcher = build_default_dispatcher();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("> ");
        std::io::stdout().flush()?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let text = line.trim();
        if text.is_empty() {
            continue;
        }

        let ctx = CommandContext {
            session_id: session.id().to_string(),
            current_agent: session.agent_key().map(String::from),
            available: pages.clone(),
        };
        if let Some(result) = dispatcher.dispatch_text(&ctx, text).await {
            match result {
                Ok(response) => println!("{}\n", apply(&mut session, response)),
                Err(e) => note_error(&format!("Command failed: {e}")),
            }
            continue;
        }

        run_turn(&mut session, text).await;
        println!();
    }

    let usage = session.usage();
    if !usage.is_empty() {
        println!("{}", dim(&format!("tokens: {} in, {} out", usage.input_tokens, usage.output_tokens)));
    }
    Ok(())
}

/// Ask one agent one question and exit.
pub async fn ask(app: &App, agent: &str, message: &str) -> Result<()> {
    app.ensure_valid()?;
    if app.ctx.registry.get(agent).is_none() {
        bail!("Agent '{agent}' not found in registry.");
    }
    let mut session = ChatSession::new(Arc::clone(&app.ctx)).with_agent(agent)?;
    if !run_turn(&mut session, message).await {
        bail!("No reply from '{agent}'");
    }
    if session.conversation().turns().last().is_some_and(|m| m.content == discovery_agent::FALLBACK_MESSAGE) {
        note_warn("The model call failed; the reply above is the fallback message.");
    }
    Ok(())
}
