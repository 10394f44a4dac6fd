//! `discovery validate`: configuration and environment checks.

use anyhow::{bail, Result};

use discovery_config::{BackendSettings, Settings};

use crate::app::App;
use crate::terminal_output::{note_error, note_success};

/// Report validation findings, prompt loading and backend settings.
/// Fails when anything would stop a chat from working.
pub fn run(app: &App, settings: &Settings) -> Result<()> {
    println!("\n🔍 Checking {}\n", app.loaded.path.display());

    let ok = check_report(app) & check_prompts(app) & check_backend(&settings.backend);

    println!();
    if ok {
        note_success("All checks passed.");
        Ok(())
    } else {
        note_error("Some checks failed. Please fix the errors above.");
        bail!("configuration is not usable")
    }
}

fn check_report(app: &App) -> bool {
    let report = &app.loaded.report;
    println!("Configuration:");
    println!("  🟢 {} agent(s), {} section(s)", app.loaded.pages.agents.len(), app.loaded.pages.sections.len());
    for warning in &report.warnings {
        println!("  🟡 {}: {}", warning.path, warning.message);
    }
    for error in &report.errors {
        println!("  🔴 {}: {}", error.path, error.message);
    }
    report.is_valid()
}

/// Every agent that sends prompts of its own must be able to load them.
fn check_prompts(app: &App) -> bool {
    println!("Prompts:");
    let mut all_good = true;
    for (key, _) in app.ctx.registry.all() {
        let loaded = app.ctx.agent(key).and_then(|agent| match agent {
            Some(agent) => agent.system_prompts(&app.ctx).map(|m| m.len()),
            None => Ok(0),
        });
        match loaded {
            Ok(n) => println!("  🟢 {key}: {n} system message(s)"),
            Err(e) => {
                println!("  🔴 {key}: {e}");
                all_good = false;
            }
        }
    }
    all_good
}

fn check_backend(backend: &BackendSettings) -> bool {
    println!("Backend:");
    let var = match backend {
        BackendSettings::OpenAi { .. } => "OPENAI_API_KEY",
        BackendSettings::Azure { .. } => "AZURE_OPENAI_API_KEY",
    };
    if backend.api_key().is_some() {
        println!("  🟢 {} with {var} set", backend.name());
        true
    } else {
        println!("  🔴 {} selected but {var} is missing", backend.name());
        false
    }
}
