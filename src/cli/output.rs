use std::time::{Duration, SystemTime};

use anyhow::Result;
use clap::ValueEnum;
use humantime::{format_duration, format_rfc3339_millis};
use serde::Serialize;
use tool_compose_post::InteractionResult;

#[derive(Clone, Debug, ValueEnum)]
pub enum OutputFormat {
    Human,
    Json,
    Yaml,
}

/// Print `value` in the requested format; `human` renders the human-readable form.
pub fn emit<T, F>(format: &OutputFormat, value: &T, human: F) -> Result<()>
where
    T: Serialize,
    F: FnOnce(&T),
{
    match format {
        OutputFormat::Human => human(value),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(value)?),
    }
    Ok(())
}

pub fn print_result(result: &InteractionResult) {
    let verdict = if result.ok { "submitted" } else { "failed" };
    println!("Post {}: {}", result.post_id, verdict);
    println!("- State: {}", result.state);
    println!(
        "- Started: {}",
        format_rfc3339_millis(SystemTime::from(result.started_at))
    );
    println!(
        "- Latency: {}",
        format_duration(Duration::from_millis(result.latency_ms))
    );
    match result.confirmed {
        Some(true) => println!("- Confirmation: seen"),
        Some(false) => println!("- Confirmation: not seen"),
        None => {}
    }
    if let Some(failure) = &result.failure {
        println!("- Failure: {}", failure);
    }
    if !result.steps.is_empty() {
        println!("- Steps:");
        for record in &result.steps {
            let latency = format_duration(Duration::from_millis(record.latency_ms));
            if record.skipped {
                println!("  {:<22} skipped", record.step.as_str());
            } else {
                println!("  {:<22} {}", record.step.as_str(), latency);
            }
        }
    }
}
