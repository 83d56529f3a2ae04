//! Terminal rendering of command outcomes.

use anyhow::Result;
use cadenza_core::dispatch::CommandOutcome;

/// How outcomes are written to the terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Text,
    Json,
}

pub fn render(outcome: &CommandOutcome, format: Format) -> Result<()> {
    match format {
        Format::Text => render_text(outcome),
        Format::Json => println!("{}", serde_json::to_string(outcome)?),
    }
    Ok(())
}

fn render_text(outcome: &CommandOutcome) {
    println!("{}", outcome.message);

    if let Some(details) = &outcome.details {
        println!("  Track:  {}", details.track);
        println!("  By:     {}", details.artists);
        if !details.album.is_empty() {
            println!("  Album:  {}", details.album);
        }
        println!(
            "  State:  {}",
            if details.is_playing { "playing" } else { "paused" }
        );
        if let Some(volume) = details.volume {
            println!("  Volume: {}%", volume);
        }
        if let Some(device) = &details.device {
            println!("  Device: {}", device);
        }
    }

    if let Some(original) = &outcome.original_command {
        println!("  (command was: {})", original);
    }
}
