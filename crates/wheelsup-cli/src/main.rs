// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Wheels-Up contributors

use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode};
use wheelsup_core::client::{BackendConfig, HttpEstimateClient, WeatherBackend};
use wheelsup_core::controller::{SubmissionController, SubmissionPhase};
use wheelsup_core::suggest;
use wheelsup_core::trip::{Airport, TransportMode};
use wheelsup_core::validator::TripCandidate;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Base URL of the estimate backend
    #[arg(long, env = "WHEELSUP_BASE_URL", default_value = "http://localhost:8080")]
    base_url: String,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Estimate when to leave for the airport
    Estimate {
        /// Starting address (free text)
        from: String,
        /// Destination airport: JFK, LGA or EWR
        airport: String,
        /// Arrival date, MM-DD-YYYY
        date: String,
        /// Arrival time, HH:MM (24-hour)
        time: String,
        /// Transportation mode: self or cab
        #[arg(long, default_value = "self")]
        mode: String,
        /// Cab pickup buffer in minutes (used only with --mode cab)
        #[arg(long, default_value_t = 10)]
        cab_buffer: u32,
        /// Place id chosen from a prior `suggest` run
        #[arg(long)]
        place_id: Option<String>,
    },
    /// Look up address suggestions for a partial query
    Suggest { query: String },
    /// Preview the weather delay for an airport at an arrival instant
    Weather {
        /// Destination airport: JFK, LGA or EWR
        airport: String,
        /// Arrival date, MM-DD-YYYY
        date: String,
        /// Arrival time, HH:MM (24-hour)
        time: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    TermLogger::init(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )?;

    let client = Arc::new(HttpEstimateClient::new(BackendConfig::new(&cli.base_url))?);

    match &cli.command {
        Commands::Estimate {
            from,
            airport,
            date,
            time,
            mode,
            cab_buffer,
            place_id,
        } => {
            let airport = parse_airport(airport)?;
            let mode = TransportMode::from_str_opt(mode)
                .ok_or_else(|| anyhow::anyhow!("Unknown transport mode '{mode}'. Use self or cab."))?;

            let mut controller = SubmissionController::new(client);
            controller.form = TripCandidate {
                from_address_text: from.clone(),
                selected_place_id: place_id.clone(),
                airport: Some(airport),
                arrival_date: date.clone(),
                arrival_time: time.clone(),
                transport_mode: Some(mode),
                cab_buffer_minutes: Some(*cab_buffer),
            };

            let phase = controller.submit().await.clone();
            match phase {
                SubmissionPhase::Success(result) => {
                    let b = &result.breakdown;
                    println!("Arrive {} at {}", airport, result.arrival_instant);
                    println!("Leave by: {}", result.recommended_leave_instant);
                    println!("  Base travel: {} min", b.base_travel_minutes);
                    println!("  Cab buffer:  {} min", b.cab_buffer_minutes_used);
                    match &b.weather_summary {
                        Some(summary) => {
                            println!("  Weather:     {} min ({})", b.weather_extra_minutes, summary)
                        }
                        None => println!("  Weather:     {} min", b.weather_extra_minutes),
                    }
                    println!("  Total:       {} min", b.total_minutes);
                }
                SubmissionPhase::Error(message) => {
                    anyhow::bail!("{message}");
                }
                SubmissionPhase::Idle => {
                    // Validation failure: print every field error and exit non-zero.
                    for (field, message) in controller.field_errors() {
                        eprintln!("{field}: {message}");
                    }
                    anyhow::bail!("Trip request is not valid");
                }
                SubmissionPhase::Loading => unreachable!("submit resolved while loading"),
            }
        }
        Commands::Suggest { query } => {
            // One-shot lookup; debouncing only matters for interactive
            // editing, but the query floor and display cap still apply.
            let suggestions = suggest::lookup_once(client.as_ref(), query).await;
            if suggestions.is_empty() {
                println!("No results");
            }
            for suggestion in suggestions {
                println!("{}  [{}]", suggestion.label, suggestion.id);
            }
        }
        Commands::Weather {
            airport,
            date,
            time,
        } => {
            let airport = parse_airport(airport)?;
            match client.preview_weather(airport, date, time).await {
                Ok(preview) if !preview.summary.is_empty() => {
                    println!("{}: {} (+{} min)", airport, preview.summary, preview.extra_minutes);
                }
                _ => println!("{airport}: weather preview unavailable"),
            }
        }
    }

    Ok(())
}

fn parse_airport(code: &str) -> Result<Airport> {
    Airport::from_code(code)
        .ok_or_else(|| anyhow::anyhow!("Unknown airport '{code}'. Use JFK, LGA or EWR."))
}
