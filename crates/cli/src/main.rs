//! Calliope pipeline binary.
//!
//! Usage:
//!   calliope --topic "bias in LLMs"
//!   calliope --topic "bias in LLMs" --config config.toml
//!   calliope --topic "bias in LLMs" --top-k 3 --out report.md
//!
//! # Environment Variables
//!
//! - `HF_TOKEN` - hosted-inference API token (hf-inference provider)
//! - `OPENAI_API_KEY` - key for OpenAI-compatible endpoints
//!
//! A local `.env` file is loaded before the environment is read.

use calliope_coordinator::{Coordinator, PipelineConfig, render_report, write_report};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,calliope_coordinator=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Parse command line arguments (simple for now)
    let args: Vec<String> = std::env::args().collect();
    let mut topic: Option<String> = None;
    let mut config_path: Option<String> = None;
    let mut top_k: Option<usize> = None;
    let mut out_path: Option<String> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--topic" | "-t" => {
                if i + 1 < args.len() {
                    topic = Some(args[i + 1].clone());
                    i += 1;
                }
            }
            "--config" | "-c" => {
                if i + 1 < args.len() {
                    config_path = Some(args[i + 1].clone());
                    i += 1;
                }
            }
            "--top-k" | "-k" => {
                if i + 1 < args.len() {
                    top_k = Some(args[i + 1].parse().expect("Invalid top-k value"));
                    i += 1;
                }
            }
            "--out" | "-o" => {
                if i + 1 < args.len() {
                    out_path = Some(args[i + 1].clone());
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Calliope research pipeline");
                println!();
                println!("Usage: calliope --topic <TOPIC> [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -t, --topic <TOPIC>    Research topic (required)");
                println!("  -c, --config <FILE>    Path to config.toml file");
                println!("  -k, --top-k <N>        Number of sources to fetch (default: 5)");
                println!("  -o, --out <FILE>       Write the Markdown report to this path");
                println!("  -h, --help             Show this help message");
                println!();
                println!("Environment variables:");
                println!("  HF_TOKEN               Hosted-inference API token");
                println!("  OPENAI_API_KEY         Key for OpenAI-compatible endpoints");
                return Ok(());
            }
            other => {
                eprintln!("Unknown argument: {other} (see --help)");
                std::process::exit(2);
            }
        }
        i += 1;
    }

    let Some(topic) = topic else {
        eprintln!("error: --topic is required (see --help)");
        std::process::exit(2);
    };

    let mut config = match config_path {
        Some(path) => PipelineConfig::from_file(&path)?,
        None => PipelineConfig::default(),
    };
    if let Some(k) = top_k {
        config.research.top_k = k;
    }

    let coordinator = Coordinator::from_config(&config)?;
    let result = coordinator.run(&topic).await?;

    match out_path {
        Some(path) => write_report(&result, &path)?,
        None => println!("{}", render_report(&result)),
    }

    Ok(())
}
