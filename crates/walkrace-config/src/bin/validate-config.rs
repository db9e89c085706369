//! Config validation CLI tool
//!
//! Validates a walkrace configuration file and reports any errors.

use std::path::PathBuf;
use std::process::ExitCode;
use walkrace_util::default_config_path;

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();

    let config_path = match args.get(1) {
        Some(path) => PathBuf::from(path),
        None => {
            let default_path = default_config_path();
            eprintln!("Usage: validate-config [config-file]");
            eprintln!();
            eprintln!("Validates a walkrace configuration file.");
            eprintln!();
            eprintln!("Example:");
            eprintln!("  validate-config {}", default_path.display());
            eprintln!("  validate-config config.example.toml");
            return ExitCode::from(2);
        }
    };

    if !config_path.exists() {
        eprintln!("Error: Configuration file not found: {}", config_path.display());
        return ExitCode::from(1);
    }

    match walkrace_config::load_config(&config_path) {
        Ok(config) => {
            println!("✓ Configuration is valid");
            println!();
            println!("Summary:");
            println!("  Config version: {}", walkrace_config::CURRENT_CONFIG_VERSION);
            println!("  Race goal: {} steps", config.race.goal_steps);
            println!("  Daily goal: {} steps", config.race.daily_goal_steps);
            println!("  Step accounting: {:?}", config.service.accounting);
            match config.service.seed {
                Some(seed) => println!("  Seed: {}", seed),
                None => println!("  Seed: (entropy)"),
            }

            println!();
            println!("Players:");
            for player in &config.race.players {
                let kind = if player.is_human { "human" } else { "simulated" };
                println!("  - {} [{}]: {}", player.id, kind, player.name);
            }

            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("✗ Configuration validation failed");
            eprintln!();
            match &e {
                walkrace_config::ConfigError::ReadError(io_err) => {
                    eprintln!("Failed to read file: {}", io_err);
                }
                walkrace_config::ConfigError::ParseError(parse_err) => {
                    eprintln!("TOML parse error:");
                    eprintln!("  {}", parse_err);
                }
                walkrace_config::ConfigError::ValidationFailed { errors } => {
                    eprintln!("Validation errors ({}):", errors.len());
                    for err in errors {
                        eprintln!("  - {}", err);
                    }
                }
                walkrace_config::ConfigError::UnsupportedVersion(ver) => {
                    eprintln!(
                        "Unsupported config version: {} (expected {})",
                        ver,
                        walkrace_config::CURRENT_CONFIG_VERSION
                    );
                }
            }
            ExitCode::from(1)
        }
    }
}
