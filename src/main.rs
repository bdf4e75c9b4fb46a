use anyhow::Result;
use clap::{CommandFactory, Parser};
use scriba::app::{run_check_command, run_transcribe_command};
use scriba::cli::{Cli, Commands};
use scriba::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        None => {
            let Some(audio) = cli.audio else {
                eprintln!("scriba: no audio file given");
                eprintln!("Usage: scriba <AUDIO_FILE> [OPTIONS]");
                eprintln!("Try 'scriba --help' for more information.");
                std::process::exit(2);
            };
            let config = load_config(cli.config.as_deref())?;
            run_transcribe_command(
                config,
                audio,
                cli.output,
                cli.segment_duration,
                cli.batch_size,
                cli.language,
                cli.model,
                cli.context,
                cli.context_sentences,
                cli.max_segments,
                cli.no_normalize,
                cli.quiet,
                cli.verbose,
            )
            .await?;
        }
        Some(Commands::Check) => {
            let config = load_config(cli.config.as_deref())?;
            if !run_check_command(&config) {
                std::process::exit(1);
            }
        }
        Some(Commands::Completions { shell }) => {
            clap_complete::generate(shell, &mut Cli::command(), "scriba", &mut std::io::stdout());
        }
    }

    Ok(())
}

/// Load configuration from file or use defaults.
///
/// Priority order:
/// 1. Custom config path from CLI (--config)
/// 2. Default config path (~/.config/scriba/config.toml)
/// 3. Built-in defaults with environment variable overrides
fn load_config(custom_path: Option<&std::path::Path>) -> Result<Config> {
    let config = if let Some(path) = custom_path {
        // Load from custom path, missing file is an error here
        Config::load(path)?
    } else {
        // Try default path, fall back to defaults
        let default_path = Config::default_path();
        Config::load_or_default(&default_path)?
    };

    // Apply environment variable overrides
    Ok(config.with_env_overrides())
}
