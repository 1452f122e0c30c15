use std::io::Read;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use commitsum::error::is_connection_error;
use commitsum::{commit_message, sanitize, ConfigPaths, OllamaClient, Settings};
use dotenv::dotenv;
use log::{debug, LevelFilter};

const EXIT_ERROR: u8 = 1;
const EXIT_NO_INPUT: u8 = 2;

#[derive(Parser, Debug)]
#[clap(author, version, about = "Generates a commit message from a diff on stdin", long_about = None)]
#[clap(after_help = "Example:\n  git diff --staged | commitsum")]
struct Cli {
  #[clap(short, long, help = "Enables verbose logging", default_value = "false")]
  verbose: bool,

  #[clap(subcommand)]
  command: Option<Command>
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Writes the effective configuration to the config file
  StoreConfig,
  /// Prints the effective configuration
  ShowConfig
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
  dotenv().ok();

  let cli = Cli::parse();
  init_logging(cli.verbose);

  let result = match cli.command {
    Some(Command::StoreConfig) => store_config(),
    Some(Command::ShowConfig) => show_config(),
    None => run().await
  };

  match result {
    Ok(code) => code,
    Err(err) => {
      eprintln!("{} {:#}", "ERROR:".bold().bright_red(), err);
      if is_connection_error(&err) {
        eprintln!("    {}", "Is the Ollama server running? Check OLLAMA_BASE_URL.".yellow());
      }
      ExitCode::from(EXIT_ERROR)
    }
  }
}

fn init_logging(verbose: bool) {
  let mut builder = env_logger::Builder::from_default_env();
  if verbose {
    builder.filter_level(LevelFilter::Debug);
  }
  builder.format_target(false).format_timestamp(None).init();
  debug!("Verbose logging enabled");
}

async fn run() -> Result<ExitCode> {
  let settings = Settings::load().context("Error loading config")?;

  let mut diff = String::new();
  std::io::stdin()
    .read_to_string(&mut diff)
    .context("Error reading stdin")?;

  if diff.is_empty() {
    eprintln!("No diff on stdin");
    return Ok(ExitCode::from(EXIT_NO_INPUT));
  }

  debug!("Read {} bytes of diff from stdin", diff.len());

  let client = OllamaClient::new(&settings).context("Error creating backend client")?;
  let message = commit_message(&diff, &settings, &client).await?;

  println!("{}", sanitize(&message).trim());
  Ok(ExitCode::SUCCESS)
}

fn store_config() -> Result<ExitCode> {
  let settings = Settings::load().context("Error loading config")?;
  let paths = ConfigPaths::from_env()?;
  settings
    .save_with_message(&paths)
    .context("Error writing config file")?;
  Ok(ExitCode::SUCCESS)
}

fn show_config() -> Result<ExitCode> {
  let paths = ConfigPaths::from_env()?;
  let settings = Settings::load_from(&paths.file).context("Error loading config")?;

  println!("Config file: {}", paths.file.display());
  for (key, value) in settings.entries() {
    println!("  {}: {}", key.bold(), value);
  }
  Ok(ExitCode::SUCCESS)
}
