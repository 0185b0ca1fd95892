use std::{io, path::PathBuf, process::ExitCode};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use cloudsafe_setup::{
    DEFAULT_CONFIG_FILE, ProviderSelection, SetupOptions, SetupOutcome, run_setup,
    settings::{ArchiveSettings, ENCRYPTION_KEY_ENV, KEY_LEN},
};
use colored::Colorize;
use log::debug;
use schemaprompt::Prompter;

/// Exit status when the operator declines to overwrite an existing config.
const EXIT_CANCELLED: u8 = 3;

/// Interactive configuration builder for the CloudSafe archiver
#[derive(Parser, Debug)]
#[command(name = "cloudsafe-setup")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<SubCommands>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum SubCommands {
    /// Prompt for every setting and write the config file (default)
    Init(InitArgs),
    /// Show the settings the archiver would use from a config file
    Show(ShowArgs),
}

#[derive(Args, Debug)]
struct InitArgs {
    /// Config file to write; `.toml` writes TOML, anything else JSON
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    output: PathBuf,

    /// Which storage providers to write
    #[arg(long, value_enum, default_value_t = ProviderSelection::Enabled)]
    providers: ProviderSelection,
}

#[derive(Args, Debug)]
struct ShowArgs {
    /// Config file to read
    #[arg(default_value = DEFAULT_CONFIG_FILE)]
    path: PathBuf,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {e:#}", "error:".red().bold());
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    match cli.command {
        Some(SubCommands::Init(args)) => init(SetupOptions {
            output: args.output,
            providers: args.providers,
        }),
        None => init(SetupOptions::default()),
        Some(SubCommands::Show(args)) => show(&args),
    }
}

fn init(options: SetupOptions) -> Result<ExitCode> {
    debug!("setup options: {options:?}");
    let stdin = io::stdin();
    let mut prompter = Prompter::new(stdin.lock(), io::stdout());

    let code = match run_setup(&options, &mut prompter)? {
        SetupOutcome::Written(_) => ExitCode::SUCCESS,
        SetupOutcome::Cancelled => ExitCode::from(EXIT_CANCELLED),
        SetupOutcome::WriteFailed(_) => ExitCode::FAILURE,
    };
    Ok(code)
}

fn show(args: &ShowArgs) -> Result<ExitCode> {
    let env_key = std::env::var(ENCRYPTION_KEY_ENV).ok();
    let settings = ArchiveSettings::load(&args.path, env_key.as_deref())
        .with_context(|| format!("cannot use {}", args.path.display()))?;

    println!("{}", format!("--- {} ---", args.path.display()).cyan().bold());
    println!("storage provider: {}", settings.provider);
    if !settings.provider_configured {
        println!(
            "{}",
            format!(
                "Warning: provider '{}' has no section in storage_providers",
                settings.provider
            )
            .yellow()
        );
    }
    for (key, value) in settings.provider_settings.fields() {
        println!("  {key}: {value}");
    }
    println!("source paths: {}", settings.source_paths.join(", "));
    println!("target filename: {}", settings.s3_filename);
    println!("workers: {}", or_unset(settings.workers));
    println!("chunk size: {}", or_unset(settings.chunk_size));
    println!("buffer size: {}", or_unset(settings.buffer_size));
    println!("encrypt: {}", settings.encrypt);
    println!("resume: {}", settings.resume);
    println!(
        "encryption key: {KEY_LEN} bytes ({})",
        settings.encryption_key.source
    );
    Ok(ExitCode::SUCCESS)
}

fn or_unset(value: Option<u64>) -> String {
    value.map_or_else(|| "unset".to_string(), |v| v.to_string())
}
