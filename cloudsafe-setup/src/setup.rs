//! The interactive config-building run.
//!
//! Order of operations: overwrite guard, schema walk, provider filter (once,
//! and only for [`ProviderSelection::Enabled`]), write, summary.

use std::{
    io::{BufRead, Write},
    path::PathBuf,
};

use anyhow::Context;
use colored::Colorize;
use schemaprompt::{Prompter, walk};

use crate::{
    filter::filter_enabled_providers,
    schema::{DEFAULT_CONFIG_FILE, ProviderSelection, cloudsafe_schema},
    summary::Summary,
    writer::{WriteError, write_config},
};

/// Options for one run.
#[derive(Debug, Clone)]
pub struct SetupOptions {
    /// Target file.
    pub output: PathBuf,
    /// Which providers end up in the file.
    pub providers: ProviderSelection,
}

impl Default for SetupOptions {
    fn default() -> Self {
        Self {
            output: PathBuf::from(DEFAULT_CONFIG_FILE),
            providers: ProviderSelection::default(),
        }
    }
}

/// How a run ended.
#[derive(Debug)]
pub enum SetupOutcome {
    /// The config was written.
    Written(Summary),
    /// The operator declined to overwrite an existing file.
    Cancelled,
    /// Writing failed; nothing valid was left at the target.
    WriteFailed(WriteError),
}

/// Run the builder against the given prompter.
///
/// # Errors
///
/// Returns an error when input ends early or the terminal streams fail.
/// A failed file write is not an error here; it is reported to the operator
/// and returned as [`SetupOutcome::WriteFailed`].
pub fn run_setup<R: BufRead, W: Write>(
    options: &SetupOptions,
    prompter: &mut Prompter<R, W>,
) -> anyhow::Result<SetupOutcome> {
    let name = options.output.display().to_string();

    prompter.say("--- CloudSafe Config Builder ---".bold())?;
    prompter.say("This will help you configure storage providers for CloudSafe.\n")?;

    if options.output.exists() {
        let question = format!("A {name} file already exists. Overwrite? (yes/no): ");
        if !prompter.confirm(&question)? {
            prompter.say("Operation canceled.".yellow())?;
            info!("kept existing {name}");
            return Ok(SetupOutcome::Cancelled);
        }
    }

    let schema = cloudsafe_schema(options.providers);
    debug!("provider selection: {:?}", options.providers);

    let full = walk(&schema, prompter).context("failed to collect configuration")?;

    let config = match options.providers {
        ProviderSelection::Enabled => filter_enabled_providers(full),
        ProviderSelection::All => full,
    };

    if let Err(e) = write_config(&config, &options.output) {
        prompter.say(format!("Error writing to file {name}: {e}").red())?;
        return Ok(SetupOutcome::WriteFailed(e));
    }
    prompter.say(format!("\nSuccessfully created {name}!").green())?;

    let summary = Summary::from_config(&config);
    print_summary(&summary, options.providers, prompter)?;
    Ok(SetupOutcome::Written(summary))
}

fn print_summary<R: BufRead, W: Write>(
    summary: &Summary,
    selection: ProviderSelection,
    prompter: &mut Prompter<R, W>,
) -> anyhow::Result<()> {
    prompter.say("\n--- Configuration Summary ---".cyan().bold())?;
    if selection == ProviderSelection::All {
        // Nothing was asked about enabling, so only report what was written.
        prompter.say(format!(
            "Storage providers written: {}",
            summary.providers.join(", ")
        ))?;
    } else if summary.providers.is_empty() {
        prompter.say("Warning: No storage providers are enabled!".yellow())?;
        prompter.say("You need to enable at least one provider to use CloudSafe.")?;
    } else {
        prompter.say(format!(
            "Enabled storage providers: {}",
            summary.providers.join(", ")
        ))?;
        if let Some(default) = summary.orphaned_default() {
            prompter.say(format!("\nWarning: Default provider '{default}' is not enabled!").yellow())?;
            prompter.say("Please update the default provider in the configuration.")?;
        }
    }
    prompter.say("\nConfiguration complete. You can now run CloudSafe with your settings.")?;
    Ok(())
}
