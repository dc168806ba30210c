// Formulary CLI - Teamsters vs Wellcentra reconciliation from the shell

mod analyze;
mod exit_codes;
mod logging;
mod recon;
mod view;

use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use clap_verbosity_flag::{Verbosity, WarnLevel};

use formulary_recon::ReconConfig;

use exit_codes::{EXIT_CONFIG, EXIT_INPUT, EXIT_OUTPUT, EXIT_SUCCESS, EXIT_USAGE};
use logging::{init_logging, LogConfig, LogFormat};

#[derive(Parser)]
#[command(name = "formulary")]
#[command(about = "Reconcile a Teamsters pharmacy ledger against the Wellcentra price list")]
#[command(version)]
#[command(long_version = long_version())]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Adjust log verbosity (-v info, -vv debug, -q errors only)
    #[command(flatten)]
    verbosity: Verbosity<WarnLevel>,

    /// Log output format
    #[arg(long, value_enum, default_value = "pretty", global = true)]
    log_format: LogFormat,

    /// Column mapping and view defaults (TOML)
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,
}

/// The two formulary files every data command takes.
#[derive(Args, Debug, Clone)]
pub struct Inputs {
    /// Teamsters ledger (csv, tsv, txt, xlsx, xls, xlsb, ods or json)
    pub teamsters: PathBuf,

    /// Wellcentra price list (same formats)
    pub wellcentra: PathBuf,

    /// Worksheet to read from spreadsheet inputs (default: first sheet)
    #[arg(long, value_name = "NAME")]
    pub sheet: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconcile two formularies and report savings
    #[command(after_help = "\
Examples:
  formulary reconcile teamsters.xlsx wellcentra.xlsx
  formulary reconcile teamsters.csv wellcentra.csv --json
  formulary reconcile teamsters.csv wellcentra.csv --output result.json
  formulary reconcile teamsters.csv wellcentra.csv --export formulary_analysis.xlsx")]
    Reconcile {
        #[command(flatten)]
        inputs: Inputs,

        /// Print the full result as JSON on stdout
        #[arg(long)]
        json: bool,

        /// Write the JSON result to a file
        #[arg(long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Write the three-sheet analysis workbook
        #[arg(long, value_name = "FILE")]
        export: Option<PathBuf>,
    },

    /// Browse reconciled drugs as a filtered, sorted, paginated table
    #[command(after_help = "\
Examples:
  formulary view teamsters.csv wellcentra.csv
  formulary view teamsters.csv wellcentra.csv --tab matches --sort totalSavings --desc
  formulary view teamsters.csv wellcentra.csv --search humira
  formulary view teamsters.csv wellcentra.csv --page 2 --page-size 20
  formulary view teamsters.csv wellcentra.csv --tab matches --csv matches.csv")]
    View(view::ViewArgs),

    /// Cross-formulary analytics: NDC and base-name matches, WAC vs AWP
    #[command(after_help = "\
Examples:
  formulary analyze teamsters.csv wellcentra.csv
  formulary analyze teamsters.csv wellcentra.csv --top 5
  formulary analyze teamsters.csv wellcentra.csv --json")]
    Analyze {
        #[command(flatten)]
        inputs: Inputs,

        /// Print the report as JSON on stdout
        #[arg(long)]
        json: bool,

        /// Number of drugs in the top-savings list
        #[arg(long, default_value_t = 10)]
        top: usize,
    },

    /// Validate a config file without running
    #[command(after_help = "\
Examples:
  formulary validate formulary.toml")]
    Validate {
        /// Path to the TOML config file
        #[arg(value_name = "CONFIG")]
        file: PathBuf,
    },
}

fn long_version() -> &'static str {
    if cfg!(debug_assertions) {
        concat!(
            env!("CARGO_PKG_VERSION"),
            " (", env!("GIT_COMMIT_HASH"), ")",
            "\nengine:  formulary-recon ", env!("CARGO_PKG_VERSION"),
            "\nbuild:   debug",
            "\ntarget:  ", env!("TARGET"),
        )
    } else {
        concat!(
            env!("CARGO_PKG_VERSION"),
            " (", env!("GIT_COMMIT_HASH"), ")",
            "\nengine:  formulary-recon ", env!("CARGO_PKG_VERSION"),
            "\nbuild:   release",
            "\ntarget:  ", env!("TARGET"),
        )
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_logging(&LogConfig {
        level: cli.verbosity.tracing_level_filter(),
        format: cli.log_format,
        with_ansi: io::stderr().is_terminal(),
    });

    let result = run(cli.command, cli.config.as_deref());

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(err) => {
            if !err.message.is_empty() {
                eprintln!("{}: {}", err.label(), err.message);
            }
            if let Some(hint) = &err.hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(err.code)
        }
    }
}

fn run(command: Commands, config_path: Option<&Path>) -> Result<(), CliError> {
    match command {
        Commands::Reconcile { inputs, json, output, export } => {
            let config = load_config(config_path)?;
            recon::cmd_reconcile(&config, &inputs, json, output, export)
        }
        Commands::View(args) => {
            let config = load_config(config_path)?;
            view::cmd_view(&config, args)
        }
        Commands::Analyze { inputs, json, top } => {
            let config = load_config(config_path)?;
            analyze::cmd_analyze(&config, &inputs, json, top)
        }
        Commands::Validate { file } => recon::cmd_validate(&file),
    }
}

/// `--config` when given, the stock column names otherwise.
fn load_config(path: Option<&Path>) -> Result<ReconConfig, CliError> {
    match path {
        Some(path) => ReconConfig::load(path).map_err(|e| {
            CliError::config(e.to_string()).with_hint("check it with: formulary validate <CONFIG>")
        }),
        None => Ok(ReconConfig::default()),
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn usage(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn input(msg: impl Into<String>) -> Self {
        Self { code: EXIT_INPUT, message: msg.into(), hint: None }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self { code: EXIT_CONFIG, message: msg.into(), hint: None }
    }

    pub fn output(msg: impl Into<String>) -> Self {
        Self { code: EXIT_OUTPUT, message: msg.into(), hint: None }
    }

    /// Prefix for the stderr line. Unreadable inputs keep the wording the
    /// web upload page showed.
    pub fn label(&self) -> &'static str {
        match self.code {
            EXIT_INPUT => "error processing formulary data",
            _ => "error",
        }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}
