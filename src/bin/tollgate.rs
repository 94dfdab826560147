use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{ArgAction, ArgGroup, Parser, Subcommand};
use tollgate::PresetGraph;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tollgate", version, about = "Inspect permission presets and evaluate access rules", long_about = None)]
struct Cli {
    /// Verbose mode (-v, -vv, -vvv)
    #[arg(short, action = ArgAction::Count, global = true)]
    verbosity: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Lists the presets defined in a JSON preset file
    Presets { file: PathBuf },
    /// Prints the permissions reachable from the given grants
    /// Grants without a matching preset are dropped
    Expand {
        file: PathBuf,
        #[arg(required = true)]
        grants: Vec<String>,
    },
    /// Checks whether the grants satisfy a rule; exits non-zero on deny
    #[command(group(ArgGroup::new("mode").args(["any", "all"]).required(true)))]
    Check {
        file: PathBuf,
        /// Granted preset names
        #[arg(short, long = "grant", required = true)]
        grants: Vec<String>,
        /// Allow if any required permission is present
        #[arg(long)]
        any: bool,
        /// Allow only if every required permission is present
        #[arg(long)]
        all: bool,
        /// Permissions the rule requires
        #[arg(required = true)]
        required: Vec<String>,
    },
}

fn init_tracing(verbosity: u8) {
    let default = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load(file: &Path) -> Result<PresetGraph> {
    let graph = PresetGraph::from_path(file)
        .with_context(|| format!("failed to load presets from {}", file.display()))?;
    info!(presets = graph.list().len(), file = %file.display(), "loaded presets");
    Ok(graph)
}

fn run(cli: Cli) -> Result<ExitCode> {
    match cli.command {
        Commands::Presets { file } => {
            for preset in load(&file)?.list() {
                let mut line = preset.name.clone();
                if !preset.extends.is_empty() {
                    line.push_str(&format!(" -> {}", preset.extends.join(", ")));
                }
                if let Some(description) = &preset.description {
                    line.push_str(&format!("  # {description}"));
                }
                println!("{line}");
            }
        }
        Commands::Expand { file, grants } => {
            for permission in load(&file)?.expand(&grants).iter() {
                println!("{permission}");
            }
        }
        Commands::Check {
            file,
            grants,
            any,
            all: _,
            required,
        } => {
            let validator = load(&file)?.take(&grants);
            let allowed = if any {
                validator.has_any_of(&required)?
            } else {
                validator.has_all_of(&required)?
            };
            println!("{}", if allowed { "allow" } else { "deny" });
            if !allowed {
                return Ok(ExitCode::FAILURE);
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbosity);

    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(2)
        }
    }
}
