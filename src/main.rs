use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use clap::{CommandFactory, Parser, Subcommand};
use miette::{IntoDiagnostic, Result};
use tracing_subscriber::EnvFilter;

use mrpulse_core::{MrPulseConfig, OutputFormat};
use mrpulse_gitlab::client::GitLabClient;
use mrpulse_gitlab::pipeline::{analyze_merge_request, AnalysisOptions};

const CONFIG_FILE: &str = ".mrpulse.toml";

#[derive(Parser)]
#[command(
    name = "mrpulse",
    version,
    about = "Rank merge request contributors by impact",
    long_about = "mrpulse finds the open GitLab merge request between two branches, attributes\n\
                   every added line to the author of the commit that introduced it, and ranks\n\
                   contributors by impact (lines added + 10 x commits).\n\n\
                   Examples:\n  \
                     mrpulse analyze                              Analyze develop -> main\n  \
                     mrpulse analyze --source feat/x --target main\n  \
                     mrpulse analyze --format json                Machine-readable report\n  \
                     mrpulse init                                 Create a .mrpulse.toml config file"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Path to configuration file (default: .mrpulse.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(
        long,
        global = true,
        default_value = "text",
        long_help = "Output format for the report.\n\n\
                       Formats:\n  \
                         text      Human-readable tables and summaries (default)\n  \
                         json      Machine-readable JSON with camelCase keys\n  \
                         markdown  GitHub-flavored Markdown"
    )]
    format: OutputFormat,

    /// Enable verbose (debug) logging on stderr
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Analyze contributor impact on a merge request
    #[command(long_about = "Analyze contributor impact on a merge request.\n\n\
        Looks up the open merge request from --source into --target, fetches its commits\n\
        and their diffs one at a time, and prints per-author line and commit counts plus\n\
        the contributor with the most impact.\n\n\
        Requires GITLAB_TOKEN (or token in .mrpulse.toml) and a project id.\n\n\
        Examples:\n  mrpulse analyze --project group/app\n  SOURCE_BRANCH=feat/x mrpulse analyze --format markdown")]
    Analyze {
        /// Source branch (env: SOURCE_BRANCH, default: develop)
        #[arg(long)]
        source: Option<String>,
        /// Target branch (env: TARGET_BRANCH, default: main)
        #[arg(long)]
        target: Option<String>,
        /// Project id or path such as group/app (env: GITLAB_PROJECT_ID)
        #[arg(long)]
        project: Option<String>,
        /// GitLab instance URL (env: GITLAB_URL, default: https://gitlab.com)
        #[arg(long)]
        gitlab_url: Option<String>,
        /// Create the merge request when none is open instead of failing
        #[arg(long)]
        create_if_missing: bool,
        /// Title for a merge request created with --create-if-missing
        #[arg(long)]
        title: Option<String>,
    },
    /// Create a default .mrpulse.toml configuration file
    #[command(long_about = "Create a default .mrpulse.toml configuration file.\n\n\
        Generates a commented-out template with all available options.\n\
        Fails if .mrpulse.toml already exists.")]
    Init,
    /// Generate shell completion scripts
    #[command(hide = true)]
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

fn print_welcome() {
    let version = env!("CARGO_PKG_VERSION");
    println!("mrpulse v{version} — who moved this merge request the most?\n");
    println!("Quick start:");
    println!("  mrpulse init                    Create a .mrpulse.toml config file");
    println!("  mrpulse analyze                 Rank contributors of develop -> main\n");
    println!("Run 'mrpulse <command> --help' for details.");
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("warn,mrpulse=debug,mrpulse_gitlab=debug,mrpulse_impact=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<MrPulseConfig> {
    let config = match path {
        Some(path) => MrPulseConfig::from_file(path)?,
        None => {
            let default_path = Path::new(CONFIG_FILE);
            if default_path.exists() {
                MrPulseConfig::from_file(default_path)?
            } else {
                MrPulseConfig::default()
            }
        }
    };
    Ok(config)
}

const DEFAULT_CONFIG: &str = r#"# mrpulse configuration
# Environment variables override these values:
#   GITLAB_URL, GITLAB_PROJECT_ID, GITLAB_TOKEN, SOURCE_BRANCH, TARGET_BRANCH

[gitlab]
# base_url = "https://gitlab.com"
# project_id = "group/project"
# Prefer the GITLAB_TOKEN environment variable over storing a token here.
# token = "glpat-..."
# timeout_secs = 30
# max_retries = 2

[branches]
# source = "develop"
# target = "main"

[merge_request]
# create_if_missing = false
# title = "Merge develop into main"
"#;

#[tokio::main]
async fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .build(),
        )
    }))
    .expect("miette handler");
    human_panic::setup_panic!();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        None => {
            print_welcome();
        }
        Some(Command::Analyze {
            source,
            target,
            project,
            gitlab_url,
            create_if_missing,
            title,
        }) => {
            let mut config = load_config(cli.config.as_deref())?;
            config.apply_env();

            if let Some(source) = source {
                config.branches.source = source;
            }
            if let Some(target) = target {
                config.branches.target = target;
            }
            if let Some(project) = project {
                config.gitlab.project_id = Some(project);
            }
            if let Some(url) = gitlab_url {
                config.gitlab.base_url = url;
            }
            if create_if_missing {
                config.merge_request.create_if_missing = true;
            }
            if title.is_some() {
                config.merge_request.title = title;
            }

            let settings = config.gitlab.settings()?;
            tracing::debug!(?settings, "resolved GitLab settings");
            let client = GitLabClient::new(&settings)?;
            let options = AnalysisOptions::from_config(&config);

            let spinner = if std::io::stderr().is_terminal() {
                let pb = indicatif::ProgressBar::new_spinner();
                pb.set_style(
                    indicatif::ProgressStyle::with_template("{spinner:.cyan} {msg} ({elapsed})")
                        .into_diagnostic()?,
                );
                pb.set_message(format!(
                    "Analyzing {} -> {}...",
                    options.source_branch, options.target_branch
                ));
                pb.enable_steady_tick(std::time::Duration::from_millis(120));
                Some(pb)
            } else {
                None
            };

            let report = analyze_merge_request(&client, &options)
                .await
                .inspect_err(|_e| {
                    if let Some(pb) = &spinner {
                        pb.finish_and_clear();
                    }
                })?;

            if let Some(pb) = spinner {
                pb.finish_and_clear();
            }

            match cli.format {
                OutputFormat::Json => {
                    println!(
                        "{}",
                        serde_json::to_string_pretty(&report).into_diagnostic()?
                    );
                }
                OutputFormat::Markdown => {
                    print!("{}", report.to_markdown());
                }
                OutputFormat::Text => {
                    print!("{report}");
                }
            }
        }
        Some(Command::Init) => {
            let path = Path::new(CONFIG_FILE);
            if path.exists() {
                miette::bail!("{CONFIG_FILE} already exists");
            }
            std::fs::write(path, DEFAULT_CONFIG).into_diagnostic()?;
            println!("Created {CONFIG_FILE} with default configuration");
        }
        Some(Command::Completions { shell }) => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "mrpulse", &mut std::io::stdout());
        }
    }

    Ok(())
}
