mod cmd;
mod logging;

use clap::{Args, Parser, Subcommand};
use replykit_core::config::loader::ConfigLoader;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "rk",
    version,
    about = "Render inquiry response templates with macros, conditionals and loops"
)]
struct Cli {
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[arg(long, global = true)]
    profile: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Validate configuration and print resolved settings
    Doctor,

    /// List logical template names discovered under templates_dir
    ListTemplates,

    /// Render a template and print the result
    Render(RenderArgs),

    /// List the built-in macros
    Macros,

    /// Show recently rendered templates from the usage log
    Usage(UsageArgs),
}

#[derive(Debug, Args)]
pub struct RenderArgs {
    /// Logical template name (e.g. "welcome" or "shipping/delay")
    pub template: String,

    /// Variable as key=value; the value is parsed as JSON when possible
    #[arg(long = "var", value_name = "KEY=VALUE")]
    pub vars: Vec<String>,

    /// JSON object file with variables (--var entries override it)
    #[arg(long)]
    pub vars_file: Option<PathBuf>,

    /// JSON file describing the user, inquiry and response
    #[arg(long)]
    pub context: Option<PathBuf>,

    /// Print the full result as JSON
    #[arg(long)]
    pub json: bool,

    /// Exit with status 2 when the render reported problems
    #[arg(long)]
    pub strict: bool,
}

#[derive(Debug, Args)]
pub struct UsageArgs {
    /// Number of most recent records to show
    #[arg(long, default_value_t = 20)]
    pub limit: usize,
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    if let Ok(rc) = ConfigLoader::load(cli.config.as_deref(), cli.profile.as_deref()) {
        logging::init(&rc.logging);
    }

    match cli.command {
        Commands::Doctor => cmd::doctor::run(cli.config.as_deref(), cli.profile.as_deref()),
        Commands::ListTemplates => {
            cmd::list_templates::run(cli.config.as_deref(), cli.profile.as_deref())
        }
        Commands::Render(args) => {
            cmd::render::run(cli.config.as_deref(), cli.profile.as_deref(), &args)
        }
        Commands::Macros => cmd::macros::run(),
        Commands::Usage(args) => {
            cmd::usage::run(cli.config.as_deref(), cli.profile.as_deref(), args.limit)
        }
    }

    Ok(())
}
