use std::path::PathBuf;

use anyhow::Result;
use clap::{ArgAction, Args, Parser, Subcommand};
use tracing_subscriber::{fmt as tracing_fmt, prelude::*, EnvFilter};

mod commands;

#[derive(Parser)]
#[command(name = "livebrain")]
#[command(version)]
#[command(about = "Turn component descriptions into generated UI source")]
struct Cli {
    /// Increase log verbosity (-v, -vv, -vvv).
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Project directory holding the `.livebrain/` state.
    #[arg(long, env = "LIVEBRAIN_PROJECT", default_value = ".", global = true)]
    project: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create a new Living Brain in the project directory.
    Init(InitArgs),
    /// Load a component tree manifest (JSON) into the brain.
    Import {
        #[arg(value_name = "MANIFEST")]
        manifest: PathBuf,
    },
    /// Compile the component tree and store the architecture plan.
    Plan {
        /// Print the full plan as JSON instead of a summary.
        #[arg(long)]
        json: bool,
    },
    /// Print the ordered generation queue.
    Queue,
    /// Print the self-documentation of one component.
    Docs {
        #[arg(value_name = "COMPONENT")]
        component: String,
    },
    /// Generate page files for every route through the configured model.
    Generate(GenerateArgs),
    /// Print the JSON schema of a component tree manifest.
    Schema,
    /// Inspect or change AI provider settings.
    #[command(subcommand)]
    Settings(SettingsCommand),
}

#[derive(Args)]
struct InitArgs {
    #[arg(long)]
    name: String,
    #[arg(long, default_value = "")]
    description: String,
    #[arg(long, default_value = "nextjs")]
    framework: String,
    #[arg(long, default_value = "tailwind")]
    styling: String,
    /// Overwrite an existing brain.
    #[arg(long)]
    force: bool,
}

#[derive(Args)]
struct GenerateArgs {
    /// Output directory for generated sources (defaults to the project directory).
    #[arg(long)]
    out: Option<PathBuf>,
    /// Print the prompts instead of calling a provider.
    #[arg(long)]
    dry_run: bool,
}

#[derive(Subcommand)]
enum SettingsCommand {
    Show,
    Set {
        #[arg(long)]
        provider: Option<String>,
        #[arg(long)]
        model: Option<String>,
        #[arg(long, env = "LIVEBRAIN_API_KEY", hide_env_values = true)]
        api_key: Option<String>,
        /// Append a fallback provider as `provider:model[:key]`.
        #[arg(long = "fallback", value_name = "PROVIDER:MODEL[:KEY]")]
        fallbacks: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    let root = cli.project;
    let output = match cli.command {
        Command::Init(args) => commands::init(
            &root,
            &args.name,
            &args.description,
            &args.framework,
            &args.styling,
            args.force,
        )?,
        Command::Import { manifest } => commands::import(&root, &manifest)?,
        Command::Plan { json } => commands::plan(&root, json).await?,
        Command::Queue => commands::queue(&root).await?,
        Command::Docs { component } => commands::docs(&root, &component).await?,
        Command::Generate(args) => {
            let out = args.out.unwrap_or_else(|| root.clone());
            commands::generate(&root, &out, args.dry_run).await?
        }
        Command::Schema => commands::schema()?,
        Command::Settings(SettingsCommand::Show) => commands::settings_show(),
        Command::Settings(SettingsCommand::Set {
            provider,
            model,
            api_key,
            fallbacks,
        }) => commands::settings_set(provider, model, api_key, &fallbacks)?,
    };

    print!("{output}");
    if !output.ends_with('\n') {
        println!();
    }
    Ok(())
}

fn init_tracing(verbose: u8) -> Result<()> {
    let filter = if std::env::var_os("RUST_LOG").is_some() {
        EnvFilter::try_from_default_env()?
    } else {
        let level = match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        };
        EnvFilter::new(format!("error,livebrain={level},livebrain_={level}"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_fmt::layer().with_writer(std::io::stderr))
        .init();

    Ok(())
}
