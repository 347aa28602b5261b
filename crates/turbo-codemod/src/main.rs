use clap::{Parser, Subcommand};
use colored::Colorize;
use env_logger::Env;

mod migrate;
mod output;
mod prompt;
mod transform;

#[derive(Parser)]
#[command(name = "turbo-codemod")]
#[command(about = "Codemods for upgrading turbo repositories", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(short = 'd', long = "debug", global = true, hide = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Migrate a repository to a newer version of turbo
    #[command(alias = "m")]
    Migrate(migrate::MigrateArgs),

    /// Apply a single codemod to a repository
    #[command(alias = "t")]
    Transform(transform::TransformArgs),
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{} {e}", "Error:".red());
        for cause in e.chain().skip(1) {
            eprintln!("  {cause}");
        }
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Default level depends on --debug, RUST_LOG still wins
    let env = if cli.debug {
        Env::default().default_filter_or("debug")
    } else {
        Env::default().default_filter_or("error")
    };
    env_logger::Builder::from_env(env).init();

    match cli.command {
        Commands::Migrate(args) => migrate::execute(args),
        Commands::Transform(args) => transform::execute(args),
    }
}
