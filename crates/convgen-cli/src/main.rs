use clap::{Parser, Subcommand};
use convgen::{
    commands::{config, generate, plan},
    common, GlobalOpts,
};
use convgen_logger as logger;

#[derive(Parser)]
#[command(name = "convgen")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(
    about = "Hub/spoke conversion function generator",
    long_about = "convgen scans the version directories of an API group and generates \
                  conversion functions from every spoke version to the hub version."
)]
struct Cli {
    #[command(flatten)]
    global: GlobalOpts,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate zz_generated.conversion.go for every spoke version
    Generate(generate::GenerateCommand),
    /// Show the spoke versions and resources without writing anything
    Plan(plan::PlanCommand),
    /// Inspect or edit convgen.toml
    #[command(subcommand_required = false, arg_required_else_help = false)]
    Config {
        #[command(subcommand)]
        action: Option<config::ConfigAction>,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = logger::init_with_verbosity(cli.global.verbosity_level()) {
        eprintln!("Warning: Failed to initialize logger: {}", e);
    }
    common::init_tracing(&cli.global);

    let result = match cli.command {
        Commands::Generate(cmd) => generate::handle_generate(cmd, &cli.global).map(|_| ()),
        Commands::Plan(cmd) => plan::handle_plan(cmd, &cli.global).map(|_| ()),
        Commands::Config { action } => config::handle_config(action, &cli.global),
    };

    if let Err(e) = result {
        logger::error(&format!("{:#}", e));
        if cli.global.verbosity_level() > 0 {
            logger::show_log_path();
        }
        std::process::exit(1);
    }
}
