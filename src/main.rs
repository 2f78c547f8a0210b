use clap::{ArgMatches, CommandFactory, FromArgMatches, Parser, Subcommand};
use hitmap::config::Config;
use hitmap::loader::{load_any_results, load_collection};
use hitmap::palette::Palette;
use hitmap::HitMapViewer;
use std::process;
use std::rc::Rc;
use tracing::{debug, error, info, Level};

mod cmd;
mod reports;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(
        global = true,
        short,
        long,
        default_value = "data/demo/mesh_collection.json"
    )]
    acquisition: String,

    /// JSON results, or a line-scan CSV.
    #[arg(global = true, short, long, default_value = "data/demo/mesh_results.json")]
    results: String,

    #[arg(global = true, long)]
    config: Option<String>,

    #[arg(global = true, long, default_value_t = false)]
    debug: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render the heat map / hit map.
    Show(cmd::show::ShowArgs),
    /// List cells passing the threshold and the centring requests they make.
    Points(cmd::points::PointsArgs),
    /// Best-position table.
    Best(cmd::best::BestArgs),
    /// Cursor readout and actions at one grid position.
    Inspect(cmd::inspect::InspectArgs),
}

fn fail(msg: impl std::fmt::Display) -> ! {
    error!("{}", msg);
    process::exit(1);
}

fn resolve_config(path: Option<&str>, cli_config: &Config, sub_matches: &ArgMatches) -> Config {
    let Some(path) = path else {
        return cli_config.clone();
    };

    info!("⚙️  Loading config from: {}", path);
    let mut config = Config::load_from_file(path).unwrap_or_else(|e| fail(e));
    config
        .viewer
        .merge_from_cli(&cli_config.viewer, sub_matches);
    config
}

fn main() {
    let matches = Cli::command().get_matches();
    let cli = Cli::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());

    tracing_subscriber::fmt()
        .with_max_level(if cli.debug { Level::DEBUG } else { Level::INFO })
        .with_writer(std::io::stderr)
        .init();

    let Some((_, sub_matches)) = matches.subcommand() else {
        fail("no subcommand given");
    };

    let cli_config = match &cli.command {
        Commands::Show(args) => &args.config,
        Commands::Points(args) => &args.config,
        Commands::Best(args) => &args.config,
        Commands::Inspect(args) => &args.config,
    };
    let config = resolve_config(cli.config.as_deref(), cli_config, sub_matches);
    if let Err(e) = config.viewer.validate() {
        fail(e);
    }

    info!("📂 Loading acquisition: {}", cli.acquisition);
    let collection = Rc::new(load_collection(&cli.acquisition).unwrap_or_else(|e| fail(e)));

    info!("📊 Loading results: {}", cli.results);
    let loaded = load_any_results(&cli.results, collection.parameters.num_images)
        .unwrap_or_else(|e| fail(e));

    let mut viewer = HitMapViewer::new(config.viewer);
    viewer.associate(&collection);
    viewer.set_results(loaded.grid);
    viewer.set_best_positions(loaded.best_positions);
    if collection.collected {
        viewer.finish();
    }
    debug!("Viewer state: {}", viewer.state());

    let palette = Palette::global();
    match cli.command {
        Commands::Show(args) => cmd::show::run(args, &mut viewer, palette),
        Commands::Points(args) => cmd::points::run(args, &mut viewer, palette),
        Commands::Best(args) => cmd::best::run(args, &viewer, palette),
        Commands::Inspect(args) => cmd::inspect::run(args, &mut viewer, palette),
    }
}
