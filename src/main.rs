use std::path::PathBuf;

use clap::Parser;
use color_eyre::Result;
use color_eyre::eyre::WrapErr;
use crossterm::event::KeyEventKind;
use tokio::sync::mpsc;

use proctab::app::App;
use proctab::config::{Config, load_config, load_config_from_path};
use proctab::console;
use proctab::event::{Event, EventHandler};
use proctab::logging;
use proctab::system::sampler::Sampler;
use proctab::system::scheduler::{SampleOutcome, SamplingScheduler};
use proctab::system::source::SysinfoSource;
use proctab::table::SortColumn;
use proctab::ui;

#[derive(Parser)]
#[command(
    name = "proctab",
    about = "Live terminal process table with sorting, search, and graceful termination"
)]
struct Cli {
    /// Path to config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Refresh rate in milliseconds
    #[arg(long)]
    refresh_rate: Option<u64>,

    /// Initial sort column: pid, name, cpu, memory, none
    #[arg(long)]
    sort: Option<String>,

    /// Show status and thread columns
    #[arg(long, default_value_t = false)]
    extended: bool,

    /// Print snapshots to stdout instead of running the TUI
    #[arg(long, default_value_t = false)]
    console: bool,

    /// Stop console mode after this many snapshots
    #[arg(long, requires = "console")]
    iterations: Option<u64>,

    /// Print console snapshots as JSON lines
    #[arg(long, default_value_t = false, requires = "console")]
    json: bool,

    /// Append logs to this file
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Log level: trace, debug, info, warn, error
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    let config = load_config_for_cli(&cli);

    if let Some(path) = &config.logging.file {
        logging::init_file_logging(path, &config.logging.level, config.logging.json)?;
    }

    let mut sampler = Sampler::new(SysinfoSource::new());
    // Establishes CPU baselines; every process reads 0.0 here.
    let initial = sampler
        .snapshot()
        .wrap_err("cannot read the process table")?;
    let scheduler = SamplingScheduler::new(sampler, config.general.refresh_interval());

    if cli.console {
        return console::run(scheduler, cli.iterations, cli.json).await;
    }

    let mut terminal = ratatui::init();

    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        ratatui::restore();
        original_hook(panic_info);
    }));

    let result = run(&mut terminal, &config, initial, scheduler).await;

    ratatui::restore();

    result
}

async fn run(
    terminal: &mut ratatui::DefaultTerminal,
    config: &Config,
    initial: proctab::system::record::Snapshot,
    mut scheduler: SamplingScheduler<SysinfoSource>,
) -> Result<()> {
    let mut app = App::new(config, initial);

    let (tx, rx) = mpsc::unbounded_channel::<SampleOutcome>();
    scheduler.start(tx);
    let mut events = EventHandler::new(rx);

    let result = event_loop(terminal, &mut app, &mut events).await;
    scheduler.stop().await;
    result
}

async fn event_loop(
    terminal: &mut ratatui::DefaultTerminal,
    app: &mut App,
    events: &mut EventHandler,
) -> Result<()> {
    terminal.draw(|frame| ui::draw(frame, app))?;

    while app.running {
        let Some(event) = events.next().await else {
            break;
        };
        let should_draw = match event {
            Event::Key(key) => {
                if key.kind == KeyEventKind::Press {
                    let action = app.map_key(key);
                    app.dispatch(action);
                    true
                } else {
                    false
                }
            }
            Event::Sample(outcome) => {
                app.apply_sample(outcome);
                true
            }
            Event::Resize => true,
        };
        if should_draw {
            terminal.draw(|frame| ui::draw(frame, app))?;
        }
    }

    Ok(())
}

fn load_config_for_cli(cli: &Cli) -> Config {
    let mut config = match &cli.config {
        Some(path) => load_config_from_path(path),
        None => load_config(),
    };

    if let Some(rate) = cli.refresh_rate {
        config.general.refresh_rate_ms = rate;
    }
    if let Some(sort) = &cli.sort {
        if SortColumn::from_str_config(sort).is_none() && !sort.eq_ignore_ascii_case("none") {
            eprintln!("unknown sort column `{sort}`, keeping enumeration order");
        }
        config.general.default_sort = sort.clone();
    }
    if cli.extended {
        config.general.extended_columns = true;
    }
    if let Some(path) = &cli.log_file {
        config.logging.file = Some(path.clone());
    }
    if let Some(level) = &cli.log_level {
        config.logging.level = level.clone();
    }

    config
}
