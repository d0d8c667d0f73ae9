#![deny(unused_variables)]
#![deny(dead_code)]
#![deny(unused_imports)]
#![deny(clippy::no_effect_underscore_binding)]

use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::fs::File;
use std::io::{self, BufWriter, IsTerminal};
use std::path::PathBuf;
use std::process;

use sparsetrack::config::{EngineConfig, RunConfig};
use sparsetrack::coordinate::DegeneracyPolicy;
use sparsetrack::data::fit_tsv_file;
use sparsetrack::report::{SelectionTrace, render_stacked_bars, write_tsv, write_weights_tsv};
use sparsetrack::simulate::generate_data;
use sparsetrack::{ArrivalObserver, ArrivalOutcome, LassoState, OnlineLasso};

#[derive(Parser)]
#[command(
    name = "sparsetrack",
    version,
    about = "Online sparse linear regression: a Lasso estimate updated one arrival at a time."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a sparse ground truth, stream it, and report feature selection over time
    #[command(about = "Run a synthetic experiment (outputs: selection.tsv and a chart)")]
    Simulate(SimulateArgs),

    /// Stream a TSV file of observations through the estimator
    #[command(about = "Fit weights from a TSV stream (outputs: weights.tsv)")]
    Fit(FitArgs),
}

#[derive(Args)]
struct SimulateArgs {
    /// TOML run configuration; flags below override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of available features (P)
    #[arg(long, value_name = "P")]
    total_features: Option<usize>,

    /// Number of features used by the true model (p)
    #[arg(long, value_name = "p")]
    true_features: Option<usize>,

    /// Number of arrivals to generate (T)
    #[arg(long, value_name = "T")]
    arrivals: Option<usize>,

    /// Standard deviation of the generated features
    #[arg(long)]
    feature_std: Option<f64>,

    /// Standard deviation of the nonzero true weights
    #[arg(long)]
    weight_std: Option<f64>,

    /// Seed for the data generator
    #[arg(long)]
    seed: Option<u64>,

    /// Observation-noise variance driving the penalty
    #[arg(long)]
    noise_variance: Option<f64>,

    /// First arrival drawn in the chart
    #[arg(long)]
    first_arrival: Option<usize>,

    /// Where to write per-arrival selection counts
    #[arg(long, default_value = "selection.tsv")]
    output: PathBuf,

    /// Skip printing the stacked bar chart
    #[arg(long)]
    no_chart: bool,
}

#[derive(Args)]
struct FitArgs {
    /// TSV file with a 'label' column followed by one column per feature
    input: PathBuf,

    /// TOML run configuration; only its [engine] section is used
    #[arg(long)]
    config: Option<PathBuf>,

    /// Observation-noise variance driving the penalty
    #[arg(long)]
    noise_variance: Option<f64>,

    /// Fail on a coordinate with zero accumulated energy instead of holding it at zero
    #[arg(long)]
    reject_degenerate: bool,

    /// Where to write the fitted weights
    #[arg(long, default_value = "weights.tsv")]
    output: PathBuf,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Simulate(args) => simulate(args),
        Commands::Fit(args) => fit(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn simulate(args: SimulateArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = match &args.config {
        Some(path) => RunConfig::from_toml_file(path)?,
        None => RunConfig::default(),
    };
    let sim = &mut config.simulation;
    if let Some(v) = args.total_features {
        sim.total_features = v;
    }
    if let Some(v) = args.true_features {
        sim.true_features = v;
    }
    if let Some(v) = args.arrivals {
        sim.arrivals = v;
    }
    if let Some(v) = args.feature_std {
        sim.feature_std = v;
    }
    if let Some(v) = args.weight_std {
        sim.weight_std = v;
    }
    if let Some(v) = args.seed {
        sim.seed = v;
    }
    if let Some(v) = args.noise_variance {
        config.engine.noise_variance = v;
    }
    if let Some(v) = args.first_arrival {
        config.report.first_arrival = v;
    }
    config.validate()?;

    let data = generate_data(&config.simulation)?;
    let total = config.simulation.total_features;
    let engine = OnlineLasso::with_config(total, &config.engine)?;

    let mut observers = (
        SelectionTrace::new(data.support.clone()),
        ProgressObserver::new("arrivals"),
    );
    let state = engine.run(
        engine.initial_state(),
        data.labels.view(),
        data.features.view(),
        &mut observers,
    )?;
    let (trace, _) = observers;

    write_tsv(trace.counts(), BufWriter::new(File::create(&args.output)?))?;
    println!("Selection counts written to {}", args.output.display());

    if let Some(last) = trace.counts().last() {
        println!(
            "Final support: {} correct, {} incorrect (true dimension {} of {}).",
            last.correct,
            last.incorrect,
            trace.true_support().len(),
            total
        );
    }
    println!("True support:      {:?}", trace.true_support());
    println!("Estimated support: {:?}", state.support());

    if args.no_chart {
        return Ok(());
    }
    if trace.counts().is_empty() {
        log::warn!("No arrivals were generated; skipping the chart.");
        return Ok(());
    }
    println!();
    render_stacked_bars(
        trace.counts(),
        trace.true_support().len(),
        total,
        &config.report,
        &mut io::stdout().lock(),
    )?;
    Ok(())
}

fn fit(args: FitArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut engine_config = match &args.config {
        Some(path) => RunConfig::from_toml_file(path)?.engine,
        None => EngineConfig::default(),
    };
    if let Some(v) = args.noise_variance {
        engine_config.noise_variance = v;
    }
    if args.reject_degenerate {
        engine_config.degeneracy = DegeneracyPolicy::Reject;
    }

    let mut progress = ProgressObserver::new("arrivals");
    let state = fit_tsv_file(&args.input, &engine_config, &mut progress)?;

    write_weights_tsv(state.theta(), BufWriter::new(File::create(&args.output)?))?;
    println!(
        "Fitted weights written to {} ({} of {} features selected).",
        args.output.display(),
        state.support().len(),
        state.dimension()
    );
    Ok(())
}

/// Shows streaming progress on stderr, and nothing at all when stderr is not
/// a terminal.
struct ProgressObserver {
    message: &'static str,
    bar: Option<ProgressBar>,
}

impl ProgressObserver {
    fn new(message: &'static str) -> Self {
        Self { message, bar: None }
    }
}

fn create_progress_bar(len: Option<u64>, message: &str) -> ProgressBar {
    let draw_target = if io::stderr().is_terminal() {
        ProgressDrawTarget::stderr_with_hz(20)
    } else {
        ProgressDrawTarget::hidden()
    };

    let pb = ProgressBar::with_draw_target(len, draw_target);
    let template = if len.is_some() {
        "\n> [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}"
    } else {
        "\n> [{elapsed_precise}] {spinner} {pos} {msg}"
    };
    if let Ok(style) = ProgressStyle::with_template(template) {
        pb.set_style(style.progress_chars("█▉▊▋▌▍▎▏  "));
    }
    pb.set_message(message.to_string());

    pb
}

impl ArrivalObserver for ProgressObserver {
    fn on_run_start(&mut self, total_arrivals: Option<usize>) {
        self.bar = Some(create_progress_bar(
            total_arrivals.map(|n| n as u64),
            self.message,
        ));
    }

    fn on_arrival(&mut self, _: usize, outcome: &ArrivalOutcome) {
        if let Some(bar) = &self.bar {
            bar.inc(1);
            if bar.position() % 64 == 0 {
                bar.set_message(format!(
                    "{} (support {})",
                    self.message,
                    outcome.state.support().len()
                ));
            }
        }
    }

    fn on_run_finish(&mut self, _: &LassoState) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
    }
}
