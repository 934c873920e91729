use std::fs;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use lava::analysis::{AnalysisReport, MetricKind, MetricSet, TimeAnchor, VibrationAnalyzer};
use lava::config::AppConfig;
use lava::fixtures::{ExpectationDiff, FixtureCatalog, FixtureProcessor};
use lava::ingest;
use lava::testing::{write_csv, AxisTone, SyntheticSpec, GRAVITY};
use serde::Serialize;

#[derive(Parser, Debug)]
#[command(
    name = "lava_cli",
    about = "Windowed vibration analysis of accelerometer recordings"
)]
struct Cli {
    /// Override directory containing fixture assets (defaults to ./fixtures)
    #[arg(long, global = true)]
    fixtures_dir: Option<PathBuf>,
    /// Log at DEBUG level
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Analyze a recording and print the per-window metric report as JSON
    Analyze {
        #[arg(long)]
        input: PathBuf,
        /// JSON configuration file; flags below override its values
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long)]
        window_seconds: Option<f64>,
        #[arg(long)]
        overlap: Option<f64>,
        /// Comma-separated metric names, or `all`
        #[arg(long)]
        metrics: Option<String>,
        #[arg(long, value_enum)]
        anchor: Option<AnchorArg>,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Run a fixture and compare the report against its expectations
    Check {
        #[arg(long)]
        fixture: String,
        #[arg(long)]
        expect: Option<PathBuf>,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Write a deterministic synthetic recording as CSV
    Synthesize {
        #[arg(long)]
        output: PathBuf,
        #[arg(long, default_value_t = 100.0)]
        rate: f64,
        #[arg(long, default_value_t = 10.0)]
        duration: f64,
        #[arg(long, default_value_t = 0.0)]
        x_hz: f64,
        #[arg(long, default_value_t = 0.0)]
        y_hz: f64,
        #[arg(long, default_value_t = 0.0)]
        z_hz: f64,
        /// Peak amplitude of every oscillating axis
        #[arg(long, default_value_t = 0.5)]
        amplitude: f64,
        #[arg(long, default_value_t = 0.0)]
        noise: f64,
        #[arg(long, default_value_t = 0.0)]
        jitter: f64,
        /// RFC 3339 wall-clock time of the first sample
        #[arg(long)]
        start_time: Option<DateTime<Utc>>,
        #[arg(long, default_value_t = 0x1A7A_5EED)]
        seed: u64,
    },
    /// List metric names accepted by --metrics
    ListMetrics,
    /// List available fixtures on disk
    DumpFixtures,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum AnchorArg {
    First,
    Center,
    Last,
}

impl From<AnchorArg> for TimeAnchor {
    fn from(arg: AnchorArg) -> Self {
        match arg {
            AnchorArg::First => TimeAnchor::First,
            AnchorArg::Center => TimeAnchor::Center,
            AnchorArg::Last => TimeAnchor::Last,
        }
    }
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:?}");
            ExitCode::from(1)
        }
    }
}

fn run() -> Result<ExitCode> {
    let cli = Cli::parse();
    lava::init_logging(cli.verbose);

    let catalog = cli
        .fixtures_dir
        .map(FixtureCatalog::new)
        .unwrap_or_else(FixtureCatalog::default);

    match cli.command {
        Commands::Analyze {
            input,
            config,
            window_seconds,
            overlap,
            metrics,
            anchor,
            output,
        } => {
            let mut app_config = config
                .map(AppConfig::load_from_file)
                .unwrap_or_default();
            let analysis = &mut app_config.analysis;
            if let Some(seconds) = window_seconds {
                analysis.window_seconds = seconds;
            }
            if let Some(fraction) = overlap {
                analysis.overlap_fraction = fraction;
            }
            if let Some(list) = metrics {
                analysis.requested_metrics = MetricSet::parse_list(&list)?;
            }
            if let Some(anchor) = anchor {
                analysis.time_anchor = anchor.into();
            }
            run_analyze(&input, &app_config, output)
        }
        Commands::Check {
            fixture,
            expect,
            output,
        } => run_check(&catalog, &fixture, expect, output),
        Commands::Synthesize {
            output,
            rate,
            duration,
            x_hz,
            y_hz,
            z_hz,
            amplitude,
            noise,
            jitter,
            start_time,
            seed,
        } => {
            let tone = |hz: f64, offset: f64| {
                let amp = if hz > 0.0 { amplitude } else { 0.0 };
                AxisTone::new(hz, amp, offset)
            };
            let spec = SyntheticSpec {
                sample_rate: rate,
                duration_seconds: duration,
                first_timestamp: 0.0,
                x: tone(x_hz, 0.0),
                y: tone(y_hz, 0.0),
                z: tone(z_hz, GRAVITY),
                noise_amplitude: noise,
                jitter_fraction: jitter,
                start_time: start_time.unwrap_or_default(),
                seed,
            };
            run_synthesize(&spec, &output)
        }
        Commands::ListMetrics => run_list_metrics(),
        Commands::DumpFixtures => run_dump(&catalog),
    }
}

fn run_analyze(input: &Path, config: &AppConfig, output_path: Option<PathBuf>) -> Result<ExitCode> {
    let series = ingest::read_series(input, &config.ingest)
        .with_context(|| format!("reading {}", input.display()))?;
    let report = VibrationAnalyzer::new()
        .analyze(&series, &config.analysis)
        .with_context(|| format!("analyzing {}", input.display()))?;

    emit_report(&input.display().to_string(), &report, output_path)?;
    Ok(ExitCode::from(0))
}

fn run_check(
    catalog: &FixtureCatalog,
    fixture: &str,
    override_expect: Option<PathBuf>,
    output_path: Option<PathBuf>,
) -> Result<ExitCode> {
    let processor = FixtureProcessor::new(AppConfig::default().analysis);
    let data = catalog.load(fixture, override_expect)?;
    let report = processor
        .run(&data)
        .with_context(|| format!("processing fixture {}", fixture))?;

    emit_report(&data.metadata.name, &report, output_path)?;

    if let Some(expectations) = data.expectations {
        match expectations.verify(&report) {
            Ok(()) => Ok(ExitCode::from(0)),
            Err(diff) => {
                emit_diff(&diff)?;
                Ok(ExitCode::from(2))
            }
        }
    } else {
        Ok(ExitCode::from(0))
    }
}

fn run_synthesize(spec: &SyntheticSpec, output: &Path) -> Result<ExitCode> {
    let series = spec.generate();
    let file = fs::File::create(output).with_context(|| format!("creating {}", output.display()))?;
    write_csv(&series, BufWriter::new(file))
        .with_context(|| format!("writing {}", output.display()))?;

    eprintln!("Wrote {} samples to {}", series.len(), output.display());
    Ok(ExitCode::from(0))
}

fn run_list_metrics() -> Result<ExitCode> {
    for kind in MetricKind::all() {
        println!("{kind}");
    }
    Ok(ExitCode::from(0))
}

fn run_dump(catalog: &FixtureCatalog) -> Result<ExitCode> {
    let fixtures = catalog.discover()?;
    if fixtures.is_empty() {
        println!("No fixtures found under {}", catalog.root().display());
        return Ok(ExitCode::from(0));
    }

    for metadata in fixtures {
        if let Some(expect) = metadata.expect_path {
            println!("{} -> {}", metadata.name, expect.display());
        } else {
            println!("{}", metadata.name);
        }
    }
    Ok(ExitCode::from(0))
}

fn emit_report(source: &str, report: &AnalysisReport, output_path: Option<PathBuf>) -> Result<()> {
    let payload = ReportPayload {
        source,
        record_count: report.records.len(),
        report,
    };
    let json = serde_json::to_string_pretty(&payload)?;

    if let Some(path) = output_path {
        fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;
    } else {
        println!("{json}");
    }

    Ok(())
}

fn emit_diff(diff: &ExpectationDiff) -> Result<()> {
    let json = serde_json::to_string_pretty(&diff.to_json())?;
    eprintln!("{json}");
    Ok(())
}

#[derive(Serialize)]
struct ReportPayload<'a> {
    source: &'a str,
    record_count: usize,
    #[serde(flatten)]
    report: &'a AnalysisReport,
}
