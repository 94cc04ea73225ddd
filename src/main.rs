// src/main.rs
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, TryRecvError};
use std::thread;
use std::time::{Duration, Instant};
use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::json;
use neurotwin::api::fit::{lookback, FitSession, FitnessTracker, SimulatedFitTracker};
use neurotwin::api::llm::{anomaly_analysis_prompt, health_recommendations_prompt};
use neurotwin::api::{
    CompletionOptions, DashboardApi, HealthData, HttpTransport, LlmConnection, TimeRange,
};
use neurotwin::config::{DashboardConfig, LLM_API_KEY_ENV};
use neurotwin::engine::{spawn_chart_feed, spawn_live_feed};
use neurotwin::signal::{
    demo_anomalies, detect_anomalies, render_bands_png, render_chart_png, render_ecg_png,
    ChartPipeline, LivePipeline, PlotStyle, RngEntropy, SystemClock, SystemEntropy,
};
use neurotwin::types::{AnomalyKind, FeedMessage};
#[derive(Parser)]
#[command(author, version, about = "Neuro-cardiac digital twin signal engine", long_about = None)]
struct Cli {
    /// JSON config file; defaults are used for anything it leaves out
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
    /// Seed the random source for reproducible signals
    #[arg(long, global = true)]
    seed: Option<u64>,
    #[command(subcommand)]
    command: Commands,
}
#[derive(Subcommand)]
enum Commands {
    /// Run the live and chart feeds and print what they produce
    Stream {
        #[arg(short, long, default_value_t = 10)]
        seconds: u64,
    },
    /// Run the series detector over a generated window and print anomalies as JSON
    Detect {
        #[arg(short, long, value_enum)]
        kind: Option<KindArg>,
        /// Print the canned dashboard alerts instead
        #[arg(long)]
        demo: bool,
    },
    /// Render the ECG window, its EEG bands and the redraw chart to PNG
    Snapshot {
        #[arg(short, long, default_value = ".")]
        out: PathBuf,
    },
    /// Connect the simulated fitness tracker and fetch a summary
    Fit {
        #[arg(long, default_value_t = 24)]
        hours: i64,
    },
    /// Build an LLM prompt from the current alerts, optionally sending it
    Prompt {
        /// Analyze the alert at this index instead of asking for recommendations
        #[arg(long)]
        analyze: Option<usize>,
        #[arg(long)]
        send: bool,
    },
    /// Query the dashboard backend
    Backend {
        #[arg(value_enum)]
        query: BackendQuery,
        /// Look back this many minutes
        #[arg(long, default_value_t = 60)]
        minutes: i64,
    },
}
#[derive(Clone, Copy, ValueEnum)]
enum KindArg {
    Ecg,
    Eeg,
    Combined,
}
impl From<KindArg> for AnomalyKind {
    fn from(value: KindArg) -> Self {
        match value {
            KindArg::Ecg => AnomalyKind::Ecg,
            KindArg::Eeg => AnomalyKind::Eeg,
            KindArg::Combined => AnomalyKind::Combined,
        }
    }
}
#[derive(Clone, Copy, ValueEnum)]
enum BackendQuery {
    Ecg,
    Eeg,
    Anomalies,
    FitStatus,
}
fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let config = DashboardConfig::resolve(cli.config.as_deref()).context("failed to load config")?;
    match cli.command {
        Commands::Stream { seconds } => stream(&config, cli.seed, seconds),
        Commands::Detect { kind, demo } => detect(&config, cli.seed, kind.map(Into::into), demo),
        Commands::Snapshot { out } => snapshot(&config, cli.seed, &out),
        Commands::Fit { hours } => fit(&config, cli.seed, hours),
        Commands::Prompt { analyze, send } => prompt(&config, analyze, send),
        Commands::Backend { query, minutes } => backend(&config, query, minutes),
    }
}
// 每个 feed 各用一条随机流，给定 seed 时可复现
fn entropy(seed: Option<u64>, stream: u64) -> SystemEntropy {
    match seed {
        Some(seed) => RngEntropy::seeded(seed.wrapping_add(stream)),
        None => RngEntropy::from_entropy(),
    }
}
const POLL_INTERVAL: Duration = Duration::from_millis(20);
#[derive(Default)]
struct StreamCounts {
    live: usize,
    chart: usize,
}
fn stream(config: &DashboardConfig, seed: Option<u64>, seconds: u64) -> Result<()> {
    // 两个 feed 各有自己的通道，互不阻塞
    let (live_tx, live_rx) = channel();
    let (chart_tx, chart_rx) = channel();
    let live = spawn_live_feed(config, live_tx, entropy(seed, 0), SystemClock)
        .context("failed to start live feed")?;
    let chart = spawn_chart_feed(config, chart_tx, entropy(seed, 1)).context("failed to start chart feed")?;
    let deadline = Instant::now() + Duration::from_secs(seconds);
    let mut counts = StreamCounts::default();
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            break;
        }
        let mut idle = true;
        for (name, rx) in [("live", &live_rx), ("chart", &chart_rx)] {
            match rx.try_recv() {
                Ok(message) => {
                    idle = false;
                    report(message, &mut counts);
                }
                Err(TryRecvError::Empty) => {}
                Err(TryRecvError::Disconnected) => bail!("{name} feed stopped unexpectedly"),
            }
        }
        if idle {
            thread::sleep(POLL_INTERVAL.min(remaining));
        }
    }
    live.stop();
    chart.stop();
    log::info!("received {} live samples and {} chart points", counts.live, counts.chart);
    Ok(())
}
fn report(message: FeedMessage, counts: &mut StreamCounts) {
    match message {
        FeedMessage::Log(line) => log::info!("{line}"),
        FeedMessage::Live(reading) => {
            counts.live += 1;
            let b = reading.bands;
            println!(
                "{} ecg={:+.3} alpha={:.3} beta={:.3} theta={:.3} delta={:.3}{}",
                reading.sample.timestamp,
                reading.sample.value,
                b.alpha,
                b.beta,
                b.theta,
                b.delta,
                if reading.flags.any() { " ANOMALY" } else { "" }
            );
        }
        FeedMessage::Chart(point) => {
            counts.chart += 1;
            log::debug!("chart t={:.1} ecg={:.3} eeg={:.3}", point.t, point.ecg, point.eeg);
        }
    }
}
fn detect(config: &DashboardConfig, seed: Option<u64>, kind: Option<AnomalyKind>, demo: bool) -> Result<()> {
    let anomalies = if demo {
        demo_anomalies(Utc::now())
    } else {
        let mut rng = entropy(seed, 0);
        let now = Utc::now().timestamp_millis();
        let pipeline = LivePipeline::seeded(config.window_capacity, now, &mut rng)?;
        let eeg = pipeline.eeg_series(now, &mut rng);
        detect_anomalies(&pipeline.window().to_vec(), &eeg, kind)
    };
    log::info!("{} anomalies", anomalies.len());
    println!("{}", serde_json::to_string_pretty(&anomalies)?);
    Ok(())
}
fn snapshot(config: &DashboardConfig, seed: Option<u64>, out: &Path) -> Result<()> {
    fs::create_dir_all(out).with_context(|| format!("failed to create {}", out.display()))?;
    let mut rng = entropy(seed, 0);
    let now = Utc::now().timestamp_millis();
    let live = LivePipeline::seeded(config.window_capacity, now, &mut rng)?;
    let chart = ChartPipeline::seeded(config.window_capacity, config.chart_step, &mut rng)?;
    let ecg = render_ecg_png(&live.window().to_vec(), PlotStyle::default())?;
    let bands = render_bands_png(&live.eeg_series(now, &mut rng), PlotStyle::default())?;
    let redraw = render_chart_png(&chart.window().to_vec(), PlotStyle::default())?;
    for (name, png) in [("ecg.png", ecg), ("eeg.png", bands), ("chart.png", redraw)] {
        let path = out.join(name);
        fs::write(&path, png).with_context(|| format!("failed to write {}", path.display()))?;
        println!("wrote {}", path.display());
    }
    Ok(())
}
fn fit(config: &DashboardConfig, seed: Option<u64>, hours: i64) -> Result<()> {
    let mut tracker = SimulatedFitTracker::new(config.fit_latency, entropy(seed, 2), SystemClock);
    let session = tracker.connect(FitSession::new());
    let (start, end) = lookback(Utc::now(), hours).with_context(|| format!("--hours {hours} is out of range"))?;
    let heart = tracker.fetch_heart_rate(&session, start, end)?;
    let activity = tracker.fetch_activity(&heart.session, start, end)?;
    let sleep = tracker.fetch_sleep(&activity.session, start, end)?;
    let session = tracker.disconnect(sleep.session);
    let mean_bpm = if heart.data.is_empty() {
        0.0
    } else {
        heart.data.iter().map(|p| f64::from(p.value)).sum::<f64>() / heart.data.len() as f64
    };
    let summary = json!({
        "session": session,
        "heartRate": { "points": heart.data.len(), "meanBpm": mean_bpm },
        "activity": activity.data,
        "sleep": sleep.data,
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
fn prompt(config: &DashboardConfig, analyze: Option<usize>, send: bool) -> Result<()> {
    let data = HealthData {
        anomalies: demo_anomalies(Utc::now()),
        ..Default::default()
    };
    let text = match analyze {
        Some(index) => {
            let anomaly = data
                .anomalies
                .get(index)
                .with_context(|| format!("no alert at index {index}"))?;
            anomaly_analysis_prompt(anomaly, &data)
        }
        None => health_recommendations_prompt(&data),
    };
    if !send {
        println!("{text}");
        return Ok(());
    }
    let mut connection = LlmConnection::default();
    connection
        .connect(config.llm.api_key.as_deref().unwrap_or_default())
        .with_context(|| format!("set {LLM_API_KEY_ENV} or llm.api_key to send prompts"))?;
    let client = connection.client(&config.llm)?;
    let reply = client
        .complete(&text, &CompletionOptions::default())
        .context("LLM request failed")?;
    println!("{reply}");
    Ok(())
}
fn backend(config: &DashboardConfig, query: BackendQuery, minutes: i64) -> Result<()> {
    let api = DashboardApi::new(HttpTransport::new(config.api_base_url.clone())?);
    let end = Utc::now().timestamp_millis();
    let range = TimeRange::last_minutes(end, minutes)
        .with_context(|| format!("--minutes {minutes} is out of range"))?;
    let value = match query {
        BackendQuery::Ecg => serde_json::to_value(api.ecg(range)?)?,
        BackendQuery::Eeg => serde_json::to_value(api.eeg(range)?)?,
        BackendQuery::Anomalies => serde_json::to_value(api.anomalies(range)?)?,
        BackendQuery::FitStatus => api.fit_status()?,
    };
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}
