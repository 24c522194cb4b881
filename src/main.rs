//! Neuro-adaptive engine CLI
//!
//! Privacy-first emotion detection from interaction rhythm.

use clap::{Parser, Subcommand, ValueEnum};
use neuroadaptive_engine::{
    adaptive::UiAdaptation,
    collector::{parse_events, CollectorError, ReplayCollector, SensorEvent},
    companion::{Companion, ResponseStyle},
    config::{Config, SourceConfig},
    core::{EmotionDetectionEngine, EmotionReading},
    journal::{MoodJournal, MoodTrend},
    plugins::{PluginRegistry, SubscriptionTier, CATALOG},
    store::JsonStore,
    transparency::{create_shared_log_with_persistence, SharedTransparencyLog, TransparencyLog},
    PRIVACY_DECLARATION, VERSION,
};
use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "neuroadaptive")]
#[command(version = VERSION)]
#[command(about = "Privacy-first emotion detection from interaction rhythm", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a recorded JSON-lines event stream
    Analyze {
        /// Event file (reads stdin when omitted)
        input: Option<PathBuf>,

        /// Emit a reading every N events (0 for the final reading only)
        #[arg(long, default_value = "25")]
        every: usize,

        /// Input sources to use (keyboard, mouse, or all)
        #[arg(long, default_value = "all")]
        sources: String,

        /// Print readings as JSON lines
        #[arg(long)]
        json: bool,
    },

    /// Stream events from stdin and report readings periodically
    Watch {
        /// Input sources to use (keyboard, mouse, or all)
        #[arg(long, default_value = "all")]
        sources: String,

        /// Seconds between readings (defaults to the configured interval)
        #[arg(long)]
        interval: Option<u64>,
    },

    /// Talk to the companion
    Chat {
        /// Message to send (starts an interactive session when omitted)
        message: Option<String>,

        /// Event file whose reading the companion should take into account
        #[arg(long)]
        events: Option<PathBuf>,
    },

    /// Tell the companion whether its last reply helped
    Feedback {
        #[arg(value_enum)]
        verdict: Verdict,
    },

    /// Mood journal
    Journal {
        #[command(subcommand)]
        action: JournalAction,
    },

    /// Bundled plugins and subscription tier
    Plugins {
        #[command(subcommand)]
        action: PluginAction,
    },

    /// Show stored statistics and settings
    Status,

    /// Display privacy declaration
    Privacy,

    /// Show configuration
    Config,

    /// Serve the HTTP API for browser front-ends (requires server feature)
    Serve {
        /// Port to bind on 127.0.0.1 (0 for random)
        #[arg(long, default_value = "7400")]
        port: u16,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Verdict {
    Helpful,
    Unhelpful,
}

#[derive(Subcommand)]
enum JournalAction {
    /// Add an entry
    Add {
        /// Mood from 1 (low) to 10 (high)
        mood: u8,

        /// What's on your mind
        text: String,

        /// Comma-separated tags
        #[arg(long, value_delimiter = ',')]
        tags: Vec<String>,

        /// Event file whose detected state is attached to the entry
        #[arg(long)]
        events: Option<PathBuf>,
    },

    /// List recent entries
    List {
        #[arg(long, default_value = "10")]
        limit: usize,
    },

    /// Summarize mood over all entries
    Summary,

    /// Remove an entry by id
    Remove { id: Uuid },
}

#[derive(Subcommand)]
enum PluginAction {
    /// List the plugin catalog
    List,

    /// Enable a plugin
    Enable { id: String },

    /// Disable a plugin
    Disable { id: String },

    /// Show or change the subscription tier
    Tier { tier: Option<SubscriptionTier> },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            input,
            every,
            sources,
            json,
        } => {
            cmd_analyze(input.as_deref(), every, &sources, json);
        }
        Commands::Watch { sources, interval } => {
            cmd_watch(&sources, interval);
        }
        Commands::Chat { message, events } => {
            cmd_chat(message, events.as_deref());
        }
        Commands::Feedback { verdict } => {
            cmd_feedback(verdict);
        }
        Commands::Journal { action } => {
            cmd_journal(action);
        }
        Commands::Plugins { action } => {
            cmd_plugins(action);
        }
        Commands::Status => {
            cmd_status();
        }
        Commands::Privacy => {
            cmd_privacy();
        }
        Commands::Config => {
            cmd_config();
        }
        Commands::Serve { port } => {
            cmd_serve(port);
        }
    }
}

fn cmd_analyze(input: Option<&Path>, every: usize, sources: &str, json: bool) {
    let config = load_config();
    let source_config = parse_sources(sources);

    let events = match read_events(input) {
        Ok(events) => events,
        Err(e) => {
            eprintln!("Error reading events: {e}");
            std::process::exit(1);
        }
    };

    let transparency_log = transparency_log(&config);
    let mut engine = EmotionDetectionEngine::with_sources(config.detector.clone(), source_config);

    for (index, event) in events.iter().enumerate() {
        transparency_log.record_event(event);
        engine.record_event(event);

        let processed = index + 1;
        if every > 0 && processed % every == 0 && processed < events.len() {
            let reading = engine.detect();
            transparency_log.record_reading(reading.state);
            print_reading(&reading, json);
        }
    }

    let reading = engine.detect();
    transparency_log.record_reading(reading.state);
    print_reading(&reading, json);

    if json {
        println!("{}", analysis_summary(events.len(), &reading));
    } else {
        let adaptation = UiAdaptation::for_reading(&reading);
        println!();
        println!("Events analyzed: {}", events.len());
        println!(
            "Suggested theme: {:?}, animation x{:.1}{}",
            adaptation.theme,
            adaptation.animation_scale,
            if adaptation.reduce_notifications {
                ", notifications muted"
            } else {
                ""
            }
        );
        if let Some(suggestion) = adaptation.suggestion {
            println!("Suggestion: {suggestion}");
        }
    }

    if let Err(e) = transparency_log.save() {
        eprintln!("Warning: Could not save transparency stats: {e}");
    }
}

fn cmd_watch(sources: &str, interval: Option<u64>) {
    let config = load_config();
    let source_config = parse_sources(sources);
    let interval = interval
        .map(Duration::from_secs)
        .unwrap_or(config.detect_interval)
        .max(Duration::from_secs(1));

    if let Err(e) = config.ensure_directories() {
        eprintln!("Warning: Could not create directories: {e}");
    }

    println!("Neuro-adaptive engine v{VERSION}");
    println!();
    println!("Reading events from stdin...");
    println!("  Keyboard: {}", enabled_label(source_config.keyboard));
    println!("  Mouse: {}", enabled_label(source_config.mouse));
    println!("  Reading interval: {}s", interval.as_secs());
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    let transparency_log = transparency_log(&config);
    let mut engine = EmotionDetectionEngine::with_sources(config.detector.clone(), source_config);
    let mut collector = ReplayCollector::new(BufReader::new(std::io::stdin()));

    // Set up Ctrl+C handler
    let running = Arc::new(AtomicBool::new(true));
    ctrlc_handler(running.clone());

    if let Err(e) = collector.start() {
        eprintln!("Error starting collector: {e}");
        std::process::exit(1);
    }

    let receiver = collector.receiver().clone();
    let mut last_detect = Instant::now();

    while running.load(Ordering::SeqCst) {
        match receiver.recv_timeout(Duration::from_millis(100)) {
            Ok(event) => {
                transparency_log.record_event(&event);
                engine.record_event(&event);
            }
            Err(crossbeam_channel::RecvTimeoutError::Timeout) => {}
            Err(crossbeam_channel::RecvTimeoutError::Disconnected) => {
                println!("End of input.");
                break;
            }
        }

        if last_detect.elapsed() >= interval {
            report(&mut engine, &transparency_log);
            last_detect = Instant::now();
        }
    }

    collector.stop();
    report(&mut engine, &transparency_log);

    if collector.dropped_lines() > 0 {
        eprintln!("Skipped {} malformed line(s)", collector.dropped_lines());
    }

    if let Err(e) = transparency_log.save() {
        eprintln!("Warning: Could not save transparency stats: {e}");
    }

    // Final stats
    println!();
    println!("{}", transparency_log.summary());
}

/// Detect, log and print one reading with its UI hints.
fn report(engine: &mut EmotionDetectionEngine, transparency_log: &SharedTransparencyLog) {
    if engine.sample_count() == 0 {
        return;
    }
    let reading = engine.detect();
    transparency_log.record_reading(reading.state);
    print_reading(&reading, false);

    let adaptation = UiAdaptation::for_reading(&reading);
    if let Some(suggestion) = adaptation.suggestion {
        println!("    {suggestion}");
    }
}

fn cmd_chat(message: Option<String>, events: Option<&Path>) {
    let config = load_config();
    let reading = events.map(|path| reading_from_file(&config, path));
    let mut companion = load_companion(&config);

    match message {
        Some(message) => {
            reply(&mut companion, &message, reading.as_ref());
        }
        None => {
            println!("Companion ready. Type 'quit' to leave.");
            if let Some(name) = companion.training().user_name.as_deref() {
                println!("Welcome back, {name}.");
            }
            println!();

            let stdin = std::io::stdin();
            loop {
                print!("> ");
                let _ = std::io::stdout().flush();

                let mut line = String::new();
                match stdin.lock().read_line(&mut line) {
                    Ok(0) => break,
                    Ok(_) => {}
                    Err(e) => {
                        eprintln!("Error reading input: {e}");
                        break;
                    }
                }

                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                if matches!(line, "quit" | "exit") {
                    break;
                }
                reply(&mut companion, line, reading.as_ref());
            }
        }
    }

    if let Err(e) = companion.save() {
        eprintln!("Warning: Could not save companion data: {e}");
    }
}

fn reply(companion: &mut Companion, message: &str, reading: Option<&EmotionReading>) {
    match companion.respond(message, reading) {
        Ok(reply) => println!("{}", reply.message),
        Err(e) => eprintln!("{e}"),
    }
}

fn cmd_feedback(verdict: Verdict) {
    let config = load_config();
    let mut companion = load_companion(&config);

    let helpful = matches!(verdict, Verdict::Helpful);
    match companion.feedback(helpful) {
        Ok(style) => {
            if let Err(e) = companion.save() {
                eprintln!("Error saving companion data: {e}");
                std::process::exit(1);
            }
            println!(
                "Thanks for the feedback. Response style: {}",
                style_label(style)
            );
        }
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}

fn cmd_journal(action: JournalAction) {
    let config = load_config();
    let mut journal = match MoodJournal::load(store(&config)) {
        Ok(journal) => journal,
        Err(e) => {
            eprintln!("Error loading journal: {e}");
            std::process::exit(1);
        }
    };

    match action {
        JournalAction::Add {
            mood,
            text,
            tags,
            events,
        } => {
            let detected_state = events.map(|path| reading_from_file(&config, &path).state);
            let id = match journal.add(mood, &text, tags, detected_state) {
                Ok(entry) => entry.id,
                Err(e) => {
                    eprintln!("Error: {e}");
                    std::process::exit(1);
                }
            };
            save_journal(&journal);
            println!("Added entry {id}");
        }
        JournalAction::List { limit } => {
            let entries = journal.recent(limit);
            if entries.is_empty() {
                println!("No journal entries yet.");
                println!("Run 'neuroadaptive journal add <mood> <text>' to write one.");
                return;
            }
            for entry in entries {
                let state = entry
                    .detected_state
                    .map(|s| format!(" [{s}]"))
                    .unwrap_or_default();
                let tags = if entry.tags.is_empty() {
                    String::new()
                } else {
                    format!(" #{}", entry.tags.join(" #"))
                };
                println!(
                    "{}  {}  mood {:>2}{}  {}{}",
                    entry.id,
                    entry.created_at.format("%Y-%m-%d %H:%M"),
                    entry.mood,
                    state,
                    entry.text,
                    tags
                );
            }
        }
        JournalAction::Summary => {
            let summary = journal.summary();
            println!("Mood Summary");
            println!("============");
            println!();
            println!("  Entries: {}", summary.entry_count);
            match summary.average_mood {
                Some(avg) => println!("  Average mood: {avg:.1}"),
                None => println!("  Average mood: -"),
            }
            match summary.dominant_state {
                Some(state) => println!("  Most detected state: {state}"),
                None => println!("  Most detected state: -"),
            }
            let trend = match summary.trend {
                MoodTrend::Improving => "improving",
                MoodTrend::Declining => "declining",
                MoodTrend::Stable => "stable",
                MoodTrend::InsufficientData => "not enough entries yet",
            };
            println!("  Trend: {trend}");
        }
        JournalAction::Remove { id } => {
            if !journal.remove(id) {
                eprintln!("Error: No journal entry with id {id}");
                std::process::exit(1);
            }
            save_journal(&journal);
            println!("Removed entry {id}");
        }
    }
}

fn save_journal(journal: &MoodJournal) {
    if let Err(e) = journal.save() {
        eprintln!("Error saving journal: {e}");
        std::process::exit(1);
    }
}

fn cmd_plugins(action: PluginAction) {
    let config = load_config();
    let mut registry = match PluginRegistry::load(store(&config)) {
        Ok(registry) => registry,
        Err(e) => {
            eprintln!("Error loading plugins: {e}");
            std::process::exit(1);
        }
    };

    match action {
        PluginAction::List => {
            println!("Plugins (tier: {})", registry.tier());
            println!();
            for plugin in CATALOG {
                let marker = if registry.is_enabled(plugin.id) {
                    "[x]"
                } else if plugin.min_tier > registry.tier() {
                    "[-]"
                } else {
                    "[ ]"
                };
                println!(
                    "  {marker} {:<20} {:<8} {}",
                    plugin.id, plugin.min_tier, plugin.description
                );
            }
            return;
        }
        PluginAction::Enable { id } => match registry.enable(&id) {
            Ok(plugin) => println!("Enabled {}", plugin.name),
            Err(e) => {
                eprintln!("Error: {e}");
                std::process::exit(1);
            }
        },
        PluginAction::Disable { id } => match registry.disable(&id) {
            Ok(true) => println!("Disabled {id}"),
            Ok(false) => println!("{id} was not enabled"),
            Err(e) => {
                eprintln!("Error: {e}");
                std::process::exit(1);
            }
        },
        PluginAction::Tier { tier: None } => {
            println!("Subscription tier: {}", registry.tier());
            return;
        }
        PluginAction::Tier { tier: Some(tier) } => {
            let disabled = registry.set_tier(tier);
            println!("Subscription tier: {tier}");
            for id in disabled {
                println!("  Disabled {id} (requires a higher tier)");
            }
        }
    }

    if let Err(e) = registry.save() {
        eprintln!("Error saving plugins: {e}");
        std::process::exit(1);
    }
}

fn cmd_status() {
    let config = load_config();

    println!("Neuro-adaptive Engine Status");
    println!("============================");
    println!();

    // Show config
    println!("Configuration:");
    println!("  Keyboard: {}", enabled_label(config.sources.keyboard));
    println!("  Mouse: {}", enabled_label(config.sources.mouse));
    println!("  Reading interval: {}s", config.detect_interval.as_secs());
    println!("  Data path: {:?}", config.data_path);
    println!();

    let stats_path = config.data_path.join("transparency.json");
    if stats_path.exists() {
        let stats = TransparencyLog::with_persistence(stats_path).stats();
        println!("Cumulative Statistics:");
        println!("  Keyboard events: {}", stats.keyboard_events);
        println!("  Mouse events: {}", stats.mouse_events);
        println!("  Readings computed: {}", stats.readings_computed);
        for (state, count) in &stats.state_counts {
            println!("    {state}: {count}");
        }
    } else {
        println!("No previous session data found.");
    }
    println!();

    let store = store(&config);
    if let Ok(journal) = MoodJournal::load(store.clone()) {
        println!("Journal entries: {}", journal.entries().len());
    }
    if let Ok(registry) = PluginRegistry::load(store.clone()) {
        println!(
            "Plugins: {} enabled (tier: {})",
            registry.enabled().len(),
            registry.tier()
        );
    }
    if let Ok(companion) = Companion::load(store) {
        let training = companion.training();
        println!(
            "Companion: {} message(s), {} style",
            training.message_count,
            style_label(training.style)
        );
    }
}

fn cmd_privacy() {
    println!("{PRIVACY_DECLARATION}");
}

fn cmd_config() {
    let config = load_config();

    println!("Configuration");
    println!("=============");
    println!();
    println!("Config file: {:?}", Config::config_path());
    println!();
    println!(
        "{}",
        serde_json::to_string_pretty(&config).unwrap_or_else(|_| "Error".to_string())
    );
}

#[cfg(feature = "server")]
fn cmd_serve(port: u16) {
    use neuroadaptive_engine::server::{run, ServerConfig};

    let config = load_config();
    if let Err(e) = config.ensure_directories() {
        eprintln!("Warning: Could not create directories: {e}");
    }

    let server_config = ServerConfig {
        detector: config.detector.clone(),
        sources: config.sources,
        ..ServerConfig::new(port, config.data_path.clone())
    };

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Error starting runtime: {e}");
            std::process::exit(1);
        }
    };

    let result: anyhow::Result<()> = runtime.block_on(async {
        let (addr, shutdown_tx) = run(server_config).await?;
        println!("Listening on http://{addr}");
        println!("Press Ctrl+C to stop");

        tokio::signal::ctrl_c().await?;
        let _ = shutdown_tx.send(());
        Ok(())
    });

    if let Err(e) = result {
        eprintln!("Server error: {e}");
        std::process::exit(1);
    }
}

#[cfg(not(feature = "server"))]
fn cmd_serve(_port: u16) {
    eprintln!("Error: serve requires the server feature (rebuild with --features server)");
    std::process::exit(1);
}

/// Load configuration, falling back to defaults with a warning.
fn load_config() -> Config {
    Config::load().unwrap_or_else(|e| {
        eprintln!("Warning: Could not load config ({e}), using defaults");
        Config::default()
    })
}

fn store(config: &Config) -> JsonStore {
    JsonStore::new(config.data_path.clone())
}

fn load_companion(config: &Config) -> Companion {
    Companion::load(store(config)).unwrap_or_else(|e| {
        eprintln!("Warning: Could not load companion data ({e}), starting fresh");
        Companion::new()
    })
}

fn transparency_log(config: &Config) -> SharedTransparencyLog {
    create_shared_log_with_persistence(config.data_path.join("transparency.json"))
}

fn parse_sources(sources: &str) -> SourceConfig {
    let source_config = SourceConfig::from_csv(sources);
    if !source_config.any_enabled() {
        eprintln!("Error: At least one source must be enabled (keyboard or mouse)");
        std::process::exit(1);
    }
    source_config
}

fn read_events(input: Option<&Path>) -> Result<Vec<SensorEvent>, CollectorError> {
    match input {
        Some(path) => parse_events(BufReader::new(File::open(path)?)),
        None => parse_events(std::io::stdin().lock()),
    }
}

/// Run a whole event file through a fresh engine and return the final reading.
fn reading_from_file(config: &Config, path: &Path) -> EmotionReading {
    let events = match read_events(Some(path)) {
        Ok(events) => events,
        Err(e) => {
            eprintln!("Error reading events from {path:?}: {e}");
            std::process::exit(1);
        }
    };

    let mut engine =
        EmotionDetectionEngine::with_sources(config.detector.clone(), config.sources);
    for event in &events {
        engine.record_event(event);
    }
    engine.detect()
}

fn print_reading(reading: &EmotionReading, json: bool) {
    if json {
        match serde_json::to_string(reading) {
            Ok(line) => println!("{line}"),
            Err(e) => eprintln!("Error serializing reading: {e}"),
        }
        return;
    }

    println!(
        "[{}] {:<9} load: {:<6} confidence: {:.2} ({} samples)",
        reading.computed_at.format("%H:%M:%S"),
        reading.state.to_string(),
        reading.cognitive_load.to_string(),
        reading.confidence,
        reading.metrics.usable_samples()
    );
}

/// Closing line of `analyze --json`: event count and the UI adaptation.
fn analysis_summary(events: usize, reading: &EmotionReading) -> serde_json::Value {
    serde_json::json!({
        "events": events,
        "adaptation": UiAdaptation::for_reading(reading),
    })
}

fn enabled_label(enabled: bool) -> &'static str {
    if enabled {
        "enabled"
    } else {
        "disabled"
    }
}

fn style_label(style: ResponseStyle) -> &'static str {
    match style {
        ResponseStyle::Gentle => "gentle",
        ResponseStyle::Direct => "direct",
    }
}

/// Set up Ctrl+C handler.
fn ctrlc_handler(running: Arc<AtomicBool>) {
    if let Err(e) = ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    }) {
        eprintln!("Warning: Could not set Ctrl+C handler: {e}");
    }
}
