//! Structured JSON-lines logging.
//!
//! Every record carries a run id, a sequence number, a level and a domain, so a
//! run can be filtered per subsystem and replayed in order. Records go to stdout
//! and to `<LOG_DIR>/<run_id>/{events,trace}.jsonl` (`LOG_DIR=none` keeps stdout only).

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::fs::{create_dir_all, File};
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::process;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, OnceLock};
use std::time::Instant;

// =============================================================================
// Log Levels
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Trace = 0,
    Debug = 1,
    Info = 2,
    Warn = 3,
    Error = 4,
    Fatal = 5,
}

const LEVEL_NAMES: [&str; 6] = ["trace", "debug", "info", "warn", "error", "fatal"];
const LEVELS: [Level; 6] = [Level::Trace, Level::Debug, Level::Info, Level::Warn, Level::Error, Level::Fatal];

impl Level {
    /// `LOG_LEVEL`, defaulting to info.
    pub fn from_env() -> Self {
        std::env::var("LOG_LEVEL")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(Level::Info)
    }

    pub fn as_str(&self) -> &'static str {
        LEVEL_NAMES[*self as usize]
    }
}

impl FromStr for Level {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        LEVEL_NAMES
            .iter()
            .position(|name| *name == lower)
            .map(|i| LEVELS[i])
            .ok_or_else(|| format!("unknown log level '{}'", s))
    }
}

// =============================================================================
// Log Domains
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    Registry,  // City reference data
    Generator, // Synthetic series
    Ranking,   // Rankings, comparisons, trends
    Fetch,     // Live attempts and fallbacks
    Cache,     // Category cache writes, staleness, refresh
    System,    // Startup, config, shutdown
    Profile,   // Timing scopes
}

impl Domain {
    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::Registry => "registry",
            Domain::Generator => "generator",
            Domain::Ranking => "ranking",
            Domain::Fetch => "fetch",
            Domain::Cache => "cache",
            Domain::System => "system",
            Domain::Profile => "profile",
        }
    }

    pub fn is_enabled(&self) -> bool {
        // LOG_DOMAINS: comma-separated list or "all"
        match std::env::var("LOG_DOMAINS").as_deref() {
            Ok("all") | Err(_) => true,
            Ok(domains) => domains.split(',').any(|d| d.trim() == self.as_str()),
        }
    }
}

// =============================================================================
// Run context
// =============================================================================

static LOG_SEQ: AtomicU64 = AtomicU64::new(0);
static RUN_CONTEXT: OnceLock<RunContext> = OnceLock::new();

fn next_seq() -> u64 {
    LOG_SEQ.fetch_add(1, Ordering::SeqCst)
}

#[derive(Debug)]
struct RunContext {
    run_id: String,
    events: Option<Mutex<BufWriter<File>>>,
    trace: Option<Mutex<BufWriter<File>>>,
}

fn open_sink(path: PathBuf) -> Option<Mutex<BufWriter<File>>> {
    match File::create(&path) {
        Ok(f) => Some(Mutex::new(BufWriter::new(f))),
        Err(err) => {
            eprintln!("[log] failed to create {}: {}", path.display(), err);
            None
        }
    }
}

fn ensure_run_context() -> &'static RunContext {
    RUN_CONTEXT.get_or_init(|| {
        let run_id = std::env::var("RUN_ID")
            .unwrap_or_else(|_| format!("r-{}-{}", ts_epoch_ms(), process::id()));
        let base = std::env::var("LOG_DIR").unwrap_or_else(|_| "out/runs".to_string());
        if base == "none" {
            return RunContext {
                run_id,
                events: None,
                trace: None,
            };
        }

        let mut run_dir = PathBuf::from(base);
        run_dir.push(&run_id);
        if let Err(err) = create_dir_all(&run_dir) {
            eprintln!("[log] failed to create run dir: {}", err);
        }
        let _ = std::fs::write(
            run_dir.join("manifest.json"),
            json!({
                "run_id": run_id,
                "ts": ts_now(),
                "pid": process::id(),
                "log_dir": run_dir.to_string_lossy(),
            })
            .to_string(),
        );

        RunContext {
            events: open_sink(run_dir.join("events.jsonl")),
            trace: open_sink(run_dir.join("trace.jsonl")),
            run_id,
        }
    })
}

pub fn run_id() -> String {
    ensure_run_context().run_id.clone()
}

fn sanitize_fields(mut fields: Map<String, Value>) -> Map<String, Value> {
    let redacted = Value::String("[REDACTED]".to_string());
    for key in ["authorization", "Authorization", "api_key", "api-key"] {
        if fields.contains_key(key) {
            fields.insert(key.to_string(), redacted.clone());
        }
    }
    fields
}

fn split_fields(mut fields: Map<String, Value>) -> (Map<String, Value>, Map<String, Value>) {
    let mut top = Map::new();
    for key in ["category", "metric", "city", "msg"] {
        if let Some(value) = fields.remove(key) {
            top.insert(key.to_string(), value);
        }
    }
    (top, fields)
}

fn write_line(writer: &Option<Mutex<BufWriter<File>>>, line: &str) {
    if let Some(Ok(mut w)) = writer.as_ref().map(|m| m.lock()) {
        let _ = writeln!(w, "{}", line);
    }
}

/// Flush file sinks; call before process exit.
pub fn flush() {
    let ctx = ensure_run_context();
    for sink in [&ctx.events, &ctx.trace].into_iter().flatten() {
        if let Ok(mut w) = sink.lock() {
            let _ = w.flush();
        }
    }
}

// =============================================================================
// Core logging functions
// =============================================================================

/// RFC3339 timestamp with milliseconds
pub fn ts_now() -> String {
    Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

/// Epoch milliseconds
pub fn ts_epoch_ms() -> u64 {
    Utc::now().timestamp_millis() as u64
}

/// Emit a structured log entry
pub fn log(level: Level, domain: Domain, event: &str, fields: Map<String, Value>) {
    let min_level = Level::from_env();
    if level < min_level || !domain.is_enabled() {
        return;
    }
    emit_record(level, domain.as_str(), event, fields);
}

fn emit_record(level: Level, component: &str, event: &str, fields: Map<String, Value>) {
    let ctx = ensure_run_context();
    let (mut top, data) = split_fields(sanitize_fields(fields));
    let msg = top.remove("msg").unwrap_or_else(|| json!(""));

    let mut entry = Map::new();
    for (k, v) in [
        ("ts", json!(ts_now())),
        ("run_id", json!(ctx.run_id)),
        ("seq", json!(next_seq())),
        ("lvl", json!(level.as_str().to_uppercase())),
        ("component", json!(component)),
        ("event", json!(event)),
        ("msg", msg),
    ] {
        entry.insert(k.to_string(), v);
    }
    entry.extend(top);
    entry.insert("data".to_string(), Value::Object(data));

    let line = Value::Object(entry).to_string();
    let sink = if level <= Level::Debug { &ctx.trace } else { &ctx.events };
    write_line(sink, &line);
    println!("{}", line);
}

// =============================================================================
// Domain-Specific Logging Helpers
// =============================================================================

pub fn log_series_generated(metric: &str, cities: usize, years: &[i32], fingerprint: &str) {
    log(
        Level::Debug,
        Domain::Generator,
        "series_generated",
        obj(&[
            ("metric", v_str(metric)),
            ("cities", json!(cities)),
            ("first_year", json!(years.first())),
            ("last_year", json!(years.last())),
            ("fingerprint", v_str(fingerprint)),
        ]),
    );
}

pub fn log_live_fetch(source: &str, elapsed_ms: f64) {
    log(
        Level::Info,
        Domain::Fetch,
        "live_fetch",
        obj(&[("source", v_str(source)), ("elapsed_ms", v_num(elapsed_ms))]),
    );
}

/// A live attempt failed or timed out and mock data was served instead.
pub fn log_fallback(source: &str, reason: &str, elapsed_ms: f64) {
    log(
        Level::Warn,
        Domain::Fetch,
        "fallback",
        obj(&[
            ("source", v_str(source)),
            ("reason", v_str(reason)),
            ("elapsed_ms", v_num(elapsed_ms)),
            ("msg", v_str("live fetch failed, serving mock data")),
        ]),
    );
}

pub fn log_cache_write(category: &str, generation: u64, quality: &str, records: usize) {
    log(
        Level::Debug,
        Domain::Cache,
        "cache_write",
        obj(&[
            ("category", v_str(category)),
            ("generation", json!(generation)),
            ("quality", v_str(quality)),
            ("records", json!(records)),
        ]),
    );
}

pub fn log_refresh_summary(categories: usize, live: usize, mock: usize, elapsed_ms: f64) {
    log(
        Level::Info,
        Domain::Cache,
        "refresh_all",
        obj(&[
            ("categories", json!(categories)),
            ("live", json!(live)),
            ("mock", json!(mock)),
            ("elapsed_ms", v_num(elapsed_ms)),
        ]),
    );
}

// =============================================================================
// Field helpers
// =============================================================================

pub fn obj(pairs: &[(&str, Value)]) -> Map<String, Value> {
    let mut map = Map::new();
    for (k, v) in pairs {
        map.insert((*k).to_string(), v.clone());
    }
    map
}

pub fn v_str(s: &str) -> Value {
    Value::String(s.to_string())
}

pub fn v_num(n: f64) -> Value {
    json!(n)
}

// =============================================================================
// Profiling Scope
// =============================================================================

/// Emits a trace record with elapsed time when dropped.
pub struct ProfileScope {
    module: &'static str,
    label: &'static str,
    started: Instant,
}

impl ProfileScope {
    pub fn new(module: &'static str, label: &'static str) -> Self {
        Self {
            module,
            label,
            started: Instant::now(),
        }
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.started.elapsed().as_secs_f64() * 1000.0
    }
}

impl Drop for ProfileScope {
    fn drop(&mut self) {
        log(
            Level::Trace,
            Domain::Profile,
            "profile",
            obj(&[
                ("module", v_str(self.module)),
                ("label", v_str(self.label)),
                ("elapsed_ms", v_num(self.elapsed_ms())),
            ]),
        );
    }
}

// =============================================================================
// Tests
// =============================================================================
