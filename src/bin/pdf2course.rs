//! CLI binary for pdf2course.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `IngestConfig` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use pdf2course::pipeline::generator::API_KEY_ENV;
use pdf2course::{ingest, IngestConfig, IngestProgressCallback, ProgressCallback};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: a live progress bar plus one log line per
/// file. The pipeline is sequential, so a single slot suffices for the
/// per-file start time.
struct CliProgressCallback {
    bar: ProgressBar,
    started: Mutex<Option<Instant>>,
}

impl CliProgressCallback {
    /// Create a callback whose progress-bar length is set by
    /// `on_run_start` once the walk has counted the input files.
    fn new_dynamic() -> Arc<Self> {
        let bar = ProgressBar::new(0);

        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Scanning input directory…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            started: Mutex::new(None),
        })
    }

    fn elapsed_secs(&self) -> f64 {
        self.started
            .lock()
            .unwrap()
            .take()
            .map(|t| t.elapsed().as_millis() as f64 / 1000.0)
            .unwrap_or(0.0)
    }
}

impl IngestProgressCallback for CliProgressCallback {
    fn on_run_start(&self, total_files: usize) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} files  ⏱ {elapsed_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ");

        self.bar.set_length(total_files as u64);
        self.bar.set_style(progress_style);
        self.bar.set_prefix("Ingesting");
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Found {total_files} PDF files"))
        ));
    }

    fn on_file_skipped(&self, page_id: &str, _total: usize) {
        self.bar
            .println(format!("  {} {}  {}", dim("·"), page_id, dim("already processed")));
        self.bar.inc(1);
    }

    fn on_file_start(&self, page_id: &str, _total: usize) {
        *self.started.lock().unwrap() = Some(Instant::now());
        self.bar.set_message(page_id.to_string());
    }

    fn on_file_complete(&self, page_id: &str, _total: usize, quiz_count: usize) {
        let secs = self.elapsed_secs();
        self.bar.println(format!(
            "  {} {}  {}  {}",
            green("✓"),
            page_id,
            dim(&format!("{quiz_count} quiz items")),
            dim(&format!("{secs:.1}s")),
        ));
        self.bar.inc(1);
    }

    fn on_file_error(&self, path: &Path, _total: usize, error: &str) {
        let secs = self.elapsed_secs();

        // Truncate very long error messages to keep output tidy.
        let msg = if error.len() > 80 {
            format!("{}\u{2026}", &error[..79])
        } else {
            error.to_string()
        };

        self.bar.println(format!(
            "  {} {}  {}  {}",
            red("✗"),
            path.display(),
            red(&msg),
            dim(&format!("{secs:.1}s")),
        ));
        self.bar.inc(1);
    }

    fn on_run_complete(&self, processed: usize, skipped: usize, failed: usize) {
        self.bar.finish_and_clear();

        if failed == 0 {
            eprintln!(
                "{} {} files processed  ({} skipped)",
                green("✔"),
                bold(&processed.to_string()),
                skipped,
            );
        } else {
            eprintln!(
                "{} {} processed, {} skipped, {} — failed files are retried on the next run",
                cyan("⚠"),
                bold(&processed.to_string()),
                skipped,
                red(&format!("{failed} failed")),
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Incremental run over ./input_pdfs, writing ./data.json
  pdf2course

  # Custom locations
  pdf2course slides/ -o course.json

  # Force full reprocessing (discards the existing corpus)
  pdf2course --reprocess

  # Use a specific model
  pdf2course --model gemini-2.5-pro

  # A different provider (reads its own API key variable)
  pdf2course --provider openai --model gpt-4.1-mini

INPUT LAYOUT:
  input_pdfs/
    Module_1/
      lecture_01.pdf
      lecture_02.pdf
    Module_2/
      intro.pdf

  Modules and files are processed in name order. Each file becomes one page
  with id <module>_<file stem>; pages already in the output file are skipped,
  so interrupted runs resume where they left off.

ENVIRONMENT VARIABLES:
  GEMINI_API_KEY            API key for the default gemini provider
  PDF2COURSE_INPUT_DIR      Override the input directory
  PDF2COURSE_OUTPUT         Override the output file
  PDF2COURSE_MODEL          Override the model ID

SETUP:
  1. Set API key:  export GEMINI_API_KEY=...
  2. Ingest:       pdf2course
"#;

/// Convert PDF lecture slides into a structured course JSON with explanations and quizzes.
#[derive(Parser, Debug)]
#[command(
    name = "pdf2course",
    version,
    about = "Convert PDF lecture slides into a structured course JSON with AI-generated explanations and quizzes",
    long_about = "Walk a two-level directory tree of PDF lecture slides (module directories \
containing PDF files), elaborate each deck's text into a textbook-style explanation, generate \
multiple-choice quizzes, and merge everything into one JSON corpus. Runs are incremental: \
already-processed files are skipped and the output is updated after every file.",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Root directory with one subdirectory per course module.
    #[arg(default_value = "input_pdfs", env = "PDF2COURSE_INPUT_DIR")]
    input_dir: PathBuf,

    /// Write the course corpus JSON to this file.
    #[arg(short, long, default_value = "data.json", env = "PDF2COURSE_OUTPUT")]
    output: PathBuf,

    /// Discard the existing corpus and reprocess every file.
    #[arg(short, long, env = "PDF2COURSE_REPROCESS")]
    reprocess: bool,

    /// LLM model ID (e.g. gemini-2.5-flash, gemini-2.5-pro).
    #[arg(long, env = "PDF2COURSE_MODEL")]
    model: Option<String>,

    /// LLM provider: gemini, openai, anthropic, ollama.
    #[arg(
        long,
        env = "PDF2COURSE_PROVIDER",
        long_help = "LLM provider. Defaults to gemini when GEMINI_API_KEY is set, otherwise \
          auto-detected from the available API key env vars."
    )]
    provider: Option<String>,

    /// Max LLM output tokens per call.
    #[arg(long, env = "PDF2COURSE_MAX_TOKENS", default_value_t = 8192)]
    max_tokens: usize,

    /// LLM temperature (0.0–2.0).
    #[arg(long, env = "PDF2COURSE_TEMPERATURE", default_value_t = 0.7)]
    temperature: f32,

    /// Retries per generation call before the fallback policy applies.
    #[arg(long, env = "PDF2COURSE_MAX_RETRIES", default_value_t = 3)]
    max_retries: u32,

    /// Disable the progress bar.
    #[arg(long, env = "PDF2COURSE_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDF2COURSE_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "PDF2COURSE_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs when the progress bar is active;
    // the bar provides all the feedback that matters to the user.
    let show_progress = !cli.quiet && !cli.no_progress;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // Missing credential is a warning, not an abort: another provider's key
    // may still be picked up, and the run only stops if none resolves.
    if std::env::var(API_KEY_ENV).map_or(true, |v| v.is_empty()) && !cli.quiet {
        eprintln!(
            "Warning: {API_KEY_ENV} environment variable not set. \
             Falling back to other configured providers, if any."
        );
    }

    // ── Build config ─────────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new_dynamic() as Arc<dyn IngestProgressCallback>)
    } else {
        None
    };

    let mut builder = IngestConfig::builder()
        .input_dir(&cli.input_dir)
        .output_path(&cli.output)
        .reprocess(cli.reprocess)
        .max_tokens(cli.max_tokens)
        .temperature(cli.temperature)
        .max_retries(cli.max_retries);

    if let Some(ref model) = cli.model {
        builder = builder.model(model);
    }
    if let Some(ref provider) = cli.provider {
        builder = builder.provider_name(provider);
    }
    if let Some(cb) = progress_cb {
        builder = builder.progress_callback(cb);
    }

    let config = builder.build().context("Invalid configuration")?;

    // ── Run ingestion ────────────────────────────────────────────────────
    let output = ingest::run(&config).await.context("Ingestion failed")?;

    if !cli.quiet {
        let corpus = &output.corpus;
        eprintln!(
            "   {} modules, {} pages  →  {}",
            dim(&corpus.modules.len().to_string()),
            dim(&corpus.page_count().to_string()),
            bold(&cli.output.display().to_string()),
        );
        if !show_progress {
            eprintln!(
                "Processed {}/{} files in {}ms",
                output.stats.processed, output.stats.discovered, output.stats.total_duration_ms
            );
            if output.stats.failed > 0 {
                eprintln!("  {} files failed (retried next run)", output.stats.failed);
            }
        }
    }

    Ok(())
}
