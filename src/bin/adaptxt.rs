//! CLI binary for adaptxt.
//!
//! A thin shim over the library crate: maps flags to `PipelineConfig`,
//! prompts for whatever was not given on the command line and prints the
//! stages' results.

use adaptxt::cli::{init_tracing, EngineArgs};
use adaptxt::language::menu_lines;
use adaptxt::output::{NO_TEXT_EXTRACTED, TRANSLATION_ERROR};
use adaptxt::pipeline::input::{is_url, resolve_document};
use adaptxt::{
    DocumentFormat, Extraction, ExtractionUnit, Outcome, PipelineProgressCallback,
    ProgressCallback, Session, Stage, TargetLanguage,
};
use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, BufRead, Write};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

/// Shown when the translation backend returned only whitespace.
const NO_TRANSLATION: &str = "(the translation came back empty)";

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

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Spinner on stderr plus one log line per extraction unit.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}  {elapsed:.dim}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
        bar.set_style(style);
        bar.set_prefix("Preparing");
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar })
    }
}

impl PipelineProgressCallback for CliProgressCallback {
    fn on_stage_start(&self, stage: Stage) {
        self.bar.set_prefix(stage.to_string());
        self.bar.set_message("");
    }

    fn on_unit_complete(&self, unit: &ExtractionUnit, chars: usize) {
        self.bar.println(format!(
            "  {} {:<18} {}",
            green("✓"),
            unit.to_string(),
            dim(&format!("{chars:>6} chars"))
        ));
    }

    fn on_unit_error(&self, unit: &ExtractionUnit, error: &str) {
        // Truncate very long error messages to keep output tidy.
        let msg = if error.chars().count() > 80 {
            format!("{}\u{2026}", error.chars().take(79).collect::<String>())
        } else {
            error.to_string()
        };
        self.bar.println(format!("  {} {:<18} {}", red("✗"), unit.to_string(), red(&msg)));
    }

    fn on_stage_complete(&self, stage: Stage, status: &str) {
        self.bar.set_message(format!("{stage}: {status}"));
    }
}

/// Where prompts and results go: straight to stdout, or around the spinner.
struct Console {
    progress: Option<Arc<CliProgressCallback>>,
}

impl Console {
    fn print(&self, text: &str) {
        match self.progress {
            Some(ref p) => p.bar.suspend(|| println!("{text}")),
            None => println!("{text}"),
        }
    }

    fn section(&self, heading: &str, body: &str) {
        self.print(&format!("{}\n{}", bold(heading), body));
    }

    /// Print `question` and read one line from stdin.
    fn ask(&self, question: &str) -> Result<String> {
        let read = || -> Result<String> {
            print!("{question}");
            io::stdout().flush().context("Failed to flush stdout")?;
            let mut line = String::new();
            io::stdin()
                .lock()
                .read_line(&mut line)
                .context("Failed to read from stdin")?;
            Ok(line.trim().to_string())
        };
        match self.progress {
            Some(ref p) => p.bar.suspend(read),
            None => read(),
        }
    }

    fn finish(&self) {
        if let Some(ref p) = self.progress {
            p.bar.finish_and_clear();
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Prompt for the file and the target language
  adaptxt

  # Scanned letter to French, summary included
  adaptxt letter.pdf --target fr --summarize

  # Hindi + English OCR, all cores
  adaptxt scan.png --ocr-lang eng+hin --gpu --target en

  # Vision-model OCR and LLM translation
  adaptxt --ocr vision --translator llm --model gpt-4.1-mini photo.jpg --target es

  # Machine-readable output
  adaptxt report.pdf --target ta --json > report.json

TARGET LANGUAGES:
  1. Hindi (hi)   2. French (fr)   3. Spanish (es)
  4. Chinese (zh-CN)   5. English (en)   6. Tamil (ta)
  Any other menu answer selects English.

ENVIRONMENT VARIABLES:
  OPENAI_API_KEY          OpenAI API key (LLM backends, speech)
  ANTHROPIC_API_KEY       Anthropic API key
  EDGEQUAKE_LLM_PROVIDER  Override provider (openai, anthropic, gemini, ollama)
  EDGEQUAKE_MODEL         Override model ID
  PDFIUM_LIB_PATH         Path to libpdfium
  RUST_LOG                Log filter, e.g. adaptxt=debug
"#;

/// Extract, detect, translate and summarize text from PDFs and images.
#[derive(Parser, Debug)]
#[command(
    name = "adaptxt",
    version,
    about = "Extract, detect, translate and summarize text from PDFs and images",
    long_about = "Read the text layer of a PDF and OCR its images (or OCR a JPG/PNG), detect the \
source language and translate the text into Hindi, French, Spanish, Chinese, English or Tamil.",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Local PDF/JPG/JPEG/PNG path or HTTP/HTTPS URL. Prompted for when absent.
    input: Option<String>,

    /// Target language code or name (hi, fr, es, zh-CN, en, ta). Prompted for when absent.
    #[arg(short, long, env = "ADAPTXT_TARGET")]
    target: Option<String>,

    /// Also print a translated summary.
    #[arg(short, long, env = "ADAPTXT_SUMMARIZE")]
    summarize: bool,

    #[command(flatten)]
    engine: EngineArgs,

    /// Output structured JSON instead of text. Target defaults to English.
    #[arg(long, env = "ADAPTXT_JSON")]
    json: bool,

    /// Disable the progress spinner.
    #[arg(long, env = "ADAPTXT_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "ADAPTXT_VERBOSE")]
    verbose: bool,

    /// Suppress all output except results and errors.
    #[arg(short, long, env = "ADAPTXT_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    init_tracing(cli.verbose, cli.quiet, show_progress);

    let target_flag = match cli.target {
        Some(ref t) => Some(
            TargetLanguage::parse(t)
                .with_context(|| format!("Unknown target language '{t}'"))?,
        ),
        None => None,
    };

    // ── Input, validated before any extraction ───────────────────────────
    let plain = Console { progress: None };
    let input = match cli.input {
        Some(ref i) => i.clone(),
        None => plain.ask("Enter the path of the PDF or image: ")?,
    };
    if !is_url(&input) && DocumentFormat::from_file_name(input.trim()).is_err() {
        println!("Invalid file format. Supported formats: PDF, JPG, JPEG, PNG.");
        return Ok(ExitCode::from(2));
    }

    let progress = show_progress.then(CliProgressCallback::new);
    let mut builder = cli.engine.builder().include_summary(cli.summarize);
    if let Some(ref p) = progress {
        builder = builder.progress_callback(Arc::clone(p) as ProgressCallback);
    }
    let config = builder.build().context("Invalid configuration")?;
    let console = Console { progress };

    let document = resolve_document(&input, config.download_timeout_secs)
        .await
        .context("Failed to load input")?;
    let session = Session::open(&config).await.context("Failed to start session")?;

    // ── JSON mode: one structured document on stdout ─────────────────────
    if cli.json {
        let target = target_flag.unwrap_or_default();
        let output = session
            .run(&document, &target, cli.summarize)
            .await
            .context("Processing failed")?;
        let json = serde_json::to_string_pretty(&output).context("Failed to serialise output")?;
        println!("{json}");
        return Ok(if output.analysis.text.is_failed() {
            ExitCode::FAILURE
        } else {
            ExitCode::SUCCESS
        });
    }

    // ── Text mode ────────────────────────────────────────────────────────
    let analysis = session.analyze(&document).await.context("Extraction failed")?;
    let extraction = &analysis.extraction;

    if document.format == DocumentFormat::Pdf {
        console.section("Recognized Text from PDF:", &extraction.text_layer);
        console.section("Combined Text from PDF and Images:", &extraction.combined());
    } else {
        console.section("Recognized Text from Image:", &extraction.combined());
    }

    let text = match analysis.text {
        Outcome::Success(ref t) => t.clone(),
        Outcome::Empty => {
            console.print(NO_TEXT_EXTRACTED);
            console.finish();
            report_failed_units(extraction, cli.quiet);
            return Ok(ExitCode::SUCCESS);
        }
        Outcome::Failed(ref e) => {
            console.finish();
            report_failed_units(extraction, cli.quiet);
            eprintln!("{} Text extraction failed: {}", red("✘"), e);
            println!("{NO_TEXT_EXTRACTED}");
            return Ok(ExitCode::FAILURE);
        }
    };

    console.print(&format!(
        "{} {}",
        bold("Original Language:"),
        analysis.language.language_or_unknown()
    ));

    let target = match target_flag {
        Some(t) => t,
        None => {
            console.print("Select a target language for translation:");
            for line in menu_lines() {
                console.print(&line);
            }
            TargetLanguage::from_menu_choice(&console.ask("Enter the number of your choice: ")?)
        }
    };

    let translation = session.translate(&analysis, &target).await;
    console.section(
        "Translated Text from PDF and Images:",
        translation_display(&translation),
    );

    if cli.summarize {
        let summary = session.summarize(&text, &target).await;
        match summary.translated {
            Some(ref s) => console.section(&format!("Summary ({}):", target.name), s),
            None => console.print("Summary translation not available."),
        }
    }

    console.finish();
    report_failed_units(extraction, cli.quiet);

    Ok(ExitCode::SUCCESS)
}

fn report_failed_units(extraction: &Extraction, quiet: bool) {
    let failed = extraction.failed_units();
    if !quiet && failed > 0 {
        eprintln!(
            "{} {}/{} extraction units failed",
            red("⚠"),
            failed,
            extraction.units.len()
        );
    }
}

/// Translated text, the failure sentinel, or a note that the backend
/// returned nothing.
fn translation_display(translation: &Outcome<String>) -> &str {
    match translation {
        Outcome::Success(t) => t,
        Outcome::Empty => NO_TRANSLATION,
        Outcome::Failed(_) => TRANSLATION_ERROR,
    }
}
