//! CLI binary for pdf2pptx.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `ConversionConfig` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use pdf2pptx::config::{DEFAULT_DPI, DEFAULT_SLIDE_WIDTH_IN, WIDTH_RANGE};
use pdf2pptx::pipeline::input::default_output_for;
use pdf2pptx::{
    convert, engine, inspect, CancellationToken, Canvas, ConversionConfig,
    ConversionOutcome, ConversionProgressCallback, ProgressCallback,
};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

/// Exit status for a run stopped with Ctrl-C.
const EXIT_CANCELLED: i32 = 130;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
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

/// Terminal progress callback: a live bar plus one log line per page.
struct CliProgressCallback {
    bar: ProgressBar,
    page_started: Mutex<Option<Instant>>,
}

impl CliProgressCallback {
    /// Spinner until `on_conversion_start` reports the page count.
    fn new_dynamic() -> Arc<Self> {
        let bar = ProgressBar::new(0);

        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Opening PDF…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            page_started: Mutex::new(None),
        })
    }

    fn activate_bar(&self, total: usize) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} slides  \
             ⏱ {elapsed_precise}  ETA {eta_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        self.bar.set_length(total as u64);
        self.bar.set_style(progress_style);
        self.bar.set_prefix("Converting");
        self.bar.reset_eta();
    }
}

impl ConversionProgressCallback for CliProgressCallback {
    fn on_conversion_start(&self, total_pages: usize, canvas: &Canvas) {
        self.activate_bar(total_pages);
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!(
                "Converting {total_pages} pages onto {:.2}in × {:.2}in slides…",
                canvas.width_in, canvas.height_in
            ))
        ));
    }

    fn on_page_start(&self, page_num: usize, _total: usize) {
        if let Ok(mut started) = self.page_started.lock() {
            *started = Some(Instant::now());
        }
        self.bar.set_message(format!("page {page_num}"));
    }

    fn on_page_complete(&self, page_num: usize, total: usize, image_bytes: u64) {
        let elapsed_ms = self
            .page_started
            .lock()
            .ok()
            .and_then(|mut s| s.take())
            .map(|t| t.elapsed().as_millis())
            .unwrap_or(0);

        self.bar.println(format!(
            "  {} Page {:>3}/{:<3}  {:<10}  {}",
            green("✓"),
            page_num,
            total,
            dim(&format!("{:>6} KiB", image_bytes.div_ceil(1024))),
            dim(&format!("{:.1}s", elapsed_ms as f64 / 1000.0)),
        ));
        self.bar.inc(1);
    }

    fn on_cancelled(&self, processed_pages: usize, total_pages: usize) {
        self.bar.finish_and_clear();
        eprintln!(
            "{} Cancelled after {}/{} pages, nothing written",
            yellow("⚠"),
            processed_pages,
            total_pages
        );
    }

    fn on_conversion_complete(&self, total_pages: usize, _output: &Path) {
        self.bar.finish_and_clear();
        eprintln!(
            "{} {} pages converted successfully",
            green("✔"),
            bold(&total_pages.to_string())
        );
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Convert next to the input (slides.pdf → slides.pptx)
  pdf2pptx slides.pdf

  # Choose the output file
  pdf2pptx handout.pdf -o deck.pptx

  # Sharper pages on a 16:9-width canvas
  pdf2pptx --dpi 450 --width 13.333 poster.pdf

  # Encrypted PDF
  pdf2pptx --password s3cret locked.pdf

  # Show page count and slide size without converting
  pdf2pptx --inspect-only report.pdf

  # Machine-readable summary
  pdf2pptx --json report.pdf > stats.json

ENVIRONMENT VARIABLES:
  PDF2PPTX_OUTPUT, PDF2PPTX_DPI, PDF2PPTX_WIDTH, PDF2PPTX_PASSWORD,
  PDF2PPTX_TEMP_DIR, PDF2PPTX_JSON, PDF2PPTX_NO_PROGRESS,
  PDF2PPTX_VERBOSE, PDF2PPTX_QUIET      Same as the matching flag
  PDFIUM_LIB_PATH                       PDFium library file or directory
  RUST_LOG                              Overrides the log filter

PDFIUM:
  The PDFium shared library is looked up in PDFIUM_LIB_PATH, next to the
  executable, in the working directory, in <cache dir>/pdf2pptx/, and
  finally on the system library path.
"#;

/// Convert a PDF into a slide deck, one full-page image per slide.
#[derive(Parser, Debug)]
#[command(
    name = "pdf2pptx",
    version,
    about = "Convert a PDF into a .pptx deck, one page image per slide",
    long_about = "Rasterise every page of a PDF and place each image full-bleed on its own slide. \
The slide width is configurable; the slide height follows the first page's aspect ratio.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Path to the PDF to convert.
    input: PathBuf,

    /// Output deck path. Default: the input path with a .pptx extension.
    #[arg(short, long, env = "PDF2PPTX_OUTPUT")]
    output: Option<PathBuf>,

    /// Rendering DPI (150–600).
    #[arg(long, env = "PDF2PPTX_DPI", default_value_t = DEFAULT_DPI,
          value_parser = clap::value_parser!(u32).range(150..=600))]
    dpi: u32,

    /// Slide width in inches (5.0–15.0).
    #[arg(long, env = "PDF2PPTX_WIDTH", default_value_t = DEFAULT_SLIDE_WIDTH_IN,
          value_parser = parse_width)]
    width: f64,

    /// PDF user password for encrypted documents.
    #[arg(long, env = "PDF2PPTX_PASSWORD")]
    password: Option<String>,

    /// Directory for temporary page images. Default: the output directory.
    #[arg(long, env = "PDF2PPTX_TEMP_DIR")]
    temp_dir: Option<PathBuf>,

    /// Print page count and slide size only, no conversion.
    #[arg(long)]
    inspect_only: bool,

    /// Print the result as JSON on stdout.
    #[arg(long, env = "PDF2PPTX_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "PDF2PPTX_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDF2PPTX_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "PDF2PPTX_QUIET")]
    quiet: bool,
}

fn parse_width(s: &str) -> std::result::Result<f64, String> {
    let w: f64 = s
        .trim()
        .parse()
        .map_err(|_| format!("'{s}' is not a number"))?;
    if WIDTH_RANGE.contains(&w) {
        Ok(w)
    } else {
        Err(format!(
            "{w} is not in {}..={}",
            WIDTH_RANGE.start(),
            WIDTH_RANGE.end()
        ))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar replaces INFO-level library logs.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json && !cli.inspect_only;
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

    // ── Ensure PDFium engine is available ───────────────────────────────────
    tokio::task::block_in_place(engine::bind_pdfium).context("PDF engine unavailable")?;

    // ── Inspect-only mode ────────────────────────────────────────────────
    if cli.inspect_only {
        let config = build_config(&cli, None)?;
        let input = cli.input.clone();
        let info = tokio::task::spawn_blocking(move || inspect(&input, &config))
            .await
            .context("Inspect task panicked")?
            .context("Failed to inspect PDF")?;

        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&info).context("Failed to serialize document info")?
            );
        } else {
            println!("File:         {}", info.path.display());
            if let Some(ref t) = info.title {
                println!("Title:        {}", t);
            }
            println!("Pages:        {}", info.page_count);
            println!(
                "Page 1:       {:.1} × {:.1} pt",
                info.first_page.width, info.first_page.height
            );
            println!(
                "Slide size:   {:.3} × {:.3} in  ({} × {} EMU)",
                info.canvas.width_in,
                info.canvas.height_in,
                info.canvas.width_emu(),
                info.canvas.height_emu()
            );
        }
        return Ok(());
    }

    // ── Build config ─────────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress {
        let cb = CliProgressCallback::new_dynamic();
        Some(cb as Arc<dyn ConversionProgressCallback>)
    } else {
        None
    };
    let config = build_config(&cli, progress_cb)?;
    let output_path = cli
        .output
        .clone()
        .unwrap_or_else(|| default_output_for(&cli.input));

    // ── Ctrl-C requests cancellation at the next page boundary ───────────
    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        });
    }

    // ── Run conversion ───────────────────────────────────────────────────
    let outcome = convert(&cli.input, &output_path, &config, &cancel)
        .await
        .context("Conversion failed")?;

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&outcome).context("Failed to serialise result")?
        );
    }

    match outcome {
        ConversionOutcome::Completed(stats) => {
            if !cli.quiet && !cli.json {
                eprintln!(
                    "{}  {} slides  {}ms  →  {}",
                    green("✔"),
                    stats.slides_written,
                    stats.total_duration_ms,
                    bold(&output_path.display().to_string()),
                );
                eprintln!(
                    "   {} × {} in  /  {} DPI  /  {}",
                    dim(&format!("{:.2}", stats.canvas.width_in)),
                    dim(&format!("{:.2}", stats.canvas.height_in)),
                    stats.dpi,
                    dim(&format!("{} KiB", stats.deck_bytes.div_ceil(1024))),
                );
                if !stats.distorted_pages.is_empty() {
                    eprintln!(
                        "{} Pages stretched to page 1's aspect ratio: {:?}",
                        yellow("⚠"),
                        stats.distorted_pages
                    );
                }
            }
            Ok(())
        }
        ConversionOutcome::Cancelled {
            processed_pages,
            total_pages,
        } => {
            if !cli.quiet && !show_progress && !cli.json {
                eprintln!(
                    "Cancelled after {}/{} pages; {} was not written",
                    processed_pages,
                    total_pages,
                    output_path.display()
                );
            }
            std::process::exit(EXIT_CANCELLED);
        }
    }
}

/// Map CLI args to `ConversionConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ConversionConfig> {
    let mut builder = ConversionConfig::builder()
        .dpi(cli.dpi)
        .slide_width_in(cli.width);

    if let Some(ref pwd) = cli.password {
        builder = builder.password(pwd.clone());
    }
    if let Some(ref dir) = cli.temp_dir {
        builder = builder.temp_dir(dir.clone());
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn width_parser_enforces_range() {
        assert_eq!(parse_width("13.333").unwrap(), 13.333);
        assert!(parse_width("4.9").is_err());
        assert!(parse_width("wide").is_err());
    }

    #[test]
    fn cli_defaults() {
        let cli = Cli::try_parse_from(["pdf2pptx", "in.pdf"]).unwrap();
        assert_eq!(cli.dpi, 300);
        assert_eq!(cli.width, 10.0);
        assert!(cli.output.is_none());

        let config = build_config(&cli, None).unwrap();
        assert_eq!(config.dpi, 300);
    }

    #[test]
    fn dpi_out_of_range_is_rejected() {
        assert!(Cli::try_parse_from(["pdf2pptx", "--dpi", "100", "in.pdf"]).is_err());
    }
}
