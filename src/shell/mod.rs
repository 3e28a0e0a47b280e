//! Interactive conversion form.
//!
//! [`ShellForm`] holds everything the `pdf2pptx-shell` binary shows: the four
//! fields, the focused control, the state of the current job, a progress
//! counter and a timestamped log. The binary only renders it and maps keys
//! onto its methods, so the whole state machine is testable without a
//! terminal.
//!
//! ```text
//! Idle ──start──▶ Validating ──ok──▶ Converting ──▶ Completed | Cancelled | Failed
//!  ▲                  │                                        │
//!  └──── invalid ─────┘◀──────────── next start or edit ───────┘
//! ```

pub mod browser;

use crate::config::{ConversionConfig, DEFAULT_DPI, DEFAULT_SLIDE_WIDTH_IN, DPI_RANGE, WIDTH_RANGE};
use crate::error::Pdf2PptxError;
use crate::job::{ConversionJob, JobEvent, JobOutcome};
use crate::pipeline::input;
use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Step between resolution presets.
pub const DPI_STEP: u32 = 50;

/// Step between canvas widths, in inches.
pub const WIDTH_STEP: f64 = 0.5;

/// Lines kept in the log pane.
const LOG_CAPACITY: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellState {
    Idle,
    Validating,
    Converting,
    Completed,
    Cancelled,
    Failed,
}

impl ShellState {
    pub fn label(&self) -> &'static str {
        match self {
            ShellState::Idle => "Ready",
            ShellState::Validating => "Validating",
            ShellState::Converting => "Converting",
            ShellState::Completed => "Completed",
            ShellState::Cancelled => "Cancelled",
            ShellState::Failed => "Failed",
        }
    }
}

/// Focusable controls, in tab order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Input,
    Output,
    Dpi,
    Width,
    Start,
}

impl Field {
    const ORDER: [Field; 5] = [
        Field::Input,
        Field::Output,
        Field::Dpi,
        Field::Width,
        Field::Start,
    ];

    fn position(self) -> usize {
        Self::ORDER.iter().position(|f| *f == self).unwrap_or(0)
    }
}

#[derive(Debug, Clone)]
pub struct LogLine {
    pub at: DateTime<Local>,
    pub text: String,
}

impl LogLine {
    /// `[HH:MM:SS] text`
    pub fn render(&self) -> String {
        format!("[{}] {}", self.at.format("%H:%M:%S"), self.text)
    }
}

/// Starts conversion jobs for the form.
pub trait JobLauncher {
    fn launch(
        &mut self,
        input: &Path,
        output: &Path,
        config: ConversionConfig,
    ) -> Result<ConversionJob, Pdf2PptxError>;
}

/// Launches real PDFium-backed conversions.
#[derive(Debug, Default)]
pub struct PdfiumLauncher;

impl JobLauncher for PdfiumLauncher {
    fn launch(
        &mut self,
        input: &Path,
        output: &Path,
        config: ConversionConfig,
    ) -> Result<ConversionJob, Pdf2PptxError> {
        ConversionJob::spawn(input.to_path_buf(), output.to_path_buf(), config)
    }
}

/// The form and its single optional job.
pub struct ShellForm<L: JobLauncher> {
    pub input: String,
    pub output: String,
    pub dpi: u32,
    pub width_in: f64,
    focus: Field,
    state: ShellState,
    status: String,
    progress: (usize, usize),
    log: Vec<LogLine>,
    job: Option<ConversionJob>,
    launcher: L,
}

impl<L: JobLauncher> ShellForm<L> {
    pub fn new(launcher: L) -> Self {
        Self {
            input: String::new(),
            output: String::new(),
            dpi: DEFAULT_DPI,
            width_in: DEFAULT_SLIDE_WIDTH_IN,
            focus: Field::Input,
            state: ShellState::Idle,
            status: "Choose a PDF and press Start".into(),
            progress: (0, 0),
            log: Vec::new(),
            job: None,
            launcher,
        }
    }

    pub fn state(&self) -> ShellState {
        self.state
    }

    pub fn focus(&self) -> Field {
        self.focus
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    /// `(pages done, total pages)` of the current or last job.
    pub fn progress(&self) -> (usize, usize) {
        self.progress
    }

    pub fn log(&self) -> &[LogLine] {
        &self.log
    }

    pub fn is_converting(&self) -> bool {
        self.state == ShellState::Converting
    }

    pub fn start_label(&self) -> &'static str {
        if self.is_converting() {
            "Cancel"
        } else {
            "Start"
        }
    }

    pub fn focus_next(&mut self) {
        let i = (self.focus.position() + 1) % Field::ORDER.len();
        self.focus = Field::ORDER[i];
    }

    pub fn focus_prev(&mut self) {
        let n = Field::ORDER.len();
        let i = (self.focus.position() + n - 1) % n;
        self.focus = Field::ORDER[i];
    }

    /// Type a character into the focused path field.
    pub fn insert_char(&mut self, c: char) {
        if !self.editable() {
            return;
        }
        match self.focus {
            Field::Input => self.input.push(c),
            Field::Output => self.output.push(c),
            _ => return,
        }
        self.settle();
    }

    pub fn backspace(&mut self) {
        if !self.editable() {
            return;
        }
        match self.focus {
            Field::Input => {
                self.input.pop();
            }
            Field::Output => {
                self.output.pop();
            }
            _ => return,
        }
        self.settle();
    }

    /// Step the focused numeric field by `steps` increments, staying in range.
    pub fn adjust(&mut self, steps: i32) {
        if !self.editable() {
            return;
        }
        match self.focus {
            Field::Dpi => {
                let next = self.dpi as i64 + steps as i64 * DPI_STEP as i64;
                self.dpi = next.clamp(*DPI_RANGE.start() as i64, *DPI_RANGE.end() as i64) as u32;
            }
            Field::Width => {
                let next = self.width_in + steps as f64 * WIDTH_STEP;
                self.width_in = next.clamp(*WIDTH_RANGE.start(), *WIDTH_RANGE.end());
            }
            _ => return,
        }
        self.settle();
    }

    /// Set the source path; fills in a default destination if none is set.
    pub fn set_input(&mut self, path: &Path) {
        if !self.editable() {
            return;
        }
        self.input = path.display().to_string();
        if self.output.trim().is_empty() {
            self.output = input::default_output_for(path).display().to_string();
        }
        self.settle();
    }

    /// Point the destination at `dir`, keeping the current file name.
    pub fn set_output_dir(&mut self, dir: &Path) {
        if !self.editable() {
            return;
        }
        let file_name = Path::new(self.output.trim())
            .file_name()
            .map(PathBuf::from)
            .or_else(|| {
                input::default_output_for(Path::new(self.input.trim()))
                    .file_name()
                    .map(PathBuf::from)
            })
            .unwrap_or_else(|| PathBuf::from("slides.pptx"));
        self.output = dir.join(file_name).display().to_string();
        self.settle();
    }

    /// The Start/Cancel action.
    ///
    /// While converting this requests cancellation of the running job.
    /// Otherwise the form is validated and, if valid, a job is launched.
    pub fn start_action(&mut self) {
        if self.is_converting() {
            self.request_cancel();
            return;
        }

        self.state = ShellState::Validating;
        let (input_path, output_path, config) = match self.validate() {
            Ok(v) => v,
            Err(e) => {
                self.state = ShellState::Idle;
                self.status = e.to_string();
                self.push_log(format!("Cannot start: {}", e));
                return;
            }
        };

        self.log.clear();
        self.progress = (0, 0);
        self.push_log(format!(
            "Converting {} → {} at {} DPI, {:.1} in wide",
            input_path.display(),
            output_path.display(),
            config.dpi,
            config.slide_width_in
        ));

        match self.launcher.launch(&input_path, &output_path, config) {
            Ok(job) => {
                info!("Started conversion of {}", input_path.display());
                self.job = Some(job);
                self.state = ShellState::Converting;
                self.status = "Converting…".into();
            }
            Err(e) => {
                self.state = ShellState::Idle;
                self.status = e.to_string();
                self.push_log(format!("Could not start conversion: {}", e));
            }
        }
    }

    /// Ask the running job to stop before its next page.
    pub fn request_cancel(&mut self) {
        if let Some(ref job) = self.job {
            if !job.is_cancel_requested() {
                job.cancel();
                self.status = "Cancelling after the current page…".into();
                self.push_log("Cancellation requested".to_string());
            }
        }
    }

    /// Apply every event the worker has sent since the last call.
    pub fn poll(&mut self) {
        let events = match self.job.as_mut() {
            Some(job) => job.drain(),
            None => return,
        };
        for event in events {
            self.apply(event);
        }
    }

    /// Cancel any running job and wait for it to stop. Used on quit.
    pub fn shutdown(&mut self) {
        if let Some(job) = self.job.take() {
            job.cancel();
            let outcome = job.wait();
            self.finish(outcome);
        }
    }

    fn apply(&mut self, event: JobEvent) {
        match event {
            JobEvent::Started {
                total_pages,
                canvas,
            } => {
                self.progress = (0, total_pages);
                self.push_log(format!(
                    "{} pages, slide size {:.2} in × {:.2} in",
                    total_pages, canvas.width_in, canvas.height_in
                ));
            }
            JobEvent::PageStarted { page, total } => {
                self.status = format!("Rendering page {}/{}", page, total);
            }
            JobEvent::PageDone {
                page,
                total,
                image_bytes,
            } => {
                self.progress = (page, total);
                self.push_log(format!(
                    "Page {}/{} added ({} KiB)",
                    page,
                    total,
                    image_bytes.div_ceil(1024)
                ));
            }
            JobEvent::Log(text) => self.push_log(text),
            JobEvent::Finished(outcome) => {
                self.job = None;
                self.finish(outcome);
            }
        }
    }

    fn finish(&mut self, outcome: JobOutcome) {
        match outcome {
            JobOutcome::Completed(stats) => {
                self.state = ShellState::Completed;
                self.status = format!(
                    "Done: {} slides written to {}",
                    stats.slides_written,
                    stats.output_path.display()
                );
                if !stats.distorted_pages.is_empty() {
                    self.push_log(format!(
                        "Stretched to page 1's aspect ratio: pages {:?}",
                        stats.distorted_pages
                    ));
                }
            }
            JobOutcome::Cancelled {
                processed_pages,
                total_pages,
            } => {
                self.state = ShellState::Cancelled;
                self.status = format!(
                    "Cancelled after {}/{} pages; nothing was saved",
                    processed_pages, total_pages
                );
            }
            JobOutcome::Failed { message, .. } => {
                warn!("Conversion failed: {}", message);
                self.state = ShellState::Failed;
                self.status = format!("Failed: {}", first_line(&message));
            }
        }
        let status = self.status.clone();
        self.push_log(status);
    }

    fn validate(&self) -> Result<(PathBuf, PathBuf, ConversionConfig), Pdf2PptxError> {
        let input_path = PathBuf::from(self.input.trim());
        if input_path.as_os_str().is_empty() {
            return Err(Pdf2PptxError::FileNotFound { path: input_path });
        }
        input::check_source(&input_path)?;

        let output_path = PathBuf::from(self.output.trim());
        input::check_destination(&output_path)?;

        let config = ConversionConfig {
            dpi: self.dpi,
            slide_width_in: self.width_in,
            ..ConversionConfig::default()
        };
        config.validate()?;
        Ok((input_path, output_path, config))
    }

    fn editable(&self) -> bool {
        !self.is_converting()
    }

    /// A finished job's state is shown until the form is touched again.
    fn settle(&mut self) {
        if matches!(
            self.state,
            ShellState::Completed | ShellState::Cancelled | ShellState::Failed
        ) {
            self.state = ShellState::Idle;
        }
    }

    fn push_log(&mut self, text: String) {
        if self.log.len() == LOG_CAPACITY {
            self.log.remove(0);
        }
        self.log.push(LogLine {
            at: Local::now(),
            text,
        });
    }
}

fn first_line(s: &str) -> &str {
    s.lines().next().unwrap_or(s)
}
