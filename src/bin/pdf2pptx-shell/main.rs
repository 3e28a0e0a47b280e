//! Interactive terminal front end for pdf2pptx.
//!
//! A small form (input PDF, output deck, resolution, slide width) with
//! directory pickers, a progress line and a timestamped log. Conversions run
//! on a worker thread; the Start button turns into Cancel while one runs.

mod ui;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use pdf2pptx::config::{DEFAULT_DPI, DEFAULT_SLIDE_WIDTH_IN, DPI_RANGE, WIDTH_RANGE};
use pdf2pptx::shell::browser::{Activation, DirBrowser, PickMode};
use pdf2pptx::shell::{Field, PdfiumLauncher, ShellForm};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Names a file that receives tracing output; unset means no logging.
const LOG_ENV: &str = "PDF2PPTX_LOG";

#[derive(Parser, Debug)]
#[command(
    name = "pdf2pptx-shell",
    version,
    about = "Interactive PDF to .pptx converter"
)]
struct Args {
    /// PDF to pre-fill in the form.
    input: Option<PathBuf>,

    /// Output deck to pre-fill.
    #[arg(short, long, env = "PDF2PPTX_OUTPUT")]
    output: Option<PathBuf>,

    /// Initial resolution.
    #[arg(long, env = "PDF2PPTX_DPI", default_value_t = DEFAULT_DPI)]
    dpi: u32,

    /// Initial slide width in inches.
    #[arg(long, env = "PDF2PPTX_WIDTH", default_value_t = DEFAULT_SLIDE_WIDTH_IN)]
    width: f64,
}

/// An open path picker and the field it fills.
pub(crate) struct Picker {
    pub browser: DirBrowser,
    pub target: Field,
    pub error: Option<String>,
}

pub(crate) struct App {
    pub form: ShellForm<PdfiumLauncher>,
    pub picker: Option<Picker>,
    pub quit: bool,
}

impl App {
    fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.quit = true;
            return;
        }
        if self.picker.is_some() {
            self.handle_picker_key(key);
        } else {
            self.handle_form_key(key);
        }
    }

    fn handle_form_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.quit = true,
            KeyCode::Up | KeyCode::BackTab => self.form.focus_prev(),
            KeyCode::Down | KeyCode::Tab => self.form.focus_next(),
            KeyCode::Left => self.form.adjust(-1),
            KeyCode::Right => self.form.adjust(1),
            KeyCode::Enter if self.form.focus() == Field::Start => self.form.start_action(),
            KeyCode::Enter => self.form.focus_next(),
            KeyCode::F(2) => self.open_picker(),
            KeyCode::Backspace => self.form.backspace(),
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.form.insert_char(c)
            }
            _ => {}
        }
    }

    fn open_picker(&mut self) {
        if self.form.is_converting() {
            return;
        }
        let (mode, current) = match self.form.focus() {
            Field::Input => (PickMode::PdfFile, self.form.input.clone()),
            Field::Output => (PickMode::Directory, self.form.output.clone()),
            _ => return,
        };
        match DirBrowser::open_near(Path::new(current.trim()), mode) {
            Ok(browser) => {
                self.picker = Some(Picker {
                    browser,
                    target: self.form.focus(),
                    error: None,
                });
            }
            Err(e) => tracing::warn!("Cannot open picker: {}", e),
        }
    }

    fn handle_picker_key(&mut self, key: KeyEvent) {
        let Some(picker) = self.picker.as_mut() else {
            return;
        };
        let result = match key.code {
            KeyCode::Esc => {
                self.picker = None;
                return;
            }
            KeyCode::Up => {
                picker.browser.move_up();
                Ok(None)
            }
            KeyCode::Down => {
                picker.browser.move_down();
                Ok(None)
            }
            KeyCode::Backspace | KeyCode::Left => picker.browser.go_up().map(|_| None),
            KeyCode::Enter | KeyCode::Right => picker.browser.activate().map(|a| match a {
                Activation::Picked(path) => Some(path),
                Activation::Navigated | Activation::Nothing => None,
            }),
            KeyCode::Char('s') | KeyCode::Tab if picker.browser.mode() == PickMode::Directory => {
                Ok(Some(picker.browser.cwd().to_path_buf()))
            }
            _ => Ok(None),
        };

        match result {
            Ok(Some(path)) => {
                match picker.target {
                    Field::Input => self.form.set_input(&path),
                    _ => self.form.set_output_dir(&path),
                }
                self.picker = None;
            }
            Ok(None) => picker.error = None,
            Err(e) => picker.error = Some(e.to_string()),
        }
    }
}

/// Restores the terminal even if the loop bails out with an error.
struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> Result<Self> {
        terminal::enable_raw_mode().context("Failed to enable raw mode")?;
        execute!(io::stdout(), EnterAlternateScreen, cursor::Hide)
            .context("Failed to enter alternate screen")?;
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = execute!(io::stdout(), cursor::Show, LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}

fn init_logging() -> Result<()> {
    let Some(path) = std::env::var_os(LOG_ENV) else {
        return Ok(());
    };
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open log file {:?}", path))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging()?;

    let mut form = ShellForm::new(PdfiumLauncher);
    form.dpi = args.dpi.clamp(*DPI_RANGE.start(), *DPI_RANGE.end());
    form.width_in = args.width.clamp(*WIDTH_RANGE.start(), *WIDTH_RANGE.end());
    if let Some(ref input) = args.input {
        form.set_input(input);
    }
    if let Some(ref output) = args.output {
        form.output = output.display().to_string();
    }

    let mut app = App {
        form,
        picker: None,
        quit: false,
    };

    let guard = TerminalGuard::enter()?;
    let result = run(&mut app);
    app.form.shutdown();
    drop(guard);
    result
}

fn run(app: &mut App) -> Result<()> {
    let mut stdout = io::stdout();
    while !app.quit {
        ui::draw(&mut stdout, app).context("Failed to draw")?;
        stdout.flush()?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                app.handle_key(key);
            }
        }
        app.form.poll();
    }
    Ok(())
}
