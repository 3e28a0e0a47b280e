//! Rendering for the shell. Redraws the whole screen every frame.

use crate::{App, Picker};
use crossterm::{
    cursor::MoveTo,
    queue,
    style::{Attribute, Color, Print, ResetColor, SetAttribute, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};
use pdf2pptx::shell::browser::PickMode;
use pdf2pptx::shell::{Field, ShellState};
use std::io::{self, Write};

const ACCENT: Color = Color::Rgb {
    r: 129,
    g: 162,
    b: 190,
};
const DIM: Color = Color::Rgb {
    r: 96,
    g: 99,
    b: 102,
};
const TEXT: Color = Color::Rgb {
    r: 197,
    g: 200,
    b: 198,
};
const OK: Color = Color::Rgb {
    r: 181,
    g: 189,
    b: 104,
};
const BAD: Color = Color::Rgb {
    r: 204,
    g: 102,
    b: 102,
};

pub(crate) fn draw<W: Write>(out: &mut W, app: &App) -> io::Result<()> {
    let (cols, rows) = terminal::size().unwrap_or((80, 24));
    let width = cols as usize;
    queue!(out, Clear(ClearType::All), MoveTo(0, 0))?;

    queue!(
        out,
        SetForegroundColor(ACCENT),
        SetAttribute(Attribute::Bold),
        Print("  PDF2PPTX"),
        SetAttribute(Attribute::Reset),
        SetForegroundColor(DIM),
        Print("  one slide per page"),
        ResetColor,
    )?;

    match app.picker {
        Some(ref picker) => draw_picker(out, picker, width, rows)?,
        None => draw_form(out, app, width, rows)?,
    }

    Ok(())
}

fn draw_form<W: Write>(out: &mut W, app: &App, width: usize, rows: u16) -> io::Result<()> {
    let form = &app.form;
    let focus = form.focus();
    let field_width = width.saturating_sub(20).max(10);

    let text_field = |value: &str| format!("[ {} ]", clip_left(value, field_width));
    let lines = [
        (Field::Input, "Input PDF", text_field(&form.input)),
        (Field::Output, "Output deck", text_field(&form.output)),
        (Field::Dpi, "Resolution", format!("◀ {} DPI ▶", form.dpi)),
        (Field::Width, "Slide width", format!("◀ {:.1} in ▶", form.width_in)),
    ];

    for (i, (field, label, value)) in lines.iter().enumerate() {
        let row = 2 + i as u16;
        let focused = *field == focus;
        queue!(
            out,
            MoveTo(0, row),
            SetForegroundColor(if focused { OK } else { DIM }),
            Print(if focused { "  ▶ " } else { "    " }),
            SetForegroundColor(TEXT),
            Print(format!("{:<13}", label)),
            SetForegroundColor(if focused { TEXT } else { DIM }),
            Print(value),
            ResetColor,
        )?;
    }

    let start_focused = focus == Field::Start;
    queue!(
        out,
        MoveTo(0, 7),
        SetForegroundColor(if start_focused { OK } else { DIM }),
        Print(if start_focused { "  ▶ " } else { "    " }),
        SetAttribute(if start_focused {
            Attribute::Reverse
        } else {
            Attribute::NoReverse
        }),
        Print(format!(" {} ", form.start_label())),
        SetAttribute(Attribute::Reset),
        ResetColor,
    )?;

    let state_color = match form.state() {
        ShellState::Completed => OK,
        ShellState::Failed => BAD,
        ShellState::Cancelled => ACCENT,
        _ => TEXT,
    };
    let (done, total) = form.progress();
    queue!(
        out,
        MoveTo(0, 9),
        SetForegroundColor(state_color),
        Print(format!("  {:<11}", form.state().label())),
        SetForegroundColor(TEXT),
        Print(clip_right(form.status(), width.saturating_sub(14))),
        ResetColor,
    )?;
    if total > 0 {
        queue!(
            out,
            MoveTo(0, 10),
            SetForegroundColor(OK),
            Print(format!("  {} {}/{}", bar(done, total, 30), done, total)),
            ResetColor,
        )?;
    }

    queue!(
        out,
        MoveTo(0, 12),
        SetForegroundColor(DIM),
        Print("  ── Log ──"),
        ResetColor
    )?;
    let log_top = 13u16;
    let log_rows = rows.saturating_sub(log_top + 2) as usize;
    let log = form.log();
    let skip = log.len().saturating_sub(log_rows);
    for (i, line) in log.iter().skip(skip).enumerate() {
        queue!(
            out,
            MoveTo(0, log_top + i as u16),
            SetForegroundColor(DIM),
            Print(format!("  {}", clip_right(&line.render(), width.saturating_sub(3)))),
            ResetColor,
        )?;
    }

    help_line(
        out,
        rows,
        "↑/↓ Move  •  ←/→ Adjust  •  F2 Browse  •  Enter Start/Cancel  •  Esc Quit",
    )
}

fn draw_picker<W: Write>(out: &mut W, picker: &Picker, width: usize, rows: u16) -> io::Result<()> {
    let browser = &picker.browser;
    let title = match browser.mode() {
        PickMode::PdfFile => "Choose a PDF",
        PickMode::Directory => "Choose the output folder",
    };
    queue!(
        out,
        MoveTo(0, 2),
        SetForegroundColor(ACCENT),
        Print(format!("  {}", title)),
        MoveTo(0, 3),
        SetForegroundColor(DIM),
        Print(format!(
            "  {}",
            clip_left(&browser.cwd().display().to_string(), width.saturating_sub(3))
        )),
        ResetColor,
    )?;

    let list_top = 5u16;
    let list_rows = rows.saturating_sub(list_top + 3).max(1) as usize;
    let entries = browser.entries();
    // Keep the cursor on screen.
    let first = browser.selected().saturating_sub(list_rows - 1);

    for (i, entry) in entries.iter().enumerate().skip(first).take(list_rows) {
        let row = list_top + (i - first) as u16;
        let selected = i == browser.selected();
        let name = if entry.is_dir {
            format!("{}/", entry.name)
        } else {
            entry.name.clone()
        };
        queue!(
            out,
            MoveTo(0, row),
            SetForegroundColor(if selected { OK } else { DIM }),
            Print(if selected { "  ▶ " } else { "    " }),
            SetForegroundColor(if entry.is_dir { ACCENT } else { TEXT }),
            Print(clip_right(&name, width.saturating_sub(5))),
            ResetColor,
        )?;
    }

    if let Some(ref error) = picker.error {
        queue!(
            out,
            MoveTo(0, rows.saturating_sub(2)),
            SetForegroundColor(BAD),
            Print(format!("  {}", clip_right(error, width.saturating_sub(3)))),
            ResetColor,
        )?;
    }

    let help = match browser.mode() {
        PickMode::PdfFile => "↑/↓ Navigate  •  Enter Open/Select  •  ← Up  •  Esc Back",
        PickMode::Directory => "↑/↓ Navigate  •  Enter Open  •  s Use this folder  •  ← Up  •  Esc Back",
    };
    help_line(out, rows, help)
}

fn help_line<W: Write>(out: &mut W, rows: u16, text: &str) -> io::Result<()> {
    queue!(
        out,
        MoveTo(0, rows.saturating_sub(1)),
        SetForegroundColor(DIM),
        Print(format!("  {}", text)),
        ResetColor,
    )
}

fn bar(done: usize, total: usize, cells: usize) -> String {
    let filled = if total == 0 { 0 } else { done * cells / total };
    format!("{}{}", "█".repeat(filled), "░".repeat(cells - filled.min(cells)))
}

/// Keep the tail of `s`, prefixed with `…`, so the file name stays visible.
fn clip_left(s: &str, max: usize) -> String {
    let n = s.chars().count();
    if n <= max || max == 0 {
        return s.to_string();
    }
    let tail: String = s.chars().skip(n - max + 1).collect();
    format!("…{}", tail)
}

fn clip_right(s: &str, max: usize) -> String {
    if s.chars().count() <= max || max == 0 {
        return s.to_string();
    }
    let head: String = s.chars().take(max.saturating_sub(1)).collect();
    format!("{}…", head)
}
