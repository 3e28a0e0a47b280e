//! Keyboard-driven directory browser used by the shell's path pickers.

use std::io;
use std::path::{Path, PathBuf};

/// What the browser lets the user pick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickMode {
    /// Directories are navigable; `.pdf` files are pickable.
    PdfFile,
    /// Only directories are listed; the current directory is pickable.
    Directory,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub name: String,
    pub path: PathBuf,
    pub is_dir: bool,
}

/// Result of activating the selected entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Activation {
    /// Moved into another directory.
    Navigated,
    /// A file was chosen.
    Picked(PathBuf),
    /// Nothing to activate.
    Nothing,
}

/// A directory listing with a cursor.
#[derive(Debug)]
pub struct DirBrowser {
    mode: PickMode,
    cwd: PathBuf,
    entries: Vec<Entry>,
    selected: usize,
}

impl DirBrowser {
    /// Open a browser on `dir`. Relative paths are resolved against the working directory.
    pub fn open(dir: &Path, mode: PickMode) -> io::Result<Self> {
        let cwd = std::path::absolute(dir)?;
        let mut browser = Self {
            mode,
            cwd,
            entries: Vec::new(),
            selected: 0,
        };
        browser.refresh()?;
        Ok(browser)
    }

    /// Open on the directory that contains `path` (or `path` itself if it is a
    /// directory), falling back to the working directory.
    pub fn open_near(path: &Path, mode: PickMode) -> io::Result<Self> {
        let start = if path.is_dir() {
            Some(path.to_path_buf())
        } else {
            path.parent()
                .filter(|p| !p.as_os_str().is_empty() && p.is_dir())
                .map(Path::to_path_buf)
        };
        match start {
            Some(dir) => Self::open(&dir, mode),
            None => Self::open(Path::new("."), mode),
        }
    }

    /// Re-read the current directory. The parent (`..`) comes first, then
    /// directories, then files, each sorted case-insensitively.
    pub fn refresh(&mut self) -> io::Result<()> {
        let mut dirs = Vec::new();
        let mut files = Vec::new();

        for dirent in std::fs::read_dir(&self.cwd)? {
            let Ok(dirent) = dirent else { continue };
            let path = dirent.path();
            let name = dirent.file_name().to_string_lossy().into_owned();
            if name.starts_with('.') {
                continue;
            }
            let is_dir = path.is_dir();
            if is_dir {
                dirs.push(Entry { name, path, is_dir });
            } else if self.mode == PickMode::PdfFile && is_pdf(&path) {
                files.push(Entry { name, path, is_dir });
            }
        }

        let by_name = |a: &Entry, b: &Entry| a.name.to_lowercase().cmp(&b.name.to_lowercase());
        dirs.sort_by(by_name);
        files.sort_by(by_name);

        self.entries.clear();
        if let Some(parent) = self.cwd.parent() {
            self.entries.push(Entry {
                name: "..".into(),
                path: parent.to_path_buf(),
                is_dir: true,
            });
        }
        self.entries.extend(dirs);
        self.entries.extend(files);
        self.selected = self.selected.min(self.entries.len().saturating_sub(1));
        Ok(())
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    pub fn mode(&self) -> PickMode {
        self.mode
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn selected_entry(&self) -> Option<&Entry> {
        self.entries.get(self.selected)
    }

    pub fn move_up(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn move_down(&mut self) {
        if self.selected + 1 < self.entries.len() {
            self.selected += 1;
        }
    }

    /// Enter the selected directory, or pick the selected file.
    pub fn activate(&mut self) -> io::Result<Activation> {
        let Some(entry) = self.selected_entry().cloned() else {
            return Ok(Activation::Nothing);
        };
        if entry.is_dir {
            self.enter_dir(entry.path)?;
            Ok(Activation::Navigated)
        } else {
            Ok(Activation::Picked(entry.path))
        }
    }

    /// Go up one level.
    pub fn go_up(&mut self) -> io::Result<()> {
        match self.cwd.parent() {
            Some(parent) => self.enter_dir(parent.to_path_buf()),
            None => Ok(()),
        }
    }

    fn enter_dir(&mut self, dir: PathBuf) -> io::Result<()> {
        let previous = std::mem::replace(&mut self.cwd, dir);
        self.selected = 0;
        if let Err(e) = self.refresh() {
            // Stay where we were if the directory can't be listed.
            self.cwd = previous;
            self.refresh()?;
            return Err(e);
        }
        Ok(())
    }
}

fn is_pdf(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false)
}
