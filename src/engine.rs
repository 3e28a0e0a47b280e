//! Locating and binding the PDFium shared library.
//!
//! A [`Pdfium`] handle cannot be shared between threads, so every conversion
//! binds its own with [`bind_pdfium`]. Only the library location found by the
//! first successful bind is cached for the rest of the process. Lookup order:
//!
//! 1. `PDFIUM_LIB_PATH`: a library file, or a directory containing one
//! 2. the directory of the running executable
//! 3. the current working directory
//! 4. `<user cache dir>/pdf2pptx/`
//! 5. the system library search path

use crate::error::Pdf2PptxError;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::{debug, info};

/// Environment variable naming an explicit PDFium library (file or directory).
pub const PDFIUM_LIB_PATH_ENV: &str = "PDFIUM_LIB_PATH";

/// Where the library was found.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Location {
    File(PathBuf),
    System,
}

static RESOLVED: OnceLock<Location> = OnceLock::new();

/// Bind a fresh PDFium instance for the calling thread.
///
/// The first successful call walks the lookup chain and remembers where the
/// library was found; later calls bind straight from there. A failed lookup
/// is not cached.
pub fn bind_pdfium() -> Result<Pdfium, Pdf2PptxError> {
    if let Some(location) = RESOLVED.get() {
        return bind_location(location)
            .map(Pdfium::new)
            .map_err(|e| Pdf2PptxError::PdfiumBindingFailed(format!("{:?}: {:?}", location, e)));
    }

    let env_path = std::env::var_os(PDFIUM_LIB_PATH_ENV).map(PathBuf::from);
    let (location, bindings) = resolve(&candidate_paths(env_path.as_deref()), bind_location)
        .map_err(|attempts| Pdf2PptxError::PdfiumBindingFailed(attempts.join("; ")))?;

    match location {
        Location::File(ref path) => info!("Bound PDFium from {}", path.display()),
        Location::System => info!("Bound system PDFium library"),
    }
    let _ = RESOLVED.set(location);
    Ok(Pdfium::new(bindings))
}

fn bind_location(
    location: &Location,
) -> Result<Box<dyn PdfiumLibraryBindings>, PdfiumError> {
    match location {
        Location::File(path) => Pdfium::bind_to_library(path),
        Location::System => Pdfium::bind_to_system_library(),
    }
}

/// Try each existing candidate file, then the system library.
///
/// Returns the first location `bind` accepts, or one message per failed attempt.
fn resolve<T, E, F>(candidates: &[PathBuf], mut bind: F) -> Result<(Location, T), Vec<String>>
where
    E: std::fmt::Debug,
    F: FnMut(&Location) -> Result<T, E>,
{
    let mut attempts = Vec::new();
    let files = candidates
        .iter()
        .filter(|p| p.is_file())
        .map(|p| Location::File(p.clone()));

    for location in files.chain(std::iter::once(Location::System)) {
        match bind(&location) {
            Ok(bound) => return Ok((location, bound)),
            Err(e) => {
                debug!("PDFium bind failed for {:?}: {:?}", location, e);
                let label = match location {
                    Location::File(ref path) => path.display().to_string(),
                    Location::System => "system library".to_string(),
                };
                attempts.push(format!("{}: {:?}", label, e));
            }
        }
    }
    Err(attempts)
}

/// Library file locations to try before the system search path, in order.
pub fn candidate_paths(env_path: Option<&Path>) -> Vec<PathBuf> {
    let lib_name = Pdfium::pdfium_platform_library_name();
    let mut out = Vec::new();

    if let Some(p) = env_path {
        if p.is_dir() {
            out.push(p.join(&lib_name));
        } else {
            out.push(p.to_path_buf());
        }
    }

    if let Some(dir) = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        out.push(dir.join(&lib_name));
    }

    if let Ok(cwd) = std::env::current_dir() {
        out.push(cwd.join(&lib_name));
    }

    if let Some(cache) = dirs::cache_dir() {
        out.push(cache.join("pdf2pptx").join(&lib_name));
    }

    out.dedup();
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_directory_resolves_to_library_file() {
        let dir = tempfile::tempdir().unwrap();
        let paths = candidate_paths(Some(dir.path()));
        assert_eq!(
            paths[0],
            dir.path().join(Pdfium::pdfium_platform_library_name())
        );
    }

    #[test]
    fn env_file_is_tried_first_verbatim() {
        let paths = candidate_paths(Some(Path::new("/opt/pdfium/custom.so")));
        assert_eq!(paths[0], PathBuf::from("/opt/pdfium/custom.so"));
        assert!(paths.len() >= 2);
    }

    #[test]
    fn resolve_skips_missing_files_and_stops_at_first_success() {
        let dir = tempfile::tempdir().unwrap();
        let broken = dir.path().join("broken.so");
        let good = dir.path().join("good.so");
        std::fs::write(&broken, b"").unwrap();
        std::fs::write(&good, b"").unwrap();
        let candidates = vec![dir.path().join("absent.so"), broken.clone(), good.clone()];

        let mut tried = Vec::new();
        let (location, bound) = resolve(&candidates, |loc| {
            tried.push(loc.clone());
            match loc {
                Location::File(p) if *p == good => Ok(7),
                _ => Err("not a library"),
            }
        })
        .unwrap();

        assert_eq!(location, Location::File(good.clone()));
        assert_eq!(bound, 7);
        assert_eq!(tried, vec![Location::File(broken), Location::File(good)]);
    }

    #[test]
    fn resolve_falls_back_to_system_then_reports_every_attempt() {
        let dir = tempfile::tempdir().unwrap();
        let broken = dir.path().join("broken.so");
        std::fs::write(&broken, b"").unwrap();

        let (location, _) = resolve(&[broken.clone()], |loc| match loc {
            Location::System => Ok(()),
            Location::File(_) => Err("bad"),
        })
        .unwrap();
        assert_eq!(location, Location::System);

        let attempts = resolve(&[broken], |_| Err::<(), _>("bad")).unwrap_err();
        assert_eq!(attempts.len(), 2);
        assert!(attempts[0].contains("broken.so"));
        assert!(attempts[1].starts_with("system library"));
    }

    #[test]
    fn without_env_every_candidate_is_the_platform_library() {
        let name = Pdfium::pdfium_platform_library_name();
        for p in candidate_paths(None) {
            assert_eq!(p.file_name(), Some(name.as_os_str()));
        }
    }
}
