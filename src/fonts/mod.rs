//! Font discovery for the PDF document and the chart images.
//!
//! Both renderers need TrueType files on disk.  The Roboto family is looked up in, in order:
//!
//! 1. the directory named by `DONATION_REPORT_FONTS_DIR`,
//! 2. `assets/fonts` next to the running executable,
//! 3. `assets/fonts` inside the crate sources.
//!
//! When none of them holds the complete family, the Arial family from the Windows font directory
//! is used instead (`DONATION_REPORT_WINDOWS_FONTS_DIR`, `%WINDIR%\Fonts` or `%SystemRoot%\Fonts`).
//!
//! A process can instead pin a specific directory and family with [`set_font_source`]; the
//! lookup above is then skipped.

use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use genpdf::error::{Error, ErrorKind};
use genpdf::fonts::{self, FontData, FontFamily};
use log::{debug, warn};

/// Name of the bundled font family.
pub const DEFAULT_FONT_FAMILY_NAME: &str = "Roboto";

/// Environment variable overriding the bundled font directory.
pub const FONTS_DIR_ENV: &str = "DONATION_REPORT_FONTS_DIR";

/// Environment variable overriding the Windows fallback font directory.
pub const WINDOWS_FONTS_DIR_ENV: &str = "DONATION_REPORT_WINDOWS_FONTS_DIR";

/// File name suffixes of a complete family, `{family}-{suffix}.ttf`.
const FONT_STYLES: &[&str] = &["Regular", "Bold", "Italic", "BoldItalic"];

const WINDOWS_FALLBACK_FAMILY_NAME: &str = "Arial";

struct WindowsFontFiles {
    regular: &'static str,
    bold: &'static str,
    italic: &'static str,
    bold_italic: &'static str,
}

const WINDOWS_FONT_FILES: WindowsFontFiles = WindowsFontFiles {
    regular: "arial.ttf",
    bold: "arialbd.ttf",
    italic: "ariali.ttf",
    bold_italic: "arialbi.ttf",
};

static CHART_FONT: OnceLock<&'static [u8]> = OnceLock::new();
static PINNED_SOURCE: OnceLock<FontSource> = OnceLock::new();

/// A directory holding `{family}-Regular.ttf`, `-Bold`, `-Italic` and `-BoldItalic`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FontSource {
    pub directory: PathBuf,
    pub family: String,
}

impl FontSource {
    pub fn new(directory: impl Into<PathBuf>, family: impl Into<String>) -> Self {
        Self {
            directory: directory.into(),
            family: family.into(),
        }
    }

    fn bundled(directory: PathBuf) -> Self {
        Self::new(directory, DEFAULT_FONT_FAMILY_NAME)
    }

    fn file(&self, style: &str) -> PathBuf {
        self.directory.join(format!("{}-{}.ttf", self.family, style))
    }

    fn regular_file(&self) -> PathBuf {
        self.file(FONT_STYLES[0])
    }

    fn missing_files(&self) -> Vec<PathBuf> {
        FONT_STYLES
            .iter()
            .map(|style| self.file(style))
            .filter(|candidate| !candidate.is_file())
            .collect()
    }
}

/// Uses `source` for every document and chart of this process instead of searching for Roboto.
///
/// Returns `false` when a source was already pinned; the first one stays in effect.
pub fn set_font_source(source: FontSource) -> bool {
    PINNED_SOURCE.set(source).is_ok()
}

/// Location of the font directory shipped alongside the crate sources.
pub fn bundled_fonts_source_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets/fonts")
}

fn env_path(var: &str) -> Option<PathBuf> {
    env::var_os(var).and_then(|value| {
        let path = PathBuf::from(value);
        if path.as_os_str().is_empty() {
            None
        } else {
            Some(path)
        }
    })
}

fn font_directory_candidates() -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    if let Some(path) = env_path(FONTS_DIR_ENV) {
        candidates.push(path);
    }

    if let Ok(current_exe) = env::current_exe() {
        if let Some(bin_dir) = current_exe.parent() {
            let candidate = bin_dir.join("assets/fonts");
            if !candidates.contains(&candidate) {
                candidates.push(candidate);
            }
        }
    }

    let manifest_candidate = bundled_fonts_source_dir();
    if !candidates.contains(&manifest_candidate) {
        candidates.push(manifest_candidate);
    }

    candidates
}

fn describe_missing(missing: &[PathBuf]) -> String {
    let names = missing
        .iter()
        .map(|path| path.file_name().unwrap_or_default().to_string_lossy())
        .collect::<Vec<_>>()
        .join(", ");
    format!("missing files [{}]", names)
}

fn resolve_font_source() -> Result<FontSource, Error> {
    if let Some(pinned) = PINNED_SOURCE.get() {
        let missing = pinned.missing_files();
        if missing.is_empty() {
            return Ok(pinned.clone());
        }
        return Err(Error::new(
            format!(
                "Font family '{}' in {} is incomplete: {}",
                pinned.family,
                pinned.directory.display(),
                describe_missing(&missing)
            ),
            io::Error::new(io::ErrorKind::NotFound, "pinned font files not found"),
        ));
    }

    let mut attempts = Vec::new();

    for candidate in font_directory_candidates() {
        let exists = candidate.is_dir();
        let source = FontSource::bundled(candidate);
        let missing = source.missing_files();

        if exists && missing.is_empty() {
            debug!("Using fonts from {}", source.directory.display());
            return Ok(source);
        }

        let reason = if !exists {
            format!("directory missing at {}", source.directory.display())
        } else {
            describe_missing(&missing)
        };

        attempts.push(format!("{} ({})", source.directory.display(), reason));
    }

    Err(Error::new(
        format!(
            "Unable to locate the {} font family. Checked: {}. See assets/fonts/README.md or set {}.",
            DEFAULT_FONT_FAMILY_NAME,
            attempts.join(", "),
            FONTS_DIR_ENV
        ),
        io::Error::new(io::ErrorKind::NotFound, "bundled fonts directory not found"),
    ))
}

fn load_bundled_font_family() -> Result<FontFamily<FontData>, Error> {
    let source = resolve_font_source()?;

    fonts::from_files(&source.directory, &source.family, None).map_err(|err| {
        Error::new(
            format!(
                "Failed to load font family '{}' from {}: {}",
                source.family,
                source.directory.display(),
                err
            ),
            io::Error::new(io::ErrorKind::Other, err.to_string()),
        )
    })
}

fn windows_font_directory() -> Option<PathBuf> {
    if let Some(path) = env_path(WINDOWS_FONTS_DIR_ENV) {
        return Some(path);
    }

    #[cfg(windows)]
    {
        for var in ["WINDIR", "SystemRoot"] {
            if let Some(root) = env_path(var) {
                let candidate = root.join("Fonts");
                if candidate.is_dir() {
                    return Some(candidate);
                }
            }
        }
    }

    None
}

fn require_windows_font_directory() -> Result<PathBuf, Error> {
    windows_font_directory().ok_or_else(|| {
        Error::new(
            "Windows font directory not found for fallback",
            io::Error::new(io::ErrorKind::NotFound, "windows fonts directory not found"),
        )
    })
}

fn load_windows_font(directory: &Path, file: &str, style: &str) -> Result<FontData, Error> {
    let path = directory.join(file);
    FontData::load(&path, None).map_err(|err| {
        let io_kind = if path.is_file() {
            io::ErrorKind::Other
        } else {
            io::ErrorKind::NotFound
        };
        Error::new(
            format!(
                "Failed to load Windows fallback {} font at {}: {}",
                style,
                path.display(),
                err
            ),
            io::Error::new(io_kind, err.to_string()),
        )
    })
}

fn windows_fallback_font_family() -> Result<FontFamily<FontData>, Error> {
    let directory = require_windows_font_directory()?;

    Ok(FontFamily {
        regular: load_windows_font(&directory, WINDOWS_FONT_FILES.regular, "regular")?,
        bold: load_windows_font(&directory, WINDOWS_FONT_FILES.bold, "bold")?,
        italic: load_windows_font(&directory, WINDOWS_FONT_FILES.italic, "italic")?,
        bold_italic: load_windows_font(&directory, WINDOWS_FONT_FILES.bold_italic, "bold italic")?,
    })
}

fn fonts_missing(err: &Error) -> bool {
    matches!(
        err.kind(),
        ErrorKind::IoError(io_err)
            if io_err.kind() == io::ErrorKind::NotFound
                || io_err.kind() == io::ErrorKind::PermissionDenied
    )
}

/// Returns the Roboto font family for the PDF document, falling back to Windows Arial when the
/// bundled fonts are missing.
pub fn default_font_family() -> Result<FontFamily<FontData>, Error> {
    match load_bundled_font_family() {
        Ok(family) => Ok(family),
        Err(err) if fonts_missing(&err) => match windows_fallback_font_family() {
            Ok(fallback) => {
                warn!(
                    "Bundled fonts unavailable ({}); falling back to Windows '{}' family.",
                    err, WINDOWS_FALLBACK_FAMILY_NAME
                );
                Ok(fallback)
            }
            Err(fallback_err) => {
                warn!(
                    "Bundled fonts unavailable ({}); Windows fallback failed: {}",
                    err, fallback_err
                );
                Err(Error::new(
                    format!(
                        "Bundled fonts unavailable and Windows fallback failed: {}",
                        fallback_err
                    ),
                    io::Error::new(io::ErrorKind::NotFound, "default fonts are not available"),
                ))
            }
        },
        Err(err) => Err(err),
    }
}

fn regular_font_path() -> Result<PathBuf, Error> {
    match resolve_font_source() {
        Ok(source) => Ok(source.regular_file()),
        Err(err) => match require_windows_font_directory() {
            Ok(directory) => {
                warn!(
                    "Bundled fonts unavailable for charts ({}); using Windows '{}'.",
                    err, WINDOWS_FALLBACK_FAMILY_NAME
                );
                Ok(directory.join(WINDOWS_FONT_FILES.regular))
            }
            Err(_) => Err(err),
        },
    }
}

/// Returns the raw bytes of the regular face used to draw chart text.
///
/// The chart backend keeps a process-wide font registry that requires `'static` data, so the
/// file is read once and kept for the rest of the process.
pub fn chart_font_bytes() -> Result<&'static [u8], Error> {
    if let Some(bytes) = CHART_FONT.get() {
        return Ok(bytes);
    }

    let path = regular_font_path()?;
    let bytes = fs::read(&path).map_err(|err| {
        Error::new(
            format!("Failed to read chart font {}", path.display()),
            err,
        )
    })?;
    Ok(CHART_FONT.get_or_init(|| Box::leak(bytes.into_boxed_slice())))
}

/// Indicates whether a usable font family can be found on this machine.
pub fn default_fonts_available() -> bool {
    resolve_font_source().is_ok()
        || windows_font_directory()
            .map(|directory| missing_windows_files(&directory).is_empty())
            .unwrap_or(false)
}

fn missing_windows_files(directory: &Path) -> Vec<PathBuf> {
    [
        WINDOWS_FONT_FILES.regular,
        WINDOWS_FONT_FILES.bold,
        WINDOWS_FONT_FILES.italic,
        WINDOWS_FONT_FILES.bold_italic,
    ]
    .iter()
    .map(|name| directory.join(name))
    .filter(|path| !path.is_file())
    .collect()
}

/// Directory of the DejaVu Sans family the crate's tests render with.
#[cfg(test)]
pub(crate) fn test_font_source() -> FontSource {
    FontSource::new(
        Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fonts"),
        "DejaVuSans",
    )
}

/// Pins the test font family for the current test process.
#[cfg(test)]
pub(crate) fn use_test_fonts() {
    set_font_source(test_font_source());
}
