//! Promotion of sealed sitemap files to their final location
//!
//! Parts are promoted one at a time, in sealed order. Every copy and removal
//! is attempted even after an earlier step failed; failures are collected
//! into a single [`PromotionError`].

use crate::sitemap::{build_sitemap_index, part_path};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use url::Url;

/// Where the finished sitemap should be written
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    /// Write the sitemap (or the index) to this path
    Path(PathBuf),

    /// Produce no output; temporaries are only cleaned up
    Disabled,
}

impl Destination {
    /// Parses a configured destination; empty or `none` disables output
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        if value.is_empty() || value.eq_ignore_ascii_case("none") {
            Self::Disabled
        } else {
            Self::Path(PathBuf::from(value))
        }
    }

    pub fn is_disabled(&self) -> bool {
        matches!(self, Self::Disabled)
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path(path) => write!(f, "{}", path.display()),
            Self::Disabled => f.write_str("none"),
        }
    }
}

/// How the sealed files turn into the final output
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Promotion {
    /// Nothing was sealed
    Nothing,

    /// One file, promoted as-is
    SingleFile(PathBuf),

    /// Several parts, promoted next to an index
    MultiPart(Vec<PathBuf>),
}

impl Promotion {
    pub fn from_sealed(sealed: &[PathBuf]) -> Self {
        match sealed {
            [] => Self::Nothing,
            [single] => Self::SingleFile(single.clone()),
            parts => Self::MultiPart(parts.to_vec()),
        }
    }
}

/// Result of a successful promotion
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromotionOutcome {
    /// No entries were accepted, so no file was written
    NothingToPromote,

    /// Output is disabled; `removed` temporaries were deleted
    Disabled { removed: usize },

    /// The single sitemap was written to `destination`
    SingleFile { destination: PathBuf },

    /// An index was written to `index`, referencing `parts`
    MultiPart { index: PathBuf, parts: Vec<PathBuf> },
}

impl fmt::Display for PromotionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NothingToPromote => f.write_str("no pages accepted, nothing written"),
            Self::Disabled { removed } => {
                write!(f, "output disabled, removed {} temporary file(s)", removed)
            }
            Self::SingleFile { destination } => {
                write!(f, "sitemap written to {}", destination.display())
            }
            Self::MultiPart { index, parts } => write!(
                f,
                "sitemap index written to {} with {} part(s)",
                index.display(),
                parts.len()
            ),
        }
    }
}

/// The step of a promotion that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromotionStep {
    Copy,
    RemoveTemporary,
    WriteIndex,
}

impl fmt::Display for PromotionStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Copy => "copy",
            Self::RemoveTemporary => "remove temporary",
            Self::WriteIndex => "write index",
        })
    }
}

/// One failed promotion step
#[derive(Debug, Error)]
#[error("{step} failed for {}: {source}", path.display())]
pub struct PromotionFailure {
    pub step: PromotionStep,
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

/// Aggregate error for a promotion where at least one step failed
///
/// Files listed in `promoted` reached their destination and are left in place.
#[derive(Debug, Error)]
#[error("{} promotion step(s) failed, {} file(s) promoted", failures.len(), promoted.len())]
pub struct PromotionError {
    pub promoted: Vec<PathBuf>,
    pub failures: Vec<PromotionFailure>,
}

/// Collects the result of each promotion step
#[derive(Debug, Default)]
struct PromotionLog {
    promoted: Vec<PathBuf>,
    failures: Vec<PromotionFailure>,
}

impl PromotionLog {
    fn fail(&mut self, step: PromotionStep, path: &Path, source: io::Error) {
        tracing::warn!("Promotion {} failed for {}: {}", step, path.display(), source);
        self.failures.push(PromotionFailure {
            step,
            path: path.to_path_buf(),
            source,
        });
    }

    /// Copies `from` to `to`, then removes `from` if the copy succeeded
    ///
    /// Returns whether `to` was written.
    fn move_file(&mut self, from: &Path, to: &Path) -> bool {
        match fs::copy(from, to) {
            Ok(_) => {
                tracing::debug!("Copied {} to {}", from.display(), to.display());
                self.promoted.push(to.to_path_buf());
                self.remove(from);
                true
            }
            Err(e) => {
                self.fail(PromotionStep::Copy, to, e);
                false
            }
        }
    }

    fn remove(&mut self, path: &Path) -> bool {
        match fs::remove_file(path) {
            Ok(()) => true,
            Err(e) => {
                self.fail(PromotionStep::RemoveTemporary, path, e);
                false
            }
        }
    }

    fn into_result<T>(self, outcome: T) -> Result<T, PromotionError> {
        if self.failures.is_empty() {
            Ok(outcome)
        } else {
            Err(PromotionError {
                promoted: self.promoted,
                failures: self.failures,
            })
        }
    }
}

/// Promotes sealed temporary files to `destination`
///
/// * no sealed files: nothing is written
/// * one file: it is copied to the destination
/// * several files: each is copied to a `_partN` sibling of the destination,
///   then a sitemap index referencing them (under the origin of `site_url`) is
///   written to the destination
///
/// Temporaries are removed after a successful copy. With output disabled the
/// temporaries are only removed.
///
/// # Returns
///
/// * `Ok(PromotionOutcome)` - Every step succeeded
/// * `Err(PromotionError)` - At least one step failed; the rest were still attempted
pub fn promote(
    sealed: &[PathBuf],
    destination: &Destination,
    site_url: &Url,
) -> Result<PromotionOutcome, PromotionError> {
    let mut log = PromotionLog::default();

    let destination = match destination {
        Destination::Path(path) => path,
        Destination::Disabled => {
            let removed = sealed.iter().filter(|path| log.remove(path)).count();
            tracing::info!("Output disabled, removed {} temporary file(s)", removed);
            return log.into_result(PromotionOutcome::Disabled { removed });
        }
    };

    match Promotion::from_sealed(sealed) {
        Promotion::Nothing => {
            tracing::info!("No sitemap entries, nothing to promote");
            Ok(PromotionOutcome::NothingToPromote)
        }
        Promotion::SingleFile(temporary) => {
            if log.move_file(&temporary, destination) {
                tracing::info!("Sitemap written to {}", destination.display());
            }
            log.into_result(PromotionOutcome::SingleFile {
                destination: destination.clone(),
            })
        }
        Promotion::MultiPart(parts) => {
            let targets: Vec<PathBuf> = (1..=parts.len())
                .map(|part| part_path(destination, part))
                .collect();

            for (temporary, target) in parts.iter().zip(&targets) {
                log.move_file(temporary, target);
            }

            let base_filename = destination
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            let index = build_sitemap_index(site_url, &base_filename, parts.len());

            match fs::write(destination, index) {
                Ok(()) => {
                    log.promoted.push(destination.clone());
                    tracing::info!(
                        "Sitemap index written to {} ({} parts)",
                        destination.display(),
                        parts.len()
                    );
                }
                Err(e) => log.fail(PromotionStep::WriteIndex, destination, e),
            }

            log.into_result(PromotionOutcome::MultiPart {
                index: destination.clone(),
                parts: targets,
            })
        }
    }
}
