//! Sitemap rotation
//!
//! The rotator owns the active sitemap file and seals it once it holds
//! `capacity` entries. The next file is only opened when another entry
//! arrives, so a trailing empty file is never created.
//!
//! If a crawl is stopped early, the entries accepted so far stay in the
//! rotator; calling [`SitemapRotator::finish`] still produces a valid, partial
//! set of sitemap files.

use crate::config::SitemapOptions;
use crate::page::parse_last_modified;
use crate::sitemap::{
    ChangeFreq, PriorityMap, SealedFile, SitemapEntry, SitemapFileWriter,
};
use crate::{ConfigError, Result, SitemapError};
use std::path::PathBuf;

/// Batches entries into capacity-bounded temporary sitemap files
///
/// Calls to [`add_entry`](Self::add_entry) must be serialized by the caller;
/// entries are written in call order.
#[derive(Debug)]
pub struct SitemapRotator {
    capacity: usize,
    last_mod: bool,
    change_freq: Option<ChangeFreq>,
    priority_map: PriorityMap,
    temp_dir: PathBuf,
    current: Option<SitemapFileWriter>,
    sealed: Vec<SealedFile>,
    finished: bool,
}

impl SitemapRotator {
    /// Creates a rotator writing temporary files into `temp_dir`
    ///
    /// # Returns
    ///
    /// * `Ok(SitemapRotator)` - Ready to accept entries
    /// * `Err(SitemapError)` - `capacity` is zero
    pub fn new(
        capacity: usize,
        last_mod: bool,
        change_freq: Option<ChangeFreq>,
        priority_map: PriorityMap,
        temp_dir: PathBuf,
    ) -> Result<Self> {
        if capacity == 0 {
            return Err(ConfigError::Validation(
                "max_entries_per_file must be a positive integer".to_string(),
            )
            .into());
        }

        Ok(Self {
            capacity,
            last_mod,
            change_freq,
            priority_map,
            temp_dir,
            current: None,
            sealed: Vec::new(),
            finished: false,
        })
    }

    /// Creates a rotator from resolved pipeline options
    pub fn from_options(options: &SitemapOptions) -> Result<Self> {
        Self::new(
            options.max_entries_per_file,
            options.last_mod,
            options.change_freq,
            options.priority_map.clone(),
            options.temp_dir.clone(),
        )
    }

    /// Appends an entry for `url`, sealing the active file when it is full
    ///
    /// The priority is resolved from `url` and `depth`. A last-modified value
    /// that cannot be parsed is left out of the entry.
    pub fn add_entry(
        &mut self,
        url: &str,
        depth: u32,
        last_modified_raw: Option<&str>,
    ) -> Result<()> {
        if self.finished {
            return Err(SitemapError::InvalidState(format!(
                "cannot add {} after the sitemap was finished",
                url
            )));
        }

        let entry = SitemapEntry {
            url: url.to_string(),
            priority: self.priority_map.resolve(url, depth),
            change_frequency: self.change_freq,
            last_modified: if self.last_mod {
                last_modified_raw
                    .and_then(parse_last_modified)
                    .map(|value| value.date_naive())
            } else {
                None
            },
        };

        let mut writer = match self.current.take() {
            Some(writer) => writer,
            None => self.open_part()?,
        };

        let appended = writer.append(&entry);
        if appended.is_ok() && writer.entry_count() >= self.capacity {
            return self.seal(writer);
        }

        self.current = Some(writer);
        appended
    }

    /// Seals the active file and stops accepting entries
    ///
    /// A file without entries is discarded instead of recorded. Calling
    /// `finish` again has no effect.
    pub fn finish(&mut self) -> Result<()> {
        if self.finished {
            return Ok(());
        }

        self.seal_current()?;
        self.finished = true;

        tracing::info!(
            "Sitemap finished: {} entries in {} file(s)",
            self.total_entries(),
            self.sealed.len()
        );

        Ok(())
    }

    /// Paths of sealed files, in the order they were sealed
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<PathBuf>)` - The sealed paths (empty when nothing was added)
    /// * `Err(SitemapError)` - [`finish`](Self::finish) has not been called yet
    pub fn paths(&self) -> Result<Vec<PathBuf>> {
        if !self.finished {
            return Err(SitemapError::InvalidState(
                "sitemap paths requested before finish()".to_string(),
            ));
        }

        Ok(self.sealed.iter().map(|file| file.path.clone()).collect())
    }

    /// Sealed files with their entry counts
    pub fn sealed_files(&self) -> &[SealedFile] {
        &self.sealed
    }

    /// Total number of entries accepted so far, sealed or not
    pub fn total_entries(&self) -> usize {
        let sealed: usize = self.sealed.iter().map(|file| file.entry_count).sum();
        sealed + self.current.as_ref().map_or(0, |w| w.entry_count())
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    fn open_part(&self) -> Result<SitemapFileWriter> {
        let named = tempfile::Builder::new()
            .prefix("sitemap-")
            .suffix(".xml")
            .tempfile_in(&self.temp_dir)
            .map_err(|e| SitemapError::io(&self.temp_dir, e))?;

        let (file, path) = named
            .keep()
            .map_err(|e| SitemapError::io(&self.temp_dir, e.error))?;

        tracing::debug!("Opened sitemap part {}", path.display());
        SitemapFileWriter::from_file(file, path)
    }

    fn seal_current(&mut self) -> Result<()> {
        match self.current.take() {
            Some(writer) => self.seal(writer),
            None => Ok(()),
        }
    }

    fn seal(&mut self, writer: SitemapFileWriter) -> Result<()> {
        if writer.entry_count() == 0 {
            let path = writer.path().to_path_buf();
            drop(writer);
            std::fs::remove_file(&path).map_err(|e| SitemapError::io(&path, e))?;
            return Ok(());
        }

        let sealed = writer.close()?;
        tracing::info!(
            "Sealed sitemap part {} ({} entries)",
            sealed.path.display(),
            sealed.entry_count
        );
        self.sealed.push(sealed);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::{tempdir, TempDir};

    fn rotator(capacity: usize, dir: &TempDir) -> SitemapRotator {
        SitemapRotator::new(
            capacity,
            true,
            None,
            PriorityMap::default(),
            dir.path().to_path_buf(),
        )
        .unwrap()
    }

    fn count_entries(path: &std::path::Path) -> usize {
        std::fs::read_to_string(path)
            .unwrap()
            .matches("<url>")
            .count()
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let dir = tempdir().unwrap();
        let result = SitemapRotator::new(0, false, None, PriorityMap::default(), dir.path().into());
        assert!(matches!(
            result.unwrap_err(),
            SitemapError::Config(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_no_entries_no_files() {
        let dir = tempdir().unwrap();
        let mut rotator = rotator(10, &dir);
        rotator.finish().unwrap();

        assert!(rotator.paths().unwrap().is_empty());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_capacity_invariant() {
        let cases: [(usize, usize); 7] =
            [(1, 1), (5, 2), (6, 2), (7, 3), (10, 10), (11, 10), (3, 50_000)];
        for (n, c) in cases {
            let dir = tempdir().unwrap();
            let mut rotator = rotator(c, &dir);
            for i in 0..n {
                rotator
                    .add_entry(&format!("http://foo.bar/{}", i), 1, None)
                    .unwrap();
            }
            rotator.finish().unwrap();

            let paths = rotator.paths().unwrap();
            assert_eq!(paths.len(), n.div_ceil(c), "n={} c={}", n, c);

            let (last, full) = paths.split_last().unwrap();
            for path in full {
                assert_eq!(count_entries(path), c);
            }
            let expected_last = if n % c == 0 { c } else { n % c };
            assert_eq!(count_entries(last), expected_last);
        }
    }

    #[test]
    fn test_no_trailing_empty_file_on_exact_multiple() {
        let dir = tempdir().unwrap();
        let mut rotator = rotator(2, &dir);
        for i in 0..4 {
            rotator
                .add_entry(&format!("http://foo.bar/{}", i), 0, None)
                .unwrap();
        }
        // Both files are sealed before finish, and no third file was opened
        assert_eq!(rotator.sealed_files().len(), 2);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 2);

        rotator.finish().unwrap();
        assert_eq!(rotator.paths().unwrap().len(), 2);
    }

    #[test]
    fn test_paths_in_sealed_order() {
        let dir = tempdir().unwrap();
        let mut rotator = rotator(1, &dir);
        for name in ["first", "second", "third"] {
            rotator
                .add_entry(&format!("http://foo.bar/{}", name), 1, None)
                .unwrap();
        }
        rotator.finish().unwrap();

        let paths = rotator.paths().unwrap();
        for (path, name) in paths.iter().zip(["first", "second", "third"]) {
            let xml = std::fs::read_to_string(path).unwrap();
            assert!(xml.contains(&format!("http://foo.bar/{}<", name)));
        }
    }

    #[test]
    fn test_finish_is_idempotent() {
        let dir = tempdir().unwrap();
        let mut rotator = rotator(2, &dir);
        for i in 0..3 {
            rotator
                .add_entry(&format!("http://foo.bar/{}", i), 1, None)
                .unwrap();
        }

        rotator.finish().unwrap();
        let once = rotator.paths().unwrap();
        rotator.finish().unwrap();
        assert_eq!(rotator.paths().unwrap(), once);
    }

    #[test]
    fn test_paths_before_finish_is_misuse() {
        let dir = tempdir().unwrap();
        let rotator = rotator(2, &dir);
        assert!(matches!(
            rotator.paths().unwrap_err(),
            SitemapError::InvalidState(_)
        ));
    }

    #[test]
    fn test_add_after_finish_is_misuse() {
        let dir = tempdir().unwrap();
        let mut rotator = rotator(2, &dir);
        rotator.finish().unwrap();
        assert!(matches!(
            rotator.add_entry("http://foo.bar/", 0, None).unwrap_err(),
            SitemapError::InvalidState(_)
        ));
    }

    #[test]
    fn test_entry_metadata() {
        let dir = tempdir().unwrap();
        let mut rotator = SitemapRotator::new(
            10,
            true,
            Some(ChangeFreq::Monthly),
            PriorityMap::default(),
            dir.path().to_path_buf(),
        )
        .unwrap();
        rotator
            .add_entry("http://foo.bar/a", 1, Some("2021-09-21T15:42:48+00:00"))
            .unwrap();
        rotator
            .add_entry("http://foo.bar/b", 1, Some("not a date"))
            .unwrap();
        rotator.finish().unwrap();

        let xml = std::fs::read_to_string(&rotator.paths().unwrap()[0]).unwrap();
        assert!(xml.contains("<lastmod>2021-09-21</lastmod>"));
        assert_eq!(xml.matches("<lastmod>").count(), 1);
        assert_eq!(xml.matches("<changefreq>monthly</changefreq>").count(), 2);
        assert_eq!(xml.matches("<priority>0.5</priority>").count(), 2);
    }

    #[test]
    fn test_last_mod_disabled_omits_lastmod() {
        let dir = tempdir().unwrap();
        let mut rotator = SitemapRotator::new(
            10,
            false,
            None,
            PriorityMap::default(),
            dir.path().to_path_buf(),
        )
        .unwrap();
        rotator
            .add_entry("http://foo.bar/", 0, Some("2021-09-21"))
            .unwrap();
        rotator.finish().unwrap();

        let xml = std::fs::read_to_string(&rotator.paths().unwrap()[0]).unwrap();
        assert!(!xml.contains("<lastmod>"));
    }

    #[test]
    fn test_total_entries() {
        let dir = tempdir().unwrap();
        let mut rotator = rotator(2, &dir);
        for i in 0..3 {
            rotator
                .add_entry(&format!("http://foo.bar/{}", i), 1, None)
                .unwrap();
        }
        assert_eq!(rotator.total_entries(), 3);
        assert!(!rotator.is_finished());
    }
}
