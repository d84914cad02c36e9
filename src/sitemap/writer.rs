//! Streaming sitemap file writer
//!
//! Each entry is serialized as soon as it is appended; only the buffered
//! writer's internal buffer is held in memory, never the whole document.

use crate::sitemap::{SitemapEntry, SITEMAP_NAMESPACE};
use crate::{Result, SitemapError};
use quick_xml::escape::escape;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// A sitemap file that has been closed and will never be written again
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealedFile {
    /// Location of the file
    pub path: PathBuf,

    /// Number of `<url>` entries it contains
    pub entry_count: usize,
}

/// Writes one `<urlset>` document, one entry at a time
///
/// Closing consumes the writer, so a sealed file cannot be appended to.
#[derive(Debug)]
pub struct SitemapFileWriter {
    path: PathBuf,
    out: BufWriter<File>,
    entry_count: usize,
}

impl SitemapFileWriter {
    /// Creates (or truncates) the file at `path` and writes the document header
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::create(&path).map_err(|e| SitemapError::io(&path, e))?;
        Self::from_file(file, path)
    }

    /// Starts a document in an already opened file
    pub fn from_file(file: File, path: PathBuf) -> Result<Self> {
        let mut writer = Self {
            path,
            out: BufWriter::new(file),
            entry_count: 0,
        };

        let header = format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<urlset xmlns=\"{}\">\n",
            SITEMAP_NAMESPACE
        );
        writer.write_raw(&header)?;

        Ok(writer)
    }

    /// Serializes one entry
    pub fn append(&mut self, entry: &SitemapEntry) -> Result<()> {
        let mut element = String::with_capacity(entry.url.len() + 128);

        element.push_str("  <url>\n");
        element.push_str(&format!("    <loc>{}</loc>\n", escape(entry.url.as_str())));
        if let Some(date) = entry.last_modified {
            element.push_str(&format!("    <lastmod>{}</lastmod>\n", date.format("%Y-%m-%d")));
        }
        if let Some(freq) = entry.change_frequency {
            element.push_str(&format!("    <changefreq>{}</changefreq>\n", freq));
        }
        element.push_str(&format!("    <priority>{:.1}</priority>\n", entry.priority));
        element.push_str("  </url>\n");

        self.write_raw(&element)?;
        self.entry_count += 1;

        Ok(())
    }

    /// Number of entries written so far
    pub fn entry_count(&self) -> usize {
        self.entry_count
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Finishes the document and flushes it to disk
    pub fn close(mut self) -> Result<SealedFile> {
        self.write_raw("</urlset>\n")?;

        let file = self
            .out
            .into_inner()
            .map_err(|e| SitemapError::io(&self.path, e.into_error()))?;
        file.sync_all().map_err(|e| SitemapError::io(&self.path, e))?;

        Ok(SealedFile {
            path: self.path,
            entry_count: self.entry_count,
        })
    }

    fn write_raw(&mut self, text: &str) -> Result<()> {
        self.out
            .write_all(text.as_bytes())
            .map_err(|e| SitemapError::io(&self.path, e))
    }
}
