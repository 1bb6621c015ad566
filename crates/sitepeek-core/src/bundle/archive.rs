//! Zip serialization of a bundle stream.

use std::io::{Seek, Write};

use tracing::{info, warn};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::{BundleEntry, BundleEvent, BundleReport, BundleStream};
use crate::{Error, Result};

/// Writes bundle entries into a deflate-compressed zip archive.
pub struct ArchiveWriter<W: Write + Seek> {
    zip: ZipWriter<W>,
    options: SimpleFileOptions,
    written: Vec<String>,
}

impl<W: Write + Seek> ArchiveWriter<W> {
    /// Start an archive on `writer`.
    pub fn new(writer: W) -> Self {
        Self {
            zip: ZipWriter::new(writer),
            options: SimpleFileOptions::default().compression_method(CompressionMethod::Deflated),
            written: Vec::new(),
        }
    }

    /// Append one entry.
    ///
    /// # Errors
    ///
    /// [`Error::Archive`] if the zip layer rejects the entry or the
    /// underlying writer fails.
    pub fn add(&mut self, entry: &BundleEntry) -> Result<()> {
        self.zip.start_file(entry.name.as_str(), self.options)?;
        self.zip
            .write_all(&entry.bytes)
            .map_err(|e| Error::Archive(format!("writing '{}': {e}", entry.name)))?;
        self.written.push(entry.name.clone());
        Ok(())
    }

    /// Names written so far, in order.
    #[must_use]
    pub fn written(&self) -> &[String] {
        &self.written
    }

    /// Write the central directory and return the underlying writer.
    ///
    /// # Errors
    ///
    /// [`Error::Archive`] if the central directory cannot be written.
    pub fn finish(self) -> Result<(W, Vec<String>)> {
        let writer = self.zip.finish()?;
        Ok((writer, self.written))
    }
}

/// Drain `stream` into a zip archive on `writer`.
///
/// Entries are written as they arrive. Skipped assets are logged and listed
/// in the report; they never fail the bundle.
///
/// # Errors
///
/// [`Error::Archive`] when the archive itself cannot be written.
pub async fn write_bundle<W: Write + Seek>(
    stream: BundleStream,
    writer: W,
) -> Result<(W, BundleReport)> {
    write_bundle_with(stream, writer, |_| {}).await
}

/// Like [`write_bundle`], calling `on_event` for every entry or skip before
/// it is recorded. Used to drive progress displays.
///
/// # Errors
///
/// [`Error::Archive`] when the archive itself cannot be written.
pub async fn write_bundle_with<W, F>(
    mut stream: BundleStream,
    writer: W,
    mut on_event: F,
) -> Result<(W, BundleReport)>
where
    W: Write + Seek,
    F: FnMut(&BundleEvent),
{
    let mut archive = ArchiveWriter::new(writer);
    let mut skipped = Vec::new();

    while let Some(event) = stream.next_event().await {
        on_event(&event);
        match event {
            BundleEvent::Entry(entry) => archive.add(&entry)?,
            BundleEvent::Skipped(skip) => {
                warn!("Skipping {}: {}", skip.reference.url, skip.error);
                skipped.push(skip);
            },
        }
    }

    let timed_out = stream.timed_out();
    let (writer, written) = archive.finish()?;
    info!(
        "Bundle complete: {} entries written, {} skipped{}",
        written.len(),
        skipped.len(),
        if timed_out { " (deadline reached)" } else { "" }
    );

    Ok((
        writer,
        BundleReport {
            written,
            skipped,
            timed_out,
        },
    ))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::bundle::{BundleBuilder, BundleRequest};
    use crate::config::{BundleCaps, Config};
    use crate::testing::MapFetcher;
    use std::io::{Cursor, Read};
    use std::sync::Arc;
    use url::Url;

    const PAGE: &str = "https://site.test/";

    fn entry(name: &str, bytes: &[u8]) -> BundleEntry {
        BundleEntry {
            name: name.to_string(),
            bytes: bytes.to_vec(),
        }
    }

    #[test]
    fn test_archive_contains_entries() {
        let mut archive = ArchiveWriter::new(Cursor::new(Vec::new()));
        archive.add(&entry("index.html", b"<html></html>")).unwrap();
        archive.add(&entry("css/main.css", b"body{}")).unwrap();
        assert_eq!(archive.written(), ["index.html", "css/main.css"]);

        let (cursor, written) = archive.finish().unwrap();
        assert_eq!(written.len(), 2);

        let mut zip = zip::ZipArchive::new(Cursor::new(cursor.into_inner())).unwrap();
        assert_eq!(zip.len(), 2);
        let mut css = String::new();
        zip.by_name("css/main.css").unwrap().read_to_string(&mut css).unwrap();
        assert_eq!(css, "body{}");
    }

    #[tokio::test]
    async fn test_write_bundle_with_sees_every_event() {
        let fetcher = MapFetcher::new()
            .page(PAGE, r#"<script src="/a.js"></script><img src="/gone.png">"#)
            .body("https://site.test/a.js", None, b"x");
        let builder = BundleBuilder::new(Arc::new(fetcher), &Config::default());
        let request = BundleRequest::new(Url::parse(PAGE).unwrap(), BundleCaps::default());
        let stream = builder.stream(request).await.unwrap();

        let mut seen = 0;
        let (_, report) = write_bundle_with(stream, Cursor::new(Vec::new()), |_| seen += 1)
            .await
            .unwrap();

        assert_eq!(seen, 3);
        assert_eq!(report.written, vec!["index.html", "js/a.js"]);
        assert_eq!(report.skipped.len(), 1);
    }

    #[test]
    fn test_empty_archive_is_valid() {
        let (cursor, written) = ArchiveWriter::new(Cursor::new(Vec::new())).finish().unwrap();
        assert!(written.is_empty());
        let zip = zip::ZipArchive::new(Cursor::new(cursor.into_inner())).unwrap();
        assert_eq!(zip.len(), 0);
    }
}
