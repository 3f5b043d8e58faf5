//! Packing fetched payloads into a zip container
//!
//! [`ArchiveBuilder`] collects entries in memory and writes them in path
//! order, so the same inputs always produce the same archive. Entries can
//! themselves be zips, which is how an icon bundle travels inside a larger
//! release archive.

use std::collections::BTreeMap;
use std::io::{Cursor, Write};
use std::path::Path;

use tracing::debug;
use zip::write::{FileOptions, ZipWriter};

use crate::config::{ArchiveConfig, Compression};
use crate::error::{Error, Result};
use crate::types::ResultMapping;

/// In-memory zip archive under construction
#[derive(Clone, Debug, Default)]
pub struct ArchiveBuilder {
    compression: Compression,
    entries: BTreeMap<String, Vec<u8>>,
}

impl ArchiveBuilder {
    /// Empty archive using the configured compression
    pub fn new(config: &ArchiveConfig) -> Self {
        Self {
            compression: config.compression,
            entries: BTreeMap::new(),
        }
    }

    /// Add (or replace) one entry
    ///
    /// # Errors
    ///
    /// [`Error::InvalidEntryPath`] for empty, absolute, or `..` paths.
    pub fn add_file(&mut self, path: impl Into<String>, bytes: Vec<u8>) -> Result<&mut Self> {
        let path = path.into();
        validate_entry_path(&path)?;
        self.entries.insert(path, bytes);
        Ok(self)
    }

    /// Add a UTF-8 text entry
    pub fn add_text(&mut self, path: impl Into<String>, text: &str) -> Result<&mut Self> {
        self.add_file(path, text.as_bytes().to_vec())
    }

    /// Add every payload in `mapping` under `prefix`
    ///
    /// An empty prefix places entries at the archive root. Every path is
    /// checked before any entry is added, so a rejected mapping leaves the
    /// builder unchanged.
    pub fn add_mapping(&mut self, prefix: &str, mapping: &ResultMapping) -> Result<&mut Self> {
        let prefix = prefix.trim_end_matches('/');
        let entries = mapping
            .iter()
            .map(|(name, bytes)| {
                let path = if prefix.is_empty() {
                    name.clone()
                } else {
                    format!("{prefix}/{name}")
                };
                validate_entry_path(&path)?;
                Ok((path, bytes))
            })
            .collect::<Result<Vec<_>>>()?;

        for (path, bytes) in entries {
            self.entries.insert(path, bytes.clone());
        }
        Ok(self)
    }

    /// Serialize `inner` and add it as a single entry
    pub fn add_nested(
        &mut self,
        path: impl Into<String>,
        inner: &ArchiveBuilder,
    ) -> Result<&mut Self> {
        let bytes = inner.finish()?;
        self.add_file(path, bytes)
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the archive has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether an entry exists at `path`
    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    /// Produce the zip bytes
    pub fn finish(&self) -> Result<Vec<u8>> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = FileOptions::default()
            .compression_method(self.compression.into())
            .last_modified_time(zip::DateTime::default());

        for (path, bytes) in &self.entries {
            writer.start_file(path.as_str(), options)?;
            writer.write_all(bytes)?;
        }

        let bytes = writer.finish()?.into_inner();
        debug!(
            entries = self.entries.len(),
            size = bytes.len(),
            compression = ?self.compression,
            "archive built"
        );
        Ok(bytes)
    }

    /// Write the zip to `path`
    pub async fn write_to(&self, path: &Path) -> Result<()> {
        let bytes = self.finish()?;
        tokio::fs::write(path, &bytes).await.map_err(|e| {
            Error::Io(std::io::Error::new(
                e.kind(),
                format!("failed to write archive '{}': {}", path.display(), e),
            ))
        })?;
        debug!(?path, size = bytes.len(), "archive written");
        Ok(())
    }
}

/// Reject paths that would escape the archive root on extraction
fn validate_entry_path(path: &str) -> Result<()> {
    let bad = path.is_empty()
        || path.starts_with('/')
        || path.contains('\\')
        || path.split('/').any(|seg| seg.is_empty() || seg == "." || seg == "..");
    if bad {
        return Err(Error::InvalidEntryPath(path.to_string()));
    }
    Ok(())
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    fn read_entries(bytes: &[u8]) -> BTreeMap<String, Vec<u8>> {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut out = BTreeMap::new();
        for i in 0..archive.len() {
            let mut file = archive.by_index(i).unwrap();
            let mut buf = Vec::new();
            file.read_to_end(&mut buf).unwrap();
            out.insert(file.name().to_string(), buf);
        }
        out
    }

    #[test]
    fn mapping_lands_under_prefix() {
        let mut mapping = ResultMapping::new();
        mapping.insert("a.jpg".into(), vec![1, 2, 3]);
        mapping.insert("b.jpg".into(), vec![4]);

        let mut builder = ArchiveBuilder::default();
        builder
            .add_text("steam_settings/steam_appid.txt", "440")
            .unwrap()
            .add_mapping("steam_settings/img/", &mapping)
            .unwrap();

        let entries = read_entries(&builder.finish().unwrap());
        assert_eq!(entries.len(), 3);
        assert_eq!(entries["steam_settings/steam_appid.txt"], b"440");
        assert_eq!(entries["steam_settings/img/a.jpg"], vec![1, 2, 3]);
        assert_eq!(entries["steam_settings/img/b.jpg"], vec![4]);
    }

    #[test]
    fn nested_archive_is_readable() {
        let mut icons = ArchiveBuilder::default();
        icons.add_file("x.jpg", vec![9, 9]).unwrap();

        let mut release = ArchiveBuilder::default();
        release
            .add_text("tenoke.ini", "[TENOKE]\n")
            .unwrap()
            .add_nested("icons.zip", &icons)
            .unwrap();

        let outer = read_entries(&release.finish().unwrap());
        let inner = read_entries(&outer["icons.zip"]);
        assert_eq!(inner["x.jpg"], vec![9, 9]);
        assert_eq!(outer["tenoke.ini"], b"[TENOKE]\n");
    }

    #[test]
    fn output_is_deterministic() {
        let mut a = ArchiveBuilder::default();
        a.add_file("z.jpg", vec![1]).unwrap();
        a.add_file("a.jpg", vec![2]).unwrap();
        let mut b = ArchiveBuilder::default();
        b.add_file("a.jpg", vec![2]).unwrap();
        b.add_file("z.jpg", vec![1]).unwrap();

        assert_eq!(a.finish().unwrap(), b.finish().unwrap());
    }

    #[test]
    fn deflated_entries_round_trip() {
        let mut builder = ArchiveBuilder::new(&ArchiveConfig {
            compression: Compression::Deflated,
        });
        builder.add_file("big.bin", vec![7; 4096]).unwrap();

        let bytes = builder.finish().unwrap();
        assert!(bytes.len() < 4096);
        assert_eq!(read_entries(&bytes)["big.bin"], vec![7; 4096]);
    }

    #[test]
    fn unsafe_paths_are_rejected() {
        let mut builder = ArchiveBuilder::default();
        for path in ["", "/etc/passwd", "../up.jpg", "img/../../x", "a//b", "win\\path"] {
            assert!(
                matches!(builder.add_file(path, vec![]), Err(Error::InvalidEntryPath(_))),
                "{path:?} should be rejected"
            );
        }
        assert!(builder.is_empty());
    }

    #[test]
    fn rejected_mapping_adds_nothing() {
        let mut mapping = ResultMapping::new();
        for name in ["a.jpg", "b.jpg", "c.jpg", "../escape.jpg", "d.jpg"] {
            mapping.insert(name.into(), vec![1]);
        }

        let mut builder = ArchiveBuilder::default();
        builder.add_text("steam_settings/steam_appid.txt", "440").unwrap();
        let result = builder.add_mapping("steam_settings/img", &mapping);

        assert!(matches!(result, Err(Error::InvalidEntryPath(_))));
        assert_eq!(builder.len(), 1);
        assert!(!builder.contains("steam_settings/img/a.jpg"));
    }

    #[test]
    fn empty_archive_is_valid_zip() {
        let bytes = ArchiveBuilder::default().finish().unwrap();
        assert!(read_entries(&bytes).is_empty());
    }

    #[tokio::test]
    async fn write_to_creates_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("icons.zip");

        let mut builder = ArchiveBuilder::default();
        builder.add_file("a.jpg", vec![1]).unwrap();
        builder.write_to(&path).await.unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(read_entries(&bytes)["a.jpg"], vec![1]);
        assert!(builder.contains("a.jpg"));
        assert_eq!(builder.len(), 1);
    }
}
