//! Content-addressed store for embedded resources.
//!
//! Every image, font or other file referenced from the manuscript or its
//! stylesheet is registered here exactly once per distinct (content, extension)
//! pair and written to the archive under `files/<sha1><ext>`.

use std::path::Path;

use log::trace;

use crate::error::{Error, Result};
use crate::util::{dotted_extension, media_type_for_extension};

/// Archive directory that holds registered assets.
pub const ASSET_DIR: &str = "files";

/// One deduplicated embedded resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetDatum {
    /// Hex SHA-1 of the raw bytes.
    pub hash: String,
    /// Source extension including the dot, verbatim (may be empty).
    pub extension: String,
    /// Archive path, `files/<hash><extension>`.
    pub path: String,
    pub media_type: &'static str,
    pub content: Vec<u8>,
}

impl AssetDatum {
    /// Manifest id for the OPF. Ids must start with a letter, hashes may not,
    /// and extension characters outside `[A-Za-z0-9_]` become `_`.
    pub fn manifest_id(&self) -> String {
        let ext: String = self
            .extension
            .trim_start_matches('.')
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect();
        if ext.is_empty() {
            format!("file_{}", self.hash)
        } else {
            format!("file_{}_{ext}", self.hash)
        }
    }
}

/// Append-only registry of [`AssetDatum`] entries, in registration order.
#[derive(Debug, Default, Clone)]
pub struct AssetRegistry {
    entries: Vec<AssetDatum>,
}

impl AssetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the file at `path` and return its entry.
    ///
    /// Byte-identical content with the same extension resolves to the entry
    /// that was stored first; nothing new is stored in that case.
    pub fn register(&mut self, path: &Path) -> Result<&AssetDatum> {
        let content = std::fs::read(path).map_err(|source| Error::Asset {
            path: path.to_path_buf(),
            source,
        })?;
        let extension = dotted_extension(path);
        let hash = sha1_smol::Sha1::from(&content).digest().to_string();

        if let Some(index) = self.position(&hash, &extension) {
            trace!(
                "asset {} already registered as {}",
                path.display(),
                self.entries[index].path
            );
            return Ok(&self.entries[index]);
        }

        let datum = AssetDatum {
            path: format!("{ASSET_DIR}/{hash}{extension}"),
            media_type: media_type_for_extension(&extension),
            hash,
            extension,
            content,
        };
        trace!("registered asset {} as {}", path.display(), datum.path);
        self.entries.push(datum);

        Ok(&self.entries[self.entries.len() - 1])
    }

    fn position(&self, hash: &str, extension: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|d| d.hash == hash && d.extension == extension)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AssetDatum> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a AssetRegistry {
    type Item = &'a AssetDatum;
    type IntoIter = std::slice::Iter<'a, AssetDatum>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_register_builds_content_addressed_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("logo.png");
        fs::write(&path, b"not really a png").unwrap();

        let mut registry = AssetRegistry::new();
        let datum = registry.register(&path).unwrap().clone();

        let expected_hash = sha1_smol::Sha1::from(b"not really a png").digest().to_string();
        assert_eq!(datum.hash, expected_hash);
        assert_eq!(datum.extension, ".png");
        assert_eq!(datum.path, format!("files/{expected_hash}.png"));
        assert_eq!(datum.media_type, "image/png");
        assert_eq!(datum.content, b"not really a png");
    }

    #[test]
    fn test_register_same_path_twice_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.jpg");
        fs::write(&path, b"jpeg bytes").unwrap();

        let mut registry = AssetRegistry::new();
        let first = registry.register(&path).unwrap().path.clone();
        let second = registry.register(&path).unwrap().path.clone();

        assert_eq!(first, second);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_identical_bytes_under_different_names_collapse() {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("a.gif");
        let b = dir.path().join("copy-of-a.gif");
        fs::write(&a, b"GIF89a...").unwrap();
        fs::write(&b, b"GIF89a...").unwrap();

        let mut registry = AssetRegistry::new();
        let pa = registry.register(&a).unwrap().path.clone();
        let pb = registry.register(&b).unwrap().path.clone();

        assert_eq!(pa, pb);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_same_bytes_different_extension_are_distinct() {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("font.otf");
        let b = dir.path().join("font.ttf");
        fs::write(&a, b"font data").unwrap();
        fs::write(&b, b"font data").unwrap();

        let mut registry = AssetRegistry::new();
        let pa = registry.register(&a).unwrap().path.clone();
        let pb = registry.register(&b).unwrap().path.clone();

        assert_ne!(pa, pb);
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.iter().next().unwrap().media_type, "font/otf");
    }

    #[test]
    fn test_unknown_extension_falls_back_to_octet_stream() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.bin");
        fs::write(&path, [0u8, 1, 2]).unwrap();

        let mut registry = AssetRegistry::new();
        let datum = registry.register(&path).unwrap();
        assert_eq!(datum.media_type, "application/octet-stream");
    }

    #[test]
    fn test_missing_file_is_asset_error() {
        let dir = TempDir::new().unwrap();
        let mut registry = AssetRegistry::new();

        let err = registry.register(&dir.path().join("missing.png")).unwrap_err();
        assert!(matches!(err, Error::Asset { .. }));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_manifest_id_starts_with_letter() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("x.png");
        fs::write(&path, b"x").unwrap();

        let mut registry = AssetRegistry::new();
        let datum = registry.register(&path).unwrap().clone();
        let id = datum.manifest_id();
        assert!(id.starts_with("file_"));
        assert!(id.ends_with("_png"));
    }

    #[test]
    fn test_manifest_id_is_xml_name() {
        let dir = TempDir::new().unwrap();
        let mut registry = AssetRegistry::new();
        for (name, bytes) in [("a.svg+z", b"a"), ("b.o~ld", b"b"), ("c.grüß", b"c")] {
            let path = dir.path().join(name);
            fs::write(&path, bytes).unwrap();
            registry.register(&path).unwrap();
        }

        let ids: Vec<_> = registry.iter().map(AssetDatum::manifest_id).collect();
        assert!(ids[0].ends_with("_svg_z"));
        assert!(ids[1].ends_with("_o_ld"));
        assert!(ids[2].ends_with("_gr__"));
        for id in &ids {
            assert!(id.chars().all(|c| c.is_ascii_alphanumeric() || c == '_'), "{id}");
        }
    }
}
