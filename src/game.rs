//! Game descriptors: which file of a game directory holds which part of the archive.
//!
//! A descriptor is usually supplied by an external game-detection step. It can be loaded
//! from TOML, or derived from a directory listing with [`GameDescriptor::scan`].

use std::fmt::{Display, Error, Formatter};
use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{ResourceError, ResourceResult};
use crate::resource::ResourceKind;

/// Archive generation. Version 2 games keep a directory file per kind and
/// store resources uncompressed; version 3 games use one combined directory
/// and compress their resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum ArchiveVersion {
    V2,
    V3,
}

impl ArchiveVersion {
    /// Bytes in a resource header: magic, flags, decompressed length and (v3) compressed length
    pub fn header_len(&self) -> usize {
        match self {
            ArchiveVersion::V2 => 5,
            ArchiveVersion::V3 => 7,
        }
    }
}

impl TryFrom<u8> for ArchiveVersion {
    type Error = String;

    fn try_from(v: u8) -> Result<Self, Self::Error> {
        match v {
            2 => Ok(ArchiveVersion::V2),
            3 => Ok(ArchiveVersion::V3),
            _ => Err(format!("unsupported archive version {}", v)),
        }
    }
}

impl From<ArchiveVersion> for u8 {
    fn from(v: ArchiveVersion) -> u8 {
        match v {
            ArchiveVersion::V2 => 2,
            ArchiveVersion::V3 => 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameDescriptor {
    pub code: String,
    #[serde(default)]
    pub description: String,
    pub archive_version: ArchiveVersion,
    #[serde(default)]
    pub flags: u32,
    #[serde(default)]
    pub files: IndexMap<ResourceKind, String>,
}

const V2_NAMES: [(&str, ResourceKind); 6] = [
    ("logdir", ResourceKind::Logic),
    ("picdir", ResourceKind::Picture),
    ("snddir", ResourceKind::Sound),
    ("viewdir", ResourceKind::View),
    ("words.tok", ResourceKind::Words),
    ("object", ResourceKind::Objects),
];

/// `vol.3` or `kq4vol.3` -> (prefix, 3)
fn volume_number(lower: &str) -> Option<(&str, u8)> {
    let n = lower.chars().last()?.to_digit(10)? as u8;
    let prefix = lower[..lower.len() - 1].strip_suffix("vol.")?;
    Some((prefix, n))
}

fn is_word_prefix(prefix: &str) -> bool {
    !prefix.is_empty() && prefix.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

impl GameDescriptor {
    pub fn new(code: &str, archive_version: ArchiveVersion) -> GameDescriptor {
        GameDescriptor {
            code: code.to_string(),
            description: String::new(),
            archive_version,
            flags: 0,
            files: IndexMap::new(),
        }
    }

    pub fn with_file(mut self, kind: ResourceKind, name: &str) -> GameDescriptor {
        self.files.insert(kind, name.to_string());
        self
    }

    pub fn file(&self, kind: ResourceKind) -> Option<&str> {
        self.files.get(&kind).map(String::as_str)
    }

    pub fn from_toml_str(text: &str) -> ResourceResult<GameDescriptor> {
        Ok(toml::from_str(text)?)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> ResourceResult<GameDescriptor> {
        let text = fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn to_toml(&self) -> ResourceResult<String> {
        toml::to_string(self).map_err(|e| ResourceError::Configuration(e.to_string()))
    }

    /// Builds a descriptor from a directory listing. The per-kind layout is chosen when
    /// all seven of its marker files are listed; otherwise `<prefix>dir` and
    /// `<prefix>vol.<n>` are looked for. Names match case-insensitively and keep the
    /// listing's spelling.
    pub fn scan<I, S>(names: I) -> GameDescriptor
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let names: Vec<String> = names.into_iter().map(|s| s.as_ref().to_string()).collect();

        let mut v2 = GameDescriptor::new("agiv2", ArchiveVersion::V2);
        for name in &names {
            let lower = name.to_ascii_lowercase();
            if let Some((_, kind)) = V2_NAMES.iter().find(|(n, _)| *n == lower) {
                v2.files.insert(*kind, name.clone());
            } else if let Some(("", n)) = volume_number(&lower) {
                v2.files.insert(ResourceKind::Volume(n), name.clone());
            }
        }
        if ResourceKind::V2_MARKERS.iter().all(|k| v2.files.contains_key(k)) {
            debug!("scan: per-kind layout with {} files", v2.files.len());
            return v2;
        }

        let mut v3 = GameDescriptor::new("agiv3", ArchiveVersion::V3);
        for name in &names {
            let lower = name.to_ascii_lowercase();
            if lower == "words.tok" {
                v3.files.insert(ResourceKind::Words, name.clone());
            } else if lower == "object" {
                v3.files.insert(ResourceKind::Objects, name.clone());
            } else if let Some((prefix, n)) = volume_number(&lower) {
                if is_word_prefix(prefix) {
                    v3.files.insert(ResourceKind::Volume(n), name.clone());
                }
            } else if lower.strip_suffix("dir").is_some_and(is_word_prefix)
                && !V2_NAMES.iter().any(|(n, _)| *n == lower)
            {
                v3.files.insert(ResourceKind::Directory, name.clone());
            }
        }
        debug!("scan: combined layout with {} files", v3.files.len());
        v3
    }
}

impl Display for GameDescriptor {
    fn fmt(&self, f: &mut Formatter) -> Result<(), Error> {
        writeln!(
            f,
            "{} ({}), archive version {}, flags {:#06x}",
            self.code,
            self.description,
            u8::from(self.archive_version),
            self.flags
        )?;
        for (kind, name) in &self.files {
            writeln!(f, "  {:<10} {}", kind.to_string(), name)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    const KQ1: &str = r#"
code = "kq1"
description = "King's Quest I"
archive_version = 2
flags = 0

[files]
logic = "LOGDIR"
picture = "PICDIR"
volume0 = "VOL.0"
"#;

    #[test]
    fn parses_toml_descriptor() {
        let d = GameDescriptor::from_toml_str(KQ1).unwrap();
        assert_eq!(d.code, "kq1");
        assert_eq!(d.archive_version, ArchiveVersion::V2);
        assert_eq!(d.file(ResourceKind::Logic), Some("LOGDIR"));
        assert_eq!(d.file(ResourceKind::Volume(0)), Some("VOL.0"));
        let keys: Vec<_> = d.files.keys().copied().collect();
        assert_eq!(
            keys,
            vec![ResourceKind::Logic, ResourceKind::Picture, ResourceKind::Volume(0)]
        );
    }

    #[test]
    fn toml_round_trip_keeps_order() {
        let d = GameDescriptor::from_toml_str(KQ1).unwrap();
        let text = d.to_toml().unwrap();
        assert_eq!(GameDescriptor::from_toml_str(&text).unwrap(), d);
    }

    #[test]
    fn rejects_bad_versions_and_kinds() {
        let bad_version = KQ1.replace("archive_version = 2", "archive_version = 4");
        assert!(matches!(
            GameDescriptor::from_toml_str(&bad_version),
            Err(ResourceError::Descriptor(_))
        ));
        let bad_kind = KQ1.replace("picture =", "font =");
        assert!(GameDescriptor::from_toml_str(&bad_kind).is_err());
    }

    #[test]
    fn scans_per_kind_layout() {
        let d = GameDescriptor::scan([
            "LOGDIR", "PICDIR", "SNDDIR", "VIEWDIR", "OBJECT", "WORDS.TOK", "VOL.0", "VOL.1",
            "AGI",
        ]);
        assert_eq!(d.archive_version, ArchiveVersion::V2);
        assert_eq!(d.file(ResourceKind::Volume(1)), Some("VOL.1"));
        assert_eq!(d.file(ResourceKind::Objects), Some("OBJECT"));
        assert_eq!(d.files.len(), 8);
    }

    #[test]
    fn scans_combined_layout() {
        let d = GameDescriptor::scan(["kq4dir", "kq4vol.0", "kq4vol.2", "object", "words.tok", "vol.x"]);
        assert_eq!(d.archive_version, ArchiveVersion::V3);
        assert_eq!(d.file(ResourceKind::Directory), Some("kq4dir"));
        assert_eq!(d.file(ResourceKind::Volume(2)), Some("kq4vol.2"));
        assert_eq!(d.file(ResourceKind::Volume(1)), None);
        assert_eq!(d.files.len(), 5);
    }

    #[test]
    fn missing_marker_falls_back_to_combined() {
        let d = GameDescriptor::scan(["logdir", "picdir", "snddir", "viewdir", "object", "vol.0"]);
        assert_eq!(d.archive_version, ArchiveVersion::V3);
        assert_eq!(d.file(ResourceKind::Volume(0)), None);
    }

    #[test]
    fn per_kind_directories_are_not_combined_directories() {
        let d = GameDescriptor::scan(["LOGDIR", "PICDIR", "VIEWDIR", "SNDDIR", "OBJECT", "VOL.0"]);
        assert_eq!(d.archive_version, ArchiveVersion::V3);
        assert_eq!(d.file(ResourceKind::Directory), None);

        let d = GameDescriptor::scan(["viewdir", "grdir", "grvol.0"]);
        assert_eq!(d.file(ResourceKind::Directory), Some("grdir"));
    }
}
