//! Resource kinds stored in an archive and their textual names.

use std::fmt::{Display, Error, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The files an archive is made of, and the kinds of resource a directory can address.
/// `Volume(n)` names volume file `n` (0..=9).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ResourceKind {
    Logic,
    Picture,
    Sound,
    View,
    Objects,
    Words,
    Volume(u8),
    Directory,
}

pub const MAX_VOLUMES: u8 = 10;

impl ResourceKind {
    /// The four kinds that have directory tables, in v3 sub-table order
    pub const DIRECTORY_KINDS: [ResourceKind; 4] = [
        ResourceKind::Logic,
        ResourceKind::Picture,
        ResourceKind::View,
        ResourceKind::Sound,
    ];

    /// Files that must all be present for the per-kind (v2) layout
    pub const V2_MARKERS: [ResourceKind; 7] = [
        ResourceKind::Logic,
        ResourceKind::Objects,
        ResourceKind::Picture,
        ResourceKind::Sound,
        ResourceKind::View,
        ResourceKind::Words,
        ResourceKind::Volume(0),
    ];

    pub fn has_directory(&self) -> bool {
        Self::DIRECTORY_KINDS.contains(self)
    }

    /// Objects and words files carry no resource header
    pub fn is_monolithic(&self) -> bool {
        matches!(self, ResourceKind::Objects | ResourceKind::Words)
    }

    pub fn volumes() -> impl Iterator<Item = ResourceKind> {
        (0..MAX_VOLUMES).map(ResourceKind::Volume)
    }
}

impl Display for ResourceKind {
    fn fmt(&self, f: &mut Formatter) -> Result<(), Error> {
        match self {
            ResourceKind::Logic => write!(f, "logic"),
            ResourceKind::Picture => write!(f, "picture"),
            ResourceKind::Sound => write!(f, "sound"),
            ResourceKind::View => write!(f, "view"),
            ResourceKind::Objects => write!(f, "objects"),
            ResourceKind::Words => write!(f, "words"),
            ResourceKind::Volume(n) => write!(f, "volume{}", n),
            ResourceKind::Directory => write!(f, "directory"),
        }
    }
}

impl FromStr for ResourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        let kind = match lower.as_str() {
            "logic" => ResourceKind::Logic,
            "picture" => ResourceKind::Picture,
            "sound" => ResourceKind::Sound,
            "view" => ResourceKind::View,
            "objects" => ResourceKind::Objects,
            "words" => ResourceKind::Words,
            "directory" => ResourceKind::Directory,
            other => match other.strip_prefix("volume").map(str::parse::<u8>) {
                Some(Ok(n)) if n < MAX_VOLUMES => ResourceKind::Volume(n),
                _ => return Err(format!("unknown resource kind '{}'", s)),
            },
        };
        Ok(kind)
    }
}

impl TryFrom<String> for ResourceKind {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<ResourceKind> for String {
    fn from(kind: ResourceKind) -> String {
        kind.to_string()
    }
}
