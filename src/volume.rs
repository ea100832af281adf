//! Directory tables and the index of where each resource lives.
//!
//! A directory record is three bytes: the high nibble of the first byte is the volume
//! number, the remaining 20 bits the offset into that volume. Offset 0xFFFFF marks an
//! unused id. Lengths are not stored; they are derived from the offset of the next
//! resource in the same volume.

use std::collections::BTreeMap;
use std::fmt::{Display, Error, Formatter};

use log::debug;

use crate::binary::read_u16_le;
use crate::error::{ResourceError, ResourceResult};
use crate::resource::ResourceKind;

pub const RECORD_LEN: usize = 3;
pub const ABSENT_OFFSET: u32 = 0xfffff;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirectoryRecord {
    pub volume: u8,
    pub offset: u32,
}

impl DirectoryRecord {
    /// `None` for the absent sentinel
    pub fn parse(b: &[u8; RECORD_LEN]) -> Option<DirectoryRecord> {
        let volume = b[0] >> 4;
        let offset = ((b[0] as u32 & 0x0f) << 16) | ((b[1] as u32) << 8) | b[2] as u32;
        if offset == ABSENT_OFFSET {
            None
        } else {
            Some(DirectoryRecord { volume, offset })
        }
    }
}

/// Splits a directory table into records; position in the table is the resource id
pub fn parse_table(name: &str, bytes: &[u8]) -> ResourceResult<Vec<Option<DirectoryRecord>>> {
    if bytes.len() % RECORD_LEN != 0 {
        return Err(ResourceError::TruncatedDirectory {
            name: name.to_string(),
            length: bytes.len(),
        });
    }
    Ok(bytes
        .chunks_exact(RECORD_LEN)
        .filter_map(|chunk| <&[u8; RECORD_LEN]>::try_from(chunk).ok())
        .map(DirectoryRecord::parse)
        .collect())
}

/// Splits a combined (v3) directory into its logic, picture, view and sound tables.
/// The file starts with four little-endian offsets; the last table runs to the end.
pub fn split_combined<'a>(name: &str, bytes: &'a [u8]) -> ResourceResult<[&'a [u8]; 4]> {
    let truncated = || ResourceError::TruncatedDirectory {
        name: name.to_string(),
        length: bytes.len(),
    };
    if bytes.len() < 8 {
        return Err(truncated());
    }
    let mut bounds = [0usize; 5];
    for (i, bound) in bounds.iter_mut().take(4).enumerate() {
        *bound = read_u16_le(bytes, i * 2)? as usize;
    }
    bounds[4] = bytes.len();
    if bounds[0] < 8 || bounds.windows(2).any(|w| w[0] > w[1]) {
        return Err(truncated());
    }
    Ok([
        &bytes[bounds[0]..bounds[1]],
        &bytes[bounds[1]..bounds[2]],
        &bytes[bounds[2]..bounds[3]],
        &bytes[bounds[3]..bounds[4]],
    ])
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VolumeIndexEntry {
    pub volume: u8,
    pub offset: u32,
    pub length: u32,
}

impl Display for VolumeIndexEntry {
    fn fmt(&self, f: &mut Formatter) -> Result<(), Error> {
        write!(f, "vol.{} @ {:#07x}, {} bytes", self.volume, self.offset, self.length)
    }
}

/// Resolved (kind, id) -> location map, read-only once built
#[derive(Debug, Clone, Default)]
pub struct VolumeIndex {
    entries: BTreeMap<(ResourceKind, u8), VolumeIndexEntry>,
    dropped: usize,
}

impl VolumeIndex {
    /// Builds the index from parsed directory tables. Records that point at a volume
    /// missing from `volume_sizes` are dropped and reported through `report`.
    pub fn build(
        tables: &[(ResourceKind, Vec<Option<DirectoryRecord>>)],
        volume_sizes: &BTreeMap<u8, usize>,
        report: &mut dyn FnMut(String),
    ) -> VolumeIndex {
        let mut index = VolumeIndex::default();
        let mut located: Vec<((ResourceKind, u8), DirectoryRecord)> = Vec::new();

        for (kind, records) in tables {
            for (i, record) in records.iter().enumerate() {
                let Some(record) = record else { continue };
                let Ok(id) = u8::try_from(i) else {
                    report(format!("{} directory has more than 256 records, ignoring id {}", kind, i));
                    index.dropped += 1;
                    continue;
                };
                if !volume_sizes.contains_key(&record.volume) {
                    report(format!(
                        "{} {} refers to volume {} which is missing, dropping it",
                        kind, id, record.volume
                    ));
                    index.dropped += 1;
                    continue;
                }
                located.push(((*kind, id), *record));
            }
        }

        // every offset in use, per volume, in ascending order
        let mut offsets: BTreeMap<u8, Vec<u32>> = BTreeMap::new();
        for (_, r) in &located {
            offsets.entry(r.volume).or_default().push(r.offset);
        }
        for list in offsets.values_mut() {
            list.sort_unstable();
            list.dedup();
        }

        for (key, r) in located {
            let volume_size = volume_sizes.get(&r.volume).copied().unwrap_or(0) as u64;
            let end = offsets
                .get(&r.volume)
                .and_then(|list| list.iter().find(|o| **o > r.offset))
                .map(|o| *o as u64)
                .unwrap_or(volume_size);
            let length = end.saturating_sub(r.offset as u64) as u32;
            index.entries.insert(
                key,
                VolumeIndexEntry {
                    volume: r.volume,
                    offset: r.offset,
                    length,
                },
            );
        }

        debug!(
            "volume index: {} entries, {} dropped",
            index.entries.len(),
            index.dropped
        );
        index
    }

    pub fn get(&self, kind: ResourceKind, id: u8) -> Option<&VolumeIndexEntry> {
        self.entries.get(&(kind, id))
    }

    pub fn contains(&self, kind: ResourceKind, id: u8) -> bool {
        self.entries.contains_key(&(kind, id))
    }

    /// Ids present for a kind, ascending
    pub fn ids(&self, kind: ResourceKind) -> Vec<u8> {
        self.entries
            .keys()
            .filter(|(k, _)| *k == kind)
            .map(|(_, id)| *id)
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ResourceKind, u8, &VolumeIndexEntry)> {
        self.entries.iter().map(|((k, id), e)| (*k, *id, e))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Records discarded because their volume was missing
    pub fn dropped(&self) -> usize {
        self.dropped
    }
}
