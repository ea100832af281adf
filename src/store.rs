//! Resource extraction: finds a resource through the directory index, reads it from its
//! volume, checks the header and returns the decrypted, decompressed payload.

use std::collections::BTreeMap;

use log::debug;

use crate::binary::read_u16_le;
use crate::crypt::{decrypt_logic_messages, decrypt_objects};
use crate::error::{ResourceError, ResourceResult};
use crate::game::{ArchiveVersion, GameDescriptor};
use crate::lzw;
use crate::pic_expand::pic_expand;
use crate::resource::ResourceKind;
use crate::storage::FileAccess;
use crate::volume::{parse_table, split_combined, DirectoryRecord, VolumeIndex, VolumeIndexEntry};

pub const SIGNATURE: [u8; 2] = [0x12, 0x34];
pub const FLAG_PICTURE_NIBBLES: u8 = 0x80;

/// Which directory files an archive uses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectoryLayout {
    /// one directory file per kind (`logdir`, `picdir`, `viewdir`, `snddir`)
    PerKind,
    /// a single directory holding four sub-tables
    Combined,
}

pub struct ResourceStore<S: FileAccess> {
    storage: S,
    descriptor: GameDescriptor,
    layout: DirectoryLayout,
    index: VolumeIndex,
}

impl<S: FileAccess> ResourceStore<S> {
    pub fn open(descriptor: GameDescriptor, storage: S) -> ResourceResult<ResourceStore<S>> {
        let present =
            |kind: ResourceKind| descriptor.file(kind).map_or(false, |name| storage.exists(name));

        let layout = if ResourceKind::V2_MARKERS.iter().all(|k| present(*k)) {
            DirectoryLayout::PerKind
        } else if present(ResourceKind::Directory) {
            DirectoryLayout::Combined
        } else {
            return Err(ResourceError::Configuration(format!(
                "{}: neither per-kind directory files nor a combined directory were found",
                descriptor.code
            )));
        };
        debug!("{}: {:?} directory layout", descriptor.code, layout);

        let tables = Self::read_tables(&descriptor, &storage, layout)?;

        let mut volume_sizes = BTreeMap::new();
        for kind in ResourceKind::volumes() {
            let (ResourceKind::Volume(n), Some(name)) = (kind, descriptor.file(kind)) else {
                continue;
            };
            match storage.size(name) {
                Ok(size) => {
                    volume_sizes.insert(n, size);
                }
                Err(e) => storage.log(&format!("volume {} ({}) is unreadable: {}", n, name, e)),
            }
        }

        let index = VolumeIndex::build(&tables, &volume_sizes, &mut |m| storage.log(&m));
        if index.is_empty() && index.dropped() > 0 {
            let missing = tables
                .iter()
                .flat_map(|(_, records)| records.iter().flatten())
                .map(|r| r.volume)
                .find(|v| !volume_sizes.contains_key(v))
                .unwrap_or(0);
            return Err(ResourceError::MissingVolume(missing));
        }

        Ok(ResourceStore {
            storage,
            descriptor,
            layout,
            index,
        })
    }

    fn read_tables(
        descriptor: &GameDescriptor,
        storage: &S,
        layout: DirectoryLayout,
    ) -> ResourceResult<Vec<(ResourceKind, Vec<Option<DirectoryRecord>>)>> {
        let mut tables = Vec::new();
        match layout {
            DirectoryLayout::PerKind => {
                for kind in ResourceKind::DIRECTORY_KINDS {
                    let name = Self::file_name(descriptor, kind)?;
                    let bytes = storage.read_all(name)?;
                    tables.push((kind, parse_table(name, &bytes)?));
                }
            }
            DirectoryLayout::Combined => {
                let name = Self::file_name(descriptor, ResourceKind::Directory)?;
                let bytes = storage.read_all(name)?;
                let parts = split_combined(name, &bytes)?;
                for (kind, part) in ResourceKind::DIRECTORY_KINDS.into_iter().zip(parts) {
                    tables.push((kind, parse_table(name, part)?));
                }
            }
        }
        Ok(tables)
    }

    fn file_name(descriptor: &GameDescriptor, kind: ResourceKind) -> ResourceResult<&str> {
        descriptor.file(kind).ok_or_else(|| {
            ResourceError::Configuration(format!("no file is mapped for {}", kind))
        })
    }

    pub fn descriptor(&self) -> &GameDescriptor {
        &self.descriptor
    }

    pub fn layout(&self) -> DirectoryLayout {
        self.layout
    }

    pub fn index(&self) -> &VolumeIndex {
        &self.index
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn entry(&self, kind: ResourceKind, id: u8) -> Option<&VolumeIndexEntry> {
        self.index.get(kind, id)
    }

    pub fn exists(&self, kind: ResourceKind, id: u8) -> bool {
        if kind.is_monolithic() {
            id == 0
                && self
                    .descriptor
                    .file(kind)
                    .map_or(false, |name| self.storage.exists(name))
        } else {
            self.index.contains(kind, id)
        }
    }

    /// Ids that can be extracted for a kind, ascending
    pub fn ids(&self, kind: ResourceKind) -> Vec<u8> {
        if kind.is_monolithic() {
            if self.exists(kind, 0) {
                vec![0]
            } else {
                vec![]
            }
        } else {
            self.index.ids(kind)
        }
    }

    /// Reads, checks and unpacks one resource
    pub fn extract(&self, kind: ResourceKind, id: u8) -> ResourceResult<Vec<u8>> {
        if kind.is_monolithic() {
            return self.extract_monolithic(kind, id);
        }
        let entry = self
            .index
            .get(kind, id)
            .ok_or(ResourceError::MissingResource { kind, id })?;
        let name = self
            .descriptor
            .file(ResourceKind::Volume(entry.volume))
            .ok_or(ResourceError::MissingVolume(entry.volume))?;
        let raw = self
            .storage
            .read(name, entry.offset as usize, entry.length as usize)?;
        debug!("{} {}: {} raw bytes from {}", kind, id, raw.len(), entry);
        unpack(kind, id, self.descriptor.archive_version, &raw)
    }

    fn extract_monolithic(&self, kind: ResourceKind, id: u8) -> ResourceResult<Vec<u8>> {
        let missing = ResourceError::MissingResource { kind, id };
        if id != 0 {
            return Err(missing);
        }
        let Some(name) = self.descriptor.file(kind) else {
            return Err(missing);
        };
        if !self.storage.exists(name) {
            return Err(missing);
        }
        let mut bytes = self.storage.read_all(name)?;
        if kind == ResourceKind::Objects && decrypt_objects(&mut bytes) {
            debug!("{}: object file was encrypted", name);
        }
        Ok(bytes)
    }
}

/// Checks a resource header and returns its payload.
///
/// Payloads whose compressed length equals their decompressed length are stored as is
/// (every v2 resource). Logic payloads stored that way have encrypted message text.
/// Compressed pictures flagged 0x80 use nibble packing, everything else LZW.
pub fn unpack(
    kind: ResourceKind,
    id: u8,
    version: ArchiveVersion,
    raw: &[u8],
) -> ResourceResult<Vec<u8>> {
    let header_len = version.header_len();
    if raw.len() < header_len {
        return Err(ResourceError::corrupt(format!(
            "{} {} is {} bytes, shorter than its {} byte header",
            kind,
            id,
            raw.len(),
            header_len
        )));
    }
    if raw[..2] != SIGNATURE {
        return Err(ResourceError::BadSignature {
            kind,
            id,
            found: [raw[0], raw[1]],
        });
    }

    let flags = raw[2];
    let declared = read_u16_le(raw, 3)? as usize;
    let compressed = match version {
        ArchiveVersion::V2 => declared,
        ArchiveVersion::V3 => read_u16_le(raw, 5)? as usize,
    };
    let payload = &raw[header_len..];

    if compressed == declared {
        let mut out = payload[..declared.min(payload.len())].to_vec();
        out.resize(declared, 0);
        if kind == ResourceKind::Logic {
            decrypt_logic_messages(&mut out)?;
        }
        return Ok(out);
    }

    let packed = &payload[..compressed.min(payload.len())];
    if kind == ResourceKind::Picture && flags & FLAG_PICTURE_NIBBLES != 0 {
        pic_expand(packed, declared)
    } else {
        lzw::expand(packed, declared)
    }
}
