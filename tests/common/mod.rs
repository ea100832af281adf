//! Builders for synthetic game archives used by the integration tests.

#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap};

use agires::crypt::xor_with_key;
use agires::{ArchiveVersion, MemoryStorage, ResourceKind};

pub const ABSENT_RECORD: [u8; 3] = [0xff, 0xff, 0xff];

pub fn dir_record(volume: u8, offset: u32) -> [u8; 3] {
    [
        (volume << 4) | ((offset >> 16) as u8 & 0x0f),
        (offset >> 8) as u8,
        offset as u8,
    ]
}

/// Plain-text logic resource with its message block
pub fn logic_resource(code: &[u8], messages: &[&str]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&(code.len() as u16).to_le_bytes());
    out.extend_from_slice(code);

    let text_base = 2 + messages.len() * 2;
    let mut text = Vec::new();
    let mut pointers = Vec::new();
    for m in messages {
        if m.is_empty() {
            pointers.push(0u16);
        } else {
            pointers.push((text_base + text.len()) as u16);
            text.extend_from_slice(m.as_bytes());
            text.push(0);
        }
    }

    out.push(messages.len() as u8);
    out.extend_from_slice(&((text_base + text.len()) as u16).to_le_bytes());
    for p in pointers {
        out.extend_from_slice(&p.to_le_bytes());
    }
    out.extend_from_slice(&text);
    out
}

/// Encrypts the message text of a logic resource the way uncompressed archives store it
pub fn encrypt_messages(logic: &mut [u8]) {
    let start = u16::from_le_bytes([logic[0], logic[1]]) as usize + 2;
    let count = logic[start] as usize;
    if count == 0 {
        return;
    }
    let first = start + 3 + count * 2;
    xor_with_key(&mut logic[first..]);
}

struct BitWriter {
    out: Vec<u8>,
    acc: u32,
    nbits: u32,
}

impl BitWriter {
    fn write(&mut self, code: u16, width: u32) {
        self.acc |= (code as u32) << self.nbits;
        self.nbits += width;
        while self.nbits >= 8 {
            self.out.push(self.acc as u8);
            self.acc >>= 8;
            self.nbits -= 8;
        }
    }

    fn finish(mut self) -> Vec<u8> {
        if self.nbits > 0 {
            self.out.push(self.acc as u8);
        }
        self.out
    }
}

/// LZW encoder matching the archive decompressor: a leading reset code, widths that grow
/// one code early and stop at 11 bits, and no new entries past code 2047.
pub fn lzw_compress(data: &[u8]) -> Vec<u8> {
    let mut writer = BitWriter {
        out: Vec::new(),
        acc: 0,
        nbits: 0,
    };
    let mut bits = 9;
    writer.write(0x100, bits);

    let Some((&first, rest)) = data.split_first() else {
        writer.write(0x101, bits);
        return writer.finish();
    };

    let mut dictionary: HashMap<(u16, u8), u16> = HashMap::new();
    let mut next_entry: u16 = 258;
    // the entry the decompressor defines when it reads the next code
    let mut decoder_next: u16 = 258;
    let mut emitted = 0usize;

    let mut emit = |writer: &mut BitWriter, bits: &mut u32, code: u16| {
        writer.write(code, *bits);
        emitted += 1;
        if emitted > 1 {
            if decoder_next > (1u16 << *bits) - 2 && *bits + 1 != 12 {
                *bits += 1;
            }
            decoder_next += 1;
        }
    };

    let mut w = first as u16;
    for &k in rest {
        if let Some(&code) = dictionary.get(&(w, k)) {
            w = code;
            continue;
        }
        emit(&mut writer, &mut bits, w);
        if next_entry < 2048 {
            dictionary.insert((w, k), next_entry);
            next_entry += 1;
        }
        w = k as u16;
    }
    emit(&mut writer, &mut bits, w);
    writer.write(0x101, bits);
    writer.finish()
}

fn v2_header(declared: usize) -> Vec<u8> {
    vec![0x12, 0x34, 0x00, declared as u8, (declared >> 8) as u8]
}

fn v3_header(flags: u8, declared: usize, compressed: usize) -> Vec<u8> {
    vec![
        0x12,
        0x34,
        flags,
        declared as u8,
        (declared >> 8) as u8,
        compressed as u8,
        (compressed >> 8) as u8,
    ]
}

/// An archive assembled in memory. Resources are appended to their volume in the order
/// they are added.
pub struct ArchiveBuilder {
    version: ArchiveVersion,
    prefix: String,
    volumes: BTreeMap<u8, Vec<u8>>,
    tables: BTreeMap<ResourceKind, Vec<[u8; 3]>>,
    objects: Option<Vec<u8>>,
    words: Vec<u8>,
}

impl ArchiveBuilder {
    pub fn v2() -> ArchiveBuilder {
        ArchiveBuilder::new(ArchiveVersion::V2, "")
    }

    /// A combined-directory archive with files named `<prefix>DIR` and `<prefix>VOL.n`
    pub fn v3(prefix: &str) -> ArchiveBuilder {
        ArchiveBuilder::new(ArchiveVersion::V3, prefix)
    }

    fn new(version: ArchiveVersion, prefix: &str) -> ArchiveBuilder {
        ArchiveBuilder {
            version,
            prefix: prefix.to_string(),
            volumes: BTreeMap::new(),
            tables: BTreeMap::new(),
            objects: Some(vec![0x03, 0x00, 0x00, 0x00, 0x00]),
            words: vec![0; 52],
        }
    }

    /// Appends raw bytes (header included) and points the directory record at them
    pub fn raw(mut self, kind: ResourceKind, id: u8, volume: u8, bytes: &[u8]) -> ArchiveBuilder {
        let data = self.volumes.entry(volume).or_default();
        let offset = data.len() as u32;
        data.extend_from_slice(bytes);
        self.record(kind, id, dir_record(volume, offset))
    }

    /// Sets a directory record without adding data
    pub fn record(mut self, kind: ResourceKind, id: u8, record: [u8; 3]) -> ArchiveBuilder {
        let table = self.tables.entry(kind).or_default();
        if table.len() <= id as usize {
            table.resize(id as usize + 1, ABSENT_RECORD);
        }
        table[id as usize] = record;
        self
    }

    /// Stores a payload uncompressed; logic message text is encrypted
    pub fn stored(self, kind: ResourceKind, id: u8, volume: u8, payload: &[u8]) -> ArchiveBuilder {
        let mut payload = payload.to_vec();
        if kind == ResourceKind::Logic {
            encrypt_messages(&mut payload);
        }
        let mut bytes = match self.version {
            ArchiveVersion::V2 => v2_header(payload.len()),
            ArchiveVersion::V3 => v3_header(0, payload.len(), payload.len()),
        };
        bytes.extend_from_slice(&payload);
        self.raw(kind, id, volume, &bytes)
    }

    /// Stores a payload LZW compressed (v3 only)
    pub fn compressed(self, kind: ResourceKind, id: u8, volume: u8, payload: &[u8]) -> ArchiveBuilder {
        let packed = lzw_compress(payload);
        let mut bytes = v3_header(0, payload.len(), packed.len());
        bytes.extend_from_slice(&packed);
        self.raw(kind, id, volume, &bytes)
    }

    /// Stores an already nibble-packed picture with the 0x80 flag (v3 only)
    pub fn nibble_picture(self, id: u8, volume: u8, packed: &[u8], declared: usize) -> ArchiveBuilder {
        let mut bytes = v3_header(0x80, declared, packed.len());
        bytes.extend_from_slice(packed);
        self.raw(ResourceKind::Picture, id, volume, &bytes)
    }

    pub fn objects(mut self, bytes: Option<Vec<u8>>) -> ArchiveBuilder {
        self.objects = bytes;
        self
    }

    fn table_bytes(&self, kind: ResourceKind) -> Vec<u8> {
        self.tables
            .get(&kind)
            .map(|t| t.concat())
            .unwrap_or_default()
    }

    fn directory_bytes(&self) -> Vec<u8> {
        let tables: Vec<Vec<u8>> = ResourceKind::DIRECTORY_KINDS
            .iter()
            .map(|k| self.table_bytes(*k))
            .collect();
        let mut out = Vec::new();
        let mut offset = 8usize;
        for t in &tables {
            out.extend_from_slice(&(offset as u16).to_le_bytes());
            offset += t.len();
        }
        for t in tables {
            out.extend_from_slice(&t);
        }
        out
    }

    pub fn volume_name(&self, n: u8) -> String {
        format!("{}VOL.{}", self.prefix, n)
    }

    /// File name and contents of every file in the archive
    pub fn files(&self) -> Vec<(String, Vec<u8>)> {
        let mut files = Vec::new();
        match self.version {
            ArchiveVersion::V2 => {
                for (kind, name) in [
                    (ResourceKind::Logic, "LOGDIR"),
                    (ResourceKind::Picture, "PICDIR"),
                    (ResourceKind::View, "VIEWDIR"),
                    (ResourceKind::Sound, "SNDDIR"),
                ] {
                    files.push((name.to_string(), self.table_bytes(kind)));
                }
            }
            ArchiveVersion::V3 => {
                files.push((format!("{}DIR", self.prefix), self.directory_bytes()));
            }
        }
        for (n, data) in &self.volumes {
            files.push((self.volume_name(*n), data.clone()));
        }
        // v2 layout detection needs vol.0 even when every resource lives elsewhere
        if !self.volumes.contains_key(&0) {
            files.push((self.volume_name(0), Vec::new()));
        }
        if let Some(objects) = &self.objects {
            files.push(("OBJECT".to_string(), objects.clone()));
        }
        files.push(("WORDS.TOK".to_string(), self.words.clone()));
        files
    }

    pub fn storage(&self) -> MemoryStorage {
        let mut storage = MemoryStorage::new();
        for (name, bytes) in self.files() {
            storage.insert(&name, bytes);
        }
        storage
    }
}
