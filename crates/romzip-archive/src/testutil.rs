//! In-memory ZIP construction for tests.

use std::io::Write;
use std::path::{Path, PathBuf};

use flate2::write::DeflateEncoder;
use flate2::Compression;
use romzip_common::crc;
use zerocopy::IntoBytes;

use crate::zip::{CentralDirectoryHeader, EocdRecord, LocalFileHeader, Record};

/// DOS time 12:00:00.
const DOS_TIME: u16 = 0x6000;
/// DOS date 2025-01-01.
const DOS_DATE: u16 = 0x5A21;

/// Builds classic single-disk ZIP archives byte by byte.
pub(crate) struct ZipBuilder {
    body: Vec<u8>,
    central: Vec<u8>,
    count: u16,
    comment: Vec<u8>,
    disk_number: u16,
}

impl ZipBuilder {
    pub(crate) fn new() -> Self {
        Self {
            body: Vec::new(),
            central: Vec::new(),
            count: 0,
            comment: Vec::new(),
            disk_number: 0,
        }
    }

    pub(crate) fn stored(self, name: &str, data: &[u8]) -> Self {
        self.entry(name, 0, data.to_vec(), data, &[])
    }

    pub(crate) fn deflated(self, name: &str, data: &[u8]) -> Self {
        self.entry(name, 8, deflate(data), data, &[])
    }

    /// Add an entry with an explicit method, payload, and local extra field.
    pub(crate) fn entry(
        mut self,
        name: &str,
        method: u16,
        payload: Vec<u8>,
        original: &[u8],
        local_extra: &[u8],
    ) -> Self {
        let crc32 = crc::checksum(original);
        let offset = self.body.len() as u32;

        let local = LocalFileHeader {
            needed_version: 20,
            flags: 0,
            method,
            mod_time: DOS_TIME,
            mod_date: DOS_DATE,
            crc32,
            compressed_length: payload.len() as u32,
            uncompressed_length: original.len() as u32,
            filename_length: name.len() as u16,
            extra_length: local_extra.len() as u16,
        };
        self.body.extend_from_slice(&LocalFileHeader::MAGIC);
        self.body.extend_from_slice(local.as_bytes());
        self.body.extend_from_slice(name.as_bytes());
        self.body.extend_from_slice(local_extra);
        self.body.extend_from_slice(&payload);

        let header = CentralDirectoryHeader {
            made_by: 20,
            needed_version: 20,
            flags: 0,
            method,
            mod_time: DOS_TIME,
            mod_date: DOS_DATE,
            crc32,
            compressed_length: payload.len() as u32,
            uncompressed_length: original.len() as u32,
            filename_length: name.len() as u16,
            extra_length: 0,
            comment_length: 0,
            start_disk: 0,
            internal_attributes: 0,
            external_attributes: 0,
            local_header_offset: offset,
        };
        self.central.extend_from_slice(&CentralDirectoryHeader::MAGIC);
        self.central.extend_from_slice(header.as_bytes());
        self.central.extend_from_slice(name.as_bytes());

        self.count += 1;
        self
    }

    pub(crate) fn comment(mut self, comment: &[u8]) -> Self {
        self.comment = comment.to_vec();
        self
    }

    pub(crate) fn disk_number(mut self, disk: u16) -> Self {
        self.disk_number = disk;
        self
    }

    /// Raw central directory bytes built so far.
    pub(crate) fn central_directory(&self) -> Vec<u8> {
        self.central.clone()
    }

    pub(crate) fn build(self) -> Vec<u8> {
        let mut out = self.body;
        let cd_offset = out.len() as u32;
        out.extend_from_slice(&self.central);

        let eocd = EocdRecord {
            disk_number: self.disk_number,
            cd_start_disk: 0,
            cd_disk_entries: self.count,
            cd_total_entries: self.count,
            cd_size: self.central.len() as u32,
            cd_offset,
            comment_length: self.comment.len() as u16,
        };
        out.extend_from_slice(&EocdRecord::MAGIC);
        out.extend_from_slice(eocd.as_bytes());
        out.extend_from_slice(&self.comment);
        out
    }
}

/// Raw-deflate `data` with the reference encoder.
pub(crate) fn deflate(data: &[u8]) -> Vec<u8> {
    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

/// A 4096-byte cartridge image with a non-repeating byte pattern.
pub(crate) fn game_image() -> Vec<u8> {
    (0..4096u32).map(|i| (i.wrapping_mul(31) ^ (i >> 3)) as u8).collect()
}

/// A 120-byte readme.
pub(crate) fn readme_text() -> Vec<u8> {
    let text = b"Insert cartridge, then press RESET. ".repeat(4);
    text[..120].to_vec()
}

/// The two-entry `game.zip` fixture: a stored image and a deflated readme.
pub(crate) fn game_zip() -> Vec<u8> {
    ZipBuilder::new()
        .stored("game.bin", &game_image())
        .deflated("readme.txt", &readme_text())
        .build()
}

/// Write `bytes` to `dir/name` and return the path.
pub(crate) fn write_archive(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, bytes).unwrap();
    path
}
