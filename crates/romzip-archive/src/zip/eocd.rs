use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use super::Record;

/// End of Central Directory record, minus its signature.
///
/// Followed on disk by `comment_length` bytes of archive comment.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
pub struct EocdRecord {
    pub disk_number: u16,
    pub cd_start_disk: u16,
    pub cd_disk_entries: u16,
    pub cd_total_entries: u16,
    pub cd_size: u32,
    pub cd_offset: u32,
    pub comment_length: u16,
}

impl Record for EocdRecord {
    const SIGNATURE: u32 = 0x0605_4b50;
}
