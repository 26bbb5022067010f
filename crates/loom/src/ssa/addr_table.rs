//! Address table: a side-table mapping symbol name to dense index, used by
//! PIC lowering to replace symbol references with loads from a global
//! address table (spec §4.E).

use ahash::AHashMap;

/// `header_size = 4 + Σ (4 + name_length)`: a 4-byte entry count, then one
/// `4-byte name length + raw name bytes` record per entry (spec §4.E,
/// §6 "Address-table header").
#[derive(Debug, Default)]
pub struct AddrTable {
    names: Vec<Box<str>>,
    index_of: AHashMap<Box<str>, u32>,
}

impl AddrTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the dense index for `name`, assigning the next available
    /// one if this is the first reference.
    pub fn intern(&mut self, name: &str) -> u32 {
        if let Some(&index) = self.index_of.get(name) {
            return index;
        }
        let index = self.names.len() as u32;
        self.names.push(name.into());
        self.index_of.insert(name.into(), index);
        index
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Byte size of the header section, before the fixed 8-byte address
    /// slots.
    #[must_use]
    pub fn header_size(&self) -> u32 {
        4 + self.names.iter().map(|n| 4 + n.len() as u32).sum::<u32>()
    }

    /// Byte offset of entry `index`'s 8-byte address slot, relative to the
    /// start of the table (spec §6: `header_size + 8 * index`).
    #[must_use]
    pub fn entry_offset(&self, index: u32) -> u32 {
        self.header_size() + 8 * index
    }

    pub fn encode_header(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.header_size() as usize);
        buf.extend_from_slice(&(self.names.len() as u32).to_le_bytes());
        for name in &self.names {
            buf.extend_from_slice(&(name.len() as u32).to_le_bytes());
            buf.extend_from_slice(name.as_bytes());
        }
        buf
    }
}
