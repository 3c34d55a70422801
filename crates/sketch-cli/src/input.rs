// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Read-only stream input, memory-mapped so decoding runs in place.

use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use memmap2::Mmap;

/// Bytes of a stream file.
pub enum StreamInput {
    /// Mapped file contents.
    Mapped(Mmap),
    /// Zero-length file; nothing to map.
    Empty,
}

impl StreamInput {
    /// Open and map `path`.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("open {}", path.display()))?;
        let len = file
            .metadata()
            .with_context(|| format!("stat {}", path.display()))?
            .len();
        if len == 0 {
            return Ok(Self::Empty);
        }
        // SAFETY: the map is read-only and lives no longer than this process's
        // use of it; a concurrent writer truncating the file is outside what
        // the tool supports.
        #[allow(unsafe_code)]
        let map = unsafe { Mmap::map(&file) }.with_context(|| format!("map {}", path.display()))?;
        Ok(Self::Mapped(map))
    }
}

impl AsRef<[u8]> for StreamInput {
    fn as_ref(&self) -> &[u8] {
        match self {
            Self::Mapped(map) => &map[..],
            Self::Empty => &[],
        }
    }
}
