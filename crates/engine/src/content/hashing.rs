use sha2::{Digest, Sha256};

/// Order-sensitive SHA-256 over the world files a catalog loaded. Changes
/// when a world is added, removed, reordered, or edited.
#[derive(Debug, Default)]
pub(crate) struct CatalogHasher {
    hasher: Sha256,
    world_count: usize,
}

impl CatalogHasher {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn add_world(&mut self, world_id: &str, file_bytes: &[u8]) {
        self.hasher.update(world_id.as_bytes());
        self.hasher.update([0u8]);
        self.hasher.update((file_bytes.len() as u64).to_le_bytes());
        self.hasher.update(file_bytes);
        self.world_count += 1;
    }

    pub(crate) fn finish(self) -> String {
        let mut hasher = self.hasher;
        hasher.update((self.world_count as u64).to_le_bytes());
        to_hex_lower(&hasher.finalize())
    }
}

fn to_hex_lower(bytes: &[u8]) -> String {
    let mut output = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        use std::fmt::Write as _;
        let _ = write!(&mut output, "{byte:02x}");
    }
    output
}
