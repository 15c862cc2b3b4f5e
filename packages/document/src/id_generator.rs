use std::time::{SystemTime, UNIX_EPOCH};

use crc32fast::Hasher;

/// Hash an arbitrary tag into a short hex seed.
pub fn seed_from_tag(tag: &str) -> String {
    let mut hasher = Hasher::new();
    hasher.update(tag.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Sequential block-id generator for one editing session.
///
/// Ids are `block-{seed}-{n}`: the seed is derived from the session start
/// time, the counter makes ids collision-free within the session. A block
/// keeps its id for its whole lifetime; fresh ids are only handed out when
/// a new block actually enters the document.
#[derive(Debug, Clone)]
pub struct IdGenerator {
    seed: String,
    count: u32,
}

impl IdGenerator {
    pub fn new() -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or_default();
        Self::from_seed(seed_from_tag(&nanos.to_string()))
    }

    pub fn from_seed(seed: String) -> Self {
        Self { seed, count: 0 }
    }

    /// Generate the next id in the sequence.
    pub fn next_id(&mut self) -> String {
        self.count += 1;
        format!("block-{}-{}", self.seed, self.count)
    }

    pub fn seed(&self) -> &str {
        &self.seed
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}
