//! Named deterministic random streams derived from one master seed
//!
//! Every name maps to its own ChaCha stream under the master seed, so a
//! stream's sequence does not depend on which other streams were opened first.

use std::collections::HashMap;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

pub struct RngManager {
    seed: u64,
    streams: HashMap<String, ChaCha8Rng>,
}

impl RngManager {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            streams: HashMap::new(),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Stream for `name`, created on first use; later calls continue it.
    pub fn stream(&mut self, name: &str) -> &mut ChaCha8Rng {
        let seed = self.seed;
        self.streams.entry(name.to_string()).or_insert_with(|| {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            rng.set_stream(stream_id(name));
            rng
        })
    }
}

/// FNV-1a, stable across platforms and toolchains.
fn stream_id(name: &str) -> u64 {
    name.bytes().fold(0xcbf2_9ce4_8422_2325, |hash, byte| {
        (hash ^ u64::from(byte)).wrapping_mul(0x0000_0100_0000_01b3)
    })
}
