//! A hash-map with a fixed, platform-independent hasher so iteration order
//! is reproducible from one run to the next.

use core::hash::{BuildHasherDefault, Hasher};

pub use hashbrown::hash_map::Entry;

/// Hashmap using [`hashbrown::HashMap`] with the [`FxHasher64`].
pub type HashMap<K, V> = hashbrown::hash_map::HashMap<K, V, BuildHasherDefault<FxHasher64>>;

/// Hashset using [`hashbrown::HashSet`] with the [`FxHasher64`].
pub type HashSet<K> = hashbrown::hash_set::HashSet<K, BuildHasherDefault<FxHasher64>>;

const SEED: u64 = 0x51_7c_c1_b7_27_22_0a_95;

/// The hashing function of rustc, on 64-bit words regardless of the target pointer size.
#[derive(Default, Copy, Clone)]
pub struct FxHasher64 {
    hash: u64,
}

impl FxHasher64 {
    #[inline]
    fn add_to_hash(&mut self, word: u64) {
        self.hash = (self.hash.rotate_left(5) ^ word).wrapping_mul(SEED);
    }
}

impl Hasher for FxHasher64 {
    #[inline]
    fn write(&mut self, bytes: &[u8]) {
        let mut chunks = bytes.chunks_exact(8);

        for chunk in &mut chunks {
            let mut word = [0u8; 8];
            word.copy_from_slice(chunk);
            self.add_to_hash(u64::from_le_bytes(word));
        }

        for byte in chunks.remainder() {
            self.add_to_hash(*byte as u64);
        }
    }

    #[inline]
    fn write_u8(&mut self, i: u8) {
        self.add_to_hash(i as u64);
    }

    #[inline]
    fn write_u32(&mut self, i: u32) {
        self.add_to_hash(i as u64);
    }

    #[inline]
    fn write_u64(&mut self, i: u64) {
        self.add_to_hash(i);
    }

    #[inline]
    fn write_usize(&mut self, i: usize) {
        self.add_to_hash(i as u64);
    }

    #[inline]
    fn finish(&self) -> u64 {
        self.hash
    }
}
