//! Random number generation (rnd.c)
//!
//! Uses a seeded ChaCha stream. The save file records the seed and the word
//! position so a restored game continues the same sequence.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Game random number generator
#[derive(Debug, Clone)]
pub struct GameRng {
    rng: ChaCha8Rng,
    seed: u64,
}

impl GameRng {
    /// Create a new RNG with the given seed
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    /// Create a new RNG with a random seed
    pub fn from_entropy() -> Self {
        Self::new(rand::random())
    }

    /// Rebuild a generator at a recorded stream position
    pub fn resume(seed: u64, word_pos: u128) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        rng.set_word_pos(word_pos);
        Self { rng, seed }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Current position in the keystream, in 32-bit words
    pub fn word_pos(&self) -> u128 {
        self.rng.get_word_pos()
    }

    /// rn2(x) - returns 0..x-1
    ///
    /// Returns 0 if x is 0.
    pub fn rn2(&mut self, x: u32) -> u32 {
        if x == 0 {
            return 0;
        }
        self.rng.gen_range(0..x)
    }

    /// rnd(x) - returns 1..x
    ///
    /// Returns 0 if x is 0.
    pub fn rnd(&mut self, x: u32) -> u32 {
        if x == 0 {
            return 0;
        }
        self.rng.gen_range(1..=x)
    }

    /// rn1(x, y) - returns y..y+x-1
    pub fn rn1(&mut self, x: u32, y: u32) -> u32 {
        self.rn2(x) + y
    }

    /// d(n, x) - roll n dice with x sides
    pub fn d(&mut self, n: u32, x: u32) -> u32 {
        (0..n).map(|_| self.rnd(x)).sum()
    }

    /// Returns true with probability 1/n
    pub fn one_in(&mut self, n: u32) -> bool {
        self.rn2(n) == 0
    }

    /// Choose a random element from a slice
    pub fn choose<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            None
        } else {
            items.get(self.rn2(items.len() as u32) as usize)
        }
    }
}

impl Default for GameRng {
    fn default() -> Self {
        Self::from_entropy()
    }
}
