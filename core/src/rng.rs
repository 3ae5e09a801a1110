//! Deterministic RNG substream factory.
//!
//! Every random decision in the generator draws from a [`DrawStream`], and
//! every concern (roads, buildings, vegetation, water, each change-operator
//! call) owns its own stream derived from the root seed and a string label.
//! Sibling streams are independent: adding or removing draws inside one
//! concern never perturbs another concern's sequence.
//!
//! The derivation function is part of the portable contract: a 32-bit FNV-1a
//! fold over the label's UTF-8 bytes, XOR-combined with the parent seed and
//! masked to 31 bits. It never touches a platform-randomized hash, so
//! identical `(seed, label path)` inputs yield bit-identical draws across
//! processes and machines, forever.

const FNV_OFFSET_BASIS: u32 = 2_166_136_261;
const FNV_PRIME: u32 = 16_777_619;

/// Mask keeping derived seeds inside a fixed 31-bit width.
pub const DERIVED_SEED_MASK: u64 = 0x7FFF_FFFF;

const SPLITMIX_GAMMA: u64 = 0x9e37_79b9_7f4a_7c15;

/// Derives a child seed from a parent seed and a UTF-8 label.
///
/// This mixing function is versioned with the generator: changing it changes
/// every generated world, so treat it as frozen.
#[must_use]
pub fn derive_seed(seed: u64, label: &str) -> u64 {
    let mut hash = FNV_OFFSET_BASIS;
    for byte in label.as_bytes() {
        hash ^= u32::from(*byte);
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    (seed ^ u64::from(hash)) & DERIVED_SEED_MASK
}

/// Deterministic draw stream seeded from a `(root seed, label path)` pair.
///
/// The stream itself is a SplitMix64 sequence; the struct additionally
/// remembers its derivation seed so [`DrawStream::split`] can mint child
/// streams that are independent of how many draws the parent has consumed.
#[derive(Clone, Debug)]
pub struct DrawStream {
    seed: u64,
    state: u64,
}

impl DrawStream {
    /// Creates the root stream for a seed.
    #[must_use]
    pub fn from_seed(seed: u64) -> Self {
        // A zero state would fix the first SplitMix64 output; substitute the
        // golden gamma like the generator constant itself.
        let state = if seed == 0 { SPLITMIX_GAMMA } else { seed };
        Self { seed, state }
    }

    /// Creates an independent child stream for the provided label.
    ///
    /// Splitting reads only the stream's derivation seed, never its draw
    /// position, so sibling streams cannot couple through draw order.
    #[must_use]
    pub fn split(&self, label: &str) -> Self {
        Self::from_seed(derive_seed(self.seed, label))
    }

    /// Seed this stream was derived with.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(SPLITMIX_GAMMA);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
        z ^ (z >> 31)
    }

    /// Draws a uniform value in `[0, 1)` with 53 bits of precision.
    #[must_use]
    pub fn unit(&mut self) -> f32 {
        const SCALE: f64 = 1.0 / ((1u64 << 53) as f64);
        let value = self.next_u64() >> 11;
        ((value as f64) * SCALE) as f32
    }

    /// Draws a uniform value in `[lo, hi)`.
    #[must_use]
    pub fn uniform(&mut self, lo: f32, hi: f32) -> f32 {
        lo + (hi - lo) * self.unit()
    }

    /// Draws `true` with probability `p`.
    #[must_use]
    pub fn chance(&mut self, p: f32) -> bool {
        self.unit() < p
    }

    /// Draws a uniform integer in the inclusive range `[lo, hi]`.
    ///
    /// # Panics
    ///
    /// Panics when `lo > hi`; an inverted range is a caller bug.
    #[must_use]
    pub fn int_in(&mut self, lo: u32, hi: u32) -> u32 {
        assert!(lo <= hi, "int_in() requires lo <= hi, got {lo} > {hi}");
        if lo == hi {
            return lo;
        }

        let span = u64::from(hi - lo) + 1;
        let offset = self.next_u64() % span;
        lo + offset as u32
    }

    /// Draws one element of `items` uniformly.
    ///
    /// # Panics
    ///
    /// Panics when `items` is empty; callers own the non-empty guarantee.
    #[must_use]
    pub fn choice<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        assert!(!items.is_empty(), "choice() on empty slice");
        let index = self.int_in(0, (items.len() - 1) as u32) as usize;
        &items[index]
    }

    /// Draws `k` distinct elements of `items` without replacement.
    ///
    /// The result preserves the draw order, not the input order.
    ///
    /// # Panics
    ///
    /// Panics when `k` exceeds `items.len()`.
    #[must_use]
    pub fn sample<T: Clone>(&mut self, items: &[T], k: usize) -> Vec<T> {
        assert!(
            k <= items.len(),
            "sample() requires k <= len, got k={k} len={}",
            items.len()
        );

        let mut indices: Vec<usize> = (0..items.len()).collect();
        for i in 0..k {
            let j = i + self.int_in(0, (items.len() - 1 - i) as u32) as usize;
            indices.swap(i, j);
        }
        indices[..k].iter().map(|i| items[*i].clone()).collect()
    }

    /// Returns a new vector holding a uniform permutation of `items`.
    #[must_use]
    pub fn shuffle<T: Clone>(&mut self, items: &[T]) -> Vec<T> {
        self.sample(items, items.len())
    }
}
