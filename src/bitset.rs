//! Dense index sets for states and transitions.
//!
//! Synthesis rounds repeatedly ask "is this transition still alive?" and "is this state
//! bad?". Both sets are indexed by arena position, so a word-packed bit set is enough.

/// Bit set backed by a vector of `u64` words. Grows on insert.
#[derive(Debug, Clone, Default)]
pub struct BitSet {
    words: Vec<u64>,
    /// Number of set bits, cached so that `len()` is O(1).
    count: usize,
}

impl BitSet {
    const BITS: usize = 64;

    /// Empty set with room for `capacity` indices.
    pub fn new(capacity: usize) -> Self {
        Self {
            words: vec![0; capacity.div_ceil(Self::BITS)],
            count: 0,
        }
    }

    /// Set containing every index in `0..n`.
    pub fn full(n: usize) -> Self {
        let mut words = vec![u64::MAX; n / Self::BITS];
        if n % Self::BITS != 0 {
            words.push((1u64 << (n % Self::BITS)) - 1);
        }
        Self { words, count: n }
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    #[inline]
    fn locate(index: usize) -> (usize, u64) {
        (index / Self::BITS, 1u64 << (index % Self::BITS))
    }

    #[inline]
    pub fn contains(&self, index: usize) -> bool {
        let (w, mask) = Self::locate(index);
        self.words.get(w).is_some_and(|word| word & mask != 0)
    }

    /// Returns `true` if `index` was not present.
    pub fn insert(&mut self, index: usize) -> bool {
        let (w, mask) = Self::locate(index);
        if w >= self.words.len() {
            self.words.resize(w + 1, 0);
        }
        let fresh = self.words[w] & mask == 0;
        if fresh {
            self.words[w] |= mask;
            self.count += 1;
        }
        fresh
    }

    /// Returns `true` if `index` was present.
    pub fn remove(&mut self, index: usize) -> bool {
        let (w, mask) = Self::locate(index);
        match self.words.get_mut(w) {
            Some(word) if *word & mask != 0 => {
                *word &= !mask;
                self.count -= 1;
                true
            }
            _ => false,
        }
    }

    /// In-place union. Returns the number of newly added indices.
    pub fn union_with(&mut self, other: &BitSet) -> usize {
        if other.words.len() > self.words.len() {
            self.words.resize(other.words.len(), 0);
        }
        let before = self.count;
        for (a, b) in self.words.iter_mut().zip(&other.words) {
            *a |= b;
        }
        self.count = self.words.iter().map(|w| w.count_ones() as usize).sum();
        self.count - before
    }

    pub fn extend(&mut self, indices: impl IntoIterator<Item = usize>) {
        for i in indices {
            self.insert(i);
        }
    }

    /// Set indices in increasing order.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            words: &self.words,
            word_idx: 0,
            current: self.words.first().copied().unwrap_or(0),
        }
    }
}

impl FromIterator<usize> for BitSet {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        let mut set = BitSet::default();
        set.extend(iter);
        set
    }
}

pub struct Iter<'a> {
    words: &'a [u64],
    word_idx: usize,
    current: u64,
}

impl Iterator for Iter<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        loop {
            if self.current != 0 {
                let bit = self.current.trailing_zeros() as usize;
                self.current &= self.current - 1;
                return Some(self.word_idx * BitSet::BITS + bit);
            }
            self.word_idx += 1;
            self.current = *self.words.get(self.word_idx)?;
        }
    }
}
