use std::fmt;

/// Per-instance bit set over load-group or dirty indices.
///
/// Word `g` covers indices `[64g, 64g + 64)`. The number of words is fixed
/// when the mask is created from the owning type's index count and never
/// changes afterwards, so a given index always lands in the same word.
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct Mask {
    words: Box<[u64]>,
}

impl Mask {
    /// Number of bits in one mask word.
    pub const WORD_BITS: usize = 64;

    /// Creates an empty mask able to hold `len` indices.
    pub fn new(len: usize) -> Mask {
        let words = len.div_ceil(Self::WORD_BITS).max(1);

        Mask {
            words: vec![0; words].into_boxed_slice(),
        }
    }

    /// Creates a mask with every index in `[0, len)` set.
    pub fn full(len: usize) -> Mask {
        let mut mask = Mask::new(len);
        for index in 0..len {
            mask.set(index);
        }
        mask
    }

    /// The bit selecting `index` within its word, if the index falls into
    /// `group`. Mirrors how generated code builds per-group creation masks.
    pub fn group_bit(group: usize, index: usize) -> u64 {
        let (word, bit) = split(index);

        if word == group {
            1 << bit
        } else {
            0
        }
    }

    pub fn word_count(&self) -> usize {
        self.words.len()
    }

    pub fn word(&self, group: usize) -> u64 {
        self.words.get(group).copied().unwrap_or(0)
    }

    pub fn get(&self, index: usize) -> bool {
        let (word, bit) = split(index);
        self.word(word) & (1 << bit) != 0
    }

    #[track_caller]
    pub fn set(&mut self, index: usize) {
        let (word, bit) = split(index);
        assert!(
            word < self.words.len(),
            "mask index {index} out of range ({} words)",
            self.words.len()
        );
        self.words[word] |= 1 << bit;
    }

    pub fn unset(&mut self, index: usize) {
        let (word, bit) = split(index);
        if let Some(word) = self.words.get_mut(word) {
            *word &= !(1 << bit);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|word| *word == 0)
    }

    pub fn clear(&mut self) {
        self.words.iter_mut().for_each(|word| *word = 0);
    }

    /// Iterates the set indices in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.words.iter().enumerate().flat_map(|(group, word)| {
            (0..Self::WORD_BITS)
                .filter(move |bit| word & (1 << bit) != 0)
                .map(move |bit| group * Self::WORD_BITS + bit)
        })
    }
}

fn split(index: usize) -> (usize, usize) {
    (index / Mask::WORD_BITS, index % Mask::WORD_BITS)
}

impl fmt::Debug for Mask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}
