use alloc::vec::Vec;

use crate::Error;

/// Every slot empty: `0b10` repeated across the word.
const ALL_EMPTY: u32 = 0xaaaa_aaaa;

const EMPTY_BIT: u32 = 0b10;
const DELETED_BIT: u32 = 0b01;

#[inline(always)]
fn word_count(capacity: usize) -> usize {
    capacity.div_ceil(16)
}

#[inline(always)]
fn shift(index: usize) -> u32 {
    ((index & 0xf) << 1) as u32
}

/// Packed slot states, two bits per slot, sixteen slots per `u32` word.
///
/// The high bit of each pair marks an empty slot and the low bit a deleted
/// one. A slot with neither bit set is live.
#[derive(Clone)]
pub(crate) struct FlagVec {
    words: Vec<u32>,
}

impl FlagVec {
    pub(crate) const fn new() -> Self {
        Self { words: Vec::new() }
    }

    /// Allocates flags for `capacity` slots, all empty.
    pub(crate) fn try_new(capacity: usize) -> Result<Self, Error> {
        let count = word_count(capacity);
        let mut words = Vec::new();
        words
            .try_reserve_exact(count)
            .map_err(Error::alloc(capacity))?;
        words.resize(count, ALL_EMPTY);
        Ok(Self { words })
    }

    #[inline(always)]
    fn bits(&self, index: usize) -> u32 {
        (self.words[index >> 4] >> shift(index)) & 0b11
    }

    #[inline(always)]
    pub(crate) fn is_empty(&self, index: usize) -> bool {
        self.bits(index) & EMPTY_BIT != 0
    }

    #[inline(always)]
    pub(crate) fn is_deleted(&self, index: usize) -> bool {
        self.bits(index) & DELETED_BIT != 0
    }

    #[inline(always)]
    pub(crate) fn is_live(&self, index: usize) -> bool {
        self.bits(index) == 0
    }

    #[inline(always)]
    pub(crate) fn mark_live(&mut self, index: usize) {
        self.words[index >> 4] &= !((EMPTY_BIT | DELETED_BIT) << shift(index));
    }

    #[inline(always)]
    pub(crate) fn mark_deleted(&mut self, index: usize) {
        self.words[index >> 4] |= DELETED_BIT << shift(index);
    }

    /// Marks every slot empty without touching the allocation.
    pub(crate) fn reset(&mut self) {
        self.words.fill(ALL_EMPTY);
    }

    #[cfg(test)]
    pub(crate) fn words(&self) -> usize {
        self.words.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_vector_is_all_empty() {
        let flags = FlagVec::try_new(40).unwrap();
        assert_eq!(flags.words(), 3);
        for i in 0..48 {
            assert!(flags.is_empty(i));
            assert!(!flags.is_deleted(i));
            assert!(!flags.is_live(i));
        }
    }

    #[test]
    fn zero_capacity_has_no_words() {
        let flags = FlagVec::try_new(0).unwrap();
        assert_eq!(flags.words(), 0);
    }

    #[test]
    fn live_then_deleted() {
        let mut flags = FlagVec::try_new(32).unwrap();
        flags.mark_live(17);
        assert!(flags.is_live(17));
        assert!(!flags.is_empty(17));
        assert!(!flags.is_deleted(17));

        flags.mark_deleted(17);
        assert!(flags.is_deleted(17));
        assert!(!flags.is_empty(17));
        assert!(!flags.is_live(17));

        flags.mark_live(17);
        assert!(flags.is_live(17));
    }

    #[test]
    fn neighbours_are_untouched() {
        let mut flags = FlagVec::try_new(32).unwrap();
        flags.mark_live(15);
        flags.mark_deleted(16);
        assert!(flags.is_empty(14));
        assert!(flags.is_live(15));
        assert!(flags.is_deleted(16));
        assert!(flags.is_empty(17));
    }

    #[test]
    fn reset_restores_empty() {
        let mut flags = FlagVec::try_new(16).unwrap();
        for i in 0..16 {
            flags.mark_live(i);
        }
        flags.mark_deleted(3);
        flags.reset();
        assert!((0..16).all(|i| flags.is_empty(i)));
    }
}
