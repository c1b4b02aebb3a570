// Triangular probing: offsets from the home slot grow by 1, 2, 3, ... so the
// n-th candidate sits n(n+1)/2 slots away. Over a power-of-two table the first
// `capacity` candidates are a permutation of every slot.

/// Returns the `attempt`-th candidate for a key whose home slot is `start`.
#[cfg(test)]
#[inline(always)]
pub(crate) fn position(start: usize, mask: usize, attempt: usize) -> usize {
    start.wrapping_add(attempt.wrapping_mul(attempt.wrapping_add(1)) / 2) & mask
}

/// Walks the candidate slots of one key, starting at its home slot.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Probe {
    pos: usize,
    step: usize,
    mask: usize,
}

impl Probe {
    #[inline(always)]
    pub(crate) fn start(hash: u32, mask: usize) -> Self {
        Probe {
            pos: hash as usize & mask,
            step: 0,
            mask,
        }
    }

    #[inline(always)]
    pub(crate) fn pos(&self) -> usize {
        self.pos
    }

    #[inline(always)]
    pub(crate) fn next(&mut self) {
        self.step += 1;
        self.pos = (self.pos + self.step) & self.mask;
    }

    #[cfg(any(test, feature = "stats"))]
    pub(crate) fn attempts(&self) -> usize {
        self.step
    }
}
