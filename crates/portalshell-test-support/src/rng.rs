//! Test RNG: deterministic `DeterministicRng` implementations for tests.

use portalshell_core::rng::DeterministicRng;

/// An RNG that steps through its range one value per draw. Portal ids drawn
/// from it are distinct for the first 36 frames, which is all a unit test
/// needs.
#[derive(Debug, Default)]
pub struct MockRng {
    step: u32,
}

impl DeterministicRng for MockRng {
    fn next_u32_range(&mut self, min: u32, max: u32) -> u32 {
        let value = min + self.step % (max - min + 1);
        self.step = self.step.wrapping_add(1);
        value
    }
}

/// An RNG that returns values from a predetermined sequence. Panics if the
/// sequence is exhausted. Used in tests that need specific portal ids, e.g.
/// to force an id collision.
#[derive(Debug)]
pub struct SequenceRng {
    values: Vec<u32>,
    index: usize,
}

impl SequenceRng {
    /// Create a new `SequenceRng` with the given values.
    #[must_use]
    pub fn new(values: Vec<u32>) -> Self {
        Self { values, index: 0 }
    }

    /// A sequence that yields one portal id per entry in `digits`, each id
    /// made of a single repeated base-36 digit.
    #[must_use]
    pub fn repeating_ids(digits: &[u32]) -> Self {
        let values = digits
            .iter()
            .flat_map(|d| std::iter::repeat_n(*d, portalshell_core::ids::PORTAL_ID_LEN))
            .collect();
        Self::new(values)
    }
}

impl DeterministicRng for SequenceRng {
    fn next_u32_range(&mut self, _min: u32, _max: u32) -> u32 {
        let val = self.values[self.index];
        self.index += 1;
        val
    }
}
