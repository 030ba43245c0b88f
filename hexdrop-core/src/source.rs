//! Deterministic piece source

/// Linear congruential generator used to expand a seed into a piece sequence
#[derive(Clone, Debug)]
pub struct SourceRng {
    state: u32,
}

impl SourceRng {
    const MULTIPLIER: u32 = 1103515245;
    const INCREMENT: u32 = 12345;

    pub fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    /// Bits 16..30 of the current state, then advance
    pub fn next_value(&mut self) -> u32 {
        let value = (self.state >> 16) & 0x7FFF;
        self.state = self
            .state
            .wrapping_mul(Self::MULTIPLIER)
            .wrapping_add(Self::INCREMENT);
        value
    }
}

impl Iterator for SourceRng {
    type Item = u32;

    fn next(&mut self) -> Option<u32> {
        Some(self.next_value())
    }
}

/// Unit indices for a game of `length` pieces drawn from `unit_count` shapes
pub fn piece_sequence(seed: u32, length: usize, unit_count: usize) -> Vec<usize> {
    if unit_count == 0 {
        return Vec::new();
    }
    SourceRng::new(seed)
        .take(length)
        .map(|value| value as usize % unit_count)
        .collect()
}
