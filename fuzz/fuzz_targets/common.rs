// SPDX-License-Identifier: MIT OR Apache-2.0

/// Reads fuzz bytes front to back, yielding zeros once exhausted.
pub struct ByteCursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteCursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub fn next_u8(&mut self) -> u8 {
        let value = self.data.get(self.pos).copied().unwrap_or(0);
        self.pos = self.pos.saturating_add(1);
        value
    }

    pub fn next_i16(&mut self) -> i16 {
        i16::from_le_bytes([self.next_u8(), self.next_u8()])
    }

    pub fn is_exhausted(&self) -> bool {
        self.pos >= self.data.len()
    }
}

/// Maps a byte onto `[lo, hi]`.
pub fn bounded(seed: u8, lo: usize, hi: usize) -> usize {
    if hi <= lo {
        return lo;
    }
    lo + usize::from(seed) % (hi - lo + 1)
}

/// Finite values most of the time, with the occasional hostile one.
pub fn measurement(mode: u8, raw: i16, scale: f64) -> Option<f64> {
    match mode % 9 {
        0 => None,
        1 => Some(f64::NAN),
        2 => Some(f64::INFINITY),
        3 => Some(0.0),
        _ => Some(f64::from(raw) / scale),
    }
}
