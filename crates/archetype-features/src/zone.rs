// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

//! Location tendencies split by batter side.

use archetype_core::{Handedness, RawEvent, ZoneProfile};

/// Half the plate width plus a ball radius, in feet.
const HALF_PLATE_FT: f64 = 0.83;
const HEART_SCALE: f64 = 0.67;
const SHADOW_SCALE: f64 = 1.33;
const DEFAULT_SZ_TOP: f64 = 3.5;
const DEFAULT_SZ_BOT: f64 = 1.5;

/// Same-side and opposite-side profiles plus their platoon deltas.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LocationSummary {
    pub same_side: ZoneProfile,
    pub opposite_side: ZoneProfile,
    pub platoon_lateral_shift: f64,
    pub platoon_height_shift: f64,
    pub entropy_shift: f64,
}

impl Default for LocationSummary {
    fn default() -> Self {
        Self::from_profiles(ZoneProfile::NEUTRAL, ZoneProfile::NEUTRAL)
    }
}

impl LocationSummary {
    fn from_profiles(same_side: ZoneProfile, opposite_side: ZoneProfile) -> Self {
        Self {
            platoon_lateral_shift: (same_side.arm_side_rate - opposite_side.arm_side_rate).abs(),
            platoon_height_shift: (same_side.up_rate - opposite_side.up_rate).abs(),
            entropy_shift: opposite_side.location_entropy - same_side.location_entropy,
            same_side,
            opposite_side,
        }
    }
}

#[derive(Default)]
struct ZoneCounter {
    located: usize,
    up: usize,
    arm_side: usize,
    heart: usize,
    edge: usize,
    grid: [usize; 9],
}

impl ZoneCounter {
    fn push(&mut self, event: &RawEvent) {
        let (Some(x), Some(z)) = (event.plate_x, event.plate_z) else {
            return;
        };
        if !x.is_finite() || !z.is_finite() {
            return;
        }
        let top = event.sz_top.filter(|v| v.is_finite()).unwrap_or(DEFAULT_SZ_TOP);
        let bot = event.sz_bot.filter(|v| v.is_finite()).unwrap_or(DEFAULT_SZ_BOT);
        let mid = (top + bot) / 2.0;
        let half_height = ((top - bot) / 2.0).max(f64::EPSILON);

        // Catcher's view: a right-hander's arm side is negative x.
        let arm_x = match event.p_throws {
            Handedness::Right => -x,
            Handedness::Left => x,
        };
        let dx = x.abs() / HALF_PLATE_FT;
        let dz = (z - mid).abs() / half_height;

        self.located += 1;
        if z > mid {
            self.up += 1;
        }
        if arm_x > 0.0 {
            self.arm_side += 1;
        }
        if dx <= HEART_SCALE && dz <= HEART_SCALE {
            self.heart += 1;
        } else if dx <= SHADOW_SCALE && dz <= SHADOW_SCALE {
            self.edge += 1;
        }
        let col = grid_bin((x + HALF_PLATE_FT) / (2.0 * HALF_PLATE_FT));
        let row = grid_bin((z - bot) / (top - bot).max(f64::EPSILON));
        self.grid[row * 3 + col] += 1;
    }

    fn merge(&mut self, other: &ZoneCounter) {
        self.located += other.located;
        self.up += other.up;
        self.arm_side += other.arm_side;
        self.heart += other.heart;
        self.edge += other.edge;
        for (cell, count) in self.grid.iter_mut().zip(other.grid) {
            *cell += count;
        }
    }

    fn profile(&self) -> ZoneProfile {
        if self.located == 0 {
            return ZoneProfile::NEUTRAL;
        }
        let n = self.located as f64;
        ZoneProfile {
            up_rate: self.up as f64 / n,
            arm_side_rate: self.arm_side as f64 / n,
            heart_rate: self.heart as f64 / n,
            edge_rate: self.edge as f64 / n,
            location_entropy: shannon_entropy_bits(&self.grid),
        }
    }
}

/// Maps a unit-interval coordinate onto one of three bins, clamping outliers.
fn grid_bin(unit: f64) -> usize {
    if unit < 1.0 / 3.0 {
        0
    } else if unit < 2.0 / 3.0 {
        1
    } else {
        2
    }
}

fn shannon_entropy_bits(counts: &[usize]) -> f64 {
    let total: usize = counts.iter().sum();
    if total == 0 {
        return 0.0;
    }
    let total = total as f64;
    counts
        .iter()
        .filter(|&&count| count > 0)
        .map(|&count| {
            let p = count as f64 / total;
            -p * p.log2()
        })
        .sum()
}

/// Summarizes located pitches by batter side.
///
/// A side with fewer than `min_per_side` located pitches takes the overall
/// profile for all five metrics. Events without a batter side only feed the
/// overall profile.
pub fn summarize_locations<'a, I>(events: I, min_per_side: usize) -> LocationSummary
where
    I: IntoIterator<Item = &'a RawEvent>,
{
    let mut same = ZoneCounter::default();
    let mut opposite = ZoneCounter::default();
    let mut unsided = ZoneCounter::default();
    for event in events {
        match event.same_side() {
            Some(true) => same.push(event),
            Some(false) => opposite.push(event),
            None => unsided.push(event),
        }
    }

    let mut overall = ZoneCounter::default();
    overall.merge(&same);
    overall.merge(&opposite);
    overall.merge(&unsided);
    let overall_profile = overall.profile();

    let pick = |counter: &ZoneCounter| {
        if counter.located < min_per_side {
            overall_profile
        } else {
            counter.profile()
        }
    };
    LocationSummary::from_profiles(pick(&same), pick(&opposite))
}

#[cfg(test)]
mod tests {
    use super::{LocationSummary, shannon_entropy_bits, summarize_locations};
    use archetype_core::{Handedness, RawEvent, ZoneProfile};

    fn located(throws: Handedness, stand: Handedness, x: f64, z: f64) -> RawEvent {
        let mut event = RawEvent::new(1, 2024, throws);
        event.stand = Some(stand);
        event.plate_x = Some(x);
        event.plate_z = Some(z);
        event.sz_top = Some(3.5);
        event.sz_bot = Some(1.5);
        event
    }

    #[test]
    fn entropy_of_uniform_grid_is_log2_nine() {
        assert!((shannon_entropy_bits(&[4; 9]) - 9f64.log2()).abs() < 1e-12);
        assert_eq!(shannon_entropy_bits(&[0, 7, 0, 0, 0, 0, 0, 0, 0]), 0.0);
        assert_eq!(shannon_entropy_bits(&[0; 9]), 0.0);
    }

    #[test]
    fn no_located_pitches_yields_neutral_profiles() {
        let summary = summarize_locations(&[RawEvent::new(1, 2024, Handedness::Left)], 1);
        assert_eq!(summary, LocationSummary::default());
        assert_eq!(summary.same_side, ZoneProfile::NEUTRAL);
        assert_eq!(summary.entropy_shift, 0.0);
    }

    #[test]
    fn sides_split_and_shift() {
        let mut events = Vec::new();
        // Same side: all high and to a right-hander's arm side.
        for _ in 0..10 {
            events.push(located(Handedness::Right, Handedness::Right, -0.5, 3.2));
        }
        // Opposite side: all low and glove side.
        for _ in 0..10 {
            events.push(located(Handedness::Right, Handedness::Left, 0.5, 1.8));
        }
        let summary = summarize_locations(&events, 5);
        assert_eq!(summary.same_side.up_rate, 1.0);
        assert_eq!(summary.same_side.arm_side_rate, 1.0);
        assert_eq!(summary.opposite_side.up_rate, 0.0);
        assert_eq!(summary.opposite_side.arm_side_rate, 0.0);
        assert_eq!(summary.platoon_lateral_shift, 1.0);
        assert_eq!(summary.platoon_height_shift, 1.0);
        assert_eq!(summary.same_side.location_entropy, 0.0);
    }

    #[test]
    fn thin_side_falls_back_to_overall() {
        let mut events = Vec::new();
        for _ in 0..20 {
            events.push(located(Handedness::Left, Handedness::Right, 0.0, 2.5));
        }
        events.push(located(Handedness::Left, Handedness::Left, 0.7, 3.4));
        let summary = summarize_locations(&events, 10);
        let overall_up = 1.0 / 21.0;
        assert!((summary.same_side.up_rate - overall_up).abs() < 1e-12);
        assert_eq!(summary.opposite_side.up_rate, 0.0);
        assert_eq!(summary.opposite_side.heart_rate, 1.0);
    }

    #[test]
    fn heart_and_edge_are_disjoint() {
        let events = vec![
            located(Handedness::Right, Handedness::Right, 0.0, 2.5),
            located(Handedness::Right, Handedness::Right, 0.75, 2.5),
            located(Handedness::Right, Handedness::Right, 2.0, 2.5),
        ];
        let summary = summarize_locations(&events, 1);
        let profile = summary.same_side;
        assert!((profile.heart_rate - 1.0 / 3.0).abs() < 1e-12);
        assert!((profile.edge_rate - 1.0 / 3.0).abs() < 1e-12);
    }
}
