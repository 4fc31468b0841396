use std::fmt;

use serde::{Deserialize, Serialize};

/// Hours after the simulation start.
///
/// Steps are 3 h apart up to +72 h and 6 h apart after that; the forecast
/// horizon ends at +240 h, so the last pair starts at +234 h.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimeOffset(pub u32);

impl TimeOffset {
    pub const START: TimeOffset = TimeOffset(0);
    /// Last offset that still has a successor step.
    pub const LAST: TimeOffset = TimeOffset(234);

    const FINE_STEP: u32 = 3;
    const COARSE_STEP: u32 = 6;
    const FINE_UNTIL: u32 = 72;

    pub fn hours(self) -> u32 {
        self.0
    }

    /// The t1 offset compared against `self` as t0.
    pub fn paired(self) -> TimeOffset {
        TimeOffset(self.0.saturating_add(Self::forward_step(self.0)))
    }

    /// Next t0, or `None` at the end of the horizon.
    pub fn next_step(self) -> Option<TimeOffset> {
        (self < Self::LAST).then(|| self.paired())
    }

    /// Previous t0, or `None` at the start.
    pub fn previous_step(self) -> Option<TimeOffset> {
        if self.0 == 0 {
            return None;
        }
        // From +78 h downwards the previous pair is 3 h back again.
        let step = if self.0 < Self::FINE_UNTIL + Self::COARSE_STEP {
            Self::FINE_STEP
        } else {
            Self::COARSE_STEP
        };
        Some(TimeOffset(self.0.saturating_sub(step)))
    }

    pub fn has_previous(self) -> bool {
        self.0 > 0
    }

    pub fn has_next(self) -> bool {
        self < Self::LAST
    }

    fn forward_step(hours: u32) -> u32 {
        if hours < Self::FINE_UNTIL {
            Self::FINE_STEP
        } else {
            Self::COARSE_STEP
        }
    }
}

impl fmt::Display for TimeOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "+{}h", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::TimeOffset;

    #[test]
    fn pairs_use_fine_then_coarse_steps() {
        assert_eq!(TimeOffset(0).paired(), TimeOffset(3));
        assert_eq!(TimeOffset(69).paired(), TimeOffset(72));
        assert_eq!(TimeOffset(72).paired(), TimeOffset(78));
        assert_eq!(TimeOffset(234).paired(), TimeOffset(240));
    }

    #[test]
    fn stepping_forward_stops_at_horizon() {
        assert_eq!(TimeOffset(0).next_step(), Some(TimeOffset(3)));
        assert_eq!(TimeOffset(72).next_step(), Some(TimeOffset(78)));
        assert_eq!(TimeOffset(234).next_step(), None);
        assert!(!TimeOffset::LAST.has_next());
    }

    #[test]
    fn stepping_back_mirrors_forward_steps() {
        assert_eq!(TimeOffset(0).previous_step(), None);
        assert_eq!(TimeOffset(3).previous_step(), Some(TimeOffset(0)));
        assert_eq!(TimeOffset(75).previous_step(), Some(TimeOffset(72)));
        assert_eq!(TimeOffset(78).previous_step(), Some(TimeOffset(72)));
        assert_eq!(TimeOffset(84).previous_step(), Some(TimeOffset(78)));

        let mut t = TimeOffset::START;
        while let Some(next) = t.next_step() {
            assert_eq!(next.previous_step(), Some(t));
            t = next;
        }
        assert_eq!(t, TimeOffset::LAST);
    }

    #[test]
    fn offsets_past_the_horizon_do_not_overflow() {
        let far = TimeOffset(u32::MAX - 1);
        assert_eq!(far.paired(), TimeOffset(u32::MAX));
        assert_eq!(far.next_step(), None);
        assert!(far.has_previous());
    }

    #[test]
    fn displays_as_hour_offset() {
        assert_eq!(TimeOffset(12).to_string(), "+12h");
    }
}
