/*
Drum Patterns
=============

A pattern is one or more bars of sixteenth-note steps with three lanes: kick, snare
and hi-hat. Each lane is a row of on/off flags and all lanes have the same
length, so step `i` means the same moment in every lane. A pattern holds at
least one full bar (16 steps) and at most four.

    step   0 1 2 3 4 5 6 7 8 9 A B C D E F
    kick   x . . . . . . . x . x . . . . .
    snare  . . . . x . . . . . . . x . . .
    hihat  x . x . x . x . x . x . x . x .

The grid strings above are also what `from_strings` accepts: `x` or `X` is a
hit, `.` or `-` is a rest, and spaces are ignored so long bars can be grouped
by beat ("x... x... x... x...").

Patterns are values. The sequencer plays an `Arc<DrumPattern>` snapshot, and
edits build a new pattern instead of mutating the one being played.
*/

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::Instrument;
use crate::EngineError;

pub const DEFAULT_PATTERN_STEPS: usize = 16;
pub const MAX_PATTERN_STEPS: usize = 64;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrumPattern {
    kick: Vec<bool>,
    snare: Vec<bool>,
    hihat: Vec<bool>,
}

impl DrumPattern {
    /// Build a pattern from three lanes. See [`validate`](Self::validate).
    pub fn new(kick: Vec<bool>, snare: Vec<bool>, hihat: Vec<bool>) -> Result<Self, EngineError> {
        let pattern = Self { kick, snare, hihat };
        pattern.validate()?;
        Ok(pattern)
    }

    /// All-rest pattern of `steps` steps.
    pub fn empty(steps: usize) -> Result<Self, EngineError> {
        Self::new(vec![false; steps], vec![false; steps], vec![false; steps])
    }

    /// Kick on the downbeat, hi-hat on every beat.
    pub fn metronome() -> Self {
        let steps = DEFAULT_PATTERN_STEPS;
        let mut kick = vec![false; steps];
        kick[0] = true;
        Self {
            kick,
            snare: vec![false; steps],
            hihat: (0..steps).map(|i| i % 4 == 0).collect(),
        }
    }

    pub fn from_strings(kick: &str, snare: &str, hihat: &str) -> Result<Self, EngineError> {
        Self::new(parse_lane(kick)?, parse_lane(snare)?, parse_lane(hihat)?)
    }

    /// Lanes must agree on length, and that length must fall within
    /// `DEFAULT_PATTERN_STEPS..=MAX_PATTERN_STEPS`.
    pub fn validate(&self) -> Result<(), EngineError> {
        let len = self.kick.len();
        if self.snare.len() != len || self.hihat.len() != len {
            return Err(EngineError::InvalidPattern(format!(
                "lane lengths differ: kick {}, snare {}, hihat {}",
                len,
                self.snare.len(),
                self.hihat.len()
            )));
        }
        if len < DEFAULT_PATTERN_STEPS {
            return Err(EngineError::InvalidPattern(format!(
                "{len} steps is shorter than the minimum of {DEFAULT_PATTERN_STEPS}"
            )));
        }
        if len > MAX_PATTERN_STEPS {
            return Err(EngineError::InvalidPattern(format!(
                "{len} steps exceeds the maximum of {MAX_PATTERN_STEPS}"
            )));
        }
        Ok(())
    }

    /// Number of steps in one cycle.
    pub fn len(&self) -> usize {
        self.kick.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kick.is_empty()
    }

    pub fn lane(&self, instrument: Instrument) -> &[bool] {
        match instrument {
            Instrument::Kick => &self.kick,
            Instrument::Snare => &self.snare,
            Instrument::Hihat => &self.hihat,
        }
    }

    /// Whether `instrument` plays on `step`. Steps wrap around the pattern.
    pub fn is_set(&self, instrument: Instrument, step: usize) -> bool {
        let lane = self.lane(instrument);
        !lane.is_empty() && lane[step % lane.len()]
    }

    /// Instruments that play on `step`.
    pub fn hits_at(&self, step: usize) -> impl Iterator<Item = Instrument> + '_ {
        Instrument::ALL
            .into_iter()
            .filter(move |instrument| self.is_set(*instrument, step))
    }

    /// Copy of this pattern with one step flipped.
    pub fn toggled(&self, instrument: Instrument, step: usize) -> Result<Self, EngineError> {
        if step >= self.len() {
            return Err(EngineError::InvalidPattern(format!(
                "step {step} is outside a {}-step pattern",
                self.len()
            )));
        }
        let mut next = self.clone();
        let lane = match instrument {
            Instrument::Kick => &mut next.kick,
            Instrument::Snare => &mut next.snare,
            Instrument::Hihat => &mut next.hihat,
        };
        lane[step] = !lane[step];
        Ok(next)
    }

    /// Render a lane back into grid notation.
    pub fn lane_string(&self, instrument: Instrument) -> String {
        self.lane(instrument)
            .iter()
            .map(|&on| if on { 'x' } else { '.' })
            .collect()
    }
}

fn parse_lane(lane: &str) -> Result<Vec<bool>, EngineError> {
    lane.chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| match c {
            'x' | 'X' => Ok(true),
            '.' | '-' => Ok(false),
            other => Err(EngineError::InvalidPattern(format!(
                "unexpected character {other:?} in lane"
            ))),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_strings_ignores_grouping() {
        let pattern = DrumPattern::from_strings(
            "x... .... x.x. ....",
            "....x.......x...",
            "x.x.x.x.x.x.x.x.",
        )
        .unwrap();
        assert_eq!(pattern.len(), 16);
        assert!(pattern.is_set(Instrument::Kick, 10));
        assert!(!pattern.is_set(Instrument::Kick, 11));
        assert_eq!(pattern.lane_string(Instrument::Snare), "....x.......x...");
    }

    #[test]
    fn test_mismatched_lanes_rejected() {
        let err = DrumPattern::from_strings(
            "x... .... .... ....",
            "x... .... .... .... x...",
            "x... .... .... ....",
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::InvalidPattern(_)));
    }

    #[test]
    fn test_empty_pattern_rejected() {
        assert!(DrumPattern::new(vec![], vec![], vec![]).is_err());
        assert!(DrumPattern::empty(0).is_err());
        assert!(DrumPattern::empty(MAX_PATTERN_STEPS + 1).is_err());
    }

    #[test]
    fn test_undersized_pattern_rejected() {
        let err = DrumPattern::from_strings("x", ".", "x").unwrap_err();
        assert!(matches!(err, EngineError::InvalidPattern(_)));
        assert!(DrumPattern::empty(DEFAULT_PATTERN_STEPS - 1).is_err());
        assert!(DrumPattern::empty(DEFAULT_PATTERN_STEPS).is_ok());
    }

    #[test]
    fn test_longer_bars_allowed() {
        let two_bars = DrumPattern::from_strings(
            "x... .... x... .... x... .... x.x. ....",
            ".... x... .... x... .... x... .... x..x",
            "x.x. x.x. x.x. x.x. x.x. x.x. x.x. x.x.",
        )
        .unwrap();
        assert_eq!(two_bars.len(), 32);
        assert!(two_bars.is_set(Instrument::Kick, 26));
        assert!(two_bars.is_set(Instrument::Kick, 32));
        assert!(DrumPattern::empty(MAX_PATTERN_STEPS).is_ok());
    }

    #[test]
    fn test_toggled_leaves_original_untouched() {
        let original = DrumPattern::empty(16).unwrap();
        let edited = original.toggled(Instrument::Snare, 4).unwrap();
        assert!(!original.is_set(Instrument::Snare, 4));
        assert!(edited.is_set(Instrument::Snare, 4));
        assert!(original.toggled(Instrument::Snare, 16).is_err());
    }

    #[test]
    fn test_hits_at_lists_set_lanes() {
        let pattern = DrumPattern::from_strings(
            "x.x. x.x. x.x. x.x.",
            "x.x. x.x. x.x. x.x.",
            ".x.x .x.x .x.x .x.x",
        )
        .unwrap();
        let hits: Vec<Instrument> = pattern.hits_at(0).collect();
        assert_eq!(hits, vec![Instrument::Kick, Instrument::Snare]);
        let hits: Vec<Instrument> = pattern.hits_at(19).collect();
        assert_eq!(hits, vec![Instrument::Hihat]);
    }
}
