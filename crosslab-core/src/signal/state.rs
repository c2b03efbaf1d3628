//! Per-bar signal state and crossover detection.

use serde::{Deserialize, Serialize};

use crate::indicators::IndicatorPoint;

/// Trend state implied by one bar's two averages. Carries no memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignalState {
    Flat,
    Bullish,
    Bearish,
}

impl SignalState {
    /// Bullish iff fast > slow, Bearish iff fast < slow, Flat on a tie or
    /// while either average is still warming up.
    pub fn from_averages(fast: Option<f64>, slow: Option<f64>) -> Self {
        match (fast, slow) {
            (Some(f), Some(s)) if f > s => SignalState::Bullish,
            (Some(f), Some(s)) if f < s => SignalState::Bearish,
            _ => SignalState::Flat,
        }
    }

    pub fn from_point(point: &IndicatorPoint) -> Self {
        Self::from_averages(point.fast_avg, point.slow_avg)
    }
}

/// A change of [`SignalState`] between two consecutive bars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CrossoverEvent {
    EnterBullish,
    EnterBearish,
    NoChange,
}

impl CrossoverEvent {
    /// Compare by state identity: any non-Bullish → Bullish step fires
    /// EnterBullish, including a direct Bearish → Bullish jump.
    pub fn between(previous: SignalState, current: SignalState) -> Self {
        match current {
            SignalState::Bullish if previous != SignalState::Bullish => {
                CrossoverEvent::EnterBullish
            }
            SignalState::Bearish if previous != SignalState::Bearish => {
                CrossoverEvent::EnterBearish
            }
            _ => CrossoverEvent::NoChange,
        }
    }
}

/// One event per point. The first point has no predecessor and is always
/// `NoChange`.
pub fn detect_crossovers(points: &[IndicatorPoint]) -> Vec<CrossoverEvent> {
    let states: Vec<SignalState> = points.iter().map(SignalState::from_point).collect();

    std::iter::once(CrossoverEvent::NoChange)
        .take(states.len())
        .chain(
            states
                .windows(2)
                .map(|pair| CrossoverEvent::between(pair[0], pair[1])),
        )
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, Utc};

    fn points(pairs: &[(Option<f64>, Option<f64>)]) -> Vec<IndicatorPoint> {
        let base = DateTime::from_timestamp(1_704_067_200, 0).unwrap();
        pairs
            .iter()
            .enumerate()
            .map(|(i, &(fast_avg, slow_avg))| IndicatorPoint {
                timestamp: base + Duration::hours(i as i64),
                fast_avg,
                slow_avg,
            })
            .collect()
    }

    #[test]
    fn state_from_averages() {
        assert_eq!(
            SignalState::from_averages(Some(2.0), Some(1.0)),
            SignalState::Bullish
        );
        assert_eq!(
            SignalState::from_averages(Some(1.0), Some(2.0)),
            SignalState::Bearish
        );
        assert_eq!(
            SignalState::from_averages(Some(1.5), Some(1.5)),
            SignalState::Flat
        );
        assert_eq!(SignalState::from_averages(None, Some(1.0)), SignalState::Flat);
        assert_eq!(SignalState::from_averages(Some(1.0), None), SignalState::Flat);
    }

    #[test]
    fn event_table() {
        use CrossoverEvent::*;
        use SignalState::*;

        let cases = [
            (Flat, Flat, NoChange),
            (Flat, Bullish, EnterBullish),
            (Flat, Bearish, EnterBearish),
            (Bullish, Bullish, NoChange),
            (Bullish, Flat, NoChange),
            (Bullish, Bearish, EnterBearish),
            (Bearish, Bearish, NoChange),
            (Bearish, Flat, NoChange),
            (Bearish, Bullish, EnterBullish),
        ];
        for (prev, cur, expected) in cases {
            assert_eq!(
                CrossoverEvent::between(prev, cur),
                expected,
                "{prev:?} -> {cur:?}"
            );
        }
    }

    #[test]
    fn first_event_is_always_no_change() {
        let events = detect_crossovers(&points(&[(Some(2.0), Some(1.0)), (Some(2.0), Some(1.0))]));
        assert_eq!(events, vec![CrossoverEvent::NoChange, CrossoverEvent::NoChange]);
    }

    #[test]
    fn empty_and_single_inputs() {
        assert!(detect_crossovers(&[]).is_empty());
        assert_eq!(
            detect_crossovers(&points(&[(Some(2.0), Some(1.0))])),
            vec![CrossoverEvent::NoChange]
        );
    }

    #[test]
    fn warmup_to_bullish_fires() {
        let events = detect_crossovers(&points(&[
            (Some(1.0), None),
            (Some(2.0), Some(1.0)),
            (Some(3.0), Some(1.0)),
        ]));
        assert_eq!(
            events,
            vec![
                CrossoverEvent::NoChange,
                CrossoverEvent::EnterBullish,
                CrossoverEvent::NoChange
            ]
        );
    }

    #[test]
    fn direct_reversal_without_flat_bar() {
        let events = detect_crossovers(&points(&[
            (Some(1.0), Some(2.0)),
            (Some(3.0), Some(2.0)),
            (Some(1.0), Some(2.0)),
        ]));
        assert_eq!(
            events,
            vec![
                CrossoverEvent::NoChange,
                CrossoverEvent::EnterBullish,
                CrossoverEvent::EnterBearish
            ]
        );
    }

    #[test]
    fn tie_bar_is_flat_and_silent() {
        let events = detect_crossovers(&points(&[
            (Some(1.0), Some(2.0)),
            (Some(2.0), Some(2.0)),
            (Some(1.0), Some(2.0)),
        ]));
        // Bearish → Flat → Bearish: the tie fires nothing, the return to
        // Bearish re-fires EnterBearish.
        assert_eq!(
            events,
            vec![
                CrossoverEvent::NoChange,
                CrossoverEvent::NoChange,
                CrossoverEvent::EnterBearish
            ]
        );
    }
}
