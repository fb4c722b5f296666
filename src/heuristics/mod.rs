pub mod tone;
pub mod zero_tolerance;

pub use tone::*;
pub use zero_tolerance::*;

use tracing::info;

use crate::models::SegmentCandidate;

/// Configuration for the deterministic candidate transforms
#[derive(Debug, Clone)]
pub struct HeuristicsConfig {
    /// Fact strings that stand in for missing data (compared case-insensitively)
    pub placeholder_markers: Vec<String>,
    /// Tone assumed before the first candidate
    pub neutral_tone: u8,
    /// Largest allowed tone change between consecutive segments
    pub max_tone_step: u8,
}

impl Default for HeuristicsConfig {
    fn default() -> Self {
        Self {
            placeholder_markers: vec![
                "N/A".to_string(),
                "NOT_AVAILABLE".to_string(),
                "NOT AVAILABLE".to_string(),
            ],
            neutral_tone: 3,
            max_tone_step: 2,
        }
    }
}

/// Result of shaping a candidate list
#[derive(Debug, Clone)]
pub struct HeuristicsResult {
    /// Surviving candidates, smoothed, in their original order
    pub candidates: Vec<SegmentCandidate>,
    /// Number of candidates removed for lack of grounding
    pub dropped: usize,
    /// Number of tone levels that had to be clamped
    pub tones_clamped: usize,
}

/// Shape raw candidates for allocation.
///
/// Filtering runs before smoothing so dropped candidates never influence
/// the tone gradient.
pub fn apply_heuristics(
    candidates: Vec<SegmentCandidate>,
    config: &HeuristicsConfig,
) -> HeuristicsResult {
    let proposed = candidates.len();

    let grounded = apply_zero_tolerance(candidates, &config.placeholder_markers);
    let dropped = proposed - grounded.len();

    let smoothed = smooth_tones(grounded, config.neutral_tone, config.max_tone_step);

    info!(
        "Heuristics: {} of {} candidates kept, {} tones clamped",
        smoothed.candidates.len(),
        proposed,
        smoothed.clamped
    );

    HeuristicsResult {
        candidates: smoothed.candidates,
        dropped,
        tones_clamped: smoothed.clamped,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dropped_candidates_do_not_shape_tones() {
        // The ungrounded tone-5 candidate would otherwise pull the next one up
        let candidates = vec![
            SegmentCandidate::new("Stakes", 80, 3).with_facts(["A vs B"]),
            SegmentCandidate::new("Lineups", 70, 5).with_facts(["N/A"]),
            SegmentCandidate::new("Stats", 60, 1).with_facts(["Shots: 12-4"]),
        ];

        let result = apply_heuristics(candidates, &HeuristicsConfig::default());

        assert_eq!(result.dropped, 1);
        assert_eq!(result.candidates.len(), 2);
        assert_eq!(result.candidates[1].topic, "Stats");
        assert_eq!(result.candidates[1].tone_level, 1);
        assert_eq!(result.tones_clamped, 0);
    }
}
