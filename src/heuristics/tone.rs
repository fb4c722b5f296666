use tracing::debug;

use crate::models::SegmentCandidate;

/// Result of tone smoothing
#[derive(Debug, Clone)]
pub struct ToneSmoothing {
    pub candidates: Vec<SegmentCandidate>,
    /// How many tone levels were clamped
    pub clamped: usize,
}

/// Clamp `tone` to within `max_step` of `previous`, moving toward the
/// requested value. Returns `None` when no clamp is needed.
pub fn clamp_tone(previous: u8, tone: u8, max_step: u8) -> Option<u8> {
    if previous.abs_diff(tone) <= max_step {
        return None;
    }
    if tone > previous {
        Some(previous.saturating_add(max_step))
    } else {
        Some(previous.saturating_sub(max_step))
    }
}

/// Cue attached when a tone had to be clamped
pub fn gradient_cue(previous: u8, adjusted: u8) -> String {
    format!(
        "Ease the energy gradually from tone level {} to {}",
        previous, adjusted
    )
}

/// Bound the tone change between consecutive candidates.
///
/// Candidates are walked in their given order; the narrative order is never
/// re-sorted. The running tone starts at `neutral_tone`. Every candidate after
/// the first leaves with a transition cue.
pub fn smooth_tones(
    candidates: Vec<SegmentCandidate>,
    neutral_tone: u8,
    max_step: u8,
) -> ToneSmoothing {
    let mut previous = neutral_tone;
    let mut clamped = 0;
    let mut smoothed = Vec::with_capacity(candidates.len());

    for (i, mut candidate) in candidates.into_iter().enumerate() {
        if let Some(adjusted) = clamp_tone(previous, candidate.tone_level, max_step) {
            debug!(
                "Tone {} -> {} too steep for '{}', clamped to {}",
                previous, candidate.tone_level, candidate.topic, adjusted
            );
            candidate.tone_level = adjusted;
            candidate.transition_cue = Some(gradient_cue(previous, adjusted));
            clamped += 1;
        } else if i > 0 && !candidate.has_transition() {
            candidate.transition_cue =
                Some(format!("Carry on from the previous segment (tone {})", previous));
        }

        previous = candidate.tone_level;
        smoothed.push(candidate);
    }

    ToneSmoothing {
        candidates: smoothed,
        clamped,
    }
}
