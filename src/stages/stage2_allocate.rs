use tracing::{debug, info};

use crate::heuristics::{clamp_tone, gradient_cue};
use crate::models::{EpisodeSegment, EventSnapshot, Phase, SegmentCandidate, SegmentKind};

/// Configuration for the time allocator
#[derive(Debug, Clone)]
pub struct AllocatorConfig {
    /// Combined intro and outro reservation, split evenly
    pub intro_outro_seconds: u32,
    /// Shortest content segment
    pub min_segment_seconds: u32,
    /// Sponsored reservation bounds
    pub sponsored_min_seconds: u32,
    pub sponsored_max_seconds: u32,
    /// Sponsored reservation is the total budget divided by this
    pub sponsored_divisor: u32,
    /// Weight assumed per candidate when all priorities are zero
    pub default_priority: u32,
    pub intro_tone: u8,
    pub outro_tone: u8,
}

impl Default for AllocatorConfig {
    fn default() -> Self {
        Self {
            intro_outro_seconds: 30,
            min_segment_seconds: 15,
            sponsored_min_seconds: 30,
            sponsored_max_seconds: 45,
            sponsored_divisor: 8,
            default_priority: 50,
            intro_tone: 4,
            outro_tone: 3,
        }
    }
}

impl AllocatorConfig {
    /// Sponsored reservation for a total budget in seconds
    pub fn sponsored_reservation(&self, total_seconds: u32) -> u32 {
        (total_seconds / self.sponsored_divisor.max(1))
            .clamp(self.sponsored_min_seconds, self.sponsored_max_seconds)
    }

    /// Content time left after the fixed reservations
    pub fn available_seconds(&self, total_seconds: u32) -> u32 {
        total_seconds
            .saturating_sub(self.intro_outro_seconds)
            .saturating_sub(self.sponsored_reservation(total_seconds))
    }
}

/// Result of Stage 2
#[derive(Debug)]
pub struct Stage2Result {
    /// Timed segments: intro, content, sponsored, outro
    pub segments: Vec<EpisodeSegment>,
    /// Trailing candidates that did not fit the minimum segment length
    pub dropped: usize,
    /// Seconds added to (or taken from) the outro during reconciliation
    pub reconciled_seconds: i64,
}

/// Execute Stage 2: time allocation over `budget` seconds
///
/// 1. Reserve the intro/outro block and the sponsored slot
/// 2. Split the remaining time across candidates by priority, giving the
///    last candidate the exact remainder
/// 3. Frame the content with intro, sponsored segment and outro
/// 4. Reconcile rounding drift into the outro
pub fn execute_stage2(
    candidates: Vec<SegmentCandidate>,
    budget: u32,
    phase: Phase,
    event: &EventSnapshot,
    sponsored: Option<EpisodeSegment>,
    max_tone_step: u8,
    config: &AllocatorConfig,
) -> Stage2Result {
    let available = config.available_seconds(budget);
    let sponsored_seconds = config.sponsored_reservation(budget);

    let (candidates, dropped) = fit_candidates(candidates, available, config.min_segment_seconds);
    let durations = split_available(&candidates, available, config);

    let mut content: Vec<EpisodeSegment> = candidates
        .into_iter()
        .zip(durations)
        .map(|(candidate, seconds)| content_segment(candidate, seconds))
        .collect();
    bridge_tones(&mut content, config.intro_tone, max_tone_step);

    let half = config.intro_outro_seconds / 2;
    let mut segments = Vec::with_capacity(content.len() + 3);
    segments.push(intro_segment(event, phase, half, config.intro_tone));
    segments.extend(content);
    if let Some(sponsored) = sponsored {
        segments.push(sponsored.with_duration(sponsored_seconds));
    }
    segments.push(outro_segment(event, config.intro_outro_seconds - half, config.outro_tone));

    let reconciled_seconds = reconcile(&mut segments, budget);

    info!(
        "Stage 2: {} segments over {}s ({}s content, {} dropped, {:+}s reconciled)",
        segments.len(),
        budget,
        available,
        dropped,
        reconciled_seconds
    );

    Stage2Result {
        segments,
        dropped,
        reconciled_seconds,
    }
}

/// Drop trailing candidates until every one can get the minimum length.
/// Trimming from the end keeps the smoothed tone chain intact.
fn fit_candidates(
    mut candidates: Vec<SegmentCandidate>,
    available: u32,
    min_seconds: u32,
) -> (Vec<SegmentCandidate>, usize) {
    let capacity = if min_seconds == 0 {
        candidates.len()
    } else {
        (available / min_seconds) as usize
    };

    let dropped = candidates.len().saturating_sub(capacity);
    let keep = candidates.len() - dropped;
    for candidate in candidates.drain(keep..) {
        debug!("No room for '{}', dropped", candidate.topic);
    }

    (candidates, dropped)
}

/// Seconds per candidate; sums to exactly `available` when any candidate exists
fn split_available(
    candidates: &[SegmentCandidate],
    available: u32,
    config: &AllocatorConfig,
) -> Vec<u32> {
    let count = candidates.len();
    let min = config.min_segment_seconds;

    let priority_sum: u64 = candidates.iter().map(|c| u64::from(c.priority)).sum();
    let weight = |c: &SegmentCandidate| {
        if priority_sum == 0 {
            u64::from(config.default_priority)
        } else {
            u64::from(c.priority)
        }
    };
    let total_priority = if priority_sum == 0 {
        count as u64 * u64::from(config.default_priority)
    } else {
        priority_sum
    };

    let mut allocated = 0u32;
    let mut durations = Vec::with_capacity(count);

    for (i, candidate) in candidates.iter().enumerate() {
        let remaining = available - allocated;

        if i + 1 == count {
            durations.push(remaining);
            break;
        }

        // Leave the minimum for every candidate still to come
        let still_to_come = (count - i - 1) as u32;
        let ceiling = remaining.saturating_sub(min * still_to_come).max(min);

        let proportional = if total_priority == 0 {
            0
        } else {
            (weight(candidate) * u64::from(available) / total_priority) as u32
        };
        let seconds = proportional
            .max(candidate.suggested_duration / 2)
            .max(min)
            .min(ceiling);

        allocated += seconds;
        durations.push(seconds);
    }

    durations
}

fn content_segment(candidate: SegmentCandidate, seconds: u32) -> EpisodeSegment {
    let mut segment = EpisodeSegment::new(
        SegmentKind::Content,
        candidate.topic,
        candidate.tone_level,
        seconds,
    )
    .with_facts(candidate.key_facts)
    .with_sources(candidate.source_refs);

    if let Some(cue) = candidate.transition_cue {
        segment = segment.with_transition(cue);
    }
    segment
}

/// Keep the content chain within the tone step of the intro and of each other
fn bridge_tones(content: &mut [EpisodeSegment], intro_tone: u8, max_step: u8) {
    let mut previous = intro_tone;

    for (i, segment) in content.iter_mut().enumerate() {
        if let Some(adjusted) = clamp_tone(previous, segment.tone_level, max_step) {
            debug!(
                "Tone {} -> {} too steep for '{}', clamped to {}",
                previous, segment.tone_level, segment.topic, adjusted
            );
            segment.tone_level = adjusted;
            segment.transition_cue = gradient_cue(previous, adjusted);
        } else if i == 0 && segment.transition_cue.trim().is_empty() {
            segment.transition_cue = "Move on from the introduction into the first story".to_string();
        }
        previous = segment.tone_level;
    }
}

fn intro_segment(event: &EventSnapshot, phase: Phase, seconds: u32, tone: u8) -> EpisodeSegment {
    let label = match phase {
        Phase::PreEvent => "Preview",
        Phase::PostEvent => "Recap",
    };

    EpisodeSegment::new(
        SegmentKind::Intro,
        format!("Welcome: {} {}", event.matchup(), label),
        tone,
        seconds,
    )
    .with_facts(event_facts(event))
    .with_sources(event_sources(event))
}

fn outro_segment(event: &EventSnapshot, seconds: u32, tone: u8) -> EpisodeSegment {
    EpisodeSegment::new(SegmentKind::Outro, "Wrap-Up & Sign-Off", tone, seconds)
        .with_facts(event_facts(event))
        .with_sources(event_sources(event))
        .with_transition("Wrap up the episode and thank the listeners")
}

fn event_facts(event: &EventSnapshot) -> Vec<String> {
    let mut facts = vec![event.matchup()];
    if let Some(competition) = &event.competition {
        facts.push(format!("Competition: {}", competition));
    }
    facts
}

fn event_sources(event: &EventSnapshot) -> Vec<String> {
    let mut sources = vec!["game.home_team".to_string(), "game.away_team".to_string()];
    if event.competition.is_some() {
        sources.push("game.competition".to_string());
    }
    sources
}

/// Fold any drift between the segment sum and the budget into the outro.
/// Returns the signed adjustment.
fn reconcile(segments: &mut [EpisodeSegment], budget: u32) -> i64 {
    let total: i64 = segments.iter().map(|s| i64::from(s.duration_seconds)).sum();
    let adjustment = i64::from(budget) - total;
    if adjustment == 0 {
        return 0;
    }

    if let Some(outro) = segments.last_mut() {
        let seconds = (i64::from(outro.duration_seconds) + adjustment).max(0);
        let seconds = u32::try_from(seconds).unwrap_or(u32::MAX);
        *outro = outro.clone().with_duration(seconds);
    }

    adjustment
}
