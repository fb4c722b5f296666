use crate::models::{EventSnapshot, OracleProposal, Phase, RankedStory};

/// Score given to episodes with no ranked stories
pub const DEFAULT_PRIORITY_SCORE: f64 = 50.0;
/// Bonus for a high-impact episode
const HIGH_IMPACT_BONUS: f64 = 10.0;
/// A story must score above this to headline the title
const HEADLINE_THRESHOLD: u32 = 80;
const TOP_STORIES: usize = 3;

/// Aggregate importance of the episode (0-100, one decimal).
///
/// Mean of the three highest ranked-story scores (segment priorities when
/// no stories were ranked), plus a bonus when the oracle flagged
/// high-impact quotes. Fallback episodes score the default.
pub fn priority_score(proposal: Option<&OracleProposal>) -> f64 {
    let Some(proposal) = proposal else {
        return DEFAULT_PRIORITY_SCORE;
    };

    let mut scores: Vec<u32> = if proposal.priority_stories.is_empty() {
        proposal
            .segment_suggestions
            .iter()
            .map(|c| c.priority)
            .collect()
    } else {
        proposal.priority_stories.iter().map(|s| s.score).collect()
    };
    scores.sort_unstable_by(|a, b| b.cmp(a));
    scores.truncate(TOP_STORIES);

    let mut score = if scores.is_empty() {
        DEFAULT_PRIORITY_SCORE
    } else {
        scores.iter().map(|&s| f64::from(s)).sum::<f64>() / scores.len() as f64
    };

    if proposal.is_high_impact() {
        score = (score + HIGH_IMPACT_BONUS).min(100.0);
    }

    (score * 10.0).round() / 10.0
}

/// Compose the episode title
pub fn compose_title(
    event: &EventSnapshot,
    phase: Phase,
    proposal: Option<&OracleProposal>,
) -> String {
    if let Some(story) = proposal.and_then(headline_story) {
        return format!("{}: {}", event.matchup(), story.story.trim());
    }

    let matchup = match (phase, event.final_score()) {
        (Phase::PostEvent, Some((home, away))) => format!(
            "{} {}-{} {}",
            event.home_team, home, away, event.away_team
        ),
        _ => event.matchup(),
    };
    let suffix = match phase {
        Phase::PreEvent => "Preview",
        Phase::PostEvent => "Recap",
    };

    match &event.competition {
        Some(competition) => format!("{} - {} {}", matchup, competition, suffix),
        None => format!("{} {}", matchup, suffix),
    }
}

/// Highest-scoring story, if it is strong enough to headline
fn headline_story(proposal: &OracleProposal) -> Option<&RankedStory> {
    proposal
        .priority_stories
        .iter()
        .filter(|story| !story.story.trim().is_empty())
        .max_by_key(|story| story.score)
        .filter(|story| story.score > HEADLINE_THRESHOLD)
}
