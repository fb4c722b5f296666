use serde::{Deserialize, Serialize};

use super::{CandidateSource, Phase};

/// Structural role of a segment within the episode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentKind {
    Intro,
    Content,
    Sponsored,
    Outro,
}

/// Finalized, timed unit of an episode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeSegment {
    pub kind: SegmentKind,
    pub topic: String,
    /// Tone level (1-5)
    pub tone_level: u8,
    /// Exact allocated duration in seconds
    pub duration_seconds: u32,
    /// Words that fit the duration at 150 words per minute
    pub estimated_word_count: u32,
    pub key_facts: Vec<String>,
    pub source_refs: Vec<String>,
    /// Bridge instruction from the previous segment (empty for the first)
    pub transition_cue: String,
}

impl EpisodeSegment {
    pub fn new(kind: SegmentKind, topic: impl Into<String>, tone_level: u8, duration_seconds: u32) -> Self {
        Self {
            kind,
            topic: topic.into(),
            tone_level,
            duration_seconds,
            estimated_word_count: estimate_word_count(duration_seconds),
            key_facts: Vec::new(),
            source_refs: Vec::new(),
            transition_cue: String::new(),
        }
    }

    pub fn with_facts(mut self, facts: Vec<String>) -> Self {
        self.key_facts = facts;
        self
    }

    pub fn with_sources(mut self, refs: Vec<String>) -> Self {
        self.source_refs = refs;
        self
    }

    pub fn with_transition(mut self, cue: impl Into<String>) -> Self {
        self.transition_cue = cue.into();
        self
    }

    /// Same segment re-timed, with its word estimate recomputed
    pub fn with_duration(self, duration_seconds: u32) -> Self {
        Self {
            duration_seconds,
            estimated_word_count: estimate_word_count(duration_seconds),
            ..self
        }
    }

    /// Backed by at least one non-blank fact or source reference
    pub fn is_grounded(&self) -> bool {
        let present = |s: &String| !s.trim().is_empty();
        self.key_facts.iter().any(present) || self.source_refs.iter().any(present)
    }
}

/// Words spoken in `seconds` at 2.5 words per second, rounded down.
/// Saturates for durations no episode reaches.
pub fn estimate_word_count(seconds: u32) -> u32 {
    u32::try_from(u64::from(seconds) * 5 / 2).unwrap_or(u32::MAX)
}

/// Direction an odds line has moved since opening
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OddsTrend {
    Rising,
    Falling,
    Steady,
}

impl OddsTrend {
    pub fn from_code(code: i64) -> Self {
        match code {
            1 => OddsTrend::Rising,
            -1 => OddsTrend::Falling,
            _ => OddsTrend::Steady,
        }
    }

    pub fn arrow(&self) -> &'static str {
        match self {
            OddsTrend::Rising => "↑",
            OddsTrend::Falling => "↓",
            OddsTrend::Steady => "→",
        }
    }
}

/// Odds for one market option. `None` rates are unavailable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OddsQuote {
    pub current: Option<String>,
    pub original: Option<String>,
    pub trend: OddsTrend,
}

impl OddsQuote {
    pub fn unavailable() -> Self {
        Self {
            current: None,
            original: None,
            trend: OddsTrend::Steady,
        }
    }

    pub fn is_available(&self) -> bool {
        self.current.is_some()
    }
}

/// Market data behind the sponsored segment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SponsoredSegmentConfig {
    /// Market label, e.g. "Full-time Result" or "Over/Under 2.5"
    pub market_label: String,
    /// Bookmaker named on air
    pub provider_name: String,
    /// Option name and odds, in the feed's order (home, draw, away)
    pub featured_odds: Vec<(String, OddsQuote)>,
    /// One-line basis for the panel's prediction
    pub prediction_context: String,
}

impl SponsoredSegmentConfig {
    pub fn odds(&self, option: &str) -> Option<&OddsQuote> {
        self.featured_odds
            .iter()
            .find(|(name, _)| name == option)
            .map(|(_, quote)| quote)
    }
}

/// Complete, timed episode plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeLineup {
    pub episode_title: String,
    pub phase: Phase,
    pub total_duration_minutes: u32,
    pub segments: Vec<EpisodeSegment>,
    /// Aggregate importance (0-100)
    pub priority_score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sponsored: Option<SponsoredSegmentConfig>,
    pub candidate_source: CandidateSource,
}

impl EpisodeLineup {
    pub fn total_seconds(&self) -> u32 {
        self.segments.iter().map(|s| s.duration_seconds).sum()
    }

    pub fn content_segments(&self) -> impl Iterator<Item = &EpisodeSegment> {
        self.segments
            .iter()
            .filter(|s| s.kind == SegmentKind::Content)
    }

    pub fn sponsored_segment(&self) -> Option<&EpisodeSegment> {
        self.segments
            .iter()
            .find(|s| s.kind == SegmentKind::Sponsored)
    }

    /// Check the structural guarantees of a finished lineup
    pub fn check_invariants(&self, max_tone_step: u8) -> Result<(), String> {
        let expected = u64::from(self.total_duration_minutes) * 60;
        let actual: u64 = self
            .segments
            .iter()
            .map(|s| u64::from(s.duration_seconds))
            .sum();
        if actual != expected {
            return Err(format!(
                "segment durations sum to {}s, expected {}s",
                actual, expected
            ));
        }

        match (self.segments.first(), self.segments.last()) {
            (Some(first), Some(last))
                if first.kind == SegmentKind::Intro
                    && last.kind == SegmentKind::Outro
                    && self.segments.len() >= 2 => {}
            _ => return Err("lineup must open with the intro and close with the outro".into()),
        }

        let structural = |kind: SegmentKind| self.segments.iter().filter(|s| s.kind == kind).count();
        if structural(SegmentKind::Intro) != 1 || structural(SegmentKind::Outro) != 1 {
            return Err("lineup must contain exactly one intro and one outro".into());
        }

        let sponsored: Vec<usize> = self
            .segments
            .iter()
            .enumerate()
            .filter(|(_, s)| s.kind == SegmentKind::Sponsored)
            .map(|(i, _)| i)
            .collect();
        match sponsored.as_slice() {
            [] => {}
            [index] if *index + 2 == self.segments.len() => {}
            _ => return Err("sponsored segment must appear once, right before the outro".into()),
        }

        for pair in self.segments.windows(2) {
            if pair[0].tone_level.abs_diff(pair[1].tone_level) > max_tone_step {
                return Err(format!(
                    "tone jump {} -> {} between '{}' and '{}'",
                    pair[0].tone_level, pair[1].tone_level, pair[0].topic, pair[1].topic
                ));
            }
        }

        if let Some(segment) = self.segments.iter().find(|s| !s.is_grounded()) {
            return Err(format!("segment '{}' has no facts or sources", segment.topic));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment(kind: SegmentKind, tone: u8, seconds: u32) -> EpisodeSegment {
        EpisodeSegment::new(kind, format!("{:?}", kind), tone, seconds)
            .with_sources(vec!["game".to_string()])
    }

    fn lineup(segments: Vec<EpisodeSegment>) -> EpisodeLineup {
        EpisodeLineup {
            episode_title: "A vs B Preview".to_string(),
            phase: Phase::PreEvent,
            total_duration_minutes: 1,
            segments,
            priority_score: 50.0,
            sponsored: None,
            candidate_source: CandidateSource::Fallback,
        }
    }

    #[test]
    fn test_word_estimate_rounds_down() {
        assert_eq!(estimate_word_count(15), 37);
        assert_eq!(estimate_word_count(60), 150);
        assert_eq!(estimate_word_count(0), 0);
    }

    #[test]
    fn test_with_duration_recomputes_words() {
        let seg = EpisodeSegment::new(SegmentKind::Outro, "Outro", 3, 15).with_duration(21);
        assert_eq!(seg.duration_seconds, 21);
        assert_eq!(seg.estimated_word_count, 52);
    }

    #[test]
    fn test_word_estimate_saturates() {
        assert_eq!(estimate_word_count(u32::MAX), u32::MAX);
        assert_eq!(estimate_word_count(2_000_000_000), u32::MAX);
    }

    #[test]
    fn test_blank_sources_do_not_ground_a_segment() {
        let blank = EpisodeSegment::new(SegmentKind::Content, "Ghost", 3, 30)
            .with_facts(vec!["  ".to_string()])
            .with_sources(vec![String::new(), " ".to_string()]);
        assert!(!blank.is_grounded());

        let lineup = lineup(vec![
            segment(SegmentKind::Intro, 4, 15),
            blank,
            segment(SegmentKind::Outro, 3, 15),
        ]);
        assert!(lineup.check_invariants(2).unwrap_err().contains("no facts or sources"));
    }

    #[test]
    fn test_invariants_handle_largest_duration() {
        let mut lineup = lineup(vec![
            segment(SegmentKind::Intro, 4, 15),
            segment(SegmentKind::Outro, 3, 15),
        ]);
        lineup.total_duration_minutes = u32::MAX;
        assert!(lineup.check_invariants(2).unwrap_err().contains("sum"));
    }

    #[test]
    fn test_odds_lookup_keeps_feed_order() {
        let sponsor = SponsoredSegmentConfig {
            market_label: "Full-time Result".to_string(),
            provider_name: "365Scores".to_string(),
            featured_odds: ["1", "X", "2"]
                .into_iter()
                .map(|name| (name.to_string(), OddsQuote::unavailable()))
                .collect(),
            prediction_context: String::new(),
        };
        let names: Vec<&str> = sponsor.featured_odds.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["1", "X", "2"]);
        assert!(sponsor.odds("X").is_some());
        assert!(sponsor.odds("Draw").is_none());
    }

    #[test]
    fn test_invariants_accept_valid_lineup() {
        let lineup = lineup(vec![
            segment(SegmentKind::Intro, 4, 15),
            segment(SegmentKind::Sponsored, 3, 30),
            segment(SegmentKind::Outro, 3, 15),
        ]);
        assert!(lineup.check_invariants(2).is_ok());
    }

    #[test]
    fn test_invariants_reject_bad_sum_and_tone_jump() {
        let short = lineup(vec![
            segment(SegmentKind::Intro, 4, 15),
            segment(SegmentKind::Outro, 3, 15),
        ]);
        assert!(short.check_invariants(2).unwrap_err().contains("sum"));

        let jumpy = lineup(vec![
            segment(SegmentKind::Intro, 4, 15),
            segment(SegmentKind::Content, 1, 30),
            segment(SegmentKind::Outro, 3, 15),
        ]);
        assert!(jumpy.check_invariants(2).unwrap_err().contains("tone jump"));
    }

    #[test]
    fn test_invariants_reject_misplaced_sponsor() {
        let lineup = lineup(vec![
            segment(SegmentKind::Intro, 4, 15),
            segment(SegmentKind::Sponsored, 3, 15),
            segment(SegmentKind::Content, 3, 15),
            segment(SegmentKind::Outro, 3, 15),
        ]);
        assert!(lineup.check_invariants(2).unwrap_err().contains("sponsored"));
    }

    #[test]
    fn test_odds_trend_codes() {
        assert_eq!(OddsTrend::from_code(1).arrow(), "↑");
        assert_eq!(OddsTrend::from_code(-1).arrow(), "↓");
        assert_eq!(OddsTrend::from_code(0), OddsTrend::Steady);
    }
}
