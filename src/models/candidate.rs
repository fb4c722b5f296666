use serde::{Deserialize, Serialize};

fn default_priority() -> u32 {
    50
}

fn default_tone() -> u8 {
    3
}

/// Draft segment proposed by the oracle or the fallback synthesizer.
/// Consumed by the allocator; never part of a finished lineup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentCandidate {
    /// Segment topic/title
    pub topic: String,
    /// Priority weight (0-100)
    #[serde(default = "default_priority")]
    pub priority: u32,
    /// Suggested duration in seconds
    #[serde(default, rename = "suggested_duration_seconds")]
    pub suggested_duration: u32,
    /// Tone level (1 = cold/analytical ... 5 = high octane)
    #[serde(default = "default_tone")]
    pub tone_level: u8,
    /// Facts distilled from the context, in speaking order
    #[serde(default)]
    pub key_facts: Vec<String>,
    /// Context key paths the facts were taken from
    #[serde(default)]
    pub source_refs: Vec<String>,
    /// How to bridge from the previous segment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transition_cue: Option<String>,
}

impl SegmentCandidate {
    pub fn new(topic: impl Into<String>, priority: u32, tone_level: u8) -> Self {
        Self {
            topic: topic.into(),
            priority,
            suggested_duration: 0,
            tone_level,
            key_facts: Vec::new(),
            source_refs: Vec::new(),
            transition_cue: None,
        }
    }

    pub fn with_facts<I, S>(mut self, facts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.key_facts = facts.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_sources<I, S>(mut self, refs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.source_refs = refs.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_suggested_duration(mut self, seconds: u32) -> Self {
        self.suggested_duration = seconds;
        self
    }

    pub fn with_transition(mut self, cue: impl Into<String>) -> Self {
        self.transition_cue = Some(cue.into());
        self
    }

    /// Whether a non-blank transition cue is set
    pub fn has_transition(&self) -> bool {
        self.transition_cue
            .as_deref()
            .is_some_and(|cue| !cue.trim().is_empty())
    }
}

/// A headline narrative the oracle ranked for the episode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedStory {
    pub story: String,
    #[serde(default = "default_priority")]
    pub score: u32,
    #[serde(default)]
    pub data_points: Vec<String>,
    #[serde(default)]
    pub source_refs: Vec<String>,
}

/// Complete structured output of one oracle call
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OracleProposal {
    /// Candidate segments in narrative order
    #[serde(default)]
    pub segment_suggestions: Vec<SegmentCandidate>,
    /// Ranked headline narratives
    #[serde(default)]
    pub priority_stories: Vec<RankedStory>,
    /// Quotes from news data; any entry marks the episode as high-impact
    #[serde(default)]
    pub explosive_quotes: Vec<String>,
    #[serde(default)]
    pub betting_highlights: Vec<String>,
}

impl OracleProposal {
    pub fn is_high_impact(&self) -> bool {
        self.explosive_quotes.iter().any(|q| !q.trim().is_empty())
    }
}

/// Where the candidates of a lineup came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateSource {
    /// Accepted oracle proposal
    Oracle,
    /// Canonical fallback templates
    Fallback,
}

/// Validation result for an oracle proposal
#[derive(Debug, Clone)]
pub struct ProposalValidation {
    pub is_valid: bool,
    pub errors: Vec<String>,
}

impl ProposalValidation {
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            errors: vec![],
        }
    }

    pub fn invalid(errors: Vec<String>) -> Self {
        Self {
            is_valid: false,
            errors,
        }
    }
}
