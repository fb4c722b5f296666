use crate::models::{OracleProposal, ProposalValidation};

/// Configuration for proposal validation
#[derive(Debug, Clone)]
pub struct ValidationConfig {
    /// Lowest accepted tone level
    pub min_tone: u8,
    /// Highest accepted tone level
    pub max_tone: u8,
    /// Highest accepted priority or story score
    pub max_priority: u32,
    /// Longest accepted suggested duration in seconds
    pub max_suggested_duration: u32,
    /// Most segment suggestions accepted in one proposal
    pub max_candidates: usize,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            min_tone: 1,
            max_tone: 5,
            max_priority: 100,
            max_suggested_duration: 3_600,
            max_candidates: 12,
        }
    }
}

/// Validate an oracle proposal.
///
/// A single bad field rejects the whole proposal; nothing is repaired.
pub fn validate_proposal(proposal: &OracleProposal, config: &ValidationConfig) -> ProposalValidation {
    let mut errors = Vec::new();

    // 1. There must be something to plan with
    if proposal.segment_suggestions.is_empty() {
        errors.push("Proposal has no segment suggestions".to_string());
    }

    if proposal.segment_suggestions.len() > config.max_candidates {
        errors.push(format!(
            "Too many segment suggestions: {} > {} allowed",
            proposal.segment_suggestions.len(),
            config.max_candidates
        ));
    }

    // 2. Per-candidate ranges
    for (i, candidate) in proposal.segment_suggestions.iter().enumerate() {
        if candidate.topic.trim().is_empty() {
            errors.push(format!("Segment {} has a blank topic", i));
        }

        if candidate.tone_level < config.min_tone || candidate.tone_level > config.max_tone {
            errors.push(format!(
                "Segment {} tone level {} outside {}-{}",
                i, candidate.tone_level, config.min_tone, config.max_tone
            ));
        }

        if candidate.priority > config.max_priority {
            errors.push(format!(
                "Segment {} priority {} exceeds {}",
                i, candidate.priority, config.max_priority
            ));
        }

        if candidate.suggested_duration > config.max_suggested_duration {
            errors.push(format!(
                "Segment {} suggested duration {}s exceeds {}s",
                i, candidate.suggested_duration, config.max_suggested_duration
            ));
        }
    }

    // 3. Story scores
    for story in &proposal.priority_stories {
        if story.score > config.max_priority {
            errors.push(format!(
                "Story '{}' score {} exceeds {}",
                story.story, story.score, config.max_priority
            ));
        }
    }

    if errors.is_empty() {
        ProposalValidation::valid()
    } else {
        ProposalValidation::invalid(errors)
    }
}
