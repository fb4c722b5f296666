use std::time::Duration;

use tracing::{info, warn};

use crate::heuristics::{HeuristicsConfig, apply_heuristics};
use crate::llm::{SegmentOracle, ValidationConfig, validate_proposal};
use crate::models::{
    CandidateSource, ContentContext, EventSnapshot, OracleProposal, Phase, SegmentCandidate,
};
use crate::producer::synthesize_fallback;

/// Configuration for Stage 1
#[derive(Debug, Clone, Default)]
pub struct Stage1Config {
    /// Proposal validation rules
    pub validation: ValidationConfig,
    /// Filter and smoothing rules
    pub heuristics: HeuristicsConfig,
    /// Oracle calls running longer than this count as failures
    pub oracle_timeout: Option<Duration>,
}

/// Result of Stage 1
#[derive(Debug)]
pub struct Stage1Result {
    /// Filtered, tone-smoothed candidates in narrative order
    pub candidates: Vec<SegmentCandidate>,
    /// Accepted oracle proposal, `None` when the fallback was used
    pub proposal: Option<OracleProposal>,
    pub source: CandidateSource,
    /// Candidates removed by the zero-tolerance filter
    pub dropped: usize,
    /// Tone levels clamped by the smoother
    pub tones_clamped: usize,
}

/// Execute Stage 1: candidate proposal
///
/// 1. Ask the oracle for a proposal and validate it
/// 2. Filter and smooth the oracle's candidates
/// 3. If anything failed, or nothing survived the filter, substitute the
///    canonical fallback candidates (filtered and smoothed the same way)
///
/// Never fails: oracle errors are logged and recovered here.
pub async fn execute_stage1<O: SegmentOracle + ?Sized>(
    oracle: &O,
    context: &ContentContext,
    event: &EventSnapshot,
    phase: Phase,
    total_minutes: u32,
    available_seconds: u32,
    config: &Stage1Config,
) -> Stage1Result {
    let proposal = request_proposal(
        oracle,
        context,
        phase,
        total_minutes,
        &config.validation,
        config.oracle_timeout,
    )
    .await;

    if let Some(proposal) = proposal {
        let result = apply_heuristics(proposal.segment_suggestions.clone(), &config.heuristics);

        if !result.candidates.is_empty() {
            info!(
                "Stage 1: {} oracle candidates kept ({} dropped)",
                result.candidates.len(),
                result.dropped
            );
            return Stage1Result {
                candidates: result.candidates,
                proposal: Some(proposal),
                source: CandidateSource::Oracle,
                dropped: result.dropped,
                tones_clamped: result.tones_clamped,
            };
        }

        warn!("No oracle candidate survived the zero-tolerance filter, using fallback segments");
    }

    let fallback = synthesize_fallback(context, event, phase, available_seconds);
    let result = apply_heuristics(fallback, &config.heuristics);

    info!(
        "Stage 1: {} fallback candidates kept ({} dropped)",
        result.candidates.len(),
        result.dropped
    );

    Stage1Result {
        candidates: result.candidates,
        proposal: None,
        source: CandidateSource::Fallback,
        dropped: result.dropped,
        tones_clamped: result.tones_clamped,
    }
}

/// Call the oracle once and validate what it returns.
///
/// Errors, timeouts and invalid proposals all yield `None`. No retries.
pub async fn request_proposal<O: SegmentOracle + ?Sized>(
    oracle: &O,
    context: &ContentContext,
    phase: Phase,
    total_minutes: u32,
    validation: &ValidationConfig,
    timeout: Option<Duration>,
) -> Option<OracleProposal> {
    let call = oracle.propose(context, phase, total_minutes);

    let outcome = match timeout {
        Some(limit) => match tokio::time::timeout(limit, call).await {
            Ok(outcome) => outcome,
            Err(_) => {
                warn!("Oracle call timed out after {:?}", limit);
                return None;
            }
        },
        None => call.await,
    };

    let proposal = match outcome {
        Ok(proposal) => proposal,
        Err(e) => {
            warn!("Oracle call failed: {:#}", e);
            return None;
        }
    };

    let validation = validate_proposal(&proposal, validation);
    if !validation.is_valid {
        warn!(
            "Oracle proposal rejected: {}",
            validation.errors.join("; ")
        );
        return None;
    }

    info!(
        "Oracle proposed {} segments, {} ranked stories",
        proposal.segment_suggestions.len(),
        proposal.priority_stories.len()
    );

    Some(proposal)
}
