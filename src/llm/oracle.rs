use anyhow::Result;
use async_trait::async_trait;

use crate::models::{ContentContext, OracleProposal, Phase};

/// Content-analysis capability that proposes candidate segments.
///
/// Implementations are treated as unreliable: any error, timeout or
/// malformed proposal makes the planner fall back to canonical segments.
#[async_trait]
pub trait SegmentOracle: Send + Sync {
    async fn propose(
        &self,
        context: &ContentContext,
        phase: Phase,
        total_minutes: u32,
    ) -> Result<OracleProposal>;
}

/// Oracle that is never reachable. Used for offline planning, where every
/// lineup is built from the fallback templates.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableOracle;

#[async_trait]
impl SegmentOracle for UnavailableOracle {
    async fn propose(
        &self,
        _context: &ContentContext,
        _phase: Phase,
        _total_minutes: u32,
    ) -> Result<OracleProposal> {
        anyhow::bail!("content oracle disabled (offline planning)")
    }
}

#[async_trait]
impl<T: SegmentOracle + ?Sized> SegmentOracle for Box<T> {
    async fn propose(
        &self,
        context: &ContentContext,
        phase: Phase,
        total_minutes: u32,
    ) -> Result<OracleProposal> {
        (**self).propose(context, phase, total_minutes).await
    }
}
