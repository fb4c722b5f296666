pub mod heuristics;
pub mod io;
pub mod llm;
pub mod models;
pub mod planner;
pub mod producer;
pub mod stages;

pub use heuristics::{apply_heuristics, HeuristicsConfig};
pub use io::{parse_context_file, parse_context_json, LineupDocument, Rundown};
pub use llm::{AnthropicClient, AnthropicConfig, SegmentOracle, UnavailableOracle, ValidationConfig};
pub use models::{
    CandidateSource, ContentContext, EpisodeLineup, EpisodeSegment, EventSnapshot, OracleProposal,
    Phase, SegmentCandidate, SegmentKind, SponsoredSegmentConfig,
};
pub use planner::{LineupPlanner, PlannerConfig, PlanningError};
pub use producer::SponsoredConfig;
pub use stages::{
    classify, classify_at, execute_stage3, AllocatorConfig, PhaseBasis, Stage3Config,
    StatusCodeTable,
};
