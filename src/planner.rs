use std::time::Duration;

use thiserror::Error;
use tracing::info;

use crate::heuristics::HeuristicsConfig;
use crate::llm::{SegmentOracle, ValidationConfig};
use crate::models::{ContentContext, EpisodeLineup};
use crate::producer::{
    SponsoredConfig, build_sponsored_config, build_sponsored_segment, compose_title,
    priority_score,
};
use crate::stages::{
    AllocatorConfig, Stage1Config, StatusCodeTable, classify_at, execute_stage1, execute_stage2,
};

/// Reasons a lineup cannot be planned. Oracle failures are never among them.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlanningError {
    #[error("context is missing required field `{0}`")]
    MissingField(&'static str),

    #[error("episode duration must be positive, got {0} minutes")]
    NonPositiveDuration(u32),

    #[error("episode duration of {0} minutes does not fit in a seconds budget")]
    DurationTooLarge(u32),

    #[error("planned lineup violates an invariant: {0}")]
    InvariantViolation(String),
}

/// Configuration for the whole planner
#[derive(Debug, Clone, Default)]
pub struct PlannerConfig {
    pub status_codes: StatusCodeTable,
    pub heuristics: HeuristicsConfig,
    pub allocator: AllocatorConfig,
    pub sponsored: SponsoredConfig,
    pub validation: ValidationConfig,
    /// Oracle calls running longer than this count as failures
    pub oracle_timeout: Option<Duration>,
}

/// Plans episode lineups from event context.
///
/// Holds no per-call state; independent `plan` calls may run concurrently.
pub struct LineupPlanner<O> {
    oracle: O,
    config: PlannerConfig,
}

impl<O: SegmentOracle> LineupPlanner<O> {
    pub fn new(oracle: O) -> Self {
        Self::with_config(oracle, PlannerConfig::default())
    }

    pub fn with_config(oracle: O, config: PlannerConfig) -> Self {
        Self { oracle, config }
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Plan a lineup of exactly `total_minutes`.
    ///
    /// Succeeds whenever the context names both competitors and the
    /// duration is positive. An unusable oracle degrades the content to the
    /// canonical segments instead of failing.
    pub async fn plan(
        &self,
        context: &ContentContext,
        total_minutes: u32,
    ) -> Result<EpisodeLineup, PlanningError> {
        if total_minutes == 0 {
            return Err(PlanningError::NonPositiveDuration(total_minutes));
        }
        let budget = total_minutes
            .checked_mul(60)
            .ok_or(PlanningError::DurationTooLarge(total_minutes))?;
        let event = context.snapshot()?;
        let config = &self.config;

        let (phase, basis) = classify_at(&event, &config.status_codes, chrono::Utc::now());
        info!(
            "Planning {} minute {} episode for {} ({:?})",
            total_minutes,
            phase.display_name(),
            event.matchup(),
            basis
        );

        let available = config.allocator.available_seconds(budget);

        let stage1_config = Stage1Config {
            validation: config.validation.clone(),
            heuristics: config.heuristics.clone(),
            oracle_timeout: config.oracle_timeout,
        };
        let proposed = execute_stage1(
            &self.oracle,
            context,
            &event,
            phase,
            total_minutes,
            available,
            &stage1_config,
        )
        .await;

        let sponsor = build_sponsored_config(context, &event, phase, &config.sponsored);
        let sponsored_segment = build_sponsored_segment(
            &sponsor,
            &event,
            phase,
            config.allocator.sponsored_reservation(budget),
            &config.sponsored,
        );

        let allocation = execute_stage2(
            proposed.candidates,
            budget,
            phase,
            &event,
            Some(sponsored_segment),
            config.heuristics.max_tone_step,
            &config.allocator,
        );

        let proposal = proposed.proposal.as_ref();
        let lineup = EpisodeLineup {
            episode_title: compose_title(&event, phase, proposal),
            phase,
            total_duration_minutes: total_minutes,
            segments: allocation.segments,
            priority_score: priority_score(proposal),
            sponsored: Some(sponsor),
            candidate_source: proposed.source,
        };

        lineup
            .check_invariants(config.heuristics.max_tone_step)
            .map_err(PlanningError::InvariantViolation)?;

        info!(
            "Planned '{}': {} segments, priority {:.1}",
            lineup.episode_title,
            lineup.segments.len(),
            lineup.priority_score
        );

        Ok(lineup)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::UnavailableOracle;
    use crate::models::{
        CandidateSource, OracleProposal, Phase, RankedStory, SegmentCandidate, SegmentKind,
    };
    use anyhow::Result;
    use async_trait::async_trait;
    use serde_json::{Value, json};

    struct FixedOracle(OracleProposal);

    #[async_trait]
    impl SegmentOracle for FixedOracle {
        async fn propose(&self, _: &ContentContext, _: Phase, _: u32) -> Result<OracleProposal> {
            Ok(self.0.clone())
        }
    }

    fn context(value: Value) -> ContentContext {
        ContentContext::from_value(value).unwrap()
    }

    fn upcoming() -> ContentContext {
        context(json!({
            "game": {
                "home_team": {"name": "Arsenal"},
                "away_team": {"name": "Chelsea"},
                "competition": "Premier League",
                "game_status": 0
            }
        }))
    }

    fn finished() -> ContentContext {
        context(json!({
            "game": {
                "home_team": {"name": "Arsenal"},
                "away_team": {"name": "Chelsea"},
                "scrs": [2, 1],
                "winner": 0,
                "game_status": 0
            }
        }))
    }

    fn durations(lineup: &EpisodeLineup) -> Vec<u32> {
        lineup.segments.iter().map(|s| s.duration_seconds).collect()
    }

    #[tokio::test]
    async fn test_five_minute_offline_lineup() {
        let planner = LineupPlanner::new(UnavailableOracle);

        let lineup = planner.plan(&upcoming(), 5).await.unwrap();

        assert_eq!(lineup.phase, Phase::PreEvent);
        assert_eq!(lineup.candidate_source, CandidateSource::Fallback);
        assert_eq!(lineup.segments.len(), 8);
        assert_eq!(lineup.content_segments().count(), 5);
        assert_eq!(durations(&lineup), vec![15, 34, 58, 58, 46, 37, 37, 15]);
        assert_eq!(lineup.total_seconds(), 300);
        assert_eq!(lineup.priority_score, 50.0);
        assert_eq!(
            lineup.episode_title,
            "Arsenal vs Chelsea - Premier League Preview"
        );

        let sponsor = lineup.sponsored.as_ref().unwrap();
        assert_eq!(sponsor.featured_odds.len(), 3);
        assert!(sponsor.featured_odds.iter().all(|(_, q)| !q.is_available()));
        assert!(lineup.check_invariants(2).is_ok());
    }

    #[tokio::test]
    async fn test_offline_planning_is_deterministic() {
        let planner = LineupPlanner::new(UnavailableOracle);

        let first = planner.plan(&finished(), 12).await.unwrap();
        let second = planner.plan(&finished(), 12).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[tokio::test]
    async fn test_score_overrides_upcoming_status() {
        let planner = LineupPlanner::new(UnavailableOracle);

        let lineup = planner.plan(&finished(), 8).await.unwrap();

        assert_eq!(lineup.phase, Phase::PostEvent);
        assert_eq!(lineup.episode_title, "Arsenal 2-1 Chelsea Recap");
        assert_eq!(lineup.segments[1].topic, "Arsenal 2-1 Chelsea: The Final Verdict");
    }

    #[tokio::test]
    async fn test_duration_is_conserved_across_lengths() {
        let planner = LineupPlanner::new(UnavailableOracle);

        for minutes in [1, 2, 3, 5, 7, 10, 15, 30, 60, 90] {
            for ctx in [upcoming(), finished()] {
                let lineup = planner.plan(&ctx, minutes).await.unwrap();
                assert_eq!(lineup.total_seconds(), minutes * 60, "{} minutes", minutes);
                assert!(lineup.check_invariants(2).is_ok(), "{} minutes", minutes);
            }
        }
    }

    #[tokio::test]
    async fn test_oracle_plan_is_used() {
        let oracle = FixedOracle(OracleProposal {
            segment_suggestions: vec![
                SegmentCandidate::new("Derby stakes", 90, 5).with_facts(["Top of the table clash"]),
                SegmentCandidate::new("Ghost stats", 80, 3).with_facts(["N/A"]),
                SegmentCandidate::new("Cold numbers", 60, 1).with_sources(["statistics"]),
            ],
            priority_stories: vec![RankedStory {
                story: "North London Fireworks".to_string(),
                score: 88,
                data_points: vec![],
                source_refs: vec![],
            }],
            explosive_quotes: vec!["We fear no one".to_string()],
            betting_highlights: vec![],
        });
        let planner = LineupPlanner::new(oracle);

        let lineup = planner.plan(&upcoming(), 5).await.unwrap();

        assert_eq!(lineup.candidate_source, CandidateSource::Oracle);
        assert_eq!(lineup.episode_title, "Arsenal vs Chelsea: North London Fireworks");
        assert_eq!(lineup.priority_score, 98.0);

        let topics: Vec<&str> = lineup.content_segments().map(|s| s.topic.as_str()).collect();
        assert_eq!(topics, vec!["Derby stakes", "Cold numbers"]);
        let tones: Vec<u8> = lineup.segments.iter().map(|s| s.tone_level).collect();
        assert_eq!(tones, vec![4, 5, 3, 3, 3]);
        assert_eq!(lineup.total_seconds(), 300);
    }

    #[tokio::test]
    async fn test_ungrounded_oracle_plan_falls_back() {
        let oracle = FixedOracle(OracleProposal {
            segment_suggestions: vec![
                SegmentCandidate::new("Ghost stats", 80, 3).with_facts(["N/A"]),
                SegmentCandidate::new("Ghost lineups", 70, 4).with_facts(["not_available"]),
            ],
            priority_stories: vec![RankedStory {
                story: "Phantom".to_string(),
                score: 95,
                data_points: vec![],
                source_refs: vec![],
            }],
            ..Default::default()
        });
        let planner = LineupPlanner::new(oracle);

        let lineup = planner.plan(&upcoming(), 5).await.unwrap();

        assert_eq!(lineup.candidate_source, CandidateSource::Fallback);
        assert_eq!(lineup.content_segments().count(), 5);
        assert_eq!(lineup.priority_score, 50.0);
        assert!(!lineup.episode_title.contains("Phantom"));
    }

    #[tokio::test]
    async fn test_zero_minutes_is_rejected() {
        let planner = LineupPlanner::new(UnavailableOracle);
        assert_eq!(
            planner.plan(&upcoming(), 0).await,
            Err(PlanningError::NonPositiveDuration(0))
        );
    }

    #[tokio::test]
    async fn test_duration_beyond_seconds_budget_is_rejected() {
        let planner = LineupPlanner::new(UnavailableOracle);
        assert_eq!(
            planner.plan(&upcoming(), 80_000_000).await,
            Err(PlanningError::DurationTooLarge(80_000_000))
        );
        assert_eq!(
            planner.plan(&upcoming(), u32::MAX).await,
            Err(PlanningError::DurationTooLarge(u32::MAX))
        );
    }

    #[tokio::test]
    async fn test_longest_representable_episode() {
        let planner = LineupPlanner::new(UnavailableOracle);
        let minutes = u32::MAX / 60;

        let lineup = planner.plan(&finished(), minutes).await.unwrap();

        assert_eq!(lineup.total_seconds(), minutes * 60);
        assert_eq!(lineup.content_segments().count(), 5);
    }

    #[tokio::test]
    async fn test_blank_source_refs_do_not_ground_oracle_segments() {
        let oracle = FixedOracle(OracleProposal {
            segment_suggestions: vec![
                SegmentCandidate::new("Ghost", 90, 3)
                    .with_facts(["N/A"])
                    .with_sources([""]),
            ],
            ..Default::default()
        });
        let planner = LineupPlanner::new(oracle);

        let lineup = planner.plan(&upcoming(), 5).await.unwrap();

        assert_eq!(lineup.candidate_source, CandidateSource::Fallback);
        assert!(lineup.content_segments().all(|s| s.topic != "Ghost"));
    }

    #[tokio::test]
    async fn test_tone_step_is_configured_once() {
        let oracle = FixedOracle(OracleProposal {
            segment_suggestions: vec![
                SegmentCandidate::new("Slow open", 50, 1).with_facts(["Both sides rested players"]),
                SegmentCandidate::new("Next", 50, 2).with_facts(["Kick-off at 20:00"]),
            ],
            ..Default::default()
        });
        let mut config = PlannerConfig::default();
        config.heuristics.max_tone_step = 1;
        let planner = LineupPlanner::with_config(oracle, config);

        let lineup = planner.plan(&upcoming(), 5).await.unwrap();

        let tones: Vec<u8> = lineup.segments.iter().map(|s| s.tone_level).collect();
        assert_eq!(tones, vec![4, 3, 2, 3, 3]);
        assert!(lineup.check_invariants(1).is_ok());
    }

    #[tokio::test]
    async fn test_missing_competitors_are_rejected() {
        let planner = LineupPlanner::new(UnavailableOracle);

        assert_eq!(
            planner.plan(&context(json!({"standings": []})), 5).await,
            Err(PlanningError::MissingField("game"))
        );
        assert_eq!(
            planner
                .plan(&context(json!({"game": {"home_team": {"name": "Arsenal"}}})), 5)
                .await,
            Err(PlanningError::MissingField("game.away_team.name"))
        );
    }

    #[tokio::test]
    async fn test_structure_of_every_lineup() {
        let planner = LineupPlanner::new(UnavailableOracle);
        let lineup = planner.plan(&finished(), 20).await.unwrap();

        let first = lineup.segments.first().unwrap();
        let last = lineup.segments.last().unwrap();
        assert_eq!((first.kind, first.tone_level), (SegmentKind::Intro, 4));
        assert_eq!((last.kind, last.tone_level), (SegmentKind::Outro, 3));
        assert_eq!(
            lineup.segments[lineup.segments.len() - 2].kind,
            SegmentKind::Sponsored
        );
        assert!(lineup.segments.iter().all(|s| s.is_grounded()));
        assert!(
            lineup.segments[1..]
                .iter()
                .all(|s| !s.transition_cue.is_empty())
        );
    }
}
