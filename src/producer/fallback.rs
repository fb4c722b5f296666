use serde_json::Value;
use tracing::info;

use crate::models::{ContentContext, EventSnapshot, Phase, SegmentCandidate, as_text, is_present};

/// Shape of one canonical segment. The topic is filled in from the event.
struct CanonicalSegment {
    /// Share of the available content time, in percent
    share: u32,
    tone: u8,
    sources: &'static [&'static str],
    cue: Option<&'static str>,
}

const PRE_EVENT_SEGMENTS: [CanonicalSegment; 5] = [
    CanonicalSegment {
        share: 15,
        tone: 4,
        sources: &["game.home_team", "game.away_team", "game.competition"],
        cue: None,
    },
    CanonicalSegment {
        share: 25,
        tone: 2,
        sources: &["standings", "form"],
        cue: Some("Now let's look at how these teams have been performing"),
    },
    CanonicalSegment {
        share: 25,
        tone: 3,
        sources: &["lineups", "injuries"],
        cue: Some("Turning to team news and availability"),
    },
    CanonicalSegment {
        share: 20,
        tone: 2,
        sources: &["lineups.formation", "pre_game_stats"],
        cue: Some("Let's break down the tactical battle"),
    },
    CanonicalSegment {
        share: 15,
        tone: 3,
        sources: &["betting"],
        cue: Some("Finally, what do the bookmakers think?"),
    },
];

const POST_EVENT_SEGMENTS: [CanonicalSegment; 5] = [
    CanonicalSegment {
        share: 20,
        tone: 5,
        sources: &["final_score", "winner"],
        cue: None,
    },
    CanonicalSegment {
        share: 30,
        tone: 4,
        sources: &["events"],
        cue: Some("Let's relive the key moments that shaped this match"),
    },
    CanonicalSegment {
        share: 25,
        tone: 2,
        sources: &["statistics"],
        cue: Some("Now let's analyze the numbers"),
    },
    CanonicalSegment {
        share: 15,
        tone: 3,
        sources: &["top_performers"],
        cue: Some("Turning to individual performances"),
    },
    CanonicalSegment {
        share: 10,
        tone: 2,
        sources: &["standings"],
        cue: Some("Finally, what does this mean for the league?"),
    },
];

const DEFAULT_PERFORMER: &str = "Key Player";

/// Build the canonical candidates for a phase.
///
/// Used whenever the oracle is unavailable or its proposal is unusable.
/// The priority of each candidate equals its time share, so proportional
/// allocation realizes the canonical split of `available_seconds`.
pub fn synthesize_fallback(
    context: &ContentContext,
    event: &EventSnapshot,
    phase: Phase,
    available_seconds: u32,
) -> Vec<SegmentCandidate> {
    let (templates, topics, facts) = match phase {
        Phase::PreEvent => (
            &PRE_EVENT_SEGMENTS,
            pre_event_topics(event),
            pre_event_facts(context, event),
        ),
        Phase::PostEvent => (
            &POST_EVENT_SEGMENTS,
            post_event_topics(context, event),
            post_event_facts(context, event),
        ),
    };

    let candidates: Vec<SegmentCandidate> = templates
        .iter()
        .zip(topics)
        .zip(facts)
        .map(|((template, topic), facts)| {
            let candidate = SegmentCandidate::new(topic, template.share, template.tone)
                .with_facts(facts)
                .with_sources(template.sources.iter().copied())
                .with_suggested_duration(share_of(available_seconds, template.share));
            match template.cue {
                Some(cue) => candidate.with_transition(cue),
                None => candidate,
            }
        })
        .collect();

    info!(
        "Synthesized {} fallback {} segments",
        candidates.len(),
        phase.display_name()
    );

    candidates
}

/// `percent` of `seconds`, rounded down
fn share_of(seconds: u32, percent: u32) -> u32 {
    u32::try_from(u64::from(seconds) * u64::from(percent) / 100).unwrap_or(u32::MAX)
}

fn pre_event_topics(event: &EventSnapshot) -> [String; 5] {
    [
        format!(
            "The {} vs {} Showdown: What's at Stake",
            event.home_team, event.away_team
        ),
        "Recent Form & Head-to-Head: The Story So Far".to_string(),
        "Team News: Injuries, Suspensions & Probable Lineups".to_string(),
        "Tactical Preview: Formations & Key Matchups".to_string(),
        "The Betting Angle: Odds & Predictions".to_string(),
    ]
}

fn post_event_topics(context: &ContentContext, event: &EventSnapshot) -> [String; 5] {
    let verdict = match event.final_score() {
        Some((home, away)) => format!(
            "{} {}-{} {}: The Final Verdict",
            event.home_team, home, away, event.away_team
        ),
        None => format!("{}: The Final Verdict", event.matchup()),
    };
    let performer = top_performer(context).unwrap_or_else(|| DEFAULT_PERFORMER.to_string());

    [
        verdict,
        "The Decisive Moments: Goals, Cards & Game-Changing Events".to_string(),
        "By the Numbers: Possession, Shots & Statistical Dominance".to_string(),
        format!("Man of the Match: {}'s Standout Performance", performer),
        "League Table Impact: How This Result Changes Everything".to_string(),
    ]
}

/// Key facts per canonical segment, taken only from data that is present
fn pre_event_facts(context: &ContentContext, event: &EventSnapshot) -> [Vec<String>; 5] {
    let mut stakes = vec![event.matchup()];
    if let Some(competition) = &event.competition {
        stakes.push(format!("Competition: {}", competition));
    }

    let mut form = Vec::new();
    if context.lookup(&["head_to_head"]).is_some() {
        form.push(format!(
            "Head-to-head record between {} and {}",
            event.home_team, event.away_team
        ));
    }

    [stakes, form, Vec::new(), Vec::new(), Vec::new()]
}

fn post_event_facts(context: &ContentContext, event: &EventSnapshot) -> [Vec<String>; 5] {
    let mut verdict = Vec::new();
    if let Some((home, away)) = event.final_score() {
        verdict.push(format!(
            "Final score: {} {}-{} {}",
            event.home_team, home, away, event.away_team
        ));
    }
    if let Some(team) = event.winning_team() {
        verdict.push(format!("Winner: {}", team));
    }

    let performer = top_performer(context)
        .map(|name| vec![format!("Top performer: {}", name)])
        .unwrap_or_default();

    [verdict, Vec::new(), Vec::new(), performer, Vec::new()]
}

/// Name of the first listed top performer
fn top_performer(context: &ContentContext) -> Option<String> {
    let first = context.lookup(&["top_performers"])?.as_array()?.first()?;
    let name = match first {
        Value::Object(fields) => fields
            .get("name")
            .or_else(|| fields.get("Name"))
            .filter(|v| is_present(v))
            .and_then(as_text),
        other => as_text(other),
    }?;
    let name = name.trim();
    (!name.is_empty()).then(|| name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn context(value: Value) -> ContentContext {
        ContentContext::from_value(value).unwrap()
    }

    #[test]
    fn test_pre_event_shape() {
        let ctx = context(json!({
            "game": {
                "home_team": {"name": "Arsenal"},
                "away_team": {"name": "Chelsea"},
                "competition": "Premier League"
            }
        }));
        let event = ctx.snapshot().unwrap();

        let candidates = synthesize_fallback(&ctx, &event, Phase::PreEvent, 233);

        assert_eq!(candidates.len(), 5);
        assert_eq!(
            candidates[0].topic,
            "The Arsenal vs Chelsea Showdown: What's at Stake"
        );
        assert_eq!(
            candidates.iter().map(|c| c.tone_level).collect::<Vec<_>>(),
            vec![4, 2, 3, 2, 3]
        );
        assert_eq!(
            candidates.iter().map(|c| c.priority).collect::<Vec<_>>(),
            vec![15, 25, 25, 20, 15]
        );
        assert_eq!(candidates[1].suggested_duration, 58);
        assert_eq!(
            candidates[0].key_facts,
            vec!["Arsenal vs Chelsea", "Competition: Premier League"]
        );
        assert!(candidates[0].transition_cue.is_none());
        assert!(candidates[1..].iter().all(|c| c.has_transition()));
        assert!(candidates.iter().all(|c| !c.source_refs.is_empty()));
    }

    #[test]
    fn test_suggested_durations_for_long_episodes() {
        let ctx = context(json!({"game": {"home_team": "Arsenal", "away_team": "Chelsea"}}));
        let event = ctx.snapshot().unwrap();

        let candidates = synthesize_fallback(&ctx, &event, Phase::PostEvent, 4_000_000_000);

        assert_eq!(
            candidates.iter().map(|c| c.suggested_duration).collect::<Vec<_>>(),
            vec![800_000_000, 1_200_000_000, 1_000_000_000, 600_000_000, 400_000_000]
        );
    }

    #[test]
    fn test_post_event_uses_score_and_performer() {
        let ctx = context(json!({
            "game": {
                "home_team": {"name": "Arsenal"},
                "away_team": {"name": "Chelsea"},
                "scrs": [3, 1],
                "winner": 0,
                "top_performers": [{"name": "Bukayo Saka"}]
            }
        }));
        let event = ctx.snapshot().unwrap();

        let candidates = synthesize_fallback(&ctx, &event, Phase::PostEvent, 500);

        assert_eq!(candidates[0].topic, "Arsenal 3-1 Chelsea: The Final Verdict");
        assert_eq!(
            candidates[0].key_facts,
            vec!["Final score: Arsenal 3-1 Chelsea", "Winner: Arsenal"]
        );
        assert_eq!(
            candidates[3].topic,
            "Man of the Match: Bukayo Saka's Standout Performance"
        );
        assert_eq!(
            candidates.iter().map(|c| c.tone_level).collect::<Vec<_>>(),
            vec![5, 4, 2, 3, 2]
        );
        assert_eq!(
            candidates.iter().map(|c| c.priority).sum::<u32>(),
            100
        );
    }

    #[test]
    fn test_post_event_without_data_stays_generic() {
        let ctx = context(json!({
            "game": {"home_team": "Arsenal", "away_team": "Chelsea"}
        }));
        let event = ctx.snapshot().unwrap();

        let candidates = synthesize_fallback(&ctx, &event, Phase::PostEvent, 500);

        assert_eq!(candidates[0].topic, "Arsenal vs Chelsea: The Final Verdict");
        assert!(candidates[0].key_facts.is_empty());
        assert_eq!(
            candidates[3].topic,
            "Man of the Match: Key Player's Standout Performance"
        );
    }

    #[test]
    fn test_fallback_is_deterministic() {
        let ctx = context(json!({
            "game": {"home_team": "A", "away_team": "B"}
        }));
        let event = ctx.snapshot().unwrap();

        assert_eq!(
            synthesize_fallback(&ctx, &event, Phase::PreEvent, 300),
            synthesize_fallback(&ctx, &event, Phase::PreEvent, 300)
        );
    }
}
