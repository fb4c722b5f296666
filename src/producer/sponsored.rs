use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::models::{
    ContentContext, EpisodeSegment, EventSnapshot, OddsQuote, OddsTrend, Phase, SegmentKind,
    SponsoredSegmentConfig, as_int, as_text, is_present,
};

/// Market type code for the full-time result (1X2) market
const FULL_TIME_RESULT_CODE: i64 = 1;
/// Market type codes for over/under totals
const OVER_UNDER_CODES: [i64; 3] = [3, 6, 9];
const DEFAULT_OVER_UNDER_LINE: &str = "2.5";
/// Options featured on air
const MAX_FEATURED_OPTIONS: usize = 3;
const SPONSORED_TONE: u8 = 3;

/// Configuration for the sponsored segment
#[derive(Debug, Clone)]
pub struct SponsoredConfig {
    /// Bookmaker named when the market data carries none
    pub default_provider: String,
    /// Fixed title of the segment
    pub segment_title: String,
    /// Bridge into the segment
    pub transition_cue: String,
}

impl Default for SponsoredConfig {
    fn default() -> Self {
        Self {
            default_provider: "365Scores".to_string(),
            segment_title: "The Final Ticket".to_string(),
            transition_cue: "Now let's talk about where the smart money is going".to_string(),
        }
    }
}

/// Build the market data for the sponsored segment.
///
/// Always succeeds: without market data a placeholder home/draw/away
/// market with unavailable odds is used.
pub fn build_sponsored_config(
    context: &ContentContext,
    event: &EventSnapshot,
    phase: Phase,
    config: &SponsoredConfig,
) -> SponsoredSegmentConfig {
    let market = context
        .event_value(&["betting", "main_odds", "MainOdds", "mainOdds"])
        .or_else(|| context.context_value(&["betting", "relevant_odds"]))
        .and_then(Value::as_object);

    let sponsor = match market {
        Some(market) => SponsoredSegmentConfig {
            market_label: market_label(market),
            provider_name: field(market, &["bookmaker", "Bookmaker"])
                .and_then(as_text)
                .filter(|name| !name.trim().is_empty())
                .unwrap_or_else(|| config.default_provider.clone()),
            featured_odds: featured_odds(market),
            prediction_context: prediction_context(context, event, phase),
        },
        None => {
            warn!("No market data in context, using placeholder odds for the sponsored segment");
            placeholder_config(context, event, phase, config)
        }
    };

    info!(
        "Sponsored segment: {} / {} ({} options)",
        sponsor.provider_name,
        sponsor.market_label,
        sponsor.featured_odds.len()
    );

    sponsor
}

/// Build the sponsored segment itself, timed to `duration_seconds`
pub fn build_sponsored_segment(
    sponsor: &SponsoredSegmentConfig,
    event: &EventSnapshot,
    phase: Phase,
    duration_seconds: u32,
    config: &SponsoredConfig,
) -> EpisodeSegment {
    let mut facts: Vec<String> = sponsor
        .featured_odds
        .iter()
        .filter_map(|(name, quote)| {
            quote
                .current
                .as_ref()
                .map(|rate| format!("{}: {} {}", name, rate, quote.trend.arrow()))
        })
        .collect();

    facts.push(format!("Market: {}", sponsor.market_label));
    facts.push(format!("Bookmaker: {}", sponsor.provider_name));
    facts.push(match (phase, event.winning_team()) {
        (Phase::PreEvent, _) => {
            "Panel Prediction Challenge: predict the outcome of this match".to_string()
        }
        (Phase::PostEvent, Some(team)) => {
            format!("Panel Prediction Challenge: predict {}'s next result", team)
        }
        (Phase::PostEvent, None) => {
            "Panel Prediction Challenge: predict what comes next for both sides".to_string()
        }
    });

    EpisodeSegment::new(
        SegmentKind::Sponsored,
        config.segment_title.clone(),
        SPONSORED_TONE,
        duration_seconds,
    )
    .with_facts(facts)
    .with_sources(vec!["betting".to_string(), "main_odds".to_string()])
    .with_transition(config.transition_cue.clone())
}

fn placeholder_config(
    context: &ContentContext,
    event: &EventSnapshot,
    phase: Phase,
    config: &SponsoredConfig,
) -> SponsoredSegmentConfig {
    let featured_odds = ["Home Win", "Draw", "Away Win"]
        .into_iter()
        .map(|name| (name.to_string(), OddsQuote::unavailable()))
        .collect();

    SponsoredSegmentConfig {
        market_label: "Full-time Result".to_string(),
        provider_name: config.default_provider.clone(),
        featured_odds,
        prediction_context: prediction_context(context, event, phase),
    }
}

fn field<'a>(map: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| map.get(*key))
        .find(|value| is_present(value))
}

fn market_label(market: &Map<String, Value>) -> String {
    let Some(kind) = field(market, &["type", "Type"]) else {
        return "Full-time Result".to_string();
    };

    let code = as_int(kind);
    let text = as_text(kind).unwrap_or_default();

    if code == Some(FULL_TIME_RESULT_CODE) || text.eq_ignore_ascii_case("1X2") {
        return "Full-time Result".to_string();
    }

    let over_under = code.is_some_and(|c| OVER_UNDER_CODES.contains(&c))
        || text.to_lowercase().contains("over");
    if over_under {
        let line = field(market, &["overunder", "P"])
            .and_then(as_text)
            .unwrap_or_else(|| DEFAULT_OVER_UNDER_LINE.to_string());
        return format!("Over/Under {}", line);
    }

    "Full-time Result".to_string()
}

fn featured_odds(market: &Map<String, Value>) -> Vec<(String, OddsQuote)> {
    let Some(options) = field(market, &["options", "Options"]).and_then(Value::as_array) else {
        return Vec::new();
    };

    options
        .iter()
        .filter_map(Value::as_object)
        .take(MAX_FEATURED_OPTIONS)
        .filter_map(|option| {
            let name = field(option, &["name", "Name"]).and_then(as_text)?;
            let current = field(option, &["rate", "Rate"])
                .and_then(as_text)
                .filter(|rate| !is_unavailable(rate));
            let original = field(option, &["original_rate", "OriginalRate"])
                .and_then(as_text)
                .filter(|rate| !is_unavailable(rate))
                .or_else(|| current.clone());
            let trend = field(option, &["trend", "Trend"])
                .and_then(as_int)
                .map(OddsTrend::from_code)
                .unwrap_or(OddsTrend::Steady);

            Some((
                name.trim().to_string(),
                OddsQuote {
                    current,
                    original,
                    trend,
                },
            ))
        })
        .collect()
}

fn is_unavailable(rate: &str) -> bool {
    let rate = rate.trim();
    rate.is_empty() || rate.eq_ignore_ascii_case("N/A")
}

/// One-line basis for the panel's prediction
fn prediction_context(context: &ContentContext, event: &EventSnapshot, phase: Phase) -> String {
    match phase {
        Phase::PreEvent => {
            if context.lookup(&["head_to_head"]).is_some() {
                "Based on head-to-head records and recent form".to_string()
            } else if context.lookup(&["form"]).is_some() {
                "Based on recent team form and league standings".to_string()
            } else {
                "Based on available match data".to_string()
            }
        }
        Phase::PostEvent => {
            let next_fixture = context
                .context_value(&["next_matches", "upcoming_fixtures", "next_games", "future_matches"])
                .or_else(|| context.event_value(&["next_match", "nextMatch", "upcoming_match"]));

            match (event.winning_team(), next_fixture) {
                (Some(team), Some(_)) => {
                    format!("Based on the result and a look-ahead to {}'s next fixture", team)
                }
                _ => "Based on match performance".to_string(),
            }
        }
    }
}
