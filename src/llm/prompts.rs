use anyhow::{Context, Result};

use crate::models::{ContentContext, Phase};

/// Number of context key paths listed in the prompt
const MAX_PROMPT_KEYS: usize = 50;

/// System prompt for the planning oracle (non-negotiable constraints)
pub const SYSTEM_PROMPT: &str = r#"You are the producer of a sports podcast. You analyze event data and return a prioritized content plan.

RULES:
1. Use ONLY facts present in the provided context JSON. Never invent data.
2. If a data point is missing or marked "NOT_AVAILABLE", do not create a segment for it and never mention that it is missing.
3. For each segment, list the exact facts in "key_facts" and the JSON key paths they come from in "source_refs".
4. Use only data that fits the episode phase: pre-event episodes use pre-event data (form, head-to-head, probable lineups, injuries, odds, standings); post-event episodes use post-event data (result, events, statistics, top performers, updated standings).
5. Follow the narrative flow given in the request, in order.
6. Segment titles must be specific to this event (player names, moments, numbers), not generic.

TONE SCALE (tone_level):
1: Cold/Analytical
2: Informative
3: Conversational (default)
4: Energetic
5: High Octane

Consecutive segments must not differ by more than 2 tone levels. Give every segment after the first a short transition_cue."#;

/// Canonical narrative flow for a phase
pub fn narrative_flow(phase: Phase) -> &'static str {
    match phase {
        Phase::PreEvent => {
            "1. The Hook: match basics and what is at stake\n\
             2. Contextual Landscape: standings, recent form, head-to-head\n\
             3. The Personnel: injuries, suspensions, probable lineups\n\
             4. The X-Factor: tactics and key matchups\n\
             5. The Smart Money: odds movement, trends, predictions"
        }
        Phase::PostEvent => {
            "1. The Hook: final score and result\n\
             2. Key Moments: goals, cards, substitutions, VAR decisions\n\
             3. Statistical Breakdown: possession, shots, passing\n\
             4. Man of the Match: top performers and ratings\n\
             5. League Impact: standings changes and implications"
        }
    }
}

/// Build the user prompt for a planning request
pub fn build_planning_prompt(
    context: &ContentContext,
    phase: Phase,
    total_minutes: u32,
) -> Result<String> {
    let filtered = context.filter_for_phase(phase);
    let context_json =
        serde_json::to_string_pretty(&filtered).context("Failed to serialize content context")?;
    let keys = filtered.available_keys(MAX_PROMPT_KEYS);

    let mut prompt = String::new();

    prompt.push_str(&format!("# {} episode plan\n", phase.label()));
    prompt.push_str(&format!("Total duration: {} minutes\n\n", total_minutes));

    prompt.push_str("## Narrative Flow (follow this order)\n");
    prompt.push_str(narrative_flow(phase));
    prompt.push_str("\n\n");

    prompt.push_str("## Available Data Keys (sample)\n");
    for key in &keys {
        prompt.push_str(&format!("- {}\n", key));
    }
    prompt.push('\n');

    prompt.push_str("## Context (ONLY use data from this JSON)\n");
    prompt.push_str("```json\n");
    prompt.push_str(&context_json);
    prompt.push_str("\n```\n\n");

    prompt.push_str(&format!(
        "Submit the plan with the submit_lineup_plan tool. Only include segments backed by \
         facts for this {} episode.\n",
        phase.display_name()
    ));

    Ok(prompt)
}
