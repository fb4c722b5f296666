use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::models::{EpisodeLineup, EpisodeSegment, SegmentKind};

const RUNDOWN_WIDTH: usize = 80;

/// Machine-readable lineup document
#[derive(Debug, Clone, Serialize)]
pub struct LineupDocument<'a> {
    /// The planned lineup
    pub lineup: &'a EpisodeLineup,
    /// Metadata about the planning run
    pub metadata: LineupMetadata,
}

#[derive(Debug, Clone, Serialize)]
pub struct LineupMetadata {
    pub document_id: String,
    /// RFC 3339 generation time
    pub generated_at: String,
    pub total_seconds: u32,
    pub segment_count: usize,
    pub content_segments: usize,
}

impl<'a> LineupDocument<'a> {
    pub fn new(lineup: &'a EpisodeLineup) -> Self {
        Self::with_timestamp(lineup, Utc::now())
    }

    /// Create with a fixed generation time
    pub fn with_timestamp(lineup: &'a EpisodeLineup, generated_at: DateTime<Utc>) -> Self {
        Self {
            lineup,
            metadata: LineupMetadata {
                document_id: Uuid::new_v4().to_string(),
                generated_at: generated_at.to_rfc3339(),
                total_seconds: lineup.total_seconds(),
                segment_count: lineup.segments.len(),
                content_segments: lineup.content_segments().count(),
            },
        }
    }

    /// Write to a JSON file
    pub fn write_json(&self, path: &Path) -> Result<()> {
        let file = std::fs::File::create(path)
            .with_context(|| format!("Failed to create file: {:?}", path))?;
        serde_json::to_writer_pretty(file, self).context("Failed to write JSON")?;
        Ok(())
    }
}

/// Human-readable production rundown
pub struct Rundown<'a> {
    lineup: &'a EpisodeLineup,
}

impl<'a> Rundown<'a> {
    pub fn new(lineup: &'a EpisodeLineup) -> Self {
        Self { lineup }
    }

    /// Format the lineup as a production rundown
    pub fn format(&self) -> String {
        let lineup = self.lineup;
        let heavy = "=".repeat(RUNDOWN_WIDTH);
        let light = "-".repeat(RUNDOWN_WIDTH);
        let mut output = String::new();

        output.push_str(&format!("{}\nPRODUCTION RUNDOWN\n{}\n\n", heavy, heavy));
        output.push_str(&format!("EPISODE:        {}\n", lineup.episode_title));
        output.push_str(&format!(
            "DURATION:       {} minutes\n",
            lineup.total_duration_minutes
        ));
        output.push_str(&format!("PHASE:          {}\n", lineup.phase.display_name()));
        output.push_str(&format!("PRIORITY SCORE: {:.1}/100\n\n", lineup.priority_score));
        output.push_str(&format!("{}\nSEGMENT BREAKDOWN\n{}\n\n", light, light));

        let mut elapsed = 0;
        for (i, segment) in lineup.segments.iter().enumerate() {
            output.push_str(&format!(
                "[{}] SEGMENT {}: {}\n",
                format_duration(elapsed),
                i + 1,
                segment.topic
            ));

            if segment.kind == SegmentKind::Sponsored {
                self.push_sponsored_block(&mut output);
            }

            output.push_str(&format!(
                "    Time: {}s (~{} words)\n",
                segment.duration_seconds, segment.estimated_word_count
            ));
            output.push_str(&format!(
                "    Tone: {}/5 {}\n",
                segment.tone_level,
                tone_description(segment.tone_level)
            ));

            if !segment.key_facts.is_empty() {
                output.push_str("    Key facts:\n");
                for fact in &segment.key_facts {
                    output.push_str(&format!("      - {}\n", fact));
                }
            }

            if i > 0 && !segment.transition_cue.is_empty() {
                output.push_str(&format!(
                    "    Transition from '{}':\n",
                    lineup.segments[i - 1].topic
                ));
                output.push_str(&indent(&wrap_text(&segment.transition_cue, 70), 6));
                output.push('\n');
            }

            output.push_str("    Producer note:\n");
            output.push_str(&indent(&wrap_text(producer_note(segment), 70), 6));
            output.push_str("\n\n");

            elapsed += segment.duration_seconds;
        }

        output.push_str(&format!(
            "{}\nTOTAL RUNTIME: {} ({} seconds)\n{}\n",
            light,
            format_duration(elapsed),
            elapsed,
            heavy
        ));

        output
    }

    fn push_sponsored_block(&self, output: &mut String) {
        let Some(sponsor) = &self.lineup.sponsored else {
            return;
        };

        output.push_str("    ** SPONSORED SEGMENT **\n");
        output.push_str(&format!("    Bookmaker: {}\n", sponsor.provider_name));
        output.push_str(&format!("    Market: {}\n", sponsor.market_label));
        if !sponsor.featured_odds.is_empty() {
            output.push_str("    Featured odds:\n");
            for (option, quote) in &sponsor.featured_odds {
                match (&quote.current, &quote.original) {
                    (Some(current), Some(original)) if current != original => {
                        output.push_str(&format!(
                            "      - {}: {} {} (opened {})\n",
                            option,
                            current,
                            quote.trend.arrow(),
                            original
                        ));
                    }
                    (Some(current), _) => {
                        output.push_str(&format!(
                            "      - {}: {} {}\n",
                            option,
                            current,
                            quote.trend.arrow()
                        ));
                    }
                    (None, _) => output.push_str(&format!("      - {}: unavailable\n", option)),
                }
            }
        }
        output.push_str(&format!(
            "    Prediction context: {}\n",
            sponsor.prediction_context
        ));
    }

    /// Write to a text file
    pub fn write_file(&self, path: &Path) -> Result<()> {
        let mut file = std::fs::File::create(path)
            .with_context(|| format!("Failed to create file: {:?}", path))?;
        write!(file, "{}", self.format())?;
        Ok(())
    }
}

/// Narration register for a tone level
pub fn tone_description(tone_level: u8) -> &'static str {
    match tone_level {
        1 => "Cold & Analytical (pure stats, no emotion)",
        2 => "Informative (factual but accessible)",
        3 => "Conversational (friendly, engaging)",
        4 => "Energetic (excited, animated)",
        5 => "High Octane (maximum energy, dramatic)",
        _ => "Conversational",
    }
}

/// Direction for the hosts, picked from the segment's role and lead fact
fn producer_note(segment: &EpisodeSegment) -> &'static str {
    match segment.kind {
        SegmentKind::Intro => {
            return "Open with energy and hook the listener: who is playing and why it matters.";
        }
        SegmentKind::Outro => {
            return "Close warmly. Recap the one thing to remember and sign off.";
        }
        SegmentKind::Sponsored => {
            return "Panel debate, not an advert. One host makes the safe pick, the other the \
                    upset, each backed by a fact from the context. Name the bookmaker and the \
                    market, and read the current and opening odds.";
        }
        SegmentKind::Content => {}
    }

    let Some(lead) = segment.key_facts.first() else {
        return "Keep it casual and conversational. Talk about the feeling of the fixture.";
    };
    let lead = lead.to_lowercase();
    let mentions = |words: &[&str]| words.iter().any(|w| lead.contains(w));

    if mentions(&["lineup", "formation", "starting"]) {
        "Tactical debate. Do not list the eleven; argue about the surprising choices and \
         the absences."
    } else if mentions(&["score", "goal"]) {
        "React to the result. Let the emotion of the scoreline come through without \
         getting toxic."
    } else if mentions(&["injury", "suspension"]) {
        "Discuss what the absence means for the team's chances, with concern or relief \
         depending on the side."
    } else if mentions(&["odds", "betting"]) {
        "Talk about what the odds say, not just the numbers."
    } else if mentions(&["form", "standings", "head-to-head"]) {
        "React to the form and the table. Speculation before kickoff, reflection after."
    } else {
        "Ask for the panel's take on the lead fact instead of just reading it out."
    }
}

/// Format seconds as MM:SS
pub fn format_duration(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// Wrap text at approximately the given width
fn wrap_text(text: &str, width: usize) -> String {
    let mut result = String::new();
    let mut line_len = 0;

    for word in text.split_whitespace() {
        if line_len + word.len() + 1 > width && line_len > 0 {
            result.push('\n');
            line_len = 0;
        }
        if line_len > 0 {
            result.push(' ');
            line_len += 1;
        }
        result.push_str(word);
        line_len += word.len();
    }

    result
}

fn indent(text: &str, width: usize) -> String {
    let pad = " ".repeat(width);
    text.lines()
        .map(|line| format!("{}{}", pad, line))
        .collect::<Vec<_>>()
        .join("\n")
}
