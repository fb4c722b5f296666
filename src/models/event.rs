use serde::{Deserialize, Serialize};

/// Narrative phase of an episode relative to the event it covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    /// The event has not been played yet (preview episode)
    PreEvent,
    /// The event is over or in progress (analysis episode)
    PostEvent,
}

impl Phase {
    /// Wire label ("PRE_EVENT" / "POST_EVENT")
    pub fn label(&self) -> &'static str {
        match self {
            Phase::PreEvent => "PRE_EVENT",
            Phase::PostEvent => "POST_EVENT",
        }
    }

    /// Label used in titles and rundowns
    pub fn display_name(&self) -> &'static str {
        match self {
            Phase::PreEvent => "PRE-EVENT",
            Phase::PostEvent => "POST-EVENT",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Read-only view of a single event as delivered by the sports feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventSnapshot {
    /// Feed identifier of the event, if known
    pub event_id: Option<i64>,
    /// Home competitor name
    pub home_team: String,
    /// Away competitor name
    pub away_team: String,
    /// Competition display name
    pub competition: Option<String>,
    /// Raw score entries as reported by the feed (-1 means "no score")
    pub scores: Vec<i64>,
    /// Winner indicator: 0 = home, 1 = away, negative = none
    pub winner: Option<i64>,
    /// Feed status code
    pub status_code: i64,
    /// Scheduled start time, unparsed
    pub start_time: Option<String>,
    /// Whether the feed marked the event as started
    pub is_started: bool,
}

impl EventSnapshot {
    /// Create a snapshot for an upcoming event between two competitors
    pub fn new(home_team: impl Into<String>, away_team: impl Into<String>) -> Self {
        Self {
            event_id: None,
            home_team: home_team.into(),
            away_team: away_team.into(),
            competition: None,
            scores: Vec::new(),
            winner: None,
            status_code: 0,
            start_time: None,
            is_started: false,
        }
    }

    /// At least two score entries with a positive, valid value among them
    pub fn has_positive_score(&self) -> bool {
        self.scores.len() >= 2 && self.scores.iter().any(|&s| s > 0)
    }

    /// Winner indicator present and non-negative
    pub fn has_winner(&self) -> bool {
        self.winner.is_some_and(|w| w >= 0)
    }

    /// Final score pair, when both entries are valid
    pub fn final_score(&self) -> Option<(i64, i64)> {
        match self.scores.as_slice() {
            [home, away, ..] if *home >= 0 && *away >= 0 => Some((*home, *away)),
            _ => None,
        }
    }

    /// Name of the winning side, if the feed reports one
    pub fn winning_team(&self) -> Option<&str> {
        match self.winner {
            Some(0) => Some(&self.home_team),
            Some(1) => Some(&self.away_team),
            _ => None,
        }
    }

    /// "Home vs Away"
    pub fn matchup(&self) -> String {
        format!("{} vs {}", self.home_team, self.away_team)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positive_score_ignores_missing_entries() {
        let mut event = EventSnapshot::new("Hapoel", "Maccabi");
        event.scores = vec![-1, -1];
        assert!(!event.has_positive_score());

        event.scores = vec![0, 0];
        assert!(!event.has_positive_score());

        event.scores = vec![-1, 2];
        assert!(event.has_positive_score());

        event.scores = vec![3];
        assert!(!event.has_positive_score());
    }

    #[test]
    fn test_winning_team() {
        let mut event = EventSnapshot::new("Hapoel", "Maccabi");
        assert_eq!(event.winning_team(), None);

        event.winner = Some(1);
        assert_eq!(event.winning_team(), Some("Maccabi"));

        event.winner = Some(-1);
        assert!(!event.has_winner());
    }

    #[test]
    fn test_phase_serializes_as_label() {
        let json = serde_json::to_string(&Phase::PostEvent).unwrap();
        assert_eq!(json, "\"POST_EVENT\"");
        assert_eq!(Phase::PreEvent.to_string(), "PRE_EVENT");
    }
}
