use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{EventSnapshot, Phase};
use crate::planner::PlanningError;

/// Event-record keys that only make sense once the event is over
const POST_EVENT_KEYS: &[&str] = &[
    "final_score",
    "winner",
    "events",
    "statistics",
    "top_performers",
    "actual_play_time",
    "betting_result",
    "detailed_statistics",
];

/// Event-record keys that only make sense before kickoff
const PRE_EVENT_KEYS: &[&str] = &["pre_game_stats", "lineups_status"];

/// Enriched event context: the event record plus standings, form, odds,
/// news and lineups, keyed by name.
///
/// The planner only reads from it. Absent keys are tolerated everywhere
/// except the two competitor names.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentContext {
    values: Map<String, Value>,
}

impl ContentContext {
    pub fn new(values: Map<String, Value>) -> Self {
        Self { values }
    }

    /// Wrap a JSON value; only objects are valid contexts
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(values) => Some(Self { values }),
            _ => None,
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.values
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The event record: `game`, else the first of `games`, else `game_data`
    pub fn event_record(&self) -> Option<&Map<String, Value>> {
        if let Some(Value::Object(game)) = self.values.get("game") {
            return Some(game);
        }
        if let Some(Value::Array(games)) = self.values.get("games") {
            if let Some(Value::Object(game)) = games.first() {
                return Some(game);
            }
        }
        match self.values.get("game_data") {
            Some(Value::Object(game)) => Some(game),
            _ => None,
        }
    }

    /// First non-empty value among `keys` on the event record
    pub fn event_value(&self, keys: &[&str]) -> Option<&Value> {
        let record = self.event_record()?;
        keys.iter()
            .filter_map(|key| record.get(*key))
            .find(|value| is_present(value))
    }

    /// First non-empty value among `keys` at the top level
    pub fn context_value(&self, keys: &[&str]) -> Option<&Value> {
        keys.iter()
            .filter_map(|key| self.values.get(*key))
            .find(|value| is_present(value))
    }

    /// Look a datum up on the event record first, then at the top level
    pub fn lookup(&self, keys: &[&str]) -> Option<&Value> {
        self.event_value(keys).or_else(|| self.context_value(keys))
    }

    /// Extract the event snapshot the classifier and composers work from
    pub fn snapshot(&self) -> Result<EventSnapshot, PlanningError> {
        let record = self
            .event_record()
            .ok_or(PlanningError::MissingField("game"))?;

        let home_team = team_name(record, &["home_team", "HomeTeam"])
            .ok_or(PlanningError::MissingField("game.home_team.name"))?;
        let away_team = team_name(record, &["away_team", "AwayTeam"])
            .ok_or(PlanningError::MissingField("game.away_team.name"))?;

        let scores = first_of(record, &["scrs", "scores"])
            .and_then(Value::as_array)
            .map(|entries| entries.iter().filter_map(as_int).collect::<Vec<_>>())
            .filter(|entries| !entries.is_empty())
            .or_else(|| final_score_pair(record))
            .unwrap_or_default();

        Ok(EventSnapshot {
            event_id: first_of(record, &["game_id", "gid"]).and_then(as_int),
            home_team,
            away_team,
            competition: first_of(record, &["competition", "competition_display_name"])
                .and_then(as_text)
                .filter(|c| !c.trim().is_empty()),
            scores,
            winner: first_of(record, &["winner", "Winner"]).and_then(as_int),
            status_code: first_of(record, &["game_status", "gt"])
                .and_then(as_int)
                .unwrap_or(0),
            start_time: first_of(record, &["start_time", "stime"]).and_then(as_text),
            is_started: first_of(record, &["is_started", "IsStarted"])
                .and_then(Value::as_bool)
                .unwrap_or(false),
        })
    }

    /// Copy of the context with data from the opposite phase removed from
    /// the event record(s)
    pub fn filter_for_phase(&self, phase: Phase) -> ContentContext {
        let drop_keys = match phase {
            Phase::PreEvent => POST_EVENT_KEYS,
            Phase::PostEvent => PRE_EVENT_KEYS,
        };

        let mut filtered = self.values.clone();

        for key in ["game", "game_data"] {
            if let Some(Value::Object(record)) = filtered.get_mut(key) {
                for drop in drop_keys {
                    record.remove(*drop);
                }
            }
        }

        if let Some(Value::Array(games)) = filtered.get_mut("games") {
            for game in games.iter_mut() {
                if let Value::Object(record) = game {
                    for drop in drop_keys {
                        record.remove(*drop);
                    }
                }
            }
        }

        ContentContext::new(filtered)
    }

    /// Dotted key paths present in the context, for prompt grounding.
    /// Arrays of objects contribute their first element as `key[0]`.
    pub fn available_keys(&self, limit: usize) -> Vec<String> {
        let mut keys = Vec::new();
        collect_keys(&self.values, "", &mut keys);
        keys.truncate(limit);
        keys
    }
}

fn collect_keys(map: &Map<String, Value>, prefix: &str, keys: &mut Vec<String>) {
    for (key, value) in map {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", prefix, key)
        };
        keys.push(path.clone());

        match value {
            Value::Object(inner) => collect_keys(inner, &path, keys),
            Value::Array(items) => {
                if let Some(Value::Object(first)) = items.first() {
                    let indexed = format!("{}[0]", path);
                    keys.push(indexed.clone());
                    collect_keys(first, &indexed, keys);
                }
            }
            _ => {}
        }
    }
}

fn first_of<'a>(record: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| record.get(*key))
        .find(|value| !value.is_null())
}

fn team_name(record: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    let team = first_of(record, keys)?;
    let name = match team {
        Value::Object(fields) => fields
            .get("name")
            .or_else(|| fields.get("Name"))
            .and_then(as_text),
        other => as_text(other),
    }?;
    let name = name.trim();
    (!name.is_empty()).then(|| name.to_string())
}

fn final_score_pair(record: &Map<String, Value>) -> Option<Vec<i64>> {
    let score = record.get("final_score")?.as_object()?;
    let home = score.get("home").and_then(as_int)?;
    let away = score.get("away").and_then(as_int)?;
    Some(vec![home, away])
}

/// Non-null, non-empty, non-false
pub fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::String(s) => !s.trim().is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(fields) => !fields.is_empty(),
        Value::Number(_) => true,
    }
}

/// Integer from a JSON number or numeric string
pub fn as_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Text from a JSON string or number
pub fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn context(value: Value) -> ContentContext {
        ContentContext::from_value(value).unwrap()
    }

    #[test]
    fn test_snapshot_from_game_record() {
        let ctx = context(json!({
            "game": {
                "gid": 4242,
                "gt": 1,
                "home_team": {"name": "Hapoel Tel Aviv"},
                "away_team": {"name": "Maccabi Haifa"},
                "scrs": [2, 1],
                "winner": 0,
                "competition": "Ligat Ha'Al",
                "stime": "14-03-2025 19:30"
            }
        }));

        let snapshot = ctx.snapshot().unwrap();
        assert_eq!(snapshot.event_id, Some(4242));
        assert_eq!(snapshot.home_team, "Hapoel Tel Aviv");
        assert_eq!(snapshot.away_team, "Maccabi Haifa");
        assert_eq!(snapshot.scores, vec![2, 1]);
        assert_eq!(snapshot.status_code, 1);
        assert_eq!(snapshot.competition.as_deref(), Some("Ligat Ha'Al"));
        assert_eq!(snapshot.start_time.as_deref(), Some("14-03-2025 19:30"));
    }

    #[test]
    fn test_snapshot_falls_back_to_games_array_and_final_score() {
        let ctx = context(json!({
            "games": [{
                "game_status": 163,
                "home_team": {"name": "Arsenal"},
                "away_team": {"name": "Chelsea"},
                "final_score": {"home": 0, "away": 3}
            }]
        }));

        let snapshot = ctx.snapshot().unwrap();
        assert_eq!(snapshot.scores, vec![0, 3]);
        assert_eq!(snapshot.status_code, 163);
        assert_eq!(snapshot.final_score(), Some((0, 3)));
    }

    #[test]
    fn test_snapshot_requires_both_competitors() {
        let ctx = context(json!({"game": {"home_team": {"name": "Arsenal"}}}));
        match ctx.snapshot() {
            Err(PlanningError::MissingField(field)) => assert_eq!(field, "game.away_team.name"),
            other => panic!("unexpected result: {:?}", other),
        }

        let empty = ContentContext::default();
        assert!(matches!(
            empty.snapshot(),
            Err(PlanningError::MissingField("game"))
        ));
    }

    #[test]
    fn test_filter_for_phase_removes_opposite_phase_data() {
        let ctx = context(json!({
            "game": {
                "home_team": {"name": "A"},
                "away_team": {"name": "B"},
                "final_score": {"home": 1, "away": 0},
                "events": [{"type": 1}],
                "pre_game_stats": {"shots": 4}
            },
            "standings": {"home": 3}
        }));

        let pre = ctx.filter_for_phase(Phase::PreEvent);
        let record = pre.event_record().unwrap();
        assert!(record.get("final_score").is_none());
        assert!(record.get("events").is_none());
        assert!(record.get("pre_game_stats").is_some());
        assert!(pre.get("standings").is_some());

        let post = ctx.filter_for_phase(Phase::PostEvent);
        let record = post.event_record().unwrap();
        assert!(record.get("final_score").is_some());
        assert!(record.get("pre_game_stats").is_none());

        // the source context is untouched
        assert!(ctx.event_record().unwrap().get("final_score").is_some());
    }

    #[test]
    fn test_available_keys() {
        let ctx = context(json!({
            "game": {"home_team": {"name": "A"}},
            "news": [{"title": "x"}]
        }));
        let keys = ctx.available_keys(50);
        assert!(keys.contains(&"game.home_team.name".to_string()));
        assert!(keys.contains(&"news[0].title".to_string()));

        assert_eq!(ctx.available_keys(2).len(), 2);
    }
}
