use tracing::debug;

use crate::models::SegmentCandidate;

/// Whether a fact is blank or one of the missing-data markers
pub fn is_placeholder_fact(fact: &str, markers: &[String]) -> bool {
    let normalized = fact.trim().to_uppercase();
    normalized.is_empty() || markers.iter().any(|m| normalized == m.to_uppercase())
}

/// A candidate is grounded if it keeps at least one real fact, or if it
/// records where its data came from. Blank references record nothing.
pub fn has_grounding(candidate: &SegmentCandidate, markers: &[String]) -> bool {
    candidate
        .key_facts
        .iter()
        .any(|fact| !is_placeholder_fact(fact, markers))
        || candidate
            .source_refs
            .iter()
            .any(|source| !source.trim().is_empty())
}

/// Apply the zero-tolerance rule for missing data.
///
/// Ungrounded candidates are removed without a trace; survivors keep their
/// order and lose any placeholder facts and blank source references.
pub fn apply_zero_tolerance(
    candidates: Vec<SegmentCandidate>,
    markers: &[String],
) -> Vec<SegmentCandidate> {
    candidates
        .into_iter()
        .filter(|candidate| {
            let keep = has_grounding(candidate, markers);
            if !keep {
                debug!("Dropping ungrounded candidate '{}'", candidate.topic);
            }
            keep
        })
        .map(|mut candidate| {
            candidate
                .key_facts
                .retain(|fact| !is_placeholder_fact(fact, markers));
            candidate
                .source_refs
                .retain(|source| !source.trim().is_empty());
            candidate
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heuristics::HeuristicsConfig;

    fn markers() -> Vec<String> {
        HeuristicsConfig::default().placeholder_markers
    }

    #[test]
    fn test_placeholder_detection() {
        let markers = markers();
        assert!(is_placeholder_fact("N/A", &markers));
        assert!(is_placeholder_fact("  not_available ", &markers));
        assert!(is_placeholder_fact("", &markers));
        assert!(!is_placeholder_fact("Won last 3: 2-1, 3-0, 1-0", &markers));
    }

    #[test]
    fn test_all_placeholder_candidates_are_removed() {
        let candidates = vec![
            SegmentCandidate::new("Injuries", 70, 3).with_facts(["N/A", "NOT_AVAILABLE"]),
            SegmentCandidate::new("Odds", 60, 3).with_facts(["n/a"]),
        ];
        assert!(apply_zero_tolerance(candidates, &markers()).is_empty());
    }

    #[test]
    fn test_source_refs_keep_a_candidate() {
        let candidates = vec![
            SegmentCandidate::new("Form", 70, 2)
                .with_facts(["N/A"])
                .with_sources(["form.home"]),
        ];
        let kept = apply_zero_tolerance(candidates, &markers());
        assert_eq!(kept.len(), 1);
        assert!(kept[0].key_facts.is_empty());
        assert_eq!(kept[0].source_refs, vec!["form.home".to_string()]);
    }

    #[test]
    fn test_blank_source_refs_do_not_ground() {
        let candidates = vec![
            SegmentCandidate::new("Ghost", 90, 3)
                .with_facts(["N/A"])
                .with_sources(["", "   "]),
            SegmentCandidate::new("Form", 70, 2).with_sources(["", "form.home"]),
        ];
        let kept = apply_zero_tolerance(candidates, &markers());
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].topic, "Form");
        assert_eq!(kept[0].source_refs, vec!["form.home".to_string()]);
    }

    #[test]
    fn test_placeholder_facts_are_stripped_from_survivors() {
        let candidates = vec![
            SegmentCandidate::new("Standings", 65, 2)
                .with_facts(["Arsenal: 2nd, 61 pts", "N/A", "Chelsea: 6th, 48 pts"]),
            SegmentCandidate::new("Nothing", 50, 3),
        ];
        let kept = apply_zero_tolerance(candidates, &markers());
        assert_eq!(kept.len(), 1);
        assert_eq!(
            kept[0].key_facts,
            vec!["Arsenal: 2nd, 61 pts".to_string(), "Chelsea: 6th, 48 pts".to_string()]
        );
    }
}
