use nucleo_matcher::pattern::{AtomKind, CaseMatching, Normalization, Pattern};
use nucleo_matcher::{Config, Matcher, Utf32String};
use orgview_core::{EmployeeRecord, SearchFilter};
use serde::{Deserialize, Serialize};

pub const DEFAULT_AUTOCOMPLETE_LIMIT: usize = 8;

/// One fuzzy autocomplete hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    pub name: String,
    pub position: String,
    pub department: String,
    pub score: u32,
}

pub struct SearchEngine {
    // Nucleo matcher for fuzzy autocomplete
    matcher: Matcher,
    // Haystacks for nucleo: "name position department", indexed like `records`
    haystacks: Vec<Utf32String>,
    records: Vec<EmployeeRecord>,
}

impl SearchEngine {
    pub fn new(records: &[EmployeeRecord]) -> Self {
        let mut engine = Self {
            matcher: Matcher::new(Config::DEFAULT),
            haystacks: Vec::new(),
            records: Vec::new(),
        };
        engine.index_records(records);
        engine
    }

    /// Replace the indexed snapshot, e.g. after the directory changed.
    pub fn index_records(&mut self, records: &[EmployeeRecord]) {
        self.records = records.to_vec();
        self.haystacks = records
            .iter()
            .map(|r| Utf32String::from(format!("{} {} {}", r.name, r.position, r.department).as_str()))
            .collect();
        tracing::debug!(records = self.records.len(), "Indexed directory for search");
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Case-insensitive substring search over name, position and department.
    ///
    /// An empty query matches everyone; the filter is applied afterwards.
    pub fn search(&self, query: &str, filter: &SearchFilter) -> Vec<EmployeeRecord> {
        let needle = query.trim().to_lowercase();
        self.records
            .iter()
            .filter(|r| needle.is_empty() || matches_text(r, &needle))
            .filter(|r| filter.matches(r))
            .cloned()
            .collect()
    }

    /// Pick the person a free-text query most likely means: an exact name match
    /// wins, otherwise the first search result.
    pub fn best_match<'a>(query: &str, results: &'a [EmployeeRecord]) -> Option<&'a EmployeeRecord> {
        let wanted = query.trim().to_lowercase();
        results
            .iter()
            .find(|r| r.name.to_lowercase() == wanted)
            .or_else(|| results.first())
    }

    /// Fuzzy ranked suggestions for a partial query.
    pub fn autocomplete(&mut self, query: &str, limit: usize) -> Vec<Suggestion> {
        if query.trim().is_empty() || limit == 0 {
            return Vec::new();
        }

        let pattern = Pattern::new(
            query,
            CaseMatching::Ignore,
            Normalization::Smart,
            AtomKind::Fuzzy,
        );

        let mut matches: Vec<(usize, u32)> = Vec::new();
        for (index, haystack) in self.haystacks.iter().enumerate() {
            if let Some(score) = pattern.score(haystack.slice(..), &mut self.matcher) {
                matches.push((index, score));
            }
        }

        // Higher score first; directory order breaks ties.
        matches.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

        matches
            .into_iter()
            .take(limit)
            .map(|(index, score)| {
                let record = &self.records[index];
                Suggestion {
                    name: record.name.clone(),
                    position: record.position.clone(),
                    department: record.department.clone(),
                    score,
                }
            })
            .collect()
    }
}

fn matches_text(record: &EmployeeRecord, needle: &str) -> bool {
    record.name.to_lowercase().contains(needle)
        || record.position.to_lowercase().contains(needle)
        || record.department.to_lowercase().contains(needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, position: &str, department: &str, country: &str) -> EmployeeRecord {
        serde_json::from_value(serde_json::json!({
            "name": name,
            "position": position,
            "department": department,
            "country": country,
        }))
        .unwrap()
    }

    fn engine() -> SearchEngine {
        SearchEngine::new(&[
            record("Sarah Williams", "CEO", "Executive", "USA"),
            record("James Thompson", "CTO", "Engineering", "UK"),
            record("Oliver Davis", "Engineering Manager", "Engineering", "UK"),
            record("Hans Weber", "Principal Engineer", "Engineering", "Germany"),
            record("James", "Intern", "Sales", "USA"),
        ])
    }

    fn names(records: &[EmployeeRecord]) -> Vec<&str> {
        records.iter().map(|r| r.name.as_str()).collect()
    }

    #[test]
    fn test_empty_query_returns_everyone() {
        let engine = engine();
        assert_eq!(engine.search("", &SearchFilter::default()).len(), 5);
        assert_eq!(engine.search("   ", &SearchFilter::default()).len(), 5);
    }

    #[test]
    fn test_substring_over_name_position_department() {
        let engine = engine();
        assert_eq!(
            names(&engine.search("ENGINEER", &SearchFilter::default())),
            vec!["James Thompson", "Oliver Davis", "Hans Weber"]
        );
        assert_eq!(
            names(&engine.search("cto", &SearchFilter::default())),
            vec!["James Thompson"]
        );
    }

    #[test]
    fn test_filters_narrow_results() {
        let engine = engine();
        let filter = SearchFilter {
            department: Some("Engineering".to_string()),
            country: Some("UK".to_string()),
        };
        assert_eq!(
            names(&engine.search("", &filter)),
            vec!["James Thompson", "Oliver Davis"]
        );

        let ignored = SearchFilter {
            department: Some(String::new()),
            country: None,
        };
        assert_eq!(engine.search("", &ignored).len(), 5);
    }

    #[test]
    fn test_best_match_prefers_exact_name() {
        let engine = engine();
        let results = engine.search("james", &SearchFilter::default());
        assert_eq!(names(&results), vec!["James Thompson", "James"]);
        assert_eq!(
            SearchEngine::best_match("James", &results).map(|r| r.name.as_str()),
            Some("James")
        );
        assert_eq!(
            SearchEngine::best_match("jam", &results).map(|r| r.name.as_str()),
            Some("James Thompson")
        );
        assert!(SearchEngine::best_match("x", &[]).is_none());
    }

    #[test]
    fn test_autocomplete_is_fuzzy_and_limited() {
        let mut engine = engine();
        let hits = engine.autocomplete("hnswbr", 8);
        assert_eq!(hits.first().map(|s| s.name.as_str()), Some("Hans Weber"));

        let limited = engine.autocomplete("e", 2);
        assert_eq!(limited.len(), 2);
        assert!(limited[0].score >= limited[1].score);

        assert!(engine.autocomplete("", 8).is_empty());
        assert!(engine.autocomplete("zzzzzz", 8).is_empty());
    }

    #[test]
    fn test_reindex_replaces_snapshot() {
        let mut engine = engine();
        engine.index_records(&[record("Solo", "Founder", "Executive", "UK")]);
        assert_eq!(engine.len(), 1);
        assert_eq!(engine.autocomplete("solo", 8)[0].name, "Solo");
    }
}
