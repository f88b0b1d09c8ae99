//! Scoring weights for search results
//!
//! Match kinds score as follows by default:
//! - exact title term 15, partial title term 7
//! - exact body term 5, partial body term 2
//! - object name 11 (partial 6) plus a per-priority adjustment
//!
//! Section-title hits scale the title weight by how much of the title the
//! query covers.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Configurable weights for scoring factors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    /// Query term is a title term of the document
    pub title: i64,
    /// Query term is a substring of a title term
    pub partial_title: i64,
    /// Query term is a body term of the document
    pub term: i64,
    /// Query term is a substring of a body term
    pub partial_term: i64,
    /// Query word equals an object's full or last dotted name
    pub obj_name_match: i64,
    /// Query word is a substring of an object's last dotted name
    pub obj_partial_match: i64,
    /// Extra score by object priority (keys are priorities)
    pub obj_prio: BTreeMap<i32, i64>,
    /// Extra score for priorities missing from `obj_prio`
    pub obj_prio_default: i64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            title: 15,
            partial_title: 7,
            term: 5,
            partial_term: 2,
            obj_name_match: 11,
            obj_partial_match: 6,
            obj_prio: BTreeMap::from([(0, 15), (1, 5), (2, -5)]),
            obj_prio_default: 0,
        }
    }
}

impl ScoringWeights {
    /// Score adjustment for an object's priority
    pub fn object_priority(&self, priority: i32) -> i64 {
        self.obj_prio
            .get(&priority)
            .copied()
            .unwrap_or(self.obj_prio_default)
    }

    /// Score for a section title that contains the whole query
    pub fn section_title(&self, query_len: usize, title_len: usize, is_page_title: bool) -> i64 {
        if title_len == 0 {
            return 0;
        }
        let scaled = (self.title as f64 * query_len as f64 / title_len as f64).round() as i64;
        scaled + i64::from(is_page_title)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_priority() {
        let weights = ScoringWeights::default();
        assert_eq!(weights.object_priority(0), 15);
        assert_eq!(weights.object_priority(2), -5);
        assert_eq!(weights.object_priority(7), 0);
    }

    #[test]
    fn test_section_title_scaling() {
        let weights = ScoringWeights::default();
        assert_eq!(weights.section_title(7, 7, true), 16);
        assert_eq!(weights.section_title(7, 14, false), 8);
        assert_eq!(weights.section_title(3, 0, false), 0);
    }

    #[test]
    fn test_partial_config() {
        let weights: ScoringWeights = serde_json::from_str(r#"{"title": 20}"#).unwrap();
        assert_eq!(weights.title, 20);
        assert_eq!(weights.term, 5);
        assert_eq!(weights.obj_prio.len(), 3);
    }
}
