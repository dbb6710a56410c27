//! Full-text matching and relevance scoring over title and description.
//!
//! # Design
//! Queries are tokenized the same way documents are: lowercased and split on
//! anything that is not alphanumeric (Hangul counts as alphanumeric). A todo
//! matches when it contains at least one positive term, none of the `-negated`
//! terms, and every `"quoted phrase"`. Scores grow with term frequency but
//! each repeat of a term is worth half the previous one, and terms weigh more
//! in short fields.

use tracing::debug;

use crate::derived::{ScoredTodo, TodoView};
use crate::error::TodoResult;
use crate::service::TodoService;
use crate::store::TodoStore;
use crate::types::Todo;

const TITLE_WEIGHT: f64 = 1.0;
const DESCRIPTION_WEIGHT: f64 = 1.0;

#[derive(Debug, Clone, PartialEq)]
pub struct TextQuery {
    raw: String,
    terms: Vec<String>,
    negated: Vec<String>,
    phrases: Vec<String>,
}

impl TextQuery {
    pub fn parse(raw: &str) -> Self {
        let mut terms = Vec::new();
        let mut negated = Vec::new();
        let mut phrases = Vec::new();

        // Odd segments sit between quotes.
        for (i, segment) in raw.split('"').enumerate() {
            if i % 2 == 1 {
                let phrase = segment.trim().to_lowercase();
                if !phrase.is_empty() {
                    push_unique(&mut terms, tokenize(&phrase));
                    phrases.push(phrase);
                }
                continue;
            }
            for word in segment.split_whitespace() {
                match word.strip_prefix('-') {
                    Some(rest) if !rest.is_empty() => push_unique(&mut negated, tokenize(rest)),
                    _ => push_unique(&mut terms, tokenize(word)),
                }
            }
        }

        Self {
            raw: raw.to_string(),
            terms,
            negated,
            phrases,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// True when nothing could ever match.
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Relevance of `todo`, or `None` when it does not match.
    pub fn score(&self, todo: &Todo) -> Option<f64> {
        if self.is_empty() {
            return None;
        }

        let title = tokenize(&todo.title);
        let description = todo.description.as_deref().map(tokenize).unwrap_or_default();

        if self
            .negated
            .iter()
            .any(|n| title.contains(n) || description.contains(n))
        {
            return None;
        }

        if !self.phrases.is_empty() {
            let title_lower = todo.title.to_lowercase();
            let description_lower = todo
                .description
                .as_deref()
                .map(str::to_lowercase)
                .unwrap_or_default();
            let all_present = self
                .phrases
                .iter()
                .all(|p| title_lower.contains(p) || description_lower.contains(p));
            if !all_present {
                return None;
            }
        }

        let score = TITLE_WEIGHT * self.field_score(&title)
            + DESCRIPTION_WEIGHT * self.field_score(&description);
        (score > 0.0).then_some(score)
    }

    fn field_score(&self, tokens: &[String]) -> f64 {
        if tokens.is_empty() {
            return 0.0;
        }
        let total = tokens.len() as f64;
        self.terms
            .iter()
            .map(|term| tokens.iter().filter(|t| *t == term).count())
            .filter(|&count| count > 0)
            .map(|count| {
                let count = count as f64;
                // 1 + 1/2 + 1/4 + ... for `count` occurrences.
                let freq = 2.0 * (1.0 - 0.5f64.powf(count));
                freq * (0.5 + 0.5 * count / total)
            })
            .sum()
    }
}

impl<S: TodoStore> TodoService<S> {
    /// Matching todos, most relevant first.
    pub async fn search(&self, query: &str) -> TodoResult<Vec<ScoredTodo>> {
        let query = TextQuery::parse(query);
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let mut hits = self.store.text_search(&query).await?;
        hits.sort_by(|a, b| b.1.total_cmp(&a.1));
        debug!(query = query.as_str(), hits = hits.len(), "text search");

        let now = self.now();
        Ok(hits
            .into_iter()
            .map(|(todo, score)| ScoredTodo {
                view: TodoView::new(todo, now),
                score,
            })
            .collect())
    }
}

fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}

fn push_unique(into: &mut Vec<String>, tokens: Vec<String>) {
    for token in tokens {
        if !into.contains(&token) {
            into.push(token);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Priority, TodoId};
    use chrono::Utc;

    fn todo(title: &str, description: Option<&str>) -> Todo {
        Todo {
            id: TodoId::new(),
            title: title.to_string(),
            description: description.map(str::to_string),
            completed: false,
            priority: Priority::Medium,
            due_date: None,
            tags: Vec::new(),
            category: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn matches_in_either_field_case_insensitively() {
        let query = TextQuery::parse("Milk");
        assert!(query.score(&todo("buy milk", None)).is_some());
        assert!(query.score(&todo("groceries", Some("MILK and eggs"))).is_some());
        assert!(query.score(&todo("groceries", Some("eggs"))).is_none());
    }

    #[test]
    fn matches_whole_tokens_only() {
        let query = TextQuery::parse("milk");
        assert!(query.score(&todo("buttermilk", None)).is_none());
    }

    #[test]
    fn any_positive_term_is_enough() {
        let query = TextQuery::parse("milk bread");
        assert!(query.score(&todo("bread", None)).is_some());
    }

    #[test]
    fn more_occurrences_and_shorter_fields_score_higher() {
        let query = TextQuery::parse("report");
        let once = query.score(&todo("write report for the quarterly review", None)).unwrap();
        let twice = query
            .score(&todo("write report", Some("report draft")))
            .unwrap();
        let short = query.score(&todo("report", None)).unwrap();
        assert!(twice > once);
        assert!(short > once);
    }

    #[test]
    fn both_fields_contribute() {
        let query = TextQuery::parse("milk");
        let title_only = query.score(&todo("milk", None)).unwrap();
        let both = query.score(&todo("milk", Some("milk"))).unwrap();
        assert!(both > title_only);
    }

    #[test]
    fn negated_terms_exclude() {
        let query = TextQuery::parse("milk -oat");
        assert!(query.score(&todo("milk", None)).is_some());
        assert!(query.score(&todo("oat milk", None)).is_none());
        assert!(query.score(&todo("milk", Some("the oat kind"))).is_none());
    }

    #[test]
    fn phrases_must_appear_verbatim() {
        let query = TextQuery::parse("\"buy milk\"");
        assert!(query.score(&todo("Buy milk today", None)).is_some());
        assert!(query.score(&todo("milk to buy", None)).is_none());
    }

    #[test]
    fn only_negations_match_nothing() {
        let query = TextQuery::parse("-milk");
        assert!(query.is_empty());
        assert!(query.score(&todo("bread", None)).is_none());
        assert!(TextQuery::parse("   ").is_empty());
    }

    #[test]
    fn hangul_is_tokenized() {
        let query = TextQuery::parse("우유");
        assert!(query.score(&todo("우유 사기", None)).is_some());
        assert_eq!(query.as_str(), "우유");
    }
}
