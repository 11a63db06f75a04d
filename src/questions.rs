//! The trivia question catalog.
//!
//! A static catalog is compiled into the binary; `QUESTIONS_FILE` can point
//! at a JSON file to replace it without rebuilding. The catalog is parsed
//! once at startup and shared read-only after that.

use crate::config::ServerConfig;
use crate::types::Question;
use rand::Rng;
use std::collections::HashSet;
use std::path::Path;

const EMBEDDED_CATALOG: &str = include_str!("../data/questions.json");

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read question catalog: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse question catalog: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone)]
pub struct QuestionBank {
    questions: Vec<Question>,
}

impl QuestionBank {
    /// Load the catalog: the configured file if one is set, otherwise the
    /// embedded default.
    pub fn load(config: &ServerConfig) -> Result<Self, CatalogError> {
        match &config.questions_file {
            Some(path) => Self::from_file(path),
            None => Ok(Self::from_json(EMBEDDED_CATALOG)?),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, CatalogError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(Self::from_json(&raw)?)
    }

    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        let questions: Vec<Question> = serde_json::from_str(raw)?;
        Ok(Self { questions })
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// All category names in the catalog, sorted and deduplicated.
    pub fn categories(&self) -> Vec<String> {
        let mut categories: Vec<String> =
            self.questions.iter().map(|q| q.category.clone()).collect();
        categories.sort();
        categories.dedup();
        categories
    }

    /// Draw a random question, restricted to `categories` (empty = all) and
    /// avoiding the indices in `exclude`. When the filtered catalog is
    /// exhausted the exclusion is ignored so long games still get questions.
    pub fn draw(
        &self,
        categories: &[String],
        exclude: &HashSet<usize>,
    ) -> Option<(usize, Question)> {
        let matching: Vec<usize> = self
            .questions
            .iter()
            .enumerate()
            .filter(|(_, q)| categories.is_empty() || categories.contains(&q.category))
            .map(|(i, _)| i)
            .collect();

        let fresh: Vec<usize> = matching
            .iter()
            .copied()
            .filter(|i| !exclude.contains(i))
            .collect();
        let pool = if fresh.is_empty() { matching } else { fresh };
        if pool.is_empty() {
            return None;
        }

        let mut rng = rand::rng();
        let index = pool[rng.random_range(0..pool.len())];
        Some((index, self.questions[index].clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn small_bank() -> QuestionBank {
        QuestionBank::from_json(
            r#"[
                {"category": "history", "question": "Year A?", "answer": 1900},
                {"category": "history", "question": "Year B?", "answer": 1950},
                {"category": "science", "question": "Count C?", "answer": 42}
            ]"#,
        )
        .unwrap()
    }

    #[test]
    fn embedded_catalog_parses() {
        let bank = QuestionBank::from_json(EMBEDDED_CATALOG).unwrap();
        assert!(!bank.is_empty());
        assert!(bank.categories().len() >= 3);
    }

    #[test]
    fn categories_are_sorted_and_unique() {
        let bank = small_bank();
        assert_eq!(bank.categories(), vec!["history", "science"]);
    }

    #[test]
    fn draw_respects_category_filter() {
        let bank = small_bank();
        for _ in 0..20 {
            let (_, q) = bank
                .draw(&["science".to_string()], &HashSet::new())
                .unwrap();
            assert_eq!(q.category, "science");
        }
    }

    #[test]
    fn draw_skips_excluded_indices() {
        let bank = small_bank();
        let exclude: HashSet<usize> = [0, 1].into_iter().collect();
        let (index, q) = bank.draw(&[], &exclude).unwrap();
        assert_eq!(index, 2);
        assert_eq!(q.category, "science");
    }

    #[test]
    fn draw_falls_back_when_everything_is_excluded() {
        let bank = small_bank();
        let exclude: HashSet<usize> = [0, 1, 2].into_iter().collect();
        assert!(bank.draw(&[], &exclude).is_some());
    }

    #[test]
    fn draw_unknown_category_matches_nothing() {
        let bank = small_bank();
        assert!(bank.draw(&["sports".to_string()], &HashSet::new()).is_none());
    }

    #[test]
    fn loads_catalog_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"category": "custom", "question": "How many?", "answer": 7}}]"#
        )
        .unwrap();

        let bank = QuestionBank::from_file(file.path()).unwrap();
        assert_eq!(bank.len(), 1);
        assert_eq!(bank.categories(), vec!["custom"]);
    }

    #[test]
    fn file_parse_errors_are_reported() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        assert!(matches!(
            QuestionBank::from_file(file.path()),
            Err(CatalogError::Parse(_))
        ));
    }
}
