use std::collections::HashSet;
use std::path::Path;

use anyhow::Context;
use serde::Deserialize;
use serde_json::Value;

use crate::{error::EngineError, models::Recipe};

/// Accepted top-level corpus layouts
#[derive(Deserialize)]
#[serde(untagged)]
enum CorpusDocument {
    List(Vec<Value>),
    Wrapped { recipes: Vec<Value> },
}

/// Result of decoding a corpus: usable recipes plus the records that were skipped
#[derive(Debug, Default)]
pub struct LoadedCorpus {
    pub recipes: Vec<Recipe>,
    pub skipped: Vec<EngineError>,
}

/// Reads the recipe corpus from a JSON file
///
/// A missing or unparsable file is an error; individual bad records are not.
pub async fn load_from_file(path: impl AsRef<Path>) -> anyhow::Result<LoadedCorpus> {
    let path = path.as_ref();
    let contents = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read recipe corpus {}", path.display()))?;

    let corpus = parse(&contents)
        .with_context(|| format!("Failed to parse recipe corpus {}", path.display()))?;

    tracing::info!(
        path = %path.display(),
        recipes = corpus.recipes.len(),
        skipped = corpus.skipped.len(),
        "Loaded recipe corpus"
    );

    Ok(corpus)
}

/// Decodes a corpus document, either a bare array or `{"recipes": [...]}`
///
/// Each record is decoded on its own. Records that do not decode, or that
/// repeat an earlier ID, are skipped and reported.
pub fn parse(contents: &str) -> anyhow::Result<LoadedCorpus> {
    let document: CorpusDocument = serde_json::from_str(contents)?;
    let records = match document {
        CorpusDocument::List(records) | CorpusDocument::Wrapped { recipes: records } => records,
    };

    let mut corpus = LoadedCorpus::default();
    let mut seen_ids = HashSet::new();

    for (position, record) in records.into_iter().enumerate() {
        let id = record
            .get("id")
            .and_then(Value::as_u64)
            .and_then(|id| u32::try_from(id).ok());

        let error = match serde_json::from_value::<Recipe>(record) {
            Ok(recipe) if seen_ids.insert(recipe.id) => {
                corpus.recipes.push(recipe);
                continue;
            }
            Ok(recipe) => EngineError::MalformedRecipe {
                id: recipe.id,
                reason: "duplicate recipe id".to_string(),
            },
            Err(e) => EngineError::MalformedRecipe {
                id: id.unwrap_or_default(),
                reason: e.to_string(),
            },
        };

        tracing::warn!(position, error = %error, "Skipping recipe record");
        corpus.skipped.push(error);
    }

    Ok(corpus)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_bare_array() {
        let corpus = parse(r#"[{"id": 1, "name": "Toast", "ingredients": ["bread"]}]"#).unwrap();
        assert_eq!(corpus.recipes.len(), 1);
        assert!(corpus.skipped.is_empty());
    }

    #[test]
    fn test_parse_wrapped_object() {
        let corpus = parse(
            r#"{"recipes": [
                {"id": 1, "name": "Toast", "ingredients": ["bread"]},
                {"id": 2, "name": "Jam Toast", "ingredients": ["bread", "jam"]}
            ]}"#,
        )
        .unwrap();
        assert_eq!(corpus.recipes.len(), 2);
        assert_eq!(corpus.recipes[1].name, "Jam Toast");
    }

    #[test]
    fn test_malformed_records_are_skipped() {
        let corpus = parse(
            r#"[
                {"id": 1, "name": "Toast", "ingredients": ["bread"]},
                {"name": "No Id"},
                {"id": 3, "ingredients": ["egg"]},
                {"id": 4, "name": "Bad Time", "cooking_time": "soon"},
                {"id": 5, "name": "Soup", "ingredients": ["water"]}
            ]"#,
        )
        .unwrap();

        let ids: Vec<u32> = corpus.recipes.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 5]);
        assert_eq!(corpus.skipped.len(), 3);
        assert!(matches!(
            &corpus.skipped[1],
            EngineError::MalformedRecipe { id: 3, .. }
        ));
    }

    #[test]
    fn test_duplicate_ids_keep_first() {
        let corpus = parse(
            r#"[
                {"id": 1, "name": "First"},
                {"id": 1, "name": "Second"}
            ]"#,
        )
        .unwrap();
        assert_eq!(corpus.recipes.len(), 1);
        assert_eq!(corpus.recipes[0].name, "First");
        assert_eq!(
            corpus.skipped,
            vec![EngineError::MalformedRecipe {
                id: 1,
                reason: "duplicate recipe id".to_string()
            }]
        );
    }

    #[test]
    fn test_invalid_document_is_an_error() {
        assert!(parse("not json").is_err());
        assert!(parse(r#"{"dishes": []}"#).is_err());
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"recipes": [{{"id": 7, "name": "Salad", "ingredients": ["lettuce"]}}]}}"#
        )
        .unwrap();

        let corpus = load_from_file(file.path()).await.unwrap();
        assert_eq!(corpus.recipes[0].id, 7);
    }

    #[tokio::test]
    async fn test_load_missing_file_fails() {
        assert!(load_from_file("/nonexistent/recipes.json").await.is_err());
    }
}
