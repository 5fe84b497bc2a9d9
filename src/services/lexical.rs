//! TF-IDF vector space over recipe text profiles.
//!
//! Each recipe is described by a profile string (ingredients, cuisine,
//! difficulty, dietary descriptors). The index tokenizes profiles into
//! unigrams and adjacent bigrams with English stop words removed, fits a
//! smoothed inverse document frequency over the corpus and stores one
//! L2-normalised sparse vector per recipe. Queries are projected with the
//! fitted vocabulary; unknown terms carry no weight.

use std::collections::{HashMap, HashSet};

use crate::models::Recipe;

/// Sparse vector of (term index, weight), sorted by term index
type SparseVector = Vec<(usize, f64)>;

const STOP_WORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "also", "am", "an", "and", "any",
    "are", "as", "at", "be", "because", "been", "before", "being", "below", "between", "both",
    "but", "by", "can", "could", "did", "do", "does", "doing", "down", "during", "each", "few",
    "for", "from", "further", "had", "has", "have", "having", "he", "her", "here", "hers",
    "herself", "him", "himself", "his", "how", "i", "if", "in", "into", "is", "it", "its",
    "itself", "just", "me", "more", "most", "my", "myself", "no", "nor", "not", "now", "of",
    "off", "on", "once", "only", "or", "other", "our", "ours", "ourselves", "out", "over", "own",
    "same", "she", "should", "so", "some", "such", "than", "that", "the", "their", "theirs",
    "them", "themselves", "then", "there", "these", "they", "this", "those", "through", "to",
    "too", "under", "until", "up", "very", "was", "we", "were", "what", "when", "where", "which",
    "while", "who", "whom", "why", "will", "with", "would", "you", "your", "yours", "yourself",
    "yourselves",
];

/// Fitted TF-IDF index, aligned with corpus positions
#[derive(Debug, Clone)]
pub struct LexicalIndex {
    vocabulary: HashMap<String, usize>,
    idf: Vec<f64>,
    vectors: Vec<SparseVector>,
}

impl LexicalIndex {
    /// Fits the index over the recipes' text profiles
    ///
    /// Returns `None` for an empty corpus; similarity is then 0 everywhere.
    pub fn fit(recipes: &[Recipe]) -> Option<Self> {
        if recipes.is_empty() {
            return None;
        }

        let documents: Vec<Vec<String>> = recipes
            .iter()
            .map(|recipe| terms(&recipe_profile(recipe)))
            .collect();

        let mut vocabulary: HashMap<String, usize> = HashMap::new();
        let mut document_frequency: Vec<usize> = Vec::new();

        for document in &documents {
            let mut seen_in_document = HashSet::new();
            for term in document {
                let next_index = vocabulary.len();
                let index = *vocabulary.entry(term.clone()).or_insert(next_index);
                if index == document_frequency.len() {
                    document_frequency.push(0);
                }
                if seen_in_document.insert(index) {
                    document_frequency[index] += 1;
                }
            }
        }

        let n = documents.len() as f64;
        let idf: Vec<f64> = document_frequency
            .iter()
            .map(|&df| ((1.0 + n) / (1.0 + df as f64)).ln() + 1.0)
            .collect();

        let mut index = Self {
            vocabulary,
            idf,
            vectors: Vec::with_capacity(documents.len()),
        };
        let vectors = documents.iter().map(|doc| index.vectorize(doc)).collect();
        index.vectors = vectors;

        tracing::debug!(
            documents = index.vectors.len(),
            vocabulary = index.vocabulary.len(),
            "Fitted lexical index"
        );

        Some(index)
    }

    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }

    /// Projects query text into the fitted space
    pub fn query_vector(&self, text: &str) -> QueryVector {
        QueryVector(self.vectorize(&terms(text)))
    }

    /// Cosine similarity between a projected query and the recipe at `position`
    pub fn similarity(&self, query: &QueryVector, position: usize) -> Option<f64> {
        self.vectors
            .get(position)
            .map(|vector| sparse_dot(&query.0, vector).clamp(0.0, 1.0))
    }

    /// Similarity of the query text against every recipe, in corpus order
    #[cfg(test)]
    fn similarities(&self, text: &str) -> Vec<f64> {
        let query = self.query_vector(text);
        self.vectors
            .iter()
            .map(|vector| sparse_dot(&query.0, vector).clamp(0.0, 1.0))
            .collect()
    }

    fn vectorize(&self, terms: &[String]) -> SparseVector {
        let mut counts: HashMap<usize, f64> = HashMap::new();
        for term in terms {
            if let Some(&index) = self.vocabulary.get(term) {
                *counts.entry(index).or_insert(0.0) += 1.0;
            }
        }

        let mut vector: SparseVector = counts
            .into_iter()
            .map(|(index, count)| (index, count * self.idf[index]))
            .collect();
        vector.sort_unstable_by_key(|(index, _)| *index);

        let norm = vector.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
        if norm > 0.0 {
            for (_, weight) in vector.iter_mut() {
                *weight /= norm;
            }
        }
        vector
    }
}

/// A query projected into a fitted index's vector space
#[derive(Debug, Clone)]
pub struct QueryVector(SparseVector);

impl QueryVector {
    /// True when no query term is in the fitted vocabulary
    #[cfg(test)]
    fn is_zero(&self) -> bool {
        self.0.is_empty()
    }
}

/// Text profile of a recipe: ingredients, cuisine, difficulty and dietary descriptors
pub fn recipe_profile(recipe: &Recipe) -> String {
    let mut parts: Vec<&str> = recipe.ingredients.iter().map(String::as_str).collect();
    parts.push(&recipe.cuisine);
    parts.push(&recipe.difficulty);
    if let Some(info) = &recipe.dietary_info {
        parts.extend(info.descriptors());
    }
    parts.join(" ")
}

/// Text profile of a query: its ingredients plus optional cuisine and difficulty hints
pub fn query_profile<S: AsRef<str>>(
    ingredients: &[S],
    cuisine: Option<&str>,
    difficulty: Option<&str>,
) -> String {
    let mut parts: Vec<&str> = ingredients.iter().map(AsRef::as_ref).collect();
    parts.extend(cuisine);
    parts.extend(difficulty);
    parts.join(" ")
}

/// Lower-cased word tokens of two or more characters, stop words removed
fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|token| token.chars().count() >= 2)
        .filter(|token| !STOP_WORDS.contains(token))
        .map(str::to_string)
        .collect()
}

/// Unigrams followed by adjacent bigrams
fn terms(text: &str) -> Vec<String> {
    let tokens = tokenize(text);
    let bigrams: Vec<String> = tokens
        .windows(2)
        .map(|pair| format!("{} {}", pair[0], pair[1]))
        .collect();
    tokens.into_iter().chain(bigrams).collect()
}

fn sparse_dot(a: &[(usize, f64)], b: &[(usize, f64)]) -> f64 {
    let (mut i, mut j) = (0, 0);
    let mut sum = 0.0;
    while i < a.len() && j < b.len() {
        match a[i].0.cmp(&b[j].0) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                sum += a[i].1 * b[j].1;
                i += 1;
                j += 1;
            }
        }
    }
    sum
}
