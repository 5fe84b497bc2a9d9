use serde::{Deserialize, Serialize};

/// An ingredient recognised in an uploaded image
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DetectedIngredient {
    pub name: String,
    /// Detector confidence in [0, 1]
    pub confidence: f64,
}

impl DetectedIngredient {
    pub fn new(name: impl Into<String>, confidence: f64) -> Self {
        Self {
            name: name.into(),
            confidence,
        }
    }
}
