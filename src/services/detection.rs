//! Image based ingredient detection.
//!
//! Detection sits behind the `IngredientDetector` trait so the HTTP layer
//! never depends on a concrete recognizer. The bundled implementation is a
//! mock that samples plausible ingredients at random; tests inject their
//! own deterministic detectors.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::{error::AppResult, models::DetectedIngredient};

/// Source of ingredient lists for uploaded images
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait IngredientDetector: Send + Sync {
    /// Detects ingredients in an encoded image, highest confidence first
    async fn detect(&self, image: &[u8]) -> AppResult<Vec<DetectedIngredient>>;

    /// Detector name for logging
    fn name(&self) -> &'static str;
}

const MOCK_VOCABULARY: &[&str] = &[
    "apple", "avocado", "bacon", "banana", "basil", "beef", "bell pepper", "black pepper",
    "broccoli", "butter", "carrot", "cheese", "chicken breast", "chickpeas", "cilantro",
    "cucumber", "dill", "eggs", "garlic", "ginger", "ground beef", "lemon", "lettuce", "lime",
    "mushroom", "olive oil", "onion", "parmesan cheese", "quinoa", "rice", "salmon fillet",
    "soy sauce", "spaghetti", "spinach", "taco shells", "tahini", "tomato", "asparagus", "flour",
    "sugar", "coconut milk", "fish sauce", "shrimp", "tofu", "noodles", "potatoes", "cod",
    "yogurt", "cream", "wine", "herbs",
];

/// Mock detector returning a random sample of common ingredients
///
/// Output ignores the image entirely and differs between calls.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomIngredientDetector;

impl RandomIngredientDetector {
    pub const MIN_DETECTED: usize = 3;
    pub const MAX_DETECTED: usize = 8;

    pub fn new() -> Self {
        Self
    }

    fn sample(&self) -> Vec<DetectedIngredient> {
        let mut rng = rand::thread_rng();
        let count = rng.gen_range(Self::MIN_DETECTED..=Self::MAX_DETECTED);

        let mut detected: Vec<DetectedIngredient> = MOCK_VOCABULARY
            .choose_multiple(&mut rng, count)
            .map(|name| {
                let confidence = rng.gen_range(0.70..=0.95_f64);
                DetectedIngredient::new(*name, (confidence * 100.0).round() / 100.0)
            })
            .collect();

        detected.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
        detected
    }
}

#[async_trait::async_trait]
impl IngredientDetector for RandomIngredientDetector {
    async fn detect(&self, image: &[u8]) -> AppResult<Vec<DetectedIngredient>> {
        let detected = self.sample();
        tracing::debug!(
            image_bytes = image.len(),
            detected = detected.len(),
            "Mock ingredient detection"
        );
        Ok(detected)
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
