pub mod corpus;
pub mod detection;
pub mod dietary;
pub mod lexical;
pub mod recommendations;
pub mod substitutions;

pub use detection::{IngredientDetector, RandomIngredientDetector};
pub use dietary::{is_diet_compatible, DietaryRestriction};
pub use recommendations::{RecommendationEngine, ScoringPolicy};
pub use substitutions::substitutes_for;
