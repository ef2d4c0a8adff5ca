pub mod aops;
pub mod challenge;
pub mod choices;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod image;
pub mod model;
pub mod render;
pub mod segment;
pub mod store;
pub mod walker;

pub use challenge::Challenge;
pub use error::{HarvestError, Result};
pub use extract::PageExtractor;
pub use model::{AnswerChoice, ChoiceSource, ContentItem, ProblemRecord, SolutionRecord};
