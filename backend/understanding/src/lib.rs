//! Classification service: asks a vision model about one photo and holds
//! its answer to the result contract.

pub mod classifier;
pub mod pipeline;
pub mod prompt;
pub mod providers;

pub use classifier::{Classifier, ClassifierOptions, DEFAULT_MAX_TOKENS, DEFAULT_MODEL};
pub use pipeline::ClassificationPipeline;
pub use prompt::instruction;
pub use providers::{build_provider, ProviderKind};
