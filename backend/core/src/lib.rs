pub mod contract;
pub mod error;
pub mod image;
pub mod traits;

pub use contract::{
    parse_model_output, validate, ClassificationResult, ExteriorFeatures, ExteriorSpace,
    FeatureSet, InteriorFeatures, InteriorSpace, LocationType, SHARED_FEATURE_KEYS,
};
pub use error::{ClassificationError, NormalizationError, PipelineError, SchemaViolation};
pub use image::{ImageInput, MediaType, NormalizedImage, Upload};
pub use traits::{VisionProvider, VisionRequest, VisionResponse};
