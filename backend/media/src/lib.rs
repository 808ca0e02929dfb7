//! Image intake: turns an upload or a sample name into a [`NormalizedImage`].

pub mod catalog;
pub mod media_server;
pub mod mime_detect;
pub mod normalizer;

pub use catalog::SampleCatalog;
pub use media_server::sample_router;
pub use mime_detect::{detect_mime_type, media_type_for_path};
pub use normalizer::Normalizer;

pub use propscope_core::{ImageInput, MediaType, NormalizedImage, Upload};
