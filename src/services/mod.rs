pub mod card_renderer;
pub mod normalizer;
pub mod notifier;

pub use card_renderer::render;
pub use normalizer::{normalize, NormalizationFailure, NormalizedBatch, PayloadShape, Strategy};
pub use notifier::{Notification, Notifier, Severity};
