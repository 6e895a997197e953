pub mod artifact_store;

pub use artifact_store::{render_export, write_export, ArtifactStore, EXPORT_FILE_NAME};
