pub mod card;
pub mod record;
pub mod request;

pub use card::{CardDescriptor, McqCard, OptionDescriptor, QaCard, NO_EXPLANATION};
pub use record::{McqRecord, QaRecord, Record, RecordType};
pub use request::{GenerateBody, GenerationRequest, UploadFile};
