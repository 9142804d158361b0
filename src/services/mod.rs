pub mod content_decoder;
pub mod documents;
pub mod resolver;
pub mod submission;

pub use content_decoder::{ContentDecoder, DecodedPage};
pub use documents::DocumentService;
pub use resolver::AnswerResolver;
pub use submission::SubmissionClient;
