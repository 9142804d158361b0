pub mod extraction;
pub mod session;
pub mod submission;
pub mod table;
pub mod window;

pub use extraction::ExtractionResult;
pub use session::{SessionResult, SolveRequest, SubmissionRecord};
pub use submission::{AnswerPayload, Classification, SubmissionOutcome};
pub use table::Table;
pub use window::ChallengeWindow;
