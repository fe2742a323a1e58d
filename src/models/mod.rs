pub mod artifact;
pub mod presentation;
pub mod question;

pub use artifact::{model_slug, ArtifactKind};
pub use presentation::PresentationMode;
pub use question::{AnswerEntry, AnswerGroup, Correct, MarkedRow, Question, RawCorrect};
