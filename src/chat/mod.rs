//! Chat core - conversation types and the persona response pipeline.

pub mod error;
pub mod history;
pub mod pipeline;
pub mod turn;

pub use error::{ChatError, ValidationError};
pub use history::HistoryWindow;
pub use pipeline::{compose_reply, ResponsePipeline};
pub use turn::{ConversationRequest, ConversationTurn, GeneratedReply, Role};
