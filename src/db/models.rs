mod ai_model;
mod api_key;
mod category;
mod chatbot;
mod file;

pub use ai_model::*;
pub use api_key::*;
pub use category::*;
pub use chatbot::*;
pub use file::*;
