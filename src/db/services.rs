mod ai_model;
mod api_key;
mod category;
mod chatbot;
mod file;

pub use ai_model::AiModelDbService;
pub use api_key::ApiKeyDbService;
pub use category::CategoryDbService;
pub use chatbot::ChatbotDbService;
pub use file::FileDbService;
