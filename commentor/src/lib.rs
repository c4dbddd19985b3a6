// Library interface for commentor modules
// This allows tests and the binary to import modules

pub mod error;
pub mod extraction;
pub mod generate;
pub mod keywords;
pub mod llm;
pub mod messages;
pub mod prompt;
