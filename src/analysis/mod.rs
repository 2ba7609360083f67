//! Model-backed analysis stages
//!
//! [`CodeAnalyzer`] runs the first exchange and produces the conversation record;
//! [`ReadmeGenerator`] extends that record with the README request.

mod analyzer;
pub mod prompt;
mod readme;

pub use analyzer::CodeAnalyzer;
pub use prompt::PromptSet;
pub use readme::ReadmeGenerator;
