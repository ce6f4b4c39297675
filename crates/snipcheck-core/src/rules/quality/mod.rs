//! Quality rules for snippet correctness and style

pub mod console_log;
pub mod duplicate_block;
pub mod missing_return;
pub mod missing_semicolon;
pub mod off_by_one_for;
pub mod unused_variable;

pub use console_log::ConsoleLog;
pub use duplicate_block::DuplicateBlock;
pub use missing_return::{FunctionRecord, MissingReturn};
pub use missing_semicolon::MissingSemicolon;
pub use off_by_one_for::OffByOneFor;
pub use unused_variable::UnusedVariable;
