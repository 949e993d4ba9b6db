//! CLI command handlers.

pub mod ask;
pub mod check;
pub mod stats;

pub use ask::AskCommand;
pub use check::CheckCommand;
pub use stats::StatsCommand;
