//! Check command handler.
//!
//! Runs only the safety gate on a query, without touching the corpus
//! or any provider. Useful for auditing the phrase list.

use clap::Args;
use sattva_core::{AppError, AppResult};
use sattva_rag::check_safety;

/// Run only the safety gate on a query
#[derive(Args, Debug)]
pub struct CheckCommand {
    /// The query to check
    pub query: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl CheckCommand {
    /// Execute the check command.
    pub fn execute(&self) -> AppResult<()> {
        let verdict = check_safety(&self.query);

        if self.json {
            let json = serde_json::to_string_pretty(&verdict)
                .map_err(|e| AppError::Serialization(e.to_string()))?;
            println!("{}", json);
        } else if verdict.is_unsafe {
            println!("UNSAFE");
            if let Some(reason) = &verdict.reason {
                println!("{}", reason);
            }
            if let Some(message) = &verdict.message {
                println!("{}", message);
            }
        } else {
            println!("SAFE");
        }

        Ok(())
    }
}
