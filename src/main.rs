//! gh_release - create a GitHub release and upload assets to it.
//!
//! Exits 0 once the release exists and every upload has finished, even if
//! some uploads failed. Exits 1 on any fatal error.

use gh_release::cli;
use gh_release::cli::OutputManager;
use std::process;

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match cli::run().await {
        Ok(exit_code) => {
            process::exit(exit_code);
        }
        Err(e) => {
            // Fatal errors are never quiet
            let output = OutputManager::new();
            output.error(&format!("Fatal error: {e}"));

            let suggestions = e.recovery_suggestions();
            if !suggestions.is_empty() {
                let _ = output.println("\n💡 Recovery suggestions:");
                for suggestion in suggestions {
                    let _ = output.indent(&suggestion);
                }
            }

            process::exit(1);
        }
    }
}
