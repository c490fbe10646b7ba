//! Check-config command handler.

use crate::config::AppConfig;

/// Print the resolved configuration with the token redacted.
///
/// Reaching this handler means loading and validation already succeeded.
pub fn execute(config: &AppConfig) {
    println!("Configuration OK\n");
    println!("{config}");
}
