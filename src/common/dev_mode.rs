// src/common/dev_mode.rs
//! Development mode configuration.
//!
//! The OAuth callbacks accept raw `email/firstName/lastName/providerId`
//! query parameters so the external-identity flow can be exercised without a
//! real provider round-trip. That bypass is a credential-free login and must
//! never be reachable in production, so it is off unless explicitly enabled
//! here.

use std::env;

#[derive(Debug, Clone)]
pub struct DevModeConfig {
    pub oauth_bypass: bool,
}

impl DevModeConfig {
    pub fn from_env() -> Self {
        let oauth_bypass = env::var("OAUTH_DEV_BYPASS")
            .unwrap_or_else(|_| "false".to_string())
            .to_lowercase()
            == "true";

        Self { oauth_bypass }
    }

    pub fn bypass_enabled(&self) -> bool {
        self.oauth_bypass
    }
}

/// Print dev mode status on startup
pub fn print_dev_mode_status(config: &DevModeConfig) {
    if config.oauth_bypass {
        println!("⚠️  🔓 OAUTH DEV BYPASS ENABLED 🔓 ⚠️");
        println!("   Callback endpoints accept raw identity parameters");
        println!("   ⚠️  DO NOT USE IN PRODUCTION ⚠️");
        println!();
    } else {
        println!("🔒 OAuth callbacks require a real authorization code");
    }
}

/// CLI argument parsing for the bypass toggle
pub fn parse_dev_mode_args() -> Option<bool> {
    let args: Vec<String> = env::args().collect();

    for arg in &args {
        match arg.as_str() {
            "--dev" | "--dev-mode" => return Some(true),
            "--no-dev" | "--prod" | "--production" => return Some(false),
            _ => {}
        }
    }

    None
}

/// Override the bypass from CLI args
pub fn apply_cli_override(mut config: DevModeConfig) -> DevModeConfig {
    if let Some(cli_dev_mode) = parse_dev_mode_args() {
        println!("🔧 CLI override: OAUTH_DEV_BYPASS = {}", cli_dev_mode);
        config.oauth_bypass = cli_dev_mode;
    }

    config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bypass_disabled_by_default() {
        let original = env::var("OAUTH_DEV_BYPASS").ok();
        env::remove_var("OAUTH_DEV_BYPASS");

        let config = DevModeConfig::from_env();
        assert!(!config.bypass_enabled(), "bypass must be off by default");

        if let Some(val) = original {
            env::set_var("OAUTH_DEV_BYPASS", val);
        }
    }
}
