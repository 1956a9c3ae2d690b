// src/config.rs

use std::env;
use dotenvy::dotenv;

#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the Zirak platform, e.g. "https://app.zirak-hr.com".
    pub api_base_url: String,
    /// Bearer token issued by the auth collaborator (login is out of scope).
    pub api_token: String,
    pub rust_log: String,
    /// Per-request timeout for collaborator calls, in seconds.
    pub request_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let api_base_url = env::var("ZIRAK_API_BASE_URL")
            .expect("ZIRAK_API_BASE_URL must be set");

        let api_token = env::var("ZIRAK_API_TOKEN")
            .expect("ZIRAK_API_TOKEN must be set");

        let rust_log = env::var("RUST_LOG")
            .unwrap_or_else(|_| "info".to_string());

        let request_timeout_secs = env::var("ZIRAK_REQUEST_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(30);

        Self {
            api_base_url,
            api_token,
            rust_log,
            request_timeout_secs,
        }
    }
}
