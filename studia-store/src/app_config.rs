use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub business_rules: BusinessRules,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    /// Shared key operators present on /v1/admin routes.
    pub admin_key: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BusinessRules {
    /// Flat tax applied to the undiscounted subtotal.
    pub tax_rate: f64,
    pub currency: String,
    /// Probability the simulated gateway approves a charge.
    #[serde(default = "default_gateway_success_rate")]
    pub gateway_success_rate: f64,
}

fn default_gateway_success_rate() -> f64 {
    0.9
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            // Base configuration, then an optional per-environment file,
            // then an optional local override kept out of git
            .add_source(config::File::with_name("config/default"))
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            .add_source(config::File::with_name("config/local").required(false))
            // Environment wins: STUDIA__SERVER__PORT=9000 etc.
            .add_source(config::Environment::with_prefix("STUDIA").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
