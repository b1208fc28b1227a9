//! Proxy configuration read from the process environment.

use derive_getters::Getters;
use medestudia_core::MAX_INPUT_CHARS;
use medestudia_error::ConfigError;
use medestudia_models::{UpstreamSettings, UpstreamSettingsBuilder};
use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;
use tracing::debug;

/// Azure AI Foundry DeepSeek deployment used when no endpoint is configured.
pub const DEFAULT_ENDPOINT: &str = "https://medestudia-deepseek-resource.cognitiveservices.azure.com/openai/deployments/DeepSeek-V3.1/chat/completions?api-version=2024-05-01-preview";

/// Listen address used when `MEDESTUDIA_BIND` is unset.
pub const DEFAULT_BIND: &str = "0.0.0.0:3001";

/// Runtime configuration of the completion proxy.
#[derive(Debug, Clone, PartialEq, Eq, Getters, derive_builder::Builder)]
#[builder(setter(into))]
pub struct ProxyConfig {
    /// Upstream chat-completions URL
    #[builder(default = "DEFAULT_ENDPOINT.to_string()")]
    endpoint: String,
    /// Upstream API key
    #[builder(default)]
    api_key: Option<String>,
    /// Optional `model` field for endpoints that need one
    #[builder(default)]
    model: Option<String>,
    /// Listen address
    #[builder(default = "DEFAULT_BIND.to_string()")]
    bind: String,
    /// Input cap in characters
    #[builder(default = "MAX_INPUT_CHARS")]
    max_input_chars: usize,
    /// Whole-request timeout for buffered upstream calls
    #[builder(default = "Duration::from_secs(60)")]
    upstream_timeout: Duration,
    /// Upstream connect timeout
    #[builder(default = "Duration::from_secs(10)")]
    connect_timeout: Duration,
    /// Longest silence tolerated between streamed upstream reads
    #[builder(default = "Duration::from_secs(30)")]
    stream_idle_timeout: Duration,
    /// Install a permissive CORS layer
    #[builder(default = "true")]
    cors: bool,
    /// Serve `/health` and `/metrics` next to the completion endpoint
    #[builder(default = "true")]
    ops_routes: bool,
}

impl ProxyConfig {
    /// Returns a builder for constructing ProxyConfig.
    pub fn builder() -> ProxyConfigBuilder {
        ProxyConfigBuilder::default()
    }

    /// Reads configuration from the process environment.
    ///
    /// Reads:
    /// - `AZURE_FOUNDRY_ENDPOINT` (default: the MedEstudia Azure deployment)
    /// - `AZURE_FOUNDRY_API_KEY`, falling back to `DEEPSEEK_API_KEY`
    /// - `MEDESTUDIA_MODEL`, `MEDESTUDIA_BIND`, `MEDESTUDIA_MAX_INPUT_CHARS`
    /// - `MEDESTUDIA_UPSTREAM_TIMEOUT_SECS`, `MEDESTUDIA_CONNECT_TIMEOUT_SECS`,
    ///   `MEDESTUDIA_STREAM_IDLE_TIMEOUT_SECS`
    /// - `MEDESTUDIA_CORS`, `MEDESTUDIA_OPS_ROUTES`
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&std::env::vars().collect())
    }

    /// Reads configuration from an explicit variable map.
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let get = |name: &str| vars.get(name).filter(|v| !v.trim().is_empty()).cloned();

        let mut builder = ProxyConfigBuilder::default();
        if let Some(endpoint) = get("AZURE_FOUNDRY_ENDPOINT") {
            builder.endpoint(endpoint);
        }
        builder.api_key(get("AZURE_FOUNDRY_API_KEY").or_else(|| get("DEEPSEEK_API_KEY")));
        builder.model(get("MEDESTUDIA_MODEL"));
        if let Some(bind) = get("MEDESTUDIA_BIND") {
            builder.bind(bind);
        }
        if let Some(cap) = parse_var::<usize>(vars, "MEDESTUDIA_MAX_INPUT_CHARS")? {
            if cap == 0 {
                return Err(ConfigError::new("MEDESTUDIA_MAX_INPUT_CHARS must be positive"));
            }
            builder.max_input_chars(cap);
        }
        if let Some(secs) = parse_var::<u64>(vars, "MEDESTUDIA_UPSTREAM_TIMEOUT_SECS")? {
            builder.upstream_timeout(Duration::from_secs(secs));
        }
        if let Some(secs) = parse_var::<u64>(vars, "MEDESTUDIA_CONNECT_TIMEOUT_SECS")? {
            builder.connect_timeout(Duration::from_secs(secs));
        }
        if let Some(secs) = parse_var::<u64>(vars, "MEDESTUDIA_STREAM_IDLE_TIMEOUT_SECS")? {
            builder.stream_idle_timeout(Duration::from_secs(secs));
        }
        if let Some(cors) = parse_var::<bool>(vars, "MEDESTUDIA_CORS")? {
            builder.cors(cors);
        }
        if let Some(ops) = parse_var::<bool>(vars, "MEDESTUDIA_OPS_ROUTES")? {
            builder.ops_routes(ops);
        }

        let config = builder
            .build()
            .map_err(|e| ConfigError::new(format!("Invalid proxy configuration: {}", e)))?;
        debug!(
            endpoint = %config.endpoint,
            bind = %config.bind,
            has_key = config.api_key.is_some(),
            "Loaded proxy configuration"
        );
        Ok(config)
    }

    /// Same configuration listening on `bind`.
    pub fn with_bind(self, bind: impl Into<String>) -> Self {
        Self {
            bind: bind.into(),
            ..self
        }
    }

    /// Settings for the upstream client.
    pub fn upstream_settings(&self) -> Result<UpstreamSettings, ConfigError> {
        let mut builder = UpstreamSettingsBuilder::default();
        builder
            .endpoint(self.endpoint.clone())
            .connect_timeout(self.connect_timeout)
            .request_timeout(self.upstream_timeout)
            .stream_idle_timeout(self.stream_idle_timeout);
        if let Some(key) = &self.api_key {
            builder.api_key(key.clone());
        }
        if let Some(model) = &self.model {
            builder.model(model.clone());
        }
        builder
            .build()
            .map_err(|e| ConfigError::new(format!("Invalid upstream settings: {}", e)))
    }
}

fn parse_var<T>(vars: &HashMap<String, String>, name: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match vars.get(name).map(|v| v.trim()).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(raw) => raw
            .to_ascii_lowercase()
            .parse::<T>()
            .map(Some)
            .map_err(|e| ConfigError::new(format!("Invalid {} '{}': {}", name, raw, e))),
    }
}
