use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Gateway port (default: 8080)
    #[serde(default = "default_gateway_port")]
    pub port: u16,
    /// Gateway host (default: 127.0.0.1)
    #[serde(default = "default_gateway_host")]
    pub host: String,
    /// Require a bearer token on task routes (default: true)
    #[serde(default = "default_true")]
    pub require_auth: bool,
    /// Lifetime of issued bearer tokens
    #[serde(default = "default_token_ttl_secs")]
    pub token_ttl_secs: u64,
    /// Credentials accepted by `POST /api/v1/auth/token`
    #[serde(default)]
    pub clients: Vec<ClientCredential>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientCredential {
    pub id: String,
    pub secret: String,
}

fn default_gateway_port() -> u16 {
    8080
}

fn default_gateway_host() -> String {
    "127.0.0.1".into()
}

fn default_true() -> bool {
    true
}

fn default_token_ttl_secs() -> u64 {
    86_400
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_gateway_port(),
            host: default_gateway_host(),
            require_auth: true,
            token_ttl_secs: default_token_ttl_secs(),
            clients: Vec::new(),
        }
    }
}
