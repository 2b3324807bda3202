use serde::Deserialize;

/// Configuration options for the Moovi server.
#[derive(Clone, Debug, Deserialize)]
pub struct ServerConfig {
    /// Path to the SQLite database file.
    pub database_url: String,
    /// Address the HTTP server binds to.
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// External authentication service users are sent to for login.
    pub auth_service_url: String,
    /// Key used to sign session cookies.
    pub secret_key: String,
}

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}
