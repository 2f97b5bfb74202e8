use std::net::SocketAddr;

use serde::Deserialize;
use carbon_registry_core::error::{RegistryError, Result};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegistryConfig {
    pub version: u32,

    #[serde(default)]
    pub http: HttpSection,

    #[serde(default)]
    pub syslog: SyslogSection,
}

impl RegistryConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(RegistryError::BadConfig(format!(
                "unsupported config version: {}",
                self.version
            )));
        }

        self.http.validate()?;
        self.syslog.validate()?;

        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HttpSection {
    #[serde(default = "default_http_listen")]
    pub listen: String,
}

impl Default for HttpSection {
    fn default() -> Self {
        Self {
            listen: default_http_listen(),
        }
    }
}

impl HttpSection {
    pub fn validate(&self) -> Result<()> {
        parse_addr("http.listen", &self.listen).map(|_| ())
    }

    pub fn listen_addr(&self) -> Result<SocketAddr> {
        parse_addr("http.listen", &self.listen)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SyslogSection {
    #[serde(default = "default_syslog_listen")]
    pub listen: String,

    #[serde(default = "default_max_datagram_bytes")]
    pub max_datagram_bytes: usize,
}

impl Default for SyslogSection {
    fn default() -> Self {
        Self {
            listen: default_syslog_listen(),
            max_datagram_bytes: default_max_datagram_bytes(),
        }
    }
}

impl SyslogSection {
    pub fn validate(&self) -> Result<()> {
        parse_addr("syslog.listen", &self.listen)?;
        if !(512..=65535).contains(&self.max_datagram_bytes) {
            return Err(RegistryError::BadConfig(
                "syslog.max_datagram_bytes must be between 512 and 65535".into(),
            ));
        }
        Ok(())
    }

    pub fn listen_addr(&self) -> Result<SocketAddr> {
        parse_addr("syslog.listen", &self.listen)
    }
}

fn parse_addr(field: &str, s: &str) -> Result<SocketAddr> {
    s.parse()
        .map_err(|e| RegistryError::BadConfig(format!("{field} must be a valid SocketAddr: {e}")))
}

fn default_http_listen() -> String {
    "0.0.0.0:8080".into()
}
fn default_syslog_listen() -> String {
    "0.0.0.0:5140".into()
}
fn default_max_datagram_bytes() -> usize {
    8192
}
