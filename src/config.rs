//! Relay and export configuration.

use crate::{Error, Result};

/// Variable holding the tenant (account) id.
pub const TENANT_ID_VAR: &str = "armorAccountId";
/// Variable holding the relay address.
pub const RELAY_ADDRESS_VAR: &str = "armorAddress";
/// Variable holding the relay port.
pub const RELAY_PORT_VAR: &str = "armorPort";
/// Variable enabling verbose diagnostics.
pub const DEBUG_LOG_VAR: &str = "enableDebugLog";

pub const DEFAULT_RELAY_ADDRESS: &str = "https://1d.log.armor.com";
pub const DEFAULT_RELAY_PORT: u16 = 5443;
pub const DEFAULT_TEMPLATE_ID: u16 = 555;
pub const DEFAULT_OBSERVATION_DOMAIN_ID: u32 = 1234;

/// Options that shape the export packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportOptions {
    /// Id of the flow-log template, also the data set id
    pub template_id: u16,
    /// Observation domain written into every message header
    pub observation_domain_id: u32,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            template_id: DEFAULT_TEMPLATE_ID,
            observation_domain_id: DEFAULT_OBSERVATION_DOMAIN_ID,
        }
    }
}

/// Settings resolved once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub tenant_id: u32,
    /// Relay host and optional path, without scheme or port
    pub relay_address: String,
    pub relay_port: u16,
    pub debug_log: bool,
    pub export: ExportOptions,
}

impl Settings {
    /// Resolve settings from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve settings from an arbitrary key lookup.
    ///
    /// The tenant id is required. An unset address or an out-of-range port
    /// falls back to the defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let tenant_id = parse_tenant_id(lookup(TENANT_ID_VAR))?;

        let address = lookup(RELAY_ADDRESS_VAR)
            .map(|a| a.trim().to_lowercase())
            .filter(|a| !a.is_empty())
            .unwrap_or_else(|| {
                log::warn!(
                    "Environment {} not set: defaulting to {}",
                    RELAY_ADDRESS_VAR,
                    DEFAULT_RELAY_ADDRESS
                );
                DEFAULT_RELAY_ADDRESS.to_string()
            });

        let relay_port = lookup(RELAY_PORT_VAR)
            .and_then(|p| p.trim().parse::<i64>().ok())
            .filter(|p| *p > 0 && *p < i64::from(u16::MAX))
            .map(|p| p as u16)
            .unwrap_or(DEFAULT_RELAY_PORT);

        Ok(Self {
            tenant_id,
            relay_address: strip_scheme_and_port(&address),
            relay_port,
            debug_log: debug_log_from_lookup(&lookup),
            export: ExportOptions::default(),
        })
    }

    /// Relay endpoint URL. The scheme is always https and the configured port
    /// is always explicit.
    pub fn relay_endpoint(&self) -> String {
        let (host, path) = match self.relay_address.find('/') {
            Some(idx) => self.relay_address.split_at(idx),
            None => (self.relay_address.as_str(), "/"),
        };
        format!("https://{}:{}{}", host, self.relay_port, path)
    }

    /// Basic-auth user for the relay.
    pub fn relay_user(&self) -> String {
        self.tenant_id.to_string()
    }
}

/// Whether verbose diagnostics were requested.
///
/// Accepts `true`/`false` in any case; anything else reads as false.
pub fn debug_log_from_lookup<F>(lookup: F) -> bool
where
    F: Fn(&str) -> Option<String>,
{
    lookup(DEBUG_LOG_VAR)
        .map(|v| v.trim().eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

fn parse_tenant_id(value: Option<String>) -> Result<u32> {
    let value = value.unwrap_or_default();
    let value = value.trim();
    if value.is_empty() {
        return Err(Error::Config(format!("Value for {} is required.", TENANT_ID_VAR)));
    }
    value.parse::<u32>().map_err(|_| {
        Error::Config(format!(
            "Value for {} must be a natural number, got {:?}.",
            TENANT_ID_VAR, value
        ))
    })
}

/// Drop any scheme and port from an address, keeping host and path.
fn strip_scheme_and_port(address: &str) -> String {
    let rest = match address.find("://") {
        Some(idx) => &address[idx + 3..],
        None => address,
    };
    let (authority, path) = match rest.find('/') {
        Some(idx) => rest.split_at(idx),
        None => (rest, ""),
    };
    let host = match authority.rfind(':') {
        Some(idx) if authority[idx + 1..].chars().all(|c| c.is_ascii_digit()) => {
            &authority[..idx]
        }
        _ => authority,
    };
    format!("{}{}", host, path)
}
