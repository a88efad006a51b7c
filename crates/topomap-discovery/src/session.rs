//! Device session contract consumed by the discoverer
//!
//! A session is a blocking CLI channel to one device. The crawler only
//! needs a prompt, raw command output, and a disconnect; anything that can
//! provide those (SSH, telnet, a canned mock) can back a crawl.

use std::time::Duration;
use thiserror::Error;

/// Login credentials for the crawl. One credential pair is used for the
/// whole run.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: &str, password: &str) -> Self {
        Self {
            username: username.to_string(),
            password: password.to_string(),
        }
    }
}

/// Per-session timeout settings.
#[derive(Debug, Clone, Copy)]
pub struct SessionTimeouts {
    /// TCP/transport connect timeout
    pub connect: Duration,
    /// Authentication timeout
    pub auth: Duration,
    /// Per-command read timeout
    pub read: Duration,
}

impl Default for SessionTimeouts {
    fn default() -> Self {
        Self {
            connect: Duration::from_secs(10),
            auth: Duration::from_secs(10),
            read: Duration::from_secs(15),
        }
    }
}

/// Connection failure classification. Timeout and authentication failures
/// are fatal for the target IP and abort the vendor-alias fallback list;
/// any other error only advances to the next alias.
#[derive(Error, Debug)]
pub enum ConnectError {
    #[error("connection timeout to {0}")]
    Timeout(String),
    #[error("authentication failed to {0}")]
    Auth(String),
    #[error("{0}")]
    Other(String),
}

impl ConnectError {
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Timeout(_) | Self::Auth(_))
    }
}

/// An open management session to one device.
pub trait DeviceSession: Send {
    /// The device prompt, used to derive the hostname.
    fn find_prompt(&mut self) -> String;

    /// Execute a show command and return its raw output. Errors degrade
    /// to an empty result for that protocol, never a device failure.
    fn send_command(&mut self, command: &str, read_timeout: Duration) -> anyhow::Result<String>;

    fn disconnect(&mut self);
}

/// Opens sessions. Implemented by transport backends and by the mock
/// network used in tests.
pub trait Connector: Send + Sync {
    fn connect(
        &self,
        host: &str,
        device_type: &str,
        credentials: &Credentials,
        timeouts: &SessionTimeouts,
    ) -> Result<Box<dyn DeviceSession>, ConnectError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_error_fatality() {
        assert!(ConnectError::Timeout("10.0.0.1".into()).is_fatal());
        assert!(ConnectError::Auth("10.0.0.1".into()).is_fatal());
        assert!(!ConnectError::Other("ssh subsystem refused".into()).is_fatal());
    }
}
