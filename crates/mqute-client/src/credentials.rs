//! Broker credentials.
//!
//! Credentials are plain data consumed at client construction time; the
//! transport implementation decides how to apply them (username/password
//! auth, TLS setup). Passwords are redacted from `Debug` output.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Authentication material for the broker connection.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "scheme", rename_all = "snake_case")]
pub enum Credentials {
    /// No authentication.
    #[default]
    Anonymous,

    /// Username/password authentication.
    UserPass {
        /// Broker username.
        username: String,
        /// Broker password.
        password: String,
    },

    /// Username/password over TLS with a custom CA certificate.
    UserPassTls {
        /// Broker username.
        username: String,
        /// Broker password.
        password: String,
        /// Path to the CA certificate used to verify the broker.
        ca_cert: PathBuf,
    },
}

impl Credentials {
    /// Creates username/password credentials.
    pub fn user_pass(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self::UserPass {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Creates username/password credentials verified over TLS.
    pub fn user_pass_tls(
        username: impl Into<String>,
        password: impl Into<String>,
        ca_cert: impl Into<PathBuf>,
    ) -> Self {
        Self::UserPassTls {
            username: username.into(),
            password: password.into(),
            ca_cert: ca_cert.into(),
        }
    }

    /// Whether this scheme requires a TLS-capable transport.
    pub fn requires_tls(&self) -> bool {
        matches!(self, Self::UserPassTls { .. })
    }

    /// The username, if the scheme carries one.
    pub fn username(&self) -> Option<&str> {
        match self {
            Self::Anonymous => None,
            Self::UserPass { username, .. } | Self::UserPassTls { username, .. } => {
                Some(username)
            }
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Anonymous => f.write_str("Anonymous"),
            Self::UserPass { username, .. } => f
                .debug_struct("UserPass")
                .field("username", username)
                .field("password", &"<redacted>")
                .finish(),
            Self::UserPassTls {
                username, ca_cert, ..
            } => f
                .debug_struct("UserPassTls")
                .field("username", username)
                .field("password", &"<redacted>")
                .field("ca_cert", ca_cert)
                .finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_from_tagged_form() {
        let credentials: Credentials = serde_json::from_value(serde_json::json!({
            "scheme": "user_pass",
            "username": "admin",
            "password": "password",
        }))
        .unwrap();
        assert_eq!(credentials, Credentials::user_pass("admin", "password"));
        assert!(!credentials.requires_tls());
    }

    #[test]
    fn tls_scheme_requires_tls() {
        let credentials = Credentials::user_pass_tls("admin", "password", "/etc/ca.pem");
        assert!(credentials.requires_tls());
        assert_eq!(credentials.username(), Some("admin"));
    }

    #[test]
    fn debug_output_redacts_the_password() {
        let credentials = Credentials::user_pass("admin", "hunter2");
        let rendered = format!("{credentials:?}");
        assert!(rendered.contains("admin"));
        assert!(!rendered.contains("hunter2"));
    }
}
