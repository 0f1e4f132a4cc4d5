// Per-request connection target: a trusted profile pointed at the caller's host

use std::fmt;

use sqlx::postgres::{PgConnectOptions, PgSslMode};
use sqlx::ConnectOptions;
use tracing::log::LevelFilter;

use crate::config::profiles::DatabaseProfile;

/// Connections are always encrypted.
pub const ENCRYPT: bool = true;
/// The server certificate is accepted without chain verification.
pub const TRUST_CERTIFICATE: bool = true;

const APPLICATION_NAME: &str = "product-lookup-service";

#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionProfile {
    pub user: String,
    pub password: String,
    pub host: String,
    pub database: String,
    pub port: u16,
    pub encrypt: bool,
    pub trust_certificate: bool,
}

impl ConnectionProfile {
    /// Copies the profile's credentials and swaps in the requested host
    pub fn for_host(profile: &DatabaseProfile, host: &str) -> Self {
        Self {
            user: profile.user.clone(),
            password: profile.password.clone(),
            host: host.to_string(),
            database: profile.database.clone(),
            port: profile.port,
            encrypt: ENCRYPT,
            trust_certificate: TRUST_CERTIFICATE,
        }
    }

    pub fn key(&self) -> ConnectionKey {
        ConnectionKey {
            host: self.host.clone(),
            port: self.port,
            database: self.database.clone(),
            user: self.user.clone(),
        }
    }

    pub fn ssl_mode(&self) -> PgSslMode {
        ssl_mode_for(self.encrypt, self.trust_certificate)
    }

    pub fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(&self.password)
            .database(&self.database)
            .application_name(APPLICATION_NAME)
            .ssl_mode(self.ssl_mode())
            .log_statements(LevelFilter::Debug)
    }
}

impl fmt::Debug for ConnectionProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionProfile")
            .field("user", &self.user)
            .field("password", &"***")
            .field("host", &self.host)
            .field("database", &self.database)
            .field("port", &self.port)
            .field("encrypt", &self.encrypt)
            .field("trust_certificate", &self.trust_certificate)
            .finish()
    }
}

/// Identity of a cached pool. Two requests share a pool only if all four match.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ConnectionKey {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub user: String,
}

impl fmt::Display for ConnectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}:{}/{}", self.user, self.host, self.port, self.database)
    }
}

/// encrypt + trust => Require (no chain check), encrypt only => VerifyFull, otherwise Prefer
pub fn ssl_mode_for(encrypt: bool, trust_certificate: bool) -> PgSslMode {
    match (encrypt, trust_certificate) {
        (true, true) => PgSslMode::Require,
        (true, false) => PgSslMode::VerifyFull,
        (false, _) => PgSslMode::Prefer,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> DatabaseProfile {
        DatabaseProfile {
            user: "reader".into(),
            password: "hunter2".into(),
            database: "store".into(),
            port: 5432,
        }
    }

    #[test]
    fn host_is_replaced_and_credentials_kept() {
        let connection = ConnectionProfile::for_host(&profile(), "10.0.0.5");

        assert_eq!(connection.host, "10.0.0.5");
        assert_eq!(connection.user, "reader");
        assert_eq!(connection.password, "hunter2");
        assert_eq!(connection.database, "store");
        assert!(connection.encrypt);
        assert!(connection.trust_certificate);
    }

    #[test]
    fn key_identifies_target_without_password() {
        let key = ConnectionProfile::for_host(&profile(), "10.0.0.5").key();

        assert_eq!(key.to_string(), "reader@10.0.0.5:5432/store");
        assert_ne!(key, ConnectionProfile::for_host(&profile(), "10.0.0.6").key());
    }

    #[test]
    fn debug_redacts_password() {
        let rendered = format!("{:?}", ConnectionProfile::for_host(&profile(), "db"));
        assert!(!rendered.contains("hunter2"));
    }

    #[test]
    fn tls_mode_follows_flags() {
        assert!(matches!(ssl_mode_for(true, true), PgSslMode::Require));
        assert!(matches!(ssl_mode_for(true, false), PgSslMode::VerifyFull));
        assert!(matches!(ssl_mode_for(false, true), PgSslMode::Prefer));
    }
}
