//! Access gates
//!
//! Employees log in with a PIN and get a time-limited session; the admin
//! page sits behind a password that issues a short-lived cookie. PINs and
//! the admin password are only ever held as SHA-256 digests.

use crate::error::AuthError;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use depot_store::{ActivityEntry, ActivityLog};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use tracing::{info, warn};
use ulid::Ulid;

/// Hex SHA-256 digest of a PIN or password
#[must_use]
pub fn hash_secret(secret: &str) -> String {
    hex::encode(Sha256::digest(secret.as_bytes()))
}

/// Longest lifetime any session or cookie may have
const MAX_TTL_SECS: i64 = 366 * 24 * 60 * 60;

fn ttl(secs: u64) -> Duration {
    Duration::seconds(i64::try_from(secs).unwrap_or(MAX_TTL_SECS).min(MAX_TTL_SECS))
}

/// Gate configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Employee session lifetime in seconds
    pub employee_session_ttl_secs: u64,
    /// Admin cookie lifetime in seconds
    pub admin_cookie_ttl_secs: u64,
    /// Shortest accepted PIN
    pub min_pin_len: usize,
    /// Longest accepted PIN
    pub max_pin_len: usize,
    /// SHA-256 hex of the admin password; admin access is off when unset
    pub admin_password_sha256: Option<String>,
}

impl AuthConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With employee session lifetime
    #[inline]
    #[must_use]
    pub fn with_session_ttl_secs(mut self, secs: u64) -> Self {
        self.employee_session_ttl_secs = secs;
        self
    }

    /// With admin password (hashed here)
    #[inline]
    #[must_use]
    pub fn with_admin_password(mut self, password: &str) -> Self {
        self.admin_password_sha256 = Some(hash_secret(password));
        self
    }

    fn session_ttl(&self) -> Duration {
        ttl(self.employee_session_ttl_secs)
    }

    fn cookie_ttl(&self) -> Duration {
        ttl(self.admin_cookie_ttl_secs)
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            employee_session_ttl_secs: 12 * 60 * 60,
            admin_cookie_ttl_secs: 60 * 60,
            min_pin_len: 4,
            max_pin_len: 8,
            admin_password_sha256: None,
        }
    }
}

/// Result of a session check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionValidity {
    /// Whether access is currently allowed
    pub valid: bool,
}

/// Anything that can vouch for the current user
pub trait AuthGate: Send + Sync {
    /// Check validity at `now`
    fn current_session(&self, now: DateTime<Utc>) -> SessionValidity;

    /// Name recorded in the activity log
    fn actor(&self) -> &str;
}

/// Employee identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EmployeeId(pub Ulid);

impl EmployeeId {
    /// Generate new employee ID
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for EmployeeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EmployeeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone)]
struct Employee {
    name: String,
    pin_hash: String,
    created_at: DateTime<Utc>,
}

/// Employee as shown on the admin page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmployeeSummary {
    /// Employee id
    pub id: EmployeeId,
    /// Display name
    pub name: String,
    /// When the PIN was issued
    pub created_at: DateTime<Utc>,
}

/// Logged-in employee
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmployeeSession {
    /// Who logged in
    pub employee_id: EmployeeId,
    /// Display name
    pub name: String,
    /// Login time
    pub issued_at: DateTime<Utc>,
    /// End of validity
    pub expires_at: DateTime<Utc>,
}

impl AuthGate for EmployeeSession {
    fn current_session(&self, now: DateTime<Utc>) -> SessionValidity {
        SessionValidity {
            valid: now >= self.issued_at && now < self.expires_at,
        }
    }

    fn actor(&self) -> &str {
        &self.name
    }
}

/// Proof of admin login
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminCookie {
    issued_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl AdminCookie {
    /// Whether the cookie is usable at `now`
    #[inline]
    #[must_use]
    pub fn is_valid(&self, now: DateTime<Utc>) -> bool {
        now >= self.issued_at && now < self.expires_at
    }

    /// End of validity
    #[inline]
    #[must_use]
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    fn require(&self, now: DateTime<Utc>) -> Result<(), AuthError> {
        if self.is_valid(now) {
            Ok(())
        } else {
            Err(AuthError::AdminRequired)
        }
    }
}

impl AuthGate for AdminCookie {
    fn current_session(&self, now: DateTime<Utc>) -> SessionValidity {
        SessionValidity {
            valid: self.is_valid(now),
        }
    }

    fn actor(&self) -> &str {
        "admin"
    }
}

/// Admin password gate
#[derive(Debug, Clone)]
pub struct AdminGate {
    password_hash: String,
    ttl: Duration,
}

impl AdminGate {
    /// Gate from config; `None` when no admin password is configured
    #[must_use]
    pub fn from_config(config: &AuthConfig) -> Option<Self> {
        config.admin_password_sha256.as_ref().map(|hash| Self {
            password_hash: hash.to_ascii_lowercase(),
            ttl: config.cookie_ttl(),
        })
    }

    /// Exchange the password for a cookie
    ///
    /// # Errors
    /// [`AuthError::WrongPassword`] on mismatch
    pub fn login(&self, password: &str, now: DateTime<Utc>) -> Result<AdminCookie, AuthError> {
        if hash_secret(password) != self.password_hash {
            warn!("admin login rejected");
            return Err(AuthError::WrongPassword);
        }
        Ok(AdminCookie {
            issued_at: now,
            expires_at: now + self.ttl,
        })
    }
}

/// Newest activity entries for the admin page
///
/// # Errors
/// - [`AuthError::AdminRequired`] without a valid cookie
/// - [`AuthError::Store`] if the log cannot be read
pub async fn admin_activity(
    cookie: &AdminCookie,
    now: DateTime<Utc>,
    log: &dyn ActivityLog,
    limit: usize,
) -> Result<Vec<ActivityEntry>, AuthError> {
    cookie.require(now)?;
    Ok(log.entries(limit).await?)
}

/// Employee PINs, managed from the admin page
#[derive(Debug, Default)]
pub struct PinRegistry {
    config: AuthConfig,
    employees: DashMap<EmployeeId, Employee>,
}

impl PinRegistry {
    /// Create empty registry
    #[inline]
    #[must_use]
    pub fn new(config: AuthConfig) -> Self {
        Self {
            config,
            employees: DashMap::new(),
        }
    }

    fn check_pin_format(&self, pin: &str) -> Result<(), AuthError> {
        let len = pin.chars().count();
        let ok = pin.chars().all(|c| c.is_ascii_digit())
            && (self.config.min_pin_len..=self.config.max_pin_len).contains(&len);
        if ok {
            Ok(())
        } else {
            Err(AuthError::InvalidPin {
                min: self.config.min_pin_len,
                max: self.config.max_pin_len,
            })
        }
    }

    fn find_by_hash(&self, hash: &str) -> Option<EmployeeId> {
        self.employees
            .iter()
            .find(|entry| entry.value().pin_hash == hash)
            .map(|entry| *entry.key())
    }

    /// Add an employee with a new PIN
    ///
    /// # Errors
    /// - [`AuthError::AdminRequired`] without a valid cookie
    /// - [`AuthError::EmptyName`], [`AuthError::InvalidPin`], [`AuthError::DuplicatePin`]
    pub fn register(
        &self,
        cookie: &AdminCookie,
        now: DateTime<Utc>,
        name: &str,
        pin: &str,
    ) -> Result<EmployeeId, AuthError> {
        cookie.require(now)?;
        let name = name.trim();
        if name.is_empty() {
            return Err(AuthError::EmptyName);
        }
        self.check_pin_format(pin)?;
        let pin_hash = hash_secret(pin);
        if self.find_by_hash(&pin_hash).is_some() {
            return Err(AuthError::DuplicatePin);
        }

        let id = EmployeeId::new();
        self.employees.insert(
            id,
            Employee {
                name: name.to_string(),
                pin_hash,
                created_at: now,
            },
        );
        info!(employee_id = %id, name, "employee registered");
        Ok(id)
    }

    /// Replace an employee's PIN
    ///
    /// # Errors
    /// - [`AuthError::AdminRequired`] without a valid cookie
    /// - [`AuthError::UnknownEmployee`], [`AuthError::InvalidPin`], [`AuthError::DuplicatePin`]
    pub fn change_pin(
        &self,
        cookie: &AdminCookie,
        now: DateTime<Utc>,
        id: EmployeeId,
        pin: &str,
    ) -> Result<(), AuthError> {
        cookie.require(now)?;
        self.check_pin_format(pin)?;
        let pin_hash = hash_secret(pin);
        if self.find_by_hash(&pin_hash).is_some_and(|owner| owner != id) {
            return Err(AuthError::DuplicatePin);
        }
        let mut employee = self
            .employees
            .get_mut(&id)
            .ok_or_else(|| AuthError::UnknownEmployee(id.to_string()))?;
        employee.pin_hash = pin_hash;
        Ok(())
    }

    /// Remove an employee; their PIN stops working
    ///
    /// # Errors
    /// - [`AuthError::AdminRequired`] without a valid cookie
    /// - [`AuthError::UnknownEmployee`] if `id` is not registered
    pub fn revoke(&self, cookie: &AdminCookie, now: DateTime<Utc>, id: EmployeeId) -> Result<(), AuthError> {
        cookie.require(now)?;
        if self.employees.remove(&id).is_none() {
            return Err(AuthError::UnknownEmployee(id.to_string()));
        }
        info!(employee_id = %id, "employee revoked");
        Ok(())
    }

    /// Employees sorted by name
    ///
    /// # Errors
    /// [`AuthError::AdminRequired`] without a valid cookie
    pub fn employees(&self, cookie: &AdminCookie, now: DateTime<Utc>) -> Result<Vec<EmployeeSummary>, AuthError> {
        cookie.require(now)?;
        let mut out: Vec<EmployeeSummary> = self
            .employees
            .iter()
            .map(|entry| EmployeeSummary {
                id: *entry.key(),
                name: entry.value().name.clone(),
                created_at: entry.value().created_at,
            })
            .collect();
        out.sort_by(|a, b| depot_model::name_order(&a.name, &b.name));
        Ok(out)
    }

    /// Log in with a PIN
    ///
    /// # Errors
    /// [`AuthError::UnknownPin`] if no employee has this PIN
    pub fn login(&self, pin: &str, now: DateTime<Utc>) -> Result<EmployeeSession, AuthError> {
        let hash = hash_secret(pin.trim());
        let id = self.find_by_hash(&hash).ok_or(AuthError::UnknownPin)?;
        let name = self
            .employees
            .get(&id)
            .map(|e| e.name.clone())
            .ok_or(AuthError::UnknownPin)?;
        info!(employee_id = %id, "employee logged in");
        Ok(EmployeeSession {
            employee_id: id,
            name,
            issued_at: now,
            expires_at: now + self.config.session_ttl(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use depot_store::MemoryActivityLog;

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-06-01T08:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn admin() -> (AuthConfig, AdminCookie) {
        let config = AuthConfig::new().with_admin_password("hunter2");
        let cookie = AdminGate::from_config(&config)
            .unwrap()
            .login("hunter2", now())
            .unwrap();
        (config, cookie)
    }

    #[test]
    fn hash_secret_is_sha256_hex() {
        assert_eq!(
            hash_secret("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn admin_gate_checks_password_and_expiry() {
        let config = AuthConfig::new().with_admin_password("hunter2");
        let gate = AdminGate::from_config(&config).unwrap();

        assert_eq!(gate.login("wrong", now()), Err(AuthError::WrongPassword));
        let cookie = gate.login("hunter2", now()).unwrap();
        assert!(cookie.is_valid(now() + Duration::minutes(59)));
        assert!(!cookie.is_valid(now() + Duration::minutes(60)));

        assert!(AdminGate::from_config(&AuthConfig::new()).is_none());
    }

    #[test]
    fn pin_login_issues_time_limited_session() {
        let (config, cookie) = admin();
        let registry = PinRegistry::new(config);
        registry.register(&cookie, now(), "Ana", "1234").unwrap();

        let session = registry.login("1234", now()).unwrap();
        assert_eq!(session.actor(), "Ana");
        assert!(session.current_session(now() + Duration::hours(11)).valid);
        assert!(!session.current_session(now() + Duration::hours(12)).valid);

        assert_eq!(registry.login("9999", now()), Err(AuthError::UnknownPin));
    }

    #[test]
    fn pin_rules() {
        let (config, cookie) = admin();
        let registry = PinRegistry::new(config);

        assert!(matches!(
            registry.register(&cookie, now(), "Ana", "12a4"),
            Err(AuthError::InvalidPin { .. })
        ));
        assert!(matches!(
            registry.register(&cookie, now(), "Ana", "123"),
            Err(AuthError::InvalidPin { .. })
        ));
        assert_eq!(
            registry.register(&cookie, now(), "  ", "1234"),
            Err(AuthError::EmptyName)
        );

        let ana = registry.register(&cookie, now(), "Ana", "1234").unwrap();
        assert_eq!(
            registry.register(&cookie, now(), "Bo", "1234"),
            Err(AuthError::DuplicatePin)
        );

        registry.change_pin(&cookie, now(), ana, "5678").unwrap();
        assert!(registry.login("1234", now()).is_err());
        assert!(registry.login("5678", now()).is_ok());

        registry.revoke(&cookie, now(), ana).unwrap();
        assert!(registry.login("5678", now()).is_err());
        assert!(matches!(
            registry.revoke(&cookie, now(), ana),
            Err(AuthError::UnknownEmployee(_))
        ));
    }

    #[test]
    fn admin_actions_need_valid_cookie() {
        let (config, cookie) = admin();
        let registry = PinRegistry::new(config);
        let later = now() + Duration::hours(2);

        assert_eq!(
            registry.register(&cookie, later, "Ana", "1234"),
            Err(AuthError::AdminRequired)
        );
        assert_eq!(registry.employees(&cookie, later), Err(AuthError::AdminRequired));
    }

    #[test]
    fn employees_sorted_by_name() {
        let (config, cookie) = admin();
        let registry = PinRegistry::new(config);
        registry.register(&cookie, now(), "bo", "1111").unwrap();
        registry.register(&cookie, now(), "Ana", "2222").unwrap();

        let names: Vec<String> = registry
            .employees(&cookie, now())
            .unwrap()
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(names, vec!["Ana", "bo"]);
    }

    #[tokio::test]
    async fn admin_activity_reads_log() {
        let (_, cookie) = admin();
        let log = MemoryActivityLog::new();
        log.append_at(now(), "Ana", "updated Cache (note)");

        let entries = admin_activity(&cookie, now(), &log, 10).await.unwrap();
        assert_eq!(entries.len(), 1);

        let expired = admin_activity(&cookie, now() + Duration::days(1), &log, 10).await;
        assert_eq!(expired, Err(AuthError::AdminRequired));
    }
}
