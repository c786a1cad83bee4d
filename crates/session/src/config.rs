//! Session configuration

/// Session configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Key the bearer token is persisted under
    pub storage_key: String,
    /// Landing route after a successful login
    pub authenticated_route: String,
    /// Landing route after logout
    pub unauthenticated_route: String,
    /// Drop tokens whose `exp` claim has passed
    pub enforce_expiry: bool,
    /// Grace period applied to `exp`, in seconds
    pub expiry_leeway_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            storage_key: "authToken".to_string(),
            authenticated_route: "/dashboard".to_string(),
            unauthenticated_route: "/login".to_string(),
            enforce_expiry: true,
            expiry_leeway_secs: 0,
        }
    }
}
