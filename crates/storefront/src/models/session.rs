//! Session-related types.
//!
//! Types stored in the session for authentication state. The basket is
//! deliberately absent: it lives in a client cookie.

use serde::{Deserialize, Serialize};

use voyager_core::Email;

/// Session-stored user identity.
///
/// Minimal profile returned by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    /// User's email address; keys the order history.
    pub email: Email,
    /// Display name, if the provider has one.
    pub name: Option<String>,
    /// Avatar URL.
    pub picture: Option<String>,
}

impl CurrentUser {
    /// Name to greet the user with.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .unwrap_or_else(|| self.email.local_part())
    }
}

/// Session keys for authentication data.
pub mod keys {
    /// Key for storing the current signed-in user.
    pub const CURRENT_USER: &str = "current_user";

    /// Key for OAuth state (CSRF protection).
    pub const OAUTH_STATE: &str = "oauth_state";

    /// Key for OAuth nonce (`OpenID` Connect replay protection).
    pub const OAUTH_NONCE: &str = "oauth_nonce";

    /// Key for the page to return to after sign-in.
    pub const RETURN_TO: &str = "return_to";
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_falls_back_to_local_part() {
        let mut user = CurrentUser {
            email: Email::parse("meera@example.com").unwrap(),
            name: None,
            picture: None,
        };
        assert_eq!(user.display_name(), "meera");

        user.name = Some("Meera Nair".to_string());
        assert_eq!(user.display_name(), "Meera Nair");
    }
}
