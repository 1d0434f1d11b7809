use secrecy::{ExposeSecret, SecretString};

/// Value stored in place of a token when none has been issued yet.
pub const UNSET_TOKEN: &str = "unset";

/// An API access token, sent as the `Api-Access-Token` header.
#[derive(Debug, Clone)]
pub struct Token(SecretString);

impl Token {
    pub fn new(value: impl Into<String>) -> Self {
        Self(SecretString::from(value.into()))
    }

    /// The raw token, for request headers and the `token` command.
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }

    /// `true` for the empty string and the [`UNSET_TOKEN`] placeholder.
    pub fn is_placeholder(&self) -> bool {
        let raw = self.0.expose_secret().trim();
        raw.is_empty() || raw == UNSET_TOKEN
    }
}

impl From<SecretString> for Token {
    fn from(secret: SecretString) -> Self {
        Self(secret)
    }
}

/// Credentials for the Mawaqit API.
///
/// Exactly one form is in use. Build with [`Credentials::from_parts`] when
/// both may be configured: a real token always wins over a login.
#[derive(Debug, Clone)]
pub enum Credentials {
    /// A pre-issued token. Never refreshed; a rejection needs a new token.
    Token(Token),
    /// Account login. A token is issued on demand and re-issued on expiry.
    Login {
        username: String,
        password: SecretString,
    },
}

impl Credentials {
    /// Pick the usable credential form.
    ///
    /// Returns `None` when neither a real token nor a complete login is present.
    pub fn from_parts(
        username: Option<String>,
        password: Option<SecretString>,
        token: Option<Token>,
    ) -> Option<Self> {
        if let Some(token) = token.filter(|t| !t.is_placeholder()) {
            return Some(Self::Token(token));
        }
        match (username, password) {
            (Some(username), Some(password)) if !username.is_empty() => {
                Some(Self::Login { username, password })
            }
            _ => None,
        }
    }

    pub fn is_login(&self) -> bool {
        matches!(self, Self::Login { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secret(s: &str) -> SecretString {
        SecretString::from(s.to_owned())
    }

    #[test]
    fn token_wins_over_login() {
        let creds = Credentials::from_parts(
            Some("user".into()),
            Some(secret("pw")),
            Some(Token::new("abc")),
        );
        assert!(matches!(creds, Some(Credentials::Token(t)) if t.expose() == "abc"));
    }

    #[test]
    fn placeholder_token_falls_back_to_login() {
        for placeholder in ["unset", "", "  "] {
            let creds = Credentials::from_parts(
                Some("user".into()),
                Some(secret("pw")),
                Some(Token::new(placeholder)),
            );
            assert!(
                matches!(creds, Some(Credentials::Login { ref username, .. }) if username == "user"),
                "placeholder {placeholder:?} should not be used"
            );
        }
    }

    #[test]
    fn nothing_usable() {
        assert!(Credentials::from_parts(None, None, Some(Token::new(UNSET_TOKEN))).is_none());
        assert!(Credentials::from_parts(Some("user".into()), None, None).is_none());
        assert!(Credentials::from_parts(Some(String::new()), Some(secret("pw")), None).is_none());
    }

    #[test]
    fn debug_does_not_leak_secrets() {
        let creds = Credentials::Login {
            username: "user".into(),
            password: secret("hunter2"),
        };
        assert!(!format!("{creds:?}").contains("hunter2"));
        assert!(!format!("{:?}", Token::new("tok-123")).contains("tok-123"));
    }
}
