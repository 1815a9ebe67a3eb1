//! Cookie transport for session tokens.

use crate::config::AuthConfig;

/// Extracts the session token from a `Cookie` header value.
///
/// A missing header, a missing cookie or an empty value all yield
/// `None`; they mean "no session", not "bad session".
pub fn token_from_cookies<'a>(cookie_header: Option<&'a str>, cookie_name: &str) -> Option<&'a str> {
    cookie_header?
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == cookie_name)
        .map(|(_, value)| value.trim().trim_matches('"'))
        .filter(|value| !value.is_empty())
}

/// `Set-Cookie` value that installs a session token.
pub fn session_cookie(token: &str, config: &AuthConfig) -> String {
    build_cookie(&config.cookie_name, token, config.session_lifetime_secs, config.cookie_secure)
}

/// `Set-Cookie` value that clears the session cookie.
pub fn clear_session_cookie(config: &AuthConfig) -> String {
    build_cookie(&config.cookie_name, "", 0, config.cookie_secure)
}

fn build_cookie(name: &str, value: &str, max_age: u64, secure: bool) -> String {
    let mut cookie = format!("{name}={value}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age}");
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_named_cookie_among_others() {
        let header = "theme=dark; picito_session=abc.def.ghi; lang=en";
        assert_eq!(
            token_from_cookies(Some(header), "picito_session"),
            Some("abc.def.ghi")
        );
    }

    #[test]
    fn absent_session_is_none() {
        assert_eq!(token_from_cookies(None, "picito_session"), None);
        assert_eq!(token_from_cookies(Some(""), "picito_session"), None);
        assert_eq!(token_from_cookies(Some("theme=dark"), "picito_session"), None);
        assert_eq!(token_from_cookies(Some("picito_session="), "picito_session"), None);
    }

    #[test]
    fn cookie_name_must_match_exactly() {
        let header = "old_picito_session=x; picito_session_v2=y";
        assert_eq!(token_from_cookies(Some(header), "picito_session"), None);
    }

    #[test]
    fn session_cookie_attributes() {
        let config = AuthConfig::default();
        assert_eq!(
            session_cookie("tok", &config),
            "picito_session=tok; Path=/; HttpOnly; SameSite=Lax; Max-Age=86400"
        );

        let secure = AuthConfig {
            cookie_secure: true,
            ..AuthConfig::default()
        };
        assert!(session_cookie("tok", &secure).ends_with("; Secure"));
    }

    #[test]
    fn clearing_cookie_expires_it() {
        let cookie = clear_session_cookie(&AuthConfig::default());
        assert!(cookie.starts_with("picito_session=;"));
        assert!(cookie.contains("Max-Age=0"));
    }
}
