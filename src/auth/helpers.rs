use crate::error::Result;
use crate::server::AppState;
use crate::types::SessionUser;

/// Extracts the token from a `Bearer <token>` header value.
/// Returns None for other schemes or an empty token.
#[must_use]
pub fn extract_bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// Resolves a raw token to a live session.
pub fn validate_session(state: &AppState, token: &str) -> Result<Option<SessionUser>> {
    state.store.find_session(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(extract_bearer_token("Bearer abc-123"), Some("abc-123"));
        assert_eq!(extract_bearer_token("bearer abc-123 "), Some("abc-123"));
        assert_eq!(extract_bearer_token("Bearer "), None);
        assert_eq!(extract_bearer_token("Bearer"), None);
        assert_eq!(extract_bearer_token("Basic eC10b2tlbjp4"), None);
        assert_eq!(extract_bearer_token(""), None);
    }
}
