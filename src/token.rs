const REJECTED_PREFIX: &str = "invalid";

/// Placeholder token policy: any non-empty token that does not start with
/// `invalid` is accepted.
pub fn is_valid_token(token: &str) -> bool {
    !token.is_empty() && !token.starts_with(REJECTED_PREFIX)
}
