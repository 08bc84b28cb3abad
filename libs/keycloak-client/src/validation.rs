use crate::error::ValidationError;

/// Fails when `value` is empty or whitespace only.
pub(crate) fn require(value: &str, name: &'static str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required(name));
    }
    Ok(())
}

/// Realm and bearer token are required by every admin call.
pub(crate) fn require_access(realm: &str, access_token: &str) -> Result<(), ValidationError> {
    require(realm, "realm")?;
    require(access_token, "accessToken")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_realm_is_reported_first() {
        assert_eq!(
            require_access(" ", ""),
            Err(ValidationError::Required("realm"))
        );
    }

    #[test]
    fn missing_token_is_reported() {
        let err = require_access("demo", "").unwrap_err();
        assert_eq!(err.to_string(), "accessToken is required");
    }

    #[test]
    fn present_values_pass() {
        assert!(require_access("demo", "token").is_ok());
    }
}
