//! Signup input validation.
//!
//! Rejects malformed input before any store mutation.

use super::WaitlistError;

const MAX_NAME_LEN: usize = 200;
const MAX_EMAIL_LEN: usize = 254;

pub fn validate_name(name: &str) -> Result<(), WaitlistError> {
    let trimmed = name.trim();
    if trimmed.chars().count() < 2 {
        return Err(WaitlistError::Validation(
            "name must be at least 2 characters",
        ));
    }
    if trimmed.len() > MAX_NAME_LEN {
        return Err(WaitlistError::Validation("name too long"));
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), WaitlistError> {
    if email.len() > MAX_EMAIL_LEN || email.chars().any(char::is_whitespace) {
        return Err(WaitlistError::Validation("invalid email address"));
    }
    let Some((local, domain)) = email.split_once('@') else {
        return Err(WaitlistError::Validation("invalid email address"));
    };
    let dot_ok = match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    };
    if local.is_empty() || domain.contains('@') || !dot_ok {
        return Err(WaitlistError::Validation("invalid email address"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_normal_input() {
        assert!(validate_name("Ada Lovelace").is_ok());
        assert!(validate_email("ada@example.com").is_ok());
    }

    #[test]
    fn rejects_short_name() {
        assert!(validate_name("A").is_err());
        assert!(validate_name(" a ").is_err());
    }

    #[test]
    fn rejects_malformed_email() {
        for bad in [
            "",
            "plainaddress",
            "@example.com",
            "a@b",
            "a b@example.com",
            "a@@example.com",
            "a@.com",
            "a@com.",
        ] {
            assert!(validate_email(bad).is_err(), "accepted {bad:?}");
        }
    }
}
