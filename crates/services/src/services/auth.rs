use bcrypt::{DEFAULT_COST, hash, verify};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error(transparent)]
    Hash(#[from] bcrypt::BcryptError),
}

pub fn hash_password(raw: &str) -> Result<String, AuthError> {
    Ok(hash(raw, DEFAULT_COST)?)
}

pub fn verify_password(raw: &str, password_hash: &str) -> Result<(), AuthError> {
    if verify(raw, password_hash)? {
        Ok(())
    } else {
        Err(AuthError::InvalidCredentials)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify_roundtrip() {
        let hashed = hash_password("s3cret").unwrap();
        assert!(verify_password("s3cret", &hashed).is_ok());
    }

    #[test]
    fn wrong_password_is_rejected() {
        let hashed = hash_password("s3cret").unwrap();
        let err = verify_password("not-it", &hashed).unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    #[test]
    fn malformed_hash_is_an_error() {
        assert!(verify_password("s3cret", "not-a-bcrypt-hash").is_err());
    }
}
