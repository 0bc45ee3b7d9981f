use crate::{
    model::{Id, user::UserMarker},
    util::PositiveDuration,
};
use argon2::{Argon2, Params};
use base64::{DecodeError, Engine, display::Base64Display, prelude::BASE64_STANDARD};
use std::{
    fmt::{Debug, Formatter},
    num::ParseIntError,
    str::FromStr,
};
use thiserror::Error;
use time::UtcDateTime;

pub const SESSION_TOKEN_SECRET_LEN: usize = 24;
pub const SESSION_TOKEN_SALT_LEN: usize = 18;
pub const SESSION_TOKEN_HASH_LEN: usize = Params::DEFAULT_OUTPUT_LEN;

#[derive(Clone, Eq, PartialEq, Debug, Error)]
#[error("Hashing session token failed: {0}")]
pub struct SessionTokenHashError(argon2::Error);

#[derive(Clone, Eq, PartialEq, Debug, Error)]
pub enum SessionTokenDecodeError {
    #[error("Not enough parts separated by ':'")]
    NotEnoughParts,
    #[error("Invalid user id: {0}")]
    InvalidUserId(ParseIntError),
    #[error("Decoding base64 failed: {0}")]
    Decode(#[from] DecodeError),
    #[error("The length of the secret part is incorrect")]
    InvalidSecretLength,
    #[error("The length of the salt part is incorrect")]
    InvalidSaltLength,
}

/// The bearer credential presented by a logged-in user, in the form
/// `<user id>:<base64 secret>:<base64 salt>`. Only its hash is ever stored.
#[derive(Clone, Eq, PartialEq, Hash)]
pub struct SessionToken {
    pub user_id: Id<UserMarker>,
    pub secret: [u8; SESSION_TOKEN_SECRET_LEN],
    pub salt: [u8; SESSION_TOKEN_SALT_LEN],
}

#[derive(Clone, Eq, PartialEq, Hash)]
pub struct SessionTokenHash(pub Box<[u8; SESSION_TOKEN_HASH_LEN]>);

/// A login session row as written by the external login flow. This service
/// only reads sessions to resolve the current user.
#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub struct Session {
    pub user: Id<UserMarker>,
    pub token_hash: SessionTokenHash,
    pub created_at: UtcDateTime,
    pub expires_after: Option<PositiveDuration>,
}

impl Session {
    #[must_use]
    pub fn is_expired(&self, now: UtcDateTime) -> bool {
        match self.expires_after {
            Some(expires_after) => self.created_at + expires_after.get() < now,
            None => false,
        }
    }
}

impl SessionToken {
    #[must_use]
    pub fn generate_random(user_id: Id<UserMarker>) -> Self {
        let secret = rand::random();
        let salt = rand::random();

        Self {
            user_id,
            secret,
            salt,
        }
    }

    #[must_use]
    pub fn as_token_str(&self) -> String {
        let user_id = self.user_id;
        let encoded_secret = Base64Display::new(&self.secret, &BASE64_STANDARD);
        let encoded_salt = Base64Display::new(&self.salt, &BASE64_STANDARD);

        format!("{user_id}:{encoded_secret}:{encoded_salt}")
    }

    pub fn hash(&self) -> Result<SessionTokenHash, SessionTokenHashError> {
        let argon2 = Argon2::default();

        let mut hash = Box::new([0; SESSION_TOKEN_HASH_LEN]);
        argon2
            .hash_password_into(&self.secret, &self.salt, &mut *hash)
            .map_err(SessionTokenHashError)?;

        Ok(SessionTokenHash(hash))
    }
}

impl FromStr for SessionToken {
    type Err = SessionTokenDecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.splitn(3, ':');

        let user_id_part = parts.next().ok_or(Self::Err::NotEnoughParts)?;
        let secret_part = parts.next().ok_or(Self::Err::NotEnoughParts)?;
        let salt_part = parts.next().ok_or(Self::Err::NotEnoughParts)?;

        let user_id = u64::from_str(user_id_part)
            .map_err(Self::Err::InvalidUserId)?
            .into();
        let secret = BASE64_STANDARD
            .decode(secret_part)?
            .try_into()
            .map_err(|_| Self::Err::InvalidSecretLength)?;
        let salt = BASE64_STANDARD
            .decode(salt_part)?
            .try_into()
            .map_err(|_| Self::Err::InvalidSaltLength)?;

        Ok(Self {
            user_id,
            secret,
            salt,
        })
    }
}

impl Debug for SessionToken {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionToken")
            .field("user_id", &self.user_id)
            .field("secret", &"[redacted]")
            .field("salt", &"[redacted]")
            .finish()
    }
}

impl Debug for SessionTokenHash {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("SessionTokenHash")
            .field(&"[redacted]")
            .finish()
    }
}

#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Error)]
#[error("The session token hash had an invalid length")]
pub struct InvalidSessionTokenHashError;

impl TryFrom<Vec<u8>> for SessionTokenHash {
    type Error = InvalidSessionTokenHashError;

    fn try_from(value: Vec<u8>) -> Result<Self, Self::Error> {
        Ok(Self(
            value
                .into_boxed_slice()
                .try_into()
                .map_err(|_| InvalidSessionTokenHashError)?,
        ))
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        model::session::{Session, SessionToken, SessionTokenDecodeError},
        util::PositiveDuration,
    };
    use std::str::FromStr;
    use time::{Duration, macros::utc_datetime};

    #[test]
    fn token_str_round_trip() {
        let token = SessionToken::generate_random(17.into());

        let parsed = SessionToken::from_str(&token.as_token_str()).unwrap();

        assert_eq!(parsed, token);
        assert_eq!(parsed.user_id.get(), 17);
    }

    #[test]
    fn malformed_tokens_are_rejected() {
        assert_eq!(
            SessionToken::from_str("17"),
            Err(SessionTokenDecodeError::NotEnoughParts)
        );
        assert_eq!(
            SessionToken::from_str("17:b25ldHdv"),
            Err(SessionTokenDecodeError::NotEnoughParts)
        );
        assert!(matches!(
            SessionToken::from_str("seventeen:b25ldHdv:b25ldHdv"),
            Err(SessionTokenDecodeError::InvalidUserId(_))
        ));
        assert!(matches!(
            SessionToken::from_str("17:!!!:???"),
            Err(SessionTokenDecodeError::Decode(_))
        ));
        assert_eq!(
            SessionToken::from_str("17:b25ldHdv:b25ldHdv"),
            Err(SessionTokenDecodeError::InvalidSecretLength)
        );
    }

    #[test]
    fn session_expiry() {
        let created_at = utc_datetime!(2025-06-01 12:00);
        let session = Session {
            user: 1.into(),
            token_hash: SessionToken::generate_random(1.into()).hash().unwrap(),
            created_at,
            expires_after: Some(PositiveDuration::new_unchecked(Duration::hours(1))),
        };

        assert!(!session.is_expired(created_at));
        assert!(!session.is_expired(created_at + Duration::minutes(59)));
        assert!(session.is_expired(created_at + Duration::minutes(61)));

        let open_ended = Session {
            expires_after: None,
            ..session
        };
        assert!(!open_ended.is_expired(created_at + Duration::days(1000)));
    }
}
