//! The session token carried in the auth cookie.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::auth::UserID;

// The default serde format writes midnight as "0:00:00.0", which it then cannot parse.
time::serde::format_description!(
    expiry_format,
    OffsetDateTime,
    "[year]-[month]-[day] [hour]:[minute]:[second].[subsecond] \
    [offset_hour sign:mandatory]:[offset_minute]:[offset_second]"
);

/// The session token stored as JSON in the private auth cookie.
///
/// `expires_at` is authoritative. The cookie's `Expires` attribute only mirrors it.
#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct Token {
    pub user_id: UserID,
    #[serde(with = "expiry_format")]
    pub expires_at: OffsetDateTime,
}

impl Token {
    /// Whether the session has ended at `now`.
    pub fn is_expired(&self, now: OffsetDateTime) -> bool {
        self.expires_at <= now
    }
}

#[cfg(test)]
mod token_tests {
    use time::{Duration, macros::datetime};

    use crate::UserID;

    use super::Token;

    #[test]
    fn serialises_expiry_with_two_digit_hours() {
        let token = Token {
            user_id: UserID::new(3),
            expires_at: datetime!(2025-06-01 00:00:00 +05:30),
        };

        let json = serde_json::to_string(&token).unwrap();

        assert_eq!(
            json,
            r#"{"user_id":3,"expires_at":"2025-06-01 00:00:00.0 +05:30:00"}"#
        );
        assert_eq!(serde_json::from_str::<Token>(&json).unwrap(), token);
    }

    #[test]
    fn rejects_malformed_expiry() {
        let json = r#"{"user_id":3,"expires_at":"tomorrow"}"#;

        assert!(serde_json::from_str::<Token>(json).is_err());
    }

    #[test]
    fn expires_at_expiry_time() {
        let expires_at = datetime!(2025-06-01 09:30:00 UTC);
        let token = Token {
            user_id: UserID::new(1),
            expires_at,
        };

        assert!(!token.is_expired(expires_at - Duration::seconds(1)));
        assert!(token.is_expired(expires_at));
    }
}
