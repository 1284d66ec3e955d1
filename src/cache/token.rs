use chrono::{DateTime, Duration, Utc};
use std::fmt;

/// Cached engine access token.
///
/// `expiration_time` is always `fetched_at + expire_in`. The default value was
/// never fetched and expires at the UNIX epoch, so it is expired from the start.
#[derive(Clone, PartialEq, Eq)]
pub struct Token {
    pub access_token: String,
    /// lifetime declared by the server, seconds
    pub expire_in: u64,
    pub token_type: String,
    pub expiration_time: DateTime<Utc>,
}

impl Default for Token {
    fn default() -> Self {
        Self {
            access_token: String::new(),
            expire_in: 0,
            token_type: String::new(),
            expiration_time: DateTime::<Utc>::UNIX_EPOCH,
        }
    }
}

impl Token {
    pub fn new(access_token: String, expire_in: u64, token_type: String, fetched_at: DateTime<Utc>) -> Self {
        // chrono panics on overflow with Duration::seconds, cap instead
        let lifetime = Duration::try_seconds(expire_in.min(i64::MAX as u64) as i64).unwrap_or(Duration::MAX);
        let expiration_time = fetched_at
            .checked_add_signed(lifetime)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        Self { access_token, expire_in, token_type, expiration_time }
    }

    /// Reusable only while expiry is strictly in the future.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.expiration_time > now
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid_at(Utc::now())
    }

    /// Value for the `Authorization` header
    pub fn authorization(&self) -> String {
        format!("{} {}", self.token_type, self.access_token)
    }
}

// access token stays out of logs
impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("access_token", &"***")
            .field("expire_in", &self.expire_in)
            .field("token_type", &self.token_type)
            .field("expiration_time", &self.expiration_time)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_token_is_expired() {
        assert!(!Token::default().is_valid());
    }

    #[test]
    fn expiration_is_fetch_time_plus_lifetime() {
        let fetched_at = Utc::now();
        let token = Token::new("abc".into(), 200, "Bearer".into(), fetched_at);
        assert_eq!(token.expiration_time, fetched_at + Duration::seconds(200));
        assert!(token.is_valid());
    }

    #[test]
    fn expiry_equal_to_now_is_expired() {
        let now = Utc::now();
        let token = Token::new("abc".into(), 0, "Bearer".into(), now);
        assert!(!token.is_valid_at(now));
        assert!(token.is_valid_at(now - Duration::seconds(1)));
    }

    #[test]
    fn huge_lifetime_saturates() {
        let token = Token::new("abc".into(), u64::MAX, "Bearer".into(), Utc::now());
        assert!(token.is_valid());
    }

    #[test]
    fn authorization_uses_declared_scheme() {
        let token = Token::new("abc".into(), 10, "Bearer".into(), Utc::now());
        assert_eq!(token.authorization(), "Bearer abc");
        assert!(!format!("{:?}", token).contains("abc"));
    }
}
