//! # ih-auth-simple
//!
//! HMAC-SHA256 implementation of `Authenticator`.
//!
//! A token is `base64url(user_id) "." base64url(hmac(secret, user_id))`.
//! Tokens carry no expiry; rotating the secret revokes all of them.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use hmac::{Hmac, Mac};
use ih_core::models::UserId;
use ih_core::traits::Authenticator;
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use tracing::debug;

type HmacSha256 = Hmac<Sha256>;

pub struct SimpleAuthenticator {
    secret: SecretString,
}

impl SimpleAuthenticator {
    pub fn new(secret: SecretString) -> Self {
        Self { secret }
    }

    fn mac(&self) -> HmacSha256 {
        // HMAC accepts keys of any length, so this cannot fail.
        HmacSha256::new_from_slice(self.secret.expose_secret().as_bytes())
            .unwrap_or_else(|_| unreachable!("hmac takes any key length"))
    }

    /// Issues a bearer token that `authenticate` maps back to `user_id`.
    pub fn issue_token(&self, user_id: &str) -> String {
        let mut mac = self.mac();
        mac.update(user_id.as_bytes());
        let signature = mac.finalize().into_bytes();
        format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(user_id.as_bytes()),
            URL_SAFE_NO_PAD.encode(signature)
        )
    }
}

impl Authenticator for SimpleAuthenticator {
    fn authenticate(&self, token: &str) -> Option<UserId> {
        let (user_part, sig_part) = token.trim().split_once('.')?;
        let user_bytes = URL_SAFE_NO_PAD.decode(user_part).ok()?;
        let signature = URL_SAFE_NO_PAD.decode(sig_part).ok()?;

        let mut mac = self.mac();
        mac.update(&user_bytes);
        if mac.verify_slice(&signature).is_err() {
            debug!("rejected token with bad signature");
            return None;
        }

        String::from_utf8(user_bytes).ok().filter(|id| !id.is_empty())
    }
}
