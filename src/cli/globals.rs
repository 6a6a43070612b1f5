use secrecy::SecretString;

use crate::token::{TokenConfig, TokenKeys};
use crate::vault;

/// Configuration shared by every component: token signing material and the
/// vault cost factor. Secrets are wrapped so they never appear in debug
/// output.
#[derive(Debug, Clone)]
pub struct GlobalArgs {
    pub access_token_secret: SecretString,
    pub access_token_ttl_seconds: u64,
    pub refresh_token_secret: SecretString,
    pub refresh_token_ttl_seconds: u64,
    pub secret_hash_cost: u32,
}

impl GlobalArgs {
    #[must_use]
    pub fn new() -> Self {
        Self {
            access_token_secret: SecretString::default(),
            access_token_ttl_seconds: 0,
            refresh_token_secret: SecretString::default(),
            refresh_token_ttl_seconds: 0,
            secret_hash_cost: vault::DEFAULT_COST,
        }
    }

    /// Build the per-purpose token configuration handed to the token issuer.
    #[must_use]
    pub fn token_keys(&self) -> TokenKeys {
        TokenKeys {
            access: TokenConfig::new(
                self.access_token_secret.clone(),
                self.access_token_ttl_seconds,
            ),
            refresh: TokenConfig::new(
                self.refresh_token_secret.clone(),
                self.refresh_token_ttl_seconds,
            ),
        }
    }
}

impl Default for GlobalArgs {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_global_args() {
        let args = GlobalArgs::new();
        assert_eq!(args.access_token_secret.expose_secret(), "");
        assert_eq!(args.secret_hash_cost, vault::DEFAULT_COST);
    }

    #[test]
    fn token_keys_carry_ttls() {
        let args = GlobalArgs {
            access_token_secret: SecretString::from("a".to_string()),
            access_token_ttl_seconds: 900,
            refresh_token_secret: SecretString::from("r".to_string()),
            refresh_token_ttl_seconds: 2_592_000,
            secret_hash_cost: vault::DEFAULT_COST,
        };
        let keys = args.token_keys();
        assert_eq!(keys.access.ttl_seconds(), 900);
        assert_eq!(keys.refresh.ttl_seconds(), 2_592_000);
    }
}
