use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: String,
}

/// Identity handed back by the provider. Held by whoever orchestrates the
/// scan flow and passed down explicitly; never global state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AuthSession {
    pub user: UserProfile,
    pub token: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoginError {
    #[error("email and password are both required")]
    MissingCredentials,
}

/// Stub identity provider: any non-empty credential pair is accepted and a
/// demo profile is minted. This is a placeholder contract, not a security
/// boundary.
pub async fn login(email: &str, password: &str) -> Result<AuthSession, LoginError> {
    if email.trim().is_empty() || password.trim().is_empty() {
        return Err(LoginError::MissingCredentials);
    }

    Ok(AuthSession {
        user: UserProfile {
            id: format!("user_{}", random_base36(9)),
            email: email.to_string(),
            name: "Usuario Demo".to_string(),
            role: "employee".to_string(),
        },
        token: format!("demo_token_{}", random_base36(20)),
    })
}

fn random_base36(len: usize) -> String {
    const CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| CHARSET[rng.gen_range(0..CHARSET.len())] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn empty_credentials_are_rejected() {
        assert_eq!(
            login("", "secret").await.unwrap_err(),
            LoginError::MissingCredentials
        );
        assert_eq!(
            login("ana@empresa.com", "   ").await.unwrap_err(),
            LoginError::MissingCredentials
        );
    }

    #[tokio::test]
    async fn any_non_empty_pair_is_accepted() {
        let session = login("ana@empresa.com", "secret").await.unwrap();
        assert_eq!(session.user.email, "ana@empresa.com");
        assert_eq!(session.user.role, "employee");
        assert!(session.user.id.starts_with("user_"));
        assert_eq!(session.user.id.len(), "user_".len() + 9);
        assert!(session.token.starts_with("demo_token_"));
        assert_eq!(session.token.len(), "demo_token_".len() + 20);
    }

    #[tokio::test]
    async fn minted_ids_differ_between_logins() {
        let a = login("ana@empresa.com", "secret").await.unwrap();
        let b = login("ana@empresa.com", "secret").await.unwrap();
        assert_ne!(a.user.id, b.user.id);
        assert_ne!(a.token, b.token);
    }
}
