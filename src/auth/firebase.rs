use std::time::{Duration, Instant};

use chrono::{DateTime, TimeDelta, Utc};
use jsonwebtoken::{
    decode, decode_header, encode, jwk::JwkSet, Algorithm, DecodingKey, EncodingKey, Header,
    Validation,
};
use rocket::async_trait;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tokio::sync::RwLock;

use super::identity::{IdentityError, IdentityProvider, IdentityUser, UserRole, VerifiedToken};

const JWKS_URL: &str =
    "https://www.googleapis.com/service_accounts/v1/jwk/securetoken@system.gserviceaccount.com";
const JWKS_TTL: Duration = Duration::from_secs(3600);
const JWKS_MIN_REFRESH: Duration = Duration::from_secs(60);
const IDENTITY_TOOLKIT_URL: &str = "https://identitytoolkit.googleapis.com/v1";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const TOKEN_SCOPE: &str =
    "https://www.googleapis.com/auth/identitytoolkit https://www.googleapis.com/auth/cloud-platform";
const ACCESS_TOKEN_LIFETIME_SECS: i64 = 3600;
/// Access tokens are refreshed this long before they expire
const ACCESS_TOKEN_REFRESH_MARGIN_SECS: i64 = 60;
const LIST_PAGE_SIZE: &str = "500";

/// Service account credentials, as downloaded from the Firebase console
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccount {
    pub project_id: String,
    pub client_email: String,
    pub private_key: String,
    pub token_uri: Option<String>,
}

/// Firebase Authentication client: verifies ID tokens against Google's signing keys and
/// manages role claims through the Identity Toolkit API.
pub struct FirebaseIdentityProvider {
    client: reqwest::Client,
    account: ServiceAccount,
    encoding_key: EncodingKey,
    jwks: RwLock<Option<CachedJwks>>,
    access_token: RwLock<Option<CachedAccessToken>>,
}

struct CachedJwks {
    keys: JwkSet,
    fetched_at: Instant,
}

impl CachedJwks {
    fn needs_refresh(&self, kid: &str) -> bool {
        jwks_needs_refresh(self.fetched_at.elapsed(), self.keys.find(kid).is_some())
    }
}

/// Expired key sets are always refetched. A fresh set missing the key is refetched at most
/// once per `JWKS_MIN_REFRESH`.
fn jwks_needs_refresh(age: Duration, has_key: bool) -> bool {
    age >= JWKS_TTL || (!has_key && age >= JWKS_MIN_REFRESH)
}

fn find_decoding_key(keys: &JwkSet, kid: &str) -> Result<DecodingKey, IdentityError> {
    let jwk = keys
        .find(kid)
        .ok_or_else(|| IdentityError::InvalidToken("Unknown signing key".to_owned()))?;
    DecodingKey::from_jwk(jwk).map_err(|e| IdentityError::InvalidToken(e.to_string()))
}

struct CachedAccessToken {
    token: String,
    expires_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct IdTokenClaims {
    sub: String,
    email: Option<String>,
}

#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct AccessTokenResponse {
    access_token: String,
    expires_in: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FirebaseUser {
    local_id: String,
    email: Option<String>,
    custom_attributes: Option<String>,
}

impl From<FirebaseUser> for IdentityUser {
    fn from(user: FirebaseUser) -> Self {
        IdentityUser {
            role: role_from_custom_attributes(user.custom_attributes.as_deref()),
            uid: user.local_id,
            email: user.email,
        }
    }
}

#[derive(Debug, Deserialize)]
struct LookupResponse {
    users: Option<Vec<FirebaseUser>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BatchGetResponse {
    users: Option<Vec<FirebaseUser>>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RoleClaims {
    role: Option<UserRole>,
}

/// Parse the role out of the user's custom claims JSON
fn role_from_custom_attributes(attributes: Option<&str>) -> UserRole {
    attributes
        .and_then(|attrs| serde_json::from_str::<RoleClaims>(attrs).ok())
        .and_then(|claims| claims.role)
        .unwrap_or_default()
}

impl FirebaseIdentityProvider {
    pub fn new(http_client: &reqwest::Client, account: ServiceAccount) -> Result<Self, IdentityError> {
        let encoding_key = EncodingKey::from_rsa_pem(account.private_key.as_bytes())
            .map_err(|e| IdentityError::Config(format!("Invalid private key: {}", e)))?;

        Ok(Self {
            client: http_client.clone(),
            account,
            encoding_key,
            jwks: RwLock::new(None),
            access_token: RwLock::new(None),
        })
    }

    /// Load the service account from a JSON file
    pub fn from_file(http_client: &reqwest::Client, path: &str) -> Result<Self, IdentityError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| IdentityError::Config(format!("Couldn't read {}: {}", path, e)))?;
        let account: ServiceAccount = serde_json::from_str(&contents)
            .map_err(|e| IdentityError::Config(format!("Invalid service account: {}", e)))?;

        Self::new(http_client, account)
    }

    /// Get the public key that signed a token, refreshing the cached key set if needed
    async fn decoding_key(&self, kid: &str) -> Result<DecodingKey, IdentityError> {
        {
            let cached = self.jwks.read().await;
            if let Some(jwks) = cached.as_ref().filter(|jwks| !jwks.needs_refresh(kid)) {
                return find_decoding_key(&jwks.keys, kid);
            }
        }

        let mut cached = self.jwks.write().await;
        // Another request may have refreshed the keys while we waited for the lock
        if let Some(jwks) = cached.as_ref().filter(|jwks| !jwks.needs_refresh(kid)) {
            return find_decoding_key(&jwks.keys, kid);
        }

        rocket::debug!("Fetching identity provider signing keys");
        let keys: JwkSet = self
            .client
            .get(JWKS_URL)
            .send()
            .await
            .and_then(|res| res.error_for_status())
            .map_err(|e| IdentityError::Request(e.to_string()))?
            .json()
            .await
            .map_err(|e| IdentityError::Request(e.to_string()))?;
        let key = find_decoding_key(&keys, kid);
        *cached = Some(CachedJwks {
            keys,
            fetched_at: Instant::now(),
        });

        key
    }

    /// Get an OAuth access token for the service account, reusing the cached one until
    /// shortly before it expires
    async fn access_token(&self) -> Result<String, IdentityError> {
        let now = Utc::now();
        {
            let cached = self.access_token.read().await;
            if let Some(token) = cached.as_ref() {
                if token.expires_at - TimeDelta::seconds(ACCESS_TOKEN_REFRESH_MARGIN_SECS) > now {
                    return Ok(token.token.clone());
                }
            }
        }

        let token_uri = self.account.token_uri.as_deref().unwrap_or(DEFAULT_TOKEN_URI);
        let claims = AssertionClaims {
            iss: &self.account.client_email,
            scope: TOKEN_SCOPE,
            aud: token_uri,
            iat: now.timestamp(),
            exp: now.timestamp() + ACCESS_TOKEN_LIFETIME_SECS,
        };
        let assertion = encode(&Header::new(Algorithm::RS256), &claims, &self.encoding_key)
            .map_err(|e| IdentityError::Config(format!("Couldn't sign assertion: {}", e)))?;

        let response: AccessTokenResponse = self
            .client
            .post(token_uri)
            .form(&[
                ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
                ("assertion", assertion.as_str()),
            ])
            .send()
            .await
            .and_then(|res| res.error_for_status())
            .map_err(|e| IdentityError::Request(e.to_string()))?
            .json()
            .await
            .map_err(|e| IdentityError::Request(e.to_string()))?;

        let expires_in = response.expires_in.unwrap_or(ACCESS_TOKEN_LIFETIME_SECS);
        *self.access_token.write().await = Some(CachedAccessToken {
            token: response.access_token.clone(),
            expires_at: now + TimeDelta::seconds(expires_in),
        });

        Ok(response.access_token)
    }

    fn accounts_url(&self, method: &str) -> String {
        format!(
            "{}/projects/{}/accounts:{}",
            IDENTITY_TOOLKIT_URL, self.account.project_id, method
        )
    }

    async fn admin_post<T: DeserializeOwned>(
        &self,
        method: &str,
        body: &serde_json::Value,
    ) -> Result<T, IdentityError> {
        let access_token = self.access_token().await?;
        self.client
            .post(self.accounts_url(method))
            .bearer_auth(access_token)
            .json(body)
            .send()
            .await
            .and_then(|res| res.error_for_status())
            .map_err(|e| IdentityError::Request(e.to_string()))?
            .json()
            .await
            .map_err(|e| IdentityError::Request(e.to_string()))
    }
}

#[async_trait]
impl IdentityProvider for FirebaseIdentityProvider {
    async fn verify_token(&self, token: &str) -> Result<VerifiedToken, IdentityError> {
        let header =
            decode_header(token).map_err(|e| IdentityError::InvalidToken(e.to_string()))?;
        let kid = header
            .kid
            .ok_or_else(|| IdentityError::InvalidToken("Missing key ID".to_owned()))?;
        let key = self.decoding_key(&kid).await?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[&self.account.project_id]);
        validation.set_issuer(&[format!(
            "https://securetoken.google.com/{}",
            self.account.project_id
        )]);
        let claims = decode::<IdTokenClaims>(token, &key, &validation)
            .map_err(|e| IdentityError::InvalidToken(e.to_string()))?
            .claims;
        if claims.sub.is_empty() {
            return Err(IdentityError::InvalidToken("Empty subject".to_owned()));
        }

        Ok(VerifiedToken {
            uid: claims.sub,
            email: claims.email,
        })
    }

    async fn get_user(&self, uid: &str) -> Result<IdentityUser, IdentityError> {
        let response: LookupResponse = self
            .admin_post("lookup", &serde_json::json!({ "localId": [uid] }))
            .await?;

        response
            .users
            .and_then(|users| users.into_iter().next())
            .map(IdentityUser::from)
            .ok_or(IdentityError::UserNotFound)
    }

    async fn list_users(&self) -> Result<Vec<IdentityUser>, IdentityError> {
        let access_token = self.access_token().await?;
        let mut users = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let mut request = self
                .client
                .get(self.accounts_url("batchGet"))
                .bearer_auth(&access_token)
                .query(&[("maxResults", LIST_PAGE_SIZE)]);
            if let Some(token) = page_token.as_deref() {
                request = request.query(&[("nextPageToken", token)]);
            }
            let page: BatchGetResponse = request
                .send()
                .await
                .and_then(|res| res.error_for_status())
                .map_err(|e| IdentityError::Request(e.to_string()))?
                .json()
                .await
                .map_err(|e| IdentityError::Request(e.to_string()))?;

            users.extend(page.users.unwrap_or_default().into_iter().map(IdentityUser::from));
            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        Ok(users)
    }

    async fn set_role(&self, uid: &str, role: UserRole) -> Result<(), IdentityError> {
        let custom_attributes = serde_json::json!({ "role": role }).to_string();
        let _: serde_json::Value = self
            .admin_post(
                "update",
                &serde_json::json!({ "localId": uid, "customAttributes": custom_attributes }),
            )
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_key_set_is_not_refetched_for_unknown_key() {
        let jwks = CachedJwks {
            keys: JwkSet { keys: vec![] },
            fetched_at: Instant::now(),
        };
        assert!(!jwks.needs_refresh("forged-kid"));
        assert!(matches!(
            find_decoding_key(&jwks.keys, "forged-kid"),
            Err(IdentityError::InvalidToken(_))
        ));
    }

    #[test]
    fn key_set_refresh_rules() {
        let minute = Duration::from_secs(60);
        // known key: only on expiry
        assert!(!jwks_needs_refresh(Duration::ZERO, true));
        assert!(!jwks_needs_refresh(JWKS_TTL - minute, true));
        assert!(jwks_needs_refresh(JWKS_TTL, true));

        // unknown key: rate-limited
        assert!(!jwks_needs_refresh(Duration::from_secs(5), false));
        assert!(!jwks_needs_refresh(JWKS_MIN_REFRESH - Duration::from_secs(1), false));
        assert!(jwks_needs_refresh(JWKS_MIN_REFRESH, false));
    }

    #[test]
    fn reads_role_from_custom_attributes() {
        assert_eq!(
            role_from_custom_attributes(Some(r#"{"role":"admin"}"#)),
            UserRole::Admin
        );
        assert_eq!(
            role_from_custom_attributes(Some(r#"{"role":"user","team":"x"}"#)),
            UserRole::User
        );
    }

    #[test]
    fn missing_or_unknown_role_is_user() {
        assert_eq!(role_from_custom_attributes(None), UserRole::User);
        assert_eq!(role_from_custom_attributes(Some("{}")), UserRole::User);
        assert_eq!(
            role_from_custom_attributes(Some(r#"{"role":"owner"}"#)),
            UserRole::User
        );
    }

    #[test]
    fn converts_firebase_users() {
        let user: FirebaseUser = serde_json::from_str(
            r#"{"localId":"abc","email":"a@example.com","customAttributes":"{\"role\":\"admin\"}","emailVerified":true}"#,
        )
        .unwrap();
        let user = IdentityUser::from(user);

        assert_eq!(user.uid, "abc");
        assert_eq!(user.email.as_deref(), Some("a@example.com"));
        assert_eq!(user.role, UserRole::Admin);
    }

    #[test]
    fn rejects_invalid_private_key() {
        let account = ServiceAccount {
            project_id: "demo".to_owned(),
            client_email: "svc@demo.iam.gserviceaccount.com".to_owned(),
            private_key: "not a key".to_owned(),
            token_uri: None,
        };
        assert!(matches!(
            FirebaseIdentityProvider::new(&reqwest::Client::new(), account),
            Err(IdentityError::Config(_))
        ));
    }
}
