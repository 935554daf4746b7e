//! Credential registry: API keys by logical name, and the default models provisioned
//! for them.

use chrono::Utc;
use diesel::result::Error as DbError;
use rocket::async_trait;

use crate::{
    db::{
        models::{AiModel, ApiKey, ApiKeySecret, NewAiModel, NewApiKey},
        services::{AiModelDbService, ApiKeyDbService},
        DbConnection,
    },
    provider::{LlmError, ProviderKind},
    utils::Encryptor,
};

/// Model created for a provider when a key is registered for it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DefaultModel {
    pub name: &'static str,
    pub model_id: &'static str,
}

/// Default model of each provider that has one
pub const PROVIDER_DEFAULTS: &[(ProviderKind, DefaultModel)] = &[
    (
        ProviderKind::Openai,
        DefaultModel {
            name: "GPT-4 Turbo",
            model_id: "gpt-4-turbo-preview",
        },
    ),
    (
        ProviderKind::Anthropic,
        DefaultModel {
            name: "Claude 3.5 Sonnet",
            model_id: "claude-3-5-sonnet-20240620",
        },
    ),
    (
        ProviderKind::Google,
        DefaultModel {
            name: "Gemini Pro",
            model_id: "gemini-pro",
        },
    ),
];

pub fn default_model(kind: ProviderKind) -> Option<DefaultModel> {
    PROVIDER_DEFAULTS
        .iter()
        .find(|(provider, _)| *provider == kind)
        .map(|(_, model)| *model)
}

/// Conventional logical name of a provider's key, e.g. `OPENAI_API_KEY`
pub fn default_key_name(kind: ProviderKind) -> String {
    format!("{}_API_KEY", kind.as_str().to_uppercase())
}

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error(transparent)]
    Db(#[from] DbError),
    #[error(transparent)]
    Secret(#[from] LlmError),
}

/// Storage used by the registry
#[async_trait]
pub trait CredentialStore: Send {
    async fn find_key_secret(&mut self, name: &str) -> Result<Option<ApiKeySecret>, DbError>;
    /// Insert the key, or overwrite the key with the same name keeping its ID
    async fn upsert_key(&mut self, key: NewApiKey<'_>) -> Result<ApiKey, DbError>;
    async fn find_model(
        &mut self,
        api_key_name: &str,
        provider: &str,
    ) -> Result<Option<AiModel>, DbError>;
    async fn insert_model(&mut self, model: NewAiModel<'_>) -> Result<AiModel, DbError>;
}

#[async_trait]
impl CredentialStore for DbConnection {
    async fn find_key_secret(&mut self, name: &str) -> Result<Option<ApiKeySecret>, DbError> {
        ApiKeyDbService::new(self).find_secret_by_name(name).await
    }

    async fn upsert_key(&mut self, key: NewApiKey<'_>) -> Result<ApiKey, DbError> {
        ApiKeyDbService::new(self).upsert(key).await
    }

    async fn find_model(
        &mut self,
        api_key_name: &str,
        provider: &str,
    ) -> Result<Option<AiModel>, DbError> {
        AiModelDbService::new(self)
            .find_by_key_and_provider(api_key_name, provider)
            .await
    }

    async fn insert_model(&mut self, model: NewAiModel<'_>) -> Result<AiModel, DbError> {
        AiModelDbService::new(self).create(model).await
    }
}

/// API keys by logical name. Secrets are encrypted before they reach the store.
pub struct CredentialRegistry<'a, S: CredentialStore> {
    store: &'a mut S,
    encryptor: &'a Encryptor,
}

impl<'a, S: CredentialStore> CredentialRegistry<'a, S> {
    pub fn new(store: &'a mut S, encryptor: &'a Encryptor) -> Self {
        Self { store, encryptor }
    }

    /// Create the key, or overwrite the key with the same name (keeping its ID).
    /// The key is marked active and tested.
    pub async fn upsert(
        &mut self,
        name: &str,
        provider: ProviderKind,
        secret: &str,
    ) -> Result<ApiKey, RegistryError> {
        let (ciphertext, nonce) = self.encryptor.encrypt_string(secret)?;
        let key = self
            .store
            .upsert_key(NewApiKey {
                name,
                provider: provider.as_str(),
                ciphertext: &ciphertext,
                nonce: &nonce,
                active: true,
                last_tested: Some(Utc::now()),
            })
            .await?;
        rocket::info!("API key saved: {} ({})", key.name, key.provider);

        Ok(key)
    }

    /// Create the provider's default model for the key, unless the provider has no default
    /// or a model already uses this key with this provider.
    pub async fn provision_default_model(
        &mut self,
        key_name: &str,
        provider: ProviderKind,
    ) -> Result<Option<AiModel>, RegistryError> {
        let Some(default) = default_model(provider) else {
            return Ok(None);
        };
        if self
            .store
            .find_model(key_name, provider.as_str())
            .await?
            .is_some()
        {
            return Ok(None);
        }

        let model = self
            .store
            .insert_model(NewAiModel {
                name: default.name,
                provider: provider.as_str(),
                model_id: default.model_id,
                api_key_name: key_name,
                active: Some(true),
            })
            .await?;
        rocket::info!("Provisioned model '{}' for key {}", model.name, key_name);

        Ok(Some(model))
    }

    /// Create the default model of every provider, bound to the provider's conventional key
    /// name. Returns the models that were created.
    pub async fn provision_all_defaults(&mut self) -> Result<Vec<AiModel>, RegistryError> {
        let mut created = Vec::new();
        for (provider, _) in PROVIDER_DEFAULTS {
            let key_name = default_key_name(*provider);
            if let Some(model) = self.provision_default_model(&key_name, *provider).await? {
                created.push(model);
            }
        }

        Ok(created)
    }

    /// Decrypted secret of the active key with this name
    pub async fn resolve(&mut self, name: &str) -> Result<Option<String>, RegistryError> {
        match self.store.find_key_secret(name).await? {
            Some(key) if key.active => Ok(Some(
                self.encryptor.decrypt_string(&key.ciphertext, &key.nonce)?,
            )),
            _ => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    const KEY: &str = "000102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f";

    /// In-memory credential store
    #[derive(Default)]
    pub struct MemoryStore {
        pub keys: Vec<(ApiKey, Vec<u8>, Vec<u8>)>,
        pub models: Vec<AiModel>,
    }

    #[async_trait]
    impl CredentialStore for MemoryStore {
        async fn find_key_secret(
            &mut self,
            name: &str,
        ) -> Result<Option<ApiKeySecret>, DbError> {
            Ok(self
                .keys
                .iter()
                .find(|(key, _, _)| key.name == name)
                .map(|(key, ciphertext, nonce)| ApiKeySecret {
                    id: key.id,
                    name: key.name.clone(),
                    provider: key.provider.clone(),
                    ciphertext: ciphertext.clone(),
                    nonce: nonce.clone(),
                    active: key.active,
                }))
        }

        async fn upsert_key(&mut self, new: NewApiKey<'_>) -> Result<ApiKey, DbError> {
            let now = Utc::now();
            if let Some((key, ciphertext, nonce)) =
                self.keys.iter_mut().find(|(key, _, _)| key.name == new.name)
            {
                key.provider = new.provider.to_owned();
                key.active = new.active;
                key.last_tested = new.last_tested;
                key.updated_at = now;
                *ciphertext = new.ciphertext.clone();
                *nonce = new.nonce.clone();
                return Ok(key.clone());
            }

            let key = ApiKey {
                id: self.keys.len() as i32 + 1,
                name: new.name.to_owned(),
                provider: new.provider.to_owned(),
                active: new.active,
                last_tested: new.last_tested,
                created_at: now,
                updated_at: now,
            };
            self.keys
                .push((key.clone(), new.ciphertext.clone(), new.nonce.clone()));
            Ok(key)
        }

        async fn find_model(
            &mut self,
            api_key_name: &str,
            provider: &str,
        ) -> Result<Option<AiModel>, DbError> {
            Ok(self
                .models
                .iter()
                .find(|model| model.api_key_name == api_key_name && model.provider == provider)
                .cloned())
        }

        async fn insert_model(&mut self, new: NewAiModel<'_>) -> Result<AiModel, DbError> {
            let model = AiModel {
                id: self.models.len() as i32 + 1,
                name: new.name.to_owned(),
                provider: new.provider.to_owned(),
                model_id: new.model_id.to_owned(),
                api_key_name: new.api_key_name.to_owned(),
                active: new.active.unwrap_or(true),
                created_at: Utc::now(),
            };
            self.models.push(model.clone());
            Ok(model)
        }
    }

    fn encryptor() -> Encryptor {
        Encryptor::new(KEY).unwrap()
    }

    #[tokio::test]
    async fn upsert_with_existing_name_keeps_id() {
        let encryptor = encryptor();
        let mut store = MemoryStore::default();
        let mut registry = CredentialRegistry::new(&mut store, &encryptor);

        let first = registry
            .upsert("OPENAI_API_KEY", ProviderKind::Openai, "sk-old")
            .await
            .unwrap();
        let second = registry
            .upsert("OPENAI_API_KEY", ProviderKind::Openai, "sk-new")
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(
            registry.resolve("OPENAI_API_KEY").await.unwrap().as_deref(),
            Some("sk-new")
        );
        assert_eq!(store.keys.len(), 1);
    }

    #[tokio::test]
    async fn upsert_reactivates_key() {
        let encryptor = encryptor();
        let mut store = MemoryStore::default();
        {
            let mut registry = CredentialRegistry::new(&mut store, &encryptor);
            registry
                .upsert("CLAUDE", ProviderKind::Anthropic, "sk-ant")
                .await
                .unwrap();
        }
        store.keys[0].0.active = false;

        let mut registry = CredentialRegistry::new(&mut store, &encryptor);
        assert_eq!(registry.resolve("CLAUDE").await.unwrap(), None);
        let key = registry
            .upsert("CLAUDE", ProviderKind::Anthropic, "sk-ant-2")
            .await
            .unwrap();
        assert!(key.active);
        assert!(key.last_tested.is_some());
        assert_eq!(
            registry.resolve("CLAUDE").await.unwrap().as_deref(),
            Some("sk-ant-2")
        );
    }

    #[tokio::test]
    async fn fresh_openai_key_provisions_exactly_one_model() {
        let encryptor = encryptor();
        let mut store = MemoryStore::default();
        let mut registry = CredentialRegistry::new(&mut store, &encryptor);

        registry
            .upsert("TEAM_OPENAI", ProviderKind::Openai, "sk-1")
            .await
            .unwrap();
        let created = registry
            .provision_default_model("TEAM_OPENAI", ProviderKind::Openai)
            .await
            .unwrap();
        registry
            .upsert("TEAM_OPENAI", ProviderKind::Openai, "sk-2")
            .await
            .unwrap();
        let again = registry
            .provision_default_model("TEAM_OPENAI", ProviderKind::Openai)
            .await
            .unwrap();

        let created = created.expect("model should be created");
        assert_eq!(created.api_key_name, "TEAM_OPENAI");
        assert_eq!(created.model_id, "gpt-4-turbo-preview");
        assert!(again.is_none());
        assert_eq!(store.models.len(), 1);
    }

    #[tokio::test]
    async fn provider_without_default_provisions_nothing() {
        let encryptor = encryptor();
        let mut store = MemoryStore::default();
        let mut registry = CredentialRegistry::new(&mut store, &encryptor);

        let created = registry
            .provision_default_model("DEEPSEEK_API_KEY", ProviderKind::Deepseek)
            .await
            .unwrap();

        assert!(created.is_none());
        assert!(store.models.is_empty());
    }

    #[tokio::test]
    async fn provisions_all_defaults_once() {
        let encryptor = encryptor();
        let mut store = MemoryStore::default();
        let mut registry = CredentialRegistry::new(&mut store, &encryptor);

        let created = registry.provision_all_defaults().await.unwrap();
        let again = registry.provision_all_defaults().await.unwrap();

        assert_eq!(created.len(), PROVIDER_DEFAULTS.len());
        assert!(again.is_empty());
        assert!(store
            .models
            .iter()
            .any(|model| model.api_key_name == "ANTHROPIC_API_KEY"
                && model.model_id == "claude-3-5-sonnet-20240620"));
    }

    #[tokio::test]
    async fn unknown_key_does_not_resolve() {
        let encryptor = encryptor();
        let mut store = MemoryStore::default();
        let mut registry = CredentialRegistry::new(&mut store, &encryptor);

        assert_eq!(registry.resolve("MISSING").await.unwrap(), None);
    }
}
