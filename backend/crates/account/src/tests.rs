//! Unit tests for the account crate

use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::application::config::AccountConfig;
use crate::domain::entity::{Address, OAuthBinding, User};
use crate::domain::repository::{
    AddressRepository, IdentityProvider, OAuthBindingRepository, UserRepository,
};
use crate::domain::value_object::{AddressId, Mobile, UserId, UserName};
use crate::error::{AccountError, AccountResult};

// ============================================================================
// Test doubles
// ============================================================================

/// In-memory repository backing all three repository traits
#[derive(Clone, Default)]
struct MemAccountRepository {
    users: Arc<Mutex<Vec<User>>>,
    addresses: Arc<Mutex<Vec<Address>>>,
    bindings: Arc<Mutex<Vec<OAuthBinding>>>,
}

impl UserRepository for MemAccountRepository {
    async fn create(&self, user: &User) -> AccountResult<()> {
        self.users.lock().unwrap().push(user.clone());
        Ok(())
    }

    async fn find_by_id(&self, user_id: &UserId) -> AccountResult<Option<User>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.user_id == *user_id)
            .cloned())
    }

    async fn find_by_user_name(&self, user_name: &UserName) -> AccountResult<Option<User>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.user_name.canonical() == user_name.canonical())
            .cloned())
    }

    async fn find_by_mobile(&self, mobile: &Mobile) -> AccountResult<Option<User>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.mobile == *mobile)
            .cloned())
    }

    async fn count_by_user_name(&self, user_name: &str) -> AccountResult<i64> {
        let canonical = user_name.to_lowercase();
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .filter(|u| u.user_name.canonical() == canonical)
            .count() as i64)
    }

    async fn count_by_mobile(&self, mobile: &str) -> AccountResult<i64> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .filter(|u| u.mobile.as_str() == mobile)
            .count() as i64)
    }

    async fn update(&self, user: &User) -> AccountResult<()> {
        let mut users = self.users.lock().unwrap();
        let existing = users
            .iter_mut()
            .find(|u| u.user_id == user.user_id)
            .expect("update of unknown user");
        *existing = user.clone();
        Ok(())
    }
}

impl AddressRepository for MemAccountRepository {
    async fn create(&self, address: &Address) -> AccountResult<()> {
        self.addresses.lock().unwrap().push(address.clone());
        Ok(())
    }

    async fn find_by_id(&self, address_id: &AddressId) -> AccountResult<Option<Address>> {
        Ok(self
            .addresses
            .lock()
            .unwrap()
            .iter()
            .find(|a| a.address_id == *address_id)
            .cloned())
    }

    async fn find_live_by_user(&self, user_id: &UserId) -> AccountResult<Vec<Address>> {
        let mut live: Vec<Address> = self
            .addresses
            .lock()
            .unwrap()
            .iter()
            .filter(|a| a.user_id == *user_id && !a.is_deleted)
            .cloned()
            .collect();
        live.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(live)
    }

    async fn count_live_by_user(&self, user_id: &UserId) -> AccountResult<i64> {
        Ok(self
            .addresses
            .lock()
            .unwrap()
            .iter()
            .filter(|a| a.user_id == *user_id && !a.is_deleted)
            .count() as i64)
    }

    async fn update(&self, address: &Address) -> AccountResult<()> {
        let mut addresses = self.addresses.lock().unwrap();
        let existing = addresses
            .iter_mut()
            .find(|a| a.address_id == address.address_id)
            .expect("update of unknown address");
        *existing = address.clone();
        Ok(())
    }
}

impl OAuthBindingRepository for MemAccountRepository {
    async fn create(&self, binding: &OAuthBinding) -> AccountResult<()> {
        self.bindings.lock().unwrap().push(binding.clone());
        Ok(())
    }

    async fn find_by_openid(&self, openid: &str) -> AccountResult<Option<OAuthBinding>> {
        Ok(self
            .bindings
            .lock()
            .unwrap()
            .iter()
            .find(|b| b.openid == openid)
            .cloned())
    }
}

/// Provider stub that always resolves to one openid
#[derive(Clone)]
struct StubProvider {
    openid: String,
}

impl IdentityProvider for StubProvider {
    fn login_url(&self, state: &str) -> String {
        format!("https://provider.test/authorize?state={}", state)
    }

    async fn exchange_code(&self, _code: &str) -> AccountResult<String> {
        Ok("provider-access-token".to_string())
    }

    async fn fetch_openid(&self, _access_token: &str) -> AccountResult<String> {
        Ok(self.openid.clone())
    }
}

/// Provider stub that fails like a dead upstream
#[derive(Clone)]
struct FailingProvider;

impl IdentityProvider for FailingProvider {
    fn login_url(&self, _state: &str) -> String {
        String::new()
    }

    async fn exchange_code(&self, _code: &str) -> AccountResult<String> {
        Err(AccountError::Provider("connection timed out".to_string()))
    }

    async fn fetch_openid(&self, _access_token: &str) -> AccountResult<String> {
        Err(AccountError::Provider("connection timed out".to_string()))
    }
}

fn test_config() -> Arc<AccountConfig> {
    Arc::new(AccountConfig::with_random_secret())
}

// ============================================================================
// Token tests
// ============================================================================

#[cfg(test)]
mod token_tests {
    use super::*;
    use crate::application::tokens::{self, SessionClaims};
    use crate::domain::value_object::{RawPassword, UserPassword};
    use jsonwebtoken::{EncodingKey, Header, encode};

    fn sample_user() -> User {
        let raw = RawPassword::new("CorrectHorse9".to_string()).unwrap();
        User::new(
            UserName::new("alice_01").unwrap(),
            UserPassword::from_raw(&raw, None).unwrap(),
            Mobile::new("13800001111").unwrap(),
        )
    }

    #[test]
    fn test_session_roundtrip() {
        let config = test_config();
        let user = sample_user();

        let token = tokens::issue_session(&user, &config).unwrap();
        let claims = tokens::verify_session(&token, &config).unwrap();

        assert_eq!(claims.user_id, user.user_id.into_uuid());
        assert_eq!(claims.username, "alice_01");
        assert_eq!(claims.email, None);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_expired_session_fails() {
        let config = test_config();
        let user = sample_user();

        let now = chrono::Utc::now().timestamp();
        let claims = SessionClaims {
            user_id: user.user_id.into_uuid(),
            username: "alice_01".to_string(),
            email: None,
            iat: now - 7200,
            exp: now - 3600,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(config.token_secret.as_bytes()),
        )
        .unwrap();

        assert!(matches!(
            tokens::verify_session(&token, &config),
            Err(AccountError::InvalidToken)
        ));
    }

    #[test]
    fn test_tampered_session_fails() {
        let config = test_config();
        let token = tokens::issue_session(&sample_user(), &config).unwrap();

        // Flip the last signature character
        let mut tampered = token.clone();
        let last = tampered.pop().unwrap();
        tampered.push(if last == 'A' { 'B' } else { 'A' });

        assert!(tokens::verify_session(&tampered, &config).is_err());
        assert!(tokens::verify_session("not.a.token", &config).is_err());
    }

    #[test]
    fn test_wrong_secret_fails() {
        let config = test_config();
        let other = test_config();
        let token = tokens::issue_session(&sample_user(), &config).unwrap();

        assert!(tokens::verify_session(&token, &other).is_err());
    }

    #[test]
    fn test_token_kinds_are_disjoint() {
        let config = test_config();

        // A binding token must never pass as a session token
        let binding = tokens::issue_binding("openid-123", &config).unwrap();
        assert!(tokens::verify_session(&binding, &config).is_err());

        // ...and a session token never as a binding token
        let session = tokens::issue_session(&sample_user(), &config).unwrap();
        assert!(tokens::verify_binding(&session, &config).is_err());
    }

    #[test]
    fn test_binding_roundtrip() {
        let config = test_config();
        let token = tokens::issue_binding("openid-123", &config).unwrap();
        let claims = tokens::verify_binding(&token, &config).unwrap();
        assert_eq!(claims.openid, "openid-123");
    }
}

// ============================================================================
// Sign up / sign in tests
// ============================================================================

#[cfg(test)]
mod sign_up_tests {
    use super::*;
    use crate::application::{SignUpInput, SignUpUseCase, tokens};
    use platform::cache::{MemoryTtlStore, TtlStore};
    use verify::domain::keys;

    const MOBILE: &str = "13800001111";

    fn input() -> SignUpInput {
        SignUpInput {
            username: "alice_01".to_string(),
            password: "CorrectHorse9".to_string(),
            password2: "CorrectHorse9".to_string(),
            sms_code: "123456".to_string(),
            mobile: MOBILE.to_string(),
            allow: "true".to_string(),
        }
    }

    async fn seed_sms_code(store: &MemoryTtlStore, mobile: &str, code: &str) {
        store
            .put(
                &keys::sms_code(&Mobile::new(mobile).unwrap()),
                code,
                Duration::from_secs(300),
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_sign_up_happy_path() {
        let repo = Arc::new(MemAccountRepository::default());
        let store = Arc::new(MemoryTtlStore::new());
        let config = test_config();
        seed_sms_code(&store, MOBILE, "123456").await;

        let use_case = SignUpUseCase::new(repo.clone(), store.clone(), config.clone());
        let output = use_case.execute(input()).await.unwrap();

        assert_eq!(output.username, "alice_01");
        assert_eq!(output.mobile, MOBILE);

        // The issued token is a valid session token for the new user
        let claims = tokens::verify_session(&output.token, &config).unwrap();
        assert_eq!(claims.user_id, output.user_id);

        // The user is persisted
        let stored = repo
            .find_by_mobile(&Mobile::new(MOBILE).unwrap())
            .await
            .unwrap();
        assert!(stored.is_some());

        // The sms code was consumed
        let key = keys::sms_code(&Mobile::new(MOBILE).unwrap());
        assert_eq!(store.get(&key).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_sign_up_validations() {
        let repo = Arc::new(MemAccountRepository::default());
        let store = Arc::new(MemoryTtlStore::new());
        let use_case = SignUpUseCase::new(repo, store, test_config());

        let err = use_case
            .execute(SignUpInput {
                allow: "false".to_string(),
                ..input()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AccountError::Validation(_)));

        let err = use_case
            .execute(SignUpInput {
                password2: "Different999".to_string(),
                ..input()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AccountError::Validation(_)));

        let err = use_case
            .execute(SignUpInput {
                mobile: "12345".to_string(),
                ..input()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AccountError::Validation(_)));

        let err = use_case
            .execute(SignUpInput {
                username: "ab".to_string(),
                ..input()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AccountError::Validation(_)));
    }

    #[tokio::test]
    async fn test_sign_up_wrong_sms_code() {
        let repo = Arc::new(MemAccountRepository::default());
        let store = Arc::new(MemoryTtlStore::new());
        seed_sms_code(&store, MOBILE, "123456").await;

        let use_case = SignUpUseCase::new(repo, store.clone(), test_config());

        let err = use_case
            .execute(SignUpInput {
                sms_code: "999999".to_string(),
                ..input()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AccountError::InvalidSmsCode));

        // The comparison consumed the code: the right one fails now too
        let err = use_case.execute(input()).await.unwrap_err();
        assert!(matches!(err, AccountError::InvalidSmsCode));
    }

    #[tokio::test]
    async fn test_sign_up_missing_sms_code() {
        let repo = Arc::new(MemAccountRepository::default());
        let store = Arc::new(MemoryTtlStore::new());
        let use_case = SignUpUseCase::new(repo, store, test_config());

        let err = use_case.execute(input()).await.unwrap_err();
        assert!(matches!(err, AccountError::InvalidSmsCode));
    }

    #[tokio::test]
    async fn test_sign_up_duplicates() {
        let repo = Arc::new(MemAccountRepository::default());
        let store = Arc::new(MemoryTtlStore::new());
        let config = test_config();
        seed_sms_code(&store, MOBILE, "123456").await;

        let use_case = SignUpUseCase::new(repo.clone(), store.clone(), config.clone());
        use_case.execute(input()).await.unwrap();

        // Same user name, different mobile
        seed_sms_code(&store, "13900002222", "123456").await;
        let err = use_case
            .execute(SignUpInput {
                mobile: "13900002222".to_string(),
                ..input()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AccountError::UserNameTaken));

        // Same mobile, different user name
        let err = use_case
            .execute(SignUpInput {
                username: "bob_2024".to_string(),
                ..input()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AccountError::MobileTaken));
    }
}

#[cfg(test)]
mod sign_in_tests {
    use super::*;
    use crate::application::{SignInInput, SignInUseCase, SignUpInput, SignUpUseCase, tokens};
    use platform::cache::{MemoryTtlStore, TtlStore};
    use verify::domain::keys;

    const MOBILE: &str = "13800001111";

    async fn registered_repo(config: &Arc<AccountConfig>) -> Arc<MemAccountRepository> {
        let repo = Arc::new(MemAccountRepository::default());
        let store = Arc::new(MemoryTtlStore::new());
        store
            .put(
                &keys::sms_code(&Mobile::new(MOBILE).unwrap()),
                "123456",
                Duration::from_secs(300),
            )
            .await
            .unwrap();

        SignUpUseCase::new(repo.clone(), store, config.clone())
            .execute(SignUpInput {
                username: "alice_01".to_string(),
                password: "CorrectHorse9".to_string(),
                password2: "CorrectHorse9".to_string(),
                sms_code: "123456".to_string(),
                mobile: MOBILE.to_string(),
                allow: "true".to_string(),
            })
            .await
            .unwrap();

        repo
    }

    #[tokio::test]
    async fn test_sign_in_with_user_name() {
        let config = test_config();
        let repo = registered_repo(&config).await;

        let use_case = SignInUseCase::new(repo.clone(), config.clone());
        let output = use_case
            .execute(SignInInput {
                username: "alice_01".to_string(),
                password: "CorrectHorse9".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(output.username, "alice_01");
        assert!(tokens::verify_session(&output.token, &config).is_ok());

        // Last login was recorded
        let user = repo
            .find_by_mobile(&Mobile::new(MOBILE).unwrap())
            .await
            .unwrap()
            .unwrap();
        assert!(user.last_login_at.is_some());
    }

    #[tokio::test]
    async fn test_sign_in_with_mobile() {
        let config = test_config();
        let repo = registered_repo(&config).await;

        let use_case = SignInUseCase::new(repo, config);
        let output = use_case
            .execute(SignInInput {
                username: MOBILE.to_string(),
                password: "CorrectHorse9".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(output.username, "alice_01");
    }

    #[tokio::test]
    async fn test_sign_in_failures() {
        let config = test_config();
        let repo = registered_repo(&config).await;

        let use_case = SignInUseCase::new(repo, config);

        let err = use_case
            .execute(SignInInput {
                username: "alice_01".to_string(),
                password: "WrongHorse99".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AccountError::InvalidCredentials));

        let err = use_case
            .execute(SignInInput {
                username: "nobody_here".to_string(),
                password: "CorrectHorse9".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AccountError::InvalidCredentials));
    }
}

// ============================================================================
// OAuth tests
// ============================================================================

#[cfg(test)]
mod oauth_tests {
    use super::*;
    use crate::application::{
        BindOAuthInput, BindOAuthUseCase, OAuthLoginOutput, OAuthLoginUseCase, tokens,
    };
    use crate::domain::value_object::{RawPassword, UserPassword};
    use platform::cache::{MemoryTtlStore, TtlStore};
    use verify::domain::keys;

    const MOBILE: &str = "13800001111";
    const OPENID: &str = "openid-qq-42";

    fn seeded_user() -> User {
        let raw = RawPassword::new("CorrectHorse9".to_string()).unwrap();
        User::new(
            UserName::new("alice_01").unwrap(),
            UserPassword::from_raw(&raw, None).unwrap(),
            Mobile::new(MOBILE).unwrap(),
        )
    }

    fn login_use_case(
        repo: &Arc<MemAccountRepository>,
        config: &Arc<AccountConfig>,
    ) -> OAuthLoginUseCase<MemAccountRepository, MemAccountRepository, StubProvider> {
        OAuthLoginUseCase::new(
            repo.clone(),
            repo.clone(),
            Arc::new(StubProvider {
                openid: OPENID.to_string(),
            }),
            config.clone(),
        )
    }

    #[tokio::test]
    async fn test_known_identity_is_bound() {
        let config = test_config();
        let repo = Arc::new(MemAccountRepository::default());

        let user = seeded_user();
        UserRepository::create(repo.as_ref(), &user).await.unwrap();
        OAuthBindingRepository::create(
            repo.as_ref(),
            &OAuthBinding::new(OPENID.to_string(), user.user_id),
        )
        .await
        .unwrap();

        let output = login_use_case(&repo, &config).execute("auth-code").await.unwrap();

        match output {
            OAuthLoginOutput::Bound {
                token,
                user_id,
                username,
            } => {
                assert_eq!(user_id, user.user_id.into_uuid());
                assert_eq!(username, "alice_01");
                let claims = tokens::verify_session(&token, &config).unwrap();
                assert_eq!(claims.user_id, user_id);
            }
            OAuthLoginOutput::Unbound { .. } => panic!("expected a bound identity"),
        }
    }

    #[tokio::test]
    async fn test_unknown_identity_gets_binding_token() {
        let config = test_config();
        let repo = Arc::new(MemAccountRepository::default());

        let output = login_use_case(&repo, &config).execute("auth-code").await.unwrap();

        match output {
            OAuthLoginOutput::Unbound { access_token } => {
                let claims = tokens::verify_binding(&access_token, &config).unwrap();
                assert_eq!(claims.openid, OPENID);
            }
            OAuthLoginOutput::Bound { .. } => panic!("expected an unbound identity"),
        }
    }

    #[tokio::test]
    async fn test_provider_failure_surfaces() {
        let config = test_config();
        let repo = Arc::new(MemAccountRepository::default());

        let use_case = OAuthLoginUseCase::new(
            repo.clone(),
            repo.clone(),
            Arc::new(FailingProvider),
            config,
        );

        let err = use_case.execute("auth-code").await.unwrap_err();
        assert!(matches!(err, AccountError::Provider(_)));
    }

    fn bind_use_case(
        repo: &Arc<MemAccountRepository>,
        store: &Arc<MemoryTtlStore>,
        config: &Arc<AccountConfig>,
    ) -> BindOAuthUseCase<MemAccountRepository, MemAccountRepository, MemoryTtlStore> {
        BindOAuthUseCase::new(repo.clone(), repo.clone(), store.clone(), config.clone())
    }

    async fn seed_sms_code(store: &MemoryTtlStore) {
        store
            .put(
                &keys::sms_code(&Mobile::new(MOBILE).unwrap()),
                "123456",
                Duration::from_secs(300),
            )
            .await
            .unwrap();
    }

    fn bind_input(binding_token: String) -> BindOAuthInput {
        BindOAuthInput {
            access_token: binding_token,
            mobile: MOBILE.to_string(),
            password: "CorrectHorse9".to_string(),
            sms_code: "123456".to_string(),
        }
    }

    #[tokio::test]
    async fn test_bind_creates_fresh_user() {
        let config = test_config();
        let repo = Arc::new(MemAccountRepository::default());
        let store = Arc::new(MemoryTtlStore::new());
        seed_sms_code(&store).await;

        let binding_token = tokens::issue_binding(OPENID, &config).unwrap();
        let output = bind_use_case(&repo, &store, &config)
            .execute(bind_input(binding_token))
            .await
            .unwrap();

        // The fresh account takes the mobile as its user name
        assert_eq!(output.username, MOBILE);
        assert!(tokens::verify_session(&output.token, &config).is_ok());

        let binding = repo.find_by_openid(OPENID).await.unwrap().unwrap();
        assert_eq!(binding.user_id.into_uuid(), output.user_id);
    }

    #[tokio::test]
    async fn test_bind_attaches_to_existing_user() {
        let config = test_config();
        let repo = Arc::new(MemAccountRepository::default());
        let store = Arc::new(MemoryTtlStore::new());
        seed_sms_code(&store).await;

        let user = seeded_user();
        UserRepository::create(repo.as_ref(), &user).await.unwrap();

        let binding_token = tokens::issue_binding(OPENID, &config).unwrap();
        let output = bind_use_case(&repo, &store, &config)
            .execute(bind_input(binding_token))
            .await
            .unwrap();

        assert_eq!(output.user_id, user.user_id.into_uuid());
        assert_eq!(output.username, "alice_01");
    }

    #[tokio::test]
    async fn test_bind_rejects_wrong_password_for_existing_user() {
        let config = test_config();
        let repo = Arc::new(MemAccountRepository::default());
        let store = Arc::new(MemoryTtlStore::new());
        seed_sms_code(&store).await;

        UserRepository::create(repo.as_ref(), &seeded_user())
            .await
            .unwrap();

        let binding_token = tokens::issue_binding(OPENID, &config).unwrap();
        let err = bind_use_case(&repo, &store, &config)
            .execute(BindOAuthInput {
                password: "WrongHorse99".to_string(),
                ..bind_input(binding_token)
            })
            .await
            .unwrap_err();

        assert!(matches!(err, AccountError::InvalidCredentials));
        assert!(repo.find_by_openid(OPENID).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_bind_rejects_invalid_token() {
        let config = test_config();
        let repo = Arc::new(MemAccountRepository::default());
        let store = Arc::new(MemoryTtlStore::new());

        let err = bind_use_case(&repo, &store, &config)
            .execute(bind_input("garbage.token.here".to_string()))
            .await
            .unwrap_err();

        assert!(matches!(err, AccountError::InvalidBindingToken));
    }

    #[tokio::test]
    async fn test_bind_rejects_already_bound_identity() {
        let config = test_config();
        let repo = Arc::new(MemAccountRepository::default());
        let store = Arc::new(MemoryTtlStore::new());
        seed_sms_code(&store).await;

        let user = seeded_user();
        UserRepository::create(repo.as_ref(), &user).await.unwrap();
        OAuthBindingRepository::create(
            repo.as_ref(),
            &OAuthBinding::new(OPENID.to_string(), user.user_id),
        )
        .await
        .unwrap();

        let binding_token = tokens::issue_binding(OPENID, &config).unwrap();
        let err = bind_use_case(&repo, &store, &config)
            .execute(bind_input(binding_token))
            .await
            .unwrap_err();

        assert!(matches!(err, AccountError::AlreadyBound));
    }
}

// ============================================================================
// Email binding tests
// ============================================================================

#[cfg(test)]
mod email_tests {
    use super::*;
    use crate::application::{
        UpdateEmailInput, UpdateEmailUseCase, VerifyEmailUseCase,
    };
    use crate::domain::value_object::{RawPassword, UserPassword};
    use dispatch::{Task, task_queue};

    fn seeded_user() -> User {
        let raw = RawPassword::new("CorrectHorse9".to_string()).unwrap();
        User::new(
            UserName::new("alice_01").unwrap(),
            UserPassword::from_raw(&raw, None).unwrap(),
            Mobile::new("13800001111").unwrap(),
        )
    }

    #[tokio::test]
    async fn test_update_then_verify_email() {
        let config = test_config();
        let repo = Arc::new(MemAccountRepository::default());
        let (dispatcher, mut receiver) = task_queue(4);

        let user = seeded_user();
        UserRepository::create(repo.as_ref(), &user).await.unwrap();

        UpdateEmailUseCase::new(repo.clone(), dispatcher, config.clone())
            .execute(UpdateEmailInput {
                user_id: user.user_id.into_uuid(),
                email: "Alice@Example.COM".to_string(),
            })
            .await
            .unwrap();

        // Stored lowercased and unverified
        let stored = UserRepository::find_by_id(repo.as_ref(), &user.user_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            stored.email.as_ref().map(|e| e.as_str()),
            Some("alice@example.com")
        );
        assert!(!stored.email_verified);

        // A mail task went out with the token in the link
        let task = receiver.try_recv().expect("verification mail task");
        let Task::SendVerifyEmail { to, verify_url } = task else {
            panic!("expected a verification mail task");
        };
        assert_eq!(to, "alice@example.com");
        let token = verify_url
            .split_once("?token=")
            .expect("token in verify url")
            .1
            .to_string();

        // Following the link verifies the email
        VerifyEmailUseCase::new(repo.clone(), config.clone())
            .execute(&token)
            .await
            .unwrap();

        let stored = UserRepository::find_by_id(repo.as_ref(), &user.user_id)
            .await
            .unwrap()
            .unwrap();
        assert!(stored.email_verified);
    }

    #[tokio::test]
    async fn test_stale_token_fails_after_email_change() {
        let config = test_config();
        let repo = Arc::new(MemAccountRepository::default());
        let (dispatcher, mut receiver) = task_queue(4);

        let user = seeded_user();
        UserRepository::create(repo.as_ref(), &user).await.unwrap();

        let use_case = UpdateEmailUseCase::new(repo.clone(), dispatcher, config.clone());

        use_case
            .execute(UpdateEmailInput {
                user_id: user.user_id.into_uuid(),
                email: "first@example.com".to_string(),
            })
            .await
            .unwrap();

        let Some(Task::SendVerifyEmail { verify_url, .. }) = receiver.recv().await else {
            panic!("expected a verification mail task");
        };
        let stale_token = verify_url.split_once("?token=").unwrap().1.to_string();

        // The user switches to a different address before clicking
        use_case
            .execute(UpdateEmailInput {
                user_id: user.user_id.into_uuid(),
                email: "second@example.com".to_string(),
            })
            .await
            .unwrap();

        let err = VerifyEmailUseCase::new(repo.clone(), config)
            .execute(&stale_token)
            .await
            .unwrap_err();
        assert!(matches!(err, AccountError::InvalidToken));
    }

    #[tokio::test]
    async fn test_invalid_email_rejected() {
        let config = test_config();
        let repo = Arc::new(MemAccountRepository::default());
        let (dispatcher, _receiver) = task_queue(4);

        let user = seeded_user();
        UserRepository::create(repo.as_ref(), &user).await.unwrap();

        let err = UpdateEmailUseCase::new(repo, dispatcher, config)
            .execute(UpdateEmailInput {
                user_id: user.user_id.into_uuid(),
                email: "not-an-email".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AccountError::Validation(_)));
    }
}

// ============================================================================
// Address tests
// ============================================================================

#[cfg(test)]
mod address_tests {
    use super::*;
    use crate::application::{AddressInput, AddressesUseCase};
    use crate::domain::value_object::{RawPassword, UserPassword};

    fn seeded_user() -> User {
        let raw = RawPassword::new("CorrectHorse9".to_string()).unwrap();
        User::new(
            UserName::new("alice_01").unwrap(),
            UserPassword::from_raw(&raw, None).unwrap(),
            Mobile::new("13800001111").unwrap(),
        )
    }

    fn address_input(title: &str) -> AddressInput {
        AddressInput {
            title: title.to_string(),
            receiver: "Alice".to_string(),
            province: "Guangdong".to_string(),
            city: "Shenzhen".to_string(),
            district: "Nanshan".to_string(),
            place: "10000 Example Road".to_string(),
            mobile: "13800001111".to_string(),
            tel: None,
            email: None,
        }
    }

    async fn fixture() -> (
        Arc<MemAccountRepository>,
        AddressesUseCase<MemAccountRepository, MemAccountRepository>,
        User,
    ) {
        let repo = Arc::new(MemAccountRepository::default());
        let user = seeded_user();
        UserRepository::create(repo.as_ref(), &user).await.unwrap();
        let use_case = AddressesUseCase::new(repo.clone(), repo.clone(), test_config());
        (repo, use_case, user)
    }

    #[tokio::test]
    async fn test_create_and_list() {
        let (_repo, use_case, user) = fixture().await;
        let user_id = user.user_id.into_uuid();

        let created = use_case.create(user_id, address_input("home")).await.unwrap();

        let output = use_case.list(user_id).await.unwrap();
        assert_eq!(output.user_id, user_id);
        assert_eq!(output.limit, 20);
        assert_eq!(output.default_address_id, None);
        assert_eq!(output.addresses.len(), 1);
        assert_eq!(output.addresses[0].address_id, created.address_id);
    }

    #[tokio::test]
    async fn test_address_limit() {
        let (_repo, use_case, user) = fixture().await;
        let user_id = user.user_id.into_uuid();

        for i in 0..20 {
            use_case
                .create(user_id, address_input(&format!("addr-{i}")))
                .await
                .unwrap();
        }

        let err = use_case
            .create(user_id, address_input("one-too-many"))
            .await
            .unwrap_err();
        assert!(matches!(err, AccountError::AddressLimitExceeded));
    }

    #[tokio::test]
    async fn test_soft_delete_frees_the_slot() {
        let (_repo, use_case, user) = fixture().await;
        let user_id = user.user_id.into_uuid();

        let address = use_case.create(user_id, address_input("home")).await.unwrap();
        use_case
            .remove(user_id, address.address_id.into_uuid())
            .await
            .unwrap();

        // Gone from listings
        let output = use_case.list(user_id).await.unwrap();
        assert!(output.addresses.is_empty());

        // Gone for updates too
        let err = use_case
            .update(
                user_id,
                address.address_id.into_uuid(),
                address_input("zombie"),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AccountError::AddressNotFound));

        // And the slot is free again
        use_case.create(user_id, address_input("home-2")).await.unwrap();
    }

    #[tokio::test]
    async fn test_other_users_address_is_invisible() {
        let (repo, use_case, user) = fixture().await;

        let other = {
            let raw = RawPassword::new("CorrectHorse9".to_string()).unwrap();
            User::new(
                UserName::new("bob_2024").unwrap(),
                UserPassword::from_raw(&raw, None).unwrap(),
                Mobile::new("13900002222").unwrap(),
            )
        };
        UserRepository::create(repo.as_ref(), &other).await.unwrap();

        let address = use_case
            .create(other.user_id.into_uuid(), address_input("their-home"))
            .await
            .unwrap();

        let err = use_case
            .remove(user.user_id.into_uuid(), address.address_id.into_uuid())
            .await
            .unwrap_err();
        assert!(matches!(err, AccountError::AddressNotFound));
    }

    #[tokio::test]
    async fn test_set_default_and_title() {
        let (repo, use_case, user) = fixture().await;
        let user_id = user.user_id.into_uuid();

        let address = use_case.create(user_id, address_input("home")).await.unwrap();

        use_case
            .set_default(user_id, address.address_id.into_uuid())
            .await
            .unwrap();
        let stored = UserRepository::find_by_id(repo.as_ref(), &user.user_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.default_address_id, Some(address.address_id));

        let renamed = use_case
            .set_title(user_id, address.address_id.into_uuid(), "office".to_string())
            .await
            .unwrap();
        assert_eq!(renamed.title, "office");
    }
}
