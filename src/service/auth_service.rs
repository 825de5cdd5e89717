use crate::dto::auth_dto::{AccountView, AuthResponse, LoginRequest, RefreshResponse, SignupRequest};
use crate::dto::validation_message;
use crate::model::admin::Admin;
use crate::model::user::User;
use crate::repository::admin_repo::AdminRepository;
use crate::repository::repository_error::{RepositoryError, RepositoryResult};
use crate::repository::user_repo::UserRepository;
use crate::util::error::ServiceError;
use crate::util::jwt::{JwtTokenUtils, JwtTokenUtilsImpl, Role};
use crate::util::password::{PasswordUtils, PasswordUtilsImpl};
use async_trait::async_trait;
use bson::oid::ObjectId;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use validator::Validate;

/// Credentials of one stored account, whichever collection it lives in.
#[derive(Debug, Clone)]
pub struct Account {
    pub id: ObjectId,
    pub fullname: String,
    pub email: String,
    pub password_hash: String,
}

impl Account {
    fn view(&self) -> AccountView {
        AccountView {
            id: self.id.to_hex(),
            fullname: self.fullname.clone(),
            email: self.email.clone(),
        }
    }
}

/// The account collection behind one auth namespace.
#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<Account>>;
    async fn find_by_id(&self, id: &ObjectId) -> RepositoryResult<Option<Account>>;
    async fn create(&self, fullname: String, email: String, password_hash: String) -> RepositoryResult<Account>;
    async fn set_password(&self, id: &ObjectId, password_hash: String) -> RepositoryResult<()>;
}

fn stored_id(id: Option<ObjectId>) -> RepositoryResult<ObjectId> {
    id.ok_or_else(|| RepositoryError::serialization("Stored account has no _id"))
}

pub struct UserAccounts(pub Arc<dyn UserRepository>);

impl UserAccounts {
    fn account(user: User) -> RepositoryResult<Account> {
        Ok(Account {
            id: stored_id(user.id)?,
            fullname: user.fullname,
            email: user.email,
            password_hash: user.password,
        })
    }
}

#[async_trait]
impl AccountStore for UserAccounts {
    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<Account>> {
        self.0.find_by_email(email).await?.map(Self::account).transpose()
    }

    async fn find_by_id(&self, id: &ObjectId) -> RepositoryResult<Option<Account>> {
        self.0.find_by_id(id).await?.map(Self::account).transpose()
    }

    async fn create(&self, fullname: String, email: String, password_hash: String) -> RepositoryResult<Account> {
        Self::account(self.0.insert(User::new(fullname, email, password_hash)).await?)
    }

    async fn set_password(&self, id: &ObjectId, password_hash: String) -> RepositoryResult<()> {
        let mut user = self
            .0
            .find_by_id(id)
            .await?
            .ok_or_else(|| RepositoryError::not_found(format!("No user found for ID: {}", id)))?;
        user.password = password_hash;
        self.0.update(user).await?;
        Ok(())
    }
}

pub struct AdminAccounts(pub Arc<dyn AdminRepository>);

impl AdminAccounts {
    fn account(admin: Admin) -> RepositoryResult<Account> {
        Ok(Account {
            id: stored_id(admin.id)?,
            fullname: admin.fullname,
            email: admin.email,
            password_hash: admin.password,
        })
    }
}

#[async_trait]
impl AccountStore for AdminAccounts {
    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<Account>> {
        self.0.find_by_email(email).await?.map(Self::account).transpose()
    }

    async fn find_by_id(&self, id: &ObjectId) -> RepositoryResult<Option<Account>> {
        self.0.find_by_id(id).await?.map(Self::account).transpose()
    }

    async fn create(&self, fullname: String, email: String, password_hash: String) -> RepositoryResult<Account> {
        Self::account(self.0.insert(Admin::new(fullname, email, password_hash)).await?)
    }

    async fn set_password(&self, id: &ObjectId, password_hash: String) -> RepositoryResult<()> {
        let mut admin = self
            .0
            .find_by_id(id)
            .await?
            .ok_or_else(|| RepositoryError::not_found(format!("No admin found for ID: {}", id)))?;
        admin.password = password_hash;
        self.0.update(admin).await?;
        Ok(())
    }
}

#[async_trait]
pub trait AuthService: Send + Sync {
    async fn signup(&self, request: SignupRequest) -> Result<AuthResponse, ServiceError>;
    async fn login(&self, request: LoginRequest) -> Result<AuthResponse, ServiceError>;
    async fn refresh(&self, refresh_token: &str) -> Result<RefreshResponse, ServiceError>;
}

const EMAIL_TAKEN: &str = "Email already registered";
const BAD_CREDENTIALS: &str = "Invalid email or password";

/// Signup, login and refresh for one namespace (`Role::User` or `Role::Admin`).
pub struct AuthServiceImpl {
    pub accounts: Arc<dyn AccountStore>,
    pub jwt_utils: Arc<JwtTokenUtilsImpl>,
    pub role: Role,
}

impl AuthServiceImpl {
    pub fn new(accounts: Arc<dyn AccountStore>, jwt_utils: Arc<JwtTokenUtilsImpl>, role: Role) -> Self {
        AuthServiceImpl { accounts, jwt_utils, role }
    }

    pub fn for_users(users: Arc<dyn UserRepository>, jwt_utils: Arc<JwtTokenUtilsImpl>) -> Self {
        Self::new(Arc::new(UserAccounts(users)), jwt_utils, Role::User)
    }

    pub fn for_admins(admins: Arc<dyn AdminRepository>, jwt_utils: Arc<JwtTokenUtilsImpl>) -> Self {
        Self::new(Arc::new(AdminAccounts(admins)), jwt_utils, Role::Admin)
    }

    /// Store an Argon2id hash in place of a legacy one. Failures leave the old hash usable.
    async fn upgrade_hash(&self, account: &Account, password: &str) {
        let hash = match PasswordUtilsImpl::hash_password(password) {
            Ok(hash) => hash,
            Err(e) => {
                warn!("Could not rehash password for {}: {}", account.id, e);
                return;
            }
        };
        match self.accounts.set_password(&account.id, hash).await {
            Ok(()) => info!("Password hash upgraded for {}", account.id),
            Err(e) => warn!("Could not store upgraded hash for {}: {}", account.id, e),
        }
    }

    fn issue(&self, account: &Account, message: &str) -> Result<AuthResponse, ServiceError> {
        let tokens = self
            .jwt_utils
            .generate_token_pair(&account.id.to_hex(), &account.email, self.role)
            .map_err(|e| ServiceError::InternalError(format!("JWT error: {}", e)))?;
        Ok(AuthResponse {
            message: message.to_string(),
            token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            user: account.view(),
        })
    }

    fn noun(&self) -> &'static str {
        match self.role {
            Role::User => "User",
            Role::Admin => "Admin",
        }
    }
}

#[async_trait]
impl AuthService for AuthServiceImpl {
    #[instrument(skip(self, request), fields(role = self.role.as_str(), email = %request.email))]
    async fn signup(&self, request: SignupRequest) -> Result<AuthResponse, ServiceError> {
        let mut problems = Vec::new();
        if let Err(errors) = request.validate() {
            problems.push(validation_message(&errors));
        }
        if let Err(weak) = PasswordUtilsImpl::validate_password_strength(&request.password) {
            problems.extend(weak);
        }
        if !problems.is_empty() {
            warn!("Signup rejected: {}", problems.join(", "));
            return Err(ServiceError::InvalidInput(problems.join(", ")));
        }

        let email = request.email.trim().to_lowercase();
        if self.accounts.find_by_email(&email).await?.is_some() {
            return Err(ServiceError::InvalidInput(EMAIL_TAKEN.to_string()));
        }

        let hash = PasswordUtilsImpl::hash_password(&request.password)
            .map_err(|e| ServiceError::InternalError(format!("Password hash error: {}", e)))?;
        let account = match self.accounts.create(request.fullname.trim().to_string(), email, hash).await {
            Ok(account) => account,
            // Lost a race against a concurrent signup with the same email.
            Err(RepositoryError::AlreadyExists(_)) => return Err(ServiceError::InvalidInput(EMAIL_TAKEN.to_string())),
            Err(e) => {
                error!("Failed to create account: {}", e);
                return Err(e.into());
            }
        };
        info!("{} registered: {}", self.noun(), account.id);
        self.issue(&account, &format!("{} registered successfully", self.noun()))
    }

    #[instrument(skip(self, request), fields(role = self.role.as_str(), email = %request.email))]
    async fn login(&self, request: LoginRequest) -> Result<AuthResponse, ServiceError> {
        if let Err(errors) = request.validate() {
            return Err(ServiceError::InvalidInput(validation_message(&errors)));
        }
        let Some(account) = self.accounts.find_by_email(&request.email.trim().to_lowercase()).await? else {
            warn!("Login for unknown email");
            return Err(ServiceError::InvalidInput(BAD_CREDENTIALS.to_string()));
        };
        let valid = PasswordUtilsImpl::verify_password(&request.password, &account.password_hash).unwrap_or_else(|e| {
            error!("Stored password hash unusable for {}: {}", account.id, e);
            false
        });
        if !valid {
            warn!("Wrong password for {}", account.id);
            return Err(ServiceError::InvalidInput(BAD_CREDENTIALS.to_string()));
        }
        if PasswordUtilsImpl::needs_rehash(&account.password_hash) {
            self.upgrade_hash(&account, &request.password).await;
        }
        info!("{} logged in: {}", self.noun(), account.id);
        self.issue(&account, "Login successful")
    }

    #[instrument(skip(self, refresh_token), fields(role = self.role.as_str()))]
    async fn refresh(&self, refresh_token: &str) -> Result<RefreshResponse, ServiceError> {
        let claims = self.jwt_utils.validate_refresh_token(refresh_token).map_err(|e| {
            warn!("Refresh token rejected: {}", e);
            ServiceError::Forbidden("Invalid refresh token".to_string())
        })?;
        if !self.jwt_utils.check_role_permission(&claims, self.role) {
            return Err(ServiceError::Forbidden("Invalid refresh token".to_string()));
        }
        let id = ObjectId::parse_str(&claims.sub).map_err(|_| ServiceError::Forbidden("Invalid refresh token".to_string()))?;
        if self.accounts.find_by_id(&id).await?.is_none() {
            return Err(ServiceError::Forbidden("Invalid refresh token".to_string()));
        }
        let access_token = self
            .jwt_utils
            .generate_access_token(&claims.sub, &claims.email, self.role)
            .map_err(|e| ServiceError::InternalError(format!("JWT error: {}", e)))?;
        Ok(RefreshResponse { access_token })
    }
}
