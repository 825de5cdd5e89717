use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue, Method};
use axum::response::IntoResponse;
use axum::{middleware, routing::get, Json, Router};
use serde_json::json;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::config::admin_user_conf::AdminUserConfig;
use crate::config::{AppConfig, ConfigError, JwtConfig, MongoConfig, UploadConfig};
use crate::middlewares::auth_middleware::AuthState;
use crate::middlewares::rate_limit::{rate_limit, ClientRateLimiter};
use crate::model::admin::Admin;
use crate::repository::admin_repo::{AdminRepository, AdminRepositoryImpl};
use crate::repository::application_repo::{ApplicationRepository, ApplicationRepositoryImpl};
use crate::repository::contact_repo::{ContactRepository, ContactRepositoryImpl};
use crate::repository::job_repo::{JobRepository, JobRepositoryImpl};
use crate::repository::mongo;
use crate::repository::repository_error::RepositoryError;
use crate::repository::user_repo::{UserRepository, UserRepositoryImpl};
use crate::router::admin_router::admin_router;
use crate::router::application_router::application_router;
use crate::router::auth_router::{auth_router, profile_router};
use crate::router::candidate_router::candidate_router;
use crate::router::contact_router::contact_router;
use crate::router::dashboard_router::dashboard_router;
use crate::router::export_router::export_router;
use crate::router::job_router::{admin_job_router, job_router};
use crate::router::resume_router::resume_router;
use crate::service::admin_service::AdminServiceImpl;
use crate::service::application_service::ApplicationServiceImpl;
use crate::service::auth_service::AuthServiceImpl;
use crate::service::candidate_service::CandidateServiceImpl;
use crate::service::contact_service::ContactServiceImpl;
use crate::service::dashboard_service::DashboardServiceImpl;
use crate::service::export_service::ExportServiceImpl;
use crate::service::job_service::JobServiceImpl;
use crate::service::profile_service::ProfileServiceImpl;
use crate::service::resume_service::ResumeServiceImpl;
use crate::util::jwt::JwtTokenUtilsImpl;
use crate::util::password::{PasswordUtils, PasswordUtilsImpl};
use crate::util::storage::{FileStorage, StorageError};

/// JSON and multipart bodies are capped at 10 MiB.
pub const BODY_LIMIT: usize = 10 * 1024 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("MongoDB error: {0}")]
    Mongo(#[from] mongodb::error::Error),
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("Server error: {0}")]
    Io(#[from] std::io::Error),
}

/// Everything the routers need: one repository per collection plus shared helpers.
#[derive(Clone)]
pub struct AppContext {
    pub users: Arc<dyn UserRepository>,
    pub admins: Arc<dyn AdminRepository>,
    pub jobs: Arc<dyn JobRepository>,
    pub applications: Arc<dyn ApplicationRepository>,
    pub contacts: Arc<dyn ContactRepository>,
    pub jwt_utils: Arc<JwtTokenUtilsImpl>,
    pub storage: Arc<FileStorage>,
    pub config: AppConfig,
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let methods = [Method::GET, Method::POST, Method::PUT, Method::PATCH, Method::DELETE, Method::OPTIONS];
    if origins.iter().any(|o| o == "*") {
        return CorsLayer::new().allow_methods(methods).allow_headers(Any).allow_origin(Any);
    }
    let origins: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
    CorsLayer::new()
        .allow_methods(methods)
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT, header::ORIGIN])
        .expose_headers([header::CONTENT_DISPOSITION])
        .allow_credentials(true)
        .allow_origin(origins)
        .max_age(Duration::from_secs(600))
}

async fn root_handler() -> impl IntoResponse {
    Json(json!({ "message": "Job Portal API is running..." }))
}

async fn not_found_handler() -> impl IntoResponse {
    (axum::http::StatusCode::NOT_FOUND, Json(json!({ "error": "Route not found" })))
}

/// The complete HTTP surface.
pub fn create_router(ctx: &AppContext) -> Router {
    let auth_state = Arc::new(AuthState {
        jwt_utils: ctx.jwt_utils.clone(),
        users: ctx.users.clone(),
        admins: ctx.admins.clone(),
    });

    let user_auth_service = Arc::new(AuthServiceImpl::for_users(ctx.users.clone(), ctx.jwt_utils.clone()));
    let admin_auth_service = Arc::new(AuthServiceImpl::for_admins(ctx.admins.clone(), ctx.jwt_utils.clone()));
    let profile_service = Arc::new(ProfileServiceImpl::new(ctx.users.clone(), ctx.storage.clone()));
    let job_service = Arc::new(JobServiceImpl::new(
        ctx.jobs.clone(),
        ctx.applications.clone(),
        ctx.users.clone(),
        ctx.storage.clone(),
    ));
    let contact_service = Arc::new(ContactServiceImpl::new(ctx.contacts.clone()));
    let dashboard_service = Arc::new(DashboardServiceImpl::new(ctx.jobs.clone(), ctx.applications.clone(), ctx.users.clone()));
    let candidate_service = Arc::new(CandidateServiceImpl::new(ctx.users.clone(), ctx.applications.clone(), ctx.jobs.clone()));
    let application_service = Arc::new(ApplicationServiceImpl::new(ctx.applications.clone(), ctx.jobs.clone(), ctx.users.clone()));
    let export_service = Arc::new(ExportServiceImpl::new(
        ctx.users.clone(),
        ctx.admins.clone(),
        ctx.jobs.clone(),
        ctx.applications.clone(),
    ));
    let resume_service = Arc::new(ResumeServiceImpl::new(ctx.applications.clone(), ctx.users.clone(), ctx.storage.clone()));
    let admin_service = Arc::new(AdminServiceImpl::new(ctx.admins.clone(), ctx.storage.clone()));

    let admin = Router::new()
        .merge(dashboard_router(dashboard_service, auth_state.clone()))
        .merge(candidate_router(candidate_service, auth_state.clone()))
        .merge(application_router(application_service, auth_state.clone()))
        .merge(admin_job_router(job_service.clone(), auth_state.clone()))
        .merge(export_router(export_service, auth_state.clone()))
        .merge(resume_router(resume_service, auth_state.clone()))
        .merge(admin_router(admin_service, auth_state.clone()));

    let limiter = Arc::new(ClientRateLimiter::from_config(&ctx.config));
    ClientRateLimiter::spawn_pruning(&limiter, Duration::from_secs(ctx.config.rate_limit_window_secs));
    // Rejections from the limiter still carry CORS headers.
    let api = Router::new()
        .nest("/api/auth", auth_router(user_auth_service).merge(profile_router(profile_service, auth_state.clone())))
        .nest("/api/adminauth", auth_router(admin_auth_service))
        .nest("/api/jobs", job_router(job_service, auth_state))
        .nest("/api/contact", contact_router(contact_service))
        .nest("/api/admin", admin)
        .layer(middleware::from_fn_with_state(limiter, rate_limit))
        .layer(cors_layer(&ctx.config.cors_origins));

    let uploads = ServiceBuilder::new()
        .layer(CorsLayer::permissive())
        .service(ServeDir::new(ctx.storage.root()));

    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(|| async { "OK" }))
        .merge(api)
        .nest_service("/uploads", uploads)
        .fallback(not_found_handler)
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .layer(RequestBodyLimitLayer::new(BODY_LIMIT))
        .layer(TraceLayer::new_for_http())
}

pub struct App {
    config: AppConfig,
    router: Router,
    pub context: AppContext,
}

impl App {
    pub async fn new() -> Result<Self, StartupError> {
        let config = AppConfig::from_env()?;
        let jwt_config = JwtConfig::from_env()?;
        let mongo_config = MongoConfig::from_env()?;
        let upload_config = UploadConfig::from_env();

        let db = mongo::connect(&mongo_config).await?;
        mongo::ensure_indexes(&db).await?;

        let storage = Arc::new(FileStorage::new(upload_config.upload_dir));
        storage.init().await?;

        let context = AppContext {
            users: Arc::new(UserRepositoryImpl::new(&db)),
            admins: Arc::new(AdminRepositoryImpl::new(&db)),
            jobs: Arc::new(JobRepositoryImpl::new(&db)),
            applications: Arc::new(ApplicationRepositoryImpl::new(&db)),
            contacts: Arc::new(ContactRepositoryImpl::new(&db)),
            jwt_utils: Arc::new(JwtTokenUtilsImpl::new(jwt_config)),
            storage,
            config: config.clone(),
        };
        let router = create_router(&context);
        let app = App { config, router, context };
        app.create_first_admin().await;
        Ok(app)
    }

    pub async fn start(self) -> Result<(), StartupError> {
        let host = self
            .config
            .host
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidValue(format!("APP_HOST: {}", e)))?;
        let addr = SocketAddr::new(host, self.config.port);
        info!("🚀 Server running at http://{}", addr);
        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, self.router.into_make_service_with_connect_info::<SocketAddr>()).await?;
        Ok(())
    }

    /// Seed the admin named by `ADMIN_*` unless that email is already taken.
    async fn create_first_admin(&self) {
        let admin_conf = match AdminUserConfig::from_env() {
            Ok(c) => c,
            Err(e) => {
                warn!("Admin user config not loaded: {e}");
                return;
            }
        };

        let admins = self.context.admins.clone();
        match admins.find_by_email(&admin_conf.email).await {
            Ok(Some(_)) => {
                info!("Admin user already exists, skipping creation.");
                return;
            }
            Ok(None) => {}
            Err(e) => {
                error!("Failed to check for existing admin user: {e}");
                return;
            }
        }

        let password = match PasswordUtilsImpl::hash_password(&admin_conf.password) {
            Ok(hash) => hash,
            Err(e) => {
                error!("Failed to hash admin password: {e}");
                return;
            }
        };
        let admin = Admin {
            fullname: admin_conf.fullname,
            email: admin_conf.email,
            password,
            ..Default::default()
        };
        match admins.insert(admin).await {
            Ok(_) => info!("First admin user created."),
            Err(e) => error!("Failed to create admin user: {e}"),
        }
    }
}
