use bson::{doc, Bson, Document};
use serde::Serialize;
use mongodb::options::{ClientOptions, Credential, IndexOptions, ResolverConfig};
use mongodb::{Client, Database, IndexModel};
use tracing::{info, warn};

use crate::config::mongo_conf::MongoConfig;
use crate::repository::repository_error::RepositoryResult;

pub const USERS: &str = "users";
pub const ADMINS: &str = "admins";
pub const JOBS: &str = "jobs";
pub const APPLICATIONS: &str = "applications";
pub const CONTACTS: &str = "contacts";

/// Open one client for the whole process and hand out its database.
pub async fn connect(config: &MongoConfig) -> Result<Database, mongodb::error::Error> {
    let mut client_options = ClientOptions::parse_with_resolver_config(&config.uri, ResolverConfig::cloudflare()).await?;
    client_options.app_name = Some("JobPortalBackend".to_string());
    client_options.max_pool_size = Some(config.pool_size);
    client_options.connect_timeout = Some(std::time::Duration::from_secs(config.connection_timeout_secs));
    if let (Some(username), Some(password)) = (&config.username, &config.password) {
        client_options.credential = Some(
            Credential::builder()
                .username(username.clone())
                .password(password.clone())
                .build(),
        );
    }
    let client = Client::with_options(client_options)?;
    info!(database = %config.database, "MongoDB client created");
    Ok(client.database(&config.database))
}

/// Unique emails per account collection and one application per (user, job).
pub async fn ensure_indexes(db: &Database) -> RepositoryResult<()> {
    for collection in [USERS, ADMINS] {
        let index = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        db.collection::<Document>(collection).create_index(index, None).await?;
    }

    let index = IndexModel::builder()
        .keys(doc! { "user": 1, "job": 1 })
        .options(IndexOptions::builder().unique(true).build())
        .build();
    if let Err(e) = db.collection::<Document>(APPLICATIONS).create_index(index, None).await {
        // Databases that already hold duplicate submissions cannot build the index.
        warn!("Could not create unique (user, job) index on applications: {}", e);
    }
    info!("MongoDB indexes ensured");
    Ok(())
}

/// Case-insensitive substring match on user supplied text.
pub fn contains_ci(value: &str) -> Document {
    doc! { "$regex": regex::escape(value.trim()), "$options": "i" }
}

/// Update that stores every serialized field of `value` and removes each
/// `optional` field it skipped, so a cleared `Option` is cleared in the database too.
pub fn replace_fields<T: Serialize>(value: &T, optional: &[&str]) -> RepositoryResult<Document> {
    let mut fields = bson::to_document(value)?;
    fields.remove("_id");
    let unset: Document = optional
        .iter()
        .filter(|name| !fields.contains_key(**name))
        .map(|name| (name.to_string(), Bson::String(String::new())))
        .collect();
    let mut update = doc! { "$set": fields };
    if !unset.is_empty() {
        update.insert("$unset", unset);
    }
    Ok(update)
}

/// Counts coming out of `$group`/`$sum` may be int32 or int64.
pub fn bson_count(value: Option<&Bson>) -> u64 {
    match value {
        Some(Bson::Int32(n)) => (*n).max(0) as u64,
        Some(Bson::Int64(n)) => (*n).max(0) as u64,
        Some(Bson::Double(n)) => n.max(0.0) as u64,
        _ => 0,
    }
}
