use sqlx::postgres::{PgPool, PgPoolOptions};

use crate::config::Config;
use crate::error::Result;

/// Opens the pool against `config.datastore_url` and applies pending
/// migrations. The migrations directory (`migrations/`) is embedded at
/// compile time via `sqlx::migrate!`.
///
/// The service key is set as a session GUC on every new connection so
/// that row-level security policies on the datastore side can key off
/// `current_setting('app.datastore_service_key')`.
pub async fn connect(config: &Config) -> Result<PgPool> {
    let service_key = config.datastore_service_key.clone();

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .after_connect(move |conn, _meta| {
            let service_key = service_key.clone();
            Box::pin(async move {
                sqlx::query("select set_config('app.datastore_service_key', $1, false)")
                    .bind(service_key)
                    .execute(conn)
                    .await?;
                Ok(())
            })
        })
        .connect(&config.datastore_url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    Ok(pool)
}
