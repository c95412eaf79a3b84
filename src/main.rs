use dotenvy::dotenv;
use snafu::ResultExt;

use hotlist::api::{self, App};
use hotlist::config::Config;
use hotlist::database::Database;
use hotlist::error::{ApplicationError, BindAddressSnafu, ConnectDatabaseSnafu, WebServerSnafu};
use hotlist::service::reset::ResetScheduler;
use hotlist::{logger, window};

#[tokio::main]
async fn main() -> Result<(), ApplicationError> {
    dotenv().ok();

    let config = Config::from_env()?;

    let _guard = logger::init(&config)?;

    window::set_timezone(config.timezone());

    let database = Database::connect(&config.surreal)
        .await
        .context(ConnectDatabaseSnafu)?;

    let scheduler = ResetScheduler::new(database.clone(), config.schedule());
    scheduler.start();

    let router = api::router(App::new(database));

    let listener = tokio::net::TcpListener::bind(config.host)
        .await
        .context(BindAddressSnafu {
            address: config.host,
        })?;

    tracing::info!(address = %config.host, "serving popularity counters");
    axum::serve(listener, router).await.context(WebServerSnafu)?;

    Ok(())
}
