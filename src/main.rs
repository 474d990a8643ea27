mod config;
mod data;
mod db;
mod email;
mod models;
mod route;
mod routemount;
mod services;
mod store;
mod utils;

use std::sync::Arc;

use tracing::info;

use crate::config::Config;
use crate::db::init_db;
use crate::email::LogMailer;
use crate::route::AppState;
use crate::routemount::route::create_router;
use crate::services::bookings::BookingService;
use crate::store::PgStore;

#[tokio::main]
async fn main() {

    dotenvy::dotenv().ok();
    tracing_subscriber::fmt().init();

    let config = Config::from_env();

    //connect to db
    let db_pool = init_db(&config.database_url).await;

    //wiring
    let store = Arc::new(PgStore::new(db_pool));
    let state = AppState {
        bookings: BookingService::new(store),
        mailer: Arc::new(LogMailer {
            sender: config.sender_email.clone(),
        }),
    };
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&config.server_address)
        .await
        .expect("could not bind server address");
    info!(address = %config.server_address, "booking api listening");
    axum::serve(listener, app).await.expect("server error");
}
