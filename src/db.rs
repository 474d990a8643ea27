use sqlx::{PgPool, postgres::PgPoolOptions};

pub async fn init_db(database_url: &str) -> PgPool {
    let pool = PgPoolOptions::new()
        .max_connections(15)
        .connect(database_url)
        .await
        .expect("database not connected");

    sqlx::migrate!()
        .run(&pool)
        .await
        .expect("migrations failed");

    pool
}
