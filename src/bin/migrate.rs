use anyhow::Context;
use axum_marketplace_api::db::{create_orm_conn, run_migrations};

// Only needs DATABASE_URL, so it runs before the rest of the environment is set up.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL is not set")?;
    let orm = create_orm_conn(&database_url).await?;
    run_migrations(&orm).await?;
    println!("Migrations applied");
    Ok(())
}
