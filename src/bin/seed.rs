use axum_marketplace_api::{
    config::AppConfig, db::create_pool, services::auth_service::hash_password, slug::slugify,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    // Ensure migrations are applied.
    sqlx::migrate!("./migrations").run(&pool).await?;

    let email = std::env::var("SEED_ADMIN_EMAIL").unwrap_or_else(|_| "admin@example.com".into());
    let password = std::env::var("SEED_ADMIN_PASSWORD").unwrap_or_else(|_| "admin123".into());
    let admin_id = ensure_admin(&pool, &email, &password).await?;
    seed_categories(&pool).await?;

    println!("Seed completed. Admin ID: {admin_id}");
    Ok(())
}

async fn ensure_admin(pool: &sqlx::PgPool, email: &str, password: &str) -> anyhow::Result<i32> {
    let password_hash = hash_password(password).map_err(|e| anyhow::anyhow!(e.to_string()))?;
    let user_name = email.split('@').next().unwrap_or("admin");

    let (id,): (i32,) = sqlx::query_as(
        r#"
        INSERT INTO users (user_name, email, password_hash, role, is_approved)
        VALUES ($1, $2, $3, 'admin', 1)
        ON CONFLICT (email) DO UPDATE SET role = EXCLUDED.role, is_approved = 1
        RETURNING id
        "#,
    )
    .bind(user_name)
    .bind(email)
    .bind(password_hash)
    .fetch_one(pool)
    .await?;

    println!("Ensured admin {email}");
    Ok(id)
}

async fn seed_categories(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let names = ["Electronics", "Fashion", "Home & Garden", "Books", "Sports"];

    for name in names {
        sqlx::query(
            r#"
            INSERT INTO categories (name, slug)
            VALUES ($1, $2)
            ON CONFLICT (slug) DO NOTHING
            "#,
        )
        .bind(name)
        .bind(slugify(name))
        .execute(pool)
        .await?;
    }

    println!("Seeded categories");
    Ok(())
}
