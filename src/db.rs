use anyhow::Result;
use sqlx::PgPool;
use tracing::info;

pub async fn init_db(database_url: &str) -> PgPool {
    PgPool::connect(database_url)
        .await
        .expect("Failed to connect to database")
}

/// Create the tables the backend expects when they are not there yet.
/// Existing data is never touched.
pub async fn ensure_schema(pool: &PgPool) -> Result<()> {
    info!("Ensuring database schema...");

    create_employees_table(pool).await?;
    create_users_table(pool).await?;
    create_attendance_table(pool).await?;

    info!("Database schema ready");
    Ok(())
}

async fn create_employees_table(pool: &PgPool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS employees (
            id BIGINT PRIMARY KEY,
            name TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Name uniqueness is case-insensitive, enforced here rather than in
    // application code.
    sqlx::query(
        "CREATE UNIQUE INDEX IF NOT EXISTS employees_name_lower_idx \
         ON employees (LOWER(name))",
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_users_table(pool: &PgPool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id BIGSERIAL PRIMARY KEY,
            name TEXT NOT NULL,
            email TEXT UNIQUE NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_attendance_table(pool: &PgPool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS attendance (
            id BIGSERIAL PRIMARY KEY,
            employee_id BIGINT NOT NULL REFERENCES employees (id),
            date DATE NOT NULL,
            start_time TIME,
            end_time TIME,
            location TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS attendance_employee_date_idx \
         ON attendance (employee_id, date)",
    )
    .execute(pool)
    .await?;

    Ok(())
}
