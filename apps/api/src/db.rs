use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

const MIGRATIONS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS jobs (
        id UUID PRIMARY KEY,
        owner_id UUID NOT NULL,
        title TEXT NOT NULL,
        description TEXT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_jobs_owner ON jobs(owner_id)",
    r#"
    CREATE TABLE IF NOT EXISTS resumes (
        id UUID PRIMARY KEY,
        owner_id UUID NOT NULL,
        job_id UUID NOT NULL REFERENCES jobs(id),
        filename TEXT NOT NULL,
        score DOUBLE PRECISION NOT NULL,
        tag TEXT NOT NULL DEFAULT 'Unreviewed',
        skills JSONB NOT NULL DEFAULT '{}'::jsonb,
        summary TEXT NOT NULL DEFAULT '',
        rationale TEXT NOT NULL DEFAULT '',
        created_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_resumes_owner_job ON resumes(owner_id, job_id)",
];

/// Creates and returns a PostgreSQL connection pool with the schema in place.
pub async fn create_pool(database_url: &str) -> Result<PgPool> {
    info!("Connecting to PostgreSQL...");

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await?;

    run_migrations(&pool).await?;

    info!("PostgreSQL connection pool established");
    Ok(pool)
}

/// Idempotent; safe to run on every startup.
async fn run_migrations(pool: &PgPool) -> Result<()> {
    for statement in MIGRATIONS {
        sqlx::query(statement).execute(pool).await?;
    }
    Ok(())
}
