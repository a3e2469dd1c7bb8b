use sqlx::{
    Executor,
    postgres::PgPool,
};

pub async fn init_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    pool.execute(include_str!("portafolio.sql")).await?;

    // Group lookups drive the bulk tariff adjustment
    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_portafolio_grupo_concepto
        ON portafolio(grupo_concepto);
        "#
    )
    .execute(pool)
    .await?;

    Ok(())
}
