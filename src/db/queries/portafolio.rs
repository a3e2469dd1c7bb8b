use sqlx::query_builder::Separated;
use sqlx::{Encode, Error, Executor, PgPool, Postgres, QueryBuilder, Type};
use rust_decimal::Decimal;

use crate::db::models::portafolio::{PORTAFOLIO_COLUMNS, PortafolioModel};
use crate::portafolio::{PortafolioChanges, PortafolioEntry};

/// Insert a new entry, returning the stored row
pub async fn insert_portafolio<'e, E>(
    executor: E,
    entry: &PortafolioEntry,
) -> Result<PortafolioModel, Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let sql = format!(
        r#"
        INSERT INTO portafolio ({PORTAFOLIO_COLUMNS})
        VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12,$13,$14,$15,$16,$17,$18,$19)
        RETURNING {PORTAFOLIO_COLUMNS}
        "#
    );

    sqlx::query_as::<_, PortafolioModel>(&sql)
        .bind(&entry.codigo_hptu)
        .bind(&entry.grupo_concepto)
        .bind(&entry.descripcion_grupo_concepto)
        .bind(&entry.concepto_hptu)
        .bind(&entry.descripcion_concepto)
        .bind(&entry.codigo_reemplazo_2025)
        .bind(&entry.descripcion_hptu)
        .bind(entry.tarifa_2025_bo)
        .bind(&entry.grupo_quirurgico)
        .bind(&entry.codigo_conversion_externo)
        .bind(&entry.descripcion_manual_externo)
        .bind(&entry.codigo_cups_asociado)
        .bind(&entry.pbs_no_pbs)
        .bind(&entry.aseguradora)
        .bind(&entry.codigo_reps_3100)
        .bind(&entry.observacion_a_terceros)
        .bind(&entry.incluye)
        .bind(&entry.excluye)
        .bind(&entry.observaciones_generales)
        .fetch_one(executor)
        .await
}

/// Fetch an entry by its primary code
pub async fn get_portafolio_by_code(
    pool: &PgPool,
    codigo_hptu: &str,
) -> Result<Option<PortafolioModel>, Error> {
    let sql = format!("SELECT {PORTAFOLIO_COLUMNS} FROM portafolio WHERE codigo_hptu = $1");

    sqlx::query_as::<_, PortafolioModel>(&sql)
        .bind(codigo_hptu)
        .fetch_optional(pool)
        .await
}

/// Fetch all entries
pub async fn get_all_portafolio(pool: &PgPool) -> Result<Vec<PortafolioModel>, Error> {
    let sql = format!("SELECT {PORTAFOLIO_COLUMNS} FROM portafolio ORDER BY codigo_hptu");

    sqlx::query_as::<_, PortafolioModel>(&sql)
        .fetch_all(pool)
        .await
}

/// Fetch all entries of one concept group
pub async fn get_portafolio_by_group(
    pool: &PgPool,
    grupo_concepto: &str,
) -> Result<Vec<PortafolioModel>, Error> {
    let sql = format!(
        r#"
        SELECT {PORTAFOLIO_COLUMNS}
        FROM portafolio
        WHERE grupo_concepto = $1
        ORDER BY codigo_hptu
        "#
    );

    sqlx::query_as::<_, PortafolioModel>(&sql)
        .bind(grupo_concepto)
        .fetch_all(pool)
        .await
}

fn push_change<'args, T>(
    set: &mut Separated<'_, 'args, Postgres, &'static str>,
    column: &str,
    change: Option<Option<T>>,
) where
    T: 'args + Encode<'args, Postgres> + Type<Postgres> + Send,
{
    if let Some(value) = change {
        set.push(format!("{column} = "));
        set.push_bind_unseparated(value);
    }
}

/// Build the `UPDATE` for the provided fields only.
/// Returns `None` when there is nothing to set.
pub fn build_update_query(
    codigo_hptu: &str,
    changes: PortafolioChanges,
) -> Option<QueryBuilder<'static, Postgres>> {
    if changes.is_empty() {
        return None;
    }

    let mut builder = QueryBuilder::new("UPDATE portafolio SET ");
    {
        let mut set = builder.separated(", ");
        push_change(&mut set, "grupo_concepto", changes.grupo_concepto);
        push_change(&mut set, "descripcion_grupo_concepto", changes.descripcion_grupo_concepto);
        push_change(&mut set, "concepto_hptu", changes.concepto_hptu);
        push_change(&mut set, "descripcion_concepto", changes.descripcion_concepto);
        push_change(&mut set, "codigo_reemplazo_2025", changes.codigo_reemplazo_2025);
        push_change(&mut set, "descripcion_hptu", changes.descripcion_hptu);
        push_change(&mut set, "tarifa_2025_bo", changes.tarifa_2025_bo);
        push_change(&mut set, "grupo_quirurgico", changes.grupo_quirurgico);
        push_change(&mut set, "codigo_conversion_externo", changes.codigo_conversion_externo);
        push_change(&mut set, "descripcion_manual_externo", changes.descripcion_manual_externo);
        push_change(&mut set, "codigo_cups_asociado", changes.codigo_cups_asociado);
        push_change(&mut set, "pbs_no_pbs", changes.pbs_no_pbs);
        push_change(&mut set, "aseguradora", changes.aseguradora);
        push_change(&mut set, "codigo_reps_3100", changes.codigo_reps_3100);
        push_change(&mut set, "observacion_a_terceros", changes.observacion_a_terceros);
        push_change(&mut set, "incluye", changes.incluye);
        push_change(&mut set, "excluye", changes.excluye);
        push_change(&mut set, "observaciones_generales", changes.observaciones_generales);
    }
    builder.push(" WHERE codigo_hptu = ");
    builder.push_bind(codigo_hptu.to_string());
    builder.push(format!(" RETURNING {PORTAFOLIO_COLUMNS}"));

    Some(builder)
}

/// Apply a partial update; `None` if the code does not exist
pub async fn update_portafolio(
    pool: &PgPool,
    codigo_hptu: &str,
    changes: PortafolioChanges,
) -> Result<Option<PortafolioModel>, Error> {
    match build_update_query(codigo_hptu, changes) {
        Some(mut builder) => {
            builder
                .build_query_as::<PortafolioModel>()
                .fetch_optional(pool)
                .await
        }
        None => get_portafolio_by_code(pool, codigo_hptu).await,
    }
}

/// Set the tariff of one entry; `None` if the code does not exist
pub async fn update_tarifa<'e, E>(
    executor: E,
    codigo_hptu: &str,
    tarifa: Decimal,
) -> Result<Option<PortafolioModel>, Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let sql = format!(
        r#"
        UPDATE portafolio
        SET tarifa_2025_bo = $1
        WHERE codigo_hptu = $2
        RETURNING {PORTAFOLIO_COLUMNS}
        "#
    );

    sqlx::query_as::<_, PortafolioModel>(&sql)
        .bind(tarifa)
        .bind(codigo_hptu)
        .fetch_optional(executor)
        .await
}

/// Delete an entry, returning the removed row
pub async fn delete_portafolio(
    pool: &PgPool,
    codigo_hptu: &str,
) -> Result<Option<PortafolioModel>, Error> {
    let sql = format!(
        "DELETE FROM portafolio WHERE codigo_hptu = $1 RETURNING {PORTAFOLIO_COLUMNS}"
    );

    sqlx::query_as::<_, PortafolioModel>(&sql)
        .bind(codigo_hptu)
        .fetch_optional(pool)
        .await
}
