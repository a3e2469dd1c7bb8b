use rust_decimal::Decimal;
use sqlx::FromRow;

use crate::portafolio::PortafolioEntry;

/// Column list shared by every query returning full rows
pub const PORTAFOLIO_COLUMNS: &str = "codigo_hptu, grupo_concepto, descripcion_grupo_concepto, \
    concepto_hptu, descripcion_concepto, codigo_reemplazo_2025, descripcion_hptu, tarifa_2025_bo, \
    grupo_quirurgico, codigo_conversion_externo, descripcion_manual_externo, codigo_cups_asociado, \
    pbs_no_pbs, aseguradora, codigo_reps_3100, observacion_a_terceros, incluye, excluye, \
    observaciones_generales";

#[derive(Debug, FromRow)]
pub struct PortafolioModel {
    pub codigo_hptu: String,
    pub grupo_concepto: Option<String>,
    pub descripcion_grupo_concepto: Option<String>,
    pub concepto_hptu: Option<String>,
    pub descripcion_concepto: Option<String>,
    pub codigo_reemplazo_2025: Option<String>,
    pub descripcion_hptu: Option<String>,
    pub tarifa_2025_bo: Option<Decimal>, // NUMERIC(14, 2)
    pub grupo_quirurgico: Option<String>,
    pub codigo_conversion_externo: Option<String>,
    pub descripcion_manual_externo: Option<String>,
    pub codigo_cups_asociado: Option<String>,
    pub pbs_no_pbs: Option<String>,
    pub aseguradora: Option<String>,
    pub codigo_reps_3100: Option<String>,
    pub observacion_a_terceros: Option<String>,
    pub incluye: Option<String>,
    pub excluye: Option<String>,
    pub observaciones_generales: Option<String>,
}

impl From<PortafolioModel> for PortafolioEntry {
    fn from(model: PortafolioModel) -> Self {
        Self {
            codigo_hptu: model.codigo_hptu,
            grupo_concepto: model.grupo_concepto,
            descripcion_grupo_concepto: model.descripcion_grupo_concepto,
            concepto_hptu: model.concepto_hptu,
            descripcion_concepto: model.descripcion_concepto,
            codigo_reemplazo_2025: model.codigo_reemplazo_2025,
            descripcion_hptu: model.descripcion_hptu,
            tarifa_2025_bo: model.tarifa_2025_bo,
            grupo_quirurgico: model.grupo_quirurgico,
            codigo_conversion_externo: model.codigo_conversion_externo,
            descripcion_manual_externo: model.descripcion_manual_externo,
            codigo_cups_asociado: model.codigo_cups_asociado,
            pbs_no_pbs: model.pbs_no_pbs,
            aseguradora: model.aseguradora,
            codigo_reps_3100: model.codigo_reps_3100,
            observacion_a_terceros: model.observacion_a_terceros,
            incluye: model.incluye,
            excluye: model.excluye,
            observaciones_generales: model.observaciones_generales,
        }
    }
}
