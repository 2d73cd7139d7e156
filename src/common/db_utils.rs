// src/common/db_utils.rs

use crate::common::error::AppError;

/// Converte violação de chave estrangeira no "não encontrado" do chamador.
/// Qualquer outro erro segue como erro de banco.
pub(crate) fn missing_reference(err: sqlx::Error, not_found: AppError) -> AppError {
    missing_reference_by(err, |_| Some(not_found))
}

/// Como `missing_reference`, mas escolhe o erro pelo nome da constraint violada.
/// Constraint desconhecida segue como erro de banco.
pub(crate) fn missing_reference_by<F>(err: sqlx::Error, by_constraint: F) -> AppError
where
    F: FnOnce(Option<&str>) -> Option<AppError>,
{
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_foreign_key_violation() {
            if let Some(mapped) = by_constraint(db_err.constraint()) {
                return mapped;
            }
        }
    }
    err.into()
}
