//! Classification of PostgreSQL errors raised by the `links` table.

/// Partial unique index on `links(code) WHERE deleted_at IS NULL`.
pub const LINKS_CODE_CONSTRAINT: &str = "links_code_active_key";

/// Returns true if `e` is a unique violation on the active-code index.
pub fn is_unique_violation_on_code(e: &sqlx::Error) -> bool {
    let Some(db_err) = e.as_database_error() else {
        return false;
    };

    if !db_err.is_unique_violation() {
        return false;
    }

    matches!(db_err.constraint(), Some(LINKS_CODE_CONSTRAINT))
}
