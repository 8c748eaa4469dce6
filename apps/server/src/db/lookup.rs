//! Get-or-create resolution of free-text labels to lookup-table ids

use crate::Result;
use sqlx::PgConnection;

/// A label table with a unique label column and a serial id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LookupTable {
    pub table: &'static str,
    pub id_column: &'static str,
    pub label_column: &'static str,
}

impl LookupTable {
    pub const OCCUPATION: LookupTable = LookupTable {
        table: "tbl_occupation",
        id_column: "occupation_id",
        label_column: "occupation_title",
    };

    pub const MEDICAL_CONDITION: LookupTable = LookupTable {
        table: "tbl_medical_condition",
        id_column: "condition_id",
        label_column: "condition_name",
    };

    pub const MEDICAL_HISTORY: LookupTable = LookupTable {
        table: "tbl_medical_history",
        id_column: "history_id",
        label_column: "history_name",
    };

    pub const CITY: LookupTable = LookupTable {
        table: "tbl_city",
        id_column: "city_id",
        label_column: "city_name",
    };

    fn upsert_sql(&self) -> String {
        format!(
            "INSERT INTO {table} ({label}) VALUES ($1) \
             ON CONFLICT ({label}) DO UPDATE SET {label} = EXCLUDED.{label} \
             RETURNING {id}",
            table = self.table,
            label = self.label_column,
            id = self.id_column,
        )
    }
}

/// Return the id of the row labelled `label`, inserting it first when absent.
///
/// Labels are matched exactly (case and whitespace included). The upsert is a single statement,
/// so concurrent callers resolving the same new label get the same row.
pub async fn resolve(conn: &mut PgConnection, table: LookupTable, label: &str) -> Result<i32> {
    // Identifiers come from the constants above, never from request data.
    let sql = table.upsert_sql();
    let id: i32 = sqlx::query_scalar(&sql)
        .bind(label)
        .fetch_one(&mut *conn)
        .await?;

    tracing::trace!(table = table.table, id, "Resolved lookup label");
    Ok(id)
}
