//! City -> barangay -> address resolution and reference-counted cleanup

use super::lookup::{self, LookupTable};
use crate::Result;
use sqlx::PgConnection;

/// Validated address parts, as submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressInput {
    pub city_name: String,
    pub barangay_name: String,
    pub street_name: String,
}

/// Rows removed by a cleanup pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Reclaimed {
    pub addresses: u32,
    pub barangays: u32,
    pub cities: u32,
}

pub async fn resolve_city(conn: &mut PgConnection, name: &str) -> Result<i32> {
    lookup::resolve(conn, LookupTable::CITY, name).await
}

/// Barangay names are only unique within a city.
pub async fn resolve_barangay(conn: &mut PgConnection, name: &str, city_id: i32) -> Result<i32> {
    let id: i32 = sqlx::query_scalar(
        r#"
        INSERT INTO tbl_barangay (barangay_name, city_id) VALUES ($1, $2)
        ON CONFLICT (barangay_name, city_id) DO UPDATE SET barangay_name = EXCLUDED.barangay_name
        RETURNING barangay_id
        "#,
    )
    .bind(name)
    .bind(city_id)
    .fetch_one(&mut *conn)
    .await?;
    Ok(id)
}

/// Resolve the whole hierarchy and return the address id to store on the person.
///
/// `existing` is the person's current address, if any. See [`upsert_address`].
pub async fn resolve_address(
    conn: &mut PgConnection,
    input: &AddressInput,
    existing: Option<i32>,
) -> Result<i32> {
    let city_id = resolve_city(conn, &input.city_name).await?;
    let barangay_id = resolve_barangay(conn, &input.barangay_name, city_id).await?;
    upsert_address(conn, &input.street_name, barangay_id, existing).await
}

/// Find or create the address row for `(street, barangay)`.
///
/// Addresses are shared by tuple. When the person's current address matches, it is kept; when
/// it is used by this person alone it is rewritten in place; otherwise the matching (or a new)
/// row is returned and the caller must release the old one after repointing the person.
pub async fn upsert_address(
    conn: &mut PgConnection,
    street_name: &str,
    barangay_id: i32,
    existing: Option<i32>,
) -> Result<i32> {
    if let Some(found) = find_address(conn, street_name, barangay_id).await? {
        return Ok(found);
    }

    if let Some(existing_id) = existing {
        let sharers: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM tbl_person WHERE address_id = $1")
                .bind(existing_id)
                .fetch_one(&mut *conn)
                .await?;

        if sharers <= 1 {
            let previous_barangay: Option<i32> = sqlx::query_scalar(
                r#"
                UPDATE tbl_address a
                SET address_street_name = $1, barangay_id = $2
                FROM tbl_address old
                WHERE a.address_id = $3 AND old.address_id = a.address_id
                RETURNING old.barangay_id
                "#,
            )
            .bind(street_name)
            .bind(barangay_id)
            .bind(existing_id)
            .fetch_optional(&mut *conn)
            .await?;

            if let Some(previous) = previous_barangay {
                if previous != barangay_id {
                    release_barangay(conn, previous).await?;
                }
                return Ok(existing_id);
            }
        }
    }

    let id: i32 = sqlx::query_scalar(
        r#"
        INSERT INTO tbl_address (address_street_name, barangay_id) VALUES ($1, $2)
        ON CONFLICT (address_street_name, barangay_id)
            DO UPDATE SET address_street_name = EXCLUDED.address_street_name
        RETURNING address_id
        "#,
    )
    .bind(street_name)
    .bind(barangay_id)
    .fetch_one(&mut *conn)
    .await?;
    Ok(id)
}

async fn find_address(
    conn: &mut PgConnection,
    street_name: &str,
    barangay_id: i32,
) -> Result<Option<i32>> {
    let id = sqlx::query_scalar(
        "SELECT address_id FROM tbl_address WHERE address_street_name = $1 AND barangay_id = $2",
    )
    .bind(street_name)
    .bind(barangay_id)
    .fetch_optional(&mut *conn)
    .await?;
    Ok(id)
}

/// Delete the address if no person references it, then walk up to barangay and city.
///
/// Each level is only considered once the level below was deleted.
pub async fn release_address(conn: &mut PgConnection, address_id: i32) -> Result<Reclaimed> {
    let mut reclaimed = Reclaimed::default();

    let referenced: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM tbl_person WHERE address_id = $1")
            .bind(address_id)
            .fetch_one(&mut *conn)
            .await?;
    if referenced > 0 {
        return Ok(reclaimed);
    }

    let barangay_id: Option<i32> =
        sqlx::query_scalar("DELETE FROM tbl_address WHERE address_id = $1 RETURNING barangay_id")
            .bind(address_id)
            .fetch_optional(&mut *conn)
            .await?;

    if let Some(barangay_id) = barangay_id {
        reclaimed.addresses = 1;
        let upper = release_barangay(conn, barangay_id).await?;
        reclaimed.barangays = upper.barangays;
        reclaimed.cities = upper.cities;
    }

    tracing::debug!(
        address_id,
        addresses = reclaimed.addresses,
        barangays = reclaimed.barangays,
        cities = reclaimed.cities,
        "Released address"
    );
    Ok(reclaimed)
}

async fn release_barangay(conn: &mut PgConnection, barangay_id: i32) -> Result<Reclaimed> {
    let mut reclaimed = Reclaimed::default();

    let referenced: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM tbl_address WHERE barangay_id = $1")
            .bind(barangay_id)
            .fetch_one(&mut *conn)
            .await?;
    if referenced > 0 {
        return Ok(reclaimed);
    }

    let city_id: Option<i32> =
        sqlx::query_scalar("DELETE FROM tbl_barangay WHERE barangay_id = $1 RETURNING city_id")
            .bind(barangay_id)
            .fetch_optional(&mut *conn)
            .await?;

    if let Some(city_id) = city_id {
        reclaimed.barangays = 1;
        if release_city(conn, city_id).await? {
            reclaimed.cities = 1;
        }
    }
    Ok(reclaimed)
}

async fn release_city(conn: &mut PgConnection, city_id: i32) -> Result<bool> {
    let referenced: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM tbl_barangay WHERE city_id = $1")
            .bind(city_id)
            .fetch_one(&mut *conn)
            .await?;
    if referenced > 0 {
        return Ok(false);
    }

    let deleted = sqlx::query("DELETE FROM tbl_city WHERE city_id = $1")
        .bind(city_id)
        .execute(&mut *conn)
        .await?
        .rows_affected();
    Ok(deleted > 0)
}
