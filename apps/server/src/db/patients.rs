//! Patient, person and medical-link statements

use super::{
    address::AddressInput,
    lookup::{self, LookupTable},
};
use crate::{
    models::{CivilStatus, Gender},
    Result,
};
use chrono::NaiveDate;
use sqlx::{FromRow, PgConnection, PgPool};

/// A validated patient ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPatient {
    pub first_name: String,
    pub last_name: String,
    pub middle_name: Option<String>,
    pub birthdate: NaiveDate,
    pub gender: Gender,
    pub civil_status: CivilStatus,
    pub occupation: String,
    pub company: Option<String>,
    pub mobile: String,
    pub address: AddressInput,
    pub medical_conditions: Vec<String>,
    pub medical_history: Vec<String>,
}

/// Patient-to-label link tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MedicalLink {
    Condition,
    History,
}

impl MedicalLink {
    fn lookup(self) -> LookupTable {
        match self {
            MedicalLink::Condition => LookupTable::MEDICAL_CONDITION,
            MedicalLink::History => LookupTable::MEDICAL_HISTORY,
        }
    }

    fn link_table(self) -> &'static str {
        match self {
            MedicalLink::Condition => "tbl_medical_condition_patient",
            MedicalLink::History => "tbl_medical_history_patient",
        }
    }
}

/// Person row behind a patient.
#[derive(Debug, Clone, Copy, FromRow)]
pub struct PersonRef {
    pub person_id: i32,
    pub address_id: Option<i32>,
}

pub async fn insert_person(
    conn: &mut PgConnection,
    patient: &NewPatient,
    occupation_id: i32,
    address_id: i32,
) -> Result<i32> {
    let person_id: i32 = sqlx::query_scalar(
        r#"
        INSERT INTO tbl_person (
            person_last_name, person_first_name, person_middle_name, person_birthdate,
            gender_id, status_id, occupation_id, address_id, person_company, contact_number
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        RETURNING person_id
        "#,
    )
    .bind(&patient.last_name)
    .bind(&patient.first_name)
    .bind(patient.middle_name.as_deref())
    .bind(patient.birthdate)
    .bind(patient.gender.id())
    .bind(patient.civil_status.id())
    .bind(occupation_id)
    .bind(address_id)
    .bind(patient.company.as_deref())
    .bind(&patient.mobile)
    .fetch_one(&mut *conn)
    .await?;
    Ok(person_id)
}

pub async fn update_person(
    conn: &mut PgConnection,
    person_id: i32,
    patient: &NewPatient,
    occupation_id: i32,
    address_id: i32,
) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE tbl_person SET
            person_last_name = $1,
            person_first_name = $2,
            person_middle_name = $3,
            person_birthdate = $4,
            gender_id = $5,
            status_id = $6,
            occupation_id = $7,
            address_id = $8,
            person_company = $9,
            contact_number = $10
        WHERE person_id = $11
        "#,
    )
    .bind(&patient.last_name)
    .bind(&patient.first_name)
    .bind(patient.middle_name.as_deref())
    .bind(patient.birthdate)
    .bind(patient.gender.id())
    .bind(patient.civil_status.id())
    .bind(occupation_id)
    .bind(address_id)
    .bind(patient.company.as_deref())
    .bind(&patient.mobile)
    .bind(person_id)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

pub async fn insert_patient(
    conn: &mut PgConnection,
    person_id: i32,
    date_added: NaiveDate,
) -> Result<i32> {
    let patient_id: i32 = sqlx::query_scalar(
        "INSERT INTO tbl_patient (person_id, date_added) VALUES ($1, $2) RETURNING patient_id",
    )
    .bind(person_id)
    .bind(date_added)
    .fetch_one(&mut *conn)
    .await?;
    Ok(patient_id)
}

/// Lock and return the person behind a patient.
pub async fn person_for_patient(
    conn: &mut PgConnection,
    patient_id: i32,
) -> Result<Option<PersonRef>> {
    let person = sqlx::query_as::<_, PersonRef>(
        r#"
        SELECT per.person_id, per.address_id
        FROM tbl_patient pat
        JOIN tbl_person per ON per.person_id = pat.person_id
        WHERE pat.patient_id = $1
        FOR UPDATE OF pat, per
        "#,
    )
    .bind(patient_id)
    .fetch_optional(&mut *conn)
    .await?;
    Ok(person)
}

/// Resolve each label and link it to the patient. Repeated labels are linked once.
pub async fn link_labels(
    conn: &mut PgConnection,
    patient_id: i32,
    kind: MedicalLink,
    labels: &[String],
) -> Result<()> {
    let lookup_table = kind.lookup();
    let sql = format!(
        "INSERT INTO {} (patient_id, {}) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        kind.link_table(),
        lookup_table.id_column
    );

    for label in labels {
        let label_id = lookup::resolve(conn, lookup_table, label).await?;
        sqlx::query(&sql)
            .bind(patient_id)
            .bind(label_id)
            .execute(&mut *conn)
            .await?;
    }
    Ok(())
}

pub async fn clear_links(
    conn: &mut PgConnection,
    patient_id: i32,
    kind: MedicalLink,
) -> Result<u64> {
    let sql = format!("DELETE FROM {} WHERE patient_id = $1", kind.link_table());
    let removed = sqlx::query(&sql)
        .bind(patient_id)
        .execute(&mut *conn)
        .await?
        .rows_affected();
    Ok(removed)
}

pub async fn delete_tooth_chart(conn: &mut PgConnection, patient_id: i32) -> Result<u64> {
    let removed = sqlx::query("DELETE FROM tbl_patient_tooth_chart WHERE patient_id = $1")
        .bind(patient_id)
        .execute(&mut *conn)
        .await?
        .rows_affected();
    Ok(removed)
}

pub async fn delete_patient_row(conn: &mut PgConnection, patient_id: i32) -> Result<()> {
    sqlx::query("DELETE FROM tbl_patient WHERE patient_id = $1")
        .bind(patient_id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

pub async fn delete_person(conn: &mut PgConnection, person_id: i32) -> Result<()> {
    sqlx::query("DELETE FROM tbl_person WHERE person_id = $1")
        .bind(person_id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

#[derive(Debug, Clone, FromRow)]
pub struct PatientListRow {
    pub patient_id: i32,
    pub first_name: String,
    pub middle_name: Option<String>,
    pub last_name: String,
    pub age: Option<i32>,
    pub gender_id: Option<i32>,
    pub contact_number: Option<String>,
}

#[derive(Debug, Clone, FromRow)]
pub struct PatientRow {
    pub patient_id: i32,
    pub first_name: String,
    pub middle_name: Option<String>,
    pub last_name: String,
    pub date_added: NaiveDate,
    pub age: Option<i32>,
    pub contact_number: Option<String>,
    pub birthdate: Option<NaiveDate>,
    pub occupation: Option<String>,
    pub gender_id: Option<i32>,
    pub status_id: Option<i32>,
    pub company: Option<String>,
    pub street_name: Option<String>,
    pub barangay_name: Option<String>,
    pub city_name: Option<String>,
}

/// Read-side patient queries. Each call runs on its own pooled connection.
#[derive(Clone)]
pub struct PatientRepository {
    pool: PgPool,
}

impl PatientRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn exists(&self, patient_id: i32) -> Result<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM tbl_patient WHERE patient_id = $1)")
                .bind(patient_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    pub async fn list(&self) -> Result<Vec<PatientListRow>> {
        let rows = sqlx::query_as::<_, PatientListRow>(
            r#"
            SELECT
                pat.patient_id,
                per.person_first_name AS first_name,
                per.person_middle_name AS middle_name,
                per.person_last_name AS last_name,
                DATE_PART('year', AGE(CURRENT_DATE, per.person_birthdate))::INT AS age,
                per.gender_id,
                per.contact_number
            FROM tbl_patient pat
            JOIN tbl_person per ON per.person_id = pat.person_id
            ORDER BY per.person_last_name, per.person_first_name, pat.patient_id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn find(&self, patient_id: i32) -> Result<Option<PatientRow>> {
        let row = sqlx::query_as::<_, PatientRow>(
            r#"
            SELECT
                pat.patient_id,
                per.person_first_name AS first_name,
                per.person_middle_name AS middle_name,
                per.person_last_name AS last_name,
                pat.date_added,
                DATE_PART('year', AGE(CURRENT_DATE, per.person_birthdate))::INT AS age,
                per.contact_number,
                per.person_birthdate AS birthdate,
                occ.occupation_title AS occupation,
                per.gender_id,
                per.status_id,
                per.person_company AS company,
                addr.address_street_name AS street_name,
                brgy.barangay_name,
                city.city_name
            FROM tbl_patient pat
            JOIN tbl_person per ON per.person_id = pat.person_id
            LEFT JOIN tbl_occupation occ ON occ.occupation_id = per.occupation_id
            LEFT JOIN tbl_address addr ON addr.address_id = per.address_id
            LEFT JOIN tbl_barangay brgy ON brgy.barangay_id = addr.barangay_id
            LEFT JOIN tbl_city city ON city.city_id = brgy.city_id
            WHERE pat.patient_id = $1
            "#,
        )
        .bind(patient_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// Distinct labels linked to the patient, sorted.
    pub async fn medical_labels(&self, patient_id: i32, kind: MedicalLink) -> Result<Vec<String>> {
        let lookup_table = kind.lookup();
        let sql = format!(
            "SELECT DISTINCT l.{label} FROM {link} pl \
             JOIN {table} l ON l.{id} = pl.{id} \
             WHERE pl.patient_id = $1 ORDER BY l.{label}",
            label = lookup_table.label_column,
            link = kind.link_table(),
            table = lookup_table.table,
            id = lookup_table.id_column,
        );
        let labels: Vec<String> = sqlx::query_scalar(&sql)
            .bind(patient_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(labels)
    }

    /// Distinct medication names prescribed in any of the patient's sessions.
    pub async fn medications(&self, patient_id: i32) -> Result<Vec<String>> {
        let names: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT DISTINCT m.medication_name
            FROM tbl_session s
            JOIN tbl_prescription p ON p.session_id = s.session_id
            JOIN tbl_medication m ON m.medication_id = p.medication_id
            WHERE s.patient_id = $1
            ORDER BY m.medication_name
            "#,
        )
        .bind(patient_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(names)
    }

    pub async fn last_session_date(&self, patient_id: i32) -> Result<Option<NaiveDate>> {
        let date: Option<NaiveDate> =
            sqlx::query_scalar("SELECT MAX(session_date) FROM tbl_session WHERE patient_id = $1")
                .bind(patient_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(date)
    }
}
