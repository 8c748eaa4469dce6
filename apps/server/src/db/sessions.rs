//! Treatment session, service, prescription and tooth chart statements

use crate::{
    models::{FeeStatus, ServiceStatus},
    Result,
};
use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgConnection, PgPool, Postgres, QueryBuilder};

#[derive(Debug, Clone)]
pub struct NewSession {
    pub patient_id: i32,
    pub dentist_id: i32,
    pub date: NaiveDate,
    pub time_start: NaiveTime,
    pub time_end: NaiveTime,
    pub remarks: String,
    pub remarks_image: Option<Vec<u8>>,
}

#[derive(Debug, Clone)]
pub struct NewService {
    pub service_offered_id: i32,
    pub tooth_number: Option<String>,
    pub status: ServiceStatus,
    pub fee: Decimal,
    pub fee_status: FeeStatus,
    pub amount_tendered: Decimal,
}

#[derive(Debug, Clone)]
pub struct NewPrescription {
    pub medication: String,
    pub dosage: Option<String>,
    pub frequency_duration: Option<String>,
    pub special_instructions: Option<String>,
}

/// Rows removed when a patient's sessions are deleted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionPurge {
    pub sessions: u64,
    pub services: u64,
    pub prescriptions: u64,
    pub medications: u64,
}

pub async fn insert_session(conn: &mut PgConnection, session: &NewSession) -> Result<i32> {
    let session_id: i32 = sqlx::query_scalar(
        r#"
        INSERT INTO tbl_session (
            patient_id, dentist_id, session_date, session_time_start, session_time_end,
            session_remarks, session_remarks_image
        ) VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING session_id
        "#,
    )
    .bind(session.patient_id)
    .bind(session.dentist_id)
    .bind(session.date)
    .bind(session.time_start)
    .bind(session.time_end)
    .bind(&session.remarks)
    .bind(session.remarks_image.as_deref())
    .fetch_one(&mut *conn)
    .await?;
    Ok(session_id)
}

/// Insert all services of a session in one statement.
pub async fn insert_services(
    conn: &mut PgConnection,
    session_id: i32,
    services: &[NewService],
) -> Result<u64> {
    if services.is_empty() {
        return Ok(0);
    }

    let mut builder = QueryBuilder::<Postgres>::new(
        "INSERT INTO tbl_service (session_id, service_offered_id, service_tooth_number, \
         service_status, service_fee, service_fee_status, service_amount_tendered) ",
    );
    builder.push_values(services, |mut row, service| {
        row.push_bind(session_id)
            .push_bind(service.service_offered_id)
            .push_bind(service.tooth_number.clone())
            .push_bind(service.status.as_str())
            .push_bind(service.fee)
            .push_bind(service.fee_status.as_str())
            .push_bind(service.amount_tendered);
    });

    let inserted = builder.build().execute(&mut *conn).await?.rows_affected();
    Ok(inserted)
}

/// Create a fresh medication row and the prescription pointing at it.
pub async fn insert_prescription(
    conn: &mut PgConnection,
    session_id: i32,
    prescription: &NewPrescription,
) -> Result<i32> {
    let medication_id: i32 = sqlx::query_scalar(
        r#"
        INSERT INTO tbl_medication (medication_name, medication_dosage, medication_frequency_duration)
        VALUES ($1, $2, $3)
        RETURNING medication_id
        "#,
    )
    .bind(&prescription.medication)
    .bind(prescription.dosage.as_deref())
    .bind(prescription.frequency_duration.as_deref())
    .fetch_one(&mut *conn)
    .await?;

    let prescription_id: i32 = sqlx::query_scalar(
        r#"
        INSERT INTO tbl_prescription (session_id, medication_id, special_instructions)
        VALUES ($1, $2, $3)
        RETURNING prescription_id
        "#,
    )
    .bind(session_id)
    .bind(medication_id)
    .bind(prescription.special_instructions.as_deref())
    .fetch_one(&mut *conn)
    .await?;
    Ok(prescription_id)
}

/// Keep a single chart per patient; the latest upload wins.
pub async fn upsert_tooth_chart(
    conn: &mut PgConnection,
    patient_id: i32,
    chart: &[u8],
    remarks: Option<&str>,
    date: NaiveDate,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO tbl_patient_tooth_chart (patient_id, tooth_chart, patienttooth_remarks, date_added)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (patient_id) DO UPDATE SET
            tooth_chart = EXCLUDED.tooth_chart,
            patienttooth_remarks = COALESCE(
                EXCLUDED.patienttooth_remarks,
                tbl_patient_tooth_chart.patienttooth_remarks
            ),
            date_added = EXCLUDED.date_added
        "#,
    )
    .bind(patient_id)
    .bind(chart)
    .bind(remarks)
    .bind(date)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

/// Delete every session of a patient with its prescriptions, medications and services.
pub async fn delete_for_patient(conn: &mut PgConnection, patient_id: i32) -> Result<SessionPurge> {
    let medication_ids: Vec<i32> = sqlx::query_scalar(
        r#"
        DELETE FROM tbl_prescription p
        USING tbl_session s
        WHERE p.session_id = s.session_id AND s.patient_id = $1
        RETURNING p.medication_id
        "#,
    )
    .bind(patient_id)
    .fetch_all(&mut *conn)
    .await?;

    let medications = if medication_ids.is_empty() {
        0
    } else {
        sqlx::query("DELETE FROM tbl_medication WHERE medication_id = ANY($1)")
            .bind(medication_ids.as_slice())
            .execute(&mut *conn)
            .await?
            .rows_affected()
    };

    let services = sqlx::query(
        r#"
        DELETE FROM tbl_service sv
        USING tbl_session s
        WHERE sv.session_id = s.session_id AND s.patient_id = $1
        "#,
    )
    .bind(patient_id)
    .execute(&mut *conn)
    .await?
    .rows_affected();

    let sessions = sqlx::query("DELETE FROM tbl_session WHERE patient_id = $1")
        .bind(patient_id)
        .execute(&mut *conn)
        .await?
        .rows_affected();

    Ok(SessionPurge {
        sessions,
        services,
        prescriptions: medication_ids.len() as u64,
        medications,
    })
}

#[derive(Debug, Clone, FromRow)]
pub struct ServiceOfferedRow {
    pub service_offered_id: i32,
    pub service_offered_name: String,
}

#[derive(Debug, Clone, FromRow)]
pub struct AppointmentRow {
    pub session_id: i32,
    pub session_date: NaiveDate,
    pub session_time_start: Option<NaiveTime>,
    pub session_time_end: Option<NaiveTime>,
    pub session_remarks: String,
    pub dentist_name: Option<String>,
    pub services: Option<String>,
}

#[derive(Debug, Clone, FromRow)]
pub struct SessionRow {
    pub session_id: i32,
    pub patient_id: i32,
    pub dentist_id: i32,
    pub session_date: NaiveDate,
    pub session_time_start: Option<NaiveTime>,
    pub session_time_end: Option<NaiveTime>,
    pub session_remarks: String,
    pub session_remarks_image: Option<Vec<u8>>,
    pub dentist_name: Option<String>,
    pub patient_name: Option<String>,
}

#[derive(Debug, Clone, FromRow)]
pub struct ServiceRow {
    pub service_id: i32,
    pub service_offered_id: i32,
    pub service_offered_name: Option<String>,
    pub service_tooth_number: Option<String>,
    pub service_status: String,
    pub service_fee: Decimal,
    pub service_fee_status: String,
    pub service_amount_tendered: Decimal,
}

#[derive(Debug, Clone, FromRow)]
pub struct PrescriptionRow {
    pub prescription_id: i32,
    pub medication_id: i32,
    pub medication_name: String,
    pub medication_dosage: Option<String>,
    pub medication_frequency_duration: Option<String>,
    pub special_instructions: Option<String>,
}

#[derive(Debug, Clone, FromRow)]
pub struct ToothChartRow {
    pub tooth_chart: Vec<u8>,
    pub patienttooth_remarks: Option<String>,
    pub date_added: NaiveDate,
}

/// Read-side session queries.
#[derive(Clone)]
pub struct SessionRepository {
    pool: PgPool,
}

impl SessionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn services_offered(&self) -> Result<Vec<ServiceOfferedRow>> {
        let rows = sqlx::query_as::<_, ServiceOfferedRow>(
            r#"
            SELECT service_offered_id, service_offered_name
            FROM tbl_services_offered
            ORDER BY service_offered_id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn appointments(&self, patient_id: i32) -> Result<Vec<AppointmentRow>> {
        let rows = sqlx::query_as::<_, AppointmentRow>(
            r#"
            SELECT
                s.session_id,
                s.session_date,
                s.session_time_start,
                s.session_time_end,
                s.session_remarks,
                CASE WHEN dp.person_id IS NULL THEN NULL
                     ELSE dp.person_last_name || ', ' || dp.person_first_name
                          || COALESCE(' ' || dp.person_middle_name, '')
                END AS dentist_name,
                STRING_AGG(DISTINCT so.service_offered_name, ' - ') AS services
            FROM tbl_session s
            LEFT JOIN tbl_dentist d ON d.dentist_id = s.dentist_id
            LEFT JOIN tbl_person dp ON dp.person_id = d.person_id
            LEFT JOIN tbl_service sv ON sv.session_id = s.session_id
            LEFT JOIN tbl_services_offered so ON so.service_offered_id = sv.service_offered_id
            WHERE s.patient_id = $1
            GROUP BY s.session_id, dp.person_id
            ORDER BY s.session_date DESC, s.session_time_start DESC, s.session_id DESC
            "#,
        )
        .bind(patient_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Session header, optionally restricted to one patient.
    pub async fn find(
        &self,
        session_id: i32,
        patient_id: Option<i32>,
    ) -> Result<Option<SessionRow>> {
        let row = sqlx::query_as::<_, SessionRow>(
            r#"
            SELECT
                s.session_id,
                s.patient_id,
                s.dentist_id,
                s.session_date,
                s.session_time_start,
                s.session_time_end,
                s.session_remarks,
                s.session_remarks_image,
                CASE WHEN dp.person_id IS NULL THEN NULL
                     ELSE dp.person_last_name || ', ' || dp.person_first_name
                END AS dentist_name,
                CASE WHEN pp.person_id IS NULL THEN NULL
                     ELSE pp.person_last_name || ', ' || pp.person_first_name
                END AS patient_name
            FROM tbl_session s
            LEFT JOIN tbl_dentist d ON d.dentist_id = s.dentist_id
            LEFT JOIN tbl_person dp ON dp.person_id = d.person_id
            LEFT JOIN tbl_patient p ON p.patient_id = s.patient_id
            LEFT JOIN tbl_person pp ON pp.person_id = p.person_id
            WHERE s.session_id = $1 AND ($2::INT IS NULL OR s.patient_id = $2)
            "#,
        )
        .bind(session_id)
        .bind(patient_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn services(&self, session_id: i32) -> Result<Vec<ServiceRow>> {
        let rows = sqlx::query_as::<_, ServiceRow>(
            r#"
            SELECT
                sv.service_id,
                sv.service_offered_id,
                so.service_offered_name,
                sv.service_tooth_number,
                sv.service_status,
                sv.service_fee,
                sv.service_fee_status,
                sv.service_amount_tendered
            FROM tbl_service sv
            LEFT JOIN tbl_services_offered so ON so.service_offered_id = sv.service_offered_id
            WHERE sv.session_id = $1
            ORDER BY sv.service_id
            "#,
        )
        .bind(session_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Services of a session, scoped to the owning patient.
    pub async fn billed_services(
        &self,
        patient_id: i32,
        session_id: i32,
    ) -> Result<Vec<ServiceRow>> {
        let rows = sqlx::query_as::<_, ServiceRow>(
            r#"
            SELECT
                sv.service_id,
                sv.service_offered_id,
                so.service_offered_name,
                sv.service_tooth_number,
                sv.service_status,
                sv.service_fee,
                sv.service_fee_status,
                sv.service_amount_tendered
            FROM tbl_service sv
            JOIN tbl_session s ON s.session_id = sv.session_id
            LEFT JOIN tbl_services_offered so ON so.service_offered_id = sv.service_offered_id
            WHERE s.patient_id = $1 AND s.session_id = $2
            ORDER BY sv.service_id
            "#,
        )
        .bind(patient_id)
        .bind(session_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn prescriptions(
        &self,
        session_id: i32,
        patient_id: Option<i32>,
    ) -> Result<Vec<PrescriptionRow>> {
        let rows = sqlx::query_as::<_, PrescriptionRow>(
            r#"
            SELECT
                p.prescription_id,
                p.medication_id,
                m.medication_name,
                m.medication_dosage,
                m.medication_frequency_duration,
                p.special_instructions
            FROM tbl_prescription p
            JOIN tbl_medication m ON m.medication_id = p.medication_id
            JOIN tbl_session s ON s.session_id = p.session_id
            WHERE p.session_id = $1 AND ($2::INT IS NULL OR s.patient_id = $2)
            ORDER BY p.prescription_id
            "#,
        )
        .bind(session_id)
        .bind(patient_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn tooth_chart(&self, patient_id: i32) -> Result<Option<ToothChartRow>> {
        let row = sqlx::query_as::<_, ToothChartRow>(
            r#"
            SELECT tooth_chart, patienttooth_remarks, date_added
            FROM tbl_patient_tooth_chart
            WHERE patient_id = $1
            "#,
        )
        .bind(patient_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }
}
