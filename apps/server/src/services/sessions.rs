//! Treatment session workflow and session/billing read queries

use super::{
    formatting::{display_date, display_time},
    images::{decode_optional, encode_image},
};
use crate::{
    config::SessionConfig,
    db::{
        sessions::{self, NewPrescription, NewService, NewSession, ServiceRow, SessionRepository},
        TransactionRunner,
    },
    models::{
        de::{non_blank, parse_id},
        AppointmentSummary, BillingInfo, BillingLine, BillingPrescription, FeeStatus,
        PrescriptionDetail, PrescriptionEntry, ServiceDetail, ServiceEntry, ServiceOffered,
        ServiceStatus, SessionDetail, SessionPayload, ToothChartView,
    },
    Error, Result,
};
use chrono::{Duration, Local};
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};
use std::str::FromStr;

const STORE_FAILED: &str = "Failed to store session data";

/// Everything a session write needs, decoded and typed.
#[derive(Debug, Clone)]
struct SessionRecord {
    session: NewSession,
    services: Vec<NewService>,
    prescriptions: Vec<NewPrescription>,
    tooth_chart: Option<Vec<u8>>,
    tooth_chart_remarks: Option<String>,
}

pub struct SessionService {
    repository: SessionRepository,
    transactions: TransactionRunner,
    defaults: SessionConfig,
}

impl SessionService {
    pub fn new(pool: PgPool, defaults: SessionConfig) -> Self {
        Self {
            repository: SessionRepository::new(pool.clone()),
            transactions: TransactionRunner::new(pool),
            defaults,
        }
    }

    /// Store a session with its services, prescriptions and the patient's tooth chart.
    ///
    /// Any failure, including unreadable entries inside the body, is reported as a single
    /// storage failure and nothing is written.
    pub async fn store(&self, payload: SessionPayload) -> Result<i32> {
        let record = self
            .prepare(payload)
            .map_err(|e| Error::operation(STORE_FAILED, e))?;
        let patient_id = record.session.patient_id;

        let session_id = self
            .transactions
            .run("store_session", move |conn| {
                Box::pin(async move { insert_session_records(conn, &record).await })
            })
            .await
            .map_err(|e| Error::operation(STORE_FAILED, e))?;

        tracing::info!(session_id, patient_id, "Session stored");
        Ok(session_id)
    }

    fn prepare(&self, payload: SessionPayload) -> Result<SessionRecord> {
        let patient_id = non_blank(&payload.patient_id)
            .and_then(parse_id)
            .ok_or_else(|| Error::Internal("session has no usable patient_id".into()))?;

        let now = Local::now().naive_local();
        let time_start = now.time();
        let (time_end, _) = time_start.overflowing_add_signed(Duration::minutes(i64::from(
            self.defaults.default_duration_minutes,
        )));

        let services = payload
            .service_values
            .unwrap_or_default()
            .iter()
            .map(new_service)
            .collect::<Result<Vec<_>>>()?;
        let prescriptions = payload
            .prescriptions
            .unwrap_or_default()
            .into_iter()
            .map(new_prescription)
            .collect::<Result<Vec<_>>>()?;

        Ok(SessionRecord {
            session: NewSession {
                patient_id,
                dentist_id: self.defaults.default_dentist_id,
                date: now.date(),
                time_start,
                time_end,
                remarks: payload.session_remarks.unwrap_or_default(),
                remarks_image: decode_optional(payload.session_remarks_image.as_deref())?,
            },
            services,
            prescriptions,
            tooth_chart: decode_optional(payload.tooth_chart_image.as_deref())?,
            tooth_chart_remarks: payload
                .tooth_chart_remarks
                .filter(|remarks| !remarks.trim().is_empty()),
        })
    }

    pub async fn services_offered(&self) -> Result<Vec<ServiceOffered>> {
        let rows = self.repository.services_offered().await?;
        Ok(rows
            .into_iter()
            .map(|row| ServiceOffered {
                id: row.service_offered_id,
                name: row.service_offered_name,
            })
            .collect())
    }

    pub async fn appointment_history(&self, patient_id: i32) -> Result<Vec<AppointmentSummary>> {
        let rows = self.repository.appointments(patient_id).await?;
        Ok(rows
            .into_iter()
            .map(|row| AppointmentSummary {
                session_id: row.session_id,
                date: display_date(Some(row.session_date)),
                time_start: display_time(row.session_time_start),
                time_end: display_time(row.session_time_end),
                dentist_name: row
                    .dentist_name
                    .unwrap_or_else(|| "Not assigned".to_string()),
                remarks: row.session_remarks,
                services: row
                    .services
                    .unwrap_or_else(|| "No services recorded".to_string()),
            })
            .collect())
    }

    /// Session detail. With `patient_id`, the session must belong to that patient.
    pub async fn session_detail(
        &self,
        session_id: i32,
        patient_id: Option<i32>,
    ) -> Result<SessionDetail> {
        let session = self
            .repository
            .find(session_id, patient_id)
            .await?
            .ok_or_else(|| match patient_id {
                Some(_) => Error::NotFound(
                    "Session not found or does not belong to specified patient".to_string(),
                ),
                None => Error::NotFound("Session not found".to_string()),
            })?;

        let (services, prescriptions, tooth_chart) = tokio::try_join!(
            self.repository.services(session.session_id),
            self.repository
                .prescriptions(session.session_id, Some(session.patient_id)),
            self.repository.tooth_chart(session.patient_id),
        )?;

        Ok(SessionDetail {
            session_id: session.session_id,
            patient_id: session.patient_id,
            dentist_id: session.dentist_id,
            dentist_name: session
                .dentist_name
                .unwrap_or_else(|| "Not assigned".to_string()),
            patient_name: session.patient_name,
            date: display_date(Some(session.session_date)),
            remarks: session.session_remarks,
            remarks_image: session.session_remarks_image.as_deref().map(encode_image),
            time_start: display_time(session.session_time_start),
            time_end: display_time(session.session_time_end),
            services: services.into_iter().map(service_detail).collect(),
            prescriptions: prescriptions
                .into_iter()
                .map(|row| PrescriptionDetail {
                    prescription_id: row.prescription_id,
                    medication_id: row.medication_id,
                    medication_name: row.medication_name,
                    dosage: row.medication_dosage,
                    frequency_duration: row.medication_frequency_duration,
                    special_instructions: row.special_instructions.unwrap_or_default(),
                })
                .collect(),
            tooth_chart: tooth_chart.map(|chart| ToothChartView {
                chart_data: encode_image(&chart.tooth_chart),
                remarks: chart.patienttooth_remarks.unwrap_or_default(),
                last_updated: display_date(Some(chart.date_added)),
            }),
        })
    }

    /// Billing lines and prescriptions of one session of one patient.
    pub async fn billing(&self, patient_id: i32, session_id: i32) -> Result<BillingInfo> {
        let (services, prescriptions) = tokio::try_join!(
            self.repository.billed_services(patient_id, session_id),
            self.repository.prescriptions(session_id, Some(patient_id)),
        )?;

        Ok(BillingInfo {
            billing: services
                .into_iter()
                .map(|row| BillingLine {
                    service_name: row.service_offered_name.unwrap_or_default(),
                    total_fee: row.service_fee,
                    amount_tendered: row.service_amount_tendered,
                    balance: row.service_fee - row.service_amount_tendered,
                    payment_status: FeeStatus::parse(&row.service_fee_status)
                        .unwrap_or(FeeStatus::Unpaid),
                })
                .collect(),
            prescriptions: prescriptions
                .into_iter()
                .map(|row| BillingPrescription {
                    medication_name: row.medication_name,
                    dosage: row.medication_dosage,
                    frequency_duration: row.medication_frequency_duration,
                })
                .collect(),
        })
    }
}

async fn insert_session_records(conn: &mut PgConnection, record: &SessionRecord) -> Result<i32> {
    let session_id = sessions::insert_session(conn, &record.session).await?;
    sessions::insert_services(conn, session_id, &record.services).await?;

    for prescription in &record.prescriptions {
        sessions::insert_prescription(conn, session_id, prescription).await?;
    }

    if let Some(chart) = &record.tooth_chart {
        sessions::upsert_tooth_chart(
            conn,
            record.session.patient_id,
            chart,
            record.tooth_chart_remarks.as_deref(),
            record.session.date,
        )
        .await?;
    }

    Ok(session_id)
}

fn new_service(entry: &ServiceEntry) -> Result<NewService> {
    let service_offered_id = non_blank(&entry.service_offered_id)
        .and_then(parse_id)
        .ok_or_else(|| Error::Internal("Service offered ID is required".into()))?;

    let status = match non_blank(&entry.remark_id) {
        Some(raw) => ServiceStatus::parse(raw)
            .ok_or_else(|| Error::Internal(format!("unknown service status '{raw}'")))?,
        None => ServiceStatus::Incomplete,
    };
    let fee_status = match non_blank(&entry.status) {
        Some(raw) => FeeStatus::parse(raw)
            .ok_or_else(|| Error::Internal(format!("unknown fee status '{raw}'")))?,
        None => FeeStatus::Unpaid,
    };

    Ok(NewService {
        service_offered_id,
        tooth_number: non_blank(&entry.tooth).map(str::to_string),
        status,
        fee: amount(&entry.fee, "fee")?,
        fee_status,
        amount_tendered: amount(&entry.tendered, "tendered")?,
    })
}

fn new_prescription(entry: PrescriptionEntry) -> Result<NewPrescription> {
    let medication = non_blank(&entry.medication)
        .map(str::to_string)
        .ok_or_else(|| Error::Internal("prescription without medication".into()))?;

    Ok(NewPrescription {
        medication,
        dosage: non_blank(&entry.dosage).map(str::to_string),
        frequency_duration: non_blank(&entry.frequency_duration).map(str::to_string),
        special_instructions: non_blank(&entry.special_instructions).map(str::to_string),
    })
}

/// Money amount; absent or blank means zero.
fn amount(raw: &Option<String>, field: &str) -> Result<Decimal> {
    match non_blank(raw) {
        Some(value) => Decimal::from_str(value)
            .map(|d| d.round_dp(2))
            .map_err(|e| Error::Internal(format!("invalid {field} '{value}': {e}"))),
        None => Ok(Decimal::ZERO),
    }
}

fn service_detail(row: ServiceRow) -> ServiceDetail {
    ServiceDetail {
        service_id: row.service_id,
        service_offered_id: row.service_offered_id,
        service_name: row.service_offered_name.unwrap_or_default(),
        tooth_number: row.service_tooth_number.unwrap_or_default(),
        status: ServiceStatus::parse(&row.service_status).unwrap_or(ServiceStatus::Incomplete),
        fee: row.service_fee,
        fee_status: FeeStatus::parse(&row.service_fee_status).unwrap_or(FeeStatus::Unpaid),
        amount_tendered: row.service_amount_tendered,
    }
}
