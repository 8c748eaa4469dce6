//! Patient workflows: transactional create/update/delete and read queries

use super::{
    formatting::display_date,
    validation::validate_patient,
};
use crate::{
    db::{
        address,
        lookup::{self, LookupTable},
        patients::{self, MedicalLink, NewPatient, PatientRepository},
        sessions, TransactionRunner,
    },
    models::{
        AddressParts, AddressView, CivilStatus, Gender, PatientDetail, PatientPayload,
        PatientSummary,
    },
    Error, Result,
};
use chrono::{Local, NaiveDate};
use sqlx::{PgConnection, PgPool};

pub struct PatientService {
    repository: PatientRepository,
    transactions: TransactionRunner,
}

impl PatientService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: PatientRepository::new(pool.clone()),
            transactions: TransactionRunner::new(pool),
        }
    }

    /// Validate and insert a patient with person, address and medical links.
    pub async fn create(&self, payload: &PatientPayload) -> Result<i32> {
        let today = Local::now().date_naive();
        let patient = validate_patient(payload, today)?;

        let patient_id = self
            .transactions
            .run("create_patient", move |conn| {
                Box::pin(async move { insert_patient_records(conn, &patient, today).await })
            })
            .await?;

        tracing::info!(patient_id, "Patient created");
        Ok(patient_id)
    }

    /// Replace a patient's person fields, address and medical links.
    pub async fn update(&self, patient_id: i32, payload: &PatientPayload) -> Result<i32> {
        self.ensure_exists(patient_id).await?;
        let patient = validate_patient(payload, Local::now().date_naive())?;

        self.transactions
            .run("update_patient", move |conn| {
                Box::pin(async move { update_patient_records(conn, patient_id, &patient).await })
            })
            .await?;

        tracing::info!(patient_id, "Patient updated");
        Ok(patient_id)
    }

    /// Delete a patient and everything that hangs off it.
    pub async fn delete(&self, patient_id: i32) -> Result<()> {
        self.ensure_exists(patient_id).await?;

        self.transactions
            .run("delete_patient", move |conn| {
                Box::pin(async move { delete_patient_records(conn, patient_id).await })
            })
            .await?;

        tracing::info!(patient_id, "Patient deleted");
        Ok(())
    }

    pub async fn list(&self) -> Result<Vec<PatientSummary>> {
        let rows = self.repository.list().await?;
        Ok(rows
            .into_iter()
            .map(|row| PatientSummary {
                id: row.patient_id,
                first_name: row.first_name,
                middle_name: row.middle_name,
                last_name: row.last_name,
                age: row.age,
                gender: row.gender_id.and_then(Gender::from_id).map(Gender::label),
                contact_number: row.contact_number,
            })
            .collect())
    }

    /// Full patient detail. Related lists are fetched concurrently after the main row.
    pub async fn get(&self, patient_id: i32) -> Result<PatientDetail> {
        let row = self
            .repository
            .find(patient_id)
            .await?
            .ok_or_else(patient_not_found)?;

        let (medical_conditions, medical_history, medications, last_session) = tokio::try_join!(
            self.repository
                .medical_labels(patient_id, MedicalLink::Condition),
            self.repository.medical_labels(patient_id, MedicalLink::History),
            self.repository.medications(patient_id),
            self.repository.last_session_date(patient_id),
        )?;

        let address = match (row.street_name, row.barangay_name, row.city_name) {
            (Some(street_name), Some(barangay_name), Some(city_name)) => {
                AddressView::Provided(AddressParts {
                    street_name,
                    barangay_name,
                    city_name,
                })
            }
            _ => AddressView::NOT_PROVIDED,
        };
        let gender = row.gender_id.and_then(Gender::from_id);
        let civil_status = row.status_id.and_then(CivilStatus::from_id);

        Ok(PatientDetail {
            id: row.patient_id,
            first_name: row.first_name,
            middle_name: row.middle_name,
            last_name: row.last_name,
            date_added: display_date(Some(row.date_added)),
            age: row.age,
            mobile: row.contact_number,
            address,
            birthdate: row.birthdate.map(|d| d.format("%Y-%m-%d").to_string()),
            occupation: row.occupation.unwrap_or_else(|| "Not provided".to_string()),
            gender: gender.map(Gender::label),
            gender_id: gender.map(Gender::id),
            civil_status: civil_status.map(CivilStatus::label),
            civil_status_id: civil_status.map(CivilStatus::id),
            company: row.company,
            medical_conditions,
            medical_history,
            medications,
            last_updated: display_date(Some(last_session.unwrap_or(row.date_added))),
        })
    }

    async fn ensure_exists(&self, patient_id: i32) -> Result<()> {
        if self.repository.exists(patient_id).await? {
            Ok(())
        } else {
            Err(patient_not_found())
        }
    }
}

fn patient_not_found() -> Error {
    Error::NotFound("Patient not found".to_string())
}

async fn insert_patient_records(
    conn: &mut PgConnection,
    patient: &NewPatient,
    today: NaiveDate,
) -> Result<i32> {
    let occupation_id = lookup::resolve(conn, LookupTable::OCCUPATION, &patient.occupation).await?;
    let address_id = address::resolve_address(conn, &patient.address, None).await?;
    let person_id = patients::insert_person(conn, patient, occupation_id, address_id).await?;
    let patient_id = patients::insert_patient(conn, person_id, today).await?;

    patients::link_labels(
        conn,
        patient_id,
        MedicalLink::Condition,
        &patient.medical_conditions,
    )
    .await?;
    patients::link_labels(
        conn,
        patient_id,
        MedicalLink::History,
        &patient.medical_history,
    )
    .await?;

    Ok(patient_id)
}

async fn update_patient_records(
    conn: &mut PgConnection,
    patient_id: i32,
    patient: &NewPatient,
) -> Result<()> {
    // The patient may have been deleted since the existence check.
    let person = patients::person_for_patient(conn, patient_id)
        .await?
        .ok_or_else(patient_not_found)?;

    let occupation_id = lookup::resolve(conn, LookupTable::OCCUPATION, &patient.occupation).await?;
    let address_id = address::resolve_address(conn, &patient.address, person.address_id).await?;
    patients::update_person(conn, person.person_id, patient, occupation_id, address_id).await?;

    if let Some(previous) = person.address_id.filter(|previous| *previous != address_id) {
        address::release_address(conn, previous).await?;
    }

    for (kind, labels) in [
        (MedicalLink::Condition, &patient.medical_conditions),
        (MedicalLink::History, &patient.medical_history),
    ] {
        patients::clear_links(conn, patient_id, kind).await?;
        patients::link_labels(conn, patient_id, kind, labels).await?;
    }

    Ok(())
}

async fn delete_patient_records(conn: &mut PgConnection, patient_id: i32) -> Result<()> {
    let person = patients::person_for_patient(conn, patient_id)
        .await?
        .ok_or_else(patient_not_found)?;

    patients::clear_links(conn, patient_id, MedicalLink::Condition).await?;
    patients::clear_links(conn, patient_id, MedicalLink::History).await?;
    patients::delete_tooth_chart(conn, patient_id).await?;
    let purge = sessions::delete_for_patient(conn, patient_id).await?;
    patients::delete_patient_row(conn, patient_id).await?;
    patients::delete_person(conn, person.person_id).await?;

    let reclaimed = match person.address_id {
        Some(address_id) => address::release_address(conn, address_id).await?,
        None => Default::default(),
    };

    tracing::debug!(
        patient_id,
        sessions = purge.sessions,
        services = purge.services,
        prescriptions = purge.prescriptions,
        addresses = reclaimed.addresses,
        barangays = reclaimed.barangays,
        cities = reclaimed.cities,
        "Removed patient records"
    );
    Ok(())
}
