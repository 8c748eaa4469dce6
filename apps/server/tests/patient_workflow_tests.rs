#![allow(unused)]
//! Patient create/update/delete against a real database.

#[allow(unused)]
mod support;

use axum::http::{Method, StatusCode};
use happyteeth::db::{lookup, LookupTable};
use serde_json::json;
use support::*;

#[tokio::test]
async fn create_then_read_patient_detail() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let patient_id = app.add_patient(sample_patient_payload()).await?;

            let (status, body) = app
                .json(
                    Method::GET,
                    &format!("/api/get-patients?id={}", patient_id),
                    None,
                )
                .await?;
            assert_status(status, StatusCode::OK, "patient detail");

            let detail = &body["data"];
            assert_eq!(detail["id"], patient_id);
            assert_eq!(detail["firstName"], "Maria");
            assert_eq!(detail["lastName"], "Santos");
            assert_eq!(detail["gender"], "Female");
            assert_eq!(detail["genderId"], 1);
            assert_eq!(detail["civilStatus"], "Single");
            assert_eq!(detail["birthdate"], "1990-04-01");
            assert_eq!(detail["mobile"], "09171234567");
            assert_eq!(detail["occupation"], "Teacher");
            assert_eq!(
                detail["address"],
                json!({
                    "street_name": "12 Sampaguita St",
                    "barangay_name": "Batasan Hills",
                    "city_name": "Quezon City"
                })
            );
            assert_eq!(
                detail["medicalConditions"],
                json!(["Asthma", "Hypertension"])
            );
            assert_eq!(detail["medicalHistory"], json!(["Tooth extraction"]));
            assert_eq!(detail["medications"], json!([]));
            assert!(detail["age"].as_i64().unwrap_or_default() >= 35);

            let (status, body) = app.json(Method::GET, "/api/get-patients", None).await?;
            assert_status(status, StatusCode::OK, "patient list");
            let list = body["data"].as_array().cloned().unwrap_or_default();
            assert_eq!(list.len(), 1);
            assert_eq!(list[0]["contactNumber"], "09171234567");
            assert_eq!(list[0]["gender"], "Female");
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn missing_occupation_defaults_to_not_specified() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let mut payload = sample_patient_payload();
            payload["occupation"] = json!("");
            let patient_id = app.add_patient(payload).await?;

            let (_, body) = app
                .json(
                    Method::GET,
                    &format!("/api/get-patients?id={}", patient_id),
                    None,
                )
                .await?;
            assert_eq!(body["data"]["occupation"], "Not specified");
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn unknown_patient_is_not_found() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let (status, body) = app
                .json(Method::GET, "/api/get-patients?id=9999", None)
                .await?;
            assert_status(status, StatusCode::NOT_FOUND, "detail");
            assert_eq!(body["message"], "Patient not found");

            let mut payload = sample_patient_payload();
            payload["id"] = json!(9999);
            let (status, _) = app
                .json(Method::POST, "/api/update-patient", Some(payload))
                .await?;
            assert_status(status, StatusCode::NOT_FOUND, "update");

            let (status, _) = app
                .json(Method::POST, "/api/delete-patient?id=9999", None)
                .await?;
            assert_status(status, StatusCode::NOT_FOUND, "delete");
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn update_replaces_fields_and_medical_links() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let patient_id = app.add_patient(sample_patient_payload()).await?;

            let mut payload = sample_patient_payload();
            payload["id"] = json!(patient_id.to_string());
            payload["firstName"] = json!("Mariel");
            payload["civilStatus"] = json!("Married");
            payload["medicalConditions"] = json!(["Diabetes"]);
            payload["medicalHistory"] = json!([]);

            let (status, body) = app
                .json(Method::POST, "/api/update-patient", Some(payload))
                .await?;
            assert_status(status, StatusCode::OK, "update");
            assert_eq!(body["message"], "Patient updated successfully");
            assert_eq!(body["data"]["patientId"], patient_id);

            let (_, body) = app
                .json(
                    Method::GET,
                    &format!("/api/get-patients?id={}", patient_id),
                    None,
                )
                .await?;
            let detail = &body["data"];
            assert_eq!(detail["firstName"], "Mariel");
            assert_eq!(detail["civilStatus"], "Married");
            assert_eq!(detail["civilStatusId"], 1);
            assert_eq!(detail["medicalConditions"], json!(["Diabetes"]));
            assert_eq!(detail["medicalHistory"], json!([]));

            // Labels stay in the lookup table; only the links are replaced.
            assert_eq!(
                app.count("SELECT COUNT(*) FROM tbl_medical_condition_patient")
                    .await?,
                1
            );
            assert_eq!(
                app.count("SELECT COUNT(*) FROM tbl_medical_condition").await?,
                3
            );
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn moving_sole_resident_rewrites_address_in_place() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let patient_id = app.add_patient(sample_patient_payload()).await?;

            let mut payload = sample_patient_payload();
            payload["id"] = json!(patient_id);
            payload["address"] = json!({
                "city_name": "Pasig",
                "barangay_name": "Kapitolyo",
                "street_name": "3 Acacia Lane"
            });
            let (status, _) = app
                .json(Method::POST, "/api/update-patient", Some(payload))
                .await?;
            assert_status(status, StatusCode::OK, "move");

            assert_eq!(app.count("SELECT COUNT(*) FROM tbl_address").await?, 1);
            // The old barangay and city lost their only user.
            assert_eq!(app.count("SELECT COUNT(*) FROM tbl_barangay").await?, 1);
            assert_eq!(app.count("SELECT COUNT(*) FROM tbl_city").await?, 1);

            let (_, body) = app
                .json(
                    Method::GET,
                    &format!("/api/get-patients?id={}", patient_id),
                    None,
                )
                .await?;
            assert_eq!(body["data"]["address"]["city_name"], "Pasig");
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn shared_address_is_reused_and_survives_partial_delete() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let first = app.add_patient(sample_patient_payload()).await?;

            let mut sibling = sample_patient_payload();
            sibling["firstName"] = json!("Jose");
            sibling["gender"] = json!("Male");
            let second = app.add_patient(sibling).await?;

            assert_eq!(app.count("SELECT COUNT(*) FROM tbl_address").await?, 1);
            assert_eq!(app.count("SELECT COUNT(*) FROM tbl_occupation").await?, 1);

            let (status, body) = app
                .json(
                    Method::POST,
                    &format!("/api/delete-patient?id={}", first),
                    None,
                )
                .await?;
            assert_status(status, StatusCode::OK, "delete first");
            assert_eq!(
                body["message"],
                "Patient and all related data deleted successfully"
            );
            assert_eq!(app.count("SELECT COUNT(*) FROM tbl_address").await?, 1);
            assert_eq!(app.count("SELECT COUNT(*) FROM tbl_city").await?, 1);

            let (status, _) = app
                .json(
                    Method::POST,
                    &format!("/api/delete-patient?id={}", second),
                    None,
                )
                .await?;
            assert_status(status, StatusCode::OK, "delete second");
            assert_eq!(app.count("SELECT COUNT(*) FROM tbl_address").await?, 0);
            assert_eq!(app.count("SELECT COUNT(*) FROM tbl_barangay").await?, 0);
            assert_eq!(app.count("SELECT COUNT(*) FROM tbl_city").await?, 0);
            assert_eq!(app.count("SELECT COUNT(*) FROM tbl_person").await?, 0);
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn city_shared_by_other_barangay_is_kept() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let first = app.add_patient(sample_patient_payload()).await?;

            let mut neighbour = sample_patient_payload();
            neighbour["address"] = json!({
                "city_name": "Quezon City",
                "barangay_name": "Commonwealth",
                "street_name": "8 Ilang-Ilang St"
            });
            app.add_patient(neighbour).await?;

            let (status, _) = app
                .json(
                    Method::POST,
                    &format!("/api/delete-patient?id={}", first),
                    None,
                )
                .await?;
            assert_status(status, StatusCode::OK, "delete");

            assert_eq!(app.count("SELECT COUNT(*) FROM tbl_address").await?, 1);
            assert_eq!(app.count("SELECT COUNT(*) FROM tbl_barangay").await?, 1);
            assert_eq!(app.count("SELECT COUNT(*) FROM tbl_city").await?, 1);
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn delete_removes_sessions_and_charts() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let patient_id = app.add_patient(sample_patient_payload()).await?;
            let session_id = app.store_session(sample_session_payload(patient_id)).await?;

            let (status, _) = app
                .json(
                    Method::POST,
                    &format!("/api/delete-patient?id={}", patient_id),
                    None,
                )
                .await?;
            assert_status(status, StatusCode::OK, "delete");

            for table in [
                "tbl_session",
                "tbl_service",
                "tbl_prescription",
                "tbl_medication",
                "tbl_patient_tooth_chart",
                "tbl_medical_condition_patient",
                "tbl_medical_history_patient",
                "tbl_patient",
            ] {
                let remaining = app
                    .count(&format!("SELECT COUNT(*) FROM {}", table))
                    .await?;
                assert_eq!(remaining, 0, "rows left in {}", table);
            }

            let (status, body) = app
                .json(
                    Method::GET,
                    &format!("/api/session?sessionId={}", session_id),
                    None,
                )
                .await?;
            assert_status(status, StatusCode::NOT_FOUND, "deleted session");
            assert_eq!(body["message"], "Session not found");
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn failed_create_leaves_no_partial_rows() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let mut payload = sample_patient_payload();
            payload["medicalConditions"] = json!(["x".repeat(300)]);

            let (status, body) = app
                .json(Method::POST, "/api/add-patient", Some(payload))
                .await?;
            assert_status(status, StatusCode::INTERNAL_SERVER_ERROR, "oversized label");
            assert_eq!(body["success"], false);
            assert_eq!(body["message"], "Database error");

            for table in [
                "tbl_person",
                "tbl_patient",
                "tbl_address",
                "tbl_barangay",
                "tbl_city",
                "tbl_occupation",
            ] {
                let remaining = app
                    .count(&format!("SELECT COUNT(*) FROM {}", table))
                    .await?;
                assert_eq!(remaining, 0, "rows left in {}", table);
            }
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn lookup_labels_resolve_to_one_row() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let mut conn = app.state.db_pool.acquire().await?;
            let first = lookup::resolve(&mut *conn, LookupTable::OCCUPATION, "Dentist").await?;
            let second = lookup::resolve(&mut *conn, LookupTable::OCCUPATION, "Dentist").await?;
            assert_eq!(first, second);
            drop(conn);

            // Concurrent first-time resolution of one label still yields a single row.
            let mut left = app.state.db_pool.acquire().await?;
            let mut right = app.state.db_pool.acquire().await?;
            let (a, b) = tokio::try_join!(
                lookup::resolve(&mut *left, LookupTable::MEDICAL_HISTORY, "Root canal"),
                lookup::resolve(&mut *right, LookupTable::MEDICAL_HISTORY, "Root canal"),
            )?;
            assert_eq!(a, b);
            drop((left, right));

            assert_eq!(
                app.count("SELECT COUNT(*) FROM tbl_occupation WHERE occupation_title = 'Dentist'")
                    .await?,
                1
            );
            assert_eq!(
                app.count("SELECT COUNT(*) FROM tbl_medical_history").await?,
                1
            );
            Ok(())
        })
    })
    .await
}
