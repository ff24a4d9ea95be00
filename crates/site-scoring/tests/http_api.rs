mod common;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, Response, StatusCode};
use axum::Router;
use common::{multipart_body, multipart_content_type, read_workbook, sample_workbook, SAMPLE_CSV};
use serde_json::{json, Value};
use site_scoring::http::{scoring_router, ScoringState};
use tower::ServiceExt;

const BODY_LIMIT: usize = 4 * 1024 * 1024;

fn router() -> Router {
    scoring_router(ScoringState::default())
}

async fn send(request: Request<Body>) -> Response<Body> {
    router().oneshot(request).await.expect("router dispatch")
}

async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    to_bytes(response.into_body(), BODY_LIMIT)
        .await
        .expect("read body")
        .to_vec()
}

async fn body_json(response: Response<Body>) -> Value {
    serde_json::from_slice(&body_bytes(response).await).expect("json payload")
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .expect("request")
}

fn post_json(uri: &str, payload: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(payload.to_string()))
        .expect("request")
}

fn upload(uri: &str, field: &str, filename: &str, content: &[u8]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, multipart_content_type())
        .body(Body::from(multipart_body(field, filename, content)))
        .expect("request")
}

fn header_value(response: &Response<Body>, name: header::HeaderName) -> String {
    response
        .headers()
        .get(name)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

mod factors {
    use super::*;

    #[tokio::test]
    async fn product_factors_lists_schema() {
        let response = send(get("/product-factors/PV")).await;
        assert_eq!(response.status(), StatusCode::OK);

        let payload = body_json(response).await;
        let area = &payload["roof_area_sqm"];
        assert_eq!(area["type"], json!("numeric"));
        assert_eq!(area["min"], json!(50.0));
        assert_eq!(area["max"], json!(5000.0));
        assert_eq!(area["weight"], json!(0.3));
        assert_eq!(payload["roof_orientation_degrees"]["optimal_value"], json!(180.0));
        assert_eq!(payload.as_object().map(|map| map.len()), Some(5));
    }

    #[tokio::test]
    async fn unknown_product_is_not_found() {
        let response = send(get("/product-factors/unknown")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let payload = body_json(response).await;
        assert_eq!(payload, json!({ "detail": "Produkt 'unknown' nicht gefunden" }));
    }
}

mod manual {
    use super::*;

    #[tokio::test]
    async fn manual_entry_is_scored() {
        let response = send(post_json(
            "/score/manual",
            json!({
                "location_name": "Dach Nord",
                "product": "pv",
                "factors": {
                    "roof_area_sqm": 250,
                    "solar_irradiation": 1100,
                    "roof_orientation_degrees": 180,
                    "roof_tilt_degrees": 32,
                    "electricity_price_eur": 0.35,
                    "wind_speed": 7
                }
            }),
        ))
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let payload = body_json(response).await;
        assert_eq!(payload["location_name"], json!("Dach Nord"));
        assert_eq!(payload["product"], json!("pv"));
        assert_eq!(payload["score"], json!(53.7));
        assert_eq!(payload["factors_used"].as_object().map(|map| map.len()), Some(5));
        assert!(payload["factors_used"].get("wind_speed").is_none());
    }

    #[tokio::test]
    async fn manual_entry_with_unknown_product_is_rejected() {
        let response = send(post_json(
            "/score/manual",
            json!({ "location_name": "Feld", "product": "wind", "factors": {} }),
        ))
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let payload = body_json(response).await;
        let detail = payload["detail"].as_str().unwrap_or_default();
        assert!(detail.contains("wind"), "detail was {detail}");
    }

    #[tokio::test]
    async fn manual_entry_without_factors_is_rejected() {
        let response = send(post_json(
            "/score/manual",
            json!({ "location_name": "Feld", "product": "pv" }),
        ))
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(body_json(response).await.get("detail").is_some());
    }
}

mod uploads {
    use super::*;

    #[tokio::test]
    async fn csv_upload_returns_ranked_json() {
        let response = send(upload("/score/csv", "file", "standorte.csv", SAMPLE_CSV.as_bytes())).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(header_value(&response, header::CONTENT_TYPE).starts_with("application/json"));

        let payload = body_json(response).await;
        let rows = payload.as_array().expect("json array");
        let ids: Vec<i64> = rows
            .iter()
            .filter_map(|row| row["location_id"].as_i64())
            .collect();
        assert_eq!(ids, vec![2, 1, 5]);
        assert_eq!(rows[0]["score"], json!(100.0));
        assert_eq!(rows[1]["score"], json!(53.7));
        assert_eq!(rows[2]["location_name"], json!("Halle 7, Süd"));
    }

    #[tokio::test]
    async fn csv_upload_can_download_csv() {
        let response = send(upload(
            "/score/csv?format=csv",
            "file",
            "standorte.csv",
            SAMPLE_CSV.as_bytes(),
        ))
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let disposition = header_value(&response, header::CONTENT_DISPOSITION);
        assert!(disposition.starts_with("attachment; filename=\"standorte_scored_"));
        assert!(disposition.ends_with(".csv\""));

        let body = String::from_utf8(body_bytes(response).await).expect("utf-8 csv");
        let mut lines = body.lines();
        assert!(lines
            .next()
            .unwrap_or_default()
            .starts_with("location_id,location_name,product,score"));
        assert!(lines.next().unwrap_or_default().starts_with("2,Parkhaus Mitte,charging,100"));
    }

    #[tokio::test]
    async fn workbook_upload_returns_annotated_workbook() {
        let response = send(upload("/score/csv", "file", "standorte.xlsx", &sample_workbook())).await;
        assert_eq!(response.status(), StatusCode::OK);

        let disposition = header_value(&response, header::CONTENT_DISPOSITION);
        assert!(disposition.contains("standorte_scored_"));
        assert!(disposition.ends_with(".xlsx\""));

        let sheets = read_workbook(body_bytes(response).await);
        let names: Vec<&str> = sheets.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, vec!["PV", "Speicher"]);
    }

    #[tokio::test]
    async fn unknown_output_format_is_rejected() {
        let response = send(upload(
            "/score/csv?format=pdf",
            "file",
            "standorte.csv",
            SAMPLE_CSV.as_bytes(),
        ))
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn upload_without_file_field_is_rejected() {
        let response = send(upload("/score/csv", "attachment", "standorte.csv", SAMPLE_CSV.as_bytes())).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await,
            json!({ "detail": "Keine Datei hochgeladen" })
        );
    }

    #[tokio::test]
    async fn request_without_multipart_body_is_rejected() {
        let response = send(post_json("/score/csv", json!({}))).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await,
            json!({ "detail": "Keine Datei hochgeladen" })
        );
    }

    #[tokio::test]
    async fn unsupported_extension_is_rejected() {
        let response = send(upload("/score/csv", "file", "standorte.txt", SAMPLE_CSV.as_bytes())).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let payload = body_json(response).await;
        assert_eq!(
            payload["detail"],
            json!("Ungültiges Dateiformat. Bitte CSV oder Excel (.xlsx, .xls) hochladen.")
        );
    }

    #[tokio::test]
    async fn empty_file_is_rejected() {
        let response = send(upload("/score/csv", "file", "leer.csv", b"")).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await, json!({ "detail": "Die Datei ist leer" }));
    }

    #[tokio::test]
    async fn oversized_upload_is_refused() {
        let state = ScoringState {
            max_upload_bytes: 64,
            ..ScoringState::default()
        };
        let response = scoring_router(state)
            .oneshot(upload("/score/csv", "file", "standorte.csv", SAMPLE_CSV.as_bytes()))
            .await
            .expect("router dispatch");
        assert!(response.status().is_client_error());
    }
}

mod templates {
    use super::*;

    #[tokio::test]
    async fn csv_template_downloads_with_examples() {
        let response = send(get("/template/csv")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            header_value(&response, header::CONTENT_DISPOSITION),
            "attachment; filename=\"standort_template.csv\""
        );

        let body = String::from_utf8(body_bytes(response).await).expect("utf-8 csv");
        assert!(body.starts_with("location_id,location_name,product"));
        assert_eq!(body.lines().count(), 4);
    }

    #[tokio::test]
    async fn excel_template_has_product_and_info_sheets() {
        let response = send(get("/template/excel")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            header_value(&response, header::CONTENT_DISPOSITION),
            "attachment; filename=\"Standort_Scoring_Template.xlsx\""
        );

        let sheets = read_workbook(body_bytes(response).await);
        let names: Vec<&str> = sheets.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, vec!["PV", "Storage", "Charging", "Info"]);
    }

    #[tokio::test]
    async fn seeded_mock_is_stable() {
        let first = body_bytes(send(get("/template/mock?seed=1")).await).await;
        let second = body_bytes(send(get("/template/mock?seed=1")).await).await;

        let first = read_workbook(first);
        let second = read_workbook(second);
        assert_eq!(first, second);
        assert_eq!(first.len(), 3);
    }

    #[tokio::test]
    async fn invalid_seed_is_rejected() {
        let response = send(get("/template/mock?seed=-4")).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await,
            json!({ "detail": "seed muss eine positive ganze Zahl sein" })
        );
    }
}
