mod support;

use actix_web::http::StatusCode;
use actix_web::http::header;
use actix_web::{App, test, web};
use heartwise::patient::{NEGATIVE_LABEL, POSITIVE_LABEL, PredictionResult};
use heartwise::server::{self, ErrorBody, HealthStatus};
use serde_json::Value;
use support::fixtures::{example_record, predictor};

macro_rules! init_app {
    () => {
        test::init_service(
            App::new()
                .wrap(server::cors())
                .wrap(server::build_metrics("/metrics").expect("metrics middleware"))
                .app_data(web::Data::new(predictor()))
                .configure(server::configure),
        )
        .await
    };
}

#[actix_web::test]
async fn health_routes_report_healthy() {
    let app = init_app!();
    for path in ["/", "/health"] {
        let req = test::TestRequest::get().uri(path).to_request();
        let body: HealthStatus = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body.status, "healthy");
    }
}

#[actix_web::test]
async fn predict_returns_consistent_result() {
    let app = init_app!();
    let req = test::TestRequest::post()
        .uri("/predict")
        .set_json(example_record())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let result: PredictionResult = test::read_body_json(resp).await;
    assert_eq!(result.prediction, 1);
    assert_eq!(result.label, POSITIVE_LABEL);
    // sigmoid(2.0 * (3 - 1.5))
    assert!((result.confidence - 0.952_574).abs() < 1e-4);
}

#[actix_web::test]
async fn same_record_twice_gives_identical_response() {
    let app = init_app!();
    let mut record = example_record();
    record["cp"] = 0.into();
    let mut responses = Vec::new();
    for _ in 0..2 {
        let req = test::TestRequest::post()
            .uri("/predict")
            .set_json(&record)
            .to_request();
        let body: PredictionResult = test::call_and_read_body_json(&app, req).await;
        responses.push(body);
    }
    assert_eq!(responses[0], responses[1]);
    assert_eq!(responses[0].prediction, 0);
    assert_eq!(responses[0].label, NEGATIVE_LABEL);
    assert!((0.0..=1.0).contains(&responses[0].confidence));
}

#[actix_web::test]
async fn missing_field_is_a_validation_error() {
    let app = init_app!();
    for field in ["age", "thal", "oldpeak"] {
        let mut record = example_record();
        record
            .as_object_mut()
            .expect("record is an object")
            .remove(field);
        let req = test::TestRequest::post()
            .uri("/predict")
            .set_json(&record)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY, "field {field}");
        let body: ErrorBody = test::read_body_json(resp).await;
        assert!(body.detail.contains(field), "detail: {}", body.detail);
    }
}

#[actix_web::test]
async fn wrong_types_are_validation_errors() {
    let app = init_app!();
    let cases: [(&str, Value); 3] = [
        ("age", Value::from("sixty-three")),
        ("sex", Value::from(1.5)),
        ("ca", Value::Null),
    ];
    for (field, value) in cases {
        let mut record = example_record();
        record[field] = value;
        let req = test::TestRequest::post()
            .uri("/predict")
            .set_json(&record)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_client_error(), "field {field}");
    }
}

#[actix_web::test]
async fn whole_number_floats_are_accepted_for_integer_fields() {
    let app = init_app!();
    let mut record = example_record();
    record["age"] = Value::from(63.0);
    record["thalach"] = Value::from(150.0);
    let req = test::TestRequest::post()
        .uri("/predict")
        .set_json(&record)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: PredictionResult = test::read_body_json(resp).await;

    let req = test::TestRequest::post()
        .uri("/predict")
        .set_json(example_record())
        .to_request();
    let expected: PredictionResult = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body, expected);

    record["age"] = Value::from(63.5);
    let req = test::TestRequest::post()
        .uri("/predict")
        .set_json(&record)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: ErrorBody = test::read_body_json(resp).await;
    assert!(body.detail.contains("63.5"), "detail: {}", body.detail);
}

#[actix_web::test]
async fn float_values_beyond_f32_range_are_scored() {
    let app = init_app!();
    for (field, value) in [("oldpeak", 1e39), ("ca", 1e300), ("thal", -1e300)] {
        let mut record = example_record();
        record[field] = Value::from(value);
        let req = test::TestRequest::post()
            .uri("/predict")
            .set_json(&record)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK, "field {field}");
        let result: PredictionResult = test::read_body_json(resp).await;
        assert!((0.0..=1.0).contains(&result.confidence));
        assert_eq!(result.label, POSITIVE_LABEL);
    }
}

#[actix_web::test]
async fn metrics_endpoint_exposes_request_counters() {
    let app = init_app!();
    let req = test::TestRequest::get().uri("/health").to_request();
    test::call_service(&app, req).await;

    let req = test::TestRequest::get().uri("/metrics").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = test::read_body(resp).await;
    let text = String::from_utf8_lossy(&body);
    assert!(text.contains("heartwise_http_requests_total"));
}

#[actix_web::test]
async fn cors_allows_any_origin_with_credentials() {
    let app = init_app!();
    let req = test::TestRequest::get()
        .uri("/health")
        .insert_header((header::ORIGIN, "http://example.org"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let headers = resp.headers();
    assert_eq!(
        headers
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .and_then(|value| value.to_str().ok()),
        Some("http://example.org")
    );
    assert_eq!(
        headers
            .get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS)
            .and_then(|value| value.to_str().ok()),
        Some("true")
    );
}
