//! End-to-end tests of the `/portafolio` routes over the in-memory store.

mod common;

use axum::http::{Method, StatusCode};
use rstest::rstest;
use rust_decimal::{Decimal, dec};
use serde_json::json;

use common::{create_entry, create_test_app, parse, send};
use hptu_portafolio::portafolio::PortafolioEntry;

fn tarifa_of(value: serde_json::Value) -> Option<Decimal> {
    parse::<PortafolioEntry>(value).tarifa_2025_bo
}

// =============================================================================
// CRUD
// =============================================================================

#[rstest]
#[tokio::test]
async fn create_then_get_returns_same_fields() {
    let app = create_test_app();
    let body = json!({
        "codigoHPTU": "ABC-123",
        "grupoConcepto": "G1",
        "descripcionGrupoConcepto": "Consultas",
        "conceptoHPTU": "C-01",
        "descripcionHPTU": "Consulta de primera vez",
        "tarifa2025BO": 100,
        "aseguradora": "BO",
        "codigoReps3100": "REPS-1",
        "observacionATerceros": "Ninguna",
        "incluye": "Honorarios"
    });

    let created = create_entry(&app, body).await;
    let (status, fetched) = send(&app, Method::GET, "/portafolio/ABC-123", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);

    let entry: PortafolioEntry = parse(fetched);
    assert_eq!(entry.codigo_hptu, "ABC-123");
    assert_eq!(entry.grupo_concepto.as_deref(), Some("G1"));
    assert_eq!(entry.codigo_reps_3100.as_deref(), Some("REPS-1"));
    assert_eq!(entry.observacion_a_terceros.as_deref(), Some("Ninguna"));
    assert_eq!(entry.tarifa_2025_bo, Some(dec!(100)));
    assert_eq!(entry.excluye, None);
}

#[rstest]
#[tokio::test]
async fn duplicate_code_is_rejected() {
    let app = create_test_app();
    create_entry(&app, json!({ "codigoHPTU": "ABC-123" })).await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/portafolio",
        Some(json!({ "codigoHPTU": "ABC-123" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "DUPLICATE_KEY");
}

#[rstest]
#[case(json!({ "grupoConcepto": "G1" }))]
#[case(json!({ "codigoHPTU": "   " }))]
#[case(json!({ "codigoHPTU": "X", "tarifa2025BO": "cien" }))]
#[tokio::test]
async fn invalid_create_body_is_rejected(#[case] body: serde_json::Value) {
    let app = create_test_app();
    let (status, error) = send(&app, Method::POST, "/portafolio", Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["code"], "VALIDATION_ERROR");

    let (_, all) = send(&app, Method::GET, "/portafolio", None).await;
    assert_eq!(all, json!([]));
}

#[rstest]
#[tokio::test]
async fn create_with_tariff_outside_column_range_is_rejected() {
    let app = create_test_app();
    let body = json!({ "codigoHPTU": "BIG", "tarifa2025BO": 12345678901234567.89 });
    let (status, error) = send(&app, Method::POST, "/portafolio", Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["code"], "INVALID_VALUE");

    let (status, _) = send(&app, Method::GET, "/portafolio/BIG", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[rstest]
#[tokio::test]
async fn create_accepts_largest_storable_tariff() {
    let app = create_test_app();
    create_entry(&app, json!({ "codigoHPTU": "MAX", "tarifa2025BO": "999999999999.99" })).await;
    create_entry(&app, json!({ "codigoHPTU": "MIN", "tarifa2025BO": "-999999999999.99" })).await;
}

#[rstest]
#[tokio::test]
async fn list_returns_every_entry() {
    let app = create_test_app();
    create_entry(&app, json!({ "codigoHPTU": "B" })).await;
    create_entry(&app, json!({ "codigoHPTU": "A" })).await;

    let (status, body) = send(&app, Method::GET, "/portafolio", None).await;
    assert_eq!(status, StatusCode::OK);
    let entries: Vec<PortafolioEntry> = parse(body);
    let codes: Vec<_> = entries.iter().map(|e| e.codigo_hptu.as_str()).collect();
    assert_eq!(codes, ["A", "B"]);
}

#[rstest]
#[tokio::test]
async fn missing_code_is_not_found() {
    let app = create_test_app();
    let (status, body) = send(&app, Method::GET, "/portafolio/NOPE", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
    assert_eq!(body["message"], "Registro con código NOPE no encontrado");
}

#[rstest]
#[tokio::test]
async fn update_applies_only_provided_fields() {
    let app = create_test_app();
    create_entry(
        &app,
        json!({
            "codigoHPTU": "ABC-123",
            "grupoConcepto": "G1",
            "incluye": "Todo",
            "tarifa2025BO": 100
        }),
    )
    .await;

    let (status, body) = send(
        &app,
        Method::PUT,
        "/portafolio/ABC-123",
        Some(json!({ "codigoHPTU": "HACKED", "incluye": null, "aseguradora": "BO" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let entry: PortafolioEntry = parse(body);
    assert_eq!(entry.codigo_hptu, "ABC-123");
    assert_eq!(entry.incluye, None);
    assert_eq!(entry.aseguradora.as_deref(), Some("BO"));
    assert_eq!(entry.grupo_concepto.as_deref(), Some("G1"));
    assert_eq!(entry.tarifa_2025_bo, Some(dec!(100)));

    let (status, _) = send(&app, Method::GET, "/portafolio/HACKED", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[rstest]
#[tokio::test]
async fn update_with_tariff_outside_column_range_leaves_entry_untouched() {
    let app = create_test_app();
    create_entry(&app, json!({ "codigoHPTU": "ABC-123", "tarifa2025BO": 100 })).await;

    let (status, error) = send(
        &app,
        Method::PUT,
        "/portafolio/ABC-123",
        Some(json!({ "tarifa2025BO": -1e13, "incluye": "x" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["code"], "INVALID_VALUE");

    let (_, body) = send(&app, Method::GET, "/portafolio/ABC-123", None).await;
    let entry: PortafolioEntry = parse(body);
    assert_eq!(entry.tarifa_2025_bo, Some(dec!(100)));
    assert_eq!(entry.incluye, None);
}

#[rstest]
#[tokio::test]
async fn update_missing_code_is_not_found() {
    let app = create_test_app();
    let (status, _) = send(
        &app,
        Method::PUT,
        "/portafolio/NOPE",
        Some(json!({ "incluye": "x" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[rstest]
#[tokio::test]
async fn delete_then_get_is_not_found() {
    let app = create_test_app();
    create_entry(&app, json!({ "codigoHPTU": "ABC-123" })).await;

    let (status, removed) = send(&app, Method::DELETE, "/portafolio/ABC-123", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(removed["codigoHPTU"], "ABC-123");

    let (status, _) = send(&app, Method::GET, "/portafolio/ABC-123", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, Method::DELETE, "/portafolio/ABC-123", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[rstest]
#[tokio::test]
async fn list_by_group_filters_and_may_be_empty() {
    let app = create_test_app();
    create_entry(&app, json!({ "codigoHPTU": "A", "grupoConcepto": "G1" })).await;
    create_entry(&app, json!({ "codigoHPTU": "B", "grupoConcepto": "G2" })).await;

    let (status, body) = send(&app, Method::GET, "/portafolio/grupo/G1", None).await;
    assert_eq!(status, StatusCode::OK);
    let entries: Vec<PortafolioEntry> = parse(body);
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].codigo_hptu, "A");

    let (status, body) = send(&app, Method::GET, "/portafolio/grupo/G9", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

// =============================================================================
// Tariff adjustment
// =============================================================================

#[rstest]
#[tokio::test]
async fn single_tariff_adjustment_sequence() {
    let app = create_test_app();
    create_entry(&app, json!({ "codigoHPTU": "ABC-123", "tarifa2025BO": 100 })).await;

    let steps = [
        ("percentage", "10", dec!(110.00)),
        ("fixed", "-10", dec!(100.00)),
        ("overwrite", "50", dec!(50.00)),
    ];
    for (mode, value, expected) in steps {
        let uri = format!("/portafolio/ABC-123/tarifa?mode={mode}&value={value}");
        let (status, body) = send(&app, Method::PATCH, &uri, None).await;
        assert_eq!(status, StatusCode::OK, "{mode} {value}: {body}");
        assert_eq!(tarifa_of(body), Some(expected));
    }

    let (_, body) = send(&app, Method::GET, "/portafolio/ABC-123", None).await;
    assert_eq!(tarifa_of(body), Some(dec!(50.00)));
}

#[rstest]
#[tokio::test]
async fn absent_tariff_counts_as_zero() {
    let app = create_test_app();
    create_entry(&app, json!({ "codigoHPTU": "NEW" })).await;

    let (status, body) = send(
        &app,
        Method::PATCH,
        "/portafolio/NEW/tarifa?mode=fixed&value=5",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(tarifa_of(body), Some(dec!(5)));
}

#[rstest]
#[tokio::test]
async fn group_tariff_adjustment_updates_all_members() {
    let app = create_test_app();
    create_entry(
        &app,
        json!({ "codigoHPTU": "A", "grupoConcepto": "G1", "tarifa2025BO": 100 }),
    )
    .await;
    create_entry(
        &app,
        json!({ "codigoHPTU": "B", "grupoConcepto": "G1", "tarifa2025BO": 200 }),
    )
    .await;
    create_entry(
        &app,
        json!({ "codigoHPTU": "C", "grupoConcepto": "G2", "tarifa2025BO": 300 }),
    )
    .await;

    let (status, body) = send(
        &app,
        Method::PATCH,
        "/portafolio/grupo/G1/tarifa?mode=fixed&value=10",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let updated: Vec<PortafolioEntry> = parse(body);
    assert_eq!(updated.len(), 2);

    for (code, expected) in [("A", dec!(110)), ("B", dec!(210)), ("C", dec!(300))] {
        let (_, body) = send(&app, Method::GET, &format!("/portafolio/{code}"), None).await;
        assert_eq!(tarifa_of(body), Some(expected), "code {code}");
    }
}

#[rstest]
#[tokio::test]
async fn group_adjustment_on_unknown_group_is_not_found() {
    let app = create_test_app();
    let (status, body) = send(
        &app,
        Method::PATCH,
        "/portafolio/grupo/G404/tarifa?mode=fixed&value=10",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "No se encontraron registros para el grupo G404");
}

#[rstest]
#[tokio::test]
async fn adjustment_on_unknown_code_is_not_found() {
    let app = create_test_app();
    let (status, _) = send(
        &app,
        Method::PATCH,
        "/portafolio/NOPE/tarifa?mode=fixed&value=10",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[rstest]
#[case("mode=Percentage&value=10", "INVALID_MODE")]
#[case("mode=increase&value=10", "INVALID_MODE")]
#[case("value=10", "INVALID_MODE")]
#[case("mode=fixed", "INVALID_VALUE")]
#[case("mode=fixed&value=", "INVALID_VALUE")]
#[case("mode=fixed&value=abc", "INVALID_VALUE")]
#[case("mode=fixed&value=NaN", "INVALID_VALUE")]
#[case("mode=fixed&value=Infinity", "INVALID_VALUE")]
#[case("mode=overwrite&value=12345678901234567.89", "INVALID_VALUE")]
#[case("mode=fixed&value=999999999999", "INVALID_VALUE")]
#[case("mode=percentage&value=1e12", "INVALID_VALUE")]
#[tokio::test]
async fn invalid_adjustment_query_leaves_tariff_untouched(#[case] query: &str, #[case] code: &str) {
    let app = create_test_app();
    create_entry(
        &app,
        json!({ "codigoHPTU": "A", "grupoConcepto": "G1", "tarifa2025BO": 100 }),
    )
    .await;

    for uri in [
        format!("/portafolio/A/tarifa?{query}"),
        format!("/portafolio/grupo/G1/tarifa?{query}"),
    ] {
        let (status, body) = send(&app, Method::PATCH, &uri, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body["code"], code, "{uri}");
    }

    let (_, body) = send(&app, Method::GET, "/portafolio/A", None).await;
    assert_eq!(tarifa_of(body), Some(dec!(100)));
}

#[rstest]
#[tokio::test]
async fn invalid_mode_is_reported_before_unknown_code() {
    let app = create_test_app();
    let (status, body) = send(
        &app,
        Method::PATCH,
        "/portafolio/NOPE/tarifa?mode=bogus&value=1",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_MODE");
}

#[rstest]
#[tokio::test]
async fn health_reports_ok() {
    let app = create_test_app();
    let (status, body) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}
