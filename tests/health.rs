use pos_backoffice::routes::health::health_check;

#[tokio::test]
async fn health_check_reports_service_identity() {
    let response = health_check().await;
    assert_eq!(response.0.message, "Service opérationnel");

    let data = response.0.data.expect("health data");
    assert_eq!(data.status, "ok");
    assert_eq!(data.service, "pos-backoffice");
    assert!(!data.version.is_empty());
}
