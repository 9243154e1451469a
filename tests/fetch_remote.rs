// ===============================
// tests/fetch_remote.rs
// ===============================
use landed_margin::{fetch_remote_catalog, FetchError};
use wiremock::{matchers, Mock, MockServer, ResponseTemplate};

const PAGE: &str = r#"<html><body><script>
  var shippingSeedProducts = [
    { order: 1, ref: "SUN2000-10K-LC0", qty: 40, unitPriceUSD: 700 },
    { order: 2, ref: "LUNA2000-5-S0", qty: 60, unitPriceUSD: 1500 },
    { order: 3, ref: "sun2000-10k-lc0", qty: 100, unitPriceUSD: 1 },
  ];
  var exchangeRate = 1;
  var freightQuoteEUR = 2000;
</script></body></html>"#;

#[tokio::test(flavor = "multi_thread")]
async fn fetch_parses_page_and_sends_no_cache() {
    let server = MockServer::start().await;
    Mock::given(matchers::method("GET"))
        .and(matchers::path("/snapshot.html"))
        .and(matchers::header("cache-control", "no-cache"))
        .respond_with(ResponseTemplate::new(200).set_body_string(PAGE))
        .expect(1)
        .mount(&server)
        .await;

    let http = reqwest::Client::new();
    let url = format!("{}/snapshot.html", server.uri());
    let catalog = fetch_remote_catalog(&http, &url).await.unwrap();

    // 2000 / (40 + 60 + 100) = 10 per unit, duplikat ikut dihitung
    assert_eq!(catalog.len(), 2);
    assert_eq!(catalog[0].reference, "SUN2000-10K-LC0");
    assert_eq!(catalog[0].buy_price_unit, 710.0);
    assert_eq!(catalog[0].initial_stock, 40);
    assert_eq!(catalog[1].buy_price_unit, 1510.0);
}

#[tokio::test(flavor = "multi_thread")]
async fn non_success_status_is_fetch_error_with_code() {
    let server = MockServer::start().await;
    Mock::given(matchers::method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1) // single attempt, no retry
        .mount(&server)
        .await;

    let http = reqwest::Client::new();
    let err = fetch_remote_catalog(&http, &server.uri()).await.unwrap_err();
    assert!(matches!(err, FetchError::Status(503)));
    assert_eq!(err.status(), Some(503));
    assert!(err.to_string().contains("503"));
}

#[tokio::test(flavor = "multi_thread")]
async fn page_without_seed_block_is_empty_catalog() {
    let server = MockServer::start().await;
    Mock::given(matchers::method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let http = reqwest::Client::new();
    let catalog = fetch_remote_catalog(&http, &server.uri()).await.unwrap();
    assert!(catalog.is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn unreachable_host_is_transport_error() {
    let http = reqwest::Client::new();
    let err = fetch_remote_catalog(&http, "http://127.0.0.1:9/").await.unwrap_err();
    assert!(matches!(err, FetchError::Transport(_)));
}
