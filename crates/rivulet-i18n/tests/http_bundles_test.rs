#![allow(clippy::unwrap_used)]
// Integration tests for `LocaleResolver` over `HttpBundles` using wiremock.

use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use rivulet_i18n::{BundleSource, HttpBundles, I18nError, LocaleResolver, ResolverConfig};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> MockServer {
    let server = MockServer::start().await;
    mount_bundle(&server, "/locales/en/translation.json", json!({"GREETING": "Hello"})).await;
    mount_bundle(&server, "/locales/de/translation.json", json!({"GREETING": "Hallo"})).await;
    server
}

async fn mount_bundle(server: &MockServer, at: &str, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(at))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

fn resolver(server: &MockServer, config: ResolverConfig) -> LocaleResolver<HttpBundles> {
    let base_uri = format!("{}/locales/", server.uri());
    let source = HttpBundles::new(&base_uri).unwrap();
    LocaleResolver::new(
        source,
        ResolverConfig {
            base_uri,
            ..config
        },
    )
}

// ── Source tests ────────────────────────────────────────────────────

#[tokio::test]
async fn test_fetch_builds_url_from_trimmed_base() {
    let server = setup().await;
    let source = HttpBundles::new(&format!("{}/locales///", server.uri())).unwrap();

    assert_eq!(
        source.bundle_url("en", "translation").unwrap().path(),
        "/locales/en/translation.json"
    );
    let bundle = source.fetch("en", "translation").await.unwrap().unwrap();
    assert_eq!(bundle.to_json(), json!({"GREETING": "Hello"}));
}

#[tokio::test]
async fn test_non_success_status_is_absent() {
    let server = setup().await;
    Mock::given(method("GET"))
        .and(path("/locales/xx/translation.json"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    let source = HttpBundles::new(&format!("{}/locales", server.uri())).unwrap();

    assert!(source.fetch("fr", "translation").await.unwrap().is_none());
    assert!(source.fetch("xx", "translation").await.unwrap().is_none());
}

#[tokio::test]
async fn test_non_object_body_is_invalid() {
    let server = setup().await;
    mount_bundle(&server, "/locales/en/list.json", json!(["not", "a", "map"])).await;
    let source = HttpBundles::new(&format!("{}/locales", server.uri())).unwrap();

    let result = source.fetch("en", "list").await;
    assert!(
        matches!(result, Err(I18nError::InvalidBundle { .. })),
        "expected InvalidBundle, got: {result:?}"
    );
}

#[test]
fn test_invalid_base_uri_is_rejected() {
    let result = HttpBundles::new("not a uri");
    assert!(matches!(result, Err(I18nError::InvalidUrl(_))));

    let result = HttpBundles::new("mailto:translations@example.com");
    assert!(matches!(result, Err(I18nError::NotABase { .. })));
}

#[test]
fn test_bundle_url_encodes_segments() {
    let source = HttpBundles::new("https://cdn.example.com/locales/").unwrap();

    let url = source.bundle_url("de#x", "trans?lation").unwrap();
    assert_eq!(url.path(), "/locales/de%23x/trans%3Flation.json");
    assert!(url.fragment().is_none());
    assert!(url.query().is_none());

    let root = HttpBundles::new("https://cdn.example.com").unwrap();
    assert_eq!(root.bundle_url("en", "translation").unwrap().path(), "/en/translation.json");

    assert!(matches!(
        source.bundle_url("..", "translation"),
        Err(I18nError::InvalidSegment { .. })
    ));
    assert!(matches!(
        source.bundle_url("en", "a/b"),
        Err(I18nError::InvalidSegment { .. })
    ));
}

// ── Resolver tests ──────────────────────────────────────────────────

#[tokio::test]
async fn test_select_region_falls_back_to_parent() {
    let server = setup().await;
    let resolver = resolver(&server, ResolverConfig::default());

    let t = resolver.select("de_AT").await;
    assert_eq!(t.t("GREETING", None), "Hallo");
    assert_eq!(resolver.config().base_uri, format!("{}/locales", server.uri()));
}

#[tokio::test]
async fn test_select_unknown_language_falls_back_to_default() {
    let server = setup().await;
    let resolver = resolver(&server, ResolverConfig::default());

    let t = resolver.select("fr").await;
    assert_eq!(t.t("GREETING", None), "Hello");
    assert_eq!(t.t("NOPE", None), "NOPE");
}

#[tokio::test]
async fn test_missing_namespace_degrades_to_key() {
    let server = setup().await;
    let resolver = resolver(
        &server,
        ResolverConfig::default().with_namespaces(["translation", "missing"]),
    );

    let t = resolver.select("en").await;
    assert_eq!(t.t("GREETING", None), "Hello");
    assert_eq!(t.t("GREETING", Some("missing")), "GREETING");
}

#[tokio::test]
async fn test_cached_bundles_are_fetched_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/locales/en/translation.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"GREETING": "Hello"})))
        .expect(1)
        .mount(&server)
        .await;
    let resolver = resolver(&server, ResolverConfig::default());

    resolver.select("en").await;
    resolver.select("en").await;
    resolver.reload().await;
    assert_eq!(resolver.translate("GREETING", None), "Hello");
}

#[tokio::test]
async fn test_caching_disabled_fetches_every_time() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/locales/en/translation.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"GREETING": "Hello"})))
        .expect(2)
        .mount(&server)
        .await;
    let resolver = resolver(&server, ResolverConfig::default().with_caching(false));

    resolver.select("en").await;
    resolver.select("en").await;
}

#[tokio::test]
async fn test_unreachable_server_degrades_to_keys() {
    let server = MockServer::start().await;
    let base_uri = format!("{}/locales", server.uri());
    drop(server);

    let resolver = LocaleResolver::new(
        HttpBundles::new(&base_uri).unwrap(),
        ResolverConfig::new(&base_uri),
    );
    let t = resolver.select("de").await;
    assert_eq!(t.t("GREETING", None), "GREETING");
    assert!(!t.is_placeholder());
}
