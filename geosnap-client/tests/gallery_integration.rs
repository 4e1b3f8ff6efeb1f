//! Gallery listing and deferred-load integration tests against a mock
//! gallery service.

use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use geosnap_client::{ClientError, GalleryApi, GalleryView, ListQuery};
use geosnap_core::{
    AdaptiveLoader, Geotag, LoadState, ManualVisibilityTracker, Region, VisibilityOptions,
};

fn image_body(server: &MockServer, name: &str, latitude: f64, longitude: f64) -> serde_json::Value {
    json!({
        "url": format!("{}/static/{name}", server.uri()),
        "latitude": latitude,
        "longitude": longitude,
        "filename": name
    })
}

#[tokio::test]
async fn refresh_replaces_the_item_list_wholesale() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/images"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            image_body(&server, "a.png", 51.5, -0.1),
            image_body(&server, "b.png", 48.85, 2.35),
        ])))
        .mount(&server)
        .await;

    let api = GalleryApi::new(&server.uri()).expect("api");
    let mut view = GalleryView::new();
    assert!(view.is_empty());

    view.refresh(&api, ListQuery::default()).await.expect("refresh");
    assert_eq!(view.len(), 2);
    assert_eq!(view.items()[0].filename.as_deref(), Some("a.png"));
}

#[tokio::test]
async fn failed_refresh_retains_the_prior_list() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/images"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            image_body(&server, "a.png", 51.5, -0.1),
        ])))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/images"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let api = GalleryApi::new(&server.uri()).expect("api");
    let mut view = GalleryView::new();

    view.refresh(&api, ListQuery::default()).await.expect("first refresh");
    assert_eq!(view.len(), 1);

    view.refresh(&api, ListQuery::default())
        .await
        .expect_err("service down");
    assert_eq!(view.len(), 1, "prior list must survive a failed refresh");
}

#[tokio::test]
async fn pagination_parameters_are_forwarded() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/images"))
        .and(query_param("skip", "20"))
        .and(query_param("limit", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let api = GalleryApi::new(&server.uri()).expect("api");
    let query = ListQuery {
        skip: Some(20),
        limit: Some(10),
    };
    let items = api.list_images(query).await.expect("list");
    assert!(items.is_empty());
}

#[tokio::test]
async fn nearby_search_forwards_position_and_radius() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/images/nearby"))
        .and(query_param("latitude", "51.5"))
        .and(query_param("longitude", "-0.1"))
        .and(query_param("max_distance", "25"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            image_body(&server, "close.png", 51.49, -0.11),
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let api = GalleryApi::new(&server.uri()).expect("api");
    let items = api
        .nearby_images(Geotag::new(51.5, -0.1), 25.0)
        .await
        .expect("nearby");
    assert_eq!(items.len(), 1);
}

#[tokio::test]
async fn delete_targets_the_stored_filename() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/images/a.png"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "success",
            "message": "Image deleted"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let api = GalleryApi::new(&server.uri()).expect("api");
    api.delete_image("a.png").await.expect("delete");
}

#[tokio::test]
async fn malformed_payload_surfaces_as_json_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/images"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&server)
        .await;

    let api = GalleryApi::new(&server.uri()).expect("api");
    let err = api
        .list_images(ListQuery::default())
        .await
        .expect_err("unparseable payload");
    assert!(matches!(err, ClientError::Json(_)));
}

#[tokio::test]
async fn health_probe_parses_the_report() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "healthy",
            "database": "connected"
        })))
        .mount(&server)
        .await;

    let api = GalleryApi::new(&server.uri()).expect("api");
    let report = api.health().await.expect("health");
    assert_eq!(report.status, "healthy");
    assert_eq!(report.database, "connected");
}

/// End-to-end deferred load: an item is registered Pending, its raster is
/// fetched only after its placeholder becomes visible, and the fetch fires
/// at most once.
#[tokio::test]
async fn raster_fetch_is_deferred_until_visibility() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/images"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            image_body(&server, "a.png", 51.5, -0.1),
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/static/a.png"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0x89, b'P', b'N', b'G']))
        .expect(1)
        .mount(&server)
        .await;

    let api = GalleryApi::new(&server.uri()).expect("api");
    let mut view = GalleryView::new();
    view.refresh(&api, ListQuery::default()).await.expect("refresh");

    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let tracker = ManualVisibilityTracker::new(tx);
    let mut loader = AdaptiveLoader::with_options(VisibilityOptions::default());

    let id = loader.observe(
        &view.items()[0],
        Region {
            x: 0.0,
            y: 600.0,
            width: 320.0,
            height: 240.0,
        },
        &tracker,
    );
    assert_eq!(loader.state(id), Some(LoadState::Pending));

    // Nothing is fetched until the placeholder crosses into view.
    assert!(tracker.cross(id));
    let crossed = rx.recv().await.expect("crossing event");
    let request = loader.notify_visible(crossed).expect("fetch request");

    let bytes = api.fetch_image_bytes(&request.url).await.expect("fetch");
    assert_eq!(&bytes[..4], b"\x89PNG");
    assert!(loader.notify_loaded(request.id));
    assert_eq!(loader.state(request.id), Some(LoadState::Displayed));

    // A repeat crossing must not produce a second fetch.
    assert!(loader.notify_visible(request.id).is_none());
}
