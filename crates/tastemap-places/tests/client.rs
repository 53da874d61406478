//! Integration tests for `BaiduMapsClient` and `PlaceLookup` using wiremock
//! HTTP mocks.

use std::time::Duration;

use tastemap_core::{Coordinates, SortKey};
use tastemap_places::{BaiduMapsClient, PlaceCache, PlaceLookup, PlacesError, SearchRequest};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(base_url: &str) -> BaiduMapsClient {
    BaiduMapsClient::with_base_url("test-key", 30, base_url)
        .expect("client construction should not fail")
        .with_retry(2, 0)
}

fn detail_body(uid: &str, name: &str) -> serde_json::Value {
    serde_json::json!({
        "status": 0,
        "message": "ok",
        "result": {
            "uid": uid,
            "name": name,
            "address": "王府井大街1号",
            "location": {"lat": 39.914, "lng": 116.410},
            "detail_info": {
                "tag": "美食;火锅",
                "overall_rating": "4.6",
                "price": "110",
                "groupon_num": 2
            }
        }
    })
}

#[tokio::test]
async fn geocode_returns_location() {
    let server = MockServer::start().await;

    let body = serde_json::json!({
        "status": 0,
        "result": {
            "location": {"lng": 116.4074, "lat": 39.9042},
            "precise": 1,
            "confidence": 80,
            "level": "城市"
        }
    });

    Mock::given(method("GET"))
        .and(path("/geocoding/v3/"))
        .and(query_param("ak", "test-key"))
        .and(query_param("output", "json"))
        .and(query_param("address", "北京市"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let location = client.geocode("北京市").await.expect("should geocode");

    assert!((location.lat - 39.9042).abs() < 1e-9);
    assert!((location.lng - 116.4074).abs() < 1e-9);
}

#[tokio::test]
async fn geocode_without_match_is_not_found() {
    let server = MockServer::start().await;

    let body = serde_json::json!({"status": 1, "msg": "Internal Service Error:无相关结果", "results": []});

    Mock::given(method("GET"))
        .and(path("/geocoding/v3/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.geocode("nowhere at all").await.unwrap_err();

    assert!(matches!(err, PlacesError::NotFound(_)), "got {err:?}");
}

#[tokio::test]
async fn search_nearby_sends_filter_and_returns_places() {
    let server = MockServer::start().await;

    let body = serde_json::json!({
        "status": 0,
        "message": "ok",
        "total": 2,
        "results": [
            {
                "uid": "u1",
                "name": "海底捞",
                "location": {"lat": 39.905, "lng": 116.408},
                "detail_info": {"tag": "美食;火锅", "overall_rating": "4.8"}
            },
            {
                "uid": "u2",
                "name": "小肥羊",
                "location": {"lat": 39.906, "lng": 116.409},
                "detail_info": {"tag": "美食;火锅", "overall_rating": 4.2}
            }
        ]
    });

    Mock::given(method("GET"))
        .and(path("/place/v2/search"))
        .and(query_param("query", "火锅"))
        .and(query_param("location", "39.9042,116.4074"))
        .and(query_param("radius", "1000"))
        .and(query_param("scope", "2"))
        .and(query_param("page_size", "15"))
        .and(query_param(
            "filter",
            "industry_type:cater|sort_name:overall_rating|sort_rule:0",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let mut request = SearchRequest::new("火锅", Coordinates::new(39.9042, 116.4074), 1000);
    request.page_size = 15;
    request.sort = SortKey::Rating;

    let results = client.search_nearby(&request).await.expect("should search");

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].uid.as_deref(), Some("u1"));
    assert_eq!(
        results[1].detail_info.as_ref().and_then(|d| d.overall_rating),
        Some(4.2)
    );
}

#[tokio::test]
async fn search_nearby_with_zero_results_is_empty_not_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/place/v2/search"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"status": 0, "message": "ok", "total": 0, "results": []})),
        )
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let request = SearchRequest::new("不存在的菜", Coordinates::new(39.9, 116.4), 500);
    let results = client.search_nearby(&request).await.expect("empty is fine");
    assert!(results.is_empty());
}

#[tokio::test]
async fn search_nearby_no_result_status_is_empty_not_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/place/v2/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            serde_json::json!({"status": 1, "message": "Internal Service Error:无相关结果"}),
        ))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let request = SearchRequest::new("不存在的菜", Coordinates::new(39.9, 116.4), 500);
    let results = client
        .search_nearby(&request)
        .await
        .expect("no-result status is an empty page");
    assert!(results.is_empty());
}

#[tokio::test]
async fn search_nearby_forwards_category_tag() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/place/v2/search"))
        .and(query_param("tag", "火锅"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"status": 0, "results": []})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let mut request = SearchRequest::new("火锅", Coordinates::new(39.9, 116.4), 1000);
    request.tag = Some("火锅".to_string());
    client.search_nearby(&request).await.expect("search");
}

#[tokio::test]
async fn upstream_radius_is_capped() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/place/v2/search"))
        .and(query_param("radius", "50000"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"status": 0, "results": []})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let request = SearchRequest::new("餐厅", Coordinates::new(39.9, 116.4), 80_000);
    client.search_nearby(&request).await.expect("should search");
}

#[tokio::test]
async fn quota_exhaustion_is_retried_then_surfaces_rate_limited() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/place/v2/search"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"status": 302, "message": "天配额超限，限制访问"})),
        )
        .expect(3)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let request = SearchRequest::new("餐厅", Coordinates::new(39.9, 116.4), 1000);
    let err = client.search_nearby(&request).await.unwrap_err();

    assert!(
        matches!(err, PlacesError::RateLimited { status: 302, .. }),
        "got {err:?}"
    );
}

#[tokio::test]
async fn server_error_is_retried_then_succeeds() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/place/v2/detail"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/place/v2/detail"))
        .and(query_param("uid", "abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(detail_body("abc", "海底捞")))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let place = client.place_detail("abc").await.expect("second attempt succeeds");
    assert_eq!(place.name.as_deref(), Some("海底捞"));
}

#[tokio::test]
async fn invalid_key_is_an_api_error_without_retry() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/place/v2/detail"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"status": 200, "message": "APP不存在，AK有误请检查再重试"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.place_detail("abc").await.unwrap_err();
    assert!(matches!(err, PlacesError::Api { status: 200, .. }), "got {err:?}");
}

#[tokio::test]
async fn empty_detail_result_is_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/place/v2/detail"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"status": 0, "message": "ok", "result": {}})),
        )
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.place_detail("missing").await.unwrap_err();
    assert!(matches!(err, PlacesError::NotFound(_)), "got {err:?}");
}

#[tokio::test]
async fn malformed_body_is_a_deserialize_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/geocoding/v3/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.geocode("北京").await.unwrap_err();
    assert!(matches!(err, PlacesError::Deserialize { .. }), "got {err:?}");
}

#[tokio::test]
async fn lookup_serves_second_read_from_cache() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/place/v2/detail"))
        .and(query_param("uid", "abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(detail_body("abc", "海底捞")))
        .expect(1)
        .mount(&server)
        .await;

    let lookup = PlaceLookup::new(
        test_client(&server.uri()),
        PlaceCache::new(),
        Duration::from_secs(5),
    );

    let first = lookup.detail("abc", false).await.expect("fetch");
    let second = lookup.detail("abc", false).await.expect("cached");

    assert_eq!(first, second);
    assert!(first.promotions.has_group_deal);
    assert_eq!(lookup.cache().len(), 1);
}

#[tokio::test]
async fn lookup_refresh_bypasses_and_replaces_cache() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/place/v2/detail"))
        .and(query_param("uid", "abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(detail_body("abc", "海底捞 新店")))
        .expect(1)
        .mount(&server)
        .await;

    let cache = PlaceCache::new();
    let mut stale = tastemap_core::PlaceRecord::new("abc", "旧名字");
    stale.telephone = Some("000".into());
    cache.put("abc", stale);

    let lookup = PlaceLookup::new(test_client(&server.uri()), cache.clone(), Duration::from_secs(5));
    let fresh = lookup.detail("abc", true).await.expect("refresh");

    assert_eq!(fresh.name, "海底捞 新店");
    assert!(fresh.telephone.is_none(), "refresh overwrites, never merges");
    assert_eq!(cache.get("abc").map(|r| r.name), Some("海底捞 新店".to_string()));
}

#[tokio::test]
async fn details_many_preserves_order_and_marks_misses() {
    let server = MockServer::start().await;

    for (uid, name) in [("a", "Alpha"), ("c", "Gamma")] {
        Mock::given(method("GET"))
            .and(path("/place/v2/detail"))
            .and(query_param("uid", uid))
            .respond_with(ResponseTemplate::new(200).set_body_json(detail_body(uid, name)))
            .mount(&server)
            .await;
    }
    Mock::given(method("GET"))
        .and(path("/place/v2/detail"))
        .and(query_param("uid", "b"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"status": 0, "message": "ok"})),
        )
        .mount(&server)
        .await;

    let lookup = PlaceLookup::new(
        test_client(&server.uri()),
        PlaceCache::new(),
        Duration::from_secs(5),
    );
    let uids: Vec<String> = ["a", "b", "c"].iter().map(|s| (*s).to_string()).collect();

    let out = lookup.details_many(&uids, false).await;

    assert_eq!(out.len(), 3);
    assert_eq!(out[0].as_ref().map(|r| r.name.as_str()), Some("Alpha"));
    assert!(out[1].is_none());
    assert_eq!(out[2].as_ref().map(|r| r.name.as_str()), Some("Gamma"));
}

#[tokio::test]
async fn slow_lookup_times_out_as_a_miss() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/place/v2/detail"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(detail_body("slow", "Slow"))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let lookup = PlaceLookup::new(
        test_client(&server.uri()),
        PlaceCache::new(),
        Duration::from_millis(50),
    );

    let err = lookup.detail("slow", false).await.unwrap_err();
    assert!(matches!(err, PlacesError::Timeout(_)), "got {err:?}");

    let out = lookup.details_many(&["slow".to_string()], false).await;
    assert_eq!(out, vec![None]);
}
