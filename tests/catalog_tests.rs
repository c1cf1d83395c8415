use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use reelpick::cache::FetchCache;
use reelpick::error::AppError;
use reelpick::models::{ListCategory, MediaType, SearchScope, TimeWindow, TrendingScope};
use reelpick::services::{CatalogClient, TmdbCatalog};

fn catalog(server: &MockServer, cache: FetchCache) -> TmdbCatalog {
    TmdbCatalog::new(
        cache,
        "test-key".to_string(),
        format!("{}/", server.uri()),
        "en-US".to_string(),
    )
}

fn movie_page(page: u32) -> serde_json::Value {
    json!({
        "page": page,
        "results": [
            {
                "id": 438631,
                "title": "Dune",
                "poster_path": "/dune.jpg",
                "overview": "Paul Atreides...",
                "vote_average": 7.8,
                "genre_ids": [878, 12],
                "release_date": "2021-09-15"
            },
            {
                "id": 693134,
                "title": "Dune: Part Two",
                "vote_average": 8.2,
                "genre_ids": [878],
                "release_date": ""
            }
        ],
        "total_pages": 4,
        "total_results": 80
    })
}

#[tokio::test]
async fn test_list_decodes_and_caches_by_signature() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/movie/popular"))
        .and(query_param("api_key", "test-key"))
        .and(query_param("language", "en-US"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(movie_page(1)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/movie/popular"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(movie_page(2)))
        .expect(1)
        .mount(&server)
        .await;

    let cache = FetchCache::new();
    let catalog = catalog(&server, cache.clone());

    let first = catalog
        .list(MediaType::Movie, ListCategory::Popular, 1)
        .await
        .unwrap();
    assert_eq!(first.page, 1);
    assert_eq!(first.total_pages, 4);
    assert_eq!(first.results.len(), 2);
    assert_eq!(first.results[0].media_type, MediaType::Movie);
    assert_eq!(first.results[0].genre_ids, vec![878, 12]);
    assert_eq!(first.results[1].release_date, None);

    // Identical signature is served from cache.
    let again = catalog
        .list(MediaType::Movie, ListCategory::Popular, 1)
        .await
        .unwrap();
    assert_eq!(again, first);

    let second = catalog
        .list(MediaType::Movie, ListCategory::Popular, 2)
        .await
        .unwrap();
    assert_eq!(second.page, 2);
    assert_eq!(cache.len(), 2);
}

#[tokio::test]
async fn test_failed_request_is_not_cached() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/trending/tv/week"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .expect(2)
        .mount(&server)
        .await;

    let cache = FetchCache::new();
    let catalog = catalog(&server, cache.clone());

    for _ in 0..2 {
        let result = catalog
            .trending(TrendingScope::Only(MediaType::Tv), TimeWindow::Week, 1)
            .await;
        match result {
            Err(AppError::ExternalApi(message)) => assert!(message.contains("503")),
            other => panic!("expected external API error, got {:?}", other),
        }
    }
    assert!(cache.is_empty());
}

#[tokio::test]
async fn test_zero_ttl_always_refetches() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/discover/movie"))
        .and(query_param("with_genres", "27"))
        .respond_with(ResponseTemplate::new(200).set_body_json(movie_page(1)))
        .expect(2)
        .mount(&server)
        .await;

    let catalog = catalog(&server, FetchCache::new()).with_ttls(Duration::ZERO, Duration::ZERO);

    for _ in 0..2 {
        catalog
            .discover_by_genre(MediaType::Movie, 27, 1)
            .await
            .unwrap();
    }
}

#[tokio::test]
async fn test_invalidate_forces_refetch_of_genres() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/genre/tv/list"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "genres": [{ "id": 9648, "name": "Mystery" }, { "id": 18, "name": "Drama" }]
        })))
        .expect(2)
        .mount(&server)
        .await;

    let cache = FetchCache::new();
    let catalog = catalog(&server, cache.clone());

    let genres = catalog.genres(MediaType::Tv).await.unwrap();
    assert_eq!(genres.len(), 2);
    assert_eq!(genres[0].name, "Mystery");
    catalog.genres(MediaType::Tv).await.unwrap();

    assert_eq!(cache.invalidate(Some("/genre/")), 1);
    catalog.genres(MediaType::Tv).await.unwrap();
}

#[tokio::test]
async fn test_multi_search_drops_people_and_tags_media() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search/multi"))
        .and(query_param("query", "nolan"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "page": 1,
            "results": [
                { "id": 525, "media_type": "person", "name": "Christopher Nolan" },
                { "id": 27205, "media_type": "movie", "title": "Inception", "vote_average": 8.4 },
                { "id": 1399, "media_type": "tv", "name": "Game of Thrones", "first_air_date": "2011-04-17" }
            ],
            "total_pages": 1,
            "total_results": 3
        })))
        .expect(1)
        .mount(&server)
        .await;

    let catalog = catalog(&server, FetchCache::new());
    let results = catalog
        .search(SearchScope::Multi, "  nolan ", 1)
        .await
        .unwrap();

    assert_eq!(results.results.len(), 2);
    assert_eq!(results.results[0].media_type, MediaType::Movie);
    assert_eq!(results.results[1].media_type, MediaType::Tv);
    assert_eq!(results.results[1].title, "Game of Thrones");
    assert_eq!(results.results[1].release_date.as_deref(), Some("2011-04-17"));
}

#[tokio::test]
async fn test_rejected_inputs_never_reach_the_network() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(0)
        .mount(&server)
        .await;

    let catalog = catalog(&server, FetchCache::new());

    assert!(matches!(
        catalog.search(SearchScope::Movie, "   ", 1).await,
        Err(AppError::InvalidInput(_))
    ));
    assert!(matches!(
        catalog
            .list(MediaType::Movie, ListCategory::OnTheAir, 1)
            .await,
        Err(AppError::InvalidInput(_))
    ));
    assert!(matches!(
        catalog.raw("../secrets", vec![]).await,
        Err(AppError::InvalidInput(_))
    ));
}

#[tokio::test]
async fn test_details_and_raw_passthrough() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tv/1399"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 1399,
            "name": "Game of Thrones",
            "genres": [{ "id": 18, "name": "Drama" }],
            "episode_run_time": [60],
            "number_of_seasons": 8,
            "tagline": ""
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/movie/550/keywords"))
        .and(query_param("include", "all"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 550,
            "keywords": [{ "id": 825, "name": "support group" }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let catalog = catalog(&server, FetchCache::new());

    let details = catalog.details(MediaType::Tv, 1399).await.unwrap();
    assert_eq!(details.title, "Game of Thrones");
    assert_eq!(details.runtime, Some(60));
    assert_eq!(details.number_of_seasons, Some(8));
    assert_eq!(details.tagline, None);

    let raw = catalog
        .raw(
            "/movie/550/keywords",
            vec![("include".to_string(), "all".to_string())],
        )
        .await
        .unwrap();
    assert_eq!(raw["keywords"][0]["name"], "support group");
}
