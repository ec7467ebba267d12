//! End-to-end resolution of one recipe against a mocked Pexels API

use std::time::Duration;

use image_finder::config::ProvidersConfig;
use image_finder::{
    build_client, default_providers, find_and_download, CascadeSettings, Downloader,
    ImageFinder, ProviderKind, RecipeMeta, ReqwestFetcher, RetryPolicy, UsedUrls,
};
use mockito::Matcher;

fn norma() -> RecipeMeta {
    RecipeMeta {
        title: "Rigatoni alla Norma".to_string(),
        category: "Pasta".to_string(),
        slug: "rigatoni-norma".to_string(),
        image_keywords: vec!["rigatoni pasta".to_string(), "eggplant tomato".to_string()],
    }
}

#[tokio::test]
async fn test_rigatoni_alla_norma_with_only_pexels() {
    let mut server = mockito::Server::new_async().await;

    let body = format!(
        r#"{{"photos": [{{
            "id": 7, "width": 1600, "height": 1067,
            "photographer": "Anna Rossi",
            "photographer_url": "https://www.pexels.com/@anna",
            "alt": "rigatoni pasta dish",
            "src": {{
                "large2x": "{base}/photos/7.jpg",
                "medium": "{base}/photos/7-medium.jpg"
            }}
        }}]}}"#,
        base = server.url()
    );

    let search = server
        .mock("GET", "/search")
        .match_query(Matcher::UrlEncoded("query".into(), "rigatoni pasta".into()))
        .match_header("Authorization", "test-key")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(body)
        .expect(1)
        .create_async()
        .await;
    let image = server
        .mock("GET", "/photos/7.jpg")
        .with_status(200)
        .with_body("jpeg bytes")
        .create_async()
        .await;
    let wikimedia = server
        .mock("GET", "/w/api.php")
        .match_query(Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let providers = ProvidersConfig {
        pexels_api_key: Some("test-key".to_string()),
        unsplash_access_key: None,
        pixabay_api_key: None,
        pexels_url: server.url(),
        wikimedia_url: format!("{}/w/api.php", server.url()),
        ..ProvidersConfig::default()
    };

    let finder = ImageFinder::new(
        default_providers(&providers),
        CascadeSettings {
            query_delay: Duration::ZERO,
            ..CascadeSettings::default()
        },
    );
    let downloader = Downloader::new(
        Box::new(ReqwestFetcher::new(build_client(&providers))),
        RetryPolicy {
            attempts: 3,
            rate_limit_backoff: Duration::from_millis(1),
            retry_delay: Duration::from_millis(1),
        },
    );

    let site = tempfile::tempdir().unwrap();
    let mut used = UsedUrls::new();
    let descriptor = find_and_download(&norma(), site.path(), &finder, &downloader, &mut used)
        .await
        .unwrap()
        .expect("an image should be found");

    search.assert_async().await;
    image.assert_async().await;
    wikimedia.assert_async().await;

    assert!(descriptor.local_path.ends_with("pasta/rigatoni-norma.jpg"));
    assert_eq!(descriptor.relative_path, "../../images/ricette/pasta/rigatoni-norma.jpg");
    assert_eq!(descriptor.home_relative_path, "images/ricette/pasta/rigatoni-norma.jpg");
    assert_eq!(descriptor.provider, ProviderKind::Pexels);
    assert_eq!(
        descriptor.attribution,
        "📷 Foto: Anna Rossi — Pexels License via Pexels"
    );

    let saved = site
        .path()
        .join("public/images/ricette/pasta/rigatoni-norma.jpg");
    assert_eq!(std::fs::read(saved).unwrap(), b"jpeg bytes");
    assert!(used.contains(&descriptor.url));
}

#[tokio::test]
async fn test_selected_score_is_strong_match() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/search")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(
            r#"{"photos": [{"id": 7, "width": 1600, "height": 1067,
                "photographer": "Anna Rossi", "alt": "rigatoni pasta dish",
                "src": {"large2x": "https://images.example/7.jpg"}}]}"#,
        )
        .expect(1)
        .create_async()
        .await;

    let providers = ProvidersConfig {
        pexels_api_key: Some("test-key".to_string()),
        unsplash_access_key: None,
        pixabay_api_key: None,
        pexels_url: server.url(),
        wikimedia_url: String::new(),
        ..ProvidersConfig::default()
    };
    let finder = ImageFinder::new(
        default_providers(&providers),
        CascadeSettings {
            query_delay: Duration::ZERO,
            ..CascadeSettings::default()
        },
    );

    let recipe = norma();
    let winner = finder
        .find(&recipe.title, &recipe.category, &recipe.image_keywords, &mut UsedUrls::new())
        .await
        .unwrap();

    // keyword 10 + landscape 3 + high resolution 2
    assert_eq!(winner.score, 15);
    assert_eq!(winner.url, "https://images.example/7.jpg");
}
