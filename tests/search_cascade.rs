//! Tour search fallback cascade against an in-memory catalogue

mod common;

use common::{tour, MockCatalog};
use safar::location::LocationCache;
use safar::search::{SearchRequest, SearchStage, SearchStatus, TourSearch, MAX_RESULTS};
use safar::LocationId;
use std::sync::atomic::Ordering;
use std::sync::Arc;

fn search_over(catalog: Arc<MockCatalog>) -> TourSearch {
    TourSearch::new(Arc::new(LocationCache::new(catalog)))
}

#[tokio::test]
async fn test_exact_city_match() {
    let catalog = Arc::new(MockCatalog::new().with_tours(
        21,
        vec![tour(1, "Dubai Classic", 650.0, 5), tour(2, "Dubai Deluxe", 990.0, 7)],
    ));
    let search = search_over(catalog.clone());

    let outcome = search.search(&SearchRequest::to("Dubai")).await;

    assert_eq!(outcome.status, SearchStatus::Success);
    assert_eq!(outcome.stage, Some(SearchStage::Exact));
    assert_eq!(outcome.count, 2);
    assert_eq!(outcome.destination_found.as_deref(), Some("Дубай"));
    assert_eq!(outcome.message, "Found 2 tours to Дубай");
    assert_eq!(catalog.searched_destinations(), vec![Some(21)]);
}

#[tokio::test]
async fn test_empty_city_falls_back_to_country() {
    let catalog = Arc::new(MockCatalog::new().with_tours(1, vec![tour(7, "Turkey Mix", 540.0, 7)]));
    let search = search_over(catalog.clone());

    let outcome = search.search(&SearchRequest::to("Бодрум")).await;

    assert_eq!(outcome.stage, Some(SearchStage::ParentCountry));
    assert_eq!(outcome.destination_found.as_deref(), Some("Турция"));
    assert_eq!(outcome.searched, vec!["Бодрум", "Турция"]);
    assert_eq!(
        outcome.message,
        "No tours for the requested place; found 1 tours in Турция"
    );
    assert_eq!(catalog.searched_destinations(), vec![Some(13), Some(1)]);
}

#[tokio::test]
async fn test_empty_city_and_country_fall_back_to_siblings() {
    let catalog = Arc::new(MockCatalog::new().with_tours(21, vec![tour(3, "Dubai Week", 700.0, 7)]));
    let search = search_over(catalog.clone());

    let outcome = search.search(&SearchRequest::to("Шарджа")).await;

    assert_eq!(outcome.stage, Some(SearchStage::SiblingCities));
    assert_eq!(outcome.destination_found.as_deref(), Some("Дубай"));
    assert_eq!(outcome.searched, vec!["Шарджа", "ОАЭ", "Дубай"]);
    assert_eq!(outcome.count, 1);
}

#[tokio::test]
async fn test_empty_country_unions_its_cities() {
    let catalog = Arc::new(
        MockCatalog::new()
            .with_tours(
                11,
                vec![tour(1, "Istanbul Lights", 800.0, 7), tour(2, "Istanbul Short", 400.0, 4)],
            )
            .with_tours(
                12,
                vec![tour(2, "Istanbul Short", 400.0, 4), tour(3, "Antalya Sun", 600.0, 7)],
            ),
    );
    let search = search_over(catalog.clone());

    let outcome = search.search(&SearchRequest::to("Turkey")).await;

    assert_eq!(outcome.stage, Some(SearchStage::ChildCities));
    assert_eq!(outcome.count, 3, "duplicate tour ids are merged");
    let prices: Vec<f64> = outcome.tours.iter().filter_map(|t| t.price()).collect();
    assert_eq!(prices, vec![400.0, 600.0, 800.0]);
    assert_eq!(
        outcome.destination_found.as_deref(),
        Some("Стамбул, Анталья, Бодрум")
    );
    assert_eq!(outcome.searched, vec!["Турция", "Стамбул", "Анталья", "Бодрум"]);
}

#[tokio::test]
async fn test_loose_match_tries_candidates() {
    let catalog = Arc::new(MockCatalog::new().with_tours(21, vec![tour(4, "Dubai Promo", 520.0, 5)]));
    let search = search_over(catalog.clone());

    let outcome = search.search(&SearchRequest::to("Дуб")).await;

    assert_eq!(outcome.stage, Some(SearchStage::FuzzyCandidate));
    assert_eq!(outcome.destination_found.as_deref(), Some("Дубай"));
    assert_eq!(outcome.searched, vec!["Дубай"]);
}

#[tokio::test]
async fn test_loose_match_only_tries_cities() {
    let catalog = Arc::new(MockCatalog::new().with_tours(1, vec![tour(7, "Turkey Mix", 540.0, 7)]));
    let search = search_over(catalog.clone());

    let outcome = search.search(&SearchRequest::to("Тур")).await;

    assert_eq!(outcome.stage, Some(SearchStage::PopularAlternatives));
    assert!(outcome.searched.is_empty(), "a country is never a loose candidate");
    assert_eq!(catalog.search_count(), 0);
}

#[tokio::test]
async fn test_unknown_place_suggests_popular_destinations() {
    let catalog = Arc::new(MockCatalog::new().with_tours(21, vec![tour(4, "Dubai Promo", 520.0, 5)]));
    let search = search_over(catalog.clone());

    let outcome = search.search(&SearchRequest::to("Atlantis")).await;

    assert_eq!(outcome.status, SearchStatus::NoTours);
    assert_eq!(outcome.stage, Some(SearchStage::PopularAlternatives));
    assert!(outcome.searched.is_empty());
    assert_eq!(outcome.alternatives.len(), 6);
    assert!(outcome
        .message
        .starts_with("No tours found for 'Atlantis'. Popular alternatives: Turkiya, BAA"));
    assert_eq!(catalog.search_count(), 0);
}

#[tokio::test]
async fn test_exhausted_cascade_keeps_matched_location() {
    let catalog = Arc::new(MockCatalog::new());
    let search = search_over(catalog.clone());

    let outcome = search.search(&SearchRequest::to("Egypt")).await;

    assert_eq!(outcome.stage, Some(SearchStage::PopularAlternatives));
    assert_eq!(outcome.destination_found.as_deref(), Some("Египет"));
    assert_eq!(outcome.searched, vec!["Египет", "Хургада"]);
    assert_eq!(catalog.searched_destinations(), vec![Some(3), Some(31)]);
}

#[tokio::test]
async fn test_budget_filter_triggers_fallback() {
    let catalog = Arc::new(
        MockCatalog::new()
            .with_tours(21, vec![tour(1, "Dubai Palace", 1200.0, 7)])
            .with_tours(2, vec![tour(5, "Emirates Saver", 700.0, 7)]),
    );
    let search = search_over(catalog.clone());

    let outcome = search.search(&SearchRequest::to("Dubai").budget(900.0)).await;

    assert_eq!(outcome.stage, Some(SearchStage::ParentCountry));
    assert_eq!(outcome.count, 1);
    assert_eq!(outcome.tours[0].price(), Some(700.0));
}

#[tokio::test]
async fn test_duration_tolerance() {
    let catalog = Arc::new(MockCatalog::new().with_tours(
        21,
        vec![
            tour(1, "Short", 500.0, 4),
            tour(2, "Week", 600.0, 7),
            tour(3, "Long", 900.0, 10),
        ],
    ));
    let search = search_over(catalog);

    let outcome = search.search(&SearchRequest::to("Dubai").days(8)).await;

    let days: Vec<i64> = outcome.tours.iter().filter_map(|t| t.days()).collect();
    assert_eq!(days, vec![7, 10]);
}

#[tokio::test]
async fn test_origin_and_date_reach_the_query() {
    let catalog = Arc::new(MockCatalog::new().with_tours(21, vec![tour(1, "Dubai", 600.0, 7)]));
    let search = search_over(catalog.clone());

    search
        .search(
            &SearchRequest::to("Dubai")
                .from_city("Tashkent")
                .on("15.10.2025"),
        )
        .await;

    let queries = catalog.queries.lock().unwrap().clone();
    assert_eq!(queries[0].origin_location_child_id, Some(LocationId(100)));
    assert_eq!(queries[0].origin_date.as_deref(), Some("15.10.2025"));
    assert_eq!(queries[0].sort.as_deref(), Some("price_asc"));
}

#[tokio::test]
async fn test_unknown_origin_searches_from_anywhere() {
    let catalog = Arc::new(MockCatalog::new().with_tours(21, vec![tour(1, "Dubai", 600.0, 7)]));
    let search = search_over(catalog.clone());

    let outcome = search
        .search(&SearchRequest::to("Dubai").from_city("Nukus"))
        .await;

    assert!(outcome.is_success());
    let queries = catalog.queries.lock().unwrap().clone();
    assert_eq!(queries[0].origin_location_child_id, None);
}

#[tokio::test]
async fn test_catalogue_failure_is_reported() {
    let catalog = Arc::new(MockCatalog::new().failing_searches());
    let search = search_over(catalog);

    let outcome = search.search(&SearchRequest::to("Dubai")).await;

    assert_eq!(outcome.status, SearchStatus::Error);
    assert!(outcome.message.starts_with("Search error:"));
    assert!(outcome.tours.is_empty());
}

#[tokio::test]
async fn test_location_failure_is_retried_then_cached() {
    let catalog = Arc::new(
        MockCatalog::new()
            .with_tours(21, vec![tour(1, "Dubai", 600.0, 7)])
            .failing_location_loads(1),
    );
    let search = search_over(catalog.clone());

    let first = search.search(&SearchRequest::to("Dubai")).await;
    assert_eq!(first.status, SearchStatus::Error);

    let second = search.search(&SearchRequest::to("Dubai")).await;
    assert!(second.is_success());

    search.search(&SearchRequest::to("Turkey")).await;
    assert_eq!(catalog.location_loads.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_results_are_truncated() {
    let tours = (1..=12).map(|i| tour(i, "Dubai", 400.0 + i as f64, 7)).collect();
    let catalog = Arc::new(MockCatalog::new().with_tours(21, tours));
    let search = search_over(catalog);

    let outcome = search.search(&SearchRequest::to("Dubai")).await;

    assert_eq!(outcome.count, 12);
    assert_eq!(outcome.tours.len(), MAX_RESULTS);
    assert!(outcome.has_more);
}

#[tokio::test]
async fn test_direct_search_does_not_widen() {
    let catalog = Arc::new(MockCatalog::new().with_tours(1, vec![tour(7, "Turkey Mix", 540.0, 7)]));
    let search = search_over(catalog.clone());

    let outcome = search.search_direct(&SearchRequest::to("Бодрум")).await;
    assert_eq!(outcome.stage, Some(SearchStage::Direct));
    assert_eq!(outcome.status, SearchStatus::NoTours);
    assert_eq!(catalog.searched_destinations(), vec![Some(13)]);

    let unknown = search.search_direct(&SearchRequest::to("Atlantis")).await;
    assert_eq!(unknown.message, "Destination 'Atlantis' not found");
    assert_eq!(catalog.search_count(), 1);
}

#[tokio::test]
async fn test_outcome_serializes_stage_names() {
    let catalog = Arc::new(MockCatalog::new().with_tours(1, vec![tour(7, "Turkey Mix", 540.0, 7)]));
    let search = search_over(catalog);

    let outcome = search.search(&SearchRequest::to("Бодрум")).await;
    let json = serde_json::to_value(&outcome).unwrap();

    assert_eq!(json["status"], "success");
    assert_eq!(json["stage"], "parent_country");
    assert!(json.get("alternatives").is_none());
}
