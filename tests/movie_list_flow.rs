use std::time::Duration;

use serde_json::json;
use tokio::sync::mpsc;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use marquee::assembly::Assembly;
use marquee::config::{AggregationPolicy, Config};
use marquee::screens::{
    DetailEvent, ListEvent, MovieDetailRoute, MovieDetailRouter, MovieDetailView, MovieListRoute,
    MovieListRouter, MovieListView,
};
use marquee::tmdb::MovieCategory;

#[derive(Default)]
struct TestListView {
    loading: bool,
    reloads: usize,
    errors: Vec<String>,
}

impl MovieListView for TestListView {
    fn show_loading(&mut self) {
        self.loading = true;
    }

    fn hide_loading(&mut self) {
        self.loading = false;
    }

    fn reload_data(&mut self) {
        self.reloads += 1;
    }

    fn show_error(&mut self, message: &str) {
        self.errors.push(message.to_string());
    }
}

#[derive(Default)]
struct TestListRouter {
    routes: Vec<MovieListRoute>,
}

impl MovieListRouter for TestListRouter {
    fn navigate(&mut self, route: MovieListRoute) {
        self.routes.push(route);
    }
}

#[derive(Default)]
struct TestDetailView {
    reloads: usize,
    errors: Vec<String>,
}

impl MovieDetailView for TestDetailView {
    fn setup(&mut self) {}

    fn reload_data(&mut self) {
        self.reloads += 1;
    }

    fn show_error(&mut self, message: &str) {
        self.errors.push(message.to_string());
    }
}

#[derive(Default)]
struct TestDetailRouter {
    routes: Vec<MovieDetailRoute>,
}

impl MovieDetailRouter for TestDetailRouter {
    fn navigate(&mut self, route: MovieDetailRoute) {
        self.routes.push(route);
    }
}

fn page_body(page: u32, first_id: u64, count: u64) -> serde_json::Value {
    let results: Vec<_> = (first_id..first_id + count)
        .map(|id| json!({ "id": id, "title": format!("Movie {}", id) }))
        .collect();
    json!({ "page": page, "results": results, "total_pages": 50, "total_results": 1000 })
}

async fn mount_page(server: &MockServer, category: MovieCategory, page: u32, first_id: u64) {
    Mock::given(method("GET"))
        .and(path("/3/discover/movie"))
        .and(query_param("sort_by", category.sort_by()))
        .and(query_param("page", page.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(page, first_id, 20)))
        .mount(server)
        .await;
}

fn assembly(server: &MockServer, policy: AggregationPolicy) -> Assembly {
    let mut config = Config::default();
    config.tmdb.apikey = Some("test-key".to_string());
    config.tmdb.base_url = server.uri();
    config.catalog.aggregation = policy;
    Assembly::new(config).unwrap()
}

async fn next<T>(rx: &mut mpsc::Receiver<T>) -> T {
    tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("timed out waiting for event")
        .expect("channel closed")
}

#[tokio::test]
async fn test_initial_load_then_pagination() {
    let server = MockServer::start().await;
    mount_page(&server, MovieCategory::TopRated, 1, 1000).await;
    mount_page(&server, MovieCategory::Popularity, 1, 2000).await;
    mount_page(&server, MovieCategory::Revenue, 1, 3000).await;
    mount_page(&server, MovieCategory::TopRated, 2, 1020).await;

    let assembly = assembly(&server, AggregationPolicy::AllOrNothing);
    let (mut presenter, mut rx) = assembly.movie_list_screen(TestListRouter::default());
    let mut view = TestListView::default();

    presenter.view_did_load(&mut view);
    assert!(view.loading);

    let event = next(&mut rx).await;
    assert!(matches!(event, ListEvent::AllLoaded(_)));
    presenter.handle(event, &mut view);

    assert!(!view.loading);
    assert!(view.errors.is_empty());
    for section in 0..3 {
        assert_eq!(presenter.movie_count(section), 20);
    }

    assert!(presenter.load_more(MovieCategory::TopRated));
    assert!(!presenter.load_more(MovieCategory::TopRated));

    let event = next(&mut rx).await;
    presenter.handle(event, &mut view);

    let ids: Vec<u64> = presenter.movies_for_section(0).iter().map(|m| m.id).collect();
    assert_eq!(ids, (1000..1040).collect::<Vec<_>>());
    assert_eq!(presenter.current_page(MovieCategory::TopRated), 2);
    assert_eq!(presenter.movie_count(1), 20);

    let requests = server.received_requests().await.unwrap();
    let page_two = requests
        .iter()
        .filter(|r| r.url.query().is_some_and(|q| q.contains("page=2")))
        .count();
    assert_eq!(page_two, 1);
}

#[tokio::test]
async fn test_one_failing_category_fails_initial_load() {
    let server = MockServer::start().await;
    mount_page(&server, MovieCategory::TopRated, 1, 1000).await;
    mount_page(&server, MovieCategory::Revenue, 1, 3000).await;
    Mock::given(method("GET"))
        .and(path("/3/discover/movie"))
        .and(query_param("sort_by", MovieCategory::Popularity.sort_by()))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let assembly = assembly(&server, AggregationPolicy::AllOrNothing);
    let (mut presenter, mut rx) = assembly.movie_list_screen(TestListRouter::default());
    let mut view = TestListView::default();

    presenter.view_did_load(&mut view);
    let event = next(&mut rx).await;
    presenter.handle(event, &mut view);

    assert_eq!(view.errors, vec!["request failed (500): boom"]);
    for section in 0..3 {
        assert_eq!(presenter.movie_count(section), 0);
    }
}

#[tokio::test]
async fn test_partial_policy_keeps_successful_categories() {
    let server = MockServer::start().await;
    mount_page(&server, MovieCategory::TopRated, 1, 1000).await;
    mount_page(&server, MovieCategory::Popularity, 1, 2000).await;
    Mock::given(method("GET"))
        .and(path("/3/discover/movie"))
        .and(query_param("sort_by", MovieCategory::Revenue.sort_by()))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let assembly = assembly(&server, AggregationPolicy::Partial);
    let (mut presenter, mut rx) = assembly.movie_list_screen(TestListRouter::default());
    let mut view = TestListView::default();

    presenter.view_did_load(&mut view);
    let event = next(&mut rx).await;
    presenter.handle(event, &mut view);

    assert!(view.errors.is_empty());
    assert_eq!(presenter.movie_count(0), 20);
    assert_eq!(presenter.movie_count(1), 20);
    assert_eq!(presenter.movie_count(2), 0);
}

#[tokio::test]
async fn test_failed_page_keeps_existing_movies() {
    let server = MockServer::start().await;
    mount_page(&server, MovieCategory::TopRated, 1, 1000).await;
    mount_page(&server, MovieCategory::Popularity, 1, 2000).await;
    mount_page(&server, MovieCategory::Revenue, 1, 3000).await;
    Mock::given(method("GET"))
        .and(path("/3/discover/movie"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let assembly = assembly(&server, AggregationPolicy::AllOrNothing);
    let (mut presenter, mut rx) = assembly.movie_list_screen(TestListRouter::default());
    let mut view = TestListView::default();

    presenter.view_did_load(&mut view);
    let event = next(&mut rx).await;
    presenter.handle(event, &mut view);

    assert!(presenter.load_more_if_needed(2));
    let event = next(&mut rx).await;
    assert!(matches!(
        event,
        ListEvent::MoreFailed {
            category: MovieCategory::Revenue,
            ..
        }
    ));
    presenter.handle(event, &mut view);

    assert_eq!(view.errors.len(), 1);
    assert_eq!(presenter.movie_count(2), 20);
    assert!(!presenter.is_loading_more(MovieCategory::Revenue));
}

#[tokio::test]
async fn test_detail_screen_loads_cast_and_routes_to_player() {
    let server = MockServer::start().await;
    mount_page(&server, MovieCategory::TopRated, 1, 1000).await;
    mount_page(&server, MovieCategory::Popularity, 1, 2000).await;
    mount_page(&server, MovieCategory::Revenue, 1, 3000).await;
    Mock::given(method("GET"))
        .and(path("/3/movie/1000/credits"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 1000,
            "cast": [
                { "id": 1, "name": "Lead", "character": "Hero" },
                { "id": 2, "name": "Support", "character": "Sidekick" }
            ]
        })))
        .mount(&server)
        .await;

    let assembly = assembly(&server, AggregationPolicy::AllOrNothing);
    let (mut list, mut list_rx) = assembly.movie_list_screen(TestListRouter::default());
    let mut list_view = TestListView::default();
    list.view_did_load(&mut list_view);
    let event = next(&mut list_rx).await;
    list.handle(event, &mut list_view);

    let first = list.movies_for_section(0)[0].clone();
    list.did_select_movie(&first);
    let Some(MovieListRoute::Detail(movie)) = list.router_mut().routes.pop() else {
        panic!("expected a detail route");
    };

    let (mut detail, mut detail_rx) =
        assembly.movie_detail_screen(movie, TestDetailRouter::default());
    let mut detail_view = TestDetailView::default();

    detail.view_did_load(&mut detail_view);
    let event = next(&mut detail_rx).await;
    assert!(matches!(event, DetailEvent::CreditsLoaded(_)));
    detail.handle(event, &mut detail_view);

    assert_eq!(detail_view.reloads, 1);
    assert_eq!(detail.cast_count(), 2);
    assert_eq!(detail.cast_member(0).unwrap().display_name(), "Lead");

    detail.did_select_play_movie();
    match detail.router().routes.as_slice() {
        [MovieDetailRoute::PlayMovie { stream_url, movie }] => {
            assert_eq!(stream_url, &assembly.config().player.sample_url);
            assert_eq!(movie.as_ref().map(|m| m.id), Some(1000));
        }
        other => panic!("unexpected routes: {:?}", other),
    }
}
