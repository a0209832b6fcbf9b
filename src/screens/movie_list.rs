use std::collections::HashMap;
use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::api::NetworkError;
use crate::config::AggregationPolicy;
use crate::service::MovieService;
use crate::tmdb::{Movie, MovieCategory, MovieListResponse};

/// Results delivered from the interactor to the presenter
#[derive(Debug)]
pub enum ListEvent {
    AllLoaded(HashMap<MovieCategory, Vec<Movie>>),
    LoadFailed(NetworkError),
    MoreLoaded {
        category: MovieCategory,
        movies: Vec<Movie>,
    },
    MoreFailed {
        category: MovieCategory,
        error: NetworkError,
    },
}

pub trait MovieListView {
    fn show_loading(&mut self);
    fn hide_loading(&mut self);
    fn reload_data(&mut self);
    fn show_error(&mut self, message: &str);
}

#[derive(Debug, Clone)]
pub enum MovieListRoute {
    Detail(Movie),
}

pub trait MovieListRouter {
    fn navigate(&mut self, route: MovieListRoute);
}

pub trait ListInteractor {
    /// Load page 1 of every section, reported as one `AllLoaded` or `LoadFailed`
    fn fetch_all_movies(&self);

    /// Load one more page of a category, reported as `MoreLoaded` or `MoreFailed`
    fn fetch_more_movies(&self, category: MovieCategory, page: u32);
}

/// Merge the outcome of the initial per-category fetches.
///
/// Outcomes are in section order, so "first failure" is the first failing
/// section rather than the first request to complete.
pub fn aggregate(
    outcomes: Vec<(MovieCategory, Result<MovieListResponse, NetworkError>)>,
    policy: AggregationPolicy,
) -> Result<HashMap<MovieCategory, Vec<Movie>>, NetworkError> {
    let mut movies = HashMap::new();
    let mut errors = Vec::new();

    for (category, outcome) in outcomes {
        match outcome {
            Ok(response) => {
                movies.insert(category, response.results);
            }
            Err(e) => {
                warn!(?category, error = %e, "category fetch failed");
                errors.push(e);
            }
        }
    }

    match policy {
        AggregationPolicy::AllOrNothing => match errors.into_iter().next() {
            Some(e) => Err(e),
            None => Ok(movies),
        },
        AggregationPolicy::Partial => {
            if movies.is_empty() && !errors.is_empty() {
                Err(errors.remove(0))
            } else {
                Ok(movies)
            }
        }
    }
}

pub struct MovieListInteractor {
    service: Arc<dyn MovieService>,
    categories: Vec<MovieCategory>,
    policy: AggregationPolicy,
    events: mpsc::Sender<ListEvent>,
}

impl MovieListInteractor {
    pub fn new(
        service: Arc<dyn MovieService>,
        categories: Vec<MovieCategory>,
        policy: AggregationPolicy,
        events: mpsc::Sender<ListEvent>,
    ) -> Self {
        Self {
            service,
            categories,
            policy,
            events,
        }
    }

    /// Fetch page 1 of every category concurrently and wait for all of them
    pub async fn load_all(
        service: &dyn MovieService,
        categories: &[MovieCategory],
        policy: AggregationPolicy,
    ) -> Result<HashMap<MovieCategory, Vec<Movie>>, NetworkError> {
        let outcomes = join_all(
            categories
                .iter()
                .map(|&category| async move { (category, service.fetch_movies(category, 1).await) }),
        )
        .await;

        aggregate(outcomes, policy)
    }
}

impl ListInteractor for MovieListInteractor {
    fn fetch_all_movies(&self) {
        let service = Arc::clone(&self.service);
        let categories = self.categories.clone();
        let policy = self.policy;
        let tx = self.events.clone();

        debug!(count = categories.len(), "fetching all categories");

        tokio::spawn(async move {
            let event = match Self::load_all(service.as_ref(), &categories, policy).await {
                Ok(movies) => ListEvent::AllLoaded(movies),
                Err(e) => ListEvent::LoadFailed(e),
            };
            if tx.send(event).await.is_err() {
                debug!("movie list closed before initial load finished");
            }
        });
    }

    fn fetch_more_movies(&self, category: MovieCategory, page: u32) {
        let service = Arc::clone(&self.service);
        let tx = self.events.clone();

        debug!(?category, page, "fetching next page");

        tokio::spawn(async move {
            let event = match service.fetch_movies(category, page).await {
                Ok(response) => ListEvent::MoreLoaded {
                    category,
                    movies: response.results,
                },
                Err(error) => ListEvent::MoreFailed { category, error },
            };
            if tx.send(event).await.is_err() {
                debug!(?category, page, "movie list closed before page arrived");
            }
        });
    }
}

/// Sectioned movie list with per-category pagination.
pub struct MovieListPresenter<I, R> {
    interactor: I,
    router: R,
    sections: Vec<MovieCategory>,
    movies_by_category: HashMap<MovieCategory, Vec<Movie>>,
    current_pages: HashMap<MovieCategory, u32>,
    loading_more: HashMap<MovieCategory, bool>,
    /// Set from `view_did_load` until the initial load resolves
    initial_loading: bool,
}

impl<I: ListInteractor, R: MovieListRouter> MovieListPresenter<I, R> {
    pub fn new(interactor: I, router: R) -> Self {
        Self::with_sections(interactor, router, MovieCategory::SECTIONS.to_vec())
    }

    pub fn with_sections(interactor: I, router: R, sections: Vec<MovieCategory>) -> Self {
        let current_pages = sections.iter().map(|&c| (c, 1)).collect();
        let loading_more = sections.iter().map(|&c| (c, false)).collect();

        Self {
            interactor,
            router,
            sections,
            movies_by_category: HashMap::new(),
            current_pages,
            loading_more,
            initial_loading: false,
        }
    }

    pub fn view_did_load(&mut self, view: &mut dyn MovieListView) {
        view.show_loading();
        self.initial_loading = true;
        self.interactor.fetch_all_movies();
        view.reload_data();
    }

    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    pub fn section_category(&self, section: usize) -> Option<MovieCategory> {
        self.sections.get(section).copied()
    }

    pub fn section_title(&self, section: usize) -> &'static str {
        self.section_category(section)
            .map(|c| c.title())
            .unwrap_or("")
    }

    pub fn movies_for_section(&self, section: usize) -> &[Movie] {
        self.section_category(section)
            .and_then(|c| self.movies_by_category.get(&c))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn movie_count(&self, section: usize) -> usize {
        self.movies_for_section(section).len()
    }

    pub fn current_page(&self, category: MovieCategory) -> u32 {
        self.current_pages.get(&category).copied().unwrap_or(1)
    }

    pub fn is_initial_loading(&self) -> bool {
        self.initial_loading
    }

    pub fn is_loading_more(&self, category: MovieCategory) -> bool {
        self.loading_more.get(&category).copied().unwrap_or(false)
    }

    pub fn did_select_movie(&mut self, movie: &Movie) {
        info!(movie_id = movie.id, title = movie.display_title(), "movie selected");
        self.router.navigate(MovieListRoute::Detail(movie.clone()));
    }

    /// Request the next page for the category shown in `section`.
    /// Returns false when nothing was dispatched.
    pub fn load_more_if_needed(&mut self, section: usize) -> bool {
        match self.section_category(section) {
            Some(category) => self.load_more(category),
            None => false,
        }
    }

    /// Request the next page of `category` unless one is already in flight.
    ///
    /// The page counter moves forward before dispatch and is never rolled
    /// back, so a failed page is skipped rather than retried. Nothing is
    /// dispatched until page 1 is in, since it would replace later pages.
    pub fn load_more(&mut self, category: MovieCategory) -> bool {
        if self.initial_loading {
            debug!(?category, "initial load still in flight");
            return false;
        }
        if self.is_loading_more(category) {
            debug!(?category, "page already in flight");
            return false;
        }

        let page = self.current_page(category) + 1;
        self.current_pages.insert(category, page);
        self.loading_more.insert(category, true);
        self.interactor.fetch_more_movies(category, page);
        true
    }

    pub fn handle(&mut self, event: ListEvent, view: &mut dyn MovieListView) {
        match event {
            ListEvent::AllLoaded(movies) => {
                info!(categories = movies.len(), "movie lists loaded");
                self.initial_loading = false;
                self.movies_by_category = movies;
                view.reload_data();
                view.hide_loading();
            }
            ListEvent::LoadFailed(error) => {
                self.initial_loading = false;
                for flag in self.loading_more.values_mut() {
                    *flag = false;
                }
                view.hide_loading();
                view.show_error(&error.to_string());
            }
            ListEvent::MoreLoaded { category, movies } => {
                debug!(?category, count = movies.len(), "loaded more movies");
                self.movies_by_category
                    .entry(category)
                    .or_default()
                    .extend(movies);
                self.loading_more.insert(category, false);
                view.reload_data();
                view.hide_loading();
            }
            ListEvent::MoreFailed { category, error } => {
                self.loading_more.insert(category, false);
                view.show_error(&error.to_string());
            }
        }
    }

    pub fn interactor(&self) -> &I {
        &self.interactor
    }

    pub fn router(&self) -> &R {
        &self.router
    }

    pub fn router_mut(&mut self) -> &mut R {
        &mut self.router
    }
}
