use std::sync::Arc;

use tokio::sync::mpsc;

use crate::api::ApiClient;
use crate::config::Config;
use crate::screens::{
    DetailEvent, EVENT_CHANNEL_CAPACITY, ListEvent, MediaBackend, MovieDetailInteractor,
    MovieDetailPresenter, MovieDetailRouter, MovieListInteractor, MovieListPresenter,
    MovieListRouter, MoviePlayerInteractor, MoviePlayerPresenter, MoviePlayerRouter, PlayerEvent,
};
use crate::service::{MovieService, TmdbService};
use crate::tmdb::{Movie, MovieCategory};

/// Builds screens from the shared service objects.
///
/// Each `*_screen` method returns the presenter together with the receiving
/// end of its event channel; the caller drains it and feeds every event back
/// into `presenter.handle`.
pub struct Assembly {
    config: Config,
    service: Arc<dyn MovieService>,
}

impl Assembly {
    /// Returns None if no API key is configured or embedded
    pub fn new(config: Config) -> Option<Self> {
        let client =
            ApiClient::with_base_url(config.tmdb.apikey.as_deref(), &config.tmdb.base_url)?;
        let service = Arc::new(TmdbService::new(client));
        Some(Self::with_service(config, service))
    }

    pub fn with_service(config: Config, service: Arc<dyn MovieService>) -> Self {
        Self { config, service }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn image_base_url(&self) -> &str {
        &self.config.tmdb.image_base_url
    }

    pub fn movie_list_screen<R: MovieListRouter>(
        &self,
        router: R,
    ) -> (
        MovieListPresenter<MovieListInteractor, R>,
        mpsc::Receiver<ListEvent>,
    ) {
        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let interactor = MovieListInteractor::new(
            Arc::clone(&self.service),
            MovieCategory::SECTIONS.to_vec(),
            self.config.catalog.aggregation,
            tx,
        );
        (MovieListPresenter::new(interactor, router), rx)
    }

    pub fn movie_detail_screen<R: MovieDetailRouter>(
        &self,
        movie: Movie,
        router: R,
    ) -> (
        MovieDetailPresenter<MovieDetailInteractor, R>,
        mpsc::Receiver<DetailEvent>,
    ) {
        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let interactor = MovieDetailInteractor::new(Arc::clone(&self.service), tx);
        let presenter = MovieDetailPresenter::new(
            movie,
            self.config.player.sample_url.clone(),
            interactor,
            router,
        );
        (presenter, rx)
    }

    pub fn movie_player_screen<R: MoviePlayerRouter>(
        &self,
        stream_url: String,
        backend: Box<dyn MediaBackend>,
        router: R,
    ) -> (MoviePlayerPresenter<R>, mpsc::Receiver<PlayerEvent>) {
        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let interactor = MoviePlayerInteractor::new(
            stream_url,
            backend,
            tx.clone(),
            self.config.player.progress_interval(),
        );
        let presenter = MoviePlayerPresenter::new(
            interactor,
            router,
            tx,
            self.config.player.controls_hide_delay(),
        );
        (presenter, rx)
    }
}
