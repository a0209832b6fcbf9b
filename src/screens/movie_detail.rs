use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::api::NetworkError;
use crate::service::MovieService;
use crate::tmdb::{Cast, Movie, MovieCredit};

#[derive(Debug)]
pub enum DetailEvent {
    CreditsLoaded(MovieCredit),
    CreditsFailed(NetworkError),
}

pub trait MovieDetailView {
    fn setup(&mut self);
    fn reload_data(&mut self);
    fn show_error(&mut self, message: &str);
}

#[derive(Debug, Clone)]
pub enum MovieDetailRoute {
    PlayMovie {
        stream_url: String,
        movie: Option<Movie>,
    },
}

pub trait MovieDetailRouter {
    fn navigate(&mut self, route: MovieDetailRoute);
}

pub trait DetailInteractor {
    fn fetch_credits(&self, movie_id: u64);
}

pub struct MovieDetailInteractor {
    service: Arc<dyn MovieService>,
    events: mpsc::Sender<DetailEvent>,
}

impl MovieDetailInteractor {
    pub fn new(service: Arc<dyn MovieService>, events: mpsc::Sender<DetailEvent>) -> Self {
        Self { service, events }
    }
}

impl DetailInteractor for MovieDetailInteractor {
    fn fetch_credits(&self, movie_id: u64) {
        let service = Arc::clone(&self.service);
        let tx = self.events.clone();

        debug!(movie_id, "fetching credits");

        tokio::spawn(async move {
            let event = match service.fetch_movie_credits(movie_id).await {
                Ok(credits) => DetailEvent::CreditsLoaded(credits),
                Err(e) => DetailEvent::CreditsFailed(e),
            };
            if tx.send(event).await.is_err() {
                debug!(movie_id, "detail screen closed before credits arrived");
            }
        });
    }
}

pub struct MovieDetailPresenter<I, R> {
    movie: Movie,
    cast: Vec<Cast>,
    stream_url: String,
    interactor: I,
    router: R,
}

impl<I: DetailInteractor, R: MovieDetailRouter> MovieDetailPresenter<I, R> {
    pub fn new(movie: Movie, stream_url: String, interactor: I, router: R) -> Self {
        Self {
            movie,
            cast: Vec::new(),
            stream_url,
            interactor,
            router,
        }
    }

    pub fn view_did_load(&mut self, view: &mut dyn MovieDetailView) {
        view.setup();
        self.fetch_credits();
    }

    pub fn fetch_credits(&self) {
        self.interactor.fetch_credits(self.movie.id);
    }

    pub fn movie(&self) -> &Movie {
        &self.movie
    }

    pub fn cast_count(&self) -> usize {
        self.cast.len()
    }

    pub fn cast_member(&self, index: usize) -> Option<&Cast> {
        self.cast.get(index)
    }

    pub fn did_select_cast(&self, cast: &Cast) {
        info!(cast_id = cast.id, name = cast.display_name(), "cast member selected");
    }

    pub fn did_select_play_movie(&mut self) {
        self.router.navigate(MovieDetailRoute::PlayMovie {
            stream_url: self.stream_url.clone(),
            movie: Some(self.movie.clone()),
        });
    }

    pub fn handle(&mut self, event: DetailEvent, view: &mut dyn MovieDetailView) {
        match event {
            DetailEvent::CreditsLoaded(credits) => {
                debug!(movie_id = self.movie.id, count = credits.cast.len(), "credits loaded");
                self.cast = credits.cast;
                view.reload_data();
            }
            DetailEvent::CreditsFailed(error) => view.show_error(&error.to_string()),
        }
    }

    pub fn router(&self) -> &R {
        &self.router
    }

    pub fn router_mut(&mut self) -> &mut R {
        &mut self.router
    }
}
