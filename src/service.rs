use async_trait::async_trait;

use crate::api::{ApiClient, Endpoint, NetworkError};
use crate::tmdb::{Movie, MovieCategory, MovieCredit, MovieListResponse};

/// Typed catalog operations used by the screens.
///
/// Interactors only see this trait so tests can swap in a scripted catalog.
#[async_trait]
pub trait MovieService: Send + Sync {
    /// Fetch one page of a catalog category
    async fn fetch_movies(
        &self,
        category: MovieCategory,
        page: u32,
    ) -> Result<MovieListResponse, NetworkError>;

    async fn fetch_movie_detail(&self, movie_id: u64) -> Result<Movie, NetworkError>;

    /// Fetch the cast of a movie
    async fn fetch_movie_credits(&self, movie_id: u64) -> Result<MovieCredit, NetworkError>;
}

pub struct TmdbService {
    client: ApiClient,
}

impl TmdbService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl MovieService for TmdbService {
    async fn fetch_movies(
        &self,
        category: MovieCategory,
        page: u32,
    ) -> Result<MovieListResponse, NetworkError> {
        self.client
            .request(Endpoint::MovieList { category, page })
            .await
    }

    async fn fetch_movie_detail(&self, movie_id: u64) -> Result<Movie, NetworkError> {
        self.client
            .request(Endpoint::MovieDetail { id: movie_id })
            .await
    }

    async fn fetch_movie_credits(&self, movie_id: u64) -> Result<MovieCredit, NetworkError> {
        self.client
            .request(Endpoint::MovieCredits { id: movie_id })
            .await
    }
}
