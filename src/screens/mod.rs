//! Screen modules: each one has a view contract, a presenter, an interactor
//! and a router.
//!
//! Interactors run their work as tokio tasks and send the results back as
//! events over an mpsc channel. Whoever owns a screen drains that channel on
//! a single loop and hands every event to `presenter.handle(event, view)`, so
//! presenter state is only ever touched from that loop. Views are borrowed
//! for the duration of each presenter call and never stored.

pub mod movie_detail;
pub mod movie_list;
pub mod movie_player;

pub use movie_detail::{
    DetailEvent, DetailInteractor, MovieDetailInteractor, MovieDetailPresenter, MovieDetailRoute,
    MovieDetailRouter, MovieDetailView,
};
pub use movie_list::{
    ListEvent, ListInteractor, MovieListInteractor, MovieListPresenter, MovieListRoute,
    MovieListRouter, MovieListView,
};
pub use movie_player::{
    MediaBackend, MediaPlayer, MoviePlayerInteractor, MoviePlayerPresenter, MoviePlayerRouter,
    MoviePlayerView, PlaybackState, PlayerError, PlayerEvent,
};

/// Capacity of every screen's event channel
pub const EVENT_CHANNEL_CAPACITY: usize = 32;
