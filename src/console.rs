//! Plain-text front-end: renders the list and detail screens to stdout.

use thiserror::Error;
use tokio::sync::mpsc;
use tracing::info;

use marquee::assembly::Assembly;
use marquee::screens::{
    MovieDetailRoute, MovieDetailRouter, MovieDetailView, MovieListRoute, MovieListRouter,
    MovieListView,
};
use marquee::tmdb::{ImageSize, Movie};

const MOVIES_PER_SECTION: usize = 5;
const CAST_SHOWN: usize = 10;

#[derive(Error, Debug)]
pub enum RunError {
    #[error("{0}")]
    Screen(String),
    #[error("screen closed before it finished loading")]
    Closed,
    #[error("catalog returned no movies")]
    Empty,
}

#[derive(Default)]
struct ConsoleListView {
    loading: bool,
    error: Option<String>,
}

impl MovieListView for ConsoleListView {
    fn show_loading(&mut self) {
        self.loading = true;
        println!("Loading catalog...");
    }

    fn hide_loading(&mut self) {
        self.loading = false;
    }

    fn reload_data(&mut self) {}

    fn show_error(&mut self, message: &str) {
        eprintln!("\x1b[31m✗\x1b[0m {}", message);
        self.error = Some(message.to_string());
    }
}

#[derive(Default)]
struct ConsoleListRouter {
    selected: Option<Movie>,
}

impl MovieListRouter for ConsoleListRouter {
    fn navigate(&mut self, route: MovieListRoute) {
        let MovieListRoute::Detail(movie) = route;
        self.selected = Some(movie);
    }
}

#[derive(Default)]
struct ConsoleDetailView {
    loaded: bool,
    error: Option<String>,
}

impl MovieDetailView for ConsoleDetailView {
    fn setup(&mut self) {}

    fn reload_data(&mut self) {
        self.loaded = true;
    }

    fn show_error(&mut self, message: &str) {
        eprintln!("\x1b[31m✗\x1b[0m {}", message);
        self.error = Some(message.to_string());
    }
}

#[derive(Default)]
struct ConsoleDetailRouter {
    stream_url: Option<String>,
}

impl MovieDetailRouter for ConsoleDetailRouter {
    fn navigate(&mut self, route: MovieDetailRoute) {
        let MovieDetailRoute::PlayMovie { stream_url, .. } = route;
        self.stream_url = Some(stream_url);
    }
}

async fn next_event<T>(rx: &mut mpsc::Receiver<T>) -> Result<T, RunError> {
    rx.recv().await.ok_or(RunError::Closed)
}

fn print_movie(movie: &Movie, image_base: &str) {
    let year = movie
        .year()
        .map(|y| format!(" ({})", y))
        .unwrap_or_default();
    let rating = movie
        .vote_average
        .map(|r| format!("  ★ {:.1}", r))
        .unwrap_or_default();
    println!("  {}{}{}", movie.display_title(), year, rating);
    if let Some(poster) = movie.poster_url(image_base, ImageSize::W500) {
        println!("    {}", poster);
    }
}

/// Show every section, page the first one once, then open the first movie
pub async fn run(assembly: &Assembly) -> Result<(), RunError> {
    let image_base = assembly.image_base_url().to_string();

    let (mut list, mut list_rx) = assembly.movie_list_screen(ConsoleListRouter::default());
    let mut list_view = ConsoleListView::default();

    list.view_did_load(&mut list_view);
    while list_view.loading {
        let event = next_event(&mut list_rx).await?;
        list.handle(event, &mut list_view);
    }
    if let Some(e) = list_view.error.take() {
        return Err(RunError::Screen(e));
    }

    for section in 0..list.section_count() {
        println!("\n{}", list.section_title(section));
        for movie in list.movies_for_section(section).iter().take(MOVIES_PER_SECTION) {
            print_movie(movie, &image_base);
        }
    }

    let before = list.movie_count(0);
    if list.load_more_if_needed(0) {
        let event = next_event(&mut list_rx).await?;
        list.handle(event, &mut list_view);
        if list_view.error.take().is_none() {
            info!(before, after = list.movie_count(0), "paged first section");
            println!(
                "\n{}: {} movies after loading page 2",
                list.section_title(0),
                list.movie_count(0)
            );
        }
    }

    let first = list
        .movies_for_section(0)
        .first()
        .cloned()
        .ok_or(RunError::Empty)?;
    list.did_select_movie(&first);
    let Some(movie) = list.router_mut().selected.take() else {
        return Ok(());
    };

    let (mut detail, mut detail_rx) =
        assembly.movie_detail_screen(movie, ConsoleDetailRouter::default());
    let mut detail_view = ConsoleDetailView::default();

    detail.view_did_load(&mut detail_view);
    let event = next_event(&mut detail_rx).await?;
    detail.handle(event, &mut detail_view);
    if let Some(e) = detail_view.error.take() {
        return Err(RunError::Screen(e));
    }

    let movie = detail.movie();
    println!("\n{}", movie.display_title());
    if let Some(overview) = movie.overview.as_deref().filter(|o| !o.is_empty()) {
        println!("  {}", overview);
    }
    if let Some(backdrop) = movie.backdrop_url(&image_base, ImageSize::W780) {
        println!("  {}", backdrop);
    }

    println!("\nCast ({})", detail.cast_count());
    for index in 0..detail.cast_count().min(CAST_SHOWN) {
        if let Some(cast) = detail.cast_member(index) {
            match cast.role() {
                Some(role) => println!("  {} as {}", cast.display_name(), role),
                None => println!("  {}", cast.display_name()),
            }
        }
    }

    detail.did_select_play_movie();
    if let Some(url) = detail.router_mut().stream_url.take() {
        println!("\nSample stream: {}", url);
    }

    Ok(())
}
