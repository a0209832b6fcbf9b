use serde::Deserialize;

pub const DEFAULT_IMAGE_BASE_URL: &str = "https://image.tmdb.org/t/p";

/// Fixed catalog segments shown as sections on the list screen.
///
/// Each one is a `sort_by` ordering of the `/discover/movie` endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MovieCategory {
    TopRated,
    Popularity,
    Revenue,
}

impl MovieCategory {
    /// Section order on the list screen
    pub const SECTIONS: [MovieCategory; 3] = [
        MovieCategory::TopRated,
        MovieCategory::Popularity,
        MovieCategory::Revenue,
    ];

    pub fn sort_by(&self) -> &'static str {
        match self {
            MovieCategory::TopRated => "vote_count.desc",
            MovieCategory::Popularity => "popularity.desc",
            MovieCategory::Revenue => "revenue.desc",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            MovieCategory::TopRated => "Top Rated",
            MovieCategory::Popularity => "Popular",
            MovieCategory::Revenue => "Revenue",
        }
    }
}

/// Width buckets served by the image CDN
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSize {
    W185,
    W500,
    W780,
    Original,
}

impl ImageSize {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageSize::W185 => "w185",
            ImageSize::W500 => "w500",
            ImageSize::W780 => "w780",
            ImageSize::Original => "original",
        }
    }
}

/// Join the CDN base, a width bucket and a path fragment returned by the API.
/// Fragments already start with a slash ("/abc.jpg").
pub fn image_url(base_url: &str, size: ImageSize, path: &str) -> String {
    format!(
        "{}/{}{}",
        base_url.trim_end_matches('/'),
        size.as_str(),
        path
    )
}

#[derive(Debug, Clone, Deserialize)]
pub struct Movie {
    pub id: u64,
    pub title: Option<String>,
    pub original_title: Option<String>,
    pub overview: Option<String>,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub release_date: Option<String>,
    pub vote_average: Option<f64>,
    pub vote_count: Option<u64>,
    pub popularity: Option<f64>,
    pub adult: Option<bool>,
    pub video: Option<bool>,
    #[serde(default)]
    pub genre_ids: Vec<u64>,
}

impl PartialEq for Movie {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Movie {}

impl Movie {
    pub fn display_title(&self) -> &str {
        self.title
            .as_deref()
            .or(self.original_title.as_deref())
            .unwrap_or("Unknown")
    }

    pub fn year(&self) -> Option<u16> {
        let date = self.release_date.as_deref()?;
        date.split('-').next()?.parse().ok()
    }

    pub fn poster_url(&self, base_url: &str, size: ImageSize) -> Option<String> {
        self.poster_path
            .as_deref()
            .map(|p| image_url(base_url, size, p))
    }

    pub fn backdrop_url(&self, base_url: &str, size: ImageSize) -> Option<String> {
        self.backdrop_path
            .as_deref()
            .map(|p| image_url(base_url, size, p))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Dates {
    pub maximum: Option<String>,
    pub minimum: Option<String>,
}

/// One page of a movie listing
#[derive(Debug, Clone, Deserialize)]
pub struct MovieListResponse {
    pub page: Option<u32>,
    #[serde(default)]
    pub results: Vec<Movie>,
    pub total_pages: Option<u32>,
    pub total_results: Option<u64>,
    pub dates: Option<Dates>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Cast {
    pub id: u64,
    pub name: Option<String>,
    pub character: Option<String>,
    pub known_for_department: Option<String>,
    pub profile_path: Option<String>,
    pub order: Option<u32>,
}

impl Cast {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("Unknown")
    }

    /// Character name when present, otherwise the department
    pub fn role(&self) -> Option<&str> {
        self.character
            .as_deref()
            .filter(|c| !c.is_empty())
            .or(self.known_for_department.as_deref())
    }

    pub fn profile_url(&self, base_url: &str, size: ImageSize) -> Option<String> {
        self.profile_path
            .as_deref()
            .map(|p| image_url(base_url, size, p))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MovieCredit {
    pub id: Option<u64>,
    #[serde(default)]
    pub cast: Vec<Cast>,
}
