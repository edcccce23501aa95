use axum::Json;

/// Genre names offered as recommendation filters
pub const GENRES: &[&str] = &[
    "Action",
    "Adventure",
    "Animation",
    "Comedy",
    "Crime",
    "Documentary",
    "Drama",
    "Family",
    "Fantasy",
    "History",
    "Horror",
    "Music",
    "Mystery",
    "Romance",
    "Science Fiction",
    "Thriller",
    "War",
    "Western",
];

/// Handler for the genre list
pub async fn list() -> Json<&'static [&'static str]> {
    Json(GENRES)
}
