use serde::Serialize;

use crate::constants::limits::FAVORITE_SLOTS;
use crate::db::ProfileFavorite;
use crate::domain::MediaType;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteDto {
    pub position: i32,
    pub tmdb_id: i32,
    pub title: String,
    pub poster_path: Option<String>,
    pub release_year: Option<String>,
}

/// Both showcase rows, each a fixed-length slot array where an unset slot is
/// `null`.
#[derive(Debug, Serialize)]
pub struct FavoritesResponse {
    pub movies: Vec<Option<FavoriteDto>>,
    pub tv: Vec<Option<FavoriteDto>>,
}

impl FavoritesResponse {
    /// Spreads stored favorites into their positional slots. Rows with a
    /// position outside 1..=4 are ignored.
    #[must_use]
    pub fn from_rows(rows: &[ProfileFavorite]) -> Self {
        let slots = FAVORITE_SLOTS as usize;
        let mut movies: Vec<Option<FavoriteDto>> = vec![None; slots];
        let mut tv: Vec<Option<FavoriteDto>> = vec![None; slots];

        for row in rows {
            if row.position < 1 || row.position > FAVORITE_SLOTS {
                continue;
            }
            let dto = FavoriteDto {
                position: row.position,
                tmdb_id: row.tmdb_id,
                title: row.title.clone(),
                poster_path: row.poster_path.clone(),
                release_year: row.release_year.clone(),
            };
            let index = (row.position - 1) as usize;
            match MediaType::parse(&row.r#type) {
                Some(MediaType::Movie) => movies[index] = Some(dto),
                Some(MediaType::Tv) => tv[index] = Some(dto),
                None => {}
            }
        }

        Self { movies, tv }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemStatus {
    pub version: String,
    pub uptime: u64,
    pub watched_count: u64,
    pub watchlist_count: u64,
    pub user_count: u64,
    pub database: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(media_type: &str, position: i32, title: &str) -> ProfileFavorite {
        ProfileFavorite {
            id: position,
            user_id: "admin".to_string(),
            r#type: media_type.to_string(),
            position,
            tmdb_id: 100 + position,
            title: title.to_string(),
            poster_path: None,
            release_year: None,
            updated_at: "2026-08-01T00:00:00+00:00".to_string(),
        }
    }

    #[test]
    fn favorites_fill_their_slots_and_pad_with_null() {
        let rows = vec![row("movie", 2, "Heat"), row("tv", 4, "The Wire")];
        let response = FavoritesResponse::from_rows(&rows);

        assert_eq!(response.movies.len(), 4);
        assert!(response.movies[0].is_none());
        assert_eq!(response.movies[1].as_ref().map(|f| f.title.as_str()), Some("Heat"));
        assert_eq!(response.tv[3].as_ref().map(|f| f.title.as_str()), Some("The Wire"));

        let json = serde_json::to_value(&response).unwrap();
        assert!(json["movies"][0].is_null());
        assert_eq!(json["movies"][1]["tmdbId"], 102);
    }

    #[test]
    fn out_of_range_positions_are_ignored() {
        let rows = vec![row("movie", 9, "Bogus")];
        let response = FavoritesResponse::from_rows(&rows);
        assert!(response.movies.iter().all(Option::is_none));
    }
}
