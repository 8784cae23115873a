//! Form state for the add/edit page and the payloads its actions submit.
//!
//! Every mutation of a watched record flows through the same upsert endpoint;
//! the builders here decide which keys each action carries. A key that is
//! absent leaves the stored column alone, an explicit `null` clears it.

use serde::Serialize;
use serde_json::{Map, Value, json};

use crate::db::WatchedItem;
use crate::services::catalog_service::ContentDetail;
use crate::services::mapper;

/// What the add/edit form shows when it opens, derived from the stored
/// record when one exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormState {
    pub watched_at: String,
    pub notes: String,
    /// Display-scale rating (1-5). `None` means unrated.
    pub rating: Option<i32>,
    pub is_favorite: bool,
    pub progress_minutes: Option<i32>,
    pub progress_seconds: Option<i32>,
    pub as_dropped: bool,
}

impl FormState {
    /// Derives the initial form state. `now` seeds the watched-at field when
    /// there is no stored record yet.
    #[must_use]
    pub fn derive(existing: Option<&WatchedItem>, now: &str) -> Self {
        let (progress_minutes, progress_seconds) =
            split_progress(existing.and_then(|item| item.watched_progress_seconds));

        Self {
            watched_at: existing.map_or_else(|| now.to_string(), |item| item.watched_at.clone()),
            notes: existing
                .and_then(|item| item.notes.clone())
                .unwrap_or_default(),
            rating: existing.and_then(|item| item.rating).map(display_rating),
            is_favorite: existing.and_then(|item| item.is_favorite).unwrap_or(false),
            progress_minutes,
            progress_seconds,
            as_dropped: existing
                .map(|item| item.watching_status.as_deref() == Some("dropped"))
                .unwrap_or(false),
        }
    }
}

/// Maps a stored rating onto the 1-5 display scale. Legacy records used a
/// ten-point scale; anything above 5 is halved and rounded.
///
/// ```rust
/// use watcharr::services::content_form::display_rating;
///
/// assert_eq!(display_rating(7), 4);
/// assert_eq!(display_rating(3), 3);
/// ```
#[must_use]
pub const fn display_rating(stored: i32) -> i32 {
    if stored > 5 { (stored + 1) / 2 } else { stored }
}

/// Splits stored progress into the minute and second form fields. Zero or
/// missing progress leaves both fields blank.
#[must_use]
pub const fn split_progress(seconds: Option<i32>) -> (Option<i32>, Option<i32>) {
    match seconds {
        Some(total) if total > 0 => (Some(total / 60), Some(total % 60)),
        _ => (None, None),
    }
}

/// Recombines the minute and second fields. Untouched fields yield `None`,
/// and so does a combined total of zero.
#[must_use]
pub fn combine_progress(minutes: Option<i32>, seconds: Option<i32>) -> Option<i32> {
    if minutes.is_none() && seconds.is_none() {
        return None;
    }
    let total = minutes.unwrap_or(0) * 60 + seconds.unwrap_or(0);
    (total > 0).then_some(total)
}

fn catalog_fields(detail: &ContentDetail) -> Map<String, Value> {
    let mut payload = Map::new();
    payload.insert("tmdbId".to_string(), json!(detail.id));
    payload.insert("title".to_string(), json!(detail.title));
    payload.insert("type".to_string(), json!(detail.media_type));
    payload.insert("posterPath".to_string(), json!(detail.poster_path));
    payload.insert("releaseYear".to_string(), json!(detail.release_year));
    payload
}

fn origin_country_joined(detail: &ContentDetail) -> Option<String> {
    let joined = detail.origin_country.join(",");
    (!joined.is_empty()).then_some(joined)
}

fn insert_trimmed_notes(payload: &mut Map<String, Value>, notes: &str) {
    let trimmed = notes.trim();
    if !trimmed.is_empty() {
        payload.insert("notes".to_string(), json!(trimmed));
    }
}

fn insert_movie_progress(payload: &mut Map<String, Value>, detail: &ContentDetail, form: &FormState) {
    if detail.media_type.is_tv() {
        return;
    }
    if let Some(progress) = combine_progress(form.progress_minutes, form.progress_seconds) {
        payload.insert("watchedProgressSeconds".to_string(), json!(progress));
    }
}

fn runtime_value(detail: &ContentDetail, existing: Option<&WatchedItem>) -> Value {
    json!(detail.runtime.or(existing.and_then(|item| item.runtime)))
}

/// Payload for the Add / Save action: the full form snapshot.
#[must_use]
pub fn save_payload(
    detail: &ContentDetail,
    form: &FormState,
    existing: Option<&WatchedItem>,
) -> Map<String, Value> {
    let mut payload = catalog_fields(detail);
    payload.insert("watchedAt".to_string(), json!(form.watched_at));
    payload.insert("rating".to_string(), json!(form.rating));
    payload.insert("isFavorite".to_string(), json!(form.is_favorite));
    payload.insert("runtime".to_string(), runtime_value(detail, existing));
    insert_trimmed_notes(&mut payload, &form.notes);
    if let Some(countries) = origin_country_joined(detail) {
        payload.insert("originCountry".to_string(), json!(countries));
    }

    if detail.media_type.is_tv() {
        let status = if form.as_dropped {
            "dropped".to_string()
        } else {
            existing
                .and_then(|item| item.watching_status.clone())
                .unwrap_or_else(|| "watching".to_string())
        };
        payload.insert("watchingStatus".to_string(), json!(status));
    } else if form.as_dropped {
        payload.insert("watchingStatus".to_string(), json!("dropped"));
    }

    insert_movie_progress(&mut payload, detail, form);
    payload
}

/// Payload for the Mark As Dropped action. Keeps the stored rating and
/// favorite flag when they exist, otherwise takes the form's values.
#[must_use]
pub fn drop_payload(
    detail: &ContentDetail,
    form: &FormState,
    existing: Option<&WatchedItem>,
    now: &str,
) -> Map<String, Value> {
    let mut payload = catalog_fields(detail);
    payload.insert(
        "watchedAt".to_string(),
        json!(existing.map_or_else(|| now.to_string(), |item| item.watched_at.clone())),
    );
    payload.insert(
        "rating".to_string(),
        json!(existing.and_then(|item| item.rating).or(form.rating)),
    );
    payload.insert(
        "isFavorite".to_string(),
        json!(
            existing
                .and_then(|item| item.is_favorite)
                .unwrap_or(form.is_favorite)
        ),
    );
    payload.insert("runtime".to_string(), runtime_value(detail, existing));
    payload.insert("watchingStatus".to_string(), json!("dropped"));
    insert_trimmed_notes(&mut payload, &form.notes);
    if let Some(countries) = origin_country_joined(detail) {
        payload.insert("originCountry".to_string(), json!(countries));
    }
    insert_movie_progress(&mut payload, detail, form);
    payload
}

/// Payload for the Remove Dropped Status action. Series go back to
/// "watching"; movies clear the status column entirely.
pub fn restore_payload(
    detail: &ContentDetail,
    existing: &WatchedItem,
) -> Result<Map<String, Value>, serde_json::Error> {
    let mut payload = mapper::model_to_item(existing)?;
    override_identity(&mut payload, detail);
    let status = if detail.media_type.is_tv() {
        json!("watching")
    } else {
        Value::Null
    };
    payload.insert("watchingStatus".to_string(), status);
    Ok(payload)
}

/// Payload for the Mark Completed action (series only).
pub fn complete_payload(
    detail: &ContentDetail,
    existing: &WatchedItem,
    now: &str,
) -> Result<Map<String, Value>, serde_json::Error> {
    let mut payload = mapper::model_to_item(existing)?;
    override_identity(&mut payload, detail);
    payload.insert("watchingStatus".to_string(), json!("completed"));
    payload.insert("watchedAt".to_string(), json!(now));
    Ok(payload)
}

/// Payload for persisting a favorite toggle on an existing record.
pub fn favorite_payload(
    detail: &ContentDetail,
    existing: &WatchedItem,
    favorite: bool,
) -> Result<Map<String, Value>, serde_json::Error> {
    let mut payload = mapper::model_to_item(existing)?;
    override_identity(&mut payload, detail);
    payload.insert("isFavorite".to_string(), json!(favorite));
    Ok(payload)
}

fn override_identity(payload: &mut Map<String, Value>, detail: &ContentDetail) {
    payload.insert("tmdbId".to_string(), json!(detail.id));
    payload.insert("title".to_string(), json!(detail.title));
    payload.insert("type".to_string(), json!(detail.media_type));
}

#[cfg(test)]
mod tests {
    use crate::domain::MediaType;

    use super::*;

    const NOW: &str = "2026-08-20T18:00:00+00:00";

    fn detail(media_type: MediaType) -> ContentDetail {
        ContentDetail {
            id: 603,
            media_type,
            title: "The Matrix".to_string(),
            overview: None,
            poster_path: Some("https://img.example/p.jpg".to_string()),
            release_year: Some("1999".to_string()),
            runtime: Some(136),
            origin_country: vec!["US".to_string()],
            genres: vec![],
            director: None,
            cast: vec![],
            vote_average: None,
            number_of_seasons: None,
            number_of_episodes: None,
            seasons: vec![],
            watch_link: None,
        }
    }

    fn existing() -> WatchedItem {
        WatchedItem {
            id: 11,
            user_id: "admin".to_string(),
            tmdb_id: 603,
            r#type: "movie".to_string(),
            title: "The Matrix".to_string(),
            poster_path: None,
            release_year: Some("1999".to_string()),
            watched_at: "2026-05-01T10:00:00+00:00".to_string(),
            rating: Some(8),
            notes: Some("rewatch".to_string()),
            is_favorite: Some(true),
            runtime: Some(120),
            watching_status: None,
            watched_progress_seconds: Some(125),
            origin_country: Some("US".to_string()),
            created_at: "2026-05-01T10:00:00+00:00".to_string(),
        }
    }

    fn blank_form() -> FormState {
        FormState::derive(None, NOW)
    }

    #[test]
    fn legacy_ten_point_ratings_are_halved_for_display() {
        assert_eq!(display_rating(8), 4);
        assert_eq!(display_rating(7), 4);
        assert_eq!(display_rating(10), 5);
        assert_eq!(display_rating(5), 5);
        assert_eq!(display_rating(3), 3);
    }

    #[test]
    fn progress_splits_and_recombines() {
        assert_eq!(split_progress(Some(125)), (Some(2), Some(5)));
        assert_eq!(split_progress(Some(0)), (None, None));
        assert_eq!(split_progress(None), (None, None));

        assert_eq!(combine_progress(Some(2), Some(5)), Some(125));
        assert_eq!(combine_progress(None, Some(5)), Some(5));
        assert_eq!(combine_progress(Some(0), Some(0)), None);
        assert_eq!(combine_progress(None, None), None);
    }

    #[test]
    fn derive_reflects_the_stored_record() {
        let item = existing();
        let form = FormState::derive(Some(&item), NOW);

        assert_eq!(form.watched_at, "2026-05-01T10:00:00+00:00");
        assert_eq!(form.notes, "rewatch");
        assert_eq!(form.rating, Some(4));
        assert!(form.is_favorite);
        assert_eq!(form.progress_minutes, Some(2));
        assert_eq!(form.progress_seconds, Some(5));
        assert!(!form.as_dropped);
    }

    #[test]
    fn derive_without_a_record_is_blank() {
        let form = blank_form();
        assert_eq!(form.watched_at, NOW);
        assert_eq!(form.notes, "");
        assert_eq!(form.rating, None);
        assert!(!form.is_favorite);
        assert_eq!(form.progress_minutes, None);
        assert!(!form.as_dropped);
    }

    #[test]
    fn derive_marks_dropped_records() {
        let mut item = existing();
        item.watching_status = Some("dropped".to_string());
        assert!(FormState::derive(Some(&item), NOW).as_dropped);
    }

    #[test]
    fn save_payload_for_a_movie_carries_progress_but_no_status() {
        let mut form = blank_form();
        form.progress_minutes = Some(1);
        form.progress_seconds = Some(30);

        let payload = save_payload(&detail(MediaType::Movie), &form, None);

        assert_eq!(payload["tmdbId"], json!(603));
        assert_eq!(payload["watchedProgressSeconds"], json!(90));
        assert!(!payload.contains_key("watchingStatus"));
        assert_eq!(payload["runtime"], json!(136));
        assert_eq!(payload["originCountry"], json!("US"));
    }

    #[test]
    fn save_payload_for_a_series_defaults_to_watching() {
        let payload = save_payload(&detail(MediaType::Tv), &blank_form(), None);
        assert_eq!(payload["watchingStatus"], json!("watching"));
        assert!(!payload.contains_key("watchedProgressSeconds"));
    }

    #[test]
    fn save_payload_preserves_an_existing_series_status() {
        let mut item = existing();
        item.watching_status = Some("completed".to_string());
        let payload = save_payload(&detail(MediaType::Tv), &blank_form(), Some(&item));
        assert_eq!(payload["watchingStatus"], json!("completed"));
    }

    #[test]
    fn save_payload_respects_the_dropped_checkbox() {
        let mut form = blank_form();
        form.as_dropped = true;

        let movie = save_payload(&detail(MediaType::Movie), &form, None);
        assert_eq!(movie["watchingStatus"], json!("dropped"));

        let series = save_payload(&detail(MediaType::Tv), &form, None);
        assert_eq!(series["watchingStatus"], json!("dropped"));
    }

    #[test]
    fn save_payload_omits_blank_notes() {
        let mut form = blank_form();
        form.notes = "   ".to_string();
        let payload = save_payload(&detail(MediaType::Movie), &form, None);
        assert!(!payload.contains_key("notes"));
    }

    #[test]
    fn drop_payload_prefers_stored_rating_and_favorite() {
        let mut form = blank_form();
        form.rating = Some(2);
        let item = existing();

        let payload = drop_payload(&detail(MediaType::Movie), &form, Some(&item), NOW);

        assert_eq!(payload["watchingStatus"], json!("dropped"));
        assert_eq!(payload["rating"], json!(8));
        assert_eq!(payload["isFavorite"], json!(true));
        assert_eq!(payload["watchedAt"], json!("2026-05-01T10:00:00+00:00"));
    }

    #[test]
    fn drop_payload_without_a_record_uses_the_form() {
        let mut form = blank_form();
        form.rating = Some(2);

        let payload = drop_payload(&detail(MediaType::Movie), &form, None, NOW);

        assert_eq!(payload["rating"], json!(2));
        assert_eq!(payload["watchedAt"], json!(NOW));
    }

    #[test]
    fn restore_payload_clears_movie_status_and_resumes_series() {
        let mut item = existing();
        item.watching_status = Some("dropped".to_string());

        let movie = restore_payload(&detail(MediaType::Movie), &item).unwrap();
        assert_eq!(movie["watchingStatus"], Value::Null);

        let series = restore_payload(&detail(MediaType::Tv), &item).unwrap();
        assert_eq!(series["watchingStatus"], json!("watching"));
    }

    #[test]
    fn complete_payload_stamps_a_fresh_watched_at() {
        let item = existing();
        let payload = complete_payload(&detail(MediaType::Tv), &item, NOW).unwrap();
        assert_eq!(payload["watchingStatus"], json!("completed"));
        assert_eq!(payload["watchedAt"], json!(NOW));
        assert_eq!(payload["notes"], json!("rewatch"));
    }

    #[test]
    fn favorite_payload_flips_only_the_flag() {
        let item = existing();
        let payload = favorite_payload(&detail(MediaType::Movie), &item, false).unwrap();
        assert_eq!(payload["isFavorite"], json!(false));
        assert_eq!(payload["rating"], json!(8));
        assert_eq!(payload["watchedAt"], json!("2026-05-01T10:00:00+00:00"));
    }
}
