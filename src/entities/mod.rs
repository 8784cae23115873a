pub mod prelude;

pub mod cached_responses;
pub mod profile_favorites;
pub mod users;
pub mod watched_items;
pub mod watchlist_items;
