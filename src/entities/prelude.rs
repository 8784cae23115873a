pub use super::cached_responses::Entity as CachedResponses;
pub use super::profile_favorites::Entity as ProfileFavorites;
pub use super::users::Entity as Users;
pub use super::watched_items::Entity as WatchedItems;
pub use super::watchlist_items::Entity as WatchlistItems;
