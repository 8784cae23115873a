pub mod cache;
pub mod favorites;
mod fields;
pub mod user;
pub mod watched;
pub mod watchlist;
