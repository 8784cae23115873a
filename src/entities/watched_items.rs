use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "watched_items")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(indexed)]
    pub user_id: String,
    pub tmdb_id: i32,
    pub r#type: String,
    pub title: String,
    pub poster_path: Option<String>,
    pub release_year: Option<String>,
    pub watched_at: String,
    pub rating: Option<i32>,
    pub notes: Option<String>,
    pub is_favorite: Option<bool>,
    /// Movie: total minutes, TV: episode runtime in minutes
    pub runtime: Option<i32>,
    pub watching_status: Option<String>,
    /// Movies only: seconds watched before a mid-playback drop
    pub watched_progress_seconds: Option<i32>,
    /// Comma-joined ISO 3166-1 codes, e.g. "KR" or "US,GB"
    pub origin_country: Option<String>,
    pub created_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
