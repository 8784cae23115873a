use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "cached_responses")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Upstream request URL (API key stripped)
    pub cache_key: String,
    #[sea_orm(column_type = "Text")]
    pub body_json: String,
    pub created_at: String,
    pub expires_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
