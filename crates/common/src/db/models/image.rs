//! Image entity holding the binary payload of an image block

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "blog_images")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub post_id: i32,

    /// Set to null when the owning block is deleted
    pub block_id: Option<i32>,

    pub image_name: String,

    #[serde(skip)]
    pub image_data: Vec<u8>,

    #[sea_orm(nullable)]
    pub content_type: Option<String>,

    pub width: Option<i32>,

    pub height: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::post::Entity",
        from = "Column::PostId",
        to = "super::post::Column::Id",
        on_delete = "Cascade"
    )]
    Post,

    #[sea_orm(
        belongs_to = "super::content_block::Entity",
        from = "Column::BlockId",
        to = "super::content_block::Column::Id",
        on_delete = "SetNull"
    )]
    ContentBlock,
}

impl Related<super::post::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Post.def()
    }
}

impl Related<super::content_block::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ContentBlock.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
