//! Content block entity: one ordered unit of a post body

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Block kind as stored in `block_type`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockType {
    Paragraph,
    Image,
    Heading,
}

impl BlockType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockType::Paragraph => "paragraph",
            BlockType::Image => "image",
            BlockType::Heading => "heading",
        }
    }
}

impl From<&str> for BlockType {
    fn from(s: &str) -> Self {
        match s {
            "image" => BlockType::Image,
            "heading" => BlockType::Heading,
            _ => BlockType::Paragraph,
        }
    }
}

impl From<BlockType> for String {
    fn from(block_type: BlockType) -> Self {
        block_type.as_str().to_string()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "blog_content_blocks")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub post_id: i32,

    pub block_type: String,

    /// Paragraph text, or the image id for image blocks
    #[sea_orm(column_type = "Text", nullable)]
    pub content: Option<String>,

    /// Zero-based position within the post
    pub sequence_order: i32,
}

impl Model {
    pub fn kind(&self) -> BlockType {
        BlockType::from(self.block_type.as_str())
    }
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

    #[sea_orm(has_many = "super::image::Entity")]
    Images,
}

impl Related<super::post::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Post.def()
    }
}

impl Related<super::image::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Images.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
