//! SeaORM entity models
//!
//! Database entities for the blog store

mod content_block;
mod image;
mod post;

pub use post::{
    Entity as PostEntity,
    Model as Post,
    ActiveModel as PostActiveModel,
    Column as PostColumn,
};

pub use content_block::{
    Entity as ContentBlockEntity,
    Model as ContentBlock,
    ActiveModel as ContentBlockActiveModel,
    Column as ContentBlockColumn,
    BlockType,
};

pub use image::{
    Entity as ImageEntity,
    Model as Image,
    ActiveModel as ImageActiveModel,
    Column as ImageColumn,
};
