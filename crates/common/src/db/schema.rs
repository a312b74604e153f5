//! Table bootstrap and teardown
//!
//! Creates the three blog tables from the entity definitions, including
//! their foreign keys, plus the unique `(post_id, sequence_order)` index.
//! There is no versioned migration history.

use crate::db::models::*;
use crate::errors::Result;
use sea_orm::sea_query::{Index, Table};
use sea_orm::{ConnectionTrait, DatabaseConnection, Schema};
use tracing::info;

/// Name of the unique index over a post's block positions
pub const BLOCK_SEQUENCE_INDEX: &str = "idx_blog_content_blocks_post_sequence";

/// Create all tables if they do not exist yet
pub async fn create_all(db: &DatabaseConnection) -> Result<()> {
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);

    // Parents before children so foreign keys resolve
    let mut posts = schema.create_table_from_entity(PostEntity);
    posts.if_not_exists();
    db.execute(backend.build(&posts)).await?;

    let mut blocks = schema.create_table_from_entity(ContentBlockEntity);
    blocks.if_not_exists();
    db.execute(backend.build(&blocks)).await?;

    let mut images = schema.create_table_from_entity(ImageEntity);
    images.if_not_exists();
    db.execute(backend.build(&images)).await?;

    let sequence_index = Index::create()
        .name(BLOCK_SEQUENCE_INDEX)
        .table(ContentBlockEntity)
        .col(ContentBlockColumn::PostId)
        .col(ContentBlockColumn::SequenceOrder)
        .unique()
        .if_not_exists()
        .to_owned();
    db.execute(backend.build(&sequence_index)).await?;

    info!("Blog tables ready");
    Ok(())
}

/// Drop all tables, children first
pub async fn drop_all(db: &DatabaseConnection) -> Result<()> {
    let backend = db.get_database_backend();

    let drops = [
        Table::drop().table(ImageEntity).if_exists().to_owned(),
        Table::drop().table(ContentBlockEntity).if_exists().to_owned(),
        Table::drop().table(PostEntity).if_exists().to_owned(),
    ];

    for stmt in drops {
        db.execute(backend.build(&stmt)).await?;
    }

    info!("Blog tables dropped");
    Ok(())
}
