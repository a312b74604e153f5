//! Repository pattern for database operations
//!
//! The blog store: a transactional writer that persists an extracted
//! document in order, and the readers that reassemble it for the API.

use crate::content::{ContentPart, ImageMap, StagedImage};
use crate::db::models::*;
use crate::db::views::{ContentBlockView, PostDetail, PostSummary};
use crate::db::DbPool;
use crate::errors::{AppError, Result};
use crate::metrics;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, DatabaseConnection,
    DatabaseTransaction, DbErr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
    SqlErr, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{error, info, instrument, warn};
use validator::Validate;

/// Post metadata supplied to the writer
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewPost {
    #[validate(length(min = 1, max = 255))]
    pub title: String,

    #[validate(length(max = 100))]
    pub author: Option<String>,
}

impl NewPost {
    pub fn new(title: impl Into<String>, author: Option<String>) -> Self {
        Self {
            title: title.into(),
            author,
        }
    }
}

/// Outcome of a committed write
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StoredPost {
    pub post_id: i32,
    /// Content blocks created, one per input part
    pub blocks: usize,
    /// Image rows created
    pub images: usize,
    /// Image blocks stored without a payload
    pub degraded: usize,
}

/// Repository for data access operations
#[derive(Clone)]
pub struct Repository {
    pool: DbPool,
}

impl Repository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Get the read connection
    fn read_conn(&self) -> &DatabaseConnection {
        self.pool.read()
    }

    /// Get the write connection
    fn write_conn(&self) -> &DatabaseConnection {
        self.pool.write()
    }

    // ========================================================================
    // Health Check
    // ========================================================================

    /// Ping the database
    pub async fn ping(&self) -> Result<()> {
        self.pool.ping().await
    }

    // ========================================================================
    // Writer
    // ========================================================================

    /// Store a post and its ordered parts in a single transaction.
    ///
    /// Every part becomes a content block whose `sequence_order` is its index
    /// in `parts`. Image parts whose map entry has a staged file also get an
    /// image row; the others are kept as payload-less markers. Any failure
    /// rolls the whole post back.
    #[instrument(skip(self, parts, images), fields(title = %post.title, parts = parts.len()))]
    pub async fn store_post(
        &self,
        post: NewPost,
        parts: &[ContentPart],
        images: &ImageMap,
    ) -> Result<StoredPost> {
        post.validate()?;

        let txn = self.write_conn().begin().await?;

        match Self::insert_post_tree(&txn, &post, parts, images).await {
            Ok(stored) => {
                txn.commit().await.map_err(|e| AppError::Transaction {
                    message: format!("Commit failed: {}", e),
                })?;

                metrics::record_post_stored(stored.blocks, stored.images, stored.degraded);
                info!(
                    post_id = stored.post_id,
                    blocks = stored.blocks,
                    images = stored.images,
                    degraded = stored.degraded,
                    "Blog post committed"
                );

                Ok(stored)
            }
            Err(e) => {
                error!(error = %e, "Storing blog post failed, rolling back");
                if let Err(rollback_err) = txn.rollback().await {
                    warn!(error = %rollback_err, "Rollback failed");
                }
                Err(e)
            }
        }
    }

    async fn insert_post_tree(
        txn: &DatabaseTransaction,
        post: &NewPost,
        parts: &[ContentPart],
        images: &ImageMap,
    ) -> Result<StoredPost> {
        let now = chrono::Utc::now();

        let created = PostActiveModel {
            id: NotSet,
            title: Set(post.title.clone()),
            author: Set(post.author.clone()),
            pub_date: Set(now.into()),
            last_modified: Set(now.into()),
        }
        .insert(txn)
        .await
        .map_err(|e| title_conflict(e, &post.title))?;

        let mut stored = StoredPost {
            post_id: created.id,
            blocks: 0,
            images: 0,
            degraded: 0,
        };

        for (index, part) in parts.iter().enumerate() {
            let sequence = i32::try_from(index).map_err(|_| AppError::InvalidFormat {
                message: format!("Too many content blocks: {}", parts.len()),
            })?;

            match part {
                ContentPart::Paragraph { text } => {
                    insert_block(txn, created.id, BlockType::Paragraph, text, sequence).await?;
                }
                ContentPart::Image { id } => {
                    let block = insert_block(txn, created.id, BlockType::Image, id, sequence).await?;

                    match images.get(id).and_then(|entry| entry.staged.as_ref()) {
                        Some(staged) => {
                            insert_image(txn, created.id, block.id, staged).await?;
                            stored.images += 1;
                        }
                        None => {
                            warn!(image_id = %id, sequence, "Image has no staged payload, storing marker only");
                            stored.degraded += 1;
                        }
                    }
                }
            }

            stored.blocks += 1;
        }

        Ok(stored)
    }

    // ========================================================================
    // Post Operations
    // ========================================================================

    /// List all posts, oldest first
    pub async fn list_posts(&self) -> Result<Vec<PostSummary>> {
        let posts = PostEntity::find()
            .order_by_asc(PostColumn::Id)
            .all(self.read_conn())
            .await?;

        Ok(posts.iter().map(PostSummary::from).collect())
    }

    /// Find post by ID
    pub async fn find_post_by_id(&self, id: i32) -> Result<Option<Post>> {
        PostEntity::find_by_id(id)
            .one(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Find post by its unique title
    pub async fn find_post_by_title(&self, title: &str) -> Result<Option<Post>> {
        PostEntity::find()
            .filter(PostColumn::Title.eq(title))
            .one(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Count stored posts
    pub async fn count_posts(&self) -> Result<u64> {
        PostEntity::find()
            .count(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Load a post with its body in sequence order.
    ///
    /// Image blocks are enriched from their image row when one is still
    /// linked; otherwise they are returned bare.
    pub async fn get_post_detail(&self, id: i32) -> Result<PostDetail> {
        let post = self
            .find_post_by_id(id)
            .await?
            .ok_or(AppError::PostNotFound { id })?;

        let blocks = self.get_blocks_by_post(id).await?;

        let linked = ImageEntity::find()
            .filter(ImageColumn::PostId.eq(id))
            .filter(ImageColumn::BlockId.is_not_null())
            .order_by_asc(ImageColumn::Id)
            .all(self.read_conn())
            .await?;

        let mut by_block: HashMap<i32, Image> = HashMap::with_capacity(linked.len());
        for image in linked {
            if let Some(block_id) = image.block_id {
                by_block.entry(block_id).or_insert(image);
            }
        }

        let content_blocks = blocks
            .iter()
            .map(|block| {
                let image = match block.kind() {
                    BlockType::Image => by_block.get(&block.id),
                    _ => None,
                };
                ContentBlockView::new(block, image)
            })
            .collect();

        Ok(PostDetail {
            post: PostSummary::from(&post),
            content_blocks,
        })
    }

    /// Delete a post by title; blocks and images go with it
    pub async fn delete_post_by_title(&self, title: &str) -> Result<bool> {
        let result = PostEntity::delete_many()
            .filter(PostColumn::Title.eq(title))
            .exec(self.write_conn())
            .await?;

        Ok(result.rows_affected > 0)
    }

    // ========================================================================
    // Block Operations
    // ========================================================================

    /// Get content blocks for a post in sequence order
    pub async fn get_blocks_by_post(&self, post_id: i32) -> Result<Vec<ContentBlock>> {
        ContentBlockEntity::find()
            .filter(ContentBlockColumn::PostId.eq(post_id))
            .order_by_asc(ContentBlockColumn::SequenceOrder)
            .all(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Delete a single content block. A linked image row is kept with its
    /// block reference cleared.
    pub async fn delete_block(&self, block_id: i32) -> Result<bool> {
        let result = ContentBlockEntity::delete_by_id(block_id)
            .exec(self.write_conn())
            .await?;

        Ok(result.rows_affected > 0)
    }

    // ========================================================================
    // Image Operations
    // ========================================================================

    /// Fetch an image row with its payload
    pub async fn find_image(&self, id: i32) -> Result<Image> {
        ImageEntity::find_by_id(id)
            .one(self.read_conn())
            .await?
            .ok_or(AppError::ImageNotFound { id })
    }

    /// Get all image rows for a post
    pub async fn get_images_by_post(&self, post_id: i32) -> Result<Vec<Image>> {
        ImageEntity::find()
            .filter(ImageColumn::PostId.eq(post_id))
            .order_by_asc(ImageColumn::Id)
            .all(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Delete a single image row
    pub async fn delete_image(&self, id: i32) -> Result<bool> {
        let result = ImageEntity::delete_by_id(id)
            .exec(self.write_conn())
            .await?;

        Ok(result.rows_affected > 0)
    }
}

async fn insert_block(
    txn: &DatabaseTransaction,
    post_id: i32,
    block_type: BlockType,
    content: &str,
    sequence: i32,
) -> Result<ContentBlock> {
    ContentBlockActiveModel {
        id: NotSet,
        post_id: Set(post_id),
        block_type: Set(block_type.into()),
        content: Set(Some(content.to_string())),
        sequence_order: Set(sequence),
    }
    .insert(txn)
    .await
    .map_err(Into::into)
}

async fn insert_image(
    txn: &DatabaseTransaction,
    post_id: i32,
    block_id: i32,
    staged: &StagedImage,
) -> Result<Image> {
    // The extractor's staging directory must still exist at this point
    let data = tokio::fs::read(&staged.file_path)
        .await
        .map_err(|e| AppError::Internal {
            message: format!("Failed to read staged image {}: {}", staged.file_path.display(), e),
        })?;

    ImageActiveModel {
        id: NotSet,
        post_id: Set(post_id),
        block_id: Set(Some(block_id)),
        image_name: Set(staged.file_name.clone()),
        image_data: Set(data),
        content_type: Set(Some(staged.content_type.clone())),
        width: Set(i32::try_from(staged.width).ok()),
        height: Set(i32::try_from(staged.height).ok()),
    }
    .insert(txn)
    .await
    .map_err(Into::into)
}

/// Unique-title violations surface as conflicts, everything else as-is
fn title_conflict(err: DbErr, title: &str) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => AppError::Duplicate {
            message: format!("a blog post titled '{}' already exists", title),
        },
        _ => AppError::Database(err),
    }
}
