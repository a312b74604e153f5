//! Read-side shapes returned by the blog API

use crate::db::models::{ContentBlock, Image, Post};
use crate::TIMESTAMP_FORMAT;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Serialize;

/// Content type used when an image row has none recorded
pub const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// Post metadata as listed by the API
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostSummary {
    pub id: i32,
    pub title: String,
    pub author: Option<String>,
    pub pub_date: String,
    pub last_modified: String,
}

impl From<&Post> for PostSummary {
    fn from(post: &Post) -> Self {
        Self {
            id: post.id,
            title: post.title.clone(),
            author: post.author.clone(),
            pub_date: post.pub_date.format(TIMESTAMP_FORMAT).to_string(),
            last_modified: post.last_modified.format(TIMESTAMP_FORMAT).to_string(),
        }
    }
}

/// A post with its body reassembled in sequence order
#[derive(Debug, Clone, Serialize)]
pub struct PostDetail {
    #[serde(flatten)]
    pub post: PostSummary,
    pub content_blocks: Vec<ContentBlockView>,
}

/// One block of a post body
#[derive(Debug, Clone, Serialize)]
pub struct ContentBlockView {
    #[serde(rename = "type")]
    pub block_type: String,
    pub content: Option<String>,
    pub sequence: i32,

    /// Only present for image blocks that still have an image row
    #[serde(flatten)]
    pub image: Option<ImagePayload>,
}

impl ContentBlockView {
    pub fn new(block: &ContentBlock, image: Option<&Image>) -> Self {
        Self {
            block_type: block.block_type.clone(),
            content: block.content.clone(),
            sequence: block.sequence_order,
            image: image.map(ImagePayload::from),
        }
    }
}

/// Image fields inlined into an image block
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImagePayload {
    pub image_name: String,
    pub content_type: Option<String>,
    pub width: Option<i32>,
    pub height: Option<i32>,
    /// `data:<content type>;base64,<payload>`
    pub image_data: String,
}

impl From<&Image> for ImagePayload {
    fn from(image: &Image) -> Self {
        let content_type = image.content_type.as_deref().unwrap_or(FALLBACK_CONTENT_TYPE);

        Self {
            image_name: image.image_name.clone(),
            content_type: image.content_type.clone(),
            width: image.width,
            height: image.height,
            image_data: format!("data:{};base64,{}", content_type, STANDARD.encode(&image.image_data)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn image(content_type: Option<&str>) -> Image {
        Image {
            id: 1,
            post_id: 1,
            block_id: Some(2),
            image_name: "img_00000001.png".into(),
            image_data: b"abc".to_vec(),
            content_type: content_type.map(Into::into),
            width: Some(4),
            height: Some(3),
        }
    }

    #[test]
    fn test_data_uri() {
        let payload = ImagePayload::from(&image(Some("image/png")));
        assert_eq!(payload.image_data, "data:image/png;base64,YWJj");
        assert_eq!(payload.width, Some(4));
    }

    #[test]
    fn test_data_uri_without_content_type() {
        let payload = ImagePayload::from(&image(None));
        assert!(payload.image_data.starts_with("data:application/octet-stream;base64,"));
    }

    #[test]
    fn test_summary_timestamp_format() {
        let at = chrono::FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2024, 3, 9, 14, 5, 7)
            .unwrap();
        let post = Post {
            id: 5,
            title: "Smith charts".into(),
            author: Some("Xiaoyou Wu".into()),
            pub_date: at,
            last_modified: at,
        };

        let summary = PostSummary::from(&post);
        assert_eq!(summary.pub_date, "2024-03-09 14:05:07");
        assert_eq!(summary.last_modified, "2024-03-09 14:05:07");
    }

    #[test]
    fn test_block_without_image_omits_image_fields() {
        let block = ContentBlock {
            id: 2,
            post_id: 1,
            block_type: "image".into(),
            content: Some("img_00000001".into()),
            sequence_order: 3,
        };

        let json = serde_json::to_value(ContentBlockView::new(&block, None)).unwrap();
        let obj = json.as_object().unwrap();
        assert_eq!(obj.len(), 3);
        assert_eq!(json["type"], "image");
        assert_eq!(json["content"], "img_00000001");
        assert_eq!(json["sequence"], 3);
    }
}
