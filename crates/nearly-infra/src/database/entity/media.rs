use sea_orm::Set;
use sea_orm::entity::prelude::*;

use nearly_core::domain::Media;
use nearly_core::error::RepoError;

use super::{from_json, parse_column, to_json};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "media")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub owner_id: Uuid,
    pub file_name: String,
    pub content_type: String,
    pub media_type: String,
    pub size_bytes: i64,
    pub url: String,
    pub thumbnail_url: Option<String>,
    pub hls_url: Option<String>,
    /// `[{quality, url}]`.
    pub mp4_urls: Json,
    pub transcode_status: String,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Media {
    type Error = RepoError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            owner_id: model.owner_id,
            file_name: model.file_name,
            content_type: model.content_type,
            media_type: parse_column("media.media_type", &model.media_type)?,
            size_bytes: model.size_bytes,
            url: model.url,
            thumbnail_url: model.thumbnail_url,
            hls_url: model.hls_url,
            mp4_urls: from_json("media.mp4_urls", model.mp4_urls)?,
            transcode_status: parse_column("media.transcode_status", &model.transcode_status)?,
            created_at: model.created_at.into(),
        })
    }
}

impl From<Media> for ActiveModel {
    fn from(m: Media) -> Self {
        Self {
            id: Set(m.id),
            owner_id: Set(m.owner_id),
            file_name: Set(m.file_name),
            content_type: Set(m.content_type),
            media_type: Set(m.media_type.as_str().to_string()),
            size_bytes: Set(m.size_bytes),
            url: Set(m.url),
            thumbnail_url: Set(m.thumbnail_url),
            hls_url: Set(m.hls_url),
            mp4_urls: Set(to_json(&m.mp4_urls)),
            transcode_status: Set(m.transcode_status.as_str().to_string()),
            created_at: Set(m.created_at.into()),
        }
    }
}
