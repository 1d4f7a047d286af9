use sea_orm_migration::prelude::*;

use crate::{counter, timestamp, user_fk};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Activities::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Activities::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Activities::UserId).uuid().not_null())
                    .col(ColumnDef::new(Activities::Kind).string_len(20).not_null())
                    .col(ColumnDef::new(Activities::Title).string().not_null())
                    .col(ColumnDef::new(Activities::Body).text().not_null())
                    .col(ColumnDef::new(Activities::Location).string())
                    .col(counter(Activities::LikesCount))
                    .col(counter(Activities::CommentsCount))
                    .col(timestamp(Activities::CreatedAt))
                    .col(timestamp(Activities::UpdatedAt))
                    .foreign_key(&mut user_fk(Activities::Table, Activities::UserId))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_activities_kind_created_at")
                    .table(Activities::Table)
                    .col(Activities::Kind)
                    .col(Activities::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Events::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Events::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Events::HostId).uuid().not_null())
                    .col(ColumnDef::new(Events::Title).string().not_null())
                    .col(ColumnDef::new(Events::Description).text().not_null())
                    .col(ColumnDef::new(Events::Location).string())
                    .col(timestamp(Events::StartsAt))
                    .col(ColumnDef::new(Events::EndsAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(Events::Capacity).big_integer())
                    .col(counter(Events::GuestsCount))
                    .col(counter(Events::CommentsCount))
                    .col(timestamp(Events::CreatedAt))
                    .foreign_key(&mut user_fk(Events::Table, Events::HostId))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_events_starts_at")
                    .table(Events::Table)
                    .col(Events::StartsAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Groups::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Groups::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Groups::OwnerId).uuid().not_null())
                    .col(ColumnDef::new(Groups::Name).string().not_null())
                    .col(ColumnDef::new(Groups::Description).text().not_null())
                    .col(ColumnDef::new(Groups::Privacy).string_len(20).not_null())
                    .col(counter(Groups::MembersCount))
                    .col(timestamp(Groups::CreatedAt))
                    .foreign_key(&mut user_fk(Groups::Table, Groups::OwnerId))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(News::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(News::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(News::AuthorId).uuid().not_null())
                    .col(ColumnDef::new(News::Title).string().not_null())
                    .col(ColumnDef::new(News::Body).text().not_null())
                    .col(ColumnDef::new(News::Category).string_len(50).not_null())
                    .col(ColumnDef::new(News::ImageUrl).string())
                    .col(counter(News::LikesCount))
                    .col(counter(News::CommentsCount))
                    .col(timestamp(News::CreatedAt))
                    .foreign_key(&mut user_fk(News::Table, News::AuthorId))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_news_category")
                    .table(News::Table)
                    .col(News::Category)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Polls::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Polls::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Polls::AuthorId).uuid().not_null())
                    .col(ColumnDef::new(Polls::Question).string().not_null())
                    .col(ColumnDef::new(Polls::Options).json_binary().not_null())
                    .col(counter(Polls::TotalVotes))
                    .col(ColumnDef::new(Polls::ClosesAt).timestamp_with_time_zone())
                    .col(timestamp(Polls::CreatedAt))
                    .foreign_key(&mut user_fk(Polls::Table, Polls::AuthorId))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Media::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Media::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Media::OwnerId).uuid().not_null())
                    .col(ColumnDef::new(Media::FileName).string().not_null())
                    .col(ColumnDef::new(Media::ContentType).string().not_null())
                    .col(ColumnDef::new(Media::MediaType).string_len(20).not_null())
                    .col(ColumnDef::new(Media::SizeBytes).big_integer().not_null())
                    .col(ColumnDef::new(Media::Url).string_len(2048).not_null())
                    .col(ColumnDef::new(Media::ThumbnailUrl).string_len(2048))
                    .col(ColumnDef::new(Media::HlsUrl).string_len(2048))
                    .col(ColumnDef::new(Media::Mp4Urls).json_binary().not_null())
                    .col(ColumnDef::new(Media::TranscodeStatus).string_len(20).not_null())
                    .col(timestamp(Media::CreatedAt))
                    .foreign_key(&mut user_fk(Media::Table, Media::OwnerId))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Reels::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Reels::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Reels::UserId).uuid().not_null())
                    .col(ColumnDef::new(Reels::MediaId).uuid().not_null())
                    .col(ColumnDef::new(Reels::Caption).string_len(500))
                    .col(counter(Reels::LikesCount))
                    .col(counter(Reels::CommentsCount))
                    .col(counter(Reels::ViewsCount))
                    .col(timestamp(Reels::CreatedAt))
                    .foreign_key(&mut user_fk(Reels::Table, Reels::UserId))
                    .foreign_key(
                        ForeignKey::create()
                            .from(Reels::Table, Reels::MediaId)
                            .to(Media::Table, Media::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for table in [
            Reels::Table.into_iden(),
            Media::Table.into_iden(),
            Polls::Table.into_iden(),
            News::Table.into_iden(),
            Groups::Table.into_iden(),
            Events::Table.into_iden(),
            Activities::Table.into_iden(),
        ] {
            manager
                .drop_table(Table::drop().table(table).to_owned())
                .await?;
        }
        Ok(())
    }
}

#[derive(DeriveIden)]
pub enum Activities {
    Table,
    Id,
    UserId,
    Kind,
    Title,
    Body,
    Location,
    LikesCount,
    CommentsCount,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
pub enum Events {
    Table,
    Id,
    HostId,
    Title,
    Description,
    Location,
    StartsAt,
    EndsAt,
    Capacity,
    GuestsCount,
    CommentsCount,
    CreatedAt,
}

#[derive(DeriveIden)]
pub enum Groups {
    Table,
    Id,
    OwnerId,
    Name,
    Description,
    Privacy,
    MembersCount,
    CreatedAt,
}

#[derive(DeriveIden)]
pub enum News {
    Table,
    Id,
    AuthorId,
    Title,
    Body,
    Category,
    ImageUrl,
    LikesCount,
    CommentsCount,
    CreatedAt,
}

#[derive(DeriveIden)]
pub enum Polls {
    Table,
    Id,
    AuthorId,
    Question,
    Options,
    TotalVotes,
    ClosesAt,
    CreatedAt,
}

#[derive(DeriveIden)]
pub enum Media {
    Table,
    Id,
    OwnerId,
    FileName,
    ContentType,
    MediaType,
    SizeBytes,
    Url,
    ThumbnailUrl,
    HlsUrl,
    Mp4Urls,
    TranscodeStatus,
    CreatedAt,
}

#[derive(DeriveIden)]
pub enum Reels {
    Table,
    Id,
    UserId,
    MediaId,
    Caption,
    LikesCount,
    CommentsCount,
    ViewsCount,
    CreatedAt,
}
