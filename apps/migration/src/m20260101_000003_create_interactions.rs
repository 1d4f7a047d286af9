use sea_orm_migration::prelude::*;

use crate::m20260101_000002_create_content::{Events, Groups};
use crate::{counter, timestamp, user_fk};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(EventGuests::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(EventGuests::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(EventGuests::EventId).uuid().not_null())
                    .col(ColumnDef::new(EventGuests::UserId).uuid().not_null())
                    .col(ColumnDef::new(EventGuests::Status).string_len(20).not_null())
                    .col(timestamp(EventGuests::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .from(EventGuests::Table, EventGuests::EventId)
                            .to(Events::Table, Events::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(&mut user_fk(EventGuests::Table, EventGuests::UserId))
                    .to_owned(),
            )
            .await?;

        // One RSVP per user per event.
        manager
            .create_index(
                Index::create()
                    .name("uq_event_guests_event_user")
                    .table(EventGuests::Table)
                    .col(EventGuests::EventId)
                    .col(EventGuests::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(GroupMembers::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(GroupMembers::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(GroupMembers::GroupId).uuid().not_null())
                    .col(ColumnDef::new(GroupMembers::UserId).uuid().not_null())
                    .col(ColumnDef::new(GroupMembers::Role).string_len(20).not_null())
                    .col(timestamp(GroupMembers::JoinedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .from(GroupMembers::Table, GroupMembers::GroupId)
                            .to(Groups::Table, Groups::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(&mut user_fk(GroupMembers::Table, GroupMembers::UserId))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uq_group_members_group_user")
                    .table(GroupMembers::Table)
                    .col(GroupMembers::GroupId)
                    .col(GroupMembers::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Comments point at any content kind, so target_id has no foreign key.
        manager
            .create_table(
                Table::create()
                    .table(Comments::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Comments::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Comments::TargetKind).string_len(20).not_null())
                    .col(ColumnDef::new(Comments::TargetId).uuid().not_null())
                    .col(ColumnDef::new(Comments::UserId).uuid().not_null())
                    .col(ColumnDef::new(Comments::ParentCommentId).uuid())
                    .col(ColumnDef::new(Comments::Body).text().not_null())
                    .col(counter(Comments::LikesCount))
                    .col(timestamp(Comments::CreatedAt))
                    .foreign_key(&mut user_fk(Comments::Table, Comments::UserId))
                    .foreign_key(
                        ForeignKey::create()
                            .from(Comments::Table, Comments::ParentCommentId)
                            .to(Comments::Table, Comments::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_comments_target")
                    .table(Comments::Table)
                    .col(Comments::TargetKind)
                    .col(Comments::TargetId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Messages::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Messages::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Messages::SenderId).uuid().not_null())
                    .col(ColumnDef::new(Messages::RecipientId).uuid().not_null())
                    .col(ColumnDef::new(Messages::Body).text().not_null())
                    .col(ColumnDef::new(Messages::Read).boolean().not_null().default(false))
                    .col(timestamp(Messages::CreatedAt))
                    .foreign_key(&mut user_fk(Messages::Table, Messages::SenderId))
                    .foreign_key(&mut user_fk(Messages::Table, Messages::RecipientId))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Notifications::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Notifications::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Notifications::UserId).uuid().not_null())
                    .col(ColumnDef::new(Notifications::Kind).string_len(20).not_null())
                    .col(ColumnDef::new(Notifications::Title).string().not_null())
                    .col(ColumnDef::new(Notifications::Body).text())
                    .col(ColumnDef::new(Notifications::TargetKind).string_len(20))
                    .col(ColumnDef::new(Notifications::TargetId).uuid())
                    .col(
                        ColumnDef::new(Notifications::Read)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(timestamp(Notifications::CreatedAt))
                    .foreign_key(&mut user_fk(Notifications::Table, Notifications::UserId))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_notifications_user_read")
                    .table(Notifications::Table)
                    .col(Notifications::UserId)
                    .col(Notifications::Read)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Engagements::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Engagements::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Engagements::UserId).uuid().not_null())
                    .col(ColumnDef::new(Engagements::TargetKind).string_len(20).not_null())
                    .col(ColumnDef::new(Engagements::TargetId).uuid().not_null())
                    .col(ColumnDef::new(Engagements::Action).string_len(20).not_null())
                    .col(ColumnDef::new(Engagements::Choice).uuid())
                    .col(timestamp(Engagements::CreatedAt))
                    .foreign_key(&mut user_fk(Engagements::Table, Engagements::UserId))
                    .to_owned(),
            )
            .await?;

        // A user likes, saves or votes on a given target at most once.
        manager
            .create_index(
                Index::create()
                    .name("uq_engagements_user_target_action")
                    .table(Engagements::Table)
                    .col(Engagements::UserId)
                    .col(Engagements::TargetKind)
                    .col(Engagements::TargetId)
                    .col(Engagements::Action)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for table in [
            Engagements::Table.into_iden(),
            Notifications::Table.into_iden(),
            Messages::Table.into_iden(),
            Comments::Table.into_iden(),
            GroupMembers::Table.into_iden(),
            EventGuests::Table.into_iden(),
        ] {
            manager
                .drop_table(Table::drop().table(table).to_owned())
                .await?;
        }
        Ok(())
    }
}

#[derive(DeriveIden)]
enum EventGuests {
    Table,
    Id,
    EventId,
    UserId,
    Status,
    CreatedAt,
}

#[derive(DeriveIden)]
enum GroupMembers {
    Table,
    Id,
    GroupId,
    UserId,
    Role,
    JoinedAt,
}

#[derive(DeriveIden)]
enum Comments {
    Table,
    Id,
    TargetKind,
    TargetId,
    UserId,
    ParentCommentId,
    Body,
    LikesCount,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Messages {
    Table,
    Id,
    SenderId,
    RecipientId,
    Body,
    Read,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Notifications {
    Table,
    Id,
    UserId,
    Kind,
    Title,
    Body,
    TargetKind,
    TargetId,
    Read,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Engagements {
    Table,
    Id,
    UserId,
    TargetKind,
    TargetId,
    Action,
    Choice,
    CreatedAt,
}
