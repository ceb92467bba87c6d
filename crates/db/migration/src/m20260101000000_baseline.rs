use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::DatabaseBackend;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create().if_not_exists()
                    .table(Users::Table)
                    .col(pk_id_col(manager, Users::Id))
                    .col(uuid_col(Users::Uuid))
                    .col(ColumnDef::new(Users::Email).string_len(255).not_null())
                    .col(ColumnDef::new(Users::Name).string_len(255).not_null())
                    .col(ColumnDef::new(Users::PasswordHash).string_len(255).not_null())
                    .col(
                        ColumnDef::new(Users::Role)
                            .string_len(32)
                            .not_null()
                            .default(Expr::val("developer")),
                    )
                    .col(timestamp_col(Users::CreatedAt))
                    .col(timestamp_col(Users::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_users_uuid")
                    .table(Users::Table)
                    .col(Users::Uuid)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_users_email")
                    .table(Users::Table)
                    .col(Users::Email)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create().if_not_exists()
                    .table(UserAliases::Table)
                    .col(pk_id_col(manager, UserAliases::Id))
                    .col(uuid_col(UserAliases::Uuid))
                    .col(fk_id_col(manager, UserAliases::UserId))
                    .col(
                        ColumnDef::new(UserAliases::ExternalLoginId)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UserAliases::Active)
                            .boolean()
                            .not_null()
                            .default(Expr::val(true)),
                    )
                    .col(timestamp_col(UserAliases::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_aliases_user_id")
                            .from(UserAliases::Table, UserAliases::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_user_aliases_uuid")
                    .table(UserAliases::Table)
                    .col(UserAliases::Uuid)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_user_aliases_user_id")
                    .table(UserAliases::Table)
                    .col(UserAliases::UserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create().if_not_exists()
                    .table(Projects::Table)
                    .col(pk_id_col(manager, Projects::Id))
                    .col(uuid_col(Projects::Uuid))
                    .col(ColumnDef::new(Projects::Name).string_len(255).not_null())
                    .col(ColumnDef::new(Projects::Description).text())
                    .col(ColumnDef::new(Projects::StartDate).date())
                    .col(ColumnDef::new(Projects::EndDate).date())
                    .col(
                        ColumnDef::new(Projects::Status)
                            .string_len(32)
                            .not_null()
                            .default(Expr::val("active")),
                    )
                    .col(timestamp_col(Projects::CreatedAt))
                    .col(timestamp_col(Projects::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_projects_uuid")
                    .table(Projects::Table)
                    .col(Projects::Uuid)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_projects_name")
                    .table(Projects::Table)
                    .col(Projects::Name)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create().if_not_exists()
                    .table(WorkItems::Table)
                    .col(pk_id_col(manager, WorkItems::Id))
                    .col(uuid_col(WorkItems::Uuid))
                    .col(fk_id_col(manager, WorkItems::ProjectId))
                    .col(ColumnDef::new(WorkItems::Title).string_len(500).not_null())
                    .col(ColumnDef::new(WorkItems::Description).text())
                    .col(
                        ColumnDef::new(WorkItems::Kind)
                            .string_len(32)
                            .not_null()
                            .default(Expr::val("task")),
                    )
                    .col(
                        ColumnDef::new(WorkItems::Priority)
                            .string_len(32)
                            .not_null()
                            .default(Expr::val("medium")),
                    )
                    .col(
                        ColumnDef::new(WorkItems::Status)
                            .string_len(32)
                            .not_null()
                            .default(Expr::val("new")),
                    )
                    .col(ColumnDef::new(WorkItems::AssignedTo).string_len(255))
                    .col(ColumnDef::new(WorkItems::StartDate).date())
                    .col(ColumnDef::new(WorkItems::EndDate).date())
                    .col(ColumnDef::new(WorkItems::EstimatedHours).double())
                    .col(
                        ColumnDef::new(WorkItems::ActualHours)
                            .double()
                            .not_null()
                            .default(Expr::val(0.0)),
                    )
                    .col(ColumnDef::new(WorkItems::TShirtSize).string_len(10))
                    .col(ColumnDef::new(WorkItems::ExternalId).string_len(100))
                    .col(timestamp_col(WorkItems::CreatedAt))
                    .col(timestamp_col(WorkItems::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_work_items_project_id")
                            .from(WorkItems::Table, WorkItems::ProjectId)
                            .to(Projects::Table, Projects::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_work_items_uuid")
                    .table(WorkItems::Table)
                    .col(WorkItems::Uuid)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_work_items_project_id")
                    .table(WorkItems::Table)
                    .col(WorkItems::ProjectId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_work_items_external_id")
                    .table(WorkItems::Table)
                    .col(WorkItems::ExternalId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_work_items_assigned_to")
                    .table(WorkItems::Table)
                    .col(WorkItems::AssignedTo)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_work_items_status")
                    .table(WorkItems::Table)
                    .col(WorkItems::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create().if_not_exists()
                    .table(Backlogs::Table)
                    .col(pk_id_col(manager, Backlogs::Id))
                    .col(uuid_col(Backlogs::Uuid))
                    .col(fk_id_col(manager, Backlogs::ProjectId))
                    .col(ColumnDef::new(Backlogs::Title).string_len(500).not_null())
                    .col(ColumnDef::new(Backlogs::Description).text())
                    .col(
                        ColumnDef::new(Backlogs::Priority)
                            .integer()
                            .not_null()
                            .default(Expr::val(0)),
                    )
                    .col(
                        ColumnDef::new(Backlogs::Status)
                            .string_len(32)
                            .not_null()
                            .default(Expr::val("new")),
                    )
                    .col(ColumnDef::new(Backlogs::CreatedBy).string_len(255).not_null())
                    .col(timestamp_col(Backlogs::CreatedAt))
                    .col(timestamp_col(Backlogs::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_backlogs_project_id")
                            .from(Backlogs::Table, Backlogs::ProjectId)
                            .to(Projects::Table, Projects::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_backlogs_uuid")
                    .table(Backlogs::Table)
                    .col(Backlogs::Uuid)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_backlogs_project_id")
                    .table(Backlogs::Table)
                    .col(Backlogs::ProjectId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create().if_not_exists()
                    .table(ProgressEntries::Table)
                    .col(pk_id_col(manager, ProgressEntries::Id))
                    .col(uuid_col(ProgressEntries::Uuid))
                    .col(fk_id_col(manager, ProgressEntries::WorkItemId))
                    .col(
                        ColumnDef::new(ProgressEntries::UserEmail)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ProgressEntries::HoursWorked)
                            .double()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ProgressEntries::ProgressPercentage)
                            .double()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ProgressEntries::Notes).text())
                    .col(ColumnDef::new(ProgressEntries::EntryDate).date().not_null())
                    .col(timestamp_col(ProgressEntries::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_progress_entries_work_item_id")
                            .from(ProgressEntries::Table, ProgressEntries::WorkItemId)
                            .to(WorkItems::Table, WorkItems::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_progress_entries_uuid")
                    .table(ProgressEntries::Table)
                    .col(ProgressEntries::Uuid)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_progress_entries_work_item_id")
                    .table(ProgressEntries::Table)
                    .col(ProgressEntries::WorkItemId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create().if_not_exists()
                    .table(RemoteConfigs::Table)
                    .col(pk_id_col(manager, RemoteConfigs::Id))
                    .col(uuid_col(RemoteConfigs::Uuid))
                    .col(
                        ColumnDef::new(RemoteConfigs::OrganizationUrl)
                            .string_len(500)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RemoteConfigs::ProjectName)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RemoteConfigs::AccessToken)
                            .string_len(500)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RemoteConfigs::IsActive)
                            .boolean()
                            .not_null()
                            .default(Expr::val(true)),
                    )
                    .col(timestamp_col(RemoteConfigs::CreatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_remote_configs_uuid")
                    .table(RemoteConfigs::Table)
                    .col(RemoteConfigs::Uuid)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_remote_configs_is_active")
                    .table(RemoteConfigs::Table)
                    .col(RemoteConfigs::IsActive)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(RemoteConfigs::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ProgressEntries::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Backlogs::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(WorkItems::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Projects::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(UserAliases::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}

fn pk_id_col<T: Iden>(manager: &SchemaManager, col: T) -> ColumnDef {
    let mut col = ColumnDef::new(col);
    match manager.get_database_backend() {
        DatabaseBackend::Sqlite => {
            col.integer();
        }
        _ => {
            col.big_integer();
        }
    }
    col.not_null().auto_increment().primary_key().to_owned()
}

fn fk_id_col<T: Iden>(manager: &SchemaManager, col: T) -> ColumnDef {
    let mut col = ColumnDef::new(col);
    match manager.get_database_backend() {
        DatabaseBackend::Sqlite => {
            col.integer();
        }
        _ => {
            col.big_integer();
        }
    }
    col.not_null().to_owned()
}

fn uuid_col<T: Iden>(col: T) -> ColumnDef {
    ColumnDef::new(col).uuid().not_null().to_owned()
}

fn timestamp_col<T: Iden>(col: T) -> ColumnDef {
    ColumnDef::new(col)
        .timestamp()
        .not_null()
        .default(Expr::current_timestamp())
        .to_owned()
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
    Uuid,
    Email,
    Name,
    PasswordHash,
    Role,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum UserAliases {
    Table,
    Id,
    Uuid,
    UserId,
    ExternalLoginId,
    Active,
    CreatedAt,
}

#[derive(Iden)]
enum Projects {
    Table,
    Id,
    Uuid,
    Name,
    Description,
    StartDate,
    EndDate,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum WorkItems {
    Table,
    Id,
    Uuid,
    ProjectId,
    Title,
    Description,
    Kind,
    Priority,
    Status,
    AssignedTo,
    StartDate,
    EndDate,
    EstimatedHours,
    ActualHours,
    TShirtSize,
    ExternalId,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Backlogs {
    Table,
    Id,
    Uuid,
    ProjectId,
    Title,
    Description,
    Priority,
    Status,
    CreatedBy,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum ProgressEntries {
    Table,
    Id,
    Uuid,
    WorkItemId,
    UserEmail,
    HoursWorked,
    ProgressPercentage,
    Notes,
    EntryDate,
    CreatedAt,
}

#[derive(Iden)]
enum RemoteConfigs {
    Table,
    Id,
    Uuid,
    OrganizationUrl,
    ProjectName,
    AccessToken,
    IsActive,
    CreatedAt,
}
