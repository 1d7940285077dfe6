use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "sync_run_outcome")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub sync_run_id: i32,
    /// Entity slug, stored by value so outcomes survive entity removal
    pub entity_slug: String,
    pub outcome: String,
    pub reason: Option<String>,
    pub accounts_synced: i32,
    pub accounts_failed: i32,
    pub new_transactions: i32,
    pub snapshots_written: i32,
    /// JSON encoded per-account failures
    pub detail: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::sync_run::Entity",
        from = "Column::SyncRunId",
        to = "super::sync_run::Column::Id"
    )]
    SyncRun,
}

impl Related<super::sync_run::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SyncRun.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
