use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "sync_run")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub trigger: String,
    pub status: String,
    pub started_at: DateTime,
    pub finished_at: Option<DateTime>,
    pub entities_synced: i32,
    pub entities_failed: i32,
    pub accounts_touched: i32,
    pub new_transactions: i32,
    pub snapshots_written: i32,
    pub failure_reason: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::sync_run_outcome::Entity")]
    SyncRunOutcome,
}

impl Related<super::sync_run_outcome::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SyncRunOutcome.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
