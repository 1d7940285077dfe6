use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "bank_account")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub entity_id: i32,
    #[sea_orm(unique)]
    pub external_id: String,
    pub name: String,
    pub kind: String,
    pub masked_routing_number: Option<String>,
    pub masked_account_number: Option<String>,
    pub status: String,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::business_entity::Entity",
        from = "Column::EntityId",
        to = "super::business_entity::Column::Id"
    )]
    BusinessEntity,
}

impl Related<super::business_entity::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BusinessEntity.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
