use chrono::Utc;
use migration::OnConflict;
use sea_orm::{
    ActiveValue, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
};

use crate::server::model::entity::EntityProfile;

pub struct BusinessEntityRepository<'a, C: ConnectionTrait> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> BusinessEntityRepository<'a, C> {
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    /// Seeds business entities from configuration, updating existing rows by slug.
    ///
    /// Descriptive fields and status follow the configuration; `created_at` is kept.
    pub async fn upsert_many(
        &self,
        profiles: &[EntityProfile],
    ) -> Result<Vec<entity::business_entity::Model>, DbErr> {
        if profiles.is_empty() {
            return Ok(Vec::new());
        }

        let now = Utc::now().naive_utc();
        let entities = profiles
            .iter()
            .map(|profile| entity::business_entity::ActiveModel {
                slug: ActiveValue::Set(profile.slug.clone()),
                name: ActiveValue::Set(profile.name.clone()),
                legal_name: ActiveValue::Set(profile.legal_name.clone()),
                classification: ActiveValue::Set(profile.classification.as_str().to_string()),
                status: ActiveValue::Set(profile.status.as_str().to_string()),
                credential_ref: ActiveValue::Set(profile.credential_env.clone()),
                created_at: ActiveValue::Set(now),
                updated_at: ActiveValue::Set(now),
                ..Default::default()
            });

        entity::prelude::BusinessEntity::insert_many(entities)
            .on_conflict(
                OnConflict::column(entity::business_entity::Column::Slug)
                    .update_columns([
                        entity::business_entity::Column::Name,
                        entity::business_entity::Column::LegalName,
                        entity::business_entity::Column::Classification,
                        entity::business_entity::Column::Status,
                        entity::business_entity::Column::CredentialRef,
                        entity::business_entity::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec_with_returning(self.db)
            .await
    }

    pub async fn find_by_slug(
        &self,
        slug: &str,
    ) -> Result<Option<entity::business_entity::Model>, DbErr> {
        entity::prelude::BusinessEntity::find()
            .filter(entity::business_entity::Column::Slug.eq(slug))
            .one(self.db)
            .await
    }

    /// All business entities ordered by slug.
    pub async fn get_all(&self) -> Result<Vec<entity::business_entity::Model>, DbErr> {
        entity::prelude::BusinessEntity::find()
            .order_by_asc(entity::business_entity::Column::Slug)
            .all(self.db)
            .await
    }
}
