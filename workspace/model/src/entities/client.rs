use chrono::NaiveDateTime;
use sea_orm::entity::prelude::*;

/// A company or person whose fiscal calendar is being tracked.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "clients")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    /// Registration number of the client with the tax authority.
    pub document: Option<String>,
    pub email: Option<String>,
    pub created_at: NaiveDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::tax::Entity")]
    Tax,
    #[sea_orm(has_many = "super::obligation::Entity")]
    Obligation,
    #[sea_orm(has_many = "super::installment::Entity")]
    Installment,
}

impl Related<super::tax::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Tax.def()
    }
}

impl Related<super::obligation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Obligation.def()
    }
}

impl Related<super::installment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Installment.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
