use sea_orm::entity::prelude::*;

/// One row per activity creation or status change.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "apply_activity_history")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(indexed)]
    pub activity_id: Uuid,
    pub apply_id: Uuid,
    pub from_status: Option<super::apply_activity::Status>,
    pub to_status: super::apply_activity::Status,
    pub note: Option<String>,
    pub changed_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::apply_activity::Entity",
        from = "Column::ActivityId",
        to = "super::apply_activity::Column::Id",
        on_delete = "Cascade"
    )]
    ApplyActivity,
}

impl Related<super::apply_activity::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ApplyActivity.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
