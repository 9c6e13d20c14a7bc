use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "job_request")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub title: String,
    #[sea_orm(indexed)]
    pub process_template_id: Uuid,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::process_template::Entity",
        from = "Column::ProcessTemplateId",
        to = "super::process_template::Column::Id"
    )]
    ProcessTemplate,
}

impl Related<super::process_template::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProcessTemplate.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
