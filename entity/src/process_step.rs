use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "process_step")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(indexed)]
    pub template_id: Uuid,
    pub step_order: i32,
    pub step_name: String,
    pub description: Option<String>,
    pub estimated_days: Option<i32>,
    pub created_at: DateTimeWithTimeZone,
    /// Set when the step is soft-deleted; such steps drop out of gating.
    pub deleted_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::process_template::Entity",
        from = "Column::TemplateId",
        to = "super::process_template::Column::Id",
        on_delete = "Cascade"
    )]
    ProcessTemplate,
}

impl Related<super::process_template::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProcessTemplate.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Model> for products_hr::Step {
    fn from(value: &Model) -> Self {
        products_hr::Step::new(value.id, value.step_order, value.step_name.clone())
    }
}
