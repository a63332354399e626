//! Status entity.
//!
//! Statuses are reference data seeded by migration; ids are stable so that
//! forms and tests can refer to them directly.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "status")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i32,

    /// Display name ("Open", "In Progress", ...)
    pub name: String,
}

impl Model {
    /// Name in kebab case, used for CSS classes (`status-in-progress`).
    #[must_use]
    pub fn kebab_name(&self) -> String {
        let mut out = String::with_capacity(self.name.len());
        for word in self.name.split(|c: char| !c.is_alphanumeric()) {
            if word.is_empty() {
                continue;
            }
            if !out.is_empty() {
                out.push('-');
            }
            out.push_str(&word.to_lowercase());
        }
        out
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::idea::Entity")]
    Ideas,
}

impl Related<super::idea::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Ideas.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
