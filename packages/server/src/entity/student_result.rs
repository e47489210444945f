use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One student's result document.
///
/// Subject and co-scholastic lists, and the derived aggregate, are JSON
/// columns so a record is read and written as a whole.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "student_result")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub roll_no: String,
    pub name: String,
    #[sea_orm(indexed)]
    pub class_name: String,
    pub section: String,
    pub father_name: String,
    pub mother_name: String,
    pub dob: Option<Date>,
    pub admission_no: Option<String>,

    pub total_present_days: i32,
    pub total_school_days: Option<i32>,
    /// Derived from the two attendance fields on every write.
    pub attendance_percentage: i32,

    /// Canonical `Subject` list.
    #[sea_orm(column_type = "JsonBinary")]
    pub subjects: serde_json::Value,
    #[sea_orm(column_type = "JsonBinary")]
    pub co_scholastic_areas: serde_json::Value,
    /// `Aggregate` or null when there are no subjects.
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub aggregate: Option<serde_json::Value>,

    pub photo_url: Option<String>,
    pub photo_public_id: Option<String>,

    pub fees_paid: bool,
    pub promoted_to_next_class: bool,
    pub result_declaration_date: Option<Date>,

    /// Shape version of `subjects`.
    pub schema_version: i32,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
