use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Department {
    pub id: String,
    #[schema(example = "開発部")]
    pub name: String,
    #[schema(value_type = Option<String>, format = "date-time", nullable = true)]
    pub created_at: Option<NaiveDateTime>,
}
