//! Records as handed over by the persistence collaborator. Nothing here is
//! trusted: every scalar is optional and parsed leniently, and a null or
//! malformed collection or nested record falls back to empty.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::utils::lenient::{
    lenient_datetime, lenient_f64, lenient_object, lenient_object_or_default, lenient_string,
    lenient_vec,
};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct RawWorkspace {
    #[serde(deserialize_with = "lenient_vec")]
    pub projects: Vec<RawProject>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct RawProject {
    #[serde(deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub name: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub status: Option<String>,
    #[serde(deserialize_with = "lenient_f64")]
    pub progress: Option<f64>,
    #[serde(deserialize_with = "lenient_f64")]
    pub budget: Option<f64>,
    #[serde(deserialize_with = "lenient_f64")]
    pub spent: Option<f64>,
    #[serde(deserialize_with = "lenient_datetime")]
    pub deadline: Option<DateTime<Utc>>,
    #[serde(deserialize_with = "lenient_datetime")]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(deserialize_with = "lenient_datetime")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(deserialize_with = "lenient_vec")]
    pub tasks: Vec<RawTask>,
    #[serde(deserialize_with = "lenient_vec")]
    pub members: Vec<RawMembership>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct RawTask {
    #[serde(deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub title: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub status: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub priority: Option<String>,
    #[serde(deserialize_with = "lenient_f64")]
    pub estimated_hours: Option<f64>,
    #[serde(deserialize_with = "lenient_datetime")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(deserialize_with = "lenient_datetime")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(deserialize_with = "lenient_object")]
    pub assignee: Option<RawUser>,
    #[serde(deserialize_with = "lenient_vec")]
    pub time_entries: Vec<RawTimeEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct RawTimeEntry {
    #[serde(deserialize_with = "lenient_f64")]
    pub hours: Option<f64>,
    #[serde(deserialize_with = "lenient_string")]
    pub user_id: Option<String>,
    #[serde(deserialize_with = "lenient_datetime")]
    pub date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct RawMembership {
    #[serde(deserialize_with = "lenient_object_or_default")]
    pub user: RawUser,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct RawUser {
    #[serde(deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub name: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub role: Option<String>,
}
