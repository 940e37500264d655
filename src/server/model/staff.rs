use chrono::NaiveDate;
use derive_more::Display;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::server::database::impl_document;
use crate::server::model::{contains_ci, search_term};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, Serialize, Deserialize)]
pub(crate) enum StaffStatus {
    #[default]
    Active,
    #[serde(rename = "On Leave")]
    #[display("On Leave")]
    OnLeave,
    Inactive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, Serialize, Deserialize)]
pub(crate) enum Shift {
    #[default]
    Day,
    Morning,
    Evening,
    Night,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Staff {
    #[serde(default)]
    pub id: String,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub role: String,
    pub department: String,
    pub status: StaffStatus,
    pub join_date: NaiveDate,
    pub salary: Decimal,
    pub shift: Shift,
}

impl_document!(Staff, "staff", "staff");

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Department {
    #[serde(default)]
    pub id: String,
    pub name: String,
    pub head: String,
    /// recomputed from the staff list on read
    #[serde(default)]
    pub staff_count: usize,
}

impl_document!(Department, "departments", "dept");

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StaffPayload {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub role: String,
    pub department: String,
    #[serde(default)]
    pub status: StaffStatus,
    pub join_date: NaiveDate,
    pub salary: Decimal,
    #[serde(default)]
    pub shift: Shift,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct StaffFilter {
    pub search: Option<String>,
    pub department: Option<String>,
}

impl StaffFilter {
    pub fn matches(&self, staff: &Staff) -> bool {
        if let Some(term) = search_term(self.search.as_deref()) {
            if !contains_ci(&staff.full_name, &term)
                && !contains_ci(&staff.role, &term)
                && !contains_ci(&staff.email, &term)
            {
                return false;
            }
        }
        self.department
            .as_deref()
            .filter(|d| !d.is_empty() && *d != "all")
            .map_or(true, |d| staff.department == d)
    }
}
