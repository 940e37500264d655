use serde::de::value::{Error as ValueError, StrDeserializer};
use serde::de::{DeserializeOwned, IntoDeserializer};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::server::controller::error::ApiError;

pub(crate) mod booking;
pub(crate) mod config;
pub(crate) mod guest;
pub(crate) mod housekeeping;
pub(crate) mod inventory;
pub(crate) mod invoice;
pub(crate) mod item;
pub(crate) mod order;
pub(crate) mod room;
pub(crate) mod setting;
pub(crate) mod staff;
pub(crate) mod table;
pub(crate) mod user;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct CommonRequestParams {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

impl CommonRequestParams {
    /// Slice one page out of an already filtered list; everything when no page size is given.
    pub fn paginate<T>(&self, items: Vec<T>) -> Vec<T> {
        match self.page_size {
            Some(size) if size > 0 => {
                let skip = self.page.unwrap_or(0) as usize * size as usize;
                items.into_iter().skip(skip).take(size as usize).collect()
            }
            _ => items,
        }
    }
}

/// `{success, data|error}` envelope returned by every route.
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn failure(error: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error),
        }
    }
}

/// Parse the wire form of a closed enumeration, e.g. `"checked_in"` or `"In Progress"`.
pub(crate) fn parse_enum<T: DeserializeOwned>(value: &str) -> Result<T, ApiError> {
    let de: StrDeserializer<'_, ValueError> = value.into_deserializer();
    T::deserialize(de).map_err(|_| ApiError::validation(format!("unknown value: {value}")))
}

/// Query-string filter value: empty and `"all"` mean no filter.
pub(crate) fn parse_filter<T: DeserializeOwned>(value: Option<&str>) -> Result<Option<T>, ApiError> {
    match value.map(str::trim) {
        None | Some("") | Some("all") => Ok(None),
        Some(v) => parse_enum(v).map(Some),
    }
}

/// Sum of money amounts; `None` once it no longer fits in a `Decimal`.
pub(crate) fn checked_sum(amounts: impl IntoIterator<Item = Decimal>) -> Option<Decimal> {
    amounts.into_iter().try_fold(Decimal::ZERO, Decimal::checked_add)
}

/// Case-insensitive substring match used by every list search box.
pub(crate) fn contains_ci(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}

/// Lower-cased, trimmed search term; `None` when blank.
pub(crate) fn search_term(search: Option<&str>) -> Option<String> {
    search
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase)
}
