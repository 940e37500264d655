use chrono::{DateTime, NaiveDate, Utc};
use derive_more::Display;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::server::database::impl_document;
use crate::server::model::{contains_ci, search_term};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, Serialize, Deserialize)]
pub(crate) enum LoyaltyTier {
    #[default]
    Bronze,
    Silver,
    Gold,
    Platinum,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Guest {
    #[serde(default)]
    pub id: String,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub nationality: String,
    #[serde(default)]
    pub passport_number: String,
    #[serde(default)]
    pub loyalty_tier: LoyaltyTier,
    #[serde(default)]
    pub loyalty_points: u64,
    #[serde(default)]
    pub total_stays: u32,
    #[serde(default)]
    pub total_spent: Decimal,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub last_stay: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

impl_document!(Guest, "guests", "guest");

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GuestPayload {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub nationality: String,
    #[serde(default)]
    pub passport_number: String,
    #[serde(default)]
    pub notes: String,
    /// ignored on create
    pub loyalty_tier: Option<LoyaltyTier>,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct GuestFilter {
    pub search: Option<String>,
    pub loyalty_tier: Option<LoyaltyTier>,
}

impl GuestFilter {
    pub fn matches(&self, guest: &Guest) -> bool {
        if let Some(term) = search_term(self.search.as_deref()) {
            let raw = self.search.as_deref().map(str::trim).unwrap_or_default();
            if !contains_ci(&guest.full_name, &term)
                && !contains_ci(&guest.email, &term)
                && !guest.phone.contains(raw)
            {
                return false;
            }
        }
        self.loyalty_tier.map_or(true, |t| guest.loyalty_tier == t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn guest(name: &str, phone: &str, tier: LoyaltyTier) -> Guest {
        Guest {
            id: String::new(),
            full_name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase().replace(' ', ".")),
            phone: phone.to_string(),
            address: String::new(),
            nationality: String::new(),
            passport_number: String::new(),
            loyalty_tier: tier,
            loyalty_points: 0,
            total_stays: 0,
            total_spent: Decimal::ZERO,
            notes: String::new(),
            last_stay: None,
            created_at: DateTime::<Utc>::from_timestamp(0, 0).unwrap(),
        }
    }

    #[test]
    fn search_covers_name_email_and_phone() {
        let g = guest("John Smith", "+1 (555) 123-4567", LoyaltyTier::Gold);
        let by = |s: &str| GuestFilter {
            search: Some(s.to_string()),
            loyalty_tier: None,
        };
        assert!(by("smith").matches(&g));
        assert!(by("JOHN.SMITH@").matches(&g));
        assert!(by("123-4567").matches(&g));
        assert!(!by("tanaka").matches(&g));
    }

    #[test]
    fn tier_filter() {
        let g = guest("John Smith", "", LoyaltyTier::Gold);
        let filter = GuestFilter {
            search: None,
            loyalty_tier: Some(LoyaltyTier::Platinum),
        };
        assert!(!filter.matches(&g));
        assert_eq!(serde_json::to_string(&LoyaltyTier::Bronze).unwrap(), "\"Bronze\"");
    }
}
