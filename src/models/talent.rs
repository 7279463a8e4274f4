use serde::{Deserialize, Serialize};

/// One profile record as returned by the identity source. Optional fields
/// deserialize through defaults so a sparse record never fails decoding.
#[derive(Debug, Clone, Deserialize)]
pub struct Passport {
    pub main_wallet: String,
    #[serde(default)]
    pub passport_id: u64,
    #[serde(default)]
    pub score: f64,
    #[serde(default)]
    pub activity_score: f64,
    #[serde(default)]
    pub identity_score: f64,
    #[serde(default)]
    pub skills_score: f64,
    #[serde(default)]
    pub verified: bool,
    #[serde(default)]
    pub human_checkmark: bool,
    pub passport_profile: PassportProfile,
    #[serde(default)]
    pub passport_socials: Vec<PassportSocial>,
    #[serde(default)]
    pub verified_wallets: Vec<String>,
    #[serde(default)]
    pub credentials: Option<Vec<PassportCredential>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PassportProfile {
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Social entries pass through to the caller unchanged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PassportSocial {
    #[serde(default)]
    pub profile_name: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub profile_url: String,
    #[serde(default)]
    pub follower_count: Option<u64>,
    #[serde(default)]
    pub following_count: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PassportCredential {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub credential_type: String,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub score: f64,
    #[serde(default)]
    pub max_score: f64,
    #[serde(default)]
    pub earned_at: String,
    #[serde(default)]
    pub last_calculated_at: String,
}

/// Envelope for the single-record endpoint.
#[derive(Debug, Deserialize)]
pub struct PassportEnvelope {
    pub passport: Passport,
}

/// One page of the paginated listing endpoint.
#[derive(Debug, Deserialize)]
pub struct PassportsPage {
    #[serde(default)]
    pub passports: Vec<Passport>,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Pagination {
    pub current_page: u32,
    pub last_page: u32,
    pub total: u64,
}

#[derive(Debug, Deserialize)]
pub struct CredentialsResponse {
    #[serde(default)]
    pub passport_credentials: Vec<PassportCredential>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sparse_passport_decodes_with_defaults() {
        let json = serde_json::json!({
            "main_wallet": "0xabc",
            "passport_profile": {}
        });
        let passport: Passport = serde_json::from_value(json).expect("sparse record decodes");
        assert_eq!(passport.main_wallet, "0xabc");
        assert_eq!(passport.score, 0.0);
        assert!(passport.passport_socials.is_empty());
        assert!(passport.credentials.is_none());
        assert!(passport.passport_profile.location.is_none());
        assert!(passport.passport_profile.tags.is_empty());
    }

    #[test]
    fn credential_type_field_rename() {
        let json = serde_json::json!({
            "name": "GitHub contributions",
            "type": "github",
            "score": 12.5,
            "max_score": 20.0
        });
        let credential: PassportCredential =
            serde_json::from_value(json).expect("credential decodes");
        assert_eq!(credential.credential_type, "github");
        let encoded = serde_json::to_value(&credential).expect("credential encodes");
        assert_eq!(encoded["type"], "github");
    }

    #[test]
    fn listing_page_decodes_pagination() {
        let json = serde_json::json!({
            "passports": [],
            "pagination": { "current_page": 1, "last_page": 3, "total": 61 }
        });
        let page: PassportsPage = serde_json::from_value(json).expect("page decodes");
        assert_eq!(page.pagination.last_page, 3);
        assert_eq!(page.pagination.total, 61);
        assert!(page.passports.is_empty());
    }
}
