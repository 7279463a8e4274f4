use serde::Serialize;

use crate::models::talent::{Passport, PassportCredential, PassportSocial};

pub const DEFAULT_LOCATION: &str = "Remote";

/// Flattened display record. This is the only shape the presentation layer
/// may depend on.
#[derive(Debug, Clone, Serialize)]
pub struct BuilderView {
    pub id: String,
    pub name: String,
    pub description: String,
    pub activity_score: f64,
    pub identity_score: f64,
    pub skills_score: f64,
    pub score: f64,
    pub human_checkmark: bool,
    pub location: String,
    pub tags: Vec<String>,
    pub image_url: String,
    pub socials: Vec<PassportSocial>,
    pub verified_wallets: Vec<String>,
    pub verified: bool,
    pub credentials: Vec<PassportCredential>,
}

impl From<Passport> for BuilderView {
    fn from(passport: Passport) -> Self {
        let profile = passport.passport_profile;
        Self {
            id: passport.main_wallet,
            name: profile.display_name,
            description: profile.bio,
            activity_score: passport.activity_score,
            identity_score: passport.identity_score,
            skills_score: passport.skills_score,
            score: passport.score,
            human_checkmark: passport.human_checkmark,
            location: profile
                .location
                .unwrap_or_else(|| DEFAULT_LOCATION.to_string()),
            tags: profile.tags,
            image_url: profile.image_url,
            socials: passport.passport_socials,
            verified_wallets: passport.verified_wallets,
            verified: passport.verified,
            credentials: passport.credentials.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub content: String,
    pub builders: Vec<BuilderView>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sparse_passport() -> Passport {
        serde_json::from_value(serde_json::json!({
            "main_wallet": "0x09928cebb4c977c5e5db237a2a2ce5cd10497cb8",
            "passport_profile": {}
        }))
        .expect("sparse record decodes")
    }

    #[test]
    fn normalization_is_total_over_sparse_records() {
        let view = BuilderView::from(sparse_passport());
        assert_eq!(view.location, DEFAULT_LOCATION);
        assert!(view.tags.is_empty());
        assert!(view.credentials.is_empty());
        assert!(view.socials.is_empty());
        assert_eq!(view.id, "0x09928cebb4c977c5e5db237a2a2ce5cd10497cb8");
    }

    #[test]
    fn normalization_renames_fields() {
        let passport: Passport = serde_json::from_value(serde_json::json!({
            "main_wallet": "0xabc",
            "score": 71.5,
            "activity_score": 60.0,
            "identity_score": 80.0,
            "skills_score": 74.5,
            "verified": true,
            "human_checkmark": true,
            "passport_profile": {
                "display_name": "thescoho",
                "bio": "builds things",
                "location": "Lisbon",
                "tags": ["solidity"],
                "image_url": "https://example.com/a.png"
            },
            "verified_wallets": ["0xabc"]
        }))
        .expect("record decodes");

        let view = BuilderView::from(passport);
        assert_eq!(view.name, "thescoho");
        assert_eq!(view.description, "builds things");
        assert_eq!(view.location, "Lisbon");
        assert_eq!(view.score, 71.5);
        assert!(view.verified && view.human_checkmark);
        assert_eq!(view.verified_wallets, vec!["0xabc".to_string()]);
    }
}
