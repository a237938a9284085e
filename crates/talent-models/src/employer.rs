//! Employer profiles and company information.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::ModelResult;
use crate::user::{ProfileStatus, UserType};
use crate::validation::{validate_email_format, validate_http_url, validate_not_blank};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum CompanySize {
    #[serde(rename = "1-10")]
    Small,
    #[serde(rename = "11-50")]
    Medium,
    #[serde(rename = "51-200")]
    Large,
    #[serde(rename = "200+")]
    ExtraLarge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum Industry {
    Tech,
    Finance,
    Education,
    Healthcare,
    Retail,
    Hospitality,
    Manufacturing,
    Construction,
    Transportation,
    Telecommunications,
    Energy,
    Media,
    Entertainment,
    #[serde(rename = "Real Estate")]
    RealEstate,
    #[serde(rename = "Non-Profit")]
    NonProfit,
    Government,
    Agriculture,
    Pharmaceuticals,
    Automotive,
    Aerospace,
    Biotechnology,
    Chemicals,
    #[serde(rename = "Consumer Goods")]
    ConsumerGoods,
    #[serde(rename = "Food and Beverage")]
    FoodAndBeverage,
    Textiles,
    Insurance,
    Legal,
    Marketing,
    #[serde(rename = "Public Relations")]
    PublicRelations,
    Consulting,
    Advertising,
    #[serde(rename = "Event Management")]
    EventManagement,
    #[serde(rename = "Travel and Tourism")]
    TravelAndTourism,
    Sports,
    Fashion,
    Other,
}

/// An employer document as stored in the `employer` collection.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct EmployerProfile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub status: ProfileStatus,
    pub user_type: UserType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_size: Option<CompanySize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub industry: Option<Industry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linkedin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_website: Option<String>,
    pub company_benefits: Vec<String>,
    pub tech_stack: Vec<String>,
    /// Object key of the company logo.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_picture: Option<String>,
}

impl EmployerProfile {
    /// New pending employer created at sign-up.
    pub fn new(
        uid: &str,
        email: &str,
        first_name: &str,
        last_name: &str,
        company_name: Option<String>,
        contact_number: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            uid: Some(uid.to_string()),
            email: email.to_string(),
            first_name: first_name.trim().to_string(),
            last_name: last_name.trim().to_string(),
            status: ProfileStatus::Pending,
            user_type: UserType::Employer,
            created_at: Some(now),
            updated_at: Some(now),
            company_name,
            contact_number,
            ..Default::default()
        }
    }
}

/// Body of `update-company-info`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompanyInfo {
    #[validate(custom(function = "validate_not_blank"))]
    pub company_name: String,
    #[validate(custom(function = "validate_email_format"))]
    pub email: String,
    pub phone: String,
    pub country: String,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    #[validate(length(max = 500, message = "cannot exceed 500 characters"))]
    pub description: Option<String>,
    #[serde(default)]
    pub size: Option<CompanySize>,
    #[serde(default)]
    pub industry: Option<Industry>,
    #[serde(default)]
    #[validate(custom(function = "validate_http_url"))]
    pub linked_in: Option<String>,
    #[serde(default)]
    #[validate(custom(function = "validate_http_url"))]
    pub website: Option<String>,
    #[serde(default)]
    pub benefits: Vec<String>,
    #[serde(default)]
    pub tech_stack: Vec<String>,
}

/// Partial employer update. Only fields that are present are written.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmployerProfileUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "validate_not_blank"))]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "validate_not_blank"))]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 500, message = "cannot exceed 500 characters"))]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_size: Option<CompanySize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub industry: Option<Industry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "validate_http_url"))]
    pub linkedin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "validate_http_url"))]
    pub company_website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_benefits: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tech_stack: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_picture: Option<String>,
}

impl EmployerProfileUpdate {
    /// Fields present in this update, keyed by their stored name.
    pub fn present_fields(&self) -> ModelResult<serde_json::Map<String, serde_json::Value>> {
        match serde_json::to_value(self)? {
            serde_json::Value::Object(map) => Ok(map),
            _ => Ok(serde_json::Map::new()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.present_fields().map(|m| m.is_empty()).unwrap_or(true)
    }
}

impl From<CompanyInfo> for EmployerProfileUpdate {
    fn from(info: CompanyInfo) -> Self {
        Self {
            company_name: Some(info.company_name.trim().to_string()),
            phone: Some(info.phone),
            country: Some(info.country),
            city: info.city,
            description: info.description,
            company_size: info.size,
            industry: info.industry,
            linkedin: info.linked_in,
            company_website: info.website,
            company_benefits: Some(info.benefits),
            tech_stack: Some(info.tech_stack),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::validate_request;
    use serde_json::json;

    #[test]
    fn test_enum_wire_values() {
        assert_eq!(serde_json::to_value(CompanySize::ExtraLarge).unwrap(), json!("200+"));
        assert_eq!(
            serde_json::to_value(Industry::FoodAndBeverage).unwrap(),
            json!("Food and Beverage")
        );
        let industry: Industry = serde_json::from_value(json!("Non-Profit")).unwrap();
        assert_eq!(industry, Industry::NonProfit);
        assert!(serde_json::from_value::<Industry>(json!("Mining")).is_err());
    }

    #[test]
    fn test_company_info_validation() {
        let info: CompanyInfo = serde_json::from_value(json!({
            "companyName": "Acme",
            "email": "hr@acme.io",
            "phone": "0110000000",
            "country": "South Africa",
            "size": "11-50",
            "industry": "Tech",
            "linkedIn": "https://linkedin.com/company/acme",
            "website": "ftp://acme.io"
        }))
        .unwrap();
        let err = validate_request(&info).unwrap_err().to_string();
        assert!(err.contains("website"), "{err}");
    }

    #[test]
    fn test_description_limit() {
        let update = EmployerProfileUpdate {
            description: Some("x".repeat(501)),
            ..Default::default()
        };
        assert!(validate_request(&update).is_err());
        let update = EmployerProfileUpdate {
            description: Some("x".repeat(500)),
            ..Default::default()
        };
        assert!(validate_request(&update).is_ok());
    }

    #[test]
    fn test_present_fields_only() {
        let update: EmployerProfileUpdate = serde_json::from_value(json!({
            "city": "Durban",
            "techStack": ["Rust"]
        }))
        .unwrap();
        let fields = update.present_fields().unwrap();
        let mut keys: Vec<_> = fields.keys().cloned().collect();
        keys.sort();
        assert_eq!(keys, vec!["city", "techStack"]);
        assert!(EmployerProfileUpdate::default().is_empty());
    }

    #[test]
    fn test_company_info_maps_to_stored_names() {
        let info: CompanyInfo = serde_json::from_value(json!({
            "companyName": " Acme ",
            "email": "hr@acme.io",
            "phone": "0110000000",
            "country": "South Africa",
            "website": "https://acme.io",
            "benefits": ["Remote"]
        }))
        .unwrap();
        let fields = EmployerProfileUpdate::from(info).present_fields().unwrap();
        assert_eq!(fields["companyName"], "Acme");
        assert_eq!(fields["companyWebsite"], "https://acme.io");
        assert_eq!(fields["companyBenefits"], json!(["Remote"]));
        assert!(!fields.contains_key("email"));
    }
}
