use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// The registered company, stored as a single document.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    pub license_number: String,
    pub verified: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Deserialize, Debug, Validate, JsonSchema)]
pub struct CompanyRequest {
    #[validate(length(min = 1, message = "Company name is required"))]
    pub name: String,
    #[validate(email(message = "A valid company email is required"))]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    #[validate(length(min = 1, message = "Transport license number is required"))]
    pub license_number: String,
}

#[derive(Serialize, Debug, JsonSchema)]
pub struct CompanyResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub license_number: String,
    pub verified: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&Company> for CompanyResponse {
    fn from(company: &Company) -> Self {
        Self {
            id: company.id.clone(),
            name: company.name.clone(),
            email: company.email.clone(),
            phone: company.phone.clone(),
            address: company.address.clone(),
            license_number: company.license_number.clone(),
            verified: company.verified,
            created_at: company.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(name: &str, email: &str, license_number: &str) -> CompanyRequest {
        CompanyRequest {
            name: name.to_string(),
            email: email.to_string(),
            phone: String::new(),
            address: String::new(),
            license_number: license_number.to_string(),
        }
    }

    #[test]
    fn required_fields_are_validated() {
        assert!(request("SC Test SRL", "a@b.ro", "RO123").validate().is_ok());
        assert!(request("", "a@b.ro", "RO123").validate().is_err());
        assert!(request("SC Test SRL", "", "RO123").validate().is_err());
        assert!(request("SC Test SRL", "a@b.ro", "").validate().is_err());
    }

    #[test]
    fn stored_form_uses_camel_case_keys() {
        let company = Company {
            id: "1703123456789".to_string(),
            name: "SC Test SRL".to_string(),
            email: "a@b.ro".to_string(),
            phone: String::new(),
            address: String::new(),
            license_number: "RO123".to_string(),
            verified: true,
            created_at: Utc::now(),
        };

        let json = serde_json::to_value(&company).expect("serialize company");
        assert_eq!(json["licenseNumber"], "RO123");
        assert_eq!(json["verified"], true);
        assert!(json.get("createdAt").is_some());
    }
}
