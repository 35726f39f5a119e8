//! Checkout form and the customer details it produces.

use crate::validation::FieldErrors;
use serde::{Deserialize, Serialize};

pub const MAX_PERSON_NAME_LEN: usize = 20;
pub const MAX_PHONE_LEN: usize = 20;
pub const MAX_EMAIL_LEN: usize = 50;
pub const MAX_ADDRESS_LEN: usize = 100;

/// Delivery regions offered at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Region {
    Toshkent,
    Andijon,
    Namangan,
    Fargona,
    Sirdaryo,
    Jizzax,
    Samarqand,
    Qashqadaryo,
    Surxondaryo,
    Buxoro,
    Navoiy,
    Xorazm,
    Qoraqalpogiston,
}

impl Region {
    pub const ALL: [Region; 13] = [
        Region::Toshkent,
        Region::Andijon,
        Region::Namangan,
        Region::Fargona,
        Region::Sirdaryo,
        Region::Jizzax,
        Region::Samarqand,
        Region::Qashqadaryo,
        Region::Surxondaryo,
        Region::Buxoro,
        Region::Navoiy,
        Region::Xorazm,
        Region::Qoraqalpogiston,
    ];

    /// The form value, which is also what gets stored.
    pub fn as_str(&self) -> &'static str {
        match self {
            Region::Toshkent => "Toshkent",
            Region::Andijon => "Andijon",
            Region::Namangan => "Namangan",
            Region::Fargona => "Farg'ona",
            Region::Sirdaryo => "Sirdaryo",
            Region::Jizzax => "Jizzax",
            Region::Samarqand => "Samarqand",
            Region::Qashqadaryo => "Qashqadaryo",
            Region::Surxondaryo => "Surxondaryo",
            Region::Buxoro => "Buxoro",
            Region::Navoiy => "Navoiy",
            Region::Xorazm => "Xorazm",
            Region::Qoraqalpogiston => "Qoraqalpog'iston",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        Self::ALL.into_iter().find(|r| r.as_str() == s)
    }
}

/// Countries the shop delivers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Country {
    UZ,
}

impl Country {
    pub const ALL: [Country; 1] = [Country::UZ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Country::UZ => "UZ",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Country::UZ => "O'zbekiston",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "UZ" => Some(Country::UZ),
            _ => None,
        }
    }
}

/// How the customer intends to pay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentType {
    PayByCheck,
    WireTransfer,
}

impl PaymentType {
    pub const ALL: [PaymentType; 2] = [PaymentType::PayByCheck, PaymentType::WireTransfer];

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentType::PayByCheck => "PayByCheck",
            PaymentType::WireTransfer => "WireTransfer",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PaymentType::PayByCheck => "Pay By Check",
            PaymentType::WireTransfer => "Pay By Bank Wire Transfer",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "PayByCheck" => Some(PaymentType::PayByCheck),
            "WireTransfer" => Some(PaymentType::WireTransfer),
            _ => None,
        }
    }
}

/// A selectable value and its human label.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct Choice {
    pub value: &'static str,
    pub label: &'static str,
}

/// Allowed values for the select fields of the checkout form.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CheckoutChoices {
    pub regions: Vec<Choice>,
    pub countries: Vec<Choice>,
    pub payment_types: Vec<Choice>,
}

impl Default for CheckoutChoices {
    fn default() -> Self {
        Self {
            regions: Region::ALL
                .iter()
                .map(|r| Choice {
                    value: r.as_str(),
                    label: r.as_str(),
                })
                .collect(),
            countries: Country::ALL
                .iter()
                .map(|c| Choice {
                    value: c.as_str(),
                    label: c.label(),
                })
                .collect(),
            payment_types: PaymentType::ALL
                .iter()
                .map(|p| Choice {
                    value: p.as_str(),
                    label: p.label(),
                })
                .collect(),
        }
    }
}

/// Raw checkout form as posted by the browser.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CheckoutForm {
    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,
    pub email: String,
    pub address: String,
    pub city: String,
    pub region: String,
    pub country: String,
    pub payment_type: String,
}

/// Validated customer details copied onto the order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CustomerInfo {
    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,
    pub email: String,
    pub address: String,
    pub city: String,
    pub region: Region,
    pub country: Country,
    pub payment_type: PaymentType,
}

impl CheckoutForm {
    /// Validate every field, collecting all messages before failing.
    pub fn validate(&self) -> Result<CustomerInfo, FieldErrors> {
        let mut errors = FieldErrors::new();

        let first_name = errors.required_text("first_name", &self.first_name, MAX_PERSON_NAME_LEN);
        let last_name = errors.required_text("last_name", &self.last_name, MAX_PERSON_NAME_LEN);

        let phone_number = errors.required_text("phone_number", &self.phone_number, MAX_PHONE_LEN);
        if !phone_number.is_empty() && !is_phone_number(&phone_number) {
            errors.add("phone_number", "Invalid phone number.");
        }

        let email = errors.required_text("email", &self.email, MAX_EMAIL_LEN);
        if !email.is_empty() && !is_email(&email) {
            errors.add("email", "Invalid email address.");
        }

        let address = errors.required_text("address", &self.address, MAX_ADDRESS_LEN);
        let city = errors.required_text("city", &self.city, MAX_ADDRESS_LEN);

        let region = Region::parse(&self.region);
        if region.is_none() {
            errors.add("region", "Not a valid choice.");
        }
        let country = Country::parse(&self.country);
        if country.is_none() {
            errors.add("country", "Not a valid choice.");
        }
        let payment_type = PaymentType::parse(&self.payment_type);
        if payment_type.is_none() {
            errors.add("payment_type", "Not a valid choice.");
        }

        match (region, country, payment_type) {
            (Some(region), Some(country), Some(payment_type)) if errors.is_empty() => {
                Ok(CustomerInfo {
                    first_name,
                    last_name,
                    phone_number,
                    email,
                    address,
                    city,
                    region,
                    country,
                    payment_type,
                })
            }
            _ => Err(errors),
        }
    }
}

/// Digits with an optional leading `+`.
fn is_phone_number(s: &str) -> bool {
    let digits = s.strip_prefix('+').unwrap_or(s);
    !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
}

fn is_email(s: &str) -> bool {
    match s.split_once('@') {
        Some((local, domain)) => !local.is_empty() && !domain.is_empty() && !s.contains(' '),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_form() -> CheckoutForm {
        CheckoutForm {
            first_name: "Aziz".to_string(),
            last_name: "Karimov".to_string(),
            phone_number: "+998901234567".to_string(),
            email: "aziz@example.uz".to_string(),
            address: "Amir Temur 1".to_string(),
            city: "Toshkent".to_string(),
            region: "Farg'ona".to_string(),
            country: "UZ".to_string(),
            payment_type: "WireTransfer".to_string(),
        }
    }

    #[test]
    fn test_valid_form() {
        let info = valid_form().validate().unwrap();
        assert_eq!(info.region, Region::Fargona);
        assert_eq!(info.country, Country::UZ);
        assert_eq!(info.payment_type, PaymentType::WireTransfer);
    }

    #[test]
    fn test_empty_form_reports_every_field() {
        let errors = CheckoutForm::default().validate().unwrap_err();
        for field in [
            "first_name",
            "last_name",
            "phone_number",
            "email",
            "address",
            "city",
            "region",
            "country",
            "payment_type",
        ] {
            assert!(errors.contains(field), "missing error for {field}");
        }
    }

    #[test]
    fn test_bad_values() {
        let mut form = valid_form();
        form.phone_number = "90-123".to_string();
        form.email = "not-an-email".to_string();
        form.region = "Moscow".to_string();
        form.country = "KZ".to_string();
        form.first_name = "A".repeat(21);

        let errors = form.validate().unwrap_err();
        assert_eq!(errors.field("phone_number"), ["Invalid phone number."]);
        assert_eq!(errors.field("email"), ["Invalid email address."]);
        assert!(errors.contains("region"));
        assert!(errors.contains("country"));
        assert!(errors.contains("first_name"));
        assert!(!errors.contains("payment_type"));
    }

    #[test]
    fn test_choices_cover_all_regions() {
        let choices = CheckoutChoices::default();
        assert_eq!(choices.regions.len(), 13);
        assert_eq!(choices.countries[0].label, "O'zbekiston");
        assert!(choices.regions.iter().all(|c| Region::parse(c.value).is_some()));
    }
}
