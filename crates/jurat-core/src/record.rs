//! Raw and canonical client records
//!
//! [`RawClientRecord`] is what an intake channel captured: every field is
//! optional, and name and address may arrive either structured or as one
//! free-text string. [`NormalizedClientRecord`] is the total, canonical form
//! produced by [`crate::normalize`]: every field is a `String`, possibly
//! empty, and the record can be looked up by its camelCase key.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Channel a client record was captured through
///
/// Channels this crate does not know (a web form, a partner integration)
/// are kept verbatim as [`IntakeSource::Other`] so stored records survive a
/// load and save unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum IntakeSource {
    /// Entered by staff on behalf of the client
    #[default]
    Assistant,
    /// Submitted by the client through a shared intake link
    Client,
    /// Any other channel name
    #[serde(untagged)]
    Other(String),
}

impl IntakeSource {
    /// Wire name
    pub fn as_str(&self) -> &str {
        match self {
            Self::Assistant => "assistant",
            Self::Client => "client",
            Self::Other(name) => name,
        }
    }
}

impl fmt::Display for IntakeSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for IntakeSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "" => Err("Empty intake source".to_string()),
            "assistant" => Ok(Self::Assistant),
            "client" => Ok(Self::Client),
            _ => Ok(Self::Other(s.to_string())),
        }
    }
}

/// Client record as captured by an intake channel
///
/// A field counts as present only when it is `Some` and non-empty; intake
/// forms routinely submit empty strings for untouched inputs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawClientRecord {
    pub id: Option<String>,
    pub form_id: Option<String>,
    pub source: Option<IntakeSource>,
    pub created_at: Option<String>,

    pub first_name: Option<String>,
    pub middle_name: Option<String>,
    pub last_name: Option<String>,
    pub full_name: Option<String>,
    pub preferred_name: Option<String>,

    pub alien_number: Option<String>,
    pub uscis_account_number: Option<String>,
    pub date_of_birth: Option<String>,
    pub date_became_permanent_resident: Option<String>,
    pub ssn: Option<String>,
    pub country_of_birth: Option<String>,
    pub citizenship: Option<String>,

    pub email: Option<String>,
    pub phone: Option<String>,

    pub gender: Option<String>,
    pub height_feet: Option<String>,
    pub height_inches: Option<String>,
    pub weight: Option<String>,
    pub eye_color: Option<String>,
    pub hair_color: Option<String>,

    pub marital_status: Option<String>,
    pub spouse_name: Option<String>,
    pub occupation: Option<String>,
    pub employer: Option<String>,

    pub address: Option<String>,
    pub address_line1: Option<String>,
    pub address_line2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub country: Option<String>,

    pub trips_count: Option<String>,
    pub trips_days: Option<String>,
    pub notes: Option<String>,
}

/// How a raw record supplies the client's name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameInput<'a> {
    /// At least one of first or last name is present
    Structured {
        first: &'a str,
        middle: &'a str,
        last: &'a str,
    },
    /// Only a single free-text full name
    FreeText(&'a str),
    /// No name at all
    Missing,
}

/// How a raw record supplies the client's address
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressInput<'a> {
    /// The street line is present; structured fields are authoritative
    Structured,
    /// No street line, but a free-text address to fall back on
    FreeText(&'a str),
    /// Neither; whatever structured parts exist are used as-is
    Missing,
}

/// Borrow an optional field, treating empty strings as absent
pub(crate) fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

impl RawClientRecord {
    /// Classify the name representation, structured first
    pub fn name_input(&self) -> NameInput<'_> {
        if present(&self.first_name).is_some() || present(&self.last_name).is_some() {
            return NameInput::Structured {
                first: present(&self.first_name).unwrap_or_default(),
                middle: present(&self.middle_name).unwrap_or_default(),
                last: present(&self.last_name).unwrap_or_default(),
            };
        }
        match present(&self.full_name) {
            Some(full_name) => NameInput::FreeText(full_name),
            None => NameInput::Missing,
        }
    }

    /// Classify the address representation, structured first
    pub fn address_input(&self) -> AddressInput<'_> {
        if present(&self.address_line1).is_some() {
            return AddressInput::Structured;
        }
        match present(&self.address) {
            Some(address) => AddressInput::FreeText(address),
            None => AddressInput::Missing,
        }
    }
}

/// Canonical, total client record
///
/// Every field is always defined. Keys used by form schemas and binding
/// rules are the camelCase serde names (`addressNumber`,
/// `formattedDateOfBirth`, ...), resolved through [`Self::field`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NormalizedClientRecord {
    pub id: String,
    pub form_id: String,
    pub source: String,
    pub created_at: String,

    pub first_name: String,
    pub middle_name: String,
    pub last_name: String,
    pub full_name: String,
    pub preferred_name: String,

    pub alien_number: String,
    pub uscis_account_number: String,
    pub date_of_birth: String,
    pub formatted_date_of_birth: String,
    pub date_became_permanent_resident: String,
    pub formatted_date_became_permanent_resident: String,
    pub ssn: String,
    pub country_of_birth: String,
    pub citizenship: String,

    pub email: String,
    pub phone: String,

    pub gender: String,
    pub height_feet: String,
    pub height_inches: String,
    pub weight: String,
    pub eye_color: String,
    pub hair_color: String,

    pub marital_status: String,
    pub spouse_name: String,
    pub occupation: String,
    pub employer: String,

    pub address: String,
    pub address_line1: String,
    pub address_line2: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
    pub address_number: String,
    pub address_street: String,

    pub trips_count: String,
    pub trips_days: String,
    pub notes: String,
}

impl NormalizedClientRecord {
    /// Every key [`Self::field`] resolves
    pub const KEYS: &'static [&'static str] = &[
        "id",
        "formId",
        "source",
        "createdAt",
        "firstName",
        "middleName",
        "lastName",
        "fullName",
        "preferredName",
        "alienNumber",
        "uscisAccountNumber",
        "dateOfBirth",
        "formattedDateOfBirth",
        "dateBecamePermanentResident",
        "formattedDateBecamePermanentResident",
        "ssn",
        "countryOfBirth",
        "citizenship",
        "email",
        "phone",
        "gender",
        "heightFeet",
        "heightInches",
        "weight",
        "eyeColor",
        "hairColor",
        "maritalStatus",
        "spouseName",
        "occupation",
        "employer",
        "address",
        "addressLine1",
        "addressLine2",
        "city",
        "state",
        "zipCode",
        "country",
        "addressNumber",
        "addressStreet",
        "tripsCount",
        "tripsDays",
        "notes",
    ];

    /// Look up a field by its canonical key
    ///
    /// Returns `None` only for keys that are not part of the canonical
    /// record; known fields always resolve, possibly to `""`.
    pub fn field(&self, key: &str) -> Option<&str> {
        let value = match key {
            "id" => &self.id,
            "formId" => &self.form_id,
            "source" => &self.source,
            "createdAt" => &self.created_at,
            "firstName" => &self.first_name,
            "middleName" => &self.middle_name,
            "lastName" => &self.last_name,
            "fullName" => &self.full_name,
            "preferredName" => &self.preferred_name,
            "alienNumber" => &self.alien_number,
            "uscisAccountNumber" => &self.uscis_account_number,
            "dateOfBirth" => &self.date_of_birth,
            "formattedDateOfBirth" => &self.formatted_date_of_birth,
            "dateBecamePermanentResident" => &self.date_became_permanent_resident,
            "formattedDateBecamePermanentResident" => {
                &self.formatted_date_became_permanent_resident
            }
            "ssn" => &self.ssn,
            "countryOfBirth" => &self.country_of_birth,
            "citizenship" => &self.citizenship,
            "email" => &self.email,
            "phone" => &self.phone,
            "gender" => &self.gender,
            "heightFeet" => &self.height_feet,
            "heightInches" => &self.height_inches,
            "weight" => &self.weight,
            "eyeColor" => &self.eye_color,
            "hairColor" => &self.hair_color,
            "maritalStatus" => &self.marital_status,
            "spouseName" => &self.spouse_name,
            "occupation" => &self.occupation,
            "employer" => &self.employer,
            "address" => &self.address,
            "addressLine1" => &self.address_line1,
            "addressLine2" => &self.address_line2,
            "city" => &self.city,
            "state" => &self.state,
            "zipCode" => &self.zip_code,
            "country" => &self.country,
            "addressNumber" => &self.address_number,
            "addressStreet" => &self.address_street,
            "tripsCount" => &self.trips_count,
            "tripsDays" => &self.trips_days,
            "notes" => &self.notes,
            _ => return None,
        };
        Some(value.as_str())
    }

    /// Field value, or `""` for unknown keys
    pub fn value(&self, key: &str) -> &str {
        self.field(key).unwrap_or_default()
    }
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

impl From<&NormalizedClientRecord> for RawClientRecord {
    /// Re-enter a canonical record as raw input
    ///
    /// Derived-only fields (`addressNumber`, formatted dates) are dropped;
    /// normalizing the result reproduces them.
    fn from(record: &NormalizedClientRecord) -> Self {
        Self {
            id: non_empty(&record.id),
            form_id: non_empty(&record.form_id),
            source: record.source.parse().ok(),
            created_at: non_empty(&record.created_at),
            first_name: non_empty(&record.first_name),
            middle_name: non_empty(&record.middle_name),
            last_name: non_empty(&record.last_name),
            full_name: non_empty(&record.full_name),
            preferred_name: non_empty(&record.preferred_name),
            alien_number: non_empty(&record.alien_number),
            uscis_account_number: non_empty(&record.uscis_account_number),
            date_of_birth: non_empty(&record.date_of_birth),
            date_became_permanent_resident: non_empty(&record.date_became_permanent_resident),
            ssn: non_empty(&record.ssn),
            country_of_birth: non_empty(&record.country_of_birth),
            citizenship: non_empty(&record.citizenship),
            email: non_empty(&record.email),
            phone: non_empty(&record.phone),
            gender: non_empty(&record.gender),
            height_feet: non_empty(&record.height_feet),
            height_inches: non_empty(&record.height_inches),
            weight: non_empty(&record.weight),
            eye_color: non_empty(&record.eye_color),
            hair_color: non_empty(&record.hair_color),
            marital_status: non_empty(&record.marital_status),
            spouse_name: non_empty(&record.spouse_name),
            occupation: non_empty(&record.occupation),
            employer: non_empty(&record.employer),
            address: non_empty(&record.address),
            address_line1: non_empty(&record.address_line1),
            address_line2: non_empty(&record.address_line2),
            city: non_empty(&record.city),
            state: non_empty(&record.state),
            zip_code: non_empty(&record.zip_code),
            country: non_empty(&record.country),
            trips_count: non_empty(&record.trips_count),
            trips_days: non_empty(&record.trips_days),
            notes: non_empty(&record.notes),
        }
    }
}
