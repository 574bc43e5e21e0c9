//! Form schema registry
//!
//! Static catalog of the document types jurat knows how to prepare. Each
//! form exposes an ordered list of `(key, label)` descriptors; keys are
//! canonical record keys (see [`NormalizedClientRecord::KEYS`]).
//!
//! Lookups are tolerant: an unknown form id yields an empty field list so
//! callers render nothing instead of failing.

use serde::Serialize;

use crate::record::NormalizedClientRecord;

/// Form id of the one document with an official fillable template
pub const N400_FORM_ID: &str = "N-400";

/// One logical field a form exposes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldDescriptor {
    /// Canonical record key
    pub key: &'static str,
    /// Human-readable label
    pub label: &'static str,
}

/// Catalog entry for a document type
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FormDescriptor {
    /// Form code, e.g. `N-400`
    pub id: &'static str,
    /// Official title
    pub title: &'static str,
    /// One-line description
    pub description: &'static str,
    /// Share of the official form the intake covers (informational)
    pub coverage: f32,
    /// Whether a fixed official template is filled for this form
    pub official_template: bool,
    /// Ordered field descriptors
    #[serde(skip)]
    pub fields: &'static [FieldDescriptor],
}

/// A label/value row for previewing a record against a form
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreviewRow {
    /// Field label
    pub label: &'static str,
    /// Canonical key
    pub key: &'static str,
    /// Normalized value, possibly empty
    pub value: String,
}

impl PreviewRow {
    /// True when the record has no value for this field
    pub fn is_missing(&self) -> bool {
        self.value.is_empty()
    }
}

const fn field(key: &'static str, label: &'static str) -> FieldDescriptor {
    FieldDescriptor { key, label }
}

const N400_FIELDS: &[FieldDescriptor] = &[
    field("fullName", "Applicant full legal name"),
    field("alienNumber", "A-number"),
    field("uscisAccountNumber", "USCIS online account number"),
    field("dateOfBirth", "Date of birth"),
    field("dateBecamePermanentResident", "Date became permanent resident"),
    field("ssn", "Social Security Number"),
    field("countryOfBirth", "Country of birth"),
    field("citizenship", "Country of citizenship"),
    field("addressLine1", "Street address"),
    field("addressLine2", "Apartment / suite"),
    field("city", "City"),
    field("state", "State"),
    field("zipCode", "ZIP code"),
    field("country", "Country"),
    field("email", "Email address"),
    field("phone", "Phone number"),
    field("maritalStatus", "Marital status"),
    field("spouseName", "Spouse full legal name"),
    field("tripsCount", "Trips outside the U.S. (5 years)"),
    field("tripsDays", "Total days outside the U.S."),
    field("notes", "Notes for attorney"),
];

const I130_FIELDS: &[FieldDescriptor] = &[
    field("fullName", "Petitioner full legal name"),
    field("alienNumber", "A-number"),
    field("uscisAccountNumber", "USCIS online account number"),
    field("ssn", "Social Security Number"),
    field("formattedDateOfBirth", "Date of birth"),
    field("countryOfBirth", "Country of birth"),
    field("gender", "Sex"),
    field("maritalStatus", "Marital status"),
    field("spouseName", "Beneficiary full legal name"),
    field("addressLine1", "Mailing address"),
    field("addressLine2", "Apartment / suite"),
    field("city", "City"),
    field("state", "State"),
    field("zipCode", "ZIP code"),
    field("country", "Country"),
    field("phone", "Daytime telephone"),
    field("email", "Email address"),
    field("occupation", "Occupation"),
    field("employer", "Employer"),
];

const I485_FIELDS: &[FieldDescriptor] = &[
    field("lastName", "Family name"),
    field("firstName", "Given name"),
    field("middleName", "Middle name"),
    field("alienNumber", "A-number"),
    field("formattedDateOfBirth", "Date of birth"),
    field("countryOfBirth", "Country of birth"),
    field("citizenship", "Country of citizenship"),
    field("ssn", "Social Security Number"),
    field("gender", "Sex"),
    field("heightFeet", "Height (feet)"),
    field("heightInches", "Height (inches)"),
    field("weight", "Weight (pounds)"),
    field("eyeColor", "Eye color"),
    field("hairColor", "Hair color"),
    field("addressNumber", "Street number"),
    field("addressStreet", "Street name"),
    field("addressLine2", "Apartment / suite"),
    field("city", "City"),
    field("state", "State"),
    field("zipCode", "ZIP code"),
    field("maritalStatus", "Marital status"),
    field("phone", "Daytime telephone"),
    field("email", "Email address"),
];

const I765_FIELDS: &[FieldDescriptor] = &[
    field("lastName", "Family name"),
    field("firstName", "Given name"),
    field("middleName", "Middle name"),
    field("alienNumber", "A-number"),
    field("uscisAccountNumber", "USCIS online account number"),
    field("formattedDateOfBirth", "Date of birth"),
    field("countryOfBirth", "Country of birth"),
    field("citizenship", "Country of citizenship"),
    field("gender", "Sex"),
    field("maritalStatus", "Marital status"),
    field("ssn", "Social Security Number"),
    field("addressLine1", "Mailing address"),
    field("city", "City"),
    field("state", "State"),
    field("zipCode", "ZIP code"),
    field("phone", "Daytime telephone"),
    field("email", "Email address"),
];

const I131_FIELDS: &[FieldDescriptor] = &[
    field("fullName", "Applicant full legal name"),
    field("alienNumber", "A-number"),
    field("formattedDateOfBirth", "Date of birth"),
    field("countryOfBirth", "Country of birth"),
    field("citizenship", "Country of citizenship"),
    field("gender", "Sex"),
    field("ssn", "Social Security Number"),
    field("addressLine1", "Mailing address"),
    field("addressLine2", "Apartment / suite"),
    field("city", "City"),
    field("state", "State"),
    field("zipCode", "ZIP code"),
    field("country", "Country"),
    field("tripsCount", "Trips outside the U.S. (5 years)"),
    field("tripsDays", "Total days outside the U.S."),
    field("phone", "Daytime telephone"),
];

const I90_FIELDS: &[FieldDescriptor] = &[
    field("alienNumber", "A-number"),
    field("uscisAccountNumber", "USCIS online account number"),
    field("lastName", "Family name"),
    field("firstName", "Given name"),
    field("middleName", "Middle name"),
    field("addressLine1", "Mailing address"),
    field("city", "City"),
    field("state", "State"),
    field("zipCode", "ZIP code"),
    field("gender", "Sex"),
    field("formattedDateOfBirth", "Date of birth"),
    field("countryOfBirth", "Country of birth"),
    field("formattedDateBecamePermanentResident", "Date of admission"),
    field("ssn", "Social Security Number"),
    field("eyeColor", "Eye color"),
    field("hairColor", "Hair color"),
    field("phone", "Daytime telephone"),
    field("email", "Email address"),
];

const FORMS: &[FormDescriptor] = &[
    FormDescriptor {
        id: N400_FORM_ID,
        title: "Application for Naturalization",
        description: "Apply for U.S. citizenship as a lawful permanent resident",
        coverage: 0.35,
        official_template: true,
        fields: N400_FIELDS,
    },
    FormDescriptor {
        id: "I-130",
        title: "Petition for Alien Relative",
        description: "Establish a qualifying relationship to a relative who wishes to immigrate",
        coverage: 0.25,
        official_template: false,
        fields: I130_FIELDS,
    },
    FormDescriptor {
        id: "I-485",
        title: "Application to Register Permanent Residence or Adjust Status",
        description: "Apply for a green card from inside the United States",
        coverage: 0.2,
        official_template: false,
        fields: I485_FIELDS,
    },
    FormDescriptor {
        id: "I-765",
        title: "Application for Employment Authorization",
        description: "Request an employment authorization document",
        coverage: 0.45,
        official_template: false,
        fields: I765_FIELDS,
    },
    FormDescriptor {
        id: "I-131",
        title: "Application for Travel Document",
        description: "Apply for a reentry permit, refugee travel document or advance parole",
        coverage: 0.3,
        official_template: false,
        fields: I131_FIELDS,
    },
    FormDescriptor {
        id: "I-90",
        title: "Application to Replace Permanent Resident Card",
        description: "Renew or replace a green card",
        coverage: 0.5,
        official_template: false,
        fields: I90_FIELDS,
    },
];

/// All known forms, in catalog order
pub fn list_forms() -> &'static [FormDescriptor] {
    FORMS
}

/// Find a form by id (case-insensitive)
pub fn find_form(form_id: &str) -> Option<&'static FormDescriptor> {
    FORMS
        .iter()
        .find(|form| form.id.eq_ignore_ascii_case(form_id.trim()))
}

/// Ordered field descriptors for a form; empty for unknown ids
pub fn get_schema(form_id: &str) -> &'static [FieldDescriptor] {
    match find_form(form_id) {
        Some(form) => form.fields,
        None => {
            log::debug!("No schema registered for form {}", form_id);
            &[]
        }
    }
}

/// Pair each schema field of a form with the record's value
pub fn preview(record: &NormalizedClientRecord, form_id: &str) -> Vec<PreviewRow> {
    get_schema(form_id)
        .iter()
        .map(|descriptor| PreviewRow {
            label: descriptor.label,
            key: descriptor.key,
            value: record.value(descriptor.key).to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize;
    use crate::record::RawClientRecord;

    #[test]
    fn test_list_forms() {
        let ids: Vec<_> = list_forms().iter().map(|f| f.id).collect();
        assert_eq!(ids, vec!["N-400", "I-130", "I-485", "I-765", "I-131", "I-90"]);
    }

    #[test]
    fn test_only_n400_has_official_template() {
        let official: Vec<_> = list_forms()
            .iter()
            .filter(|f| f.official_template)
            .map(|f| f.id)
            .collect();
        assert_eq!(official, vec![N400_FORM_ID]);
    }

    #[test]
    fn test_get_schema_order() {
        let schema = get_schema("N-400");
        assert_eq!(schema.len(), 21);
        assert_eq!(schema[0].key, "fullName");
        assert_eq!(schema[0].label, "Applicant full legal name");
        assert_eq!(schema[20].key, "notes");
    }

    #[test]
    fn test_get_schema_case_insensitive() {
        assert_eq!(get_schema("n-400"), get_schema("N-400"));
        assert!(find_form(" i-130 ").is_some());
    }

    #[test]
    fn test_unknown_form_is_empty() {
        assert!(get_schema("DS-160").is_empty());
        assert!(find_form("DS-160").is_none());
    }

    #[test]
    fn test_every_schema_key_is_canonical() {
        let record = NormalizedClientRecord::default();
        for form in list_forms() {
            for descriptor in form.fields {
                assert!(
                    record.field(descriptor.key).is_some(),
                    "{} references unknown key {}",
                    form.id,
                    descriptor.key
                );
            }
        }
    }

    #[test]
    fn test_coverage_is_a_ratio() {
        for form in list_forms() {
            assert!(form.coverage > 0.0 && form.coverage <= 1.0, "{}", form.id);
        }
    }

    #[test]
    fn test_preview_marks_missing_values() {
        let record = normalize(&RawClientRecord {
            full_name: Some("Diego Gomez".to_string()),
            ..Default::default()
        });
        let rows = preview(&record, "N-400");
        assert_eq!(rows.len(), 21);
        assert_eq!(rows[0].value, "Diego Gomez");
        assert!(!rows[0].is_missing());
        assert!(rows[1].is_missing());
        assert!(preview(&record, "unknown").is_empty());
    }
}
