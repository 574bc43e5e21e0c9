//! Record normalization
//!
//! Turns any [`RawClientRecord`] into a total [`NormalizedClientRecord`].
//! Structured input always wins over free-text fallbacks, which is what makes
//! normalization idempotent: after one pass the structured fields are
//! populated, so a second pass takes the same branch and changes nothing.

use crate::address::{parse_free_text, split_street, AddressParts};
use crate::date::format_date;
use crate::name::{join_name, split_name, NameParts};
use crate::record::{present, AddressInput, NameInput, NormalizedClientRecord, RawClientRecord};

/// Normalize a raw client record into its canonical form
///
/// `fullName` is always rebuilt from the resolved name parts, joined with
/// single spaces. A record that only carries a free-text full name therefore
/// comes back with its whitespace collapsed (`"  Ana   Gutierrez "` becomes
/// `"Ana Gutierrez"`), which keeps a second pass from changing it again.
pub fn normalize(raw: &RawClientRecord) -> NormalizedClientRecord {
    let name = resolve_name(raw);
    let address = resolve_address(raw);
    let street = split_street(&address.address_line1);

    let date_of_birth = text(&raw.date_of_birth);
    let date_became_permanent_resident = text(&raw.date_became_permanent_resident);

    NormalizedClientRecord {
        id: text(&raw.id),
        form_id: text(&raw.form_id),
        source: raw.source.as_ref().map(|s| s.as_str().to_string()).unwrap_or_default(),
        created_at: text(&raw.created_at),

        full_name: join_name(&name),
        first_name: name.first_name,
        middle_name: name.middle_name,
        last_name: name.last_name,
        preferred_name: text(&raw.preferred_name),

        alien_number: text(&raw.alien_number),
        uscis_account_number: text(&raw.uscis_account_number),
        formatted_date_of_birth: format_date(&date_of_birth),
        date_of_birth,
        formatted_date_became_permanent_resident: format_date(&date_became_permanent_resident),
        date_became_permanent_resident,
        ssn: text(&raw.ssn),
        country_of_birth: text(&raw.country_of_birth),
        citizenship: text(&raw.citizenship),

        email: text(&raw.email),
        phone: text(&raw.phone),

        gender: text(&raw.gender),
        height_feet: text(&raw.height_feet),
        height_inches: text(&raw.height_inches),
        weight: text(&raw.weight),
        eye_color: text(&raw.eye_color),
        hair_color: text(&raw.hair_color),

        marital_status: text(&raw.marital_status),
        spouse_name: text(&raw.spouse_name),
        occupation: text(&raw.occupation),
        employer: text(&raw.employer),

        address: text(&raw.address),
        address_line1: address.address_line1,
        address_line2: text(&raw.address_line2),
        city: address.city,
        state: address.state,
        zip_code: address.zip_code,
        country: address.country,
        address_number: street.number,
        address_street: street.street,

        trips_count: text(&raw.trips_count),
        trips_days: text(&raw.trips_days),
        notes: text(&raw.notes),
    }
}

fn text(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

fn resolve_name(raw: &RawClientRecord) -> NameParts {
    match raw.name_input() {
        NameInput::Structured {
            first,
            middle,
            last,
        } => NameParts::new(first, middle, last),
        NameInput::FreeText(full_name) => split_name(full_name),
        NameInput::Missing => NameParts::default(),
    }
}

fn resolve_address(raw: &RawClientRecord) -> AddressParts {
    let fallback = match raw.address_input() {
        AddressInput::FreeText(address) => {
            log::debug!("Deriving structured address from free text");
            parse_free_text(address)
        }
        AddressInput::Structured | AddressInput::Missing => AddressParts::default(),
    };

    let pick = |structured: &Option<String>, fallback: String| {
        present(structured).map(str::to_string).unwrap_or(fallback)
    };

    AddressParts {
        address_line1: pick(&raw.address_line1, fallback.address_line1),
        city: pick(&raw.city, fallback.city),
        state: pick(&raw.state, fallback.state),
        zip_code: pick(&raw.zip_code, fallback.zip_code),
        country: pick(&raw.country, fallback.country),
    }
}
