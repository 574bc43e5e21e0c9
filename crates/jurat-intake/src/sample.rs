//! Demo client record

use jurat_core::RawClientRecord;

fn s(value: &str) -> Option<String> {
    Some(value.to_string())
}

/// A complete, realistic N-400 applicant used for demos and smoke tests
pub fn sample_client() -> RawClientRecord {
    RawClientRecord {
        first_name: s("Valeria"),
        middle_name: s("Isabel"),
        last_name: s("Gomez"),
        preferred_name: s("Val"),
        alien_number: s("A208945671"),
        uscis_account_number: s("1100-2233-4455"),
        date_of_birth: s("1992-03-11"),
        date_became_permanent_resident: s("2018-06-22"),
        ssn: s("123-45-6789"),
        country_of_birth: s("Colombia"),
        citizenship: s("Colombia"),
        email: s("valeria.gomez@email.com"),
        phone: s("(312) 555-0148"),
        marital_status: s("married"),
        spouse_name: s("Diego Gomez"),
        address_line1: s("4100 W Irving Park Rd"),
        address_line2: s("Apt 12C"),
        city: s("Chicago"),
        state: s("IL"),
        zip_code: s("60641"),
        country: s("United States"),
        trips_count: s("2"),
        trips_days: s("18"),
        notes: s("Requested name update after marriage."),
        ..Default::default()
    }
}
