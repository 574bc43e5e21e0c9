//! Date reformatting for US government forms

/// Reformat an ISO `YYYY-MM-DD` date as `MM/DD/YYYY`
///
/// Values that already contain a `/` are assumed to be formatted and pass
/// through. Segments past the third are ignored, and anything whose first
/// three `-` segments are not all non-empty is returned unchanged.
pub fn format_date(value: &str) -> String {
    if value.is_empty() || value.contains('/') {
        return value.to_string();
    }

    let mut segments = value.split('-');
    match (segments.next(), segments.next(), segments.next()) {
        (Some(year), Some(month), Some(day))
            if !year.is_empty() && !month.is_empty() && !day.is_empty() =>
        {
            format!("{}/{}/{}", month, day, year)
        }
        _ => value.to_string(),
    }
}
