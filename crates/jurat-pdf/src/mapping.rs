//! Template field mapping
//!
//! A [`TemplateFieldMap`] is an ordered list of [`BindingRule`]s that bind
//! canonical record keys to AcroForm fields of one fixed template. Rules are
//! evaluated against the template's enumerated text fields:
//!
//! - [`FieldSelector::Exact`] sets the single field with that full name
//! - [`FieldSelector::Contains`] sets every text field whose name contains
//!   the fragment (repeated page-header fields such as the A-number)
//!
//! A rule that matches nothing is not an error. The value is dropped, the
//! selector lands in [`FillReport::missing`] and a warning is logged.

use jurat_core::{NormalizedClientRecord, N400_FORM_ID};

use crate::acroform::PdfForm;
use crate::error::Result;

/// How a binding rule finds its target fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldSelector {
    /// Fully-qualified field name
    Exact(&'static str),
    /// Name fragment; every text field containing it
    Contains(&'static str),
}

impl FieldSelector {
    pub fn matches(&self, field_name: &str) -> bool {
        match self {
            Self::Exact(name) => field_name == *name,
            Self::Contains(fragment) => field_name.contains(fragment),
        }
    }

    fn pattern(&self) -> &'static str {
        match self {
            Self::Exact(name) | Self::Contains(name) => name,
        }
    }
}

impl std::fmt::Display for FieldSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Exact(name) => write!(f, "{}", name),
            Self::Contains(fragment) => write!(f, "*{}*", fragment),
        }
    }
}

/// Binds one canonical record key to template fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BindingRule {
    pub selector: FieldSelector,
    /// Canonical record key, see [`NormalizedClientRecord::KEYS`]
    pub key: &'static str,
}

const fn exact(name: &'static str, key: &'static str) -> BindingRule {
    BindingRule {
        selector: FieldSelector::Exact(name),
        key,
    }
}

const fn contains(fragment: &'static str, key: &'static str) -> BindingRule {
    BindingRule {
        selector: FieldSelector::Contains(fragment),
        key,
    }
}

/// Ordered binding rules for one template
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemplateFieldMap {
    pub form_id: &'static str,
    pub rules: &'static [BindingRule],
}

const N400_RULES: &[BindingRule] = &[
    contains("Line1_AlienNumber", "alienNumber"),
    exact(
        "form1[0].#subform[1].P2_Line6_USCISELISAcctNumber[0]",
        "uscisAccountNumber",
    ),
    exact("form1[0].#subform[1].Part2Line3_FamilyName[0]", "lastName"),
    exact("form1[0].#subform[1].Part2Line4a_GivenName[0]", "firstName"),
    exact("form1[0].#subform[1].Part2Line4a_MiddleName[0]", "middleName"),
    exact(
        "form1[0].#subform[1].P2_Line8_DateOfBirth[0]",
        "formattedDateOfBirth",
    ),
    exact(
        "form1[0].#subform[1].P2_Line9_DateBecamePermanentResident[0]",
        "formattedDateBecamePermanentResident",
    ),
    exact("form1[0].#subform[1].P2_Line10_CountryOfBirth[0]", "countryOfBirth"),
    exact("form1[0].#subform[1].P2_Line11_CountryOfNationality[0]", "citizenship"),
    exact("form1[0].#subform[8].P9_Line22c_SSNumber[0]", "ssn"),
    exact("form1[0].#subform[2].P4_Line1_Number[0]", "addressNumber"),
    exact("form1[0].#subform[2].P4_Line1_StreetName[0]", "addressStreet"),
    exact("form1[0].#subform[2].P4_Line1_City[0]", "city"),
    exact("form1[0].#subform[2].P4_Line1_State[0]", "state"),
    exact("form1[0].#subform[2].P4_Line1_ZipCode[0]", "zipCode"),
    exact("form1[0].#subform[2].P4_Line1_Country[0]", "country"),
    exact("form1[0].#subform[10].P12_Line3_Telephone[0]", "phone"),
    exact("form1[0].#subform[10].P12_Line3_Mobile[0]", "phone"),
    exact("form1[0].#subform[10].P12_Line5_Email[0]", "email"),
];

const N400_MAP: TemplateFieldMap = TemplateFieldMap {
    form_id: N400_FORM_ID,
    rules: N400_RULES,
};

/// Binding rules for the official N-400 template
pub fn n400_field_map() -> &'static TemplateFieldMap {
    &N400_MAP
}

/// Field map for a form id, if the form has an official template
pub fn field_map_for(form_id: &str) -> Option<&'static TemplateFieldMap> {
    N400_MAP
        .form_id
        .eq_ignore_ascii_case(form_id.trim())
        .then(n400_field_map)
}

/// Outcome of applying a field map
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FillReport {
    /// Names of the fields that were written
    pub applied: Vec<String>,
    /// Selectors that matched no text field in the template
    pub missing: Vec<String>,
}

/// A filled template and what went into it
#[derive(Debug, Clone)]
pub struct FilledTemplate {
    pub bytes: Vec<u8>,
    pub report: FillReport,
}

/// Fill a template with a record according to `map`
pub fn fill_with(
    map: &TemplateFieldMap,
    record: &NormalizedClientRecord,
    template: &[u8],
) -> Result<FilledTemplate> {
    let mut form = PdfForm::load(template)?;
    if form.remove_xfa()? {
        log::debug!("Removed XFA data from {} template", map.form_id);
    }

    let mut report = FillReport::default();
    for rule in map.rules {
        let value = record.value(rule.key).to_uppercase();
        let targets: Vec<String> = form
            .fields()
            .iter()
            .filter(|f| f.kind == crate::acroform::FieldKind::Text)
            .filter(|f| rule.selector.matches(&f.name))
            .map(|f| f.name.clone())
            .collect();

        if targets.is_empty() {
            log::warn!(
                "{}: no field matches {}, dropping value for {}",
                map.form_id,
                rule.selector,
                rule.key
            );
            report.missing.push(rule.selector.pattern().to_string());
            continue;
        }

        let written = form.set_text_where(|name| rule.selector.matches(name), &value)?;
        log::debug!("{} -> {} ({} fields)", rule.key, rule.selector, written);
        report.applied.extend(targets);
    }

    form.update_appearances()?;
    let bytes = form.save()?;
    Ok(FilledTemplate { bytes, report })
}

/// Fill the official N-400 template
pub fn fill(record: &NormalizedClientRecord, template: &[u8]) -> Result<FilledTemplate> {
    fill_with(n400_field_map(), record, template)
}
