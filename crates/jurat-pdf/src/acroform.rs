//! Interactive form (AcroForm) access
//!
//! [`PdfForm`] wraps a loaded template and exposes its terminal form fields
//! by fully-qualified name (`form1[0].#subform[1].Part2Line3_FamilyName[0]`).
//! Text values are written into the field dictionaries, and
//! [`PdfForm::update_appearances`] regenerates the widget appearance streams
//! with a fixed Helvetica font, so viewers show the values without having to
//! rebuild appearances themselves.

use std::collections::BTreeMap;

use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream, StringFormat};

use crate::error::{PdfError, Result};

/// Resource name the regenerated appearances use for their font
pub const APPEARANCE_FONT: &str = "Helv";

/// Field hierarchies deeper than this are treated as malformed
const MAX_FIELD_DEPTH: usize = 32;

/// Kind of an interactive form field, from its `/FT` entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// `/Tx`
    Text,
    /// `/Btn` (check boxes, radio buttons, push buttons)
    Button,
    /// `/Ch` (list and combo boxes)
    Choice,
    /// `/Sig`
    Signature,
    /// Missing or unrecognized field type
    Unknown,
}

impl FieldKind {
    fn from_field_type(field_type: Option<&[u8]>) -> Self {
        match field_type {
            Some(b"Tx") => Self::Text,
            Some(b"Btn") => Self::Button,
            Some(b"Ch") => Self::Choice,
            Some(b"Sig") => Self::Signature,
            _ => Self::Unknown,
        }
    }
}

/// A terminal form field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormField {
    /// Fully-qualified field name (partial names joined with `.`)
    pub name: String,
    /// Object holding the field's value
    pub id: ObjectId,
    /// Field type
    pub kind: FieldKind,
    /// Widget annotations displaying the field
    pub widgets: Vec<ObjectId>,
}

/// A PDF document with an interactive form
pub struct PdfForm {
    doc: Document,
    fields: Vec<FormField>,
    /// Field index to the text last written into it
    written: BTreeMap<usize, String>,
}

impl PdfForm {
    /// Load a form from PDF bytes
    pub fn load(bytes: &[u8]) -> Result<Self> {
        Self::from_document(Document::load_mem(bytes)?)
    }

    /// Wrap an already loaded document
    ///
    /// Fails with [`PdfError::MissingAcroForm`] when the catalog has no
    /// `/AcroForm` entry.
    pub fn from_document(doc: Document) -> Result<Self> {
        let fields = collect_fields(&doc)?;
        log::debug!("Loaded form with {} fields", fields.len());
        Ok(Self {
            doc,
            fields,
            written: BTreeMap::new(),
        })
    }

    /// All terminal fields, in document order
    pub fn fields(&self) -> &[FormField] {
        &self.fields
    }

    /// Names of all terminal fields
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    /// Look up a text field by exact name
    pub fn text_field(&self, name: &str) -> Option<&FormField> {
        self.fields
            .iter()
            .find(|f| f.kind == FieldKind::Text && f.name == name)
    }

    /// Number of pages in the document
    pub fn page_count(&self) -> usize {
        self.doc.get_pages().len()
    }

    /// Set the value of one text field
    ///
    /// Returns `false` without touching the document when no text field has
    /// that exact name.
    pub fn set_text(&mut self, name: &str, value: &str) -> Result<bool> {
        let index = self
            .fields
            .iter()
            .position(|f| f.kind == FieldKind::Text && f.name == name);

        match index {
            Some(index) => {
                self.write_value(index, value)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Set every text field whose name satisfies `matches`
    ///
    /// Returns how many fields were written.
    pub fn set_text_where<F>(&mut self, matches: F, value: &str) -> Result<usize>
    where
        F: Fn(&str) -> bool,
    {
        let targets: Vec<usize> = self
            .fields
            .iter()
            .enumerate()
            .filter(|(_, f)| f.kind == FieldKind::Text && matches(&f.name))
            .map(|(index, _)| index)
            .collect();

        for index in &targets {
            self.write_value(*index, value)?;
        }
        Ok(targets.len())
    }

    /// Current `/V` of a text field, decoded
    pub fn text_value(&self, name: &str) -> Option<String> {
        let field = self.text_field(name)?;
        let dict = self.doc.get_dictionary(field.id).ok()?;
        let value = dict.get(b"V").ok()?.as_str().ok()?;
        Some(decode_text_string(value))
    }

    fn write_value(&mut self, index: usize, value: &str) -> Result<()> {
        let field_id = self.fields[index].id;
        self.doc
            .get_dictionary_mut(field_id)?
            .set("V", encode_text_string(value));
        self.written.insert(index, value.to_string());
        Ok(())
    }

    /// Regenerate appearance streams for every field written so far
    ///
    /// A standard Helvetica font is added to the document and registered in
    /// the form's default resources under [`APPEARANCE_FONT`].
    pub fn update_appearances(&mut self) -> Result<()> {
        if self.written.is_empty() {
            return Ok(());
        }

        let font_id = self.doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });
        self.register_default_font(font_id)?;

        let written: Vec<(usize, String)> = self
            .written
            .iter()
            .map(|(index, value)| (*index, value.clone()))
            .collect();

        for (index, value) in written {
            let field_id = self.fields[index].id;
            for widget_id in self.fields[index].widgets.clone() {
                self.build_appearance(field_id, widget_id, &value, font_id)?;
            }
        }
        Ok(())
    }

    fn build_appearance(
        &mut self,
        field_id: ObjectId,
        widget_id: ObjectId,
        value: &str,
        font_id: ObjectId,
    ) -> Result<()> {
        let widget = self.doc.get_dictionary(widget_id)?;
        let Some(rect) = widget_rect(widget) else {
            log::debug!("Widget {:?} has no usable /Rect, skipping appearance", widget_id);
            return Ok(());
        };
        let width = (rect[2] - rect[0]).abs();
        let height = (rect[3] - rect[1]).abs();

        let field = self.doc.get_dictionary(field_id)?;
        let da_size = appearance_font_size(widget).or_else(|| appearance_font_size(field));
        let quadding = quadding(widget).or_else(|| quadding(field)).unwrap_or(0);

        let content = appearance_content(value, width, height, da_size, quadding);
        let stream = Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Form",
                "BBox" => vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(width.ceil() as i64),
                    Object::Integer(height.ceil() as i64),
                ],
                "Resources" => dictionary! {
                    "Font" => dictionary! {
                        APPEARANCE_FONT => font_id,
                    },
                },
            },
            content,
        );
        let stream_id = self.doc.add_object(stream);
        self.doc
            .get_dictionary_mut(widget_id)?
            .set("AP", dictionary! { "N" => stream_id });
        Ok(())
    }

    fn register_default_font(&mut self, font_id: ObjectId) -> Result<()> {
        let acroform = self.acroform_mut()?;
        if !acroform.has(b"DA") {
            acroform.set(
                "DA",
                Object::string_literal(format!("/{} 0 Tf 0 g", APPEARANCE_FONT)),
            );
        }

        let dr_entry = acroform.get(b"DR").ok().cloned();
        let dr_id = match dr_entry {
            Some(Object::Reference(id)) => Some(id),
            Some(Object::Dictionary(_)) => None,
            _ => {
                acroform.set("DR", Dictionary::new());
                None
            }
        };

        let fonts_entry = match dr_id {
            Some(id) => self.doc.get_dictionary(id)?.get(b"Font").ok().cloned(),
            None => self
                .acroform_mut()?
                .get(b"DR")?
                .as_dict()?
                .get(b"Font")
                .ok()
                .cloned(),
        };
        if let Some(Object::Reference(fonts_id)) = fonts_entry {
            self.doc
                .get_dictionary_mut(fonts_id)?
                .set(APPEARANCE_FONT, font_id);
            return Ok(());
        }

        let dr = match dr_id {
            Some(id) => self.doc.get_dictionary_mut(id)?,
            None => self.acroform_mut()?.get_mut(b"DR")?.as_dict_mut()?,
        };
        let inline_fonts = matches!(dr.get(b"Font"), Ok(Object::Dictionary(_)));
        if !inline_fonts {
            dr.set("Font", Dictionary::new());
        }
        if let Ok(Object::Dictionary(fonts)) = dr.get_mut(b"Font") {
            fonts.set(APPEARANCE_FONT, font_id);
        }
        Ok(())
    }

    /// Drop XFA data so viewers render the AcroForm values
    ///
    /// Returns whether the form carried XFA.
    pub fn remove_xfa(&mut self) -> Result<bool> {
        Ok(self.acroform_mut()?.remove(b"XFA").is_some())
    }

    fn acroform_mut(&mut self) -> Result<&mut Dictionary> {
        let root_id = self.doc.trailer.get(b"Root")?.as_reference()?;
        let entry = self
            .doc
            .get_dictionary(root_id)?
            .get(b"AcroForm")
            .map_err(|_| PdfError::MissingAcroForm)?
            .clone();

        match entry {
            Object::Reference(id) => Ok(self.doc.get_dictionary_mut(id)?),
            Object::Dictionary(_) => Ok(self
                .doc
                .get_dictionary_mut(root_id)?
                .get_mut(b"AcroForm")?
                .as_dict_mut()?),
            _ => Err(PdfError::InvalidStructure(
                "/AcroForm is neither a dictionary nor a reference".to_string(),
            )),
        }
    }

    /// Borrow the underlying document
    pub fn document(&self) -> &Document {
        &self.doc
    }

    /// Serialize the document
    pub fn save(mut self) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        self.doc.save_to(&mut buffer)?;
        Ok(buffer)
    }
}

/// Follow a reference, if `object` is one
pub(crate) fn resolve<'a>(doc: &'a Document, object: &'a Object) -> Result<&'a Object> {
    match object {
        Object::Reference(id) => Ok(doc.get_object(*id)?),
        other => Ok(other),
    }
}

/// The catalog's `/AcroForm` dictionary
pub(crate) fn acroform(doc: &Document) -> Result<&Dictionary> {
    let root_id = doc.trailer.get(b"Root")?.as_reference()?;
    let catalog = doc.get_dictionary(root_id)?;
    let entry = catalog
        .get(b"AcroForm")
        .map_err(|_| PdfError::MissingAcroForm)?;
    Ok(resolve(doc, entry)?.as_dict()?)
}

fn collect_fields(doc: &Document) -> Result<Vec<FormField>> {
    let acroform = acroform(doc)?;
    let roots: Vec<ObjectId> = match acroform.get(b"Fields") {
        Ok(fields) => resolve(doc, fields)?
            .as_array()?
            .iter()
            .filter_map(|f| f.as_reference().ok())
            .collect(),
        Err(_) => Vec::new(),
    };

    let mut fields = Vec::new();
    for root in roots {
        walk_field(doc, root, "", None, 0, &mut fields)?;
    }
    Ok(fields)
}

fn walk_field(
    doc: &Document,
    id: ObjectId,
    parent_name: &str,
    inherited_type: Option<&[u8]>,
    depth: usize,
    out: &mut Vec<FormField>,
) -> Result<()> {
    if depth > MAX_FIELD_DEPTH {
        log::warn!("Field tree deeper than {} levels, truncating", MAX_FIELD_DEPTH);
        return Ok(());
    }

    let dict = doc.get_dictionary(id)?;
    let partial = dict
        .get(b"T")
        .ok()
        .and_then(|t| t.as_str().ok())
        .map(decode_text_string);
    let name = match partial {
        Some(partial) if parent_name.is_empty() => partial,
        Some(partial) => format!("{}.{}", parent_name, partial),
        None => parent_name.to_string(),
    };
    let field_type = dict
        .get(b"FT")
        .ok()
        .and_then(|ft| ft.as_name().ok())
        .or(inherited_type);

    let kids: Vec<ObjectId> = dict
        .get(b"Kids")
        .ok()
        .and_then(|kids| resolve(doc, kids).ok())
        .and_then(|kids| kids.as_array().ok())
        .map(|kids| kids.iter().filter_map(|k| k.as_reference().ok()).collect())
        .unwrap_or_default();

    // Kids carrying a partial name are fields; the rest are widgets.
    let (child_fields, widgets): (Vec<ObjectId>, Vec<ObjectId>) = kids.into_iter().partition(|kid| {
        doc.get_dictionary(*kid)
            .map(|d| d.has(b"T"))
            .unwrap_or(false)
    });

    if !child_fields.is_empty() {
        for kid in child_fields {
            walk_field(doc, kid, &name, field_type, depth + 1, out)?;
        }
        return Ok(());
    }

    let mut widgets = widgets;
    if widgets.is_empty() && dict.has(b"Rect") {
        widgets.push(id);
    }

    out.push(FormField {
        name,
        id,
        kind: FieldKind::from_field_type(field_type),
        widgets,
    });
    Ok(())
}

/// Decode a PDF text string (UTF-16BE with BOM, else PDFDocEncoding)
pub fn decode_text_string(bytes: &[u8]) -> String {
    if let Some(utf16) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units = utf16
            .chunks(2)
            .map(|pair| u16::from_be_bytes([pair[0], *pair.get(1).unwrap_or(&0)]));
        return char::decode_utf16(units)
            .map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER))
            .collect();
    }
    bytes.iter().map(|&b| b as char).collect()
}

/// Encode a value as a PDF text string object
///
/// ASCII stays a literal string; anything else becomes UTF-16BE with a BOM.
pub fn encode_text_string(value: &str) -> Object {
    if value.is_ascii() {
        return Object::String(value.as_bytes().to_vec(), StringFormat::Literal);
    }
    let mut bytes = vec![0xFE, 0xFF];
    for unit in value.encode_utf16() {
        bytes.extend_from_slice(&unit.to_be_bytes());
    }
    Object::String(bytes, StringFormat::Hexadecimal)
}

fn number(object: &Object) -> Option<f32> {
    match object {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r as f32),
        _ => None,
    }
}

fn widget_rect(widget: &Dictionary) -> Option<[f32; 4]> {
    let rect = widget.get(b"Rect").ok()?.as_array().ok()?;
    if rect.len() != 4 {
        return None;
    }
    Some([
        number(&rect[0])?,
        number(&rect[1])?,
        number(&rect[2])?,
        number(&rect[3])?,
    ])
}

/// Font size from a `/DA` string such as `/Helv 10 Tf 0 g`; `None` for auto (0)
fn appearance_font_size(dict: &Dictionary) -> Option<f32> {
    let da = dict.get(b"DA").ok()?.as_str().ok()?;
    let da = String::from_utf8_lossy(da);
    let tokens: Vec<&str> = da.split_whitespace().collect();
    let tf = tokens.iter().position(|t| *t == "Tf")?;
    let size: f32 = tokens.get(tf.checked_sub(1)?)?.parse().ok()?;
    (size > 0.0).then_some(size)
}

fn quadding(dict: &Dictionary) -> Option<i64> {
    dict.get(b"Q").ok()?.as_i64().ok()
}

/// Approximate Helvetica advance width, in text space units per point
const AVERAGE_GLYPH_WIDTH: f32 = 0.55;

fn appearance_content(
    value: &str,
    width: f32,
    height: f32,
    font_size: Option<f32>,
    quadding: i64,
) -> Vec<u8> {
    let glyphs = value.chars().count().max(1) as f32;
    let size = font_size.unwrap_or_else(|| {
        let by_height = (height * 0.7).min(12.0);
        let by_width = (width - 4.0) / (glyphs * AVERAGE_GLYPH_WIDTH);
        by_height.min(by_width).max(4.0)
    });

    let text_width = glyphs * size * AVERAGE_GLYPH_WIDTH;
    let x = match quadding {
        1 => ((width - text_width) / 2.0).max(2.0),
        2 => (width - text_width - 2.0).max(2.0),
        _ => 2.0,
    };
    let y = ((height - size) / 2.0 + size * 0.22).max(1.0);

    let mut content = Vec::new();
    content.extend_from_slice(b"/Tx BMC\nq\nBT\n");
    content.extend_from_slice(
        format!("/{} {:.2} Tf\n0 g\n{:.2} {:.2} Td\n(", APPEARANCE_FONT, size, x, y).as_bytes(),
    );
    content.extend(escape_literal(&win_ansi_bytes(value)));
    content.extend_from_slice(b") Tj\nET\nQ\nEMC\n");
    content
}

/// Map text to WinAnsi bytes; characters outside Latin-1 become `?`
pub(crate) fn win_ansi_bytes(value: &str) -> Vec<u8> {
    value
        .chars()
        .map(|c| match c as u32 {
            0x20..=0x7E | 0xA0..=0xFF => c as u32 as u8,
            _ => b'?',
        })
        .collect()
}

/// Escape bytes for a PDF literal string
pub(crate) fn escape_literal(bytes: &[u8]) -> Vec<u8> {
    let mut escaped = Vec::with_capacity(bytes.len());
    for &b in bytes {
        if matches!(b, b'(' | b')' | b'\\') {
            escaped.push(b'\\');
        }
        escaped.push(b);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::FormTemplateBuilder;

    fn template() -> Vec<u8> {
        FormTemplateBuilder::new()
            .text_field(0, "form1[0].#subform[0].#area[0].Line1_AlienNumber[0]")
            .text_field(0, "form1[0].#subform[1].Part2Line3_FamilyName[0]")
            .text_field(1, "form1[0].#subform[1].#area[1].Line1_AlienNumber[1]")
            .checkbox(1, "form1[0].#subform[1].P2_Line1_Checkbox[0]")
            .build()
    }

    #[test]
    fn test_enumerates_qualified_names() {
        let form = PdfForm::load(&template()).unwrap();
        let names: Vec<_> = form.field_names().collect();
        assert_eq!(
            names,
            vec![
                "form1[0].#subform[0].#area[0].Line1_AlienNumber[0]",
                "form1[0].#subform[1].Part2Line3_FamilyName[0]",
                "form1[0].#subform[1].#area[1].Line1_AlienNumber[1]",
                "form1[0].#subform[1].P2_Line1_Checkbox[0]",
            ]
        );
        assert_eq!(form.page_count(), 2);
    }

    #[test]
    fn test_field_kinds() {
        let form = PdfForm::load(&template()).unwrap();
        let kinds: Vec<_> = form.fields().iter().map(|f| f.kind).collect();
        assert_eq!(
            kinds,
            vec![FieldKind::Text, FieldKind::Text, FieldKind::Text, FieldKind::Button]
        );
        assert!(form.fields().iter().all(|f| f.widgets.len() == 1));
    }

    #[test]
    fn test_set_text_exact() {
        let mut form = PdfForm::load(&template()).unwrap();
        let name = "form1[0].#subform[1].Part2Line3_FamilyName[0]";
        assert!(form.set_text(name, "GOMEZ").unwrap());
        assert_eq!(form.text_value(name).as_deref(), Some("GOMEZ"));
    }

    #[test]
    fn test_set_text_missing_or_non_text() {
        let mut form = PdfForm::load(&template()).unwrap();
        assert!(!form.set_text("form1[0].Nope[0]", "X").unwrap());
        assert!(!form
            .set_text("form1[0].#subform[1].P2_Line1_Checkbox[0]", "X")
            .unwrap());
    }

    #[test]
    fn test_set_text_where_fills_every_copy() {
        let mut form = PdfForm::load(&template()).unwrap();
        let count = form
            .set_text_where(|name| name.contains("Line1_AlienNumber"), "A208945671")
            .unwrap();
        assert_eq!(count, 2);
        assert_eq!(
            form.text_value("form1[0].#subform[1].#area[1].Line1_AlienNumber[1]")
                .as_deref(),
            Some("A208945671")
        );
    }

    #[test]
    fn test_update_appearances_survives_save() {
        let mut form = PdfForm::load(&template()).unwrap();
        let name = "form1[0].#subform[1].Part2Line3_FamilyName[0]";
        form.set_text(name, "GÓMEZ (JR)").unwrap();
        form.update_appearances().unwrap();

        let reloaded = PdfForm::load(&form.save().unwrap()).unwrap();
        assert_eq!(reloaded.text_value(name).as_deref(), Some("GÓMEZ (JR)"));

        let field = reloaded.text_field(name).unwrap();
        let widget = reloaded.document().get_dictionary(field.widgets[0]).unwrap();
        let ap = widget.get(b"AP").unwrap().as_dict().unwrap();
        let stream_id = ap.get(b"N").unwrap().as_reference().unwrap();
        let stream = reloaded
            .document()
            .get_object(stream_id)
            .unwrap()
            .as_stream()
            .unwrap();
        let content = String::from_utf8_lossy(&stream.content);
        assert!(content.contains("/Helv"));
        assert!(content.contains("\\(JR\\)"));

        let acroform = acroform(reloaded.document()).unwrap();
        let dr = resolve(reloaded.document(), acroform.get(b"DR").unwrap())
            .unwrap()
            .as_dict()
            .unwrap();
        let fonts = resolve(reloaded.document(), dr.get(b"Font").unwrap())
            .unwrap()
            .as_dict()
            .unwrap();
        assert!(fonts.has(APPEARANCE_FONT.as_bytes()));
    }

    #[test]
    fn test_remove_xfa() {
        let bytes = FormTemplateBuilder::new()
            .text_field(0, "form1[0].Name[0]")
            .with_xfa()
            .build();
        let mut form = PdfForm::load(&bytes).unwrap();
        assert!(form.remove_xfa().unwrap());
        assert!(!form.remove_xfa().unwrap());
    }

    #[test]
    fn test_missing_acroform() {
        let bytes = crate::test_utils::blank_document(1);
        assert!(matches!(
            PdfForm::load(&bytes),
            Err(PdfError::MissingAcroForm)
        ));
    }

    #[test]
    fn test_text_string_round_trip() {
        for value in ["SMITH", "NÚÑEZ", "李"] {
            let encoded = encode_text_string(value);
            assert_eq!(decode_text_string(encoded.as_str().unwrap()), value);
        }
    }

    #[test]
    fn test_appearance_font_size_parsing() {
        let dict = dictionary! { "DA" => Object::string_literal("/Helv 9 Tf 0 g") };
        assert_eq!(appearance_font_size(&dict), Some(9.0));
        let auto = dictionary! { "DA" => Object::string_literal("/Helv 0 Tf 0 g") };
        assert_eq!(appearance_font_size(&auto), None);
    }

    #[test]
    fn test_win_ansi_and_escaping() {
        assert_eq!(win_ansi_bytes("Ñ李"), vec![0xD1, b'?']);
        assert_eq!(escape_literal(b"a(b)\\"), b"a\\(b\\)\\\\".to_vec());
    }
}
