//! Shared test utilities for jurat-pdf
//!
//! Builders for small in-memory PDFs: fillable templates with named fields
//! and plain documents without a form. Every page carries a text marker
//! (`<label> page <n>`) so tests can tell pages apart after merging.

use lopdf::{dictionary, Document, Object, ObjectId, Stream};

use crate::mapping::n400_field_map;

enum FixtureField {
    Text(usize, String),
    Checkbox(usize, String),
}

/// Builds a fillable PDF template
///
/// # Example
/// ```
/// use jurat_pdf::test_utils::FormTemplateBuilder;
/// let bytes = FormTemplateBuilder::new()
///     .label("N-400")
///     .text_field(0, "form1[0].Name[0]")
///     .build();
/// assert!(bytes.starts_with(b"%PDF"));
/// ```
pub struct FormTemplateBuilder {
    label: String,
    pages: usize,
    fields: Vec<FixtureField>,
    xfa: bool,
}

impl Default for FormTemplateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl FormTemplateBuilder {
    pub fn new() -> Self {
        Self {
            label: "TEMPLATE".to_string(),
            pages: 1,
            fields: Vec::new(),
            xfa: false,
        }
    }

    /// Marker text written on every page
    pub fn label(mut self, label: &str) -> Self {
        self.label = label.to_string();
        self
    }

    /// Minimum number of pages
    pub fn pages(mut self, pages: usize) -> Self {
        self.pages = pages.max(1);
        self
    }

    /// Add a text field with a widget on `page` (0-based)
    pub fn text_field(mut self, page: usize, name: &str) -> Self {
        self.fields.push(FixtureField::Text(page, name.to_string()));
        self
    }

    /// Add a check box on `page` (0-based)
    pub fn checkbox(mut self, page: usize, name: &str) -> Self {
        self.fields.push(FixtureField::Checkbox(page, name.to_string()));
        self
    }

    /// Attach an XFA packet to the form
    pub fn with_xfa(mut self) -> Self {
        self.xfa = true;
        self
    }

    pub fn build(self) -> Vec<u8> {
        let max_page = self
            .fields
            .iter()
            .map(|f| match f {
                FixtureField::Text(page, _) | FixtureField::Checkbox(page, _) => page + 1,
            })
            .max()
            .unwrap_or(1);
        let page_count = self.pages.max(max_page);

        let (mut doc, page_ids) = document_with_pages(&self.label, page_count);

        let mut field_refs = Vec::new();
        let mut annots: Vec<Vec<Object>> = vec![Vec::new(); page_count];
        for (index, field) in self.fields.iter().enumerate() {
            let (page, name, field_type) = match field {
                FixtureField::Text(page, name) => (*page, name, "Tx"),
                FixtureField::Checkbox(page, name) => (*page, name, "Btn"),
            };
            let y = 700 - 30 * (index as i64 % 20);
            let mut widget = dictionary! {
                "Type" => "Annot",
                "Subtype" => "Widget",
                "FT" => field_type,
                "T" => Object::string_literal(name.as_str()),
                "Rect" => vec![
                    Object::Integer(72),
                    Object::Integer(y),
                    Object::Integer(300),
                    Object::Integer(y + 18),
                ],
                "P" => page_ids[page],
            };
            if field_type == "Tx" {
                widget.set("DA", Object::string_literal("/Helv 0 Tf 0 g"));
            }
            let widget_id = doc.add_object(widget);
            field_refs.push(Object::Reference(widget_id));
            annots[page].push(Object::Reference(widget_id));
        }

        for (page_id, page_annots) in page_ids.iter().zip(annots) {
            if !page_annots.is_empty() {
                doc.get_dictionary_mut(*page_id)
                    .unwrap()
                    .set("Annots", page_annots);
            }
        }

        let mut acroform = dictionary! {
            "Fields" => field_refs,
            "DA" => Object::string_literal("/Helv 0 Tf 0 g"),
        };
        if self.xfa {
            let xfa_id = doc.add_object(Stream::new(
                dictionary! {},
                b"<xdp:xdp xmlns:xdp=\"http://ns.adobe.com/xdp/\"/>".to_vec(),
            ));
            acroform.set("XFA", xfa_id);
        }
        let acroform_id = doc.add_object(acroform);

        let catalog_id = catalog_id(&doc);
        doc.get_dictionary_mut(catalog_id)
            .unwrap()
            .set("AcroForm", acroform_id);

        save(doc)
    }
}

/// A PDF with `pages` marked pages and no form
pub fn blank_document(pages: usize) -> Vec<u8> {
    let (doc, _) = document_with_pages("BLANK", pages.max(1));
    save(doc)
}

/// A fixture shaped like the N-400 template
///
/// Carries one text field per exact binding rule, two copies of the A-number
/// field on different pages, a check box and an unrelated text field. Spans
/// three pages labelled `N-400`.
pub fn n400_template() -> Vec<u8> {
    let mut builder = FormTemplateBuilder::new().label("N-400").pages(3);
    builder = builder
        .text_field(0, "form1[0].#subform[0].#area[0].Line1_AlienNumber[0]")
        .text_field(2, "form1[0].#subform[10].#area[13].Line1_AlienNumber[9]");
    for rule in n400_field_map().rules {
        if let crate::mapping::FieldSelector::Exact(name) = rule.selector {
            builder = builder.text_field(1, name);
        }
    }
    builder
        .checkbox(1, "form1[0].#subform[1].P2_Line1_Eligibility[0]")
        .text_field(2, "form1[0].#subform[10].P12_Line6_Signature[0]")
        .build()
}

/// Extracted text markers of each page, in page order
pub fn page_markers(bytes: &[u8]) -> Vec<String> {
    let doc = Document::load_mem(bytes).unwrap();
    doc.get_pages()
        .values()
        .map(|page_id| {
            let content = doc.get_page_content(*page_id).unwrap();
            String::from_utf8_lossy(&content).into_owned()
        })
        .map(|content| {
            content
                .split('(')
                .nth(1)
                .and_then(|rest| rest.split(')').next())
                .unwrap_or_default()
                .to_string()
        })
        .collect()
}

fn document_with_pages(label: &str, page_count: usize) -> (Document, Vec<ObjectId>) {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });

    let mut page_ids = Vec::new();
    for index in 0..page_count {
        let content = format!("BT /F1 12 Tf 72 740 Td ({} page {}) Tj ET", label, index + 1);
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(612),
                Object::Integer(792),
            ],
            "Contents" => content_id,
            "Resources" => dictionary! {
                "Font" => dictionary! { "F1" => font_id },
            },
        });
        page_ids.push(page_id);
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => page_ids.iter().map(|id| Object::Reference(*id)).collect::<Vec<_>>(),
            "Count" => Object::Integer(page_count as i64),
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    (doc, page_ids)
}

fn catalog_id(doc: &Document) -> ObjectId {
    doc.trailer.get(b"Root").unwrap().as_reference().unwrap()
}

fn save(mut doc: Document) -> Vec<u8> {
    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).unwrap();
    buffer
}
