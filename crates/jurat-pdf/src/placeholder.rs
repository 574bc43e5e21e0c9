//! Generic placeholder pages
//!
//! Forms without an official template are rendered as a plain summary: a
//! title line followed by one `label: value` row per schema field, on US
//! Letter pages. Rows that do not fit spill onto continuation pages.

use jurat_core::PreviewRow;
use lopdf::{dictionary, Document, Object, ObjectId, Stream};

use crate::acroform::{escape_literal, win_ansi_bytes};
use crate::error::Result;

const PAGE_WIDTH: i64 = 612;
const PAGE_HEIGHT: i64 = 792;
const MARGIN: i64 = 72;
const TITLE_Y: i64 = 740;
const FIRST_ROW_Y: i64 = 690;
const ROW_HEIGHT: i64 = 18;
const VALUE_X: i64 = 260;
const MAX_VALUE_CHARS: usize = 60;
const EMPTY_VALUE: &str = "(not provided)";

/// Rows that fit on one page
pub const ROWS_PER_PAGE: usize = ((FIRST_ROW_Y - MARGIN) / ROW_HEIGHT) as usize + 1;

/// Render the label/value rows of a form onto blank pages
///
/// `title` is printed after the form id on every page.
pub fn render_placeholder(form_id: &str, title: &str, rows: &[PreviewRow]) -> Result<Vec<u8>> {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();
    let regular = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let bold = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica-Bold",
        "Encoding" => "WinAnsiEncoding",
    });

    let chunks: Vec<&[PreviewRow]> = if rows.is_empty() {
        vec![rows]
    } else {
        rows.chunks(ROWS_PER_PAGE).collect()
    };

    let mut page_ids: Vec<ObjectId> = Vec::with_capacity(chunks.len());
    for (index, chunk) in chunks.iter().enumerate() {
        let title = if index == 0 {
            format!("{} {}", form_id, title)
        } else {
            format!("{} {}, continued", form_id, title)
        };
        let content = page_content(&title, chunk);
        let content_id = doc.add_object(Stream::new(dictionary! {}, content));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(PAGE_WIDTH),
                Object::Integer(PAGE_HEIGHT),
            ],
            "Contents" => content_id,
            "Resources" => dictionary! {
                "Font" => dictionary! { "F1" => regular, "F2" => bold },
            },
        });
        page_ids.push(page_id);
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => page_ids.iter().map(|id| Object::Reference(*id)).collect::<Vec<_>>(),
            "Count" => Object::Integer(page_ids.len() as i64),
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    log::debug!(
        "Rendered placeholder for {} ({} rows, {} pages)",
        form_id,
        rows.len(),
        page_ids.len()
    );

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)?;
    Ok(buffer)
}

fn page_content(title: &str, rows: &[PreviewRow]) -> Vec<u8> {
    let mut content = Vec::new();
    show_text(&mut content, "F2", 16, MARGIN, TITLE_Y, title);
    show_text(
        &mut content,
        "F1",
        9,
        MARGIN,
        TITLE_Y - 20,
        "Summary of intake data. No official template is filled for this form.",
    );

    let mut y = FIRST_ROW_Y;
    for row in rows {
        show_text(&mut content, "F2", 10, MARGIN, y, row.label);
        let value = if row.is_missing() {
            EMPTY_VALUE.to_string()
        } else {
            truncate(&row.value, MAX_VALUE_CHARS)
        };
        show_text(&mut content, "F1", 10, VALUE_X, y, &value);
        y -= ROW_HEIGHT;
    }
    content
}

fn show_text(content: &mut Vec<u8>, font: &str, size: i64, x: i64, y: i64, text: &str) {
    content.extend_from_slice(format!("BT /{} {} Tf {} {} Td (", font, size, x, y).as_bytes());
    content.extend(escape_literal(&win_ansi_bytes(text)));
    content.extend_from_slice(b") Tj ET\n");
}

fn truncate(value: &str, max_chars: usize) -> String {
    if value.chars().count() <= max_chars {
        return value.to_string();
    }
    let mut truncated: String = value.chars().take(max_chars - 3).collect();
    truncated.push_str("...");
    truncated
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::page_markers;
    use jurat_core::{find_form, normalize, preview, RawClientRecord};

    fn render(rows: &[PreviewRow]) -> Vec<u8> {
        let form = find_form("I-130").unwrap();
        render_placeholder(form.id, form.title, rows).unwrap()
    }

    fn i130_rows() -> Vec<PreviewRow> {
        let record = normalize(&RawClientRecord {
            full_name: Some("Diego Gomez".to_string()),
            ..Default::default()
        });
        preview(&record, "I-130")
    }

    #[test]
    fn test_single_page_placeholder() {
        let bytes = render(&i130_rows());
        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 1);

        let markers = page_markers(&bytes);
        assert_eq!(markers, vec!["I-130 Petition for Alien Relative".to_string()]);

        let page_id = *doc.get_pages().values().next().unwrap();
        let content = String::from_utf8_lossy(&doc.get_page_content(page_id).unwrap()).into_owned();
        assert!(content.contains("(Diego Gomez)"));
        assert!(content.contains("(Petitioner full legal name)"));
        assert!(content.contains("(\\(not provided\\))"));
    }

    #[test]
    fn test_rows_spill_onto_continuation_pages() {
        let rows = i130_rows();
        let many: Vec<PreviewRow> = rows.iter().cycle().take(ROWS_PER_PAGE + 1).cloned().collect();
        let bytes = render(&many);
        let markers = page_markers(&bytes);
        assert_eq!(markers.len(), 2);
        assert!(markers[1].ends_with("continued"));
    }

    #[test]
    fn test_empty_rows_still_render_a_page() {
        let bytes = render(&[]);
        assert_eq!(Document::load_mem(&bytes).unwrap().get_pages().len(), 1);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghijkl", 8), "abcde...");
    }
}
