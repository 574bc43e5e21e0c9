//! Page concatenation
//!
//! Appends the pages of several documents, in order, into one new document.
//! Object ids of each part are shifted past the previous part, inheritable
//! page attributes are copied onto the pages before the old page trees are
//! dropped, and the AcroForm fields of all parts are carried into a single
//! form on the merged catalog.
//!
//! A part whose root field names clash with an earlier part (the same form
//! included twice) has its fields moved under a new `part<n>` parent, so
//! every field of the packet keeps a distinct fully qualified name.

use std::collections::HashSet;

use lopdf::{dictionary, Document, Object, ObjectId};

use crate::acroform::{acroform, decode_text_string, resolve};
use crate::error::{PdfError, Result};

const INHERITABLE: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

const MAX_TREE_DEPTH: usize = 32;

/// Number of pages in a PDF
pub fn page_count(bytes: &[u8]) -> Result<usize> {
    Ok(Document::load_mem(bytes)?.get_pages().len())
}

/// Concatenate documents in the given order
pub fn merge_documents<I, B>(parts: I) -> Result<Vec<u8>>
where
    I: IntoIterator<Item = B>,
    B: AsRef<[u8]>,
{
    let mut merged = Document::with_version("1.7");
    let mut next_id = 1;
    let mut page_ids: Vec<ObjectId> = Vec::new();
    let mut fields: Vec<Object> = Vec::new();
    let mut root_names: HashSet<String> = HashSet::new();
    let mut default_appearance: Option<Object> = None;
    let mut default_resources: Option<Object> = None;

    for (index, part) in parts.into_iter().enumerate() {
        let mut doc = Document::load_mem(part.as_ref())?;
        doc.renumber_objects_with(next_id);

        let pages: Vec<ObjectId> = doc.get_pages().into_values().collect();
        for page_id in &pages {
            inherit_page_attributes(&mut doc, *page_id)?;
        }

        let mut part_fields: Vec<Object> = Vec::new();
        if let Ok(form) = acroform(&doc) {
            if let Ok(list) = form.get(b"Fields") {
                part_fields.extend(resolve(&doc, list)?.as_array()?.iter().cloned());
            }
            if default_appearance.is_none() {
                default_appearance = form.get(b"DA").ok().cloned();
            }
            if default_resources.is_none() {
                default_resources = form.get(b"DR").ok().cloned();
            }
        }
        if !part_fields.is_empty() {
            let names = field_names(&doc, &part_fields);
            if names.iter().any(|name| root_names.contains(name)) {
                let parent = format!("part{}", index + 1);
                log::debug!(
                    "Part {} repeats field names, nesting them under {}",
                    index + 1,
                    parent
                );
                part_fields = vec![nest_fields(&mut doc, &parent, part_fields)?];
                root_names.insert(parent);
            } else {
                root_names.extend(names);
            }
            fields.extend(part_fields);
        }
        next_id = doc.max_id + 1;

        drop_document_structure(&mut doc)?;
        log::debug!("Appending part {} ({} pages)", index + 1, pages.len());
        page_ids.extend(pages);
        merged.objects.extend(doc.objects);
    }

    if page_ids.is_empty() {
        return Err(PdfError::NothingToMerge);
    }

    merged.max_id = next_id - 1;
    let pages_id = merged.new_object_id();
    for page_id in &page_ids {
        merged
            .get_dictionary_mut(*page_id)?
            .set("Parent", pages_id);
    }
    merged.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => page_ids.iter().map(|id| Object::Reference(*id)).collect::<Vec<_>>(),
            "Count" => Object::Integer(page_ids.len() as i64),
        }),
    );

    let mut catalog = dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    };
    if !fields.is_empty() {
        let mut form = dictionary! { "Fields" => fields };
        if let Some(da) = default_appearance {
            form.set("DA", da);
        }
        if let Some(dr) = default_resources {
            form.set("DR", dr);
        }
        let form_id = merged.add_object(form);
        catalog.set("AcroForm", form_id);
    }
    let catalog_id = merged.add_object(catalog);
    merged.trailer.set("Root", catalog_id);

    let mut buffer = Vec::new();
    merged.save_to(&mut buffer)?;
    Ok(buffer)
}

/// Partial names of the given root fields
fn field_names(doc: &Document, roots: &[Object]) -> Vec<String> {
    roots
        .iter()
        .filter_map(|root| root.as_reference().ok())
        .filter_map(|id| doc.get_dictionary(id).ok())
        .filter_map(|field| field.get(b"T").ok()?.as_str().ok().map(decode_text_string))
        .collect()
}

/// Make `roots` the kids of a new non-terminal field named `name`
fn nest_fields(doc: &mut Document, name: &str, roots: Vec<Object>) -> Result<Object> {
    let ids: Vec<ObjectId> = roots.iter().filter_map(|r| r.as_reference().ok()).collect();
    let parent_id = doc.add_object(dictionary! {
        "T" => Object::string_literal(name),
        "Kids" => roots,
    });
    for id in ids {
        doc.get_dictionary_mut(id)?.set("Parent", parent_id);
    }
    Ok(Object::Reference(parent_id))
}

/// Copy attributes a page inherits from its ancestors onto the page itself
fn inherit_page_attributes(doc: &mut Document, page_id: ObjectId) -> Result<()> {
    let mut inherited: Vec<(&[u8], Object)> = Vec::new();
    {
        let page = doc.get_dictionary(page_id)?;
        let mut missing: Vec<&[u8]> = INHERITABLE
            .iter()
            .copied()
            .filter(|key| !page.has(key))
            .collect();
        let mut parent = page.get(b"Parent").and_then(Object::as_reference).ok();

        let mut depth = 0;
        while let Some(parent_id) = parent {
            if missing.is_empty() || depth > MAX_TREE_DEPTH {
                break;
            }
            let node = doc.get_dictionary(parent_id)?;
            missing.retain(|key| match node.get(key) {
                Ok(value) => {
                    inherited.push((*key, value.clone()));
                    false
                }
                Err(_) => true,
            });
            parent = node.get(b"Parent").and_then(Object::as_reference).ok();
            depth += 1;
        }
    }

    let page = doc.get_dictionary_mut(page_id)?;
    for (key, value) in inherited {
        page.set(key, value);
    }
    Ok(())
}

/// Remove the catalog, its AcroForm and every page tree node
fn drop_document_structure(doc: &mut Document) -> Result<()> {
    let root_id = doc.trailer.get(b"Root")?.as_reference()?;
    let mut stale = vec![root_id];
    if let Ok(Object::Reference(form_id)) = doc.get_dictionary(root_id)?.get(b"AcroForm") {
        stale.push(*form_id);
    }
    stale.extend(doc.objects.iter().filter_map(|(id, object)| {
        let is_tree_node = object
            .as_dict()
            .and_then(|d| d.get(b"Type"))
            .and_then(Object::as_name)
            .map(|name| name == b"Pages")
            .unwrap_or(false);
        is_tree_node.then_some(*id)
    }));

    for id in stale {
        doc.objects.remove(&id);
    }
    Ok(())
}
