use super::document::page_attribute;
use crate::error::CliError;
use anyhow::{Context, Result};
use lopdf::{dictionary, Document, Object, ObjectId};
use std::collections::HashSet;
use tracing::debug;

/// Keys a page may inherit from its ancestors in the page tree.
const INHERITABLE: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Build a new document from pages of `sources`.
///
/// `order` lists `(source index, zero-based page)` pairs in output order. Each
/// page keeps its content, resources, annotations and geometry. The first
/// source supplies the PDF version and the document info dictionary.
/// Objects no output page reaches are dropped.
pub fn assemble(sources: &[&Document], order: &[(usize, usize)]) -> Result<Document> {
    let first = sources.first().context("No source documents")?;
    if order.is_empty() {
        anyhow::bail!(CliError::NoPagesSelected);
    }

    let mut out = Document::with_version(first.version.clone());
    let mut source_pages: Vec<Vec<ObjectId>> = Vec::with_capacity(sources.len());

    for (n, source) in sources.iter().enumerate() {
        if !order.iter().any(|&(s, _)| s == n) {
            source_pages.push(Vec::new());
            continue;
        }

        let mut doc = (*source).clone();
        doc.renumber_objects_with(out.max_id + 1);

        let pages: Vec<ObjectId> = doc.page_iter().collect();
        for &page_id in &pages {
            flatten_inherited(&mut doc, page_id)?;
        }

        if n == 0 {
            if let Ok(info) = doc.trailer.get(b"Info") {
                out.trailer.set("Info", info.clone());
            }
        }

        for (id, object) in doc.objects {
            let is_tree_node = object
                .as_dict()
                .is_ok_and(|d| d.has_type(b"Catalog") || d.has_type(b"Pages"));
            if !is_tree_node {
                out.objects.insert(id, object);
            }
        }
        out.max_id = out.max_id.max(doc.max_id);
        source_pages.push(pages);
    }

    let mut kids = Vec::with_capacity(order.len());
    let mut used = HashSet::new();
    for &(source, page) in order {
        let id = *source_pages
            .get(source)
            .and_then(|pages| pages.get(page))
            .with_context(|| format!("Page {} not found in source {}", page + 1, source + 1))?;

        // A page listed twice gets its own page object sharing the same content.
        let id = if used.insert(id) {
            id
        } else {
            let copy = out.get_dictionary(id)?.clone();
            out.add_object(copy)
        };
        kids.push(id);
    }

    let pages_id = out.new_object_id();
    for &kid in &kids {
        out.get_dictionary_mut(kid)?.set("Parent", pages_id);
    }
    out.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Count" => kids.len() as i64,
            "Kids" => kids.iter().copied().map(Object::Reference).collect::<Vec<_>>(),
        }),
    );
    let catalog_id = out.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    out.trailer.set("Root", catalog_id);

    let pruned = out.prune_objects();
    out.renumber_objects();
    debug!(
        pages = kids.len(),
        pruned = pruned.len(),
        objects = out.objects.len(),
        "assembled document"
    );

    Ok(out)
}

/// Copy inherited attributes onto the page itself so it can live under a new parent.
fn flatten_inherited(doc: &mut Document, page_id: ObjectId) -> Result<()> {
    let page = doc.get_dictionary(page_id)?;
    let missing: Vec<_> = INHERITABLE
        .into_iter()
        .filter(|key| !page.has(key))
        .filter_map(|key| page_attribute(doc, page, key).map(|value| (key, value)))
        .collect();

    if missing.is_empty() {
        return Ok(());
    }
    let page = doc.get_dictionary_mut(page_id)?;
    for (key, value) in missing {
        page.set(key, value);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::document::tests::{page_labels, sample_document};

    #[test]
    fn test_interleave_sources() {
        let a = sample_document(3);
        let b = sample_document(2);
        let doc = assemble(&[&a, &b], &[(0, 0), (1, 1), (0, 2), (1, 0)]).unwrap();
        assert_eq!(page_labels(&doc), vec!["page1", "page2", "page3", "page1"]);
        assert_eq!(doc.get_pages().len(), 4);
    }

    #[test]
    fn test_inherited_attributes_follow_page() {
        let src = sample_document(2);
        let doc = assemble(&[&src], &[(0, 1)]).unwrap();
        let page_id = doc.page_iter().next().unwrap();
        let page = doc.get_dictionary(page_id).unwrap();
        assert!(page.has(b"MediaBox"));
        assert!(page.has(b"Resources"));
        assert!(!page.has(b"Rotate"));
    }

    #[test]
    fn test_unused_objects_pruned() {
        let src = sample_document(10);
        let doc = assemble(&[&src], &[(0, 4)]).unwrap();
        assert!(doc.objects.len() < src.objects.len());
        let catalog = doc.catalog().unwrap();
        assert!(catalog.has(b"Pages"));
        assert_eq!(page_labels(&doc), vec!["page5"]);
    }

    #[test]
    fn test_info_from_first_source() {
        let a = sample_document(1);
        let mut b = sample_document(1);
        b.trailer.remove(b"Info");
        let doc = assemble(&[&b, &a], &[(0, 0), (1, 0)]).unwrap();
        assert!(doc.trailer.get(b"Info").is_err());

        let doc = assemble(&[&a, &b], &[(0, 0), (1, 0)]).unwrap();
        assert!(doc.trailer.get(b"Info").is_ok());
    }

    #[test]
    fn test_repeated_page() {
        let src = sample_document(2);
        let doc = assemble(&[&src], &[(0, 1), (0, 1)]).unwrap();
        let ids: Vec<_> = doc.page_iter().collect();
        assert_eq!(ids.len(), 2);
        assert_ne!(ids[0], ids[1]);
        assert_eq!(page_labels(&doc), vec!["page2", "page2"]);
    }

    #[test]
    fn test_missing_page() {
        let src = sample_document(2);
        assert!(assemble(&[&src], &[(0, 2)]).is_err());
        assert!(assemble(&[&src], &[(1, 0)]).is_err());
        assert!(assemble(&[&src], &[]).is_err());
    }
}
