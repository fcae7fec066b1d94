use super::document::page_attribute;
use anyhow::{Context, Result};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};
use std::collections::HashSet;
use tracing::{debug, instrument};

/// Operators that paint text.
const TEXT_OPERATORS: [&str; 4] = ["Tj", "TJ", "'", "\""];

/// Remove every image draw from the given pages: `Do` of an image XObject and
/// inline images. Returns the number of operations removed.
#[instrument(skip_all, fields(pages = pages.len()))]
pub fn remove_images(doc: &mut Document, pages: &[ObjectId]) -> Result<usize> {
    let mut removed = 0;
    for &page_id in pages {
        let images = image_names(doc, page_id);
        removed += filter_content(doc, page_id, |op| match op.operator.as_str() {
            "BI" => false,
            "Do" => !op
                .operands
                .first()
                .and_then(|name| name.as_name().ok())
                .is_some_and(|name| images.contains(name)),
            _ => true,
        })?;
    }
    Ok(removed)
}

/// Remove every text-showing operation from the given pages.
#[instrument(skip_all, fields(pages = pages.len()))]
pub fn remove_text(doc: &mut Document, pages: &[ObjectId]) -> Result<usize> {
    let mut removed = 0;
    for &page_id in pages {
        removed += filter_content(doc, page_id, |op| {
            !TEXT_OPERATORS.contains(&op.operator.as_str())
        })?;
    }
    Ok(removed)
}

/// Remove link annotations from the given pages.
#[instrument(skip_all, fields(pages = pages.len()))]
pub fn remove_links(doc: &mut Document, pages: &[ObjectId]) -> Result<usize> {
    let mut removed = 0;
    for &page_id in pages {
        let page = doc.get_dictionary(page_id)?;
        let Ok(annots) = page.get_deref(b"Annots", doc).and_then(Object::as_array) else {
            continue;
        };

        let kept: Vec<Object> = annots
            .iter()
            .filter(|annot| {
                !doc.dereference(annot)
                    .and_then(|(_, obj)| obj.as_dict())
                    .is_ok_and(|dict| {
                        dict.get(b"Subtype").and_then(Object::as_name).ok() == Some(&b"Link"[..])
                    })
            })
            .cloned()
            .collect();

        let count = annots.len() - kept.len();
        if count == 0 {
            continue;
        }
        removed += count;

        let page = doc.get_dictionary_mut(page_id)?;
        if kept.is_empty() {
            page.remove(b"Annots");
        } else {
            page.set("Annots", kept);
        }
        debug!(?page_id, count, "removed links");
    }
    Ok(removed)
}

/// Names in the page's XObject resources that refer to images.
fn image_names(doc: &Document, page_id: ObjectId) -> HashSet<Vec<u8>> {
    let Some(resources) = doc
        .get_dictionary(page_id)
        .ok()
        .and_then(|page| page_attribute(doc, page, b"Resources"))
    else {
        return HashSet::new();
    };
    let xobjects = doc
        .dereference(&resources)
        .and_then(|(_, res)| res.as_dict())
        .and_then(|res| res.get_deref(b"XObject", doc))
        .and_then(Object::as_dict);
    let Ok(xobjects) = xobjects else {
        return HashSet::new();
    };

    xobjects
        .iter()
        .filter(|(_, value)| {
            doc.dereference(value)
                .and_then(|(_, obj)| obj.as_stream())
                .is_ok_and(|stream| {
                    stream.dict.get(b"Subtype").and_then(Object::as_name).ok() == Some(&b"Image"[..])
                })
        })
        .map(|(name, _)| name.clone())
        .collect()
}

/// Rewrite the page content keeping only operations matching `keep`. The page
/// gets a fresh content stream so streams shared with other pages are untouched.
fn filter_content<F>(doc: &mut Document, page_id: ObjectId, keep: F) -> Result<usize>
where
    F: Fn(&Operation) -> bool,
{
    if doc.get_page_contents(page_id).is_empty() {
        return Ok(0);
    }
    let content = doc
        .get_and_decode_page_content(page_id)
        .with_context(|| format!("Failed to decode content of page {page_id:?}"))?;

    let before = content.operations.len();
    let operations: Vec<Operation> = content.operations.into_iter().filter(keep).collect();
    let removed = before - operations.len();
    if removed == 0 {
        return Ok(0);
    }

    let encoded = encode(&operations)?;
    let stream_id = doc.add_object(Stream::new(dictionary! {}, encoded));
    doc.get_dictionary_mut(page_id)?
        .set("Contents", Object::Reference(stream_id));
    debug!(?page_id, removed, "rewrote page content");
    Ok(removed)
}

/// Encode operations back into a content stream. Inline images are written
/// as `BI <entries> ID <data> EI` rather than as stream objects.
fn encode(operations: &[Operation]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    for (i, op) in operations.iter().enumerate() {
        if i > 0 {
            out.push(b'\n');
        }
        match (op.operator.as_str(), op.operands.first()) {
            ("BI", Some(Object::Stream(image))) => {
                let entries = image
                    .dict
                    .iter()
                    .filter(|(key, _)| key.as_slice() != b"Length")
                    .flat_map(|(key, value)| [Object::Name(key.clone()), value.clone()])
                    .collect();
                let header = Content {
                    operations: vec![Operation::new("ID", entries)],
                }
                .encode()?;
                out.extend_from_slice(b"BI ");
                out.extend_from_slice(&header);
                out.push(b' ');
                out.extend_from_slice(&image.content);
                out.extend_from_slice(b"\nEI");
            }
            _ => {
                let encoded = Content {
                    operations: std::slice::from_ref(op),
                }
                .encode()?;
                out.extend_from_slice(&encoded);
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::document::tests::sample_document;

    /// Page 1 draws an image XObject and an inline image and carries a link
    /// and a text annotation.
    fn decorated_document() -> (Document, Vec<ObjectId>) {
        let mut doc = sample_document(2);
        let ids: Vec<_> = doc.page_iter().collect();

        let image_id = doc.add_object(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => 1,
                "Height" => 1,
                "ColorSpace" => "DeviceGray",
                "BitsPerComponent" => 8,
            },
            vec![0x80],
        ));
        let link_id = doc.add_object(dictionary! {
            "Type" => "Annot",
            "Subtype" => "Link",
            "Rect" => vec![0.into(), 0.into(), 10.into(), 10.into()],
        });
        let note_id = doc.add_object(dictionary! {
            "Type" => "Annot",
            "Subtype" => "Text",
            "Rect" => vec![20.into(), 20.into(), 30.into(), 30.into()],
        });

        let content = b"BT /F1 24 Tf 72 720 Td (page1) Tj ET\nq 10 0 0 10 0 0 cm /Im1 Do Q\n\
BI /W 1 /H 1 /CS /DeviceGray /BPC 8 ID \x80 EI\n"
            .to_vec();
        let content_id = doc.add_object(Stream::new(dictionary! {}, content));

        let page = doc.get_dictionary_mut(ids[0]).unwrap();
        page.set("Contents", content_id);
        page.set(
            "Resources",
            dictionary! {
                "XObject" => dictionary! { "Im1" => image_id },
            },
        );
        page.set(
            "Annots",
            vec![Object::Reference(link_id), Object::Reference(note_id)],
        );
        (doc, ids)
    }

    fn operators(doc: &Document, page_id: ObjectId) -> Vec<String> {
        doc.get_and_decode_page_content(page_id)
            .unwrap()
            .operations
            .into_iter()
            .map(|op| op.operator)
            .collect()
    }

    #[test]
    fn test_remove_images() {
        let (mut doc, ids) = decorated_document();
        let removed = remove_images(&mut doc, &ids).unwrap();
        assert_eq!(removed, 2);
        let ops = operators(&doc, ids[0]);
        assert!(!ops.iter().any(|op| op == "Do" || op == "BI"));
        assert!(ops.iter().any(|op| op == "Tj"));
    }

    #[test]
    fn test_remove_text() {
        let (mut doc, ids) = decorated_document();
        let removed = remove_text(&mut doc, &ids).unwrap();
        assert_eq!(removed, 2);
        for &id in &ids {
            assert!(!operators(&doc, id).iter().any(|op| op == "Tj"));
        }
    }

    #[test]
    fn test_remove_links() {
        let (mut doc, ids) = decorated_document();
        assert_eq!(remove_links(&mut doc, &ids).unwrap(), 1);
        let annots = doc.get_page_annotations(ids[0]).unwrap();
        assert_eq!(annots.len(), 1);
        assert_eq!(annots[0].get(b"Subtype").unwrap().as_name().unwrap(), b"Text");

        assert_eq!(remove_links(&mut doc, &ids).unwrap(), 0);
    }

    #[test]
    fn test_nothing_to_remove() {
        let mut doc = sample_document(1);
        let ids: Vec<_> = doc.page_iter().collect();
        let before = doc.objects.len();
        assert_eq!(remove_images(&mut doc, &ids).unwrap(), 0);
        assert_eq!(remove_links(&mut doc, &ids).unwrap(), 0);
        assert_eq!(doc.objects.len(), before);
    }
}
