use super::document::{page_attribute, rect};
use crate::error::CliError;
use anyhow::{Context, Result};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};
use tracing::{debug, instrument};

const PAGE_BOXES: [&[u8]; 5] = [b"MediaBox", b"CropBox", b"BleedBox", b"TrimBox", b"ArtBox"];

/// Rotate pages clockwise by `angle` degrees, a multiple of 90.
#[instrument(skip(doc, pages), fields(pages = pages.len()))]
pub fn rotate(doc: &mut Document, pages: &[ObjectId], angle: i64) -> Result<()> {
    if angle % 90 != 0 {
        anyhow::bail!(CliError::bad_parameter(
            "Rotation angle must be increment of 90."
        ));
    }

    for &page_id in pages {
        let page = doc.get_dictionary(page_id)?;
        let current = page_attribute(doc, page, b"Rotate")
            .and_then(|obj| obj.as_i64().ok())
            .unwrap_or(0);
        let rotation = (current.rem_euclid(360) + angle.rem_euclid(360)) % 360;
        doc.get_dictionary_mut(page_id)?.set("Rotate", rotation);
        debug!(?page_id, current, rotation, "rotated page");
    }
    Ok(())
}

/// How `scale` interprets its two numbers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scaling {
    /// Multiply page size by these factors.
    By { horizontal: f32, vertical: f32 },
    /// Resize pages to this width and height in points.
    To { width: f32, height: f32 },
}

impl Scaling {
    pub fn new(horizontal: f32, vertical: f32, to: bool) -> Result<Self> {
        if !(horizontal > 0.0 && vertical > 0.0) || !horizontal.is_finite() || !vertical.is_finite()
        {
            anyhow::bail!(CliError::bad_parameter(
                "Scale values must be positive."
            ));
        }
        Ok(if to {
            Scaling::To {
                width: horizontal,
                height: vertical,
            }
        } else {
            Scaling::By {
                horizontal,
                vertical,
            }
        })
    }

    fn factors(self, media_box: [f32; 4]) -> Result<(f32, f32)> {
        match self {
            Scaling::By {
                horizontal,
                vertical,
            } => Ok((horizontal, vertical)),
            Scaling::To { width, height } => {
                let current_width = (media_box[2] - media_box[0]).abs();
                let current_height = (media_box[3] - media_box[1]).abs();
                if current_width == 0.0 || current_height == 0.0 {
                    anyhow::bail!("Page has an empty MediaBox");
                }
                Ok((width / current_width, height / current_height))
            }
        }
    }
}

/// Scale page content, page boxes and annotation rectangles.
#[instrument(skip(doc, pages), fields(pages = pages.len()))]
pub fn scale(doc: &mut Document, pages: &[ObjectId], scaling: Scaling) -> Result<()> {
    for &page_id in pages {
        let page = doc.get_dictionary(page_id)?;
        let media_box = page_attribute(doc, page, b"MediaBox")
            .and_then(|obj| rect(doc, &obj))
            .with_context(|| format!("Page {page_id:?} has no MediaBox"))?;
        let (sx, sy) = scaling.factors(media_box)?;
        scale_page(doc, page_id, sx, sy)?;
        debug!(?page_id, sx, sy, "scaled page");
    }
    Ok(())
}

fn scale_page(doc: &mut Document, page_id: ObjectId, sx: f32, sy: f32) -> Result<()> {
    let page = doc.get_dictionary(page_id)?;

    let boxes: Vec<_> = PAGE_BOXES
        .into_iter()
        .filter_map(|key| {
            let value = match key {
                b"MediaBox" | b"CropBox" => page_attribute(doc, page, key)?,
                _ => page.get(key).ok()?.clone(),
            };
            Some((key, scale_rect(rect(doc, &value)?, sx, sy)))
        })
        .collect();

    let contents = content_refs(doc, page);

    let annots: Vec<ObjectId> = page
        .get_deref(b"Annots", doc)
        .and_then(Object::as_array)
        .map(|items| items.iter().filter_map(|o| o.as_reference().ok()).collect())
        .unwrap_or_default();
    let annot_rects: Vec<_> = annots
        .into_iter()
        .filter_map(|id| {
            let annot = doc.get_dictionary(id).ok()?;
            let r = rect(doc, annot.get(b"Rect").ok()?)?;
            Some((id, scale_rect(r, sx, sy)))
        })
        .collect();

    if let Some(contents) = contents {
        let pre = doc.add_object(Stream::new(
            dictionary! {},
            format!("q {sx} 0 0 {sy} 0 0 cm\n").into_bytes(),
        ));
        let post = doc.add_object(Stream::new(dictionary! {}, b"\nQ\n".to_vec()));

        let mut wrapped = Vec::with_capacity(contents.len() + 2);
        wrapped.push(Object::Reference(pre));
        wrapped.extend(contents);
        wrapped.push(Object::Reference(post));
        doc.get_dictionary_mut(page_id)?.set("Contents", wrapped);
    }

    let page = doc.get_dictionary_mut(page_id)?;
    for (key, value) in boxes {
        page.set(key, value);
    }

    for (id, value) in annot_rects {
        doc.get_dictionary_mut(id)?.set("Rect", value);
    }

    Ok(())
}

/// The page's content streams as a list of objects, or `None` for a blank page.
fn content_refs(doc: &Document, page: &lopdf::Dictionary) -> Option<Vec<Object>> {
    match page.get(b"Contents").ok()? {
        Object::Array(items) => Some(items.clone()),
        Object::Reference(id) => match doc.get_object(*id).ok()? {
            Object::Array(items) => Some(items.clone()),
            _ => Some(vec![Object::Reference(*id)]),
        },
        _ => None,
    }
}

fn scale_rect(r: [f32; 4], sx: f32, sy: f32) -> Vec<Object> {
    vec![
        (r[0] * sx).into(),
        (r[1] * sy).into(),
        (r[2] * sx).into(),
        (r[3] * sy).into(),
    ]
}
