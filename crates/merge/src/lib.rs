//! Concatenates per-page PDFs into one archive.
//!
//! Each input is renumbered past the objects already collected, its pages are
//! re-parented under a single page tree, and one outline entry is added per
//! input pointing at its first page.

pub mod error;

use crate::error::{ErrorKind, Result};
use exn::{OptionExt, ResultExt};
use lopdf::{Bookmark, Dictionary, Document, Object, ObjectId, dictionary};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use time::OffsetDateTime;
use tracing::instrument;

const PDF_VERSION: &str = "1.7";
const PRODUCER: &str = concat!("docarchive ", env!("CARGO_PKG_VERSION"));
/// Page attributes a page may inherit from its ancestors in the page tree.
const INHERITABLE: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];
const MAX_TREE_DEPTH: usize = 32;
/// Objects rebuilt for the merged document rather than copied across.
const REBUILT_TYPES: [&[u8]; 5] = [b"Catalog", b"Pages", b"Page", b"Outlines", b"Outline"];

/// One input PDF and the outline title it is listed under.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Part {
    pub path: PathBuf,
    pub title: String,
}
impl Part {
    pub fn new(path: impl Into<PathBuf>, title: impl Into<String>) -> Self {
        Self { path: path.into(), title: title.into() }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MergeStats {
    /// Inputs that contributed at least one page.
    pub documents: usize,
    pub pages: usize,
}

#[instrument(skip_all, fields(inputs = parts.len(), output = %output.as_ref().display()))]
pub fn merge(parts: &[Part], output: impl AsRef<Path>) -> Result<MergeStats> {
    let output = output.as_ref();
    if parts.is_empty() {
        exn::bail!(ErrorKind::NothingToMerge);
    }

    let mut merged = Document::with_version(PDF_VERSION);
    let mut stats = MergeStats::default();
    let mut pages: Vec<(ObjectId, Dictionary)> = Vec::new();
    let mut objects: BTreeMap<ObjectId, Object> = BTreeMap::new();
    let mut next_id = 1;

    for part in parts {
        let path = part.path.display().to_string();
        let mut document = Document::load(&part.path).or_raise(|| ErrorKind::Load(path.clone()))?;
        document.renumber_objects_with(next_id);
        next_id = document.max_id + 1;

        let page_ids: Vec<ObjectId> = document.get_pages().into_values().collect();
        let Some(first) = page_ids.first().copied() else {
            tracing::warn!(pdf = %path, "PDF has no pages; leaving it out of the archive");
            continue;
        };
        merged.add_bookmark(Bookmark::new(part.title.clone(), [0.0, 0.0, 0.0], 0, first), None);
        for id in page_ids {
            let page = inherited_page(&document, id).ok_or_raise(|| ErrorKind::Invalid(path.clone()))?;
            pages.push((id, page));
        }
        tracing::debug!(pdf = %path, title = %part.title, pages = pages.len() - stats.pages, "Collected PDF pages");
        stats.documents += 1;
        stats.pages = pages.len();
        objects.extend(document.objects);
    }
    if pages.is_empty() {
        exn::bail!(ErrorKind::NothingToMerge);
    }

    merged.objects.extend(objects.into_iter().filter(|(_, object)| !REBUILT_TYPES.iter().any(|t| *t == type_of(object))));
    merged.max_id = next_id;

    let tree_id = merged.new_object_id();
    let kids = pages.iter().map(|(id, _)| Object::Reference(*id)).collect::<Vec<_>>();
    for (id, mut page) in pages {
        page.set("Parent", Object::Reference(tree_id));
        merged.objects.insert(id, Object::Dictionary(page));
    }
    let count = kids.len() as i64;
    merged.objects.insert(tree_id, Object::Dictionary(dictionary! { "Type" => "Pages", "Kids" => kids, "Count" => count }));

    let mut catalog = dictionary! { "Type" => "Catalog", "Pages" => Object::Reference(tree_id) };
    if let Some(outline) = merged.build_outline() {
        catalog.set("Outlines", Object::Reference(outline));
        catalog.set("PageMode", "UseOutlines");
    }
    let catalog_id = merged.add_object(catalog);
    let info_id = merged.add_object(dictionary! {
        "Producer" => Object::string_literal(PRODUCER),
        "CreationDate" => Object::string_literal(pdf_date(OffsetDateTime::now_utc())),
    });
    merged.trailer.set("Root", Object::Reference(catalog_id));
    merged.trailer.set("Info", Object::Reference(info_id));

    merged.compress();
    merged.save(output).or_raise(|| ErrorKind::Write(output.display().to_string()))?;
    tracing::info!(documents = stats.documents, pages = stats.pages, "Merged PDF written");
    Ok(stats)
}

/// The page dictionary with inherited attributes copied in, so the page
/// renders the same once it hangs off a different parent.
fn inherited_page(document: &Document, id: ObjectId) -> Option<Dictionary> {
    let mut page = document.get_object(id).ok()?.as_dict().ok()?.clone();
    let mut parent = page.get(b"Parent").and_then(Object::as_reference).ok();
    for _ in 0..MAX_TREE_DEPTH {
        let Some(node) = parent.and_then(|id| document.get_object(id).ok()).and_then(|o| o.as_dict().ok()) else {
            break;
        };
        for key in INHERITABLE {
            if page.get(key).is_err()
                && let Ok(value) = node.get(key)
            {
                page.set(key.to_vec(), value.clone());
            }
        }
        parent = node.get(b"Parent").and_then(Object::as_reference).ok();
    }
    Some(page)
}

fn type_of(object: &Object) -> &[u8] {
    let dict = match object {
        Object::Dictionary(dict) => dict,
        Object::Stream(stream) => &stream.dict,
        _ => return b"",
    };
    match dict.get(b"Type") {
        Ok(Object::Name(name)) => name,
        _ => b"",
    }
}

fn pdf_date(at: OffsetDateTime) -> String {
    format!(
        "D:{:04}{:02}{:02}{:02}{:02}{:02}Z",
        at.year(),
        u8::from(at.month()),
        at.day(),
        at.hour(),
        at.minute(),
        at.second()
    )
}
