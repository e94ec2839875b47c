//! Field extraction from a fetched document page
//!
//! Pulls the counters, title and body out of a page and assembles a
//! [`Record`]. A page missing any expected region is the normal
//! "deleted/private/paywalled" case and is reported as
//! [`ExtractError::MissingElement`].

use crate::extract::numeric::to_number;
use crate::extract::region::Region;
use crate::extract::text::compose_text;
use crate::extract::Record;
use scraper::Html;
use thiserror::Error;

/// Filler substrings stripped from the metadata block before tokenizing
const METADATA_FILLER: [&str; 2] = ["views", "+list"];

/// Reasons a page could not be turned into a record
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExtractError {
    #[error("Missing {0} element")]
    MissingElement(Region),

    #[error("Metadata block has {tokens} tokens, expected 2")]
    MalformedMetadata { tokens: usize },
}

/// Splits the metadata block into `(views, comments)`
///
/// The block reads like `"1.2K views +list 7"`. After removing the filler
/// words exactly two tokens must remain, in document order.
pub fn parse_metadata(info: &str) -> Result<(f64, f64), ExtractError> {
    let mut cleaned = info.to_string();
    for filler in METADATA_FILLER {
        cleaned = cleaned.replace(filler, "");
    }

    let tokens: Vec<&str> = cleaned.split_whitespace().collect();
    match tokens.as_slice() {
        [views, comments] => Ok((to_number(*views), to_number(*comments))),
        other => Err(ExtractError::MalformedMetadata {
            tokens: other.len(),
        }),
    }
}

/// Extracts a record for document `id` from its page body
///
/// # Example
///
/// ```
/// use quire::extract::extract_record;
///
/// let html = r#"<html><body>
///     <div class="item-info">12 views +list 3</div>
///     <a class="btn" alt="Liked: "><span class="num">5</span></a>
///     <div class="items_group main_poem">
///         <h1 class="title">Dawn</h1><div class="orig_1">Light.</div>
///     </div>
/// </body></html>"#;
///
/// let record = extract_record(9, html).unwrap();
/// assert_eq!(record.views(), 12.0);
/// assert_eq!(record.text(), "Dawn\n\nLight.");
/// ```
pub fn extract_record(id: u64, html: &str) -> Result<Record, ExtractError> {
    let document = Html::parse_document(html);

    let info = require(&document, Region::Metadata)?;
    let (views, comments) = parse_metadata(&info)?;
    let likes = to_number(&require(&document, Region::LikeCount)?);
    let title = require(&document, Region::Title)?;
    let body = require(&document, Region::Body)?;

    Ok(Record::new(
        id,
        views,
        likes,
        comments,
        compose_text(&title, &body),
    ))
}

fn require(document: &Html, region: Region) -> Result<String, ExtractError> {
    // Title and body live inside the document container; report the
    // container itself when it is the part that is absent.
    if let Some(scope) = region.scope() {
        if scope.locate(document).is_none() {
            return Err(ExtractError::MissingElement(scope));
        }
    }
    region
        .text(document)
        .ok_or(ExtractError::MissingElement(region))
}
