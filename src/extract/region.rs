//! Structural regions of a document page
//!
//! Each region the extractor needs is an explicit variant with its own CSS
//! selector. Lookups return `Option` so a missing element is an ordinary
//! value rather than an error deep inside the parser.

use scraper::{ElementRef, Html, Selector};
use std::fmt;

/// A structural element sought on a document page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Region {
    /// Block holding the view and comment counters
    Metadata,

    /// Counter inside the "Liked" button
    LikeCount,

    /// Container wrapping the title and body
    Document,

    /// Document title, looked up inside [`Region::Document`]
    Title,

    /// Document body, looked up inside [`Region::Document`]
    Body,
}

impl Region {
    /// CSS selector for this region, relative to its enclosing scope
    pub fn css(&self) -> &'static str {
        match self {
            Self::Metadata => r#"div[class*="item-info"]"#,
            Self::LikeCount => r#"a[alt="Liked: "]"#,
            Self::Document => "div.items_group.main_poem",
            Self::Title => r#"h1[class*="title"]"#,
            Self::Body => "div",
        }
    }

    /// Prefix that one of the element's class tokens must carry
    ///
    /// Checked per token, so `class="liked btn"` still counts as a button.
    pub fn class_prefix(&self) -> Option<&'static str> {
        match self {
            Self::LikeCount => Some("btn"),
            Self::Body => Some("orig_"),
            Self::Metadata | Self::Document | Self::Title => None,
        }
    }

    /// Selector for the element holding the value inside the matched one
    pub fn inner_css(&self) -> Option<&'static str> {
        match self {
            Self::LikeCount => Some("span.num"),
            _ => None,
        }
    }

    /// The region this one must be nested in, if any
    pub fn scope(&self) -> Option<Region> {
        match self {
            Self::Title | Self::Body => Some(Self::Document),
            Self::Metadata | Self::LikeCount | Self::Document => None,
        }
    }

    /// Finds the first element matching this region
    pub fn locate<'a>(&self, document: &'a Html) -> Option<ElementRef<'a>> {
        let scope = match self.scope() {
            Some(parent) => parent.locate(document)?,
            None => document.root_element(),
        };
        let selector = Selector::parse(self.css()).ok()?;
        let element = first_match(scope, &selector, |candidate| self.has_class_prefix(candidate))?;

        match self.inner_css() {
            Some(css) => {
                let inner = Selector::parse(css).ok()?;
                first_match(element, &inner, |_| true)
            }
            None => Some(element),
        }
    }

    fn has_class_prefix(&self, element: &ElementRef<'_>) -> bool {
        match self.class_prefix() {
            Some(prefix) => element
                .value()
                .classes()
                .any(|class| class.starts_with(prefix)),
            None => true,
        }
    }

    /// Collects all text beneath the region, if it exists
    pub fn text(&self, document: &Html) -> Option<String> {
        self.locate(document)
            .map(|element| element.text().collect::<String>())
    }
}

fn first_match<'a>(
    scope: ElementRef<'a>,
    selector: &Selector,
    mut keep: impl FnMut(&ElementRef<'a>) -> bool,
) -> Option<ElementRef<'a>> {
    scope.select(selector).find(|element| keep(element))
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Metadata => "metadata",
            Self::LikeCount => "like-count",
            Self::Document => "document",
            Self::Title => "title",
            Self::Body => "body",
        };
        write!(f, "{}", name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REGIONS: [Region; 5] = [
        Region::Metadata,
        Region::LikeCount,
        Region::Document,
        Region::Title,
        Region::Body,
    ];

    const PAGE: &str = r#"
        <html><body>
            <div class="media item-info clearfix">1.2K views +list 7</div>
            <a class="btn btn-sm" alt="Liked: "><span class="num">31</span></a>
            <div class="items_group main_poem">
                <h1 class="title vcard">Night Walk</h1>
                <div class="orig_12 poem_body">The street is quiet.</div>
            </div>
        </body></html>
    "#;

    #[test]
    fn test_all_selectors_parse() {
        for region in REGIONS {
            assert!(
                Selector::parse(region.css()).is_ok(),
                "selector for {} should parse",
                region
            );
            if let Some(inner) = region.inner_css() {
                assert!(Selector::parse(inner).is_ok(), "inner selector for {}", region);
            }
        }
    }

    #[test]
    fn test_locate_every_region() {
        let document = Html::parse_document(PAGE);
        for region in REGIONS {
            assert!(region.locate(&document).is_some(), "missing {}", region);
        }
    }

    #[test]
    fn test_region_text() {
        let document = Html::parse_document(PAGE);
        assert_eq!(Region::Title.text(&document).as_deref(), Some("Night Walk"));
        assert_eq!(Region::LikeCount.text(&document).as_deref(), Some("31"));
    }

    #[test]
    fn test_title_outside_document_is_ignored() {
        let html = r#"<html><body>
            <h1 class="title">Stray</h1>
            <div class="items_group main_poem"><div class="orig_1">text</div></div>
        </body></html>"#;
        let document = Html::parse_document(html);
        assert!(Region::Title.locate(&document).is_none());
        assert!(Region::Body.locate(&document).is_some());
    }

    #[test]
    fn test_like_button_requires_alt() {
        let html = r#"<html><body><a class="btn"><span class="num">3</span></a></body></html>"#;
        let document = Html::parse_document(html);
        assert!(Region::LikeCount.locate(&document).is_none());
    }

    #[test]
    fn test_class_prefix_matches_any_token() {
        let html = r#"<html><body>
            <a class="liked btn-xs" alt="Liked: "><span class="num">8</span></a>
            <div class="items_group main_poem">
                <div class="poem orig_1">Second token.</div>
            </div>
        </body></html>"#;
        let document = Html::parse_document(html);
        assert_eq!(Region::LikeCount.text(&document).as_deref(), Some("8"));
        assert_eq!(Region::Body.text(&document).as_deref(), Some("Second token."));
    }

    #[test]
    fn test_class_prefix_is_not_a_substring_match() {
        let html = r#"<html><body>
            <a class="xbtn" alt="Liked: "><span class="num">8</span></a>
            <div class="items_group main_poem"><div class="not_orig_1">x</div></div>
        </body></html>"#;
        let document = Html::parse_document(html);
        assert!(Region::LikeCount.locate(&document).is_none());
        assert!(Region::Body.locate(&document).is_none());
    }

    #[test]
    fn test_display() {
        assert_eq!(Region::LikeCount.to_string(), "like-count");
        assert_eq!(Region::Body.to_string(), "body");
    }
}
