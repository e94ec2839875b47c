//! Unit of work: fetch and extract one document
//!
//! Every failure for a single id is folded into [`Outcome::Skip`] with a
//! tagged reason. Nothing escapes `process`, so one bad id cannot affect its
//! siblings in the same chunk or any later one.

use crate::crawler::fetcher::{DocumentFetcher, FetchError};
use crate::extract::{extract_record, ExtractError, Record, Region};
use std::fmt;

/// Why a document id produced no record
#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    /// Server returned a non-success status
    Fetch { status: u16 },

    /// An expected page element was missing
    Extraction(Region),

    /// The metadata block did not hold exactly two counters
    MalformedMetadata { tokens: usize },

    /// Anything else: transport errors, panics in a worker
    Unanticipated(String),
}

impl SkipReason {
    /// Returns true for the routine "document missing" noise
    pub fn is_expected(&self) -> bool {
        matches!(self, Self::Fetch { .. } | Self::Extraction(_))
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fetch { status } => write!(f, "HTTP {}", status),
            Self::Extraction(region) => write!(f, "missing {}", region),
            Self::MalformedMetadata { tokens } => {
                write!(f, "malformed metadata ({} tokens)", tokens)
            }
            Self::Unanticipated(message) => write!(f, "unanticipated: {}", message),
        }
    }
}

/// Result of processing one id
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Success(Record),
    Skip(SkipReason),
}

impl From<ExtractError> for SkipReason {
    fn from(error: ExtractError) -> Self {
        match error {
            ExtractError::MissingElement(region) => Self::Extraction(region),
            ExtractError::MalformedMetadata { tokens } => Self::MalformedMetadata { tokens },
        }
    }
}

/// Fetch + extract for a single document id
#[derive(Debug, Clone)]
pub struct UnitOfWork {
    fetcher: DocumentFetcher,
}

impl UnitOfWork {
    pub fn new(fetcher: DocumentFetcher) -> Self {
        Self { fetcher }
    }

    /// Processes document `id`, never failing
    pub async fn process(&self, id: u64) -> Outcome {
        let body = match self.fetcher.fetch(id).await {
            Ok(body) => body,
            Err(FetchError::Status { status, .. }) => {
                tracing::debug!("Skipping document {}: HTTP {}", id, status);
                return Outcome::Skip(SkipReason::Fetch { status });
            }
            Err(e) => {
                tracing::error!("Unanticipated failure fetching document {}: {:?}", id, e);
                return Outcome::Skip(SkipReason::Unanticipated(e.to_string()));
            }
        };

        // HTML parsing is CPU-bound; keep it off the async workers.
        let parsed = tokio::task::spawn_blocking(move || extract_record(id, &body)).await;

        match parsed {
            Ok(Ok(record)) => Outcome::Success(record),
            Ok(Err(e)) => {
                let reason = SkipReason::from(e);
                if reason.is_expected() {
                    tracing::debug!("Skipping document {}: {}", id, reason);
                } else {
                    tracing::warn!("Skipping document {}: {}", id, reason);
                }
                Outcome::Skip(reason)
            }
            Err(join_error) => {
                tracing::error!(
                    "Unanticipated failure extracting document {}: {:?}",
                    id,
                    join_error
                );
                Outcome::Skip(SkipReason::Unanticipated(join_error.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FetchConfig;
    use crate::crawler::fetcher::build_http_client;
    use url::Url;

    #[test]
    fn test_skip_reason_from_extract_error() {
        assert_eq!(
            SkipReason::from(ExtractError::MissingElement(Region::Title)),
            SkipReason::Extraction(Region::Title)
        );
        assert_eq!(
            SkipReason::from(ExtractError::MalformedMetadata { tokens: 3 }),
            SkipReason::MalformedMetadata { tokens: 3 }
        );
    }

    #[test]
    fn test_expected_reasons() {
        assert!(SkipReason::Fetch { status: 404 }.is_expected());
        assert!(SkipReason::Extraction(Region::Body).is_expected());
        assert!(!SkipReason::MalformedMetadata { tokens: 1 }.is_expected());
        assert!(!SkipReason::Unanticipated("boom".to_string()).is_expected());
    }

    #[test]
    fn test_skip_reason_display() {
        assert_eq!(SkipReason::Fetch { status: 410 }.to_string(), "HTTP 410");
        assert_eq!(
            SkipReason::Extraction(Region::LikeCount).to_string(),
            "missing like-count"
        );
    }

    #[tokio::test]
    async fn test_unreachable_host_is_skip_not_error() {
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let base = Url::parse(&format!("http://127.0.0.1:{}/poem/", port)).unwrap();
        let client = build_http_client(&FetchConfig::default()).unwrap();
        let unit = UnitOfWork::new(DocumentFetcher::new(client, base));

        let outcome = unit.process(1).await;
        assert!(matches!(
            outcome,
            Outcome::Skip(SkipReason::Unanticipated(_))
        ));
    }
}
