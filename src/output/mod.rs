//! Output module for inspecting the archive
//!
//! This module handles:
//! - Printing committed documents with their metadata sidecars
//! - Recording archive statistics

pub mod stats;

pub use stats::{load_statistics, print_statistics, ArchiveStatistics};

use crate::archive::{ArchiveReader, ArchiveStore};
use crate::QuireError;
use std::io::Write;

/// Writes every committed document, segment by segment, to `out`
///
/// Returns the number of documents written.
pub fn write_documents<W: Write>(store: &dyn ArchiveStore, out: &mut W) -> Result<u64, QuireError> {
    let reader = ArchiveReader::new(store);
    let mut written = 0u64;

    for segment in reader.segments()? {
        writeln!(
            out,
            "##### segment {} (run {}, {} documents, {})",
            segment.id, segment.run_id, segment.record_count, segment.committed_at
        )?;
        for (text, meta) in reader.documents(&segment)? {
            writeln!(out, "=====")?;
            writeln!(
                out,
                "id: {}, views: {}, comments: {}, likes: {}",
                meta.id, meta.views, meta.comments, meta.likes
            )?;
            writeln!(out, "{}", text)?;
            writeln!(out, "=====")?;
            written += 1;
        }
    }

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::{RunParams, SqliteArchive};
    use crate::extract::Record;

    #[test]
    fn test_write_documents() {
        let mut store = SqliteArchive::new_in_memory().unwrap();
        let run_id = store
            .create_run(&RunParams {
                start_id: 1,
                count: 2,
                chunk_size: 2,
                commit_every: 1,
                config_hash: String::new(),
            })
            .unwrap();
        store
            .commit_segment(run_id, &[Record::new(2, 5.0, 1.0, 0.0, "Rain\n\nFalls")])
            .unwrap();

        let mut out = Vec::new();
        let written = write_documents(&store, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert_eq!(written, 1);
        assert!(text.contains("id: 2, views: 5, comments: 0, likes: 1"));
        assert!(text.contains("Rain\n\nFalls"));
    }
}
