//! Splitting an id range into fixed-size chunks
//!
//! Chunks are the unit of dispatch and of checkpointing. Their order is what
//! drives commit cadence and progress reporting.

use std::ops::Range;

/// A contiguous run of document ids, `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk {
    /// Zero-based position of this chunk in the run
    pub index: usize,
    pub start: u64,
    pub end: u64,
}

impl Chunk {
    pub fn ids(&self) -> Range<u64> {
        self.start..self.end
    }

    pub fn len(&self) -> usize {
        (self.end - self.start) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Lazily yields the chunks of an id range in ascending order
#[derive(Debug, Clone)]
pub struct Partition {
    next_start: u64,
    end: u64,
    chunk_size: u64,
    index: usize,
}

impl Iterator for Partition {
    type Item = Chunk;

    fn next(&mut self) -> Option<Chunk> {
        if self.next_start >= self.end {
            return None;
        }
        let start = self.next_start;
        let end = start.saturating_add(self.chunk_size).min(self.end);
        let chunk = Chunk {
            index: self.index,
            start,
            end,
        };
        self.next_start = end;
        self.index += 1;
        Some(chunk)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.end.saturating_sub(self.next_start);
        let chunks = remaining.div_ceil(self.chunk_size) as usize;
        (chunks, Some(chunks))
    }
}

impl ExactSizeIterator for Partition {}

/// Splits `[start_id, start_id + count)` into chunks of at most `chunk_size`
///
/// `chunk_size` is clamped to at least 1. The last chunk may be shorter.
/// An overflowing range is truncated at `u64::MAX`.
///
/// # Example
///
/// ```
/// use quire::crawler::partition;
///
/// let sizes: Vec<usize> = partition(1, 10, 3).map(|c| c.len()).collect();
/// assert_eq!(sizes, vec![3, 3, 3, 1]);
/// ```
pub fn partition(start_id: u64, count: u64, chunk_size: usize) -> Partition {
    Partition {
        next_start: start_id,
        end: start_id.saturating_add(count),
        chunk_size: chunk_size.max(1) as u64,
        index: 0,
    }
}

/// Number of chunks `partition` would produce
pub fn chunk_count(count: u64, chunk_size: usize) -> usize {
    count.div_ceil(chunk_size.max(1) as u64) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_exact_cover(start: u64, count: u64, chunk_size: usize) {
        let chunks: Vec<Chunk> = partition(start, count, chunk_size).collect();
        let size = chunk_size.max(1);

        assert_eq!(chunks.len(), chunk_count(count, chunk_size));
        assert_eq!(chunks.first().map(|c| c.start), Some(start));
        assert_eq!(chunks.last().map(|c| c.end), Some(start + count));

        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.index, i);
            assert!(!chunk.is_empty());
            assert!(chunk.len() <= size);
            if i + 1 < chunks.len() {
                assert_eq!(chunk.len(), size, "only the last chunk may be short");
                assert_eq!(chunk.end, chunks[i + 1].start, "chunks must be contiguous");
            }
        }
    }

    #[test]
    fn test_exact_cover_over_many_shapes() {
        for start in [1, 2, 17, 1_000_000] {
            for count in 1..=40 {
                for chunk_size in 1..=12 {
                    assert_exact_cover(start, count, chunk_size);
                }
            }
        }
    }

    #[test]
    fn test_ten_ids_in_threes() {
        let chunks: Vec<Chunk> = partition(1, 10, 3).collect();
        let ranges: Vec<(u64, u64)> = chunks.iter().map(|c| (c.start, c.end)).collect();
        assert_eq!(ranges, vec![(1, 4), (4, 7), (7, 10), (10, 11)]);
    }

    #[test]
    fn test_zero_chunk_size_clamped() {
        let chunks: Vec<Chunk> = partition(5, 3, 0).collect();
        assert_eq!(chunks.len(), 3);
        assert!(chunks.iter().all(|c| c.len() == 1));
    }

    #[test]
    fn test_chunk_larger_than_range() {
        let chunks: Vec<Chunk> = partition(1, 5, 100).collect();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].ids().collect::<Vec<_>>(), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_empty_range() {
        assert_eq!(partition(1, 0, 10).count(), 0);
        assert_eq!(chunk_count(0, 10), 0);
    }

    #[test]
    fn test_exact_size_iterator() {
        let mut parts = partition(1, 10, 3);
        assert_eq!(parts.len(), 4);
        parts.next();
        assert_eq!(parts.len(), 3);
    }
}
