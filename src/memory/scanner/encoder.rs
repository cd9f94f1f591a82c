//! Run-length encoding of per-lane match results into contiguous regions

use super::vector::{ByteVector, VECTOR_SIZE};
use crate::core::types::Address;
use crate::memory::snapshot::MatchedRegion;

/// Collapses a lane-ordered match stream into maximal matched ranges.
///
/// Lanes are consumed in ascending address order starting at the address given
/// to [`RunLengthEncoder::new`]. A run still open when the stream ends is only
/// emitted by [`RunLengthEncoder::finalize`].
///
/// The cursor wraps at the top of the address space: the last window of a
/// region ending near `usize::MAX` steps past it, but those lanes are masked
/// and never open a run.
#[derive(Debug)]
pub struct RunLengthEncoder {
    cursor: usize,
    run_start: Option<usize>,
    run_length: usize,
    regions: Vec<MatchedRegion>,
}

impl RunLengthEncoder {
    pub fn new(start_address: Address) -> Self {
        RunLengthEncoder {
            cursor: start_address.as_usize(),
            run_start: None,
            run_length: 0,
            regions: Vec::new(),
        }
    }

    /// Address of the next lane to be encoded
    pub fn cursor(&self) -> Address {
        Address::new(self.cursor)
    }

    /// Marks the next `length` lanes as matched, opening a run if none is open
    #[inline]
    pub fn encode_range(&mut self, length: usize) {
        if self.run_start.is_none() {
            self.run_start = Some(self.cursor);
        }
        self.run_length += length;
        self.cursor = self.cursor.wrapping_add(length);
    }

    /// Closes any open run, then skips `advance` unmatched lanes
    #[inline]
    pub fn finalize_current_encode(&mut self, advance: usize) {
        self.close_run();
        self.cursor = self.cursor.wrapping_add(advance);
    }

    /// Encodes a single lane
    pub fn encode_lane(&mut self, matched: bool) {
        if matched {
            self.encode_range(1);
        } else {
            self.finalize_current_encode(1);
        }
    }

    /// Encodes one window of scan results
    pub fn encode_vector(&mut self, results: ByteVector) {
        if results.is_zero() {
            self.finalize_current_encode(VECTOR_SIZE);
        } else if results.all_lanes_set() {
            self.encode_range(VECTOR_SIZE);
        } else {
            for lane in results.to_bytes() {
                self.encode_lane(lane != 0);
            }
        }
    }

    /// Closes a run left open at the end of the stream
    pub fn finalize(&mut self) {
        self.close_run();
    }

    /// Regions emitted so far. Does not close an open run.
    pub fn into_regions(self) -> Vec<MatchedRegion> {
        self.regions
    }

    /// Finalizes and returns every collected region
    pub fn finish(mut self) -> Vec<MatchedRegion> {
        self.finalize();
        self.regions
    }

    fn close_run(&mut self) {
        if let Some(start) = self.run_start.take() {
            self.regions
                .push(MatchedRegion::new(Address::new(start), self.run_length));
            self.run_length = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn encode(base: usize, lanes: &[bool]) -> Vec<MatchedRegion> {
        let mut encoder = RunLengthEncoder::new(Address::new(base));
        for &lane in lanes {
            encoder.encode_lane(lane);
        }
        encoder.finish()
    }

    #[test]
    fn test_runs_are_maximal() {
        let regions = encode(0x100, &[true, true, false, true, false, false, true, true, true]);
        assert_eq!(
            regions,
            vec![
                MatchedRegion::new(Address::new(0x100), 2),
                MatchedRegion::new(Address::new(0x103), 1),
                MatchedRegion::new(Address::new(0x106), 3),
            ]
        );
    }

    #[test]
    fn test_missing_finalize_drops_final_run() {
        let mut encoder = RunLengthEncoder::new(Address::new(0));
        encoder.encode_lane(false);
        encoder.encode_lane(true);
        encoder.encode_lane(true);
        assert!(encoder.into_regions().is_empty());

        assert_eq!(
            encode(0, &[false, true, true]),
            vec![MatchedRegion::new(Address::new(1), 2)]
        );
    }

    #[test]
    fn test_vector_fast_paths() {
        let mut encoder = RunLengthEncoder::new(Address::new(0x1000));
        encoder.encode_vector(ByteVector::ALL_BITS);
        encoder.encode_vector(ByteVector::lanes_below(4));
        encoder.encode_vector(ByteVector::ZERO);
        encoder.encode_vector(ByteVector::lanes_from(15));
        assert_eq!(encoder.cursor(), Address::new(0x1040));

        assert_eq!(
            encoder.finish(),
            vec![
                MatchedRegion::new(Address::new(0x1000), 20),
                MatchedRegion::new(Address::new(0x103F), 1),
            ]
        );
    }

    #[test]
    fn test_finalize_is_idempotent() {
        let mut encoder = RunLengthEncoder::new(Address::new(0));
        encoder.encode_range(4);
        encoder.finalize();
        encoder.finalize();
        assert_eq!(encoder.finish(), vec![MatchedRegion::new(Address::new(0), 4)]);
    }

    #[test]
    fn test_empty_stream() {
        assert!(encode(0, &[]).is_empty());
        assert!(encode(0, &[false; 40]).is_empty());
    }

    #[test]
    fn test_window_ending_at_address_space_top() {
        let mut encoder = RunLengthEncoder::new(Address::new(usize::MAX - 15));
        encoder.encode_vector(ByteVector::from_fn(|lane| (11..15).contains(&lane)));
        encoder.encode_vector(ByteVector::ZERO);
        assert_eq!(
            encoder.finish(),
            vec![MatchedRegion::new(Address::new(usize::MAX - 4), 4)]
        );
    }
}
