//! Point-in-time captures of process memory and the regions a scan matches

use crate::core::types::{Address, MemoryError, MemoryResult, MemoryValue, ScanConstraints, ValueType};
use serde::{Deserialize, Serialize};

/// One contiguous captured byte range with its current and optional previous bytes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotRegion {
    base_address: Address,
    length: usize,
    current: Vec<u8>,
    previous: Option<Vec<u8>>,
}

impl SnapshotRegion {
    /// Creates a region whose logical length is the whole buffer
    pub fn new(base_address: Address, current: Vec<u8>) -> MemoryResult<Self> {
        let length = current.len();
        Self::with_length(base_address, length, current)
    }

    /// Creates a region whose buffer may extend past its logical length
    pub fn with_length(base_address: Address, length: usize, current: Vec<u8>) -> MemoryResult<Self> {
        if current.len() < length {
            return Err(MemoryError::invalid_region(
                base_address,
                format!("buffer holds {} bytes but length is {}", current.len(), length),
            ));
        }
        base_address.checked_add(length)?;

        Ok(SnapshotRegion {
            base_address,
            length,
            current,
            previous: None,
        })
    }

    /// Attaches the bytes captured by the prior snapshot of the same range
    pub fn with_previous(mut self, previous: Vec<u8>) -> MemoryResult<Self> {
        if previous.len() < self.length {
            return Err(MemoryError::invalid_region(
                self.base_address,
                format!(
                    "previous buffer holds {} bytes but length is {}",
                    previous.len(),
                    self.length
                ),
            ));
        }
        self.previous = Some(previous);
        Ok(self)
    }

    pub fn base_address(&self) -> Address {
        self.base_address
    }

    /// Logical length in bytes
    pub fn length(&self) -> usize {
        self.length
    }

    pub fn end_address(&self) -> Address {
        self.base_address.add(self.length)
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Current bytes, trimmed to the logical length
    pub fn current_bytes(&self) -> &[u8] {
        &self.current[..self.length]
    }

    /// Previous bytes, trimmed to the logical length
    pub fn previous_bytes(&self) -> Option<&[u8]> {
        self.previous.as_deref().map(|previous| &previous[..self.length])
    }

    pub fn has_previous(&self) -> bool {
        self.previous.is_some()
    }

    pub fn contains(&self, address: Address) -> bool {
        address >= self.base_address && address < self.end_address()
    }

    /// Reads a value of the given type at an absolute address
    pub fn read_value(&self, address: Address, value_type: ValueType) -> Option<MemoryValue> {
        if !self.contains(address) {
            return None;
        }
        let offset = address.as_usize() - self.base_address.as_usize();
        MemoryValue::from_bytes(&self.current_bytes()[offset..], value_type)
    }
}

/// A maximal contiguous range of lanes for which the scan constraints held
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MatchedRegion {
    pub address: Address,
    pub length: usize,
}

impl MatchedRegion {
    pub fn new(address: Address, length: usize) -> Self {
        MatchedRegion { address, length }
    }

    pub fn end_address(&self) -> Address {
        self.address.add(self.length)
    }

    /// Start addresses of every matching value covered by this region
    pub fn candidate_addresses(&self, alignment: usize) -> impl Iterator<Item = Address> {
        (self.address.as_usize()..self.end_address().as_usize())
            .step_by(alignment.max(1))
            .map(Address::new)
    }
}

/// Process memory captured at one instant
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    regions: Vec<SnapshotRegion>,
}

impl Snapshot {
    /// Creates a snapshot, ordering regions by base address
    pub fn new(mut regions: Vec<SnapshotRegion>) -> MemoryResult<Self> {
        regions.sort_by_key(SnapshotRegion::base_address);

        for pair in regions.windows(2) {
            if pair[0].end_address() > pair[1].base_address() {
                return Err(MemoryError::invalid_region(
                    pair[1].base_address(),
                    format!("overlaps region at {}", pair[0].base_address()),
                ));
            }
        }

        Ok(Snapshot { regions })
    }

    pub fn regions(&self) -> &[SnapshotRegion] {
        &self.regions
    }

    pub fn region_count(&self) -> usize {
        self.regions.len()
    }

    /// Total logical bytes across all regions
    pub fn byte_count(&self) -> usize {
        self.regions.iter().map(SnapshotRegion::length).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Finds the region containing an address
    pub fn find_region(&self, address: Address) -> Option<&SnapshotRegion> {
        let index = self
            .regions
            .partition_point(|region| region.base_address() <= address);
        index
            .checked_sub(1)
            .map(|index| &self.regions[index])
            .filter(|region| region.contains(address))
    }

    pub fn read_value(&self, address: Address, value_type: ValueType) -> Option<MemoryValue> {
        self.find_region(address)?.read_value(address, value_type)
    }

    /// Builds a snapshot holding only the bytes of matched values, for a follow-up scan.
    ///
    /// Each match is widened to cover the full trailing value and clipped to its
    /// source region; ranges that then touch are merged.
    pub fn from_matches(
        source: &Snapshot,
        matches: &[MatchedRegion],
        constraints: &ScanConstraints,
    ) -> MemoryResult<Self> {
        let size = constraints.data_type_size();
        let lane_width = constraints.alignment_bytes().min(size);
        let mut ranges: Vec<(&SnapshotRegion, usize, usize)> = Vec::new();

        for matched in matches {
            let region = source.find_region(matched.address).ok_or_else(|| {
                MemoryError::InvalidAddress(format!(
                    "{} is outside every snapshot region",
                    matched.address
                ))
            })?;

            let start = matched.address.as_usize() - region.base_address().as_usize();
            let end = (start + matched.length + size - lane_width).min(region.length());

            let touches_last = matches!(
                ranges.last(),
                Some(&(last_region, _, last_end))
                    if last_region.base_address() == region.base_address() && start <= last_end
            );
            if !touches_last {
                ranges.push((region, start, end));
            } else if let Some(last) = ranges.last_mut() {
                last.2 = last.2.max(end);
            }
        }

        let mut regions = Vec::with_capacity(ranges.len());
        for (region, start, end) in ranges {
            let base = region.base_address().add(start);
            let mut narrowed = SnapshotRegion::new(base, region.current_bytes()[start..end].to_vec())?;
            if let Some(previous) = region.previous_bytes() {
                narrowed = narrowed.with_previous(previous[start..end].to_vec())?;
            }
            regions.push(narrowed);
        }

        Snapshot::new(regions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{MemoryAlignment, ScanCompareType};

    #[test]
    fn test_region_rejects_short_buffer() {
        let result = SnapshotRegion::with_length(Address::new(0x1000), 8, vec![0; 4]);
        assert!(matches!(result, Err(MemoryError::InvalidRegion { .. })));

        let region = SnapshotRegion::new(Address::new(0x1000), vec![0; 8]).unwrap();
        assert!(region.with_previous(vec![0; 7]).is_err());
    }

    #[test]
    fn test_region_trims_to_logical_length() {
        let region = SnapshotRegion::with_length(Address::new(0x10), 3, vec![1, 2, 3, 4, 5])
            .unwrap()
            .with_previous(vec![9, 9, 9, 9])
            .unwrap();
        assert_eq!(region.current_bytes(), &[1, 2, 3]);
        assert_eq!(region.previous_bytes(), Some(&[9u8, 9, 9][..]));
        assert_eq!(region.end_address(), Address::new(0x13));
        assert!(region.contains(Address::new(0x12)));
        assert!(!region.contains(Address::new(0x13)));
    }

    #[test]
    fn test_snapshot_orders_and_rejects_overlap() {
        let a = SnapshotRegion::new(Address::new(0x2000), vec![0; 16]).unwrap();
        let b = SnapshotRegion::new(Address::new(0x1000), vec![0; 16]).unwrap();
        let snapshot = Snapshot::new(vec![a, b]).unwrap();
        assert_eq!(snapshot.regions()[0].base_address(), Address::new(0x1000));
        assert_eq!(snapshot.byte_count(), 32);

        let c = SnapshotRegion::new(Address::new(0x1000), vec![0; 16]).unwrap();
        let d = SnapshotRegion::new(Address::new(0x1008), vec![0; 16]).unwrap();
        assert!(Snapshot::new(vec![c, d]).is_err());
    }

    #[test]
    fn test_find_region_and_read_value() {
        let a = SnapshotRegion::new(Address::new(0x1000), vec![0x78, 0x56, 0x34, 0x12]).unwrap();
        let b = SnapshotRegion::new(Address::new(0x3000), vec![0xFF; 4]).unwrap();
        let snapshot = Snapshot::new(vec![a, b]).unwrap();

        assert!(snapshot.find_region(Address::new(0x0FFF)).is_none());
        assert!(snapshot.find_region(Address::new(0x2000)).is_none());
        assert_eq!(
            snapshot.find_region(Address::new(0x3003)).unwrap().base_address(),
            Address::new(0x3000)
        );
        assert_eq!(
            snapshot.read_value(Address::new(0x1000), ValueType::U32),
            Some(MemoryValue::U32(0x12345678))
        );
        assert_eq!(snapshot.read_value(Address::new(0x1001), ValueType::U32), None);
    }

    #[test]
    fn test_candidate_addresses() {
        let matched = MatchedRegion::new(Address::new(0x100), 8);
        let starts: Vec<_> = matched.candidate_addresses(4).collect();
        assert_eq!(starts, vec![Address::new(0x100), Address::new(0x104)]);
        assert_eq!(matched.candidate_addresses(1).count(), 8);
    }

    #[test]
    fn test_from_matches_widens_and_merges() {
        let bytes: Vec<u8> = (0..32).collect();
        let region = SnapshotRegion::new(Address::new(0x1000), bytes).unwrap();
        let source = Snapshot::new(vec![region]).unwrap();
        let constraints = ScanConstraints::new(
            ValueType::U32,
            MemoryAlignment::Alignment1,
            ScanCompareType::NotEqual,
            Some(MemoryValue::U32(0)),
        );

        let matches = vec![
            MatchedRegion::new(Address::new(0x1000), 1),
            MatchedRegion::new(Address::new(0x1002), 1),
            MatchedRegion::new(Address::new(0x101E), 1),
        ];
        let narrowed = Snapshot::from_matches(&source, &matches, &constraints).unwrap();

        assert_eq!(narrowed.region_count(), 2);
        assert_eq!(narrowed.regions()[0].base_address(), Address::new(0x1000));
        assert_eq!(narrowed.regions()[0].length(), 6);
        // Clipped at the source region end
        assert_eq!(narrowed.regions()[1].current_bytes(), &[30, 31]);
    }

    #[test]
    fn test_from_matches_keeps_regions_apart() {
        let first = SnapshotRegion::new(Address::new(0x1000), vec![1; 8]).unwrap();
        let second = SnapshotRegion::new(Address::new(0x1008), vec![2; 8])
            .unwrap()
            .with_previous(vec![3; 8])
            .unwrap();
        let third = SnapshotRegion::new(Address::new(0x4000), vec![4; 8]).unwrap();
        let source = Snapshot::new(vec![third, first, second]).unwrap();
        let constraints = ScanConstraints::new(
            ValueType::U16,
            MemoryAlignment::Alignment2,
            ScanCompareType::NotEqual,
            Some(MemoryValue::U16(0)),
        );

        // Adjacent regions do not merge even when the ranges touch
        let matches = vec![
            MatchedRegion::new(Address::new(0x1006), 2),
            MatchedRegion::new(Address::new(0x1008), 4),
            MatchedRegion::new(Address::new(0x4004), 2),
        ];
        let narrowed = Snapshot::from_matches(&source, &matches, &constraints).unwrap();

        let layout: Vec<(Address, usize)> = narrowed
            .regions()
            .iter()
            .map(|region| (region.base_address(), region.length()))
            .collect();
        assert_eq!(
            layout,
            vec![
                (Address::new(0x1006), 2),
                (Address::new(0x1008), 4),
                (Address::new(0x4004), 2),
            ]
        );
        assert_eq!(narrowed.regions()[1].previous_bytes(), Some(&[3u8; 4][..]));

        let stray = vec![MatchedRegion::new(Address::new(0x2000), 2)];
        assert!(matches!(
            Snapshot::from_matches(&source, &stray, &constraints),
            Err(MemoryError::InvalidAddress(_))
        ));
    }
}
