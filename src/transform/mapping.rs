//! Position mapping across queued edits
//!
//! Every step records which range it replaced and how large the
//! replacement was. Positions computed against an earlier document are
//! mapped forward through those records before being used on a later one.

/// One replaced range, in the coordinates of the document before the step
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MapRange {
    pub start: usize,
    pub old_size: usize,
    pub new_size: usize,
}

/// Position map of a single step
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StepMap {
    ranges: Vec<MapRange>,
}

impl StepMap {
    /// Map that leaves every position untouched
    pub fn empty() -> Self {
        Self { ranges: Vec::new() }
    }

    pub fn new(start: usize, old_size: usize, new_size: usize) -> Self {
        Self {
            ranges: vec![MapRange {
                start,
                old_size,
                new_size,
            }],
        }
    }

    /// Map `pos` through this step.
    ///
    /// `assoc` decides which side a position sticks to when content is
    /// inserted exactly at it: negative stays before, positive moves after.
    pub fn map(&self, pos: usize, assoc: i8) -> usize {
        let mut diff: isize = 0;
        for range in &self.ranges {
            if range.start > pos {
                break;
            }
            let end = range.start + range.old_size;
            if pos <= end {
                let side = if range.old_size == 0 {
                    assoc
                } else if pos == range.start {
                    -1
                } else if pos == end {
                    1
                } else {
                    assoc
                };
                let base = (range.start as isize + diff) as usize;
                return if side < 0 { base } else { base + range.new_size };
            }
            diff += range.new_size as isize - range.old_size as isize;
        }
        (pos as isize + diff) as usize
    }
}

/// Ordered sequence of step maps
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Mapping {
    maps: Vec<StepMap>,
}

impl Mapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, map: StepMap) {
        self.maps.push(map);
    }

    pub fn len(&self) -> usize {
        self.maps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.maps.is_empty()
    }

    /// Mapping covering only the steps from index `from` onwards
    pub fn slice(&self, from: usize) -> Mapping {
        Mapping {
            maps: self.maps[from.min(self.maps.len())..].to_vec(),
        }
    }

    /// Map a position forward, sticking after content inserted at it
    pub fn map(&self, pos: usize) -> usize {
        self.map_with_assoc(pos, 1)
    }

    pub fn map_with_assoc(&self, pos: usize, assoc: i8) -> usize {
        self.maps.iter().fold(pos, |pos, map| map.map(pos, assoc))
    }
}
