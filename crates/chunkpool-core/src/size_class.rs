//! Size-class table: the ordered `(capacity, slot size)` pairs a pool is built from.

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_CLASS_CAPACITY, DEFAULT_SLOT_SIZES};
use crate::error::PoolError;

/// One size class: `capacity` chunks of `slot_size` bytes each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeClass {
    /// Number of chunks in the class.
    pub capacity: usize,
    /// Bytes each chunk can hold.
    pub slot_size: usize,
}

impl SizeClass {
    /// Create a size class descriptor.
    #[must_use]
    pub const fn new(capacity: usize, slot_size: usize) -> Self {
        Self {
            capacity,
            slot_size,
        }
    }

    /// Bytes of backing storage this class needs.
    #[must_use]
    pub fn total_bytes(&self) -> usize {
        self.capacity.saturating_mul(self.slot_size)
    }
}

#[derive(Serialize, Deserialize)]
struct TableRepr {
    classes: Vec<SizeClass>,
}

/// Validated, ascending-by-slot-size list of size classes.
///
/// Class selection scans the table in order and picks the first fit, so the
/// ascending order is what makes it pick the *smallest* fitting class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TableRepr", into = "TableRepr")]
pub struct SizeClassTable {
    classes: Vec<SizeClass>,
}

impl SizeClassTable {
    /// Build a table, checking that it is non-empty, that no class has zero
    /// capacity or zero slot size, and that slot sizes strictly ascend.
    pub fn new(classes: Vec<SizeClass>) -> Result<Self, PoolError> {
        if classes.is_empty() {
            return Err(PoolError::InvalidConfig(
                "at least one size class is required".into(),
            ));
        }
        for (i, class) in classes.iter().enumerate() {
            if class.capacity == 0 {
                return Err(PoolError::InvalidConfig(format!(
                    "size class {i} has zero capacity"
                )));
            }
            if class.slot_size == 0 {
                return Err(PoolError::InvalidConfig(format!(
                    "size class {i} has zero slot size"
                )));
            }
        }
        if let Some(i) = classes
            .windows(2)
            .position(|w| w[0].slot_size >= w[1].slot_size)
        {
            return Err(PoolError::InvalidConfig(format!(
                "slot sizes must ascend: class {} ({} bytes) is not smaller than class {} ({} bytes)",
                i,
                classes[i].slot_size,
                i + 1,
                classes[i + 1].slot_size
            )));
        }
        Ok(Self { classes })
    }

    /// The classes, in ascending slot-size order.
    #[must_use]
    pub fn classes(&self) -> &[SizeClass] {
        &self.classes
    }

    /// Number of classes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Always `false`: a validated table holds at least one class.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Slot size of the largest class.
    #[must_use]
    pub fn largest_slot_size(&self) -> usize {
        self.classes.last().map_or(0, |c| c.slot_size)
    }

    /// Index of the first class whose slot size is strictly greater than `size`.
    ///
    /// A request equal to a class's slot size does not fit that class.
    #[must_use]
    pub fn select(&self, size: usize) -> Option<usize> {
        self.classes.iter().position(|c| size < c.slot_size)
    }

    /// Total bytes of chunk storage the table describes.
    #[must_use]
    pub fn total_bytes(&self) -> usize {
        self.classes
            .iter()
            .fold(0usize, |acc, c| acc.saturating_add(c.total_bytes()))
    }
}

impl Default for SizeClassTable {
    fn default() -> Self {
        Self {
            classes: DEFAULT_SLOT_SIZES
                .iter()
                .map(|&slot_size| SizeClass::new(DEFAULT_CLASS_CAPACITY, slot_size))
                .collect(),
        }
    }
}

impl TryFrom<Vec<SizeClass>> for SizeClassTable {
    type Error = PoolError;

    fn try_from(classes: Vec<SizeClass>) -> Result<Self, Self::Error> {
        Self::new(classes)
    }
}

impl TryFrom<TableRepr> for SizeClassTable {
    type Error = PoolError;

    fn try_from(repr: TableRepr) -> Result<Self, Self::Error> {
        Self::new(repr.classes)
    }
}

impl From<SizeClassTable> for TableRepr {
    fn from(table: SizeClassTable) -> Self {
        Self {
            classes: table.classes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_table() {
        let table = SizeClassTable::default();
        assert_eq!(table.len(), 4);
        assert_eq!(table.largest_slot_size(), 2048);
        assert!(table.classes().iter().all(|c| c.capacity == 100));
        assert_eq!(table.total_bytes(), 100 * (256 + 512 + 1024 + 2048));
    }

    #[test]
    fn select_uses_strict_less_than() {
        let table = SizeClassTable::default();
        assert_eq!(table.select(0), Some(0));
        assert_eq!(table.select(56), Some(0));
        assert_eq!(table.select(255), Some(0));
        assert_eq!(table.select(256), Some(1));
        assert_eq!(table.select(1024), Some(3));
        assert_eq!(table.select(2047), Some(3));
        assert_eq!(table.select(2048), None);
    }

    #[test]
    fn rejects_empty() {
        assert!(matches!(
            SizeClassTable::new(Vec::new()),
            Err(PoolError::InvalidConfig(_))
        ));
    }

    #[test]
    fn rejects_zero_capacity_and_slot() {
        assert!(SizeClassTable::new(vec![SizeClass::new(0, 64)]).is_err());
        assert!(SizeClassTable::new(vec![SizeClass::new(4, 0)]).is_err());
    }

    #[test]
    fn rejects_unordered() {
        let err = SizeClassTable::new(vec![SizeClass::new(1, 512), SizeClass::new(1, 256)])
            .unwrap_err();
        assert!(err.to_string().contains("must ascend"));
        assert!(SizeClassTable::new(vec![SizeClass::new(1, 256), SizeClass::new(1, 256)]).is_err());
    }

    #[test]
    fn deserialize_validates() {
        let table: SizeClassTable = serde_json::from_str(
            r#"{"classes":[{"capacity":2,"slot_size":64},{"capacity":1,"slot_size":128}]}"#,
        )
        .unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.classes()[1], SizeClass::new(1, 128));

        let bad = serde_json::from_str::<SizeClassTable>(r#"{"classes":[]}"#);
        assert!(bad.is_err());
    }

    #[test]
    fn serialize_shape() {
        let table = SizeClassTable::new(vec![SizeClass::new(3, 32)]).unwrap();
        let json = serde_json::to_string(&table).unwrap();
        assert_eq!(json, r#"{"classes":[{"capacity":3,"slot_size":32}]}"#);
    }
}
