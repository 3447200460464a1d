use serde::{Deserialize, Serialize};

use crate::errors::CalculationError;

/// 标准钢筋长度（毫米），升序。
pub const REFERENCE_LENGTHS_MM: [u32; 16] = [
    950, 1050, 1150, 1300, 1450, 1650, 1950, 2300, 2900, 3900, 4850, 5850, 6850, 7800, 8800, 11700,
];

/// 标准钢筋长度目录。构造时保证非空、严格递增且全部为正数。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<u32>", into = "Vec<u32>")]
pub struct RebarCatalog {
    lengths_mm: Vec<u32>,
}

impl RebarCatalog {
    pub fn reference() -> Self {
        Self {
            lengths_mm: REFERENCE_LENGTHS_MM.to_vec(),
        }
    }

    pub fn new(lengths_mm: Vec<u32>) -> Result<Self, CalculationError> {
        if lengths_mm.is_empty() {
            return Err(CalculationError::InvalidParameter(
                "rebar catalog is empty".to_string(),
            ));
        }
        if lengths_mm.contains(&0) {
            return Err(CalculationError::InvalidParameter(
                "rebar catalog contains a zero length".to_string(),
            ));
        }
        if let Some(pair) = lengths_mm.windows(2).find(|pair| pair[0] >= pair[1]) {
            return Err(CalculationError::InvalidParameter(format!(
                "rebar catalog must be strictly ascending ({} is followed by {})",
                pair[0], pair[1]
            )));
        }
        Ok(Self { lengths_mm })
    }

    #[inline]
    pub fn lengths_mm(&self) -> &[u32] {
        &self.lengths_mm
    }

    #[inline]
    pub fn largest_mm(&self) -> u32 {
        self.lengths_mm.last().copied().unwrap_or_default()
    }

    /// 以图纸单位返回目录长度。
    pub fn lengths(&self, millimeters_per_unit: f64) -> impl Iterator<Item = f64> + '_ {
        self.lengths_mm
            .iter()
            .map(move |&length| f64::from(length) / millimeters_per_unit)
    }

    /// 返回第一个严格大于 `minimal` 的标准长度（图纸单位）。
    pub fn select(&self, minimal: f64, millimeters_per_unit: f64) -> Option<f64> {
        self.lengths(millimeters_per_unit)
            .find(|&length| length > minimal)
    }
}

impl Default for RebarCatalog {
    fn default() -> Self {
        Self::reference()
    }
}

impl TryFrom<Vec<u32>> for RebarCatalog {
    type Error = CalculationError;

    fn try_from(value: Vec<u32>) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<RebarCatalog> for Vec<u32> {
    fn from(value: RebarCatalog) -> Self {
        value.lengths_mm
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_catalog_matches_standard_lengths() {
        let catalog = RebarCatalog::reference();
        assert_eq!(catalog.lengths_mm().len(), 16);
        assert_eq!(catalog.lengths_mm()[0], 950);
        assert_eq!(catalog.largest_mm(), 11_700);
        assert_eq!(catalog, RebarCatalog::default());
    }

    #[test]
    fn select_picks_smallest_strictly_greater_length() {
        let catalog = RebarCatalog::reference();
        assert_eq!(catalog.select(4.0, 1000.0), Some(4.85));
        assert_eq!(catalog.select(0.0, 1000.0), Some(0.95));
        // 恰好等于标准长度时取下一档
        assert_eq!(catalog.select(0.95, 1000.0), Some(1.05));
        assert_eq!(catalog.select(11.699, 1000.0), Some(11.7));
        assert_eq!(catalog.select(11.7, 1000.0), None);
    }

    #[test]
    fn select_respects_unit_scale() {
        let catalog = RebarCatalog::reference();
        assert_eq!(catalog.select(4000.0, 1.0), Some(4850.0));
    }

    #[test]
    fn new_rejects_invalid_catalogs() {
        assert!(matches!(
            RebarCatalog::new(Vec::new()),
            Err(CalculationError::InvalidParameter(_))
        ));
        assert!(matches!(
            RebarCatalog::new(vec![1000, 1000]),
            Err(CalculationError::InvalidParameter(_))
        ));
        assert!(matches!(
            RebarCatalog::new(vec![2000, 1000]),
            Err(CalculationError::InvalidParameter(_))
        ));
        assert!(matches!(
            RebarCatalog::new(vec![0, 1000]),
            Err(CalculationError::InvalidParameter(_))
        ));
        assert!(RebarCatalog::new(vec![500, 1000, 6000]).is_ok());
    }

    #[test]
    fn deserialization_validates_order() {
        let parsed: RebarCatalog = serde_json::from_str("[1000, 2000]").expect("valid catalog");
        assert_eq!(parsed.lengths_mm(), &[1000, 2000]);
        assert!(serde_json::from_str::<RebarCatalog>("[2000, 1000]").is_err());
    }
}
