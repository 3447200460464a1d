use serde::{Deserialize, Serialize};

use crate::catalog::RebarCatalog;
use crate::errors::CalculationError;

pub const MILLIMETERS_PER_UNIT: f64 = 1000.0;
/// 两端锚固长度（毫米）。
pub const ANCHORAGE_MM: f64 = 1000.0;
/// 配筋区相对构件边缘的外扩量（毫米）。
pub const INDENT_MM: f64 = 50.0;
/// 配筋区宽度的取整步距（毫米）。
pub const PITCH_MM: f64 = 200.0;

/// 配筋计算使用的常量，除 `millimeters_per_unit` 外均以图纸单位存储。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesignParameters {
    pub anchorage: f64,
    pub indent: f64,
    pub pitch: f64,
    pub millimeters_per_unit: f64,
    pub catalog: RebarCatalog,
}

impl DesignParameters {
    /// 由毫米值换算为图纸单位，并执行校验。
    pub fn from_millimeters(
        anchorage_mm: f64,
        indent_mm: f64,
        pitch_mm: f64,
        millimeters_per_unit: f64,
        catalog: RebarCatalog,
    ) -> Result<Self, CalculationError> {
        if !(millimeters_per_unit.is_finite() && millimeters_per_unit > 0.0) {
            return Err(CalculationError::InvalidParameter(format!(
                "millimeters per unit must be positive (got {millimeters_per_unit})"
            )));
        }
        let parameters = Self {
            anchorage: anchorage_mm / millimeters_per_unit,
            indent: indent_mm / millimeters_per_unit,
            pitch: pitch_mm / millimeters_per_unit,
            millimeters_per_unit,
            catalog,
        };
        parameters.validate()?;
        Ok(parameters)
    }

    pub fn validate(&self) -> Result<(), CalculationError> {
        if !(self.millimeters_per_unit.is_finite() && self.millimeters_per_unit > 0.0) {
            return Err(CalculationError::InvalidParameter(format!(
                "millimeters per unit must be positive (got {})",
                self.millimeters_per_unit
            )));
        }
        if !(self.anchorage.is_finite() && self.anchorage >= 0.0) {
            return Err(CalculationError::InvalidParameter(format!(
                "anchorage must be a non-negative number (got {})",
                self.anchorage
            )));
        }
        if !(self.indent.is_finite() && self.indent >= 0.0) {
            return Err(CalculationError::InvalidParameter(format!(
                "indent must be a non-negative number (got {})",
                self.indent
            )));
        }
        if !(self.pitch.is_finite() && self.pitch > 0.0) {
            return Err(CalculationError::InvalidParameter(format!(
                "pitch must be positive (got {})",
                self.pitch
            )));
        }
        Ok(())
    }
}

impl Default for DesignParameters {
    fn default() -> Self {
        Self {
            anchorage: ANCHORAGE_MM / MILLIMETERS_PER_UNIT,
            indent: INDENT_MM / MILLIMETERS_PER_UNIT,
            pitch: PITCH_MM / MILLIMETERS_PER_UNIT,
            millimeters_per_unit: MILLIMETERS_PER_UNIT,
            catalog: RebarCatalog::reference(),
        }
    }
}
