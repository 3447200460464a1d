use rebar_core::drawing::{Drawing, QuadFace};
use rebar_core::{Axis, DesignParameters, Extent, GeometryExtentCalculator, ZoneCoordinates};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::errors::EngineError;

/// 一次配筋计算的全部结果。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReinforcementPlan {
    pub axis: Axis,
    pub extent: Extent,
    pub minimal_rebar_length: f64,
    pub rebar_length: f64,
    pub minimal_zone_width: f64,
    pub zone_width: f64,
    pub zone: ZoneCoordinates,
}

impl ReinforcementPlan {
    /// 依次计算最小钢筋长度、标准长度、最小区宽、标准区宽与角点。
    pub fn compute(calculator: &GeometryExtentCalculator) -> Result<Self, EngineError> {
        let minimal_rebar_length = calculator.minimal_rebar_length();
        let rebar_length = calculator.rebar_length(minimal_rebar_length)?;
        debug!(minimal_rebar_length, rebar_length, "钢筋长度已确定");

        let minimal_zone_width = calculator.minimal_zone_width();
        let zone_width = calculator.zone_width(minimal_zone_width);
        debug!(minimal_zone_width, zone_width, "配筋区宽度已确定");

        let zone = calculator.reinforcement_zone_coordinates(rebar_length, zone_width);

        Ok(Self {
            axis: calculator.axis(),
            extent: calculator.extent(),
            minimal_rebar_length,
            rebar_length,
            minimal_zone_width,
            zone_width,
            zone,
        })
    }
}

/// 从图纸（可选限定图层）构造计算器并生成配筋结果。
pub fn plan_for_drawing(
    drawing: &Drawing,
    axis: Axis,
    parameters: &DesignParameters,
    layer: Option<&str>,
) -> Result<ReinforcementPlan, EngineError> {
    let faces: Vec<&QuadFace> = match layer {
        Some(name) => {
            let faces: Vec<_> = drawing.faces_on_layer(name).collect();
            if faces.is_empty() {
                return Err(EngineError::EmptyLayer(name.to_string()));
            }
            faces
        }
        None => drawing.faces().map(|(_, face)| face).collect(),
    };
    debug!(face_count = faces.len(), axis = %axis, layer = ?layer, "开始配筋计算");

    let calculator = GeometryExtentCalculator::with_parameters(faces, axis, parameters.clone())?;
    let extent = calculator.extent();
    debug!(
        x_min = extent.x_min,
        x_max = extent.x_max,
        y_min = extent.y_min,
        y_max = extent.y_max,
        "实体范围"
    );

    let plan = ReinforcementPlan::compute(&calculator)?;
    info!(
        axis = %plan.axis,
        rebar_length = plan.rebar_length,
        zone_width = plan.zone_width,
        "配筋计算完成"
    );
    Ok(plan)
}
