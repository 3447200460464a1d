use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::drawing::QuadFace;
use crate::errors::CalculationError;
use crate::geometry::{Bounds2D, Point2};
use crate::parameters::DesignParameters;

/// 钢筋布置方向。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
}

impl Axis {
    /// 与钢筋方向垂直的轴，即配筋区宽度所在的轴。
    #[inline]
    pub fn perpendicular(self) -> Self {
        match self {
            Axis::X => Axis::Y,
            Axis::Y => Axis::X,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Axis::X => "x",
            Axis::Y => "y",
        }
    }
}

impl FromStr for Axis {
    type Err = CalculationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("x") {
            Ok(Axis::X)
        } else if s.eq_ignore_ascii_case("y") {
            Ok(Axis::Y)
        } else {
            Err(CalculationError::InvalidAxis(s.to_string()))
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Extrema {
    Min,
    Max,
}

impl FromStr for Extrema {
    type Err = CalculationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("min") {
            Ok(Extrema::Min)
        } else if s.eq_ignore_ascii_case("max") {
            Ok(Extrema::Max)
        } else {
            Err(CalculationError::InvalidExtrema(s.to_string()))
        }
    }
}

impl fmt::Display for Extrema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Extrema::Min => f.write_str("min"),
            Extrema::Max => f.write_str("max"),
        }
    }
}

/// 全部实体角点的轴对齐范围。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl Extent {
    fn from_bounds(bounds: &Bounds2D) -> Self {
        Self {
            x_min: bounds.min().x(),
            x_max: bounds.max().x(),
            y_min: bounds.min().y(),
            y_max: bounds.max().y(),
        }
    }

    /// 返回指定轴上的 `(min, max)`。
    #[inline]
    pub fn range(&self, axis: Axis) -> (f64, f64) {
        match axis {
            Axis::X => (self.x_min, self.x_max),
            Axis::Y => (self.y_min, self.y_max),
        }
    }

    #[inline]
    pub fn center(&self, axis: Axis) -> f64 {
        let (lo, hi) = self.range(axis);
        (hi + lo) / 2.0
    }
}

/// 配筋区角点标签。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoneCorner {
    BottomLeft,
    BottomRight,
    TopRight,
    TopLeft,
}

impl ZoneCorner {
    pub const ALL: [ZoneCorner; 4] = [
        ZoneCorner::BottomLeft,
        ZoneCorner::BottomRight,
        ZoneCorner::TopRight,
        ZoneCorner::TopLeft,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ZoneCorner::BottomLeft => "bottom_left",
            ZoneCorner::BottomRight => "bottom_right",
            ZoneCorner::TopRight => "top_right",
            ZoneCorner::TopLeft => "top_left",
        }
    }
}

impl fmt::Display for ZoneCorner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// 配筋区四角坐标。每次查询重新计算，不在计算器中缓存。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoneCoordinates {
    pub bottom_left: Point2,
    pub bottom_right: Point2,
    pub top_right: Point2,
    pub top_left: Point2,
}

impl ZoneCoordinates {
    fn from_ranges((x_lo, x_hi): (f64, f64), (y_lo, y_hi): (f64, f64)) -> Self {
        Self {
            bottom_left: Point2::new(x_lo, y_lo),
            bottom_right: Point2::new(x_hi, y_lo),
            top_right: Point2::new(x_hi, y_hi),
            top_left: Point2::new(x_lo, y_hi),
        }
    }

    pub fn get(&self, corner: ZoneCorner) -> Point2 {
        match corner {
            ZoneCorner::BottomLeft => self.bottom_left,
            ZoneCorner::BottomRight => self.bottom_right,
            ZoneCorner::TopRight => self.top_right,
            ZoneCorner::TopLeft => self.top_left,
        }
    }

    /// 按左下、右下、右上、左上的顺序遍历。
    pub fn iter(&self) -> impl Iterator<Item = (ZoneCorner, Point2)> + '_ {
        ZoneCorner::ALL
            .into_iter()
            .map(move |corner| (corner, self.get(corner)))
    }
}

/// 由四个有序角点构成的实体。
pub trait Quadrilateral {
    fn corners(&self) -> [Point2; 4];
}

impl Quadrilateral for [Point2; 4] {
    fn corners(&self) -> [Point2; 4] {
        *self
    }
}

impl Quadrilateral for [(f64, f64); 4] {
    fn corners(&self) -> [Point2; 4] {
        (*self).map(Point2::from)
    }
}

impl Quadrilateral for QuadFace {
    fn corners(&self) -> [Point2; 4] {
        self.corners
    }
}

impl<T: Quadrilateral + ?Sized> Quadrilateral for &T {
    fn corners(&self) -> [Point2; 4] {
        (**self).corners()
    }
}

/// 根据实体范围计算钢筋长度、配筋区宽度与配筋区角点。
///
/// 构造时一次性扫描全部角点得到范围，之后所有查询均为只读的纯函数，
/// 可在多个线程间共享。
#[derive(Debug, Clone, PartialEq)]
pub struct GeometryExtentCalculator {
    axis: Axis,
    extent: Extent,
    parameters: DesignParameters,
}

impl GeometryExtentCalculator {
    pub fn new<I>(entities: I, axis: Axis) -> Result<Self, CalculationError>
    where
        I: IntoIterator,
        I::Item: Quadrilateral,
    {
        Self::with_parameters(entities, axis, DesignParameters::default())
    }

    /// 以字符串形式的轴（"x" / "y"）构造。
    pub fn from_axis_label<I>(entities: I, axis: &str) -> Result<Self, CalculationError>
    where
        I: IntoIterator,
        I::Item: Quadrilateral,
    {
        let axis = axis.parse::<Axis>()?;
        Self::new(entities, axis)
    }

    pub fn with_parameters<I>(
        entities: I,
        axis: Axis,
        parameters: DesignParameters,
    ) -> Result<Self, CalculationError>
    where
        I: IntoIterator,
        I::Item: Quadrilateral,
    {
        parameters.validate()?;
        let extent = scan_extent(entities)?;
        Ok(Self {
            axis,
            extent,
            parameters,
        })
    }

    #[inline]
    pub fn axis(&self) -> Axis {
        self.axis
    }

    #[inline]
    pub fn extent(&self) -> Extent {
        self.extent
    }

    #[inline]
    pub fn parameters(&self) -> &DesignParameters {
        &self.parameters
    }

    pub fn border(&self, axis: Axis, extrema: Extrema) -> f64 {
        let (lo, hi) = self.extent.range(axis);
        match extrema {
            Extrema::Min => lo,
            Extrema::Max => hi,
        }
    }

    /// 直接查询某一轴的边界值，与构造时选定的钢筋方向无关。
    pub fn find_border_coordinate(
        &self,
        axis: &str,
        extrema: &str,
    ) -> Result<f64, CalculationError> {
        let axis = axis.parse::<Axis>()?;
        let extrema = extrema.parse::<Extrema>()?;
        Ok(self.border(axis, extrema))
    }

    /// 钢筋方向跨度加两端锚固长度。
    pub fn minimal_rebar_length(&self) -> f64 {
        let (lo, hi) = self.extent.range(self.axis);
        let anchorage = self.parameters.anchorage;
        (hi + anchorage) - (lo - anchorage)
    }

    /// 目录中第一个严格大于 `minimal_length` 的标准长度。
    pub fn rebar_length(&self, minimal_length: f64) -> Result<f64, CalculationError> {
        let scale = self.parameters.millimeters_per_unit;
        self.parameters
            .catalog
            .select(minimal_length, scale)
            .ok_or_else(|| CalculationError::CatalogExhausted {
                minimal: minimal_length,
                largest: f64::from(self.parameters.catalog.largest_mm()) / scale,
            })
    }

    /// 垂直方向跨度加两侧外扩量。
    pub fn minimal_zone_width(&self) -> f64 {
        let (lo, hi) = self.extent.range(self.axis.perpendicular());
        let indent = self.parameters.indent;
        (hi + indent) - (lo - indent)
    }

    /// 按步距向上取整。已是步距整数倍时同样再加一个步距（0.2 → 0.4）。
    pub fn zone_width(&self, minimal_width: f64) -> f64 {
        let pitch = self.parameters.pitch;
        minimal_width + pitch - minimal_width.rem_euclid(pitch)
    }

    /// 以范围中心为基准，沿钢筋方向展开 `rebar_length`，垂直方向展开 `zone_width`。
    pub fn reinforcement_zone_coordinates(
        &self,
        rebar_length: f64,
        zone_width: f64,
    ) -> ZoneCoordinates {
        let along = centered_range(self.extent.center(self.axis), rebar_length);
        let across = centered_range(self.extent.center(self.axis.perpendicular()), zone_width);
        match self.axis {
            Axis::X => ZoneCoordinates::from_ranges(along, across),
            Axis::Y => ZoneCoordinates::from_ranges(across, along),
        }
    }
}

fn centered_range(center: f64, size: f64) -> (f64, f64) {
    let half = size / 2.0;
    (center - half, center + half)
}

fn scan_extent<I>(entities: I) -> Result<Extent, CalculationError>
where
    I: IntoIterator,
    I::Item: Quadrilateral,
{
    let mut bounds = Bounds2D::empty();
    let mut seen = false;
    for entity in entities {
        for corner in entity.corners() {
            bounds.include_point(corner);
        }
        seen = true;
    }
    if !seen {
        return Err(CalculationError::EmptyGeometry);
    }
    Ok(Extent::from_bounds(&bounds))
}
