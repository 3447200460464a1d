pub mod calculator;
pub mod catalog;
pub mod parameters;

pub use calculator::{
    Axis, Extent, Extrema, GeometryExtentCalculator, Quadrilateral, ZoneCoordinates, ZoneCorner,
};
pub use catalog::RebarCatalog;
pub use errors::CalculationError;
pub use parameters::DesignParameters;

pub mod errors {
    use thiserror::Error;

    #[derive(Debug, Clone, PartialEq, Error)]
    pub enum CalculationError {
        #[error("invalid axis {0:?}, expected \"x\" or \"y\"")]
        InvalidAxis(String),
        #[error("invalid extrema {0:?}, expected \"min\" or \"max\"")]
        InvalidExtrema(String),
        #[error("no quadrilateral entities to measure")]
        EmptyGeometry,
        #[error("minimal rebar length {minimal} exceeds the largest catalog rebar {largest}")]
        CatalogExhausted { minimal: f64, largest: f64 },
        #[error("invalid design parameter: {0}")]
        InvalidParameter(String),
    }
}

pub mod geometry {
    use glam::DVec2;
    use serde::{Deserialize, Serialize};

    /// 二维点，内部以 `glam::DVec2` 表示，单位与图纸一致。
    #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
    pub struct Point2(pub DVec2);

    impl Point2 {
        #[inline]
        pub fn new(x: f64, y: f64) -> Self {
            Self(DVec2::new(x, y))
        }

        #[inline]
        pub fn from_vec(vec: DVec2) -> Self {
            Self(vec)
        }

        #[inline]
        pub fn x(self) -> f64 {
            self.0.x
        }

        #[inline]
        pub fn y(self) -> f64 {
            self.0.y
        }

        #[inline]
        pub fn as_vec2(self) -> DVec2 {
            self.0
        }
    }

    impl From<(f64, f64)> for Point2 {
        fn from((x, y): (f64, f64)) -> Self {
            Self::new(x, y)
        }
    }

    /// 轴对齐边界框。首个点同时初始化最小与最大值，之后逐点扩展。
    #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
    pub struct Bounds2D {
        min: Point2,
        max: Point2,
    }

    impl Bounds2D {
        #[inline]
        pub fn empty() -> Self {
            Self {
                min: Point2::new(f64::INFINITY, f64::INFINITY),
                max: Point2::new(f64::NEG_INFINITY, f64::NEG_INFINITY),
            }
        }

        #[inline]
        pub fn is_empty(&self) -> bool {
            self.min.x() > self.max.x() || self.min.y() > self.max.y()
        }

        #[inline]
        pub fn min(&self) -> Point2 {
            self.min
        }

        #[inline]
        pub fn max(&self) -> Point2 {
            self.max
        }

        pub fn include_point(&mut self, point: Point2) {
            if self.is_empty() {
                self.min = point;
                self.max = point;
                return;
            }
            let min_vec = self.min.as_vec2().min(point.as_vec2());
            let max_vec = self.max.as_vec2().max(point.as_vec2());
            self.min = Point2::from_vec(min_vec);
            self.max = Point2::from_vec(max_vec);
        }
    }

}

pub mod drawing {
    use std::collections::{BTreeMap, HashMap};

    use serde::{Deserialize, Serialize};

    use crate::geometry::Point2;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct EntityId(u64);

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct Layer {
        pub name: String,
    }

    impl Layer {
        #[inline]
        pub fn new(name: impl Into<String>) -> Self {
            Self { name: name.into() }
        }
    }

    /// 四角点实体在 DXF 中的来源类型。
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub enum QuadKind {
        Face3D,
        Solid,
        Trace,
    }

    impl QuadKind {
        pub fn dxf_name(self) -> &'static str {
            match self {
                QuadKind::Face3D => "3DFACE",
                QuadKind::Solid => "SOLID",
                QuadKind::Trace => "TRACE",
            }
        }
    }

    /// 四边形实体。角点顺序保持文件中的原样（SOLID/TRACE 为 Z 字形顺序）。
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct QuadFace {
        pub kind: QuadKind,
        pub layer: String,
        pub corners: [Point2; 4],
    }

    /// 从图纸中读取的四边形集合，外加被跳过实体的统计。
    #[derive(Debug, Default, Clone, Serialize, Deserialize)]
    pub struct Drawing {
        layers: HashMap<String, Layer>,
        faces: Vec<(EntityId, QuadFace)>,
        next_entity_id: u64,
        #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
        skipped: BTreeMap<String, usize>,
    }

    impl Drawing {
        pub fn new() -> Self {
            let mut drawing = Self::default();
            drawing.ensure_layer("0");
            drawing
        }

        pub fn ensure_layer(&mut self, name: impl AsRef<str>) {
            let key = name.as_ref();
            self.layers
                .entry(key.to_string())
                .or_insert_with(|| Layer::new(key));
        }

        pub fn add_face(
            &mut self,
            kind: QuadKind,
            corners: [Point2; 4],
            layer: impl Into<String>,
        ) -> EntityId {
            let layer = layer.into();
            self.ensure_layer(&layer);
            let id = self.next_id();
            self.faces.push((
                id,
                QuadFace {
                    kind,
                    layer,
                    corners,
                },
            ));
            id
        }

        pub fn add_quad(&mut self, face: QuadFace) -> EntityId {
            self.add_face(face.kind, face.corners, face.layer)
        }

        /// 记录一个未参与计算的实体（按类型名计数）。
        pub fn record_skipped(&mut self, kind: impl Into<String>) {
            *self.skipped.entry(kind.into()).or_insert(0) += 1;
        }

        #[inline]
        pub fn skipped(&self) -> impl Iterator<Item = (&str, usize)> {
            self.skipped.iter().map(|(kind, count)| (kind.as_str(), *count))
        }

        #[inline]
        pub fn skipped_total(&self) -> usize {
            self.skipped.values().sum()
        }

        #[inline]
        pub fn layers(&self) -> impl Iterator<Item = &Layer> {
            self.layers.values()
        }

        #[inline]
        pub fn faces(&self) -> impl Iterator<Item = &(EntityId, QuadFace)> {
            self.faces.iter()
        }

        /// 仅返回位于指定图层上的四边形。图层名与 DXF 一致，不区分大小写。
        pub fn faces_on_layer<'a>(
            &'a self,
            layer: &'a str,
        ) -> impl Iterator<Item = &'a QuadFace> + 'a {
            self.faces
                .iter()
                .map(|(_, face)| face)
                .filter(move |face| face.layer.eq_ignore_ascii_case(layer))
        }

        #[inline]
        pub fn len(&self) -> usize {
            self.faces.len()
        }

        #[inline]
        pub fn is_empty(&self) -> bool {
            self.faces.is_empty()
        }

        #[inline]
        fn next_id(&mut self) -> EntityId {
            let id = self.next_entity_id;
            self.next_entity_id += 1;
            EntityId(id)
        }
    }

}
