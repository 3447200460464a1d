use std::path::Path;

use rebar_core::drawing::Drawing;
use rebar_io::{DrawingLoader, DxfFacade};
use tracing::{info, warn};

use crate::errors::FrontendError;

/// 读取 DXF 图纸，并记录未参与计算的实体类型。
pub fn load_drawing(path: &Path) -> Result<Drawing, FrontendError> {
    let loader = DxfFacade::new();
    let drawing = loader.load(path)?;
    info!(
        path = %path.display(),
        face_count = drawing.len(),
        layer_count = drawing.layers().count(),
        "从 DXF 加载图纸成功"
    );
    for (kind, count) in drawing.skipped() {
        warn!(kind, count, "跳过非四边形实体");
    }
    Ok(drawing)
}
