use std::fmt::Write as _;
use std::path::PathBuf;

use rebar_config::{AppConfig, OutputFormat};
use rebar_core::Axis;
use rebar_engine::plan::{ReinforcementPlan, plan_for_drawing};
use tracing::info;

use crate::errors::FrontendError;
use crate::loader::load_drawing;

/// 一次命令行调用的输入。
#[derive(Debug, Clone)]
pub struct RunRequest {
    pub path: PathBuf,
    pub axis: Axis,
    pub layer: Option<String>,
    /// 覆盖配置文件中的输出格式。
    pub format: Option<OutputFormat>,
}

/// 加载图纸、计算配筋并返回渲染后的报告文本。
pub fn run(request: &RunRequest, config: &AppConfig) -> Result<String, FrontendError> {
    let parameters = config.design.to_parameters()?;
    let drawing = load_drawing(&request.path)?;
    let plan = plan_for_drawing(
        &drawing,
        request.axis,
        &parameters,
        request.layer.as_deref(),
    )?;

    let format = request.format.unwrap_or(config.output.format);
    info!(format = ?format, "输出配筋报告");
    match format {
        OutputFormat::Text => Ok(render_text(&plan, config.output.precision)),
        OutputFormat::Json => render_json(&plan),
    }
}

pub fn render_text(plan: &ReinforcementPlan, precision: usize) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "钢筋方向: {}", plan.axis);
    let _ = writeln!(
        out,
        "最小钢筋长度: {:.precision$}",
        plan.minimal_rebar_length
    );
    let _ = writeln!(out, "标准钢筋长度: {:.precision$}", plan.rebar_length);
    let _ = writeln!(
        out,
        "最小配筋区宽度: {:.precision$}",
        plan.minimal_zone_width
    );
    let _ = writeln!(out, "标准配筋区宽度: {:.precision$}", plan.zone_width);
    let _ = writeln!(out, "配筋区角点:");
    for (corner, point) in plan.zone.iter() {
        let _ = writeln!(
            out,
            "  {corner}: ({:.precision$}, {:.precision$})",
            point.x(),
            point.y()
        );
    }
    out
}

pub fn render_json(plan: &ReinforcementPlan) -> Result<String, FrontendError> {
    let mut json = serde_json::to_string_pretty(plan)?;
    json.push('\n');
    Ok(json)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use rebar_io::IoError;

    use super::*;

    const BOX_DXF: &str = "0\nSECTION\n2\nENTITIES\n0\n3DFACE\n8\nSLAB\n10\n0.0\n20\n0.0\n11\n2.0\n21\n0.0\n12\n2.0\n22\n3.0\n13\n0.0\n23\n3.0\n0\nENDSEC\n0\nEOF\n";

    fn write_temp(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("create temp file");
        file.write_all(content.as_bytes()).expect("write temp file");
        file
    }

    fn request(path: PathBuf, format: Option<OutputFormat>) -> RunRequest {
        RunRequest {
            path,
            axis: Axis::X,
            layer: None,
            format,
        }
    }

    #[test]
    fn text_report_lists_sizes_and_corners() {
        let file = write_temp(BOX_DXF);
        let report = run(
            &request(file.path().to_path_buf(), None),
            &AppConfig::default(),
        )
        .expect("run should succeed");

        assert!(report.contains("钢筋方向: x"));
        assert!(report.contains("最小钢筋长度: 4.000"));
        assert!(report.contains("标准钢筋长度: 4.850"));
        assert!(report.contains("最小配筋区宽度: 3.100"));
        assert!(report.contains("标准配筋区宽度: 3.200"));
        assert!(report.contains("bottom_left: (-1.425, -0.100)"));
        assert!(report.contains("top_right: (3.425, 3.100)"));

        let corner_order: Vec<_> = report
            .lines()
            .filter_map(|line| line.trim().split(':').next())
            .filter(|label| label.contains('_'))
            .collect();
        assert_eq!(
            corner_order,
            ["bottom_left", "bottom_right", "top_right", "top_left"]
        );
    }

    #[test]
    fn json_report_is_parseable() {
        let file = write_temp(BOX_DXF);
        let report = run(
            &request(file.path().to_path_buf(), Some(OutputFormat::Json)),
            &AppConfig::default(),
        )
        .expect("run should succeed");

        let value: serde_json::Value = serde_json::from_str(&report).expect("valid json");
        assert_eq!(value["rebar_length"], 4.85);
        assert_eq!(value["minimal_rebar_length"], 4.0);
        assert_eq!(value["extent"]["y_max"], 3.0);
    }

    #[test]
    fn errors_map_to_exit_codes() {
        let missing = run(
            &request(PathBuf::from("/definitely/not/here.dxf"), None),
            &AppConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(
            missing,
            FrontendError::DrawingOpen(IoError::ReadError { .. })
        ));
        assert_eq!(missing.exit_code(), 1);

        let not_dxf = write_temp("just some notes\n");
        let err = run(
            &request(not_dxf.path().to_path_buf(), None),
            &AppConfig::default(),
        )
        .unwrap_err();
        assert_eq!(err.exit_code(), 1);

        let corrupt = write_temp("0\nSECTION\n2\nENTITIES\n0\n3DFACE\n10\n1.0\n");
        let err = run(
            &request(corrupt.path().to_path_buf(), None),
            &AppConfig::default(),
        )
        .unwrap_err();
        assert_eq!(err.exit_code(), 2);

        let empty = write_temp("0\nSECTION\n2\nENTITIES\n0\nENDSEC\n0\nEOF\n");
        let err = run(
            &request(empty.path().to_path_buf(), None),
            &AppConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, FrontendError::Engine(_)));
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn invalid_design_config_is_rejected_before_loading() {
        let mut config = AppConfig::default();
        config.design.pitch_mm = -1.0;
        let err = run(
            &request(PathBuf::from("/definitely/not/here.dxf"), None),
            &config,
        )
        .unwrap_err();
        assert!(matches!(err, FrontendError::Config(_)));
        assert_eq!(err.exit_code(), 4);
    }
}
