use std::fs;
use std::path::Path;

use rebar_core::{
    drawing::{Drawing, QuadFace, QuadKind},
    geometry::Point2,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IoError {
    #[error("failed to read file {path:?}: {source}")]
    ReadError {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("not a DXF file: {0}")]
    NotDxf(String),
    #[error("invalid document structure: {0}")]
    InvalidDocument(String),
}

pub trait DrawingLoader {
    fn load(&self, path: &Path) -> Result<Drawing, IoError>;
}

/// ASCII DXF 读取入口，仅提取模型空间中的四角点实体（3DFACE / SOLID / TRACE）。
#[derive(Debug, Default, Clone, Copy)]
pub struct DxfFacade;

impl DxfFacade {
    pub fn new() -> Self {
        Self
    }

    /// 解析内存中的 DXF 文本。开头的 BOM 会被忽略。
    pub fn load_from_str(&self, source: &str) -> Result<Drawing, IoError> {
        let source = source.strip_prefix('\u{feff}').unwrap_or(source);
        DxfParser::new(source).parse().map_err(|err| match err {
            DxfError::NotDxf { message } => IoError::NotDxf(message),
            DxfError::Invalid { message } => IoError::InvalidDocument(message),
        })
    }
}

impl DrawingLoader for DxfFacade {
    /// 旧版图纸按代码页保存，非 UTF-8 字节只会出现在图层名等文本中，按有损方式解码。
    fn load(&self, path: &Path) -> Result<Drawing, IoError> {
        let bytes = fs::read(path).map_err(|source| IoError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;
        self.load_from_str(&String::from_utf8_lossy(&bytes))
    }
}

#[derive(Debug)]
enum DxfError {
    NotDxf { message: String },
    Invalid { message: String },
}

impl DxfError {
    fn not_dxf(message: impl Into<String>) -> Self {
        Self::NotDxf {
            message: message.into(),
        }
    }

    fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }
}

struct DxfParser<'a> {
    reader: DxfReader<'a>,
}

impl<'a> DxfParser<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            reader: DxfReader::new(source),
        }
    }

    fn parse(mut self) -> Result<Drawing, DxfError> {
        self.expect_dxf_start()?;

        let mut drawing = Drawing::new();
        while let Some((code, value)) = self.reader.next_pair()? {
            if code != 0 {
                return Err(DxfError::invalid(format!(
                    "意外的组码 {code}（期望 0 表示 SECTION/EOF）"
                )));
            }
            match value.as_str() {
                "SECTION" => {
                    let (name_code, name) = self
                        .reader
                        .next_pair()?
                        .ok_or_else(|| DxfError::invalid("SECTION 缺少名称（组码 2）"))?;
                    if name_code != 2 {
                        return Err(DxfError::invalid(format!(
                            "SECTION 名称使用了组码 {name_code}（期望 2）"
                        )));
                    }
                    match name.as_str() {
                        "ENTITIES" => self.parse_entities(&mut drawing)?,
                        _ => self.skip_section()?,
                    }
                }
                "EOF" => break,
                unexpected => {
                    return Err(DxfError::invalid(format!(
                        "意外的标记 {unexpected}，期望 SECTION 或 EOF"
                    )));
                }
            }
        }
        Ok(drawing)
    }

    /// 文件首个组码对必须是 `0/SECTION`，否则视为非 DXF 文件而非损坏的 DXF。
    fn expect_dxf_start(&mut self) -> Result<(), DxfError> {
        let first = match self.reader.next_pair() {
            Ok(Some(pair)) => pair,
            Ok(None) => return Err(DxfError::not_dxf("文件为空")),
            Err(DxfError::Invalid { message }) | Err(DxfError::NotDxf { message }) => {
                return Err(DxfError::not_dxf(message));
            }
        };
        if first.0 != 0 || first.1 != "SECTION" {
            return Err(DxfError::not_dxf(format!(
                "文件开头应为 0/SECTION，实际为 {}/{}",
                first.0, first.1
            )));
        }
        self.reader.put_back(first);
        Ok(())
    }

    fn skip_section(&mut self) -> Result<(), DxfError> {
        loop {
            match self.reader.next_pair()? {
                Some((0, value)) if value == "ENDSEC" => break,
                Some(_) => continue,
                None => {
                    return Err(DxfError::invalid("SECTION 未找到 ENDSEC 终止标记"));
                }
            }
        }
        Ok(())
    }

    fn parse_entities(&mut self, drawing: &mut Drawing) -> Result<(), DxfError> {
        loop {
            let (code, value) = match self.reader.next_pair()? {
                Some(pair) => pair,
                None => return Err(DxfError::invalid("ENTITIES 段提前结束")),
            };
            if code != 0 {
                return Err(DxfError::invalid(format!(
                    "ENTITIES 段遇到组码 {code}（期望 0 表示实体起始）"
                )));
            }

            let kind = match value.as_str() {
                "ENDSEC" => break,
                "SEQEND" => {
                    self.skip_entity_body()?;
                    continue;
                }
                "3DFACE" => QuadKind::Face3D,
                "SOLID" => QuadKind::Solid,
                "TRACE" => QuadKind::Trace,
                other => {
                    self.skip_entity_body()?;
                    drawing.record_skipped(other);
                    continue;
                }
            };

            match self.parse_quad(kind)? {
                ParsedQuad::ModelSpace(face) => {
                    drawing.add_quad(face);
                }
                ParsedQuad::PaperSpace => {
                    drawing.record_skipped(format!("{} (paper space)", kind.dxf_name()));
                }
            }
        }
        Ok(())
    }

    fn parse_quad(&mut self, kind: QuadKind) -> Result<ParsedQuad, DxfError> {
        let name = kind.dxf_name();
        let mut layer = None;
        let mut xs = [None; 4];
        let mut ys = [None; 4];
        let mut paper_space = false;

        loop {
            match self.reader.next_pair()? {
                Some((0, value)) => {
                    self.reader.put_back((0, value));
                    break;
                }
                Some((code, value)) => match code {
                    8 => layer = Some(value.trim().to_string()),
                    10..=13 => {
                        let index = (code - 10) as usize;
                        assign_coord(
                            &mut xs[index],
                            &value,
                            &format!("{name} 角点 {} X（组码 {code}）", index + 1),
                        )?;
                    }
                    20..=23 => {
                        let index = (code - 20) as usize;
                        assign_coord(
                            &mut ys[index],
                            &value,
                            &format!("{name} 角点 {} Y（组码 {code}）", index + 1),
                        )?;
                    }
                    67 => {
                        paper_space = parse_i32(&value, &format!("{name} 空间标记（组码 67）"))? == 1;
                    }
                    // Z 坐标、厚度、隐藏边标记与挤出方向均不参与计算
                    _ => {}
                },
                None => return Err(DxfError::invalid(format!("{name} 未正确结束"))),
            }
        }

        let c1 = build_corner(name, 1, xs[0], ys[0])?
            .ok_or_else(|| DxfError::invalid(format!("{name} 缺少第 1 个角点")))?;
        let c2 = build_corner(name, 2, xs[1], ys[1])?
            .ok_or_else(|| DxfError::invalid(format!("{name} 缺少第 2 个角点")))?;
        let c3 = build_corner(name, 3, xs[2], ys[2])?
            .ok_or_else(|| DxfError::invalid(format!("{name} 缺少第 3 个角点")))?;
        // 三角形实体省略第 4 点，按 DXF 约定与第 3 点重合
        let c4 = build_corner(name, 4, xs[3], ys[3])?.unwrap_or(c3);

        if paper_space {
            return Ok(ParsedQuad::PaperSpace);
        }

        Ok(ParsedQuad::ModelSpace(QuadFace {
            kind,
            layer: layer.unwrap_or_else(|| "0".to_string()),
            corners: [c1, c2, c3, c4],
        }))
    }

    fn skip_entity_body(&mut self) -> Result<(), DxfError> {
        loop {
            match self.reader.next_pair()? {
                Some((0, value)) => {
                    self.reader.put_back((0, value));
                    break;
                }
                Some(_) => continue,
                None => break,
            }
        }
        Ok(())
    }
}

enum ParsedQuad {
    ModelSpace(QuadFace),
    PaperSpace,
}

struct DxfReader<'a> {
    lines: std::str::Lines<'a>,
    buffer: Option<(i32, String)>,
    line_number: usize,
}

impl<'a> DxfReader<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            lines: source.lines(),
            buffer: None,
            line_number: 0,
        }
    }

    /// 读取下一组（组码, 值），跳过 999 注释。
    fn next_pair(&mut self) -> Result<Option<(i32, String)>, DxfError> {
        if let Some(pair) = self.buffer.take() {
            return Ok(Some(pair));
        }

        loop {
            let code_line = match self.lines.next() {
                Some(line) => {
                    self.line_number += 1;
                    line
                }
                None => return Ok(None),
            };

            let value_line = match self.lines.next() {
                Some(line) => {
                    self.line_number += 1;
                    line
                }
                None => {
                    return Err(DxfError::invalid(format!(
                        "文件在第 {} 行结束，缺少与组码对应的值行",
                        self.line_number
                    )));
                }
            };

            let code = code_line.trim().parse::<i32>().map_err(|_| {
                DxfError::invalid(format!(
                    "第 {} 行的组码 \"{}\" 无法解析为整数",
                    self.line_number - 1,
                    code_line.trim()
                ))
            })?;
            if code == 999 {
                continue;
            }
            return Ok(Some((code, value_line.trim().to_string())));
        }
    }

    fn put_back(&mut self, pair: (i32, String)) {
        debug_assert!(self.buffer.is_none(), "DXF pair 只允许回退一次");
        self.buffer = Some(pair);
    }
}

fn assign_coord(slot: &mut Option<f64>, raw: &str, context: &str) -> Result<(), DxfError> {
    if slot.is_some() {
        return Err(DxfError::invalid(format!("{context} 出现重复值")));
    }
    *slot = Some(parse_f64(raw, context)?);
    Ok(())
}

fn build_corner(
    name: &str,
    index: usize,
    x: Option<f64>,
    y: Option<f64>,
) -> Result<Option<Point2>, DxfError> {
    match (x, y) {
        (None, None) => Ok(None),
        (Some(x), Some(y)) => Ok(Some(Point2::new(x, y))),
        _ => Err(DxfError::invalid(format!(
            "{name} 角点 {index} 缺少完整的 XY 坐标"
        ))),
    }
}

fn parse_f64(raw: &str, context: &str) -> Result<f64, DxfError> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| DxfError::invalid(format!("{context} 解析失败（值：\"{raw}\"）")))
}

fn parse_i32(raw: &str, context: &str) -> Result<i32, DxfError> {
    raw.trim()
        .parse::<i32>()
        .map_err(|_| DxfError::invalid(format!("{context} 解析失败（值：\"{raw}\"）")))
}
