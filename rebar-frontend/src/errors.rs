use rebar_config::ConfigError;
use rebar_engine::errors::EngineError;
use rebar_io::IoError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FrontendError {
    #[error("无法打开图纸: {0}")]
    DrawingOpen(#[from] IoError),
    #[error("配筋计算失败: {0}")]
    Engine(#[from] EngineError),
    #[error("配置无效: {0}")]
    Config(#[from] ConfigError),
    #[error("无法生成 JSON 报告: {0}")]
    Render(#[from] serde_json::Error),
}

impl FrontendError {
    /// 进程退出码：读取失败 1，DXF 结构损坏 2，计算失败 3，配置错误 4。
    pub fn exit_code(&self) -> i32 {
        match self {
            FrontendError::DrawingOpen(IoError::InvalidDocument(_)) => 2,
            FrontendError::DrawingOpen(_) => 1,
            FrontendError::Engine(_) => 3,
            FrontendError::Config(_) => 4,
            FrontendError::Render(_) => 1,
        }
    }
}
