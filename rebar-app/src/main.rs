use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use rebar_config::{AppConfig, ConfigError, OutputFormat};
use rebar_core::Axis;
use rebar_frontend::{FrontendError, RunRequest};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

/// 根据 DXF 图纸中的四边形实体计算钢筋长度与配筋区角点。
#[derive(Debug, Parser)]
#[command(name = "rebar-modelling", version)]
struct Cli {
    /// DXF 图纸路径
    #[arg(value_name = "FILENAME", value_parser = existing_file)]
    filename: PathBuf,

    /// 钢筋布置方向
    #[arg(short, long, value_enum, ignore_case = true)]
    axis: AxisArg,

    /// 配置文件路径，缺省时读取 REBAR_CONFIG 或 ./config/default.toml
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// 仅统计指定图层上的实体
    #[arg(long, value_name = "NAME")]
    layer: Option<String>,

    /// 以 JSON 输出结果
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum AxisArg {
    X,
    Y,
}

impl From<AxisArg> for Axis {
    fn from(value: AxisArg) -> Self {
        match value {
            AxisArg::X => Axis::X,
            AxisArg::Y => Axis::Y,
        }
    }
}

fn existing_file(raw: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(raw);
    if path.exists() {
        Ok(path)
    } else {
        Err(format!("文件 {raw} 不存在"))
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let (config, discovery_error) = match load_configuration(cli.config.as_ref()) {
        Ok(loaded) => loaded,
        Err(err) => {
            let err = FrontendError::from(err);
            eprintln!("错误: {err}");
            return exit_code(&err);
        }
    };
    init_logging(&config);
    if let Some(err) = discovery_error {
        warn!(error = %err, "加载默认配置失败，使用内建默认值");
    }
    info!(path = %cli.filename.display(), "启动配筋计算");

    let request = RunRequest {
        path: cli.filename,
        axis: cli.axis.into(),
        layer: cli.layer,
        format: cli.json.then_some(OutputFormat::Json),
    };
    match rebar_frontend::run(&request, &config) {
        Ok(report) => {
            print!("{report}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("错误: {err}");
            exit_code(&err)
        }
    }
}

/// 显式指定的配置加载失败时返回错误；自动发现失败时回退到默认值并交回错误供记录。
fn load_configuration(
    override_path: Option<&PathBuf>,
) -> Result<(AppConfig, Option<ConfigError>), ConfigError> {
    match override_path {
        Some(path) => AppConfig::from_file(path).map(|cfg| (cfg, None)),
        None => match AppConfig::discover() {
            Ok(cfg) => Ok((cfg, None)),
            Err(err) => Ok((AppConfig::default(), Some(err))),
        },
    }
}

fn init_logging(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = fmt().with_env_filter(filter).with_writer(std::io::stderr);
    if subscriber.try_init().is_err() {
        // 已初始化，忽略
    }
}

fn exit_code(err: &FrontendError) -> ExitCode {
    ExitCode::from(u8::try_from(err.exit_code()).unwrap_or(1))
}
