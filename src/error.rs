use std::path::PathBuf;
use thiserror::Error;

/// 启动器的错误类型
/// 每个用户操作（打开选项、保存、启动、检查更新）在边界处捕获这些错误并弹窗提示
#[derive(Debug, Error)]
pub enum LauncherError {
    /// 配置文件或图片不存在
    #[error("file not found: {}", .0.display())]
    FileMissing(PathBuf),

    /// 读取文件失败（文件存在但无法读取）
    #[error("failed to read {}: {source}", path.display())]
    ReadFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// 写入配置失败
    #[error("failed to write {}: {source}", path.display())]
    WriteFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// 分辨率格式不是 "<宽>x<高>"
    #[error("invalid resolution '{0}', expected WIDTHxHEIGHT (e.g. 1920x1080)")]
    InvalidResolution(String),

    /// 数值字段超出允许范围
    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        value: u32,
        min: u32,
        max: u32,
    },

    /// 游戏可执行文件不存在
    #[error("{mode} executable not found: {}", path.display())]
    ExecutableMissing { mode: String, path: PathBuf },

    /// 进程启动失败
    #[error("failed to launch {}: {source}", path.display())]
    LaunchFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// 获取版本列表失败（非 200 响应）
    #[error("version request failed with status {0}")]
    HttpStatus(u16),

    /// 网络传输错误
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// 启动器设置文件无法解析
    #[error("invalid launcher settings in {}: {source}", path.display())]
    Settings {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// 图片解码失败
    #[error("failed to decode image {}: {source}", path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

pub type Result<T> = std::result::Result<T, LauncherError>;
