use crate::error::{LauncherError, Result};
use crate::model::Mode;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// 指定设置文件路径的环境变量
pub const SETTINGS_ENV: &str = "GEARS_LAUNCHER_CONFIG";
/// 默认设置文件名（相对工作目录）
pub const SETTINGS_FILENAME: &str = "launcher.json";

const INSTALL_ROOT: &str = "C:/Program Files/Microsoft Games/Gears of War 3";

/// 启动器设置
/// 所有路径都从 launcher.json 注入，缺失的字段使用默认安装位置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LauncherSettings {
    /// 单人模式 GearEngine.ini
    pub engine_path_sp: PathBuf,
    /// 多人模式 GearEngine.ini
    pub engine_path_mp: PathBuf,
    /// 单人模式 GearCamera.ini
    pub camera_path_sp: PathBuf,
    /// 多人模式 GearCamera.ini
    pub camera_path_mp: PathBuf,
    pub exe_path_sp: PathBuf,
    pub exe_path_mp: PathBuf,
    /// 背景图和预览图所在目录
    pub assets_dir: PathBuf,
    /// 版本标签列表接口（返回 `[{"name": "v1.0"}, ...]`）
    pub tags_url: String,
    /// 发布页地址前缀，选中的版本拼在后面
    pub releases_url: String,
}

impl Default for LauncherSettings {
    fn default() -> Self {
        let install = |rel: &str| PathBuf::from(format!("{}/{}", INSTALL_ROOT, rel));
        Self {
            engine_path_sp: install("SP/GearGame/Config/GearEngine.ini"),
            engine_path_mp: install("MP/GearGame/Config/GearEngine.ini"),
            camera_path_sp: install("SP/GearGame/Config/GearCamera.ini"),
            camera_path_mp: install("MP/GearGame/Config/GearCamera.ini"),
            exe_path_sp: install("SP/Binaries/Win64/SP.exe"),
            exe_path_mp: install("MP/Binaries/Win64/MP.exe"),
            assets_dir: PathBuf::from("assets"),
            tags_url: "https://api.github.com/repos/chiveta/LauncherGears3/tags".to_string(),
            releases_url: "https://github.com/chiveta/LauncherGears3/releases/tag".to_string(),
        }
    }
}

impl LauncherSettings {
    /// 按环境变量或默认文件名定位设置文件并加载
    pub fn load_default() -> Result<Self> {
        let path = std::env::var_os(SETTINGS_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(SETTINGS_FILENAME));
        Self::load(&path)
    }

    /// 加载设置文件
    /// 文件不存在时返回默认值；JSON 格式错误时返回 Settings 错误
    pub fn load(path: &Path) -> Result<Self> {
        match fs::read_to_string(path) {
            Ok(content) => {
                let settings = serde_json::from_str(&content).map_err(|source| {
                    LauncherError::Settings {
                        path: path.to_path_buf(),
                        source,
                    }
                })?;
                log::info!("Loaded launcher settings from {}", path.display());
                Ok(settings)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::info!(
                    "No settings file at {}, using default install paths",
                    path.display()
                );
                Ok(Self::default())
            }
            Err(source) => Err(LauncherError::ReadFailure {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    pub fn engine_path(&self, mode: Mode) -> &Path {
        match mode {
            Mode::Singleplayer => &self.engine_path_sp,
            Mode::Multiplayer => &self.engine_path_mp,
        }
    }

    pub fn camera_path(&self, mode: Mode) -> &Path {
        match mode {
            Mode::Singleplayer => &self.camera_path_sp,
            Mode::Multiplayer => &self.camera_path_mp,
        }
    }

    pub fn exe_path(&self, mode: Mode) -> &Path {
        match mode {
            Mode::Singleplayer => &self.exe_path_sp,
            Mode::Multiplayer => &self.exe_path_mp,
        }
    }

    /// 资源目录下的文件
    pub fn asset(&self, name: &str) -> PathBuf {
        self.assets_dir.join(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_settings_use_defaults() {
        let json = r#"{
            "engine_path_sp": "D:/Games/Gears3/SP/GearEngine.ini",
            "exe_path_mp": "D:/Games/Gears3/MP.exe"
        }"#;
        let settings: LauncherSettings = serde_json::from_str(json).unwrap();
        assert_eq!(
            settings.engine_path(Mode::Singleplayer),
            Path::new("D:/Games/Gears3/SP/GearEngine.ini")
        );
        assert_eq!(settings.exe_path(Mode::Multiplayer), Path::new("D:/Games/Gears3/MP.exe"));
        assert_eq!(
            settings.camera_path(Mode::Multiplayer),
            LauncherSettings::default().camera_path_mp.as_path()
        );
        assert_eq!(settings.asset("bg.png"), PathBuf::from("assets").join("bg.png"));
    }

    #[test]
    fn test_missing_settings_file_is_default() {
        let settings = LauncherSettings::load(Path::new("no/such/launcher.json")).unwrap();
        assert_eq!(settings, LauncherSettings::default());
    }

    #[test]
    fn test_malformed_settings_file() {
        let dir = std::env::temp_dir().join(format!("gears_settings_{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("launcher.json");
        fs::write(&path, "{ not json").unwrap();

        let err = LauncherSettings::load(&path).unwrap_err();
        assert!(matches!(err, LauncherError::Settings { .. }));
        fs::remove_dir_all(&dir).unwrap();
    }
}
