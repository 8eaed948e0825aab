use crate::error::{LauncherError, Result};
use crate::ini_file::{
    patch_camera, patch_engine, ConfigFile, EngineValues, ENGINE_KEYS, FOV_KEY, FOV_SECTIONS,
};
use crate::model::{language_label, FieldSet, Mode};
use crate::permissions::WritableGuard;
use crate::settings::LauncherSettings;
use std::path::{Path, PathBuf};

/// 打开选项界面时的加载结果
/// 缺失的文件不会中断加载，对应字段保持默认值，问题列表交给界面弹窗提示
#[derive(Debug)]
pub struct LoadReport {
    pub fields: FieldSet,
    pub problems: Vec<LauncherError>,
}

/// 单个模式的配置读写器，负责 GearEngine.ini 和 GearCamera.ini 两个文件
#[derive(Debug, Clone)]
pub struct ConfigPatcher {
    mode: Mode,
    engine_path: PathBuf,
    camera_path: PathBuf,
}

impl ConfigPatcher {
    pub fn new(mode: Mode, engine_path: impl Into<PathBuf>, camera_path: impl Into<PathBuf>) -> Self {
        Self {
            mode,
            engine_path: engine_path.into(),
            camera_path: camera_path.into(),
        }
    }

    pub fn for_mode(settings: &LauncherSettings, mode: Mode) -> Self {
        Self::new(mode, settings.engine_path(mode), settings.camera_path(mode))
    }

    /// 读取两个配置文件中的当前值
    pub fn load_fields(&self) -> LoadReport {
        let mut problems = Vec::new();
        let mut load = |path: &Path| match ConfigFile::load(path) {
            Ok(file) => Some(file),
            Err(e) => {
                log::warn!("[{}] {}", self.mode.short(), e);
                problems.push(e);
                None
            }
        };
        let engine = load(&self.engine_path);
        let camera = load(&self.camera_path);

        LoadReport {
            fields: read_fields(engine.as_ref(), camera.as_ref()),
            problems,
        }
    }

    /// 保存一个模式的全部字段
    ///
    /// 先校验字段（分辨率格式非法或数值越界时不写任何文件），
    /// 然后依次改写引擎配置和相机配置，每个文件都在 WritableGuard 内完成写入
    pub fn save(&self, fields: &FieldSet) -> Result<()> {
        let values = engine_values(fields)?;

        self.rewrite(&self.engine_path, |file| {
            warn_missing_engine_keys(self.mode, &file);
            patch_engine(file, &values)
        })?;
        self.rewrite(&self.camera_path, |file| patch_camera(file, fields.field_of_view))?;

        log::info!(
            "[{}] Saved settings to {} and {}",
            self.mode.short(),
            self.engine_path.display(),
            self.camera_path.display()
        );
        Ok(())
    }

    /// 读取 -> 改写 -> 原子写回
    fn rewrite<F>(&self, path: &Path, patch: F) -> Result<()>
    where
        F: FnOnce(ConfigFile) -> ConfigFile,
    {
        let _guard = WritableGuard::acquire(path)?;
        let file = ConfigFile::load(path)?;
        patch(file).persist(path)
    }
}

/// 按顺序保存所有模式，遇到第一个错误即停止
pub fn save_all(settings: &LauncherSettings, fields: &[(Mode, &FieldSet)]) -> Result<()> {
    for (mode, fields) in fields {
        ConfigPatcher::for_mode(settings, *mode).save(fields)?;
    }
    Ok(())
}

/// 把界面字段转换成要写入引擎配置的值
pub fn engine_values(fields: &FieldSet) -> Result<EngineValues> {
    fields.validate()?;
    let resolution = fields.resolution()?;
    Ok(EngineValues {
        res_x: resolution.width,
        res_y: resolution.height,
        language: fields.language_code().to_string(),
        min_frame_rate: fields.min_frame_rate,
        max_frame_rate: fields.max_frame_rate,
        graphics_quality: fields.graphics_quality.to_string(),
    })
}

/// 从已加载的配置中提取字段，缺失或无法解析的值使用默认值
pub fn read_fields(engine: Option<&ConfigFile>, camera: Option<&ConfigFile>) -> FieldSet {
    let mut fields = FieldSet::default();

    if let Some(engine) = engine {
        let number = |key: &str| engine.get(key).and_then(|v| v.parse::<u32>().ok());

        if let (Some(w), Some(h)) = (number("ResX"), number("ResY")) {
            fields.resolution = format!("{}x{}", w, h);
        }
        if let Some(lang) = engine.get("Language") {
            fields.language = language_label(lang);
        }
        if let Some(v) = number("MinSmoothedFrameRate") {
            fields.min_frame_rate = v;
        }
        if let Some(v) = number("MaxSmoothedFrameRate") {
            fields.max_frame_rate = v;
        }
        if let Some(q) = engine.get("GraphicsQuality").and_then(|v| v.parse().ok()) {
            fields.graphics_quality = q;
        }
    }

    if let Some(camera) = camera {
        // 取第一个受管理节中的 FOV，游戏写入的值可能带小数
        let fov = FOV_SECTIONS
            .iter()
            .find_map(|section| camera.get_in_section(section, FOV_KEY))
            .and_then(|v| v.parse::<f32>().ok());
        if let Some(fov) = fov {
            fields.field_of_view = fov.round() as u32;
        }
    }

    fields.clamp();
    fields
}

fn warn_missing_engine_keys(mode: Mode, file: &ConfigFile) {
    let missing: Vec<&str> = ENGINE_KEYS
        .iter()
        .copied()
        .filter(|key| file.get(key).is_none())
        .collect();
    if !missing.is_empty() {
        log::warn!(
            "[{}] Engine config has no {} entries; they will not be written",
            mode.short(),
            missing.join(", ")
        );
    }
}
