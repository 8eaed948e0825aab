use crate::error::{LauncherError, Result};
use regex::Regex;
use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// 节标题，如 `[GearGame.GameplayCam_Cover]`
static SECTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(\[[^\]]+\])\s*$").expect("section regex"));

/// 键值行，键为第一个 "=" 之前的文本（去掉首尾空白）
static ENTRY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*([^=;#\[\s][^=]*?)\s*=(.*)$").expect("entry regex"));

/// 引擎配置中会被改写的键
pub const ENGINE_KEYS: [&str; 6] = [
    "ResX",
    "ResY",
    "Language",
    "MinSmoothedFrameRate",
    "MaxSmoothedFrameRate",
    "GraphicsQuality",
];

/// 相机配置中 FOV 的键
pub const FOV_KEY: &str = "FOVAngle";

/// 只有这两个节下的 FOVAngle 会被改写
pub const FOV_SECTIONS: [&str; 2] = [
    "[GearGame.GameplayCam_Cover]",
    "[GearGame.GearGameplayCameraMode]",
];

/// 单行的分类结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind {
    /// 节标题，保存完整的 `[Name]`
    Section(String),
    /// 键值对
    Entry { key: String, value: String },
    /// 注释、空行或无法识别的内容
    Other,
}

/// 配置文件中的一行
/// `raw` 保留原始文本（含换行符），未被改写的行写回时逐字节不变
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub raw: String,
    pub kind: LineKind,
}

impl Line {
    fn parse(raw: &str) -> Self {
        // 匹配时去掉换行符，raw 中仍保留
        let body = raw.trim_end_matches(&['\r', '\n'][..]);
        let kind = if let Some(cap) = SECTION_RE.captures(body) {
            LineKind::Section(cap[1].to_string())
        } else if let Some(cap) = ENTRY_RE.captures(body) {
            LineKind::Entry {
                key: cap[1].to_string(),
                value: cap[2].trim().to_string(),
            }
        } else {
            // 注释、空行、不含 "=" 的行
            LineKind::Other
        };
        Self {
            raw: raw.to_string(),
            kind,
        }
    }

    /// 行尾换行符（"\r\n"、"\n" 或最后一行的空串）
    fn terminator(&self) -> &str {
        let body_len = self.raw.trim_end_matches(&['\r', '\n'][..]).len();
        &self.raw[body_len..]
    }

    /// 用新的值替换整行，保留原来的换行符
    fn replace_entry(&mut self, key: &str, value: &str) {
        self.raw = format!("{}={}{}", key, value, self.terminator());
        self.kind = LineKind::Entry {
            key: key.to_string(),
            value: value.to_string(),
        };
    }
}

/// 一个按行保存的 INI 风格配置文件
/// 只记录原始行和每行的分类，不保留解析后的结构
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigFile {
    lines: Vec<Line>,
}

impl ConfigFile {
    /// 从文本解析
    pub fn parse(content: &str) -> Self {
        Self {
            // 按 "\n" 切分并保留分隔符，最后一行可能没有换行
            lines: content.split_inclusive('\n').map(Line::parse).collect(),
        }
    }

    /// 读取配置文件
    ///
    /// # 返回值
    /// * 文件不存在时返回 `FileMissing`，调用方可以改用默认值
    pub fn load(path: &Path) -> Result<Self> {
        match fs::read_to_string(path) {
            Ok(content) => {
                let file = Self::parse(&content);
                log::debug!("Loaded {} ({} lines)", path.display(), file.lines().len());
                Ok(file)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(LauncherError::FileMissing(path.to_path_buf()))
            }
            Err(source) => Err(LauncherError::ReadFailure {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    /// 拼回完整文本
    pub fn render(&self) -> String {
        self.lines.iter().map(|l| l.raw.as_str()).collect()
    }

    /// 查找第一个匹配键的值（不区分所在节）
    pub fn get(&self, key: &str) -> Option<&str> {
        self.lines.iter().find_map(|line| match &line.kind {
            LineKind::Entry { key: k, value } if k == key => Some(value.as_str()),
            _ => None,
        })
    }

    /// 查找指定节下第一个匹配键的值
    pub fn get_in_section(&self, section: &str, key: &str) -> Option<&str> {
        let mut current: Option<&str> = None;
        for line in &self.lines {
            match &line.kind {
                LineKind::Section(name) => current = Some(name.as_str()),
                LineKind::Entry { key: k, value } if k == key && current == Some(section) => {
                    return Some(value.as_str());
                }
                _ => {}
            }
        }
        None
    }

    /// 对每个键值行调用 `f(当前节, 键)`，返回 Some(新值) 时改写该行
    /// 返回被改写的行数
    fn rewrite_entries<F>(&mut self, mut f: F) -> usize
    where
        F: FnMut(Option<&str>, &str) -> Option<String>,
    {
        let mut section: Option<String> = None;
        let mut changed = 0;
        for line in &mut self.lines {
            match &line.kind {
                // 进入新的节
                LineKind::Section(name) => section = Some(name.clone()),
                LineKind::Entry { key, .. } => {
                    if let Some(value) = f(section.as_deref(), key) {
                        let key = key.clone();
                        line.replace_entry(&key, &value);
                        changed += 1;
                    }
                }
                LineKind::Other => {}
            }
        }
        changed
    }

    /// 原子地写回文件
    /// 先写入同目录下的临时文件并 sync，再重命名覆盖目标，
    /// 因此写到一半崩溃不会留下半截文件，也不会残留旧内容。
    /// 目标文件已存在时，临时文件沿用它的权限
    pub fn persist(&self, path: &Path) -> Result<()> {
        let tmp = temp_path(path);
        let write_failure = |source| LauncherError::WriteFailure {
            path: path.to_path_buf(),
            source,
        };
        // 目标文件不存在时为 None，使用新文件的默认权限
        let original = fs::metadata(path).ok().map(|m| m.permissions());

        let result = (|| {
            let mut file = File::create(&tmp)?;
            file.write_all(self.render().as_bytes())?;
            file.sync_all()?;
            drop(file);
            if let Some(perms) = original {
                fs::set_permissions(&tmp, perms)?;
            }
            fs::rename(&tmp, path)
        })();

        if let Err(e) = result {
            // 清理残留的临时文件，原文件保持不变
            let _ = fs::remove_file(&tmp);
            return Err(write_failure(e));
        }
        log::debug!("Wrote {} lines to {}", self.lines.len(), path.display());
        Ok(())
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// 引擎配置的目标值，来自已经校验过的字段
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineValues {
    pub res_x: u32,
    pub res_y: u32,
    pub language: String,
    pub min_frame_rate: u32,
    pub max_frame_rate: u32,
    pub graphics_quality: String,
}

impl EngineValues {
    fn value_for(&self, key: &str) -> Option<String> {
        match key {
            "ResX" => Some(self.res_x.to_string()),
            "ResY" => Some(self.res_y.to_string()),
            "Language" => Some(self.language.clone()),
            "MinSmoothedFrameRate" => Some(self.min_frame_rate.to_string()),
            "MaxSmoothedFrameRate" => Some(self.max_frame_rate.to_string()),
            "GraphicsQuality" => Some(self.graphics_quality.clone()),
            _ => None,
        }
    }
}

/// 改写引擎配置
/// 按解析出的键精确匹配 ENGINE_KEYS，其他行原样保留、顺序不变
pub fn patch_engine(mut file: ConfigFile, values: &EngineValues) -> ConfigFile {
    // 引擎配置不区分节，任何节中的目标键都会改写
    let changed = file.rewrite_entries(|_, key| values.value_for(key));
    log::debug!("Engine config: {} line(s) rewritten", changed);
    file
}

/// 改写相机配置
/// 只改写 FOV_SECTIONS 两个节下的 FOVAngle，其他节中的同名键保持不变
pub fn patch_camera(mut file: ConfigFile, fov: u32) -> ConfigFile {
    let changed = file.rewrite_entries(|section, key| {
        let in_fov_section = section.is_some_and(|s| FOV_SECTIONS.contains(&s));
        (key == FOV_KEY && in_fov_section).then(|| fov.to_string())
    });
    log::debug!("Camera config: {} FOVAngle line(s) rewritten", changed);
    file
}
