use crate::error::LauncherError;
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

/// FOV 取值范围
pub const FOV_RANGE: RangeInclusive<u32> = 70..=120;
/// 最低帧率取值范围
pub const MIN_FRAME_RATE_RANGE: RangeInclusive<u32> = 5..=120;
/// 最高帧率取值范围
pub const MAX_FRAME_RATE_RANGE: RangeInclusive<u32> = 30..=240;

/// 语言选项：(语言代码, 显示名称)
/// 下拉框显示为 "INT - English"，写入配置时只保留代码部分
pub const LANGUAGES: [(&str, &str); 13] = [
    ("INT", "English"),
    ("ESM", "Spanish (Mexico)"),
    ("ESN", "Spanish (Spain)"),
    ("FRA", "French"),
    ("ITA", "Italian"),
    ("JAP", "Japanese"),
    ("DEU", "German"),
    ("CHN", "Chinese"),
    ("CZE", "Czech"),
    ("HUN", "Hungarian"),
    ("POL", "Polish"),
    ("PTB", "Portuguese (Brazil)"),
    ("RUS", "Russian"),
];

/// 游戏模式，每个模式有独立的一对配置文件和可执行文件
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    Singleplayer,
    Multiplayer,
}

impl Mode {
    pub const ALL: [Mode; 2] = [Mode::Singleplayer, Mode::Multiplayer];

    /// 短标签，用于日志和界面 ID
    pub fn short(self) -> &'static str {
        match self {
            Mode::Singleplayer => "SP",
            Mode::Multiplayer => "MP",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Singleplayer => write!(f, "Singleplayer"),
            Mode::Multiplayer => write!(f, "Multiplayer"),
        }
    }
}

/// 画质等级
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GraphicsQuality {
    #[default]
    Low,
    Medium,
    High,
    Epic,
}

impl GraphicsQuality {
    pub const ALL: [GraphicsQuality; 4] = [
        GraphicsQuality::Low,
        GraphicsQuality::Medium,
        GraphicsQuality::High,
        GraphicsQuality::Epic,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            GraphicsQuality::Low => "Low",
            GraphicsQuality::Medium => "Medium",
            GraphicsQuality::High => "High",
            GraphicsQuality::Epic => "Epic",
        }
    }
}

impl fmt::Display for GraphicsQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GraphicsQuality {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        GraphicsQuality::ALL
            .into_iter()
            .find(|q| q.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or(())
    }
}

/// 解析后的分辨率
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl FromStr for Resolution {
    type Err = LauncherError;

    /// 解析 "1920x1080" 格式的分辨率
    /// 缺少 "x" 或数值非法时返回 InvalidResolution，而不是写出残缺的配置
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || LauncherError::InvalidResolution(s.to_string());
        let (w, h) = s.trim().split_once(|c: char| c == 'x' || c == 'X').ok_or_else(invalid)?;
        let width = w.trim().parse::<u32>().map_err(|_| invalid())?;
        let height = h.trim().parse::<u32>().map_err(|_| invalid())?;
        if width == 0 || height == 0 {
            return Err(invalid());
        }
        Ok(Self { width, height })
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// 从 "INT - English" 中取出语言代码 "INT"
pub fn language_code(label: &str) -> &str {
    label.split(" - ").next().unwrap_or(label).trim()
}

/// 根据语言代码得到下拉框显示文本，未知代码原样返回
pub fn language_label(code: &str) -> String {
    LANGUAGES
        .iter()
        .find(|(c, _)| c.eq_ignore_ascii_case(code.trim()))
        .map(|(c, name)| format!("{} - {}", c, name))
        .unwrap_or_else(|| code.trim().to_string())
}

/// 单个模式下可编辑的全部字段
/// 与界面控件一一对应，保存时再写回两个配置文件
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSet {
    /// 下拉框文本，如 "INT - English"
    pub language: String,
    /// 分辨率输入框的原始文本，保存时才解析
    pub resolution: String,
    pub field_of_view: u32,
    pub min_frame_rate: u32,
    pub max_frame_rate: u32,
    pub graphics_quality: GraphicsQuality,
}

impl Default for FieldSet {
    fn default() -> Self {
        Self {
            language: language_label("INT"),
            resolution: "1920x1080".to_string(),
            field_of_view: 90,
            min_frame_rate: 30,
            max_frame_rate: 120,
            graphics_quality: GraphicsQuality::Low,
        }
    }
}

impl FieldSet {
    /// 把数值字段限制到合法范围内
    pub fn clamp(&mut self) {
        self.field_of_view = clamp_to(self.field_of_view, &FOV_RANGE);
        self.min_frame_rate = clamp_to(self.min_frame_rate, &MIN_FRAME_RATE_RANGE);
        self.max_frame_rate = clamp_to(self.max_frame_rate, &MAX_FRAME_RATE_RANGE);
    }

    /// 校验数值字段是否在合法范围内，返回第一个越界的字段
    pub fn validate(&self) -> Result<(), LauncherError> {
        check_range("FieldOfView", self.field_of_view, &FOV_RANGE)?;
        check_range("MinFrameRate", self.min_frame_rate, &MIN_FRAME_RATE_RANGE)?;
        check_range("MaxFrameRate", self.max_frame_rate, &MAX_FRAME_RATE_RANGE)
    }

    pub fn resolution(&self) -> Result<Resolution, LauncherError> {
        self.resolution.parse()
    }

    pub fn language_code(&self) -> &str {
        language_code(&self.language)
    }
}

fn clamp_to(value: u32, range: &RangeInclusive<u32>) -> u32 {
    value.clamp(*range.start(), *range.end())
}

fn check_range(field: &'static str, value: u32, range: &RangeInclusive<u32>) -> Result<(), LauncherError> {
    if range.contains(&value) {
        Ok(())
    } else {
        Err(LauncherError::OutOfRange {
            field,
            value,
            min: *range.start(),
            max: *range.end(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolution_parse() {
        let res: Resolution = "1920x1080".parse().unwrap();
        assert_eq!(res.width, 1920);
        assert_eq!(res.height, 1080);
        assert_eq!(res.to_string(), "1920x1080");
    }

    #[test]
    fn test_resolution_without_separator_is_error() {
        let err = "1920".parse::<Resolution>().unwrap_err();
        assert!(matches!(err, LauncherError::InvalidResolution(ref s) if s == "1920"));
        assert!("1920x".parse::<Resolution>().is_err());
        assert!("axb".parse::<Resolution>().is_err());
        assert!("0x1080".parse::<Resolution>().is_err());
    }

    #[test]
    fn test_language_code_and_label() {
        assert_eq!(language_code("ESM - Spanish (Mexico)"), "ESM");
        assert_eq!(language_code("RUS"), "RUS");
        assert_eq!(language_label("fra"), "FRA - French");
        assert_eq!(language_label("XXX"), "XXX");
    }

    #[test]
    fn test_graphics_quality_from_str() {
        assert_eq!("epic".parse::<GraphicsQuality>(), Ok(GraphicsQuality::Epic));
        assert_eq!(" High ".parse::<GraphicsQuality>(), Ok(GraphicsQuality::High));
        assert!("Ultra".parse::<GraphicsQuality>().is_err());
    }

    #[test]
    fn test_field_set_clamp() {
        let mut fields = FieldSet {
            field_of_view: 150,
            min_frame_rate: 1,
            max_frame_rate: 500,
            ..FieldSet::default()
        };
        fields.clamp();
        assert_eq!(fields.field_of_view, 120);
        assert_eq!(fields.min_frame_rate, 5);
        assert_eq!(fields.max_frame_rate, 240);
    }

    #[test]
    fn test_field_set_validate() {
        assert!(FieldSet::default().validate().is_ok());

        // 边界值本身是合法的
        let edges = FieldSet {
            field_of_view: 120,
            min_frame_rate: 5,
            max_frame_rate: 240,
            ..FieldSet::default()
        };
        assert!(edges.validate().is_ok());

        let fov = FieldSet {
            field_of_view: 69,
            ..FieldSet::default()
        };
        assert!(matches!(
            fov.validate(),
            Err(LauncherError::OutOfRange { field: "FieldOfView", value: 69, min: 70, max: 120 })
        ));

        let min_fps = FieldSet {
            min_frame_rate: 0,
            ..FieldSet::default()
        };
        assert!(matches!(
            min_fps.validate(),
            Err(LauncherError::OutOfRange { field: "MinFrameRate", .. })
        ));

        let max_fps = FieldSet {
            max_frame_rate: 241,
            ..FieldSet::default()
        };
        assert!(matches!(
            max_fps.validate(),
            Err(LauncherError::OutOfRange { field: "MaxFrameRate", .. })
        ));
    }
}
