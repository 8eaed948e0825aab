use crate::error::LauncherError;
use crate::model::{GraphicsQuality, FOV_RANGE};
use image::{DynamicImage, RgbaImage};
use std::collections::HashMap;
use std::path::Path;

/// 参考图中最宽的 FOV，裁剪都以它为基准
const BASE_FOV: u32 = 120;

/// 图片中的裁剪区域（像素）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// 某一画质等级下的两张参考图
#[derive(Default)]
struct ReferenceImages {
    fov70: Option<DynamicImage>,
    fov120: Option<DynamicImage>,
}

/// FOV 预览
///
/// 每个画质等级有 fov70 / fov120 两张参考截图。
/// FOV 为 70 时直接显示 fov70 图，为 120 时显示完整的 fov120 图，
/// 中间值按透视投影把 fov120 图从中心裁剪到对应的可见范围。
#[derive(Default)]
pub struct PreviewSimulator {
    images: HashMap<GraphicsQuality, ReferenceImages>,
}

impl PreviewSimulator {
    /// 从资源目录加载 `fov70_<等级>.png` 和 `fov120_<等级>.png`
    /// 单张图片缺失或解码失败只记录日志，不影响其它图片
    pub fn load(dir: &Path) -> Self {
        let mut images = HashMap::new();
        for quality in GraphicsQuality::ALL {
            let level = quality.as_str().to_lowercase();
            let refs = ReferenceImages {
                fov70: load_image(&dir.join(format!("fov70_{}.png", level))),
                fov120: load_image(&dir.join(format!("fov120_{}.png", level))),
            };
            images.insert(quality, refs);
        }
        Self { images }
    }

    /// 生成预览图，没有可用参考图时返回 None
    pub fn generate_preview(&self, fov: u32, quality: GraphicsQuality) -> Option<RgbaImage> {
        let refs = self.images.get(&quality)?;
        let fov = fov.clamp(*FOV_RANGE.start(), *FOV_RANGE.end());

        if fov == *FOV_RANGE.start() {
            if let Some(img) = &refs.fov70 {
                return Some(img.to_rgba8());
            }
        }

        let base = refs.fov120.as_ref()?;
        let rect = crop_rect(base.width(), base.height(), fov);
        Some(
            base.crop_imm(rect.x, rect.y, rect.width, rect.height)
                .to_rgba8(),
        )
    }

    /// 已成功加载的图片数量
    pub fn loaded_count(&self) -> usize {
        self.images
            .values()
            .map(|r| r.fov70.is_some() as usize + r.fov120.is_some() as usize)
            .sum()
    }
}

fn load_image(path: &Path) -> Option<DynamicImage> {
    if !path.exists() {
        log::warn!("{}", LauncherError::FileMissing(path.to_path_buf()));
        return None;
    }
    match image::open(path) {
        Ok(img) => Some(img),
        Err(source) => {
            let err = LauncherError::Image {
                path: path.to_path_buf(),
                source,
            };
            log::warn!("{}", err);
            None
        }
    }
}

/// 某个 FOV 在 120° 参考图中可见的比例（0, 1]
/// 水平方向的可见宽度与 tan(fov/2) 成正比
pub fn visible_fraction(fov: u32) -> f32 {
    let fov = fov.clamp(*FOV_RANGE.start(), *FOV_RANGE.end()) as f32;
    let half = |deg: f32| (deg / 2.0).to_radians().tan();
    (half(fov) / half(BASE_FOV as f32)).min(1.0)
}

/// 计算从中心裁剪的区域，FOV 越小裁剪越多，宽高至少为 1 像素
pub fn crop_rect(width: u32, height: u32, fov: u32) -> CropRect {
    let fraction = visible_fraction(fov);
    let scale = |len: u32| ((len as f32 * fraction).round() as u32).clamp(len.min(1), len);
    let (w, h) = (scale(width), scale(height));
    CropRect {
        x: (width - w) / 2,
        y: (height - h) / 2,
        width: w,
        height: h,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use std::fs;

    #[test]
    fn test_fov_120_is_uncropped() {
        assert_eq!(
            crop_rect(1600, 900, 120),
            CropRect {
                x: 0,
                y: 0,
                width: 1600,
                height: 900
            }
        );
    }

    #[test]
    fn test_crop_shrinks_as_fov_decreases() {
        let mut last = crop_rect(1600, 900, 120).width;
        for fov in (70..120).rev() {
            let rect = crop_rect(1600, 900, fov);
            assert!(rect.width < last, "fov {} did not shrink", fov);
            assert!(rect.width > 0 && rect.height > 0);
            // 始终居中
            assert!(rect.x * 2 + rect.width <= 1600 && 1600 - (rect.x * 2 + rect.width) <= 1);
            last = rect.width;
        }
    }

    #[test]
    fn test_visible_fraction_at_fov_70() {
        // tan(35°) / tan(60°) ≈ 0.404
        let f = visible_fraction(70);
        assert!((f - 0.4043).abs() < 0.001, "got {}", f);
        assert_eq!(visible_fraction(40), visible_fraction(70));
    }

    #[test]
    fn test_generate_preview_from_assets() {
        let dir = std::env::temp_dir().join(format!("gears_preview_{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        RgbaImage::from_pixel(200, 100, Rgba([255, 0, 0, 255]))
            .save(dir.join("fov120_epic.png"))
            .unwrap();
        RgbaImage::from_pixel(50, 50, Rgba([0, 255, 0, 255]))
            .save(dir.join("fov70_epic.png"))
            .unwrap();

        let sim = PreviewSimulator::load(&dir);
        assert_eq!(sim.loaded_count(), 2);

        let full = sim.generate_preview(120, GraphicsQuality::Epic).unwrap();
        assert_eq!(full.dimensions(), (200, 100));

        // FOV 70 使用单独的参考图
        let narrow = sim.generate_preview(70, GraphicsQuality::Epic).unwrap();
        assert_eq!(narrow.dimensions(), (50, 50));

        let mid = sim.generate_preview(90, GraphicsQuality::Epic).unwrap();
        let rect = crop_rect(200, 100, 90);
        assert_eq!(mid.dimensions(), (rect.width, rect.height));

        // 缺图的等级没有预览
        assert!(sim.generate_preview(90, GraphicsQuality::Low).is_none());

        fs::remove_dir_all(&dir).unwrap();
    }
}
