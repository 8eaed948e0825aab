use crate::dialog::{NativeDialogs, Notifier};
use crate::error::LauncherError;
use crate::launch;
use crate::model::{
    FieldSet, GraphicsQuality, Mode, FOV_RANGE, LANGUAGES, MAX_FRAME_RATE_RANGE,
    MIN_FRAME_RATE_RANGE,
};
use crate::patcher::{self, ConfigPatcher};
use crate::preview::PreviewSimulator;
use crate::settings::LauncherSettings;
use crate::updater::{self, HttpReleaseSource};
use eframe::egui;
use image::RgbaImage;
use std::path::Path;

/// 主窗口背景图（缺失时程序无法启动）
pub const MAIN_BACKGROUND: &str = "bg.png";
/// 选项窗口背景图
pub const OPTIONS_BACKGROUND: &str = "bg1.png";

const PREVIEW_SIZE: egui::Vec2 = egui::vec2(400.0, 300.0);

/// 读取并解码图片
pub fn read_image(path: &Path) -> Result<RgbaImage, LauncherError> {
    if !path.is_file() {
        return Err(LauncherError::FileMissing(path.to_path_buf()));
    }
    image::open(path)
        .map(|img| img.to_rgba8())
        .map_err(|source| LauncherError::Image {
            path: path.to_path_buf(),
            source,
        })
}

/// 把 RGBA 图片上传为 egui 纹理
fn to_texture(ctx: &egui::Context, name: &str, img: &RgbaImage) -> egui::TextureHandle {
    let size = [img.width() as usize, img.height() as usize];
    let color_image = egui::ColorImage::from_rgba_unmultiplied(size, img.as_flat_samples().as_slice());
    ctx.load_texture(name, color_image, egui::TextureOptions::LINEAR)
}

/// 把纹理拉伸铺满整个区域（类似 setScaledContents）
fn paint_background(ui: &egui::Ui, texture: &egui::TextureHandle) {
    let rect = ui.max_rect();
    let uv = egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0));
    ui.painter()
        .image(texture.id(), rect, uv, egui::Color32::WHITE);
}

/// 启动器主状态
pub struct LauncherApp {
    settings: LauncherSettings,
    notifier: NativeDialogs,
    background: egui::TextureHandle,
    /// 选项窗口，None 表示未打开
    options: Option<OptionsWindow>,
}

impl LauncherApp {
    /// 初始化应用
    ///
    /// # 参数
    /// * `background` - 启动前已经校验过的主窗口背景图
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        settings: LauncherSettings,
        background: RgbaImage,
    ) -> Self {
        let background = to_texture(&cc.egui_ctx, "main_background", &background);
        Self {
            settings,
            notifier: NativeDialogs,
            background,
            options: None,
        }
    }

    fn launch(&self, mode: Mode) {
        if let Err(e) = launch::launch(&self.settings, mode) {
            self.notifier.error("Error", &e.to_string());
        }
    }

    /// 打开选项窗口，重新读取两个模式的配置文件
    fn open_options(&mut self, ctx: &egui::Context) {
        self.options = OptionsWindow::open(ctx, &self.settings, &self.notifier);
    }
}

impl eframe::App for LauncherApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let mut clicked_mode = None;
        let mut open_options = false;

        // 无边框面板，背景图铺满
        egui::CentralPanel::default()
            .frame(egui::Frame::none())
            .show(ctx, |ui| {
                paint_background(ui, &self.background);

                ui.vertical_centered(|ui| {
                    // 按钮放在背景图下半部分
                    ui.add_space(ui.available_height() * 0.45);
                    let button = |text: &str| {
                        egui::Button::new(egui::RichText::new(text).size(18.0))
                            .min_size(egui::vec2(220.0, 36.0))
                    };
                    if ui.add(button("Singleplayer")).clicked() {
                        clicked_mode = Some(Mode::Singleplayer);
                    }
                    ui.add_space(8.0);
                    if ui.add(button("Multiplayer")).clicked() {
                        clicked_mode = Some(Mode::Multiplayer);
                    }
                    ui.add_space(8.0);
                    if ui.add(button("Options")).clicked() {
                        open_options = true;
                    }
                });
            });

        if let Some(mode) = clicked_mode {
            self.launch(mode);
        }
        if open_options {
            self.open_options(ctx);
        }

        if let Some(options) = &mut self.options {
            let still_open = options.show(ctx, &self.settings, &self.notifier);
            if !still_open {
                self.options = None;
            }
        }
    }
}

/// 版本选择弹窗的状态
struct VersionPicker {
    versions: Vec<String>,
    selected: usize,
}

/// 选项窗口
struct OptionsWindow {
    background: egui::TextureHandle,
    sp_fields: FieldSet,
    mp_fields: FieldSet,
    simulator: PreviewSimulator,
    /// 预览对应的模式（最近一次修改的那一列）
    preview_mode: Mode,
    preview: Option<egui::TextureHandle>,
    preview_dirty: bool,
    version_picker: Option<VersionPicker>,
}

impl OptionsWindow {
    /// 读取配置并创建窗口
    /// 背景图缺失时弹窗提示并放弃打开
    fn open(ctx: &egui::Context, settings: &LauncherSettings, notifier: &dyn Notifier) -> Option<Self> {
        let background = match read_image(&settings.asset(OPTIONS_BACKGROUND)) {
            Ok(img) => to_texture(ctx, "options_background", &img),
            Err(e) => {
                notifier.error("Error", &format!("Background image not available: {}", e));
                return None;
            }
        };

        let load = |mode: Mode| {
            let report = ConfigPatcher::for_mode(settings, mode).load_fields();
            for problem in &report.problems {
                notifier.error("Error", &format!("Could not load {} settings: {}", mode, problem));
            }
            report.fields
        };
        let sp_fields = load(Mode::Singleplayer);
        let mp_fields = load(Mode::Multiplayer);

        let simulator = PreviewSimulator::load(&settings.assets_dir);
        log::info!("Loaded {} preview image(s)", simulator.loaded_count());

        Some(Self {
            background,
            sp_fields,
            mp_fields,
            simulator,
            preview_mode: Mode::Singleplayer,
            preview: None,
            preview_dirty: true,
            version_picker: None,
        })
    }

    fn fields(&self, mode: Mode) -> &FieldSet {
        match mode {
            Mode::Singleplayer => &self.sp_fields,
            Mode::Multiplayer => &self.mp_fields,
        }
    }

    /// 按当前字段重新生成预览纹理
    fn refresh_preview(&mut self, ctx: &egui::Context) {
        let fields = self.fields(self.preview_mode);
        let (fov, quality) = (fields.field_of_view, fields.graphics_quality);
        self.preview = self
            .simulator
            .generate_preview(fov, quality)
            .map(|img| to_texture(ctx, "fov_preview", &img));
        if self.preview.is_none() {
            log::warn!("No preview image for {} at FOV {}", quality, fov);
        }
        self.preview_dirty = false;
    }

    fn save_all(&mut self, settings: &LauncherSettings, notifier: &dyn Notifier) {
        let fields = [
            (Mode::Singleplayer, &self.sp_fields),
            (Mode::Multiplayer, &self.mp_fields),
        ];
        match patcher::save_all(settings, &fields) {
            Ok(()) => {
                self.preview_mode = Mode::Singleplayer;
                self.preview_dirty = true;
                notifier.info("Saved", "Settings saved successfully.");
            }
            Err(e) => notifier.error("Error", &format!("Could not save the configuration: {}", e)),
        }
    }

    fn check_for_updates(&mut self, settings: &LauncherSettings, notifier: &dyn Notifier) {
        let source = match HttpReleaseSource::new(settings.tags_url.clone()) {
            Ok(source) => source,
            Err(e) => {
                notifier.error("Error", &format!("Error while fetching versions: {}", e));
                return;
            }
        };
        let versions = updater::available_versions(&source, notifier);
        if !versions.is_empty() {
            self.version_picker = Some(VersionPicker {
                versions,
                selected: 0,
            });
        }
    }

    /// 绘制窗口，返回 false 表示窗口已关闭
    fn show(&mut self, ctx: &egui::Context, settings: &LauncherSettings, notifier: &dyn Notifier) -> bool {
        if self.preview_dirty {
            self.refresh_preview(ctx);
        }

        let mut open = true;
        let mut save = false;
        let mut check_updates = false;

        egui::Window::new("Options")
            .open(&mut open)
            .default_size([1000.0, 600.0])
            .resizable(true)
            .show(ctx, |ui| {
                paint_background(ui, &self.background);

                ui.horizontal_top(|ui| {
                    for mode in Mode::ALL {
                        ui.vertical(|ui| {
                            ui.set_width(240.0);
                            ui.label(
                                egui::RichText::new(format!("{} Options", mode))
                                    .color(egui::Color32::WHITE)
                                    .size(16.0)
                                    .strong(),
                            );
                            // 每一列编辑对应模式的字段
                            let fields = match mode {
                                Mode::Singleplayer => &mut self.sp_fields,
                                Mode::Multiplayer => &mut self.mp_fields,
                            };
                            // 预览跟随最近修改的那一列
                            if field_editor(ui, mode, fields) {
                                self.preview_mode = mode;
                                self.preview_dirty = true;
                            }
                        });
                        ui.add_space(16.0);
                    }

                    // 预览区，固定大小，图片拉伸填满
                    let (rect, _) = ui.allocate_exact_size(PREVIEW_SIZE, egui::Sense::hover());
                    match &self.preview {
                        Some(texture) => {
                            egui::Image::new(texture)
                                .fit_to_exact_size(PREVIEW_SIZE)
                                .paint_at(ui, rect);
                        }
                        None => {
                            ui.painter().text(
                                rect.center(),
                                egui::Align2::CENTER_CENTER,
                                "No preview",
                                egui::FontId::proportional(14.0),
                                egui::Color32::WHITE,
                            );
                        }
                    }
                    ui.painter().rect_stroke(
                        rect,
                        0.0,
                        egui::Stroke::new(2.0, egui::Color32::WHITE),
                    );
                });

                ui.add_space(12.0);
                // 按钮只记录点击，窗口绘制结束后再执行，避免借用冲突
                if ui.add_sized([ui.available_width(), 30.0], egui::Button::new("Save")).clicked() {
                    save = true;
                }
                if ui
                    .add_sized([ui.available_width(), 30.0], egui::Button::new("Check for Updates"))
                    .clicked()
                {
                    check_updates = true;
                }
            });

        if save {
            self.save_all(settings, notifier);
        }
        if check_updates {
            self.check_for_updates(settings, notifier);
        }
        self.show_version_picker(ctx, settings, notifier);

        open
    }

    fn show_version_picker(&mut self, ctx: &egui::Context, settings: &LauncherSettings, notifier: &dyn Notifier) {
        let Some(picker) = &mut self.version_picker else {
            return;
        };

        let mut chosen = None;
        let mut cancel = false;
        egui::Window::new("Select Version")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
            .show(ctx, |ui| {
                ui.label("Available Versions:");
                egui::ComboBox::from_id_salt("version_select")
                    .selected_text(picker.versions[picker.selected].as_str())
                    .show_ui(ui, |ui| {
                        for (i, version) in picker.versions.iter().enumerate() {
                            ui.selectable_value(&mut picker.selected, i, version.as_str());
                        }
                    });
                ui.horizontal(|ui| {
                    if ui.button("OK").clicked() {
                        chosen = Some(picker.versions[picker.selected].clone());
                    }
                    if ui.button("Cancel").clicked() {
                        cancel = true;
                    }
                });
            });

        // 选中版本后打开发布页，不在本地覆盖程序
        if let Some(version) = chosen {
            self.version_picker = None;
            updater::open_release(&settings.releases_url, &version, notifier);
        } else if cancel {
            self.version_picker = None;
        }
    }
}

/// 绘制单个模式的字段编辑控件，任何字段被修改时返回 true
fn field_editor(ui: &mut egui::Ui, mode: Mode, fields: &mut FieldSet) -> bool {
    let mut changed = false;
    // 白色标签，和背景图对比明显
    let label = |ui: &mut egui::Ui, text: &str| {
        ui.label(egui::RichText::new(text).color(egui::Color32::WHITE));
    };

    // 语言下拉框，ID 带上模式避免两列冲突
    label(ui, "Language:");
    egui::ComboBox::from_id_salt(("language", mode.short()))
        .selected_text(fields.language.as_str())
        .width(220.0)
        .show_ui(ui, |ui| {
            for (code, name) in LANGUAGES {
                // 显示 "代码 - 名称"，保存时只取代码
                let text = format!("{} - {}", code, name);
                if ui
                    .selectable_label(fields.language == text, text.as_str())
                    .clicked()
                {
                    fields.language = text;
                    changed = true;
                }
            }
        });

    // 分辨率为自由文本，保存时才解析
    label(ui, "Resolution:");
    changed |= ui
        .add(egui::TextEdit::singleline(&mut fields.resolution).desired_width(220.0))
        .changed();

    // 滑块本身限制了取值范围
    label(ui, "FOV:");
    changed |= ui
        .add(egui::Slider::new(&mut fields.field_of_view, FOV_RANGE))
        .changed();

    label(ui, "Min FPS:");
    changed |= ui
        .add(egui::Slider::new(&mut fields.min_frame_rate, MIN_FRAME_RATE_RANGE))
        .changed();

    label(ui, "Max FPS:");
    changed |= ui
        .add(egui::Slider::new(&mut fields.max_frame_rate, MAX_FRAME_RATE_RANGE))
        .changed();

    // 画质下拉框
    label(ui, "Graphics:");
    egui::ComboBox::from_id_salt(("graphics", mode.short()))
        .selected_text(fields.graphics_quality.as_str())
        .width(220.0)
        .show_ui(ui, |ui| {
            for quality in GraphicsQuality::ALL {
                changed |= ui
                    .selectable_value(&mut fields.graphics_quality, quality, quality.as_str())
                    .changed();
            }
        });

    changed
}
