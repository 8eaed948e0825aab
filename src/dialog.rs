use rfd::{MessageButtons, MessageDialog, MessageLevel};

/// 模态提示框
/// 界面上的每个操作失败时都通过它告知用户，测试中可以替换成记录型实现
pub trait Notifier {
    fn error(&self, title: &str, message: &str);
    fn info(&self, title: &str, message: &str);
}

/// 使用系统原生对话框
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeDialogs;

impl Notifier for NativeDialogs {
    fn error(&self, title: &str, message: &str) {
        log::error!("{}: {}", title, message);
        let _ = MessageDialog::new()
            .set_level(MessageLevel::Error)
            .set_title(title)
            .set_description(message)
            .set_buttons(MessageButtons::Ok)
            .show();
    }

    fn info(&self, title: &str, message: &str) {
        log::info!("{}: {}", title, message);
        let _ = MessageDialog::new()
            .set_level(MessageLevel::Info)
            .set_title(title)
            .set_description(message)
            .set_buttons(MessageButtons::Ok)
            .show();
    }
}

#[cfg(test)]
pub mod testing {
    use super::Notifier;
    use std::cell::RefCell;

    /// 记录所有弹窗内容，便于断言
    #[derive(Debug, Default)]
    pub struct RecordingNotifier {
        pub errors: RefCell<Vec<String>>,
        pub infos: RefCell<Vec<String>>,
    }

    impl Notifier for RecordingNotifier {
        fn error(&self, _title: &str, message: &str) {
            self.errors.borrow_mut().push(message.to_string());
        }

        fn info(&self, _title: &str, message: &str) {
            self.infos.borrow_mut().push(message.to_string());
        }
    }
}
