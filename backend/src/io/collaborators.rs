use shared::Notification;
use std::path::PathBuf;

/// Shows messages and asks yes/no questions
pub trait Notifier {
    fn notify(&self, notification: Notification);

    /// True when the user confirmed
    fn confirm(&self, title: &str, question: &str) -> bool;
}

/// Asks the user where to save a file
pub trait SavePathPicker {
    /// `None` when the user cancelled
    fn pick_save_path(&self, title: &str, suggested_name: &str, filter: &str) -> Option<PathBuf>;
}
