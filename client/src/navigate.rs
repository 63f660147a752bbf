use parking_lot::Mutex;
use tracing::info;

// ---------------------------------------------------------------------------
// Navigation seam
// ---------------------------------------------------------------------------

/// The client's view of "where is the user right now, and send them
/// somewhere else". Injected at construction so the unauthorized-redirect
/// behavior stays testable and host-agnostic.
pub trait Navigator: Send + Sync {
    /// Path of the active view, e.g. `/dashboard/resident`.
    fn current_path(&self) -> String;

    /// Switch the active view.
    fn navigate(&self, path: &str);
}

/// In-memory navigator for non-browser hosts: the app shell updates the
/// path via [`Navigator::navigate`], the client reads it back when
/// classifying an unauthorized response.
pub struct MemoryNavigator {
    current: Mutex<String>,
    history: Mutex<Vec<String>>,
}

impl MemoryNavigator {
    pub fn new(initial: &str) -> Self {
        Self {
            current: Mutex::new(initial.to_string()),
            history: Mutex::new(Vec::new()),
        }
    }

    /// Every path navigated to since construction, oldest first.
    pub fn history(&self) -> Vec<String> {
        self.history.lock().clone()
    }
}

impl Navigator for MemoryNavigator {
    fn current_path(&self) -> String {
        self.current.lock().clone()
    }

    fn navigate(&self, path: &str) {
        info!("Navigating to {}", path);
        *self.current.lock() = path.to_string();
        self.history.lock().push(path.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn navigate_updates_current_and_history() {
        let nav = MemoryNavigator::new("/");
        assert_eq!(nav.current_path(), "/");
        nav.navigate("/dashboard/admin");
        nav.navigate("/login");
        assert_eq!(nav.current_path(), "/login");
        assert_eq!(nav.history(), vec!["/dashboard/admin", "/login"]);
    }
}
