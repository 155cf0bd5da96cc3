use super::reveal::RevealedPath;

/// Renderer-side visibility toggles. Changing them never touches engine state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewState {
    pub show_completed: bool,
    pub show_in_progress: bool,
}

impl Default for ViewState {
    fn default() -> Self {
        ViewState {
            show_completed: true,
            show_in_progress: true,
        }
    }
}

impl ViewState {
    pub fn toggle_completed(&mut self) -> bool {
        self.show_completed = !self.show_completed;
        self.show_completed
    }

    pub fn toggle_in_progress(&mut self) -> bool {
        self.show_in_progress = !self.show_in_progress;
        self.show_in_progress
    }

    /// Whether a revealed path should be drawn under the current toggles.
    pub fn path_visible(&self, path: &RevealedPath) -> bool {
        if !path.visible {
            return false;
        }
        if path.complete {
            self.show_completed
        } else {
            self.show_in_progress
        }
    }
}
