/// Tracks the task count between renders and reports when focus should
/// jump to the list heading.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FocusController {
    previous: Option<usize>,
}

impl FocusController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the count for this render. Returns `true` when exactly one
    /// task disappeared since the last observation.
    pub fn observe(&mut self, count: usize) -> bool {
        let previous = self.previous.replace(count);
        matches!(previous, Some(prev) if prev.checked_sub(count) == Some(1))
    }

    pub fn previous(&self) -> Option<usize> {
        self.previous
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_render_never_moves_focus() {
        let mut focus = FocusController::new();
        assert!(!focus.observe(0));
        assert_eq!(focus.previous(), Some(0));
    }

    #[test]
    fn fires_only_on_a_single_removal() {
        let mut focus = FocusController::new();
        focus.observe(3);

        assert!(!focus.observe(3));
        assert!(!focus.observe(4));
        assert!(focus.observe(3));
        assert!(!focus.observe(1));
        assert!(focus.observe(0));
        assert!(!focus.observe(0));
    }
}
