use tracing::debug;
use winit::event::{ElementState, MouseButton};

/// Steps the visible series through each single series, then all of them.
pub struct SeriesCycler {
    names: Vec<String>,
    /// Next step. `names.len()` means "all".
    step: usize,
}

impl SeriesCycler {
    pub fn new<I, T>(names: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
            step: 0,
        }
    }

    /// Visibility set for the next step.
    pub fn advance(&mut self) -> Vec<String> {
        let visible = match self.names.get(self.step) {
            Some(name) => vec![name.clone()],
            None => self.names.clone(),
        };
        self.step = (self.step + 1) % (self.names.len() + 1);
        visible
    }

    /// Advance on a left-button press.
    pub fn on_mouse_button(&mut self, button: MouseButton, state: ElementState) -> Option<Vec<String>> {
        if button != MouseButton::Left || state != ElementState::Pressed {
            return None;
        }
        let visible = self.advance();
        debug!(?visible, "Cycled visible series");
        Some(visible)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycles_singles_then_all() {
        let mut cycler = SeriesCycler::new(["x", "y", "z"]);
        assert_eq!(cycler.advance(), vec!["x"]);
        assert_eq!(cycler.advance(), vec!["y"]);
        assert_eq!(cycler.advance(), vec!["z"]);
        assert_eq!(cycler.advance(), vec!["x", "y", "z"]);
        assert_eq!(cycler.advance(), vec!["x"]);
    }

    #[test]
    fn empty_cycler_always_returns_empty() {
        let mut cycler = SeriesCycler::new(Vec::<String>::new());
        assert!(cycler.advance().is_empty());
        assert!(cycler.advance().is_empty());
    }

    #[test]
    fn only_left_press_advances() {
        let mut cycler = SeriesCycler::new(["a", "b"]);
        assert_eq!(cycler.on_mouse_button(MouseButton::Right, ElementState::Pressed), None);
        assert_eq!(cycler.on_mouse_button(MouseButton::Left, ElementState::Released), None);
        assert_eq!(
            cycler.on_mouse_button(MouseButton::Left, ElementState::Pressed),
            Some(vec!["a".to_string()])
        );
        assert_eq!(cycler.advance(), vec!["b"]);
    }
}
