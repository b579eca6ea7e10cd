use crate::constants::glyphs;
use crate::style::Styles;

/// Frame counter advanced by the render loop's ticker.
#[derive(Debug, Clone, Default)]
pub(crate) struct Spinner {
    frame: usize,
}

impl Spinner {
    pub fn tick(&mut self) {
        self.frame = (self.frame + 1) % glyphs::SPINNER_FRAMES.len();
    }

    pub fn view(&self, styles: &Styles) -> String {
        styles.paint(&styles.spinner, glyphs::SPINNER_FRAMES[self.frame])
    }
}
