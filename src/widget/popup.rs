use crate::models::PrizeDetails;

/// Where a click on an open overlay landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickTarget {
    Background,
    Content,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Overlay<T> {
    content: Option<T>,
    visible: bool,
}

impl<T> Default for Overlay<T> {
    fn default() -> Self {
        Self {
            content: None,
            visible: false,
        }
    }
}

impl<T> Overlay<T> {
    pub fn open(&mut self, content: T) {
        self.content = Some(content);
        self.visible = true;
    }

    pub fn close(&mut self) {
        self.visible = false;
    }

    /// Closes only when the click hit the backdrop itself.
    pub fn click(&mut self, target: ClickTarget) {
        if target == ClickTarget::Background {
            self.close();
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Content while the overlay is shown.
    pub fn content(&self) -> Option<&T> {
        if self.visible {
            self.content.as_ref()
        } else {
            None
        }
    }
}

#[derive(Debug, Default)]
pub struct Popups {
    pub prize: Overlay<PrizeDetails>,
    pub message: Overlay<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_clicks_keep_the_overlay_open() {
        let mut overlay = Overlay::default();
        overlay.open("hello".to_string());
        overlay.click(ClickTarget::Content);
        assert_eq!(overlay.content().map(String::as_str), Some("hello"));

        overlay.click(ClickTarget::Background);
        assert!(!overlay.is_visible());
        assert_eq!(overlay.content(), None);
    }

    #[test]
    fn overlays_are_independent() {
        let mut popups = Popups::default();
        popups.message.open("note".into());
        popups.prize.open(PrizeDetails {
            image: "blank".into(),
            name: "Cake".into(),
            description: "A slice".into(),
        });
        popups.prize.close();
        assert!(popups.message.is_visible());
        assert!(!popups.prize.is_visible());
    }
}
