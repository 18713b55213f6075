// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Styled button primitive.

/// Visual style of a button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Variant {
    #[default]
    Primary,
    Secondary,
    Outline,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Size {
    Small,
    #[default]
    Medium,
    Large,
}

impl Size {
    fn text_size(&self) -> f32 {
        match self {
            Size::Small => 12.0,
            Size::Medium => 14.0,
            Size::Large => 18.0,
        }
    }

    fn min_height(&self) -> f32 {
        match self {
            Size::Small => 22.0,
            Size::Medium => 28.0,
            Size::Large => 36.0,
        }
    }
}

/// A button with a variant, a size, and an optional loading state.
///
/// A loading button shows "Loading..." and cannot be clicked.
#[derive(Debug, Clone)]
pub struct Button {
    text: String,
    variant: Variant,
    size: Size,
    is_loading: bool,
    disabled: bool,
}

impl Button {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            variant: Variant::default(),
            size: Size::default(),
            is_loading: false,
            disabled: false,
        }
    }

    pub fn variant(mut self, variant: Variant) -> Self {
        self.variant = variant;
        self
    }

    pub fn size(mut self, size: Size) -> Self {
        self.size = size;
        self
    }

    pub fn loading(mut self, is_loading: bool) -> Self {
        self.is_loading = is_loading;
        self
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    pub fn label(&self) -> &str {
        if self.is_loading {
            "Loading..."
        } else {
            &self.text
        }
    }

    pub fn is_enabled(&self) -> bool {
        !(self.is_loading || self.disabled)
    }

    fn colors(&self) -> (egui::Color32, egui::Color32, egui::Stroke) {
        match self.variant {
            Variant::Primary => (
                egui::Color32::from_rgb(0, 110, 210),
                egui::Color32::WHITE,
                egui::Stroke::NONE,
            ),
            Variant::Secondary => (
                egui::Color32::from_gray(90),
                egui::Color32::WHITE,
                egui::Stroke::NONE,
            ),
            Variant::Outline => (
                egui::Color32::TRANSPARENT,
                egui::Color32::from_rgb(0, 110, 210),
                egui::Stroke::new(1.0, egui::Color32::from_rgb(0, 110, 210)),
            ),
        }
    }
}

impl egui::Widget for Button {
    fn ui(self, ui: &mut egui::Ui) -> egui::Response {
        let (fill, text_color, stroke) = self.colors();
        let text = egui::RichText::new(self.label())
            .size(self.size.text_size())
            .color(text_color);
        let button = egui::Button::new(text)
            .fill(fill)
            .stroke(stroke)
            .min_size(egui::vec2(0.0, self.size.min_height()));

        ui.add_enabled(self.is_enabled(), button)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loading_overrides_label_and_disables() {
        let button = Button::new("Save").loading(true);
        assert_eq!(button.label(), "Loading...");
        assert!(!button.is_enabled());
    }

    #[test]
    fn test_defaults() {
        let button = Button::new("Play");
        assert_eq!(button.label(), "Play");
        assert!(button.is_enabled());
        assert_eq!(button.variant, Variant::Primary);
        assert_eq!(button.size, Size::Medium);
        assert!(!Button::new("x").disabled(true).is_enabled());
    }
}
