use serde::{Deserialize, Serialize};

/// CSS class names the core toggles on elements.
///
/// The styling layer owns what each class looks like; the core only decides
/// when a class is present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClassName {
    // Display modes (document body)
    RealSize,
    RealOrbits,
    RedGiantMode,

    // Visibility / state
    Active,
    FadeIn,
    Show,
    Visible,
    Loaded,

    // Created elements
    Star,
    NotificationToast,
    ScrollToTop,
    Lightbox,
    LightboxClose,
    CharCounter,
    PrintButton,
    CopyLinkButton,
}

impl ClassName {
    pub fn as_str(self) -> &'static str {
        match self {
            ClassName::RealSize => "real-size",
            ClassName::RealOrbits => "real-orbits",
            ClassName::RedGiantMode => "red-giant-mode",
            ClassName::Active => "active",
            ClassName::FadeIn => "fade-in",
            ClassName::Show => "show",
            ClassName::Visible => "visible",
            ClassName::Loaded => "loaded",
            ClassName::Star => "star",
            ClassName::NotificationToast => "notification-toast",
            ClassName::ScrollToTop => "scroll-to-top",
            ClassName::Lightbox => "lightbox",
            ClassName::LightboxClose => "lightbox-close",
            ClassName::CharCounter => "char-counter",
            ClassName::PrintButton => "btn-outline",
            ClassName::CopyLinkButton => "btn-secondary",
        }
    }
}

impl std::fmt::Display for ClassName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
