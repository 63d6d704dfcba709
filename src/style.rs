/// Presentation hints for a category card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryStyle {
    pub icon: &'static str,
    pub accent: &'static str,
}

pub const NEUTRAL_STYLE: CategoryStyle = CategoryStyle {
    icon: "circle",
    accent: "gray",
};

static STYLES: [(&str, CategoryStyle); 6] = [
    ("Code Clarity", CategoryStyle { icon: "eye", accent: "blue" }),
    ("Efficiency", CategoryStyle { icon: "zap", accent: "amber" }),
    ("Best Practices", CategoryStyle { icon: "check-circle", accent: "green" }),
    ("Error Handling", CategoryStyle { icon: "shield", accent: "red" }),
    ("Naming Conventions", CategoryStyle { icon: "tag", accent: "purple" }),
    ("Code Structure", CategoryStyle { icon: "layers", accent: "teal" }),
];

/// Style for a category name; unknown names get [`NEUTRAL_STYLE`].
pub fn style_for(name: &str) -> &'static CategoryStyle {
    STYLES
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, style)| style)
        .unwrap_or(&NEUTRAL_STYLE)
}
