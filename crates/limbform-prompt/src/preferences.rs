use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

/// One of the six style attributes a user can pick.
///
/// Iteration order is the fixed display order of the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumString)]
#[strum(serialize_all = "kebab-case")]
pub enum PreferenceField {
    PrimaryColor,
    AccentColor,
    DesignStyle,
    TextureFinish,
    Personalization,
    MaterialLook,
}

impl PreferenceField {
    /// Label used at the start of each prompt line
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::PrimaryColor => "Primary Color",
            Self::AccentColor => "Accent Color",
            Self::DesignStyle => "Design Style",
            Self::TextureFinish => "Texture/Finish",
            Self::Personalization => "Personalization",
            Self::MaterialLook => "Material Look",
        }
    }

    /// Suggested options offered by the form. Free text is accepted too.
    #[must_use]
    pub fn options(self) -> &'static [&'static str] {
        match self {
            Self::PrimaryColor | Self::AccentColor => &[
                "Black",
                "White",
                "Silver",
                "Gunmetal Gray",
                "Red",
                "Blue",
                "Green",
                "Gold",
                "Rose Gold",
            ],
            Self::DesignStyle => &[
                "Minimalist",
                "Futuristic",
                "Organic",
                "Geometric",
                "Sporty",
                "Artistic",
                "Steampunk",
            ],
            Self::TextureFinish => &[
                "Glossy",
                "Matte",
                "Satin",
                "Brushed",
                "Textured Grip",
                "Honeycomb",
            ],
            Self::Personalization => &[
                "Initials",
                "Name Engraving",
                "Custom Pattern",
                "Team Logo",
                "Meaningful Symbol",
            ],
            Self::MaterialLook => &[
                "Metallic",
                "Carbon Fiber",
                "Wood Grain",
                "Ceramic",
                "Leather",
                "Translucent",
            ],
        }
    }
}

/// The user's chosen style attributes.
///
/// Every field is optional and independent. A field holding only whitespace
/// counts as empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferenceSelection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accent_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub design_style: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub texture_finish: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub personalization: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material_look: Option<String>,
}

impl PreferenceSelection {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field, builder style
    #[must_use]
    pub fn with(mut self, field: PreferenceField, value: impl Into<String>) -> Self {
        self.set(field, Some(value.into()));
        self
    }

    pub fn set(&mut self, field: PreferenceField, value: Option<String>) {
        let slot = match field {
            PreferenceField::PrimaryColor => &mut self.primary_color,
            PreferenceField::AccentColor => &mut self.accent_color,
            PreferenceField::DesignStyle => &mut self.design_style,
            PreferenceField::TextureFinish => &mut self.texture_finish,
            PreferenceField::Personalization => &mut self.personalization,
            PreferenceField::MaterialLook => &mut self.material_look,
        };
        *slot = value;
    }

    /// Trimmed value of a field, `None` when unset or blank
    #[must_use]
    pub fn get(&self, field: PreferenceField) -> Option<&str> {
        let slot = match field {
            PreferenceField::PrimaryColor => &self.primary_color,
            PreferenceField::AccentColor => &self.accent_color,
            PreferenceField::DesignStyle => &self.design_style,
            PreferenceField::TextureFinish => &self.texture_finish,
            PreferenceField::Personalization => &self.personalization,
            PreferenceField::MaterialLook => &self.material_look,
        };
        slot.as_deref().map(str::trim).filter(|v| !v.is_empty())
    }

    /// Non-empty fields in display order
    pub fn filled(&self) -> impl Iterator<Item = (PreferenceField, &str)> + '_ {
        PreferenceField::iter().filter_map(|field| self.get(field).map(|value| (field, value)))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.filled().next().is_none()
    }
}
