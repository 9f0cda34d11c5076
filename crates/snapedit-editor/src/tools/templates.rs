//! ID photo templates, sized at 300 dpi.

use serde::{Deserialize, Serialize};
use snapedit_core::SessionError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotoTemplate {
    pub id: String,
    pub name: String,
    pub width: u32,
    pub height: u32,
    /// Gap above the subject's head, as a fraction of the photo height.
    pub headroom_ratio: f64,
    /// Subject height as a fraction of the photo height.
    pub person_height_ratio: f64,
}

impl PhotoTemplate {
    fn preset(id: &str, name: &str, width: u32, height: u32, headroom: f64, person: f64) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            width,
            height,
            headroom_ratio: headroom,
            person_height_ratio: person,
        }
    }

    pub fn builtin() -> Vec<PhotoTemplate> {
        vec![
            Self::preset("one-inch", "1 inch", 295, 413, 0.10, 0.75),
            Self::preset("two-inch", "2 inch", 413, 579, 0.10, 0.75),
            Self::preset("small-two-inch", "Small 2 inch", 413, 531, 0.10, 0.74),
            Self::preset("passport", "Passport", 413, 531, 0.08, 0.78),
            Self::preset("visa", "Visa", 600, 600, 0.12, 0.70),
        ]
    }

    pub fn find(id: &str) -> Option<PhotoTemplate> {
        Self::builtin()
            .into_iter()
            .find(|t| t.id.eq_ignore_ascii_case(id.trim()))
    }

    /// Builds a user-defined template after validating its geometry.
    pub fn custom(
        name: impl Into<String>,
        width: u32,
        height: u32,
        headroom_ratio: f64,
        person_height_ratio: f64,
    ) -> Result<Self, SessionError> {
        if width == 0 || height == 0 {
            return Err(SessionError::invalid("template", "size must be positive"));
        }
        for (field, value) in [
            ("headroom_ratio", headroom_ratio),
            ("person_height_ratio", person_height_ratio),
        ] {
            if !(value > 0.0 && value < 1.0) {
                return Err(SessionError::invalid(field, format!("{} is not in (0, 1)", value)));
            }
        }
        if headroom_ratio + person_height_ratio > 1.0 {
            return Err(SessionError::invalid(
                "person_height_ratio",
                "subject does not fit below the headroom",
            ));
        }
        let name = name.into();
        Ok(Self {
            id: format!("custom-{}x{}", width, height),
            name,
            width,
            height,
            headroom_ratio,
            person_height_ratio,
        })
    }
}
