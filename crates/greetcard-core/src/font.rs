use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Font families offered by the text controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FontFamily {
    #[default]
    Arial,
    Roboto,
    Georgia,
    #[serde(rename = "Courier New")]
    CourierNew,
}

impl FontFamily {
    pub const ALL: [FontFamily; 4] = [
        FontFamily::Arial,
        FontFamily::Roboto,
        FontFamily::Georgia,
        FontFamily::CourierNew,
    ];

    /// The CSS family name handed to the painter.
    pub fn css_name(&self) -> &'static str {
        match self {
            FontFamily::Arial => "Arial",
            FontFamily::Roboto => "Roboto",
            FontFamily::Georgia => "Georgia",
            FontFamily::CourierNew => "Courier New",
        }
    }
}

impl fmt::Display for FontFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.css_name())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown font family '{0}'")]
pub struct ParseFontError(pub String);

impl FromStr for FontFamily {
    type Err = ParseFontError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FontFamily::ALL
            .into_iter()
            .find(|f| f.css_name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseFontError(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_font_names() {
        assert_eq!("Georgia".parse::<FontFamily>(), Ok(FontFamily::Georgia));
        assert_eq!("courier new".parse::<FontFamily>(), Ok(FontFamily::CourierNew));
        assert!("Comic Sans".parse::<FontFamily>().is_err());
    }

    #[test]
    fn test_font_display_matches_css() {
        for font in FontFamily::ALL {
            assert_eq!(font.to_string().parse::<FontFamily>(), Ok(font));
        }
    }
}
