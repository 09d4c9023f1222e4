use serde::{Deserialize, Serialize};

/// RGBA color, serialized as a hex string.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    r: u8,
    g: u8,
    b: u8,
    a: u8,
}

impl TryFrom<String> for Color {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::try_from_hex(&value).ok_or_else(|| format!("invalid color: {value}"))
    }
}

impl From<Color> for String {
    fn from(val: Color) -> Self {
        val.to_hex()
    }
}

impl Color {
    /// White color: `#FFFFFFFF`
    pub const WHITE: Color = Color::rgba(255, 255, 255, 255);
    /// Black color: `#000000FF`
    pub const BLACK: Color = Color::rgba(0, 0, 0, 255);
    /// Dark blue used for the active panel header: `#0B3954FF`
    pub const PRUSSIAN_BLUE: Color = Color::rgba(0x0b, 0x39, 0x54, 255);

    /// Constructs color from its RGBA channels.
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Converts the color into u8 array (RGBA).
    pub fn to_u8_array(&self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Converts the color into HEX8 string: `#RRGGBBAA`.
    pub fn to_hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}{:02X}", self.r, self.g, self.b, self.a)
    }

    /// Parses a color from the hex string. Hex string can be HEX3 (`#RGB`), HEX6 (`#RRGGBB`)
    /// or HEX8 (`#RRGGBBAA`).
    pub fn try_from_hex(hex_string: &str) -> Option<Self> {
        let digits = hex_string.strip_prefix('#')?;
        if !digits.is_ascii() {
            return None;
        }

        let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&digits[range], 16).ok();

        match digits.len() {
            3 => {
                let short = |i: usize| channel(i..i + 1).map(|v| v * 17);
                Some(Self::rgba(short(0)?, short(1)?, short(2)?, 255))
            }
            6 => Some(Self::rgba(channel(0..2)?, channel(2..4)?, channel(4..6)?, 255)),
            8 => Some(Self::rgba(
                channel(0..2)?,
                channel(2..4)?,
                channel(4..6)?,
                channel(6..8)?,
            )),
            _ => None,
        }
    }

    /// Red channel.
    pub fn r(&self) -> u8 {
        self.r
    }

    /// Green channel.
    pub fn g(&self) -> u8 {
        self.g
    }

    /// Blue channel.
    pub fn b(&self) -> u8 {
        self.b
    }

    /// Alpha channel.
    pub fn a(&self) -> u8 {
        self.a
    }
}
