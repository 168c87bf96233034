use std::env;
use std::time::Duration;

use chessblock::{ParseOptions, Side};

#[derive(Clone, Debug)]
pub struct Config {
    /// Whether boards accept moves unless a block says otherwise
    pub editable: bool,
    /// Orientation for blocks without an orientation marker
    pub orientation: Side,
    /// Delay between autoplay steps
    pub autoplay_interval: Duration,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            editable: env::var("CHESSBLOCK_EDITABLE")
                .ok()
                .and_then(|v| parse_bool(&v))
                .unwrap_or(true),
            orientation: env::var("CHESSBLOCK_ORIENTATION")
                .ok()
                .and_then(|v| parse_side(&v))
                .unwrap_or(Side::White),
            autoplay_interval: Duration::from_millis(
                env::var("CHESSBLOCK_AUTOPLAY_MS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(1000),
            ),
        }
    }

    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            default_editable: self.editable,
            default_orientation: self.orientation,
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn parse_side(value: &str) -> Option<Side> {
    match value.trim().to_ascii_lowercase().as_str() {
        "white" | "w" => Some(Side::White),
        "black" | "b" => Some(Side::Black),
        _ => None,
    }
}
