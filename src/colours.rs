//! Palette shared by the HUD and the sprites

pub const BLACK: &str = "#000000";
pub const WHITE: &str = "#ffffff";
pub const RED: &str = "#ff0000";
pub const YELLOW: &str = "#ffff00";
pub const GREEN: &str = "#00ff00";
pub const CYAN: &str = "#00ffff";
pub const BLUE: &str = "#0000ff";
pub const MAGENTA: &str = "#ff00ff";
