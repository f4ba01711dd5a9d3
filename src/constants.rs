//! Application-wide constants
//!
//! Single source of truth for magic numbers and string literals used
//! throughout the banner.

/// Filesystem paths
pub mod paths {
    /// Global configuration file (declarative key/value TOML)
    pub const CONFIG_FILE: &str = "/etc/classification-banner";
}

/// Built-in configuration defaults
pub mod defaults {
    pub const MESSAGE: &str = "UNCLASSIFIED";
    pub const FGCOLOR: &str = "#000000";
    pub const BGCOLOR: &str = "#00CC00";
    pub const FACE: &str = "liberation-sans";
    pub const SIZE: &str = "small";
    pub const WEIGHT: &str = "bold";
}

/// Banner window geometry and identity
pub mod banner {
    /// Fixed height of each banner strip in pixels
    pub const STRIP_HEIGHT: u16 = 5;

    /// WM_CLASS instance and class names (null-separated pair)
    pub const WM_CLASS: &[u8] = b"classification-banner\0classification-banner\0";

    /// WM_NAME shown by window listing tools
    pub const WM_NAME: &[u8] = b"Classification Banner";
}

/// X11 protocol constants
pub mod x11 {
    /// _NET_WM_DESKTOP value meaning "visible on all desktops"
    pub const ALL_DESKTOPS: u32 = 0xFFFF_FFFF;

    /// _MOTIF_WM_HINTS flag selecting the decorations field
    pub const MOTIF_HINTS_DECORATIONS: u32 = 1 << 1;
}
