//! Display geometry detection
//!
//! Ordered fallback chain over captured `xrandr` output. Each strategy is a
//! pure function over the text, so every output shape is unit-testable
//! without spawning the real tool. The terminal fallback is whatever the X
//! server itself reports for the default screen.

use std::process::Command;
use thiserror::Error;
use tracing::{debug, warn};

/// Pixel dimensions of the primary display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenGeometry {
    pub width: u16,
    pub height: u16,
}

/// Every detection strategy failed, including the X server fallback.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("could not determine display geometry (server reported {width}x{height})")]
pub struct ProbeError {
    pub width: u16,
    pub height: u16,
}

/// Detect the current display geometry.
///
/// Tries the xrandr text strategies first; `server_reported` is the X
/// server's own default-screen dimensions, used as the terminal fallback.
/// Fails only if that fallback is degenerate too.
pub fn detect(server_reported: ScreenGeometry) -> Result<ScreenGeometry, ProbeError> {
    resolve(query_xrandr().as_deref(), server_reported)
}

/// Pure resolution step: text strategies over the captured output, then the
/// server-reported fallback.
fn resolve(
    xrandr_output: Option<&str>,
    server_reported: ScreenGeometry,
) -> Result<ScreenGeometry, ProbeError> {
    if let Some(geometry) = xrandr_output.and_then(parse_output) {
        debug!(width = geometry.width, height = geometry.height, "geometry from xrandr");
        return Ok(geometry);
    }
    if server_reported.width == 0 || server_reported.height == 0 {
        return Err(ProbeError {
            width: server_reported.width,
            height: server_reported.height,
        });
    }
    debug!(
        width = server_reported.width,
        height = server_reported.height,
        "geometry from x server fallback"
    );
    Ok(server_reported)
}

/// Run xrandr and capture stdout. No timeout is applied; the call blocks
/// the event loop for the duration of the query.
fn query_xrandr() -> Option<String> {
    match Command::new("xrandr").output() {
        Ok(out) if out.status.success() => Some(String::from_utf8_lossy(&out.stdout).into_owned()),
        Ok(out) => {
            warn!(status = %out.status, "xrandr exited with failure status");
            None
        }
        Err(e) => {
            warn!(error = %e, "failed to invoke xrandr");
            None
        }
    }
}

/// Apply the text strategies in order, first successful parse wins.
pub fn parse_output(output: &str) -> Option<ScreenGeometry> {
    parse_primary_line(output)
        .or_else(|| parse_current_mode(output))
        .or_else(|| parse_connected_line(output))
}

/// Strategy 1: the output line marked `primary`, e.g.
/// `DP-1 connected primary 1920x1080+0+0 (normal ...) 527mm x 296mm`.
fn parse_primary_line(output: &str) -> Option<ScreenGeometry> {
    output
        .lines()
        .filter(|line| line.contains("primary"))
        .find_map(|line| line.split_whitespace().find_map(parse_mode_token))
}

/// Strategy 2: mode-list format, the line whose rate field carries the `*`
/// current marker, e.g. `   1920x1080     60.00*+`.
fn parse_current_mode(output: &str) -> Option<ScreenGeometry> {
    output
        .lines()
        .filter(|line| line.contains('*'))
        .find_map(|line| line.split_whitespace().find_map(parse_mode_token))
}

/// Strategy 3: any connected output's resolution field.
fn parse_connected_line(output: &str) -> Option<ScreenGeometry> {
    output
        .lines()
        .filter(|line| line.contains(" connected"))
        .find_map(|line| line.split_whitespace().find_map(parse_mode_token))
}

/// Parse a `WxH` or `WxH+X+Y` token; any trailing `+offset` on the height
/// is stripped. Non-numeric tokens yield None.
fn parse_mode_token(token: &str) -> Option<ScreenGeometry> {
    let (w, rest) = token.split_once('x')?;
    let width = w.parse::<u16>().ok()?;
    let height = rest.split('+').next()?.parse::<u16>().ok()?;
    if width == 0 || height == 0 {
        return None;
    }
    Some(ScreenGeometry { width, height })
}

#[cfg(test)]
mod tests {
    use super::*;

    const GEOMETRY: ScreenGeometry = ScreenGeometry {
        width: 1920,
        height: 1080,
    };

    #[test]
    fn primary_line_with_offsets() {
        let output = "DP-1 connected primary 1920x1080+0+0 (normal left inverted right x axis y axis) 527mm x 296mm";
        assert_eq!(parse_output(output), Some(GEOMETRY));
    }

    #[test]
    fn current_mode_marker() {
        let output = "\
HDMI-1 connected (normal left inverted right x axis y axis)
   1920x1080     60.00*+  50.00
   1280x720      60.00";
        assert_eq!(parse_output(output), Some(GEOMETRY));
    }

    #[test]
    fn connected_line_without_primary() {
        let output = "VGA-1 connected 1920x1080+0+0 (normal left inverted right x axis y axis) 0mm x 0mm";
        assert_eq!(parse_output(output), Some(GEOMETRY));
    }

    #[test]
    fn all_shapes_agree() {
        let shapes = [
            "DP-1 connected primary 1920x1080+0+0 (normal) 527mm x 296mm",
            "eDP-1 connected 1920x1080+0+0 (normal) 310mm x 174mm",
            "   1920x1080     59.93*+  48.00",
        ];
        for shape in shapes {
            assert_eq!(parse_output(shape), Some(GEOMETRY), "shape: {shape}");
        }
    }

    #[test]
    fn disconnected_output_is_skipped() {
        // "disconnected" contains neither " connected" nor a parseable mode
        let output = "HDMI-2 disconnected (normal left inverted right x axis y axis)";
        assert_eq!(parse_output(output), None);
    }

    #[test]
    fn non_numeric_tokens_rejected() {
        assert_eq!(parse_mode_token("axbxc"), None);
        assert_eq!(parse_mode_token("x1080"), None);
        assert_eq!(parse_mode_token("1920x"), None);
        assert_eq!(parse_mode_token("1920x1080"), Some(GEOMETRY));
        assert_eq!(parse_mode_token("1920x1080+0+0"), Some(GEOMETRY));
    }

    #[test]
    fn zero_dimensions_rejected() {
        assert_eq!(parse_mode_token("0x1080"), None);
        assert_eq!(parse_mode_token("1920x0"), None);
    }

    #[test]
    fn empty_output_falls_through() {
        assert_eq!(parse_output(""), None);
    }

    #[test]
    fn primary_wins_over_other_connected_outputs() {
        let output = "\
HDMI-1 connected 1280x720+1920+0 (normal) 0mm x 0mm
DP-1 connected primary 1920x1080+0+0 (normal) 527mm x 296mm";
        assert_eq!(parse_output(output), Some(GEOMETRY));
    }

    #[test]
    fn resolve_prefers_tool_output_over_server() {
        let server = ScreenGeometry { width: 800, height: 600 };
        let output = "DP-1 connected primary 1920x1080+0+0 (normal)";
        assert_eq!(resolve(Some(output), server), Ok(GEOMETRY));
    }

    #[test]
    fn resolve_falls_back_to_server_report() {
        let server = ScreenGeometry { width: 800, height: 600 };
        assert_eq!(resolve(None, server), Ok(server));
        assert_eq!(resolve(Some("garbage"), server), Ok(server));
    }

    #[test]
    fn resolve_fails_when_everything_is_degenerate() {
        let zero = ScreenGeometry { width: 0, height: 0 };
        assert!(resolve(None, zero).is_err());
        assert!(resolve(Some(""), zero).is_err());
    }
}
