//! Banner window
//!
//! One undecorated, always-on-top, workspace-sticky strip per screen edge.
//! The window is intentionally impossible to dismiss: the controller re-maps
//! it whenever an UnmapNotify arrives.

use anyhow::{Context, Result};
use tracing::{error, info};
use x11rb::connection::Connection;
use x11rb::protocol::xproto::*;
use x11rb::rust_connection::RustConnection;
use x11rb::wrapper::ConnectionExt as WrapperExt;

use crate::color::HexColor;
use crate::constants::{banner, x11};
use crate::font::Label;
use crate::probe::ScreenGeometry;
use crate::x11_utils::AppContext;

/// Screen edge a banner is docked to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    Top,
    Bottom,
}

impl Position {
    /// Window origin for this edge. The bottom strip sits at y = screen
    /// height, mirroring the original placement.
    pub fn origin(self, geometry: ScreenGeometry) -> (i16, i16) {
        match self {
            Position::Top => (0, 0),
            Position::Bottom => (0, i16::try_from(geometry.height).unwrap_or(i16::MAX)),
        }
    }
}

/// A live banner strip and the geometry snapshot used to size it
pub struct Banner<'a> {
    pub position: Position,
    pub window: Window,
    pub geometry: ScreenGeometry,
    gc: Gcontext,
    depth: u8,
    label: Option<Label>,
    conn: &'a RustConnection,
}

impl<'a> Banner<'a> {
    pub fn new(
        ctx: &AppContext<'a>,
        position: Position,
        geometry: ScreenGeometry,
        background: HexColor,
        label: Option<Label>,
    ) -> Result<Self> {
        let window = Self::create_window(ctx, position, geometry, background)?;

        // Destroy the window if any later setup step fails
        struct WindowGuard<'a> {
            conn: &'a RustConnection,
            window: Window,
            armed: bool,
        }
        impl Drop for WindowGuard<'_> {
            fn drop(&mut self) {
                if self.armed {
                    if let Err(e) = self.conn.destroy_window(self.window) {
                        error!(window = self.window, error = %e, "failed to clean up banner window after setup failure");
                    }
                    let _ = self.conn.flush();
                }
            }
        }
        let mut guard = WindowGuard {
            conn: ctx.conn,
            window,
            armed: true,
        };

        Self::setup_window_properties(ctx, window)?;

        let gc = ctx.conn.generate_id().context("Failed to generate GC ID")?;
        ctx.conn
            .create_gc(gc, window, &CreateGCAux::new())
            .context("Failed to create banner graphics context")?;

        ctx.conn
            .map_window(window)
            .with_context(|| format!("Failed to map {position:?} banner window"))?;
        info!(window, position = ?position, width = geometry.width, "mapped banner window");

        guard.armed = false;

        Ok(Self {
            position,
            window,
            geometry,
            gc,
            depth: ctx.screen.root_depth,
            label,
            conn: ctx.conn,
        })
    }

    fn create_window(
        ctx: &AppContext,
        position: Position,
        geometry: ScreenGeometry,
        background: HexColor,
    ) -> Result<Window> {
        let window = ctx
            .conn
            .generate_id()
            .context("Failed to generate X11 window ID")?;
        let (x, y) = position.origin(geometry);
        ctx.conn
            .create_window(
                ctx.screen.root_depth,
                window,
                ctx.screen.root,
                x,
                y,
                geometry.width,
                banner::STRIP_HEIGHT,
                0,
                WindowClass::INPUT_OUTPUT,
                ctx.screen.root_visual,
                &CreateWindowAux::new()
                    .background_pixel(background.pixel())
                    .event_mask(EventMask::STRUCTURE_NOTIFY | EventMask::EXPOSURE),
            )
            .with_context(|| format!("Failed to create {position:?} banner window"))?;
        Ok(window)
    }

    /// EWMH/Motif properties: undecorated, always-on-top, sticky, skipped by
    /// taskbar and pager, present on every desktop. Set before mapping so
    /// the window manager honors them from the first map.
    fn setup_window_properties(ctx: &AppContext, window: Window) -> Result<()> {
        let atoms = ctx.atoms;

        ctx.conn
            .change_property8(
                PropMode::REPLACE,
                window,
                AtomEnum::WM_NAME,
                AtomEnum::STRING,
                banner::WM_NAME,
            )
            .context("Failed to set WM_NAME")?;

        ctx.conn
            .change_property8(
                PropMode::REPLACE,
                window,
                AtomEnum::WM_CLASS,
                AtomEnum::STRING,
                banner::WM_CLASS,
            )
            .context("Failed to set WM_CLASS")?;

        // Motif hints: flags select the decorations field, decorations = 0
        ctx.conn
            .change_property32(
                PropMode::REPLACE,
                window,
                atoms.motif_wm_hints,
                atoms.motif_wm_hints,
                &[x11::MOTIF_HINTS_DECORATIONS, 0, 0, 0, 0],
            )
            .context("Failed to set _MOTIF_WM_HINTS")?;

        ctx.conn
            .change_property32(
                PropMode::REPLACE,
                window,
                atoms.net_wm_window_type,
                AtomEnum::ATOM,
                &[atoms.net_wm_window_type_dock],
            )
            .context("Failed to set _NET_WM_WINDOW_TYPE")?;

        ctx.conn
            .change_property32(
                PropMode::REPLACE,
                window,
                atoms.net_wm_state,
                AtomEnum::ATOM,
                &[
                    atoms.net_wm_state_above,
                    atoms.net_wm_state_sticky,
                    atoms.net_wm_state_skip_taskbar,
                    atoms.net_wm_state_skip_pager,
                ],
            )
            .context("Failed to set _NET_WM_STATE")?;

        ctx.conn
            .change_property32(
                PropMode::REPLACE,
                window,
                atoms.net_wm_desktop,
                AtomEnum::CARDINAL,
                &[x11::ALL_DESKTOPS],
            )
            .context("Failed to set _NET_WM_DESKTOP")?;

        Ok(())
    }

    /// Paint the centered label. Called on Expose; the background is handled
    /// by the window's background_pixel.
    pub fn draw(&self) -> Result<()> {
        let Some(label) = &self.label else {
            return Ok(());
        };
        let dst_x = ((self.geometry.width as i32 - label.width as i32) / 2) as i16;
        let dst_y = ((banner::STRIP_HEIGHT as i32 - label.height as i32) / 2) as i16;
        self.conn
            .put_image(
                ImageFormat::Z_PIXMAP,
                self.window,
                self.gc,
                label.width,
                label.height,
                dst_x,
                dst_y,
                0,
                self.depth,
                &label.data,
            )
            .with_context(|| format!("Failed to draw {:?} banner label", self.position))?;
        Ok(())
    }

    /// Re-present a hidden banner. A hide notification is treated as a
    /// restore command, never as dismissal.
    pub fn restore(&self) -> Result<()> {
        self.conn
            .map_window(self.window)
            .with_context(|| format!("Failed to re-map {:?} banner window", self.position))?;
        self.conn
            .configure_window(
                self.window,
                &ConfigureWindowAux::new().stack_mode(StackMode::ABOVE),
            )
            .with_context(|| format!("Failed to raise {:?} banner window", self.position))?;
        self.conn
            .flush()
            .context("Failed to flush X11 connection after banner restore")?;
        info!(window = self.window, position = ?self.position, "restored hidden banner");
        Ok(())
    }
}

impl Drop for Banner<'_> {
    fn drop(&mut self) {
        if let Err(e) = self.conn.free_gc(self.gc) {
            error!(gc = self.gc, error = %e, "failed to free banner GC");
        }
        if let Err(e) = self.conn.destroy_window(self.window) {
            error!(window = self.window, error = %e, "failed to destroy banner window");
        }
        if let Err(e) = self.conn.flush() {
            error!(error = %e, "failed to flush X11 connection during banner teardown");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn top_banner_sits_at_origin() {
        let geometry = ScreenGeometry {
            width: 1920,
            height: 1080,
        };
        assert_eq!(Position::Top.origin(geometry), (0, 0));
    }

    #[test]
    fn bottom_banner_sits_at_screen_height() {
        let geometry = ScreenGeometry {
            width: 1920,
            height: 1080,
        };
        assert_eq!(Position::Bottom.origin(geometry), (0, 1080));
    }
}
