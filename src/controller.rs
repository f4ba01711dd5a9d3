//! Banner lifecycle controller
//!
//! Drives the relaunch state machine: resolve configuration, probe geometry,
//! create one banner per enabled edge. Any display-change notification tears
//! every live banner down and repeats the full sequence; an unresolvable
//! geometry is fatal rather than risking a stale or wrongly sized banner.

use anyhow::{Context, Result};
use tracing::{error, info};
use x11rb::connection::Connection;
use x11rb::protocol::Event;

use crate::banner::{Banner, Position};
use crate::color::HexColor;
use crate::config::{self, Args};
use crate::constants::defaults;
use crate::font::{size_token_px, FontRenderer};
use crate::probe::{self, ScreenGeometry};
use crate::x11_utils::AppContext;

/// The set of live banners. At most one per edge; only the controller
/// mutates it. Dropping an entry destroys its window.
#[derive(Debug, Default)]
pub struct BannerSet<B> {
    top: Option<B>,
    bottom: Option<B>,
}

impl<B> BannerSet<B> {
    pub fn new() -> Self {
        Self {
            top: None,
            bottom: None,
        }
    }

    /// Destroy every live banner.
    pub fn clear(&mut self) {
        self.top = None;
        self.bottom = None;
    }

    /// Install a banner for an edge, destroying any prior instance first.
    pub fn set(&mut self, position: Position, banner: B) {
        let slot = match position {
            Position::Top => &mut self.top,
            Position::Bottom => &mut self.bottom,
        };
        slot.take();
        *slot = Some(banner);
    }

    pub fn len(&self) -> usize {
        self.top.is_some() as usize + self.bottom.is_some() as usize
    }

    pub fn get(&self, position: Position) -> Option<&B> {
        match position {
            Position::Top => self.top.as_ref(),
            Position::Bottom => self.bottom.as_ref(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &B> {
        self.top.iter().chain(self.bottom.iter())
    }
}

pub struct Controller<'a> {
    ctx: AppContext<'a>,
    args: Args,
    banners: BannerSet<Banner<'a>>,
    server_geometry: ScreenGeometry,
}

impl<'a> Controller<'a> {
    pub fn new(ctx: AppContext<'a>, args: Args) -> Self {
        let server_geometry = ScreenGeometry {
            width: ctx.screen.width_in_pixels,
            height: ctx.screen.height_in_pixels,
        };
        Self {
            ctx,
            args,
            banners: BannerSet::new(),
            server_geometry,
        }
    }

    /// Launch the banners and serve events until a fatal error. There is no
    /// normal-exit path; the process runs until externally terminated.
    pub fn run(&mut self) -> Result<()> {
        self.launch().context("initial banner launch failed")?;
        loop {
            let event = self
                .ctx
                .conn
                .wait_for_event()
                .context("lost X11 connection")?;
            self.handle_event(event)?;
        }
    }

    /// Full resolve → probe → create sequence. Used for startup and for
    /// every relaunch; existing banners are destroyed first so each edge
    /// ends up with exactly one fresh instance.
    fn launch(&mut self) -> Result<()> {
        self.banners.clear();

        let config = config::resolve(&self.args);
        info!(config = ?config, "resolved banner configuration");

        let geometry = probe::detect(self.server_geometry)
            .context("cannot size banners without a display geometry")?;
        info!(width = geometry.width, height = geometry.height, "probed display geometry");

        let fg = HexColor::parse_or(&config.fgcolor, defaults::FGCOLOR);
        let bg = HexColor::parse_or(&config.bgcolor, defaults::BGCOLOR);
        let label = match FontRenderer::load(&config.face, &config.weight, size_token_px(&config.size)) {
            Ok(renderer) => renderer.render_label(&config.message, fg, bg),
            Err(e) => {
                error!(error = %e, "banner text unavailable, showing color strip only");
                None
            }
        };

        if config.show_top {
            let banner = Banner::new(&self.ctx, Position::Top, geometry, bg, label.clone())?;
            self.banners.set(Position::Top, banner);
        }
        if config.show_bottom {
            let banner = Banner::new(&self.ctx, Position::Bottom, geometry, bg, label)?;
            self.banners.set(Position::Bottom, banner);
        }
        self.ctx
            .conn
            .flush()
            .context("Failed to flush X11 connection after banner launch")?;
        Ok(())
    }

    fn handle_event(&mut self, event: Event) -> Result<()> {
        match event {
            Event::RandrScreenChangeNotify(e) => {
                info!(
                    width = e.width,
                    height = e.height,
                    "display change notification, relaunching banners"
                );
                self.server_geometry = ScreenGeometry {
                    width: e.width,
                    height: e.height,
                };
                self.launch()
                    .context("banner relaunch after display change failed")?;
            }
            Event::UnmapNotify(e) => {
                if let Some(banner) = self.banners.iter().find(|b| b.window == e.window) {
                    banner.restore()?;
                }
            }
            Event::Expose(e) if e.count == 0 => {
                if let Some(banner) = self.banners.iter().find(|b| b.window == e.window) {
                    banner.draw()?;
                    self.ctx
                        .conn
                        .flush()
                        .context("Failed to flush X11 connection after banner redraw")?;
                }
            }
            _ => (),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Dummy handles stand in for banner windows; the set's structure is what
    // enforces the one-instance-per-edge invariant.
    fn relaunch(set: &mut BannerSet<u32>, show_top: bool, show_bottom: bool, serial: &mut u32) {
        set.clear();
        if show_top {
            *serial += 1;
            set.set(Position::Top, *serial);
        }
        if show_bottom {
            *serial += 1;
            set.set(Position::Bottom, *serial);
        }
    }

    #[test]
    fn relaunch_is_idempotent() {
        let mut set = BannerSet::new();
        let mut serial = 0;
        for _ in 0..5 {
            relaunch(&mut set, true, true, &mut serial);
            assert_eq!(set.len(), 2);
            assert!(set.get(Position::Top).is_some());
            assert!(set.get(Position::Bottom).is_some());
        }
    }

    #[test]
    fn relaunch_respects_show_flags() {
        let mut set = BannerSet::new();
        let mut serial = 0;
        for _ in 0..3 {
            relaunch(&mut set, true, false, &mut serial);
            assert_eq!(set.len(), 1);
            assert!(set.get(Position::Top).is_some());
            assert!(set.get(Position::Bottom).is_none());
        }
        relaunch(&mut set, false, false, &mut serial);
        assert_eq!(set.len(), 0);
    }

    #[test]
    fn relaunch_replaces_prior_instances() {
        let mut set = BannerSet::new();
        let mut serial = 0;
        relaunch(&mut set, true, true, &mut serial);
        let first_top = *set.get(Position::Top).unwrap();
        relaunch(&mut set, true, true, &mut serial);
        let second_top = *set.get(Position::Top).unwrap();
        assert_ne!(first_top, second_top);
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn set_replaces_without_accumulating() {
        let mut set = BannerSet::new();
        set.set(Position::Top, 1u32);
        set.set(Position::Top, 2u32);
        assert_eq!(set.len(), 1);
        assert_eq!(set.get(Position::Top), Some(&2));
    }

    #[test]
    fn iter_walks_live_banners() {
        let mut set = BannerSet::new();
        set.set(Position::Bottom, 7u32);
        assert_eq!(set.iter().copied().collect::<Vec<_>>(), vec![7]);
        set.set(Position::Top, 3u32);
        assert_eq!(set.iter().copied().collect::<Vec<_>>(), vec![3, 7]);
    }
}
