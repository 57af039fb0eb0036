//! X11 windowing through x11rb.
//!
//! [`X11Surface`] owns the bar and popup windows and implements [`Surface`];
//! [`EventPump`] reads the shared connection on a dedicated thread and turns
//! X events into [`WindowEvent`]s.

use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, warn};
use x11rb::connection::Connection;
use x11rb::properties::WmHints;
use x11rb::protocol::xproto::{
    AtomEnum, ChangeGCAux, ChangeWindowAttributesAux, Char2b, ConfigureWindowAux,
    ConnectionExt as _, CreateGCAux, CreateWindowAux, EventMask, Font, Gcontext, PropMode,
    Rectangle, StackMode, Window, WindowClass,
};
use x11rb::protocol::Event;
use x11rb::rust_connection::RustConnection;
use x11rb::wrapper::ConnectionExt as _;
use x11rb::COPY_DEPTH_FROM_PARENT;
use xbattbar_rs_core::{
    BarError, BarEvent, BarGeometry, PackedColor, Rect, ScreenEdge, Surface, Target,
    TextExtents, WindowEvent,
};

const WINDOW_NAME: &[u8] = b"xbattbar-rs";

/// `_MOTIF_WM_HINTS` with only the decorations flag set, and no decorations.
const MOTIF_NO_DECORATIONS: [u32; 5] = [2, 0, 0, 0, 0];

x11rb::atom_manager! {
    Atoms: AtomsCookie {
        _NET_WM_STRUT,
        _NET_WM_STRUT_PARTIAL,
        _NET_WM_STATE,
        _NET_WM_STATE_STICKY,
        _NET_WM_STATE_ABOVE,
        _NET_WM_WINDOW_TYPE,
        _NET_WM_WINDOW_TYPE_DOCK,
        _MOTIF_WM_HINTS,
    }
}

/// Pixel value for a 24-bit TrueColor visual.
fn pixel(color: PackedColor) -> u32 {
    color.to_argb() & 0x00ff_ffff
}

fn draw_error<E>(what: &'static str) -> impl FnOnce(E) -> BarError
where
    E: std::error::Error + Send + Sync + 'static,
{
    move |e| BarError::draw_with_source(what, e)
}

/// Connection to the X server and the screen the bar lives on.
pub struct X11Display {
    conn: Arc<RustConnection>,
    screen: usize,
}

impl X11Display {
    /// Connect to `$DISPLAY`.
    pub fn connect() -> Result<Self> {
        let (conn, screen) = x11rb::connect(None).context("Cannot open X display")?;
        Ok(Self {
            conn: Arc::new(conn),
            screen,
        })
    }

    /// Screen size in pixels as `(width, height)`.
    pub fn screen_size(&self) -> (u16, u16) {
        let screen = &self.conn.setup().roots[self.screen];
        (screen.width_in_pixels, screen.height_in_pixels)
    }
}

/// Bar and popup windows plus the graphics contexts used to paint them.
pub struct X11Surface {
    conn: Arc<RustConnection>,
    bar: Window,
    popup: Window,
    fill_gc: Gcontext,
    text_gc: Gcontext,
    font: Font,
}

impl X11Surface {
    /// Create and map the bar window and create the (unmapped) popup.
    pub fn create(display: &X11Display, geometry: &BarGeometry, font_name: &str) -> Result<Self> {
        let conn = Arc::clone(&display.conn);
        let screen = &conn.setup().roots[display.screen];
        let root = screen.root;
        let black = screen.black_pixel;
        let white = screen.white_pixel;

        let atoms = Atoms::new(conn.as_ref())
            .context("Failed to intern atoms")?
            .reply()
            .context("Failed to intern atoms")?;

        let bar = conn.generate_id()?;
        let area = geometry.window_rect();
        conn.create_window(
            COPY_DEPTH_FROM_PARENT,
            bar,
            root,
            area.x,
            area.y,
            area.width,
            area.height,
            0,
            WindowClass::INPUT_OUTPUT,
            0,
            &CreateWindowAux::new().background_pixel(black).event_mask(
                EventMask::EXPOSURE
                    | EventMask::ENTER_WINDOW
                    | EventMask::LEAVE_WINDOW
                    | EventMask::STRUCTURE_NOTIFY,
            ),
        )?;

        let popup = conn.generate_id()?;
        conn.create_window(
            COPY_DEPTH_FROM_PARENT,
            popup,
            root,
            0,
            0,
            1,
            1,
            1,
            WindowClass::INPUT_OUTPUT,
            0,
            &CreateWindowAux::new()
                .background_pixel(white)
                .border_pixel(black)
                .override_redirect(1)
                .event_mask(EventMask::EXPOSURE),
        )?;

        set_dock_properties(conn.as_ref(), &atoms, bar, geometry)?;

        let font = conn.generate_id()?;
        conn.open_font(font, font_name.as_bytes())?
            .check()
            .with_context(|| format!("Cannot open font {font_name}"))?;

        let fill_gc = conn.generate_id()?;
        conn.create_gc(fill_gc, bar, &CreateGCAux::new().foreground(black))?;
        let text_gc = conn.generate_id()?;
        conn.create_gc(
            text_gc,
            popup,
            &CreateGCAux::new().font(font).foreground(black).background(white),
        )?;

        conn.map_window(bar)?;
        conn.flush()?;
        debug!(?area, edge = %geometry.edge, "bar window mapped");

        Ok(Self {
            conn,
            bar,
            popup,
            fill_gc,
            text_gc,
            font,
        })
    }

    /// Event reader for the windows of this surface.
    pub fn event_pump(&self) -> EventPump {
        EventPump {
            conn: Arc::clone(&self.conn),
            bar: self.bar,
            popup: self.popup,
        }
    }

    fn window(&self, target: Target) -> Window {
        match target {
            Target::Bar => self.bar,
            Target::Popup => self.popup,
        }
    }
}

/// Reserve screen space for the bar and keep it above other windows,
/// undecorated, on every desktop, and out of the focus chain.
fn set_dock_properties(
    conn: &RustConnection,
    atoms: &Atoms,
    bar: Window,
    geometry: &BarGeometry,
) -> Result<()> {
    conn.change_property8(
        PropMode::REPLACE,
        bar,
        AtomEnum::WM_NAME,
        AtomEnum::STRING,
        WINDOW_NAME,
    )?;
    conn.change_property8(
        PropMode::REPLACE,
        bar,
        AtomEnum::WM_CLASS,
        AtomEnum::STRING,
        b"xbattbar-rs\0xbattbar-rs\0",
    )?;

    let strut = strut_partial(geometry);
    conn.change_property32(
        PropMode::REPLACE,
        bar,
        atoms._NET_WM_STRUT,
        AtomEnum::CARDINAL,
        &strut[..4],
    )?;
    conn.change_property32(
        PropMode::REPLACE,
        bar,
        atoms._NET_WM_STRUT_PARTIAL,
        AtomEnum::CARDINAL,
        &strut,
    )?;
    conn.change_property32(
        PropMode::REPLACE,
        bar,
        atoms._NET_WM_STATE,
        AtomEnum::ATOM,
        &[atoms._NET_WM_STATE_STICKY, atoms._NET_WM_STATE_ABOVE],
    )?;
    conn.change_property32(
        PropMode::REPLACE,
        bar,
        atoms._NET_WM_WINDOW_TYPE,
        AtomEnum::ATOM,
        &[atoms._NET_WM_WINDOW_TYPE_DOCK],
    )?;
    conn.change_property32(
        PropMode::REPLACE,
        bar,
        atoms._MOTIF_WM_HINTS,
        atoms._MOTIF_WM_HINTS,
        &MOTIF_NO_DECORATIONS,
    )?;

    let mut hints = WmHints::new();
    hints.input = Some(false);
    hints.set(conn, bar)?;
    Ok(())
}

/// `_NET_WM_STRUT_PARTIAL` values; the first four are `_NET_WM_STRUT`.
fn strut_partial(geometry: &BarGeometry) -> [u32; 12] {
    let thickness = u32::from(geometry.thickness);
    let width_end = u32::from(geometry.screen_width).saturating_sub(1);
    let height_end = u32::from(geometry.screen_height).saturating_sub(1);

    let mut strut = [0; 12];
    match geometry.edge {
        ScreenEdge::Left => {
            strut[0] = thickness;
            strut[5] = height_end;
        }
        ScreenEdge::Right => {
            strut[1] = thickness;
            strut[7] = height_end;
        }
        ScreenEdge::Top => {
            strut[2] = thickness;
            strut[9] = width_end;
        }
        ScreenEdge::Bottom => {
            strut[3] = thickness;
            strut[11] = width_end;
        }
    }
    strut
}

impl Surface for X11Surface {
    fn fill_rectangle(
        &mut self,
        target: Target,
        color: PackedColor,
        rect: Rect,
    ) -> xbattbar_rs_core::Result<()> {
        if rect.width == 0 || rect.height == 0 {
            return Ok(());
        }
        self.conn
            .change_gc(self.fill_gc, &ChangeGCAux::new().foreground(pixel(color)))
            .map_err(draw_error("change_gc"))?;
        self.conn
            .poly_fill_rectangle(
                self.window(target),
                self.fill_gc,
                &[Rectangle {
                    x: rect.x,
                    y: rect.y,
                    width: rect.width,
                    height: rect.height,
                }],
            )
            .map_err(draw_error("poly_fill_rectangle"))?;
        Ok(())
    }

    fn set_text_colors(
        &mut self,
        foreground: PackedColor,
        background: PackedColor,
    ) -> xbattbar_rs_core::Result<()> {
        let background = pixel(background);
        self.conn
            .change_gc(
                self.text_gc,
                &ChangeGCAux::new()
                    .foreground(pixel(foreground))
                    .background(background),
            )
            .map_err(draw_error("change_gc"))?;
        self.conn
            .change_window_attributes(
                self.popup,
                &ChangeWindowAttributesAux::new().background_pixel(background),
            )
            .map_err(draw_error("change_window_attributes"))?;
        Ok(())
    }

    fn measure_text(&mut self, text: &str) -> xbattbar_rs_core::Result<TextExtents> {
        let chars: Vec<Char2b> = text
            .bytes()
            .map(|byte| Char2b { byte1: 0, byte2: byte })
            .collect();
        let reply = self
            .conn
            .query_text_extents(self.font, &chars)
            .map_err(draw_error("query_text_extents"))?
            .reply()
            .map_err(draw_error("query_text_extents"))?;
        Ok(TextExtents {
            width: u16::try_from(reply.overall_width.max(0)).unwrap_or(u16::MAX),
            ascent: reply.font_ascent.max(0) as u16,
            descent: reply.font_descent.max(0) as u16,
        })
    }

    fn draw_text(
        &mut self,
        target: Target,
        x: i16,
        y: i16,
        text: &str,
    ) -> xbattbar_rs_core::Result<()> {
        let window = self.window(target);
        self.conn
            .clear_area(false, window, 0, 0, 0, 0)
            .map_err(draw_error("clear_area"))?;
        self.conn
            .image_text8(window, self.text_gc, x, y, text.as_bytes())
            .map_err(draw_error("image_text8"))?;
        Ok(())
    }

    fn resize_window(&mut self, target: Target, rect: Rect) -> xbattbar_rs_core::Result<()> {
        self.conn
            .configure_window(
                self.window(target),
                &ConfigureWindowAux::new()
                    .x(i32::from(rect.x))
                    .y(i32::from(rect.y))
                    .width(u32::from(rect.width))
                    .height(u32::from(rect.height)),
            )
            .map_err(draw_error("configure_window"))?;
        Ok(())
    }

    fn show_window(&mut self, target: Target) -> xbattbar_rs_core::Result<()> {
        let window = self.window(target);
        self.conn
            .map_window(window)
            .map_err(draw_error("map_window"))?;
        self.conn
            .configure_window(window, &ConfigureWindowAux::new().stack_mode(StackMode::ABOVE))
            .map_err(draw_error("configure_window"))?;
        Ok(())
    }

    fn hide_window(&mut self, target: Target) -> xbattbar_rs_core::Result<()> {
        self.conn
            .unmap_window(self.window(target))
            .map_err(draw_error("unmap_window"))?;
        Ok(())
    }

    fn flush(&mut self) -> xbattbar_rs_core::Result<()> {
        self.conn.flush().map_err(draw_error("flush"))
    }
}

impl Drop for X11Surface {
    fn drop(&mut self) {
        let _ = self.conn.free_gc(self.text_gc);
        let _ = self.conn.free_gc(self.fill_gc);
        let _ = self.conn.close_font(self.font);
        let _ = self.conn.destroy_window(self.popup);
        let _ = self.conn.destroy_window(self.bar);
        let _ = self.conn.flush();
    }
}

/// Blocking reader that forwards window events to the rendering task.
pub struct EventPump {
    conn: Arc<RustConnection>,
    bar: Window,
    popup: Window,
}

impl EventPump {
    /// Translate an X event into a bar event, if the bar cares about it.
    fn translate(&self, event: &Event) -> Option<WindowEvent> {
        match event {
            Event::EnterNotify(e) if e.event == self.bar => Some(WindowEvent::PointerEnter),
            Event::LeaveNotify(e) if e.event == self.bar => Some(WindowEvent::PointerLeave),
            Event::Expose(e) if e.count == 0 && (e.window == self.bar || e.window == self.popup) => {
                Some(WindowEvent::Expose)
            }
            Event::MapNotify(e) if e.window == self.bar => Some(WindowEvent::Map),
            _ => None,
        }
    }

    /// Read events until the connection fails or the receiver goes away.
    pub fn run(self, events: mpsc::Sender<BarEvent>) {
        loop {
            let event = match self.conn.wait_for_event() {
                Ok(event) => event,
                Err(e) => {
                    warn!("X connection lost: {}", e);
                    return;
                }
            };
            if let Event::Error(e) = &event {
                warn!("X protocol error: {:?}", e.error_kind);
                continue;
            }
            if let Some(window_event) = self.translate(&event) {
                if events.blocking_send(BarEvent::Window(window_event)).is_err() {
                    debug!("event channel closed, stopping X event reader");
                    return;
                }
            }
        }
    }
}
