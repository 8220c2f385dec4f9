//! X11 compositor backend
//!
//! Talks EWMH/ICCCM to whatever window manager owns the session: window
//! enumeration through `_NET_CLIENT_LIST`, per-window property reads, and
//! mutations as pager-sourced client messages on the root window. Close is
//! a hard `KillClient`, matching the contract's force-terminate semantics.

use anyhow::{anyhow, Context, Result};
use tracing::debug;
use x11rb::connection::Connection;
use x11rb::protocol::randr::ConnectionExt as _;
use x11rb::protocol::xproto::{
    Atom, AtomEnum, ClientMessageEvent, ConnectionExt, EventMask, Window,
};
use x11rb::rust_connection::RustConnection;

use crate::shared::{
    frame_type, layer, window_type, Capabilities, Geometry, MaximizeState, Rect, WindowSnapshot,
};

use super::CompositorPort;

/// `_NET_WM_DESKTOP` value for windows pinned to every workspace
const ALL_WORKSPACES: u32 = 0xFFFF_FFFF;

/// Source indication for EWMH client messages: 2 = pager / direct user tool
const SOURCE_PAGER: u32 = 2;

/// ICCCM iconic state for `WM_CHANGE_STATE`
const ICONIC_STATE: u32 = 3;

/// Holds all interned atoms this backend touches
#[derive(Debug)]
struct Atoms {
    net_client_list: Atom,
    net_current_desktop: Atom,
    net_active_window: Atom,
    net_wm_name: Atom,
    net_wm_desktop: Atom,
    net_wm_pid: Atom,
    net_frame_extents: Atom,
    net_workarea: Atom,
    net_moveresize_window: Atom,
    net_restack_window: Atom,
    net_wm_state: Atom,
    net_wm_state_maximized_horz: Atom,
    net_wm_state_maximized_vert: Atom,
    net_wm_state_hidden: Atom,
    net_wm_state_sticky: Atom,
    net_wm_state_above: Atom,
    net_wm_state_below: Atom,
    net_wm_window_type: Atom,
    net_wm_window_type_desktop: Atom,
    net_wm_window_type_dock: Atom,
    net_wm_window_type_toolbar: Atom,
    net_wm_window_type_menu: Atom,
    net_wm_window_type_utility: Atom,
    net_wm_window_type_splash: Atom,
    net_wm_window_type_dialog: Atom,
    net_wm_window_type_dropdown_menu: Atom,
    net_wm_window_type_popup_menu: Atom,
    net_wm_window_type_tooltip: Atom,
    net_wm_window_type_notification: Atom,
    net_wm_window_type_combo: Atom,
    net_wm_window_type_dnd: Atom,
    net_wm_allowed_actions: Atom,
    net_wm_action_move: Atom,
    net_wm_action_resize: Atom,
    net_wm_action_minimize: Atom,
    net_wm_action_shade: Atom,
    net_wm_action_maximize_horz: Atom,
    net_wm_action_maximize_vert: Atom,
    net_wm_action_close: Atom,
    wm_change_state: Atom,
    wm_window_role: Atom,
    utf8_string: Atom,
    gtk_application_id: Atom,
    gtk_unique_bus_name: Atom,
    gtk_window_object_path: Atom,
}

impl Atoms {
    /// Intern all required atoms
    fn new(conn: &RustConnection) -> Result<Self> {
        let intern = |name: &str| -> Result<Atom> {
            Ok(conn.intern_atom(false, name.as_bytes())?.reply()?.atom)
        };

        Ok(Self {
            net_client_list: intern("_NET_CLIENT_LIST")?,
            net_current_desktop: intern("_NET_CURRENT_DESKTOP")?,
            net_active_window: intern("_NET_ACTIVE_WINDOW")?,
            net_wm_name: intern("_NET_WM_NAME")?,
            net_wm_desktop: intern("_NET_WM_DESKTOP")?,
            net_wm_pid: intern("_NET_WM_PID")?,
            net_frame_extents: intern("_NET_FRAME_EXTENTS")?,
            net_workarea: intern("_NET_WORKAREA")?,
            net_moveresize_window: intern("_NET_MOVERESIZE_WINDOW")?,
            net_restack_window: intern("_NET_RESTACK_WINDOW")?,
            net_wm_state: intern("_NET_WM_STATE")?,
            net_wm_state_maximized_horz: intern("_NET_WM_STATE_MAXIMIZED_HORZ")?,
            net_wm_state_maximized_vert: intern("_NET_WM_STATE_MAXIMIZED_VERT")?,
            net_wm_state_hidden: intern("_NET_WM_STATE_HIDDEN")?,
            net_wm_state_sticky: intern("_NET_WM_STATE_STICKY")?,
            net_wm_state_above: intern("_NET_WM_STATE_ABOVE")?,
            net_wm_state_below: intern("_NET_WM_STATE_BELOW")?,
            net_wm_window_type: intern("_NET_WM_WINDOW_TYPE")?,
            net_wm_window_type_desktop: intern("_NET_WM_WINDOW_TYPE_DESKTOP")?,
            net_wm_window_type_dock: intern("_NET_WM_WINDOW_TYPE_DOCK")?,
            net_wm_window_type_toolbar: intern("_NET_WM_WINDOW_TYPE_TOOLBAR")?,
            net_wm_window_type_menu: intern("_NET_WM_WINDOW_TYPE_MENU")?,
            net_wm_window_type_utility: intern("_NET_WM_WINDOW_TYPE_UTILITY")?,
            net_wm_window_type_splash: intern("_NET_WM_WINDOW_TYPE_SPLASH")?,
            net_wm_window_type_dialog: intern("_NET_WM_WINDOW_TYPE_DIALOG")?,
            net_wm_window_type_dropdown_menu: intern("_NET_WM_WINDOW_TYPE_DROPDOWN_MENU")?,
            net_wm_window_type_popup_menu: intern("_NET_WM_WINDOW_TYPE_POPUP_MENU")?,
            net_wm_window_type_tooltip: intern("_NET_WM_WINDOW_TYPE_TOOLTIP")?,
            net_wm_window_type_notification: intern("_NET_WM_WINDOW_TYPE_NOTIFICATION")?,
            net_wm_window_type_combo: intern("_NET_WM_WINDOW_TYPE_COMBO")?,
            net_wm_window_type_dnd: intern("_NET_WM_WINDOW_TYPE_DND")?,
            net_wm_allowed_actions: intern("_NET_WM_ALLOWED_ACTIONS")?,
            net_wm_action_move: intern("_NET_WM_ACTION_MOVE")?,
            net_wm_action_resize: intern("_NET_WM_ACTION_RESIZE")?,
            net_wm_action_minimize: intern("_NET_WM_ACTION_MINIMIZE")?,
            net_wm_action_shade: intern("_NET_WM_ACTION_SHADE")?,
            net_wm_action_maximize_horz: intern("_NET_WM_ACTION_MAXIMIZE_HORZ")?,
            net_wm_action_maximize_vert: intern("_NET_WM_ACTION_MAXIMIZE_VERT")?,
            net_wm_action_close: intern("_NET_WM_ACTION_CLOSE")?,
            wm_change_state: intern("WM_CHANGE_STATE")?,
            wm_window_role: intern("WM_WINDOW_ROLE")?,
            utf8_string: intern("UTF8_STRING")?,
            gtk_application_id: intern("_GTK_APPLICATION_ID")?,
            gtk_unique_bus_name: intern("_GTK_UNIQUE_BUS_NAME")?,
            gtk_window_object_path: intern("_GTK_WINDOW_OBJECT_PATH")?,
        })
    }
}

/// Root-window context gathered once per enumeration pass
struct EnumContext {
    active_window: Option<Window>,
    active_workspace: u32,
    monitors: Vec<Rect>,
}

pub struct X11Port {
    conn: RustConnection,
    root: Window,
    atoms: Atoms,
    display: String,
    screen_size: (u32, u32),
}

impl X11Port {
    /// Connect to the X server named by `$DISPLAY`
    pub fn connect() -> Result<Self> {
        let (conn, screen_num) = x11rb::connect(None).context("Failed to connect to X server")?;
        let screen = &conn.setup().roots[screen_num];
        let root = screen.root;
        let screen_size = (
            u32::from(screen.width_in_pixels),
            u32::from(screen.height_in_pixels),
        );
        let atoms = Atoms::new(&conn)?;
        let display_name = std::env::var("DISPLAY").unwrap_or_else(|_| ":0".into());

        debug!("Connected to X server on {} (root 0x{:x})", display_name, root);

        Ok(Self {
            conn,
            root,
            atoms,
            display: display_name,
            screen_size,
        })
    }

    // -- property helpers ----------------------------------------------

    fn get_cardinals(&self, window: Window, property: Atom) -> Result<Vec<u32>> {
        let reply = self
            .conn
            .get_property(false, window, property, AtomEnum::ANY, 0, u32::MAX)?
            .reply()?;
        Ok(reply.value32().map(|v| v.collect()).unwrap_or_default())
    }

    fn get_cardinal(&self, window: Window, property: Atom) -> Result<Option<u32>> {
        Ok(self.get_cardinals(window, property)?.first().copied())
    }

    fn get_atom_list(&self, window: Window, property: Atom) -> Result<Vec<Atom>> {
        self.get_cardinals(window, property)
    }

    fn get_string(&self, window: Window, property: Atom) -> Result<Option<String>> {
        let reply = self
            .conn
            .get_property(false, window, property, AtomEnum::ANY, 0, u32::MAX)?
            .reply()?;
        if reply.value.is_empty() {
            return Ok(None);
        }
        let text = String::from_utf8_lossy(&reply.value)
            .trim_end_matches('\0')
            .to_string();
        Ok(Some(text))
    }

    /// WM_CLASS carries "instance\0class\0"
    fn get_wm_class(&self, window: Window) -> Result<(Option<String>, Option<String>)> {
        let reply = self
            .conn
            .get_property(false, window, AtomEnum::WM_CLASS, AtomEnum::STRING, 0, u32::MAX)?
            .reply()?;
        let mut parts = reply
            .value
            .split(|&b| b == 0)
            .filter(|chunk| !chunk.is_empty())
            .map(|chunk| String::from_utf8_lossy(chunk).to_string());
        let instance = parts.next();
        let class = parts.next();
        Ok((instance, class))
    }

    /// Frame geometry: client rect in root coordinates, widened by
    /// `_NET_FRAME_EXTENTS` when the WM reparents.
    fn frame_geometry(&self, window: Window) -> Result<Geometry> {
        let geom = self.conn.get_geometry(window)?.reply()?;
        let abs = self
            .conn
            .translate_coordinates(window, self.root, 0, 0)?
            .reply()?;
        let extents = self.get_cardinals(window, self.atoms.net_frame_extents)?;
        let (left, right, top, bottom) = match extents.as_slice() {
            [l, r, t, b, ..] => (*l as i32, *r as i32, *t as i32, *b as i32),
            _ => (0, 0, 0, 0),
        };
        Ok(Geometry::new(
            i32::from(abs.dst_x) - left,
            i32::from(abs.dst_y) - top,
            u32::from(geom.width) + (left + right) as u32,
            u32::from(geom.height) + (top + bottom) as u32,
        ))
    }

    fn window_type_code(&self, window: Window) -> Result<u32> {
        let types = self.get_atom_list(window, self.atoms.net_wm_window_type)?;
        let Some(&first) = types.first() else {
            return Ok(window_type::NORMAL);
        };
        let a = &self.atoms;
        Ok(if first == a.net_wm_window_type_desktop {
            window_type::DESKTOP
        } else if first == a.net_wm_window_type_dock {
            window_type::DOCK
        } else if first == a.net_wm_window_type_dialog {
            window_type::DIALOG
        } else if first == a.net_wm_window_type_toolbar {
            window_type::TOOLBAR
        } else if first == a.net_wm_window_type_menu {
            window_type::MENU
        } else if first == a.net_wm_window_type_utility {
            window_type::UTILITY
        } else if first == a.net_wm_window_type_splash {
            window_type::SPLASHSCREEN
        } else if first == a.net_wm_window_type_dropdown_menu {
            window_type::DROPDOWN_MENU
        } else if first == a.net_wm_window_type_popup_menu {
            window_type::POPUP_MENU
        } else if first == a.net_wm_window_type_tooltip {
            window_type::TOOLTIP
        } else if first == a.net_wm_window_type_notification {
            window_type::NOTIFICATION
        } else if first == a.net_wm_window_type_combo {
            window_type::COMBO
        } else if first == a.net_wm_window_type_dnd {
            window_type::DND
        } else {
            window_type::NORMAL
        })
    }

    fn capabilities(&self, window: Window) -> Result<Capabilities> {
        let actions = self.get_atom_list(window, self.atoms.net_wm_allowed_actions)?;
        if actions.is_empty() {
            // No hint set; assume a fully manageable window
            return Ok(Capabilities::default());
        }
        let has = |atom: Atom| actions.contains(&atom);
        let a = &self.atoms;
        Ok(Capabilities {
            movable: has(a.net_wm_action_move),
            resizable: has(a.net_wm_action_resize),
            closable: has(a.net_wm_action_close),
            can_maximize: has(a.net_wm_action_maximize_horz) && has(a.net_wm_action_maximize_vert),
            can_minimize: has(a.net_wm_action_minimize),
            can_shade: has(a.net_wm_action_shade),
        })
    }

    fn enum_context(&self) -> Result<EnumContext> {
        let active_window = self
            .get_cardinal(self.root, self.atoms.net_active_window)?
            .filter(|&w| w != 0);
        let active_workspace = self
            .get_cardinal(self.root, self.atoms.net_current_desktop)?
            .unwrap_or(0);
        let monitors = self.monitor_rects()?;
        Ok(EnumContext {
            active_window,
            active_workspace,
            monitors,
        })
    }

    fn monitor_rects(&self) -> Result<Vec<Rect>> {
        let reply = self.conn.randr_get_monitors(self.root, true)?.reply()?;
        let mut rects: Vec<Rect> = reply
            .monitors
            .iter()
            .map(|m| {
                Rect::new(
                    i32::from(m.x),
                    i32::from(m.y),
                    u32::from(m.width),
                    u32::from(m.height),
                )
            })
            .collect();
        if rects.is_empty() {
            rects.push(Rect::new(0, 0, self.screen_size.0, self.screen_size.1));
        }
        Ok(rects)
    }

    fn monitor_at(monitors: &[Rect], x: i32, y: i32) -> u32 {
        monitors
            .iter()
            .position(|m| {
                x >= m.x && x < m.x + m.width as i32 && y >= m.y && y < m.y + m.height as i32
            })
            .unwrap_or(0) as u32
    }

    /// Read one window's full attribute set. Fails if the window vanished
    /// since enumeration; callers treat that as an ordinary race and skip.
    fn snapshot(&self, window: Window, ctx: &EnumContext) -> Result<WindowSnapshot> {
        let geometry = self.frame_geometry(window)?;

        let title = self
            .get_string(window, self.atoms.net_wm_name)?
            .or(self.get_string(window, AtomEnum::WM_NAME.into())?)
            .unwrap_or_default();
        let (wm_class_instance, wm_class) = self.get_wm_class(window)?;

        let state = self.get_atom_list(window, self.atoms.net_wm_state)?;
        let has_state = |atom: Atom| state.contains(&atom);
        let a = &self.atoms;

        let desktop = self.get_cardinal(window, a.net_wm_desktop)?;
        let sticky = has_state(a.net_wm_state_sticky) || desktop == Some(ALL_WORKSPACES);
        let workspace = desktop.filter(|&d| d != ALL_WORKSPACES);

        let kind = self.window_type_code(window)?;
        let win_layer = if kind == window_type::DESKTOP {
            layer::DESKTOP
        } else if kind == window_type::DOCK || has_state(a.net_wm_state_above) {
            layer::TOP
        } else if has_state(a.net_wm_state_below) {
            layer::BOTTOM
        } else {
            layer::NORMAL
        };

        let center_x = geometry.x + geometry.width as i32 / 2;
        let center_y = geometry.y + geometry.height as i32 / 2;

        Ok(WindowSnapshot {
            id: window,
            title,
            geometry,
            minimized: has_state(a.net_wm_state_hidden),
            maximized: MaximizeState {
                horizontal: has_state(a.net_wm_state_maximized_horz),
                vertical: has_state(a.net_wm_state_maximized_vert),
            },
            workspace,
            sticky,
            focused: ctx.active_window == Some(window),
            layer: win_layer,
            monitor: Self::monitor_at(&ctx.monitors, center_x, center_y),
            window_type: kind,
            frame_type: match kind {
                window_type::DIALOG | window_type::MODAL_DIALOG => frame_type::DIALOG,
                window_type::UTILITY => frame_type::UTILITY,
                window_type::MENU => frame_type::MENU,
                _ => frame_type::NORMAL,
            },
            pid: self.get_cardinal(window, a.net_wm_pid)?.unwrap_or(0) as i32,
            wm_class,
            wm_class_instance,
            role: self.get_string(window, a.wm_window_role)?,
            gtk_app_id: self.get_string(window, a.gtk_application_id)?,
            gtk_bus_name: self.get_string(window, a.gtk_unique_bus_name)?,
            gtk_obj_path: self.get_string(window, a.gtk_window_object_path)?,
            capabilities: self.capabilities(window)?,
        })
    }

    /// Send a pager-sourced client message to the root window
    fn send_root_message(&self, window: Window, message_type: Atom, data: [u32; 5]) -> Result<()> {
        let event = ClientMessageEvent::new(32, window, message_type, data);
        self.conn.send_event(
            false,
            self.root,
            EventMask::SUBSTRUCTURE_REDIRECT | EventMask::SUBSTRUCTURE_NOTIFY,
            event,
        )?;
        self.conn.flush()?;
        Ok(())
    }

    /// `_NET_WM_STATE` add/remove for up to two state atoms
    fn change_state(&self, window: Window, add: bool, first: Atom, second: Atom) -> Result<()> {
        let action = if add { 1 } else { 0 };
        self.send_root_message(
            window,
            self.atoms.net_wm_state,
            [action, first, second, SOURCE_PAGER, 0],
        )
    }

    fn workarea_rect(&self) -> Result<Rect> {
        let workspace = self
            .get_cardinal(self.root, self.atoms.net_current_desktop)?
            .unwrap_or(0) as usize;
        let values = self.get_cardinals(self.root, self.atoms.net_workarea)?;
        let entry = values.chunks_exact(4).nth(workspace).or_else(|| {
            // Some WMs only publish the first desktop's entry
            values.chunks_exact(4).next()
        });
        match entry {
            Some([x, y, w, h]) => Ok(Rect::new(*x as i32, *y as i32, *w, *h)),
            _ => Ok(Rect::new(0, 0, self.screen_size.0, self.screen_size.1)),
        }
    }
}

impl CompositorPort for X11Port {
    fn windows(&self) -> Result<Vec<WindowSnapshot>> {
        let ctx = self.enum_context()?;
        let clients = self.get_cardinals(self.root, self.atoms.net_client_list)?;
        let mut snapshots = Vec::with_capacity(clients.len());
        for client in clients {
            match self.snapshot(client, &ctx) {
                Ok(snapshot) => snapshots.push(snapshot),
                // Window closed between enumeration and the property reads
                Err(e) => debug!("Skipping window 0x{:x}: {}", client, e),
            }
        }
        Ok(snapshots)
    }

    fn active_workspace(&self) -> Result<u32> {
        Ok(self
            .get_cardinal(self.root, self.atoms.net_current_desktop)?
            .unwrap_or(0))
    }

    fn current_monitor(&self) -> Result<u32> {
        let pointer = self.conn.query_pointer(self.root)?.reply()?;
        let monitors = self.monitor_rects()?;
        Ok(Self::monitor_at(
            &monitors,
            i32::from(pointer.root_x),
            i32::from(pointer.root_y),
        ))
    }

    fn work_area(&self, monitor: u32) -> Result<Rect> {
        let monitors = self.monitor_rects()?;
        let rect = monitors
            .get(monitor as usize)
            .ok_or_else(|| anyhow!("no monitor {monitor}"))?;
        Ok(self.workarea_rect()?.intersect(rect))
    }

    fn work_area_all_monitors(&self) -> Result<Rect> {
        self.workarea_rect()
    }

    fn display_name(&self) -> String {
        self.display.clone()
    }

    fn move_resize_frame(&self, id: u32, geometry: Geometry) -> Result<()> {
        // Gravity NorthWest, x/y/w/h all present, pager source
        let flags = 1 | (0xF << 8) | (SOURCE_PAGER << 12);
        self.send_root_message(
            id,
            self.atoms.net_moveresize_window,
            [
                flags,
                geometry.x as u32,
                geometry.y as u32,
                geometry.width,
                geometry.height,
            ],
        )
    }

    fn set_workspace(&self, id: u32, index: u32) -> Result<()> {
        self.send_root_message(id, self.atoms.net_wm_desktop, [index, SOURCE_PAGER, 0, 0, 0])
    }

    fn maximize(&self, id: u32) -> Result<()> {
        self.change_state(
            id,
            true,
            self.atoms.net_wm_state_maximized_horz,
            self.atoms.net_wm_state_maximized_vert,
        )
    }

    fn unmaximize(&self, id: u32) -> Result<()> {
        self.change_state(
            id,
            false,
            self.atoms.net_wm_state_maximized_horz,
            self.atoms.net_wm_state_maximized_vert,
        )
    }

    fn minimize(&self, id: u32) -> Result<()> {
        self.send_root_message(id, self.atoms.wm_change_state, [ICONIC_STATE, 0, 0, 0, 0])
    }

    fn unminimize(&self, id: u32) -> Result<()> {
        // De-iconify without stealing focus: mapping the client is the
        // ICCCM way to leave iconic state.
        self.conn.map_window(id)?;
        self.conn.flush()?;
        Ok(())
    }

    fn raise(&self, id: u32) -> Result<()> {
        // detail 0 = Above, no sibling
        self.send_root_message(id, self.atoms.net_restack_window, [SOURCE_PAGER, 0, 0, 0, 0])
    }

    fn activate(&self, id: u32) -> Result<()> {
        self.send_root_message(id, self.atoms.net_active_window, [SOURCE_PAGER, 0, 0, 0, 0])
    }

    fn set_sticky(&self, id: u32, sticky: bool) -> Result<()> {
        self.change_state(id, sticky, self.atoms.net_wm_state_sticky, 0)
    }

    fn kill(&self, id: u32) -> Result<()> {
        self.conn.kill_client(id)?;
        self.conn.flush()?;
        Ok(())
    }
}
