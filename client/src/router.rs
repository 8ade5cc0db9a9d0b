//! Role-gated routing: which dashboard variant the current identity gets,
//! and which menu entries it can see.

use shared::types::{Role, User};

use crate::session::SessionState;

// ---------------------------------------------------------------------------
// Views
// ---------------------------------------------------------------------------

/// Sub-views selectable from the dashboard menu. Local UI state only;
/// never persisted, defaulting to the overview on every fresh mount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewKey {
    #[default]
    Overview,
    Users,
    Students,
    Teachers,
    Departments,
    Courses,
    Stats,
}

// ---------------------------------------------------------------------------
// Routing
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardVariant {
    Admin,
    Teacher,
    Student,
}

/// Exactly one of these per render: loading while the session restores,
/// login when unauthenticated, denied for roles no dashboard accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Loading,
    Login,
    Denied,
    Dashboard(DashboardVariant),
}

pub fn route_for(state: SessionState, user: Option<&User>) -> Route {
    if state == SessionState::Loading {
        return Route::Loading;
    }

    match user {
        None => Route::Login,
        Some(u) => match u.role {
            Role::Admin => Route::Dashboard(DashboardVariant::Admin),
            Role::Teacher => Route::Dashboard(DashboardVariant::Teacher),
            Role::Student => Route::Dashboard(DashboardVariant::Student),
            Role::Unknown => Route::Denied,
        },
    }
}

// ---------------------------------------------------------------------------
// Menu
// ---------------------------------------------------------------------------

/// A statically tagged menu entry. General entries are visible to every
/// authenticated role; admin-only entries are filtered out unless the
/// current identity is an admin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuEntry {
    pub label: &'static str,
    pub view: ViewKey,
    pub admin_only: bool,
}

pub const MENU: &[MenuEntry] = &[
    MenuEntry {
        label: "Dashboard",
        view: ViewKey::Overview,
        admin_only: false,
    },
    MenuEntry {
        label: "Users",
        view: ViewKey::Users,
        admin_only: true,
    },
    MenuEntry {
        label: "Students",
        view: ViewKey::Students,
        admin_only: true,
    },
    MenuEntry {
        label: "Teachers",
        view: ViewKey::Teachers,
        admin_only: true,
    },
    MenuEntry {
        label: "Departments",
        view: ViewKey::Departments,
        admin_only: true,
    },
    MenuEntry {
        label: "Courses",
        view: ViewKey::Courses,
        admin_only: false,
    },
    MenuEntry {
        label: "Statistics",
        view: ViewKey::Stats,
        admin_only: true,
    },
];

/// Menu entries visible to `user`.
pub fn visible_menu(user: &User) -> Vec<&'static MenuEntry> {
    MENU.iter()
        .filter(|entry| !entry.admin_only || user.role == Role::Admin)
        .collect()
}
