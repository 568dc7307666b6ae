//! Admin dashboard core: list views, row menus, forms, the API client and
//! sign-in state. Rendering lives elsewhere; everything here is plain state
//! driven by awaited calls.

pub mod action_menu;
pub mod auth_gate;
pub mod client;
pub mod form;
pub mod forms;
pub mod list_view;
pub mod resources;
pub mod screen;
pub mod shell;

pub use auth_gate::{AuthGate, FileStorage, LocalStorage, MemoryStorage};
pub use client::{ApiClient, ClientConfig, ClientError, ResourceClient, TokenStore};
pub use screen::{ManagementScreen, Outcome, PublicForm};
pub use shell::{DashboardShell, Screen, Section};
