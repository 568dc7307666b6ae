//! Section switcher for the dashboard. Exactly one section is mounted, and the
//! mounted screen carries the shell's theme flag.

use async_trait::async_trait;
use std::any::Any;
use std::collections::HashMap;

use super::client::ApiClient;
use super::form::Identified;
use super::list_view::Searchable;
use super::screen::{ManagementScreen, ResourceApi};
use crate::models::{
    AdminUser, Application, Career, ContactMessage, InvestmentInquiry, Project, Service,
    TeamMember,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Section {
    #[default]
    Overview,
    Services,
    Portfolio,
    Careers,
    Applications,
    Team,
    Investments,
    Contacts,
    Admins,
    Settings,
}

impl Section {
    pub const ALL: [Section; 10] = [
        Section::Overview,
        Section::Services,
        Section::Portfolio,
        Section::Careers,
        Section::Applications,
        Section::Team,
        Section::Investments,
        Section::Contacts,
        Section::Admins,
        Section::Settings,
    ];

    pub fn id(self) -> &'static str {
        match self {
            Section::Overview => "overview",
            Section::Services => "services",
            Section::Portfolio => "portfolio",
            Section::Careers => "careers",
            Section::Applications => "applications",
            Section::Team => "team",
            Section::Investments => "investments",
            Section::Contacts => "contacts",
            Section::Admins => "admins",
            Section::Settings => "settings",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Section::Overview => "Overview",
            Section::Services => "Services",
            Section::Portfolio => "Portfolio",
            Section::Careers => "Careers",
            Section::Applications => "Applications",
            Section::Team => "Team",
            Section::Investments => "Investments",
            Section::Contacts => "Contacts",
            Section::Admins => "Admin Users",
            Section::Settings => "Settings",
        }
    }

    /// Unknown ids land on the overview.
    pub fn from_id(id: &str) -> Section {
        Section::ALL
            .into_iter()
            .find(|s| s.id() == id)
            .unwrap_or_default()
    }
}

/// The part of a section screen the shell drives.
#[async_trait]
pub trait Screen: Send {
    fn dark_mode(&self) -> bool;
    fn set_dark_mode(&mut self, dark_mode: bool);
    async fn load(&mut self);
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

#[async_trait]
impl<T, A> Screen for ManagementScreen<T, A>
where
    T: Searchable + Identified + Send + 'static,
    A: ResourceApi<T> + 'static,
{
    fn dark_mode(&self) -> bool {
        ManagementScreen::dark_mode(self)
    }

    fn set_dark_mode(&mut self, dark_mode: bool) {
        ManagementScreen::set_dark_mode(self, dark_mode)
    }

    async fn load(&mut self) {
        ManagementScreen::load(self).await
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

pub type ScreenFactory = Box<dyn Fn() -> Box<dyn Screen> + Send + Sync>;

#[derive(Default)]
pub struct DashboardShell {
    active: Section,
    dark_mode: bool,
    screens: HashMap<Section, ScreenFactory>,
    mounted: Option<Box<dyn Screen>>,
}

impl DashboardShell {
    pub fn new(dark_mode: bool) -> Self {
        Self {
            dark_mode,
            ..Self::default()
        }
    }

    /// A shell with a management screen for every resource section.
    pub fn standard(api: &ApiClient, dark_mode: bool) -> Self {
        let mut shell = Self::new(dark_mode);
        shell.register_resource::<Service>(Section::Services, api);
        shell.register_resource::<Project>(Section::Portfolio, api);
        shell.register_resource::<Career>(Section::Careers, api);
        shell.register_resource::<Application>(Section::Applications, api);
        shell.register_resource::<TeamMember>(Section::Team, api);
        shell.register_resource::<InvestmentInquiry>(Section::Investments, api);
        shell.register_resource::<ContactMessage>(Section::Contacts, api);
        shell.register_resource::<AdminUser>(Section::Admins, api);
        shell
    }

    fn register_resource<T>(&mut self, section: Section, api: &ApiClient)
    where
        T: super::resources::Resource + Searchable + Identified,
    {
        let api = api.clone();
        self.register(section, move || {
            Box::new(ManagementScreen::new(api.resource::<T>())) as Box<dyn Screen>
        });
    }

    /// Replaces the screen built for `section`. Sections without one
    /// (overview, settings) mount nothing.
    pub fn register<F>(&mut self, section: Section, factory: F)
    where
        F: Fn() -> Box<dyn Screen> + Send + Sync + 'static,
    {
        self.screens.insert(section, Box::new(factory));
        if self.active == section {
            self.remount();
        }
    }

    pub fn active_section(&self) -> Section {
        self.active
    }

    /// Unmounts the current screen and mounts a fresh one for `id`.
    pub fn set_active_section(&mut self, id: &str) -> Section {
        self.active = Section::from_id(id);
        self.remount();
        tracing::debug!(section = self.active.id(), "Dashboard section changed");
        self.active
    }

    /// Switches section and fetches the new screen's collection.
    pub async fn activate(&mut self, id: &str) -> Section {
        let section = self.set_active_section(id);
        if let Some(screen) = self.mounted.as_mut() {
            screen.load().await;
        }
        section
    }

    pub fn dark_mode(&self) -> bool {
        self.dark_mode
    }

    pub fn toggle_dark_mode(&mut self) -> bool {
        self.dark_mode = !self.dark_mode;
        if let Some(screen) = self.mounted.as_mut() {
            screen.set_dark_mode(self.dark_mode);
        }
        self.dark_mode
    }

    pub fn mounted(&self) -> Option<&dyn Screen> {
        self.mounted.as_deref()
    }

    pub fn mounted_mut(&mut self) -> Option<&mut (dyn Screen + 'static)> {
        self.mounted.as_deref_mut()
    }

    fn remount(&mut self) {
        self.mounted = self.screens.get(&self.active).map(|factory| {
            let mut screen = factory();
            screen.set_dark_mode(self.dark_mode);
            screen
        });
    }
}
