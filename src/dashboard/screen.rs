//! One management screen per resource: fetch the collection, derive the
//! visible page, run row actions and form saves, then re-fetch.
//!
//! Screens talk to the API through the async seams below, so the HTTP
//! client and in-memory fakes are interchangeable.

use async_trait::async_trait;
use uuid::Uuid;

use super::action_menu::ActionMenu;
use super::client::ClientError;
use super::form::{FormController, FormModel, FormRecord, Identified, Submission};
use super::list_view::{ListState, PageView, Searchable};
use crate::models::{Application, ApplicationStatus};

#[async_trait]
pub trait ResourceApi<T: Send + 'static>: Send + Sync {
    async fn list(&self) -> Result<Vec<T>, ClientError>;
    async fn remove(&self, id: Uuid) -> Result<(), ClientError>;
}

#[async_trait]
pub trait EditApi<T: FormModel + Send + 'static>: ResourceApi<T> {
    /// Creates or updates, depending on the submission target.
    async fn save(&self, submission: Submission<T::Payload>) -> Result<(), ClientError>;
}

#[async_trait]
pub trait ReviewApi: ResourceApi<Application> {
    async fn set_status(&self, id: Uuid, status: ApplicationStatus) -> Result<(), ClientError>;
}

/// Unauthenticated submission of a public site form.
#[async_trait]
pub trait PublicSubmit<M: FormModel>: Send + Sync {
    async fn submit(&self, submission: Submission<M::Payload>) -> Result<(), ClientError>;
}

/// The yes/no prompt shown before a destructive action.
pub trait Confirm {
    fn confirm(&self, message: &str) -> bool;
}

impl<F: Fn(&str) -> bool> Confirm for F {
    fn confirm(&self, message: &str) -> bool {
        self(message)
    }
}

pub const DELETE_PROMPT: &str = "Are you sure you want to delete this item?";
pub const ACCEPT_PROMPT: &str = "Accept this application?";
pub const REJECT_PROMPT: &str = "Reject this application?";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The prompt was declined; nothing was sent.
    Cancelled,
    Done,
    Failed(String),
}

pub struct ManagementScreen<T, A> {
    api: A,
    items: Vec<T>,
    list: ListState,
    menu: ActionMenu<Uuid>,
    form: FormController<T>,
    loading: bool,
    error: Option<String>,
    viewing: Option<Uuid>,
    dark_mode: bool,
}

impl<T, A> ManagementScreen<T, A>
where
    T: Searchable + Identified + Send + 'static,
    A: ResourceApi<T>,
{
    pub fn new(api: A) -> Self {
        Self {
            api,
            items: Vec::new(),
            list: ListState::default(),
            menu: ActionMenu::new(),
            form: FormController::default(),
            loading: false,
            error: None,
            viewing: None,
            dark_mode: false,
        }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn list_state(&self) -> &ListState {
        &self.list
    }

    pub fn menu(&self) -> &ActionMenu<Uuid> {
        &self.menu
    }

    pub fn menu_mut(&mut self) -> &mut ActionMenu<Uuid> {
        &mut self.menu
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Inline banner text of the last failed fetch or action.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn dark_mode(&self) -> bool {
        self.dark_mode
    }

    pub fn set_dark_mode(&mut self, dark_mode: bool) {
        self.dark_mode = dark_mode;
    }

    /// Replaces the local collection with a full fetch and pulls the page
    /// back inside range.
    pub async fn load(&mut self) {
        self.loading = true;
        match self.api.list().await {
            Ok(items) => {
                self.items = items;
                self.error = None;
                let total_pages = self.list.apply(&self.items).total_pages;
                self.list.clamp(total_pages);
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load collection");
                self.error = Some(e.to_string());
            }
        }
        self.loading = false;
    }

    pub fn view(&self) -> PageView<&T> {
        self.list.apply(&self.items)
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.list.set_query(query);
    }

    pub fn set_page(&mut self, page: usize) {
        self.list.set_page(page);
    }

    fn find(&self, id: Uuid) -> Option<&T> {
        self.items.iter().find(|item| item.record_id() == id)
    }

    /// Opens the read-only detail view. Returns `false` for an unknown id.
    pub fn view_record(&mut self, id: Uuid) -> bool {
        self.menu.close_all();
        self.viewing = self.find(id).map(|item| item.record_id());
        self.viewing.is_some()
    }

    pub fn viewing(&self) -> Option<&T> {
        self.viewing.and_then(|id| self.find(id))
    }

    pub fn close_view(&mut self) {
        self.viewing = None;
    }

    pub async fn delete(&mut self, id: Uuid, confirm: impl Confirm) -> Outcome {
        self.menu.close_all();
        if !confirm.confirm(DELETE_PROMPT) {
            return Outcome::Cancelled;
        }
        let result = self.api.remove(id).await;
        self.after_mutation(result).await
    }

    async fn after_mutation(&mut self, result: Result<(), ClientError>) -> Outcome {
        match result {
            Ok(()) => {
                self.load().await;
                Outcome::Done
            }
            Err(e) => {
                let message = e.to_string();
                self.error = Some(message.clone());
                Outcome::Failed(message)
            }
        }
    }
}

impl<T, A> ManagementScreen<T, A>
where
    T: Searchable + Identified + FormModel + Send + 'static,
    A: EditApi<T>,
{
    pub fn form(&self) -> &FormController<T> {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut FormController<T> {
        &mut self.form
    }

    pub fn open_create(&mut self) {
        self.menu.close_all();
        self.form.open_blank();
    }

    /// Validates, saves, then re-fetches and closes. Any failure leaves the
    /// draft in place with the message attached to the form.
    pub async fn submit_form(&mut self) -> Outcome {
        let submission = match self.form.submit() {
            Ok(submission) => submission,
            Err(e) => return Outcome::Failed(e.to_string()),
        };
        match self.api.save(submission).await {
            Ok(()) => {
                self.form.succeed();
                self.load().await;
                Outcome::Done
            }
            Err(e) => {
                let message = e.to_string();
                self.form.fail(message.clone());
                Outcome::Failed(message)
            }
        }
    }
}

/// Editing needs a record that can seed the form; create-only resources
/// (admin users) have no `open_edit`.
impl<T, A> ManagementScreen<T, A>
where
    T: Searchable + FormRecord + Send + 'static,
    A: EditApi<T>,
{
    /// Seeds the form from the stored record. Returns `false` for an unknown id.
    pub fn open_edit(&mut self, id: Uuid) -> bool {
        self.menu.close_all();
        let Some(record) = self.items.iter().find(|item| item.record_id() == id) else {
            return false;
        };
        self.form.open(Some(record));
        true
    }
}

impl<A: ReviewApi> ManagementScreen<Application, A> {
    pub async fn accept(&mut self, id: Uuid, confirm: impl Confirm) -> Outcome {
        self.review(id, ApplicationStatus::Accepted, ACCEPT_PROMPT, confirm)
            .await
    }

    pub async fn reject(&mut self, id: Uuid, confirm: impl Confirm) -> Outcome {
        self.review(id, ApplicationStatus::Rejected, REJECT_PROMPT, confirm)
            .await
    }

    async fn review(
        &mut self,
        id: Uuid,
        status: ApplicationStatus,
        prompt: &str,
        confirm: impl Confirm,
    ) -> Outcome {
        self.menu.close_all();
        if !confirm.confirm(prompt) {
            return Outcome::Cancelled;
        }
        let result = self.api.set_status(id, status).await;
        self.after_mutation(result).await
    }
}

/// A public site form (investment, contact, job application).
pub struct PublicForm<M, S> {
    submitter: S,
    form: FormController<M>,
    submitted: bool,
}

impl<M: FormModel, S: PublicSubmit<M>> PublicForm<M, S> {
    pub fn new(submitter: S) -> Self {
        let mut form = FormController::new();
        form.open_blank();
        Self {
            submitter,
            form,
            submitted: false,
        }
    }

    pub fn form(&self) -> &FormController<M> {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut FormController<M> {
        &mut self.form
    }

    /// Whether the last submit reached the server successfully.
    pub fn submitted(&self) -> bool {
        self.submitted
    }

    /// Nothing is sent unless local validation passes.
    pub async fn submit(&mut self) -> Outcome {
        self.submitted = false;
        let submission = match self.form.submit() {
            Ok(submission) => submission,
            Err(e) => return Outcome::Failed(e.to_string()),
        };
        match self.submitter.submit(submission).await {
            Ok(()) => {
                self.form.succeed();
                self.submitted = true;
                Outcome::Done
            }
            Err(e) => {
                let message = e.to_string();
                self.form.fail(message.clone());
                Outcome::Failed(message)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::form::{FileSelection, Target};
    use crate::dashboard::forms::ApplicationForm;
    use crate::models::{AdminUser, AdminUserPayload, Career, Service, ServiceIcon, ServicePayload};
    use chrono::Utc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct FakeServices {
        rows: Mutex<Vec<Service>>,
        calls: AtomicUsize,
        fail_saves: bool,
    }

    impl FakeServices {
        fn with(rows: Vec<Service>) -> Arc<Self> {
            Arc::new(Self {
                rows: Mutex::new(rows),
                ..Default::default()
            })
        }
    }

    #[async_trait]
    impl ResourceApi<Service> for Arc<FakeServices> {
        async fn list(&self) -> Result<Vec<Service>, ClientError> {
            Ok(self.rows.lock().unwrap().clone())
        }

        async fn remove(&self, id: Uuid) -> Result<(), ClientError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut rows = self.rows.lock().unwrap();
            let before = rows.len();
            rows.retain(|s| s.id != id);
            if rows.len() == before {
                return Err(ClientError::Api {
                    status: 404,
                    message: "Service not found".to_string(),
                });
            }
            Ok(())
        }
    }

    #[async_trait]
    impl EditApi<Service> for Arc<FakeServices> {
        async fn save(&self, submission: Submission<ServicePayload>) -> Result<(), ClientError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_saves {
                return Err(ClientError::Api {
                    status: 400,
                    message: "Title is required".to_string(),
                });
            }
            let ServicePayload {
                title,
                description,
                icon,
            } = submission.payload;
            let mut rows = self.rows.lock().unwrap();
            match submission.target {
                Target::Create => rows.push(Service {
                    id: Uuid::new_v4(),
                    title,
                    description,
                    icon,
                }),
                Target::Update(id) => {
                    if let Some(row) = rows.iter_mut().find(|s| s.id == id) {
                        row.title = title;
                        row.description = description;
                        row.icon = icon;
                    }
                }
            }
            Ok(())
        }
    }

    fn service(title: &str) -> Service {
        Service {
            id: Uuid::new_v4(),
            title: title.to_string(),
            description: format!("{title} work"),
            icon: ServiceIcon::CodeBracket,
        }
    }

    fn yes(_: &str) -> bool {
        true
    }

    fn no(_: &str) -> bool {
        false
    }

    #[tokio::test]
    async fn test_created_service_is_listed_and_searchable() {
        let api = FakeServices::with(vec![service("Web Development")]);
        let mut screen = ManagementScreen::<Service, _>::new(api.clone());
        screen.load().await;

        screen.open_create();
        let form = screen.form_mut();
        form.field_change("title", "DevOps");
        form.field_change("description", "CI/CD and infrastructure automation");
        form.field_change("icon", "MegaphoneIcon");
        assert_eq!(screen.submit_form().await, Outcome::Done);
        assert!(!screen.form().is_open());

        let created: Vec<_> = screen.items().iter().filter(|s| s.title == "DevOps").collect();
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].icon, ServiceIcon::Megaphone);
        let created_id = created[0].id;

        screen.set_query("devOPS");
        let view = screen.view();
        assert_eq!(view.items.len(), 1);
        assert_eq!(view.items[0].id, created_id);
    }

    #[tokio::test]
    async fn test_declined_delete_sends_nothing() {
        let api = FakeServices::with((0..12).map(|i| service(&format!("S{i}"))).collect());
        let mut screen = ManagementScreen::<Service, _>::new(api.clone());
        screen.load().await;
        screen.set_page(2);
        let before: Vec<Uuid> = screen.view().items.iter().map(|s| s.id).collect();

        let id = screen.items()[11].id;
        screen.menu_mut().toggle(id);
        assert_eq!(screen.delete(id, no).await, Outcome::Cancelled);

        assert_eq!(api.calls.load(Ordering::SeqCst), 0);
        assert_eq!(screen.items().len(), 12);
        let after: Vec<Uuid> = screen.view().items.iter().map(|s| s.id).collect();
        assert_eq!(before, after);
        assert!(screen.menu().active().is_none());
    }

    #[tokio::test]
    async fn test_delete_refetches_and_clamps_page() {
        let api = FakeServices::with((0..11).map(|i| service(&format!("S{i}"))).collect());
        let mut screen = ManagementScreen::<Service, _>::new(api.clone());
        screen.load().await;
        screen.set_page(2);
        assert_eq!(screen.view().items.len(), 1);

        let last = screen.items()[10].id;
        assert_eq!(screen.delete(last, yes).await, Outcome::Done);
        assert_eq!(screen.items().len(), 10);
        assert_eq!(screen.list_state().page(), 1);
        assert_eq!(screen.view().items.len(), 10);
    }

    #[tokio::test]
    async fn test_failed_delete_shows_banner() {
        let api = FakeServices::with(vec![service("Cloud")]);
        let mut screen = ManagementScreen::<Service, _>::new(api);
        screen.load().await;
        let outcome = screen.delete(Uuid::new_v4(), yes).await;
        assert_eq!(outcome, Outcome::Failed("Service not found".to_string()));
        assert_eq!(screen.error(), Some("Service not found"));
        assert_eq!(screen.items().len(), 1);
    }

    #[tokio::test]
    async fn test_server_rejection_keeps_draft() {
        let api = Arc::new(FakeServices {
            rows: Mutex::new(vec![service("Cloud")]),
            fail_saves: true,
            ..Default::default()
        });
        let mut screen = ManagementScreen::<Service, _>::new(api);
        screen.load().await;
        let id = screen.items()[0].id;

        assert!(screen.open_edit(id));
        assert_eq!(screen.form().editing(), Some(id));
        screen.form_mut().field_change("title", "Cloud Platforms");
        assert!(matches!(screen.submit_form().await, Outcome::Failed(_)));

        assert!(screen.form().is_open());
        assert_eq!(screen.form().field("title"), "Cloud Platforms");
        assert_eq!(screen.form().server_error(), Some("Title is required"));
        assert_eq!(screen.items()[0].title, "Cloud");
    }

    #[tokio::test]
    async fn test_invalid_form_is_not_sent() {
        let api = FakeServices::with(Vec::new());
        let mut screen = ManagementScreen::<Service, _>::new(api.clone());
        screen.open_create();
        screen.form_mut().field_change("title", "DevOps");
        assert!(matches!(screen.submit_form().await, Outcome::Failed(_)));
        assert_eq!(api.calls.load(Ordering::SeqCst), 0);
        assert!(screen.form().validation_error().is_some());
    }

    struct BrokenApi;

    #[async_trait]
    impl ResourceApi<Service> for BrokenApi {
        async fn list(&self) -> Result<Vec<Service>, ClientError> {
            Err(ClientError::Api {
                status: 500,
                message: "Request failed with status 500".to_string(),
            })
        }

        async fn remove(&self, _id: Uuid) -> Result<(), ClientError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_load_failure_sets_banner() {
        let mut screen = ManagementScreen::<Service, _>::new(BrokenApi);
        screen.load().await;
        assert!(!screen.is_loading());
        assert_eq!(screen.error(), Some("Request failed with status 500"));
        assert!(screen.items().is_empty());
    }

    #[derive(Default)]
    struct FakeApplications {
        rows: Mutex<Vec<Application>>,
    }

    #[async_trait]
    impl ResourceApi<Application> for Arc<FakeApplications> {
        async fn list(&self) -> Result<Vec<Application>, ClientError> {
            Ok(self.rows.lock().unwrap().clone())
        }

        async fn remove(&self, id: Uuid) -> Result<(), ClientError> {
            self.rows.lock().unwrap().retain(|a| a.id != id);
            Ok(())
        }
    }

    #[async_trait]
    impl ReviewApi for Arc<FakeApplications> {
        async fn set_status(&self, id: Uuid, status: ApplicationStatus) -> Result<(), ClientError> {
            let mut rows = self.rows.lock().unwrap();
            let row = rows.iter_mut().find(|a| a.id == id).ok_or(ClientError::Api {
                status: 404,
                message: "Application not found".to_string(),
            })?;
            row.status = status;
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_accept_and_reject_update_status() {
        let application = Application {
            id: Uuid::new_v4(),
            full_name: "Ada Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            phone: None,
            cover_letter: None,
            job_title: Some("Backend Engineer".to_string()),
            career_id: Some(Uuid::new_v4()),
            resume_url: Some("/uploads/resumes/ada.pdf".to_string()),
            status: ApplicationStatus::Pending,
            created_at: Utc::now(),
        };
        let id = application.id;
        let api = Arc::new(FakeApplications {
            rows: Mutex::new(vec![application]),
        });
        let mut screen = ManagementScreen::<Application, _>::new(api);
        screen.load().await;

        assert_eq!(screen.reject(id, no).await, Outcome::Cancelled);
        assert_eq!(screen.items()[0].status, ApplicationStatus::Pending);

        assert_eq!(screen.accept(id, yes).await, Outcome::Done);
        assert_eq!(screen.items()[0].status, ApplicationStatus::Accepted);

        assert!(screen.view_record(id));
        assert_eq!(screen.viewing().map(|a| a.full_name.as_str()), Some("Ada Lovelace"));
        screen.set_query("accepted");
        assert_eq!(screen.view().total_matches, 1);
    }

    #[derive(Default)]
    struct CountingSubmitter {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl PublicSubmit<ApplicationForm> for Arc<CountingSubmitter> {
        async fn submit(
            &self,
            _submission: Submission<crate::dashboard::forms::ApplicationSubmission>,
        ) -> Result<(), ClientError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn career() -> Career {
        Career {
            id: Uuid::new_v4(),
            title: "Backend Engineer".to_string(),
            department: "Engineering".to_string(),
            kind: "Full-time".to_string(),
            location: "Remote".to_string(),
            salary: None,
            experience: None,
            posted: None,
            description: "Build APIs".to_string(),
            requirements: Vec::new(),
            responsibilities: Vec::new(),
            application_count: None,
        }
    }

    #[tokio::test]
    async fn test_application_without_cv_is_not_sent() {
        let submitter = Arc::new(CountingSubmitter::default());
        let mut page = PublicForm::<ApplicationForm, _>::new(submitter.clone());
        let career = career();
        page.form_mut().open_for(Some(&career));
        page.form_mut().field_change("fullName", "Ada Lovelace");
        page.form_mut().field_change("email", "ada@example.com");

        let outcome = page.submit().await;
        assert_eq!(outcome, Outcome::Failed("CV is required".to_string()));
        assert_eq!(submitter.calls.load(Ordering::SeqCst), 0);
        assert!(!page.submitted());

        page.form_mut().select_files(
            "resume",
            vec![FileSelection::new("cv.pdf", "application/pdf", b"%PDF-1.7".to_vec())],
        );
        assert_eq!(page.submit().await, Outcome::Done);
        assert_eq!(submitter.calls.load(Ordering::SeqCst), 1);
        assert!(page.submitted());
    }

    fn filled_application(
        submitter: &Arc<CountingSubmitter>,
    ) -> PublicForm<ApplicationForm, Arc<CountingSubmitter>> {
        let mut page = PublicForm::<ApplicationForm, _>::new(submitter.clone());
        let career = career();
        page.form_mut().open_for(Some(&career));
        page.form_mut().field_change("fullName", "Ada Lovelace");
        page.form_mut().field_change("email", "ada@example.com");
        page
    }

    #[tokio::test]
    async fn test_oversized_cv_is_not_sent() {
        let submitter = Arc::new(CountingSubmitter::default());
        let mut page = filled_application(&submitter);
        page.form_mut().select_files(
            "resume",
            vec![FileSelection::new(
                "cv.pdf",
                "application/pdf",
                vec![0u8; 6 * 1024 * 1024],
            )],
        );

        let outcome = page.submit().await;
        assert_eq!(outcome, Outcome::Failed("CV must be at most 5MB".to_string()));
        assert_eq!(submitter.calls.load(Ordering::SeqCst), 0);
        assert!(!page.submitted());
    }

    #[tokio::test]
    async fn test_non_pdf_cv_is_not_sent() {
        let submitter = Arc::new(CountingSubmitter::default());
        let mut page = filled_application(&submitter);
        page.form_mut().select_files(
            "resume",
            vec![FileSelection::new(
                "cv.docx",
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
                b"PK\x03\x04".to_vec(),
            )],
        );

        let outcome = page.submit().await;
        assert_eq!(outcome, Outcome::Failed("CV must be a PDF file".to_string()));
        assert_eq!(submitter.calls.load(Ordering::SeqCst), 0);
        assert!(!page.submitted());
    }

    #[derive(Default)]
    struct FakeAdmins {
        rows: Mutex<Vec<AdminUser>>,
        targets: Mutex<Vec<Target>>,
    }

    #[async_trait]
    impl ResourceApi<AdminUser> for Arc<FakeAdmins> {
        async fn list(&self) -> Result<Vec<AdminUser>, ClientError> {
            Ok(self.rows.lock().unwrap().clone())
        }

        async fn remove(&self, id: Uuid) -> Result<(), ClientError> {
            self.rows.lock().unwrap().retain(|u| u.id != id);
            Ok(())
        }
    }

    #[async_trait]
    impl EditApi<AdminUser> for Arc<FakeAdmins> {
        async fn save(&self, submission: Submission<AdminUserPayload>) -> Result<(), ClientError> {
            self.targets.lock().unwrap().push(submission.target);
            self.rows.lock().unwrap().push(AdminUser {
                id: Uuid::new_v4(),
                username: submission.payload.username,
                email: submission.payload.email,
                created_at: Utc::now(),
            });
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_admin_users_are_created_and_deleted() {
        let api = Arc::new(FakeAdmins::default());
        let mut screen = ManagementScreen::new(api.clone());
        screen.load().await;
        assert!(screen.items().is_empty());

        screen.open_create();
        screen.form_mut().field_change("username", "ops");
        screen.form_mut().field_change("email", "ops@housemajor.com");
        screen.form_mut().field_change("password", "longenough");
        assert_eq!(screen.submit_form().await, Outcome::Done);
        assert_eq!(*api.targets.lock().unwrap(), vec![Target::Create]);
        assert_eq!(screen.items().len(), 1);

        let id = screen.items()[0].id;
        assert_eq!(screen.delete(id, yes).await, Outcome::Done);
        assert!(screen.items().is_empty());
    }
}
