use crate::{
    controller::{AuthController, ListController, ListItemController},
    Opts,
};
use database::{self as db, Database, DatabaseError};
use std::{
    error::Error,
    fmt::{Debug, Display},
    sync::Arc,
};

pub type AppResult<T> = Result<T, AppError>;

/// The application context: owns the controllers and the database handles.
/// Constructed once at startup and shared across requests.
pub struct App {
    auth_controller: AuthController,
    list_controller: ListController,
    list_item_controller: ListItemController,
    user_db: Arc<Database<db::User>>,
}

impl App {
    pub fn new(opts: Opts) -> Self {
        let user_db: Arc<Database<db::User>> = Arc::new(Database::new(opts.database_path.clone()));
        let list_db: Arc<Database<db::List>> = Arc::new(Database::new(opts.database_path.clone()));
        let item_db: Arc<Database<db::ListItem>> =
            Arc::new(Database::new(opts.database_path.clone()));

        let auth_controller = AuthController::new(user_db.clone());
        let list_controller = ListController::new(list_db.clone(), item_db.clone());
        let list_item_controller = ListItemController::new(list_db, item_db);

        Self {
            auth_controller,
            list_controller,
            list_item_controller,
            user_db,
        }
    }

    pub fn auth(&self) -> &AuthController {
        &self.auth_controller
    }

    pub fn lists(&self) -> &ListController {
        &self.list_controller
    }

    pub fn list_items(&self) -> &ListItemController {
        &self.list_item_controller
    }

    /// Turns a session's user id into the explicit user value that store
    /// operations receive. A session for a user that no longer exists is
    /// treated as not authenticated.
    pub fn resolve_user(&self, user_id: i64) -> AppResult<AuthenticatedUser> {
        let user = self
            .user_db
            .get_user(user_id)?
            .ok_or_else(AppError::unauthenticated)?;

        Ok(AuthenticatedUser {
            id: user.id,
            name: user.name,
        })
    }
}

/// The requesting user, resolved from the session before any store
/// operation runs. Passed explicitly; nothing reads ambient session state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    DuplicateEmail,
    NoSuchUser,
    InvalidPassword,
    Unauthenticated,
    NotFound,
    InvalidParams(String),
    Internal,
}

impl ErrorKind {
    /// Errors that are re-rendered as an inline form message rather than a
    /// dedicated error response.
    pub fn shown_inline(&self) -> bool {
        matches!(
            self,
            ErrorKind::DuplicateEmail
                | ErrorKind::NoSuchUser
                | ErrorKind::InvalidPassword
                | ErrorKind::InvalidParams(_)
        )
    }
}

#[derive(Debug)]
pub struct AppError {
    kind: ErrorKind,
    context: Option<String>,
}

impl AppError {
    fn from_kind(kind: ErrorKind) -> Self {
        Self {
            kind,
            context: None,
        }
    }

    pub fn duplicate_email() -> Self {
        Self::from_kind(ErrorKind::DuplicateEmail)
    }

    pub fn no_such_user() -> Self {
        Self::from_kind(ErrorKind::NoSuchUser)
    }

    pub fn invalid_password() -> Self {
        Self::from_kind(ErrorKind::InvalidPassword)
    }

    pub fn unauthenticated() -> Self {
        Self::from_kind(ErrorKind::Unauthenticated)
    }

    pub fn not_found() -> Self {
        Self::from_kind(ErrorKind::NotFound)
    }

    pub fn invalid_params(message: &str) -> Self {
        Self::from_kind(ErrorKind::InvalidParams(message.to_owned()))
    }

    pub fn internal_error() -> Self {
        Self::from_kind(ErrorKind::Internal)
    }

    pub fn with_context<T>(mut self, value: &T) -> Self
    where
        T: Debug,
    {
        self.context = Some(format!("{:?}", value));
        self
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub fn context(&self) -> Option<&str> {
        self.context.as_deref()
    }

    /// The message shown to the end user. Context never leaks here.
    pub fn user_message(&self) -> String {
        match &self.kind {
            ErrorKind::DuplicateEmail => "an account with that email already exists".to_owned(),
            ErrorKind::NoSuchUser => "no account with that email".to_owned(),
            ErrorKind::InvalidPassword => "invalid password".to_owned(),
            ErrorKind::Unauthenticated => "you need to log in first".to_owned(),
            ErrorKind::NotFound => "not found".to_owned(),
            ErrorKind::InvalidParams(message) => message.clone(),
            ErrorKind::Internal => "something went wrong".to_owned(),
        }
    }
}

impl Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.user_message())
    }
}

impl Error for AppError {}

impl From<DatabaseError> for AppError {
    fn from(db_error: DatabaseError) -> Self {
        AppError::internal_error().with_context(&db_error)
    }
}

/// Marker for form-validation errors; everything implementing it maps onto
/// `ErrorKind::InvalidParams` with the validation message.
pub trait ParamsError: Error {}

impl<T> From<T> for AppError
where
    T: ParamsError,
{
    fn from(err: T) -> Self {
        AppError::invalid_params(&err.to_string()).with_context(&err)
    }
}

impl ParamsError for contracts::FormParseError {}
impl ParamsError for contracts::login::InvalidParams {}
impl ParamsError for contracts::register::InvalidParams {}
impl ParamsError for contracts::create_list::InvalidParams {}
impl ParamsError for contracts::create_list_item::InvalidParams {}
impl ParamsError for contracts::edit_list_item::InvalidParams {}
