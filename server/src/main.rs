#![allow(clippy::new_without_default)]

use app::{App, AppError, AppResult, AuthenticatedUser, ErrorKind};
use contracts::Form;
use hyper::{
    service::{make_service_fn, service_fn},
    Body, Method, Request, Response, Server,
};
use session::{SessionHandler, SESSION_COOKIE};
use std::sync::Arc;
use structopt::StructOpt;

pub mod app;
pub mod controller;
pub mod html;
pub mod session;

#[macro_use]
extern crate log;

#[derive(StructOpt, Debug, Clone)]
pub struct Opts {
    #[structopt(long, default_value = "3000", env = "TODO_LISTS_LISTEN_PORT")]
    port: u16,
    #[structopt(long, env = "TODO_LISTS_SQLITE_PATH")]
    database_path: String,
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    pretty_env_logger::formatted_timed_builder()
        .parse_filters(&std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_owned()))
        .init();

    let opts = Opts::from_args();

    database::apply_schema(&opts.database_path)
        .unwrap_or_else(|e| panic!("failed to apply schema at '{}': {}", opts.database_path, e));

    let app = Arc::new(App::new(opts.clone()));

    let webserver = Arc::new(Webserver::new(app));

    let addr = ([0, 0, 0, 0], opts.port).into();

    let service = make_service_fn(|_| {
        let webserver = webserver.clone();
        async {
            Ok::<_, hyper::Error>(service_fn(move |request| {
                let webserver = webserver.clone();
                entry_point(webserver, request)
            }))
        }
    });

    let server = Server::bind(&addr).serve(service);

    info!("starting server on {:?}", addr);
    let _ = server.await;
}

pub async fn entry_point(
    webserver: Arc<Webserver>,
    request: Request<Body>,
) -> Result<Response<Body>, hyper::Error> {
    Ok(webserver.handle_request(request).await)
}

pub struct Webserver {
    app: Arc<App>,
    sessions: SessionHandler,
}

impl Webserver {
    pub fn new(app: Arc<App>) -> Self {
        Self {
            app,
            sessions: SessionHandler::new(),
        }
    }

    pub async fn handle_request(&self, request: Request<Body>) -> Response<Body> {
        let timer = std::time::Instant::now();
        let method = request.method().clone();
        let path = request.uri().path().to_owned();
        info!("handling request: {} {}", method, path);

        let response = match self.route(&method, &path, request).await {
            Ok(response) => response,
            Err(error) => self.error_response(error),
        };

        info!(
            "handled request: {} {} with status {} in {:?}",
            method,
            path,
            response.status(),
            timer.elapsed()
        );

        response
    }

    async fn route(
        &self,
        method: &Method,
        path: &str,
        request: Request<Body>,
    ) -> AppResult<Response<Body>> {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        match (method, segments.as_slice()) {
            (&Method::GET, []) => Ok(html_response(html::login_page(None), 200)),
            (&Method::POST, []) => self.login(request).await,
            (&Method::GET, ["register"]) => Ok(html_response(html::register_page(None), 200)),
            (&Method::POST, ["register"]) => self.register(request).await,
            (&Method::GET, ["logout"]) => self.logout(&request).await,
            (&Method::GET, ["lists"]) => self.lists(&request).await,
            (&Method::GET, ["list-detail", list_id]) => {
                self.list_detail(&request, parse_id(list_id)?).await
            }
            (&Method::GET, ["create-new-list"]) => {
                self.current_user(&request).await?;
                Ok(html_response(html::create_list_page(), 200))
            }
            (&Method::POST, ["create-new-list"]) => self.create_list(request).await,
            (&Method::GET, ["create-new-list-item", list_id]) => {
                self.current_user(&request).await?;
                Ok(html_response(
                    html::create_list_item_page(parse_id(list_id)?),
                    200,
                ))
            }
            (&Method::POST, ["create-new-list-item", list_id]) => {
                let list_id = parse_id(list_id)?;
                self.create_list_item(request, list_id).await
            }
            (&Method::GET, ["edit-list-item", item_id]) => {
                self.edit_list_item_form(&request, parse_id(item_id)?).await
            }
            (&Method::POST, ["edit-list-item", item_id]) => {
                let item_id = parse_id(item_id)?;
                self.edit_list_item(request, item_id).await
            }
            (&Method::GET, ["list-item-complete", item_id]) => {
                self.complete_list_item(&request, parse_id(item_id)?).await
            }
            (&Method::GET, ["list-item-incomplete", item_id]) => {
                self.uncomplete_list_item(&request, parse_id(item_id)?)
                    .await
            }
            (&Method::GET, ["list-item-delete", item_id]) => {
                self.delete_list_item(&request, parse_id(item_id)?).await
            }
            (&Method::GET, ["list-delete", list_id]) => {
                self.delete_list(&request, parse_id(list_id)?).await
            }
            _invalid => {
                warn!("invalid http method or route: {} {}", method, path);
                Err(AppError::not_found())
            }
        }
    }

    async fn login(&self, request: Request<Body>) -> AppResult<Response<Body>> {
        let form = Self::get_body_as_form(request).await?;

        match self.app.auth().authenticate(&form).await {
            Ok(user) => {
                let session_id = self.sessions.login(user.id).await;
                Ok(redirect_with_cookie("/lists", &session_cookie(&session_id)))
            }
            Err(error) if error.kind().shown_inline() => {
                warn!("failed login attempt: '{}'", error.user_message());
                Ok(html_response(
                    html::login_page(Some(&error.user_message())),
                    200,
                ))
            }
            Err(error) => Err(error),
        }
    }

    async fn register(&self, request: Request<Body>) -> AppResult<Response<Body>> {
        let form = Self::get_body_as_form(request).await?;

        match self.app.auth().register(&form).await {
            Ok(user) => {
                // auto-login after registration
                let session_id = self.sessions.login(user.id).await;
                Ok(redirect_with_cookie("/lists", &session_cookie(&session_id)))
            }
            Err(error) if error.kind().shown_inline() => {
                warn!("failed registration: '{}'", error.user_message());
                Ok(html_response(
                    html::register_page(Some(&error.user_message())),
                    200,
                ))
            }
            Err(error) => Err(error),
        }
    }

    async fn logout(&self, request: &Request<Body>) -> AppResult<Response<Body>> {
        if let Some(session_id) = cookie_value(request, SESSION_COOKIE) {
            self.sessions.logout(&session_id).await;
        }

        Ok(redirect_with_cookie("/", &expired_session_cookie()))
    }

    async fn lists(&self, request: &Request<Body>) -> AppResult<Response<Body>> {
        let user = self.current_user(request).await?;
        let lists = self.app.lists().get_lists(&user).await?;

        Ok(html_response(html::lists_page(&user.name, &lists), 200))
    }

    async fn list_detail(
        &self,
        request: &Request<Body>,
        list_id: i64,
    ) -> AppResult<Response<Body>> {
        let user = self.current_user(request).await?;
        let (list, items) = self.app.lists().get_list_detail(&user, list_id).await?;

        Ok(html_response(html::list_detail_page(&list, &items), 200))
    }

    async fn create_list(&self, request: Request<Body>) -> AppResult<Response<Body>> {
        let user = self.current_user(&request).await?;
        let form = Self::get_body_as_form(request).await?;

        self.app.lists().create_list(&user, &form).await?;

        Ok(redirect_response("/lists"))
    }

    async fn delete_list(&self, request: &Request<Body>, list_id: i64) -> AppResult<Response<Body>> {
        let user = self.current_user(request).await?;

        self.app.lists().delete_list(&user, list_id).await?;

        Ok(redirect_response("/lists"))
    }

    async fn create_list_item(
        &self,
        request: Request<Body>,
        list_id: i64,
    ) -> AppResult<Response<Body>> {
        let user = self.current_user(&request).await?;
        let form = Self::get_body_as_form(request).await?;

        self.app.list_items().create_item(&user, list_id, &form).await?;

        Ok(redirect_response(&format!("/list-detail/{}", list_id)))
    }

    async fn edit_list_item_form(
        &self,
        request: &Request<Body>,
        item_id: i64,
    ) -> AppResult<Response<Body>> {
        let user = self.current_user(request).await?;
        let item = self.app.list_items().get_owned_item(&user, item_id).await?;

        Ok(html_response(html::edit_list_item_page(&item), 200))
    }

    async fn edit_list_item(
        &self,
        request: Request<Body>,
        item_id: i64,
    ) -> AppResult<Response<Body>> {
        let user = self.current_user(&request).await?;
        let form = Self::get_body_as_form(request).await?;

        let list_id = self.app.list_items().edit_item(&user, item_id, &form).await?;

        Ok(redirect_response(&format!("/list-detail/{}", list_id)))
    }

    async fn complete_list_item(
        &self,
        request: &Request<Body>,
        item_id: i64,
    ) -> AppResult<Response<Body>> {
        let user = self.current_user(request).await?;
        let list_id = self.app.list_items().mark_complete(&user, item_id).await?;

        Ok(redirect_response(&format!("/list-detail/{}", list_id)))
    }

    async fn uncomplete_list_item(
        &self,
        request: &Request<Body>,
        item_id: i64,
    ) -> AppResult<Response<Body>> {
        let user = self.current_user(request).await?;
        let list_id = self.app.list_items().mark_incomplete(&user, item_id).await?;

        Ok(redirect_response(&format!("/list-detail/{}", list_id)))
    }

    async fn delete_list_item(
        &self,
        request: &Request<Body>,
        item_id: i64,
    ) -> AppResult<Response<Body>> {
        let user = self.current_user(request).await?;
        let list_id = self.app.list_items().delete_item(&user, item_id).await?;

        Ok(redirect_response(&format!("/list-detail/{}", list_id)))
    }

    /// Resolves the session cookie to the authenticated user, if any.
    async fn current_user(&self, request: &Request<Body>) -> AppResult<AuthenticatedUser> {
        let session_id =
            cookie_value(request, SESSION_COOKIE).ok_or_else(AppError::unauthenticated)?;
        let user_id = self
            .sessions
            .current_user(&session_id)
            .await
            .ok_or_else(AppError::unauthenticated)?;

        self.app.resolve_user(user_id)
    }

    /// Attempts to parse the body of a request as an url-encoded form
    async fn get_body_as_form(request: Request<Body>) -> AppResult<Form> {
        let bytes = hyper::body::to_bytes(request.into_body())
            .await
            .map_err(|hyper_error| {
                AppError::invalid_params("unreadable request body").with_context(&hyper_error)
            })?;
        let text = String::from_utf8(bytes.to_vec()).map_err(|utf8_error| {
            AppError::invalid_params("request body is not valid utf-8").with_context(&utf8_error)
        })?;

        Ok(text.parse()?)
    }

    fn error_response(&self, error: AppError) -> Response<Body> {
        if let Some(context) = error.context() {
            error!("error handling request: '{}'", context);
        }

        match error.kind() {
            ErrorKind::Unauthenticated => redirect_response("/"),
            ErrorKind::NotFound => html_response(html::not_found_page(), 404),
            ErrorKind::InvalidParams(_) => {
                html_response(html::message_page(&error.user_message()), 400)
            }
            ErrorKind::DuplicateEmail | ErrorKind::NoSuchUser | ErrorKind::InvalidPassword => {
                html_response(html::login_page(Some(&error.user_message())), 200)
            }
            ErrorKind::Internal => html_response(html::message_page("something went wrong"), 500),
        }
    }
}

fn parse_id(raw: &str) -> AppResult<i64> {
    // a malformed id gets the same uniform 404 as an unknown one
    raw.parse().map_err(|_| AppError::not_found())
}

fn cookie_value(request: &Request<Body>, name: &str) -> Option<String> {
    let header = request
        .headers()
        .get(hyper::header::COOKIE)?
        .to_str()
        .ok()?;

    header.split(';').map(str::trim).find_map(|pair| {
        pair.strip_prefix(name)
            .and_then(|rest| rest.strip_prefix('='))
            .map(|value| value.to_owned())
    })
}

fn session_cookie(session_id: &str) -> String {
    format!("{}={}; Path=/; HttpOnly", SESSION_COOKIE, session_id)
}

fn expired_session_cookie() -> String {
    format!("{}=; Path=/; HttpOnly; Max-Age=0", SESSION_COOKIE)
}

fn html_response(body: String, status: u16) -> Response<Body> {
    Response::builder()
        .status(status)
        .header("Content-Type", "text/html; charset=utf-8")
        .body(Body::from(body))
        .unwrap()
}

fn redirect_response(location: &str) -> Response<Body> {
    Response::builder()
        .status(303)
        .header("Location", location)
        .body(Body::empty())
        .unwrap()
}

fn redirect_with_cookie(location: &str, cookie: &str) -> Response<Body> {
    Response::builder()
        .status(303)
        .header("Location", location)
        .header("Set-Cookie", cookie)
        .body(Body::empty())
        .unwrap()
}
