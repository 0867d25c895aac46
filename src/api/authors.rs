//! Author pages - list, detail, inline create/update and delete

use axum::{
    extract::{rejection::FormRejection, Path, State},
    http::{header, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{any, get},
    Form, Router,
};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::api::state::{AppState, AuthorWorkflow};
use crate::api::types::ApiError;
use crate::domain::{Author, Book, Entity, FormData, RecordId, RequestContext, WorkflowResponse};
use crate::infrastructure::observability::{record_workflow_outcome, WorkflowOutcome};

pub const AUTHOR_LIST_URL: &str = "/authors/";

/// Author entry of the list and detail pages
#[derive(Debug, Clone, Serialize)]
pub struct AuthorSummary {
    pub id: Option<RecordId>,
    pub name: String,
    pub url: Option<String>,
}

impl From<&Author> for AuthorSummary {
    fn from(author: &Author) -> Self {
        Self {
            id: author.id(),
            name: author.name().to_string(),
            url: author.absolute_url(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BookSummary {
    pub id: Option<RecordId>,
    pub title: String,
}

impl From<&Book> for BookSummary {
    fn from(book: &Book) -> Self {
        Self {
            id: book.id(),
            title: book.title().to_string(),
        }
    }
}

pub fn create_authors_router() -> Router<AppState> {
    Router::new()
        .route(AUTHOR_LIST_URL, get(list_authors))
        .route("/author/create/", any(create_author))
        .route("/author/{id}/", get(author_detail))
        .route("/author/update/{id}/", any(update_author))
        .route("/author/delete/{id}/", any(delete_author))
}

pub async fn list_authors(State(state): State<AppState>) -> Result<Response, ApiError> {
    let authors: Vec<AuthorSummary> = state
        .library
        .list_authors()
        .await?
        .iter()
        .map(AuthorSummary::from)
        .collect();

    render(&state, "author_list", &json!({ "authors": authors }))
}

pub async fn author_detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let detail = state.library.author_detail(parse_id(&id)?).await?;
    let books: Vec<BookSummary> = detail.books.iter().map(BookSummary::from).collect();

    render(
        &state,
        "author_detail",
        &json!({ "author": AuthorSummary::from(&detail.author), "books": books }),
    )
}

pub async fn create_author(
    State(state): State<AppState>,
    method: Method,
    form: Result<Form<Vec<(String, String)>>, FormRejection>,
) -> Result<Response, ApiError> {
    let request = workflow_request(&method, form);
    run_workflow(&state, &state.author_create, request).await
}

pub async fn update_author(
    State(state): State<AppState>,
    Path(id): Path<String>,
    method: Method,
    form: Result<Form<Vec<(String, String)>>, FormRejection>,
) -> Result<Response, ApiError> {
    let id = parse_id(&id)?;
    let request = workflow_request(&method, form).with_id(id);
    run_workflow(&state, &state.author_update, request).await
}

/// GET shows a confirmation, POST deletes the author with its books
pub async fn delete_author(
    State(state): State<AppState>,
    Path(id): Path<String>,
    method: Method,
) -> Result<Response, ApiError> {
    let id = parse_id(&id)?;

    match method {
        Method::GET | Method::HEAD => {
            let author = state.library.get_author(id).await?;
            render(
                &state,
                "author_confirm_delete",
                &json!({ "object": author.values() }),
            )
        }
        Method::POST => {
            state.library.delete_author(id).await?;
            Ok(found(AUTHOR_LIST_URL))
        }
        other => Err(ApiError::method_not_allowed(format!(
            "Method not allowed: {}",
            other
        ))),
    }
}

/// Ids that are not unsigned integers can never match a record
fn parse_id(raw: &str) -> Result<RecordId, ApiError> {
    raw.parse::<RecordId>()
        .map_err(|_| ApiError::not_found(format!("No author matches id '{}'", raw)))
}

fn workflow_request(
    method: &Method,
    form: Result<Form<Vec<(String, String)>>, FormRejection>,
) -> RequestContext {
    let request = RequestContext::new(method.as_str());

    match form {
        Ok(Form(pairs)) if request.method.is_write() => request.with_data(FormData::from(pairs)),
        Ok(_) => request,
        Err(rejection) => {
            debug!(error = %rejection, "Submission without form data");
            request
        }
    }
}

async fn run_workflow(
    state: &AppState,
    workflow: &AuthorWorkflow,
    request: RequestContext,
) -> Result<Response, ApiError> {
    let result = workflow.dispatch(&request).await;
    record_workflow_outcome(
        workflow.kind(),
        WorkflowOutcome::of(&result, request.method.is_write()),
    );

    match result? {
        WorkflowResponse::Redirect(location) => Ok(found(&location)),
        WorkflowResponse::Render(rendered) => {
            let context = serde_json::to_value(&rendered.context)
                .map_err(|e| ApiError::internal(format!("Failed to serialize form context: {}", e)))?;
            render(state, &rendered.template, &context)
        }
    }
}

fn render(state: &AppState, template: &str, context: &Value) -> Result<Response, ApiError> {
    let rendered = state.renderer.render(template, context)?;

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, rendered.content_type)],
        rendered.body,
    )
        .into_response())
}

/// `302 Found` pointing at `location`
fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::Request;
    use mockall::predicate::eq;
    use tower::ServiceExt;

    use crate::domain::form::MANAGEMENT_FORM_ERROR;
    use crate::domain::render::MockTemplateRenderer;
    use crate::domain::{
        DomainError, RecordStore, RenderedBody, SchemaFormValidator, TemplateRenderer,
        WorkflowConfig,
    };
    use crate::infrastructure::render::JsonTemplateRenderer;
    use crate::infrastructure::services::LibraryService;
    use crate::infrastructure::storage::InMemoryRecordStore;

    struct TestApp {
        router: Router,
        library: Arc<LibraryService>,
    }

    async fn app_with_renderer(renderer: Arc<dyn TemplateRenderer>) -> TestApp {
        let authors = Arc::new(InMemoryRecordStore::<Author>::new());
        let books = Arc::new(InMemoryRecordStore::<Book>::new());
        let jane = authors.save(Author::new("Jane")).await.unwrap().id().unwrap();
        books.save(Book::new("Emma").with_author(jane)).await.unwrap();
        books.save(Book::new("Persuasion").with_author(jane)).await.unwrap();

        let state = AppState::new(
            LibraryService::new(authors, books),
            WorkflowConfig::new(["name"], ["title"]),
            Arc::new(SchemaFormValidator::new()),
            renderer,
        )
        .unwrap();
        let library = state.library.clone();

        TestApp {
            router: create_authors_router().with_state(state),
            library,
        }
    }

    async fn app() -> TestApp {
        app_with_renderer(Arc::new(JsonTemplateRenderer::new())).await
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn location(response: &Response) -> &str {
        response
            .headers()
            .get(header::LOCATION)
            .unwrap()
            .to_str()
            .unwrap()
    }

    #[tokio::test]
    async fn test_list_authors() {
        let app = app().await;
        let response = app.router.oneshot(get("/authors/")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["template"], "author_list");
        assert_eq!(body["authors"][0]["name"], "Jane");
        assert_eq!(body["authors"][0]["url"], "/author/1/");
    }

    #[tokio::test]
    async fn test_author_detail_and_missing_ids() {
        let app = app().await;

        let response = app.router.clone().oneshot(get("/author/1/")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["books"].as_array().unwrap().len(), 2);

        let response = app.router.clone().oneshot(get("/author/9/")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = json_body(response).await;
        assert_eq!(body["error"]["type"], "not_found_error");

        let response = app
            .router
            .clone()
            .oneshot(get("/author/update/18446744073709551615/"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = app.router.oneshot(get("/author/abc/")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_create_form() {
        let app = app().await;
        let response = app.router.oneshot(get("/author/create/")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["template"], "author_create_with_books");
        assert_eq!(body["inlineForms"]["prefix"], "form");
        assert_eq!(body["inlineForms"]["management_form"]["TOTAL_FORMS"], 1);
        assert!(body.get("object").is_none());
    }

    #[tokio::test]
    async fn test_create_submission_redirects() {
        let app = app().await;
        let response = app
            .router
            .oneshot(post(
                "/author/create/",
                "name=Mary&form-TOTAL_FORMS=1&form-INITIAL_FORMS=0&form-0-title=Frankenstein",
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(location(&response), "/author/2/");
        let detail = app.library.author_detail(RecordId::new(2)).await.unwrap();
        assert_eq!(detail.books[0].title(), "Frankenstein");
    }

    #[tokio::test]
    async fn test_invalid_submission_is_rerendered() {
        let app = app().await;
        let response = app
            .router
            .oneshot(post("/author/create/", "name=&form-0-title=Frankenstein"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["mainForm"]["errors"]["name"][0], "This field is required.");
        assert_eq!(body["inlineForms"]["non_form_errors"][0], MANAGEMENT_FORM_ERROR);
        assert_eq!(app.library.list_authors().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_update_submission() {
        let app = app().await;
        let response = app
            .router
            .oneshot(post(
                "/author/update/1/",
                "name=Jane+Austen&books-TOTAL_FORMS=3&books-INITIAL_FORMS=2\
                 &books-0-id=1&books-0-title=Emma\
                 &books-1-id=2&books-1-title=Persuasion&books-1-DELETE=on\
                 &books-2-title=Sanditon",
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(location(&response), "/author/1/");

        let detail = app.library.author_detail(RecordId::new(1)).await.unwrap();
        assert_eq!(detail.author.name(), "Jane Austen");
        let titles: Vec<_> = detail.books.iter().map(|b| b.title()).collect();
        assert_eq!(titles, ["Emma", "Sanditon"]);
    }

    #[tokio::test]
    async fn test_update_unknown_author() {
        let app = app().await;

        let response = app.router.clone().oneshot(get("/author/update/5/")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = app
            .router
            .oneshot(post("/author/update/5/", "name=Nobody"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_workflow_rejects_other_methods() {
        let app = app().await;
        let request = Request::builder()
            .method("PATCH")
            .uri("/author/create/")
            .body(Body::empty())
            .unwrap();

        let response = app.router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_delete_confirmation_and_cascade() {
        let app = app().await;

        let response = app.router.clone().oneshot(get("/author/delete/1/")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["object"]["name"], "Jane");

        let response = app.router.oneshot(post("/author/delete/1/", "")).await.unwrap();
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(location(&response), AUTHOR_LIST_URL);
        assert!(app.library.list_authors().await.unwrap().is_empty());
        assert_eq!(app.library.books().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_update_uses_named_template() {
        let mut renderer = MockTemplateRenderer::new();
        renderer
            .expect_render()
            .with(eq("author_update_with_books"), mockall::predicate::always())
            .times(1)
            .returning(|_, context| {
                assert_eq!(context["object"]["name"], "Jane");
                Ok(RenderedBody {
                    content_type: "text/html".to_string(),
                    body: "<form></form>".to_string(),
                })
            });

        let app = app_with_renderer(Arc::new(renderer)).await;
        let response = app.router.oneshot(get("/author/update/1/")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "text/html");
    }

    #[tokio::test]
    async fn test_renderer_failure_is_server_error() {
        let mut renderer = MockTemplateRenderer::new();
        renderer
            .expect_render()
            .returning(|template, _| Err(DomainError::internal(format!("missing template {}", template))));

        let app = app_with_renderer(Arc::new(renderer)).await;
        let response = app.router.oneshot(get("/author/create/")).await.unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = json_body(response).await;
        assert_eq!(body["error"]["type"], "server_error");
    }
}
