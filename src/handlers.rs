use std::io::Read;
use std::sync::{Arc, Mutex};

use iron::headers::ContentType;
use iron::prelude::Chain;
use iron::status::{self, Status};
use iron::{AfterMiddleware, Handler, IronError, IronResult, Request, Response};
use router::{NoRoute, Router, TrailingSlash};
use rustc_serialize::json::{Json, ToJson};

use crate::error::ApiError;
use crate::model::{self, NewPost, PostChanges};
use crate::query::{QueryParams, SearchCriteria, Sort};
use crate::store::PostStore;

pub type SharedStore = Arc<Mutex<PostStore>>;

/// Lock the store. A poisoned lock means some handler panicked mid-update,
/// so the request fails with `500 Internal Server Error`.
macro_rules! lock {
    ( $e:expr ) => {
        $e.lock().map_err(|_| ApiError::Internal)?
    };
}

/// Get the numeric `id` parameter from the URI.
/// Anything that is not a plain decimal integer does not match the route.
macro_rules! get_post_id {
    ( $r:expr ) => {
        match $r.extensions.get::<Router>() {
            Some(params) => match params.find("id") {
                Some(raw) => parse_id(raw)?,
                None => return Err(ApiError::RouteNotFound.into()),
            },
            None => return Err(ApiError::Internal.into()),
        }
    };
}

fn parse_id(raw: &str) -> Result<u64, ApiError> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ApiError::RouteNotFound);
    }
    // An overflowing id can never have been assigned.
    raw.parse().map_err(|_| ApiError::PostNotFound { id: u64::MAX })
}

fn read_body(req: &mut Request) -> Result<String, ApiError> {
    let mut payload = String::new();
    req.body
        .read_to_string(&mut payload)
        .map_err(|_| ApiError::Internal)?;
    Ok(payload)
}

fn query_params(req: &Request) -> QueryParams {
    QueryParams::parse(req.url.query())
}

fn json_response(status: Status, body: Json) -> Response {
    Response::with((status, body.to_string()))
}

pub struct Handlers {
    pub list_posts: ListPostsHandler,
    pub create_post: CreatePostHandler,
    pub get_post: GetPostHandler,
    pub update_post: UpdatePostHandler,
    pub delete_post: DeletePostHandler,
    pub search: SearchHandler,
}

impl Handlers {
    pub fn new(store: PostStore) -> Handlers {
        let store = Arc::new(Mutex::new(store));
        Handlers {
            list_posts: ListPostsHandler { store: store.clone() },
            create_post: CreatePostHandler { store: store.clone() },
            get_post: GetPostHandler { store: store.clone() },
            update_post: UpdatePostHandler { store: store.clone() },
            delete_post: DeletePostHandler { store: store.clone() },
            search: SearchHandler { store },
        }
    }
}

pub struct ListPostsHandler {
    store: SharedStore,
}

impl Handler for ListPostsHandler {
    fn handle(&self, req: &mut Request) -> IronResult<Response> {
        let sort = Sort::from_params(&query_params(req));
        let posts = lock!(self.store).list(sort);
        Ok(json_response(status::Ok, posts.to_json()))
    }
}

pub struct CreatePostHandler {
    store: SharedStore,
}

impl Handler for CreatePostHandler {
    fn handle(&self, req: &mut Request) -> IronResult<Response> {
        let draft = NewPost::from_body(&read_body(req)?)?;
        let post = lock!(self.store).create(draft);
        Ok(json_response(status::Created, post.to_json()))
    }
}

pub struct GetPostHandler {
    store: SharedStore,
}

impl Handler for GetPostHandler {
    fn handle(&self, req: &mut Request) -> IronResult<Response> {
        let id = get_post_id!(req);
        let store = lock!(self.store);
        let post = store.get(id)?;
        Ok(json_response(status::Ok, post.to_json()))
    }
}

pub struct UpdatePostHandler {
    store: SharedStore,
}

impl Handler for UpdatePostHandler {
    fn handle(&self, req: &mut Request) -> IronResult<Response> {
        let id = get_post_id!(req);
        let changes = PostChanges::from_body(&read_body(req)?);
        let post = lock!(self.store).update(id, changes)?;
        Ok(json_response(status::Ok, post.to_json()))
    }
}

pub struct DeletePostHandler {
    store: SharedStore,
}

impl Handler for DeletePostHandler {
    fn handle(&self, req: &mut Request) -> IronResult<Response> {
        let id = get_post_id!(req);
        lock!(self.store).delete(id)?;
        let body = model::message(format!("Post with id {} has been deleted successfully.", id));
        Ok(json_response(status::Ok, body))
    }
}

pub struct SearchHandler {
    store: SharedStore,
}

impl Handler for SearchHandler {
    fn handle(&self, req: &mut Request) -> IronResult<Response> {
        let criteria = SearchCriteria::from_params(&query_params(req))?;
        let results = lock!(self.store).search(&criteria);
        Ok(json_response(status::Ok, results.to_json()))
    }
}

/// Answers CORS preflight requests; the headers come from `JsonAfterMiddleware`.
pub struct PreflightHandler;

impl Handler for PreflightHandler {
    fn handle(&self, _: &mut Request) -> IronResult<Response> {
        Ok(Response::with(status::Ok))
    }
}

/// Marks every response as JSON, adds permissive CORS headers, and turns
/// errors into `{"error": ...}` bodies.
pub struct JsonAfterMiddleware;

impl JsonAfterMiddleware {
    fn decorate(mut res: Response) -> Response {
        res.headers.set(ContentType::json());
        res.headers.set_raw("Access-Control-Allow-Origin", vec![b"*".to_vec()]);
        res.headers.set_raw(
            "Access-Control-Allow-Methods",
            vec![b"GET, POST, PUT, DELETE, OPTIONS".to_vec()],
        );
        res.headers.set_raw("Access-Control-Allow-Headers", vec![b"Content-Type".to_vec()]);
        res
    }

    fn error_response(err: &ApiError) -> Response {
        json_response(err.status(), err.body())
    }
}

impl AfterMiddleware for JsonAfterMiddleware {
    fn after(&self, _: &mut Request, res: Response) -> IronResult<Response> {
        Ok(JsonAfterMiddleware::decorate(res))
    }

    fn catch(&self, req: &mut Request, err: IronError) -> IronResult<Response> {
        let res = if let Some(api_error) = err.error.downcast_ref::<ApiError>() {
            if *api_error == ApiError::Internal {
                error!("{} {} failed: {}", req.method, req.url, api_error);
            } else {
                warn!("{} {} rejected: {}", req.method, req.url, api_error);
            }
            JsonAfterMiddleware::error_response(api_error)
        } else if err.error.is::<NoRoute>() {
            JsonAfterMiddleware::error_response(&ApiError::RouteNotFound)
        } else if err.error.is::<TrailingSlash>() {
            err.response
        } else {
            error!("{} {} failed: {}", req.method, req.url, err.error);
            JsonAfterMiddleware::error_response(&ApiError::Internal)
        };
        Ok(JsonAfterMiddleware::decorate(res))
    }
}

pub fn router(handlers: Handlers) -> Router {
    let mut router = Router::new();
    router.get("/api/posts", handlers.list_posts, "list_posts");
    router.post("/api/posts", handlers.create_post, "create_post");
    router.get("/api/posts/:id", handlers.get_post, "get_post");
    router.put("/api/posts/:id", handlers.update_post, "update_post");
    router.delete("/api/posts/:id", handlers.delete_post, "delete_post");
    router.get("/api/search", handlers.search, "search");
    router.options("/api/posts", PreflightHandler, "preflight_posts");
    router.options("/api/posts/:id", PreflightHandler, "preflight_post");
    router.options("/api/search", PreflightHandler, "preflight_search");
    router
}

/// The routed service with JSON handling, without access logging.
pub fn app(store: PostStore) -> Chain {
    let mut chain = Chain::new(router(Handlers::new(store)));
    chain.link_after(JsonAfterMiddleware);
    chain
}
