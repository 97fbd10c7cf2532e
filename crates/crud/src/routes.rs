//! Route tables and the generic handlers behind them.
//!
//! A resource's routes are described once as a list of [`RouteSpec`]s. The
//! same list drives the axum router and the OpenAPI paths, so the two cannot
//! drift apart.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{Method, StatusCode},
    routing::{delete, get, patch, post, MethodRouter},
    Json, Router,
};
use serde::Serialize;
use serde_json::{json, Map, Value};
use voyage_http::AppError;

use crate::error::CrudError;
use crate::id::RecordId;
use crate::resource::Resource;
use crate::service::ResourceService;
use crate::shape::{FieldKind, Shape};

/// What a route does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    List,
    Get,
    Create,
    Update,
    Delete,
    /// Resource-specific route with its own handler, named by operation id.
    Query(&'static str),
}

impl Operation {
    pub fn operation_id(self, collection: &str) -> String {
        match self {
            Operation::List => format!("list_{collection}"),
            Operation::Get => format!("get_{collection}"),
            Operation::Create => format!("create_{collection}"),
            Operation::Update => format!("update_{collection}"),
            Operation::Delete => format!("delete_{collection}"),
            Operation::Query(name) => name.to_string(),
        }
    }
}

/// Documented response body of a route.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseDoc {
    /// One record of the named component schema.
    Record(String),
    /// Array of the named component schema.
    Records(String),
    /// `{ "id": ... }` of the given kind.
    Created(FieldKind),
    /// `{ "success": true }`.
    Success,
    /// Anything else, as an inline schema.
    Schema(Value),
}

impl ResponseDoc {
    fn schema(&self) -> Value {
        match self {
            ResponseDoc::Record(name) => schema_ref(name),
            ResponseDoc::Records(name) => json!({ "type": "array", "items": schema_ref(name) }),
            ResponseDoc::Created(kind) => json!({
                "type": "object",
                "properties": { "id": kind.json_schema() },
                "required": ["id"],
            }),
            ResponseDoc::Success => json!({
                "type": "object",
                "properties": { "success": { "type": "boolean" } },
                "required": ["success"],
            }),
            ResponseDoc::Schema(schema) => schema.clone(),
        }
    }
}

/// One row of a route table. `path` is relative to the module prefix.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteSpec {
    pub method: Method,
    pub path: String,
    pub operation: Operation,
    pub summary: String,
    pub tag: &'static str,
    pub params: Vec<(&'static str, FieldKind)>,
    /// Component schema name of the JSON body, if any.
    pub request: Option<String>,
    pub status: StatusCode,
    pub response: ResponseDoc,
    pub errors: Vec<StatusCode>,
}

impl RouteSpec {
    pub fn new(
        method: Method,
        path: impl Into<String>,
        operation: Operation,
        summary: impl Into<String>,
        tag: &'static str,
    ) -> Self {
        Self {
            method,
            path: path.into(),
            operation,
            summary: summary.into(),
            tag,
            params: Vec::new(),
            request: None,
            status: StatusCode::OK,
            response: ResponseDoc::Success,
            errors: Vec::new(),
        }
    }

    pub fn param(mut self, name: &'static str, kind: FieldKind) -> Self {
        self.params.push((name, kind));
        self
    }

    pub fn request(mut self, schema: impl Into<String>) -> Self {
        self.request = Some(schema.into());
        self
    }

    pub fn responds(mut self, status: StatusCode, response: ResponseDoc) -> Self {
        self.status = status;
        self.response = response;
        self
    }

    pub fn errors(mut self, errors: &[StatusCode]) -> Self {
        self.errors = errors.to_vec();
        self
    }

    /// OpenAPI operation object.
    pub fn operation_doc(&self, collection: &str) -> Value {
        let mut doc = json!({
            "tags": [self.tag],
            "summary": self.summary,
            "operationId": self.operation.operation_id(collection),
        });

        if !self.params.is_empty() {
            doc["parameters"] = self
                .params
                .iter()
                .map(|(name, kind)| {
                    json!({
                        "name": name,
                        "in": "path",
                        "required": true,
                        "schema": kind.json_schema(),
                    })
                })
                .collect();
        }

        if let Some(request) = &self.request {
            doc["requestBody"] = json!({
                "required": true,
                "content": { "application/json": { "schema": schema_ref(request) } },
            });
        }

        let mut responses = Map::new();
        responses.insert(
            self.status.as_u16().to_string(),
            json!({
                "description": self.status.canonical_reason().unwrap_or("Success"),
                "content": { "application/json": { "schema": self.response.schema() } },
            }),
        );
        for status in &self.errors {
            responses.insert(
                status.as_u16().to_string(),
                json!({
                    "description": status.canonical_reason().unwrap_or("Error"),
                    "content": { "application/json": { "schema": schema_ref("ErrorResponse") } },
                }),
            );
        }
        doc["responses"] = Value::Object(responses);
        doc
    }
}

fn schema_ref(name: &str) -> Value {
    json!({ "$ref": format!("#/components/schemas/{name}") })
}

/// The five CRUD routes of `R`.
pub fn crud_table<R: Resource>() -> Vec<RouteSpec> {
    let shapes = crate::resource::ResourceShapes::of::<R>();
    let id_kind = R::ID_STRATEGY.field_kind();
    let record = shapes.record.name().to_string();

    vec![
        RouteSpec::new(
            Method::GET,
            "/",
            Operation::List,
            format!("List all {}", R::COLLECTION),
            R::TAG,
        )
        .responds(StatusCode::OK, ResponseDoc::Records(record.clone())),
        RouteSpec::new(
            Method::GET,
            "/{id}",
            Operation::Get,
            format!("Fetch one {}", R::SINGULAR),
            R::TAG,
        )
        .param("id", id_kind.clone())
        .responds(StatusCode::OK, ResponseDoc::Record(record))
        .errors(&[StatusCode::BAD_REQUEST, StatusCode::NOT_FOUND]),
        RouteSpec::new(
            Method::POST,
            "/",
            Operation::Create,
            format!("Create a {}", R::SINGULAR),
            R::TAG,
        )
        .request(shapes.create.name())
        .responds(StatusCode::CREATED, ResponseDoc::Created(id_kind.clone()))
        .errors(&[
            StatusCode::BAD_REQUEST,
            StatusCode::CONFLICT,
            StatusCode::UNPROCESSABLE_ENTITY,
        ]),
        RouteSpec::new(
            Method::PATCH,
            "/{id}",
            Operation::Update,
            format!("Update fields of a {}", R::SINGULAR),
            R::TAG,
        )
        .param("id", id_kind.clone())
        .request(shapes.update.name())
        .responds(StatusCode::OK, ResponseDoc::Success)
        .errors(&[StatusCode::BAD_REQUEST, StatusCode::UNPROCESSABLE_ENTITY]),
        RouteSpec::new(
            Method::DELETE,
            "/{id}",
            Operation::Delete,
            format!("Delete a {}", R::SINGULAR),
            R::TAG,
        )
        .param("id", id_kind)
        .responds(StatusCode::OK, ResponseDoc::Success)
        .errors(&[StatusCode::BAD_REQUEST]),
    ]
}

/// OpenAPI fragment (`paths` + `components.schemas`) for a route table.
pub fn openapi_fragment<'a>(
    collection: &str,
    routes: &[RouteSpec],
    schemas: impl IntoIterator<Item = &'a Shape>,
) -> Value {
    let mut paths = Map::new();
    for route in routes {
        let item = paths
            .entry(route.path.clone())
            .or_insert_with(|| Value::Object(Map::new()));
        item[route.method.as_str().to_lowercase()] = route.operation_doc(collection);
    }

    let components: Map<String, Value> = schemas
        .into_iter()
        .map(|shape| (shape.name().to_string(), shape.json_schema()))
        .collect();

    json!({
        "paths": paths,
        "components": { "schemas": components },
    })
}

/// Body of `201 Created` responses.
#[derive(Debug, Serialize)]
pub struct Created {
    pub id: RecordId,
}

/// Body of update and delete responses.
#[derive(Debug, Serialize)]
pub struct Success {
    pub success: bool,
}

impl Success {
    pub fn ok() -> Json<Self> {
        Json(Self { success: true })
    }
}

type Shared<R> = Arc<ResourceService<R>>;

/// Router serving `crud_table::<R>()`, ready to be mounted under `/api/{collection}`.
pub fn crud_router<R: Resource>(service: Shared<R>) -> Router {
    let mut by_path: BTreeMap<String, MethodRouter<Shared<R>>> = BTreeMap::new();

    for route in crud_table::<R>() {
        let handler: MethodRouter<Shared<R>> = match route.operation {
            Operation::List => get(list::<R>),
            Operation::Get => get(fetch::<R>),
            Operation::Create => post(create::<R>),
            Operation::Update => patch(update::<R>),
            Operation::Delete => delete(remove::<R>),
            Operation::Query(_) => continue,
        };
        let merged = match by_path.remove(&route.path) {
            Some(existing) => existing.merge(handler),
            None => handler,
        };
        by_path.insert(route.path, merged);
    }

    by_path
        .into_iter()
        .fold(Router::new(), |router, (path, handler)| router.route(&path, handler))
        .with_state(service)
}

async fn list<R: Resource>(State(service): State<Shared<R>>) -> Result<Json<Vec<R>>, AppError> {
    Ok(Json(service.list().await?))
}

async fn fetch<R: Resource>(
    State(service): State<Shared<R>>,
    Path(raw): Path<String>,
) -> Result<Json<R>, AppError> {
    let id = service.parse_id(&raw)?;
    Ok(Json(service.get(&id).await?))
}

async fn create<R: Resource>(
    State(service): State<Shared<R>>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Created>), AppError> {
    let Json(body) = body?;
    let payload = service
        .shapes()
        .create
        .accept(body)
        .map_err(|violations| CrudError::Validation {
            collection: R::COLLECTION,
            violations,
        })?;

    let record = service.create(payload).await?;
    Ok((StatusCode::CREATED, Json(Created { id: record.id() })))
}

async fn update<R: Resource>(
    State(service): State<Shared<R>>,
    Path(raw): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Success>, AppError> {
    let id = service.parse_id(&raw)?;
    let Json(body) = body?;
    let patch = service
        .shapes()
        .update
        .accept(body)
        .map_err(|violations| CrudError::Validation {
            collection: R::COLLECTION,
            violations,
        })?;

    service.update(&id, patch).await?;
    Ok(Success::ok())
}

async fn remove<R: Resource>(
    State(service): State<Shared<R>>,
    Path(raw): Path<String>,
) -> Result<Json<Success>, AppError> {
    let id = service.parse_id(&raw)?;
    service.remove(id).await?;
    Ok(Success::ok())
}
