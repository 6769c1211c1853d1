//! Integration tests for runtime schema construction.
//!
//! These tests build complete schemas from route tables, response models and
//! collection attributes, then execute GraphQL documents against them.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_graphql::dynamic::Schema;
use async_trait::async_trait;
use http::{HeaderMap, HeaderValue, header};
use restgraph_graphql::{
    ErrorFormatter, GraphQLError, RequestContext, SchemaBuilder, SchemaBuilderConfig,
    SchemaSources,
};
use restgraph_rest::{
    FieldRule, HttpMethod, MODEL_ERROR, MODEL_ERROR_DEV, MemoryModelRegistry, Resources,
    ResponseShape, RestError, RestRequest, RestResponse, RouteDefinition, RouteExecutor,
    RouteParam, RouteRegistry, Validator,
};
use restgraph_storage::{
    Attribute, AttributeStatus, Document, DocumentStore, DynDocumentStore, ListQuery,
    MemoryStore, StorageError,
};
use serde_json::{Value, json};

// =============================================================================
// Mocks
// =============================================================================

/// Returns canned responses by route path and records every request.
#[derive(Default)]
struct FixtureExecutor {
    responses: HashMap<String, RestResponse>,
    requests: Mutex<Vec<RestRequest>>,
}

impl FixtureExecutor {
    fn with_response(mut self, path: &str, model: &str, payload: Value) -> Self {
        self.responses
            .insert(path.to_string(), RestResponse::new(model, payload));
        self
    }

    fn requests(&self) -> Vec<RestRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl RouteExecutor for FixtureExecutor {
    async fn execute(
        &self,
        route: &RouteDefinition,
        request: RestRequest,
    ) -> Result<RestResponse, RestError> {
        self.requests.lock().unwrap().push(request);
        self.responses
            .get(&route.path)
            .cloned()
            .ok_or_else(|| RestError::execution(format!("no fixture for {}", route.path), 404))
    }
}

/// Delegates to a [`MemoryStore`], failing creates in one collection and
/// panicking on reads of another.
struct FaultyStore {
    inner: MemoryStore,
    failing_collection: &'static str,
    panicking_collection: &'static str,
}

#[async_trait]
impl DocumentStore for FaultyStore {
    async fn get_document(
        &self,
        collection_id: &str,
        id: &str,
    ) -> Result<Option<Document>, StorageError> {
        if collection_id == self.panicking_collection {
            panic!("corrupted page in {collection_id}");
        }
        self.inner.get_document(collection_id, id).await
    }

    async fn list_documents(
        &self,
        collection_id: &str,
        query: &ListQuery,
    ) -> Result<Vec<Document>, StorageError> {
        self.inner.list_documents(collection_id, query).await
    }

    async fn create_document(
        &self,
        collection_id: &str,
        document: Document,
    ) -> Result<Document, StorageError> {
        if collection_id == self.failing_collection {
            return Err(StorageError::connection_error("write replica unavailable"));
        }
        self.inner.create_document(collection_id, document).await
    }

    async fn update_document(
        &self,
        collection_id: &str,
        id: &str,
        changes: Document,
    ) -> Result<Document, StorageError> {
        self.inner.update_document(collection_id, id, changes).await
    }

    async fn delete_document(
        &self,
        collection_id: &str,
        id: &str,
    ) -> Result<Document, StorageError> {
        self.inner.delete_document(collection_id, id).await
    }
}

// =============================================================================
// Fixtures
// =============================================================================

fn models() -> MemoryModelRegistry {
    MemoryModelRegistry::new()
        .with_model(
            ResponseShape::new("User")
                .with_rule("name", FieldRule::new("string"))
                .with_rule("$id", FieldRule::new("string")),
        )
        .with_model(
            ResponseShape::new("userList")
                .with_rule("total", FieldRule::new("integer"))
                .with_rule("users", FieldRule::new("User").with_array(true)),
        )
}

fn routes() -> RouteRegistry {
    RouteRegistry::new()
        .with_route(
            RouteDefinition::new(HttpMethod::Get, "/v1/users")
                .with_sdk("users", "list")
                .with_description("List users")
                .with_response_model("userList")
                .with_param(RouteParam::new("search", Validator::Text { max_length: 256 }))
                .with_param(
                    RouteParam::new("limit", Validator::Range { min: 1, max: 100 })
                        .with_default(json!(25)),
                ),
        )
        .with_route(
            RouteDefinition::new(HttpMethod::Get, "/v1/account")
                .with_sdk("account", "get")
                .with_response_model("User"),
        )
        .with_route(
            RouteDefinition::new(HttpMethod::Post, "/v1/users")
                .with_sdk("users", "create")
                .with_response_model("User")
                .with_param(RouteParam::new("email", Validator::Email).required()),
        )
}

fn attributes() -> Vec<Attribute> {
    vec![
        Attribute::new("posts", "title", "string").with_required(true),
        Attribute::new("posts", "views", "integer"),
        Attribute::new("posts", "tags", "string").with_array(true),
        Attribute::new("comments", "body", "string"),
        Attribute::new("drafts", "title", "string").with_status(AttributeStatus::Processing),
    ]
}

async fn build(
    executor: Arc<FixtureExecutor>,
    attributes: Vec<Attribute>,
    documents: Option<DynDocumentStore>,
) -> Schema {
    let store = Arc::new(MemoryStore::with_attributes(attributes));
    let fallback: DynDocumentStore = store.clone();
    let documents = documents.unwrap_or(fallback);
    let sources = SchemaSources {
        routes: Arc::new(routes()),
        models: Arc::new(models()),
        executor,
        resources: Resources::new(),
        attributes: store,
        documents,
    };
    SchemaBuilder::new(sources, SchemaBuilderConfig::default())
        .build()
        .await
        .expect("schema should build")
}

async fn execute(schema: &Schema, query: &str) -> async_graphql::Response {
    schema.execute(query).await
}

fn data(response: &async_graphql::Response) -> Value {
    response.data.clone().into_json().unwrap()
}

fn error_path(response: &async_graphql::Response, index: usize) -> Value {
    serde_json::to_value(&response.errors[index]).unwrap()["path"].clone()
}

// =============================================================================
// Schema shape
// =============================================================================

#[tokio::test]
async fn test_collection_mutations_are_sorted() {
    let schema = build(Arc::new(FixtureExecutor::default()), attributes(), None).await;

    let response = execute(&schema, "{ __schema { mutationType { fields { name } } } }").await;

    assert!(response.errors.is_empty(), "{:?}", response.errors);
    let names: Vec<String> = data(&response)["__schema"]["mutationType"]["fields"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(
        names,
        vec![
            "commentsCreate",
            "commentsDelete",
            "commentsUpdate",
            "postsCreate",
            "postsDelete",
            "postsUpdate",
            "usersCreate"
        ]
    );
}

#[tokio::test]
async fn test_unavailable_attributes_emit_nothing() {
    let schema = build(Arc::new(FixtureExecutor::default()), attributes(), None).await;
    let sdl = schema.sdl();

    assert!(!sdl.contains("drafts"));
}

#[tokio::test]
async fn test_query_fields_are_sorted() {
    let schema = build(Arc::new(FixtureExecutor::default()), attributes(), None).await;

    let response = execute(&schema, "{ __schema { queryType { fields { name } } } }").await;

    assert!(response.errors.is_empty(), "{:?}", response.errors);
    let names: Vec<String> = data(&response)["__schema"]["queryType"]["fields"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(
        names,
        vec![
            "accountGet",
            "commentsGet",
            "commentsList",
            "postsGet",
            "postsList",
            "usersList"
        ]
    );
}

#[tokio::test]
async fn test_route_argument_types() {
    let schema = build(Arc::new(FixtureExecutor::default()), Vec::new(), None).await;
    let sdl = schema.sdl();

    assert!(sdl.contains("search: String"));
    assert!(sdl.contains("limit: Int = 25"));
    assert!(sdl.contains("usersCreate(email: String!): User"));
    assert!(sdl.contains("_id: String"));
}

#[tokio::test]
async fn test_empty_sources_build_placeholder_query() {
    let store = Arc::new(MemoryStore::new());
    let sources = SchemaSources {
        routes: Arc::new(RouteRegistry::new()),
        models: Arc::new(MemoryModelRegistry::new()),
        executor: Arc::new(FixtureExecutor::default()),
        resources: Resources::new(),
        attributes: store.clone(),
        documents: store,
    };
    let schema = SchemaBuilder::new(sources, SchemaBuilderConfig::default())
        .build()
        .await
        .unwrap();

    let response = execute(&schema, "{ _placeholder }").await;

    assert!(response.errors.is_empty());
    assert!(!schema.sdl().contains("type Mutation"));
}

#[tokio::test]
async fn test_missing_injection_fails_build() {
    let store = Arc::new(MemoryStore::new());
    let routes = RouteRegistry::new().with_route(
        RouteDefinition::new(HttpMethod::Get, "/v1/teams")
            .with_sdk("teams", "list")
            .with_response_model("User")
            .with_param(
                RouteParam::new(
                    "queries",
                    restgraph_rest::ValidatorFactory::new(|injected| {
                        let _ = injected.get::<String>("dbForProject")?;
                        Ok(Validator::Json)
                    }),
                )
                .with_injections(["dbForProject"]),
            ),
    );
    let sources = SchemaSources {
        routes: Arc::new(routes),
        models: Arc::new(models()),
        executor: Arc::new(FixtureExecutor::default()),
        resources: Resources::new(),
        attributes: store.clone(),
        documents: store,
    };

    let err = SchemaBuilder::new(sources, SchemaBuilderConfig::default())
        .build()
        .await
        .err()
        .unwrap();

    assert!(matches!(err, GraphQLError::MissingResource(name) if name == "dbForProject"));
}

// =============================================================================
// Route resolution
// =============================================================================

#[tokio::test]
async fn test_collection_named_like_model_is_skipped() {
    let executor = Arc::new(FixtureExecutor::default().with_response(
        "/v1/account",
        "User",
        json!({"name": "Ada", "$id": "u1"}),
    ));
    let schema = build(
        executor,
        vec![
            Attribute::new("User", "nickname", "string"),
            Attribute::new("posts", "title", "string"),
        ],
        None,
    )
    .await;

    let sdl = schema.sdl();
    assert!(!sdl.contains("UserGet"));
    assert!(!sdl.contains("nickname"));
    assert!(sdl.contains("postsGet"));

    let response = execute(&schema, "{ accountGet { name } }").await;
    assert!(response.errors.is_empty(), "{:?}", response.errors);
    assert_eq!(data(&response), json!({"accountGet": {"name": "Ada"}}));
}

#[tokio::test]
async fn test_reserved_collection_names_are_skipped() {
    let schema = build(
        Arc::new(FixtureExecutor::default()),
        vec![
            Attribute::new("Query", "title", "string"),
            Attribute::new("Mutation", "title", "string"),
            Attribute::new("Json", "title", "string"),
            Attribute::new("posts", "title", "string"),
        ],
        None,
    )
    .await;

    let sdl = schema.sdl();
    for name in ["QueryGet", "MutationCreate", "JsonList"] {
        assert!(!sdl.contains(name), "{name} in schema");
    }

    let response = execute(&schema, r#"mutation { postsCreate(title: "Hi") { title } }"#).await;
    assert!(response.errors.is_empty(), "{:?}", response.errors);
    assert_eq!(data(&response), json!({"postsCreate": {"title": "Hi"}}));
}

#[tokio::test]
async fn test_route_payload_resolves_escaped_keys() {
    let executor = Arc::new(
        FixtureExecutor::default().with_response(
            "/v1/account",
            "User",
            json!({"name": "Ada", "$id": "u1"}),
        ),
    );
    let schema = build(executor, Vec::new(), None).await;

    let response = execute(&schema, "{ accountGet { name _id } }").await;

    assert!(response.errors.is_empty(), "{:?}", response.errors);
    assert_eq!(
        data(&response),
        json!({"accountGet": {"name": "Ada", "_id": "u1"}})
    );
}

#[tokio::test]
async fn test_route_list_uses_nested_model() {
    let executor = Arc::new(FixtureExecutor::default().with_response(
        "/v1/users",
        "userList",
        json!({
            "total": 2,
            "users": [{"name": "Ada", "$id": "u1"}, {"name": "Linus", "$id": "u2"}]
        }),
    ));
    let schema = build(executor.clone(), Vec::new(), None).await;

    let response = execute(&schema, r#"{ usersList(search: "a") { total users { _id name } } }"#).await;

    assert!(response.errors.is_empty(), "{:?}", response.errors);
    assert_eq!(
        data(&response),
        json!({"usersList": {"total": 2, "users": [
            {"_id": "u1", "name": "Ada"},
            {"_id": "u2", "name": "Linus"}
        ]}})
    );

    let requests = executor.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, HttpMethod::Get);
    assert_eq!(requests[0].params["search"], json!("a"));
    assert_eq!(requests[0].params["limit"], json!(25));
}

#[tokio::test]
async fn test_route_request_drops_json_content_type() {
    let executor = Arc::new(FixtureExecutor::default().with_response(
        "/v1/users",
        "User",
        json!({"name": "Grace", "$id": "u3"}),
    ));
    let schema = build(executor.clone(), Vec::new(), None).await;

    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert("x-project", HeaderValue::from_static("console"));
    let request = async_graphql::Request::new(
        r#"mutation { usersCreate(email: "grace@example.com") { name } }"#,
    )
    .data(RequestContext::new(headers));

    let response = schema.execute(request).await;

    assert!(response.errors.is_empty(), "{:?}", response.errors);
    let requests = executor.requests();
    assert_eq!(requests[0].method, HttpMethod::Post);
    assert!(requests[0].headers.get(header::CONTENT_TYPE).is_none());
    assert_eq!(requests[0].headers["x-project"], "console");
    assert_eq!(requests[0].params["email"], json!("grace@example.com"));
}

#[tokio::test]
async fn test_route_error_models_reject_field() {
    let executor = Arc::new(
        FixtureExecutor::default()
            .with_response(
                "/v1/account",
                MODEL_ERROR_DEV,
                json!({
                    "message": "User (role: guests) missing scope (account)",
                    "code": 401,
                    "file": "/app/account.rs",
                    "line": 88,
                    "trace": [{"function": "get"}]
                }),
            )
            .with_response(
                "/v1/users",
                MODEL_ERROR,
                json!({"message": "Rate limit exceeded", "code": 429}),
            ),
    );
    let schema = build(executor, Vec::new(), None).await;

    let response = execute(&schema, "{ accountGet { name } }").await;
    let development = ErrorFormatter::new(true, "1.4.0").apply(response);
    let body = serde_json::to_value(&development).unwrap();
    assert!(body["data"].get("accountGet").is_none());
    assert_eq!(body["errors"][0]["path"], json!(["accountGet"]));
    let extensions = &body["errors"][0]["extensions"];
    assert_eq!(extensions["code"], 401);
    assert_eq!(extensions["version"], "1.4.0");
    assert_eq!(extensions["file"], "/app/account.rs");
    assert_eq!(extensions["line"], 88);

    let response = execute(&schema, "{ accountGet { name } }").await;
    let production = ErrorFormatter::new(false, "1.4.0").apply(response);
    let body = serde_json::to_value(&production).unwrap();
    assert!(body["errors"][0]["extensions"].get("file").is_none());
    assert!(body["errors"][0]["extensions"].get("line").is_none());

    let response = execute(&schema, "{ usersList { total } }").await;
    assert_eq!(response.errors.len(), 1);
    assert_eq!(response.errors[0].message, "Rate limit exceeded");
}

// =============================================================================
// Collection resolution
// =============================================================================

#[tokio::test]
async fn test_collection_crud_round_trip() {
    let schema = build(Arc::new(FixtureExecutor::default()), attributes(), None).await;

    let created = execute(
        &schema,
        r#"mutation { postsCreate(title: "Hello", views: 3, tags: ["intro"]) { title views tags } }"#,
    )
    .await;
    assert!(created.errors.is_empty(), "{:?}", created.errors);
    assert_eq!(
        data(&created),
        json!({"postsCreate": {"title": "Hello", "views": 3, "tags": ["intro"]}})
    );

    let listed = execute(&schema, "{ postsList(limit: 10) { title } }").await;
    assert_eq!(data(&listed), json!({"postsList": [{"title": "Hello"}]}));

    let second = execute(
        &schema,
        r#"mutation { second: postsCreate(title: "World") { title } }"#,
    )
    .await;
    assert!(second.errors.is_empty(), "{:?}", second.errors);
    let listed = execute(
        &schema,
        r#"{ postsList(orderAttributes: ["title"], orderType: ["DESC"]) { title } }"#,
    )
    .await;
    assert_eq!(
        data(&listed),
        json!({"postsList": [{"title": "World"}, {"title": "Hello"}]})
    );

    let missing = execute(&schema, r#"{ postsGet(id: "nope") { title } }"#).await;
    assert!(missing.errors.is_empty());
    assert_eq!(data(&missing), json!({"postsGet": null}));
}

#[tokio::test]
async fn test_update_and_delete_by_id() {
    let store = Arc::new(MemoryStore::with_attributes(attributes()));
    store
        .seed_documents(
            "posts",
            vec![
                serde_json::from_value(json!({"$id": "p1", "title": "Draft", "views": 0}))
                    .unwrap(),
            ],
        )
        .await;
    let sources = SchemaSources {
        routes: Arc::new(routes()),
        models: Arc::new(models()),
        executor: Arc::new(FixtureExecutor::default()),
        resources: Resources::new(),
        attributes: store.clone(),
        documents: store.clone(),
    };
    let schema = SchemaBuilder::new(sources, SchemaBuilderConfig::default())
        .build()
        .await
        .unwrap();

    let updated = execute(
        &schema,
        r#"mutation { postsUpdate(id: "p1", title: "Published", views: 10) { title views } }"#,
    )
    .await;
    assert!(updated.errors.is_empty(), "{:?}", updated.errors);
    assert_eq!(
        data(&updated),
        json!({"postsUpdate": {"title": "Published", "views": 10}})
    );

    let fetched = execute(&schema, r#"{ postsGet(id: "p1") { title } }"#).await;
    assert_eq!(data(&fetched), json!({"postsGet": {"title": "Published"}}));

    let deleted = execute(&schema, r#"mutation { postsDelete(id: "p1") { title } }"#).await;
    assert_eq!(data(&deleted), json!({"postsDelete": {"title": "Published"}}));
    assert_eq!(store.document_count("posts").await, 0);

    let again = execute(&schema, r#"mutation { postsDelete(id: "p1") { title } }"#).await;
    assert_eq!(again.errors.len(), 1);
}

#[tokio::test]
async fn test_update_addressed_by_numeric_id_attribute() {
    let store = Arc::new(MemoryStore::with_attributes(vec![
        Attribute::new("tickets", "id", "integer"),
        Attribute::new("tickets", "subject", "string"),
    ]));
    store
        .seed_documents(
            "tickets",
            vec![serde_json::from_value(json!({"$id": "7", "id": 7, "subject": "Broken"})).unwrap()],
        )
        .await;
    let sources = SchemaSources {
        routes: Arc::new(RouteRegistry::new()),
        models: Arc::new(models()),
        executor: Arc::new(FixtureExecutor::default()),
        resources: Resources::new(),
        attributes: store.clone(),
        documents: store.clone(),
    };
    let schema = SchemaBuilder::new(sources, SchemaBuilderConfig::default())
        .build()
        .await
        .unwrap();
    assert!(schema.sdl().contains("id: Int!"));

    let updated = execute(
        &schema,
        r#"mutation { ticketsUpdate(id: 7, subject: "Fixed") { id subject } }"#,
    )
    .await;
    assert!(updated.errors.is_empty(), "{:?}", updated.errors);
    assert_eq!(
        data(&updated),
        json!({"ticketsUpdate": {"id": 7, "subject": "Fixed"}})
    );

    let missing = execute(&schema, r#"mutation { ticketsUpdate(subject: "x") { id } }"#).await;
    assert_eq!(missing.errors.len(), 1);
}

#[tokio::test]
async fn test_failed_create_does_not_affect_siblings() {
    let documents: DynDocumentStore = Arc::new(FaultyStore {
        inner: MemoryStore::new(),
        failing_collection: "posts",
        panicking_collection: "none",
    });
    let schema = build(
        Arc::new(FixtureExecutor::default()),
        attributes(),
        Some(documents),
    )
    .await;

    let response = execute(
        &schema,
        r#"mutation {
            postsCreate(title: "Hello") { title }
            commentsCreate(body: "First!") { body }
        }"#,
    )
    .await;

    assert_eq!(data(&response), json!({"commentsCreate": {"body": "First!"}}));
    assert_eq!(response.errors.len(), 1);
    assert_eq!(error_path(&response, 0), json!(["postsCreate"]));
    assert_eq!(
        response.errors[0].message,
        "Connection error: write replica unavailable"
    );
    let envelope = ErrorFormatter::new(false, "1.4.0").format(&response.errors[0]);
    assert_eq!(envelope.code, 503);
}

#[tokio::test]
async fn test_panicking_store_rejects_one_field() {
    let inner = MemoryStore::new();
    inner
        .seed_documents(
            "posts",
            vec![serde_json::from_value(json!({"$id": "p1", "title": "Kept"})).unwrap()],
        )
        .await;
    let documents: DynDocumentStore = Arc::new(FaultyStore {
        inner,
        failing_collection: "none",
        panicking_collection: "comments",
    });
    let schema = build(
        Arc::new(FixtureExecutor::default()),
        attributes(),
        Some(documents),
    )
    .await;

    let response = execute(
        &schema,
        r#"{ postsGet(id: "p1") { title } commentsGet(id: "c1") { body } }"#,
    )
    .await;

    assert_eq!(data(&response), json!({"postsGet": {"title": "Kept"}}));
    assert_eq!(response.errors.len(), 1);
    assert_eq!(error_path(&response, 0), json!(["commentsGet"]));
    assert_eq!(response.errors[0].message, "corrupted page in comments");
}
