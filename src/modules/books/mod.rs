pub mod models;
pub mod routes;
pub mod schema;
pub mod store;

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use bookly_kernel::{InitCtx, Migration, Module};
use serde_json::{json, Map, Value};

use routes::BooksState;
use schema::{SchemaRegistry, BOOK_FIELDS};
use store::BookStore;

/// Books module: validation, persistence, and the `/books` routes
pub struct BooksModule {
    state: BooksState,
}

impl BooksModule {
    pub fn new(store: Arc<dyn BookStore>) -> anyhow::Result<Self> {
        Ok(Self {
            state: BooksState {
                store,
                schemas: Arc::new(SchemaRegistry::new()?),
            },
        })
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "books"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            backend = ?ctx.settings.database.backend,
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router(self.state.clone())
    }

    fn openapi(&self) -> Option<Value> {
        Some(openapi_fragment())
    }

    fn migrations(&self) -> Vec<Migration> {
        vec![Migration {
            id: "001_create_books",
            up: r#"
                CREATE TABLE IF NOT EXISTS books (
                    isbn       TEXT PRIMARY KEY,
                    amazon_url TEXT NOT NULL,
                    author     TEXT NOT NULL,
                    language   TEXT NOT NULL,
                    pages      INTEGER NOT NULL,
                    publisher  TEXT NOT NULL,
                    title      TEXT NOT NULL,
                    year       INTEGER NOT NULL
                );
                "#,
        }]
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module stopped");
        Ok(())
    }
}

fn error_response(description: &str) -> Value {
    json!({
        "description": description,
        "content": {
            "application/json": {
                "schema": { "$ref": "#/components/schemas/ErrorResponse" }
            }
        }
    })
}

fn book_response(description: &str) -> Value {
    json!({
        "description": description,
        "content": {
            "application/json": {
                "schema": {
                    "type": "object",
                    "properties": { "book": { "$ref": "#/components/schemas/Book" } },
                    "required": ["book"]
                }
            }
        }
    })
}

fn isbn_parameter() -> Value {
    json!({
        "name": "isbn",
        "in": "path",
        "required": true,
        "schema": { "type": "string" }
    })
}

fn book_request_body() -> Value {
    json!({
        "required": true,
        "content": {
            "application/json": {
                "schema": { "$ref": "#/components/schemas/Book" }
            }
        }
    })
}

/// Book component built from the same field table the validator uses
fn book_component() -> Value {
    let mut properties = Map::new();
    for (field, field_type) in BOOK_FIELDS {
        properties.insert(
            (*field).to_string(),
            json!({ "type": field_type.json_type() }),
        );
    }
    properties.insert(
        "amazon_url".to_string(),
        json!({ "type": "string", "format": "uri" }),
    );
    let required: Vec<&str> = BOOK_FIELDS.iter().map(|(field, _)| *field).collect();

    json!({
        "type": "object",
        "properties": properties,
        "required": required
    })
}

fn openapi_fragment() -> Value {
    json!({
        "paths": {
            "/": {
                "get": {
                    "summary": "List books ordered by title",
                    "tags": ["Books"],
                    "responses": {
                        "200": {
                            "description": "All books",
                            "content": {
                                "application/json": {
                                    "schema": {
                                        "type": "object",
                                        "properties": {
                                            "books": {
                                                "type": "array",
                                                "items": { "$ref": "#/components/schemas/Book" }
                                            }
                                        },
                                        "required": ["books"]
                                    }
                                }
                            }
                        },
                        "500": error_response("Internal server error")
                    }
                },
                "post": {
                    "summary": "Create a book",
                    "tags": ["Books"],
                    "requestBody": book_request_body(),
                    "responses": {
                        "201": book_response("Created book"),
                        "400": error_response("Validation error"),
                        "409": error_response("Duplicate isbn"),
                        "500": error_response("Internal server error")
                    }
                }
            },
            "/{isbn}": {
                "get": {
                    "summary": "Get a book by isbn",
                    "tags": ["Books"],
                    "parameters": [isbn_parameter()],
                    "responses": {
                        "200": book_response("The book"),
                        "404": error_response("Book not found")
                    }
                },
                "put": {
                    "summary": "Replace every field of a book",
                    "tags": ["Books"],
                    "parameters": [isbn_parameter()],
                    "requestBody": book_request_body(),
                    "responses": {
                        "200": book_response("Updated book"),
                        "400": error_response("Validation error or isbn mismatch"),
                        "404": error_response("Book not found"),
                        "409": error_response("Duplicate isbn"),
                        "500": error_response("Internal server error")
                    }
                }
            }
        },
        "components": {
            "schemas": {
                "Book": book_component()
            }
        }
    })
}

/// Create a new instance of the books module
pub fn create_module(store: Arc<dyn BookStore>) -> anyhow::Result<Arc<dyn Module>> {
    Ok(Arc::new(BooksModule::new(store)?))
}
