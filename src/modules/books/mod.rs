pub mod models;
pub mod query;
pub mod repository;
pub mod routes;
pub mod service;
pub mod validation;

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use bookshelf_db::Database;
use bookshelf_kernel::{InitCtx, Module};
use serde_json::json;

use repository::CollectionBookRepository;
use service::BookService;

/// Collection holding book documents
pub const COLLECTION: &str = "books";

/// Books module: CRUD and search over book records
pub struct BooksModule {
    service: Arc<BookService>,
}

impl BooksModule {
    pub fn new(service: Arc<BookService>) -> Self {
        Self { service }
    }

    pub fn service(&self) -> &Arc<BookService> {
        &self.service
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
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router(self.service.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(openapi_fragment())
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

/// Create the books module over the `books` collection of `db`
pub fn create_module(db: &Database) -> anyhow::Result<Arc<dyn Module>> {
    let books = db.collection(COLLECTION)?;
    let repository = Arc::new(CollectionBookRepository::new(books));
    let service = Arc::new(BookService::new(repository));
    Ok(Arc::new(BooksModule::new(service)))
}

fn error_response(description: &str) -> serde_json::Value {
    json!({
        "description": description,
        "content": {
            "application/json": {
                "schema": { "$ref": "#/components/schemas/ErrorResponse" }
            }
        }
    })
}

fn text_response(description: &str) -> serde_json::Value {
    json!({
        "description": description,
        "content": {
            "text/plain": {
                "schema": { "type": "string" }
            }
        }
    })
}

fn json_response(description: &str, schema: serde_json::Value) -> serde_json::Value {
    json!({
        "description": description,
        "content": {
            "application/json": { "schema": schema }
        }
    })
}

fn openapi_fragment() -> serde_json::Value {
    let id_parameter = json!({
        "name": "id",
        "in": "path",
        "required": true,
        "schema": { "type": "string" }
    });

    let create = json!({
        "post": {
            "summary": "Enter a new book",
            "tags": ["Books"],
            "requestBody": {
                "required": true,
                "description": "Book data to be created",
                "content": {
                    "application/json": {
                        "schema": { "$ref": "#/components/schemas/BookView" },
                        "example": {
                            "title": "Clean Code",
                            "author": "Robert C. Martin",
                            "description": "A Handbook of Agile Software Craftsmanship",
                            "available": true
                        }
                    }
                }
            },
            "responses": {
                "200": text_response("Book created, message carries the new id"),
                "400": error_response("Validation error")
            }
        }
    });

    let search = json!({
        "get": {
            "summary": "Get information of books",
            "tags": ["Books"],
            "parameters": [
                { "name": "title", "in": "query", "required": false, "schema": { "type": "string" } },
                { "name": "author", "in": "query", "required": false, "schema": { "type": "string" } },
                { "name": "available", "in": "query", "required": false, "schema": { "type": "boolean" } }
            ],
            "responses": {
                "200": json_response(
                    "Matching books",
                    json!({ "type": "array", "items": { "$ref": "#/components/schemas/BookView" } })
                ),
                "400": error_response("Malformed query string")
            }
        }
    });

    let check = json!({
        "get": {
            "summary": "Check names of available books",
            "tags": ["Books"],
            "responses": {
                "200": json_response(
                    "Titles of available books",
                    json!({ "type": "array", "items": { "type": "string" } })
                )
            }
        }
    });

    let health = json!({
        "get": {
            "summary": "Books health check",
            "tags": ["Books"],
            "responses": {
                "200": text_response("OK")
            }
        }
    });

    let by_id = json!({
        "patch": {
            "summary": "Update details of the book",
            "tags": ["Books"],
            "parameters": [id_parameter.clone()],
            "requestBody": {
                "required": true,
                "content": {
                    "application/json": {
                        "schema": { "$ref": "#/components/schemas/PartialUpdate" }
                    }
                }
            },
            "responses": {
                "200": text_response("Book details updated"),
                "400": error_response("Invalid input"),
                "404": error_response("Book not found")
            }
        },
        "delete": {
            "summary": "Delete a book",
            "tags": ["Books"],
            "parameters": [id_parameter],
            "responses": {
                "200": text_response("Book deleted"),
                "404": error_response("Book not found")
            }
        }
    });

    let book_view = json!({
        "type": "object",
        "properties": {
            "title": { "type": "string", "maxLength": 100 },
            "author": { "type": "string", "maxLength": 50 },
            "description": { "type": "string", "maxLength": 300 },
            "available": { "type": "boolean" }
        },
        "required": ["title", "author"]
    });

    let partial_update = json!({
        "type": "object",
        "description": "Only fields that are present are changed",
        "properties": {
            "title": { "type": "string" },
            "author": { "type": "string" },
            "description": { "type": "string" },
            "available": { "type": "boolean" }
        }
    });

    json!({
        "paths": {
            "/create": create,
            "/search": search,
            "/check": check,
            "/health": health,
            "/{id}": by_id
        },
        "components": {
            "schemas": {
                "BookView": book_view,
                "PartialUpdate": partial_update
            }
        }
    })
}
