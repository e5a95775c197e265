//! Handlers for the authenticated example-data CRUD tools.
//!
//! `list_example_data`, `create_example_data`, and `update_example_data`
//! demonstrate user-scoped data access: every handler extracts the caller's
//! identity first and scopes store operations to it.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use rmcp::model::{CallToolResult, JsonObject};
use serde_json::json;

use crate::auth::{Identity, require_identity};
use crate::store::ExampleStore;
use crate::tools::registry::{error_result, json_result};
use crate::tools::{ToolContext, ToolHandler};
use crate::types::ItemId;

const NAME_MAX: usize = 100;
const DESCRIPTION_MAX: usize = 500;

/// Extract the caller's identity or produce the tool-level auth error result.
fn identity_or_error(ctx: &ToolContext) -> Result<Identity, CallToolResult> {
    match require_identity(ctx.auth.as_ref()) {
        Ok(user) => Ok(user.clone()),
        Err(e) => Err(error_result(e.to_string())),
    }
}

/// Validate a `name` argument: required, 1..=100 characters.
fn validate_name(value: Option<&serde_json::Value>, required: bool) -> Result<Option<String>, String> {
    match value {
        None => {
            if required {
                Err("Name is required".to_string())
            } else {
                Ok(None)
            }
        }
        Some(v) => {
            let name = v.as_str().ok_or("Name must be a string")?;
            if name.is_empty() {
                return Err("Name is required".to_string());
            }
            if name.chars().count() > NAME_MAX {
                return Err(format!("Name must be less than {} characters", NAME_MAX));
            }
            Ok(Some(name.to_string()))
        }
    }
}

/// Validate a `description` argument: required, 1..=500 characters.
fn validate_description(
    value: Option<&serde_json::Value>,
    required: bool,
) -> Result<Option<String>, String> {
    match value {
        None => {
            if required {
                Err("Description is required".to_string())
            } else {
                Ok(None)
            }
        }
        Some(v) => {
            let description = v.as_str().ok_or("Description must be a string")?;
            if description.is_empty() {
                return Err("Description is required".to_string());
            }
            if description.chars().count() > DESCRIPTION_MAX {
                return Err(format!(
                    "Description must be less than {} characters",
                    DESCRIPTION_MAX
                ));
            }
            Ok(Some(description.to_string()))
        }
    }
}

/// Handler for the `list_example_data` tool.
pub struct ListExampleDataHandler {
    store: Arc<ExampleStore>,
}

impl ListExampleDataHandler {
    pub fn new(store: Arc<ExampleStore>) -> Self {
        Self { store }
    }
}

impl ToolHandler for ListExampleDataHandler {
    fn name(&self) -> &str {
        "list_example_data"
    }

    fn title(&self) -> Option<&str> {
        Some("List Example Data")
    }

    fn description(&self) -> &str {
        "Retrieves a list of the authenticated user's example data items. \
         Demonstrates user-specific data access with verified identity."
    }

    fn input_schema(&self) -> JsonObject {
        let mut schema = JsonObject::new();
        schema.insert("type".to_string(), json!("object"));
        schema.insert("properties".to_string(), json!({}));
        schema
    }

    fn execute(
        &self,
        _args: JsonObject,
        ctx: &ToolContext,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<CallToolResult>> + Send + '_>> {
        let store = self.store.clone();
        let identity = identity_or_error(ctx);

        Box::pin(async move {
            let user = match identity {
                Ok(user) => user,
                Err(result) => return Ok(result),
            };

            let data = store.list(&user.id).await;
            let payload = json!({
                "userId": user.id,
                "userEmail": user.email,
                "data": data,
                "message": "Successfully retrieved user-specific data",
            });

            Ok(json_result(&payload))
        })
    }
}

/// Handler for the `create_example_data` tool.
pub struct CreateExampleDataHandler {
    store: Arc<ExampleStore>,
}

impl CreateExampleDataHandler {
    pub fn new(store: Arc<ExampleStore>) -> Self {
        Self { store }
    }
}

impl ToolHandler for CreateExampleDataHandler {
    fn name(&self) -> &str {
        "create_example_data"
    }

    fn title(&self) -> Option<&str> {
        Some("Create Example Data")
    }

    fn description(&self) -> &str {
        "Creates a new example data item for the authenticated user. \
         Demonstrates authenticated CRUD operations with input validation."
    }

    fn input_schema(&self) -> JsonObject {
        let mut schema = JsonObject::new();
        schema.insert("type".to_string(), json!("object"));
        schema.insert(
            "properties".to_string(),
            json!({
                "name": {
                    "type": "string",
                    "minLength": 1,
                    "maxLength": NAME_MAX,
                    "description": "Name of the item to create.",
                },
                "description": {
                    "type": "string",
                    "minLength": 1,
                    "maxLength": DESCRIPTION_MAX,
                    "description": "Description of the item to create.",
                },
            }),
        );
        schema.insert("required".to_string(), json!(["name", "description"]));
        schema
    }

    fn execute(
        &self,
        args: JsonObject,
        ctx: &ToolContext,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<CallToolResult>> + Send + '_>> {
        let store = self.store.clone();
        let identity = identity_or_error(ctx);

        Box::pin(async move {
            let user = match identity {
                Ok(user) => user,
                Err(result) => return Ok(result),
            };

            let name = match validate_name(args.get("name"), true) {
                Ok(Some(name)) => name,
                Ok(None) => return Ok(error_result("Name is required")),
                Err(msg) => return Ok(error_result(msg)),
            };
            let description = match validate_description(args.get("description"), true) {
                Ok(Some(description)) => description,
                Ok(None) => return Ok(error_result("Description is required")),
                Err(msg) => return Ok(error_result(msg)),
            };

            let item = store.create(&user.id, name, description).await;
            let payload = json!({
                "created": item,
                "message": format!(
                    "Successfully created new item \"{}\" for user {}",
                    item.name, user.email
                ),
            });

            Ok(json_result(&payload))
        })
    }
}

/// Handler for the `update_example_data` tool.
pub struct UpdateExampleDataHandler {
    store: Arc<ExampleStore>,
}

impl UpdateExampleDataHandler {
    pub fn new(store: Arc<ExampleStore>) -> Self {
        Self { store }
    }
}

impl ToolHandler for UpdateExampleDataHandler {
    fn name(&self) -> &str {
        "update_example_data"
    }

    fn title(&self) -> Option<&str> {
        Some("Update Example Data")
    }

    fn description(&self) -> &str {
        "Updates an existing example data item owned by the authenticated \
         user. Demonstrates ownership validation and partial updates."
    }

    fn input_schema(&self) -> JsonObject {
        let mut schema = JsonObject::new();
        schema.insert("type".to_string(), json!("object"));
        schema.insert(
            "properties".to_string(),
            json!({
                "id": {
                    "type": "string",
                    "minLength": 1,
                    "description": "Id of the item to update.",
                },
                "name": {
                    "type": "string",
                    "minLength": 1,
                    "maxLength": NAME_MAX,
                    "description": "New name, if changing.",
                },
                "description": {
                    "type": "string",
                    "minLength": 1,
                    "maxLength": DESCRIPTION_MAX,
                    "description": "New description, if changing.",
                },
            }),
        );
        schema.insert("required".to_string(), json!(["id"]));
        schema
    }

    fn execute(
        &self,
        args: JsonObject,
        ctx: &ToolContext,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<CallToolResult>> + Send + '_>> {
        let store = self.store.clone();
        let identity = identity_or_error(ctx);

        Box::pin(async move {
            let user = match identity {
                Ok(user) => user,
                Err(result) => return Ok(result),
            };

            let id = match args.get("id").and_then(|v| v.as_str()) {
                Some(id) if !id.is_empty() => ItemId::new(id),
                _ => return Ok(error_result("Item ID is required")),
            };
            let name = match validate_name(args.get("name"), false) {
                Ok(name) => name,
                Err(msg) => return Ok(error_result(msg)),
            };
            let description = match validate_description(args.get("description"), false) {
                Ok(description) => description,
                Err(msg) => return Ok(error_result(msg)),
            };

            match store.update(&user.id, &id, name, description).await {
                Ok(item) => {
                    let payload = json!({
                        "updated": item,
                        "message": format!(
                            "Successfully updated item \"{}\" for user {}",
                            item.name, user.email
                        ),
                    });
                    Ok(json_result(&payload))
                }
                Err(e) => Ok(error_result(e.to_string())),
            }
        })
    }
}
