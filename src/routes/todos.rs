/// To-do CRUD endpoints.
///
/// Every route sits behind the auth gate; the owner comes from the verified
/// claims, never from the request body, and all queries are scoped to it.
use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::Claims;
use crate::error::{AppError, DatabaseError, ValidationError};

const PRIORITIES: [&str; 3] = ["Low", "Medium", "High"];
const DEFAULT_PRIORITY: &str = "Medium";

#[derive(Debug, sqlx::FromRow)]
pub struct Todo {
    pub id: Uuid,
    pub user_id: Uuid,
    pub text: String,
    pub completed: bool,
    pub priority: String,
    pub due_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTodoRequest {
    pub text: String,
    pub priority: Option<String>,
    pub due_date: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTodoRequest {
    pub text: Option<String>,
    pub completed: Option<bool>,
    pub priority: Option<String>,
    pub due_date: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoResponse {
    pub id: String,
    pub text: String,
    pub completed: bool,
    pub priority: String,
    pub due_date: Option<String>,
    pub created_at: String,
}

impl From<Todo> for TodoResponse {
    fn from(todo: Todo) -> Self {
        Self {
            id: todo.id.to_string(),
            text: todo.text,
            completed: todo.completed,
            priority: todo.priority,
            due_date: todo.due_date.map(|d| d.to_rfc3339()),
            created_at: todo.created_at.to_rfc3339(),
        }
    }
}

fn parse_priority(value: Option<&str>) -> Result<String, AppError> {
    match value {
        None => Ok(DEFAULT_PRIORITY.to_string()),
        Some(p) if PRIORITIES.contains(&p) => Ok(p.to_string()),
        Some(_) => Err(ValidationError::InvalidFormat("priority").into()),
    }
}

fn parse_due_date(value: Option<&str>) -> Result<Option<DateTime<Utc>>, AppError> {
    match value {
        None => Ok(None),
        Some(raw) => DateTime::parse_from_rfc3339(raw)
            .map(|dt| Some(dt.with_timezone(&Utc)))
            .map_err(|_| ValidationError::InvalidFormat("dueDate").into()),
    }
}

/// POST /api/todos
pub async fn create_todo(
    claims: web::ReqData<Claims>,
    form: web::Json<CreateTodoRequest>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let user_id = claims.user_id()?;

    let text = form.text.trim();
    if text.is_empty() {
        return Err(ValidationError::EmptyField("text").into());
    }
    let priority = parse_priority(form.priority.as_deref())?;
    let due_date = parse_due_date(form.due_date.as_deref())?;

    let todo = sqlx::query_as::<_, Todo>(
        r#"
        INSERT INTO todos (id, user_id, text, completed, priority, due_date, created_at)
        VALUES ($1, $2, $3, FALSE, $4, $5, $6)
        RETURNING id, user_id, text, completed, priority, due_date, created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(text)
    .bind(&priority)
    .bind(due_date)
    .bind(Utc::now())
    .fetch_one(pool.get_ref())
    .await?;

    tracing::info!(user_id = %user_id, todo_id = %todo.id, "Todo created");

    Ok(HttpResponse::Created().json(TodoResponse::from(todo)))
}

/// GET /api/todos — only the caller's todos.
pub async fn list_todos(
    claims: web::ReqData<Claims>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let user_id = claims.user_id()?;

    let todos = sqlx::query_as::<_, Todo>(
        r#"
        SELECT id, user_id, text, completed, priority, due_date, created_at
        FROM todos
        WHERE user_id = $1
        ORDER BY created_at
        "#,
    )
    .bind(user_id)
    .fetch_all(pool.get_ref())
    .await?;

    let body: Vec<TodoResponse> = todos.into_iter().map(TodoResponse::from).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// PATCH /api/todos/{id}
///
/// Partial update. Another user's todo is indistinguishable from a missing
/// one: both 404.
pub async fn update_todo(
    claims: web::ReqData<Claims>,
    path: web::Path<Uuid>,
    form: web::Json<UpdateTodoRequest>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let user_id = claims.user_id()?;
    let todo_id = path.into_inner();

    let todo = sqlx::query_as::<_, Todo>(
        r#"
        SELECT id, user_id, text, completed, priority, due_date, created_at
        FROM todos
        WHERE id = $1 AND user_id = $2
        "#,
    )
    .bind(todo_id)
    .bind(user_id)
    .fetch_optional(pool.get_ref())
    .await?
    .ok_or_else(|| AppError::Database(DatabaseError::NotFound("Todo not found".to_string())))?;

    let text = match form.text.as_deref() {
        Some(t) if t.trim().is_empty() => {
            return Err(ValidationError::EmptyField("text").into());
        }
        Some(t) => t.trim().to_string(),
        None => todo.text,
    };
    let completed = form.completed.unwrap_or(todo.completed);
    let priority = match form.priority.as_deref() {
        Some(p) => parse_priority(Some(p))?,
        None => todo.priority,
    };
    let due_date = match form.due_date.as_deref() {
        Some(raw) => parse_due_date(Some(raw))?,
        None => todo.due_date,
    };

    let updated = sqlx::query_as::<_, Todo>(
        r#"
        UPDATE todos
        SET text = $1, completed = $2, priority = $3, due_date = $4
        WHERE id = $5 AND user_id = $6
        RETURNING id, user_id, text, completed, priority, due_date, created_at
        "#,
    )
    .bind(&text)
    .bind(completed)
    .bind(&priority)
    .bind(due_date)
    .bind(todo_id)
    .bind(user_id)
    .fetch_one(pool.get_ref())
    .await?;

    Ok(HttpResponse::Ok().json(TodoResponse::from(updated)))
}

/// DELETE /api/todos/{id}
pub async fn delete_todo(
    claims: web::ReqData<Claims>,
    path: web::Path<Uuid>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let user_id = claims.user_id()?;
    let todo_id = path.into_inner();

    let result = sqlx::query("DELETE FROM todos WHERE id = $1 AND user_id = $2")
        .bind(todo_id)
        .bind(user_id)
        .execute(pool.get_ref())
        .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound("Todo not found".to_string()).into());
    }

    tracing::info!(user_id = %user_id, todo_id = %todo_id, "Todo deleted");

    Ok(HttpResponse::Ok().json(serde_json::json!({ "message": "Todo deleted" })))
}
