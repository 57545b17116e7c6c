//!
//! # Task endpoints
//!
//! Reads require an authenticated caller of any role; mutations require
//! the LEADER role. Every read filters on ACTIVE status, so a
//! soft-deleted task is indistinguishable from one that never existed.

use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::{
    auth::CurrentUser,
    db,
    error::AppError,
    models::{Role, SearchParams, Task, TaskInput, TaskResponse},
};

/// Lists all active tasks.
#[get("")]
pub async fn list_tasks(
    pool: web::Data<PgPool>,
    _current: CurrentUser,
) -> Result<impl Responder, AppError> {
    let tasks = db::tasks::find_all_active(pool.get_ref()).await?;
    Ok(HttpResponse::Ok().json(tasks.iter().map(TaskResponse::from).collect::<Vec<_>>()))
}

/// Retrieves an active task by id.
#[get("/{id}")]
pub async fn get_task(
    pool: web::Data<PgPool>,
    _current: CurrentUser,
    id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let task = db::tasks::find_active_by_id(pool.get_ref(), id.into_inner())
        .await?
        .ok_or_else(|| AppError::NotFound("Task not found".into()))?;
    Ok(HttpResponse::Ok().json(TaskResponse::from(&task)))
}

/// Lists the active tasks owned by a user.
#[get("/user/{user_id}")]
pub async fn list_user_tasks(
    pool: web::Data<PgPool>,
    _current: CurrentUser,
    user_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let tasks = db::tasks::find_all_active_by_user(pool.get_ref(), user_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(tasks.iter().map(TaskResponse::from).collect::<Vec<_>>()))
}

/// Retrieves an active task by id, scoped to an owner.
#[get("/{id}/user/{user_id}")]
pub async fn get_task_for_user(
    pool: web::Data<PgPool>,
    _current: CurrentUser,
    path: web::Path<(Uuid, Uuid)>,
) -> Result<impl Responder, AppError> {
    let (id, user_id) = path.into_inner();
    let task = db::tasks::find_active_by_id_and_user(pool.get_ref(), id, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Task not found".into()))?;
    Ok(HttpResponse::Ok().json(TaskResponse::from(&task)))
}

/// Searches active tasks by title substring (case-insensitive) with
/// pagination and sorting.
#[get("/search")]
pub async fn search_tasks(
    pool: web::Data<PgPool>,
    _current: CurrentUser,
    params: web::Query<SearchParams>,
) -> Result<impl Responder, AppError> {
    let page = db::tasks::search_active_by_title(
        pool.get_ref(),
        &params.title,
        None,
        params.page,
        params.size,
        &params.sort_by,
        &params.sort_dir,
    )
    .await?;
    Ok(HttpResponse::Ok().json(page.map(|task| TaskResponse::from(&task))))
}

/// Owner-scoped variant of the title search.
#[get("/user/{user_id}/search")]
pub async fn search_user_tasks(
    pool: web::Data<PgPool>,
    _current: CurrentUser,
    user_id: web::Path<Uuid>,
    params: web::Query<SearchParams>,
) -> Result<impl Responder, AppError> {
    let page = db::tasks::search_active_by_title(
        pool.get_ref(),
        &params.title,
        Some(user_id.into_inner()),
        params.page,
        params.size,
        &params.sort_by,
        &params.sort_dir,
    )
    .await?;
    Ok(HttpResponse::Ok().json(page.map(|task| TaskResponse::from(&task))))
}

/// Creates a task on behalf of the user named in the payload. LEADER
/// only; the owner must resolve to an ACTIVE user.
#[post("")]
pub async fn create_task(
    pool: web::Data<PgPool>,
    current: CurrentUser,
    payload: web::Json<TaskInput>,
) -> Result<impl Responder, AppError> {
    current.require_role(Role::Leader)?;
    payload.validate()?;

    let owner = db::users::find_active_by_id(pool.get_ref(), payload.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    let input = payload.into_inner();
    let task = Task::new(input.title, input.description, owner.id);
    let task = db::tasks::insert(pool.get_ref(), &task).await?;

    Ok(HttpResponse::Created().json(TaskResponse::from(&task)))
}

/// Replaces a task. LEADER only.
///
/// Update is soft-delete-old plus insert-new rather than in-place
/// mutation: the old id stops resolving and the response carries the
/// replacement's fresh id, which callers must use from then on.
#[put("/{id}")]
pub async fn update_task(
    pool: web::Data<PgPool>,
    current: CurrentUser,
    id: web::Path<Uuid>,
    payload: web::Json<TaskInput>,
) -> Result<impl Responder, AppError> {
    current.require_role(Role::Leader)?;
    payload.validate()?;

    let existing = db::tasks::find_active_by_id(pool.get_ref(), id.into_inner())
        .await?
        .ok_or_else(|| AppError::NotFound("Task not found".into()))?;
    let owner = db::users::find_active_by_id(pool.get_ref(), payload.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    db::tasks::soft_delete(pool.get_ref(), existing.id).await?;

    let input = payload.into_inner();
    let replacement = Task::new(input.title, input.description, owner.id);
    let replacement = db::tasks::insert(pool.get_ref(), &replacement).await?;

    Ok(HttpResponse::Ok().json(TaskResponse::from(&replacement)))
}

/// Soft-deletes a task. LEADER only. The row is retained for history;
/// all reads stop seeing it.
#[delete("/{id}")]
pub async fn delete_task(
    pool: web::Data<PgPool>,
    current: CurrentUser,
    id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    current.require_role(Role::Leader)?;

    let transitioned = db::tasks::soft_delete(pool.get_ref(), id.into_inner()).await?;
    if transitioned == 0 {
        return Err(AppError::NotFound("Task not found".into()));
    }

    Ok(HttpResponse::NoContent().finish())
}
