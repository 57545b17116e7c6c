pub mod auth;
pub mod health;
pub mod tasks;

use actix_web::web;

/// Routes mounted under the authenticated `/api/v1` scope.
/// `/tasks/search` is registered ahead of `/tasks/{id}` so the literal
/// segment wins the match.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .service(auth::register)
            .service(auth::login),
    )
    .service(
        web::scope("/tasks")
            .service(tasks::search_tasks)
            .service(tasks::search_user_tasks)
            .service(tasks::list_user_tasks)
            .service(tasks::get_task_for_user)
            .service(tasks::list_tasks)
            .service(tasks::create_task)
            .service(tasks::get_task)
            .service(tasks::update_task)
            .service(tasks::delete_task),
    );
}
