use actix_web::web;

use crate::handlers::users;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/users")
            .route("", web::get().to(users::list_users))
            .route("", web::post().to(users::provision_user))
            .route("/me", web::get().to(users::me))
            .route("/search", web::get().to(users::search_users))
            .route("/{id}", web::get().to(users::get_user)),
    );
}
