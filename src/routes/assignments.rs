use actix_web::web;

use crate::handlers::assignments;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/assignments")
            .route("", web::get().to(assignments::my_assignments))
            .route("/pending-count", web::get().to(assignments::pending_count))
            .route("/{id}/respond", web::post().to(assignments::respond)),
    );
}
