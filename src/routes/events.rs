use actix_web::web;

use crate::handlers::{assignments, attendance, events};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/events")
            .route("", web::get().to(events::list_events))
            .route("", web::post().to(events::create_event))
            .route("/my", web::get().to(events::my_events))
            .route("/{id}", web::get().to(events::get_event))
            .route("/{id}", web::patch().to(events::update_event))
            .route("/{id}", web::delete().to(events::delete_event))
            .route("/{id}/register", web::post().to(attendance::register))
            .route("/{id}/register", web::delete().to(attendance::cancel))
            .route("/{id}/attendees", web::get().to(attendance::attendees))
            .route(
                "/{id}/assignments",
                web::get().to(assignments::event_assignments),
            )
            .route("/{id}/respond", web::post().to(assignments::respond_for_event)),
    )
    .service(
        web::scope("/registrations").route("", web::get().to(attendance::my_registrations)),
    );
}
