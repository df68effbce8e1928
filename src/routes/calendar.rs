use actix_web::web;

use crate::handlers::calendar;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/calendar")
            .route("", web::get().to(calendar::my_calendar))
            .route("/global", web::get().to(calendar::global_calendar)),
    );
}
