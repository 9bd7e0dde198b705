use actix_web::web;

pub mod encode;
pub mod search;
pub mod system;

/// Register all HTTP routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(search::search)
        .service(encode::encode)
        .service(encode::encode_csv)
        .service(system::health);
}
