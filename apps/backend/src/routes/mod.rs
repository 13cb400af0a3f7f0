use actix_web::web;

pub mod auth;
pub mod comments;
pub mod health;
pub mod posts;
pub mod users;
pub mod visits;

/// Registers every route group. `main.rs` and the integration tests use
/// the same table so guarded paths behave identically in both.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/health").configure(health::configure_routes));

    // Signup, login, verify-auth live directly under /api.
    cfg.service(web::scope("/api/secure").configure(users::configure_routes));
    cfg.service(web::scope("/api/posts").configure(posts::configure_routes));
    cfg.service(web::scope("/api/comments").configure(comments::configure_routes));
    cfg.service(
        web::scope("/api")
            .configure(auth::configure_routes)
            .configure(visits::configure_routes),
    );
}
