use actix_web::dev::Server;
use actix_web::{middleware::Logger, web, App, HttpServer};
use sqlx::PgPool;
use std::net::TcpListener;

use crate::configuration::Settings;
use crate::middleware::{AuthGate, RateLimiter, RequestLogger};
use crate::routes::{
    create_todo, delete_todo, health, list_todos, login, logout, refresh_token, signup, update_todo,
};

pub fn run(
    listener: TcpListener,
    connection: PgPool,
    settings: Settings,
) -> Result<Server, std::io::Error> {
    let connection = web::Data::new(connection);
    let jwt_config = web::Data::new(settings.jwt.clone());
    // Built once and cloned into the app factory so all workers share one
    // bucket map.
    let rate_limiter = RateLimiter::new(settings.rate_limit.clone());
    let jwt_settings = settings.jwt;

    let server = HttpServer::new(move || {
        App::new()
            // Global middleware
            .wrap(Logger::default())
            .wrap(RequestLogger)

            // Shared state
            .app_data(connection.clone())
            .app_data(jwt_config.clone())

            .route("/health", web::get().to(health))

            // Public auth routes; must be registered before the gated /api
            // scope so they stay reachable without a token. Signup and login
            // are the only rate-limited endpoints.
            .service(
                web::scope("/api/auth")
                    .service(
                        web::resource("/signup")
                            .wrap(rate_limiter.clone())
                            .route(web::post().to(signup)),
                    )
                    .service(
                        web::resource("/login")
                            .wrap(rate_limiter.clone())
                            .route(web::post().to(login)),
                    )
                    .route("/refresh-token", web::post().to(refresh_token))
                    .route("/logout", web::post().to(logout)),
            )

            // Protected routes (require a bearer access token)
            .service(
                web::scope("/api")
                    .wrap(AuthGate::new(jwt_settings.clone()))
                    .route("/todos", web::post().to(create_todo))
                    .route("/todos", web::get().to(list_todos))
                    .route("/todos/{id}", web::patch().to(update_todo))
                    .route("/todos/{id}", web::delete().to(delete_todo)),
            )
    })
    .listen(listener)?
    .run();

    Ok(server)
}
