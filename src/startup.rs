use actix_cors::Cors;
use actix_web::dev::Server;
use actix_web::http::header;
use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use std::net::TcpListener;
use std::sync::Arc;

use crate::auth::{PasswordHasher, TokenIssuer};
use crate::configuration::Settings;
use crate::error::{AppError, ValidationError};
use crate::middleware::{AuthGuard, AuthGuardMiddleware, RequestLogger, REQUEST_ID_HEADER};
use crate::repository::UserRepository;
use crate::routes::{
    change_password, get_user_details, health_check, log_out, login, refresh_token,
    register_user, CookiePolicy,
};
use crate::session::SessionManager;

pub fn run(
    listener: TcpListener,
    repository: Arc<dyn UserRepository>,
    settings: &Settings,
) -> Result<Server, std::io::Error> {
    let issuer = Arc::new(TokenIssuer::new(&settings.jwt));
    let sessions = web::Data::new(SessionManager::new(
        repository.clone(),
        issuer.clone(),
        PasswordHasher::new(settings.hashing.cost),
    ));
    let guard = Arc::new(AuthGuard::new(issuer.clone(), repository));
    let cookies = web::Data::new(CookiePolicy {
        secure: settings.application.secure_cookies,
        access_max_age: issuer.access_token_expiry(),
        refresh_max_age: issuer.refresh_token_expiry(),
    });
    let allowed_origin = settings.application.allowed_origin.clone();

    let server = HttpServer::new(move || {
        let json_config = web::JsonConfig::default().error_handler(|err, _req| {
            AppError::from(ValidationError::MalformedBody(err.to_string())).into()
        });

        // Outermost, so preflights are answered before routing
        let cors = Cors::default()
            .allowed_origin(&allowed_origin)
            .supports_credentials()
            .allowed_methods(vec!["GET", "POST"])
            .allowed_headers(vec![header::CONTENT_TYPE, header::AUTHORIZATION])
            .expose_headers(vec![header::HeaderName::from_static(REQUEST_ID_HEADER)])
            .max_age(3600);

        App::new()
            // Global middleware
            .wrap(Logger::default())
            .wrap(RequestLogger)
            .wrap(cors)

            // Shared state
            .app_data(json_config)
            .app_data(sessions.clone())
            .app_data(cookies.clone())

            .route("/health_check", web::get().to(health_check))
            .service(
                web::scope("/api/user")
                    // Public routes
                    .route("/registerUser", web::post().to(register_user))
                    .route("/login", web::post().to(login))
                    .route("/refresh-token", web::post().to(refresh_token))

                    // Protected routes (require a valid access token)
                    .service(
                        web::resource(["/change-password", "/chnage-password"])
                            .wrap(AuthGuardMiddleware::new(guard.clone()))
                            .route(web::post().to(change_password)),
                    )
                    .service(
                        web::resource("/getUserDetails")
                            .wrap(AuthGuardMiddleware::new(guard.clone()))
                            .route(web::get().to(get_user_details)),
                    )
                    .service(
                        web::resource("/logOut")
                            .wrap(AuthGuardMiddleware::new(guard.clone()))
                            .route(web::post().to(log_out)),
                    ),
            )
    })
    .listen(listener)?
    .run();

    Ok(server)
}
