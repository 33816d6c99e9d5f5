//! Server construction and middleware wiring.

mod config;
mod state_builders;

pub use config::ServerConfig;

use state_builders::build_http_state;

use actix_session::{
    SessionMiddleware,
    config::{CookieContentSecurity, PersistentSession},
    storage::CookieSessionStore,
};
use actix_web::cookie::{Key, SameSite};
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
use tracing::warn;

#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[cfg(debug_assertions)]
use crate::doc::ApiDoc;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::{
    auth, check_ins, friends, health, hotspots, itinerary, notifications, profiles, ratings,
};
use crate::middleware::RequestTrace;

#[derive(Clone)]
struct AppDependencies {
    http_state: web::Data<HttpState>,
    key: Key,
    cookie_secure: bool,
    same_site: SameSite,
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        http_state,
        key,
        cookie_secure,
        same_site,
    } = deps;

    let session = SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_name("session".into())
        .cookie_path("/".into())
        .cookie_secure(cookie_secure)
        .cookie_http_only(true)
        .cookie_content_security(CookieContentSecurity::Private)
        .cookie_same_site(same_site)
        .session_lifecycle(
            PersistentSession::default().session_ttl(actix_web::cookie::time::Duration::hours(2)),
        )
        .build();

    // `hotspots::trending` must register before `hotspots::get` so the
    // literal segment wins over the `{id}` path parameter.
    let api = web::scope("/api/v1")
        .wrap(session)
        .service(auth::login)
        .service(auth::logout)
        .service(auth::me)
        .service(hotspots::list)
        .service(hotspots::trending)
        .service(hotspots::get)
        .service(hotspots::create)
        .service(hotspots::update)
        .service(hotspots::delete)
        .service(hotspots::save)
        .service(hotspots::unsave)
        .service(hotspots::list_saved)
        .service(check_ins::check_in)
        .service(check_ins::check_out)
        .service(check_ins::activity_feed)
        .service(ratings::rate)
        .service(ratings::reviews)
        .service(friends::send)
        .service(friends::accept)
        .service(friends::reject)
        .service(friends::cancel)
        .service(friends::list)
        .service(friends::remove)
        .service(friends::status)
        .service(profiles::get)
        .service(profiles::get_user)
        .service(profiles::update)
        .service(notifications::list)
        .service(notifications::mark_read)
        .service(itinerary::generate);

    let app = App::new()
        .app_data(http_state)
        .wrap(RequestTrace)
        .service(api)
        .service(health::ready)
        .service(health::live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));
    #[cfg(not(debug_assertions))]
    let app = app;

    app
}

/// Construct an Actix HTTP server from the provided configuration.
///
/// Primes the live visitor projection from storage before accepting
/// traffic; a priming failure is logged and the projection starts empty.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub async fn create_server(config: ServerConfig) -> std::io::Result<Server> {
    let http_state = build_http_state(&config)?;

    if let Err(error) = http_state.check_ins.prime_live_state().await {
        warn!(%error, "live state priming failed; starting with empty counts");
    }

    let ServerConfig {
        key,
        cookie_secure,
        same_site,
        bind_addr,
        db_pool: _,
        admin_username: _,
        gemini_keys: _,
    } = config;

    let server = HttpServer::new(move || {
        build_app(AppDependencies {
            http_state: http_state.clone(),
            key: key.clone(),
            cookie_secure,
            same_site,
        })
    })
    .bind(bind_addr)?
    .run();

    Ok(server)
}
