use availability_service::{
    api::{
        handler::{availability, booking, schedule},
        state::AvailabilityAppState,
    },
    domain::{config::EngineConfig, service::SchedulingService},
    infrastructure::client::HttpBookingApi,
};
use axum::{
    Router,
    routing::{delete, get, post, put},
};
use std::{env, net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tower_governor::{
    GovernorLayer, governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor,
};
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;
use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        availability::get_availability,
        schedule::get_day_schedule,
        schedule::save_day_schedule,
        booking::create_manual_booking,
        booking::list_pending,
        booking::approve,
        booking::reject,
        booking::details,
        booking::delete,
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Availability", description = "Public slot availability"),
        (name = "Schedule", description = "Admin day-schedule editing"),
        (name = "Bookings", description = "Admin booking management"),
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() {
    let _guard = shared::telemetry::init_telemetry("availability-service");

    let port = env::var("SERVER_PORT").unwrap_or_else(|_| "8082".to_string());
    let backend_url =
        env::var("BOOKING_BACKEND_URL").unwrap_or_else(|_| "http://localhost:8080".to_string());
    let config_path =
        env::var("AVAILABILITY_CONFIG_PATH").unwrap_or_else(|_| "availability.toml".to_string());
    let config = EngineConfig::load(&config_path).expect("Failed to load engine config");

    let booking_api = Arc::new(HttpBookingApi::new(backend_url));
    let scheduling_service = Arc::new(SchedulingService::new(booking_api, config));

    let state = Arc::new(AvailabilityAppState { scheduling_service });

    let governor_conf = GovernorConfigBuilder::default()
        .per_second(2)
        .burst_size(10)
        .key_extractor(SmartIpKeyExtractor)
        .use_headers()
        .finish()
        .expect("Failed to build governor config");

    let app = Router::new()
        .route(
            "/headpat",
            get(|| async {
                axum::Json(shared::responses::HeadpatResponse {
                    message: "nyaa~! all systems operational, senpai! (=^-w-^=)",
                })
            }),
        )
        .route(
            "/api/v1/availability/{date}",
            get(availability::get_availability),
        )
        .route(
            "/api/v1/admin/schedule/{date}",
            get(schedule::get_day_schedule),
        )
        .route(
            "/api/v1/admin/schedule/{date}/save",
            post(schedule::save_day_schedule),
        )
        .route(
            "/api/v1/admin/bookings/manual",
            post(booking::create_manual_booking),
        )
        .route("/api/v1/admin/bookings/pending", get(booking::list_pending))
        .route(
            "/api/v1/admin/bookings/{id}/approve",
            put(booking::approve),
        )
        .route("/api/v1/admin/bookings/{id}/reject", put(booking::reject))
        .route(
            "/api/v1/admin/bookings/{id}/details",
            get(booking::details),
        )
        .route("/api/v1/admin/bookings/{id}", delete(booking::delete))
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Rate limiting (per-IP, 2 req/s with burst of 10)
        .layer(GovernorLayer::new(governor_conf))
        // tracing log (turn request into info level)
        .layer(
            TraceLayer::new_for_http()
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .latency_unit(tower_http::LatencyUnit::Millis),
                ),
        )
        .with_state(state);

    tracing::info!("availability-service listening on 0.0.0.0:{port}");

    let listener = TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .expect("Failed to bind");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shared::shutdown::shutdown_signal())
    .await
    .expect("Oppsie! Server crashed!");

    tracing::info!("availability-service shut down");
}
