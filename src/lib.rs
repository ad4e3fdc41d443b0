mod config;
mod database;
mod db;
mod error;
mod middleware;
mod models;
mod routes;
mod service;
mod util;

#[cfg(test)]
pub mod test_utils;

pub use config::Config;

use crate::db::stage_store;
use crate::middleware::RequestLogger;
use crate::routes as app_routes;
use rocket::data::{ByteUnit, Limits};
use rocket::{Build, Rocket, catchers, http::Method};
use rocket_cors::{AllowedOrigins, CorsOptions};
use rocket_okapi::swagger_ui::{SwaggerUIConfig, make_swagger_ui};
use rocket_okapi::{get_openapi_route, okapi::merge::marge_spec_list};
use tracing_subscriber::EnvFilter;

/// Room for base64 inflation and the surrounding JSON on top of the largest accepted image.
const JSON_OVERHEAD_BYTES: usize = 64 * 1024;

fn init_tracing(log_level: &str, json_format: bool) {
    // RUST_LOG takes precedence over the configured level, e.g.
    //   RUST_LOG=truck_check::service=debug
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let subscriber = tracing_subscriber::fmt().with_env_filter(filter).with_target(true).with_line_number(true);

    // A subscriber may already be installed when several instances are built in one process.
    let _ = if json_format {
        subscriber.json().try_init()
    } else {
        subscriber.try_init()
    };
}

fn build_cors(cors_config: &config::CorsConfig) -> CorsOptions {
    let is_wildcard = cors_config.allowed_origins.len() == 1 && cors_config.allowed_origins[0] == "*";

    if is_wildcard && cors_config.allow_credentials {
        panic!(
            "Invalid CORS configuration: Cannot use wildcard origins (*) with credentials enabled. \
            Either set specific origins or disable credentials."
        );
    }

    let allowed_origins = if cors_config.allowed_origins.is_empty() {
        AllowedOrigins::some_exact::<&str>(&[])
    } else if is_wildcard {
        AllowedOrigins::all()
    } else {
        AllowedOrigins::some_exact(&cors_config.allowed_origins.iter().map(String::as_str).collect::<Vec<_>>())
    };

    CorsOptions {
        allowed_origins,
        allowed_methods: vec![Method::Get, Method::Post, Method::Put, Method::Options, Method::Head]
            .into_iter()
            .map(From::from)
            .collect(),
        allowed_headers: rocket_cors::AllowedHeaders::some(&["Content-Type", "Accept", "X-Request-Id"]),
        expose_headers: ["X-Request-Id", "Content-Disposition"].iter().map(ToString::to_string).collect(),
        allow_credentials: cors_config.allow_credentials,
        ..Default::default()
    }
}

fn get_swagger_config(openapi_url: &str) -> SwaggerUIConfig {
    SwaggerUIConfig {
        url: openapi_url.to_string(),
        ..Default::default()
    }
}

fn normalize_base_path(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return config::DEFAULT_API_BASE_PATH.to_string();
    }

    let mut normalized = if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{}", trimmed)
    };

    while normalized.ends_with('/') && normalized.len() > 1 {
        normalized.pop();
    }

    normalized
}

fn join_base_path(base_path: &str, path: &str) -> String {
    let base = base_path.trim_end_matches('/');
    let suffix = path.trim_start_matches('/');

    if base.is_empty() {
        format!("/{}", suffix)
    } else {
        format!("{}/{}", base, suffix)
    }
}

fn collect_base_paths(api_config: &config::ApiConfig) -> Vec<String> {
    let mut normalized: Vec<String> = Vec::new();
    let mut push_unique = |path: String| {
        if !normalized.contains(&path) {
            normalized.push(path);
        }
    };

    push_unique(normalize_base_path(&api_config.base_path));
    for extra in &api_config.additional_base_paths {
        push_unique(normalize_base_path(extra));
    }

    normalized
}

struct RouteSpec {
    path: &'static str,
    routes: Vec<rocket::Route>,
    openapi: rocket_okapi::okapi::openapi3::OpenApi,
}

fn collect_route_specs() -> Vec<RouteSpec> {
    let (company_routes, company_openapi) = app_routes::company::routes();
    let (session_routes, session_openapi) = app_routes::verification_session::routes();
    let (driver_routes, driver_openapi) = app_routes::driver::routes();
    let (wizard_routes, wizard_openapi) = app_routes::wizard::routes();
    let (response_routes, response_openapi) = app_routes::response::routes();
    let (attachment_routes, attachment_openapi) = app_routes::attachment::routes();
    let (health_routes, health_openapi) = app_routes::health::routes();

    vec![
        RouteSpec {
            path: "/companies",
            routes: company_routes,
            openapi: company_openapi,
        },
        RouteSpec {
            path: "/sessions",
            routes: session_routes,
            openapi: session_openapi,
        },
        // Driver links live directly under the base path.
        RouteSpec {
            path: "",
            routes: driver_routes,
            openapi: driver_openapi,
        },
        RouteSpec {
            path: "/wizards",
            routes: wizard_routes,
            openapi: wizard_openapi,
        },
        RouteSpec {
            path: "/responses",
            routes: response_routes,
            openapi: response_openapi,
        },
        RouteSpec {
            path: "/attachments",
            routes: attachment_routes,
            openapi: attachment_openapi,
        },
        RouteSpec {
            path: "/health",
            routes: health_routes,
            openapi: health_openapi,
        },
    ]
}

fn mount_api_routes(mut rocket: Rocket<Build>, base_path: &str, enable_swagger: bool) -> Rocket<Build> {
    let route_specs = collect_route_specs();

    if enable_swagger {
        let mut openapi_list = Vec::new();
        for spec in route_specs {
            rocket = rocket.mount(format!("{}{}", base_path, spec.path), spec.routes);
            openapi_list.push((spec.path, spec.openapi));
        }

        let openapi_docs = match marge_spec_list(&openapi_list) {
            Ok(docs) => docs,
            Err(err) => panic!("Could not merge OpenAPI spec: {}", err),
        };

        let settings = rocket_okapi::settings::OpenApiSettings::default();
        rocket = rocket.mount(base_path, vec![get_openapi_route(openapi_docs, &settings)]);

        let docs_path = join_base_path(base_path, "docs");
        let openapi_url = join_base_path(base_path, "openapi.json");
        rocket = rocket.mount(docs_path, make_swagger_ui(&get_swagger_config(&openapi_url)));
    } else {
        for spec in route_specs {
            rocket = rocket.mount(format!("{}{}", base_path, spec.path), spec.routes);
        }
    }

    rocket
}

fn register_catchers(rocket: Rocket<Build>, base_path: &str) -> Rocket<Build> {
    rocket.register(
        base_path,
        catchers![
            app_routes::error::bad_request,
            app_routes::error::not_found,
            app_routes::error::conflict,
            app_routes::error::gone,
            app_routes::error::payload_too_large,
            app_routes::error::unprocessable_entity,
            app_routes::error::internal_error
        ],
    )
}

fn rocket_figment(config: &Config) -> rocket::figment::Figment {
    let json_limit = config.attachments.max_bytes.div_ceil(3) * 4 + JSON_OVERHEAD_BYTES;
    let limits = Limits::default().limit("json", ByteUnit::Byte(json_limit as u64));

    rocket::Config::figment()
        .merge(("port", config.server.port))
        .merge(("address", config.server.address.clone()))
        .merge(("limits", limits))
}

pub fn build_rocket(config: Config) -> Rocket<Build> {
    init_tracing(&config.logging.level, config.logging.json_format);

    let cors = build_cors(&config.cors).to_cors().expect("Failed to create CORS fairing");
    let base_paths = collect_base_paths(&config.api);
    let enable_swagger = config.api.enable_swagger;

    let mut rocket = rocket::custom(rocket_figment(&config))
        .attach(cors)
        .attach(RequestLogger)
        .attach(stage_store(config.storage.clone()))
        .manage(config);

    for base_path in &base_paths {
        rocket = mount_api_routes(rocket, base_path, enable_swagger);
        rocket = register_catchers(rocket, base_path);
    }

    rocket
}

#[cfg(test)]
mod tests {
    use super::*;
    use rocket::http::Status;
    use rocket::local::asynchronous::Client;

    #[test]
    fn base_paths_are_normalized_and_deduplicated() {
        let api = config::ApiConfig {
            base_path: "api/v1/".to_string(),
            additional_base_paths: vec!["/api/v1".to_string(), " /legacy ".to_string()],
            enable_swagger: false,
        };
        assert_eq!(collect_base_paths(&api), vec!["/api/v1".to_string(), "/legacy".to_string()]);
        assert_eq!(normalize_base_path("  "), config::DEFAULT_API_BASE_PATH);
        assert_eq!(join_base_path("/api/v1/", "/docs"), "/api/v1/docs");
    }

    #[test]
    #[should_panic(expected = "Invalid CORS configuration")]
    fn wildcard_cors_with_credentials_is_refused() {
        let cors = config::CorsConfig {
            allowed_origins: vec!["*".to_string()],
            allow_credentials: true,
        };
        build_cors(&cors);
    }

    #[test]
    fn json_limit_fits_the_largest_image() {
        let config = Config::for_tests();
        let figment = rocket_figment(&config);
        let limits: Limits = figment.extract_inner("limits").expect("limits");
        let json_limit = limits.get("json").expect("json limit");
        assert!(json_limit.as_u64() > (config.attachments.max_bytes as u64) * 4 / 3);
    }

    #[rocket::async_test]
    async fn routes_are_served_under_additional_base_paths() {
        let mut config = Config::for_tests();
        config.api.additional_base_paths = vec!["/api".to_string()];

        let client = Client::tracked(build_rocket(config)).await.expect("valid rocket instance");
        assert_eq!(client.get("/api/v1/health").dispatch().await.status(), Status::Ok);
        assert_eq!(client.get("/api/health").dispatch().await.status(), Status::Ok);
    }

    #[rocket::async_test]
    async fn openapi_document_is_published() {
        let mut config = Config::for_tests();
        config.api.enable_swagger = true;

        let client = Client::tracked(build_rocket(config)).await.expect("valid rocket instance");
        let response = client.get("/api/v1/openapi.json").dispatch().await;
        assert_eq!(response.status(), Status::Ok);
        let doc: serde_json::Value = response.into_json().await.expect("json body");
        assert!(doc["paths"].get("/wizards/{id}/submit").is_some());
        assert!(doc["paths"].get("/driver-portal").is_some());
    }
}
