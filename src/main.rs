use std::net::{IpAddr, SocketAddr};

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::{delete, get, post, put},
};
use directorio_backend::{
    AppState,
    config::Config,
    middleware::{auth_middleware, log_errors},
    routes,
    services::{images::ImageStorage, mailer::Mailer},
};
use sqlx::Executor;
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Multipart bodies carry several images; everything else stays tiny.
const MAX_BODY_SIZE: usize = 30 * 1024 * 1024;

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().expect("Failed to load configuration");

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .after_connect(|conn, _meta| {
            Box::pin(async move {
                conn.execute("SET application_name = 'directorio_backend';")
                    .await?;
                Ok(())
            })
        })
        .connect(&config.database_url)
        .await
        .expect("Failed to connect to Postgres");

    let images = ImageStorage::new(&config).expect("Failed to build image storage client");
    let mailer = Mailer::new(&config).expect("Failed to build mailer client");

    let state = AppState {
        pool,
        config: config.clone(),
        images,
        mailer,
    };

    let public_routes = Router::new()
        // registro y activación de cuenta
        .route("/usuarios", post(routes::usuario::register))
        .route(
            "/usuarios/reenviar-activacion",
            post(routes::usuario::resend_activation),
        )
        .route("/activar/activar", get(routes::activacion::activate_account))
        .route("/auth/login", post(routes::auth::login))
        // lecturas públicas del directorio
        .route("/usuarios", get(routes::usuario::list_usuarios))
        .route("/usuarios/{id_usuario}", get(routes::usuario::get_usuario))
        .route("/comercios", get(routes::comercio::list_comercios))
        .route("/comercios/{id_comercio}", get(routes::comercio::get_comercio))
        .route(
            "/servicios-comercio/comercio/{id_comercio}",
            get(routes::servicio::list_servicios_por_comercio),
        )
        .route(
            "/servicios-comercio/{id_servicio}",
            get(routes::servicio::get_servicio),
        )
        .route(
            "/opciones-servicio/servicio/{id_servicio}",
            get(routes::opcion::list_opciones_por_servicio),
        )
        .route(
            "/opciones-servicio/{id_opcion_servicio}",
            get(routes::opcion::get_opcion),
        )
        .route("/categorias-comercio", get(routes::categoria::list_categorias))
        .route(
            "/categorias-comercio/{id_categoria}",
            get(routes::categoria::get_categoria),
        )
        .route(
            "/servicios-comunidad",
            get(routes::comunidad::list_servicios_comunidad),
        )
        .route(
            "/servicios-comunidad/{id_servicio_comunidad}",
            get(routes::comunidad::get_servicio_comunidad),
        )
        .route("/niveles-usuario", get(routes::nivel::list_niveles))
        .route("/niveles-usuario/{id_nvl_usuario}", get(routes::nivel::get_nivel))
        .route("/asesores", get(routes::brigada::list_asesores))
        .route("/carreras", get(routes::brigada::list_carreras))
        .route("/brigadistas", get(routes::brigada::list_brigadistas));

    let protected_routes = Router::new()
        // cuenta propia
        .route("/usuarios/me", get(routes::usuario::me))
        .route("/usuarios/{id_usuario}", put(routes::usuario::update_usuario))
        .route("/usuarios/{id_usuario}", delete(routes::usuario::delete_usuario))
        // comercios del usuario autenticado
        .route("/comercios/miscomercios", get(routes::comercio::mis_comercios))
        .route("/comercios", post(routes::comercio::create_comercio))
        .route("/comercios/{id_comercio}", put(routes::comercio::update_comercio))
        .route(
            "/comercios/{id_comercio}",
            delete(routes::comercio::delete_comercio),
        )
        // servicios y opciones
        .route("/servicios-comercio", post(routes::servicio::create_servicio))
        .route(
            "/servicios-comercio/{id_servicio}",
            put(routes::servicio::update_servicio),
        )
        .route(
            "/servicios-comercio/{id_servicio}",
            delete(routes::servicio::delete_servicio),
        )
        .route("/opciones-servicio", post(routes::opcion::create_opcion))
        .route(
            "/opciones-servicio/{id_opcion_servicio}",
            put(routes::opcion::update_opcion),
        )
        .route(
            "/opciones-servicio/{id_opcion_servicio}",
            delete(routes::opcion::delete_opcion),
        )
        // catálogos
        .route(
            "/categorias-comercio",
            post(routes::categoria::create_categoria),
        )
        .route(
            "/categorias-comercio/{id_categoria}",
            put(routes::categoria::update_categoria),
        )
        .route(
            "/categorias-comercio/{id_categoria}",
            delete(routes::categoria::delete_categoria),
        )
        .route("/niveles-usuario", post(routes::nivel::create_nivel))
        .route(
            "/niveles-usuario/{id_nvl_usuario}",
            put(routes::nivel::update_nivel),
        )
        .route(
            "/niveles-usuario/{id_nvl_usuario}",
            delete(routes::nivel::delete_nivel),
        )
        // servicios de comunidad
        .route(
            "/servicios-comunidad",
            post(routes::comunidad::create_servicio_comunidad),
        )
        .route(
            "/servicios-comunidad/{id_servicio_comunidad}",
            put(routes::comunidad::update_servicio_comunidad),
        )
        .route(
            "/servicios-comunidad/{id_servicio_comunidad}",
            delete(routes::comunidad::delete_servicio_comunidad),
        )
        // brigada de servicio social
        .route("/asesores", post(routes::brigada::create_asesor))
        .route("/asesores/{id_asesor}", put(routes::brigada::update_asesor))
        .route("/asesores/{id_asesor}", delete(routes::brigada::delete_asesor))
        .route("/carreras", post(routes::brigada::create_carrera))
        .route("/carreras/{id_carrera}", put(routes::brigada::update_carrera))
        .route("/carreras/{id_carrera}", delete(routes::brigada::delete_carrera))
        .route("/brigadistas", post(routes::brigada::create_brigadista))
        .route(
            "/brigadistas/{id_brigadista}",
            put(routes::brigada::update_brigadista),
        )
        .route(
            "/brigadistas/{id_brigadista}",
            delete(routes::brigada::delete_brigadista),
        )
        // imágenes
        .route(
            "/imagenes-general",
            post(routes::imagenes::upload_general_images),
        )
        .route(
            "/imagenes-comercios/{id_comercio}",
            post(routes::imagenes::upload_comercio_images),
        )
        .route(
            "/imagenes-comercios/{id_imagen}",
            delete(routes::imagenes::delete_comercio_image),
        )
        .route(
            "/imagenes-servicios/{id_opcion_servicio}",
            post(routes::imagenes::upload_servicio_images),
        )
        .route(
            "/imagenes-servicios/{id_imagen}",
            delete(routes::imagenes::delete_servicio_image),
        )
        .route(
            "/imagenes-servicios-comunidad/{id_servicio_comunidad}",
            post(routes::imagenes::upload_comunidad_images),
        )
        .route(
            "/imagenes-servicios-comunidad/{id_imagen}",
            delete(routes::imagenes::delete_comunidad_image),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let router = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(axum::middleware::from_fn(log_errors))
        .layer(DefaultBodyLimit::max(MAX_BODY_SIZE));

    let cors = if config.allow_any_origin() {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = config
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    };
    let router = router.layer(cors);

    let app = router.with_state(state.clone());

    let addr = SocketAddr::new(
        state.config.server_host.parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid server_host, falling back to dual-stack default");
            IpAddr::V6(std::net::Ipv6Addr::UNSPECIFIED)
        }),
        state.config.server_port,
    );
    tracing::info!("Server listening on {}", addr);
    axum::serve(
        tokio::net::TcpListener::bind(&addr)
            .await
            .expect("Failed to bind"),
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .expect("Failed to start server");
}
