//! Server mode
//!
//! This module contains the HTTP server startup logic.
//! It configures and starts the HTTP server with all necessary routes.

use actix_web::{
    App, HttpServer,
    middleware::{Compress, DefaultHeaders},
    web,
};
use anyhow::Result;
use tracing::{error, warn};

use crate::api::services::{AppStartTime, admin_routes, cloak_routes, health_routes};
use crate::config::get_config;
use crate::runtime::lifetime;
use crate::services::AppServices;

/// JSON 请求体上限，覆盖最大的自定义伪装页面
const JSON_BODY_LIMIT: usize = 1024 * 1024;

/// 注册共享状态和全部路由
///
/// 访客路由匹配任意单段路径，必须最后注册。
pub fn configure_app(cfg: &mut web::ServiceConfig, services: AppServices, start: AppStartTime) {
    cfg.app_data(web::Data::new(services))
        .app_data(web::Data::new(start))
        .app_data(web::JsonConfig::default().limit(JSON_BODY_LIMIT))
        .service(admin_routes())
        .service(health_routes())
        .service(cloak_routes());
}

/// Run the HTTP server
///
/// This function:
/// 1. Records startup time
/// 2. Assembles services and starts the stats flush loop
/// 3. Configures and starts the HTTP server
/// 4. Flushes buffered counters on shutdown
///
/// **Note**: Logging system must be initialized before calling this function
pub async fn run_server() -> Result<()> {
    let app_start_time = AppStartTime::now();
    let config = get_config();

    let services = lifetime::startup::prepare_server_startup(&config)
        .await
        .map_err(|e| {
            error!("Server startup failed: {}", e);
            e
        })?;
    let stats = services.stats.clone();

    let cpu_count = config.server.cpu_count.clamp(1, 32);
    warn!("Using {} CPU cores for the server", cpu_count);

    let server = HttpServer::new(move || {
        let services = services.clone();
        let start = app_start_time.clone();
        App::new()
            .wrap(Compress::default())
            .wrap(DefaultHeaders::new().add(("X-Content-Type-Options", "nosniff")))
            .configure(|cfg| configure_app(cfg, services, start))
    })
    .keep_alive(std::time::Duration::from_secs(30))
    .client_request_timeout(std::time::Duration::from_millis(5000))
    .client_disconnect_timeout(std::time::Duration::from_millis(1000))
    .workers(cpu_count)
    .disable_signals();

    let bind_address = format!("{}:{}", config.server.host, config.server.port);
    warn!("Starting server at http://{}", bind_address);
    let server = server.bind(&bind_address)?.run();
    let handle = server.handle();

    // Wait for server or shutdown signal
    tokio::select! {
        res = server => {
            res?;
            lifetime::shutdown::perform_shutdown_tasks(&stats).await;
        }
        _ = lifetime::shutdown::listen_for_shutdown(&stats) => {
            handle.stop(true).await;
            warn!("Graceful shutdown: all tasks completed");
        }
    }

    Ok(())
}
