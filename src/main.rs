use std::net::SocketAddr;
use std::sync::Arc;

use yolo_predict_api::{
    adapters::{http::{router, state::HttpState}, onnx::yolo_engine::OnnxYoloEngine},
    application::services::PredictionService,
    config::Config,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Inicializar logs (RUST_LOG=info por defecto)
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt::init();

    let config = Config::from_env()?;

    // 2. Cargar el modelo una única vez; se comparte entre todas las peticiones.
    tracing::info!("🔧 Cargando modelo desde {}...", config.model_path.display());
    let engine = Arc::new(OnnxYoloEngine::load(&config.model_path, config.yolo.clone())?);
    let prediction = Arc::new(PredictionService::new(engine));

    // 3. Estado y router de Axum
    let state = HttpState {
        prediction,
        upload_limit: config.max_upload_bytes,
    };
    let app = router(state);

    // 4. Lanzar el servidor
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("🚀 API de detección iniciada en http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
