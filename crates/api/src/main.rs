use anyhow::Context;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    shopkit_observability::init();

    let app = shopkit_api::app::build_app().await;

    let listener = tokio::net::TcpListener::bind("0.0.0.0:8080")
        .await
        .context("failed to bind 0.0.0.0:8080")?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await.context("server exited")?;
    Ok(())
}
