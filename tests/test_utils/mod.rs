//! Test utilities shared by the integration tests.
//!
//! Provides an in-memory SQLite database with migrations applied and a
//! helper that serves the full router on an ephemeral local port.

use std::sync::Arc;

use anyhow::{Context, Result};
use innkeeper::config::AppConfig;
use innkeeper::server::{AppState, create_app};
use migration::{Migrator, MigratorTrait};
use sea_orm::{Database, DatabaseConnection};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// Sets up an in-memory SQLite database with all migrations applied.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = Database::connect("sqlite::memory:").await?;
    Migrator::up(&db, None).await?;
    Ok(db)
}

/// Stops the spawned server when dropped or shut down explicitly.
pub struct TestServerHandle {
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<Result<()>>>,
}

impl TestServerHandle {
    #[allow(dead_code)]
    pub async fn shutdown(mut self) -> Result<()> {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        match self.task.take() {
            Some(task) => task.await.context("server task join")?,
            None => Ok(()),
        }
    }
}

impl Drop for TestServerHandle {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

/// Serves the app on `127.0.0.1:0`; returns its base URL, the database and
/// a handle that stops the server.
#[allow(dead_code)]
pub async fn spawn_test_app(
    config: AppConfig,
) -> Result<(String, Arc<DatabaseConnection>, TestServerHandle)> {
    let db = Arc::new(setup_test_db().await?);
    let state = AppState {
        config: Arc::new(config),
        db: db.as_ref().clone(),
    };
    let app = create_app(state);

    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;

    let (ready_tx, ready_rx) = oneshot::channel();
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    let task = tokio::spawn(async move {
        let server = axum::serve(listener, app).with_graceful_shutdown(async {
            let _ = shutdown_rx.await;
        });
        let _ = ready_tx.send(());
        server.await.context("axum server error")
    });

    ready_rx.await.context("server task to signal readiness")?;

    Ok((
        format!("http://{addr}"),
        db,
        TestServerHandle {
            shutdown_tx: Some(shutdown_tx),
            task: Some(task),
        },
    ))
}
