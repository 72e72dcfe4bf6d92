//! petarm server
//!
//! Drives the robot arm over I2C and exposes the pick gesture over HTTP.
//!
//! Startup order:
//! 1. Load config (path from argv, `PETARM_CONFIG`, or `petarm.toml`)
//! 2. Set up logging
//! 3. Open the I2C bus and wake the PCA9685
//! 4. Program 50 Hz and move the arm to its default pose
//! 5. Start the arm task and serve HTTP until Ctrl-C

mod api;
mod channels;
mod config;
mod tasks;

#[cfg(test)]
mod testing;

use anyhow::Context;
use log::{error, info, LevelFilter};
use petarm_core::ArmController;
use petarm_drivers::pwm::pca9685::DEFAULT_ADDRESS;
use petarm_drivers::Pca9685;
use petarm_hal_linux::{Delay, LinuxI2c};

use crate::channels::ArmHandle;
use crate::config::loader::CONFIG_ENV;
use crate::config::{HttpConfig, ServerConfig};

fn main() -> anyhow::Result<()> {
    let path = config::config_path(std::env::args_os().nth(1), std::env::var_os(CONFIG_ENV));
    let loaded = config::load(&path)?;

    init_logging(&loaded.config);
    info!("petarm-server v{}", env!("CARGO_PKG_VERSION"));
    loaded.log_summary();
    let config = loaded.config;

    info!("Opening {}", config.bus.device.display());
    let bus = LinuxI2c::open(&config.bus.device)?;
    let pwm = Pca9685::new(bus, DEFAULT_ADDRESS, config.bus.debug)
        .context("failed to initialize PCA9685")?;
    let arm = ArmController::new(pwm, Delay, config.arm)
        .context("failed to move arm to its default pose")?;

    let (handle, commands) = ArmHandle::channel();
    let worker = tasks::spawn_arm_task(arm, commands).context("failed to start arm task")?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    let served = runtime.block_on(serve(config.server, handle));
    drop(runtime);

    // The router held the last handle, so the arm task finishes its current
    // gesture and exits
    if worker.join().is_err() {
        error!("Arm task panicked");
    }
    served
}

fn init_logging(config: &ServerConfig) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if config.arm.debug || config.bus.debug {
        builder
            .filter_module("petarm_core", LevelFilter::Debug)
            .filter_module("petarm_drivers", LevelFilter::Debug);
    }
    builder.init();
}

async fn serve(http: HttpConfig, arm: ArmHandle) -> anyhow::Result<()> {
    let app = api::router(arm, &http.static_dir);
    let listener = tokio::net::TcpListener::bind(http.listen)
        .await
        .with_context(|| format!("failed to bind {}", http.listen))?;

    info!("Listening on http://{}", http.listen);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    info!("Shutting down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Cannot listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}
