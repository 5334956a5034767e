// [apps/api/src/kernel.rs]
//! Composición raíz: conecta `AppState` con el router HTTP y los
//! trabajadores de fondo, y se encarga de la parte del arranque que no
//! pertenece a ninguno de los dos (bind del socket, señal de apagado).

use crate::config::Config;
use crate::routes::build_router;
use crate::services::{spawn_draft_reaper, spawn_reminder_scheduler, OutboxRelay};
use crate::state::AppState;
use std::net::{IpAddr, SocketAddr};
use tracing::{error, info};

pub struct Kernel {
    port: u16,
    state: AppState,
}

impl Kernel {
    pub async fn ignite(config: Config) -> anyhow::Result<Self> {
        let port = config.port;
        let state = AppState::bootstrap(config).await?;
        Ok(Self { port, state })
    }

    pub async fn run(self) -> anyhow::Result<()> {
        OutboxRelay::new(self.state.clone()).spawn();
        spawn_draft_reaper(self.state.clone());
        spawn_reminder_scheduler(self.state.clone());

        let router = build_router(self.state);
        let bind_address = SocketAddr::new("0.0.0.0".parse::<IpAddr>().unwrap(), self.port);

        info!(%bind_address, "listo para aceptar conexiones");
        let listener = tokio::net::TcpListener::bind(bind_address).await?;

        if let Err(e) = axum::serve(listener, router).await {
            error!(error = %e, "el servidor HTTP terminó con un error");
            return Err(e.into());
        }
        Ok(())
    }
}
