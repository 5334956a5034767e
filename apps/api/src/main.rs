// [apps/api/src/main.rs]
use dotenvy::dotenv;
use skyclaim_api::prelude::*;
use skyclaim_observability::init_tracing;
use tracing::{error, info};

fn main() -> anyhow::Result<()> {
    dotenv().ok();
    init_tracing("skyclaim_api");

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_stack_size(4 * 1024 * 1024)
        .build()?;

    runtime.block_on(async {
        let config = Config::from_env()?;
        info!(port = config.port, environment = ?config.environment, "arrancando skyclaim-api");

        let kernel = match Kernel::ignite(config).await {
            Ok(kernel) => kernel,
            Err(e) => {
                error!(error = %e, "fallo al inicializar el estado de la aplicación");
                std::process::exit(1);
            }
        };

        kernel.run().await
    })
}
