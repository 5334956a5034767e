// [apps/api/src/bin/migrator.rs]
//! CLI de mantenimiento: conectar una vez basta para aplicar el esquema,
//! ya que `LedgerClient::connect` lo hace de forma automática. Este
//! binario existe para validar esa conexión fuera del ciclo de vida del
//! servidor HTTP (despliegues, CI).

use dotenvy::dotenv;
use skyclaim_api::config::Config;
use skyclaim_observability::init_tracing;
use skyclaim_persistence::LedgerClient;
use tracing::{error, info};

fn main() -> anyhow::Result<()> {
    dotenv().ok();
    init_tracing("skyclaim_migrator");

    let runtime = tokio::runtime::Builder::new_multi_thread().enable_all().build()?;

    runtime.block_on(async {
        let config = Config::from_env()?;

        match LedgerClient::connect(&config.database_url, config.turso_auth_token.clone()).await {
            Ok(_) => {
                info!("esquema aplicado correctamente");
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "fallo al aplicar el esquema");
                std::process::exit(1);
            }
        }
    })
}
