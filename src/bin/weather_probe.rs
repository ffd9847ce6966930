use weathercast::probe::{self, ProbeConfig};

#[async_std::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let client = match probe::connect(&ProbeConfig::default()) {
        Ok(client) => client,
        Err(err) => {
            log::error!("Error: {}", err);
            return;
        }
    };

    // Failures have already gone through the error handler.
    if let Err(err) = client.join().await {
        log::debug!("Session ended with {}", err);
    }
}
