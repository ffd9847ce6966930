use weathercast::probe::{RAW_MESSAGE, RAW_URL};
use weathercast::{raw, Error};

#[async_std::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match raw::exchange(RAW_URL, RAW_MESSAGE).await {
        Ok(reply) => log::info!("Received: {}", reply),
        Err(Error::Closed) => log::warn!("Connection closed: no reply from {}", RAW_URL),
        Err(err) => log::error!("An error occurred: {}", err),
    }
}
