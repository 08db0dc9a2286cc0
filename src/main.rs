use auction_house::config::AppConfig;
use auction_house::web::app::run_app;
use env_logger::Env;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    run_app(AppConfig::from_env()).await
}
