use rocket::{Build, Rocket};
use truck_check::{Config, build_rocket};

#[rocket::launch]
fn rocket() -> Rocket<Build> {
    dotenvy::dotenv().ok();

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => panic!("Failed to load configuration: {}", e),
    };

    build_rocket(config)
}
