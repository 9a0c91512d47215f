use infra_mapper;

fn main() -> Result<(), eframe::Error> {
    // Set up logging for development
    env_logger::init();

    // Run the mapper application
    infra_mapper::run_app()
}
