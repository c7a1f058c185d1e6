use clap::Parser;

/// Initialise logging and parse the CLI for a load test binary.
pub fn init<C: Parser>() -> C {
    env_logger::init();

    C::parse()
}
