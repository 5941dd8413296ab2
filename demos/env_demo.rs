use envclasses::{EnvClass, FieldType};
use serde::Deserialize;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Deserialize)]
struct ServerConfig {
    host: String,
    port: u16,
    debug: bool,
    api_token: Option<String>,
}

fn main() -> Result<(), envclasses::ConfigError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // HOST/host, PORT/port, DEBUG/debug and API_TOKEN/api_token are read here.
    // Set ENV_CLASS_LAZY=yes to re-read them on every access instead.
    let class = EnvClass::builder("ServerConfig")
        .field_with_default("host", FieldType::String, "127.0.0.1")
        .field_with_default("port", FieldType::Integer, 8080)
        .field_with_default("debug", FieldType::Boolean, false)
        .field("api_token", FieldType::String)
        .build()?;

    let instance = class.instance().ignore_errors(true).build()?;
    let config: ServerConfig = instance.deserialize()?;

    println!(
        "{} bound in {:?} mode from {} fields",
        instance.class().name(),
        instance.mode(),
        instance.class().fields().len()
    );

    println!("Listening on {}:{} (debug={})", config.host, config.port, config.debug);
    match config.api_token {
        Some(_) => println!("API token configured"),
        None => println!("API token missing"),
    }

    Ok(())
}
