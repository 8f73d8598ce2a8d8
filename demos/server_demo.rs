//! Minimal server-style settings resolution.
//!
//! Try it with any mix of sources:
//!
//! ```text
//! cargo run --example server_demo -- --port 8080 --timeout 45s
//! GF_ENV=staging cargo run --example server_demo
//! cargo run --example server_demo -- --config my-settings.toml
//! ```

use layerfig::{Duration, ErrorPolicy, FieldMeta, FieldNode, Resolver, Section};

#[derive(Debug)]
struct Settings {
    debug: bool,
    environment: String,
    port: i64,
    timeout: Duration,
}

impl Section for Settings {
    fn fields(&mut self) -> Vec<FieldNode<'_>> {
        vec![
            FieldNode::leaf_with(
                FieldMeta::new("debug").help("enable debugging"),
                &mut self.debug,
            ),
            FieldNode::leaf_with(
                FieldMeta::new("environment")
                    .rename_all("env")
                    .help("environment name"),
                &mut self.environment,
            ),
            FieldNode::leaf_with(
                FieldMeta::new("port").help("port to listen on"),
                &mut self.port,
            ),
            FieldNode::leaf_with(
                FieldMeta::new("timeout").help("server timeout"),
                &mut self.timeout,
            ),
        ]
    }
}

fn main() {
    let mut settings = Settings {
        debug: false,
        environment: "dev".into(),
        port: 5243,
        timeout: Duration::from_secs(30),
    };

    let resolver = Resolver::new(ErrorPolicy::Exit)
        .env_prefix("GF")
        .config_file("default") // tries default.json, default.toml, default.yaml
        .config_file_flag("config", "path to an explicit config file");

    // Under the Exit policy a failure prints and terminates, so an Err is
    // never returned here.
    let _ = resolver.resolve(&mut settings);

    println!("settings: {settings:?}");
}
