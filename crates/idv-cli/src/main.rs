use std::sync::Arc;

use idflow::adapters::{DefaultExecutors, ScriptedBackend, ScriptedInteraction};
use idflow::domain::{DeviceIdentity, PredefinedUserInfo};
use idflow::flow::{FlowState, LoggingObserver, NoopObserver, SessionStore};
use idflow::persistence::{FileSessionStore, StoreConfig};
use idflow::{IdentityVerification, SdkConfig};
use log::info;

const USAGE: &str = "Uso: idv-cli status | clear (--config|--device|--all) | demo [--email <ADDR>] [--attempts <N>] [step ...]";

#[tokio::main]
async fn main() {
    // Cargar .env si existe (IDV_STORE_PATH, IDV_API_KEY, ...)
    let _ = dotenvy::dotenv();
    env_logger::init();
    let args: Vec<String> = std::env::args().collect();
    let store_config = StoreConfig::from_env();
    let store = match FileSessionStore::from_config(&store_config) {
        Ok(s) => Arc::new(s),
        Err(e) => {
            eprintln!("[idv store] {}: {e}", store_config.path.display());
            std::process::exit(5);
        }
    };

    match args.get(1).map(String::as_str) {
        Some("status") => match store.snapshot() {
            Ok(entries) => {
                let json = serde_json::to_string_pretty(&entries).unwrap_or_else(|_| "{}".to_string());
                println!("{json}");
            }
            Err(e) => {
                eprintln!("[idv status] error: {e}");
                std::process::exit(5);
            }
        },
        Some("clear") => {
            let result = match args.get(2).map(String::as_str) {
                Some("--config") => store.clear_configuration(),
                Some("--device") => store.clear_device_identifier(),
                Some("--all") => store.clear_all(),
                _ => {
                    eprintln!("{USAGE}");
                    std::process::exit(2);
                }
            };
            if let Err(e) = result {
                eprintln!("[idv clear] error: {e}");
                std::process::exit(5);
            }
            println!("ok");
        }
        Some("demo") => {
            let mut steps: Vec<String> = Vec::new();
            let mut predefined = PredefinedUserInfo::default();
            let mut attempts: usize = 3;
            let mut i = 2;
            while i < args.len() {
                match args[i].as_str() {
                    "--email" => {
                        i += 1;
                        if i < args.len() { predefined.email = Some(args[i].clone()); }
                    }
                    "--attempts" => {
                        i += 1;
                        if i < args.len() { attempts = args[i].parse::<usize>().unwrap_or(attempts); }
                    }
                    other => steps.push(other.to_string()),
                }
                i += 1;
            }
            if steps.is_empty() {
                steps = ["selfie", "email", "terms", "signature", "userInfo"].iter().map(|s| s.to_string()).collect();
            }
            std::process::exit(run_demo(store, &steps, predefined, attempts).await);
        }
        _ => {
            eprintln!("{USAGE}");
            std::process::exit(2);
        }
    }
}

/// Ejecuta un flujo completo contra el backend con guion y la interacción
/// cooperativa. Devuelve el código de salida.
async fn run_demo(store: Arc<FileSessionStore>, steps: &[String], predefined: PredefinedUserInfo, attempts: usize) -> i32 {
    let step_refs: Vec<&str> = steps.iter().map(String::as_str).collect();
    let backend = Arc::new(ScriptedBackend::happy_path("demo-customer", "demo-session", &step_refs));
    let config = SdkConfig::from_env();
    let api_key = config.api_key.clone().unwrap_or_else(|| "demo-key".to_string());
    info!("[idv demo] store={} steps={steps:?}", store.path().display());
    let store: Arc<dyn SessionStore> = store;
    let mut sdk = IdentityVerification::new(config, demo_device(), backend.clone(), store)
        .with_observer(Arc::new(LoggingObserver::new(NoopObserver)));

    if let Err(e) = sdk.configure(&api_key).await {
        eprintln!("[idv demo] configure: {}", e.user_message());
        return 4;
    }
    let executors = Arc::new(DefaultExecutors::new(Arc::new(ScriptedInteraction::cooperative())));
    let mut coordinator = match sdk.coordinator(executors, predefined) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("[idv demo] error: {e}");
            return 5;
        }
    };
    coordinator.start(None).await;
    let state = coordinator.run_until_settled(attempts).await;

    println!("flow={} state={} index={}/{}",
             coordinator.flow_id(),
             state,
             coordinator.current_step_index(),
             coordinator.required_steps().len());
    println!("journal: {}", coordinator.event_variants().join(""));
    println!("api calls: {}", backend.calls().len());
    match state {
        FlowState::Completed => 0,
        _ => {
            if let Some(msg) = coordinator.last_user_message() {
                eprintln!("[idv demo] {msg}");
            }
            4
        }
    }
}

fn demo_device() -> DeviceIdentity {
    DeviceIdentity { device_id: "idv-cli-device".into(),
                     device_type: "cli".into(),
                     device_model: std::env::consts::ARCH.into(),
                     os_version: std::env::consts::OS.into(),
                     app_version: env!("CARGO_PKG_VERSION").into(),
                     ip_address: "127.0.0.1".into(),
                     user_agent: format!("idv-cli/{}", env!("CARGO_PKG_VERSION")),
                     timezone: "UTC".into() }
}
