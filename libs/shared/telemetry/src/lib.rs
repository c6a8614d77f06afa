// [libs/shared/telemetry/src/lib.rs]
/*!
 * =================================================================
 * APARATO: OBSERVABILITY STRATUM (V1.0)
 * CLASIFICACIÓN: SHARED UTILITY
 * RESPONSABILIDAD: TRAZADO ESTRUCTURADO Y CAPTURA DE PÁNICOS
 *
 * Provee el único punto de inicialización de `tracing` para los binarios
 * del núcleo ATOMIC (CLI, bonders, orquestador de fisión). Ningún otro
 * módulo debe instalar un subscriber propio.
 * =================================================================
 */

use std::panic;
use tracing::{error, info};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt as formatting_layer, EnvFilter};

/// Initializes the global tracing subscriber and panic hook for `service_name`.
///
/// Development builds get compact, human-readable output; release builds
/// emit flattened JSON so the ledger/bonding audit trail stays queryable
/// by log aggregators. Safe to call once per process; a second call will
/// panic (tracing's own global-subscriber guard), matching the teacher's
/// single-init contract.
pub fn init_tracing(service_name: &str) {
    let environmental_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!(
            "{service_name}={level}",
            level = if cfg!(debug_assertions) { "debug" } else { "info" }
        )
        .into()
    });

    let is_production = !cfg!(debug_assertions);

    if is_production {
        tracing_subscriber::registry()
            .with(environmental_filter)
            .with(formatting_layer::layer().json().flatten_event(true))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(environmental_filter)
            .with(formatting_layer::layer().compact().with_target(false))
            .init();
    }

    let service_id = service_name.to_string();
    panic::set_hook(Box::new(move |panic_metadata| {
        let location = panic_metadata
            .location()
            .map(|loc| format!("{}:{}:{}", loc.file(), loc.line(), loc.column()))
            .unwrap_or_else(|| "unknown".to_string());

        let payload = panic_metadata
            .payload()
            .downcast_ref::<&str>()
            .copied()
            .or_else(|| panic_metadata.payload().downcast_ref::<String>().map(String::as_str))
            .unwrap_or("<no payload>");

        error!(
            target: "panic_monitor",
            service = %service_id,
            location = %location,
            "thread terminated by panic: {}",
            payload
        );
    }));

    info!("telemetry online for [{}]", service_name);
}
