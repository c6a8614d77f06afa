// [apps/atomic-cli/src/main.rs]
/*!
 * =================================================================
 * APARATO: FISSION ORCHESTRATOR SHELL (C9)
 * CLASIFICACIÓN: APPLICATION LAYER (ENTRY POINT)
 * RESPONSABILIDAD: COMPOSICIÓN DE C1-C8 EN UNA SOLA LÍNEA DE MANDO
 *
 * Cada invocación es un proceso nuevo; el estado que sobrevive entre
 * invocaciones (tokens, identidad de nodo) se lee y escribe a través de
 * `persistence`, nunca directamente por los crates de dominio. Toda
 * falla converge en `failure::fail`, que emite la línea JSON de stderr
 * (spec §7) y fija el código de salida documentado en spec §6.
 * =================================================================
 */

mod commands;
mod directives;
mod failure;
mod persistence;

use clap::Parser;

use directives::{AtomicDirectives, Command};
use failure::fail;

fn main() {
    dotenvy::dotenv().ok();
    atomic_shared_telemetry::init_tracing("atomic-cli");

    let directives = AtomicDirectives::parse();

    let result = match &directives.command {
        Command::Fission { token, blob, data, file } => {
            commands::fission::run(&directives, *token, blob.clone(), data.clone(), file.clone())
        }
        Command::Bond { address, level } => commands::bond::run(&directives, address, level),
        Command::Mint { class } => commands::mint::run(&directives, class),
        Command::Price => commands::price::run(&directives),
    };

    match result {
        Ok(value) => println!("{value}"),
        Err(error) => fail(error),
    }
}
