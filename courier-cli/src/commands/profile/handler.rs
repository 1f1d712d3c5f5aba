use std::str::FromStr;

use rst_common::standard::serde_json::{self, json};
use rst_common::with_logging::log::debug;

use prople_courier_core::envelope::EnvelopeType;
use prople_courier_core::profile::{self, AcceptProfile, Algorithm, CircuitId};

use crate::commands::handler::ContextHandler;
use crate::types::CliError;

use super::ProfileCommands;

fn describe(profile: &AcceptProfile) -> Result<String, CliError> {
    let described = json!({
        "protocol_version": profile.protocol_version,
        "env": profile.env,
        "circuits": profile.circuits,
        "alg": profile.alg,
    });

    serde_json::to_string_pretty(&described).map_err(|err| CliError::ProfileError(err.to_string()))
}

/// `build_profile` assembles the profile then runs it through the parser, so the printed
/// string is always well-formed
pub fn build_profile(
    ctx: &ContextHandler,
    env: &str,
    circuits: &[String],
    alg: &[String],
) -> Result<String, CliError> {
    let env =
        EnvelopeType::from_str(env).map_err(|err| CliError::ProfileError(err.to_string()))?;

    let mut accept = AcceptProfile::new(env);
    accept.protocol_version = ctx.protocol_version()?;

    if !circuits.is_empty() {
        let circuits = circuits
            .iter()
            .map(|circuit| CircuitId::from_str(circuit))
            .collect::<Result<Vec<CircuitId>, _>>()
            .map_err(|err| CliError::ProfileError(err.to_string()))?;
        accept = accept.with_circuits(circuits);
    }

    if !alg.is_empty() {
        let alg = alg
            .iter()
            .map(|alg| Algorithm::from_str(alg))
            .collect::<Result<Vec<Algorithm>, _>>()
            .map_err(|err| CliError::ProfileError(err.to_string()))?;
        accept = accept.with_alg(alg);
    }

    let built = accept.to_string();
    profile::parse(&built).map_err(|err| CliError::ProfileError(err.to_string()))?;

    Ok(built)
}

pub async fn handle_commands(
    ctx: &ContextHandler,
    commands: ProfileCommands,
) -> Result<(), CliError> {
    debug!("profile command handler triggered...");

    match commands {
        ProfileCommands::Parse { profile: given } => {
            let parsed =
                profile::parse(&given).map_err(|err| CliError::ProfileError(err.to_string()))?;
            println!("{}", describe(&parsed)?);
        }
        ProfileCommands::Build { env, circuits, alg } => {
            println!("{}", build_profile(ctx, &env, &circuits, &alg)?);
        }
    }

    Ok(())
}
