use std::str::FromStr;

use crate::envelope::EnvelopeType;

use super::types::{AcceptProfile, Algorithm, CircuitId, ProfileError, ProtocolVersion};

const SEGMENT_SEPARATOR: char = ';';
const LIST_SEPARATOR: char = ',';

const KEY_ENV: &str = "env";
const KEY_CIRCUITS: &str = "circuits";
const KEY_ALG: &str = "alg";

fn malformed(reason: String) -> ProfileError {
    ProfileError::MalformedProfile(reason)
}

fn parse_list<T>(key: &str, value: &str) -> Result<Vec<T>, ProfileError>
where
    T: FromStr<Err = ProfileError>,
{
    if value.is_empty() {
        return Err(malformed(format!("empty {} list", key)));
    }

    value
        .split(LIST_SEPARATOR)
        .map(|item| {
            if item.is_empty() {
                return Err(malformed(format!("empty item in {} list", key)));
            }

            T::from_str(item)
        })
        .collect()
}

fn join_list<T: ToString>(items: &[T]) -> String {
    items
        .iter()
        .map(|item| item.to_string())
        .collect::<Vec<String>>()
        .join(&LIST_SEPARATOR.to_string())
}

/// `parse` turns an accept-profile string into an [`AcceptProfile`]
///
/// The first segment is always the protocol version, the remaining segments are `key=value`
/// pairs. `env` is mandatory, `circuits` and `alg` are optional but their values must be
/// recognized for the selected envelope type. List ordering is preserved
pub fn parse(profile: &str) -> Result<AcceptProfile, ProfileError> {
    let segments: Vec<&str> = profile.split(SEGMENT_SEPARATOR).collect();
    if segments.len() < 2 {
        return Err(malformed(format!(
            "expected at least 2 segments, found {}",
            segments.len()
        )));
    }

    let protocol_version = ProtocolVersion::from_str(segments[0])?;

    let mut env: Option<&str> = None;
    let mut circuits: Option<&str> = None;
    let mut alg: Option<&str> = None;

    for segment in segments.iter().skip(1) {
        let (key, value) = segment
            .split_once('=')
            .ok_or(malformed(format!("invalid segment: {}", segment)))?;

        let slot = match key {
            KEY_ENV => &mut env,
            KEY_CIRCUITS => &mut circuits,
            KEY_ALG => &mut alg,
            _ => return Err(malformed(format!("unknown segment key: {}", key))),
        };

        if slot.is_some() {
            return Err(malformed(format!("duplicated segment: {}", key)));
        }

        *slot = Some(value);
    }

    let env = env.ok_or(malformed("missing env segment".to_string()))?;
    let env = EnvelopeType::from_str(env).map_err(|err| malformed(err.to_string()))?;

    let circuits = circuits
        .map(|value| parse_list::<CircuitId>(KEY_CIRCUITS, value))
        .transpose()?;

    if circuits.is_some() && env != EnvelopeType::ZeroKnowledgeProof {
        return Err(malformed(format!("circuits are not allowed for env: {}", env)));
    }

    let alg = alg
        .map(|value| parse_list::<Algorithm>(KEY_ALG, value))
        .transpose()?;

    if let Some(algs) = &alg {
        let recognized = Algorithm::recognized_for(env);
        if let Some(unknown) = algs.iter().find(|item| !recognized.contains(*item)) {
            return Err(malformed(format!(
                "algorithm {} is not allowed for env: {}",
                unknown, env
            )));
        }
    }

    Ok(AcceptProfile {
        protocol_version,
        env,
        circuits,
        alg,
    })
}

pub(crate) fn build_one(profile: &AcceptProfile) -> String {
    let mut segments = vec![
        profile.protocol_version.to_string(),
        format!("{}={}", KEY_ENV, profile.env),
    ];

    if let Some(circuits) = &profile.circuits {
        segments.push(format!("{}={}", KEY_CIRCUITS, join_list(circuits)));
    }

    if let Some(alg) = &profile.alg {
        segments.push(format!("{}={}", KEY_ALG, join_list(alg)));
    }

    segments.join(&SEGMENT_SEPARATOR.to_string())
}

/// `build` renders each [`AcceptProfile`] into its canonical string form
pub fn build(profiles: &[AcceptProfile]) -> Vec<String> {
    profiles.iter().map(build_one).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use table_test::table_test;

    #[test]
    fn test_parse_zkp_profile() {
        let parsed =
            parse("iden3comm/v1;env=application/iden3-zkp-json;circuits=authV3,authV2;alg=groth16");
        assert!(!parsed.is_err());

        let profile = parsed.unwrap();
        assert_eq!(profile.protocol_version, ProtocolVersion::V1);
        assert_eq!(profile.env, EnvelopeType::ZeroKnowledgeProof);
        assert_eq!(
            profile.circuits,
            Some(vec![CircuitId::AuthV3, CircuitId::AuthV2])
        );
        assert_eq!(profile.alg, Some(vec![Algorithm::Groth16]))
    }

    #[test]
    fn test_parse_without_constraints() {
        let profile = parse("iden3comm/v1;env=application/iden3comm-plain-json").unwrap();
        assert_eq!(profile.env, EnvelopeType::Plain);
        assert!(profile.circuits.is_none());
        assert!(profile.alg.is_none())
    }

    #[test]
    fn test_parse_malformed() {
        let table = vec![
            ("iden3comm/v1", "less than two segments"),
            ("iden3comm/v2;env=application/iden3-zkp-json", "unknown version"),
            ("iden3comm/v1;alg=groth16", "missing env"),
            ("iden3comm/v1;env=application/json", "unknown env"),
            ("iden3comm/v1;env", "segment without value"),
            ("iden3comm/v1;env=application/iden3-zkp-json;foo=bar", "unknown key"),
            (
                "iden3comm/v1;env=application/iden3-zkp-json;env=application/iden3-zkp-json",
                "duplicated env",
            ),
            (
                "iden3comm/v1;env=application/iden3comm-signed-json;circuits=authV2",
                "circuits for signed",
            ),
            (
                "iden3comm/v1;env=application/iden3-zkp-json;circuits=unknownCircuit",
                "unknown circuit",
            ),
            (
                "iden3comm/v1;env=application/iden3-zkp-json;alg=EdDSA",
                "algorithm of another envelope",
            ),
            (
                "iden3comm/v1;env=application/iden3comm-plain-json;alg=EdDSA",
                "algorithm for plain",
            ),
            ("iden3comm/v1;env=application/iden3-zkp-json;alg=", "empty list"),
            (
                "iden3comm/v1;env=application/iden3-zkp-json;circuits=authV2,",
                "empty item",
            ),
        ];

        for (validator, input, expected) in table_test!(table) {
            let parsed = parse(input);

            validator
                .given(input)
                .when(expected)
                .then("rejected as malformed")
                .assert_eq(
                    true,
                    matches!(parsed, Err(ProfileError::MalformedProfile(_))),
                );
        }
    }

    #[test]
    fn test_build_preserves_order() {
        let profile = AcceptProfile::new(EnvelopeType::ZeroKnowledgeProof)
            .with_circuits(vec![CircuitId::AuthV3_8_32, CircuitId::AuthV2])
            .with_alg(vec![Algorithm::Groth16]);

        let built = build(&[profile]);
        assert_eq!(
            built,
            vec!["iden3comm/v1;env=application/iden3-zkp-json;circuits=authV3-8-32,authV2;alg=groth16"
                .to_string()]
        )
    }

    #[test]
    fn test_parse_is_left_inverse_of_build() {
        let profiles = vec![
            AcceptProfile::new(EnvelopeType::Plain),
            AcceptProfile::new(EnvelopeType::Signed).with_alg(vec![Algorithm::ES256KR, Algorithm::EdDSA]),
            AcceptProfile::new(EnvelopeType::ZeroKnowledgeProof)
                .with_circuits(vec![CircuitId::AuthV2, CircuitId::AtomicQueryV3OnChain]),
            AcceptProfile::new(EnvelopeType::Encrypted).with_alg(vec![Algorithm::EcdhEsXc20pkw]),
        ];

        for profile in profiles {
            let built = build(&[profile.clone()]);
            let parsed = parse(&built[0]);
            assert!(!parsed.is_err());
            assert_eq!(parsed.unwrap(), profile)
        }
    }

    #[test]
    fn test_display_and_from_str() {
        let profile = AcceptProfile::new(EnvelopeType::Signed).with_alg(vec![Algorithm::EdDSA]);
        let rendered = profile.to_string();
        assert_eq!(rendered, "iden3comm/v1;env=application/iden3comm-signed-json;alg=EdDSA");
        assert_eq!(AcceptProfile::from_str(&rendered).unwrap(), profile)
    }
}
