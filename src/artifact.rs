//! Hardhat compilation artifacts.
//!
//! A contract is identified either by its bare name (`Exchange`), which must
//! be unique across the artifacts directory, or by its fully-qualified name
//! (`contracts/Exchange.sol:Exchange`).

use std::{
    fs,
    path::{Path, PathBuf},
};

use alloy::{
    dyn_abi::{DynSolType, DynSolValue, Specifier},
    json_abi::JsonAbi,
    primitives::Bytes,
};
use glob::Pattern;
use serde::{de::DeserializeOwned, Deserialize};

const BUILD_INFO_DIR: &str = "build-info";
/// Marker solc leaves in bytecode where a library address must be linked.
const LIBRARY_PLACEHOLDER: &str = "__$";

#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("empty contract identifier")]
    EmptyIdentifier,
    #[error("could not read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("malformed artifact {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("invalid artifact search pattern: {0}")]
    Pattern(#[from] glob::PatternError),
    #[error("no artifact found for contract `{0}`, is the project compiled?")]
    NotFound(String),
    #[error(
        "multiple artifacts found for contract `{name}`, use one of: {}",
        .candidates.join(", ")
    )]
    Ambiguous {
        name: String,
        candidates: Vec<String>,
    },
    #[error("contract `{0}` has no creation bytecode, is it abstract or an interface?")]
    NoBytecode(String),
    #[error("contract `{0}` needs unlinked libraries, which are not supported")]
    UnlinkedLibraries(String),
    #[error("invalid bytecode for contract `{name}`: {source}")]
    Bytecode {
        name: String,
        source: hex::FromHexError,
    },
    #[error("unsupported constructor parameter type `{ty}`: {source}")]
    ParameterType {
        ty: String,
        source: alloy::dyn_abi::Error,
    },
    #[error("constructor of `{contract}` takes {expected} arguments, got {got}")]
    ArgumentCount {
        contract: String,
        expected: usize,
        got: usize,
    },
    #[error("invalid constructor argument `{value}` for type {ty}: {source}")]
    Argument {
        value: String,
        ty: String,
        source: alloy::dyn_abi::Error,
    },
    #[error("no build info for contract `{0}`, recompile the project")]
    NoBuildInfo(String),
}

/// The artifacts directory of a compiled Hardhat project.
#[derive(Clone, Debug)]
pub struct Artifacts {
    root: PathBuf,
}

impl Artifacts {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolves `identifier` to its artifact.
    pub fn load(&self, identifier: &str) -> Result<Artifact, ArtifactError> {
        let path = self.find(identifier)?;
        let mut artifact: Artifact = read_json(&path)?;
        artifact.path = path;
        Ok(artifact)
    }

    fn find(&self, identifier: &str) -> Result<PathBuf, ArtifactError> {
        let identifier = identifier.trim();
        if identifier.is_empty() {
            return Err(ArtifactError::EmptyIdentifier);
        }

        if let Some((source, name)) = identifier.rsplit_once(':') {
            let path = self.root.join(source).join(format!("{name}.json"));
            if path.is_file() {
                return Ok(path);
            }
            return Err(ArtifactError::NotFound(identifier.to_owned()));
        }

        let pattern = format!(
            "{}/**/{}.json",
            Pattern::escape(&self.root.to_string_lossy()),
            Pattern::escape(identifier),
        );
        let build_info = self.root.join(BUILD_INFO_DIR);
        let mut candidates: Vec<PathBuf> = glob::glob(&pattern)?
            .filter_map(Result::ok)
            .filter(|path| !path.starts_with(&build_info))
            .collect();

        match candidates.len() {
            0 => Err(ArtifactError::NotFound(identifier.to_owned())),
            1 => Ok(candidates.remove(0)),
            _ => Err(ArtifactError::Ambiguous {
                name: identifier.to_owned(),
                candidates: candidates
                    .iter()
                    .map(|path| self.qualified_name(path, identifier))
                    .collect(),
            }),
        }
    }

    fn qualified_name(&self, path: &Path, name: &str) -> String {
        let source = path
            .parent()
            .and_then(|dir| dir.strip_prefix(&self.root).ok())
            .unwrap_or(Path::new(""));
        format!("{}:{name}", source.display())
    }
}

/// A compiled contract, as written by Hardhat to
/// `artifacts/<sourceName>/<contractName>.json`.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    pub contract_name: String,
    pub source_name: String,
    pub abi: JsonAbi,
    bytecode: String,
    #[serde(skip)]
    path: PathBuf,
}

impl Artifact {
    /// `sourceName:contractName`, the form explorers expect.
    pub fn fully_qualified_name(&self) -> String {
        format!("{}:{}", self.source_name, self.contract_name)
    }

    /// Creation bytecode, without constructor arguments.
    pub fn bytecode(&self) -> Result<Bytes, ArtifactError> {
        let code = self.bytecode.trim_start_matches("0x");
        if code.is_empty() {
            return Err(ArtifactError::NoBytecode(self.contract_name.clone()));
        }
        if code.contains(LIBRARY_PLACEHOLDER) {
            return Err(ArtifactError::UnlinkedLibraries(self.contract_name.clone()));
        }
        hex::decode(code)
            .map(Bytes::from)
            .map_err(|source| ArtifactError::Bytecode {
                name: self.contract_name.clone(),
                source,
            })
    }

    pub fn constructor_types(&self) -> Result<Vec<DynSolType>, ArtifactError> {
        let Some(constructor) = &self.abi.constructor else {
            return Ok(Vec::new());
        };
        constructor
            .inputs
            .iter()
            .map(|param| {
                param.resolve().map_err(|source| ArtifactError::ParameterType {
                    ty: param.ty.clone(),
                    source,
                })
            })
            .collect()
    }

    /// Parses textual constructor arguments against the constructor's
    /// parameter types.
    pub fn constructor_args(&self, args: &[String]) -> Result<Vec<DynSolValue>, ArtifactError> {
        let types = self.constructor_types()?;
        if types.len() != args.len() {
            return Err(ArtifactError::ArgumentCount {
                contract: self.contract_name.clone(),
                expected: types.len(),
                got: args.len(),
            });
        }

        types
            .iter()
            .zip(args)
            .map(|(ty, value)| {
                ty.coerce_str(value).map_err(|source| ArtifactError::Argument {
                    value: value.clone(),
                    ty: ty.sol_type_name().into_owned(),
                    source,
                })
            })
            .collect()
    }

    /// Creation bytecode followed by the ABI-encoded constructor arguments.
    pub fn init_code(&self, args: &[DynSolValue]) -> Result<Bytes, ArtifactError> {
        let code = self.bytecode()?;
        Ok([code.to_vec(), encode_constructor_args(args)].concat().into())
    }

    /// Reads the compiler run that produced this artifact.
    pub fn build_info(&self) -> Result<BuildInfo, ArtifactError> {
        let debug_path = self.path.with_extension("dbg.json");
        if !debug_path.is_file() {
            return Err(ArtifactError::NoBuildInfo(self.fully_qualified_name()));
        }
        let debug: DebugFile = read_json(&debug_path)?;
        let dir = debug_path.parent().unwrap_or(Path::new(""));
        read_json(&dir.join(debug.build_info))
    }
}

/// ABI-encodes constructor arguments as a parameter list.
pub fn encode_constructor_args(args: &[DynSolValue]) -> Vec<u8> {
    DynSolValue::Tuple(args.to_vec()).abi_encode_params()
}

/// Compiler input and version for one Hardhat compilation.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildInfo {
    pub solc_long_version: String,
    /// Standard JSON input handed to solc.
    pub input: serde_json::Value,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DebugFile {
    build_info: PathBuf,
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ArtifactError> {
    let contents = fs::read_to_string(path).map_err(|source| ArtifactError::Io {
        path: path.to_owned(),
        source,
    })?;
    serde_json::from_str(&contents).map_err(|source| ArtifactError::Json {
        path: path.to_owned(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use alloy::primitives::U256;

    use super::*;
    use crate::testing::{write_artifact, write_hardhat_project, EXCHANGE_BYTECODE};

    #[test]
    fn loads_by_name() {
        let dir = tempfile::tempdir().unwrap();
        let artifacts = write_hardhat_project(dir.path());

        let artifact = artifacts.load("Exchange").unwrap();
        assert_eq!(artifact.contract_name, "Exchange");
        assert_eq!(
            artifact.fully_qualified_name(),
            "contracts/Exchange.sol:Exchange"
        );
    }

    #[test]
    fn loads_by_fully_qualified_name() {
        let dir = tempfile::tempdir().unwrap();
        let artifacts = write_hardhat_project(dir.path());

        let artifact = artifacts.load("contracts/Exchange.sol:Exchange").unwrap();
        assert_eq!(artifact.source_name, "contracts/Exchange.sol");
    }

    #[test]
    fn missing_contract_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let artifacts = write_hardhat_project(dir.path());

        assert!(matches!(
            artifacts.load("Token"),
            Err(ArtifactError::NotFound(name)) if name == "Token"
        ));
        assert!(matches!(
            artifacts.load("contracts/Token.sol:Exchange"),
            Err(ArtifactError::NotFound(_))
        ));
        assert!(matches!(
            artifacts.load(""),
            Err(ArtifactError::EmptyIdentifier)
        ));
    }

    #[test]
    fn duplicate_names_are_ambiguous() {
        let dir = tempfile::tempdir().unwrap();
        let artifacts = write_hardhat_project(dir.path());
        write_artifact(
            dir.path(),
            "contracts/v2/Exchange.sol",
            "Exchange",
            "[]",
            EXCHANGE_BYTECODE,
        );

        let Err(ArtifactError::Ambiguous { candidates, .. }) = artifacts.load("Exchange") else {
            panic!("expected an ambiguous lookup");
        };
        assert_eq!(candidates.len(), 2);
        assert!(candidates.contains(&"contracts/v2/Exchange.sol:Exchange".to_string()));

        artifacts.load("contracts/v2/Exchange.sol:Exchange").unwrap();
    }

    #[test]
    fn coerces_constructor_args() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = write_hardhat_project(dir.path()).load("Exchange").unwrap();

        let args = artifact.constructor_args(&["10".to_string()]).unwrap();
        assert_eq!(args, vec![DynSolValue::Uint(U256::from(10), 8)]);
    }

    #[test]
    fn rejects_bad_constructor_args() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = write_hardhat_project(dir.path()).load("Exchange").unwrap();

        assert!(matches!(
            artifact.constructor_args(&[]),
            Err(ArtifactError::ArgumentCount {
                expected: 1,
                got: 0,
                ..
            })
        ));
        assert!(matches!(
            artifact.constructor_args(&["ten".to_string()]),
            Err(ArtifactError::Argument { .. })
        ));
    }

    #[test]
    fn init_code_appends_encoded_args() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = write_hardhat_project(dir.path()).load("Exchange").unwrap();
        let args = vec![DynSolValue::Uint(U256::from(10), 8)];

        let init_code = artifact.init_code(&args).unwrap();
        let bytecode = hex::decode(EXCHANGE_BYTECODE.trim_start_matches("0x")).unwrap();
        let mut word = [0u8; 32];
        word[31] = 10;
        assert_eq!(init_code.to_vec(), [bytecode, word.to_vec()].concat());
    }

    #[test]
    fn contract_without_constructor_takes_no_args() {
        let dir = tempfile::tempdir().unwrap();
        let artifacts = Artifacts::new(dir.path());
        write_artifact(dir.path(), "contracts/Plain.sol", "Plain", "[]", "0x6080");

        let artifact = artifacts.load("Plain").unwrap();
        assert!(artifact.constructor_args(&[]).unwrap().is_empty());
        assert_eq!(artifact.init_code(&[]).unwrap().to_vec(), vec![0x60, 0x80]);
    }

    #[test]
    fn rejects_unusable_bytecode() {
        let dir = tempfile::tempdir().unwrap();
        let artifacts = Artifacts::new(dir.path());
        write_artifact(dir.path(), "contracts/IToken.sol", "IToken", "[]", "0x");
        write_artifact(
            dir.path(),
            "contracts/Linked.sol",
            "Linked",
            "[]",
            "0x6080__$d5b9f1e4c3b2a1$__6080",
        );

        assert!(matches!(
            artifacts.load("IToken").unwrap().bytecode(),
            Err(ArtifactError::NoBytecode(_))
        ));
        assert!(matches!(
            artifacts.load("Linked").unwrap().bytecode(),
            Err(ArtifactError::UnlinkedLibraries(_))
        ));
    }

    #[test]
    fn reads_build_info() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = write_hardhat_project(dir.path()).load("Exchange").unwrap();

        let build_info = artifact.build_info().unwrap();
        assert_eq!(build_info.solc_long_version, "0.8.19+commit.7dd6d404");
        assert!(build_info.input["sources"]["contracts/Exchange.sol"].is_object());
    }

    #[test]
    fn missing_build_info_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let artifacts = Artifacts::new(dir.path());
        write_artifact(dir.path(), "contracts/Plain.sol", "Plain", "[]", "0x6080");

        assert!(matches!(
            artifacts.load("Plain").unwrap().build_info(),
            Err(ArtifactError::NoBuildInfo(name)) if name == "contracts/Plain.sol:Plain"
        ));
    }
}
