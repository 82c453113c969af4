//! Fixtures mimicking a compiled Hardhat project.

use std::{fs, path::Path};

use crate::artifact::Artifacts;

pub const EXCHANGE_BYTECODE: &str = "0x6080604052348015600f57600080fd5b50603f80601d6000396000f3fe";

pub const EXCHANGE_ABI: &str = r#"[
  {
    "inputs": [
      { "internalType": "uint8", "name": "_maxWhitelistedAddresses", "type": "uint8" }
    ],
    "stateMutability": "nonpayable",
    "type": "constructor"
  },
  {
    "inputs": [],
    "name": "maxWhitelistedAddresses",
    "outputs": [{ "internalType": "uint8", "name": "", "type": "uint8" }],
    "stateMutability": "view",
    "type": "function"
  }
]"#;

const BUILD_INFO_ID: &str = "3b9a1c0f7de2";

/// Writes `artifacts/<source>/<name>.json` under `root`.
pub fn write_artifact(root: &Path, source: &str, name: &str, abi: &str, bytecode: &str) {
    let dir = root.join(source);
    fs::create_dir_all(&dir).unwrap();
    let artifact = format!(
        r#"{{
  "_format": "hh-sol-artifact-1",
  "contractName": "{name}",
  "sourceName": "{source}",
  "abi": {abi},
  "bytecode": "{bytecode}",
  "deployedBytecode": "0x",
  "linkReferences": {{}},
  "deployedLinkReferences": {{}}
}}"#
    );
    fs::write(dir.join(format!("{name}.json")), artifact).unwrap();
}

/// Lays out the artifacts of a project with a single `Exchange` contract,
/// including its debug file and build info.
pub fn write_hardhat_project(root: &Path) -> Artifacts {
    let source = "contracts/Exchange.sol";
    write_artifact(root, source, "Exchange", EXCHANGE_ABI, EXCHANGE_BYTECODE);

    let debug = format!(
        r#"{{ "_format": "hh-sol-dbg-1", "buildInfo": "../../build-info/{BUILD_INFO_ID}.json" }}"#
    );
    fs::write(root.join(source).join("Exchange.dbg.json"), debug).unwrap();

    let build_info_dir = root.join("build-info");
    fs::create_dir_all(&build_info_dir).unwrap();
    let build_info = format!(
        r#"{{
  "_format": "hh-sol-build-info-1",
  "id": "{BUILD_INFO_ID}",
  "solcVersion": "0.8.19",
  "solcLongVersion": "0.8.19+commit.7dd6d404",
  "input": {{
    "language": "Solidity",
    "sources": {{
      "{source}": {{ "content": "pragma solidity ^0.8.0; contract Exchange {{}}" }}
    }},
    "settings": {{ "optimizer": {{ "enabled": false, "runs": 200 }} }}
  }},
  "output": {{}}
}}"#
    );
    fs::write(build_info_dir.join(format!("{BUILD_INFO_ID}.json")), build_info).unwrap();

    Artifacts::new(root)
}
