//! Precompiled contract artifact.
//!
//! Artifacts are consumed as-is: this crate never compiles or interprets
//! the program. It only checks that the interface matches the commitment
//! model and prepends the encoded constructor arguments to the bytecode.
//!
//! The bundled artifact is a hand-assembled stand-in with the deployed
//! contract's interface. Its release and cancel branches check the signer's
//! key hash and signature only; they do not constrain outputs or the fee.
//! Load the compiled `SoloCommitment` artifact with [`Artifact::from_file`]
//! for real funds.

use std::path::Path;

use serde::{Deserialize, Serialize};
use solocommit_types::{CommitError, ConstructorArg, Result, SettlementAction};

use crate::script;

/// Stand-in artifact bundled with this crate.
const SOLO_COMMITMENT_JSON: &str = include_str!("../artifacts/solo-commitment.json");

/// Expected constructor signature: `(bytes20, bytes20, int, int)`.
const CONSTRUCTOR_TYPES: [&str; 4] = ["bytes20", "bytes20", "int", "int"];

/// A named, typed parameter in the artifact interface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbiInput {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
}

/// A spendable function of the contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbiFunction {
    pub name: String,
    pub inputs: Vec<AbiInput>,
}

/// Compiled contract definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    pub contract_name: String,
    pub constructor_inputs: Vec<AbiInput>,
    pub abi: Vec<AbiFunction>,
    /// Hex-encoded compiled program, without constructor arguments.
    pub bytecode: String,
}

impl Artifact {
    /// Parse and validate an artifact from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        let artifact: Self = serde_json::from_str(json)?;
        artifact.validate()?;
        Ok(artifact)
    }

    /// Read and validate an artifact file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&raw)
    }

    /// The stand-in artifact shipped with this crate: same constructor and
    /// ABI as the compiled `SoloCommitment`, simplified bytecode.
    pub fn bundled() -> Result<Self> {
        Self::from_json(SOLO_COMMITMENT_JSON)
    }

    /// Check the interface against the commitment model.
    ///
    /// # Errors
    /// [`CommitError::InvalidArtifact`] if the constructor is not
    /// `(bytes20, bytes20, int, int)`, a settlement function is missing or
    /// has the wrong inputs, or the bytecode is not hex.
    pub fn validate(&self) -> Result<()> {
        let constructor: Vec<&str> = self
            .constructor_inputs
            .iter()
            .map(|i| i.ty.as_str())
            .collect();
        if constructor != CONSTRUCTOR_TYPES {
            return Err(invalid(format!(
                "{}: constructor must be ({}), got ({})",
                self.contract_name,
                CONSTRUCTOR_TYPES.join(", "),
                constructor.join(", ")
            )));
        }

        for action in SettlementAction::ALL {
            let function = self.function(action.function_name()).ok_or_else(|| {
                invalid(format!(
                    "{}: missing function '{}'",
                    self.contract_name,
                    action.function_name()
                ))
            })?;
            let types: Vec<&str> = function.inputs.iter().map(|i| i.ty.as_str()).collect();
            let expected = expected_inputs(action);
            if types != expected {
                return Err(invalid(format!(
                    "{}: function '{}' must take ({}), got ({})",
                    self.contract_name,
                    function.name,
                    expected.join(", "),
                    types.join(", ")
                )));
            }
        }

        if self.bytecode.is_empty() {
            return Err(invalid(format!("{}: empty bytecode", self.contract_name)));
        }
        hex::decode(&self.bytecode)
            .map_err(|e| invalid(format!("{}: bytecode is not hex: {e}", self.contract_name)))?;
        Ok(())
    }

    #[must_use]
    pub fn function(&self, name: &str) -> Option<&AbiFunction> {
        self.abi.iter().find(|f| f.name == name)
    }

    /// Selector pushed before the redeem script to pick `action`'s branch.
    ///
    /// Single-function contracts take no selector (`Ok(None)`).
    pub fn selector(&self, action: SettlementAction) -> Result<Option<usize>> {
        let index = self
            .abi
            .iter()
            .position(|f| f.name == action.function_name())
            .ok_or_else(|| {
                invalid(format!(
                    "{}: missing function '{}'",
                    self.contract_name,
                    action.function_name()
                ))
            })?;
        Ok((self.abi.len() > 1).then_some(index))
    }

    /// Decoded program bytes.
    pub fn base_bytecode(&self) -> Result<Vec<u8>> {
        hex::decode(&self.bytecode)
            .map_err(|e| invalid(format!("{}: bytecode is not hex: {e}", self.contract_name)))
    }

    /// Redeem script for the given constructor arguments: the arguments are
    /// pushed in reverse declaration order, followed by the program.
    pub fn instantiate(&self, args: &[ConstructorArg]) -> Result<Vec<u8>> {
        if args.len() != self.constructor_inputs.len() {
            return Err(CommitError::InvalidParameters {
                reason: format!(
                    "{} expects {} constructor arguments, got {}",
                    self.contract_name,
                    self.constructor_inputs.len(),
                    args.len()
                ),
            });
        }
        let base = self.base_bytecode()?;
        let mut redeem = Vec::with_capacity(base.len() + 64);
        for arg in args.iter().rev() {
            script::push_arg(&mut redeem, arg);
        }
        redeem.extend_from_slice(&base);
        Ok(redeem)
    }
}

fn expected_inputs(action: SettlementAction) -> &'static [&'static str] {
    match action {
        SettlementAction::Release | SettlementAction::Cancel => &["pubkey", "sig", "int"],
        SettlementAction::Sweep => &["pubkey", "sig"],
    }
}

fn invalid(reason: String) -> CommitError {
    CommitError::InvalidArtifact { reason }
}
