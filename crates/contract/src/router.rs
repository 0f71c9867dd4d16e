//! Invocation routing: function name + positional args + transient map in,
//! raw payload out.
//!
//! Arity is checked before anything else, then required transient fields,
//! and only then is the ledger or cipher touched.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use common::protocol::{DECKEY, ENCKEY, IV};
use common::ContractError;
use tracing::{debug, info_span};

use crate::crypto::{CipherPrimitive, KeyMaterial};
use crate::key::{CompositeKey, KeyScheme};
use crate::ledger::Ledger;
use crate::records::RecordStore;

/// Per-invocation side channel. Never committed to the ledger.
pub type Transient = HashMap<String, Vec<u8>>;

/// Functions exposed by the contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Function {
    AddRecord,
    GetRecord,
    EncRecord,
    DecRecord,
}

impl Function {
    pub fn name(self) -> &'static str {
        match self {
            Function::AddRecord => "addRecord",
            Function::GetRecord => "getRecord",
            Function::EncRecord => "encRecord",
            Function::DecRecord => "decRecord",
        }
    }

    /// Number of positional arguments the function requires.
    pub fn arity(self) -> usize {
        match self {
            Function::AddRecord | Function::EncRecord => 4,
            Function::GetRecord | Function::DecRecord => 2,
        }
    }

    fn parse(name: &str, decrypt_fallthrough: bool) -> Result<Self, ContractError> {
        match name {
            "addRecord" => Ok(Function::AddRecord),
            "getRecord" => Ok(Function::GetRecord),
            "encRecord" => Ok(Function::EncRecord),
            "decRecord" => Ok(Function::DecRecord),
            _ if decrypt_fallthrough => Ok(Function::DecRecord),
            other => Err(ContractError::UnknownFunction(other.to_owned())),
        }
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Behaviour switches fixed when the contract is instantiated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContractOptions {
    /// How composite keys are flattened for the ledger.
    pub key_scheme: KeyScheme,
    /// Route any unrecognised function name to `decRecord` instead of failing
    /// with [`ContractError::UnknownFunction`].
    pub legacy_decrypt_fallthrough: bool,
}

/// The record-store contract.
///
/// Holds no per-invocation state: key material and ledger access arrive with
/// each [`Contract::dispatch`] call.
#[derive(Clone)]
pub struct Contract {
    primitive: Arc<dyn CipherPrimitive>,
    options: ContractOptions,
}

impl Contract {
    pub fn new(primitive: Arc<dyn CipherPrimitive>, options: ContractOptions) -> Self {
        Self { primitive, options }
    }

    /// Run one invocation against `ledger`.
    ///
    /// # Errors
    ///
    /// Any [`ContractError`]; the invocation has no effect beyond the writes
    /// the caller chooses to commit, and a failed invocation stages none.
    pub fn dispatch(
        &self,
        ledger: &mut dyn Ledger,
        function: &str,
        args: &[String],
        transient: &Transient,
    ) -> Result<Bytes, ContractError> {
        let span = info_span!("dispatch", function, argc = args.len());
        let _enter = span.enter();

        let func = Function::parse(function, self.options.legacy_decrypt_fallthrough)?;
        if args.len() != func.arity() {
            return Err(ContractError::BadArity {
                function: function.to_owned(),
                expected: func.arity(),
                got: args.len(),
            });
        }

        let key = CompositeKey::new([args[0].as_str(), args[1].as_str()]);
        let mut store = RecordStore::new(ledger, self.primitive.clone(), self.options.key_scheme);

        match func {
            Function::AddRecord => {
                store.put_plain(&key, args[2].as_bytes())?;
                Ok(Bytes::copy_from_slice(args[2].as_bytes()))
            }
            Function::GetRecord => store.get_plain(&key),
            Function::EncRecord => {
                let material = key_material(transient, ENCKEY)?;
                debug!(iv = material.has_iv(), "encrypting record");
                let ledger_key = store.write_encrypted(&key, args[2].as_bytes(), material)?;
                Ok(Bytes::from(format!(
                    "key:{ledger_key} cleartextValue:{}",
                    args[2]
                )))
            }
            Function::DecRecord => {
                let material = key_material(transient, DECKEY)?;
                debug!(iv = material.has_iv(), "decrypting record");
                store.read_encrypted(&key, material).map(Bytes::from)
            }
        }
    }
}

impl fmt::Debug for Contract {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Contract")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

/// Pull the key named `field` (and the optional IV) out of the transient map.
fn key_material(transient: &Transient, field: &str) -> Result<KeyMaterial, ContractError> {
    let key = transient
        .get(field)
        .ok_or_else(|| ContractError::MissingTransient(field.to_owned()))?;
    Ok(KeyMaterial::new(key.clone(), transient.get(IV).cloned()))
}
