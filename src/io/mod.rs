//! File input and output for integral records, parameters and operators.
//!
//! Two encodings are supported. YAML is used for anything a person might edit or inspect, and
//! `bincode` for compact machine-to-machine exchange. Binary files carry a compound extension
//! naming their payload, so `h2.qredux.mol` holds a [`crate::integrals::MolecularIntegrals`]
//! record and `h2.qredux.op` a [`crate::operators::fermionic_op::FermionicOp`].

use std::ffi::OsString;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use anyhow::{self, format_err};
use bincode;
use serde::{de::DeserializeOwned, Serialize};
use serde_yaml;

pub(crate) mod format;


/// Payload kinds of `bincode` files.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QReduxFileType {
    /// Molecular integral record.
    Mol,

    /// Fermionic operator.
    Op,
}

impl QReduxFileType {
    /// The compound extension, without a leading dot.
    pub fn ext(&self) -> &'static str {
        match self {
            QReduxFileType::Mol => "qredux.mol",
            QReduxFileType::Op => "qredux.op",
        }
    }

    /// Recognises the payload kind from the trailing compound extension of `path`.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Option<Self> {
        let file_name = path.as_ref().file_name()?.to_str()?;
        [QReduxFileType::Mol, QReduxFileType::Op]
            .into_iter()
            .find(|file_type| {
                file_name
                    .strip_suffix(file_type.ext())
                    .is_some_and(|stem| stem.ends_with('.') && stem.len() > 1)
            })
    }

    /// Returns `name` with this compound extension appended, unless it is already there.
    ///
    /// Dots already present in `name` are kept, so `run.1` becomes `run.1.qredux.op`.
    pub fn path_for<P: AsRef<Path>>(&self, name: P) -> PathBuf {
        let name = name.as_ref();
        if QReduxFileType::from_path(name) == Some(*self) {
            return name.to_path_buf();
        }
        let mut path = OsString::from(name.as_os_str());
        path.push(".");
        path.push(self.ext());
        PathBuf::from(path)
    }
}

/// Deserialises a `bincode` file of the given kind. The compound extension is added to `name`
/// when missing.
pub fn read_qredux_binary<T, P: AsRef<Path>>(
    name: P,
    file_type: QReduxFileType,
) -> Result<T, anyhow::Error>
where
    T: DeserializeOwned,
{
    let path = file_type.path_for(name);
    let file = File::open(&path).map_err(|err| format_err!("{}: {err}", path.display()))?;
    bincode::deserialize_from(BufReader::new(file)).map_err(|err| format_err!(err))
}

/// Serialises `value` into a `bincode` file of the given kind, adding the compound extension to
/// `name` when missing.
pub fn write_qredux_binary<T, P: AsRef<Path>>(
    name: P,
    file_type: QReduxFileType,
    value: &T,
) -> Result<(), anyhow::Error>
where
    T: Serialize,
{
    let path = file_type.path_for(name);
    let file = File::create(&path).map_err(|err| format_err!("{}: {err}", path.display()))?;
    bincode::serialize_into(BufWriter::new(file), value).map_err(|err| format_err!(err))
}

/// Deserialises a YAML file. `path` is used exactly as given.
pub fn read_qredux_yaml<T, P: AsRef<Path>>(path: P) -> Result<T, anyhow::Error>
where
    T: DeserializeOwned,
{
    let path = path.as_ref();
    let file = File::open(path).map_err(|err| format_err!("{}: {err}", path.display()))?;
    serde_yaml::from_reader(BufReader::new(file)).map_err(|err| format_err!(err))
}

/// Serialises `value` into YAML. The final extension of `name`, if any, is replaced by `yml`.
pub fn write_qredux_yaml<T, P: AsRef<Path>>(name: P, value: &T) -> Result<(), anyhow::Error>
where
    T: Serialize,
{
    let path = name.as_ref().with_extension("yml");
    let file = File::create(&path).map_err(|err| format_err!("{}: {err}", path.display()))?;
    serde_yaml::to_writer(BufWriter::new(file), value).map_err(|err| format_err!(err))
}

/// Reads a record that may be stored in either encoding.
///
/// Paths ending in the compound extension of `file_type` are decoded with `bincode`. Anything
/// else is parsed as YAML.
pub fn read_qredux_record<T, P: AsRef<Path>>(
    path: P,
    file_type: QReduxFileType,
) -> Result<T, anyhow::Error>
where
    T: DeserializeOwned,
{
    let path = path.as_ref();
    if QReduxFileType::from_path(path) == Some(file_type) {
        read_qredux_binary(path, file_type)
    } else {
        read_qredux_yaml(path)
    }
}
