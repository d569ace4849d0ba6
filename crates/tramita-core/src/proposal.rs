//! Proposal records as served by the Chamber of Deputies open-data API.
//!
//! Field names follow the upstream JSON (`siglaTipo`, `numero`, `ano`, ...)
//! via serde renames so the rest of the workspace can use English names.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A `(type, number, year)` triple identifying a proposal before its
/// upstream id is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProposalSeed {
    /// Proposal type tag, e.g. `PL`, `PLP`, `PDL`, `REQ`.
    pub kind: &'static str,
    pub number: u32,
    pub year: u16,
}

impl ProposalSeed {
    pub const fn new(kind: &'static str, number: u32, year: u16) -> Self {
        Self { kind, number, year }
    }
}

impl fmt::Display for ProposalSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}/{}", self.kind, self.number, self.year)
    }
}

/// An integer column that upstream may send as any JSON value.
///
/// Parsing never fails on it. Coercion happens once, in the report assembler,
/// so a bad value fails the whole build instead of dropping the proposal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LooseInt {
    Int(i64),
    Text(String),
    #[default]
    Missing,
    /// Floats, booleans, arrays, objects.
    Other(Value),
}

impl LooseInt {
    /// Integer value, if the raw value is an integer, an integral float, or
    /// an integer-looking string.
    pub fn coerce(&self) -> Option<i64> {
        match self {
            LooseInt::Int(n) => Some(*n),
            LooseInt::Text(s) => s.trim().parse().ok(),
            LooseInt::Other(Value::Number(n)) => {
                let f = n.as_f64()?;
                let integral = f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64;
                integral.then_some(f as i64)
            }
            LooseInt::Missing | LooseInt::Other(_) => None,
        }
    }
}

impl fmt::Display for LooseInt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LooseInt::Int(n) => write!(f, "{n}"),
            LooseInt::Text(s) => write!(f, "{s:?}"),
            LooseInt::Missing => f.write_str("null"),
            LooseInt::Other(v) => write!(f, "{v}"),
        }
    }
}

impl From<i64> for LooseInt {
    fn from(n: i64) -> Self {
        LooseInt::Int(n)
    }
}

impl From<&str> for LooseInt {
    fn from(s: &str) -> Self {
        LooseInt::Text(s.to_string())
    }
}

/// A proposal resolved from the `/proposicoes` search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Proposal {
    pub id: i64,
    #[serde(rename = "siglaTipo", default)]
    pub kind: String,
    #[serde(rename = "numero", default)]
    pub number: LooseInt,
    #[serde(rename = "ano", default)]
    pub year: LooseInt,
    #[serde(rename = "ementa", default)]
    pub summary: Option<String>,
}

/// The `statusProposicao` sub-record of a proposal's detail page.
///
/// Every field is optional upstream; JSON `null` is treated as absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProposalStatus {
    #[serde(rename = "dataHora", default)]
    pub last_action_at: Option<String>,
    #[serde(rename = "descricaoTramitacao", default)]
    pub last_action: Option<String>,
    #[serde(rename = "descricaoSituacao", default)]
    pub current_status: Option<String>,
    #[serde(rename = "despacho", default)]
    pub last_dispatch: Option<String>,
    #[serde(rename = "apreciacao", default)]
    pub last_review: Option<String>,
}

/// One entry of `/proposicoes/{id}/autores`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorEntry {
    #[serde(rename = "nome", default)]
    pub name: Option<String>,
}

/// One entry of `/proposicoes/{id}/relacionadas`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelatedEntry {
    pub id: i64,
}

/// One tramitation event of `/proposicoes/{id}/tramitacoes`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    #[serde(rename = "dataHora", default)]
    pub timestamp: Option<String>,
    #[serde(rename = "descricaoTramitacao", default)]
    pub description: Option<String>,
    #[serde(rename = "apreciacao", default)]
    pub review: Option<String>,
    #[serde(rename = "despacho", default)]
    pub dispatch: Option<String>,
}

/// Outcome of one remote lookup.
///
/// Keeps "upstream has nothing" apart from "the call failed"; the legacy
/// placeholder strings are chosen from this in [`crate::render`].
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup<T> {
    Found(T),
    Missing,
    Failed(String),
}

impl<T> Lookup<T> {
    pub fn found(&self) -> Option<&T> {
        match self {
            Lookup::Found(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Lookup::Failed(_))
    }
}
