// Copyright (c) 2025 - Cowboy AI, Inc.
//! Data Entity Aggregate

use serde::{Deserialize, Serialize};

use super::handlers::HandlerContext;
use crate::domain::{validation, Classification};
use crate::errors::{DomainError, DomainResult};
use crate::events::DataEntityEvent;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataEntityState {
    pub name: String,
    pub classification: Option<Classification>,
    pub domain: Option<String>,
    pub pii_flag: bool,
    pub glossary_terms: Vec<String>,
    pub lineage: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataEntityPatch {
    pub name: Option<String>,
    pub classification: Option<String>,
    pub domain: Option<String>,
    pub pii_flag: Option<bool>,
    pub glossary_terms: Option<Vec<String>>,
    pub lineage: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "verb", rename_all = "kebab-case")]
pub enum DataEntityCommand {
    Create {
        name: Option<String>,
        classification: Option<String>,
        domain: Option<String>,
        #[serde(default)]
        pii_flag: bool,
        #[serde(default)]
        glossary_terms: Vec<String>,
        #[serde(default)]
        lineage: Vec<String>,
    },
    Update(DataEntityPatch),
    Delete {
        reason: Option<String>,
    },
}

impl DataEntityCommand {
    pub fn verb(&self) -> &'static str {
        match self {
            DataEntityCommand::Create { .. } => "create",
            DataEntityCommand::Update(_) => "update",
            DataEntityCommand::Delete { .. } => "delete",
        }
    }
}

fn classification(value: Option<&str>) -> DomainResult<Option<Classification>> {
    value.map(str::parse).transpose()
}

pub fn decide(
    state: Option<&DataEntityState>,
    command: &DataEntityCommand,
    _ctx: &HandlerContext,
) -> DomainResult<Vec<DataEntityEvent>> {
    use DataEntityCommand::*;

    match (state, command) {
        (
            None,
            Create {
                name,
                classification: level,
                domain,
                pii_flag,
                glossary_terms,
                lineage,
            },
        ) => Ok(vec![DataEntityEvent::Created {
            name: validation::require_text("name", name.as_deref())?,
            classification: classification(level.as_deref())?,
            domain: validation::optional_text("domain", domain.as_deref())?,
            pii_flag: *pii_flag,
            glossary_terms: validation::tags(glossary_terms)?,
            lineage: validation::references("lineage", lineage)?,
        }]),

        (Some(_), Update(patch)) => {
            validation::non_empty_patch(*patch == DataEntityPatch::default())?;
            Ok(vec![DataEntityEvent::Updated {
                name: validation::optional_text("name", patch.name.as_deref())?,
                classification: classification(patch.classification.as_deref())?,
                domain: validation::optional_text("domain", patch.domain.as_deref())?,
                pii_flag: patch.pii_flag,
                glossary_terms: patch
                    .glossary_terms
                    .as_deref()
                    .map(validation::tags)
                    .transpose()?,
                lineage: patch
                    .lineage
                    .as_deref()
                    .map(|ids| validation::references("lineage", ids))
                    .transpose()?,
            }])
        }

        (Some(_), Delete { reason }) => Ok(vec![DataEntityEvent::Deleted {
            reason: reason.clone(),
        }]),

        (Some(_), Create { .. }) => Err(DomainError::validation("id", "data entity already exists")),
        (None, _) => Err(DomainError::validation("id", "data entity does not exist")),
    }
}

pub fn from_created(event: &DataEntityEvent) -> Option<DataEntityState> {
    match event {
        DataEntityEvent::Created {
            name,
            classification,
            domain,
            pii_flag,
            glossary_terms,
            lineage,
        } => Some(DataEntityState {
            name: name.clone(),
            classification: *classification,
            domain: domain.clone(),
            pii_flag: *pii_flag,
            glossary_terms: glossary_terms.clone(),
            lineage: lineage.clone(),
        }),
        _ => None,
    }
}

pub fn apply_event(state: DataEntityState, event: &DataEntityEvent) -> DataEntityState {
    match event {
        DataEntityEvent::Created { .. } => from_created(event).unwrap_or(state),
        DataEntityEvent::Updated {
            name,
            classification,
            domain,
            pii_flag,
            glossary_terms,
            lineage,
        } => DataEntityState {
            name: name.clone().unwrap_or(state.name),
            classification: classification.or(state.classification),
            domain: domain.clone().or(state.domain),
            pii_flag: pii_flag.unwrap_or(state.pii_flag),
            glossary_terms: glossary_terms.clone().unwrap_or(state.glossary_terms),
            lineage: lineage.clone().unwrap_or(state.lineage),
        },
        DataEntityEvent::Deleted { .. } => state,
    }
}

impl DataEntityState {
    pub fn attribute(&self, key: &str) -> Option<String> {
        match key {
            "name" => Some(self.name.clone()),
            "classification" => self.classification.map(|c| c.to_string()),
            "domain" => self.domain.clone(),
            "pii_flag" => Some(self.pii_flag.to_string()),
            _ => None,
        }
    }
}
