use super::{CaptureRole, LanguageConfig};
use crate::error::ParserError;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use tree_sitter::{Parser, Query};

/// A grammar with its compiled structural query. Shared read-only between
/// extraction tasks.
pub struct LoadedGrammar {
    pub language: tree_sitter::Language,
    pub query: Query,
    roles: Vec<CaptureRole>,
}

impl LoadedGrammar {
    pub fn role(&self, capture_index: u32) -> CaptureRole {
        self.roles
            .get(capture_index as usize)
            .copied()
            .unwrap_or(CaptureRole::Ignored)
    }
}

/// Compiles each grammar at most once and hands out fresh parsers bound to it.
///
/// Built once per run and passed to the assembler; parsers are never cached
/// since they carry mutable parse state.
#[derive(Default)]
pub struct GrammarLoader {
    cache: RwLock<HashMap<&'static str, Arc<LoadedGrammar>>>,
}

impl GrammarLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(&self, config: &'static LanguageConfig) -> Result<Arc<LoadedGrammar>, ParserError> {
        {
            let cache = self.cache.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(loaded) = cache.get(config.name) {
                return Ok(Arc::clone(loaded));
            }
        }

        let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(loaded) = cache.get(config.name) {
            return Ok(Arc::clone(loaded));
        }
        let language = config.grammar();
        let query =
            Query::new(&language, config.query_source()).map_err(|source| ParserError::Query {
                language: config.name.to_string(),
                source,
            })?;
        let roles = query
            .capture_names()
            .iter()
            .map(|name| CaptureRole::parse(name))
            .collect();
        tracing::debug!(language = config.name, "compiled grammar");
        let loaded = Arc::new(LoadedGrammar {
            language,
            query,
            roles,
        });
        cache.insert(config.name, Arc::clone(&loaded));
        Ok(loaded)
    }

    /// A new parser bound to the cached grammar, plus the grammar itself.
    pub fn create_parser(
        &self,
        config: &'static LanguageConfig,
    ) -> Result<(Parser, Arc<LoadedGrammar>), ParserError> {
        let loaded = self.load(config)?;
        let mut parser = Parser::new();
        parser
            .set_language(&loaded.language)
            .map_err(|source| ParserError::Grammar {
                language: config.name.to_string(),
                source,
            })?;
        Ok((parser, loaded))
    }

    pub fn loaded_count(&self) -> usize {
        self.cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
