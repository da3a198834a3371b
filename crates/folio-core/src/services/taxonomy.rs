//! Category and tag resolution.
//!
//! Resolution is split from commit so that the publishing workflow can reject
//! a post before anything is written. The commit step re-checks the store and
//! treats a uniqueness violation as "someone else created it first".

use std::sync::Arc;

use tracing::{debug, warn};

use crate::domain::{Term, TermKind};
use crate::error::{RepoError, TaxonomyError};
use crate::ports::TermRepository;
use crate::slug::slugify;

/// Outcome of resolving one free-text name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Connect(Term),
    Create { name: String, slug: String },
}

#[derive(Clone)]
pub struct TaxonomyResolver {
    categories: Arc<dyn TermRepository>,
    tags: Arc<dyn TermRepository>,
}

impl TaxonomyResolver {
    pub fn new(categories: Arc<dyn TermRepository>, tags: Arc<dyn TermRepository>) -> Self {
        Self { categories, tags }
    }

    fn repo(&self, kind: TermKind) -> &dyn TermRepository {
        match kind {
            TermKind::Category => self.categories.as_ref(),
            TermKind::Tag => self.tags.as_ref(),
        }
    }

    /// Matches `name` against existing terms by case-insensitive name or by
    /// derived slug.
    pub async fn resolve(&self, kind: TermKind, name: &str) -> Result<Resolution, TaxonomyError> {
        let name = name.trim();
        let slug = slugify(name);
        if name.is_empty() || slug.is_empty() {
            return Err(TaxonomyError::InvalidName { kind });
        }

        match self.repo(kind).find_matching(name, &slug).await? {
            Some(term) => Ok(Resolution::Connect(term)),
            None => Ok(Resolution::Create {
                name: name.to_string(),
                slug,
            }),
        }
    }

    pub async fn resolve_category(&self, name: &str) -> Result<Resolution, TaxonomyError> {
        self.resolve(TermKind::Category, name).await
    }

    /// Resolves each tag independently. Exact duplicates in the input are
    /// collapsed first.
    pub async fn resolve_tags(&self, names: &[String]) -> Result<Vec<Resolution>, TaxonomyError> {
        let mut seen: Vec<&str> = Vec::with_capacity(names.len());
        for name in names {
            let name = name.trim();
            if !seen.contains(&name) {
                seen.push(name);
            }
        }

        let mut resolutions = Vec::with_capacity(seen.len());
        for name in seen {
            resolutions.push(self.resolve(TermKind::Tag, name).await?);
        }
        Ok(resolutions)
    }

    /// Turns a resolution into a stored term.
    pub async fn commit(
        &self,
        kind: TermKind,
        resolution: Resolution,
    ) -> Result<Term, TaxonomyError> {
        match resolution {
            Resolution::Connect(term) => Ok(term),
            Resolution::Create { name, slug } => self.create_or_connect(kind, &name, &slug).await,
        }
    }

    /// Commits several resolutions, dropping terms that end up identical.
    pub async fn commit_all(
        &self,
        kind: TermKind,
        resolutions: Vec<Resolution>,
    ) -> Result<Vec<Term>, TaxonomyError> {
        let mut terms: Vec<Term> = Vec::with_capacity(resolutions.len());
        for resolution in resolutions {
            let term = self.commit(kind, resolution).await?;
            if !terms.iter().any(|t| t.id == term.id) {
                terms.push(term);
            }
        }
        Ok(terms)
    }

    async fn create_or_connect(
        &self,
        kind: TermKind,
        name: &str,
        slug: &str,
    ) -> Result<Term, TaxonomyError> {
        let repo = self.repo(kind);

        if let Some(existing) = repo.find_matching(name, slug).await? {
            debug!(%kind, name, "term appeared since resolution, connecting");
            return Ok(existing);
        }

        match repo.create(Term::new(name, slug)).await {
            Ok(term) => return Ok(term),
            Err(RepoError::Constraint(reason)) => {
                warn!(%kind, name, %reason, "term creation conflicted, re-resolving");
            }
            Err(e) => return Err(e.into()),
        }

        if let Some(existing) = repo.find_matching(name, slug).await? {
            return Ok(existing);
        }
        match repo.create(Term::new(name, slug)).await {
            Ok(term) => Ok(term),
            Err(RepoError::Constraint(_)) => Err(TaxonomyError::Conflict {
                kind,
                name: name.to_string(),
            }),
            Err(e) => Err(e.into()),
        }
    }
}
