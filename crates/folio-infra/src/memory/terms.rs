use async_trait::async_trait;
use tokio::sync::RwLock;

use folio_core::domain::{Term, TermKind};
use folio_core::error::RepoError;
use folio_core::ports::TermRepository;

/// One taxonomy. Names are unique ignoring case and slugs are unique.
pub struct InMemoryTermRepository {
    kind: TermKind,
    terms: RwLock<Vec<Term>>,
}

impl InMemoryTermRepository {
    pub fn new(kind: TermKind) -> Self {
        Self {
            kind,
            terms: RwLock::new(Vec::new()),
        }
    }

    pub fn categories() -> Self {
        Self::new(TermKind::Category)
    }

    pub fn tags() -> Self {
        Self::new(TermKind::Tag)
    }
}

fn matches(term: &Term, name: &str, slug: &str) -> bool {
    term.name.to_lowercase() == name.to_lowercase() || term.slug == slug
}

#[async_trait]
impl TermRepository for InMemoryTermRepository {
    fn kind(&self) -> TermKind {
        self.kind
    }

    async fn find_matching(&self, name: &str, slug: &str) -> Result<Option<Term>, RepoError> {
        let terms = self.terms.read().await;
        Ok(terms.iter().find(|t| matches(t, name, slug)).cloned())
    }

    async fn create(&self, term: Term) -> Result<Term, RepoError> {
        let mut terms = self.terms.write().await;
        if terms.iter().any(|t| matches(t, &term.name, &term.slug)) {
            return Err(RepoError::Constraint(format!(
                "{} '{}' already exists",
                self.kind.as_str(),
                term.name
            )));
        }
        terms.push(term.clone());
        Ok(term)
    }

    async fn list(&self) -> Result<Vec<Term>, RepoError> {
        let mut terms = self.terms.read().await.clone();
        terms.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        Ok(terms)
    }
}
