use serde::Serialize;

/// The mosque a calendar belongs to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MosqueIdentity {
    pub uuid: String,
    pub name: String,
    pub slug: Option<String>,
    pub localisation: Option<String>,
    pub image: Option<String>,
    pub url: Option<String>,
    /// Distance from the configured coordinates, in metres.
    pub proximity: Option<f64>,
}

impl MosqueIdentity {
    /// Whether `identifier` names this mosque, by uuid or slug.
    pub fn matches(&self, identifier: &str) -> bool {
        let identifier = identifier.trim();
        self.uuid.eq_ignore_ascii_case(identifier)
            || self
                .slug
                .as_deref()
                .is_some_and(|slug| slug.eq_ignore_ascii_case(identifier))
    }
}
