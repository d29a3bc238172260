use serde::{Deserialize, Serialize};

/// Ordered characters exactly as the catalog returned them
pub type CharacterSet = Vec<Character>;

/// A catalog entry. Only `id` and `name` are required; the rest is display
/// metadata passed through as received.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Character {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub species: String,
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub origin: LocationRef,
    #[serde(default)]
    pub location: LocationRef,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub episode: Vec<String>,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub created: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationRef {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub url: String,
}

/// Paging metadata of a listing response
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInfo {
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub pages: u64,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub prev: Option<String>,
}

/// Envelope returned by both the listing and the search endpoint
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResponse {
    #[serde(default)]
    pub info: Option<PageInfo>,
    pub results: CharacterSet,
}

impl Character {
    /// Number of episodes the character appears in
    pub fn episode_count(&self) -> usize {
        self.episode.len()
    }

    /// Species with the sub-type appended when the catalog provides one
    pub fn species_label(&self) -> String {
        if self.kind.is_empty() {
            self.species.clone()
        } else {
            format!("{} ({})", self.species, self.kind)
        }
    }
}
