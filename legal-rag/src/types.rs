//! Public record types of the query pipeline.

use serde::{Deserialize, Serialize};

/// One ranked result from the vector-index collaborator.
///
/// `distance` is similarity-inverse: lower means more relevant. The
/// ranking returned by the collaborator is trusted as-is and never
/// re-ordered here. Similarity for display is `1 - distance`, computed by
/// the presentation layer, not stored.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SearchHit {
    /// Chunk text.
    pub content: String,
    /// Document identifier, unique within its category.
    pub doc_id: String,
    /// Human-readable category label, e.g. `판례`.
    pub type_name: String,
    /// Ascending-sorted similarity-inverse score.
    pub distance: f32,
}

/// Source attribution for one retrieved chunk, in ranking order.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SourceRef {
    pub doc_id: String,
    /// The human-readable category label of the source document.
    #[serde(rename = "type")]
    pub type_name: String,
    pub distance: f32,
}

/// Final answer together with its attributed sources and the original
/// question, echoed for traceability.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct QueryResult {
    pub answer: String,
    pub sources: Vec<SourceRef>,
    pub question: String,
}
