use serde::Serialize;

pub type BatchId = i64;

/// A stock batch: socks of one color and cotton percentage.
///
/// The (color, cotton_part) pair is the natural key income merges on;
/// the id is assigned by the store on insert and never reused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    pub id: BatchId,
    pub color: String,
    pub cotton_part: i64,
    pub quantity: i64,
}

impl Batch {
    pub fn view(&self) -> BatchView {
        BatchView {
            id: self.id,
            color: self.color.clone(),
            cotton_part: self.cotton_part,
            quantity: self.quantity,
        }
    }
}

/// A batch the store has not assigned an id to yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBatch {
    pub color: String,
    pub cotton_part: i64,
    pub quantity: i64,
}

impl NewBatch {
    pub fn new(color: impl Into<String>, cotton_part: i64, quantity: i64) -> Self {
        Self {
            color: color.into(),
            cotton_part,
            quantity,
        }
    }
}

/// Read-only projection returned by queries and updates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchView {
    pub id: BatchId,
    pub color: String,
    pub cotton_part: i64,
    pub quantity: i64,
}

/// Sort order for batch listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Color,
    CottonPart,
}

impl SortKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Color => "color",
            SortKey::CottonPart => "cottonPart",
        }
    }

    /// Accepted tokens are exactly "color" and "cottonPart", case-sensitive.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "color" => Some(SortKey::Color),
            "cottonPart" => Some(SortKey::CottonPart),
            _ => None,
        }
    }
}

impl std::fmt::Display for SortKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_key_roundtrip() {
        for key in [SortKey::Color, SortKey::CottonPart] {
            let s = key.as_str();
            let parsed = SortKey::from_str(s).unwrap();
            assert_eq!(key, parsed);
        }
    }

    #[test]
    fn test_sort_key_rejects_unknown_tokens() {
        for token in ["quantity", "Color", "COTTONPART", "cotton_part", ""] {
            assert_eq!(SortKey::from_str(token), None);
        }
    }

    #[test]
    fn test_view_projects_all_fields() {
        let batch = Batch {
            id: 7,
            color: "red".into(),
            cotton_part: 50,
            quantity: 3,
        };
        let view = batch.view();
        assert_eq!(view.id, 7);
        assert_eq!(view.color, "red");
        assert_eq!(view.cotton_part, 50);
        assert_eq!(view.quantity, 3);
    }
}
