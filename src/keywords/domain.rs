//! Supplemented feature: a coarse field-preset bucketing filter, dropped
//! by the distillation but present in the original. Matches by category
//! membership, falling back to a keyword check against title/abstract
//! for cross-listed papers. Standalone, not part of the Filter-and-Rank
//! pipeline proper.

use crate::models::Paper;

/// Fixed field presets a caller can bucket papers into independently of
/// a profile's keyword spec.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Ai,
    Robotics,
    ComputerVision,
    Nlp,
}

impl Field {
    fn categories(self) -> &'static [&'static str] {
        match self {
            Field::Ai => &["cs.AI", "cs.LG", "cs.NE"],
            Field::Robotics => &["cs.RO"],
            Field::ComputerVision => &["cs.CV"],
            Field::Nlp => &["cs.CL"],
        }
    }

    /// Fallback keywords checked against title/abstract when a paper is
    /// cross-listed outside `categories()` but is still topically in
    /// scope for the field.
    fn keywords(self) -> &'static [&'static str] {
        match self {
            Field::Ai => &["artificial intelligence", "machine learning", "neural network"],
            Field::Robotics => &["robot", "robotic", "manipulator", "locomotion"],
            Field::ComputerVision => &["image", "visual", "object detection", "segmentation"],
            Field::Nlp => &["language model", "text generation", "nlp", "natural language"],
        }
    }
}

/// Does `paper` belong to `field`? By category membership, or failing
/// that, by a keyword appearing in its title or abstract.
pub fn matches_field(paper: &Paper, field: Field) -> bool {
    let cats = field.categories();
    if paper.categories.iter().any(|c| cats.contains(&c.as_str())) {
        return true;
    }

    let text = format!("{} {}", paper.title, paper.abstract_text).to_lowercase();
    field.keywords().iter().any(|k| text.contains(k))
}

/// Filter `papers` down to the ones matching `field`.
pub fn filter_by_field<'a>(papers: &'a [Paper], field: Field) -> Vec<&'a Paper> {
    papers.iter().filter(|p| matches_field(p, field)).collect()
}
