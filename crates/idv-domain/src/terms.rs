use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermsCheckbox {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub display_order: i32,
}

/// Ordena por `display_order` (estable ante empates).
pub fn sort_for_display(mut boxes: Vec<TermsCheckbox>) -> Vec<TermsCheckbox> {
    boxes.sort_by_key(|b| b.display_order);
    boxes
}
