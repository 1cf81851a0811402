/// An entry in the model selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelInfo {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
}

pub const AVAILABLE_MODELS: &[ModelInfo] = &[
    ModelInfo {
        id: "gpt-4o",
        name: "GPT-4o",
        description: "Great for most tasks",
    },
    ModelInfo {
        id: "o3",
        name: "o3",
        description: "Uses advanced reasoning",
    },
    ModelInfo {
        id: "o4-mini",
        name: "o4-mini",
        description: "Fastest at advanced reasoning",
    },
    ModelInfo {
        id: "o4-mini-high",
        name: "o4-mini-high",
        description: "Great at coding and visual reasoning",
    },
];

#[must_use]
pub fn find_model(id: &str) -> Option<&'static ModelInfo> {
    AVAILABLE_MODELS.iter().find(|model| model.id == id)
}

#[must_use]
pub fn model_index(id: &str) -> Option<usize> {
    AVAILABLE_MODELS.iter().position(|model| model.id == id)
}
