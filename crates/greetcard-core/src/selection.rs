use serde::{Deserialize, Serialize};

use crate::document::TextId;

/// Which layer the transform handles and control panel are attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Selection {
    #[default]
    None,
    Photo,
    Text(TextId),
}

impl Selection {
    pub fn is_photo(&self) -> bool {
        matches!(self, Selection::Photo)
    }

    pub fn text_id(&self) -> Option<TextId> {
        match self {
            Selection::Text(id) => Some(*id),
            Selection::None | Selection::Photo => None,
        }
    }

    pub fn is_text(&self, id: &TextId) -> bool {
        self.text_id().as_ref() == Some(id)
    }
}
