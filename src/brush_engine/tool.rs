use eframe::egui::Color32;

/// Which tool the toolbar has selected. Parameters are attached at gesture start.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ToolKind {
    #[default]
    Brush,
    Eraser,
    Line,
    Circle,
    Rectangle,
    Bucket,
}

impl ToolKind {
    pub const ALL: [ToolKind; 6] = [
        ToolKind::Brush,
        ToolKind::Eraser,
        ToolKind::Line,
        ToolKind::Circle,
        ToolKind::Rectangle,
        ToolKind::Bucket,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ToolKind::Brush => "Brush",
            ToolKind::Eraser => "Eraser",
            ToolKind::Line => "Line",
            ToolKind::Circle => "Circle",
            ToolKind::Rectangle => "Rectangle",
            ToolKind::Bucket => "Bucket",
        }
    }

    /// Bind the tool to concrete parameters.
    pub fn with(self, width: f32, color: Color32, fill_threshold: u8) -> Tool {
        match self {
            ToolKind::Brush => Tool::Brush { width, color },
            ToolKind::Eraser => Tool::Eraser { width },
            ToolKind::Line => Tool::Line { width, color },
            ToolKind::Circle => Tool::Circle { width, color },
            ToolKind::Rectangle => Tool::Rectangle { width, color },
            ToolKind::Bucket => Tool::Bucket {
                threshold: fill_threshold,
                color,
            },
        }
    }
}

/// A drawing tool together with exactly the parameters it uses.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Tool {
    Brush { width: f32, color: Color32 },
    Eraser { width: f32 },
    Line { width: f32, color: Color32 },
    /// Outline centered on the press point, radius follows the pointer.
    Circle { width: f32, color: Color32 },
    Rectangle { width: f32, color: Color32 },
    Bucket { threshold: u8, color: Color32 },
}

impl Tool {
    pub fn kind(&self) -> ToolKind {
        match self {
            Tool::Brush { .. } => ToolKind::Brush,
            Tool::Eraser { .. } => ToolKind::Eraser,
            Tool::Line { .. } => ToolKind::Line,
            Tool::Circle { .. } => ToolKind::Circle,
            Tool::Rectangle { .. } => ToolKind::Rectangle,
            Tool::Bucket { .. } => ToolKind::Bucket,
        }
    }

    /// Shape tools redraw from the pre-gesture pixels on every update.
    pub fn is_shape(&self) -> bool {
        matches!(
            self,
            Tool::Line { .. } | Tool::Circle { .. } | Tool::Rectangle { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binding_keeps_only_relevant_parameters() {
        assert_eq!(
            ToolKind::Eraser.with(12.0, Color32::RED, 200),
            Tool::Eraser { width: 12.0 }
        );
        assert_eq!(
            ToolKind::Bucket.with(12.0, Color32::RED, 180),
            Tool::Bucket {
                threshold: 180,
                color: Color32::RED
            }
        );
        for kind in ToolKind::ALL {
            assert_eq!(kind.with(1.0, Color32::BLACK, 0).kind(), kind);
        }
    }
}
