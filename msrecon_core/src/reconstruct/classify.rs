//! Template selection: explicit template keys and the classifier-code
//! mapping used in `auto` mode.

/// Resolve a template key (or long-name alias) to the template name
pub fn template_name(key: &str) -> Option<&'static str> {
    match key {
        "core" => Some("Core-V5.2"),
        "gp" | "grampos" | "Gram Positive" => Some("GramPosModelTemplateV6"),
        "gn" | "gramneg" | "Gram Negative" => Some("GramNegModelTemplateV6"),
        "ar" | "archaea" | "Archaea" => Some("ArchaeaTemplateV6"),
        _ => None,
    }
}

/// Outcome of classifier-driven template selection
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TemplateSelection {
    /// A template was selected for the genome
    Selected {
        /// Human-readable class name recorded in the result row
        class_name: String,
        /// Template key resolvable through [`template_name`]
        key: String,
    },
    /// The genome cannot be processed; recorded as a comment, not an error
    Skip {
        class_name: String,
        comment: String,
    },
}

/// Map a classifier class code to a template selection.
///
/// `--` is the classifier's unknown-negative marker and selects the
/// gram-negative template like `N` does.
pub fn select_template(code: &str) -> TemplateSelection {
    match code {
        "P" => TemplateSelection::Selected {
            class_name: "Gram Positive".to_string(),
            key: "gp".to_string(),
        },
        "N" | "--" => TemplateSelection::Selected {
            class_name: "Gram Negative".to_string(),
            key: "gn".to_string(),
        },
        "A" => TemplateSelection::Selected {
            class_name: "Archaea".to_string(),
            key: "ar".to_string(),
        },
        "C" => TemplateSelection::Skip {
            class_name: "Cyanobacteria".to_string(),
            comment: "Cyanobacteria not yet supported. Skipping genome.".to_string(),
        },
        other => TemplateSelection::Skip {
            class_name: other.to_string(),
            comment: format!("Unrecognized genome class {}. Skipping genome.", other),
        },
    }
}
