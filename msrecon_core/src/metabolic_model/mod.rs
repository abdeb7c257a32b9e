//! Entities exchanged with the workspace service: genomes, media,
//! templates, models, and the biochemistry reaction catalog.

pub mod biochemistry;
pub mod gene;
pub mod genome;
pub mod media;
pub mod metabolite;
pub mod model;
pub mod reaction;
pub mod template;
