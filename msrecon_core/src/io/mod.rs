//! Module for reading and writing models and job data files
pub mod atp_media;
pub mod gpr_parse;
pub mod json;
