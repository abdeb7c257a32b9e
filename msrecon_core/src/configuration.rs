use std::sync::{LazyLock, RwLock};

pub static CONFIGURATION: LazyLock<RwLock<Configuration>> =
    LazyLock::new(|| RwLock::new(Configuration::default()));

pub struct Configuration {
    pub lower_bound: f64,
    pub upper_bound: f64,
    pub minimum_objective: f64,
    pub atp_threshold: f64,
    pub max_atp_gapfilling: usize,
    pub biomass_reaction: String,
    pub atp_reaction: String,
}

impl Default for Configuration {
    fn default() -> Self {
        Configuration {
            lower_bound: -1000.,
            upper_bound: 1000.,
            minimum_objective: 0.01,
            atp_threshold: 0.01,
            max_atp_gapfilling: 10,
            biomass_reaction: "bio1".to_string(),
            atp_reaction: "bio2".to_string(),
        }
    }
}
