use crate::config::PackingConfig;
use crate::error::Result;
use crate::solver::DpSolver;

pub struct DpSolverBuilder {
    config: PackingConfig,
}

impl Default for DpSolverBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DpSolverBuilder {
    pub fn new() -> Self {
        Self {
            config: PackingConfig::default(),
        }
    }
    pub fn from_config(config: PackingConfig) -> Self {
        Self { config }
    }
    pub fn with_scale(mut self, scale: u32) -> Self {
        self.config.scale = scale;
        self
    }
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.config.tolerance = tolerance;
        self
    }
    pub fn with_max_states(mut self, limit: usize) -> Self {
        self.config.max_states = Some(limit);
        self
    }
    pub fn with_shards(mut self, shards: usize) -> Self {
        self.config.shards = shards;
        self
    }
    pub fn build(self) -> Result<DpSolver> {
        self.config.validate()?;
        Ok(DpSolver::with_config_unchecked(self.config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PackingError;

    #[test]
    fn builder_sets_every_field() {
        let solver = DpSolverBuilder::new()
            .with_scale(10)
            .with_tolerance(1e-4)
            .with_max_states(1_000)
            .with_shards(4)
            .build()
            .unwrap();
        let config = solver.config();
        assert_eq!(config.scale, 10);
        assert_eq!(config.tolerance, 1e-4);
        assert_eq!(config.max_states, Some(1_000));
        assert_eq!(config.shards, 4);
    }

    #[test]
    fn build_validates() {
        assert!(matches!(
            DpSolverBuilder::new().with_scale(0).build(),
            Err(PackingError::InvalidConfig(_))
        ));
    }
}
