use thiserror::Error;

use crate::assignment::AssignmentStrategy;

/// Default cap on expectation-maximisation steps.
pub const DEFAULT_EM_MAX_ITERATIONS: usize = 1000;

/// Reasons a [`SolverConfigBuilder`] may refuse to build.
#[derive(Copy, Clone, Debug, Error, Eq, PartialEq)]
pub enum ConfigError {
    /// Refinement was requested with no room for a single step.
    #[error("expectation-maximisation needs at least one iteration")]
    NoEmIterations,
}

/// Knobs of the solver, fixed for the duration of a solve.
///
/// The default enables everything: virtual markers, diagonal bands, refinement and the Hungarian method.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct SolverConfig {
    /// Add evidence anchored on virtual markers before the first and after the last character of every term.
    pub virtual_markers: bool,
    /// Only count alignments within the diagonal bands allowed by the similarity of the terms.
    /// When off, every triple of positions contributes.
    pub diagonal_band: bool,
    /// Refine the scores by expectation-maximisation before assigning.
    pub expectation_maximisation: bool,
    /// How characters are assigned to positions.
    pub assignment: AssignmentStrategy,
    /// Upper bound on refinement steps.
    pub em_max_iterations: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            virtual_markers: true,
            diagonal_band: true,
            expectation_maximisation: true,
            assignment: AssignmentStrategy::default(),
            em_max_iterations: DEFAULT_EM_MAX_ITERATIONS,
        }
    }
}

impl SolverConfig {
    /// Start building from the defaults.
    pub fn builder() -> SolverConfigBuilder {
        SolverConfigBuilder::default()
    }
}

/// Builder for [`SolverConfig`].
///
/// Setters mutate the builder in place and can be chained; [`Clone`] it to keep an intermediate state.
#[derive(Clone, Debug, Default)]
pub struct SolverConfigBuilder {
    config: SolverConfig,
}

impl SolverConfigBuilder {
    /// Toggle virtual start and end markers.
    pub fn virtual_markers(&mut self, on: bool) -> &mut Self {
        self.config.virtual_markers = on;
        self
    }

    /// Toggle diagonal band pruning.
    pub fn diagonal_band(&mut self, on: bool) -> &mut Self {
        self.config.diagonal_band = on;
        self
    }

    /// Toggle expectation-maximisation.
    pub fn expectation_maximisation(&mut self, on: bool) -> &mut Self {
        self.config.expectation_maximisation = on;
        self
    }

    /// Pick the assignment strategy.
    pub fn assignment(&mut self, strategy: AssignmentStrategy) -> &mut Self {
        self.config.assignment = strategy;
        self
    }

    /// Cap the number of refinement steps.
    pub fn em_max_iterations(&mut self, iterations: usize) -> &mut Self {
        self.config.em_max_iterations = iterations;
        self
    }

    /// Check the settings and produce the configuration.
    pub fn build(&self) -> Result<SolverConfig, ConfigError> {
        if self.config.expectation_maximisation && self.config.em_max_iterations == 0 {
            return Err(ConfigError::NoEmIterations);
        }

        Ok(self.config)
    }
}
