//! Effect groups: a design matrix paired with one or more draw blocks.

use super::posterior::PosteriorDraws;
use super::types::MissingDataError;
use crate::input::{DesignMatrix, DrawMatrix};

/// Conventional name for the fixed-effect group.
pub const FIXED_EFFECT: &str = "fixed";

/// One block of coefficient draws sharing its group's design matrix.
#[derive(Debug, Clone)]
pub struct DrawBlock {
    pub name: String,
    pub draws: DrawMatrix,
}

/// A design matrix and the draw blocks whose contributions are summed over it
/// (for example the structured and unstructured parts of a BYM2 effect).
#[derive(Debug, Clone)]
pub struct EffectGroup {
    pub name: String,
    pub design: DesignMatrix,
    pub blocks: Vec<DrawBlock>,
}

impl EffectGroup {
    #[must_use]
    pub fn new(name: impl Into<String>, design: DesignMatrix) -> Self {
        Self {
            name: name.into(),
            design,
            blocks: Vec::new(),
        }
    }

    /// Fixed-effect group with a single draw block.
    #[must_use]
    pub fn fixed(design: DesignMatrix, draws: DrawMatrix) -> Self {
        Self::new(FIXED_EFFECT, design).with_block(FIXED_EFFECT, draws)
    }

    #[must_use]
    pub fn with_block(mut self, name: impl Into<String>, draws: DrawMatrix) -> Self {
        self.blocks.push(DrawBlock {
            name: name.into(),
            draws,
        });
        self
    }
}

/// A random-effect group whose draw blocks are looked up by name in a
/// [`PosteriorDraws`] bundle.
#[derive(Debug, Clone)]
pub struct RandomEffectSpec {
    pub name: String,
    pub design: DesignMatrix,
    pub block_names: Vec<String>,
}

impl RandomEffectSpec {
    #[must_use]
    pub fn new<S: Into<String>>(
        name: impl Into<String>,
        design: DesignMatrix,
        block_names: impl IntoIterator<Item = S>,
    ) -> Self {
        Self {
            name: name.into(),
            design,
            block_names: block_names.into_iter().map(Into::into).collect(),
        }
    }
}

/// Everything needed to form predictive draws.
#[derive(Debug, Clone)]
pub struct PredictionInputs {
    pub fixed: EffectGroup,
    pub random: Vec<EffectGroup>,
}

impl PredictionInputs {
    #[must_use]
    pub const fn new(fixed: EffectGroup) -> Self {
        Self {
            fixed,
            random: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_random(mut self, group: EffectGroup) -> Self {
        self.random.push(group);
        self
    }

    /// Resolve the fixed effect and every random-effect block from `posterior`.
    ///
    /// # Errors
    ///
    /// Returns `MissingDataError` if the fixed effect or any named block is
    /// absent, or a random-effect group names no blocks.
    pub fn from_posterior(
        fixed_design: DesignMatrix,
        fixed_name: &str,
        posterior: &PosteriorDraws,
        random: Vec<RandomEffectSpec>,
    ) -> Result<Self, MissingDataError> {
        let fixed_draws = posterior.require(fixed_name)?.clone();
        let fixed = EffectGroup::new(fixed_name, fixed_design).with_block(fixed_name, fixed_draws);

        let random = random
            .into_iter()
            .map(|spec| {
                if spec.block_names.is_empty() {
                    return Err(MissingDataError::EmptyGroup(spec.name));
                }
                let mut group = EffectGroup::new(spec.name, spec.design);
                for block in spec.block_names {
                    let draws = posterior.require(&block)?.clone();
                    group = group.with_block(block, draws);
                }
                Ok(group)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { fixed, random })
    }

    /// All groups, fixed first.
    pub fn groups(&self) -> impl Iterator<Item = &EffectGroup> {
        std::iter::once(&self.fixed).chain(self.random.iter())
    }

    #[must_use]
    pub fn observation_count(&self) -> usize {
        self.fixed.design.nrows()
    }
}
