//! Constant-gradient mass balance
//!
//! A purely analytic model with no climate input:
//! ```text
//! mb(h) = (h - ela_h) * grad + bias
//! ```
//!
//! The balance is given in mm w.e. yr-1 and returned as a rate in m s-1.

use glacier_mb_core::config::{MassBalanceConfig, SEC_IN_YEAR};
use glacier_mb_core::errors::MBResult;
use glacier_mb_core::model::MassBalanceModel;
use glacier_mb_core::FloatValue;
use ndarray::{Array1, ArrayView1};
use serde::{Deserialize, Serialize};

/// Parameters for the constant-gradient model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstantGradientParameters {
    /// Equilibrium line altitude
    /// unit: m
    pub ela_h: FloatValue,
    /// Mass-balance gradient
    /// unit: mm w.e. m-1 yr-1
    #[serde(default = "default_grad")]
    pub grad: FloatValue,
}

fn default_grad() -> FloatValue {
    3.0
}

impl ConstantGradientParameters {
    pub fn new(ela_h: FloatValue) -> Self {
        Self {
            ela_h,
            grad: default_grad(),
        }
    }
}

/// Linear mass-balance profile around the equilibrium line altitude.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConstantGradientMassBalance {
    parameters: ConstantGradientParameters,
    bias: FloatValue,
    sec_in_year: FloatValue,
}

impl ConstantGradientMassBalance {
    /// Create a new model from parameters
    pub fn from_parameters(parameters: ConstantGradientParameters) -> Self {
        Self {
            parameters,
            bias: 0.0,
            sec_in_year: SEC_IN_YEAR,
        }
    }

    /// Create a model using the year length of `config`.
    pub fn with_config(
        parameters: ConstantGradientParameters,
        config: &MassBalanceConfig,
    ) -> MBResult<Self> {
        config.validate()?;
        Ok(Self {
            sec_in_year: config.sec_in_year,
            ..Self::from_parameters(parameters)
        })
    }

    pub fn parameters(&self) -> &ConstantGradientParameters {
        &self.parameters
    }

    /// Annual balance at `height` (mm w.e. yr-1).
    pub fn annual_balance(&self, height: FloatValue) -> FloatValue {
        (height - self.parameters.ela_h) * self.parameters.grad + self.bias
    }
}

#[typetag::serde]
impl MassBalanceModel for ConstantGradientMassBalance {
    fn set_bias(&mut self, bias: FloatValue) {
        self.bias = bias;
    }

    fn bias(&self) -> FloatValue {
        self.bias
    }

    fn get_mb(
        &mut self,
        heights: ArrayView1<FloatValue>,
        _year: Option<FloatValue>,
    ) -> MBResult<Array1<FloatValue>> {
        Ok(heights.mapv(|h| self.annual_balance(h) / self.sec_in_year / 1000.0))
    }
}
